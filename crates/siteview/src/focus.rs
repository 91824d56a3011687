use std::{
    fmt::{self, Debug, Display, Formatter},
    mem,
};

use glam::Vec3;
use log::{debug, warn};

use crate::{
    animation::CameraAnimator,
    camera::CameraPose,
    config::EngineConfig,
    graph::SceneGraph,
    highlight::OpacityHighlighter,
    node::{NodeIndex, NodeKind},
    picker::PickHit,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Default,
    Focused(String),
}

impl FocusState {
    pub fn focused_id(&self) -> Option<&str> {
        match self {
            FocusState::Default => None,
            FocusState::Focused(id) => Some(id),
        }
    }
}

impl Display for FocusState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FocusState::Default => write!(f, "overview"),
            FocusState::Focused(id) => write!(f, "building {}", id),
        }
    }
}

/// What kind of object the camera is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InView {
    Site,
    Building,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusEvent {
    pub previous: FocusState,
    pub current: FocusState,
}

impl FocusEvent {
    pub fn in_view(&self) -> InView {
        match self.current {
            FocusState::Default => InView::Site,
            FocusState::Focused(_) => InView::Building,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Focused(String),
    Overview,
    Unchanged,
}

pub type FocusObserver = Box<dyn FnMut(&FocusEvent) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// Decides what the camera looks at after each pick.
///
/// Picking a building focuses it: the camera flies to a close-up and every
/// other building fades. Picking the ground or nothing at all returns to
/// the overview with every building opaque. Picking the building already in
/// focus changes nothing. Opacity is applied at once, only the camera moves
/// over time.
pub struct FocusController {
    state: FocusState,
    highlighter: OpacityHighlighter,
    closeup_offset: Vec3,
    overview: CameraPose,
    duration_ms: f32,
    observers: Vec<(ObserverId, FocusObserver)>,
    next_observer: usize,
}

// Observers are closures, so only count them
impl Debug for FocusController {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusController")
            .field("state", &self.state)
            .field("highlighter", &self.highlighter)
            .field("closeup_offset", &self.closeup_offset)
            .field("overview", &self.overview)
            .field("duration_ms", &self.duration_ms)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl FocusController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            state: FocusState::Default,
            highlighter: OpacityHighlighter::new(config.dimmed_opacity),
            closeup_offset: config.closeup_offset,
            overview: config.overview,
            duration_ms: config.focus_duration_ms,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn highlighter(&self) -> &OpacityHighlighter {
        &self.highlighter
    }

    pub fn overview(&self) -> CameraPose {
        self.overview
    }

    pub fn closeup_pose(&self, center: Vec3) -> CameraPose {
        CameraPose::new(center + self.closeup_offset, center)
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&FocusEvent) + Send + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let len = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != len
    }

    pub fn handle_pick(
        &mut self,
        hit: Option<&PickHit>,
        graph: &mut SceneGraph,
        animator: &mut CameraAnimator,
    ) -> Transition {
        match hit {
            Some(hit) if hit.kind == NodeKind::Building => {
                self.focus_building(hit.index, graph, animator)
            }
            Some(hit) if hit.kind == NodeKind::Label => {
                debug!("Ignoring pick on label {}", hit.id);
                Transition::Unchanged
            }
            _ => self.show_overview(graph, animator),
        }
    }

    pub fn focus_building(
        &mut self,
        index: NodeIndex,
        graph: &mut SceneGraph,
        animator: &mut CameraAnimator,
    ) -> Transition {
        let Some(node) = graph.node(index) else {
            warn!("Focus requested for missing node {}", index);
            return Transition::Unchanged;
        };
        if node.kind() != NodeKind::Building {
            warn!("Focus requested for {} {}, not a building", node.kind(), node.id());
            return Transition::Unchanged;
        }
        let id = node.id().to_string();
        if self.state.focused_id() == Some(id.as_str()) {
            debug!("Building {} already in focus", id);
            return Transition::Unchanged;
        }
        let Some(bounds) = graph.world_bounds(index) else {
            warn!("Building {} has no bounds to focus on", id);
            return Transition::Unchanged;
        };

        animator.retarget(self.closeup_pose(bounds.center()), self.duration_ms);
        self.highlighter.apply_focus(graph, Some(&id));
        self.commit(FocusState::Focused(id.clone()));
        Transition::Focused(id)
    }

    pub fn show_overview(
        &mut self,
        graph: &mut SceneGraph,
        animator: &mut CameraAnimator,
    ) -> Transition {
        animator.retarget(self.overview, self.duration_ms);
        self.highlighter.apply_focus(graph, None);
        self.commit(FocusState::Default);
        Transition::Overview
    }

    /// Drop any focus without notifying observers or moving the camera,
    /// for when the scene it referred to is gone.
    pub fn clear(&mut self) {
        self.state = FocusState::Default;
    }

    fn commit(&mut self, next: FocusState) {
        let previous = mem::replace(&mut self.state, next);
        debug!("Focus changed: {} -> {}", previous, self.state);
        let event = FocusEvent {
            previous,
            current: self.state.clone(),
        };
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }
}
