use std::{
    sync::mpsc::{self, SendError, TryRecvError},
    time::Duration,
};

use glam::{Vec2, Vec4Swizzles};
use log::{debug, info, trace, warn};
use siteview_asset::Site;
use web_time::Instant;

use crate::{
    animation::CameraAnimator,
    builder::{InvalidModelError, SceneBuilder},
    camera::{Camera, CameraPose},
    config::{ConfigError, EngineConfig},
    focus::{FocusController, FocusEvent, FocusState, ObserverId, Transition},
    graph::SceneGraph,
    label::{LabelHandle, LabelKey, LabelProvider, LabelTable},
    picker::{PickHit, RayPicker, SurfaceRect},
    tick::TickClock,
};

/// Work posted to the engine from outside its thread, applied at the start
/// of the next frame.
#[derive(Debug)]
pub enum EngineAction {
    Click { client_x: f32, client_y: f32 },
    LoadSite(Site),
    Resize(SurfaceRect),
    LabelReady { key: LabelKey, handle: LabelHandle },
}

#[derive(Debug, Clone)]
pub struct EngineHandle {
    actions_tx: mpsc::Sender<EngineAction>,
}

impl EngineHandle {
    pub fn send(&self, action: EngineAction) -> Result<(), SendError<EngineAction>> {
        self.actions_tx.send(action)
    }

    pub fn click(&self, client_x: f32, client_y: f32) -> Result<(), SendError<EngineAction>> {
        self.send(EngineAction::Click { client_x, client_y })
    }

    pub fn load_site(&self, site: Site) -> Result<(), SendError<EngineAction>> {
        self.send(EngineAction::LoadSite(site))
    }

    pub fn resize(&self, surface: SurfaceRect) -> Result<(), SendError<EngineAction>> {
        self.send(EngineAction::Resize(surface))
    }

    pub fn label_ready(
        &self,
        key: LabelKey,
        handle: LabelHandle,
    ) -> Result<(), SendError<EngineAction>> {
        self.send(EngineAction::LabelReady { key, handle })
    }
}

/// Result of the most recent pick. Before the first click there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    Hit(PickHit),
    Miss,
}

/// Owns one loaded scene and everything that reacts to the pointer.
///
/// All state changes happen through `&mut self`, so a click is fully
/// applied before the next [`frame`](Self::frame) samples the camera.
pub struct Engine {
    config: EngineConfig,
    builder: SceneBuilder,
    picker: RayPicker,
    graph: Option<SceneGraph>,
    generation: u64,
    camera: Camera,
    animator: CameraAnimator,
    focus: FocusController,
    labels: LabelTable,
    label_provider: Option<Box<dyn LabelProvider + Send>>,
    surface: SurfaceRect,
    clock: TickClock,
    last_pick: Option<PickOutcome>,
    last_load_error: Option<InvalidModelError>,
    actions_tx: mpsc::Sender<EngineAction>,
    actions_rx: mpsc::Receiver<EngineAction>,
}

impl Engine {
    pub fn new(config: EngineConfig, surface: SurfaceRect) -> Result<Self, ConfigError> {
        config.validate()?;
        let (actions_tx, actions_rx) = mpsc::channel();
        Ok(Self {
            builder: SceneBuilder::new(config.label, config.palette),
            picker: RayPicker,
            graph: None,
            generation: 0,
            camera: Camera::new(config.overview, config.projection.clone()),
            animator: CameraAnimator::new(config.overview),
            focus: FocusController::new(&config),
            labels: LabelTable::default(),
            label_provider: None,
            surface,
            clock: TickClock::default(),
            last_pick: None,
            last_load_error: None,
            actions_tx,
            actions_rx,
            config,
        })
    }

    pub fn with_label_provider(mut self, provider: impl LabelProvider + Send + 'static) -> Self {
        self.label_provider = Some(Box::new(provider));
        self
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            actions_tx: self.actions_tx.clone(),
        }
    }

    /// Replace the whole scene. A site that fails validation leaves the
    /// current scene, focus and camera untouched, and stays readable through
    /// [`last_load_error`](Self::last_load_error) until the next good load.
    pub fn load_site(&mut self, site: &Site) -> Result<(), InvalidModelError> {
        let mut graph = match self.builder.build(site) {
            Ok(graph) => graph,
            Err(err) => {
                warn!("Rejected site {}: {}", site.id, err);
                self.last_load_error = Some(err.clone());
                return Err(err);
            }
        };

        self.generation += 1;
        self.focus.clear();
        self.focus.show_overview(&mut graph, &mut self.animator);
        self.labels = LabelTable::new(self.generation);
        if let Some(provider) = &mut self.label_provider {
            self.labels
                .request_all(&graph, provider.as_mut(), self.config.label.style);
        }
        self.graph = Some(graph);
        self.last_pick = None;
        self.last_load_error = None;
        info!(
            "Loaded site {} as scene generation {}",
            site.id, self.generation
        );
        Ok(())
    }

    pub fn resize(&mut self, surface: SurfaceRect) {
        info!("Surface resized to {}x{}", surface.width, surface.height);
        self.surface = surface;
    }

    /// Pointer click in client coordinates.
    pub fn click(&mut self, client_x: f32, client_y: f32) -> Transition {
        match self.surface.to_ndc(client_x, client_y) {
            Some(ndc) => self.click_ndc(ndc),
            None => {
                warn!("Click on an empty surface ignored");
                Transition::Unchanged
            }
        }
    }

    pub fn click_ndc(&mut self, ndc: Vec2) -> Transition {
        let Some(graph) = &mut self.graph else {
            debug!("Click before any site was loaded");
            return Transition::Unchanged;
        };
        let hit = self
            .picker
            .pick(ndc, &self.camera, self.surface.aspect(), graph);
        let transition = self
            .focus
            .handle_pick(hit.as_ref(), graph, &mut self.animator);
        self.last_pick = Some(match hit {
            Some(hit) => PickOutcome::Hit(hit),
            None => PickOutcome::Miss,
        });
        transition
    }

    /// Focus a building without going through the pointer.
    pub fn focus_building(&mut self, id: &str) -> Transition {
        let Some(graph) = &mut self.graph else {
            return Transition::Unchanged;
        };
        match graph.index_of(id) {
            Some(index) => self.focus.focus_building(index, graph, &mut self.animator),
            None => {
                warn!("Unknown building {}", id);
                Transition::Unchanged
            }
        }
    }

    pub fn show_overview(&mut self) -> Transition {
        match &mut self.graph {
            Some(graph) => self.focus.show_overview(graph, &mut self.animator),
            None => Transition::Unchanged,
        }
    }

    pub fn attach_label(&mut self, key: &LabelKey, handle: LabelHandle) -> bool {
        self.labels.attach(key, handle)
    }

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&FocusEvent) + Send + 'static,
    ) -> ObserverId {
        self.focus.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.focus.unsubscribe(id)
    }

    /// Applies queued actions and tells whether one of them restarted the
    /// camera animation.
    fn handle_actions(&mut self) -> bool {
        let mut restarted = false;
        loop {
            let action = match self.actions_rx.try_recv() {
                Ok(action) => action,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            };
            match action {
                EngineAction::Click { client_x, client_y } => {
                    restarted |= self.click(client_x, client_y) != Transition::Unchanged;
                }
                EngineAction::LoadSite(site) => {
                    // Failure is kept in last_load_error
                    restarted |= self.load_site(&site).is_ok();
                }
                EngineAction::Resize(surface) => self.resize(surface),
                EngineAction::LabelReady { key, handle } => {
                    self.attach_label(&key, handle);
                }
            }
        }
        restarted
    }

    /// Render tick with the host's frame timestamp.
    pub fn frame(&mut self, now: Instant) -> CameraPose {
        let delta = self.clock.tick(now);
        self.advance(delta)
    }

    /// Render tick with an explicit delta since the previous one. An
    /// animation started by a queued action begins on this frame, so none of
    /// `delta` is spent on it.
    pub fn advance(&mut self, delta: Duration) -> CameraPose {
        let pose = if self.handle_actions() {
            self.animator.current()
        } else {
            self.animator.advance(delta)
        };
        self.camera.pose = pose;
        trace!("Frame +{:?}, camera at {:?}", delta, pose.position);
        pose
    }

    /// Where the center of a node lands on the surface, in client
    /// coordinates. `None` when it is behind the camera.
    pub fn client_point_of(&self, id: &str) -> Option<(f32, f32)> {
        let graph = self.graph.as_ref()?;
        let center = graph.world_bounds(graph.index_of(id)?)?.center();
        let clip = self.camera.view_projection(self.surface.aspect()) * center.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(self.surface.from_ndc(clip.xy() / clip.w))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        self.graph.as_ref()
    }

    /// Nodes whose material must be uploaded again.
    pub fn take_updated(&mut self) -> Vec<crate::node::NodeIndex> {
        self.graph
            .as_mut()
            .map(SceneGraph::take_updated)
            .unwrap_or_default()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn animator(&self) -> &CameraAnimator {
        &self.animator
    }

    pub fn is_animating(&self) -> bool {
        !self.animator.is_complete()
    }

    pub fn focus(&self) -> &FocusState {
        self.focus.state()
    }

    pub fn closeup_pose(&self, id: &str) -> Option<CameraPose> {
        let graph = self.graph.as_ref()?;
        let center = graph.world_bounds(graph.index_of(id)?)?.center();
        Some(self.focus.closeup_pose(center))
    }

    pub fn overview_pose(&self) -> CameraPose {
        self.focus.overview()
    }

    /// Why the most recent load was rejected, direct or queued. Cleared by
    /// the next successful load.
    pub fn last_load_error(&self) -> Option<&InvalidModelError> {
        self.last_load_error.as_ref()
    }

    pub fn last_pick(&self) -> Option<&PickOutcome> {
        self.last_pick.as_ref()
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn surface(&self) -> SurfaceRect {
        self.surface
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
