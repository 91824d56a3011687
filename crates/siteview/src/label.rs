use std::collections::HashMap;

use glam::Vec3;
use log::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{graph::SceneGraph, node::NodeKind};

/// Renderable produced by the external text renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelHandle(pub u64);

/// Identifies one label of one loaded scene. The generation changes on
/// every reload, so answers meant for a discarded scene can be told apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelKey {
    pub generation: u64,
    pub node: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LabelStyle {
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            size: 2.0,
            depth: 5.0,
            curve_segments: 12,
        }
    }
}

/// Everything the text renderer needs to build one label. Positions are in
/// the space of the building the label is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRequest {
    pub key: LabelKey,
    pub parent: String,
    pub text: String,
    pub position: Vec3,
    pub look_at: Vec3,
    pub style: LabelStyle,
}

/// External text renderer. It may answer at any later time, through
/// [`Engine::attach_label`](crate::engine::Engine::attach_label) or an
/// [`EngineHandle`](crate::engine::EngineHandle).
pub trait LabelProvider {
    fn request_label(&mut self, request: LabelRequest);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSlot {
    Pending,
    Ready(LabelHandle),
}

/// Label node id to renderable, filled in as the text renderer answers.
#[derive(Debug, Default)]
pub struct LabelTable {
    generation: u64,
    slots: HashMap<String, LabelSlot>,
}

impl LabelTable {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            slots: HashMap::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask the provider for every label node of the graph.
    pub fn request_all(
        &mut self,
        graph: &SceneGraph,
        provider: &mut dyn LabelProvider,
        style: LabelStyle,
    ) -> usize {
        let mut requested = 0;
        for (index, node) in graph.iter() {
            if node.kind() != NodeKind::Label {
                continue;
            }
            let Some(label) = node.label() else {
                continue;
            };
            let parent = graph
                .parent_of(index)
                .and_then(|parent| graph.node(parent))
                .map(|parent| parent.id().to_string())
                .unwrap_or_default();
            self.slots.insert(node.id().to_string(), LabelSlot::Pending);
            provider.request_label(LabelRequest {
                key: LabelKey {
                    generation: self.generation,
                    node: node.id().to_string(),
                },
                parent,
                text: label.text.clone(),
                position: node.transform().translation,
                look_at: label.look_at,
                style,
            });
            requested += 1;
        }
        debug!("Requested {} labels for scene generation {}", requested, self.generation);
        requested
    }

    pub fn attach(&mut self, key: &LabelKey, handle: LabelHandle) -> bool {
        if key.generation != self.generation {
            warn!(
                "Dropping label {} from discarded scene generation {}",
                key.node, key.generation
            );
            return false;
        }
        match self.slots.get_mut(&key.node) {
            Some(slot) => {
                *slot = LabelSlot::Ready(handle);
                true
            }
            None => {
                warn!("Label answer for unknown node {}", key.node);
                false
            }
        }
    }

    pub fn slot(&self, node: &str) -> Option<LabelSlot> {
        self.slots.get(node).copied()
    }

    pub fn handle(&self, node: &str) -> Option<LabelHandle> {
        match self.slot(node)? {
            LabelSlot::Ready(handle) => Some(handle),
            LabelSlot::Pending => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| **slot == LabelSlot::Pending)
            .count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
