use log::trace;

use crate::{
    graph::SceneGraph,
    node::{NodeIndex, NodeKind},
};

pub const DEFAULT_DIMMED_OPACITY: f32 = 0.1;

/// Fades every building except the focused one.
#[derive(Debug, Clone, Copy)]
pub struct OpacityHighlighter {
    dimmed_opacity: f32,
}

impl Default for OpacityHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_DIMMED_OPACITY)
    }
}

impl OpacityHighlighter {
    pub fn new(dimmed_opacity: f32) -> Self {
        Self {
            dimmed_opacity: dimmed_opacity.clamp(0.0, 1.0),
        }
    }

    pub fn dimmed_opacity(&self) -> f32 {
        self.dimmed_opacity
    }

    /// Returns how many nodes actually changed. With no focus every building
    /// is fully opaque. Labels follow the building they belong to.
    pub fn apply_focus(&self, graph: &mut SceneGraph, focused: Option<&str>) -> usize {
        let buildings = graph.find_by_predicate(|node| node.kind() == NodeKind::Building);
        let mut writes = 0;
        for building in buildings {
            let Some(node) = graph.node_mut(building) else {
                continue;
            };
            let opacity = match focused {
                Some(id) if node.id() != id => self.dimmed_opacity,
                _ => 1.0,
            };
            if node.set_opacity(opacity) {
                writes += 1;
            }
            writes += self.apply_to_labels(graph, building, opacity);
        }
        trace!("Applied focus {:?}, {} opacity writes", focused, writes);
        writes
    }

    fn apply_to_labels(&self, graph: &mut SceneGraph, building: NodeIndex, opacity: f32) -> usize {
        let labels: Vec<_> = graph
            .children_of(building)
            .iter()
            .copied()
            .filter(|child| {
                graph
                    .node(*child)
                    .is_some_and(|node| node.kind() == NodeKind::Label)
            })
            .collect();
        let mut writes = 0;
        for label in labels {
            if let Some(node) = graph.node_mut(label) {
                if node.set_opacity(opacity) {
                    writes += 1;
                }
            }
        }
        writes
    }
}
