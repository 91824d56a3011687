use std::{
    collections::{hash_map::Entry, HashMap},
    error::Error,
    fmt::{self, Display, Formatter},
};

use glam::{Mat4, Vec3};

use crate::{
    bounds::Aabb,
    node::{NodeIndex, SceneNode},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateId(String),
    UnknownParent(NodeIndex),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateId(id) => write!(f, "Node id {} already exists", id),
            GraphError::UnknownParent(index) => write!(f, "Parent node {} not found", index),
        }
    }
}

impl Error for GraphError {}

/// Tree of scene nodes stored in an arena.
///
/// Nodes are addressed by [`NodeIndex`] and by their string id. The first
/// node is the root. Parents own their children through an ordered index
/// list, and the way back up is kept in a separate table, so the tree never
/// forms reference cycles.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    parents: Vec<Option<NodeIndex>>,
    ids: HashMap<String, NodeIndex>,
}

impl SceneGraph {
    pub fn new(root: SceneNode) -> Self {
        let mut ids = HashMap::new();
        ids.insert(root.id().to_string(), NodeIndex(0));
        Self {
            nodes: vec![root],
            parents: vec![None],
            ids,
        }
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn add_node(
        &mut self,
        parent: NodeIndex,
        mut node: SceneNode,
    ) -> Result<NodeIndex, GraphError> {
        if parent.0 >= self.nodes.len() {
            return Err(GraphError::UnknownParent(parent));
        }
        let index = NodeIndex(self.nodes.len());
        match self.ids.entry(node.id().to_string()) {
            Entry::Occupied(entry) => return Err(GraphError::DuplicateId(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(index);
            }
        }
        node.children.clear();
        self.nodes.push(node);
        self.parents.push(Some(parent));
        self.nodes[parent.0].children.push(index);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SceneNode> {
        self.nodes.get(index.0)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut SceneNode> {
        self.nodes.get_mut(index.0)
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&SceneNode> {
        self.index_of(id).and_then(|index| self.node(index))
    }

    pub fn parent_of(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.parents.get(index.0).copied().flatten()
    }

    pub fn children_of(&self, index: NodeIndex) -> &[NodeIndex] {
        self.node(index).map(SceneNode::children).unwrap_or_default()
    }

    /// Depth-first, pre-order, children in insertion order.
    pub fn iter(&self) -> Traverse<'_> {
        Traverse {
            graph: self,
            stack: vec![self.root()],
        }
    }

    pub fn find_by_predicate(&self, predicate: impl Fn(&SceneNode) -> bool) -> Vec<NodeIndex> {
        self.iter()
            .filter(|(_, node)| predicate(node))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn world_transform(&self, index: NodeIndex) -> Option<Mat4> {
        let mut transform = Mat4::from(self.node(index)?.transform());
        let mut current = index;
        while let Some(parent) = self.parent_of(current) {
            let parent_transform = Mat4::from(self.nodes[parent.0].transform());
            transform = parent_transform * transform;
            current = parent;
        }
        Some(transform)
    }

    /// Boxes never rotate, so only the world position of the node matters.
    pub fn world_bounds(&self, index: NodeIndex) -> Option<Aabb> {
        let node = self.node(index)?;
        if !node.has_geometry() {
            return None;
        }
        let center = self.world_transform(index)?.transform_point3(Vec3::ZERO);
        Some(Aabb::from_center_extent(center, node.extent()))
    }

    /// Indices of the nodes whose material changed since the last call.
    pub fn take_updated(&mut self) -> Vec<NodeIndex> {
        self.nodes
            .iter_mut()
            .enumerate()
            .filter(|(_, node)| node.updated())
            .map(|(index, node)| {
                node.clear_updated();
                NodeIndex(index)
            })
            .collect()
    }
}

pub struct Traverse<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeIndex>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = (NodeIndex, &'a SceneNode);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = self.graph.node(index)?;
        self.stack.extend(node.children().iter().rev());
        Some((index, node))
    }
}
