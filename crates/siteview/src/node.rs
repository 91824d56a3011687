use std::fmt::{self, Display, Formatter};

use glam::{Mat4, Quat, Vec3};

/// Position of a node inside its [`SceneGraph`](crate::graph::SceneGraph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl Display for NodeIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Site,
    Building,
    Label,
}

impl NodeKind {
    pub fn is_pickable(self) -> bool {
        matches!(self, NodeKind::Site | NodeKind::Building)
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Site => write!(f, "site"),
            NodeKind::Building => write!(f, "building"),
            NodeKind::Label => write!(f, "label"),
        }
    }
}

/// Transform relative to the parent node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl From<&NodeTransform> for Mat4 {
    fn from(value: &NodeTransform) -> Self {
        Mat4::from_rotation_translation(value.rotation, value.translation)
    }
}

/// Text carried by a label node, with the point it is turned to face.
/// Both points are in the parent's space.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelText {
    pub text: String,
    pub look_at: Vec3,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    id: String,
    kind: NodeKind,
    // Full box size, zero for nodes without geometry
    extent: Vec3,
    transform: NodeTransform,
    color: Vec3,
    opacity: f32,
    // Set when the material changed and has not been taken by the rasterizer
    updated: bool,
    label: Option<LabelText>,
    pub(crate) children: Vec<NodeIndex>,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            extent: Vec3::ZERO,
            transform: NodeTransform::default(),
            color: Vec3::ONE,
            opacity: 1.0,
            updated: true,
            label: None,
            children: Vec::new(),
        }
    }

    pub fn with_extent(mut self, extent: Vec3) -> Self {
        self.extent = extent;
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_label(mut self, label: LabelText) -> Self {
        self.label = Some(label);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn extent(&self) -> Vec3 {
        self.extent
    }

    pub fn has_geometry(&self) -> bool {
        self.extent.cmpgt(Vec3::ZERO).all()
    }

    pub fn transform(&self) -> &NodeTransform {
        &self.transform
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn label(&self) -> Option<&LabelText> {
        self.label.as_ref()
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Returns false and leaves the node untouched when the value is already
    /// in place.
    pub fn set_opacity(&mut self, opacity: f32) -> bool {
        let opacity = opacity.clamp(0.0, 1.0);
        if self.opacity == opacity {
            return false;
        }
        self.opacity = opacity;
        self.updated = true;
        true
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }

    pub fn updated(&self) -> bool {
        self.updated
    }

    pub(crate) fn clear_updated(&mut self) {
        self.updated = false;
    }
}

#[cfg(test)]
mod test {
    use glam::Vec3;

    use super::{NodeKind, SceneNode};

    #[test]
    fn test_set_opacity_skips_same_value() {
        let mut node = SceneNode::new("b1", NodeKind::Building);
        node.clear_updated();
        assert!(!node.set_opacity(1.0));
        assert!(!node.updated());
        assert!(node.set_opacity(0.1));
        assert!(node.updated());
        assert!(node.is_transparent());
    }

    #[test]
    fn test_opacity_clamped() {
        let mut node = SceneNode::new("b1", NodeKind::Building);
        node.set_opacity(3.0);
        assert_eq!(node.opacity(), 1.0);
        node.set_opacity(-1.0);
        assert_eq!(node.opacity(), 0.0);
    }

    #[test]
    fn test_label_has_no_geometry() {
        let label = SceneNode::new("b1#label", NodeKind::Label);
        assert!(!label.has_geometry());
        assert!(!label.kind().is_pickable());
        let building = SceneNode::new("b1", NodeKind::Building).with_extent(Vec3::ONE);
        assert!(building.has_geometry());
    }
}
