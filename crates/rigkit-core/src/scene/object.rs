//! Scene objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::mesh::Mesh;
use crate::skeleton::Skeleton;
use crate::transform::Transform;

/// Object payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectData {
    Skeleton(Skeleton),
    Mesh(Mesh),
    Empty,
}

/// Payload kind, used for context checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Skeleton,
    Mesh,
    Empty,
}

impl ObjectData {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectData::Skeleton(_) => ObjectKind::Skeleton,
            ObjectData::Mesh(_) => ObjectKind::Mesh,
            ObjectData::Empty => ObjectKind::Empty,
        }
    }
}

/// Interaction mode of an object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectMode {
    #[default]
    Object,
    Edit,
    Pose,
    WeightPaint,
}

impl ObjectMode {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectMode::Object => "Object",
            ObjectMode::Edit => "Edit",
            ObjectMode::Pose => "Pose",
            ObjectMode::WeightPaint => "Weight Paint",
        }
    }
}

/// How an object follows its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentKind {
    /// Plain object parenting
    Object,
    /// Deformed by the parent skeleton through vertex groups
    Skinned,
    /// Rigidly attached to one joint of the parent skeleton
    Joint(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRelation {
    pub object: Uuid,
    pub kind: ParentKind,
}

impl ParentRelation {
    pub fn object(object: Uuid) -> Self {
        Self {
            object,
            kind: ParentKind::Object,
        }
    }

    pub fn skinned(object: Uuid) -> Self {
        Self {
            object,
            kind: ParentKind::Skinned,
        }
    }

    pub fn joint(object: Uuid, joint: Uuid) -> Self {
        Self {
            object,
            kind: ParentKind::Joint(joint),
        }
    }

    pub fn joint_id(&self) -> Option<Uuid> {
        match self.kind {
            ParentKind::Joint(id) => Some(id),
            _ => None,
        }
    }
}

/// Viewport display toggles of a skeleton object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub show_names: bool,
    pub in_front: bool,
}

/// An object placed in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: Uuid,
    pub name: String,
    pub data: ObjectData,
    /// Local transform relative to the parent frame
    pub transform: Transform,
    pub parent: Option<ParentRelation>,
    pub mode: ObjectMode,
    pub display: DisplayFlags,
    pub selected: bool,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, data: ObjectData) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data,
            transform: Transform::IDENTITY,
            parent: None,
            mode: ObjectMode::Object,
            display: DisplayFlags::default(),
            selected: false,
        }
    }

    pub fn skeleton(name: impl Into<String>, skeleton: Skeleton) -> Self {
        Self::new(name, ObjectData::Skeleton(skeleton))
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, ObjectData::Mesh(mesh))
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, ObjectData::Empty)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mode(mut self, mode: ObjectMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn kind(&self) -> ObjectKind {
        self.data.kind()
    }

    pub fn as_skeleton(&self) -> Option<&Skeleton> {
        match &self.data {
            ObjectData::Skeleton(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_skeleton_mut(&mut self) -> Option<&mut Skeleton> {
        match &mut self.data {
            ObjectData::Skeleton(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ObjectData::Mesh(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.data {
            ObjectData::Mesh(m) => Some(m),
            _ => None,
        }
    }
}
