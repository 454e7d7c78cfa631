//! Joint types and builder for skeletons

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constraint::Constraint;
use crate::math::joint_basis;
use crate::transform::{Axis, TransformChannel};

/// One of the two endpoints of a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointEnd {
    Head,
    Tail,
}

impl JointEnd {
    pub fn label(&self) -> &'static str {
        match self {
            JointEnd::Head => "Head",
            JointEnd::Tail => "Tail",
        }
    }
}

/// Edit-mode selection state; `body` doubles as pose-mode selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointSelection {
    pub body: bool,
    pub head: bool,
    pub tail: bool,
}

impl JointSelection {
    pub const ALL: Self = Self {
        body: true,
        head: true,
        tail: true,
    };

    pub fn any(&self) -> bool {
        self.body || self.head || self.tail
    }
}

/// Per-axis transform locks of a posed joint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformLocks {
    pub location: [bool; 3],
    pub rotation: [bool; 3],
    pub rotation_w: bool,
    pub scale: [bool; 3],
}

impl TransformLocks {
    /// Any location, rotation or scale axis locked (W is not counted)
    pub fn any(&self) -> bool {
        self.location.iter().any(|l| *l)
            || self.rotation.iter().any(|l| *l)
            || self.scale.iter().any(|l| *l)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Lock every channel except `channel` along `axis`
    pub fn only_free(channel: TransformChannel, axis: Axis) -> Self {
        let mut locks = Self {
            location: [true; 3],
            rotation: [true; 3],
            rotation_w: true,
            scale: [true; 3],
        };
        let i = axis.index();
        match channel {
            TransformChannel::Location => locks.location[i] = false,
            TransformChannel::Rotation => {
                locks.rotation[i] = false;
                locks.rotation_w = false;
            }
            TransformChannel::Scale => locks.scale[i] = false,
        }
        locks
    }
}

/// Pose-space state of a joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseState {
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub locks: TransformLocks,
    /// Object drawn in place of the joint (control widget)
    pub custom_shape: Option<Uuid>,
}

impl Default for PoseState {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            locks: TransformLocks::default(),
            custom_shape: None,
        }
    }
}

impl PoseState {
    pub fn has_negative_scale(&self) -> bool {
        self.scale.cmplt(Vec3::ZERO).any()
    }
}

/// A joint (bone) of a skeleton; positions are in skeleton space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: Uuid,
    /// Change through `Skeleton::rename_joint` so the name index stays valid
    pub name: String,
    /// Change through `Skeleton::set_parent`
    pub parent: Option<Uuid>,
    /// Head is locked to the parent's tail
    pub connected: bool,
    pub head: Vec3,
    pub tail: Vec3,
    /// Rotation about the head->tail axis, in radians
    pub roll: f32,
    pub deform: bool,
    pub selection: JointSelection,
    pub pose: PoseState,
    pub constraints: Vec<Constraint>,
}

impl Joint {
    pub fn new(name: impl Into<String>, head: Vec3, tail: Vec3) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            parent: None,
            connected: false,
            head,
            tail,
            roll: 0.0,
            deform: true,
            selection: JointSelection::default(),
            pose: PoseState::default(),
            constraints: Vec::new(),
        }
    }

    pub fn builder(name: impl Into<String>) -> JointBuilder {
        JointBuilder::new(name)
    }

    pub fn vector(&self) -> Vec3 {
        self.tail - self.head
    }

    pub fn length(&self) -> f32 {
        self.vector().length()
    }

    /// Unit head->tail direction, `None` for zero-length joints
    pub fn direction(&self) -> Option<Vec3> {
        self.vector().try_normalize()
    }

    pub fn midpoint(&self) -> Vec3 {
        (self.head + self.tail) * 0.5
    }

    pub fn endpoint(&self, end: JointEnd) -> Vec3 {
        match end {
            JointEnd::Head => self.head,
            JointEnd::Tail => self.tail,
        }
    }

    /// Rest orientation (columns x, y = direction, z)
    pub fn basis(&self) -> Option<Mat3> {
        joint_basis(self.head, self.tail, self.roll)
    }

    pub fn x_axis(&self) -> Option<Vec3> {
        self.basis().map(|b| b.x_axis)
    }

    pub fn z_axis(&self) -> Option<Vec3> {
        self.basis().map(|b| b.z_axis)
    }

    /// Rest frame placed at the head
    pub fn rest_matrix(&self) -> Mat4 {
        let basis = self.basis().unwrap_or(Mat3::IDENTITY);
        Mat4::from_cols(
            basis.x_axis.extend(0.0),
            basis.y_axis.extend(0.0),
            basis.z_axis.extend(0.0),
            self.head.extend(1.0),
        )
    }

    /// Frame children parented to this joint are placed in (rest frame at the tail)
    pub fn tail_matrix(&self) -> Mat4 {
        let mut m = self.rest_matrix();
        m.w_axis = self.tail.extend(1.0);
        m
    }

    /// Translate both endpoints
    pub fn translate(&mut self, offset: Vec3) {
        self.head += offset;
        self.tail += offset;
    }

    pub fn is_selected(&self) -> bool {
        self.selection.body
    }

    pub fn select(&mut self, select: bool) {
        self.selection = if select {
            JointSelection::ALL
        } else {
            JointSelection::default()
        };
    }

    pub fn ik_constraint(&self) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.is_ik())
    }
}

/// Builder for creating joints with fluent API
#[derive(Debug, Clone)]
pub struct JointBuilder {
    name: String,
    head: Vec3,
    tail: Vec3,
    roll: f32,
    parent: Option<Uuid>,
    connected: bool,
    deform: bool,
    selected: bool,
}

impl JointBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            head: Vec3::ZERO,
            tail: Vec3::Y,
            roll: 0.0,
            parent: None,
            connected: false,
            deform: true,
            selected: false,
        }
    }

    pub fn head(mut self, head: Vec3) -> Self {
        self.head = head;
        self
    }

    pub fn tail(mut self, tail: Vec3) -> Self {
        self.tail = tail;
        self
    }

    pub fn roll(mut self, roll: f32) -> Self {
        self.roll = roll;
        self
    }

    pub fn parent(mut self, parent: Uuid) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Parent with the head locked to the parent's tail
    pub fn connected_to(mut self, parent: Uuid) -> Self {
        self.parent = Some(parent);
        self.connected = true;
        self
    }

    pub fn deform(mut self, deform: bool) -> Self {
        self.deform = deform;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn build(self) -> Joint {
        let mut joint = Joint::new(self.name, self.head, self.tail);
        joint.roll = self.roll;
        joint.parent = self.parent;
        joint.connected = self.connected;
        joint.deform = self.deform;
        joint.select(self.selected);
        joint
    }
}
