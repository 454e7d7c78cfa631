//! Motion constraints attached to pose joints

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transform::{Axis, SignedAxis, TransformChannel};

/// Reference to a constraint target: an object and optionally a joint inside it
///
/// Joints are referenced by ID so renames never invalidate the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub object: Uuid,
    pub joint: Option<Uuid>,
}

impl TargetRef {
    pub fn object(object: Uuid) -> Self {
        Self {
            object,
            joint: None,
        }
    }

    pub fn joint(object: Uuid, joint: Uuid) -> Self {
        Self {
            object,
            joint: Some(joint),
        }
    }
}

/// Coordinate space a constraint evaluates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintSpace {
    #[default]
    World,
    Custom,
    Pose,
    LocalWithParent,
    Local,
}

/// Volume preservation mode of a stretch constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VolumeMode {
    #[default]
    Xz,
    X,
    Z,
    None,
}

/// Rotation mode of a stretch constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeepAxis {
    PlaneX,
    PlaneZ,
    #[default]
    SwingY,
}

/// Inverse kinematics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IkSettings {
    pub target: Option<TargetRef>,
    pub pole_target: Option<TargetRef>,
    /// Radians
    pub pole_angle: f32,
    /// Number of joints affected (0 = whole chain to the root)
    pub chain_count: u32,
    pub iterations: u32,
    pub use_tail: bool,
    pub use_stretch: bool,
    pub use_location: bool,
    pub use_rotation: bool,
    pub weight: f32,
    pub orient_weight: f32,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            target: None,
            pole_target: None,
            pole_angle: 0.0,
            chain_count: 0,
            iterations: 500,
            use_tail: true,
            use_stretch: true,
            use_location: true,
            use_rotation: false,
            weight: 1.0,
            orient_weight: 0.0,
        }
    }
}

/// Stretch-to settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StretchToSettings {
    pub target: Option<TargetRef>,
    pub rest_length: f32,
    pub bulge: f32,
    pub use_bulge_min: bool,
    pub use_bulge_max: bool,
    pub bulge_min: f32,
    pub bulge_max: f32,
    pub bulge_smooth: f32,
    pub volume: VolumeMode,
    pub keep_axis: KeepAxis,
}

impl Default for StretchToSettings {
    fn default() -> Self {
        Self {
            target: None,
            rest_length: 0.0,
            bulge: 1.0,
            use_bulge_min: false,
            use_bulge_max: false,
            bulge_min: 1.0,
            bulge_max: 1.0,
            bulge_smooth: 0.0,
            volume: VolumeMode::default(),
            keep_axis: KeepAxis::default(),
        }
    }
}

/// Locked-track settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockedTrackSettings {
    pub target: Option<TargetRef>,
    pub track_axis: SignedAxis,
    pub lock_axis: Axis,
}

impl Default for LockedTrackSettings {
    fn default() -> Self {
        Self {
            target: None,
            track_axis: SignedAxis::POS_Y,
            lock_axis: Axis::Z,
        }
    }
}

/// Track-to settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackToSettings {
    pub target: Option<TargetRef>,
    pub track_axis: SignedAxis,
    pub up_axis: Axis,
    pub use_target_z: bool,
    pub target_space: ConstraintSpace,
    pub owner_space: ConstraintSpace,
    /// Space reference used when either space is [`ConstraintSpace::Custom`]
    pub space_target: Option<TargetRef>,
}

impl Default for TrackToSettings {
    fn default() -> Self {
        Self {
            target: None,
            track_axis: SignedAxis::POS_Y,
            up_axis: Axis::Z,
            use_target_z: false,
            target_space: ConstraintSpace::World,
            owner_space: ConstraintSpace::World,
            space_target: None,
        }
    }
}

/// Min/max limit on one axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisLimit {
    pub use_min: bool,
    pub use_max: bool,
    pub min: f32,
    pub max: f32,
}

/// Limit location / rotation / scale settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitSettings {
    pub channel: TransformChannel,
    pub axes: [AxisLimit; 3],
    pub use_transform_limit: bool,
    pub owner_space: ConstraintSpace,
}

impl LimitSettings {
    pub fn new(channel: TransformChannel) -> Self {
        Self {
            channel,
            axes: [AxisLimit::default(); 3],
            use_transform_limit: false,
            owner_space: ConstraintSpace::World,
        }
    }

    /// Limit a single axis to `[min, max]`
    pub fn with_range(mut self, axis: Axis, min: f32, max: f32) -> Self {
        self.axes[axis.index()] = AxisLimit {
            use_min: true,
            use_max: true,
            min,
            max,
        };
        self
    }
}

/// Constraint type and its type-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    Ik(IkSettings),
    StretchTo(StretchToSettings),
    LockedTrack(LockedTrackSettings),
    TrackTo(TrackToSettings),
    Limit(LimitSettings),
}

impl ConstraintKind {
    /// Host-style type identifier (used in reports)
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstraintKind::Ik(_) => "IK",
            ConstraintKind::StretchTo(_) => "STRETCH_TO",
            ConstraintKind::LockedTrack(_) => "LOCKED_TRACK",
            ConstraintKind::TrackTo(_) => "TRACK_TO",
            ConstraintKind::Limit(l) => match l.channel {
                TransformChannel::Location => "LIMIT_LOCATION",
                TransformChannel::Rotation => "LIMIT_ROTATION",
                TransformChannel::Scale => "LIMIT_SCALE",
            },
        }
    }

    fn default_name(&self) -> &'static str {
        match self {
            ConstraintKind::Ik(_) => "IK",
            ConstraintKind::StretchTo(_) => "Stretch To",
            ConstraintKind::LockedTrack(_) => "Locked Track",
            ConstraintKind::TrackTo(_) => "Track To",
            ConstraintKind::Limit(l) => match l.channel {
                TransformChannel::Location => "Limit Location",
                TransformChannel::Rotation => "Limit Rotation",
                TransformChannel::Scale => "Limit Scale",
            },
        }
    }
}

/// A constraint on a pose joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: Uuid,
    pub name: String,
    /// 0.0..=1.0
    pub influence: f32,
    pub kind: ConstraintKind,
}

impl Constraint {
    /// Create a constraint with the host's default name for its type
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: kind.default_name().to_string(),
            influence: 1.0,
            kind,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_influence(mut self, influence: f32) -> Self {
        self.influence = influence.clamp(0.0, 1.0);
        self
    }

    pub fn is_ik(&self) -> bool {
        matches!(self.kind, ConstraintKind::Ik(_))
    }

    pub fn as_ik(&self) -> Option<&IkSettings> {
        match &self.kind {
            ConstraintKind::Ik(ik) => Some(ik),
            _ => None,
        }
    }

    /// Whether this constraint type has a target slot at all
    pub fn has_target_slot(&self) -> bool {
        !matches!(self.kind, ConstraintKind::Limit(_))
    }

    /// The primary target, if the type has one and it is set
    pub fn target(&self) -> Option<&TargetRef> {
        match &self.kind {
            ConstraintKind::Ik(s) => s.target.as_ref(),
            ConstraintKind::StretchTo(s) => s.target.as_ref(),
            ConstraintKind::LockedTrack(s) => s.target.as_ref(),
            ConstraintKind::TrackTo(s) => s.target.as_ref(),
            ConstraintKind::Limit(_) => None,
        }
    }
}
