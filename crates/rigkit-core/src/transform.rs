//! Object transforms and axis enumerations shared by constraints and drivers

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Decomposed local transform of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Transform with only a translation component
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Decompose an affine matrix (shear is discarded)
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// True when rotation and scale are identity within `epsilon`
    pub fn has_identity_basis(&self, epsilon: f32) -> bool {
        let scale_ok = (self.scale - Vec3::ONE).abs().max_element() < epsilon;
        // 2*|xyz| ~ rotation angle near identity
        let rotation_ok = 2.0 * self.rotation.xyz().length() < epsilon;
        scale_ok && rotation_ok
    }
}

/// A principal axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// A principal axis with a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedAxis {
    pub axis: Axis,
    pub negative: bool,
}

impl SignedAxis {
    pub const POS_X: Self = Self::positive(Axis::X);
    pub const POS_Y: Self = Self::positive(Axis::Y);
    pub const POS_Z: Self = Self::positive(Axis::Z);
    pub const NEG_X: Self = Self::negative(Axis::X);
    pub const NEG_Y: Self = Self::negative(Axis::Y);
    pub const NEG_Z: Self = Self::negative(Axis::Z);

    pub const fn positive(axis: Axis) -> Self {
        Self {
            axis,
            negative: false,
        }
    }

    pub const fn negative(axis: Axis) -> Self {
        Self {
            axis,
            negative: true,
        }
    }

    pub fn unit(self) -> Vec3 {
        if self.negative {
            -self.axis.unit()
        } else {
            self.axis.unit()
        }
    }

    pub fn label(self) -> String {
        format!("{}{}", if self.negative { "-" } else { "+" }, self.axis.label())
    }
}

/// Which transform channel of a pose joint is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransformChannel {
    #[default]
    Location,
    Rotation,
    Scale,
}

impl TransformChannel {
    /// Host identifier prefix for a driver transform variable
    pub fn driver_prefix(self) -> &'static str {
        match self {
            TransformChannel::Location => "LOC",
            TransformChannel::Rotation => "ROT",
            TransformChannel::Scale => "SCALE",
        }
    }
}
