//! Global constants for rigkit-core

/// Below this length a projected vector is treated as degenerate
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Tolerance used when deciding whether an object transform is identity
pub const TRANSFORM_EPSILON: f32 = 1e-4;

/// Default vertex group weight when assigning vertices to a joint
pub const FULL_WEIGHT: f32 = 1.0;

/// Separator the host uses when it has to make a duplicate name unique
pub const DUPLICATE_NAME_SEPARATOR: char = '.';
