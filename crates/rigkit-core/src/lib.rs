//! Rig Authoring Core Data Structures
//!
//! This crate contains the scene model the rig editing tools operate on:
//! - Scene: objects, selection, interaction modes and world transforms
//! - Skeleton: joint tree with groups, pose state and constraints
//! - Mesh: vertices, faces, vertex groups and shape keys
//! - Math: bone frames, roll alignment and area-weighted face queries

pub mod constants;
pub mod constraint;
pub mod driver;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod skeleton;
pub mod transform;

pub use constants::*;
pub use constraint::*;
pub use driver::*;
pub use mesh::*;
pub use scene::*;
pub use skeleton::*;
pub use transform::*;
