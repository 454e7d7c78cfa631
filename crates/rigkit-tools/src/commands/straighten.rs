//! Point selected joints along a world axis

use glam::Mat3;
use rigkit_core::{ObjectKind, ObjectMode, Scene, SignedAxis};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::active_in;
use crate::report::{CommandError, CommandOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StraightenParams {
    /// World-space direction
    pub axis: SignedAxis,
    /// Target length; 0 keeps each joint's current length
    pub length: f32,
}

impl Default for StraightenParams {
    fn default() -> Self {
        Self {
            axis: SignedAxis::POS_Y,
            length: 1.0,
        }
    }
}

pub fn execute_straighten(
    scene: &mut Scene,
    params: &StraightenParams,
) -> Result<CommandOutcome, CommandError> {
    let object = active_in(scene, ObjectKind::Skeleton, ObjectMode::Edit)
        .ok_or_else(|| CommandError::precondition("Must be in Edit Mode on an Armature"))?;
    let inverse = Mat3::from_mat4(scene.world_matrix(object)?).inverse();
    let direction = (inverse * params.axis.unit())
        .try_normalize()
        .ok_or_else(|| CommandError::precondition("Armature transform is degenerate"))?;

    let skeleton = scene.skeleton_mut(object)?;
    let selected = skeleton.selected_joints();
    if selected.is_empty() {
        return Err(CommandError::precondition("No editable bones selected"));
    }
    for id in &selected {
        let joint = skeleton.get_joint_mut(*id)?;
        let length = if params.length > 0.0 {
            params.length
        } else {
            joint.length()
        };
        joint.tail = joint.head + direction * length;
    }

    let message = format!(
        "Straightened {} bones along {}",
        selected.len(),
        params.axis.label()
    );
    info!("{}", message);
    Ok(CommandOutcome::with_info(message))
}
