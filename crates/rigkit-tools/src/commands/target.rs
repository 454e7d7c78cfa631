//! Target inference from the pose selection

use rigkit_core::{ObjectKind, ObjectMode, Scene, TargetRef};
use uuid::Uuid;

use super::active_in;
use crate::report::CommandError;

/// Target choices carried from a dialog to its command
///
/// Built fresh by every invoke and consumed by execute or cancel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetPick {
    pub target: Option<TargetRef>,
    /// Pole target for IK, custom space reference for track-to
    pub secondary: Option<TargetRef>,
}

impl TargetPick {
    pub fn with_target(mut self, target: TargetRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_secondary(mut self, secondary: TargetRef) -> Self {
        self.secondary = Some(secondary);
        self
    }
}

/// Selected pose joints of the active skeleton, or nothing
pub(crate) fn pose_selection(scene: &Scene) -> Option<(Uuid, Vec<Uuid>)> {
    let object = active_in(scene, ObjectKind::Skeleton, ObjectMode::Pose)?;
    let skeleton = scene.skeleton(object).ok()?;
    Some((object, skeleton.selected_joints()))
}

/// Infer the default target from one or two selected pose joints
///
/// With two selected, the one that is not active becomes the target.
pub fn resolve_target_pick(scene: &Scene) -> Result<TargetPick, CommandError> {
    let (object, selected) = pose_selection(scene).unwrap_or_default();
    match selected.len() {
        1 => Ok(TargetPick::default()),
        2 => {
            let active = scene.skeleton(object)?.active;
            let target = selected.iter().copied().find(|id| Some(*id) != active);
            Ok(TargetPick {
                target: target.map(|joint| TargetRef::joint(object, joint)),
                secondary: None,
            })
        }
        _ => Err(CommandError::precondition(
            "Select one or two pose bones to use this operator.",
        )),
    }
}
