//! Open dialog values

use rigkit_core::{IkSettings, LockedTrackSettings, Scene, StretchToSettings, TrackToSettings};

use crate::commands::assembly::{ParentJointDialog, invoke_parent_to_joint};
use crate::commands::constraints::{
    IkDialog, LockedTrackDialog, StretchToDialog, TrackToDialog, invoke_constraint,
};
use crate::commands::magnet::{MagnetDialog, MagnetSource, invoke_joint_magnet, invoke_mesh_magnet};
use crate::commands::picker::{PickerDialog, invoke_picker};
use crate::config::ToolConfig;
use crate::registry;
use crate::report::CommandError;

/// A dialog opened by a command's invoke step
///
/// Executing or cancelling consumes it.
#[derive(Debug, Clone)]
pub enum Dialog {
    Ik(IkDialog),
    StretchTo(StretchToDialog),
    LockedTrack(LockedTrackDialog),
    TrackTo(TrackToDialog),
    Magnet(MagnetDialog),
    Picker(PickerDialog),
    ParentToJoint(ParentJointDialog),
}

impl Dialog {
    /// Run the invoke step of `id`; `Ok(None)` for commands without a dialog
    pub fn invoke(
        id: &str,
        scene: &mut Scene,
        config: &ToolConfig,
    ) -> Result<Option<Self>, CommandError> {
        let dialog = match id {
            registry::ADD_IK => Dialog::Ik(invoke_constraint::<IkSettings>(scene, config)?),
            registry::ADD_STRETCH_TO => {
                Dialog::StretchTo(invoke_constraint::<StretchToSettings>(scene, config)?)
            }
            registry::ADD_LOCKED_TRACK => {
                Dialog::LockedTrack(invoke_constraint::<LockedTrackSettings>(scene, config)?)
            }
            registry::ADD_TRACK_TO => {
                Dialog::TrackTo(invoke_constraint::<TrackToSettings>(scene, config)?)
            }
            registry::MESH_JOINT_MAGNET => Dialog::Magnet(invoke_mesh_magnet(scene)?),
            registry::ARMATURE_JOINT_MAGNET => Dialog::Magnet(invoke_joint_magnet(scene)?),
            registry::VERTEX_JOINT_PICKER => Dialog::Picker(invoke_picker(scene)?),
            registry::PARENT_MESH_TO_JOINT => Dialog::ParentToJoint(invoke_parent_to_joint(scene)?),
            _ => return Ok(None),
        };
        Ok(Some(dialog))
    }

    pub fn command_id(&self) -> &'static str {
        match self {
            Dialog::Ik(_) => registry::ADD_IK,
            Dialog::StretchTo(_) => registry::ADD_STRETCH_TO,
            Dialog::LockedTrack(_) => registry::ADD_LOCKED_TRACK,
            Dialog::TrackTo(_) => registry::ADD_TRACK_TO,
            Dialog::Magnet(d) => match d.source {
                MagnetSource::MeshVertices(_) => registry::MESH_JOINT_MAGNET,
                MagnetSource::JointEndpoints => registry::ARMATURE_JOINT_MAGNET,
            },
            Dialog::Picker(_) => registry::VERTEX_JOINT_PICKER,
            Dialog::ParentToJoint(_) => registry::PARENT_MESH_TO_JOINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{arm_scene, select_joints};

    #[test]
    fn test_invoke_by_id() {
        let (mut scene, skeleton, [_, elbow, hand]) = arm_scene();
        let config = ToolConfig::default();
        select_joints(&mut scene, skeleton, &[elbow, hand]);

        let dialog = Dialog::invoke(registry::ADD_TRACK_TO, &mut scene, &config)
            .unwrap()
            .unwrap();
        assert_eq!(dialog.command_id(), registry::ADD_TRACK_TO);
        assert!(
            Dialog::invoke(registry::DOCTOR, &mut scene, &config)
                .unwrap()
                .is_none()
        );
        assert!(Dialog::invoke(registry::VERTEX_JOINT_PICKER, &mut scene, &config).is_err());
    }
}
