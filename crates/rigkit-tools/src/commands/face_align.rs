//! Align the active joint with the normal of selected mesh faces
//!
//! Everything is computed in skeleton space: the face centroid and normal
//! are carried out of mesh space through world space, so the joint keeps
//! its stored length whatever the object scales are. The roll can
//! optionally be set from the mesh's active edge, and other selected
//! joints follow the active one through the rotation between its old and
//! new rest frames.

use std::f32::consts::PI;

use glam::{Mat3, Vec3};
use rigkit_core::math::{change_of_basis, joint_basis, roll_aligning_x, roll_aligning_z};
use rigkit_core::{ObjectKind, ObjectMode, Scene};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ToolConfig;
use crate::report::{CommandError, CommandOutcome};

/// Joint axis laid along the active edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeAxis {
    #[default]
    X,
    Z,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAlignParams {
    pub flip_direction: bool,
    pub move_to_face: bool,
    pub align_to_edge: bool,
    pub edge_axis: EdgeAxis,
    pub flip_roll: bool,
    /// Carry the other selected joints along with the active one
    pub move_selected: bool,
}

impl Default for FaceAlignParams {
    fn default() -> Self {
        Self {
            flip_direction: false,
            move_to_face: true,
            align_to_edge: false,
            edge_axis: EdgeAxis::X,
            flip_roll: false,
            move_selected: true,
        }
    }
}

/// Selected skeleton (edit mode) and mesh (object mode)
fn resolve_objects(scene: &Scene) -> Result<(Uuid, Uuid), CommandError> {
    let selected = scene.selected_objects();
    let skeletons = scene.selected_of_kind(ObjectKind::Skeleton);
    let meshes = scene.selected_of_kind(ObjectKind::Mesh);
    let (&[skeleton], &[mesh], 2) = (skeletons.as_slice(), meshes.as_slice(), selected.len())
    else {
        return Err(CommandError::precondition(
            "Select exactly one armature and one mesh object.",
        ));
    };
    if scene.get_object(skeleton)?.mode != ObjectMode::Edit {
        return Err(CommandError::precondition("Armature must be in Edit Mode."));
    }
    if scene.get_object(mesh)?.mode != ObjectMode::Object {
        return Err(CommandError::precondition("Mesh must be in Object Mode."));
    }
    Ok((skeleton, mesh))
}

/// Pose the active joint on the selected faces
pub fn execute_face_align(
    scene: &mut Scene,
    config: &ToolConfig,
    params: &FaceAlignParams,
) -> Result<CommandOutcome, CommandError> {
    let (skeleton_id, mesh_id) = resolve_objects(scene)?;
    let mesh_object = scene.get_object(mesh_id)?;
    let mesh = scene.mesh(mesh_id)?;
    if !mesh.has_selected_faces() {
        return Err(CommandError::precondition(format!(
            "No selected face found on mesh '{}'.",
            mesh_object.name
        )));
    }
    let summary = mesh
        .selected_faces_summary()
        .ok_or(CommandError::ZeroAreaSelection)?;

    let skeleton = scene.skeleton(skeleton_id)?;
    let active = skeleton.active_joint().ok_or_else(|| {
        CommandError::precondition(format!(
            "No active bone in armature '{}'.",
            scene.object_name(skeleton_id).unwrap_or_default()
        ))
    })?;
    let initial_frame = active.basis().ok_or(CommandError::ZeroLengthJoint)?;
    let active_id = active.id;
    let old_head = active.head;
    let length = active.length();

    // mesh space -> skeleton space
    let mesh_world = scene.world_matrix(mesh_id)?;
    let to_skeleton = scene.world_matrix(skeleton_id)?.inverse() * mesh_world;
    let linear = Mat3::from_mat4(to_skeleton);
    let normal_linear = linear.inverse().transpose();

    let centroid = to_skeleton.transform_point3(summary.centroid);
    let mut direction = (normal_linear * summary.normal)
        .try_normalize()
        .ok_or(CommandError::ZeroAreaSelection)?;
    if params.flip_direction {
        direction = -direction;
    }

    let head = if params.move_to_face { centroid } else { old_head };
    let tail = head + direction * length;
    let mut roll = active.roll;
    if params.align_to_edge
        && let Some(edge) = mesh.active_edge_vector()
    {
        let edge = linear * edge;
        let projected = edge - direction * edge.dot(direction);
        if projected.length() < config.tolerances.degenerate {
            debug!("Active edge is parallel to the joint, keeping roll");
        } else {
            let projected = projected.normalize();
            let aligned = match params.edge_axis {
                EdgeAxis::X => roll_aligning_x(direction, -projected),
                EdgeAxis::Z => roll_aligning_x(direction, -direction.cross(projected)),
            };
            if let Some(aligned) = aligned {
                roll = aligned;
                if params.flip_roll {
                    roll += PI;
                }
            }
        }
    }

    let final_frame = joint_basis(head, tail, roll).ok_or(CommandError::ZeroLengthJoint)?;
    let rotation = change_of_basis(initial_frame, final_frame);

    let others: Vec<Uuid> = if params.move_selected {
        skeleton
            .selected_joints()
            .into_iter()
            .filter(|id| *id != active_id)
            .collect()
    } else {
        Vec::new()
    };

    let skeleton = scene.skeleton_mut(skeleton_id)?;
    for id in &others {
        let joint = skeleton.get_joint_mut(*id)?;
        let old_z = joint.z_axis();
        joint.head = head + rotation * (joint.head - old_head);
        joint.tail = head + rotation * (joint.tail - old_head);
        if let Some(z) = old_z
            && let Some(direction) = joint.direction()
            && let Some(new_roll) = roll_aligning_z(direction, rotation * z)
        {
            joint.roll = new_roll;
        }
    }
    let joint = skeleton.get_joint_mut(active_id)?;
    joint.head = head;
    joint.tail = tail;
    joint.roll = roll;

    let message = format!(
        "Aligned {} to face normal ({} other bones moved)",
        joint.name,
        others.len()
    );
    info!("{}", message);
    Ok(CommandOutcome::with_info(message))
}
