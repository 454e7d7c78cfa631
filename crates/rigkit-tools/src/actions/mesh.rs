//! Mesh and assembly action handlers

use crate::commands::assembly::{
    execute_add_joint_at_selection, execute_create_armature, execute_parent_to_nearest,
};
use crate::registry;
use crate::state::RigAction;

use super::ActionContext;

/// Handle mesh and assembly actions
pub fn handle_mesh_action(action: RigAction, ctx: &ActionContext) {
    match action {
        RigAction::CreateArmature(params) => {
            ctx.run(registry::CREATE_ARMATURE, |scene, _| {
                execute_create_armature(scene, &params)
            });
        }
        RigAction::AddJointAtSelection(params) => {
            ctx.run(registry::ADD_JOINT_AT_SELECTION, |scene, _| {
                execute_add_joint_at_selection(scene, &params)
            });
        }
        RigAction::ParentMeshesToNearest(params) => {
            ctx.run(registry::PARENT_MESHES_TO_NEAREST, |scene, _| {
                execute_parent_to_nearest(scene, &params)
            });
        }
        _ => {}
    }
}
