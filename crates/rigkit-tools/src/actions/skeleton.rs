//! Skeleton action handlers

use crate::commands::chain_align::execute_chain_align;
use crate::commands::doctor::execute_doctor;
use crate::commands::driver::execute_create_driver;
use crate::commands::face_align::execute_face_align;
use crate::commands::rename::execute_chain_rename;
use crate::commands::straighten::execute_straighten;
use crate::registry;
use crate::state::RigAction;

use super::ActionContext;

/// Handle skeleton editing actions
pub fn handle_skeleton_action(action: RigAction, ctx: &ActionContext) {
    match action {
        RigAction::ChainRename(params) => {
            ctx.run(registry::CHAIN_RENAME, |scene, config| {
                execute_chain_rename(scene, config, &params)
            });
        }
        RigAction::AlignToFace(params) => {
            ctx.run(registry::ALIGN_TO_FACE, |scene, config| {
                execute_face_align(scene, config, &params)
            });
        }
        RigAction::AlignChain(params) => {
            ctx.run(registry::ALIGN_CHAIN, |scene, _| {
                execute_chain_align(scene, &params)
            });
        }
        RigAction::Straighten(params) => {
            ctx.run(registry::STRAIGHTEN, |scene, _| execute_straighten(scene, &params));
        }
        RigAction::Doctor(params) => {
            ctx.run(registry::DOCTOR, |scene, config| {
                execute_doctor(scene, config, &params)
            });
        }
        RigAction::CreateDriver(params) => {
            ctx.run(registry::SHAPE_KEY_DRIVER, |scene, config| {
                execute_create_driver(scene, config, &params)
            });
        }
        _ => {}
    }
}
