//! Action handling module
//!
//! Actions are queued in RigState and processed by the host after each
//! user interaction.

mod dialog;
mod mesh;
mod skeleton;

use rigkit_core::Scene;

use crate::config::ToolConfig;
use crate::report::{CommandError, CommandOutcome, ReportLevel};
use crate::state::{RigAction, SharedRigState};

pub use dialog::handle_dialog_action;
pub use mesh::handle_mesh_action;
pub use skeleton::handle_skeleton_action;

/// Context for action handlers
pub struct ActionContext<'a> {
    pub state: &'a SharedRigState,
}

impl<'a> ActionContext<'a> {
    pub fn new(state: &'a SharedRigState) -> Self {
        Self { state }
    }

    /// Run one command against the scene and record its reports
    fn run(
        &self,
        id: &str,
        command: impl FnOnce(&mut Scene, &ToolConfig) -> Result<CommandOutcome, CommandError>,
    ) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match command(&mut state.scene, &state.config) {
            Ok(outcome) => {
                tracing::info!("{} finished with {} report(s)", id, outcome.reports.len());
                state.reports.extend(outcome.reports);
            }
            Err(e) => {
                let report = e.report();
                match report.level {
                    ReportLevel::Error => tracing::error!("{} failed: {}", id, e),
                    _ => tracing::warn!("{} refused: {}", id, e),
                }
                state.reports.push(report);
            }
        }
    }
}

/// Dispatch an action to the appropriate handler
pub fn dispatch_action(action: RigAction, ctx: &ActionContext) {
    match action {
        // Dialog actions
        RigAction::Invoke(_) | RigAction::Execute(_) | RigAction::Cancel(_) => {
            handle_dialog_action(action, ctx);
        }

        // Skeleton actions
        RigAction::ChainRename(_)
        | RigAction::AlignToFace(_)
        | RigAction::AlignChain(_)
        | RigAction::Straighten(_)
        | RigAction::Doctor(_)
        | RigAction::CreateDriver(_) => {
            handle_skeleton_action(action, ctx);
        }

        // Mesh actions
        RigAction::CreateArmature(_)
        | RigAction::AddJointAtSelection(_)
        | RigAction::ParentMeshesToNearest(_) => {
            handle_mesh_action(action, ctx);
        }
    }
}

/// Drain the queue and dispatch every pending action in order
pub fn process_pending_actions(ctx: &ActionContext) {
    let actions = ctx.state.lock().take_pending_actions();
    for action in actions {
        dispatch_action(action, ctx);
    }
}
