//! Dialog action handlers

use crate::commands::assembly::{cancel_parent_to_joint, execute_parent_to_joint};
use crate::commands::constraints::{cancel_constraint, execute_constraint};
use crate::commands::magnet::{cancel_magnet, execute_magnet};
use crate::commands::picker::{cancel_picker, execute_picker};
use crate::state::{Dialog, RigAction};

use super::ActionContext;

/// Handle dialog actions
pub fn handle_dialog_action(action: RigAction, ctx: &ActionContext) {
    match action {
        RigAction::Invoke(id) => handle_invoke(id, ctx),
        RigAction::Execute(dialog) => handle_execute(dialog, ctx),
        RigAction::Cancel(dialog) => handle_cancel(dialog, ctx),
        _ => {}
    }
}

fn handle_invoke(id: &'static str, ctx: &ActionContext) {
    // Only one dialog is open at a time
    let previous = ctx.state.lock().open_dialog.take();
    if let Some(previous) = previous {
        tracing::debug!("Closing {} to open {}", previous.command_id(), id);
        handle_cancel(previous, ctx);
    }

    let mut guard = ctx.state.lock();
    let state = &mut *guard;
    match Dialog::invoke(id, &mut state.scene, &state.config) {
        Ok(Some(dialog)) => {
            tracing::debug!("Opened dialog for {}", id);
            state.open_dialog = Some(dialog);
        }
        Ok(None) => tracing::warn!("{} has no dialog", id),
        Err(e) => {
            tracing::error!("{} failed: {}", id, e);
            state.reports.push(e.report());
        }
    }
}

fn handle_execute(dialog: Dialog, ctx: &ActionContext) {
    ctx.state.lock().open_dialog = None;
    let id = dialog.command_id();
    ctx.run(id, move |scene, _config| match dialog {
        Dialog::Ik(d) => execute_constraint(scene, d),
        Dialog::StretchTo(d) => execute_constraint(scene, d),
        Dialog::LockedTrack(d) => execute_constraint(scene, d),
        Dialog::TrackTo(d) => execute_constraint(scene, d),
        Dialog::Magnet(d) => execute_magnet(scene, d),
        Dialog::Picker(d) => execute_picker(scene, d),
        Dialog::ParentToJoint(d) => execute_parent_to_joint(scene, d),
    });
}

fn handle_cancel(dialog: Dialog, ctx: &ActionContext) {
    tracing::debug!("Cancelled {}", dialog.command_id());
    let mut state = ctx.state.lock();
    state.open_dialog = None;
    let scene = &mut state.scene;
    match dialog {
        Dialog::Ik(d) => cancel_constraint(d),
        Dialog::StretchTo(d) => cancel_constraint(d),
        Dialog::LockedTrack(d) => cancel_constraint(d),
        Dialog::TrackTo(d) => cancel_constraint(d),
        Dialog::Magnet(d) => cancel_magnet(scene, d),
        Dialog::Picker(d) => cancel_picker(scene, d),
        Dialog::ParentToJoint(d) => cancel_parent_to_joint(scene, d),
    }
}
