//! Constraint-adding commands (IK, stretch-to, locked-track, track-to)

use rigkit_core::{
    Constraint, ConstraintKind, ConstraintSpace, IkSettings, LockedTrackSettings, Scene,
    StretchToSettings, TrackToSettings,
};
use tracing::info;

use super::target::{TargetPick, pose_selection, resolve_target_pick};
use crate::config::ToolConfig;
use crate::report::{CommandError, CommandOutcome};

/// Settings type a constraint dialog edits
pub trait ConstraintTemplate: Clone + std::fmt::Debug {
    /// Human readable constraint name for reports
    const LABEL: &'static str;

    /// Dialog defaults; `active_has_parent` describes the active joint
    fn dialog_defaults(config: &ToolConfig, active_has_parent: bool) -> Self;

    /// Combine the settings with the picked targets
    fn into_kind(self, pick: TargetPick) -> ConstraintKind;
}

impl ConstraintTemplate for IkSettings {
    const LABEL: &'static str = "IK";

    fn dialog_defaults(config: &ToolConfig, active_has_parent: bool) -> Self {
        Self {
            chain_count: if active_has_parent {
                1
            } else {
                config.defaults.ik_chain_length
            },
            iterations: config.defaults.ik_iterations,
            use_stretch: false,
            ..Default::default()
        }
    }

    fn into_kind(mut self, pick: TargetPick) -> ConstraintKind {
        self.target = pick.target;
        self.pole_target = pick.secondary;
        ConstraintKind::Ik(self)
    }
}

impl ConstraintTemplate for StretchToSettings {
    const LABEL: &'static str = "Stretch To";

    fn dialog_defaults(_config: &ToolConfig, _active_has_parent: bool) -> Self {
        Self::default()
    }

    fn into_kind(mut self, pick: TargetPick) -> ConstraintKind {
        self.target = pick.target;
        ConstraintKind::StretchTo(self)
    }
}

impl ConstraintTemplate for LockedTrackSettings {
    const LABEL: &'static str = "Locked Track";

    fn dialog_defaults(_config: &ToolConfig, _active_has_parent: bool) -> Self {
        Self::default()
    }

    fn into_kind(mut self, pick: TargetPick) -> ConstraintKind {
        self.target = pick.target;
        ConstraintKind::LockedTrack(self)
    }
}

impl ConstraintTemplate for TrackToSettings {
    const LABEL: &'static str = "Track To";

    fn dialog_defaults(_config: &ToolConfig, _active_has_parent: bool) -> Self {
        Self::default()
    }

    fn into_kind(mut self, pick: TargetPick) -> ConstraintKind {
        self.target = pick.target;
        let custom = self.target_space == ConstraintSpace::Custom
            || self.owner_space == ConstraintSpace::Custom;
        self.space_target = if custom { pick.secondary } else { None };
        ConstraintKind::TrackTo(self)
    }
}

/// Dialog value of a constraint-adding command
#[derive(Debug, Clone)]
pub struct ConstraintDialog<S> {
    pub settings: S,
    /// 0.0..=1.0
    pub influence: f32,
    pub pick: TargetPick,
}

pub type IkDialog = ConstraintDialog<IkSettings>;
pub type StretchToDialog = ConstraintDialog<StretchToSettings>;
pub type LockedTrackDialog = ConstraintDialog<LockedTrackSettings>;
pub type TrackToDialog = ConstraintDialog<TrackToSettings>;

/// Open the dialog: resolve the target from the selection and fill defaults
pub fn invoke_constraint<S: ConstraintTemplate>(
    scene: &Scene,
    config: &ToolConfig,
) -> Result<ConstraintDialog<S>, CommandError> {
    let pick = resolve_target_pick(scene)?;
    let active_has_parent = pose_selection(scene)
        .and_then(|(object, _)| scene.skeleton(object).ok())
        .and_then(|s| s.active_joint())
        .is_some_and(|j| j.parent.is_some());
    Ok(ConstraintDialog {
        settings: S::dialog_defaults(config, active_has_parent),
        influence: 1.0,
        pick,
    })
}

/// Add one constraint built from the dialog to the active pose joint
pub fn execute_constraint<S: ConstraintTemplate>(
    scene: &mut Scene,
    dialog: ConstraintDialog<S>,
) -> Result<CommandOutcome, CommandError> {
    let (object, selected) = pose_selection(scene)
        .ok_or_else(|| CommandError::precondition("Active object is not an armature."))?;
    let skeleton = scene.skeleton_mut(object)?;
    let active = skeleton
        .active
        .filter(|id| skeleton.contains(*id))
        .filter(|_| !selected.is_empty())
        .ok_or_else(|| CommandError::precondition("No pose bones selected."))?;

    let ConstraintDialog {
        settings,
        influence,
        pick,
    } = dialog;
    let constraint = Constraint::new(settings.into_kind(pick)).with_influence(influence);
    let joint = skeleton.get_joint_mut(active)?;
    joint.constraints.push(constraint);

    let message = format!("Added {} constraint to {}", S::LABEL, joint.name);
    info!("{}", message);
    Ok(CommandOutcome::with_info(message))
}

/// Dismiss the dialog without changing anything
pub fn cancel_constraint<S: ConstraintTemplate>(dialog: ConstraintDialog<S>) {
    tracing::debug!("{} dialog cancelled", S::LABEL);
    drop(dialog);
}
