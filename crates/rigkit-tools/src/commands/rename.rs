//! Chain rename

use rigkit_core::{ConstraintKind, ObjectKind, ObjectMode, Scene, TargetRef};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::active_in;
use crate::config::{NamingConfig, ToolConfig};
use crate::report::{CommandError, CommandOutcome};

/// Side suffix appended after a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
    Front,
    Back,
    None,
}

impl Side {
    pub const ALL: [Side; 7] = [
        Side::Left,
        Side::Right,
        Side::Top,
        Side::Bottom,
        Side::Front,
        Side::Back,
        Side::None,
    ];

    /// Canonical suffix text, `None` for no suffix
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Side::Left => Some("L"),
            Side::Right => Some("R"),
            Side::Top => Some("Top"),
            Side::Bottom => Some("Bot"),
            Side::Front => Some("Fr"),
            Side::Back => Some("Bk"),
            Side::None => None,
        }
    }

    /// Parse a suffix in any casing
    pub fn from_suffix(text: &str) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|s| s.suffix().is_some_and(|t| t.eq_ignore_ascii_case(text)))
    }

    /// `name` with `.{suffix}` appended
    pub fn apply(&self, name: String) -> String {
        match self.suffix() {
            Some(suffix) => format!("{name}.{suffix}"),
            None => name,
        }
    }
}

/// Naming convention prefix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointRole {
    #[default]
    Deform,
    Control,
    Mechanism,
    None,
}

impl JointRole {
    pub fn prefix<'a>(&self, naming: &'a NamingConfig) -> &'a str {
        match self {
            JointRole::Deform => &naming.deform_prefix,
            JointRole::Control => &naming.control_prefix,
            JointRole::Mechanism => &naming.mechanism_prefix,
            JointRole::None => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRenameParams {
    pub base_name: String,
    pub side: Side,
    pub role: JointRole,
    /// Also rename IK targets and poles of renamed joints
    pub rename_ik_targets: bool,
}

impl Default for ChainRenameParams {
    fn default() -> Self {
        Self {
            base_name: "Bone".into(),
            side: Side::Left,
            role: JointRole::Deform,
            rename_ik_targets: false,
        }
    }
}

/// Name of the `index`-th (0-based) joint of a renamed chain
pub fn chain_joint_name(params: &ChainRenameParams, naming: &NamingConfig, index: usize) -> String {
    let name = format!(
        "{}{}{:02}",
        params.role.prefix(naming),
        params.base_name,
        index + 1
    );
    params.side.apply(name)
}

/// Sort joints root-ward first and check each one's parent is its predecessor
pub fn order_lineage(scene: &Scene, object: Uuid, joints: &[Uuid]) -> Result<Vec<Uuid>, CommandError> {
    let skeleton = scene.skeleton(object)?;
    let mut ordered = joints.to_vec();
    ordered.sort_by_key(|id| skeleton.depth(*id).unwrap_or(usize::MAX));
    for pair in ordered.windows(2) {
        let parent = skeleton.get_joint(pair[1])?.parent;
        if parent != Some(pair[0]) {
            return Err(CommandError::NotALineage);
        }
    }
    Ok(ordered)
}

/// Rename the selected chain `{prefix}{base}{NN}.{side}` in root-to-tip order
pub fn execute_chain_rename(
    scene: &mut Scene,
    config: &ToolConfig,
    params: &ChainRenameParams,
) -> Result<CommandOutcome, CommandError> {
    let object = active_in(scene, ObjectKind::Skeleton, ObjectMode::Edit)
        .or_else(|| active_in(scene, ObjectKind::Skeleton, ObjectMode::Pose))
        .ok_or_else(|| CommandError::precondition("No bones selected"))?;
    let selected = scene.skeleton(object)?.selected_joints();
    if selected.is_empty() {
        return Err(CommandError::precondition("No bones selected"));
    }
    let ordered = order_lineage(scene, object, &selected)?;

    let naming = &config.naming;
    let mut outcome = CommandOutcome::new();
    let mut ik_renames = Vec::new();
    {
        let skeleton = scene.skeleton_mut(object)?;
        for (i, id) in ordered.iter().enumerate() {
            let name = chain_joint_name(params, naming, i);
            let applied = skeleton.rename_joint(*id, &name)?;
            debug!("Renamed chain joint to {}", applied);
            if params.rename_ik_targets
                && let Some(ConstraintKind::Ik(ik)) =
                    skeleton.get_joint(*id)?.ik_constraint().map(|c| &c.kind)
            {
                ik_renames.push((ik.target, ik.pole_target));
            }
        }
    }

    for (target, pole) in ik_renames {
        let control = match params.role {
            JointRole::None => "",
            _ => naming.control_prefix.as_str(),
        };
        let ik_name = params
            .side
            .apply(format!("{control}{}{}", params.base_name, naming.ik_suffix));
        let pole_name = params
            .side
            .apply(format!("{control}{}{}", params.base_name, naming.ik_pole_suffix));
        rename_target(scene, target, &ik_name, "Target", &mut outcome)?;
        rename_target(scene, pole, &pole_name, "Pole Target", &mut outcome)?;
    }

    let message = format!("Renamed {} bones.", ordered.len());
    info!("{}", message);
    outcome.info(message);
    Ok(outcome)
}

/// Best-effort rename of an IK target; non-joint targets only produce a report
fn rename_target(
    scene: &mut Scene,
    target: Option<TargetRef>,
    name: &str,
    label: &str,
    outcome: &mut CommandOutcome,
) -> Result<(), CommandError> {
    let Some(target) = target else {
        return Ok(());
    };
    let Some(object) = scene.object_mut(target.object) else {
        return Ok(());
    };
    let object_name = object.name.clone();
    match (object.as_skeleton_mut(), target.joint) {
        (Some(skeleton), Some(joint)) if skeleton.contains(joint) => {
            skeleton.rename_joint(joint, name)?;
        }
        _ => outcome.info(format!(
            "Non-Bone {label} '{object_name}' was not Renamed"
        )),
    }
    Ok(())
}
