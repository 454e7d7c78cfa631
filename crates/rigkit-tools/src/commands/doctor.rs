//! Rig auditor
//!
//! Runs a fixed sequence of cleanup passes over one skeleton and writes a
//! plain text report of the problems it can only point out. Pass order:
//! 1. apply the object's rotation/scale
//! 2. collect IK targets
//! 3. per joint: deform flags, then DEF / MCH / CTRL group moves
//! 4. symmetry suffix cleanup
//! 5. report

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rigkit_core::{ConstraintKind, ObjectKind, Scene, Skeleton};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::rename::Side;
use crate::config::{NamingConfig, ToolConfig};
use crate::report::{CommandError, CommandOutcome};

static SYMMETRY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[._](l|r|top|bot|fr|bk)$").expect("symmetry suffix pattern")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorParams {
    pub disable_deform_on_ik_targets: bool,
    pub disable_deform_on_unprefixed: bool,
    pub enable_deform_on_prefixed: bool,
    pub move_deform_to_group: bool,
    pub move_mechanism_to_group: bool,
    pub move_control_to_group: bool,
    pub clean_symmetry_names: bool,
    pub apply_transforms: bool,
    pub generate_report: bool,
}

impl Default for DoctorParams {
    fn default() -> Self {
        Self {
            disable_deform_on_ik_targets: true,
            disable_deform_on_unprefixed: true,
            enable_deform_on_prefixed: true,
            move_deform_to_group: true,
            move_mechanism_to_group: true,
            move_control_to_group: true,
            clean_symmetry_names: true,
            apply_transforms: true,
            generate_report: true,
        }
    }
}

/// Canonical spelling of a legacy symmetry suffix (`Arm_l` -> `Arm.L`)
pub fn clean_symmetry_name(name: &str) -> Option<String> {
    let captures = SYMMETRY_SUFFIX.captures(name)?;
    let whole = captures.get(0)?;
    let side = Side::from_suffix(captures.get(1)?.as_str())?;
    Some(side.apply(name[..whole.start()].to_string()))
}

/// Joints of `object` targeted by an IK constraint on the same skeleton
fn ik_targets(skeleton: &Skeleton, object: Uuid) -> HashSet<Uuid> {
    skeleton
        .joints()
        .flat_map(|j| j.constraints.iter())
        .filter_map(|c| c.as_ik())
        .filter_map(|ik| ik.target)
        .filter(|t| t.object == object)
        .filter_map(|t| t.joint)
        .collect()
}

fn fix_deform_and_groups(
    skeleton: &mut Skeleton,
    targets: &HashSet<Uuid>,
    naming: &NamingConfig,
    params: &DoctorParams,
) {
    let moves = [
        (params.move_deform_to_group, &naming.deform_prefix, &naming.deform_group),
        (
            params.move_mechanism_to_group,
            &naming.mechanism_prefix,
            &naming.mechanism_group,
        ),
        (
            params.move_control_to_group,
            &naming.control_prefix,
            &naming.control_group,
        ),
    ];
    for (enabled, _, group) in &moves {
        if *enabled {
            skeleton.groups.ensure(group);
        }
    }

    for id in skeleton.joint_ids() {
        let Some(joint) = skeleton.joint_mut(id) else {
            continue;
        };
        let prefixed = naming.is_deform(&joint.name);
        if params.disable_deform_on_ik_targets && targets.contains(&id) {
            joint.deform = false;
        }
        if params.disable_deform_on_unprefixed && !prefixed {
            joint.deform = false;
        }
        if params.enable_deform_on_prefixed && prefixed {
            joint.deform = true;
        }
        let name = joint.name.clone();
        for (enabled, prefix, group) in &moves {
            if *enabled && name.starts_with(prefix.as_str()) {
                skeleton.groups.assign_exclusive(id, group);
            }
        }
    }
}

fn clean_symmetry(skeleton: &mut Skeleton) -> Result<usize, CommandError> {
    let mut renamed = 0;
    for id in skeleton.joint_ids() {
        let name = skeleton.get_joint(id)?.name.clone();
        if let Some(clean) = clean_symmetry_name(&name)
            && clean != name
        {
            let applied = skeleton.rename_joint(id, &clean)?;
            debug!("Symmetry rename {} -> {}", name, applied);
            renamed += 1;
        }
    }
    Ok(renamed)
}

fn push_section(lines: &mut Vec<String>, title: &str, entries: &[String]) -> bool {
    if entries.is_empty() {
        return false;
    }
    lines.push(title.to_string());
    lines.extend(entries.iter().map(|e| format!("   - {e}")));
    lines.push(String::new());
    true
}

/// Report text lines for a skeleton object
pub fn build_report(
    skeleton: &Skeleton,
    object_name: &str,
    frame: i32,
    naming: &NamingConfig,
) -> Vec<String> {
    let mut lines = vec![
        format!("=== BONE DOCTOR REPORT: {object_name} ==="),
        format!("Generated: {frame}"),
        String::new(),
    ];

    let mut ik_no_target = Vec::new();
    let mut ik_no_pole = Vec::new();
    let mut ik_zero_chain = Vec::new();
    let mut missing_targets = Vec::new();
    for joint in skeleton.joints() {
        for constraint in &joint.constraints {
            match &constraint.kind {
                ConstraintKind::Ik(ik) => {
                    if ik.target.is_none() {
                        ik_no_target.push(joint.name.clone());
                    }
                    if ik.pole_target.is_none() {
                        ik_no_pole.push(joint.name.clone());
                    }
                    if ik.chain_count == 0 {
                        ik_zero_chain.push(joint.name.clone());
                    }
                }
                kind if constraint.has_target_slot() && constraint.target().is_none() => {
                    missing_targets.push(format!("{} ({})", joint.name, kind.type_name()));
                }
                _ => {}
            }
        }
    }

    let mut control_no_shape = Vec::new();
    let mut negative_scale = Vec::new();
    let mut unprefixed = Vec::new();
    let mut control_locks = Vec::new();
    let mut deform_locks = Vec::new();
    for joint in skeleton.joints() {
        let control = naming.is_control(&joint.name);
        if control && joint.pose.custom_shape.is_none() {
            control_no_shape.push(joint.name.clone());
        }
        if joint.pose.has_negative_scale() {
            negative_scale.push(joint.name.clone());
        }
        if !naming.is_organised(&joint.name) {
            unprefixed.push(joint.name.clone());
        }
        if joint.pose.locks.any() {
            if control {
                control_locks.push(joint.name.clone());
            }
            if naming.is_deform(&joint.name) {
                deform_locks.push(joint.name.clone());
            }
        }
    }

    let mut warnings = false;
    let sections = [
        ("- BONES WITH IK CONSTRAINTS WITH NO TARGETS:", &ik_no_target),
        ("- BONES WITH IK CONSTRAINTS AND NO POLE TARGETS:", &ik_no_pole),
        ("- BONES WITH IK CONSTRAINTS WITH 0 CHAIN LENGTH:", &ik_zero_chain),
        ("- BONES WITH OTHER MISSING CONSTRAINT TARGETS:", &missing_targets),
        ("- CTRL_/CTL_ BONES WITHOUT CUSTOM SHAPES:", &control_no_shape),
        ("- POSE BONES WITH NEGATIVE SCALE:", &negative_scale),
        ("- BONES THAT DO NOT START WITH DEF_, CTRL_, OR MCH_", &unprefixed),
        ("- CTRL_/CTL_ BONES WITH TRANSFORM LOCKS:", &control_locks),
        ("- DEF BONES WITH TRANSFORM LOCKS:", &deform_locks),
    ];
    for (title, entries) in sections {
        warnings |= push_section(&mut lines, title, entries);
    }

    let roots = skeleton.roots();
    if roots.len() > 1 {
        warnings = true;
        lines.push("- OTHER CHECKS:".into());
        lines.push("- ARMATURE DOES NOT HAVE A SINGLE ROOT BONE:".into());
        lines.push(format!("   Found {} root bones:", roots.len()));
        for id in &roots {
            lines.push(format!("   - {}", skeleton.joint_name(*id).unwrap_or_default()));
        }
        lines.push(String::new());
    }

    let default_group = naming.default_group.as_str();
    let all_in_default = skeleton.groups.get(default_group).is_some()
        && !skeleton.is_empty()
        && skeleton
            .joints()
            .all(|j| skeleton.groups.groups_of(j.id) == [default_group]);
    if all_in_default {
        warnings = true;
        if roots.len() <= 1 {
            lines.push("- OTHER CHECKS:".into());
        }
        lines.push(format!(
            "- ALL BONES ARE ASSIGNED TO DEFAULT '{}' COLLECTION:",
            default_group.to_uppercase()
        ));
        lines.push(
            "   Consider organizing bones into meaningful collections (DEF, CTRL, MCH, etc.)".into(),
        );
        lines.push(String::new());
    }

    if !warnings {
        lines.push("No warnings found! Armature looks good.".into());
    }
    lines
}

/// Run the enabled passes on the active skeleton
pub fn execute_doctor(
    scene: &mut Scene,
    config: &ToolConfig,
    params: &DoctorParams,
) -> Result<CommandOutcome, CommandError> {
    let object = scene
        .active_object()
        .filter(|o| o.kind() == ObjectKind::Skeleton)
        .map(|o| o.id)
        .ok_or_else(|| CommandError::precondition("Active object must be an armature"))?;

    let mut outcome = CommandOutcome::new();
    if params.apply_transforms
        && !scene
            .get_object(object)?
            .transform
            .has_identity_basis(config.tolerances.transform_identity)
    {
        scene.apply_rotation_scale(object)?;
        outcome.info("Applied armature rotation and scale");
    }

    let frame = scene.frame_current;
    let object_name = scene.get_object(object)?.name.clone();
    let naming = &config.naming;
    let skeleton = scene.skeleton_mut(object)?;
    let targets = ik_targets(skeleton, object);
    fix_deform_and_groups(skeleton, &targets, naming, params);
    if params.clean_symmetry_names {
        let renamed = clean_symmetry(skeleton)?;
        if renamed > 0 {
            outcome.info(format!("Cleaned {renamed} symmetry names"));
        }
    }

    if params.generate_report {
        let lines = build_report(skeleton, &object_name, frame, naming);
        let report_name = format!("{object_name}_Report");
        scene.write_text(report_name.clone(), lines.join("\n"));
        outcome.info(format!("Report saved to text block: {report_name}"));
    }
    info!("Bone doctor finished on {}", object_name);
    Ok(outcome)
}
