//! Propagate a joint's direction down its connected descendants

use std::collections::HashMap;

use rigkit_core::{ObjectKind, ObjectMode, Scene, Skeleton};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::report::{CommandError, CommandOutcome};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainAlignParams {
    pub copy_roll: bool,
    /// Use the selected joint's length instead of each joint's own
    pub copy_length: bool,
}

/// Connected descendants of `root`, parents before children
fn connected_descendants(skeleton: &Skeleton, root: Uuid) -> Vec<Uuid> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        for child in skeleton.children(id) {
            if skeleton.joint(child).is_some_and(|j| j.connected) {
                out.push(child);
                stack.push(child);
            }
        }
    }
    out
}

pub fn execute_chain_align(
    scene: &mut Scene,
    params: &ChainAlignParams,
) -> Result<CommandOutcome, CommandError> {
    let object = scene
        .active_object()
        .filter(|o| o.kind() == ObjectKind::Skeleton)
        .ok_or_else(|| {
            CommandError::precondition("Active object must be an armature in Edit Mode.")
        })?;
    if object.mode != ObjectMode::Edit {
        return Err(CommandError::precondition(
            "Operator must be run in Armature Edit Mode.",
        ));
    }
    let object = object.id;
    let skeleton = scene.skeleton_mut(object)?;
    let &[root] = skeleton.selected_joints().as_slice() else {
        return Err(CommandError::precondition(
            "Select exactly one bone in Edit Mode.",
        ));
    };
    let root_joint = skeleton.get_joint(root)?;
    let direction = root_joint.direction().ok_or(CommandError::ZeroLengthJoint)?;
    let root_length = root_joint.length();
    let root_roll = root_joint.roll;

    // Lengths must be read before any descendant moves
    let chain = connected_descendants(skeleton, root);
    let lengths: HashMap<Uuid, f32> = chain
        .iter()
        .filter_map(|id| skeleton.joint(*id).map(|j| (*id, j.length())))
        .collect();

    for id in &chain {
        let parent_tail = skeleton
            .get_joint(*id)?
            .parent
            .and_then(|p| skeleton.joint(p))
            .map(|p| p.tail);
        let Some(parent_tail) = parent_tail else {
            continue;
        };
        let length = if params.copy_length {
            root_length
        } else {
            lengths.get(id).copied().unwrap_or(root_length)
        };
        let joint = skeleton.get_joint_mut(*id)?;
        joint.head = parent_tail;
        joint.tail = parent_tail + direction * length;
        if params.copy_roll {
            joint.roll = root_roll;
        }
        debug!("Aligned {} (length {:.3})", joint.name, length);
    }

    let message = format!("Aligned {} connected bones", chain.len());
    info!("{}", message);
    Ok(CommandOutcome::with_info(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{arm_scene, select_joints};
    use approx::assert_relative_eq;
    use glam::Vec3;
    use rigkit_core::Joint;

    fn edit_arm() -> (Scene, Uuid, [Uuid; 3]) {
        let (mut scene, object, joints) = arm_scene();
        scene.get_object_mut(object).unwrap().mode = ObjectMode::Edit;
        select_joints(&mut scene, object, &joints[..1]);
        (scene, object, joints)
    }

    #[test]
    fn test_lengths_preserved() {
        let (mut scene, object, [_, elbow, hand]) = edit_arm();
        execute_chain_align(&mut scene, &ChainAlignParams::default()).unwrap();
        let skeleton = scene.skeleton(object).unwrap();
        let elbow = skeleton.joint(elbow).unwrap();
        let hand = skeleton.joint(hand).unwrap();
        assert_relative_eq!(elbow.head, Vec3::Y, epsilon = 1e-6);
        assert_relative_eq!(elbow.tail, Vec3::new(0.0, 3.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(hand.head, elbow.tail, epsilon = 1e-6);
        assert_relative_eq!(hand.length(), 0.5, epsilon = 1e-6);
        assert_relative_eq!(hand.direction().unwrap(), Vec3::Y, epsilon = 1e-6);
    }

    #[test]
    fn test_copy_length_and_roll() {
        let (mut scene, object, [shoulder, elbow, hand]) = edit_arm();
        scene.skeleton_mut(object).unwrap().get_joint_mut(shoulder).unwrap().roll = 0.4;
        let params = ChainAlignParams {
            copy_roll: true,
            copy_length: true,
        };
        execute_chain_align(&mut scene, &params).unwrap();
        let skeleton = scene.skeleton(object).unwrap();
        for id in [elbow, hand] {
            let j = skeleton.joint(id).unwrap();
            assert_relative_eq!(j.length(), 1.0, epsilon = 1e-6);
            assert_eq!(j.roll, 0.4);
        }
        assert_relative_eq!(
            skeleton.joint(hand).unwrap().tail,
            Vec3::new(0.0, 3.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_stops_at_unconnected_child() {
        let (mut scene, object, [shoulder, elbow, _]) = edit_arm();
        let twist = scene
            .skeleton_mut(object)
            .unwrap()
            .add_joint(
                Joint::builder("Twist")
                    .head(Vec3::new(5.0, 0.0, 0.0))
                    .tail(Vec3::new(6.0, 0.0, 0.0))
                    .parent(elbow)
                    .build(),
            )
            .unwrap();
        select_joints(&mut scene, object, &[shoulder]);
        execute_chain_align(&mut scene, &ChainAlignParams::default()).unwrap();
        let twist = scene.skeleton(object).unwrap().joint(twist).unwrap();
        assert_eq!(twist.head, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_preconditions() {
        let (mut scene, object, [shoulder, elbow, _]) = edit_arm();
        select_joints(&mut scene, object, &[shoulder, elbow]);
        assert_eq!(
            execute_chain_align(&mut scene, &ChainAlignParams::default())
                .unwrap_err()
                .to_string(),
            "Select exactly one bone in Edit Mode."
        );

        select_joints(&mut scene, object, &[shoulder]);
        scene.skeleton_mut(object).unwrap().get_joint_mut(shoulder).unwrap().tail = Vec3::ZERO;
        assert_eq!(
            execute_chain_align(&mut scene, &ChainAlignParams::default()).unwrap_err(),
            CommandError::ZeroLengthJoint
        );

        scene.get_object_mut(object).unwrap().mode = ObjectMode::Pose;
        assert_eq!(
            execute_chain_align(&mut scene, &ChainAlignParams::default())
                .unwrap_err()
                .to_string(),
            "Operator must be run in Armature Edit Mode."
        );
    }
}
