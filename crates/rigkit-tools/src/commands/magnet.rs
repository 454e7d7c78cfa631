//! Joint magnets: snap a joint endpoint onto selected geometry

use glam::Vec3;
use rigkit_core::math::average;
use rigkit_core::{JointEnd, ObjectKind, ObjectMode, Scene};
use tracing::{debug, info};
use uuid::Uuid;

use super::{DisplayOverride, active_in, parent_skeleton};
use crate::report::{CommandError, CommandOutcome};

/// What the endpoint is snapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnetSource {
    /// Selected vertices of a mesh parented to the skeleton
    MeshVertices(Uuid),
    /// Selected joint endpoints of the skeleton itself
    JointEndpoints,
}

/// One joint endpoint offered in the dialog
#[derive(Debug, Clone, PartialEq)]
pub struct MagnetCandidate {
    pub joint: Uuid,
    pub end: JointEnd,
    pub distance: f32,
    pub label: String,
    pub description: String,
}

/// Dialog value of the magnet commands
#[derive(Debug, Clone)]
pub struct MagnetDialog {
    pub source: MagnetSource,
    pub skeleton: Uuid,
    /// Closest first
    pub candidates: Vec<MagnetCandidate>,
    /// Index into `candidates`
    pub choice: usize,
    pub move_tail_with_head: bool,
    display: DisplayOverride,
}

impl MagnetDialog {
    pub fn chosen(&self) -> Option<&MagnetCandidate> {
        self.candidates.get(self.choice)
    }
}

fn selected_vertex_centroid(scene: &Scene, mesh: Uuid) -> Result<Vec3, CommandError> {
    let centroid = scene
        .mesh(mesh)?
        .selected_centroid()
        .ok_or_else(|| CommandError::precondition("No selected vertices."))?;
    Ok(scene.world_point(mesh, centroid)?)
}

fn selected_endpoint_centroid(scene: &Scene, skeleton: Uuid) -> Result<Vec3, CommandError> {
    let points = scene.skeleton(skeleton)?.joints().flat_map(|j| {
        let head = j.selection.head.then_some(j.head);
        let tail = j.selection.tail.then_some(j.tail);
        head.into_iter().chain(tail)
    });
    let centroid = average(points)
        .ok_or_else(|| CommandError::precondition("No bone joints selected."))?;
    Ok(scene.world_point(skeleton, centroid)?)
}

fn source_centroid(
    scene: &Scene,
    source: MagnetSource,
    skeleton: Uuid,
) -> Result<Vec3, CommandError> {
    match source {
        MagnetSource::MeshVertices(mesh) => selected_vertex_centroid(scene, mesh),
        MagnetSource::JointEndpoints => selected_endpoint_centroid(scene, skeleton),
    }
}

/// Every joint endpoint sorted by world distance to `centroid`
fn rank_candidates(
    scene: &Scene,
    skeleton: Uuid,
    centroid: Vec3,
    skip_selected: bool,
) -> Result<Vec<MagnetCandidate>, CommandError> {
    let world = scene.world_matrix(skeleton)?;
    let mut candidates = Vec::new();
    for joint in scene.skeleton(skeleton)?.joints() {
        if skip_selected && joint.is_selected() {
            continue;
        }
        for end in [JointEnd::Head, JointEnd::Tail] {
            let distance = world.transform_point3(joint.endpoint(end)).distance(centroid);
            if skip_selected && distance <= f32::EPSILON {
                continue;
            }
            candidates.push(MagnetCandidate {
                joint: joint.id,
                end,
                distance,
                label: format!("{} >>> {}", joint.name, end.label()),
                description: format!("Distance: {distance:.2}"),
            });
        }
    }
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    Ok(candidates)
}

fn open_dialog(
    scene: &mut Scene,
    source: MagnetSource,
    skeleton: Uuid,
) -> Result<MagnetDialog, CommandError> {
    let centroid = source_centroid(scene, source, skeleton)?;
    let skip_selected = source == MagnetSource::JointEndpoints;
    let candidates = rank_candidates(scene, skeleton, centroid, skip_selected)?;
    let display = DisplayOverride::force(scene, skeleton, |d| {
        d.show_names = true;
        d.in_front = true;
    })?;
    debug!("Magnet centroid {:?}, {} candidates", centroid, candidates.len());
    Ok(MagnetDialog {
        source,
        skeleton,
        candidates,
        choice: 0,
        move_tail_with_head: false,
        display,
    })
}

/// Mesh edit mode: offer joints of the parent skeleton around the selected vertices
pub fn invoke_mesh_magnet(scene: &mut Scene) -> Result<MagnetDialog, CommandError> {
    let mesh = active_in(scene, ObjectKind::Mesh, ObjectMode::Edit)
        .ok_or_else(|| CommandError::precondition("Not in mesh edit mode."))?;
    let skeleton = parent_skeleton(scene, mesh)
        .ok_or_else(|| CommandError::precondition("Mesh must have an armature parent."))?;
    open_dialog(scene, MagnetSource::MeshVertices(mesh), skeleton)
}

/// Skeleton edit mode: offer unselected joints around the selected endpoints
pub fn invoke_joint_magnet(scene: &mut Scene) -> Result<MagnetDialog, CommandError> {
    let skeleton = active_in(scene, ObjectKind::Skeleton, ObjectMode::Edit)
        .ok_or_else(|| CommandError::precondition("Not in armature edit mode."))?;
    open_dialog(scene, MagnetSource::JointEndpoints, skeleton)
}

/// Move the chosen endpoint onto the current centroid
pub fn execute_magnet(scene: &mut Scene, dialog: MagnetDialog) -> Result<CommandOutcome, CommandError> {
    dialog.display.restore(scene);
    let candidate = dialog
        .chosen()
        .ok_or_else(|| CommandError::precondition("No bone selected."))?;
    let centroid = source_centroid(scene, dialog.source, dialog.skeleton)?;
    let local = scene.local_point(dialog.skeleton, centroid)?;

    let skeleton = scene.skeleton_mut(dialog.skeleton)?;
    let joint = skeleton.get_joint_mut(candidate.joint)?;
    let tail_moved = match candidate.end {
        JointEnd::Head => {
            let delta = local - joint.head;
            joint.head = local;
            // the head no longer sits on the parent's tail
            if joint.connected {
                debug!("Disconnecting {} from its parent", joint.name);
                joint.connected = false;
            }
            if dialog.move_tail_with_head {
                joint.tail += delta;
            }
            dialog.move_tail_with_head
        }
        JointEnd::Tail => {
            joint.tail = local;
            true
        }
    };
    if tail_moved {
        let tail = joint.tail;
        for child in skeleton.children(candidate.joint) {
            let child = skeleton.get_joint_mut(child)?;
            if child.connected {
                child.head = tail;
            }
        }
    }

    let message = format!("Moved {} to selection", candidate.label);
    info!("{}", message);
    Ok(CommandOutcome::with_info(message))
}

pub fn cancel_magnet(scene: &mut Scene, dialog: MagnetDialog) {
    dialog.display.restore(scene);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{add_quad_mesh, arm_scene};
    use approx::assert_relative_eq;
    use rigkit_core::{ParentRelation, Transform};

    /// Arm in edit mode with a mesh parented to it, mesh active in edit mode
    fn mesh_on_arm() -> (Scene, Uuid, Uuid, [Uuid; 3]) {
        let (mut scene, skeleton, joints) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Object;
        let mesh = add_quad_mesh(&mut scene, "Body");
        scene
            .set_parent_keep_transform(mesh, Some(ParentRelation::skinned(skeleton)))
            .unwrap();
        scene.get_object_mut(mesh).unwrap().mode = ObjectMode::Edit;
        scene.set_active(mesh).unwrap();
        (scene, skeleton, mesh, joints)
    }

    #[test]
    fn test_mesh_candidates_sorted() {
        let (mut scene, skeleton, mesh, [shoulder, ..]) = mesh_on_arm();
        scene.mesh_mut(mesh).unwrap().select_vertices(&[0]);
        let dialog = invoke_mesh_magnet(&mut scene).unwrap();
        assert_eq!(dialog.candidates.len(), 6);
        assert!(dialog
            .candidates
            .windows(2)
            .all(|w| w[0].distance <= w[1].distance));
        let first = dialog.chosen().unwrap();
        assert_eq!((first.joint, first.end), (shoulder, JointEnd::Head));
        assert_eq!(first.label, "Shoulder >>> Head");
        assert_eq!(first.description, "Distance: 0.00");
        assert!(scene.object(skeleton).unwrap().display.show_names);
        cancel_magnet(&mut scene, dialog);
        assert!(!scene.object(skeleton).unwrap().display.show_names);
    }

    #[test]
    fn test_mesh_magnet_rigid_translation() {
        let (mut scene, skeleton, mesh, [_, elbow, _]) = mesh_on_arm();
        scene.get_object_mut(skeleton).unwrap().transform =
            Transform::from_translation(Vec3::new(0.0, 0.0, 3.0));
        scene.mesh_mut(mesh).unwrap().select_vertices(&[1, 2]);
        let before = scene.skeleton(skeleton).unwrap().joint(elbow).unwrap().vector();

        let mut dialog = invoke_mesh_magnet(&mut scene).unwrap();
        dialog.choice = dialog
            .candidates
            .iter()
            .position(|c| c.joint == elbow && c.end == JointEnd::Head)
            .unwrap();
        dialog.move_tail_with_head = true;
        execute_magnet(&mut scene, dialog).unwrap();

        let joint = scene.skeleton(skeleton).unwrap().joint(elbow).unwrap();
        let world_head = scene.world_point(skeleton, joint.head).unwrap();
        let world_centroid = scene.world_point(mesh, Vec3::new(1.0, 0.5, 0.0)).unwrap();
        assert_relative_eq!(world_head, world_centroid, epsilon = 1e-5);
        assert_relative_eq!(joint.vector(), before, epsilon = 1e-5);
        assert!(!scene.object(skeleton).unwrap().display.in_front);
    }

    #[test]
    fn test_mesh_magnet_head_only_keeps_tail() {
        let (mut scene, skeleton, mesh, [shoulder, ..]) = mesh_on_arm();
        scene.mesh_mut(mesh).unwrap().select_vertices(&[4]);
        let tail = scene.skeleton(skeleton).unwrap().joint(shoulder).unwrap().tail;
        let mut dialog = invoke_mesh_magnet(&mut scene).unwrap();
        dialog.choice = dialog
            .candidates
            .iter()
            .position(|c| c.joint == shoulder && c.end == JointEnd::Head)
            .unwrap();
        execute_magnet(&mut scene, dialog).unwrap();
        let joint = scene.skeleton(skeleton).unwrap().joint(shoulder).unwrap();
        assert_relative_eq!(joint.head, Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
        assert_eq!(joint.tail, tail);
    }

    fn pick(dialog: &mut MagnetDialog, joint: Uuid, end: JointEnd) {
        dialog.choice = dialog
            .candidates
            .iter()
            .position(|c| c.joint == joint && c.end == end)
            .unwrap();
    }

    #[test]
    fn test_moving_connected_head_disconnects() {
        let (mut scene, skeleton, mesh, [shoulder, elbow, _]) = mesh_on_arm();
        scene.mesh_mut(mesh).unwrap().select_vertices(&[4]);
        let mut dialog = invoke_mesh_magnet(&mut scene).unwrap();
        pick(&mut dialog, elbow, JointEnd::Head);
        execute_magnet(&mut scene, dialog).unwrap();

        let s = scene.skeleton(skeleton).unwrap();
        let joint = s.joint(elbow).unwrap();
        assert_relative_eq!(joint.head, Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
        assert!(!joint.connected);
        assert_eq!(joint.parent, Some(shoulder));
        assert_eq!(s.joint(shoulder).unwrap().tail, Vec3::Y);
    }

    #[test]
    fn test_moving_tail_carries_connected_children() {
        let (mut scene, skeleton, mesh, [shoulder, elbow, _]) = mesh_on_arm();
        scene.mesh_mut(mesh).unwrap().select_vertices(&[4]);
        let elbow_tail = scene.skeleton(skeleton).unwrap().joint(elbow).unwrap().tail;
        let mut dialog = invoke_mesh_magnet(&mut scene).unwrap();
        pick(&mut dialog, shoulder, JointEnd::Tail);
        execute_magnet(&mut scene, dialog).unwrap();

        let s = scene.skeleton(skeleton).unwrap();
        assert_relative_eq!(
            s.joint(shoulder).unwrap().tail,
            Vec3::new(0.0, 0.0, 2.0),
            epsilon = 1e-5
        );
        let joint = s.joint(elbow).unwrap();
        assert!(joint.connected);
        assert_relative_eq!(joint.head, Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
        assert_eq!(joint.tail, elbow_tail);
    }

    #[test]
    fn test_mesh_magnet_preconditions() {
        let (mut scene, _, mesh, _) = mesh_on_arm();
        assert_eq!(
            invoke_mesh_magnet(&mut scene).unwrap_err().to_string(),
            "No selected vertices."
        );
        scene.get_object_mut(mesh).unwrap().parent = None;
        scene.mesh_mut(mesh).unwrap().select_all(true);
        assert_eq!(
            invoke_mesh_magnet(&mut scene).unwrap_err().to_string(),
            "Mesh must have an armature parent."
        );
        scene.get_object_mut(mesh).unwrap().mode = ObjectMode::Object;
        assert_eq!(
            invoke_mesh_magnet(&mut scene).unwrap_err().to_string(),
            "Not in mesh edit mode."
        );
    }

    #[test]
    fn test_joint_magnet_excludes_selected() {
        let (mut scene, skeleton, [shoulder, elbow, hand]) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Edit;
        {
            let s = scene.skeleton_mut(skeleton).unwrap();
            s.deselect_all();
            s.select_joint(hand, true).unwrap();
        }
        let dialog = invoke_joint_magnet(&mut scene).unwrap();
        assert!(dialog.candidates.iter().all(|c| c.joint != hand));
        let closest = dialog.chosen().unwrap();
        assert_eq!((closest.joint, closest.end), (elbow, JointEnd::Tail));
        assert_relative_eq!(closest.distance, 0.25, epsilon = 1e-6);
        assert!(dialog.candidates.iter().any(|c| c.joint == shoulder));
        cancel_magnet(&mut scene, dialog);
    }

    #[test]
    fn test_joint_magnet_rigid_translation() {
        let (mut scene, skeleton, [shoulder, _, hand]) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Edit;
        {
            let s = scene.skeleton_mut(skeleton).unwrap();
            s.deselect_all();
            s.select_joint(hand, true).unwrap();
        }
        let before = scene.skeleton(skeleton).unwrap().joint(shoulder).unwrap().vector();
        let mut dialog = invoke_joint_magnet(&mut scene).unwrap();
        dialog.choice = dialog
            .candidates
            .iter()
            .position(|c| c.joint == shoulder && c.end == JointEnd::Head)
            .unwrap();
        dialog.move_tail_with_head = true;
        execute_magnet(&mut scene, dialog).unwrap();

        let joint = scene.skeleton(skeleton).unwrap().joint(shoulder).unwrap();
        assert_relative_eq!(joint.head, Vec3::new(2.0, 1.0, 0.25), epsilon = 1e-5);
        assert_relative_eq!(joint.vector(), before, epsilon = 1e-5);
    }

    #[test]
    fn test_joint_magnet_needs_endpoints() {
        let (mut scene, skeleton, _) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Edit;
        scene.skeleton_mut(skeleton).unwrap().deselect_all();
        let err = invoke_joint_magnet(&mut scene).unwrap_err();
        assert_eq!(err.to_string(), "No bone joints selected.");
        assert!(!scene.object(skeleton).unwrap().display.show_names);
    }
}
