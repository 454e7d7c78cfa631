//! Vertex-to-joint assignment picker

use rigkit_core::{FULL_WEIGHT, ObjectKind, ObjectMode, Scene};
use tracing::info;
use uuid::Uuid;

use super::assembly::{JointPoint, nearest_joint};
use super::{DisplayOverride, active_in, parent_skeleton};
use crate::report::{CommandError, CommandOutcome};

/// Dialog value of the vertex picker
#[derive(Debug, Clone)]
pub struct PickerDialog {
    pub mesh: Uuid,
    pub skeleton: Uuid,
    pub joint: Option<Uuid>,
    /// Clear the vertices from every other group first
    pub replace_all: bool,
    /// List (and propose) deforming joints only
    pub deform_only: bool,
    display: DisplayOverride,
}

impl PickerDialog {
    /// Joints offered in the dialog, in skeleton order
    pub fn options<'a>(&self, scene: &'a Scene) -> Vec<(Uuid, &'a str)> {
        let deform_only = self.deform_only;
        scene
            .skeleton(self.skeleton)
            .map(|s| {
                s.joints()
                    .filter(|j| !deform_only || j.deform)
                    .map(|j| (j.id, j.name.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Open the picker, proposing the joint whose midpoint is closest to the selection
pub fn invoke_picker(scene: &mut Scene) -> Result<PickerDialog, CommandError> {
    let mesh = active_in(scene, ObjectKind::Mesh, ObjectMode::Edit).ok_or_else(|| {
        CommandError::precondition("Must be in mesh edit mode on a mesh object.")
    })?;
    let centroid = scene
        .mesh(mesh)?
        .selected_centroid()
        .ok_or_else(|| CommandError::precondition("No vertices selected."))?;
    let skeleton = parent_skeleton(scene, mesh).ok_or_else(|| {
        CommandError::precondition("Object must have an armature as a parent.")
    })?;

    let deform_only = true;
    let world = scene.world_point(mesh, centroid)?;
    let joint = nearest_joint(scene, skeleton, world, JointPoint::Center, deform_only)?;
    let display = DisplayOverride::force(scene, skeleton, |d| {
        d.show_names = true;
        d.in_front = true;
    })?;
    Ok(PickerDialog {
        mesh,
        skeleton,
        joint,
        replace_all: true,
        deform_only,
        display,
    })
}

/// Assign the selected vertices to the chosen joint's group at full weight
pub fn execute_picker(
    scene: &mut Scene,
    dialog: PickerDialog,
) -> Result<CommandOutcome, CommandError> {
    dialog.display.restore(scene);
    let joint = dialog
        .joint
        .ok_or_else(|| CommandError::precondition("No bone selected."))?;
    let joint_name = scene.skeleton(dialog.skeleton)?.get_joint(joint)?.name.clone();

    let mesh = scene.mesh_mut(dialog.mesh)?;
    let vertices = mesh.selected_vertex_indices();
    if vertices.is_empty() {
        return Err(CommandError::precondition("No vertices selected."));
    }
    if dialog.replace_all {
        mesh.remove_from_all_groups(&vertices);
    }
    let group = mesh.ensure_vertex_group(&joint_name);
    for v in &vertices {
        group.weights.insert(*v, FULL_WEIGHT);
    }

    info!("Assigned {} vertices to {}", vertices.len(), joint_name);
    let mut message = format!("Assigned {} vertices to '{}'", vertices.len(), joint_name);
    if dialog.replace_all {
        message.push_str(" (replaced all previous assignments)");
    }
    Ok(CommandOutcome::with_info(message))
}

pub fn cancel_picker(scene: &mut Scene, dialog: PickerDialog) {
    dialog.display.restore(scene);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{add_quad_mesh, arm_scene};
    use rigkit_core::{DisplayFlags, ParentRelation};

    fn picker_scene() -> (Scene, Uuid, Uuid, [Uuid; 3]) {
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
    fn test_picker_proposes_nearest_and_replaces() {
        let (mut scene, skeleton, mesh, [shoulder, elbow, _]) = picker_scene();
        {
            let m = scene.mesh_mut(mesh).unwrap();
            m.ensure_vertex_group("Old").weights.insert(0, 0.5);
            m.ensure_vertex_group("Old").weights.insert(2, 0.5);
            m.select_vertices(&[0, 3]);
        }
        let mut dialog = invoke_picker(&mut scene).unwrap();
        assert_eq!(dialog.joint, Some(shoulder));
        let display = scene.object(skeleton).unwrap().display;
        assert!(display.show_names && display.in_front);
        assert_eq!(dialog.options(&scene).len(), 3);

        dialog.joint = Some(elbow);
        let outcome = execute_picker(&mut scene, dialog).unwrap();
        assert_eq!(
            outcome.messages().next(),
            Some("Assigned 2 vertices to 'Elbow' (replaced all previous assignments)")
        );
        let m = scene.mesh(mesh).unwrap();
        let old = m.vertex_group("Old").unwrap();
        assert!(!old.contains(0));
        assert!(old.contains(2));
        let group = m.vertex_group("Elbow").unwrap();
        assert_eq!(group.weights.get(&0), Some(&FULL_WEIGHT));
        assert_eq!(group.weights.get(&3), Some(&FULL_WEIGHT));
        assert_eq!(scene.object(skeleton).unwrap().display, DisplayFlags::default());
    }

    #[test]
    fn test_picker_keep_existing_and_deform_filter() {
        let (mut scene, skeleton, mesh, [shoulder, _, hand]) = picker_scene();
        scene
            .skeleton_mut(skeleton)
            .unwrap()
            .get_joint_mut(shoulder)
            .unwrap()
            .deform = false;
        {
            let m = scene.mesh_mut(mesh).unwrap();
            m.ensure_vertex_group("Old").weights.insert(0, 0.5);
            m.select_vertices(&[0]);
        }
        let mut dialog = invoke_picker(&mut scene).unwrap();
        assert_ne!(dialog.joint, Some(shoulder));
        assert_eq!(dialog.options(&scene).len(), 2);
        dialog.joint = Some(hand);
        dialog.replace_all = false;
        let outcome = execute_picker(&mut scene, dialog).unwrap();
        assert_eq!(outcome.messages().next(), Some("Assigned 1 vertices to 'Hand'"));
        assert!(scene.mesh(mesh).unwrap().vertex_group("Old").unwrap().contains(0));
    }

    #[test]
    fn test_picker_preconditions_and_cancel() {
        let (mut scene, skeleton, mesh, _) = picker_scene();
        assert_eq!(
            invoke_picker(&mut scene).unwrap_err().to_string(),
            "No vertices selected."
        );
        scene.mesh_mut(mesh).unwrap().select_vertices(&[1]);
        let mut dialog = invoke_picker(&mut scene).unwrap();
        dialog.joint = None;
        assert_eq!(
            execute_picker(&mut scene, dialog).unwrap_err().to_string(),
            "No bone selected."
        );
        assert!(!scene.object(skeleton).unwrap().display.in_front);

        let dialog = invoke_picker(&mut scene).unwrap();
        cancel_picker(&mut scene, dialog);
        assert!(scene.mesh(mesh).unwrap().vertex_groups.is_empty());
        assert!(!scene.object(skeleton).unwrap().display.show_names);

        scene.get_object_mut(mesh).unwrap().parent = None;
        assert_eq!(
            invoke_picker(&mut scene).unwrap_err().to_string(),
            "Object must have an armature as a parent."
        );
        scene.get_object_mut(mesh).unwrap().mode = ObjectMode::Object;
        assert_eq!(
            invoke_picker(&mut scene).unwrap_err().to_string(),
            "Must be in mesh edit mode on a mesh object."
        );
    }
}
