//! Rig assembly: armature creation, joint insertion and mesh parenting

use glam::Vec3;
use rigkit_core::{
    Joint, ObjectKind, ObjectMode, ParentKind, ParentRelation, Scene, SceneObject, SignedAxis,
    Skeleton, Transform,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DisplayOverride, active_in, parent_skeleton};
use crate::config::ToolConfig;
use crate::report::{CommandError, CommandOutcome};

// ============== Create Armature ==============

/// How a mesh is attached to a new skeleton
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentScheme {
    /// Rigidly to the first joint
    Joint,
    /// Whole skeleton, deformed through vertex groups
    #[default]
    Skinned,
    /// Skeleton object, no joint influence
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateArmatureParams {
    /// 1..=100
    pub joint_count: u32,
    pub parent_scheme: ParentScheme,
}

impl CreateArmatureParams {
    pub const MAX_JOINTS: u32 = 100;

    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            joint_count: config.defaults.armature_bone_count,
            parent_scheme: ParentScheme::default(),
        }
    }
}

impl Default for CreateArmatureParams {
    fn default() -> Self {
        Self::from_config(&ToolConfig::default())
    }
}

/// New skeleton at the active mesh's selected-vertex centroid, mesh parented to it
///
/// Joints are stacked along +Z, each connected to the previous one.
pub fn execute_create_armature(
    scene: &mut Scene,
    params: &CreateArmatureParams,
) -> Result<CommandOutcome, CommandError> {
    let mesh_object = scene
        .active_object()
        .filter(|o| o.kind() == ObjectKind::Mesh)
        .ok_or_else(|| CommandError::refused("Active object must be a mesh."))?;
    let mesh_id = mesh_object.id;
    let mesh_name = mesh_object.name.clone();
    let select_all = mesh_object.mode != ObjectMode::Edit;
    if mesh_object.parent.is_some() {
        return Err(CommandError::refused("Mesh already has a parent."));
    }
    let mesh = scene.mesh(mesh_id)?;
    let centroid = if select_all {
        mesh.vertex_average()
    } else {
        mesh.selected_centroid()
    }
    .ok_or_else(|| CommandError::refused("No vertices selected."))?;
    let center = scene.world_point(mesh_id, centroid)?;

    if select_all {
        scene.mesh_mut(mesh_id)?.select_all(true);
    }

    let mut skeleton = Skeleton::new();
    let mut previous: Option<Uuid> = None;
    let count = params.joint_count.clamp(1, CreateArmatureParams::MAX_JOINTS);
    for i in 0..count {
        let mut builder = Joint::builder("Bone")
            .head(Vec3::new(0.0, 0.0, i as f32))
            .tail(Vec3::new(0.0, 0.0, (i + 1) as f32));
        if let Some(parent) = previous {
            builder = builder.connected_to(parent);
        }
        let id = skeleton.add_joint(builder.build())?;
        if previous.is_none() {
            skeleton.set_active(id)?;
        }
        previous = Some(id);
    }
    let first = skeleton.active;

    let skeleton_id = scene.add_object(
        SceneObject::skeleton(format!("{mesh_name}_Armature"), skeleton)
            .with_transform(Transform::from_translation(center)),
    );
    let kind = match (params.parent_scheme, first) {
        (ParentScheme::Joint, Some(joint)) => ParentKind::Joint(joint),
        (ParentScheme::Object, _) => ParentKind::Object,
        _ => ParentKind::Skinned,
    };
    scene.set_parent_keep_transform(
        mesh_id,
        Some(ParentRelation {
            object: skeleton_id,
            kind,
        }),
    )?;

    scene.get_object_mut(mesh_id)?.mode = ObjectMode::Object;
    scene.deselect_all();
    scene.select(mesh_id, true)?;
    scene.set_active(skeleton_id)?;

    info!("Created {} joints for {} at {:?}", count, mesh_name, center);
    Ok(CommandOutcome::with_info(
        "Armature created and assigned at selection center.",
    ))
}

// ============== Add Joint At Selection ==============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddJointParams {
    pub name: String,
    /// Tail direction in skeleton space
    pub direction: SignedAxis,
    pub length: f32,
    pub deform: bool,
}

impl Default for AddJointParams {
    fn default() -> Self {
        Self {
            name: "Bone".into(),
            direction: SignedAxis::POS_Z,
            length: 1.0,
            deform: true,
        }
    }
}

/// Add a joint to the parent skeleton at the selected vertices
pub fn execute_add_joint_at_selection(
    scene: &mut Scene,
    params: &AddJointParams,
) -> Result<CommandOutcome, CommandError> {
    let mesh = active_in(scene, ObjectKind::Mesh, ObjectMode::Edit)
        .ok_or_else(|| CommandError::precondition("Active object must be a mesh in Edit Mode"))?;
    let skeleton_id = parent_skeleton(scene, mesh)
        .ok_or_else(|| CommandError::precondition("Mesh must be parented to an armature"))?;
    let centroid = scene
        .mesh(mesh)?
        .selected_centroid()
        .ok_or_else(|| CommandError::precondition("No vertices selected"))?;
    let head = scene.local_point(skeleton_id, scene.world_point(mesh, centroid)?)?;

    let joint = Joint::builder(params.name.as_str())
        .head(head)
        .tail(head + params.direction.unit() * params.length.max(0.0))
        .deform(params.deform)
        .build();
    let skeleton = scene.skeleton_mut(skeleton_id)?;
    let id = skeleton.add_joint(joint)?;
    let name = skeleton.joint_name(id).unwrap_or_default().to_string();

    info!("Added joint {} at {:?}", name, head);
    Ok(CommandOutcome::with_info(format!("Added bone '{name}'")))
}

// ============== Parent Meshes To Nearest ==============

/// Point of a joint used for proximity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointPoint {
    Head,
    Tail,
    #[default]
    Center,
}

impl JointPoint {
    fn of(&self, joint: &Joint) -> Vec3 {
        match self {
            JointPoint::Head => joint.head,
            JointPoint::Tail => joint.tail,
            JointPoint::Center => joint.midpoint(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestParentParams {
    pub joint_point: JointPoint,
    /// Only consider deforming joints
    pub deform_only: bool,
    /// Reparent meshes that already have a parent
    pub replace_parent: bool,
}

impl Default for NearestParentParams {
    fn default() -> Self {
        Self {
            joint_point: JointPoint::Center,
            deform_only: true,
            replace_parent: false,
        }
    }
}

/// Joint of `skeleton_id` closest to `world` (by `point`)
pub fn nearest_joint(
    scene: &Scene,
    skeleton_id: Uuid,
    world: Vec3,
    point: JointPoint,
    deform_only: bool,
) -> Result<Option<Uuid>, CommandError> {
    let matrix = scene.world_matrix(skeleton_id)?;
    let nearest = scene
        .skeleton(skeleton_id)?
        .joints()
        .filter(|j| !deform_only || j.deform)
        .map(|j| (j.id, matrix.transform_point3(point.of(j)).distance(world)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id);
    Ok(nearest)
}

/// Parent every selected mesh to the joint nearest its vertex average
///
/// Meshes are handled independently: a skipped mesh gets its own report
/// and the rest still run.
pub fn execute_parent_to_nearest(
    scene: &mut Scene,
    params: &NearestParentParams,
) -> Result<CommandOutcome, CommandError> {
    let skeleton_id = scene
        .active_object()
        .filter(|o| o.kind() == ObjectKind::Skeleton)
        .map(|o| o.id)
        .ok_or_else(|| CommandError::precondition("Active object must be an armature"))?;
    let meshes = scene.selected_of_kind(ObjectKind::Mesh);
    if meshes.is_empty() {
        return Err(CommandError::precondition(
            "No unparented mesh objects selected",
        ));
    }

    let mut outcome = CommandOutcome::new();
    for mesh in meshes {
        let object = scene.get_object(mesh)?;
        let name = object.name.clone();
        if object.parent.is_some() && !params.replace_parent {
            warn!("Skipping {}: already parented", name);
            outcome.error(format!("{name} is already parented"));
            continue;
        }
        let world_average = match scene.mesh(mesh)?.vertex_average() {
            Some(local) => Some(scene.world_point(mesh, local)?),
            None => None,
        };
        let nearest = match world_average {
            Some(world) => nearest_joint(
                scene,
                skeleton_id,
                world,
                params.joint_point,
                params.deform_only,
            )?,
            None => None,
        };
        let Some(joint) = nearest else {
            outcome.warning(format!("No nearby bone found for {name}"));
            continue;
        };
        if let Err(e) =
            scene.set_parent_keep_transform(mesh, Some(ParentRelation::joint(skeleton_id, joint)))
        {
            warn!("Could not parent {}: {}", name, e);
            outcome.error(format!("{name}: {e}"));
            continue;
        }
        let joint_name = scene
            .skeleton(skeleton_id)?
            .joint_name(joint)
            .unwrap_or_default()
            .to_string();
        debug!("Parented {} to {}", name, joint_name);
        outcome.info(format!("Parented {name} to {joint_name}"));
    }
    Ok(outcome)
}

// ============== Parent Mesh To Joint ==============

/// Dialog value of the parent-mesh-to-joint command
#[derive(Debug, Clone)]
pub struct ParentJointDialog {
    pub mesh: Uuid,
    pub skeleton: Option<Uuid>,
    pub joint: Option<Uuid>,
    display: Option<DisplayOverride>,
}

/// Exactly one selected mesh; a selected skeleton and the mesh's current joint are pre-filled
pub fn invoke_parent_to_joint(scene: &mut Scene) -> Result<ParentJointDialog, CommandError> {
    let meshes = scene.selected_of_kind(ObjectKind::Mesh);
    let &[mesh] = meshes.as_slice() else {
        return Err(CommandError::precondition("Select exactly one mesh object"));
    };
    let skeletons = scene.selected_of_kind(ObjectKind::Skeleton);
    let current = scene
        .get_object(mesh)?
        .parent
        .filter(|p| scene.object(p.object).is_some_and(|o| o.kind() == ObjectKind::Skeleton));
    let skeleton = match skeletons.as_slice() {
        &[only] => Some(only),
        _ => current.filter(|p| p.joint_id().is_some()).map(|p| p.object),
    };
    let joint = current
        .filter(|p| Some(p.object) == skeleton)
        .and_then(|p| p.joint_id());

    let display = match skeleton {
        Some(id) => Some(DisplayOverride::force(scene, id, |d| d.show_names = true)?),
        None => None,
    };
    Ok(ParentJointDialog {
        mesh,
        skeleton,
        joint,
        display,
    })
}

pub fn execute_parent_to_joint(
    scene: &mut Scene,
    dialog: ParentJointDialog,
) -> Result<CommandOutcome, CommandError> {
    if let Some(display) = dialog.display {
        display.restore(scene);
    }
    let (Some(skeleton), Some(joint)) = (dialog.skeleton, dialog.joint) else {
        return Err(CommandError::precondition(
            "Mesh, armature, and bone must all be selected",
        ));
    };
    scene.set_parent_keep_transform(dialog.mesh, Some(ParentRelation::joint(skeleton, joint)))?;

    let message = format!(
        "Parented {} to {}",
        scene.object_name(dialog.mesh).unwrap_or_default(),
        scene.skeleton(skeleton)?.joint_name(joint).unwrap_or_default()
    );
    info!("{}", message);
    Ok(CommandOutcome::with_info(message))
}

pub fn cancel_parent_to_joint(scene: &mut Scene, dialog: ParentJointDialog) {
    if let Some(display) = dialog.display {
        display.restore(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportLevel;
    use crate::test_fixtures::{add_quad_mesh, arm_scene};
    use approx::assert_relative_eq;

    fn mesh_scene() -> (Scene, Uuid) {
        let mut scene = Scene::default();
        let mesh = add_quad_mesh(&mut scene, "Body");
        scene.get_object_mut(mesh).unwrap().transform =
            Transform::from_translation(Vec3::new(10.0, 0.0, 0.0));
        scene.set_active(mesh).unwrap();
        (scene, mesh)
    }

    #[test]
    fn test_create_armature_skinned() {
        let (mut scene, mesh) = mesh_scene();
        scene.get_object_mut(mesh).unwrap().mode = ObjectMode::Edit;
        scene.mesh_mut(mesh).unwrap().select_face(0);
        let params = CreateArmatureParams {
            joint_count: 3,
            ..Default::default()
        };
        let outcome = execute_create_armature(&mut scene, &params).unwrap();
        assert_eq!(
            outcome.messages().collect::<Vec<_>>(),
            ["Armature created and assigned at selection center."]
        );

        let skeleton_id = scene.find_object_id_by_name("Body_Armature").unwrap();
        assert_eq!(scene.active, Some(skeleton_id));
        assert_relative_eq!(
            scene.world_point(skeleton_id, Vec3::ZERO).unwrap(),
            Vec3::new(10.5, 0.5, 0.0),
            epsilon = 1e-5
        );
        let skeleton = scene.skeleton(skeleton_id).unwrap();
        let names: Vec<_> = skeleton.joints().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["Bone", "Bone.001", "Bone.002"]);
        assert_eq!(skeleton.roots().len(), 1);
        assert!(skeleton.joints().skip(1).all(|j| j.connected));
        assert_eq!(skeleton.active_joint().unwrap().name, "Bone");

        let object = scene.object(mesh).unwrap();
        assert_eq!(object.parent, Some(ParentRelation::skinned(skeleton_id)));
        assert_eq!(object.mode, ObjectMode::Object);
        assert_relative_eq!(
            scene.world_point(mesh, Vec3::ZERO).unwrap(),
            Vec3::new(10.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_create_armature_joint_parent_outside_edit() {
        let (mut scene, mesh) = mesh_scene();
        let params = CreateArmatureParams {
            joint_count: 2,
            parent_scheme: ParentScheme::Joint,
        };
        execute_create_armature(&mut scene, &params).unwrap();
        assert!(scene.mesh(mesh).unwrap().vertex_select.iter().all(|s| *s));
        let skeleton_id = scene.find_object_id_by_name("Body_Armature").unwrap();
        let first = scene.skeleton(skeleton_id).unwrap().find_joint_id_by_name("Bone");
        let parent = scene.object(mesh).unwrap().parent.unwrap();
        assert_eq!(parent.joint_id(), first);
        // vertex average of the quad mesh, keeping world placement
        assert_relative_eq!(
            scene.world_point(skeleton_id, Vec3::ZERO).unwrap(),
            Vec3::new(10.5, 1.0 / 3.0, 2.0 / 3.0),
            epsilon = 1e-5
        );
        assert_relative_eq!(
            scene.world_point(mesh, Vec3::X).unwrap(),
            Vec3::new(11.0, 0.0, 0.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_create_armature_refusals() {
        let (mut scene, mesh) = mesh_scene();
        scene.get_object_mut(mesh).unwrap().mode = ObjectMode::Edit;
        let err = execute_create_armature(&mut scene, &CreateArmatureParams::default()).unwrap_err();
        assert_eq!(err.report().level, ReportLevel::Warning);
        assert_eq!(err.to_string(), "No vertices selected.");

        let other = scene.add_object(SceneObject::empty("Root"));
        scene.get_object_mut(mesh).unwrap().parent = Some(ParentRelation::object(other));
        let err = execute_create_armature(&mut scene, &CreateArmatureParams::default()).unwrap_err();
        assert_eq!(err.to_string(), "Mesh already has a parent.");
        assert_eq!(scene.objects().count(), 2);
    }

    fn mesh_under_arm() -> (Scene, Uuid, Uuid, [Uuid; 3]) {
        let (mut scene, skeleton, joints) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Object;
        scene.get_object_mut(skeleton).unwrap().transform =
            Transform::from_translation(Vec3::new(0.0, 0.0, 5.0));
        let mesh = add_quad_mesh(&mut scene, "Body");
        scene
            .set_parent_keep_transform(mesh, Some(ParentRelation::skinned(skeleton)))
            .unwrap();
        scene.get_object_mut(mesh).unwrap().mode = ObjectMode::Edit;
        scene.deselect_all();
        scene.set_active(mesh).unwrap();
        (scene, skeleton, mesh, joints)
    }

    #[test]
    fn test_add_joint_at_selection() {
        let (mut scene, skeleton, mesh, _) = mesh_under_arm();
        scene.mesh_mut(mesh).unwrap().select_vertices(&[4, 5]);
        let params = AddJointParams {
            direction: SignedAxis::NEG_X,
            length: 0.5,
            deform: false,
            ..Default::default()
        };
        execute_add_joint_at_selection(&mut scene, &params).unwrap();
        let joint = scene
            .skeleton(skeleton)
            .unwrap()
            .find_joint_by_name("Bone")
            .cloned()
            .unwrap();
        // skeleton sits 5 units up
        assert_relative_eq!(joint.head, Vec3::new(0.5, 0.0, -3.0), epsilon = 1e-5);
        assert_relative_eq!(joint.tail, Vec3::new(0.0, 0.0, -3.0), epsilon = 1e-5);
        assert!(!joint.deform);
        assert_eq!(scene.active, Some(mesh));
    }

    #[test]
    fn test_add_joint_preconditions() {
        let (mut scene, _, mesh, _) = mesh_under_arm();
        let err = execute_add_joint_at_selection(&mut scene, &AddJointParams::default()).unwrap_err();
        assert_eq!(err.to_string(), "No vertices selected");
        scene.get_object_mut(mesh).unwrap().parent = None;
        let err = execute_add_joint_at_selection(&mut scene, &AddJointParams::default()).unwrap_err();
        assert_eq!(err.to_string(), "Mesh must be parented to an armature");
    }

    #[test]
    fn test_parent_to_nearest() {
        let (mut scene, skeleton, joints) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Object;
        let near_hand = scene.add_object(
            SceneObject::mesh("Glove", rigkit_core::Mesh::new(vec![Vec3::new(2.0, 1.0, 0.3)]))
                .with_selected(true),
        );
        let near_shoulder = scene.add_object(
            SceneObject::mesh("Pad", rigkit_core::Mesh::new(vec![Vec3::new(0.1, 0.4, 0.0)]))
                .with_selected(true),
        );
        let parented = add_quad_mesh(&mut scene, "Strap");
        scene
            .set_parent_keep_transform(parented, Some(ParentRelation::object(skeleton)))
            .unwrap();
        scene.select(parented, true).unwrap();

        let outcome =
            execute_parent_to_nearest(&mut scene, &NearestParentParams::default()).unwrap();
        assert_eq!(
            scene.object(near_hand).unwrap().parent,
            Some(ParentRelation::joint(skeleton, joints[2]))
        );
        assert_eq!(
            scene.object(near_shoulder).unwrap().parent,
            Some(ParentRelation::joint(skeleton, joints[0]))
        );
        assert_eq!(
            scene.object(parented).unwrap().parent,
            Some(ParentRelation::object(skeleton))
        );
        assert!(outcome.reports.iter().any(|r| r.level == ReportLevel::Error
            && r.message == "Strap is already parented"));
        assert!(outcome.messages().any(|m| m == "Parented Glove to Hand"));
        assert_relative_eq!(
            scene.world_point(near_hand, Vec3::new(2.0, 1.0, 0.3)).unwrap(),
            Vec3::new(2.0, 1.0, 0.3),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_parent_to_nearest_failure_does_not_stop_batch() {
        let (mut scene, skeleton, joints) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().mode = ObjectMode::Object;
        let holder = add_quad_mesh(&mut scene, "Holder");
        scene
            .set_parent_keep_transform(skeleton, Some(ParentRelation::object(holder)))
            .unwrap();
        let other = scene.add_object(
            SceneObject::mesh("Other", rigkit_core::Mesh::new(vec![Vec3::new(2.0, 1.0, 0.3)]))
                .with_selected(true),
        );
        scene.select(holder, true).unwrap();
        scene.set_active(skeleton).unwrap();

        let outcome =
            execute_parent_to_nearest(&mut scene, &NearestParentParams::default()).unwrap();
        assert_eq!(scene.object(holder).unwrap().parent, None);
        assert_eq!(
            scene.object(other).unwrap().parent,
            Some(ParentRelation::joint(skeleton, joints[2]))
        );
        assert!(outcome.reports.iter().any(|r| r.level == ReportLevel::Error
            && r.message == "Holder: Parenting would create a cycle"));
        assert!(outcome.messages().any(|m| m == "Parented Other to Hand"));
    }

    #[test]
    fn test_parent_to_nearest_deform_only() {
        let (mut scene, skeleton, joints) = arm_scene();
        for id in joints {
            scene.skeleton_mut(skeleton).unwrap().get_joint_mut(id).unwrap().deform = false;
        }
        let mesh = add_quad_mesh(&mut scene, "Body");
        scene.select(mesh, true).unwrap();
        let outcome =
            execute_parent_to_nearest(&mut scene, &NearestParentParams::default()).unwrap();
        assert_eq!(outcome.reports[0].level, ReportLevel::Warning);
        assert_eq!(scene.object(mesh).unwrap().parent, None);

        let params = NearestParentParams {
            deform_only: false,
            joint_point: JointPoint::Head,
            ..Default::default()
        };
        execute_parent_to_nearest(&mut scene, &params).unwrap();
        assert_eq!(
            scene.object(mesh).unwrap().parent,
            Some(ParentRelation::joint(skeleton, joints[0]))
        );
    }

    #[test]
    fn test_parent_to_joint_dialog() {
        let (mut scene, skeleton, [_, elbow, hand]) = arm_scene();
        let mesh = add_quad_mesh(&mut scene, "Body");
        scene
            .set_parent_keep_transform(mesh, Some(ParentRelation::joint(skeleton, elbow)))
            .unwrap();
        scene.select(mesh, true).unwrap();

        let mut dialog = invoke_parent_to_joint(&mut scene).unwrap();
        assert_eq!(dialog.skeleton, Some(skeleton));
        assert_eq!(dialog.joint, Some(elbow));
        assert!(scene.object(skeleton).unwrap().display.show_names);

        dialog.joint = Some(hand);
        let outcome = execute_parent_to_joint(&mut scene, dialog).unwrap();
        assert_eq!(outcome.messages().next(), Some("Parented Body to Hand"));
        assert_eq!(
            scene.object(mesh).unwrap().parent,
            Some(ParentRelation::joint(skeleton, hand))
        );
        assert!(!scene.object(skeleton).unwrap().display.show_names);
        assert_relative_eq!(
            scene.world_point(mesh, Vec3::ONE).unwrap(),
            Vec3::ONE,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_parent_to_joint_failures_restore_display() {
        let (mut scene, skeleton, _) = arm_scene();
        let mesh = add_quad_mesh(&mut scene, "Body");
        assert_eq!(
            invoke_parent_to_joint(&mut scene).unwrap_err().to_string(),
            "Select exactly one mesh object"
        );
        scene.select(mesh, true).unwrap();
        let dialog = invoke_parent_to_joint(&mut scene).unwrap();
        assert_eq!(dialog.joint, None);
        let err = execute_parent_to_joint(&mut scene, dialog).unwrap_err();
        assert_eq!(err.to_string(), "Mesh, armature, and bone must all be selected");
        assert!(!scene.object(skeleton).unwrap().display.show_names);

        let dialog = invoke_parent_to_joint(&mut scene).unwrap();
        cancel_parent_to_joint(&mut scene, dialog);
        assert!(!scene.object(skeleton).unwrap().display.show_names);
        assert_eq!(scene.object(mesh).unwrap().parent, None);
    }
}
