//! Scene builders shared by the command tests

use glam::Vec3;
use rigkit_core::{Joint, Mesh, ObjectMode, Scene, SceneObject, Skeleton};
use uuid::Uuid;

/// Shoulder -> Elbow -> Hand, bent, all selected, Hand active, pose mode
///
/// Lengths are 1, 2 and 0.5.
pub fn arm_skeleton() -> (Skeleton, [Uuid; 3]) {
    let mut skeleton = Skeleton::new();
    let shoulder = skeleton
        .add_joint(
            Joint::builder("Shoulder")
                .head(Vec3::ZERO)
                .tail(Vec3::Y)
                .selected(true)
                .build(),
        )
        .unwrap();
    let elbow = skeleton
        .add_joint(
            Joint::builder("Elbow")
                .head(Vec3::Y)
                .tail(Vec3::new(2.0, 1.0, 0.0))
                .connected_to(shoulder)
                .selected(true)
                .build(),
        )
        .unwrap();
    let hand = skeleton
        .add_joint(
            Joint::builder("Hand")
                .head(Vec3::new(2.0, 1.0, 0.0))
                .tail(Vec3::new(2.0, 1.0, 0.5))
                .connected_to(elbow)
                .selected(true)
                .build(),
        )
        .unwrap();
    skeleton.active = Some(hand);
    (skeleton, [shoulder, elbow, hand])
}

/// Scene holding the arm skeleton object "Armature", active and in pose mode
pub fn arm_scene() -> (Scene, Uuid, [Uuid; 3]) {
    let (skeleton, joints) = arm_skeleton();
    let mut scene = Scene::default();
    let object = scene.add_object(
        SceneObject::skeleton("Armature", skeleton).with_mode(ObjectMode::Pose),
    );
    scene.set_active(object).unwrap();
    (scene, object, joints)
}

/// Unit quad in the XY plane plus a 1x2 quad facing -Y
pub fn quad_mesh() -> Mesh {
    Mesh::new(vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::new(1.0, 0.0, 2.0),
    ])
    .with_face(&[0, 1, 2, 3])
    .with_face(&[0, 1, 5, 4])
}

pub fn add_quad_mesh(scene: &mut Scene, name: &str) -> Uuid {
    scene.add_object(SceneObject::mesh(name, quad_mesh()))
}

/// Select exactly the given joints of a skeleton object
pub fn select_joints(scene: &mut Scene, object: Uuid, joints: &[Uuid]) {
    let skeleton = scene.skeleton_mut(object).unwrap();
    skeleton.deselect_all();
    for id in joints {
        skeleton.select_joint(*id, true).unwrap();
    }
}
