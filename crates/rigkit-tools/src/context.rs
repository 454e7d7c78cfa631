//! Read-only summary of the current selection and mode

use rigkit_core::{ObjectKind, ObjectMode, ParentKind, Scene};

/// How the active mesh hangs off its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshParenting {
    None,
    /// Parent object is not a skeleton
    OtherObject,
    Skeleton,
    Joint,
}

/// Selection shape every panel decision and command predicate is keyed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot {
    pub active_kind: Option<ObjectKind>,
    pub mode: ObjectMode,
    pub mesh_parenting: MeshParenting,
    pub selected_objects: usize,
    pub selected_meshes: usize,
    pub selected_skeletons: usize,
    /// Selected joints of the active skeleton
    pub selected_joints: usize,
    pub has_active_joint: bool,
}

impl ContextSnapshot {
    pub fn capture(scene: &Scene) -> Self {
        let active = scene.active_object();
        let mesh_parenting = match active {
            Some(object) if object.kind() == ObjectKind::Mesh => match &object.parent {
                None => MeshParenting::None,
                Some(relation) => {
                    let parent_is_skeleton = scene
                        .object(relation.object)
                        .is_some_and(|p| p.kind() == ObjectKind::Skeleton);
                    match relation.kind {
                        ParentKind::Joint(_) if parent_is_skeleton => MeshParenting::Joint,
                        _ if parent_is_skeleton => MeshParenting::Skeleton,
                        _ => MeshParenting::OtherObject,
                    }
                }
            },
            _ => MeshParenting::None,
        };
        let skeleton = active.and_then(|o| o.as_skeleton());

        Self {
            active_kind: active.map(|o| o.kind()),
            mode: active.map(|o| o.mode).unwrap_or_default(),
            mesh_parenting,
            selected_objects: scene.selected_objects().len(),
            selected_meshes: scene.selected_of_kind(ObjectKind::Mesh).len(),
            selected_skeletons: scene.selected_of_kind(ObjectKind::Skeleton).len(),
            selected_joints: skeleton.map(|s| s.selected_joints().len()).unwrap_or(0),
            has_active_joint: skeleton.is_some_and(|s| s.active_joint().is_some()),
        }
    }

    pub fn is_active(&self, kind: ObjectKind, mode: ObjectMode) -> bool {
        self.active_kind == Some(kind) && self.mode == mode
    }

    /// Mesh edit mode, parent chain reaching a skeleton
    pub fn is_mesh_edit_on_skeleton(&self) -> bool {
        self.is_active(ObjectKind::Mesh, ObjectMode::Edit)
            && matches!(
                self.mesh_parenting,
                MeshParenting::Skeleton | MeshParenting::Joint
            )
    }

    pub fn is_skeleton_pose(&self) -> bool {
        self.is_active(ObjectKind::Skeleton, ObjectMode::Pose)
    }

    pub fn is_skeleton_edit(&self) -> bool {
        self.is_active(ObjectKind::Skeleton, ObjectMode::Edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{arm_scene, add_quad_mesh};
    use rigkit_core::ParentRelation;

    #[test]
    fn test_capture_pose_selection() {
        let (scene, _, _) = arm_scene();
        let ctx = ContextSnapshot::capture(&scene);
        assert!(ctx.is_skeleton_pose());
        assert_eq!(ctx.selected_joints, 3);
        assert!(ctx.has_active_joint);
        assert_eq!(ctx.mesh_parenting, MeshParenting::None);
    }

    #[test]
    fn test_capture_mesh_parenting() {
        let (mut scene, skeleton, joints) = arm_scene();
        let mesh = add_quad_mesh(&mut scene, "Body");
        scene
            .set_parent_keep_transform(mesh, Some(ParentRelation::joint(skeleton, joints[1])))
            .unwrap();
        scene.get_object_mut(mesh).unwrap().mode = ObjectMode::Edit;
        scene.deselect_all();
        scene.set_active(mesh).unwrap();

        let ctx = ContextSnapshot::capture(&scene);
        assert_eq!(ctx.mesh_parenting, MeshParenting::Joint);
        assert!(ctx.is_mesh_edit_on_skeleton());
        assert_eq!(ctx.selected_joints, 0);
        assert_eq!(ctx.selected_meshes, 1);
    }

    #[test]
    fn test_capture_empty_scene() {
        let ctx = ContextSnapshot::capture(&Scene::default());
        assert_eq!(ctx.active_kind, None);
        assert_eq!(ctx.mode, ObjectMode::Object);
        assert_eq!(ctx.selected_objects, 0);
    }
}
