//! Editing commands
//!
//! Every command validates the scene before touching it and returns a
//! [`CommandOutcome`](crate::CommandOutcome) or a
//! [`CommandError`](crate::CommandError). Commands with a confirmation
//! dialog split into `invoke_*` (builds an owned dialog value) and
//! `execute_*` / `cancel_*` (consume it).

pub mod assembly;
pub mod chain_align;
pub mod constraints;
pub mod doctor;
pub mod driver;
pub mod face_align;
pub mod magnet;
pub mod picker;
pub mod rename;
pub mod straighten;
pub mod target;

use rigkit_core::{DisplayFlags, ObjectKind, ObjectMode, Scene, SceneError};
use uuid::Uuid;

/// Display flags forced on an object for the lifetime of a dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOverride {
    object: Uuid,
    saved: DisplayFlags,
}

impl DisplayOverride {
    /// Save the current flags of `object`, then let `force` change them
    pub fn force(
        scene: &mut Scene,
        object: Uuid,
        force: impl FnOnce(&mut DisplayFlags),
    ) -> Result<Self, SceneError> {
        let target = scene.get_object_mut(object)?;
        let saved = target.display;
        force(&mut target.display);
        Ok(Self { object, saved })
    }

    pub fn object(&self) -> Uuid {
        self.object
    }

    pub fn saved(&self) -> DisplayFlags {
        self.saved
    }

    /// Put the saved flags back; a deleted object is ignored
    pub fn restore(self, scene: &mut Scene) {
        if let Some(object) = scene.object_mut(self.object) {
            object.display = self.saved;
        }
    }
}

/// Active object id if it is of `kind` and in `mode`
pub(crate) fn active_in(scene: &Scene, kind: ObjectKind, mode: ObjectMode) -> Option<Uuid> {
    scene
        .active_object()
        .filter(|o| o.kind() == kind && o.mode == mode)
        .map(|o| o.id)
}

/// Skeleton directly parenting `object`
pub(crate) fn parent_skeleton(scene: &Scene, object: Uuid) -> Option<Uuid> {
    let parent = scene.object(object)?.parent?;
    scene
        .object(parent.object)
        .filter(|p| p.kind() == ObjectKind::Skeleton)
        .map(|p| p.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{add_quad_mesh, arm_scene};
    use rigkit_core::ParentRelation;

    #[test]
    fn test_display_override_restores() {
        let (mut scene, skeleton, _) = arm_scene();
        scene.get_object_mut(skeleton).unwrap().display.in_front = true;

        let guard = DisplayOverride::force(&mut scene, skeleton, |d| {
            d.show_names = true;
            d.in_front = true;
        })
        .unwrap();
        assert!(scene.object(skeleton).unwrap().display.show_names);

        guard.restore(&mut scene);
        let display = scene.object(skeleton).unwrap().display;
        assert!(!display.show_names);
        assert!(display.in_front);
    }

    #[test]
    fn test_parent_skeleton_lookup() {
        let (mut scene, skeleton, _) = arm_scene();
        let mesh = add_quad_mesh(&mut scene, "Body");
        assert_eq!(parent_skeleton(&scene, mesh), None);
        scene
            .set_parent_keep_transform(mesh, Some(ParentRelation::skinned(skeleton)))
            .unwrap();
        assert_eq!(parent_skeleton(&scene, mesh), Some(skeleton));
        assert_eq!(
            active_in(&scene, ObjectKind::Skeleton, ObjectMode::Pose),
            Some(skeleton)
        );
        assert_eq!(active_in(&scene, ObjectKind::Skeleton, ObjectMode::Edit), None);
    }
}
