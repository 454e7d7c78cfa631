//! Scene: objects, selection, parenting and world transforms

mod object;

use std::collections::{BTreeMap, HashMap};

use glam::{Mat4, Vec3};
use tracing::debug;
use uuid::Uuid;

pub use object::{
    DisplayFlags, ObjectData, ObjectKind, ObjectMode, ParentKind, ParentRelation, SceneObject,
};

use crate::constants::DUPLICATE_NAME_SEPARATOR;
use crate::math::roll_aligning_z;
use crate::mesh::Mesh;
use crate::skeleton::{Skeleton, SkeletonError};
use crate::transform::Transform;

/// The scene the editing tools operate on
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: String,
    objects: HashMap<Uuid, SceneObject>,
    order: Vec<Uuid>,
    name_index: HashMap<String, Uuid>,
    /// Active object (last clicked)
    pub active: Option<Uuid>,
    pub frame_current: i32,
    /// Named text blocks (reports), overwritten on write
    texts: BTreeMap<String, String>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Scene")
    }
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: HashMap::new(),
            order: Vec::new(),
            name_index: HashMap::new(),
            active: None,
            frame_current: 1,
            texts: BTreeMap::new(),
        }
    }

    // ============== Objects ==============

    /// Add an object, renaming it if the name is taken
    pub fn add_object(&mut self, mut object: SceneObject) -> Uuid {
        object.name = self.unique_object_name(&object.name);
        let id = object.id;
        self.name_index.insert(object.name.clone(), id);
        self.order.push(id);
        self.objects.insert(id, object);
        id
    }

    pub fn unique_object_name(&self, base: &str) -> String {
        if !self.name_index.contains_key(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}{DUPLICATE_NAME_SEPARATOR}{n:03}"))
            .find(|candidate| !self.name_index.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn object(&self, id: Uuid) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: Uuid) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn get_object(&self, id: Uuid) -> Result<&SceneObject, SceneError> {
        self.objects.get(&id).ok_or(SceneError::ObjectNotFound(id))
    }

    pub fn get_object_mut(&mut self, id: Uuid) -> Result<&mut SceneObject, SceneError> {
        self.objects
            .get_mut(&id)
            .ok_or(SceneError::ObjectNotFound(id))
    }

    /// Objects in creation order
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    pub fn find_object_id_by_name(&self, name: &str) -> Option<Uuid> {
        self.name_index.get(name).copied()
    }

    pub fn object_name(&self, id: Uuid) -> Option<&str> {
        self.objects.get(&id).map(|o| o.name.as_str())
    }

    pub fn skeleton(&self, id: Uuid) -> Result<&Skeleton, SceneError> {
        let object = self.get_object(id)?;
        object
            .as_skeleton()
            .ok_or_else(|| SceneError::NotASkeleton(object.name.clone()))
    }

    pub fn skeleton_mut(&mut self, id: Uuid) -> Result<&mut Skeleton, SceneError> {
        let object = self.get_object_mut(id)?;
        let name = object.name.clone();
        object.as_skeleton_mut().ok_or(SceneError::NotASkeleton(name))
    }

    pub fn mesh(&self, id: Uuid) -> Result<&Mesh, SceneError> {
        let object = self.get_object(id)?;
        object
            .as_mesh()
            .ok_or_else(|| SceneError::NotAMesh(object.name.clone()))
    }

    pub fn mesh_mut(&mut self, id: Uuid) -> Result<&mut Mesh, SceneError> {
        let object = self.get_object_mut(id)?;
        let name = object.name.clone();
        object.as_mesh_mut().ok_or(SceneError::NotAMesh(name))
    }

    // ============== Selection ==============

    pub fn active_object(&self) -> Option<&SceneObject> {
        self.active.and_then(|id| self.objects.get(&id))
    }

    /// Select `id` and make it active
    pub fn set_active(&mut self, id: Uuid) -> Result<(), SceneError> {
        self.get_object_mut(id)?.selected = true;
        self.active = Some(id);
        Ok(())
    }

    pub fn select(&mut self, id: Uuid, select: bool) -> Result<(), SceneError> {
        self.get_object_mut(id)?.selected = select;
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        for object in self.objects.values_mut() {
            object.selected = false;
        }
    }

    /// Selected objects in creation order
    pub fn selected_objects(&self) -> Vec<Uuid> {
        self.objects()
            .filter(|o| o.selected)
            .map(|o| o.id)
            .collect()
    }

    pub fn selected_of_kind(&self, kind: ObjectKind) -> Vec<Uuid> {
        self.objects()
            .filter(|o| o.selected && o.kind() == kind)
            .map(|o| o.id)
            .collect()
    }

    // ============== Parenting & Transforms ==============

    /// Objects whose parent is `id`
    pub fn children_of(&self, id: Uuid) -> Vec<Uuid> {
        self.objects()
            .filter(|o| o.parent.is_some_and(|p| p.object == id))
            .map(|o| o.id)
            .collect()
    }

    /// World frame children of `relation` are expressed in
    pub fn parent_frame(&self, relation: &ParentRelation) -> Result<Mat4, SceneError> {
        let parent_world = self.world_matrix(relation.object)?;
        match relation.kind {
            ParentKind::Object | ParentKind::Skinned => Ok(parent_world),
            ParentKind::Joint(joint) => {
                let skeleton = self.skeleton(relation.object)?;
                let joint = skeleton.get_joint(joint)?;
                Ok(parent_world * joint.tail_matrix())
            }
        }
    }

    pub fn world_matrix(&self, id: Uuid) -> Result<Mat4, SceneError> {
        let object = self.get_object(id)?;
        let local = object.transform.matrix();
        match &object.parent {
            Some(relation) => Ok(self.parent_frame(relation)? * local),
            None => Ok(local),
        }
    }

    /// Place an object at a world matrix, keeping its current parent
    pub fn set_world_matrix(&mut self, id: Uuid, world: Mat4) -> Result<(), SceneError> {
        let parent = self.get_object(id)?.parent;
        let frame = match &parent {
            Some(relation) => self.parent_frame(relation)?,
            None => Mat4::IDENTITY,
        };
        self.get_object_mut(id)?.transform = Transform::from_matrix(frame.inverse() * world);
        Ok(())
    }

    /// Object-space point to world space
    pub fn world_point(&self, id: Uuid, local: Vec3) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.transform_point3(local))
    }

    /// World-space point into an object's space
    pub fn local_point(&self, id: Uuid, world: Vec3) -> Result<Vec3, SceneError> {
        Ok(self.world_matrix(id)?.inverse().transform_point3(world))
    }

    /// Reparent an object while keeping its world transform
    pub fn set_parent_keep_transform(
        &mut self,
        child: Uuid,
        parent: Option<ParentRelation>,
    ) -> Result<(), SceneError> {
        let world = self.world_matrix(child)?;
        if let Some(relation) = &parent {
            self.check_parent(child, relation)?;
        }
        self.get_object_mut(child)?.parent = parent;
        self.set_world_matrix(child, world)?;
        debug!(
            "Reparented {} to {:?}",
            self.object_name(child).unwrap_or_default(),
            parent
        );
        Ok(())
    }

    fn check_parent(&self, child: Uuid, relation: &ParentRelation) -> Result<(), SceneError> {
        let parent = self.get_object(relation.object)?;
        if let ParentKind::Joint(joint) = relation.kind {
            let skeleton = parent
                .as_skeleton()
                .ok_or_else(|| SceneError::NotASkeleton(parent.name.clone()))?;
            skeleton.get_joint(joint)?;
        }
        if relation.kind == ParentKind::Skinned && parent.as_skeleton().is_none() {
            return Err(SceneError::NotASkeleton(parent.name.clone()));
        }
        let mut cursor = Some(relation.object);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::WouldCreateCycle);
            }
            cursor = self.object(id).and_then(|o| o.parent).map(|p| p.object);
        }
        Ok(())
    }

    /// Bake an object's rotation and scale into its data, keeping children in place
    pub fn apply_rotation_scale(&mut self, id: Uuid) -> Result<(), SceneError> {
        let transform = self.get_object(id)?.transform;
        let basis = Mat4::from_scale_rotation_translation(
            transform.scale,
            transform.rotation,
            Vec3::ZERO,
        );
        let children = self
            .children_of(id)
            .into_iter()
            .map(|c| self.world_matrix(c).map(|m| (c, m)))
            .collect::<Result<Vec<_>, _>>()?;

        let object = self.get_object_mut(id)?;
        match &mut object.data {
            ObjectData::Skeleton(skeleton) => {
                for joint_id in skeleton.joint_ids() {
                    if let Some(joint) = skeleton.joint_mut(joint_id) {
                        let old_z = joint.z_axis();
                        joint.head = basis.transform_point3(joint.head);
                        joint.tail = basis.transform_point3(joint.tail);
                        if let Some(z) = old_z
                            && let Some(direction) = joint.direction()
                            && let Some(roll) =
                                roll_aligning_z(direction, basis.transform_vector3(z))
                        {
                            joint.roll = roll;
                        }
                    }
                }
            }
            ObjectData::Mesh(mesh) => {
                for v in &mut mesh.vertices {
                    *v = basis.transform_point3(*v);
                }
            }
            ObjectData::Empty => {}
        }
        object.transform = Transform::from_translation(transform.translation);

        for (child, world) in children {
            self.set_world_matrix(child, world)?;
        }
        debug!("Applied rotation/scale on {}", self.object_name(id).unwrap_or_default());
        Ok(())
    }

    // ============== Text Blocks ==============

    /// Write a named text block, replacing any previous content
    pub fn write_text(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.texts.insert(name.into(), content.into());
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn text_names(&self) -> impl Iterator<Item = &str> {
        self.texts.keys().map(String::as_str)
    }
}

/// Scene-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("Object not found: {0}")]
    ObjectNotFound(Uuid),
    #[error("Object '{0}' is not an armature")]
    NotASkeleton(String),
    #[error("Object '{0}' is not a mesh")]
    NotAMesh(String),
    #[error("Parenting would create a cycle")]
    WouldCreateCycle,
    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}
