//! Skeleton: a tree of joints keyed by stable ids

mod groups;
mod joint;
mod tree_cache;

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use groups::{JointGroup, JointGroups};
pub use joint::{Joint, JointBuilder, JointEnd, JointSelection, PoseState, TransformLocks};

use crate::constants::DUPLICATE_NAME_SEPARATOR;
use tree_cache::TreeCache;

/// Raw skeleton data for deserialization (used internally)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SkeletonData {
    joints: Vec<Joint>,
    active: Option<Uuid>,
    groups: JointGroups,
}

/// Joint hierarchy of a skeleton object
#[derive(Debug, Clone, Serialize)]
#[serde(into = "SkeletonData")]
pub struct Skeleton {
    joints: HashMap<Uuid, Joint>,
    /// Creation order, used for deterministic iteration
    order: Vec<Uuid>,
    name_index: HashMap<String, Uuid>,
    /// Active joint (last clicked)
    pub active: Option<Uuid>,
    pub groups: JointGroups,
    cache: RefCell<TreeCache>,
}

impl From<Skeleton> for SkeletonData {
    fn from(mut skeleton: Skeleton) -> Self {
        let joints = skeleton
            .order
            .iter()
            .filter_map(|id| skeleton.joints.remove(id))
            .collect();
        Self {
            joints,
            active: skeleton.active,
            groups: skeleton.groups,
        }
    }
}

impl From<SkeletonData> for Skeleton {
    fn from(data: SkeletonData) -> Self {
        let mut skeleton = Self::new();
        for joint in data.joints {
            skeleton.order.push(joint.id);
            skeleton.joints.insert(joint.id, joint);
        }
        skeleton.active = data.active;
        skeleton.groups = data.groups;
        skeleton.rebuild_indices();
        skeleton
    }
}

impl<'de> Deserialize<'de> for Skeleton {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = SkeletonData::deserialize(deserializer)?;
        Ok(Skeleton::from(data))
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Skeleton {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && self.joints == other.joints
            && self.active == other.active
            && self.groups == other.groups
    }
}

impl Skeleton {
    pub fn new() -> Self {
        Self {
            joints: HashMap::new(),
            order: Vec::new(),
            name_index: HashMap::new(),
            active: None,
            groups: JointGroups::default(),
            cache: RefCell::new(TreeCache::default()),
        }
    }

    /// Rebuild the name index (call after deserialization)
    pub fn rebuild_indices(&mut self) {
        self.name_index.clear();
        for (id, joint) in &self.joints {
            self.name_index.insert(joint.name.clone(), *id);
        }
        self.invalidate_cache();
    }

    pub(crate) fn invalidate_cache(&self) {
        self.cache.borrow_mut().invalidate();
    }

    fn ensure_cache_valid(&self) {
        let mut cache = self.cache.borrow_mut();
        if !cache.valid {
            cache.rebuild(&self.order, &self.joints);
        }
    }

    // ============== Joint Management ==============

    /// Add a joint, renaming it if the name is taken
    pub fn add_joint(&mut self, mut joint: Joint) -> Result<Uuid, SkeletonError> {
        if let Some(parent) = joint.parent
            && !self.joints.contains_key(&parent)
        {
            return Err(SkeletonError::JointNotFound(parent));
        }
        joint.name = self.unique_name(&joint.name, None);
        let id = joint.id;
        self.name_index.insert(joint.name.clone(), id);
        self.order.push(id);
        self.joints.insert(id, joint);
        self.invalidate_cache();
        Ok(id)
    }

    /// Remove a joint; its children are reparented to its parent
    pub fn remove_joint(&mut self, id: Uuid) -> Result<Joint, SkeletonError> {
        let joint = self
            .joints
            .remove(&id)
            .ok_or(SkeletonError::JointNotFound(id))?;
        self.order.retain(|j| *j != id);
        self.name_index.remove(&joint.name);
        for other in self.joints.values_mut() {
            if other.parent == Some(id) {
                other.parent = joint.parent;
                other.connected = false;
            }
        }
        self.groups.retain_members(|m| *m != id);
        if self.active == Some(id) {
            self.active = None;
        }
        self.invalidate_cache();
        Ok(joint)
    }

    pub fn joint(&self, id: Uuid) -> Option<&Joint> {
        self.joints.get(&id)
    }

    /// Mutable joint access; use `rename_joint`/`set_parent` for name and hierarchy
    pub fn joint_mut(&mut self, id: Uuid) -> Option<&mut Joint> {
        self.joints.get_mut(&id)
    }

    pub fn get_joint(&self, id: Uuid) -> Result<&Joint, SkeletonError> {
        self.joints.get(&id).ok_or(SkeletonError::JointNotFound(id))
    }

    pub fn get_joint_mut(&mut self, id: Uuid) -> Result<&mut Joint, SkeletonError> {
        self.joints
            .get_mut(&id)
            .ok_or(SkeletonError::JointNotFound(id))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.joints.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joints in creation order
    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.order.iter().filter_map(|id| self.joints.get(id))
    }

    pub fn joint_ids(&self) -> Vec<Uuid> {
        self.order.clone()
    }

    /// Find a joint ID by name (O(1) lookup)
    pub fn find_joint_id_by_name(&self, name: &str) -> Option<Uuid> {
        self.name_index.get(name).copied()
    }

    pub fn find_joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.name_index.get(name).and_then(|id| self.joints.get(id))
    }

    pub fn joint_name(&self, id: Uuid) -> Option<&str> {
        self.joints.get(&id).map(|j| j.name.as_str())
    }

    /// First free name derived from `base` (`base`, `base.001`, `base.002`, ...)
    ///
    /// `owner` is ignored when checking for collisions so a joint can keep its own name.
    pub fn unique_name(&self, base: &str, owner: Option<Uuid>) -> String {
        let taken = |name: &str| {
            self.name_index
                .get(name)
                .is_some_and(|id| Some(*id) != owner)
        };
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}{DUPLICATE_NAME_SEPARATOR}{n:03}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Rename a joint, returning the name actually assigned
    ///
    /// Renaming to the current name is a no-op; a taken name gets a numeric suffix.
    pub fn rename_joint(&mut self, id: Uuid, name: &str) -> Result<String, SkeletonError> {
        let current = self.get_joint(id)?.name.clone();
        if current == name {
            return Ok(current);
        }
        let assigned = self.unique_name(name, Some(id));
        self.name_index.remove(&current);
        self.name_index.insert(assigned.clone(), id);
        if let Some(joint) = self.joints.get_mut(&id) {
            joint.name = assigned.clone();
        }
        Ok(assigned)
    }

    /// Reparent a joint (`None` makes it a root)
    pub fn set_parent(
        &mut self,
        child: Uuid,
        parent: Option<Uuid>,
        connected: bool,
    ) -> Result<(), SkeletonError> {
        self.get_joint(child)?;
        if let Some(parent) = parent {
            self.get_joint(parent)?;
            if parent == child || self.is_ancestor(child, parent) {
                return Err(SkeletonError::WouldCreateCycle);
            }
        }
        let parent_tail = parent.and_then(|p| self.joints.get(&p)).map(|p| p.tail);
        let joint = self.get_joint_mut(child)?;
        joint.parent = parent;
        joint.connected = connected && parent.is_some();
        if joint.connected
            && let Some(tail) = parent_tail
        {
            joint.head = tail;
        }
        self.invalidate_cache();
        Ok(())
    }

    // ============== Hierarchy Queries ==============

    pub fn roots(&self) -> Vec<Uuid> {
        self.ensure_cache_valid();
        self.cache.borrow().roots.clone()
    }

    /// Direct children in creation order
    pub fn children(&self, id: Uuid) -> Vec<Uuid> {
        self.ensure_cache_valid();
        self.cache
            .borrow()
            .children
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of parent hops to the root
    pub fn depth(&self, id: Uuid) -> Option<usize> {
        self.ensure_cache_valid();
        self.cache.borrow().depths.get(&id).copied()
    }

    /// Ancestors of `id`, nearest first (excluding `id`)
    pub fn ancestors(&self, id: Uuid) -> Vec<Uuid> {
        self.ensure_cache_valid();
        let cache = self.cache.borrow();
        cache
            .ancestors
            .get(&id)
            .map(|chain| chain.iter().rev().skip(1).copied().collect())
            .unwrap_or_default()
    }

    /// Whether `ancestor` lies on the path from `id` to its root
    pub fn is_ancestor(&self, ancestor: Uuid, id: Uuid) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// All joints in depth-first order from every root
    pub fn joints_depth_first(&self) -> Vec<Uuid> {
        let mut result = Vec::new();
        for root in self.roots() {
            self.collect_depth_first(root, &mut result);
        }
        result
    }

    fn collect_depth_first(&self, id: Uuid, result: &mut Vec<Uuid>) {
        result.push(id);
        for child in self.children(id) {
            self.collect_depth_first(child, result);
        }
    }

    // ============== Selection ==============

    /// Selected joints in creation order
    pub fn selected_joints(&self) -> Vec<Uuid> {
        self.joints()
            .filter(|j| j.is_selected())
            .map(|j| j.id)
            .collect()
    }

    pub fn active_joint(&self) -> Option<&Joint> {
        self.active.and_then(|id| self.joints.get(&id))
    }

    pub fn select_joint(&mut self, id: Uuid, select: bool) -> Result<(), SkeletonError> {
        self.get_joint_mut(id)?.select(select);
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        for joint in self.joints.values_mut() {
            joint.select(false);
        }
    }

    /// Select `id` and make it active
    pub fn set_active(&mut self, id: Uuid) -> Result<(), SkeletonError> {
        self.select_joint(id, true)?;
        self.active = Some(id);
        Ok(())
    }
}

/// Skeleton-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkeletonError {
    #[error("Joint not found: {0}")]
    JointNotFound(Uuid),
    #[error("Joint not found: {0}")]
    JointNameNotFound(String),
    #[error("Parenting would create a cycle")]
    WouldCreateCycle,
}
