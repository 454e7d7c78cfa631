//! Cached joint hierarchy for traversal queries

use std::collections::HashMap;
use uuid::Uuid;

use super::joint::Joint;

/// Cached tree structure (computed on demand)
#[derive(Debug, Clone, Default)]
pub(super) struct TreeCache {
    /// Depth of each joint (root = 0)
    pub depths: HashMap<Uuid, usize>,
    /// Root-first chain for each joint, ending with the joint itself
    pub ancestors: HashMap<Uuid, Vec<Uuid>>,
    /// Direct children in skeleton order
    pub children: HashMap<Uuid, Vec<Uuid>>,
    pub roots: Vec<Uuid>,
    pub valid: bool,
}

impl TreeCache {
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn rebuild(&mut self, order: &[Uuid], joints: &HashMap<Uuid, Joint>) {
        self.depths.clear();
        self.ancestors.clear();
        self.children.clear();
        self.roots.clear();

        for id in order {
            let Some(joint) = joints.get(id) else {
                continue;
            };
            match joint.parent.filter(|p| joints.contains_key(p)) {
                Some(parent) => self.children.entry(parent).or_default().push(*id),
                None => self.roots.push(*id),
            }
        }

        for &root_id in &self.roots.clone() {
            self.depths.insert(root_id, 0);
            self.ancestors.insert(root_id, vec![root_id]);
            self.build_recursive(root_id, 0, vec![root_id]);
        }

        self.valid = true;
    }

    fn build_recursive(&mut self, joint_id: Uuid, depth: usize, chain: Vec<Uuid>) {
        let Some(child_list) = self.children.get(&joint_id).cloned() else {
            return;
        };
        for child_id in child_list {
            let mut child_chain = chain.clone();
            child_chain.push(child_id);
            self.depths.insert(child_id, depth + 1);
            self.ancestors.insert(child_id, child_chain.clone());
            self.build_recursive(child_id, depth + 1, child_chain);
        }
    }
}
