//! Named joint groups (bone collections)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named set of joints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointGroup {
    pub name: String,
    pub members: BTreeSet<Uuid>,
}

impl JointGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeSet::new(),
        }
    }

    pub fn contains(&self, joint: Uuid) -> bool {
        self.members.contains(&joint)
    }
}

/// Ordered list of joint groups owned by a skeleton
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointGroups {
    groups: Vec<JointGroup>,
}

impl JointGroups {
    pub fn get(&self, name: &str) -> Option<&JointGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Get a group by name, creating it if missing
    pub fn ensure(&mut self, name: &str) -> &mut JointGroup {
        let index = match self.groups.iter().position(|g| g.name == name) {
            Some(i) => i,
            None => {
                self.groups.push(JointGroup::new(name));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    pub fn assign(&mut self, joint: Uuid, group: &str) {
        self.ensure(group).members.insert(joint);
    }

    /// Remove `joint` from every group
    pub fn unassign_all(&mut self, joint: Uuid) {
        for group in &mut self.groups {
            group.members.remove(&joint);
        }
    }

    /// Make `group` the only group containing `joint`
    pub fn assign_exclusive(&mut self, joint: Uuid, group: &str) {
        self.unassign_all(joint);
        self.assign(joint, group);
    }

    /// Names of the groups containing `joint`
    pub fn groups_of(&self, joint: Uuid) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|g| g.contains(joint))
            .map(|g| g.name.as_str())
            .collect()
    }

    /// Drop members that are not in `keep`
    pub(crate) fn retain_members(&mut self, keep: impl Fn(&Uuid) -> bool) {
        for group in &mut self.groups {
            group.members.retain(|id| keep(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_exclusive() {
        let joint = Uuid::new_v4();
        let mut groups = JointGroups::default();
        groups.assign(joint, "DEF");
        groups.assign(joint, "Bones");
        assert_eq!(groups.groups_of(joint), vec!["DEF", "Bones"]);

        groups.assign_exclusive(joint, "CTRL");
        assert_eq!(groups.groups_of(joint), vec!["CTRL"]);
        // Emptied groups are kept
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let mut groups = JointGroups::default();
        groups.ensure("MCH");
        groups.ensure("MCH");
        assert_eq!(groups.len(), 1);
        assert!(groups.get("MCH").is_some());
    }
}
