use super::Vars;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named node in the group tree
///
/// A group exclusively owns its children; sibling names are unique.
/// Members are host names resolved against the inventory's host registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    name: String,

    #[serde(default)]
    children: Vec<Group>,

    #[serde(default)]
    members: BTreeSet<String>,

    #[serde(default)]
    vars: Vars,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            members: BTreeSet::new(),
            vars: Vars::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Group] {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&Group> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Append a child named `name`, or return the existing one
    pub fn add_child(&mut self, name: &str) -> &mut Group {
        let index = match self.children.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.children.push(Group::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Remove the child named `name`; returns whether one was removed
    pub fn remove_child(&mut self, name: &str) -> bool {
        let before = self.children.len();
        self.children.retain(|c| c.name != name);
        self.children.len() != before
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn member_names(&self) -> Vec<String> {
        self.members.iter().cloned().collect()
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.members.contains(host)
    }

    pub(crate) fn add_member(&mut self, host: &str) -> bool {
        self.members.insert(host.to_string())
    }

    pub(crate) fn remove_member(&mut self, host: &str) -> bool {
        self.members.remove(host)
    }

    /// Drop `host` from this group and every descendant
    pub(crate) fn remove_member_recursive(&mut self, host: &str) {
        self.members.remove(host);
        for child in &mut self.children {
            child.remove_member_recursive(host);
        }
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub(crate) fn vars_mut(&mut self) -> &mut Vars {
        &mut self.vars
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Visit this group and all descendants, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Group)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
