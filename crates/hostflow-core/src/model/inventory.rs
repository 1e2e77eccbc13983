use super::{DeployMode, Group, Host, SshAccess, Vars};
use crate::catalog;
use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Root aggregate: the host registry plus the top-level group trees
///
/// Every mutation validates its preconditions before touching the tree, so
/// a failed call leaves the inventory exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    hosts: BTreeMap<String, Host>,

    #[serde(default)]
    groups: BTreeMap<String, Group>,

    #[serde(default)]
    vars: Vars,

    #[serde(default)]
    deploy_mode: DeployMode,
}

impl Inventory {
    /// A new inventory seeded with the default deploy hierarchy
    pub fn new(access: &SshAccess) -> Self {
        let mut inventory = Self::empty();
        for (deploy_name, services) in catalog::DEFAULT_HIERARCHY {
            let group = inventory.stamp_group(deploy_name, access);
            for service_name in *services {
                seed_service(group, service_name);
            }
        }
        debug!(groups = inventory.groups.len(), "Seeded default inventory");
        inventory
    }

    /// An inventory with no hosts and no groups
    pub fn empty() -> Self {
        Self {
            hosts: BTreeMap::new(),
            groups: BTreeMap::new(),
            vars: Vars::new(),
            deploy_mode: DeployMode::default(),
        }
    }

    // --- hosts -------------------------------------------------------------

    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    pub fn host_names(&self) -> Vec<String> {
        self.hosts.keys().cloned().collect()
    }

    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    pub fn contains_host(&self, name: &str) -> bool {
        self.hosts.contains_key(name)
    }

    /// Register a host; a known name is left untouched
    ///
    /// Returns whether a new host was created.
    pub fn add_host(&mut self, name: &str) -> bool {
        if self.hosts.contains_key(name) {
            debug!(host = %name, "Host already registered");
            return false;
        }
        self.hosts.insert(name.to_string(), Host::new(name));
        debug!(host = %name, "Registered host");
        true
    }

    /// Make a registered host a member of a top-level group
    pub fn add_host_to_group(&mut self, host: &str, group: &str) -> Result<()> {
        if !self.groups.contains_key(group) {
            return Err(InventoryError::GroupNotFound(group.to_string()));
        }
        if !self.hosts.contains_key(host) {
            return Err(InventoryError::HostNotFound(host.to_string()));
        }
        if let Some(target) = self.groups.get_mut(group)
            && target.add_member(host)
        {
            debug!(host = %host, group = %group, "Added host to group");
        }
        Ok(())
    }

    /// Remove a host from one group, or from everything when `group` is None
    ///
    /// Without a group the host is also dropped from the registry. An
    /// unknown host is a no-op.
    pub fn remove_host(&mut self, host: &str, group: Option<&str>) -> Result<()> {
        if let Some(group) = group
            && !self.groups.contains_key(group)
        {
            return Err(InventoryError::GroupNotFound(group.to_string()));
        }
        if !self.hosts.contains_key(host) {
            return Ok(());
        }

        match group {
            Some(group) => {
                if let Some(target) = self.groups.get_mut(group) {
                    target.remove_member(host);
                }
                debug!(host = %host, group = %group, "Removed host from group");
            }
            None => {
                for target in self.groups.values_mut() {
                    target.remove_member_recursive(host);
                }
                self.hosts.remove(host);
                debug!(host = %host, "Removed host");
            }
        }
        Ok(())
    }

    pub fn set_host_var(&mut self, host: &str, key: &str, value: &str) -> Result<()> {
        let target = self
            .hosts
            .get_mut(host)
            .ok_or_else(|| InventoryError::HostNotFound(host.to_string()))?;
        target.set_var(key, value);
        Ok(())
    }

    // --- groups ------------------------------------------------------------

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    pub fn group_names(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Create a top-level group if absent and (re-)stamp its connection vars
    ///
    /// Service, unit and `_meta` names are rejected: they would collide with
    /// other entities in the rendered document.
    pub fn add_group(&mut self, name: &str, access: &SshAccess) -> Result<&mut Group> {
        if catalog::is_reserved_group_name(name) {
            return Err(InventoryError::InvalidGroupName(name.to_string()));
        }
        Ok(self.stamp_group(name, access))
    }

    fn stamp_group(&mut self, name: &str, access: &SshAccess) -> &mut Group {
        let mode = self.deploy_mode;
        let group = self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| Group::new(name));
        access.apply(mode, group.vars_mut());
        group
    }

    /// Delete a top-level group and its subtree; returns whether it existed
    pub fn remove_group(&mut self, name: &str) -> bool {
        let removed = self.groups.remove(name).is_some();
        if removed {
            debug!(group = %name, "Removed group");
        }
        removed
    }

    pub fn set_group_var(&mut self, group: &str, key: &str, value: &str) -> Result<()> {
        let target = self
            .groups
            .get_mut(group)
            .ok_or_else(|| InventoryError::GroupNotFound(group.to_string()))?;
        target.set_var(key, value);
        Ok(())
    }

    /// Top-level groups that list `host` as a member
    pub fn groups_for_host(&self, host: &str) -> Vec<&Group> {
        self.groups
            .values()
            .filter(|g| g.contains_host(host))
            .collect()
    }

    // --- services ----------------------------------------------------------

    /// Place a catalog service (and its units) under a top-level group
    pub fn add_service(&mut self, service: &str, group: &str) -> Result<()> {
        let target = self.service_target(service, group)?;
        if !target.has_child(service) {
            seed_service(target, service);
            debug!(service = %service, group = %group, "Added service to group");
        }
        Ok(())
    }

    /// Take a catalog service out of a top-level group
    pub fn remove_service(&mut self, service: &str, group: &str) -> Result<()> {
        let target = self.service_target(service, group)?;
        if target.remove_child(service) {
            debug!(service = %service, group = %group, "Removed service from group");
        }
        Ok(())
    }

    fn service_target(&mut self, service: &str, group: &str) -> Result<&mut Group> {
        let target = self
            .groups
            .get_mut(group)
            .ok_or_else(|| InventoryError::GroupNotFound(group.to_string()))?;
        if !catalog::is_service(service) {
            return Err(InventoryError::ServiceNotFound(service.to_string()));
        }
        Ok(target)
    }

    // --- projections -------------------------------------------------------

    /// host name → names of the top-level groups containing it
    pub fn host_groups(&self) -> BTreeMap<String, Vec<String>> {
        self.hosts
            .keys()
            .map(|host| {
                let groups = self
                    .groups_for_host(host)
                    .into_iter()
                    .map(|g| g.name().to_string())
                    .collect();
                (host.clone(), groups)
            })
            .collect()
    }

    /// group name → member host names
    pub fn group_hosts(&self) -> BTreeMap<String, Vec<String>> {
        self.groups
            .values()
            .map(|g| (g.name().to_string(), g.member_names()))
            .collect()
    }

    /// group name → immediate child (service) names
    pub fn group_services(&self) -> BTreeMap<String, Vec<String>> {
        self.groups
            .values()
            .map(|g| (g.name().to_string(), g.child_names()))
            .collect()
    }

    /// service name → groups containing it, for every catalog service
    ///
    /// Derived from the group tree on every call.
    pub fn service_groups(&self) -> BTreeMap<String, Vec<String>> {
        catalog::service_names()
            .map(|service| {
                let groups = self
                    .groups
                    .values()
                    .filter(|g| g.has_child(service))
                    .map(|g| g.name().to_string())
                    .collect();
                (service.to_string(), groups)
            })
            .collect()
    }

    // --- inventory-wide settings -------------------------------------------

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn deploy_mode(&self) -> DeployMode {
        self.deploy_mode
    }

    /// Switch deploy mode and re-stamp every top-level group's connection vars
    pub fn set_deploy_mode(&mut self, mode: DeployMode, access: &SshAccess) {
        self.deploy_mode = mode;
        for group in self.groups.values_mut() {
            access.apply(mode, group.vars_mut());
        }
        debug!(mode = %mode, "Deploy mode updated");
    }

    /// First structural violation found in a deserialized inventory, if any
    pub(crate) fn integrity_violation(&self) -> Option<String> {
        for (key, group) in &self.groups {
            if catalog::is_reserved_group_name(key) {
                return Some(format!("group name '{}' is reserved", key));
            }
            if key != group.name() {
                return Some(format!(
                    "group stored as '{}' is named '{}'",
                    key,
                    group.name()
                ));
            }
            let mut violation = None;
            group.walk(&mut |node| {
                if violation.is_some() {
                    return;
                }
                if let Some(host) = node.members().find(|h| !self.hosts.contains_key(*h)) {
                    violation = Some(format!(
                        "group '{}' references unknown host '{}'",
                        node.name(),
                        host
                    ));
                    return;
                }
                let names = node.child_names();
                for (i, name) in names.iter().enumerate() {
                    if names[..i].contains(name) {
                        violation = Some(format!(
                            "group '{}' has duplicate child '{}'",
                            node.name(),
                            name
                        ));
                        return;
                    }
                }
            });
            if violation.is_some() {
                return violation;
            }
        }
        for (key, host) in &self.hosts {
            if key != host.name() {
                return Some(format!(
                    "host stored as '{}' is named '{}'",
                    key,
                    host.name()
                ));
            }
        }
        None
    }
}

/// Add `service` under `group` together with its catalog units
fn seed_service(group: &mut Group, service: &str) {
    let node = group.add_child(service);
    if let Some(spec) = catalog::service(service) {
        for unit in spec.units {
            node.add_child(unit);
        }
    }
}
