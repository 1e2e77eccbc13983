//! Dynamic inventory rendering
//!
//! Flattens the group tree into the JSON document the automation engine
//! reads. The engine's format is inverted relative to the in-memory tree:
//! every service and sub-service entity names its parent in a `children`
//! list, and deploy groups have empty `children`.
//!
//! Filtering only prunes `hosts` lists. Every entity is always emitted so
//! the tree shape survives in the output.

use crate::model::{Group, Inventory, Vars};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Restricts rendered host membership to named hosts and/or deploy groups
///
/// `None` on an axis means no restriction on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub hosts: Option<BTreeSet<String>>,
    pub groups: Option<BTreeSet<String>>,
}

impl InventoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = Some(hosts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_active(&self) -> bool {
        self.hosts.is_some() || self.groups.is_some()
    }

    pub fn admits_host(&self, host: &str) -> bool {
        self.hosts.as_ref().is_none_or(|hosts| hosts.contains(host))
    }

    pub fn admits_group(&self, group: &str) -> bool {
        self.groups.as_ref().is_none_or(|groups| groups.contains(group))
    }
}

/// One entity of the rendered document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub hosts: Vec<String>,
    pub children: Vec<String>,
    pub vars: Vars,
}

/// The reserved `_meta` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub hostvars: BTreeMap<String, Vars>,
}

/// Rendered dynamic inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryDocument {
    #[serde(rename = "_meta")]
    pub meta: Meta,

    #[serde(flatten)]
    pub groups: BTreeMap<String, GroupEntry>,
}

impl InventoryDocument {
    pub fn group(&self, name: &str) -> Option<&GroupEntry> {
        self.groups.get(name)
    }

    pub fn host_vars(&self, host: &str) -> Option<&Vars> {
        self.meta.hostvars.get(host)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Inventory {
    /// Render the engine document, optionally narrowed by `filter`
    pub fn render(&self, filter: Option<&InventoryFilter>) -> InventoryDocument {
        let unfiltered = InventoryFilter::default();
        let filter = filter.unwrap_or(&unfiltered);

        let mut groups = BTreeMap::new();
        for deploy in self.groups() {
            let admitted = filter.admits_group(deploy.name());
            emit(&mut groups, deploy, None, admitted, filter);

            for service in deploy.children() {
                emit(&mut groups, service, Some(deploy.name()), admitted, filter);

                for unit in service.children() {
                    emit(&mut groups, unit, Some(service.name()), admitted, filter);
                }
            }
        }

        let hostvars = self
            .hosts()
            .map(|h| (h.name().to_string(), h.vars().clone()))
            .collect();

        tracing::debug!(
            entities = groups.len(),
            filtered = filter.is_active(),
            "Rendered inventory"
        );

        InventoryDocument {
            meta: Meta { hostvars },
            groups,
        }
    }
}

/// Merge one group node into the output
///
/// A service placed under several deploy groups shares one entity: its host
/// list is the union, each parent is listed once, and the first vars win.
fn emit(
    out: &mut BTreeMap<String, GroupEntry>,
    group: &Group,
    parent: Option<&str>,
    admitted: bool,
    filter: &InventoryFilter,
) {
    let entry = out.entry(group.name().to_string()).or_default();

    if admitted {
        for host in group.members().filter(|h| filter.admits_host(h)) {
            if !entry.hosts.iter().any(|known| known == host) {
                entry.hosts.push(host.to_string());
            }
        }
    }

    if let Some(parent) = parent
        && !entry.children.iter().any(|c| c == parent)
    {
        entry.children.push(parent.to_string());
    }

    for (key, value) in group.vars() {
        entry
            .vars
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::model::SshAccess;

    fn access() -> SshAccess {
        SshAccess::new("/home/deploy/.ssh/id_rsa", "deploy")
    }

    fn populated() -> Inventory {
        let mut inv = Inventory::new(&access());
        for host in ["h1", "h2", "h3"] {
            inv.add_host(host);
            for group in ["control", "network", "storage"] {
                inv.add_host_to_group(host, group).unwrap();
            }
        }
        inv
    }

    fn assert_full_shape(doc: &InventoryDocument) {
        for (deploy, services) in catalog::DEFAULT_HIERARCHY {
            let entry = doc.group(deploy).unwrap();
            assert!(entry.children.is_empty());
            for service in *services {
                assert_eq!(doc.group(service).unwrap().children, vec![*deploy]);
                for unit in catalog::service(service).unwrap().units {
                    assert_eq!(doc.group(unit).unwrap().children, vec![*service]);
                }
            }
        }
    }

    #[test]
    fn test_render_single_host() {
        let mut inv = Inventory::new(&access());
        inv.add_host("h1");
        let doc = inv.render(None);

        assert!(doc.host_vars("h1").is_some());
        assert_full_shape(&doc);
        assert_eq!(doc.group("control").unwrap().vars["ansible_ssh_user"], "deploy");
        assert_eq!(doc.group("nova-api").unwrap().children, vec!["nova"]);
    }

    #[test]
    fn test_render_json_shape() {
        let mut inv = Inventory::new(&access());
        inv.add_host("h1");
        inv.set_host_var("h1", "ansible_port", "2222").unwrap();
        inv.add_host_to_group("h1", "control").unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&inv.render(None).to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["_meta"]["hostvars"]["h1"]["ansible_port"], "2222");
        assert_eq!(json["control"]["hosts"], serde_json::json!(["h1"]));
        assert_eq!(json["control"]["children"], serde_json::json!([]));
        assert_eq!(json["keystone"]["children"], serde_json::json!(["control"]));
        assert_eq!(json["keystone"]["hosts"], serde_json::json!([]));
    }

    #[test]
    fn test_filter_by_host() {
        let inv = populated();
        let filter = InventoryFilter::new().with_hosts(["h1"]);
        let doc = inv.render(Some(&filter));

        for group in ["control", "network", "storage"] {
            assert_eq!(doc.group(group).unwrap().hosts, vec!["h1"]);
        }
        assert_full_shape(&doc);
        // hostvars are never filtered
        assert_eq!(doc.meta.hostvars.len(), 3);
    }

    #[test]
    fn test_filter_by_all_hosts_keeps_everything() {
        let inv = populated();
        let filter = InventoryFilter::new().with_hosts(["h1", "h2", "h3"]);
        assert_eq!(inv.render(Some(&filter)), inv.render(None));
    }

    #[test]
    fn test_filter_by_group() {
        let inv = populated();
        let filter = InventoryFilter::new().with_groups(["control"]);
        let doc = inv.render(Some(&filter));

        assert_eq!(doc.group("control").unwrap().hosts, vec!["h1", "h2", "h3"]);
        assert!(doc.group("network").unwrap().hosts.is_empty());
        assert!(doc.group("storage").unwrap().hosts.is_empty());
        assert_full_shape(&doc);
    }

    #[test]
    fn test_filter_on_both_axes() {
        let inv = populated();
        let filter = InventoryFilter::new()
            .with_hosts(["h2"])
            .with_groups(["network", "storage"]);
        let doc = inv.render(Some(&filter));

        assert!(doc.group("control").unwrap().hosts.is_empty());
        assert_eq!(doc.group("network").unwrap().hosts, vec!["h2"]);
        assert_eq!(doc.group("storage").unwrap().hosts, vec!["h2"]);
    }

    #[test]
    fn test_service_under_two_groups_lists_both_parents() {
        let mut inv = Inventory::new(&access());
        inv.add_service("keystone", "compute").unwrap();
        let doc = inv.render(None);

        assert_eq!(
            doc.group("keystone").unwrap().children,
            vec!["compute", "control"]
        );
    }

    #[test]
    fn test_document_round_trips_through_json() {
        let inv = populated();
        let doc = inv.render(None);
        let parsed: InventoryDocument =
            serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }
}
