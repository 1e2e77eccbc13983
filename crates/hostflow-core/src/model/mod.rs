//! Inventory data model
//!
//! Hosts are owned by the inventory's host registry. Groups form a strict
//! tree (deploy group → service → sub-service unit) and refer to their
//! member hosts by name only.

mod access;
mod group;
mod host;
mod inventory;

pub use access::*;
pub use group::*;
pub use host::*;
pub use inventory::*;

use std::collections::BTreeMap;

/// Variable mapping carried by hosts, groups and the inventory itself
pub type Vars = BTreeMap<String, String>;
