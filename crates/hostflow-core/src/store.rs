//! Inventory persistence
//!
//! The whole object graph lives in one JSON file wrapped in a versioned
//! envelope. Saves go through a temp file in the same directory that is
//! renamed over the store, so an interrupted write never leaves a torn file.

use crate::error::{BoxError, InventoryError, Result};
use crate::model::{Inventory, SshAccess};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Current schema version of the persisted inventory
pub const INVENTORY_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct StoredInventory {
    version: u32,
    #[allow(dead_code)]
    updated_at: Option<DateTime<Utc>>,
    inventory: Inventory,
}

#[derive(Debug, Serialize)]
struct StoredInventoryRef<'a> {
    version: u32,
    updated_at: DateTime<Utc>,
    inventory: &'a Inventory,
}

/// Reads and writes the inventory file
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the inventory, or seed a fresh one when no store exists yet
    pub fn load(&self, access: &SshAccess) -> Result<Inventory> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Inventory not found, seeding defaults");
            return Ok(Inventory::new(access));
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| self.load_error(e))?;
        let stored: StoredInventory =
            serde_json::from_str(&content).map_err(|e| self.load_error(e))?;

        if stored.version > INVENTORY_VERSION {
            return Err(InventoryError::UnsupportedVersion {
                found: stored.version,
                supported: INVENTORY_VERSION,
            });
        }

        let inventory = upgrade(stored.version, stored.inventory);
        if let Some(violation) = inventory.integrity_violation() {
            return Err(self.load_error(violation));
        }

        tracing::debug!(
            path = %self.path.display(),
            hosts = inventory.host_names().len(),
            groups = inventory.group_names().len(),
            "Loaded inventory"
        );
        Ok(inventory)
    }

    /// Atomically replace the store with `inventory`
    pub fn save(&self, inventory: &Inventory) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.save_error(e))?;

        let stored = StoredInventoryRef {
            version: INVENTORY_VERSION,
            updated_at: Utc::now(),
            inventory,
        };
        let content = serde_json::to_string_pretty(&stored).map_err(|e| self.save_error(e))?;

        // dropped (and deleted) on any early return below
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.save_error(e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| self.save_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.save_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.save_error(e.error))?;

        tracing::debug!(path = %self.path.display(), "Saved inventory");
        Ok(())
    }

    fn load_error(&self, source: impl Into<BoxError>) -> InventoryError {
        InventoryError::Load {
            path: self.path.clone(),
            source: source.into(),
        }
    }

    fn save_error(&self, source: impl Into<BoxError>) -> InventoryError {
        InventoryError::Save {
            path: self.path.clone(),
            source: source.into(),
        }
    }
}

/// Bring an older persisted inventory up to `INVENTORY_VERSION`
///
/// Version 1 is the only schema so far.
fn upgrade(version: u32, inventory: Inventory) -> Inventory {
    if version < INVENTORY_VERSION {
        tracing::info!(
            from = version,
            to = INVENTORY_VERSION,
            "Upgrading inventory schema"
        );
    }
    inventory
}
