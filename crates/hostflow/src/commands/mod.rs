pub mod group;
pub mod host;
pub mod inventory;
pub mod service;

use anyhow::Context as _;
use colored::Colorize;
use hostflow_config::Config;
use hostflow_core::{Inventory, InventoryStore, SshAccess};
use std::collections::BTreeMap;

/// One load → mutate → save cycle against the inventory store
pub struct Context {
    pub config: Config,
    pub store: InventoryStore,
    pub inventory: Inventory,
}

impl Context {
    pub fn load() -> anyhow::Result<Self> {
        let config = Config::discover().context("failed to resolve hostflow configuration")?;
        let store = InventoryStore::new(&config.inventory_path);
        let inventory = store
            .load(&config.settings.ssh_access())
            .context("failed to load inventory")?;

        tracing::debug!(path = %store.path().display(), "Inventory loaded");
        Ok(Self {
            config,
            store,
            inventory,
        })
    }

    pub fn access(&self) -> SshAccess {
        self.config.settings.ssh_access()
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.store
            .save(&self.inventory)
            .context("failed to save inventory")
    }

    /// Fail unless `host` is registered
    pub fn require_host(&self, host: &str) -> anyhow::Result<()> {
        if !self.inventory.contains_host(host) {
            anyhow::bail!(hostflow_core::InventoryError::HostNotFound(host.to_string()));
        }
        Ok(())
    }
}

/// Print a name → names projection as an aligned two column listing
fn print_projection(title: &str, rows: &BTreeMap<String, Vec<String>>) {
    println!("{}", title.bold());
    if rows.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }

    let width = rows.keys().map(|k| k.len()).max().unwrap_or(0).max(14);
    for (name, values) in rows {
        let values = if values.is_empty() {
            "-".dimmed().to_string()
        } else {
            values.join(", ")
        };
        println!("  {:<width$} {}", name.green(), values, width = width);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
