//! hostflow core: deploy target inventory
//!
//! Keeps the hierarchy of deploy groups, services and sub-service units
//! together with the hosts assigned to them, and renders it into the
//! dynamic-inventory JSON consumed by the automation engine.
//!
//! # Overview
//!
//! - **Model**: [`Inventory`] owns every [`Host`] and every top-level [`Group`] tree
//! - **Catalog**: the closed set of deploy groups, services and units
//! - **Render**: tree → engine document, optionally narrowed by an [`InventoryFilter`]
//! - **Store**: versioned JSON file with atomic replace on save

pub mod catalog;
pub mod error;
pub mod model;
pub mod render;
pub mod store;

pub use error::*;
pub use model::*;
pub use render::*;
pub use store::*;
