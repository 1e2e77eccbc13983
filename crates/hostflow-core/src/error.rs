//! Inventory error types

use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause carried by persistence failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by inventory mutations and the inventory store
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Host name ({0}) does not exist")]
    HostNotFound(String),

    #[error("Group name ({0}) does not exist")]
    GroupNotFound(String),

    #[error("Service name ({0}) does not exist")]
    ServiceNotFound(String),

    #[error("Group name ({0}) is reserved")]
    InvalidGroupName(String),

    #[error("failed to load inventory {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("failed to save inventory {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("inventory version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InventoryError {
    /// A referenced host, group or service name does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            InventoryError::HostNotFound(_)
                | InventoryError::GroupNotFound(_)
                | InventoryError::ServiceNotFound(_)
        )
    }

    /// The inventory could not be read from or written to its store
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            InventoryError::Load { .. }
                | InventoryError::Save { .. }
                | InventoryError::UnsupportedVersion { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
