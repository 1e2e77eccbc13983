//! Remote provisioning error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("ssh key generation failed on local host: {0}")]
    KeyGeneration(String),

    #[error("Host ({host}) {action} failed. Reason: {reason}")]
    Operation {
        host: String,
        action: RemoteAction,
        reason: String,
    },

    #[error("invalid setup file: {0}")]
    SetupFile(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    pub fn operation(host: &str, action: RemoteAction, reason: impl Into<String>) -> Self {
        RemoteError::Operation {
            host: host.to_string(),
            action,
            reason: reason.into(),
        }
    }

    /// Host name for failures tied to one host
    pub fn host(&self) -> Option<&str> {
        match self {
            RemoteError::Operation { host, .. } => Some(host),
            _ => None,
        }
    }
}

/// Which remote operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteAction {
    Check,
    Install,
    Uninstall,
}

impl std::fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteAction::Check => write!(f, "check"),
            RemoteAction::Install => write!(f, "install"),
            RemoteAction::Uninstall => write!(f, "uninstall"),
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
