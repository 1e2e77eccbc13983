//! Remote access collaborator trait

use crate::error::Result;
use async_trait::async_trait;

/// Login used to bootstrap a host before the deploy key is installed
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    /// Default bootstrap login user
    pub const DEFAULT_USER: &'static str = "root";

    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Credentials for the default bootstrap user
    pub fn password(password: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_USER, password)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Remote host key management
///
/// Every operation may touch the network and can fail; callers surface
/// failures as they are and never retry.
#[async_trait]
pub trait RemoteAccess: Send + Sync {
    /// Whether the local deploy key pair exists
    async fn check_keys_exist(&self) -> bool;

    /// Create the local deploy key pair
    async fn generate_keys(&self) -> Result<()>;

    /// Log into `host` with the deploy key
    async fn check_host_reachable(&self, host: &str) -> Result<()>;

    /// Authorize the deploy key on `host`, logging in with `credentials`
    async fn install_remote_access(&self, host: &str, credentials: &Credentials) -> Result<()>;

    /// Revoke the deploy key on `host`, logging in with `credentials`
    async fn uninstall_remote_access(&self, host: &str, credentials: &Credentials) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let credentials = Credentials::password("s3cret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("root"));
        assert!(!debug.contains("s3cret"));
    }
}
