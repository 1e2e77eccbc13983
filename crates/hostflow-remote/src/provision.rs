//! Host check / install / uninstall workflows

use crate::access::{Credentials, RemoteAccess};
use crate::error::{RemoteError, Result};
use tracing::{debug, info};

/// Result of an install request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    /// The deploy key already worked, nothing was changed
    AlreadyInstalled,
}

/// Drives a [`RemoteAccess`] through the provisioning workflows
pub struct Provisioner<R> {
    remote: R,
}

impl<R: RemoteAccess> Provisioner<R> {
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Generate the local key pair if it is missing
    pub async fn ensure_keys(&self) -> Result<()> {
        if self.remote.check_keys_exist().await {
            return Ok(());
        }
        self.remote.generate_keys().await.map_err(|e| match e {
            e @ RemoteError::KeyGeneration(_) => e,
            other => RemoteError::KeyGeneration(other.to_string()),
        })
    }

    /// Verify that `host` accepts the deploy key
    pub async fn check(&self, host: &str) -> Result<()> {
        self.ensure_keys().await?;
        info!(host = %host, "Starting check of host");
        self.remote.check_host_reachable(host).await?;
        info!(host = %host, "Host check succeeded");
        Ok(())
    }

    /// Authorize the deploy key on `host` unless it already works
    pub async fn install(&self, host: &str, credentials: &Credentials) -> Result<InstallOutcome> {
        self.ensure_keys().await?;

        match self.remote.check_host_reachable(host).await {
            Ok(()) => {
                info!(host = %host, "Install skipped, deploy key already authorized");
                return Ok(InstallOutcome::AlreadyInstalled);
            }
            Err(e) => debug!(host = %host, error = %e, "Host not reachable with deploy key"),
        }

        info!(host = %host, "Starting install of host");
        self.remote.install_remote_access(host, credentials).await?;
        info!(host = %host, "Host install succeeded");
        Ok(InstallOutcome::Installed)
    }

    /// Revoke the deploy key on `host`
    pub async fn uninstall(&self, host: &str, credentials: &Credentials) -> Result<()> {
        self.ensure_keys().await?;
        info!(host = %host, "Starting uninstall of host");
        self.remote.uninstall_remote_access(host, credentials).await?;
        info!(host = %host, "Host uninstall succeeded");
        Ok(())
    }

    /// Install every host in order, collecting one result per host
    ///
    /// A failing host does not stop the others.
    pub async fn install_all(
        &self,
        hosts: &[(String, Credentials)],
    ) -> Vec<(String, Result<InstallOutcome>)> {
        let mut results = Vec::with_capacity(hosts.len());
        for (host, credentials) in hosts {
            let result = self.install(host, credentials).await;
            results.push((host.clone(), result));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteAction;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Scripted RemoteAccess that records every call
    #[derive(Default)]
    struct FakeRemote {
        pub keys: Mutex<bool>,
        pub keygen_fails: bool,
        pub reachable: Mutex<HashSet<String>>,
        pub refuse_install: HashSet<String>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeRemote {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteAccess for FakeRemote {
        async fn check_keys_exist(&self) -> bool {
            *self.keys.lock().unwrap()
        }

        async fn generate_keys(&self) -> Result<()> {
            self.record("keygen".to_string());
            if self.keygen_fails {
                return Err(RemoteError::KeyGeneration("disk full".to_string()));
            }
            *self.keys.lock().unwrap() = true;
            Ok(())
        }

        async fn check_host_reachable(&self, host: &str) -> Result<()> {
            self.record(format!("check {host}"));
            if self.reachable.lock().unwrap().contains(host) {
                Ok(())
            } else {
                Err(RemoteError::operation(host, RemoteAction::Check, "Permission denied"))
            }
        }

        async fn install_remote_access(&self, host: &str, credentials: &Credentials) -> Result<()> {
            self.record(format!("install {host} as {}", credentials.user));
            if self.refuse_install.contains(host) {
                return Err(RemoteError::operation(
                    host,
                    RemoteAction::Install,
                    "Authentication failed",
                ));
            }
            self.reachable.lock().unwrap().insert(host.to_string());
            Ok(())
        }

        async fn uninstall_remote_access(&self, host: &str, _credentials: &Credentials) -> Result<()> {
            self.record(format!("uninstall {host}"));
            self.reachable.lock().unwrap().remove(host);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_check_generates_missing_keys() {
        let provisioner = Provisioner::new(FakeRemote::default());
        let err = provisioner.check("node-01").await.unwrap_err();

        assert_eq!(provisioner.remote().calls(), vec!["keygen", "check node-01"]);
        assert_eq!(err.host(), Some("node-01"));
        assert!(err.to_string().contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_keygen_failure_stops_check() {
        let remote = FakeRemote {
            keygen_fails: true,
            ..Default::default()
        };
        let provisioner = Provisioner::new(remote);
        let err = provisioner.check("node-01").await.unwrap_err();

        assert!(matches!(err, RemoteError::KeyGeneration(_)));
        assert_eq!(provisioner.remote().calls(), vec!["keygen"]);
    }

    #[tokio::test]
    async fn test_install_then_skip() {
        let remote = FakeRemote {
            keys: Mutex::new(true),
            ..Default::default()
        };
        let provisioner = Provisioner::new(remote);
        let credentials = Credentials::password("pw");

        let first = provisioner.install("node-01", &credentials).await.unwrap();
        assert_eq!(first, InstallOutcome::Installed);

        let second = provisioner.install("node-01", &credentials).await.unwrap();
        assert_eq!(second, InstallOutcome::AlreadyInstalled);

        assert_eq!(
            provisioner.remote().calls(),
            vec![
                "check node-01",
                "install node-01 as root",
                "check node-01"
            ]
        );
    }

    #[tokio::test]
    async fn test_uninstall() {
        let remote = FakeRemote {
            keys: Mutex::new(true),
            ..Default::default()
        };
        remote.reachable.lock().unwrap().insert("node-01".to_string());
        let provisioner = Provisioner::new(remote);

        provisioner
            .uninstall("node-01", &Credentials::password("pw"))
            .await
            .unwrap();
        assert!(provisioner.check("node-01").await.is_err());
    }

    #[tokio::test]
    async fn test_install_all_is_not_short_circuited() {
        let remote = FakeRemote {
            keys: Mutex::new(true),
            refuse_install: HashSet::from(["node-01".to_string()]),
            ..Default::default()
        };
        let provisioner = Provisioner::new(remote);
        let hosts = vec![
            ("node-01".to_string(), Credentials::password("pw")),
            ("node-02".to_string(), Credentials::new("admin", "pw")),
        ];

        let results = provisioner.install_all(&hosts).await;
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_err());
        assert_eq!(results[1].1.as_ref().unwrap(), &InstallOutcome::Installed);
        assert!(
            provisioner
                .remote()
                .calls()
                .contains(&"install node-02 as admin".to_string())
        );
    }
}
