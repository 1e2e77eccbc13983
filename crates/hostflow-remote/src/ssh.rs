//! OpenSSH backed remote access
//!
//! Wraps the `ssh`, `ssh-keygen` and `sshpass` binaries. Password logins go
//! through `sshpass -e` so the password never shows up in the process list.

use crate::access::{Credentials, RemoteAccess};
use crate::error::{RemoteAction, RemoteError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// RemoteAccess over the local OpenSSH client
#[derive(Debug, Clone)]
pub struct SshRemoteAccess {
    key_file: PathBuf,
    user: String,
    connect_timeout: u64,
}

impl SshRemoteAccess {
    pub fn new(key_file: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            key_file: key_file.into(),
            user: user.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    pub fn public_key_file(&self) -> PathBuf {
        let mut name = self.key_file.clone().into_os_string();
        name.push(".pub");
        PathBuf::from(name)
    }

    fn common_options(&self) -> Vec<String> {
        vec![
            "-o".to_string(),
            "StrictHostKeyChecking=no".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout),
        ]
    }

    async fn read_public_key(&self, host: &str, action: RemoteAction) -> Result<String> {
        let path = self.public_key_file();
        let key = tokio::fs::read_to_string(&path).await.map_err(|e| {
            RemoteError::operation(
                host,
                action,
                format!("cannot read public key {}: {}", path.display(), e),
            )
        })?;
        Ok(key.trim().to_string())
    }

    /// Run `script` on `host` as the bootstrap user
    async fn run_with_password(
        &self,
        host: &str,
        credentials: &Credentials,
        action: RemoteAction,
        script: &str,
    ) -> Result<()> {
        let mut cmd = Command::new("sshpass");
        cmd.arg("-e")
            .arg("ssh")
            .args(self.common_options())
            .arg(format!("{}@{}", credentials.user, host))
            .arg(script)
            .env("SSHPASS", &credentials.password);

        tracing::debug!(host = %host, user = %credentials.user, %action, "Running password login");
        run(cmd, host, action).await
    }
}

#[async_trait]
impl RemoteAccess for SshRemoteAccess {
    async fn check_keys_exist(&self) -> bool {
        self.key_file.exists() && self.public_key_file().exists()
    }

    async fn generate_keys(&self) -> Result<()> {
        if let Some(dir) = self.key_file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        tracing::info!(key_file = %self.key_file.display(), "Generating deploy key pair");
        let output = Command::new("ssh-keygen")
            .args(["-q", "-t", "rsa", "-b", "4096", "-N", "", "-C", "hostflow", "-f"])
            .arg(&self.key_file)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RemoteError::KeyGeneration(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RemoteError::KeyGeneration(stderr.trim().to_string()));
        }
        Ok(())
    }

    async fn check_host_reachable(&self, host: &str) -> Result<()> {
        let mut cmd = Command::new("ssh");
        cmd.arg("-i")
            .arg(&self.key_file)
            .args(["-o", "BatchMode=yes"])
            .args(self.common_options())
            .arg(format!("{}@{}", self.user, host))
            .arg("true");

        tracing::debug!(host = %host, user = %self.user, "Checking host");
        run(cmd, host, RemoteAction::Check).await
    }

    async fn install_remote_access(&self, host: &str, credentials: &Credentials) -> Result<()> {
        let key = self.read_public_key(host, RemoteAction::Install).await?;
        let script = install_script(&self.user, &key);
        self.run_with_password(host, credentials, RemoteAction::Install, &script)
            .await
    }

    async fn uninstall_remote_access(&self, host: &str, credentials: &Credentials) -> Result<()> {
        let key = self.read_public_key(host, RemoteAction::Uninstall).await?;
        let script = uninstall_script(&self.user, &key);
        self.run_with_password(host, credentials, RemoteAction::Uninstall, &script)
            .await
    }
}

async fn run(mut cmd: Command, host: &str, action: RemoteAction) -> Result<()> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = cmd
        .output()
        .await
        .map_err(|e| RemoteError::operation(host, action, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = match stderr.trim() {
            "" => format!("exit code {}", output.status.code().unwrap_or(-1)),
            message => message.to_string(),
        };
        return Err(RemoteError::operation(host, action, reason));
    }
    Ok(())
}

/// Quote for a POSIX shell
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Create `user` if needed and append `key` to its authorized_keys once
fn install_script(user: &str, key: &str) -> String {
    let user = shell_escape(user);
    let key = shell_escape(key);
    format!(
        "set -e; \
         id -u {user} >/dev/null 2>&1 || useradd -m {user}; \
         home=$(getent passwd {user} | cut -d: -f6); \
         mkdir -p \"$home/.ssh\"; \
         touch \"$home/.ssh/authorized_keys\"; \
         grep -qxF {key} \"$home/.ssh/authorized_keys\" || echo {key} >> \"$home/.ssh/authorized_keys\"; \
         chown -R {user}: \"$home/.ssh\"; \
         chmod 700 \"$home/.ssh\"; \
         chmod 600 \"$home/.ssh/authorized_keys\""
    )
}

/// Drop `key` from `user`'s authorized_keys; a missing file is fine
fn uninstall_script(user: &str, key: &str) -> String {
    let user = shell_escape(user);
    let key = shell_escape(key);
    format!(
        "set -e; \
         id -u {user} >/dev/null 2>&1 || exit 0; \
         home=$(getent passwd {user} | cut -d: -f6); \
         f=\"$home/.ssh/authorized_keys\"; \
         [ -f \"$f\" ] || exit 0; \
         grep -vxF {key} \"$f\" > \"$f.tmp\" || true; \
         mv \"$f.tmp\" \"$f\"; \
         chown {user}: \"$f\"; \
         chmod 600 \"$f\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_escape() {
        assert_eq!(shell_escape("deploy"), "'deploy'");
        assert_eq!(shell_escape("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_public_key_file() {
        let access = SshRemoteAccess::new("/etc/hostflow/ssh/id_rsa", "deploy");
        assert_eq!(
            access.public_key_file(),
            PathBuf::from("/etc/hostflow/ssh/id_rsa.pub")
        );
    }

    #[test]
    fn test_install_script_quotes_key() {
        let script = install_script("deploy", "ssh-rsa AAAA hostflow");
        assert!(script.contains("useradd -m 'deploy'"));
        assert!(script.contains("grep -qxF 'ssh-rsa AAAA hostflow'"));
    }

    #[test]
    fn test_uninstall_script_tolerates_missing_file() {
        let script = uninstall_script("deploy", "ssh-rsa AAAA hostflow");
        assert!(script.contains("[ -f \"$f\" ] || exit 0"));
        assert!(script.contains("grep -vxF 'ssh-rsa AAAA hostflow'"));
    }

    #[tokio::test]
    async fn test_keys_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let access = SshRemoteAccess::new(temp_dir.path().join("id_rsa"), "deploy");
        assert!(!access.check_keys_exist().await);

        std::fs::write(temp_dir.path().join("id_rsa"), "private").unwrap();
        assert!(!access.check_keys_exist().await);

        std::fs::write(temp_dir.path().join("id_rsa.pub"), "public").unwrap();
        assert!(access.check_keys_exist().await);
    }

    #[tokio::test]
    async fn test_install_without_public_key_reports_host() {
        let temp_dir = tempfile::tempdir().unwrap();
        let access = SshRemoteAccess::new(temp_dir.path().join("id_rsa"), "deploy");

        let err = access
            .install_remote_access("node-01", &Credentials::password("pw"))
            .await
            .unwrap_err();
        assert_eq!(err.host(), Some("node-01"));
        assert!(err.to_string().contains("install failed"));
    }
}
