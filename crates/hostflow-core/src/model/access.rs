use super::Vars;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Engine variable holding the private key used to reach a host
pub const KEY_FILE_VAR: &str = "ansible_ssh_private_key_file";
/// Engine variable holding the remote admin user
pub const SSH_USER_VAR: &str = "ansible_ssh_user";
/// Engine variable selecting the connection plugin
pub const CONNECTION_VAR: &str = "ansible_connection";

/// Remote-access settings stamped onto groups when they are (re-)created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshAccess {
    pub key_file: PathBuf,
    pub user: String,
}

impl SshAccess {
    pub fn new(key_file: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            key_file: key_file.into(),
            user: user.into(),
        }
    }

    /// Write the connection variables for `mode` into `vars`
    ///
    /// Unrelated variables are left untouched.
    pub fn apply(&self, mode: DeployMode, vars: &mut Vars) {
        match mode {
            DeployMode::Remote => {
                vars.insert(
                    KEY_FILE_VAR.to_string(),
                    self.key_file.display().to_string(),
                );
                vars.insert(SSH_USER_VAR.to_string(), self.user.clone());
                vars.remove(CONNECTION_VAR);
            }
            DeployMode::Local => {
                vars.remove(KEY_FILE_VAR);
                vars.remove(SSH_USER_VAR);
                vars.insert(CONNECTION_VAR.to_string(), "local".to_string());
            }
        }
    }
}

/// How the automation engine reaches the deploy targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployMode {
    /// Over SSH with the configured key and user
    #[default]
    Remote,
    /// Everything runs on the local machine
    Local,
}

impl std::fmt::Display for DeployMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployMode::Remote => write!(f, "remote"),
            DeployMode::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for DeployMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "remote" => Ok(DeployMode::Remote),
            "local" => Ok(DeployMode::Local),
            other => Err(format!("unknown deploy mode: {other} (expected local or remote)")),
        }
    }
}
