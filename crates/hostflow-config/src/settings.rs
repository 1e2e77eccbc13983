//! hostflow.kdl settings
//!
//! ```kdl
//! ssh {
//!     key-file "/home/deploy/.ssh/id_rsa"
//!     user "deploy"
//! }
//! ```

use crate::error::{ConfigError, Result};
use hostflow_core::SshAccess;
use kdl::{KdlDocument, KdlNode};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file name inside the hostflow home
pub const SETTINGS_FILENAME: &str = "hostflow.kdl";

/// Remote admin user when none is configured
pub const DEFAULT_SSH_USER: &str = "hostflow";

/// Resolved global settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Private key used to reach deploy targets
    pub ssh_key_file: PathBuf,
    /// Remote admin user on deploy targets
    pub ssh_user: String,
}

impl Settings {
    /// Built-in defaults relative to the hostflow home
    pub fn defaults(home: &Path) -> Self {
        Self {
            ssh_key_file: home.join("ssh").join("id_rsa"),
            ssh_user: DEFAULT_SSH_USER.to_string(),
        }
    }

    /// Load `hostflow.kdl` from `home`, falling back to defaults
    pub fn load(home: &Path) -> Result<Self> {
        let path = home.join(SETTINGS_FILENAME);
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::defaults(home));
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content, home)
    }

    /// Parse settings text; unset keys keep their defaults
    pub fn parse(content: &str, home: &Path) -> Result<Self> {
        let doc: KdlDocument = content.parse()?;
        let mut settings = Self::defaults(home);

        for node in doc.nodes() {
            if node.name().value() != "ssh" {
                continue;
            }
            let Some(children) = node.children() else {
                continue;
            };
            for child in children.nodes() {
                match child.name().value() {
                    "key-file" => {
                        let value = string_arg(child, "ssh.key-file")?;
                        settings.ssh_key_file = expand_home(value);
                    }
                    "user" => {
                        settings.ssh_user = string_arg(child, "ssh.user")?.to_string();
                    }
                    _ => {}
                }
            }
        }

        if settings.ssh_user.is_empty() {
            return Err(ConfigError::InvalidSetting {
                key: "ssh.user".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(settings)
    }

    /// The values stamped onto inventory groups
    pub fn ssh_access(&self) -> SshAccess {
        SshAccess::new(&self.ssh_key_file, &self.ssh_user)
    }
}

fn string_arg<'a>(node: &'a KdlNode, key: &str) -> Result<&'a str> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| ConfigError::InvalidSetting {
            key: key.to_string(),
            message: "expected a string value".to_string(),
        })
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::defaults(Path::new("/etc/hostflow"));
        assert_eq!(settings.ssh_key_file, PathBuf::from("/etc/hostflow/ssh/id_rsa"));
        assert_eq!(settings.ssh_user, DEFAULT_SSH_USER);
    }

    #[test]
    fn test_parse_ssh_block() {
        let kdl = r#"
ssh {
    key-file "/keys/deploy_rsa"
    user "ops"
}
"#;
        let settings = Settings::parse(kdl, Path::new("/etc/hostflow")).unwrap();
        assert_eq!(settings.ssh_key_file, PathBuf::from("/keys/deploy_rsa"));
        assert_eq!(settings.ssh_user, "ops");

        let access = settings.ssh_access();
        assert_eq!(access.user, "ops");
        assert_eq!(access.key_file, PathBuf::from("/keys/deploy_rsa"));
    }

    #[test]
    fn test_parse_partial_keeps_defaults() {
        let kdl = r#"
ssh {
    user "ops"
}
logging "ignored"
"#;
        let settings = Settings::parse(kdl, Path::new("/etc/hostflow")).unwrap();
        assert_eq!(settings.ssh_key_file, PathBuf::from("/etc/hostflow/ssh/id_rsa"));
        assert_eq!(settings.ssh_user, "ops");
    }

    #[test]
    fn test_parse_non_string_value() {
        let kdl = r#"
ssh {
    user 42
}
"#;
        let err = Settings::parse(kdl, Path::new("/etc/hostflow")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { .. }));
    }

    #[test]
    fn test_parse_empty_user() {
        let kdl = r#"
ssh {
    user ""
}
"#;
        let err = Settings::parse(kdl, Path::new("/etc/hostflow")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { .. }));
    }

    #[test]
    fn test_parse_invalid_kdl() {
        let err = Settings::parse("ssh {", Path::new("/etc/hostflow")).unwrap_err();
        assert!(matches!(err, ConfigError::KdlParse(_)));
    }

    #[test]
    fn test_load_from_home() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILENAME),
            "ssh {\n    user \"deploy\"\n}\n",
        )
        .unwrap();

        let settings = Settings::load(temp_dir.path()).unwrap();
        assert_eq!(settings.ssh_user, "deploy");
    }
}
