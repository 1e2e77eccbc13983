//! Multi-host setup file
//!
//! ```yaml
//! node-01:
//!   password: s3cret
//! node-02:
//!   uname: admin
//!   password: hunter2
//! ```

use crate::access::Credentials;
use crate::error::{RemoteError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SetupEntry {
    #[serde(default)]
    uname: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Read and validate a setup file
pub fn load_setup_file(path: &Path) -> Result<Vec<(String, Credentials)>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        RemoteError::SetupFile(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_setup_file(&content)
}

/// Parse setup YAML into per-host credentials, sorted by host name
pub fn parse_setup_file(content: &str) -> Result<Vec<(String, Credentials)>> {
    if content.trim().is_empty() {
        return Err(RemoteError::SetupFile("no hosts defined".to_string()));
    }

    let entries: Option<BTreeMap<String, Option<SetupEntry>>> = serde_yaml::from_str(content)?;
    let entries = entries.unwrap_or_default();
    if entries.is_empty() {
        return Err(RemoteError::SetupFile("no hosts defined".to_string()));
    }

    entries
        .into_iter()
        .map(|(host, entry)| {
            let entry = entry.ok_or_else(|| {
                RemoteError::SetupFile(format!("host ({host}) has no password"))
            })?;
            let password = entry.password.ok_or_else(|| {
                RemoteError::SetupFile(format!("host ({host}) has no password"))
            })?;
            let user = entry
                .uname
                .unwrap_or_else(|| Credentials::DEFAULT_USER.to_string());
            Ok((host, Credentials::new(user, password)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_setup_file() {
        let yaml = r#"
node-02:
  uname: admin
  password: hunter2
node-01:
  password: s3cret
"#;
        let hosts = parse_setup_file(yaml).unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(hosts[0].0, "node-01");
        assert_eq!(hosts[0].1, Credentials::new("root", "s3cret"));
        assert_eq!(hosts[1].1, Credentials::new("admin", "hunter2"));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert!(matches!(
            parse_setup_file("").unwrap_err(),
            RemoteError::SetupFile(_)
        ));
        assert!(matches!(
            parse_setup_file("{}").unwrap_err(),
            RemoteError::SetupFile(_)
        ));
    }

    #[test]
    fn test_missing_password_is_rejected() {
        let err = parse_setup_file("node-01:\n  uname: admin\n").unwrap_err();
        assert!(err.to_string().contains("node-01"));

        let err = parse_setup_file("node-01:\n").unwrap_err();
        assert!(matches!(err, RemoteError::SetupFile(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_setup_file(Path::new("/nonexistent/hosts.yml")).unwrap_err();
        assert!(matches!(err, RemoteError::SetupFile(_)));
    }
}
