pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;

use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides the hostflow home directory
pub const HOME_ENV: &str = "HOSTFLOW_HOME";

/// Overrides the inventory store location
pub const INVENTORY_PATH_ENV: &str = "HOSTFLOW_INVENTORY_PATH";

/// Inventory store location relative to the home directory
pub const INVENTORY_PATH: &str = "inventory/inventory.json";

/// Resolve the hostflow home directory, creating it if needed
///
/// Search order:
/// 1. HOSTFLOW_HOME environment variable
/// 2. ~/.config/hostflow (platform config dir)
#[tracing::instrument]
pub fn get_home_dir() -> Result<PathBuf> {
    let home = match std::env::var_os(HOME_ENV) {
        Some(path) => PathBuf::from(path),
        None => dirs::config_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join("hostflow"),
    };

    if !home.exists() {
        std::fs::create_dir_all(&home)?;
        debug!(home = %home.display(), "Created hostflow home");
    }

    Ok(home)
}

/// Inventory store path for `home`, honouring HOSTFLOW_INVENTORY_PATH
pub fn inventory_path(home: &Path) -> PathBuf {
    match std::env::var_os(INVENTORY_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => home.join(INVENTORY_PATH),
    }
}

/// Everything a CLI invocation needs to locate and stamp the inventory
#[derive(Debug, Clone)]
pub struct Config {
    pub home: PathBuf,
    pub inventory_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Resolve home, store path and settings from the environment
    pub fn discover() -> Result<Self> {
        let home = get_home_dir()?;
        Self::from_home(home)
    }

    pub fn from_home(home: PathBuf) -> Result<Self> {
        let settings = Settings::load(&home)?;
        let inventory_path = inventory_path(&home);
        Ok(Self {
            home,
            inventory_path,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_home_from_env_is_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let home = temp_dir.path().join("nested").join("hostflow");

        temp_env::with_var(HOME_ENV, Some(&home), || {
            let resolved = get_home_dir().unwrap();
            assert_eq!(resolved, home);
            assert!(resolved.is_dir());
        });
    }

    #[test]
    #[serial]
    fn test_inventory_path_default() {
        temp_env::with_var_unset(INVENTORY_PATH_ENV, || {
            let path = inventory_path(Path::new("/etc/hostflow"));
            assert_eq!(path, PathBuf::from("/etc/hostflow/inventory/inventory.json"));
        });
    }

    #[test]
    #[serial]
    fn test_inventory_path_env_override() {
        temp_env::with_var(INVENTORY_PATH_ENV, Some("/tmp/custom.json"), || {
            let path = inventory_path(Path::new("/etc/hostflow"));
            assert_eq!(path, PathBuf::from("/tmp/custom.json"));
        });
    }

    #[test]
    #[serial]
    fn test_discover() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILENAME),
            "ssh {\n    key-file \"/keys/id_ed25519\"\n}\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                (HOME_ENV, Some(temp_dir.path().as_os_str())),
                (INVENTORY_PATH_ENV, None),
            ],
            || {
                let config = Config::discover().unwrap();
                assert_eq!(config.home, temp_dir.path());
                assert_eq!(
                    config.inventory_path,
                    temp_dir.path().join("inventory/inventory.json")
                );
                assert_eq!(config.settings.ssh_key_file, PathBuf::from("/keys/id_ed25519"));
                assert_eq!(config.settings.ssh_user, DEFAULT_SSH_USER);
            },
        );
    }
}
