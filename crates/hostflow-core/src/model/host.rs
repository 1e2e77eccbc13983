use super::Vars;
use serde::{Deserialize, Serialize};

/// A single deployable machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    name: String,

    /// Human friendly alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Whether this host is the management node
    #[serde(default)]
    pub is_management: bool,

    /// Hypervisor this host runs on, if virtualised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypervisor: Option<String>,

    #[serde(default)]
    vars: Vars,
}

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            is_management: false,
            hypervisor: None,
            vars: Vars::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove_var(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}
