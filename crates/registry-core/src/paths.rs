//! Standard paths used by the dapp registry tools

use std::path::PathBuf;

/// Standard paths
pub struct Paths {
    /// Data directory (~/.local/share/dapp-registry)
    pub data: PathBuf,
    /// Config directory (~/.config/dapp-registry)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("dapp-registry");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("dapp-registry");

        Self { data, config }
    }

    /// Rooted somewhere else (tests, sandboxes)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Deployment config file for an environment
    pub fn deployment(&self, env: &str) -> PathBuf {
        self.config.join(format!("{}.yaml", env))
    }

    /// State directory for an environment
    pub fn state(&self, env: &str) -> PathBuf {
        self.data.join(env)
    }

    /// Event log for an environment
    pub fn events(&self, env: &str) -> PathBuf {
        self.state(env).join("events.log")
    }
}
