//! On-disk state
//!
//! One directory per environment (~/.local/share/dapp-registry/<env>/):
//! - state.json - lists, dapp entries, pending updates, timelock, opt-ins
//! - tokens.json - the tradable token registry
//! - events.log - see [`crate::events::EventLog`]

use crate::registry::RegistryState;
use crate::tokens::TokenRegistry;
use anyhow::{Context, Result};
use registry_core::Paths;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Store for an environment at the default location
    pub fn new(env: &str) -> Self {
        Self::with_dir(Paths::new().state(env))
    }

    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join("state.json")
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.dir.join("tokens.json")
    }

    /// Whether a registry has been deployed here
    pub fn exists(&self) -> bool {
        self.state_path().exists()
    }

    pub fn load_state(&self) -> Result<Option<RegistryState>> {
        read_json(&self.state_path())
    }

    pub fn save_state(&self, state: &RegistryState) -> Result<()> {
        write_json(&self.state_path(), state)
    }

    pub fn load_tokens(&self) -> Result<Option<TokenRegistry>> {
        read_json(&self.tokens_path())
    }

    pub fn save_tokens(&self, tokens: &TokenRegistry) -> Result<()> {
        write_json(&self.tokens_path(), tokens)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let value =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
