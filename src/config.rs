use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::utils;

pub const DEFAULT_API_BASE_URL: &str = "https://localhost:50001";
pub const DEFAULT_LOOKUPS_PATH: &str = "/api/lookups";
pub const DEFAULT_VENUES_PATH: &str = "/api/venues";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ToastOptions {
    pub position_class: String,
    pub hide_duration_ms: u64,
    pub time_out_ms: u64,
    pub close_button: bool,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            position_class: "toast-top-right".to_string(),
            hide_duration_ms: 300,
            time_out_ms: 5000,
            close_button: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_base_url: String,
    pub lookups_path: String,
    pub venues_path: String,
    pub toast: ToastOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            lookups_path: DEFAULT_LOOKUPS_PATH.to_string(),
            venues_path: DEFAULT_VENUES_PATH.to_string(),
            toast: ToastOptions::default(),
        }
    }
}

impl ClientConfig {
    pub fn lookups_url(&self) -> String {
        utils::join_url(&self.api_base_url, &self.lookups_path)
    }

    pub fn venues_url(&self) -> String {
        utils::join_url(&self.api_base_url, &self.venues_path)
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<ClientConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::load_from(utils::config_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let data = read_config(&path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "falling back to default config");
            ClientConfig::default()
        });
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> ClientConfig {
        self.data.lock().expect("config mutex poisoned").clone()
    }

    pub fn update<F>(&self, transform: F) -> anyhow::Result<ClientConfig>
    where
        F: FnOnce(&mut ClientConfig),
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow!("config mutex poisoned"))?;
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &Path) -> anyhow::Result<ClientConfig> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("unable to read config at {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid config json at {}", path.display()))
}

fn write_config(path: &Path, config: &ClientConfig) -> anyhow::Result<()> {
    utils::ensure_parent(path)
        .with_context(|| format!("unable to create config directory for {}", path.display()))?;
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)
        .with_context(|| format!("unable to write config at {}", path.display()))
}
