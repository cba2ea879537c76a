use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceConfig,
    pub panel: PanelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Hostname or IP of the collaboration device.
    pub host: String,
    pub username: String,
    pub password: String,
    /// Connect over wss:// (plain ws:// otherwise).
    pub tls: bool,
    /// Accept the device's self-signed certificate.
    pub accept_invalid_certs: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: "admin".to_string(),
            password: String::new(),
            tls: true,
            accept_invalid_certs: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Panel id, also the prefix of both toggle widget ids.
    pub panel_id: String,
    pub name: String,
    pub icon: String,
    pub hand_raise_text: String,
    pub active_speaker_text: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            panel_id: "autostager".to_string(),
            name: "Auto Stager 🙌".to_string(),
            icon: "Sliders".to_string(),
            hand_raise_text: "Auto move raised hands to stage".to_string(),
            active_speaker_text: "Show active speaker on stage".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        global::config_file()
    }
}
