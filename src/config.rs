use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Remaining seconds at which the one-shot low-time warning fires.
    #[serde(default = "default_low_time_warning_secs")]
    pub low_time_warning_secs: u32,
    /// Whether the question palette sidebar starts visible.
    #[serde(default = "default_palette_visible")]
    pub palette_visible: bool,
    /// Override for the directory holding the results database.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_low_time_warning_secs() -> u32 {
    900
}

fn default_palette_visible() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            low_time_warning_secs: default_low_time_warning_secs(),
            palette_visible: default_palette_visible(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("examsim")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".examsim")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    /// Path of the results database, honoring the data_dir override.
    pub fn results_db_path(&self) -> Result<PathBuf> {
        let dir = match &self.settings.data_dir {
            Some(dir) => {
                if !dir.exists() {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("Failed to create data directory: {:?}", dir))?;
                }
                dir.clone()
            }
            None => Self::get_config_dir()?,
        };
        Ok(dir.join("results.db"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            debug!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        debug!("Saving config to: {:?}", config_path);

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }
}
