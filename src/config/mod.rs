use crate::models::MonitorConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration file name inside the configuration directory.
pub const CONFIG_FILE: &str = "steamwatch.yaml";

/// Prefix of environment variables overriding config values
/// (`STEAMWATCH_INTERVAL_SECONDS=30`).
pub const ENV_PREFIX: &str = "STEAMWATCH";

/// Configuration manager for loading and saving the monitor configuration.
///
/// Values are layered, lowest priority first: built-in defaults, the
/// `steamwatch.yaml` file (optional), then `STEAMWATCH_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing `steamwatch.yaml`; created if missing
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE),
            config_dir,
        })
    }

    /// Load the monitor configuration.
    ///
    /// # Returns
    /// The layered MonitorConfig; defaults when neither file nor environment set anything
    pub fn load_monitor_config(&self) -> Result<MonitorConfig> {
        self.load_with_env(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn load_with_env(&self, env: config::Environment) -> Result<MonitorConfig> {
        if !self.config_path.exists() {
            tracing::info!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
        }

        let defaults = config::Config::try_from(&MonitorConfig::default())
            .context("Failed to build default monitor config")?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(self.config_path.as_std_path()).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read monitor config: {}", self.config_path))?;

        let config: MonitorConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to parse monitor config: {}", self.config_path))?;

        tracing::info!("Loaded monitor config from {}", self.config_path);
        Ok(config)
    }

    /// Save the monitor configuration file.
    ///
    /// # Arguments
    /// * `config` - The MonitorConfig to save
    pub fn save_monitor_config(&self, config: &MonitorConfig) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(config)
            .context("Failed to serialize monitor config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write monitor config: {}", self.config_path))?;

        tracing::info!("Saved monitor config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Get the configuration file path.
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
