use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::common::error::{AttendanceError, Result};
use crate::common::paths::{local_config_file, user_config_file};
use crate::core::matcher::MismatchPolicy;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub events: EventsConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: true,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3001 }
fn default_true() -> bool { true }

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f32,
    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            mismatch_policy: MismatchPolicy::default(),
        }
    }
}

/// Euclidean distance under which two face descriptors are the same person.
pub const DEFAULT_DISTANCE_THRESHOLD: f32 = 0.5;

fn default_distance_threshold() -> f32 { DEFAULT_DISTANCE_THRESHOLD }

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AssetsConfig {
    /// Directories served for any path no API route claims, tried in order.
    #[serde(default)]
    pub static_dirs: Vec<PathBuf>,
    /// Directory holding `webcamFaceDetection.html`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EventsConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { channel_capacity: default_channel_capacity() }
    }
}

fn default_channel_capacity() -> usize { 64 }

impl Config {
    /// Resolve the config file: an explicit path must exist, otherwise the
    /// local and per-user locations are tried before falling back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let candidates = std::iter::once(local_config_file()).chain(user_config_file());
        for path in candidates {
            if path.exists() {
                return Self::load_from_path(&path);
            }
        }

        tracing::info!("No config file found, using built-in defaults");
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AttendanceError::Config(format!(
                "Config file not found: {}", path.display()
            )));
        }

        tracing::info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| AttendanceError::Config(format!("Config parse error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AttendanceError::Config(format!("Config serialize error: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(AttendanceError::Config("Server host must not be empty".into()));
        }

        let threshold = self.matching.distance_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(AttendanceError::Config(format!(
                "Distance threshold must be a non-negative number, got {}", threshold
            )));
        }

        if self.events.channel_capacity == 0 || self.events.channel_capacity > 65536 {
            return Err(AttendanceError::Config(format!(
                "Event channel capacity must be between 1 and 65536, got {}",
                self.events.channel_capacity
            )));
        }

        Ok(())
    }
}
