//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
//! 3. Local config: `<dir>/.orgchart.toml`
//! 4. Environment variables: `ORGCHART_*` prefix

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::hierarchy::DEFAULT_PROBATION_DAYS;
use crate::domain::node::DEFAULT_HEADCOUNT_OPEN_IMAGE;
use crate::domain::BuildOptions;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 15 * 60;

/// Unified configuration for orgchart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding employees.json and charts/ (default: ~/.orgchart)
    pub data_dir: PathBuf,
    /// Lifetime of cached hierarchies
    pub cache_ttl_secs: u64,
    /// Days after joining during which an employee is on probation
    pub probation_days: i64,
    /// Person image is `<image_base_url><employeeId>.jpg`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,
    /// Placeholder image for open headcount positions
    pub headcount_open_image: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            probation_days: DEFAULT_PROBATION_DAYS,
            image_base_url: None,
            headcount_open_image: DEFAULT_HEADCOUNT_OPEN_IMAGE.to_string(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub cache_ttl_secs: Option<u64>,
    pub probation_days: Option<i64>,
    pub image_base_url: Option<String>,
    pub headcount_open_image: Option<String>,
}

/// Get the default data directory (~/.orgchart).
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".orgchart"))
        .unwrap_or_else(|| PathBuf::from("~/.orgchart"))
}

/// Get the XDG config directory for orgchart.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgchart").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgchart.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".orgchart.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    pub fn employees_path(&self) -> PathBuf {
        self.data_dir.join(crate::infrastructure::stores::EMPLOYEES_FILE)
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.data_dir.join(crate::infrastructure::stores::CHARTS_DIR)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Builder inputs for a given reference date.
    pub fn build_options(&self, today: NaiveDate) -> BuildOptions {
        BuildOptions {
            today,
            probation_days: self.probation_days,
            image_base_url: self.image_base_url.clone(),
            headcount_open_image: self.headcount_open_image.clone(),
        }
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the data directory.
    fn expand_paths(&mut self) {
        let raw = self.data_dir.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.data_dir = PathBuf::from(expanded.as_ref());
        }
    }

    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            cache_ttl_secs: overlay.cache_ttl_secs.unwrap_or(self.cache_ttl_secs),
            probation_days: overlay.probation_days.unwrap_or(self.probation_days),
            image_base_url: overlay
                .image_base_url
                .clone()
                .or_else(|| self.image_base_url.clone()),
            headcount_open_image: overlay
                .headcount_open_image
                .clone()
                .unwrap_or_else(|| self.headcount_open_image.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// `local_dir` is searched for `.orgchart.toml`.
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path();
        let local = local_dir.map(local_config_path);
        let mut settings = Self::load_from(global.as_deref(), local.as_deref())?;
        settings = Self::apply_env_overrides(settings)?;
        settings.expand_paths();
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults, then the given files when they exist. No environment.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();
        for path in [global, local].into_iter().flatten() {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply ORGCHART_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("ORGCHART")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("cache_ttl_secs") {
            settings.cache_ttl_secs = parse_env("ORGCHART_CACHE_TTL_SECS", &val)?;
        }
        if let Ok(val) = config.get_string("probation_days") {
            settings.probation_days = parse_env("ORGCHART_PROBATION_DAYS", &val)?;
        }
        if let Ok(val) = config.get_string("image_base_url") {
            settings.image_base_url = Some(val).filter(|v| !v.is_empty());
        }
        if let Ok(val) = config.get_string("headcount_open_image") {
            settings.headcount_open_image = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.probation_days < 0 {
            return Err(ApplicationError::Config {
                message: format!("probation_days must be >= 0, got {}", self.probation_days),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ApplicationError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| ApplicationError::Config {
        message: format!("{name}={value:?}: {e}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
