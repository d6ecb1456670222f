//! Configuration for omnivalue
//!
//! Tuning knobs for the map pool, map-store growth policy and the archive
//! codec. Settings are process-wide: install them once at startup with
//! [`install_config`], before the first map is allocated.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUCKET_CAPACITIES, DEFAULT_FREE_LIST_DEPTH, DEFAULT_GROW_PERCENT,
    DEFAULT_MAX_ARCHIVE_DEPTH, DEFAULT_SHRINK_PERCENT,
};
use crate::types::ConfigError;
use crate::{log_info, log_warn};

static GLOBAL_CONFIG: OnceCell<ValueConfig> = OnceCell::new();

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueConfig {
    /// Map pool configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// Map store growth policy
    #[serde(default)]
    pub growth: GrowthConfig,

    /// Archive codec configuration
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Map pool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Capacities (in entries) of the pooled blocks, strictly increasing
    #[serde(default = "default_bucket_capacities")]
    pub bucket_capacities: Vec<usize>,

    /// Maximum recycled blocks kept per bucket
    #[serde(default = "default_free_list_depth")]
    pub free_list_depth: usize,
}

/// Map store growth policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// New capacity, in percent of the old one, once past the largest bucket
    #[serde(default = "default_grow_percent")]
    pub grow_percent: usize,

    /// Occupancy, in percent, below which a store moves to a smaller block
    #[serde(default = "default_shrink_percent")]
    pub shrink_percent: usize,
}

/// Archive codec configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Verify written sizes against the computed archived size
    #[serde(default = "default_check_integrity")]
    pub check_integrity: bool,

    /// Deepest map nesting the decoder accepts
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            bucket_capacities: default_bucket_capacities(),
            free_list_depth: default_free_list_depth(),
        }
    }
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            grow_percent: default_grow_percent(),
            shrink_percent: default_shrink_percent(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            check_integrity: default_check_integrity(),
            max_depth: default_max_depth(),
        }
    }
}

// Default value functions for serde
fn default_bucket_capacities() -> Vec<usize> { DEFAULT_BUCKET_CAPACITIES.to_vec() }
fn default_free_list_depth() -> usize { DEFAULT_FREE_LIST_DEPTH }
fn default_grow_percent() -> usize { DEFAULT_GROW_PERCENT }
fn default_shrink_percent() -> usize { DEFAULT_SHRINK_PERCENT }
fn default_check_integrity() -> bool { cfg!(debug_assertions) }
fn default_max_depth() -> usize { DEFAULT_MAX_ARCHIVE_DEPTH }

impl ValueConfig {
    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ValueConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check tuning values for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let buckets = &self.pool.bucket_capacities;
        if buckets.is_empty() {
            return Err(ConfigError::Invalid("pool.bucket_capacities must not be empty".into()));
        }
        if buckets[0] == 0 {
            return Err(ConfigError::Invalid("pool.bucket_capacities must be non-zero".into()));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(
                "pool.bucket_capacities must be strictly increasing".into(),
            ));
        }
        if self.growth.grow_percent <= 100 {
            return Err(ConfigError::Invalid(format!(
                "growth.grow_percent must exceed 100, got {}",
                self.growth.grow_percent
            )));
        }
        if self.growth.shrink_percent >= 50 {
            return Err(ConfigError::Invalid(format!(
                "growth.shrink_percent must be below 50, got {}",
                self.growth.shrink_percent
            )));
        }
        if self.archive.max_depth == 0 {
            return Err(ConfigError::Invalid("archive.max_depth must be non-zero".into()));
        }
        Ok(())
    }
}

/// Install the process-wide configuration.
///
/// Fails when the configuration does not validate, or when one was already
/// installed or already read by the pool.
pub fn install_config(config: ValueConfig) -> Result<(), ConfigError> {
    config.validate()?;
    GLOBAL_CONFIG.set(config).map_err(|_| ConfigError::AlreadyInstalled)
}

/// The process-wide configuration, falling back to (and pinning) the defaults
pub fn global_config() -> &'static ValueConfig {
    GLOBAL_CONFIG.get_or_init(ValueConfig::default)
}

/// Load configuration from file
pub fn load_config(path: &str) -> Result<ValueConfig, ConfigError> {
    let config_str = std::fs::read_to_string(path)?;
    ValueConfig::from_toml_str(&config_str)
}

/// Load configuration from file or use defaults
pub fn load_config_or_default(path: Option<&str>) -> ValueConfig {
    match path {
        Some(path) => match load_config(path) {
            Ok(config) => {
                log_info!("Loaded configuration from: {}", path);
                config
            }
            Err(e) => {
                log_warn!("Failed to load config from {}: {}. Using defaults.", path, e);
                ValueConfig::default()
            }
        },
        None => {
            log_info!("No config file specified, using defaults");
            ValueConfig::default()
        }
    }
}
