//! Engine configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock behavior: a 30-day window, a 10-entry cache and 50-150 m
//! hotspot circles.

use std::path::Path;

use hotspots_models::RadiusScale;
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Days-window used when a caller does not pick one.
pub const DEFAULT_DAYS_WINDOW: u32 = 30;

/// Errors that can occur while loading or validating a [`HotspotConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML or has the wrong shape.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config parsed but holds values the engine cannot use.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Tunables for [`crate::HotspotEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct HotspotConfig {
    /// Lookback window in days when the caller passes none.
    pub default_days_window: u32,
    /// Maximum memoized results; `0` disables the cache.
    pub cache_capacity: usize,
    /// Hotspot circle sizing.
    pub radius: RadiusScale,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            default_days_window: DEFAULT_DAYS_WINDOW,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            radius: RadiusScale::default(),
        }
    }
}

impl HotspotConfig {
    /// Parses and validates a TOML config string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`Self::from_toml_str`].
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading hotspot config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_days_window == 0 {
            return Err(ConfigError::Invalid {
                message: "default_days_window must be greater than 0".to_string(),
            });
        }

        let radius = &self.radius;
        for (name, value) in [
            ("radius.min_meters", radius.min_meters),
            ("radius.max_meters", radius.max_meters),
            ("radius.scale_factor", radius.scale_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }

        if radius.min_meters > radius.max_meters {
            return Err(ConfigError::Invalid {
                message: format!(
                    "radius.min_meters ({}) exceeds radius.max_meters ({})",
                    radius.min_meters, radius.max_meters
                ),
            });
        }

        Ok(())
    }
}
