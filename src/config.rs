/// User settings
///
/// Settings are stored as JSON in the user's config directory:
/// - Linux: ~/.config/photo-frame/settings.json
/// - macOS: ~/Library/Application Support/photo-frame/settings.json
/// - Windows: %APPDATA%\photo-frame\settings.json
///
/// Every field is optional in the file; missing ones take their defaults.

use log::info;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::OrderingMode;
use crate::error::ConfigError;

/// Overrides the settings file location
pub const SETTINGS_ENV: &str = "PHOTO_FRAME_SETTINGS";
/// Overrides `api_base`
pub const API_ENV: &str = "PHOTO_FRAME_API";

/// The catalog service refuses larger pages
pub const MAX_BATCH_SIZE: usize = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Catalog service root
    pub api_base: String,
    /// Descriptors per page request (1..=100)
    pub batch_size: usize,
    /// Seconds between automatic advances
    pub slide_interval_secs: u64,
    /// How many images ahead of the cursor to preload
    pub lookahead: usize,
    /// Distance from the end of the window that triggers the next page.
    /// Unset means the larger of `lookahead` and 2.
    pub trigger_distance: Option<usize>,
    /// Ordering used at startup
    pub default_ordering: OrderingMode,
    /// Longest edge of decoded payloads, in pixels
    pub preload_max_edge: u32,
    /// Decoded payloads kept in memory
    pub cache_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            batch_size: 10,
            slide_interval_secs: 15,
            lookahead: 5,
            trigger_distance: None,
            default_ordering: OrderingMode::DateAsc,
            preload_max_edge: 2560,
            cache_capacity: 24,
        }
    }
}

impl Settings {
    /// Load settings from `$PHOTO_FRAME_SETTINGS` or the default location,
    /// then apply `$PHOTO_FRAME_API`
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let mut settings = match path {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };

        if let Ok(api_base) = env::var(API_ENV) {
            settings.api_base = api_base;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Read one settings file; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("⚙️  No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        info!("⚙️  Settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("photo-frame");
        path.push("settings.json");
        Some(path)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(ConfigError::Invalid(format!(
                "batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.slide_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "slide_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        self.api_url()?;
        Ok(())
    }

    pub fn api_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_base)
            .map_err(|e| ConfigError::Invalid(format!("api_base {:?}: {}", self.api_base, e)))
    }

    pub fn trigger_distance(&self) -> usize {
        self.trigger_distance.unwrap_or_else(|| self.lookahead.max(2))
    }

    pub fn slide_interval(&self) -> Duration {
        Duration::from_secs(self.slide_interval_secs)
    }

    /// The part of the settings the slideshow controller cares about
    pub fn options(&self) -> Options {
        Options {
            batch_size: self.batch_size,
            lookahead: self.lookahead,
            trigger_distance: self.trigger_distance(),
            slide_interval: self.slide_interval(),
            default_ordering: self.default_ordering,
        }
    }
}

/// Slideshow controller tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub batch_size: usize,
    /// Preload look-ahead (K)
    pub lookahead: usize,
    /// Fetch trigger distance (D)
    pub trigger_distance: usize,
    /// Advance timer period
    pub slide_interval: Duration,
    pub default_ordering: OrderingMode,
}

impl Default for Options {
    fn default() -> Self {
        Settings::default().options()
    }
}
