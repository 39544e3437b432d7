//! Configuration system
//!
//! Any `Serialize + Deserialize + Default` type can implement [`Config`] to
//! be loaded from and saved to `.toml` or `.ron` files. [`AnchorConfig`] is
//! the configuration of the window layer itself.

use std::path::PathBuf;

pub use serde::{Deserialize, Serialize};

use crate::anchor::window::WindowSettings;
use crate::kernel::report::ReportType;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Load configuration from file, falling back to defaults if it is missing
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No configuration at {}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of range
    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Window layer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Default log filter, e.g. `"info"` or `"kraken_anchor=debug"`
    pub log_level: String,
    /// Number of windows opened at startup
    pub initial_windows: u32,
    /// Lowest report level echoed to the log
    pub report_print_level: ReportType,
    /// Lowest report level kept in the report list
    pub report_store_level: ReportType,
    /// Distance from the grab bounds at which wrap grabs warp the pointer
    pub wrap_margin: i32,
    /// Icon directory, overriding the one next to the executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons_dir: Option<PathBuf>,
    /// Settings for windows opened at startup
    pub window: WindowSettings,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            initial_windows: 1,
            report_print_level: ReportType::Warning,
            report_store_level: ReportType::Info,
            wrap_margin: 0,
            icons_dir: None,
            window: WindowSettings::default(),
        }
    }
}

impl Config for AnchorConfig {}

impl AnchorConfig {
    /// Set the default log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set the startup window settings
    pub fn with_window(mut self, window: WindowSettings) -> Self {
        self.window = window;
        self
    }

    /// Set the number of startup windows
    pub fn with_initial_windows(mut self, count: u32) -> Self {
        self.initial_windows = count;
        self
    }

    /// Set report print and store levels
    pub fn with_report_levels(mut self, print: ReportType, store: ReportType) -> Self {
        self.report_print_level = print;
        self.report_store_level = store;
        self
    }

    /// Set the wrap-grab margin
    pub fn with_wrap_margin(mut self, margin: i32) -> Self {
        self.wrap_margin = margin;
        self
    }

    /// Set the icon directory
    pub fn with_icons_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.icons_dir = Some(dir.into());
        self
    }

    /// Check values that cannot be expressed in the types
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level is empty".to_string()));
        }
        if self.wrap_margin < 0 {
            return Err(ConfigError::Invalid(format!("wrap_margin {} is negative", self.wrap_margin)));
        }
        self.window
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("window: {e}")))
    }
}
