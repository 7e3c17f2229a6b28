//! Configuration and settings management for SignKit
//!
//! Supports JSON and TOML files, chosen by extension. The default location is
//! `<platform config dir>/signkit/config.toml`.
//!
//! Configuration is organized into logical sections:
//! - Placement defaults (size of newly dropped fields)
//! - Viewer zoom bounds and steps
//! - Theme (recipient colour palette handed explicitly to the placement core)

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use signkit_core::constants::{
    DEFAULT_FIELD_HEIGHT_PERCENT, DEFAULT_FIELD_WIDTH_PERCENT, INITIAL_SCALE, MAX_SCALE,
    MIN_SCALE, SCALE_STEP,
};
use std::path::{Path, PathBuf};

/// Field placement defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSettings {
    /// Width of a new field as a percentage of page width
    pub default_field_width_percent: f64,
    /// Height of a new field as a percentage of page height
    pub default_field_height_percent: f64,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            default_field_width_percent: DEFAULT_FIELD_WIDTH_PERCENT,
            default_field_height_percent: DEFAULT_FIELD_HEIGHT_PERCENT,
        }
    }
}

/// Document viewer zoom settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Scale a freshly loaded document opens at
    pub initial_scale: f64,
    /// Lowest scale the zoom controls reach
    pub min_scale: f64,
    /// Highest scale the zoom controls reach
    pub max_scale: f64,
    /// Amount one zoom in/out click changes the scale
    pub scale_step: f64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            initial_scale: INITIAL_SCALE,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            scale_step: SCALE_STEP,
        }
    }
}

/// Presentation theme
///
/// Passed down to whoever renders recipients and fields; the placement core
/// only reads the palette through `RecipientRoster::color_for`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    /// Theme name, for display only
    pub name: String,
    /// Colour tokens assigned to recipients by list position
    pub recipient_palette: Vec<String>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            recipient_palette: [
                "blue", "emerald", "amber", "violet", "rose", "cyan", "orange", "teal",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Field placement defaults
    pub placement: PlacementSettings,
    /// Viewer zoom settings
    pub viewer: ViewerSettings,
    /// Presentation theme
    pub theme: ThemeSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location for this platform
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("signkit").join("config.toml"))
            .ok_or(SettingsError::NoConfigDirectory)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Load config from file, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let placement = &self.placement;
        let width = placement.default_field_width_percent;
        if !(width > 0.0 && width <= 100.0) {
            return Err(ConfigError::out_of_range(
                "placement.default_field_width_percent",
                width,
            ));
        }
        let height = placement.default_field_height_percent;
        if !(height > 0.0 && height <= 100.0) {
            return Err(ConfigError::out_of_range(
                "placement.default_field_height_percent",
                height,
            ));
        }

        let viewer = &self.viewer;
        if !(viewer.min_scale > 0.0 && viewer.min_scale.is_finite()) {
            return Err(ConfigError::out_of_range("viewer.min_scale", viewer.min_scale));
        }
        if !(viewer.max_scale >= viewer.min_scale && viewer.max_scale.is_finite()) {
            return Err(ConfigError::out_of_range("viewer.max_scale", viewer.max_scale));
        }
        if !(viewer.initial_scale >= viewer.min_scale && viewer.initial_scale <= viewer.max_scale)
        {
            return Err(ConfigError::out_of_range(
                "viewer.initial_scale",
                viewer.initial_scale,
            ));
        }
        if !(viewer.scale_step > 0.0 && viewer.scale_step.is_finite()) {
            return Err(ConfigError::out_of_range("viewer.scale_step", viewer.scale_step));
        }

        if self.theme.recipient_palette.is_empty() {
            return Err(ConfigError::Empty("theme.recipient_palette".to_string()));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.placement.default_field_width_percent, 25.0);
        assert_eq!(config.placement.default_field_height_percent, 6.0);
        assert_eq!(config.viewer.min_scale, 0.5);
        assert_eq!(config.viewer.max_scale, 2.0);
    }

    #[test]
    fn test_validate_rejects_inverted_zoom_bounds() {
        let mut config = Config::default();
        config.viewer.max_scale = 0.4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { ref key, .. }) if key == "viewer.max_scale"
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_field() {
        let mut config = Config::default();
        config.placement.default_field_width_percent = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_palette() {
        let mut config = Config::default();
        config.theme.recipient_palette.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::Empty("theme.recipient_palette".to_string()))
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[viewer]\ninitial_scale = 1.0\n").unwrap();
        assert_eq!(config.viewer.initial_scale, 1.0);
        assert_eq!(config.viewer.max_scale, 2.0);
        assert_eq!(config.placement, PlacementSettings::default());
    }
}
