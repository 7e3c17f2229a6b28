//! SignKit Settings Crate
//!
//! Handles configuration of field placement defaults, viewer zoom bounds,
//! and the presentation theme handed to the placement core.

pub mod config;
pub mod error;

pub use config::{Config, PlacementSettings, ThemeSettings, ViewerSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
