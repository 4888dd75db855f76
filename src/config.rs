//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/clustree/clustree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `CLUSTREE_*` prefix, `__` between section and key

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, CreationDefaults};
use crate::domain::{Color, HistoryPolicy, Position, RootPlacement, StoreOptions};

/// How root clusters are positioned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RootPlacementKind {
    /// Center of the viewport
    #[default]
    Center,
    /// Random offset around the viewport center
    Scatter,
}

/// Placement of new clusters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Offset of a child from its parent, on both axes
    pub child_offset: f64,
    pub root_placement: RootPlacementKind,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Maximum per-axis offset for scattered roots
    pub scatter_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            child_offset: 100.0,
            root_placement: RootPlacementKind::Center,
            viewport_width: 400.0,
            viewport_height: 800.0,
            scatter_radius: 150.0,
        }
    }
}

/// Colors and sizes of new clusters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    /// Fill color of root clusters
    pub default_color: Color,
    /// Diameter of root clusters
    pub default_size: f64,
    /// Lightness added per generation (0.1 = +10%)
    pub lighten_step: f64,
    /// Size ratio child/parent
    pub shrink_factor: f64,
    /// Smallest diameter a child can shrink to
    pub min_size: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            default_color: Color::rgb(255, 0, 0),
            default_size: 100.0,
            lighten_step: 0.1,
            shrink_factor: 0.9,
            min_size: 20.0,
        }
    }
}

/// Undo/redo behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    pub policy: HistoryPolicy,
    /// Retained snapshots
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            policy: HistoryPolicy::Structural,
            limit: 256,
        }
    }
}

/// Unified configuration for clustree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub layout: LayoutConfig,
    pub style: StyleConfig,
    pub history: HistoryConfig,
}

/// Get the XDG config directory for clustree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "clustree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("clustree.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Config file given on the command line; must exist
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), explicit, true)
    }

    /// Load from the given files only, optionally layering `CLUSTREE_*` on top.
    pub fn load_from(
        global: Option<&Path>,
        explicit: Option<&Path>,
        with_env: bool,
    ) -> Result<Self, ApplicationError> {
        let mut builder = Config::builder();

        if let Some(path) = global {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }
        if with_env {
            builder = builder.add_source(
                Environment::with_prefix("CLUSTREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config = builder.build().map_err(config_err)?;
        let settings: Self = config.try_deserialize().map_err(config_err)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make the store misbehave.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |message: String| Err(ApplicationError::Config { message });

        if !(self.style.default_size > 0.0) {
            return invalid(format!(
                "style.default_size must be positive, got {}",
                self.style.default_size
            ));
        }
        if !(self.style.min_size > 0.0) {
            return invalid(format!(
                "style.min_size must be positive, got {}",
                self.style.min_size
            ));
        }
        if !(self.style.shrink_factor > 0.0 && self.style.shrink_factor <= 1.0) {
            return invalid(format!(
                "style.shrink_factor must be in (0, 1], got {}",
                self.style.shrink_factor
            ));
        }
        if !(0.0..=1.0).contains(&self.style.lighten_step) {
            return invalid(format!(
                "style.lighten_step must be in [0, 1], got {}",
                self.style.lighten_step
            ));
        }
        if !(self.layout.viewport_width > 0.0 && self.layout.viewport_height > 0.0) {
            return invalid("layout viewport must have positive width and height".to_string());
        }
        if self.layout.scatter_radius < 0.0 {
            return invalid(format!(
                "layout.scatter_radius must not be negative, got {}",
                self.layout.scatter_radius
            ));
        }
        if self.history.limit == 0 {
            return invalid("history.limit must be at least 1".to_string());
        }
        Ok(())
    }

    /// Store rules derived from these settings.
    pub fn store_options(&self) -> StoreOptions {
        let layout = &self.layout;
        let root_placement = match layout.root_placement {
            RootPlacementKind::Center => RootPlacement::Center {
                width: layout.viewport_width,
                height: layout.viewport_height,
            },
            RootPlacementKind::Scatter => RootPlacement::Scatter {
                origin: Position::new(layout.viewport_width / 2.0, layout.viewport_height / 2.0),
                radius: layout.scatter_radius,
            },
        };

        StoreOptions {
            child_offset: layout.child_offset,
            lighten_step: self.style.lighten_step,
            shrink_factor: self.style.shrink_factor,
            min_size: self.style.min_size,
            root_placement,
            history_policy: self.history.policy,
            history_limit: Some(self.history.limit),
        }
    }

    pub fn creation_defaults(&self) -> CreationDefaults {
        CreationDefaults {
            color: self.style.default_color,
            size: self.style.default_size,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# clustree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/clustree/clustree.toml
#   Explicit: clustree --config <file>
#   Env:      CLUSTREE_<SECTION>__<KEY>, e.g. CLUSTREE_LAYOUT__CHILD_OFFSET=50

[layout]
# Offset of a new child from its parent (both axes)
# child_offset = 100.0
# "center" or "scatter"
# root_placement = "center"
# viewport_width = 400.0
# viewport_height = 800.0
# scatter_radius = 150.0

[style]
# default_color = "#ff0000"
# default_size = 100.0
# Lightness added per generation
# lighten_step = 0.1
# shrink_factor = 0.9
# min_size = 20.0

[history]
# "structural" (create/delete only) or "all_edits"
# policy = "structural"
# limit = 256
"##
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_sources_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None, false).expect("load defaults");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn given_defaults_when_deriving_store_options_then_match_store_defaults() {
        assert_eq!(Settings::default().store_options(), StoreOptions::default());
    }

    #[test]
    fn given_scatter_placement_when_deriving_then_centered_origin() {
        let mut settings = Settings::default();
        settings.layout.root_placement = RootPlacementKind::Scatter;
        match settings.store_options().root_placement {
            RootPlacement::Scatter { origin, radius } => {
                assert_eq!(origin, Position::new(200.0, 400.0));
                assert_eq!(radius, 150.0);
            }
            other => panic!("expected scatter, got {other:?}"),
        }
    }

    #[test]
    fn given_shrink_factor_above_one_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.style.shrink_factor = 1.5;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("shrink_factor"));
    }

    #[test]
    fn given_zero_history_limit_when_validating_then_config_error() {
        let mut settings = Settings::default();
        settings.history.limit = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_settings_when_serializing_then_round_trips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("default_color = \"#ff0000\""));
        assert!(text.contains("policy = \"structural\""));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsing_then_yields_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
