//! Studio configuration
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. `orrery.toml` in the working directory (optional)
//! 3. environment variables (`ORRERY_SECTION__KEY`)

use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "orrery.toml";
pub const ENV_PREFIX: &str = "ORRERY_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub window:   WindowConfig,
    pub viewport: ViewportConfig,
    pub scene:    SceneConfig,
    pub debug:    DebugConfig,
}

impl StudioConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads `path` (if it exists) layered over the defaults, then the
    /// environment on top.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut figment = Figment::new();

        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        // ORRERY_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .with_context(|| format!("invalid configuration (file: {})", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title:  String,
    /// Logical pixels.
    pub width:  f64,
    pub height: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title:  "Orrery Studio".to_string(),
            width:  1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Unset keeps the engine default (no MSAA).
    pub antialias:                  Option<bool>,
    pub adapt_to_device_ratio:      bool,
    pub observe_canvas_resize:      bool,
    pub render_children_when_ready: bool,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            antialias:                  None,
            adapt_to_device_ratio:      true,
            observe_canvas_resize:      true,
            render_children_when_ready: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Straight-alpha RGBA the clear color starts from.
    pub clear_color:  [f32; 4],
    /// RGBA the clear color drifts towards.
    pub accent_color: [f32; 4],
    /// Full color cycles per second; 0 holds the start color.
    pub cycle_speed:  f32,
    /// Frames the scene loads before it reports ready.
    pub load_frames:  u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color:  [0.02, 0.02, 0.08, 1.0],
            accent_color: [0.10, 0.18, 0.35, 1.0],
            cycle_speed:  0.1,
            load_frames:  30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// `env_logger` filter; unset defers to `RUST_LOG`.
    pub log_filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config = StudioConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config, StudioConfig::default());
            assert_eq!(config.viewport.antialias, None);
            assert!(config.viewport.observe_canvas_resize);
            assert!(config.viewport.render_children_when_ready);
            assert!(config.scene.load_frames > 0);
            Ok(())
        });
    }

    #[test]
    fn file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                    [window]
                    title = "Bench"

                    [viewport]
                    antialias = true
                    render_children_when_ready = false

                    [scene]
                    cycle_speed = 0.5
                    load_frames = 0
                "#,
            )?;

            let config = StudioConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.window.title, "Bench");
            assert_eq!(config.window.width, 1280.0);
            assert_eq!(config.viewport.antialias, Some(true));
            assert!(!config.viewport.render_children_when_ready);
            assert_eq!(config.scene.cycle_speed, 0.5);
            assert_eq!(config.scene.load_frames, 0);
            Ok(())
        });
    }

    #[test]
    fn environment_wins_over_file() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[window]\nwidth = 800.0\n")?;
            jail.set_env("ORRERY_WINDOW__WIDTH", "1024.0");
            jail.set_env("ORRERY_DEBUG__LOG_FILTER", "orrery_ui=debug");

            let config = StudioConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.window.width, 1024.0);
            assert_eq!(config.debug.log_filter.as_deref(), Some("orrery_ui=debug"));
            Ok(())
        });
    }

    #[test]
    fn malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE, "[viewport]\nantialias = \"sometimes\"\n")?;

            let err = StudioConfig::load().unwrap_err();
            assert!(format!("{err:#}").contains("invalid configuration"));
            Ok(())
        });
    }
}
