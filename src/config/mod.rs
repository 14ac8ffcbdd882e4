// Configuration management

pub mod migration;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::layout::Layout;
use crate::panel::Orientation;
use crate::position::Position;
use crate::theme::Theme;
use crate::widget::calendar::WeekStart;

/// Directory name under the user's config dir
pub const APP_DIR: &str = "datetime-panel-widget";

/// Settings file name
pub const CONFIG_FILE: &str = "config.toml";

/// Legacy key=value settings file imported when no TOML file exists
pub const LEGACY_FILE: &str = "datetime.rc";

pub const DEFAULT_DATE_FONT: &str = "Bitstream Vera Sans 8";
pub const DEFAULT_TIME_FONT: &str = "Bitstream Vera Sans 10";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Theme name: "cosmic_dark", "light", "transparent_dark", "transparent_light", "glass"
    #[serde(default = "default_theme")]
    pub theme: String,

    /// What the widget shows and how
    #[serde(default)]
    pub datetime: DatetimeSettings,

    /// Where the panel slot sits
    #[serde(default)]
    pub panel: PanelConfig,

    /// Calendar popup options
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// The persisted widget settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatetimeSettings {
    /// Which labels are shown and in what order
    #[serde(default)]
    pub layout: Layout,

    /// Font description for the date label, e.g. "Sans Bold 9"
    #[serde(default = "default_date_font")]
    pub date_font: String,

    /// Font description for the time label
    #[serde(default = "default_time_font")]
    pub time_font: String,

    /// strftime-style date format, empty to hide the date
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// strftime-style time format, empty to hide the time
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Slot position: "top-left", "top-center", "top-right", "center-left", "center",
    /// "center-right", "bottom-left", "bottom-center", "bottom-right"
    #[serde(default)]
    pub position: Position,

    /// Panel thickness in pixels
    #[serde(default = "default_panel_size")]
    pub size: u32,

    /// Margins from screen edges
    #[serde(default)]
    pub margin: Margin,

    /// Overrides the orientation implied by the position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub bottom: i32,
    #[serde(default)]
    pub left: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// First day of the week in the calendar grid
    #[serde(default)]
    pub week_start: WeekStart,
}

fn default_theme() -> String {
    "cosmic_dark".to_string()
}
fn default_date_font() -> String {
    DEFAULT_DATE_FONT.to_string()
}
fn default_time_font() -> String {
    DEFAULT_TIME_FONT.to_string()
}
fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}
fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}
fn default_panel_size() -> u32 {
    32
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            datetime: DatetimeSettings::default(),
            panel: PanelConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Default for DatetimeSettings {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            date_font: default_date_font(),
            time_font: default_time_font(),
            date_format: default_date_format(),
            time_format: default_time_format(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            position: Position::default(),
            size: default_panel_size(),
            margin: Margin::default(),
            orientation: None,
        }
    }
}

impl PanelConfig {
    /// Configured orientation, or the one implied by the position
    pub fn orientation(&self) -> Orientation {
        self.orientation
            .unwrap_or_else(|| self.position.default_orientation())
    }
}

impl Config {
    /// Get the path to the configuration file
    pub fn config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Path of the legacy settings file that sits next to `config_path`
    pub fn legacy_path_for(config_path: &Path) -> PathBuf {
        config_path.with_file_name(LEGACY_FILE)
    }

    /// Load configuration from `path`
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path`, importing the legacy file next to it when `path` does not
    /// exist yet. Neither file existing yields the defaults.
    pub fn load_or_migrate(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let legacy = Self::legacy_path_for(path);
        if !legacy.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let config = migration::import_legacy_file(&legacy)?;
        info!(from = %legacy.display(), to = %path.display(), "Imported legacy settings");

        if let Err(e) = config.save_to(path) {
            warn!(error = %e, "Failed to write imported settings");
        }
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any error so that a
    /// broken file never prevents the widget from starting
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_or_migrate(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load configuration, using defaults");
            Self::default()
        })
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Resolve the configured theme
    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.theme)
    }
}
