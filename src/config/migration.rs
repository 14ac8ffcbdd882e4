//! Import of settings written by the legacy panel plugin
//!
//! The legacy format is a flat `key=value` file, optionally split into
//! `[group]` sections, with `#` comments. Only the five datetime keys are
//! read; everything else, malformed lines included, is skipped. Values keep
//! their defaults when a key is missing, and an out-of-range layout keeps the
//! default layout.

use std::path::Path;

use tracing::{debug, warn};

use super::{Config, DatetimeSettings};
use crate::error::ConfigResult;
use crate::layout::Layout;

/// Read a legacy settings file into a full configuration
pub fn import_legacy_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let datetime = parse_legacy_rc(&content)?;

    Ok(Config {
        datetime,
        ..Config::default()
    })
}

/// Parse legacy `key=value` content into datetime settings
pub fn parse_legacy_rc(content: &str) -> ConfigResult<DatetimeSettings> {
    let mut settings = DatetimeSettings::default();

    for (line_no, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!(line = line_no + 1, content = line, "Skipping malformed legacy line");
            continue;
        };

        let key = key.trim();
        let value = value.trim();

        match key {
            "layout" => match value.parse::<i64>().ok().and_then(Layout::from_index) {
                Some(layout) => settings.layout = layout,
                None => warn!(value, "Ignoring invalid legacy layout"),
            },
            "date_font" => settings.date_font = value.to_string(),
            "time_font" => settings.time_font = value.to_string(),
            "date_format" => settings.date_format = value.to_string(),
            "time_format" => settings.time_format = value.to_string(),
            other => debug!(key = other, "Skipping unknown legacy key"),
        }
    }

    Ok(settings)
}
