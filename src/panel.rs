//! Panel orientation and size handling
//!
//! The slot follows the panel it belongs to: a panel along the top or bottom
//! edge is horizontal, one along the left or right edge is vertical.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Panel sizes above this many pixels get a border around the labels
pub const BORDER_SIZE_THRESHOLD: u32 = 26;

/// Border width used on panels larger than [`BORDER_SIZE_THRESHOLD`]
pub const LARGE_PANEL_BORDER: u32 = 2;

/// Screen edge a panel is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelAnchor {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl PanelAnchor {
    /// Orientation of a panel attached to this edge
    pub fn orientation(self) -> Orientation {
        match self {
            PanelAnchor::Top | PanelAnchor::Bottom => Orientation::Horizontal,
            PanelAnchor::Left | PanelAnchor::Right => Orientation::Vertical,
        }
    }

    /// Parse an edge name as written in panel configuration files
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Top" | "top" => Some(PanelAnchor::Top),
            "Bottom" | "bottom" => Some(PanelAnchor::Bottom),
            "Left" | "left" => Some(PanelAnchor::Left),
            "Right" | "right" => Some(PanelAnchor::Right),
            other => {
                warn!(value = other, "Unknown panel anchor");
                None
            }
        }
    }
}

/// Direction the panel runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Panel along the top or bottom screen edge
    #[default]
    Horizontal,
    /// Panel along the left or right screen edge
    Vertical,
}

impl FromStr for Orientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            _ => anyhow::bail!(
                "Invalid orientation '{}', must be 'horizontal' or 'vertical'",
                s
            ),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Horizontal => f.write_str("horizontal"),
            Orientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// Border width for a panel of `size` pixels
pub fn border_width_for_size(size: u32) -> u32 {
    if size > BORDER_SIZE_THRESHOLD {
        LARGE_PANEL_BORDER
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_orientation() {
        assert_eq!(PanelAnchor::Top.orientation(), Orientation::Horizontal);
        assert_eq!(PanelAnchor::Bottom.orientation(), Orientation::Horizontal);
        assert_eq!(PanelAnchor::Left.orientation(), Orientation::Vertical);
        assert_eq!(PanelAnchor::Right.orientation(), Orientation::Vertical);
    }

    #[test]
    fn test_parse_anchor() {
        assert_eq!(PanelAnchor::parse("Top"), Some(PanelAnchor::Top));
        assert_eq!(PanelAnchor::parse("left\n"), Some(PanelAnchor::Left));
        assert_eq!(PanelAnchor::parse("Unknown"), None);
    }

    #[test]
    fn test_border_width() {
        assert_eq!(border_width_for_size(24), 0);
        assert_eq!(border_width_for_size(26), 0);
        assert_eq!(border_width_for_size(27), 2);
        assert_eq!(border_width_for_size(48), 2);
    }

    #[test]
    fn test_orientation_from_str() {
        assert_eq!(
            "vertical".parse::<Orientation>().unwrap(),
            Orientation::Vertical
        );
        assert!("diagonal".parse::<Orientation>().is_err());
    }
}
