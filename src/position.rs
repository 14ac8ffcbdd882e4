//! Where the panel slot sits on screen
//!
//! A position names a row (top, center, bottom) and a column (left, center,
//! right). Each non-center part becomes a Layer Shell anchor; the compositor
//! centres the slot along any axis left unanchored.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use smithay_client_toolkit::shell::wlr_layer::Anchor;
use std::fmt;
use std::str::FromStr;

use crate::config::Margin;
use crate::panel::{Orientation, PanelAnchor};
use crate::placement::{Point, Rect, Size};

/// Slot position, written in kebab-case in the settings file ("top-right")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

/// Settings names, in row-major order
const NAMES: [(Position, &str); 9] = [
    (Position::TopLeft, "top-left"),
    (Position::TopCenter, "top-center"),
    (Position::TopRight, "top-right"),
    (Position::CenterLeft, "center-left"),
    (Position::Center, "center"),
    (Position::CenterRight, "center-right"),
    (Position::BottomLeft, "bottom-left"),
    (Position::BottomCenter, "bottom-center"),
    (Position::BottomRight, "bottom-right"),
];

impl Position {
    /// Layer Shell anchors: one per screen edge the slot touches.
    ///
    /// ```
    /// use datetime_panel_widget::Position;
    /// use smithay_client_toolkit::shell::wlr_layer::Anchor;
    ///
    /// assert_eq!(Position::TopLeft.to_anchor(), Anchor::TOP | Anchor::LEFT);
    /// assert_eq!(Position::CenterRight.to_anchor(), Anchor::RIGHT);
    /// assert_eq!(Position::Center.to_anchor(), Anchor::empty());
    /// ```
    pub fn to_anchor(self) -> Anchor {
        let mut anchor = Anchor::empty();
        anchor.set(Anchor::TOP, self.is_top());
        anchor.set(Anchor::BOTTOM, self.is_bottom());
        anchor.set(Anchor::LEFT, self.is_left());
        anchor.set(Anchor::RIGHT, self.is_right());
        anchor
    }

    pub fn as_str(self) -> &'static str {
        NAMES
            .iter()
            .find(|(p, _)| *p == self)
            .map_or("top-right", |(_, name)| *name)
    }

    /// Every accepted settings name
    pub fn all_variants() -> impl Iterator<Item = &'static str> {
        NAMES.iter().map(|(_, name)| *name)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Position::TopLeft | Position::TopCenter | Position::TopRight)
    }

    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            Position::BottomLeft | Position::BottomCenter | Position::BottomRight
        )
    }

    pub fn is_left(self) -> bool {
        matches!(self, Position::TopLeft | Position::CenterLeft | Position::BottomLeft)
    }

    pub fn is_right(self) -> bool {
        matches!(
            self,
            Position::TopRight | Position::CenterRight | Position::BottomRight
        )
    }

    /// Screen edge whose panel this slot belongs to
    ///
    /// Top and bottom rows win over the left and right columns, so corners
    /// belong to horizontal panels. The screen centre has no edge.
    pub fn panel_edge(self) -> Option<PanelAnchor> {
        if self.is_top() {
            Some(PanelAnchor::Top)
        } else if self.is_bottom() {
            Some(PanelAnchor::Bottom)
        } else if self.is_left() {
            Some(PanelAnchor::Left)
        } else if self.is_right() {
            Some(PanelAnchor::Right)
        } else {
            None
        }
    }

    /// Orientation implied by the panel edge, horizontal when there is none
    pub fn default_orientation(self) -> Orientation {
        self.panel_edge()
            .map(PanelAnchor::orientation)
            .unwrap_or_default()
    }

    /// Top left corner of a slot of `size` on a `screen`, following the
    /// compositor's anchoring rules: anchored edges keep their margin,
    /// unanchored axes are centered and ignore margins.
    pub fn origin(self, screen: Size, size: Size, margin: &Margin) -> Point {
        let x = if self.is_left() {
            margin.left
        } else if self.is_right() {
            screen.width - size.width - margin.right
        } else {
            (screen.width - size.width) / 2
        };

        let y = if self.is_top() {
            margin.top
        } else if self.is_bottom() {
            screen.height - size.height - margin.bottom
        } else {
            (screen.height - size.height) / 2
        };

        Point::new(x, y)
    }

    /// Screen rectangle occupied by a slot of `size`; the popup trigger
    pub fn slot_rect(self, screen: Size, size: Size, margin: &Margin) -> Rect {
        Rect::from_parts(self.origin(screen, size, margin), size)
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(p, _)| *p)
            .ok_or_else(|| {
                anyhow!(
                    "Invalid position '{}', must be one of: {}",
                    s,
                    Position::all_variants().collect::<Vec<_>>().join(", ")
                )
            })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test]
    fn test_names_round_trip() {
        for name in Position::all_variants() {
            let position = Position::from_str(name).unwrap();
            assert_eq!(position.as_str(), name);
            assert_eq!(position.to_string(), name);
        }
        assert_eq!(Position::all_variants().count(), 9);
    }

    #[test_case("invalid"; "unknown")]
    #[test_case("top_left"; "underscore")]
    #[test_case("TOP-LEFT"; "upper case")]
    #[test]
    fn test_invalid_names(name: &str) {
        assert!(Position::from_str(name).is_err());
    }

    #[test_case(Position::TopLeft, Anchor::TOP | Anchor::LEFT; "corner")]
    #[test_case(Position::BottomRight, Anchor::BOTTOM | Anchor::RIGHT; "opposite corner")]
    #[test_case(Position::TopCenter, Anchor::TOP; "top edge")]
    #[test_case(Position::CenterLeft, Anchor::LEFT; "left edge")]
    #[test_case(Position::Center, Anchor::empty(); "centre")]
    #[test]
    fn test_anchor(position: Position, expected: Anchor) {
        assert_eq!(position.to_anchor(), expected);
    }

    #[test]
    fn test_settings_file_spelling() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Panel {
            position: Position,
        }

        let serialized = toml::to_string(&Panel {
            position: Position::BottomCenter,
        })
        .unwrap();
        assert!(serialized.contains("\"bottom-center\""));

        let parsed: Panel = toml::from_str("position = \"center-right\"").unwrap();
        assert_eq!(parsed.position, Position::CenterRight);
        assert!(toml::from_str::<Panel>("position = \"middle\"").is_err());
    }

    #[test]
    fn test_panel_edge_and_orientation() {
        assert_eq!(Position::default(), Position::TopRight);
        assert_eq!(Position::TopRight.panel_edge(), Some(PanelAnchor::Top));
        assert_eq!(Position::BottomLeft.panel_edge(), Some(PanelAnchor::Bottom));
        assert_eq!(Position::CenterLeft.panel_edge(), Some(PanelAnchor::Left));
        assert_eq!(Position::Center.panel_edge(), None);

        assert_eq!(Position::TopRight.default_orientation(), Orientation::Horizontal);
        assert_eq!(Position::CenterRight.default_orientation(), Orientation::Vertical);
        assert_eq!(Position::Center.default_orientation(), Orientation::Horizontal);
    }

    #[test]
    fn test_origin() {
        let screen = Size::new(1920, 1080);
        let size = Size::new(100, 32);
        let margin = Margin {
            top: 4,
            right: 8,
            bottom: 0,
            left: 2,
        };

        assert_eq!(Position::TopLeft.origin(screen, size, &margin), Point::new(2, 4));
        assert_eq!(
            Position::TopRight.origin(screen, size, &margin),
            Point::new(1812, 4)
        );
        assert_eq!(
            Position::BottomCenter.origin(screen, size, &margin),
            Point::new(910, 1048)
        );
        assert_eq!(
            Position::CenterRight.slot_rect(screen, size, &margin),
            Rect::new(1812, 524, 100, 32)
        );
    }
}
