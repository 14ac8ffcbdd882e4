//! Colours for the panel slot, the calendar popup and the tooltip

use serde::{Deserialize, Serialize};

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Convert to tiny-skia Color
    pub fn to_tiny_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

/// Widget theme configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Slot and popup background
    pub background: Color,

    /// Frame drawn around the labels on large panels
    pub border: Color,

    /// Label and day number color
    pub text_primary: Color,

    /// Headings, weekday names and week numbers
    pub text_secondary: Color,

    /// Days that belong to the neighbouring months
    pub text_muted: Color,

    /// Today's cell and the selected day outline
    pub accent: Color,

    /// Tooltip background
    pub tooltip_background: Color,

    /// Background transparency (0.0 = transparent, 1.0 = opaque)
    pub opacity: f32,

    /// Corner radius of the popup and tooltip
    pub corner_radius: f32,
}

/// Accent shared by every theme
const COSMIC_BLUE: Color = Color::rgb(52, 120, 246);

/// Names accepted in the settings file
const THEMES: [(&str, fn() -> Theme); 5] = [
    ("cosmic_dark", Theme::cosmic_dark),
    ("light", Theme::light),
    ("transparent_dark", Theme::transparent_dark),
    ("transparent_light", Theme::transparent_light),
    ("glass", Theme::glass),
];

impl Theme {
    /// Light text on `background`
    fn on_dark(background: Color, opacity: f32, corner_radius: f32) -> Self {
        let see_through = background.a < 200;
        Self {
            background,
            border: if see_through {
                Color::new(255, 255, 255, 60)
            } else {
                Color::rgb(100, 100, 100)
            },
            text_primary: Color::rgb(255, 255, 255),
            text_secondary: Color::new(190, 190, 190, 230),
            text_muted: Color::new(125, 125, 125, 200),
            accent: COSMIC_BLUE,
            tooltip_background: background.with_alpha(240),
            opacity,
            corner_radius,
        }
    }

    /// Dark text on `background`
    fn on_light(background: Color, opacity: f32, corner_radius: f32) -> Self {
        Self {
            background,
            border: Color::new(30, 30, 30, 70),
            text_primary: Color::rgb(20, 20, 20),
            text_secondary: Color::new(70, 70, 70, 230),
            text_muted: Color::new(150, 150, 150, 210),
            accent: COSMIC_BLUE,
            tooltip_background: background.with_alpha(245),
            opacity,
            corner_radius,
        }
    }

    /// COSMIC-inspired dark theme
    pub fn cosmic_dark() -> Self {
        Self::on_dark(Color::new(30, 30, 30, 230), 0.9, 8.0)
    }

    pub fn light() -> Self {
        Self::on_light(Color::new(255, 255, 255, 240), 0.95, 8.0)
    }

    pub fn transparent_dark() -> Self {
        Self::on_dark(Color::new(0, 0, 0, 128), 0.5, 12.0)
    }

    pub fn transparent_light() -> Self {
        Self::on_light(Color::new(255, 255, 255, 128), 0.5, 12.0)
    }

    /// Glass theme (moderate opacity)
    pub fn glass() -> Self {
        Self::on_dark(Color::new(40, 40, 40, 180), 0.7, 16.0)
    }

    /// Get background color with opacity applied
    pub fn background_with_opacity(&self) -> Color {
        self.background
            .with_alpha((self.background.a as f32 * self.opacity) as u8)
    }

    /// Load theme by name
    pub fn from_name(name: &str) -> Self {
        match THEMES.iter().find(|(n, _)| *n == name) {
            Some((_, build)) => build(),
            None => {
                tracing::warn!(theme = name, "Unknown theme, using cosmic_dark");
                Self::cosmic_dark()
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::cosmic_dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_with_alpha() {
        let color = Color::rgb(255, 255, 255).with_alpha(128);
        assert_eq!(color.a, 128);
        assert_eq!(color.to_array(), [255, 255, 255, 128]);
    }

    #[test]
    fn test_theme_opacity() {
        let theme = Theme::transparent_dark();
        let bg = theme.background_with_opacity();
        assert!(bg.a < theme.background.a);
        assert_eq!(bg.r, theme.background.r);
    }

    #[test]
    fn test_theme_from_name() {
        assert_eq!(Theme::from_name("light").background.r, 255);
        assert_eq!(Theme::from_name("transparent_light").text_primary.r, 20);
        assert_eq!(Theme::from_name("glass").opacity, 0.7);

        // Unknown theme defaults to cosmic_dark
        assert_eq!(Theme::from_name("unknown"), Theme::cosmic_dark());
    }

    #[test]
    fn test_every_name_resolves() {
        for (name, build) in THEMES {
            assert_eq!(Theme::from_name(name), build());
        }
    }

    #[test]
    fn test_muted_text_is_dimmer() {
        for theme in [Theme::cosmic_dark(), Theme::glass()] {
            let primary = theme.text_primary;
            let muted = theme.text_muted;
            assert!(u16::from(muted.r) + u16::from(muted.g) < u16::from(primary.r) + u16::from(primary.g));
        }
    }
}
