// Font descriptions and font loading

use fontdue::{Font, FontSettings};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, WidgetError};

/// Size used when a description does not name one
pub const DEFAULT_SIZE_PT: f32 = 10.0;

/// Family used when a description names only a style or size
pub const DEFAULT_FAMILY: &str = "Sans";

/// Font weight for text rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    /// Regular/normal weight
    #[default]
    Regular,
    /// Bold weight
    Bold,
}

/// Font slant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// A parsed `"[FAMILY] [STYLE...] [SIZE]"` font description, e.g.
/// `"Bitstream Vera Sans 8"` or `"Sans Bold Italic 10"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescription {
    pub family: String,
    pub weight: FontWeight,
    pub style: FontStyle,
    /// Size in points, or pixels when `absolute` is set
    pub size: f32,
    /// Size was given in pixels (`"12px"`)
    pub absolute: bool,
}

impl FontDescription {
    /// Parse a description. Unknown trailing words are treated as part of
    /// the family name; anything unparseable falls back to defaults.
    pub fn parse(desc: &str) -> Self {
        let mut words: Vec<&str> = desc.split_whitespace().collect();
        let mut size = DEFAULT_SIZE_PT;
        let mut absolute = false;
        let mut weight = FontWeight::Regular;
        let mut style = FontStyle::Normal;

        if let Some(last) = words.last() {
            let (number, px) = match last.strip_suffix("px") {
                Some(n) => (n, true),
                None => (*last, false),
            };
            if let Ok(parsed) = number.parse::<f32>() {
                if parsed > 0.0 && parsed.is_finite() {
                    size = parsed;
                    absolute = px;
                }
                words.pop();
            }
        }

        while let Some(last) = words.last() {
            match last.to_ascii_lowercase().as_str() {
                "bold" | "heavy" | "black" | "semi-bold" | "semibold" | "demi-bold"
                | "ultra-bold" | "extra-bold" => weight = FontWeight::Bold,
                "italic" | "oblique" => style = FontStyle::Italic,
                "regular" | "normal" | "book" | "medium" | "light" | "thin"
                | "ultra-light" | "semi-light" => {}
                _ => break,
            }
            words.pop();
        }

        // Pango allows a comma separated family list; the first entry wins
        let joined = words.join(" ");
        let family = joined
            .split(',')
            .next()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_FAMILY)
            .to_string();

        Self {
            family,
            weight,
            style,
            size,
            absolute,
        }
    }

    /// Pixel size at 96 DPI
    pub fn size_px(&self) -> f32 {
        if self.absolute {
            self.size
        } else {
            self.size * 96.0 / 72.0
        }
    }

    /// fontconfig pattern selecting this face
    pub fn fc_pattern(&self) -> String {
        let mut pattern = self.family.clone();
        if self.weight == FontWeight::Bold {
            pattern.push_str(":weight=bold");
        }
        if self.style == FontStyle::Italic {
            pattern.push_str(":slant=italic");
        }
        pattern
    }
}

impl fmt::Display for FontDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.weight == FontWeight::Bold {
            write!(f, " Bold")?;
        }
        if self.style == FontStyle::Italic {
            write!(f, " Italic")?;
        }
        if self.absolute {
            write!(f, " {}px", self.size)
        } else {
            write!(f, " {}", self.size)
        }
    }
}

impl Default for FontDescription {
    fn default() -> Self {
        Self::parse(DEFAULT_FAMILY)
    }
}

/// Index of a loaded font inside a [`FontManager`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FontId(usize);

/// Loads font files on demand and hands out stable ids for them
pub struct FontManager {
    fonts: Vec<Arc<Font>>,
    by_pattern: HashMap<String, FontId>,
    fallback: FontId,
}

impl FontManager {
    pub fn new() -> Result<Self> {
        // Try to find fonts using multiple strategies
        let font = Self::try_fontconfig(DEFAULT_FAMILY)
            .or_else(Self::try_known_paths)
            .or_else(Self::try_search_dirs)
            .ok_or(WidgetError::NoFont)?;

        Ok(Self {
            fonts: vec![Arc::new(font)],
            by_pattern: HashMap::new(),
            fallback: FontId(0),
        })
    }

    /// Font for a description, loading it on first use. Falls back to the
    /// default sans face when fontconfig cannot supply one.
    pub fn resolve(&mut self, desc: &FontDescription) -> FontId {
        let pattern = desc.fc_pattern();
        if let Some(&id) = self.by_pattern.get(&pattern) {
            return id;
        }

        let id = match Self::try_fontconfig(&pattern) {
            Some(font) => {
                self.fonts.push(Arc::new(font));
                FontId(self.fonts.len() - 1)
            }
            None => {
                warn!(pattern = %pattern, "Font not found, using fallback");
                self.fallback
            }
        };

        self.by_pattern.insert(pattern, id);
        id
    }

    pub fn font(&self, id: FontId) -> &Font {
        self.fonts
            .get(id.0)
            .unwrap_or(&self.fonts[self.fallback.0])
    }

    /// Number of distinct faces loaded
    pub fn loaded(&self) -> usize {
        self.fonts.len()
    }

    fn try_fontconfig(pattern: &str) -> Option<Font> {
        // Try to use fc-match to find a suitable font
        use std::process::Command;

        let output = Command::new("fc-match")
            .args(["--format=%{file}", pattern])
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let path = String::from_utf8(output.stdout).ok()?;
        let path = path.trim();

        if path.is_empty() {
            return None;
        }

        Self::try_load_font(path)
    }

    fn try_known_paths() -> Option<Font> {
        // Standard paths across different Linux distributions
        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/noto/NotoSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/gnu-free/FreeSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        ];

        font_paths.iter().find_map(|path| Self::try_load_font(path))
    }

    fn try_search_dirs() -> Option<Font> {
        let mut search_dirs = vec![
            "/usr/share/fonts".to_string(),
            "/usr/local/share/fonts".to_string(),
            "/nix/var/nix/profiles/default/share/fonts".to_string(),
        ];

        // Also check XDG_DATA_DIRS for fonts
        if let Ok(xdg_dirs) = std::env::var("XDG_DATA_DIRS") {
            search_dirs.extend(xdg_dirs.split(':').map(|dir| format!("{}/fonts", dir)));
        }

        search_dirs
            .iter()
            .find_map(|dir| Self::search_dir_for_font(std::path::Path::new(dir)))
    }

    fn search_dir_for_font(dir: &std::path::Path) -> Option<Font> {
        const FONT_NAMES: [&str; 3] = [
            "DejaVuSans.ttf",
            "NotoSans-Regular.ttf",
            "LiberationSans-Regular.ttf",
        ];

        let entries = std::fs::read_dir(dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if let Some(font) = Self::search_dir_for_font(&path) {
                    return Some(font);
                }
            } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if FONT_NAMES.contains(&name) {
                    if let Some(font) = Self::try_load_font(&path.to_string_lossy()) {
                        return Some(font);
                    }
                }
            }
        }
        None
    }

    fn try_load_font(path: &str) -> Option<Font> {
        let font_data = std::fs::read(path).ok()?;
        match Font::from_bytes(font_data, FontSettings::default()) {
            Ok(font) => {
                debug!("Loaded font from: {}", path);
                Some(font)
            }
            Err(e) => {
                warn!("Failed to parse font at {}: {}", path, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("Bitstream Vera Sans 8", "Bitstream Vera Sans", FontWeight::Regular, FontStyle::Normal, 8.0; "family and size")]
    #[test_case("Sans Bold 10", "Sans", FontWeight::Bold, FontStyle::Normal, 10.0; "bold")]
    #[test_case("DejaVu Serif Bold Italic 12.5", "DejaVu Serif", FontWeight::Bold, FontStyle::Italic, 12.5; "bold italic")]
    #[test_case("Monospace", "Monospace", FontWeight::Regular, FontStyle::Normal, DEFAULT_SIZE_PT; "no size")]
    #[test_case("Bold 9", DEFAULT_FAMILY, FontWeight::Bold, FontStyle::Normal, 9.0; "no family")]
    #[test_case("", DEFAULT_FAMILY, FontWeight::Regular, FontStyle::Normal, DEFAULT_SIZE_PT; "empty")]
    #[test_case("Cantarell, Sans 11", "Cantarell", FontWeight::Regular, FontStyle::Normal, 11.0; "family list")]
    #[test]
    fn test_parse_description(
        desc: &str,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
        size: f32,
    ) {
        let parsed = FontDescription::parse(desc);
        assert_eq!(parsed.family, family);
        assert_eq!(parsed.weight, weight);
        assert_eq!(parsed.style, style);
        assert_eq!(parsed.size, size);
        assert!(!parsed.absolute);
    }

    #[test]
    fn test_pixel_sizes() {
        let points = FontDescription::parse("Sans 9");
        assert_eq!(points.size_px(), 12.0);

        let pixels = FontDescription::parse("Sans 14px");
        assert!(pixels.absolute);
        assert_eq!(pixels.size_px(), 14.0);
    }

    #[test]
    fn test_fc_pattern() {
        assert_eq!(FontDescription::parse("Sans 8").fc_pattern(), "Sans");
        assert_eq!(
            FontDescription::parse("Sans Bold Italic 8").fc_pattern(),
            "Sans:weight=bold:slant=italic"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FontDescription::parse("Sans Bold 10").to_string(),
            "Sans Bold 10"
        );
    }

    #[test]
    fn test_font_manager_caches_by_pattern() {
        // Needs at least one installed font
        let Ok(mut manager) = FontManager::new() else {
            return;
        };

        let desc = FontDescription::parse("Sans Bold 10");
        let first = manager.resolve(&desc);
        let loaded = manager.loaded();
        let second = manager.resolve(&FontDescription::parse("Sans Bold 14"));

        assert_eq!(first, second);
        assert_eq!(manager.loaded(), loaded);
        assert!(manager.font(first).horizontal_line_metrics(16.0).is_some());
    }
}
