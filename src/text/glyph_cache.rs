//! Rasterized glyph storage keyed by face, character and pixel size
//!
//! Labels are redrawn every tick with the same few characters, so almost
//! every lookup after the first frame is a hit. The cache is dropped as a
//! whole once it reaches [`CAPACITY`] entries.

use super::font::FontId;
use fontdue::Font;
use std::collections::HashMap;
use tracing::debug;

const CAPACITY: usize = 512;

/// Face, character and size in tenths of a pixel
type Key = (FontId, char, u16);

fn key(font: FontId, c: char, size: f32) -> Key {
    (font, c, (size * 10.0).round().clamp(0.0, f32::from(u16::MAX)) as u16)
}

/// Coverage mask and placement of one glyph, as produced by fontdue
pub struct RasterizedGlyph {
    pub bitmap: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub advance_width: f32,
    pub xmin: i32,
    pub ymin: i32,
}

impl RasterizedGlyph {
    fn rasterize(font: &Font, c: char, size: f32) -> Self {
        let (metrics, bitmap) = font.rasterize(c, size);
        Self {
            bitmap,
            width: metrics.width,
            height: metrics.height,
            advance_width: metrics.advance_width,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
        }
    }
}

#[derive(Default)]
pub struct GlyphCache {
    glyphs: HashMap<Key, RasterizedGlyph>,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_rasterize(
        &mut self,
        id: FontId,
        font: &Font,
        c: char,
        size: f32,
    ) -> &RasterizedGlyph {
        let key = key(id, c, size);
        if self.glyphs.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.glyphs
            .entry(key)
            .or_insert_with(|| RasterizedGlyph::rasterize(font, c, size))
    }

    pub fn clear_if_full(&mut self) {
        if self.glyphs.len() < CAPACITY {
            return;
        }
        debug!(
            evicted = self.glyphs.len(),
            hit_rate_pct = self.hit_rate(),
            "Dropping glyph cache"
        );
        self.glyphs.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Percentage of lookups served from the cache, 0 before the first one
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            total => self.hits as f64 * 100.0 / total as f64,
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
