// Text rasterization into tiny-skia pixmaps
//
// Glyphs come from the cache as coverage masks and are composited with
// source-over directly in premultiplied space.

use super::glyph_cache::RasterizedGlyph;
use super::{FontDescription, FontManager, GlyphCache};
use crate::error::Result;
use tiny_skia::{PixmapMut, PremultipliedColorU8};
use tracing::trace;

pub struct TextRenderer {
    font_manager: FontManager,
    glyph_cache: GlyphCache,
}

impl TextRenderer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            font_manager: FontManager::new()?,
            glyph_cache: GlyphCache::new(),
        })
    }

    /// Draw `text` with its baseline at `baseline_y`, starting at `x`.
    pub fn render_text(
        &mut self,
        pixmap: &mut PixmapMut,
        text: &str,
        x: f32,
        baseline_y: f32,
        font: &FontDescription,
        color: [u8; 4], // RGBA
    ) {
        trace!(text, x, baseline_y, %font, "Rendering text");

        self.glyph_cache.clear_if_full();

        let id = self.font_manager.resolve(font);
        let face = self.font_manager.font(id);
        let size = font.size_px();
        let baseline = baseline_y as i32;
        let mut pen_x = x;

        for c in text.chars() {
            let glyph = self.glyph_cache.get_or_rasterize(id, face, c, size);

            // fontdue measures ymin upwards from the baseline; pixmap rows grow down
            let top = baseline - glyph.ymin - glyph.height as i32;
            blit_glyph(pixmap, glyph, (pen_x as i32 + glyph.xmin, top), color);

            pen_x += glyph.advance_width;
        }
    }

    /// Width of `text` in pixels
    pub fn measure_text(&mut self, text: &str, font: &FontDescription) -> f32 {
        let id = self.font_manager.resolve(font);
        let face = self.font_manager.font(id);
        let size = font.size_px();

        text.chars()
            .map(|c| self.glyph_cache.get_or_rasterize(id, face, c, size).advance_width)
            .sum()
    }

    /// Ascent above and descent below the baseline (descent is negative)
    fn line_metrics(&mut self, font: &FontDescription) -> (f32, f32) {
        let size = font.size_px();
        let id = self.font_manager.resolve(font);
        self.font_manager
            .font(id)
            .horizontal_line_metrics(size)
            .map_or((size * 0.8, size * -0.2), |m| (m.ascent, m.descent))
    }

    pub fn ascent(&mut self, font: &FontDescription) -> f32 {
        self.line_metrics(font).0
    }

    pub fn line_height(&mut self, font: &FontDescription) -> f32 {
        let (ascent, descent) = self.line_metrics(font);
        ascent - descent
    }

    /// Width and line height of `text`
    pub fn text_extent(&mut self, text: &str, font: &FontDescription) -> (f32, f32) {
        (self.measure_text(text, font), self.line_height(font))
    }

    /// Baseline that vertically centres a line around `y_center`
    pub fn baseline_for_center(&mut self, font: &FontDescription, y_center: f32) -> f32 {
        let (ascent, descent) = self.line_metrics(font);
        y_center + (ascent + descent) / 2.0
    }
}

/// Composite a glyph's coverage mask in `color` with its top left at `origin`.
/// Pixels outside the pixmap are skipped.
fn blit_glyph(pixmap: &mut PixmapMut, glyph: &RasterizedGlyph, origin: (i32, i32), color: [u8; 4]) {
    let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
    let pixels = pixmap.pixels_mut();
    let [r, g, b, a] = color.map(|c| f32::from(c) / 255.0);

    for (row, coverage_row) in glyph.bitmap.chunks_exact(glyph.width.max(1)).enumerate() {
        let py = origin.1 + row as i32;
        if !(0..height).contains(&py) {
            continue;
        }

        for (col, &coverage) in coverage_row.iter().enumerate() {
            let px = origin.0 + col as i32;
            if coverage == 0 || !(0..width).contains(&px) {
                continue;
            }

            let src_alpha = f32::from(coverage) / 255.0 * a;
            let pixel = &mut pixels[(py * width + px) as usize];
            let over = |src: f32, dst: u8| {
                (src * src_alpha * 255.0 + f32::from(dst) * (1.0 - src_alpha))
                    .round()
                    .clamp(0.0, 255.0) as u8
            };

            let alpha = over(1.0, pixel.alpha());
            // Premultiplied channels never exceed alpha
            let blended = PremultipliedColorU8::from_rgba(
                over(r, pixel.red()).min(alpha),
                over(g, pixel.green()).min(alpha),
                over(b, pixel.blue()).min(alpha),
                alpha,
            );
            if let Some(blended) = blended {
                *pixel = blended;
            }
        }
    }
}
