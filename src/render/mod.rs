// Rendering engine using tiny-skia
//
// Three surfaces are drawn here: the panel slot with its stacked labels, the
// tooltip, and the calendar popup (see `calendar`). Each has a `measure_*`
// function the host uses to size its surface before drawing into it.

mod calendar;

pub use calendar::CalendarGeometry;

use crate::error::Result;
use crate::layout::LabelLayout;
use crate::placement::Size;
use crate::text::{FontDescription, TextRenderer};
use crate::theme::{Color, Theme};
use crate::widget::Label;
use tiny_skia::*;
use tracing::{error, instrument, trace};

/// Font used by the tooltip
pub const TOOLTIP_FONT: &str = "Sans 9";

/// Space between tooltip text and its edge
const TOOLTIP_PADDING: f32 = 6.0;

pub struct Renderer {
    text_renderer: TextRenderer,
    theme: Theme,
    label_layout: LabelLayout,
}

impl Renderer {
    pub fn new(theme: Theme) -> Result<Self> {
        Ok(Self {
            text_renderer: TextRenderer::new()?,
            theme,
            label_layout: LabelLayout::new(),
        })
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    fn label_extents(&mut self, labels: &[Label]) -> Vec<(f32, f32)> {
        labels
            .iter()
            .map(|label| {
                let font = FontDescription::parse(&label.font);
                self.text_renderer.text_extent(&label.text, &font)
            })
            .collect()
    }

    /// Size the slot needs to show `labels` without clipping
    pub fn measure_labels(&mut self, labels: &[Label]) -> Size {
        let extents = self.label_extents(labels);
        let (w, h) = self.label_layout.content_size(&extents);
        Size::new(w.ceil() as i32, h.ceil() as i32)
    }

    /// Draw the slot: background, optional frame, then the label stack
    #[instrument(skip(self, canvas, labels), fields(width = %width, height = %height))]
    pub fn render_panel(
        &mut self,
        canvas: &mut [u8],
        width: u32,
        height: u32,
        labels: &[Label],
        border_width: u32,
    ) {
        let Some(mut pixmap) = pixmap_for(canvas, width, height) else {
            return;
        };

        pixmap.fill(self.theme.background_with_opacity().to_tiny_skia());

        if border_width > 0 {
            let inset = border_width as f32 / 2.0;
            if let Some(rect) = tiny_skia::Rect::from_xywh(
                inset,
                inset,
                width as f32 - border_width as f32,
                height as f32 - border_width as f32,
            ) {
                stroke_rounded_rect(&mut pixmap, rect, 0.0, self.theme.border, border_width as f32);
            }
        }

        let extents = self.label_extents(labels);
        let positions = self
            .label_layout
            .positions((width as f32, height as f32), &extents);

        let color = self.theme.text_primary.to_array();
        for (label, position) in labels.iter().zip(positions) {
            let font = FontDescription::parse(&label.font);
            let baseline = position.y + self.text_renderer.ascent(&font);
            self.text_renderer.render_text(
                &mut pixmap,
                &label.text,
                position.x,
                baseline,
                &font,
                color,
            );
        }

        trace!(labels = labels.len(), "Rendered panel");
    }

    /// Size of the tooltip surface for `text`
    pub fn measure_tooltip(&mut self, text: &str) -> Size {
        let font = FontDescription::parse(TOOLTIP_FONT);
        let (w, h) = self.text_renderer.text_extent(text, &font);
        Size::new(
            (w + TOOLTIP_PADDING * 2.0).ceil() as i32,
            (h + TOOLTIP_PADDING * 2.0).ceil() as i32,
        )
    }

    pub fn render_tooltip(&mut self, canvas: &mut [u8], width: u32, height: u32, text: &str) {
        let Some(mut pixmap) = pixmap_for(canvas, width, height) else {
            return;
        };

        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
            fill_rounded_rect(
                &mut pixmap,
                rect,
                self.theme.corner_radius / 2.0,
                self.theme.tooltip_background,
            );
            stroke_rounded_rect(
                &mut pixmap,
                rect,
                self.theme.corner_radius / 2.0,
                self.theme.border,
                1.0,
            );
        }

        let font = FontDescription::parse(TOOLTIP_FONT);
        let baseline = self
            .text_renderer
            .baseline_for_center(&font, height as f32 / 2.0);
        self.text_renderer.render_text(
            &mut pixmap,
            text,
            TOOLTIP_PADDING,
            baseline,
            &font,
            self.theme.text_primary.to_array(),
        );
    }
}

/// Wrap a shm canvas, logging when the buffer does not match the size
fn pixmap_for(canvas: &mut [u8], width: u32, height: u32) -> Option<PixmapMut<'_>> {
    let canvas_len = canvas.len();
    let pixmap = PixmapMut::from_bytes(canvas, width, height);
    if pixmap.is_none() {
        error!(
            width,
            height,
            canvas_len,
            "Failed to create pixmap - invalid dimensions or buffer size"
        );
    }
    pixmap
}

/// Reorder tiny-skia's RGBA bytes into little-endian ARGB8888 (B, G, R, A)
pub fn rgba_to_argb8888(canvas: &mut [u8]) {
    for pixel in canvas.chunks_exact_mut(4) {
        pixel.swap(0, 2);
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn fill_rounded_rect(pixmap: &mut PixmapMut, rect: tiny_skia::Rect, radius: f32, color: Color) {
    if let Some(path) = rounded_rect_path(rect, radius) {
        pixmap.fill_path(
            &path,
            &paint_for(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

fn stroke_rounded_rect(
    pixmap: &mut PixmapMut,
    rect: tiny_skia::Rect,
    radius: f32,
    color: Color,
    width: f32,
) {
    let stroke = Stroke {
        width,
        ..Default::default()
    };
    if let Some(path) = rounded_rect_path(rect, radius) {
        pixmap.stroke_path(&path, &paint_for(color), &stroke, Transform::identity(), None);
    }
}

/// Path for a rounded rectangle with proper circular corners
fn rounded_rect_path(rect: tiny_skia::Rect, radius: f32) -> Option<Path> {
    let (x, y, width, height) = (rect.x(), rect.y(), rect.width(), rect.height());
    let r = radius.min(width / 2.0).min(height / 2.0);

    if r <= 0.5 {
        return Some(PathBuilder::from_rect(rect));
    }

    let mut pb = PathBuilder::new();

    // Kappa constant for cubic bezier approximation of a quarter circle
    const KAPPA: f32 = 0.5522847498;
    let k = r * KAPPA;
    let (right, bottom) = (x + width, y + height);

    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);

    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Field;

    fn label(field: Field, text: &str, font: &str) -> Label {
        Label {
            field,
            text: text.to_string(),
            font: font.to_string(),
        }
    }

    #[test]
    fn test_argb_reorder() {
        let mut canvas = vec![1, 2, 3, 4, 5, 6, 7, 8];
        rgba_to_argb8888(&mut canvas);
        assert_eq!(canvas, vec![3, 2, 1, 4, 7, 6, 5, 8]);
    }

    #[test]
    fn test_rounded_rect_path_bounds() {
        let rect = tiny_skia::Rect::from_xywh(10.0, 20.0, 100.0, 40.0).unwrap();
        let path = rounded_rect_path(rect, 8.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 10.0);
        assert_eq!(bounds.top(), 20.0);
        assert_eq!(bounds.right(), 110.0);
        assert_eq!(bounds.bottom(), 60.0);
    }

    #[test]
    fn test_panel_grows_with_second_label() {
        let Ok(mut renderer) = Renderer::new(Theme::default()) else {
            return;
        };
        let one = renderer.measure_labels(&[label(Field::Time, "09:05", "Sans 10")]);
        let two = renderer.measure_labels(&[
            label(Field::Date, "2024-03-15", "Sans 8"),
            label(Field::Time, "09:05", "Sans 10"),
        ]);

        assert!(two.height > one.height);
        assert!(two.width >= one.width);
    }

    #[test]
    fn test_render_panel_draws_text() {
        let Ok(mut renderer) = Renderer::new(Theme::cosmic_dark()) else {
            return;
        };
        let labels = [label(Field::Time, "09:05", "Sans Bold 12")];
        let size = renderer.measure_labels(&labels);
        let (w, h) = (size.width as u32, size.height as u32);
        let mut canvas = vec![0u8; (w * h * 4) as usize];

        renderer.render_panel(&mut canvas, w, h, &labels, 2);

        let background = renderer.theme().background_with_opacity();
        let plain = canvas
            .chunks_exact(4)
            .filter(|p| p[3] == background.a)
            .count();
        assert!(plain < (w * h) as usize);
    }

    #[test]
    fn test_bad_canvas_is_ignored() {
        let Ok(mut renderer) = Renderer::new(Theme::default()) else {
            return;
        };
        let mut canvas = vec![0u8; 16];
        renderer.render_tooltip(&mut canvas, 100, 100, "too small");
        assert!(canvas.iter().all(|&b| b == 0));
    }
}
