// Calendar popup drawing

use super::{fill_rounded_rect, pixmap_for, stroke_rounded_rect, Renderer};
use crate::placement::Size;
use crate::text::FontDescription;
use crate::widget::calendar::{CalendarMonth, GRID_ROWS};
use tiny_skia::PixmapMut;
use tracing::trace;

/// Font for day numbers, day names and the entry line
pub const CALENDAR_FONT: &str = "Sans 10";

/// Font for the month heading
pub const CALENDAR_HEADING_FONT: &str = "Sans Bold 11";

const POPUP_PADDING: f32 = 8.0;

/// Label in front of the entry text
const ENTRY_PREFIX: &str = "Date: ";

/// Entry text with its caret
fn entry_line(month: &CalendarMonth) -> String {
    format!("{}{}_", ENTRY_PREFIX, month.entry())
}

/// Columns: the week number plus seven days
const COLUMNS: usize = 8;

/// Where everything in the popup goes, in popup-local pixels.
///
/// Row 0 of the cell grid holds the weekday names, rows 1 to 6 the weeks.
/// Column 0 holds the week numbers, columns 1 to 7 the days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarGeometry {
    pub padding: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    pub heading_height: f32,
    pub entry_height: f32,
}

impl CalendarGeometry {
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            padding: POPUP_PADDING,
            cell_width,
            cell_height,
            heading_height: cell_height * 1.5,
            entry_height: cell_height * 1.5,
        }
    }

    pub fn grid_width(&self) -> f32 {
        self.cell_width * COLUMNS as f32
    }

    /// Whole popup, rounded up to pixels
    pub fn size(&self) -> Size {
        let width = self.padding * 2.0 + self.grid_width();
        let height = self.padding * 2.0
            + self.heading_height
            + self.cell_height * (GRID_ROWS + 1) as f32
            + self.entry_height;
        Size::new(width.ceil() as i32, height.ceil() as i32)
    }

    pub fn cell_origin(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.padding + col as f32 * self.cell_width,
            self.padding + self.heading_height + row as f32 * self.cell_height,
        )
    }

    pub fn entry_origin(&self) -> (f32, f32) {
        (
            self.padding,
            self.padding + self.heading_height + self.cell_height * (GRID_ROWS + 1) as f32,
        )
    }
}

impl Renderer {
    fn calendar_geometry(&mut self) -> CalendarGeometry {
        let font = FontDescription::parse(CALENDAR_FONT);
        let widest = ["88", "Wed", "Mon", "53"]
            .iter()
            .map(|s| self.text_renderer.measure_text(s, &font))
            .fold(0.0, f32::max);
        let line = self.text_renderer.line_height(&font);

        CalendarGeometry::new((widest + 10.0).ceil(), (line * 1.6).ceil())
    }

    /// Size of the popup showing `month`
    pub fn measure_calendar(&mut self, month: &CalendarMonth) -> Size {
        let geometry = self.calendar_geometry();
        let mut size = geometry.size();

        let font = FontDescription::parse(CALENDAR_FONT);
        let entry = entry_line(month);
        let entry_width = self.text_renderer.measure_text(&entry, &font) + geometry.padding * 2.0;
        size.width = size.width.max(entry_width.ceil() as i32);
        size
    }

    pub fn render_calendar(
        &mut self,
        canvas: &mut [u8],
        width: u32,
        height: u32,
        month: &CalendarMonth,
    ) {
        let Some(mut pixmap) = pixmap_for(canvas, width, height) else {
            return;
        };
        let geometry = self.calendar_geometry();
        let theme = self.theme.clone();
        let font = FontDescription::parse(CALENDAR_FONT);
        let heading_font = FontDescription::parse(CALENDAR_HEADING_FONT);

        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
            fill_rounded_rect(
                &mut pixmap,
                rect,
                theme.corner_radius,
                theme.background_with_opacity(),
            );
            stroke_rounded_rect(&mut pixmap, rect, theme.corner_radius, theme.border, 1.0);
        }

        // Heading centred over the grid
        let heading = month.heading();
        let heading_width = self.text_renderer.measure_text(&heading, &heading_font);
        let x = geometry.padding + (geometry.grid_width() - heading_width) / 2.0;
        let baseline = self
            .text_renderer
            .baseline_for_center(&heading_font, geometry.padding + geometry.heading_height / 2.0);
        self.text_renderer.render_text(
            &mut pixmap,
            &heading,
            x,
            baseline,
            &heading_font,
            theme.text_primary.to_array(),
        );

        for (i, name) in month.day_names().iter().enumerate() {
            self.cell_text(&mut pixmap, &geometry, 0, i + 1, name, theme.text_secondary.to_array());
        }

        for (r, week) in month.weeks().iter().enumerate() {
            let row = r + 1;
            self.cell_text(
                &mut pixmap,
                &geometry,
                row,
                0,
                &week.week_number.to_string(),
                theme.text_secondary.to_array(),
            );

            for (c, day) in week.days.iter().enumerate() {
                let col = c + 1;
                let (cx, cy) = geometry.cell_origin(row, col);
                let cell = tiny_skia::Rect::from_xywh(
                    cx + 1.0,
                    cy + 1.0,
                    geometry.cell_width - 2.0,
                    geometry.cell_height - 2.0,
                );

                if let Some(cell) = cell {
                    if day.is_today {
                        fill_rounded_rect(&mut pixmap, cell, 4.0, theme.accent);
                    }
                    if day.is_selected {
                        stroke_rounded_rect(&mut pixmap, cell, 4.0, theme.accent, 1.5);
                    }
                }

                let color = if day.is_today {
                    theme.background.with_alpha(255)
                } else if day.in_month {
                    theme.text_primary
                } else {
                    theme.text_muted
                };
                let number = chrono::Datelike::day(&day.date).to_string();
                self.cell_text(&mut pixmap, &geometry, row, col, &number, color.to_array());
            }
        }

        let (ex, ey) = geometry.entry_origin();
        let entry = entry_line(month);
        let baseline = self
            .text_renderer
            .baseline_for_center(&font, ey + geometry.entry_height / 2.0);
        self.text_renderer.render_text(
            &mut pixmap,
            &entry,
            ex,
            baseline,
            &font,
            theme.text_secondary.to_array(),
        );

        trace!(heading = %heading, "Rendered calendar");
    }

    /// Draw `text` centred in a grid cell
    fn cell_text(
        &mut self,
        pixmap: &mut PixmapMut,
        geometry: &CalendarGeometry,
        row: usize,
        col: usize,
        text: &str,
        color: [u8; 4],
    ) {
        let font = FontDescription::parse(CALENDAR_FONT);
        let (cx, cy) = geometry.cell_origin(row, col);
        let text_width = self.text_renderer.measure_text(text, &font);
        let baseline = self
            .text_renderer
            .baseline_for_center(&font, cy + geometry.cell_height / 2.0);
        self.text_renderer.render_text(
            pixmap,
            text,
            cx + (geometry.cell_width - text_width) / 2.0,
            baseline,
            &font,
            color,
        );
    }
}
