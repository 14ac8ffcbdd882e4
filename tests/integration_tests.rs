//! Integration tests for the date/time panel widget
//!
//! These drive a [`DatetimeWidget`] through a simulated event loop with a
//! virtual clock, without requiring a Wayland connection.

use chrono::{DateTime, Local, TimeZone};
use datetime_panel_widget::config::{Config, DatetimeSettings, LEGACY_FILE};
use datetime_panel_widget::input::{key_pressed, InputState, KEY_ESC};
use datetime_panel_widget::layout::Layout;
use datetime_panel_widget::panel::Orientation;
use datetime_panel_widget::placement::{Point, Rect, Size};
use datetime_panel_widget::surface::SurfaceRole;
use datetime_panel_widget::update::{WakeId, WakeKind, WakeScheduler};
use datetime_panel_widget::widget::{
    CalendarMonth, DatetimeWidget, Label, PanelEvent, PanelHost, WeekStart,
};
use std::collections::BTreeMap;
use std::time::Duration;

const BTN_LEFT: u32 = 0x110;

/// A host whose clock only moves when wakes are delivered
struct SimulatedHost {
    now: DateTime<Local>,
    next_wake: u64,
    /// Pending wakes by id: kind and absolute deadline
    wakes: BTreeMap<WakeId, (WakeKind, DateTime<Local>)>,
    labels: Vec<Label>,
    label_updates: usize,
    tooltip: Option<String>,
    popup_open: bool,
    popup_at: Option<Point>,
    saved: Vec<DatetimeSettings>,
}

impl SimulatedHost {
    fn new() -> Self {
        Self {
            now: Local.with_ymd_and_hms(2024, 3, 15, 9, 5, 7).unwrap(),
            next_wake: 0,
            wakes: BTreeMap::new(),
            labels: Vec::new(),
            label_updates: 0,
            tooltip: None,
            popup_open: false,
            popup_at: None,
            saved: Vec::new(),
        }
    }

    fn texts(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.text.clone()).collect()
    }

    /// Deliver every wake due up to `until`, in deadline order
    fn run_until(&mut self, widget: &mut DatetimeWidget, until: DateTime<Local>) {
        loop {
            let next = self
                .wakes
                .iter()
                .min_by_key(|(_, (_, deadline))| *deadline)
                .map(|(id, (kind, deadline))| (*id, *kind, *deadline));

            let Some((id, kind, deadline)) = next else {
                break;
            };
            if deadline > until {
                break;
            }

            self.wakes.remove(&id);
            self.now = deadline;
            let event = match kind {
                WakeKind::Tick => PanelEvent::Tick,
                WakeKind::Tooltip => PanelEvent::TooltipTick,
            };
            widget.handle(event, self);
        }
        self.now = until;
    }

    fn advance(&mut self, widget: &mut DatetimeWidget, by: chrono::Duration) {
        let until = self.now + by;
        self.run_until(widget, until);
    }
}

impl WakeScheduler for SimulatedHost {
    fn schedule_wake(&mut self, kind: WakeKind, after: Duration) -> Option<WakeId> {
        self.next_wake += 1;
        let id = WakeId(self.next_wake);
        let deadline = self.now + chrono::Duration::from_std(after).unwrap();
        self.wakes.insert(id, (kind, deadline));
        Some(id)
    }

    fn cancel_wake(&mut self, id: WakeId) {
        self.wakes.remove(&id);
    }
}

impl PanelHost for SimulatedHost {
    fn now(&self) -> DateTime<Local> {
        self.now
    }

    fn show_labels(&mut self, labels: &[Label]) {
        self.labels = labels.to_vec();
        self.label_updates += 1;
    }

    fn set_tooltip(&mut self, text: Option<&str>) {
        self.tooltip = text.map(str::to_string);
    }

    fn set_border_width(&mut self, _width: u32) {}

    fn trigger_rect(&self) -> Rect {
        Rect::new(1800, 0, 100, 32)
    }

    fn screen_size(&self) -> Size {
        Size::new(1920, 1080)
    }

    fn monitor_rect(&self) -> Option<Rect> {
        Some(Rect::new(0, 0, 1920, 1080))
    }

    fn open_popup(&mut self, _month: &CalendarMonth) -> Size {
        self.popup_open = true;
        Size::new(240, 200)
    }

    fn move_popup(&mut self, at: Point) {
        self.popup_at = Some(at);
    }

    fn close_popup(&mut self) {
        self.popup_open = false;
        self.popup_at = None;
    }

    fn save_settings(&mut self, settings: &DatetimeSettings) -> anyhow::Result<()> {
        self.saved.push(settings.clone());
        Ok(())
    }
}

fn widget_with(settings: DatetimeSettings) -> DatetimeWidget {
    DatetimeWidget::new(settings, Orientation::Horizontal, WeekStart::Monday)
}

#[test]
fn test_minute_clock_ticks_on_boundaries() {
    let mut host = SimulatedHost::new();
    let mut widget = widget_with(DatetimeSettings::default());
    widget.update_now(&mut host);
    let initial_updates = host.label_updates;

    // 09:05:07 -> 09:10:00 crosses five minute boundaries
    host.run_until(&mut widget, Local.with_ymd_and_hms(2024, 3, 15, 9, 10, 0).unwrap());

    assert_eq!(host.label_updates - initial_updates, 5);
    assert_eq!(host.texts(), vec!["2024-03-15", "09:10"]);
    assert_eq!(host.wakes.len(), 1);
}

#[test]
fn test_seconds_clock_ticks_every_second() {
    let mut host = SimulatedHost::new();
    let mut settings = DatetimeSettings::default();
    settings.time_format = "%H:%M:%S".to_string();
    let mut widget = widget_with(settings);
    widget.update_now(&mut host);
    let initial_updates = host.label_updates;

    host.advance(&mut widget, chrono::Duration::seconds(10));

    assert_eq!(host.label_updates - initial_updates, 10);
    assert_eq!(host.texts(), vec!["2024-03-15", "09:05:17"]);
}

#[test]
fn test_hidden_seconds_field_does_not_force_per_second_updates() {
    let mut host = SimulatedHost::new();
    let mut settings = DatetimeSettings::default();
    settings.layout = Layout::Time;
    settings.date_format = "%Y-%m-%d %S".to_string();
    let mut widget = widget_with(settings);
    widget.update_now(&mut host);

    assert_eq!(widget.update_interval_ms(), 60_000);

    let initial_updates = host.label_updates;
    host.advance(&mut widget, chrono::Duration::seconds(30));
    assert_eq!(host.label_updates, initial_updates);
}

#[test]
fn test_invalid_format_keeps_rearming() {
    let mut host = SimulatedHost::new();
    let mut settings = DatetimeSettings::default();
    settings.time_format = "%H:%".to_string();
    let mut widget = widget_with(settings);
    widget.update_now(&mut host);

    host.advance(&mut widget, chrono::Duration::minutes(3));

    assert_eq!(host.texts(), vec!["2024-03-15", "Invalid format"]);
    assert_eq!(host.wakes.len(), 1);
}

#[test]
fn test_pointer_click_toggles_calendar() {
    let mut host = SimulatedHost::new();
    let mut widget = widget_with(DatetimeSettings::default());
    let mut input = InputState::new();
    widget.update_now(&mut host);

    input.pointer_enter(SurfaceRole::Slot, 10.0, 10.0);
    let click = input.button_pressed(BTN_LEFT).unwrap();

    assert!(widget.handle(click.clone(), &mut host));
    assert!(host.popup_open);
    // Right half of the screen on a top panel: below the trigger, right edges aligned
    assert_eq!(host.popup_at, Some(Point::new(1660, 32)));

    assert!(widget.handle(click, &mut host));
    assert!(!host.popup_open);
    assert!(!widget.is_popup_open());
}

#[test]
fn test_escape_in_popup_dismisses() {
    let mut host = SimulatedHost::new();
    let mut widget = widget_with(DatetimeSettings::default());
    let mut input = InputState::new();

    input.pointer_enter(SurfaceRole::Slot, 0.0, 0.0);
    widget.handle(input.button_pressed(BTN_LEFT).unwrap(), &mut host);
    assert!(host.popup_open);

    let escape = key_pressed(KEY_ESC, false).unwrap();
    assert!(widget.handle(escape, &mut host));
    assert!(!host.popup_open);
}

#[test]
fn test_typing_a_date_in_the_popup() {
    let mut host = SimulatedHost::new();
    let mut widget = widget_with(DatetimeSettings::default());
    let mut input = InputState::new();

    input.pointer_enter(SurfaceRole::Slot, 0.0, 0.0);
    widget.handle(input.button_pressed(BTN_LEFT).unwrap(), &mut host);

    // Backspace over "2024-03-15", then "1/7/2025" and Enter
    let mut keys = vec![14; 10];
    keys.extend([2, 53, 8, 53, 3, 11, 3, 6, 28]);
    for key in keys {
        if let Some(event) = input.key_down(key) {
            widget.handle(event, &mut host);
        }
    }

    let month = widget.popup_month().unwrap();
    assert_eq!(month.entry(), "1/7/2025");
    // Day first, as the date label would be written
    assert_eq!(month.heading(), "July 2025");
    assert!(host.popup_open);
}

#[test]
fn test_hover_tooltip_refreshes_until_pointer_leaves() {
    let mut host = SimulatedHost::new();
    let mut settings = DatetimeSettings::default();
    settings.layout = Layout::Date;
    settings.time_format = "%T".to_string();
    let mut widget = widget_with(settings);
    let mut input = InputState::new();
    widget.update_now(&mut host);

    let query = input.pointer_enter(SurfaceRole::Slot, 1.0, 1.0).unwrap();
    assert!(widget.handle(query, &mut host));
    assert_eq!(host.tooltip.as_deref(), Some("09:05:07"));

    host.advance(&mut widget, chrono::Duration::seconds(2));
    assert_eq!(host.tooltip.as_deref(), Some("09:05:09"));

    let hidden = input.pointer_leave().unwrap();
    widget.handle(hidden, &mut host);
    assert!(host.tooltip.is_none());

    // Only the label wake is left
    assert_eq!(host.wakes.len(), 1);
    assert!(host.wakes.values().all(|(kind, _)| *kind == WakeKind::Tick));
}

#[test]
fn test_teardown_leaves_no_wakes() {
    let mut host = SimulatedHost::new();
    let mut settings = DatetimeSettings::default();
    settings.layout = Layout::Time;
    let mut widget = widget_with(settings);
    widget.update_now(&mut host);
    widget.handle(PanelEvent::TooltipQuery, &mut host);
    widget.handle(
        PanelEvent::Clicked(datetime_panel_widget::MouseButton::Left),
        &mut host,
    );
    assert_eq!(host.wakes.len(), 2);

    widget.save(&mut host);
    widget.teardown(&mut host);

    assert!(host.wakes.is_empty());
    assert!(!host.popup_open);
    assert_eq!(host.saved.len(), 1);
}

#[test]
fn test_legacy_settings_start_the_widget() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        dir.path().join(LEGACY_FILE),
        "[Configuration]\nlayout=1\ntime_font=Monospace 12\ntime_format=%I:%M %p\n",
    )
    .unwrap();

    let config = Config::load_or_migrate(&config_path).unwrap();
    assert!(config_path.exists(), "imported settings should be written out");

    let mut host = SimulatedHost::new();
    let mut widget = DatetimeWidget::new(
        config.datetime.clone(),
        config.panel.orientation(),
        config.calendar.week_start,
    );
    widget.update_now(&mut host);

    assert_eq!(host.texts(), vec!["09:05 AM"]);
    assert_eq!(host.labels[0].font, "Monospace 12");

    // A second start reads the TOML file rather than importing again
    let reloaded = Config::load_or_migrate(&config_path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_edited_settings_apply_live() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let mut config = Config::default();
    config.save_to(&config_path).unwrap();

    let mut host = SimulatedHost::new();
    let mut widget = widget_with(config.datetime.clone());
    widget.update_now(&mut host);

    config.datetime.layout = Layout::TimeDate;
    config.datetime.date_format = "%d/%m".to_string();
    config.save_to(&config_path).unwrap();

    let reloaded = Config::load_from(&config_path).unwrap();
    widget.apply_settings(&reloaded.datetime, &mut host);

    assert_eq!(host.texts(), vec!["09:05", "15/03"]);
    assert_eq!(host.wakes.len(), 1);
}
