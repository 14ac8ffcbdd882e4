//! The datetime panel widget
//!
//! [`DatetimeWidget`] owns all widget state and is driven by named
//! [`PanelEvent`]s. It renders the date and time labels on wall-clock aligned
//! wakes, keeps an optional tooltip fresh while it is showing, and toggles the
//! calendar popup on primary clicks.

pub mod calendar;
pub mod traits;

pub use calendar::{CalendarDay, CalendarMonth, CalendarWeek, WeekStart};
pub use traits::{EntryKey, Label, MouseButton, PanelHost, ScrollDirection};

use tracing::{debug, info, warn};

use crate::config::DatetimeSettings;
use crate::format::render_field;
use crate::layout::{Field, Layout};
use crate::panel::{border_width_for_size, Orientation};
use crate::placement::{clamp_to_monitor, Point, PopupGeometry, Size};
use crate::update::{
    compute_update_interval_ms, tooltip_update_interval_ms, RefreshState, WakeKind,
    MINUTE_INTERVAL_MS,
};

/// Events delivered to the widget by its host
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// The label wake fired
    Tick,
    /// The tooltip wake fired
    TooltipTick,
    /// The slot was clicked
    Clicked(MouseButton),
    /// The popup lost keyboard focus
    FocusLost,
    /// The dismissal key was pressed in the popup
    DismissKey,
    /// The popup was destroyed by someone else
    PopupClosedExternally,
    /// Scroll over the popup
    PopupScrolled(ScrollDirection),
    /// Typing in the popup's date entry
    EntryEdited(EntryKey),
    /// New format strings; `None` leaves a field unchanged
    FormatChanged {
        date: Option<String>,
        time: Option<String>,
    },
    /// New font descriptions; `None` leaves a field unchanged
    FontChanged {
        date: Option<String>,
        time: Option<String>,
    },
    LayoutChanged(Layout),
    /// Panel thickness in pixels
    SizeChanged(u32),
    OrientationChanged(Orientation),
    /// The slot moved on screen
    TriggerMoved,
    /// The pointer is asking for a tooltip
    TooltipQuery,
    TooltipHidden,
    /// The host asks for the settings to be persisted
    Save,
    /// The settings dialog was closed
    ConfigureClosed,
}

#[derive(Debug, Clone, PartialEq)]
enum PopupState {
    Closed,
    Open {
        month: CalendarMonth,
        size: Size,
        at: Point,
    },
}

/// State of one datetime widget instance
#[derive(Debug)]
pub struct DatetimeWidget {
    settings: DatetimeSettings,
    orientation: Orientation,
    week_start: WeekStart,
    border_width: u32,
    date_text: String,
    time_text: String,
    tick: RefreshState,
    tooltip: RefreshState,
    tooltip_visible: bool,
    popup: PopupState,
}

impl DatetimeWidget {
    /// Create a widget. Nothing is shown until [`update_now`](Self::update_now).
    pub fn new(settings: DatetimeSettings, orientation: Orientation, week_start: WeekStart) -> Self {
        let interval = compute_update_interval_ms(
            settings.layout,
            &settings.date_format,
            &settings.time_format,
        );

        Self {
            settings,
            orientation,
            week_start,
            border_width: 0,
            date_text: String::new(),
            time_text: String::new(),
            tick: RefreshState::new(WakeKind::Tick, interval),
            tooltip: RefreshState::new(WakeKind::Tooltip, MINUTE_INTERVAL_MS),
            tooltip_visible: false,
            popup: PopupState::Closed,
        }
    }

    pub fn settings(&self) -> &DatetimeSettings {
        &self.settings
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn border_width(&self) -> u32 {
        self.border_width
    }

    /// Last rendered date label text
    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    /// Last rendered time label text
    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    /// Current label refresh interval
    pub fn update_interval_ms(&self) -> u32 {
        self.tick.interval_ms()
    }

    pub fn is_popup_open(&self) -> bool {
        matches!(self.popup, PopupState::Open { .. })
    }

    /// Where the open popup was placed
    pub fn popup_position(&self) -> Option<Point> {
        match &self.popup {
            PopupState::Open { at, .. } => Some(*at),
            PopupState::Closed => None,
        }
    }

    /// The month shown by the open popup
    pub fn popup_month(&self) -> Option<&CalendarMonth> {
        match &self.popup {
            PopupState::Open { month, .. } => Some(month),
            PopupState::Closed => None,
        }
    }

    pub fn is_tooltip_visible(&self) -> bool {
        self.tooltip_visible
    }

    /// Number of wakes this widget has pending with its host
    pub fn pending_wakes(&self) -> usize {
        usize::from(self.tick.is_armed()) + usize::from(self.tooltip.is_armed())
    }

    /// Dispatch a host event. Returns whether the widget handled it.
    pub fn handle(&mut self, event: PanelEvent, host: &mut dyn PanelHost) -> bool {
        match event {
            PanelEvent::Tick => {
                self.tick(host);
                true
            }
            PanelEvent::TooltipTick => {
                self.tooltip_tick(host);
                true
            }
            PanelEvent::Clicked(button) => self.clicked(button, host),
            PanelEvent::FocusLost | PanelEvent::DismissKey => self.dismiss_popup(host),
            PanelEvent::PopupClosedExternally => self.popup_closed_externally(),
            PanelEvent::PopupScrolled(direction) => self.popup_scrolled(direction, host),
            PanelEvent::EntryEdited(key) => self.entry_edited(key, host),
            PanelEvent::FormatChanged { date, time } => {
                self.apply_format(date.as_deref(), time.as_deref(), host);
                true
            }
            PanelEvent::FontChanged { date, time } => {
                self.apply_font(date.as_deref(), time.as_deref(), host);
                true
            }
            PanelEvent::LayoutChanged(layout) => {
                self.apply_layout(Some(layout), host);
                true
            }
            PanelEvent::SizeChanged(size) => {
                self.size_changed(size, host);
                true
            }
            PanelEvent::OrientationChanged(orientation) => {
                self.orientation_changed(orientation, host);
                true
            }
            PanelEvent::TriggerMoved => self.trigger_moved(host),
            PanelEvent::TooltipQuery => self.tooltip_query(host),
            PanelEvent::TooltipHidden => {
                self.tooltip_hidden(host);
                true
            }
            PanelEvent::Save | PanelEvent::ConfigureClosed => {
                self.save(host);
                true
            }
        }
    }

    /// Re-render the labels now and re-arm the label wake
    pub fn update_now(&mut self, host: &mut dyn PanelHost) {
        self.tick(host);
    }

    /// The label wake fired
    pub fn tick(&mut self, host: &mut dyn PanelHost) {
        self.tick.cancel(host);

        let now = host.now();
        let mut labels = Vec::with_capacity(2);

        for &field in self.settings.layout.label_fields() {
            let (format, font) = match field {
                Field::Date => (&self.settings.date_format, &self.settings.date_font),
                Field::Time => (&self.settings.time_format, &self.settings.time_font),
            };
            if format.is_empty() {
                continue;
            }

            let text = render_field(format, &now);
            labels.push(Label {
                field,
                text: text.clone(),
                font: font.clone(),
            });

            match field {
                Field::Date => self.date_text = text,
                Field::Time => self.time_text = text,
            }
        }

        host.show_labels(&labels);
        self.tick.rearm(host, now.timestamp_millis());
    }

    /// Replace the date and/or time format. `None` keeps the current one.
    pub fn apply_format(
        &mut self,
        date_format: Option<&str>,
        time_format: Option<&str>,
        host: &mut dyn PanelHost,
    ) {
        if date_format.is_none() && time_format.is_none() {
            return;
        }

        if let Some(format) = date_format {
            self.settings.date_format = format.to_string();
        }
        if let Some(format) = time_format {
            self.settings.time_format = format.to_string();
        }

        debug!(
            date_format = %self.settings.date_format,
            time_format = %self.settings.time_format,
            "Applying formats"
        );
        self.recompute_interval();
        self.update_now(host);
        self.refresh_tooltip(host);
    }

    /// Replace the date and/or time font. `None` keeps the current one.
    pub fn apply_font(
        &mut self,
        date_font: Option<&str>,
        time_font: Option<&str>,
        host: &mut dyn PanelHost,
    ) {
        if date_font.is_none() && time_font.is_none() {
            return;
        }

        if let Some(font) = date_font {
            self.settings.date_font = font.to_string();
        }
        if let Some(font) = time_font {
            self.settings.time_font = font.to_string();
        }

        debug!(
            date_font = %self.settings.date_font,
            time_font = %self.settings.time_font,
            "Applying fonts"
        );
        self.update_now(host);
    }

    /// Switch layout. `None` keeps the current one.
    pub fn apply_layout(&mut self, layout: Option<Layout>, host: &mut dyn PanelHost) {
        let Some(layout) = layout else {
            return;
        };

        debug!(%layout, "Applying layout");
        self.settings.layout = layout;
        self.recompute_interval();
        self.update_now(host);
        self.refresh_tooltip(host);
    }

    /// Apply a whole settings block, e.g. after the config file changed
    pub fn apply_settings(&mut self, settings: &DatetimeSettings, host: &mut dyn PanelHost) {
        if *settings == self.settings {
            return;
        }

        info!("Applying reloaded settings");
        self.settings = settings.clone();
        self.recompute_interval();
        self.update_now(host);
        self.refresh_tooltip(host);
    }

    pub fn size_changed(&mut self, size: u32, host: &mut dyn PanelHost) {
        let border = border_width_for_size(size);
        if border != self.border_width {
            debug!(size, border, "Panel size changed");
        }
        self.border_width = border;
        host.set_border_width(border);
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Use a new first day of the week, redrawing an open calendar
    pub fn week_start_changed(&mut self, week_start: WeekStart, host: &mut dyn PanelHost) {
        if week_start == self.week_start {
            return;
        }
        debug!(?week_start, "Week start changed");
        self.week_start = week_start;
        if let PopupState::Open { month, .. } = &mut self.popup {
            month.set_week_start(week_start);
            self.refresh_popup(host);
        }
    }

    pub fn orientation_changed(&mut self, orientation: Orientation, host: &mut dyn PanelHost) {
        self.orientation = orientation;
        self.reposition_popup(host);
    }

    /// Re-place the popup after the slot moved. Returns whether a popup was
    /// open.
    pub fn trigger_moved(&mut self, host: &mut dyn PanelHost) -> bool {
        self.reposition_popup(host)
    }

    /// Toggle the calendar on a primary click. Other buttons are left to the
    /// host.
    pub fn clicked(&mut self, button: MouseButton, host: &mut dyn PanelHost) -> bool {
        if button != MouseButton::Left {
            return false;
        }

        if self.is_popup_open() {
            self.close_popup(host);
        } else {
            self.open_popup(host);
        }
        true
    }

    /// Close the popup because it lost focus or was dismissed
    pub fn dismiss_popup(&mut self, host: &mut dyn PanelHost) -> bool {
        if !self.is_popup_open() {
            return false;
        }
        self.close_popup(host);
        true
    }

    /// The popup is already gone; only forget it
    pub fn popup_closed_externally(&mut self) -> bool {
        let was_open = self.is_popup_open();
        self.popup = PopupState::Closed;
        was_open
    }

    /// Scroll up or left shows the previous month, down or right the next
    pub fn popup_scrolled(&mut self, direction: ScrollDirection, host: &mut dyn PanelHost) -> bool {
        let PopupState::Open { month, .. } = &mut self.popup else {
            return false;
        };

        match direction {
            ScrollDirection::Up | ScrollDirection::Left => month.prev_month(),
            ScrollDirection::Down | ScrollDirection::Right => month.next_month(),
        }
        self.refresh_popup(host);
        true
    }

    /// Edit the date entry. Activating it selects the typed date when it
    /// parses; the popup is redrawn whenever the entry or month changed.
    pub fn entry_edited(&mut self, key: EntryKey, host: &mut dyn PanelHost) -> bool {
        let PopupState::Open { month, .. } = &mut self.popup else {
            return false;
        };

        let changed = match key {
            EntryKey::Char(c) => month.push_char(c),
            EntryKey::Backspace => month.backspace(),
            EntryKey::Activate => month.activate_entry(),
        };
        if changed {
            self.refresh_popup(host);
        }
        true
    }

    /// The pointer wants a tooltip. Returns whether one is shown.
    pub fn tooltip_query(&mut self, host: &mut dyn PanelHost) -> bool {
        let Some(field) = self.settings.layout.tooltip_field() else {
            return false;
        };

        let format = match field {
            Field::Date => &self.settings.date_format,
            Field::Time => &self.settings.time_format,
        };
        if format.is_empty() {
            return false;
        }

        let now = host.now();
        let text = render_field(format, &now);
        host.set_tooltip(Some(&text));
        self.tooltip_visible = true;

        if let Some(interval) = tooltip_update_interval_ms(
            self.settings.layout,
            &self.settings.date_format,
            &self.settings.time_format,
        ) {
            self.tooltip.set_interval_ms(interval);
        }
        self.tooltip.rearm(host, now.timestamp_millis());
        true
    }

    /// The tooltip wake fired
    pub fn tooltip_tick(&mut self, host: &mut dyn PanelHost) {
        if self.tooltip_visible {
            self.refresh_tooltip(host);
        } else {
            self.tooltip.cancel(host);
        }
    }

    pub fn tooltip_hidden(&mut self, host: &mut dyn PanelHost) {
        self.tooltip_visible = false;
        self.tooltip.cancel(host);
        host.set_tooltip(None);
    }

    /// Persist the current settings. Failures are logged.
    pub fn save(&self, host: &mut dyn PanelHost) {
        if let Err(e) = host.save_settings(&self.settings) {
            warn!(error = %e, "Failed to save settings");
        }
    }

    /// Cancel every pending wake and close the popup
    pub fn teardown(mut self, host: &mut dyn PanelHost) {
        self.tick.cancel(host);
        self.tooltip.cancel(host);

        if self.is_popup_open() {
            self.close_popup(host);
        }
        info!("Datetime widget torn down");
    }

    fn recompute_interval(&mut self) {
        self.tick.set_interval_ms(compute_update_interval_ms(
            self.settings.layout,
            &self.settings.date_format,
            &self.settings.time_format,
        ));
    }

    // Re-render a visible tooltip, or hide it when the layout no longer has one
    fn refresh_tooltip(&mut self, host: &mut dyn PanelHost) {
        if !self.tooltip_visible {
            return;
        }
        if !self.tooltip_query(host) {
            self.tooltip_hidden(host);
        }
    }

    fn open_popup(&mut self, host: &mut dyn PanelHost) {
        let now = host.now();
        let today = now.date_naive();

        let month = if self.settings.date_format.is_empty() {
            CalendarMonth::new(today, today, self.week_start)
        } else {
            let entry = render_field(&self.settings.date_format, &now);
            CalendarMonth::from_entry(&entry, today, self.week_start)
        };

        let size = host.open_popup(&month);
        let at = self.place(host, size);
        host.move_popup(at);

        info!(x = at.x, y = at.y, width = size.width, height = size.height, "Calendar opened");
        self.popup = PopupState::Open { month, size, at };
    }

    fn close_popup(&mut self, host: &mut dyn PanelHost) {
        host.close_popup();
        self.popup = PopupState::Closed;
        debug!("Calendar closed");
    }

    fn place(&self, host: &dyn PanelHost, size: Size) -> Point {
        let geometry = PopupGeometry {
            trigger: host.trigger_rect(),
            screen: host.screen_size(),
            popup: size,
            orientation: self.orientation,
        };
        let at = geometry.place();
        debug!(?geometry, ?at, "Placing calendar");
        match host.monitor_rect() {
            Some(monitor) => clamp_to_monitor(at, size, monitor),
            None => at,
        }
    }

    // Redraw the open popup and follow any size change with a new placement
    fn refresh_popup(&mut self, host: &mut dyn PanelHost) {
        let PopupState::Open { month, size, .. } = &mut self.popup else {
            return;
        };
        match host.update_popup(month) {
            Some(resized) if resized != *size => {
                *size = resized;
                self.reposition_popup(host);
            }
            _ => {}
        }
    }

    fn reposition_popup(&mut self, host: &mut dyn PanelHost) -> bool {
        let PopupState::Open { size, .. } = self.popup else {
            return false;
        };

        let placed = self.place(host, size);
        if let PopupState::Open { at, .. } = &mut self.popup {
            *at = placed;
        }
        host.move_popup(placed);
        true
    }
}
