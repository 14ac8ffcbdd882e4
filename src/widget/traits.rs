//! Host capability interface for the datetime widget
//!
//! The widget never talks to Wayland, the event loop or the filesystem
//! directly. Everything it needs from its environment goes through
//! [`PanelHost`], which makes every handler drivable from a test with a
//! recording host.

use chrono::{DateTime, Local};

use crate::config::DatetimeSettings;
use crate::layout::Field;
use crate::placement::{Point, Rect, Size};
use crate::update::WakeScheduler;
use crate::widget::calendar::CalendarMonth;

/// Mouse button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
    /// Other buttons
    Other(u8),
}

/// Scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    /// Scroll up
    Up,
    /// Scroll down
    Down,
    /// Scroll left
    Left,
    /// Scroll right
    Right,
}

/// A key typed into the popup's date entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey {
    Char(char),
    Backspace,
    /// Enter: select the typed date
    Activate,
}

/// A rendered label and the font it should be drawn with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub field: Field,
    pub text: String,
    /// Font description, e.g. "Sans Bold 9"
    pub font: String,
}

/// What the environment hosting a [`DatetimeWidget`](super::DatetimeWidget)
/// provides.
///
/// Wakes scheduled through the [`WakeScheduler`] supertrait must be delivered
/// back to the widget as [`PanelEvent::Tick`](super::PanelEvent::Tick) or
/// [`PanelEvent::TooltipTick`](super::PanelEvent::TooltipTick), and the host
/// must forget a wake before delivering it.
pub trait PanelHost: WakeScheduler {
    /// Current local wall-clock time
    fn now(&self) -> DateTime<Local>;

    /// Replace the labels shown in the slot, in display order
    fn show_labels(&mut self, labels: &[Label]);

    /// Show tooltip text, or hide the tooltip with `None`
    fn set_tooltip(&mut self, text: Option<&str>);

    /// Width of the frame drawn around the labels
    fn set_border_width(&mut self, width: u32);

    /// Screen rectangle of the clickable slot
    fn trigger_rect(&self) -> Rect;

    /// Usable screen size
    fn screen_size(&self) -> Size;

    /// Rectangle of the monitor holding the trigger, when the host knows it
    fn monitor_rect(&self) -> Option<Rect> {
        None
    }

    /// Create the calendar popup for `month` and return its measured size
    fn open_popup(&mut self, month: &CalendarMonth) -> Size;

    /// Redraw an open popup after its month or entry changed. Returns the
    /// new measured size when the host resized it.
    fn update_popup(&mut self, _month: &CalendarMonth) -> Option<Size> {
        None
    }

    /// Move the open popup so its top left corner is at `at`
    fn move_popup(&mut self, at: Point);

    /// Destroy the popup
    fn close_popup(&mut self);

    /// Persist the settings
    fn save_settings(&mut self, settings: &DatetimeSettings) -> anyhow::Result<()>;
}
