//! Date/time panel widget library
//!
//! This library provides the core functionality for the panel clock:
//! strftime-style formats, label layouts, refresh scheduling, the calendar
//! popup and its placement, configuration, rendering and theming.
//! The Wayland host lives in the binary and drives [`DatetimeWidget`]
//! through the [`PanelHost`] trait.

pub mod config;
pub mod config_watcher;
pub mod error;
pub mod format;
pub mod input;
pub mod layout;
pub mod panel;
pub mod placement;
pub mod position;
pub mod render;
pub mod surface;
pub mod text;
pub mod theme;
pub mod update;
pub mod wayland;
pub mod widget;

// Re-export commonly used types
pub use config::{CalendarConfig, Config, DatetimeSettings, Margin, PanelConfig};
pub use config_watcher::{ConfigReloadEvent, ConfigWatcher};
pub use error::{ConfigError, FormatError, WidgetError};
pub use format::{format_datetime, render_field};
pub use input::{button_code_to_mouse_button, key_pressed, scroll_to_direction, InputState};
pub use layout::{Field, LabelLayout, Layout};
pub use panel::{border_width_for_size, Orientation, PanelAnchor};
pub use placement::{clamp_to_monitor, place_popup, Point, Rect, Size};
pub use position::Position;
pub use render::Renderer;
pub use surface::{PanelSurface, SurfaceRole};
pub use text::{FontDescription, FontWeight};
pub use theme::{Color, Theme};
pub use update::{compute_update_interval_ms, RefreshState, WakeId, WakeKind, WakeScheduler};
pub use widget::{
    CalendarMonth, DatetimeWidget, EntryKey, Label, MouseButton, PanelEvent, PanelHost, ScrollDirection,
    WeekStart,
};
