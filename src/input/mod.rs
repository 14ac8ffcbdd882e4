//! Input handling for the slot, popup and tooltip surfaces
//!
//! Raw pointer and keyboard events are translated here into the named
//! [`PanelEvent`]s the widget understands. Which surface an event landed on
//! decides what it means. A click on the slot toggles the calendar and a
//! scroll over the popup changes month. In the popup, Escape dismisses it and
//! other keys edit the date entry.

use std::path::Path;

use crate::surface::SurfaceRole;
use crate::widget::{EntryKey, MouseButton, PanelEvent, ScrollDirection};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// evdev code of the Escape key
pub const KEY_ESC: u32 = 1;

// evdev key codes from linux/input-event-codes.h
const KEY_BACKSPACE: u32 = 14;
const KEY_ENTER: u32 = 28;
const KEY_LEFTSHIFT: u32 = 42;
const KEY_RIGHTSHIFT: u32 = 54;
const KEY_SPACE: u32 = 57;
const KEY_KPENTER: u32 = 96;

/// Characters of the US layout by evdev code, unshifted then shifted.
/// Enough for typing dates; the compositor keymap is not consulted.
const US_KEYS: &[(u32, char, char)] = &[
    (2, '1', '!'),
    (3, '2', '@'),
    (4, '3', '#'),
    (5, '4', '$'),
    (6, '5', '%'),
    (7, '6', '^'),
    (8, '7', '&'),
    (9, '8', '*'),
    (10, '9', '('),
    (11, '0', ')'),
    (12, '-', '_'),
    (16, 'q', 'Q'),
    (17, 'w', 'W'),
    (18, 'e', 'E'),
    (19, 'r', 'R'),
    (20, 't', 'T'),
    (21, 'y', 'Y'),
    (22, 'u', 'U'),
    (23, 'i', 'I'),
    (24, 'o', 'O'),
    (25, 'p', 'P'),
    (30, 'a', 'A'),
    (31, 's', 'S'),
    (32, 'd', 'D'),
    (33, 'f', 'F'),
    (34, 'g', 'G'),
    (35, 'h', 'H'),
    (36, 'j', 'J'),
    (37, 'k', 'K'),
    (38, 'l', 'L'),
    (44, 'z', 'Z'),
    (45, 'x', 'X'),
    (46, 'c', 'C'),
    (47, 'v', 'V'),
    (48, 'b', 'B'),
    (49, 'n', 'N'),
    (50, 'm', 'M'),
    (51, ',', '<'),
    (52, '.', '>'),
    (53, '/', '?'),
    (KEY_SPACE, ' ', ' '),
];

// evdev button codes from linux/input-event-codes.h
const BTN_LEFT: u32 = 0x110;
const BTN_RIGHT: u32 = 0x111;
const BTN_MIDDLE: u32 = 0x112;

/// Axis motion smaller than this is treated as noise
const SCROLL_THRESHOLD: f64 = 0.1;

/// Which surface the pointer is over and where
#[derive(Debug, Default)]
pub struct InputState {
    /// Surface-local coordinates of the last motion
    position: (f64, f64),
    hovered: Option<SurfaceRole>,
    /// Shift keys currently held
    shift_held: u8,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.position = (x, y);
    }

    pub fn pointer_position(&self) -> (f64, f64) {
        self.position
    }

    pub fn hovered(&self) -> Option<SurfaceRole> {
        self.hovered
    }

    /// Pointer entered `role`. Hovering the slot asks for a tooltip.
    pub fn pointer_enter(&mut self, role: SurfaceRole, x: f64, y: f64) -> Option<PanelEvent> {
        self.hovered = Some(role);
        self.position = (x, y);
        debug!(?role, "Pointer entered surface");

        (role == SurfaceRole::Slot).then_some(PanelEvent::TooltipQuery)
    }

    /// Pointer left whatever it was over
    pub fn pointer_leave(&mut self) -> Option<PanelEvent> {
        let left = self.hovered.take();
        debug!(?left, "Pointer left surface");

        (left == Some(SurfaceRole::Slot)).then_some(PanelEvent::TooltipHidden)
    }

    /// A button was pressed over the hovered surface
    pub fn button_pressed(&mut self, code: u32) -> Option<PanelEvent> {
        match self.hovered? {
            SurfaceRole::Slot => Some(PanelEvent::Clicked(button_code_to_mouse_button(code))),
            SurfaceRole::Popup | SurfaceRole::Tooltip => None,
        }
    }

    /// A key went down while the popup had keyboard focus
    pub fn key_down(&mut self, code: u32) -> Option<PanelEvent> {
        if matches!(code, KEY_LEFTSHIFT | KEY_RIGHTSHIFT) {
            self.shift_held = self.shift_held.saturating_add(1);
            return None;
        }
        key_pressed(code, self.shift_held > 0)
    }

    pub fn key_up(&mut self, code: u32) {
        if matches!(code, KEY_LEFTSHIFT | KEY_RIGHTSHIFT) {
            self.shift_held = self.shift_held.saturating_sub(1);
        }
    }

    /// Keyboard focus moved away; held modifiers are forgotten
    pub fn keyboard_left(&mut self) {
        self.shift_held = 0;
    }

    /// Scroll over the hovered surface; only the popup reacts
    pub fn scrolled(&mut self, value: f64) -> Option<PanelEvent> {
        if self.hovered? != SurfaceRole::Popup {
            return None;
        }
        scroll_to_direction(value).map(PanelEvent::PopupScrolled)
    }
}

/// Translate a key press delivered to the popup. Escape dismisses it, the
/// rest edits the date entry.
pub fn key_pressed(code: u32, shift: bool) -> Option<PanelEvent> {
    let key = match code {
        KEY_ESC => return Some(PanelEvent::DismissKey),
        KEY_BACKSPACE => EntryKey::Backspace,
        KEY_ENTER | KEY_KPENTER => EntryKey::Activate,
        _ => {
            let &(_, plain, shifted) = US_KEYS.iter().find(|(c, _, _)| *c == code)?;
            EntryKey::Char(if shift { shifted } else { plain })
        }
    };
    Some(PanelEvent::EntryEdited(key))
}

pub fn button_code_to_mouse_button(code: u32) -> MouseButton {
    match code {
        BTN_LEFT => MouseButton::Left,
        BTN_RIGHT => MouseButton::Right,
        BTN_MIDDLE => MouseButton::Middle,
        other => MouseButton::Other((other & 0xFF) as u8),
    }
}

/// Vertical axis value to a direction; positive values scroll down
pub fn scroll_to_direction(value: f64) -> Option<ScrollDirection> {
    match value {
        v if v.abs() < SCROLL_THRESHOLD => None,
        v if v > 0.0 => Some(ScrollDirection::Down),
        _ => Some(ScrollDirection::Up),
    }
}

/// Open the settings file in the user's preferred editor.
///
/// Edits are picked up by the config watcher once saved.
pub fn open_settings_file(path: &Path) -> Result<()> {
    std::process::Command::new("xdg-open")
        .arg(path)
        .spawn()
        .with_context(|| format!("Failed to open settings file: {}", path.display()))?;

    info!(path = %path.display(), "Opened settings file");
    Ok(())
}
