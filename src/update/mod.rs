//! Refresh scheduling for the date and time labels
//!
//! Rather than polling, the widget keeps a single one-shot wake pending and
//! re-arms it after every tick. The delay is computed from the wall clock so
//! that ticks land on second or minute boundaries, and the boundary size is
//! chosen by probing the formats that are actually on screen.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::format::format_has_sub_minute_field;
use crate::layout::{Field, Layout};

/// Wake interval when a visible field changes every second
pub const SECOND_INTERVAL_MS: u32 = 1_000;

/// Wake interval when nothing visible changes faster than once a minute
pub const MINUTE_INTERVAL_MS: u32 = 60_000;

/// Handle for a scheduled one-shot wake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WakeId(pub u64);

/// What a wake is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeKind {
    /// Re-render the labels
    Tick,
    /// Re-render the tooltip while it is showing
    Tooltip,
}

/// One-shot timer primitive provided by the host
pub trait WakeScheduler {
    /// Schedule a single wake of `kind` after `after` has elapsed. `None`
    /// when the timer could not be registered.
    fn schedule_wake(&mut self, kind: WakeKind, after: Duration) -> Option<WakeId>;

    /// Cancel a wake. Cancelling a wake that already fired is a no-op.
    fn cancel_wake(&mut self, id: WakeId);
}

fn format_for<'a>(field: Field, date_format: &'a str, time_format: &'a str) -> &'a str {
    match field {
        Field::Date => date_format,
        Field::Time => time_format,
    }
}

fn interval_for<'a>(formats: impl IntoIterator<Item = &'a str>) -> u32 {
    if formats.into_iter().any(format_has_sub_minute_field) {
        SECOND_INTERVAL_MS
    } else {
        MINUTE_INTERVAL_MS
    }
}

/// Refresh interval for the labels shown under `layout`.
///
/// Only fields that are labels under the layout are checked; a field with an
/// empty format is hidden and never forces per-second updates.
pub fn compute_update_interval_ms(layout: Layout, date_format: &str, time_format: &str) -> u32 {
    let interval = interval_for(
        layout
            .label_fields()
            .iter()
            .map(|&field| format_for(field, date_format, time_format)),
    );

    debug!(%layout, date_format, time_format, interval_ms = interval, "Computed update interval");
    interval
}

/// Refresh interval for the tooltip, `None` when the layout has no tooltip
pub fn tooltip_update_interval_ms(
    layout: Layout,
    date_format: &str,
    time_format: &str,
) -> Option<u32> {
    let field = layout.tooltip_field()?;
    Some(interval_for([format_for(field, date_format, time_format)]))
}

/// Milliseconds from `now_ms` until the next multiple of `update_interval_ms`.
///
/// Landing exactly on a boundary yields a full interval, never zero.
pub fn wake_interval_ms(now_ms: i64, update_interval_ms: u32) -> u32 {
    let interval = i64::from(update_interval_ms.max(1));
    let elapsed = now_ms.rem_euclid(interval);

    // elapsed is in [0, interval), so the difference fits in u32
    (interval - elapsed) as u32
}

/// The active refresh interval and the wake currently pending for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshState {
    kind: WakeKind,
    interval_ms: u32,
    pending: Option<WakeId>,
}

impl RefreshState {
    pub fn new(kind: WakeKind, interval_ms: u32) -> Self {
        Self {
            kind,
            interval_ms,
            pending: None,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn set_interval_ms(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }

    pub fn pending(&self) -> Option<WakeId> {
        self.pending
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancel the pending wake, if any
    pub fn cancel<S: WakeScheduler + ?Sized>(&mut self, timers: &mut S) {
        if let Some(id) = self.pending.take() {
            trace!(?id, kind = ?self.kind, "Cancelling wake");
            timers.cancel_wake(id);
        }
    }

    /// Replace the pending wake with one aligned to the next boundary after
    /// `now_ms`. Returns the delay used. Stays unarmed when the scheduler
    /// refuses the wake.
    pub fn rearm<S: WakeScheduler + ?Sized>(&mut self, timers: &mut S, now_ms: i64) -> u32 {
        self.cancel(timers);

        let delay = wake_interval_ms(now_ms, self.interval_ms);
        self.pending = timers.schedule_wake(self.kind, Duration::from_millis(u64::from(delay)));

        match self.pending {
            Some(id) => trace!(?id, kind = ?self.kind, delay_ms = delay, "Armed wake"),
            None => warn!(kind = ?self.kind, delay_ms = delay, "Wake not scheduled, refresh stopped"),
        }
        delay
    }
}
