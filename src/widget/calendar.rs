//! Calendar popup model
//!
//! One month laid out as a fixed six-row grid with ISO week numbers, the
//! weekday heading row, and the text of the "Date:" entry underneath.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rows in the month grid; enough for any month and any week start
pub const GRID_ROWS: usize = 6;

/// Characters the "Date:" entry holds at most
pub const MAX_ENTRY_CHARS: usize = 64;

/// First day of the week in the grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

/// One cell of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Belongs to the displayed month rather than a neighbouring one
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

/// One row of the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarWeek {
    /// ISO 8601 week number of the row's Monday
    pub week_number: u32,
    pub days: [CalendarDay; 7],
}

/// The month shown in the calendar popup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    selected: NaiveDate,
    today: NaiveDate,
    week_start: WeekStart,
    entry: String,
}

impl CalendarMonth {
    /// Show the month containing `selected`
    pub fn new(selected: NaiveDate, today: NaiveDate, week_start: WeekStart) -> Self {
        Self {
            selected,
            today,
            week_start,
            entry: selected.format("%Y-%m-%d").to_string(),
        }
    }

    /// Show the date written in `entry`, or today if it does not parse.
    ///
    /// The entry text is kept verbatim for display.
    pub fn from_entry(entry: &str, today: NaiveDate, week_start: WeekStart) -> Self {
        let selected = parse_date_entry(entry, today).unwrap_or_else(|| {
            debug!(entry, "Date label is not a date, showing today");
            today
        });
        Self {
            selected,
            today,
            week_start,
            entry: entry.to_string(),
        }
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Change the first column of the grid, keeping the selection
    pub fn set_week_start(&mut self, week_start: WeekStart) {
        self.week_start = week_start;
    }

    /// Text of the "Date:" entry
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Type a character into the entry. Returns false when the entry is full.
    pub fn push_char(&mut self, c: char) -> bool {
        if c.is_control() || self.entry.chars().count() >= MAX_ENTRY_CHARS {
            return false;
        }
        self.entry.push(c);
        true
    }

    /// Delete the last character of the entry
    pub fn backspace(&mut self) -> bool {
        self.entry.pop().is_some()
    }

    /// Select the date typed in the entry.
    ///
    /// Text that is not a date leaves the selection and the entry as they are.
    pub fn activate_entry(&mut self) -> bool {
        match parse_date_entry(&self.entry, self.today) {
            Some(date) => {
                debug!(%date, "Selecting typed date");
                self.selected = date;
                true
            }
            None => {
                debug!(entry = %self.entry, "Typed text is not a date");
                false
            }
        }
    }

    /// Month heading, e.g. "March 2024"
    pub fn heading(&self) -> String {
        self.first_of_month().format("%B %Y").to_string()
    }

    /// Abbreviated weekday names in grid order
    pub fn day_names(&self) -> [String; 7] {
        let mut day = self.week_start.weekday();
        std::array::from_fn(|_| {
            let name = day.to_string();
            day = day.succ();
            name
        })
    }

    /// Move the selection one month forward, clamping the day
    pub fn next_month(&mut self) {
        if let Some(date) = self.selected.checked_add_months(Months::new(1)) {
            self.selected = date;
        }
    }

    /// Move the selection one month back, clamping the day
    pub fn prev_month(&mut self) {
        if let Some(date) = self.selected.checked_sub_months(Months::new(1)) {
            self.selected = date;
        }
    }

    fn first_of_month(&self) -> NaiveDate {
        self.selected.with_day(1).unwrap_or(self.selected)
    }

    /// First date shown in the grid
    fn grid_start(&self) -> NaiveDate {
        let first = self.first_of_month();
        let offset = (first.weekday().num_days_from_monday() + 7
            - self.week_start.weekday().num_days_from_monday())
            % 7;
        first - chrono::Duration::days(i64::from(offset))
    }

    /// The six grid rows
    pub fn weeks(&self) -> Vec<CalendarWeek> {
        let month = self.selected.month();
        let mut day = self.grid_start();
        let mut weeks = Vec::with_capacity(GRID_ROWS);

        for _ in 0..GRID_ROWS {
            let days: [CalendarDay; 7] = std::array::from_fn(|i| {
                let date = day + chrono::Duration::days(i as i64);
                CalendarDay {
                    date,
                    in_month: date.month() == month,
                    is_today: date == self.today,
                    is_selected: date == self.selected,
                }
            });

            let monday = days
                .iter()
                .find(|d| d.date.weekday() == Weekday::Mon)
                .map_or(day, |d| d.date);

            weeks.push(CalendarWeek {
                week_number: monday.iso_week().week(),
                days,
            });
            day += chrono::Duration::days(7);
        }

        weeks
    }
}

// Shapes tried in order; day-first before month-first for slashed dates
const FULL_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%a %d %b %Y",
    "%A %d %B %Y",
    "%a, %d %b %Y",
    "%a %b %d %Y",
];

/// Parse free-form date text such as the date label.
///
/// Dates without a year are taken to be in the same year as `today`.
pub fn parse_date_entry(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let parse_any = |candidate: &str| {
        FULL_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
    };

    parse_any(text).or_else(|| parse_any(&format!("{} {}", text, today.year())))
}
