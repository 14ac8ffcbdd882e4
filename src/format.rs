//! strftime-style formatting of date and time fields
//!
//! Formats are parsed up front so that a malformed pattern becomes an error
//! value instead of a panic inside `Display`. Rendered text is bounded the way
//! a fixed 256-byte display buffer would bound it.

use std::borrow::Cow;
use std::fmt::{Display, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, TimeZone};

use crate::error::{FormatError, FormatResult};

/// Marker shown when a format string cannot produce text
pub const INVALID_FORMAT_MARKER: &str = "Invalid format";

/// Marker shown when rendering fails for any other reason
pub const RENDER_ERROR_MARKER: &str = "Error";

/// Longest rendered text accepted, exclusive
pub const MAX_RENDERED_LEN: usize = 255;

/// Conversions that take the POSIX `E` (alternative era) modifier
const E_CONVERSIONS: &str = "cCxXyY";

/// Conversions that take the POSIX `O` (alternative digits) modifier
const O_CONVERSIONS: &str = "deHImMSuUVwWy";

/// Drop POSIX `%E` and `%O` modifiers, which chrono does not know.
///
/// In the C locale the modified conversions print exactly what the plain
/// ones do. `%%` escapes are kept as they are.
pub fn strip_posix_modifiers(format: &str) -> Cow<'_, str> {
    if !format.contains("%E") && !format.contains("%O") {
        return Cow::Borrowed(format);
    }

    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c != '%' {
            continue;
        }

        match chars.peek() {
            Some('%') => {
                out.push('%');
                chars.next();
            }
            Some(&modifier @ ('E' | 'O')) => {
                let allowed = if modifier == 'E' { E_CONVERSIONS } else { O_CONVERSIONS };
                let mut ahead = chars.clone();
                ahead.next();
                if ahead.peek().is_some_and(|conv| allowed.contains(*conv)) {
                    chars.next();
                }
            }
            _ => {}
        }
    }
    Cow::Owned(out)
}

/// Parse `format` into chrono items, rejecting unknown directives.
///
/// POSIX modifiers must already be stripped, see [`strip_posix_modifiers`].
pub fn parse_format(format: &str) -> FormatResult<Vec<Item<'_>>> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::InvalidDirective);
    }
    Ok(items)
}

/// Render `when` with a strftime-style `format`.
///
/// Empty output and output of [`MAX_RENDERED_LEN`] bytes or more are errors,
/// matching a bounded C `strftime` that reports zero in both cases.
///
/// `%Z` prints the numeric UTC offset (`+01:00`) for local times, not a
/// zone abbreviation such as `CET`: chrono's `Local` carries no zone name.
pub fn format_datetime<Tz>(format: &str, when: &DateTime<Tz>) -> FormatResult<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let format = strip_posix_modifiers(format);
    let items = parse_format(&format)?;

    let mut out = String::new();
    write!(out, "{}", when.format_with_items(items.iter())).map_err(|_| FormatError::Render)?;

    match out.len() {
        0 => Err(FormatError::Empty),
        len if len >= MAX_RENDERED_LEN => Err(FormatError::Overflow(len)),
        _ => Ok(out),
    }
}

/// Text to display for a field, substituting a marker on failure.
pub fn render_field<Tz>(format: &str, when: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match format_datetime(format, when) {
        Ok(text) => text,
        Err(FormatError::Render) => {
            tracing::debug!(format, "Format failed to render");
            RENDER_ERROR_MARKER.to_string()
        }
        Err(e) => {
            tracing::debug!(format, error = %e, "Invalid format");
            INVALID_FORMAT_MARKER.to_string()
        }
    }
}

/// Two instants one second apart, identical in every other field.
///
/// 2000-01-01 is a Saturday in ISO week 52 of 1999, well away from any DST
/// transition since the offset is fixed.
fn reference_instants() -> Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let utc = FixedOffset::east_opt(0)?;
    let first = utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 1).single()?;
    let second = utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 2).single()?;
    Some((first, second))
}

/// Whether `format` renders anything that changes more often than once a
/// minute.
///
/// Renders a fixed reference instant at second 1 and second 2 and compares
/// the results. An empty format is never sub-minute. A format that fails to
/// render produces the same marker twice and so reports `false`.
pub fn format_has_sub_minute_field(format: &str) -> bool {
    if format.is_empty() {
        return false;
    }

    let Some((first, second)) = reference_instants() else {
        return false;
    };

    render_field(format, &first) != render_field(format, &second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    fn at(h: u32, m: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, h, m, s)
            .unwrap()
    }

    #[test]
    fn test_format_date_and_time() {
        let when = at(9, 5, 7);
        assert_eq!(format_datetime("%Y-%m-%d", &when).unwrap(), "2024-03-15");
        assert_eq!(format_datetime("%H:%M", &when).unwrap(), "09:05");
        assert_eq!(format_datetime("%H:%M:%S", &when).unwrap(), "09:05:07");
    }

    #[test_case("%Ec", "%c"; "era datetime")]
    #[test_case("%Ex %EX", "%x %X"; "era date and time")]
    #[test_case("%OH:%OM:%OS", "%H:%M:%S"; "alternative digits")]
    #[test_case("%Oy %EY", "%y %Y"; "years")]
    #[test]
    fn test_posix_modifiers_render_like_plain(modified: &str, plain: &str) {
        let when = at(9, 5, 7);
        assert_eq!(
            format_datetime(modified, &when).unwrap(),
            format_datetime(plain, &when).unwrap()
        );
    }

    #[test_case("%H:%M", "%H:%M"; "nothing to strip")]
    #[test_case("%%Ec", "%%Ec"; "escaped percent")]
    #[test_case("%EH", "%EH"; "modifier not allowed")]
    #[test_case("%Od%E", "%d%E"; "trailing modifier")]
    #[test]
    fn test_strip_posix_modifiers(format: &str, expected: &str) {
        assert_eq!(strip_posix_modifiers(format), expected);
    }

    #[test]
    fn test_unsupported_modifier_is_invalid() {
        assert_eq!(render_field("%EH", &at(9, 5, 7)), INVALID_FORMAT_MARKER);
    }

    #[test]
    fn test_literal_text_is_kept() {
        let when = at(9, 5, 7);
        assert_eq!(format_datetime("Week %V", &when).unwrap(), "Week 11");
    }

    #[test]
    fn test_invalid_directive() {
        let when = at(9, 5, 7);
        assert_eq!(
            format_datetime("%Y-%", &when),
            Err(FormatError::InvalidDirective)
        );
        assert_eq!(render_field("%Y-%", &when), INVALID_FORMAT_MARKER);
    }

    #[test]
    fn test_empty_output_is_invalid() {
        let when = at(9, 5, 7);
        assert_eq!(format_datetime("", &when), Err(FormatError::Empty));
        assert_eq!(render_field("", &when), INVALID_FORMAT_MARKER);
    }

    #[test]
    fn test_overflow_is_invalid() {
        let when = at(9, 5, 7);
        let long = "x".repeat(MAX_RENDERED_LEN);
        assert_eq!(
            format_datetime(&long, &when),
            Err(FormatError::Overflow(MAX_RENDERED_LEN))
        );

        let fits = "x".repeat(MAX_RENDERED_LEN - 1);
        assert_eq!(format_datetime(&fits, &when).unwrap(), fits);
    }

    #[test_case("%H:%M", false; "hours and minutes")]
    #[test_case("%Y-%m-%d", false; "date only")]
    #[test_case("%H:%M:%S", true; "seconds")]
    #[test_case("%T", true; "time shorthand")]
    #[test_case("%r", true; "twelve hour with seconds")]
    #[test_case("%s", true; "unix timestamp")]
    #[test_case("%OH:%OM:%OS", true; "alternative digit seconds")]
    #[test_case("%Ec", true; "era datetime")]
    #[test_case("%Ex", false; "era date")]
    #[test_case("%a %d %b %R", false; "weekday and short time")]
    #[test_case("", false; "empty")]
    #[test_case("%Q", false; "invalid directive")]
    #[test]
    fn test_sub_minute_detection(format: &str, expected: bool) {
        assert_eq!(format_has_sub_minute_field(format), expected);
    }

    #[test]
    fn test_sub_minute_detection_is_stable() {
        for format in ["%H:%M", "%H:%M:%S", "%c", "%Y"] {
            let first = format_has_sub_minute_field(format);
            for _ in 0..5 {
                assert_eq!(format_has_sub_minute_field(format), first);
            }
        }
    }
}
