//! UTC datetime utilities and date range formatting.
//!
//! Provides a lightweight `DateTimeUtc` struct for event dates on content
//! pages, plus `format_range` for "15–17 June 2024" style output.
//!
//! # Examples
//!
//! ```ignore
//! let start = DateTimeUtc::parse("2024-06-30").unwrap();
//! let end = DateTimeUtc::parse("2024-07-02").unwrap();
//! assert_eq!(format_range(start, end, &RangeStyle::default()), "30 June – 2 July 2024");
//! ```

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// UTC datetime without timezone complexity
///
/// Field order gives chronological ordering for the derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Parse from "YYYY-MM-DD", "YYYY-MM-DDTHH:MM" or "YYYY-MM-DDTHH:MM:SSZ"
    ///
    /// A space is accepted in place of the `T` separator.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.trim().as_bytes();

        // Minimum: "YYYY-MM-DD" (10 chars)
        if bytes.len() < 10 {
            return None;
        }

        // Parse date part
        let year = parse_u16(&bytes[0..4])?;
        if bytes[4] != b'-' {
            return None;
        }
        let month = parse_u8(&bytes[5..7])?;
        if bytes[7] != b'-' {
            return None;
        }
        let day = parse_u8(&bytes[8..10])?;

        let has_time_sep = bytes.len() > 10 && matches!(bytes[10], b'T' | b' ');
        let (hour, minute, second) = match bytes.len() {
            10 => (0, 0, 0),
            16 if has_time_sep && bytes[13] == b':' => {
                (parse_u8(&bytes[11..13])?, parse_u8(&bytes[14..16])?, 0)
            }
            19 | 20 if has_time_sep && bytes[13] == b':' && bytes[16] == b':' => {
                if bytes.len() == 20 && bytes[19] != b'Z' {
                    return None;
                }
                (
                    parse_u8(&bytes[11..13])?,
                    parse_u8(&bytes[14..16])?,
                    parse_u8(&bytes[17..19])?,
                )
            }
            _ => return None,
        };

        let dt = Self::new(year, month, day, hour, minute, second);
        dt.validate().ok()?;
        Some(dt)
    }

    #[allow(clippy::trivially_copy_pass_by_ref)] // Method style is more idiomatic
    pub fn validate(&self) -> Result<()> {
        let Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } = *self;

        if !(1..=12).contains(&month) {
            bail!("month is invalid: {month}");
        }

        let max_days = Self::days_in_month(year, month);
        if day == 0 || day > max_days {
            bail!("day is invalid: {day}");
        }
        if hour > 23 {
            bail!("hour is invalid: {hour}");
        }
        if minute > 59 {
            bail!("minute is invalid: {minute}");
        }
        if second > 59 {
            bail!("second is invalid: {second}");
        }

        Ok(())
    }

    #[inline]
    #[allow(clippy::manual_is_multiple_of)] // Manual impl for const fn
    const fn is_leap_year(year: u16) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    #[inline]
    const fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    /// Format as RFC 3339 (ISO 8601).
    ///
    /// Returns: `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_rfc3339(self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }

    /// Returns: `YYYY-MM-DD`
    pub fn to_iso_date(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    #[inline]
    const fn same_day(self, other: Self) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }

    #[inline]
    const fn is_midnight(self) -> bool {
        self.hour == 0 && self.minute == 0 && self.second == 0
    }

    fn clock(self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse 2-digit ASCII number
#[inline]
fn parse_u8(bytes: &[u8]) -> Option<u8> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = bytes[0].wrapping_sub(b'0');
    let d2 = bytes[1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

/// Parse 4-digit ASCII number
#[inline]
fn parse_u16(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 4 {
        return None;
    }
    let mut result = 0u16;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        result = result * 10 + u16::from(d);
    }
    Some(result)
}

// ============================================================================
// Range formatting
// ============================================================================

/// Month name style for range output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthStyle {
    /// `June`
    #[default]
    Long,
    /// `Jun`
    Short,
}

impl MonthStyle {
    fn name(self, month: u8) -> &'static str {
        const LONG: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        const SHORT: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let idx = usize::from(month.clamp(1, 12) - 1);
        match self {
            Self::Long => LONG[idx],
            Self::Short => SHORT[idx],
        }
    }
}

/// Options for [`format_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeStyle {
    /// Joins the two ends. Written tight between days or times
    /// (`15–17`), padded with spaces between full dates (`30 June – 2 July`).
    pub separator: String,
    pub month: MonthStyle,
}

impl Default for RangeStyle {
    fn default() -> Self {
        Self {
            separator: "–".to_string(),
            month: MonthStyle::Long,
        }
    }
}

/// One rendered endpoint of a range.
struct Part {
    text: String,
    datetime: String,
}

/// The two rendered ends of a range and the joiner between them.
struct RangeParts {
    start: Part,
    end: Option<Part>,
    joiner: String,
}

fn range_parts(start: DateTimeUtc, end: DateTimeUtc, style: &RangeStyle) -> RangeParts {
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let tight = style.separator.clone();
    let spaced = format!(" {} ", style.separator);
    let month = |dt: DateTimeUtc| style.month.name(dt.month);
    let full = |dt: DateTimeUtc| format!("{} {} {}", dt.day, month(dt), dt.year);

    if start.same_day(end) {
        if start.is_midnight() && end.is_midnight() {
            return RangeParts {
                start: Part {
                    text: full(start),
                    datetime: start.to_iso_date(),
                },
                end: None,
                joiner: String::new(),
            };
        }
        let first = Part {
            text: format!("{}, {}", full(start), start.clock()),
            datetime: start.to_rfc3339(),
        };
        let second = (start.clock() != end.clock()).then(|| Part {
            text: end.clock(),
            datetime: end.to_rfc3339(),
        });
        return RangeParts {
            start: first,
            end: second,
            joiner: tight,
        };
    }

    let (first, joiner) = if start.year == end.year && start.month == end.month {
        (start.day.to_string(), tight)
    } else if start.year == end.year {
        (format!("{} {}", start.day, month(start)), spaced)
    } else {
        (full(start), spaced)
    };

    RangeParts {
        start: Part {
            text: first,
            datetime: start.to_iso_date(),
        },
        end: Some(Part {
            text: full(end),
            datetime: end.to_iso_date(),
        }),
        joiner,
    }
}

/// Format a date range with the shared parts collapsed.
///
/// - same day: `15 June 2024` or `15 June 2024, 14:30–16:00`
/// - same month: `15–17 June 2024`
/// - same year: `30 June – 2 July 2024`
/// - otherwise: `30 December 2024 – 2 January 2025`
///
/// Reversed arguments are swapped. Times are shown for same-day ranges only.
pub fn format_range(start: DateTimeUtc, end: DateTimeUtc, style: &RangeStyle) -> String {
    let parts = range_parts(start, end, style);
    match parts.end {
        Some(end) => format!("{}{}{}", parts.start.text, parts.joiner, end.text),
        None => parts.start.text,
    }
}

/// Like [`format_range`], with each end wrapped in `<time datetime="...">`.
pub fn format_range_html(start: DateTimeUtc, end: DateTimeUtc, style: &RangeStyle) -> String {
    let parts = range_parts(start, end, style);
    let time = |part: &Part| {
        format!(
            "<time datetime=\"{}\">{}</time>",
            part.datetime,
            super::html::escape_text(&part.text)
        )
    };
    match &parts.end {
        Some(end) => format!(
            "{}{}{}",
            time(&parts.start),
            super::html::escape_text(&parts.joiner),
            time(end)
        ),
        None => time(&parts.start),
    }
}
