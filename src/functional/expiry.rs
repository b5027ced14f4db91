//! Calendar Rules
//!
//! Card expiry month/year checks and the future-date rule. "Today" is read
//! through [`Clock`] so the rules stay pure with respect to their inputs.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

/// Source of the current calendar date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parses the integer at the start of `text` the way form inputs are read:
/// leading whitespace and an optional sign are accepted, parsing stops at
/// the first non-digit, and text without leading digits yields `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    // Saturate rather than fail on absurdly long input.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Month field holds 1 through 12.
pub fn month_in_range(value: &str) -> bool {
    matches!(parse_leading_int(value), Some(month) if (1..=12).contains(&month))
}

/// Two-digit year field, prefixed with the century, is not before the
/// current year.
pub fn year_not_past(value: &str, century_prefix: &str, today: NaiveDate) -> bool {
    parse_leading_int(&format!("{}{}", century_prefix, value))
        .map(|year| year >= i64::from(today.year()))
        .unwrap_or(false)
}

/// The month/year pair names a month strictly after the current one.
///
/// The card stays usable through its expiry month, but the console only
/// accepts cards whose first day of the expiry month lies after today.
/// Out-of-range months roll over into the following year.
pub fn expiry_in_future(month: &str, year: &str, century_prefix: &str, today: NaiveDate) -> bool {
    let (Some(month), Some(year)) = (
        parse_leading_int(month),
        parse_leading_int(&format!("{}{}", century_prefix, year)),
    ) else {
        return false;
    };

    let expiry = year.saturating_mul(12).saturating_add(month - 1);
    let current = i64::from(today.year()) * 12 + i64::from(today.month0());
    expiry > current
}

/// Calendar date held by a date or date-time input.
pub fn parse_input_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|date_time| date_time.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|date_time| date_time.date())
        })
}

/// Date input names a day strictly after today. Unparseable input is not
/// a future date.
pub fn is_after_today(value: &str, today: NaiveDate) -> bool {
    parse_input_date(value).is_some_and(|date| date > today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leading_int_follows_form_input_parsing() {
        assert_eq!(parse_leading_int("07"), Some(7));
        assert_eq!(parse_leading_int(" 12abc"), Some(12));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("20 27"), Some(20));
    }

    #[test]
    fn month_bounds() {
        assert!(month_in_range("1"));
        assert!(month_in_range("12"));
        assert!(!month_in_range("0"));
        assert!(!month_in_range("13"));
        assert!(!month_in_range(""));
    }

    #[test]
    fn year_against_today() {
        let today = day(2026, 10, 16);
        assert!(year_not_past("26", "20", today));
        assert!(year_not_past("31", "20", today));
        assert!(!year_not_past("25", "20", today));
        assert!(!year_not_past("", "20", today));
    }

    #[test]
    fn expiry_must_be_after_current_month() {
        let today = day(2026, 10, 16);
        assert!(expiry_in_future("11", "26", "20", today));
        assert!(!expiry_in_future("10", "26", "20", today));
        assert!(!expiry_in_future("09", "26", "20", today));
        assert!(expiry_in_future("01", "27", "20", today));
        assert!(!expiry_in_future("", "27", "20", today));
    }

    #[test]
    fn first_of_month_is_not_future_for_current_month() {
        assert!(!expiry_in_future("10", "26", "20", day(2026, 10, 1)));
    }

    #[test]
    fn future_date_is_strict() {
        let today = day(2026, 10, 16);
        assert!(is_after_today("2026-10-17", today));
        assert!(!is_after_today("2026-10-16", today));
        assert!(!is_after_today("2026-10-15", today));
        assert!(is_after_today("2026-10-17T08:30", today));
        assert!(!is_after_today("next tuesday", today));
    }
}
