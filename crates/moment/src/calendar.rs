//! Proleptic Gregorian calendar arithmetic over day counts.
//!
//! Everything here is integer math on days since 1970-01-01. The conversion
//! in both directions works in 400-year eras (146 097 days each) with a year
//! that starts on March 1, so February, and with it the leap day, is always
//! the last month of the computational year. That keeps the century and
//! 400-year rules in one place: the era/year-of-era split.
//!
//! None of these functions consult a timezone. Callers shift by a fixed
//! offset before asking for a calendar date.

use tracing::debug;

use crate::error::{MomentError, Result};

/// Days in a full 400-year Gregorian cycle.
const DAYS_PER_ERA: i64 = 146_097;

/// Days from 0000-03-01 to 1970-01-01.
const EPOCH_SHIFT: i64 = 719_468;

/// Whether `year` has a February 29 under the Gregorian rules.
pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`; 0 for an invalid month.
pub fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Days since 1970-01-01 for a calendar date.
///
/// `month` must be 1-12 and `day` 1-31; the function does not check that the
/// day exists in the month (use [`days_in_month`] first).
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year - era * 400; // [0, 399]
    let month = i64::from(month);
    let shifted_month = if month > 2 { month - 3 } else { month + 9 }; // March = 0
    let doy = (153 * shifted_month + 2) / 5 + i64::from(day) - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * DAYS_PER_ERA + doe - EPOCH_SHIFT
}

/// Calendar date `(year, month, day)` for a count of days since 1970-01-01.
///
/// Valid for every day count reachable from an `i64` millisecond timestamp.
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + EPOCH_SHIFT;
    let era = z.div_euclid(DAYS_PER_ERA);
    let doe = z - era * DAYS_PER_ERA; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11], March = 0
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

/// Zero-based weekday of a day count, Monday = 0 through Sunday = 6.
pub fn weekday_from_days(days: i64) -> u32 {
    // 1970-01-01 was a Thursday.
    (days + 3).rem_euclid(7) as u32
}

/// Parse an ISO 8601 calendar date in exactly the `YYYY-MM-DD` form.
///
/// Four-digit year, two-digit month and day, hyphen separators, and a day
/// that exists in that month of that year. Anything else is
/// [`MomentError::Parse`].
pub fn parse_iso_date(s: &str) -> Result<(i64, u32, u32)> {
    let reject = |reason: &str| {
        debug!(input = s, reason, "rejected calendar date");
        MomentError::Parse(format!("'{s}': {reason}"))
    };

    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return Err(reject("expected YYYY-MM-DD"));
    }
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err(reject("expected '-' separators"));
    }

    let year = parse_digits(&bytes[0..4]).ok_or_else(|| reject("year is not numeric"))?;
    let month = parse_digits(&bytes[5..7]).ok_or_else(|| reject("month is not numeric"))?;
    let day = parse_digits(&bytes[8..10]).ok_or_else(|| reject("day is not numeric"))?;

    let month = month as u32;
    if !(1..=12).contains(&month) {
        return Err(reject("month out of range"));
    }
    let day = day as u32;
    if day < 1 || day > days_in_month(year, month) {
        return Err(reject("day out of range for month"));
    }

    Ok((year, month, day))
}

/// Decimal value of an all-ASCII-digit slice.
fn parse_digits(digits: &[u8]) -> Option<i64> {
    digits.iter().try_fold(0i64, |acc, b| {
        b.is_ascii_digit().then(|| acc * 10 + i64::from(b - b'0'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    // ── leap years ──────────────────────────────────────────────────────

    #[test]
    fn test_leap_year_rules() {
        assert!(is_leap_year(2020));
        assert!(!is_leap_year(2019));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2100));
        assert!(is_leap_year(-4));
        assert!(is_leap_year(0));
    }

    #[test]
    fn test_days_in_february() {
        assert_eq!(days_in_month(2019, 2), 28);
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2019, 13), 0);
    }

    // ── day count conversions ───────────────────────────────────────────

    #[test]
    fn test_epoch_is_day_zero() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn test_day_before_epoch() {
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
        assert_eq!(days_from_civil(1969, 12, 31), -1);
    }

    #[test]
    fn test_leap_day_and_following_march() {
        let feb_29 = days_from_civil(2020, 2, 29);
        assert_eq!(civil_from_days(feb_29), (2020, 2, 29));
        assert_eq!(civil_from_days(feb_29 + 1), (2020, 3, 1));

        let feb_28 = days_from_civil(2019, 2, 28);
        assert_eq!(civil_from_days(feb_28 + 1), (2019, 3, 1));
    }

    #[test]
    fn test_century_years() {
        let feb_28_1900 = days_from_civil(1900, 2, 28);
        assert_eq!(civil_from_days(feb_28_1900 + 1), (1900, 3, 1));

        let feb_28_2000 = days_from_civil(2000, 2, 28);
        assert_eq!(civil_from_days(feb_28_2000 + 1), (2000, 2, 29));
    }

    #[test]
    fn test_agrees_with_chrono_over_a_wide_span() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        for days in (-800_000i64..800_000).step_by(997) {
            let date = epoch + chrono::Duration::days(days);
            let expected = (i64::from(date.year()), date.month(), date.day());
            assert_eq!(civil_from_days(days), expected, "days = {days}");
            assert_eq!(
                days_from_civil(expected.0, expected.1, expected.2),
                days,
                "date = {date}"
            );
        }
    }

    #[test]
    fn test_weekday_from_days() {
        // Thursday
        assert_eq!(weekday_from_days(0), 3);
        // 2019-12-30 was a Monday
        assert_eq!(weekday_from_days(days_from_civil(2019, 12, 30)), 0);
        // 1969-12-28 was a Sunday
        assert_eq!(weekday_from_days(-4), 6);
    }

    // ── parse_iso_date ──────────────────────────────────────────────────

    #[test]
    fn test_parse_valid_date() {
        assert_eq!(parse_iso_date("2019-12-31").unwrap(), (2019, 12, 31));
        assert_eq!(parse_iso_date("2020-02-29").unwrap(), (2020, 2, 29));
        assert_eq!(parse_iso_date("0001-01-01").unwrap(), (1, 1, 1));
    }

    #[test]
    fn test_parse_rejects_non_leap_february_29() {
        let err = parse_iso_date("2019-02-29").unwrap_err().to_string();
        assert!(err.contains("day out of range"), "got: {err}");
    }

    #[test]
    fn test_parse_rejects_month_out_of_range() {
        assert!(parse_iso_date("2019-13-01").is_err());
        assert!(parse_iso_date("2019-00-01").is_err());
    }

    #[test]
    fn test_parse_rejects_day_out_of_range() {
        assert!(parse_iso_date("2019-04-31").is_err());
        assert!(parse_iso_date("2019-04-00").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        for input in [
            "",
            "2019-1-01",
            "2019-01-1",
            "19-01-01",
            "2019/01/01",
            "2019-01-01T00:00",
            "2019-0a-01",
            "+019-01-01",
            " 2019-01-01",
            "2019-01",
        ] {
            let err = parse_iso_date(input).unwrap_err();
            assert!(matches!(err, MomentError::Parse(_)), "input = {input:?}");
        }
    }
}
