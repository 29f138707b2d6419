//! The [`Moment`] value type.
//!
//! A `Moment` is an absolute instant stored as milliseconds since
//! 1970-01-01T00:00:00Z. Calendar fields are derived on demand from that one
//! number under the UTC calendar, or under an offset the caller passes in.
//! Nothing here reads the process timezone except
//! [`Moment::system_offset_minutes`].
//!
//! Arithmetic uses plain `i64` math. Results past the ends of the `i64`
//! millisecond range are not guarded against.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::{MomentError, Result};
use crate::offset::{check_offset_minutes, Clock, OffsetSource, SystemClock, SystemOffset};

pub const MILLISECONDS_OF_ONE_SECOND: i64 = 1_000;
pub const MILLISECONDS_OF_ONE_MINUTE: i64 = 60 * MILLISECONDS_OF_ONE_SECOND;
pub const MILLISECONDS_OF_ONE_HOUR: i64 = 60 * MILLISECONDS_OF_ONE_MINUTE;
pub const MILLISECONDS_OF_ONE_DAY: i64 = 24 * MILLISECONDS_OF_ONE_HOUR;
pub const MINUTES_OF_ONE_DAY: i64 = 24 * 60;

/// An absolute point in time with millisecond precision.
///
/// Equality and ordering are those of the underlying epoch milliseconds.
/// Serializes as that bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Moment {
    epoch_milli: i64,
}

/// Wall-clock fields of an instant as seen at a fixed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateTimeFields {
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// 1-31
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    /// Minutes east of UTC the fields were computed at.
    pub offset_minutes: i32,
}

// ── construction ────────────────────────────────────────────────────────────

impl Moment {
    /// Wrap a count of milliseconds since the epoch. Any value is accepted.
    pub const fn of_epoch_milli(epoch_milli: i64) -> Self {
        Self { epoch_milli }
    }

    /// The current instant from the system clock.
    pub fn now() -> Self {
        SystemClock.now()
    }

    /// The current instant according to `clock`.
    pub fn now_from(clock: &impl Clock) -> Self {
        clock.now()
    }

    /// Midnight UTC of a `YYYY-MM-DD` date.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::Parse`] unless the input is exactly a four-digit
    /// year, two-digit month and two-digit day separated by hyphens, naming a
    /// day that exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use moment::Moment;
    ///
    /// let moment = Moment::parse_date("2019-12-31").unwrap();
    /// assert_eq!(moment.to_milliseconds(), 1_577_750_400_000);
    /// assert!(Moment::parse_date("2019-02-29").is_err());
    /// ```
    pub fn parse_date(iso_local_date: &str) -> Result<Self> {
        let (year, month, day) = calendar::parse_iso_date(iso_local_date)?;
        Ok(Self::of_days(calendar::days_from_civil(year, month, day)))
    }

    /// Midnight UTC of a chrono calendar date.
    pub fn of_date(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::of_days(calendar::days_from_civil(
            i64::from(date.year()),
            date.month(),
            date.day(),
        ))
    }

    /// The instant whose wall clock at `fields.offset_minutes` reads `fields`.
    ///
    /// The offset is subtracted from the local reading: `06:30` at `+04:00`
    /// is `02:30` UTC.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::InvalidField`] when a field is out of range
    /// for its calendar position or the year is too large to represent, and
    /// [`MomentError::InvalidOffset`] for an offset beyond +/-18 hours.
    pub fn from_fields(fields: &DateTimeFields) -> Result<Self> {
        let DateTimeFields {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            offset_minutes,
        } = *fields;

        let year = i64::from(year);
        if !(1..=12).contains(&month) {
            return Err(MomentError::InvalidField(format!("month {month}")));
        }
        if day < 1 || day > calendar::days_in_month(year, month) {
            return Err(MomentError::InvalidField(format!(
                "day {day} of {year:04}-{month:02}"
            )));
        }
        if hour > 23 || minute > 59 || second > 59 || millisecond > 999 {
            return Err(MomentError::InvalidField(format!(
                "time {hour:02}:{minute:02}:{second:02}.{millisecond:03}"
            )));
        }
        check_offset_minutes(offset_minutes)?;

        let time_of_day = i64::from(hour) * MILLISECONDS_OF_ONE_HOUR
            + i64::from(minute) * MILLISECONDS_OF_ONE_MINUTE
            + i64::from(second) * MILLISECONDS_OF_ONE_SECOND
            + i64::from(millisecond);
        let offset = i64::from(offset_minutes) * MILLISECONDS_OF_ONE_MINUTE;

        calendar::days_from_civil(year, month, day)
            .checked_mul(MILLISECONDS_OF_ONE_DAY)
            .and_then(|local| local.checked_add(time_of_day))
            .and_then(|local| local.checked_sub(offset))
            .map(Self::of_epoch_milli)
            .ok_or_else(|| MomentError::InvalidField(format!("year {year} out of range")))
    }

    fn of_days(days: i64) -> Self {
        Self::of_epoch_milli(days * MILLISECONDS_OF_ONE_DAY)
    }
}

/// Conversion of an external date-time value into a [`Moment`].
pub trait ToMoment {
    fn to_moment(&self) -> Moment;
}

impl<Tz: TimeZone> ToMoment for DateTime<Tz> {
    /// The UTC instant of this zoned value, not its local fields read as UTC.
    fn to_moment(&self) -> Moment {
        Moment::of_epoch_milli(self.timestamp_millis())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Moment {
    fn from(value: DateTime<Tz>) -> Self {
        value.to_moment()
    }
}

impl From<NaiveDate> for Moment {
    fn from(value: NaiveDate) -> Self {
        Moment::of_date(value)
    }
}

// ── field extraction ────────────────────────────────────────────────────────

impl Moment {
    fn days(&self) -> i64 {
        self.epoch_milli.div_euclid(MILLISECONDS_OF_ONE_DAY)
    }

    fn millis_of_day(&self) -> i64 {
        self.epoch_milli.rem_euclid(MILLISECONDS_OF_ONE_DAY)
    }

    fn civil(&self) -> (i64, u32, u32) {
        calendar::civil_from_days(self.days())
    }

    /// UTC calendar year.
    pub fn year(&self) -> i32 {
        // |year| stays below 300 million for any i64 millisecond value.
        self.civil().0 as i32
    }

    /// UTC month, 1-12.
    pub fn month(&self) -> u32 {
        self.civil().1
    }

    /// UTC day of month, 1-31.
    pub fn month_day(&self) -> u32 {
        self.civil().2
    }

    /// UTC hour, 0-23.
    pub fn hour(&self) -> u32 {
        (self.millis_of_day() / MILLISECONDS_OF_ONE_HOUR) as u32
    }

    /// UTC minute, 0-59.
    pub fn minute(&self) -> u32 {
        (self.millis_of_day() % MILLISECONDS_OF_ONE_HOUR / MILLISECONDS_OF_ONE_MINUTE) as u32
    }

    /// UTC second, 0-59.
    pub fn second(&self) -> u32 {
        (self.millis_of_day() % MILLISECONDS_OF_ONE_MINUTE / MILLISECONDS_OF_ONE_SECOND) as u32
    }

    /// Millisecond within the second, 0-999.
    pub fn millisecond(&self) -> u32 {
        (self.millis_of_day() % MILLISECONDS_OF_ONE_SECOND) as u32
    }

    /// UTC day of the week.
    pub fn day_of_week(&self) -> Weekday {
        match calendar::weekday_from_days(self.days()) {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    /// Minutes since UTC midnight, 0-1439.
    pub fn minute_of_day(&self) -> u32 {
        self.minute_of_day_at(0)
    }

    /// Minutes since local midnight at `offset_minutes` east of UTC, 0-1439.
    ///
    /// Any offset is accepted; the result wraps into the local day.
    ///
    /// ```
    /// use moment::Moment;
    ///
    /// // 22:47 UTC
    /// let moment = Moment::of_epoch_milli(1_577_746_077_615);
    /// assert_eq!(moment.minute_of_day_at(0), 1367);
    /// assert_eq!(moment.minute_of_day_at(120), 47);
    /// assert_eq!(moment.minute_of_day_at(-23 * 60), 1427);
    /// ```
    pub fn minute_of_day_at(&self, offset_minutes: i32) -> u32 {
        let utc = self.millis_of_day() / MILLISECONDS_OF_ONE_MINUTE;
        (utc + i64::from(offset_minutes)).rem_euclid(MINUTES_OF_ONE_DAY) as u32
    }

    /// All UTC wall-clock fields at once.
    pub fn fields(&self) -> DateTimeFields {
        self.fields_at(0)
    }

    /// All wall-clock fields as read at `offset_minutes` east of UTC.
    pub fn fields_at(&self, offset_minutes: i32) -> DateTimeFields {
        let local = self.plus_minutes(i64::from(offset_minutes));
        let (year, month, day) = local.civil();
        DateTimeFields {
            year: year as i32,
            month,
            day,
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
            millisecond: local.millisecond(),
            offset_minutes,
        }
    }
}

// ── day boundaries ──────────────────────────────────────────────────────────

impl Moment {
    /// 00:00:00.000 UTC of the same UTC date.
    pub fn start_of_day(&self) -> Moment {
        Self::of_epoch_milli(self.epoch_milli - self.millis_of_day())
    }

    /// 23:59:59.999 UTC of the same UTC date.
    pub fn end_of_day(&self) -> Moment {
        self.start_of_day().plus_millis(MILLISECONDS_OF_ONE_DAY - 1)
    }
}

// ── arithmetic and comparison ───────────────────────────────────────────────

impl Moment {
    pub fn plus_millis(&self, millis: i64) -> Moment {
        Self::of_epoch_milli(self.epoch_milli + millis)
    }

    pub fn plus_seconds(&self, seconds: i64) -> Moment {
        self.plus_millis(seconds * MILLISECONDS_OF_ONE_SECOND)
    }

    pub fn plus_minutes(&self, minutes: i64) -> Moment {
        self.plus_millis(minutes * MILLISECONDS_OF_ONE_MINUTE)
    }

    pub fn plus_hours(&self, hours: i64) -> Moment {
        self.plus_millis(hours * MILLISECONDS_OF_ONE_HOUR)
    }

    /// Adds whole 24-hour days.
    pub fn plus_days(&self, days: i64) -> Moment {
        self.plus_millis(days * MILLISECONDS_OF_ONE_DAY)
    }

    pub fn minus_millis(&self, millis: i64) -> Moment {
        Self::of_epoch_milli(self.epoch_milli - millis)
    }

    pub fn minus_seconds(&self, seconds: i64) -> Moment {
        self.minus_millis(seconds * MILLISECONDS_OF_ONE_SECOND)
    }

    pub fn minus_minutes(&self, minutes: i64) -> Moment {
        self.minus_millis(minutes * MILLISECONDS_OF_ONE_MINUTE)
    }

    pub fn minus_hours(&self, hours: i64) -> Moment {
        self.minus_millis(hours * MILLISECONDS_OF_ONE_HOUR)
    }

    pub fn minus_days(&self, days: i64) -> Moment {
        self.minus_millis(days * MILLISECONDS_OF_ONE_DAY)
    }

    /// Signed milliseconds from `self` to `other`.
    pub fn millis_until(&self, other: Moment) -> i64 {
        other.epoch_milli - self.epoch_milli
    }

    /// Strictly earlier than `other`.
    pub fn is_before(&self, other: Moment) -> bool {
        self.epoch_milli < other.epoch_milli
    }

    /// Strictly later than `other`.
    pub fn is_after(&self, other: Moment) -> bool {
        self.epoch_milli > other.epoch_milli
    }

    pub fn is_simultaneous_with(&self, other: Moment) -> bool {
        self.epoch_milli == other.epoch_milli
    }
}

// ── conversions ─────────────────────────────────────────────────────────────

impl Moment {
    /// The raw epoch milliseconds.
    pub const fn to_milliseconds(&self) -> i64 {
        self.epoch_milli
    }

    /// This instant at offset zero.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::OutOfRange`] outside chrono's representable
    /// range (about +/-262 000 years).
    pub fn to_utc_date_time(&self) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.epoch_milli)
            .ok_or(MomentError::OutOfRange(self.epoch_milli))
    }

    /// This instant viewed at a fixed offset. The instant itself is
    /// unchanged; only the local fields differ.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::OutOfRange`] outside chrono's representable
    /// range.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{FixedOffset, Timelike};
    /// use moment::Moment;
    ///
    /// let moment = Moment::of_epoch_milli(1_577_746_077_615);
    /// let zoned = moment
    ///     .to_zoned_date_time(FixedOffset::east_opt(2 * 3600).unwrap())
    ///     .unwrap();
    /// assert_eq!(zoned.hour(), 0);
    /// assert_eq!(zoned.timestamp(), 1_577_746_077);
    /// ```
    pub fn to_zoned_date_time(&self, offset: FixedOffset) -> Result<DateTime<FixedOffset>> {
        Ok(self.to_utc_date_time()?.with_timezone(&offset))
    }

    /// The UTC calendar date of this instant.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::OutOfRange`] outside chrono's date range.
    pub fn to_utc_date(&self) -> Result<NaiveDate> {
        let (year, month, day) = self.civil();
        i32::try_from(year)
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
            .ok_or(MomentError::OutOfRange(self.epoch_milli))
    }

    /// The host's current default offset in minutes east of UTC.
    ///
    /// The one ambient read in this crate, evaluated afresh on each call.
    /// Prefer taking an [`OffsetSource`] or explicit minutes where possible.
    pub fn system_offset_minutes() -> i32 {
        SystemOffset.offset_minutes()
    }
}

impl fmt::Display for Moment {
    /// ISO 8601 in UTC with milliseconds, e.g. `2019-12-30T22:47:57.615Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields();
        if (0..=9999).contains(&fields.year) {
            write!(f, "{:04}", fields.year)?;
        } else {
            write!(f, "{:+07}", fields.year)?;
        }
        write!(
            f,
            "-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            fields.month,
            fields.day,
            fields.hour,
            fields.minute,
            fields.second,
            fields.millisecond
        )
    }
}
