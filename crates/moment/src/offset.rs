//! Fixed UTC offsets and the two ambient reads: the wall clock and the
//! host's default offset.
//!
//! Everything else in the crate takes offsets as explicit minutes. The
//! ambient values sit behind [`OffsetSource`] and [`Clock`] so callers can
//! inject a fixed value instead of touching process-wide configuration.
//! Snapshot an ambient value once when a batch of operations needs to agree
//! on it.

use chrono::{FixedOffset, Offset, Utc};
use tracing::{trace, warn};

use crate::error::{MomentError, Result};
use crate::moment::Moment;

/// Largest accepted offset magnitude, 18 hours.
pub const MAX_OFFSET_MINUTES: i32 = 18 * 60;

// ── OffsetSource ────────────────────────────────────────────────────────────

/// Something that knows the offset, in minutes east of UTC, to use for
/// "local" computations.
pub trait OffsetSource {
    fn offset_minutes(&self) -> i32;
}

/// The host's current default offset, read from the OS on every call.
///
/// The zone is resolved from `TZ` (or `/etc/localtime` when `TZ` is unset)
/// each time, so a change to either is seen by the next call. A zone that
/// cannot be resolved counts as UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOffset;

impl OffsetSource for SystemOffset {
    fn offset_minutes(&self) -> i32 {
        match current_utc_offset_seconds() {
            Ok(seconds) => {
                trace!(seconds, "read system utc offset");
                seconds / 60
            }
            Err(err) => {
                warn!(%err, "cannot resolve system timezone, using UTC");
                0
            }
        }
    }
}

fn current_utc_offset_seconds() -> std::result::Result<i32, String> {
    let zone = tz::TimeZone::local().map_err(|e| e.to_string())?;
    let local_time_type = zone
        .find_current_local_time_type()
        .map_err(|e| e.to_string())?;
    Ok(local_time_type.ut_offset())
}

/// A constant offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedOffsetSource {
    minutes: i32,
}

impl FixedOffsetSource {
    pub const UTC: FixedOffsetSource = FixedOffsetSource { minutes: 0 };

    /// An offset of `minutes` east of UTC (negative for west).
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::InvalidOffset`] beyond +/-18 hours.
    pub fn of_minutes(minutes: i32) -> Result<Self> {
        check_offset_minutes(minutes)?;
        Ok(Self { minutes })
    }

    /// An offset of whole hours east of UTC.
    pub fn of_hours(hours: i32) -> Result<Self> {
        let minutes = hours
            .checked_mul(60)
            .ok_or_else(|| MomentError::InvalidOffset(format!("{hours} hours")))?;
        Self::of_minutes(minutes)
    }

    /// Parse a fixed-offset zone id.
    ///
    /// Accepted forms, all east-positive: `Z`, `UTC`, `GMT`, `UT`, any of
    /// those prefixes followed by a signed offset, or a bare signed offset.
    /// A signed offset is `+H`, `+HH`, `+HH:MM` or `+HHMM` (or `-`).
    /// `GMT+1` is one hour east of Greenwich, `GMT-01:30` ninety minutes west.
    ///
    /// # Errors
    ///
    /// Returns [`MomentError::InvalidOffset`] for anything else, including
    /// region ids such as `Europe/Berlin`.
    pub fn parse(zone_id: &str) -> Result<Self> {
        let id = zone_id.trim();
        let invalid = || MomentError::InvalidOffset(format!("'{zone_id}'"));

        let rest = ["UTC", "GMT", "UT", "Z"]
            .iter()
            .find_map(|prefix| {
                id.get(..prefix.len())
                    .filter(|head| head.eq_ignore_ascii_case(prefix))
                    .map(|_| &id[prefix.len()..])
            })
            .unwrap_or(id);

        if rest.is_empty() {
            return if id.is_empty() {
                Err(invalid())
            } else {
                Ok(Self::UTC)
            };
        }

        let minutes = parse_signed_offset(rest).ok_or_else(invalid)?;
        Self::of_minutes(minutes)
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    /// The same offset as a chrono [`FixedOffset`].
    pub fn to_fixed_offset(&self) -> FixedOffset {
        // Range checked at construction.
        FixedOffset::east_opt(self.minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

impl OffsetSource for FixedOffsetSource {
    fn offset_minutes(&self) -> i32 {
        self.minutes
    }
}

impl<S: OffsetSource + ?Sized> OffsetSource for &S {
    fn offset_minutes(&self) -> i32 {
        (**self).offset_minutes()
    }
}

/// Build a chrono [`FixedOffset`] from minutes east of UTC.
///
/// # Errors
///
/// Returns [`MomentError::InvalidOffset`] beyond +/-18 hours.
pub fn fixed_offset(minutes: i32) -> Result<FixedOffset> {
    Ok(FixedOffsetSource::of_minutes(minutes)?.to_fixed_offset())
}

pub(crate) fn check_offset_minutes(minutes: i32) -> Result<()> {
    if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
        return Err(MomentError::InvalidOffset(format!(
            "{minutes} minutes exceeds +/-18 hours"
        )));
    }
    Ok(())
}

/// Parse `+H`, `+HH`, `+HH:MM`, `+HHMM` (or with `-`) into signed minutes.
fn parse_signed_offset(s: &str) -> Option<i32> {
    let (sign, body) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit() || b == b':') {
        return None;
    }

    let (hours, minutes) = match (body.len(), body.find(':')) {
        (1 | 2, None) => (body, "00"),
        (4, None) => body.split_at(2),
        (4 | 5, Some(colon)) if body.len() - colon == 3 && colon >= 1 => {
            (&body[..colon], &body[colon + 1..])
        }
        _ => return None,
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    Some(sign * (hours * 60 + minutes))
}

// ── Clock ───────────────────────────────────────────────────────────────────

/// A source of "now".
pub trait Clock {
    fn now(&self) -> Moment;
}

/// The OS wall clock, read once per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Moment {
        Moment::of_epoch_milli(Utc::now().timestamp_millis())
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Moment);

impl Clock for FixedClock {
    fn now(&self) -> Moment {
        self.0
    }
}
