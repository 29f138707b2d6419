//! # moment
//!
//! An immutable instant stored as epoch milliseconds, with deterministic
//! calendar fields, day boundaries, and fixed-offset conversions.
//!
//! Calendar decomposition is a self-contained proleptic Gregorian algorithm;
//! chrono types are used only at the edges, as the external date-time
//! representation a [`Moment`] converts to and from. Offsets are fixed
//! minutes east of UTC. There is no timezone database.
//!
//! ## Modules
//!
//! - [`moment`] — The [`Moment`] value type and [`DateTimeFields`]
//! - [`calendar`] — Day count ↔ (year, month, day), leap years, `YYYY-MM-DD` parsing
//! - [`offset`] — Fixed offsets, injectable system offset and clock
//! - [`error`] — Error types

pub mod calendar;
pub mod error;
pub mod moment;
pub mod offset;

pub use error::{MomentError, Result};
pub use moment::{
    DateTimeFields, Moment, ToMoment, MILLISECONDS_OF_ONE_DAY, MILLISECONDS_OF_ONE_HOUR,
    MILLISECONDS_OF_ONE_MINUTE, MILLISECONDS_OF_ONE_SECOND, MINUTES_OF_ONE_DAY,
};
pub use offset::{
    fixed_offset, Clock, FixedClock, FixedOffsetSource, OffsetSource, SystemClock, SystemOffset,
    MAX_OFFSET_MINUTES,
};
