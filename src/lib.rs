//! `temporal_engine` implements the Temporal date-time model: calendar aware
//! plain values, exact instants, time zone aware date-times and durations.
//!
//! ```rust
//! use temporal_engine::{options::Overflow, Calendar, Duration, PlainDate};
//! use core::str::FromStr;
//!
//! let date = PlainDate::try_new(2024, 1, 31, Calendar::ISO).unwrap();
//!
//! // Month arithmetic clamps to the end of the month by default.
//! let month = Duration::from_str("P1M").unwrap();
//! assert_eq!(date.add(&month, None).unwrap().to_string(), "2024-02-29");
//! assert!(date.add(&month, Some(Overflow::Reject)).is_err());
//!
//! // The same day seen through another calendar.
//! let hebrew = date.with_calendar(Calendar::from_str("hebrew").unwrap());
//! assert_eq!(hebrew.year(), 5784);
//! assert_eq!(hebrew.month_code().as_str(), "M05");
//! ```
//!
//! Named time zones are resolved through [`provider::TimeZoneProvider`]. Every
//! operation that needs zone rules has a `_with_provider` form; the default
//! `compiled_data` feature adds the plain forms, which read the tz database
//! bundled with `zone_provider`.
#![no_std]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    // Dependencies used only by tests trip this lint.
    unused_crate_dependencies,
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap,
)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod iso;
pub mod options;
pub mod parsers;
pub mod provider;

mod builtins;
mod parsed_intermediates;
mod rounding;
mod utils;

use core::cmp::Ordering;

#[doc(inline)]
pub use error::TemporalError;
pub use tinystr::TinyAsciiStr;

pub use crate::builtins::core::{
    calendar::{Calendar, CalendarKind, MonthCode},
    timezone::{TimeZone, UtcOffset},
    DateDuration, Duration, Instant, PlainDate, PlainDateTime, PlainMonthDay, PlainTime,
    PlainYearMonth, TimeDuration, ZonedDateTime,
};

pub mod partial {
    //! Records of optional fields, used to build a value from parts or to
    //! replace some fields of an existing value with `with`.
    pub use crate::builtins::core::{
        PartialDate, PartialDateTime, PartialDuration, PartialTime, PartialZonedDateTime,
    };
}

pub mod time {
    //! Exact time.
    pub use zone_provider::epoch_nanoseconds::EpochNanoseconds;
}

/// The result type of every fallible operation in this crate.
pub type TemporalResult<T> = Result<T, TemporalError>;

/// Nanoseconds in a 24 hour day.
pub use zone_provider::epoch_nanoseconds::NS_PER_DAY;

// The exact time range is ±10^8 days around the epoch.
pub(crate) use zone_provider::epoch_nanoseconds::{NS_MAX_INSTANT, NS_MIN_INSTANT};

/// Turns a value that is present by construction into a result, so an
/// internal inconsistency surfaces as an `Assert` error instead of a panic.
pub(crate) trait TemporalUnwrap {
    type Output;

    fn temporal_unwrap(self) -> TemporalResult<Self::Output>;
}

impl<T> TemporalUnwrap for Option<T> {
    type Output = T;

    #[cfg_attr(debug_assertions, track_caller)]
    fn temporal_unwrap(self) -> TemporalResult<T> {
        debug_assert!(self.is_some(), "a value expected by construction was missing");
        self.ok_or_else(TemporalError::assert)
    }
}

/// Returns an `Assert` error from the enclosing function when the condition
/// does not hold. Extra arguments are logged when the `log` feature is on.
#[doc(hidden)]
#[macro_export]
macro_rules! temporal_assert {
    ($condition:expr $(, $($message:tt)+)?) => {
        if !$condition {
            $(
                #[cfg(feature = "log")]
                log::error!($($message)+);
            )?
            return Err($crate::TemporalError::assert());
        }
    };
}

/// The sign of a value, with zero kept distinct.
#[repr(i8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Sign {
    #[default]
    Positive = 1,
    Zero = 0,
    Negative = -1,
}

impl From<Ordering> for Sign {
    fn from(value: Ordering) -> Self {
        match value {
            Ordering::Less => Self::Negative,
            Ordering::Equal => Self::Zero,
            Ordering::Greater => Self::Positive,
        }
    }
}

impl From<i8> for Sign {
    fn from(value: i8) -> Self {
        value.cmp(&0).into()
    }
}

impl Sign {
    /// Returns `1` or `-1`. Zero counts as positive, so the result can always
    /// be used as a step direction.
    pub(crate) fn multiplier(self) -> i8 {
        match self {
            Self::Negative => -1,
            Self::Zero | Self::Positive => 1,
        }
    }

    pub(crate) fn negate(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Zero => Self::Zero,
            Self::Positive => Self::Negative,
        }
    }
}
