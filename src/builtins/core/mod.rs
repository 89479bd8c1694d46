//! The primary date-time components.
//!
//! Every value stores its ISO fields and reads calendar fields through its
//! [`Calendar`](calendar::Calendar). Values that need time zone data take an
//! explicit [`TimeZoneProvider`](crate::provider::TimeZoneProvider).

pub mod calendar;
pub mod duration;
pub mod timezone;

mod date;
mod datetime;
mod instant;
mod month_day;
mod time;
mod year_month;
mod zoneddatetime;

#[doc(inline)]
pub use date::{PartialDate, PlainDate};
#[doc(inline)]
pub use datetime::{PartialDateTime, PlainDateTime};
#[doc(inline)]
pub use duration::{DateDuration, Duration, PartialDuration, TimeDuration};
#[doc(inline)]
pub use instant::Instant;
#[doc(inline)]
pub use month_day::PlainMonthDay;
#[doc(inline)]
pub use time::{PartialTime, PlainTime};
#[doc(inline)]
pub use year_month::PlainYearMonth;
#[doc(inline)]
pub use zoneddatetime::{PartialZonedDateTime, ZonedDateTime};
