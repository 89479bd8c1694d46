//! The `relativeTo` anchor used by `Duration` rounding, totaling and comparison.

use crate::builtins::core::{PlainDate, ZonedDateTime};

/// The anchor a `Duration` is measured from when calendar units are involved.
#[derive(Debug, Clone)]
pub enum RelativeTo {
    /// Measure on the wall-clock calendar of a plain date, with 24 hour days.
    PlainDate(PlainDate),
    /// Measure against a time zone, where days may be shorter or longer.
    ZonedDateTime(ZonedDateTime),
}

impl From<PlainDate> for RelativeTo {
    fn from(value: PlainDate) -> Self {
        Self::PlainDate(value)
    }
}

impl From<ZonedDateTime> for RelativeTo {
    fn from(value: ZonedDateTime) -> Self {
        Self::ZonedDateTime(value)
    }
}
