//! Exact time as nanoseconds since the Unix epoch.

use crate::TimeZoneProviderError;

/// Number of nanoseconds in a day
#[doc(hidden)]
pub const NS_PER_DAY: u64 = MS_PER_DAY as u64 * 1_000_000;

pub(crate) const NS_IN_S: i128 = 1_000_000_000;

/// Milliseconds per day constant: 8.64e+7
const MS_PER_DAY: u32 = 24 * 60 * 60 * 1000;
/// Max Instant nanosecond constant
#[doc(hidden)]
pub const NS_MAX_INSTANT: i128 = NS_PER_DAY as i128 * 100_000_000i128;
/// Min Instant nanosecond constant
#[doc(hidden)]
pub const NS_MIN_INSTANT: i128 = -NS_MAX_INSTANT;

/// A count of nanoseconds since 1970-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EpochNanoseconds(pub i128);

impl From<i128> for EpochNanoseconds {
    fn from(value: i128) -> Self {
        Self(value)
    }
}

impl EpochNanoseconds {
    pub fn as_i128(&self) -> i128 {
        self.0
    }

    /// Checks that the value lies within ±8.64 × 10^21 nanoseconds.
    pub fn check_validity(&self) -> Result<(), TimeZoneProviderError> {
        if !is_valid_epoch_nanos(&self.0) {
            return Err(TimeZoneProviderError::InstantOutOfRange);
        }
        Ok(())
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds_to_nanoseconds(seconds))
    }

    /// Returns the epoch seconds containing this instant, flooring towards negative infinity.
    pub fn floor_seconds(&self) -> i64 {
        self.0.div_euclid(NS_IN_S) as i64
    }
}

/// Utility for determining if the nanos are within a valid range.
#[inline]
#[must_use]
pub fn is_valid_epoch_nanos(nanos: &i128) -> bool {
    (NS_MIN_INSTANT..=NS_MAX_INSTANT).contains(nanos)
}

#[cfg(feature = "tzif")]
impl From<tzif::data::time::Seconds> for EpochNanoseconds {
    fn from(value: tzif::data::time::Seconds) -> Self {
        EpochNanoseconds::from_seconds(value.0)
    }
}

#[inline]
pub(crate) fn seconds_to_nanoseconds(seconds: i64) -> i128 {
    seconds as i128 * NS_IN_S
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_seconds_rounds_towards_negative_infinity() {
        assert_eq!(EpochNanoseconds(1_500_000_000).floor_seconds(), 1);
        assert_eq!(EpochNanoseconds(-1).floor_seconds(), -1);
        assert_eq!(EpochNanoseconds(-1_000_000_000).floor_seconds(), -1);
        assert_eq!(EpochNanoseconds(-1_000_000_001).floor_seconds(), -2);
    }

    #[test]
    fn validity_limits() {
        assert!(EpochNanoseconds(NS_MAX_INSTANT).check_validity().is_ok());
        assert!(EpochNanoseconds(NS_MIN_INSTANT).check_validity().is_ok());
        assert_eq!(
            EpochNanoseconds(NS_MAX_INSTANT + 1).check_validity(),
            Err(TimeZoneProviderError::InstantOutOfRange)
        );
    }
}
