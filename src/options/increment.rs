use core::num::{NonZeroU128, NonZeroU32};

use crate::{TemporalError, TemporalResult};

/// A rounding increment, always within `1..=10^9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundingIncrement(NonZeroU32);

impl Default for RoundingIncrement {
    fn default() -> Self {
        Self::ONE
    }
}

const MAX_INCREMENT: u32 = 1_000_000_000;

impl RoundingIncrement {
    /// An increment of one, i.e. plain rounding to the unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Creates a new `RoundingIncrement`.
    ///
    /// # Errors
    ///
    /// Returns a `RangeError` when `increment` is zero or greater than 10^9.
    pub fn try_new(increment: u32) -> TemporalResult<Self> {
        if increment > MAX_INCREMENT {
            return Err(TemporalError::range()
                .with_message("roundingIncrement must be within 1 and 10^9."));
        }
        NonZeroU32::new(increment).map(Self).ok_or(
            TemporalError::range().with_message("roundingIncrement must be within 1 and 10^9."),
        )
    }

    /// Returns the increment as an integer.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Checks the increment against the `dividend` of a unit.
    ///
    /// The increment must evenly divide `dividend`. It may only equal it when
    /// `inclusive` is set.
    pub(crate) fn validate(self, dividend: u64, inclusive: bool) -> TemporalResult<()> {
        let maximum = if inclusive {
            dividend
        } else {
            dividend.saturating_sub(1)
        };
        let increment = u64::from(self.get());
        if increment > maximum {
            return Err(TemporalError::range().with_message("roundingIncrement exceeds maximum."));
        }
        if dividend % increment != 0 {
            return Err(TemporalError::range()
                .with_message("roundingIncrement does not divide the unit evenly."));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn as_extended_increment(self) -> NonZeroU128 {
        NonZeroU128::from(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::RoundingIncrement;

    #[test]
    fn increment_bounds() {
        assert!(RoundingIncrement::try_new(0).is_err());
        assert!(RoundingIncrement::try_new(1_000_000_001).is_err());
        assert_eq!(RoundingIncrement::try_new(1).unwrap(), RoundingIncrement::ONE);
        assert_eq!(RoundingIncrement::try_new(1_000_000_000).unwrap().get(), 1_000_000_000);
    }

    #[test]
    fn increment_validation() {
        let fifteen = RoundingIncrement::try_new(15).unwrap();
        assert!(fifteen.validate(60, false).is_ok());
        assert!(fifteen.validate(24, false).is_err());

        let sixty = RoundingIncrement::try_new(60).unwrap();
        assert!(sixty.validate(60, false).is_err());
        assert!(sixty.validate(60, true).is_ok());

        let seven = RoundingIncrement::try_new(7).unwrap();
        assert!(seven.validate(1000, false).is_err());
    }
}
