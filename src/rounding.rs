//! Rounding integers to a multiple of an increment.

use core::num::NonZeroU128;

use num_traits::ToPrimitive;

use crate::{
    options::{RoundingMode, UnsignedRoundingMode},
    TemporalError, TemporalResult,
};

/// A value paired with the increment it will be rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IncrementRounder {
    value: i128,
    increment: i128,
}

impl IncrementRounder {
    pub(crate) fn from_signed_num<T: ToPrimitive>(
        value: T,
        increment: NonZeroU128,
    ) -> TemporalResult<Self> {
        let out_of_range = || TemporalError::range().with_message("increment exceeded a valid range.");
        let value = value.to_i128().ok_or_else(out_of_range)?;
        let increment = increment.get().to_i128().ok_or_else(out_of_range)?;
        Ok(Self { value, increment })
    }

    /// Rounds to a multiple of the increment. The mode is applied relative to
    /// the sign, so `Trunc` always moves toward zero.
    pub(crate) fn round(&self, mode: RoundingMode) -> i128 {
        let quotient = self.value / self.increment;
        let remainder = (self.value % self.increment).unsigned_abs();
        let positive = self.value >= 0;
        let away_from_zero = fraction_rounds_up(
            remainder,
            self.increment.unsigned_abs(),
            quotient % 2 == 0,
            mode.get_unsigned_round_mode(positive),
        );
        let step = match (away_from_zero, positive) {
            (false, _) => 0,
            (true, true) => 1,
            (true, false) => -1,
        };
        (quotient + step) * self.increment
    }

    /// Rounds as though the value lay on the positive number line, so `Trunc`
    /// always moves toward negative infinity.
    pub(crate) fn round_as_if_positive(&self, mode: RoundingMode) -> i128 {
        let quotient = self.value.div_euclid(self.increment);
        let remainder = self.value.rem_euclid(self.increment);
        let up = fraction_rounds_up(
            remainder.unsigned_abs(),
            self.increment.unsigned_abs(),
            quotient.rem_euclid(2) == 0,
            mode.get_unsigned_round_mode(true),
        );
        (quotient + i128::from(up)) * self.increment
    }
}

/// Decides whether a value lying `numerator / denominator` of the way from `r1` to
/// `r2` rounds to `r2`.
///
/// `r1_is_even` is only consulted for a `HalfEven` tie. The fraction must be in
/// `0..=1` with a positive denominator.
pub(crate) fn fraction_rounds_up(
    numerator: u128,
    denominator: u128,
    r1_is_even: bool,
    unsigned_rounding_mode: UnsignedRoundingMode,
) -> bool {
    if numerator == 0 {
        return false;
    }
    if numerator >= denominator {
        return true;
    }
    let twice = numerator.saturating_mul(2);
    match unsigned_rounding_mode {
        UnsignedRoundingMode::Zero => false,
        UnsignedRoundingMode::Infinity => true,
        _ if twice != denominator => twice > denominator,
        UnsignedRoundingMode::HalfZero => false,
        UnsignedRoundingMode::HalfInfinity => true,
        UnsignedRoundingMode::HalfEven => !r1_is_even,
    }
}

#[cfg(test)]
mod tests {
    use core::num::NonZeroU128;

    use super::{fraction_rounds_up, IncrementRounder};
    use crate::options::{RoundingMode, UnsignedRoundingMode};

    const MODES: [RoundingMode; 9] = [
        RoundingMode::Ceil,
        RoundingMode::Floor,
        RoundingMode::Expand,
        RoundingMode::Trunc,
        RoundingMode::HalfCeil,
        RoundingMode::HalfFloor,
        RoundingMode::HalfExpand,
        RoundingMode::HalfTrunc,
        RoundingMode::HalfEven,
    ];

    /// Rounds `value` with every mode, in the order of `MODES`.
    fn round_all(value: i128, increment: u128) -> [i128; 9] {
        let rounder =
            IncrementRounder::from_signed_num(value, NonZeroU128::new(increment).unwrap()).unwrap();
        MODES.map(|mode| rounder.round(mode))
    }

    #[test]
    fn rounding_by_ten() {
        assert_eq!(round_all(100, 10), [100; 9]);
        assert_eq!(
            round_all(101, 10),
            [110, 100, 110, 100, 100, 100, 100, 100, 100]
        );
        assert_eq!(
            round_all(105, 10),
            [110, 100, 110, 100, 110, 100, 110, 100, 100]
        );
        assert_eq!(
            round_all(-105, 10),
            [-100, -110, -110, -100, -100, -110, -110, -100, -100]
        );
        assert_eq!(
            round_all(-107, 10),
            [-100, -110, -110, -100, -110, -110, -110, -110, -110]
        );
    }

    #[test]
    fn odd_increments() {
        // A third is below half, so every half mode rounds down.
        assert_eq!(round_all(7, 3), [9, 6, 9, 6, 6, 6, 6, 6, 6]);
        assert_eq!(
            round_all(-9, 2),
            [-8, -10, -10, -8, -8, -10, -10, -8, -8]
        );
        assert_eq!(
            round_all(-14, 3),
            [-12, -15, -15, -12, -15, -15, -15, -15, -15]
        );
    }

    #[test]
    fn narrower_inputs_convert() {
        let rounder =
            IncrementRounder::from_signed_num(-7_i64, NonZeroU128::new(4).unwrap()).unwrap();
        assert_eq!(rounder.round(RoundingMode::Trunc), -4);
        assert!(IncrementRounder::from_signed_num(1_i64, NonZeroU128::new(u128::MAX).unwrap())
            .is_err());
    }

    #[test]
    fn half_hour_rounding_of_a_negative_span() {
        let result = IncrementRounder::from_signed_num(
            -84_082_624_864_197_532_i128,
            NonZeroU128::new(1_800_000_000_000).unwrap(),
        )
        .unwrap()
        .round(RoundingMode::HalfExpand);

        assert_eq!(result, -84_083_400_000_000_000);
    }

    #[test]
    fn fractional_window_rounding() {
        assert!(!fraction_rounds_up(0, 31, true, UnsignedRoundingMode::Infinity));
        assert!(fraction_rounds_up(31, 31, true, UnsignedRoundingMode::Zero));
        assert!(!fraction_rounds_up(15, 31, true, UnsignedRoundingMode::HalfInfinity));
        assert!(fraction_rounds_up(16, 31, true, UnsignedRoundingMode::HalfZero));
        assert!(!fraction_rounds_up(14, 28, true, UnsignedRoundingMode::HalfEven));
        assert!(fraction_rounds_up(14, 28, false, UnsignedRoundingMode::HalfEven));
        assert!(fraction_rounds_up(14, 28, true, UnsignedRoundingMode::HalfInfinity));
    }

    #[test]
    fn as_if_positive_rounding() {
        let rounder = IncrementRounder::from_signed_num(-9_i128, NonZeroU128::new(2).unwrap()).unwrap();
        assert_eq!(rounder.round_as_if_positive(RoundingMode::Trunc), -10);
        assert_eq!(rounder.round_as_if_positive(RoundingMode::Ceil), -8);
        assert_eq!(rounder.round_as_if_positive(RoundingMode::HalfTrunc), -10);
        assert_eq!(rounder.round_as_if_positive(RoundingMode::HalfExpand), -8);
        assert_eq!(rounder.round_as_if_positive(RoundingMode::HalfEven), -8);

        let rounder = IncrementRounder::from_signed_num(7_i128, NonZeroU128::new(2).unwrap()).unwrap();
        assert_eq!(rounder.round_as_if_positive(RoundingMode::HalfEven), 8);
        assert_eq!(rounder.round_as_if_positive(RoundingMode::Floor), 6);
    }
}
