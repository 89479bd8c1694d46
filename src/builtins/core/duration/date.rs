//! Implementation of a `DateDuration`

use crate::{
    builtins::core::PlainDate, iso::IsoDate, options::Overflow, Sign, TemporalError,
    TemporalResult,
};

use super::is_valid_duration;

/// `DateDuration` represents the [date duration record][spec] of the `Duration.`
///
/// These fields are laid out in the [Temporal Proposal][field spec] as 64-bit integers.
///
/// [spec]: https://tc39.es/proposal-temporal/#sec-temporal-date-duration-records
/// [field spec]: https://tc39.es/proposal-temporal/#sec-properties-of-temporal-duration-instances
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateDuration {
    /// `DateDuration`'s internal year value.
    pub years: i64,
    /// `DateDuration`'s internal month value.
    pub months: i64,
    /// `DateDuration`'s internal week value.
    pub weeks: i64,
    /// `DateDuration`'s internal day value.
    pub days: i64,
}

impl DateDuration {
    /// Creates a new, non-validated `DateDuration`.
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(years: i64, months: i64, weeks: i64, days: i64) -> Self {
        Self {
            years,
            months,
            weeks,
            days,
        }
    }
}

impl DateDuration {
    /// Creates a new `DateDuration` with provided values.
    ///
    /// `7.5.9 CreateDateDurationRecord ( years, months, weeks, days )`
    pub fn new(years: i64, months: i64, weeks: i64, days: i64) -> TemporalResult<Self> {
        let result = Self::new_unchecked(years, months, weeks, days);
        is_valid_duration(years, months, weeks, days, 0, 0, 0, 0, 0, 0)?;
        Ok(result)
    }

    /// Returns a negated `DateDuration`.
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
        }
    }

    /// Returns a new `DateDuration` representing the absolute value of the current.
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            years: self.years.abs(),
            months: self.months.abs(),
            weeks: self.weeks.abs(),
            days: self.days.abs(),
        }
    }

    /// Returns the sign for the current `DateDuration`.
    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        self.fields()
            .into_iter()
            .find(|value| *value != 0)
            .map_or(Sign::Zero, |value| Sign::from(value.signum() as i8))
    }

    /// Returns the fields in year, month, week, day order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> [i64; 4] {
        [self.years, self.months, self.weeks, self.days]
    }

    /// `7.5.10 AdjustDateDurationRecord ( dateDuration, days [ , weeks [ , months ] ] )`
    pub(crate) fn adjust(
        &self,
        days: i64,
        weeks: Option<i64>,
        months: Option<i64>,
    ) -> TemporalResult<Self> {
        Self::new(
            self.years,
            months.unwrap_or(self.months),
            weeks.unwrap_or(self.weeks),
            days,
        )
    }

    /// `7.5.38 DateDurationDays ( dateDuration, plainRelativeTo )`
    pub(crate) fn days(&self, relative_to: &PlainDate) -> TemporalResult<i64> {
        let years_months_weeks = self.adjust(0, None, None)?;
        if years_months_weeks.sign() == Sign::Zero {
            return Ok(self.days);
        }
        let later = relative_to.calendar().date_add(
            &relative_to.iso,
            &years_months_weeks,
            Overflow::Constrain,
        )?;
        let epoch_days_1 = relative_to.iso.to_epoch_days();
        let epoch_days_2 = later.iso.to_epoch_days();
        self.days
            .checked_add(epoch_days_2 - epoch_days_1)
            .ok_or(TemporalError::range().with_message("days exceeded a valid range."))
    }

    /// Adds the days and weeks of this duration to an ISO date, ignoring years and months.
    pub(crate) fn add_days_to(&self, date: &IsoDate) -> TemporalResult<IsoDate> {
        let days = self
            .weeks
            .checked_mul(7)
            .and_then(|weeks| weeks.checked_add(self.days))
            .ok_or(TemporalError::range().with_message("days exceeded a valid range."))?;
        date.add_days(days)
    }
}
