//! Proleptic Gregorian date and time records.
//!
//! [`IsoDate`], [`IsoTime`] and [`IsoDateTime`] are the storage behind every
//! plain and zoned value; calendars convert to and from `IsoDate`. Dates are
//! limited to ±10^8 days around the Unix epoch, and a date-time may sit up to
//! one day further out so that every instant has a local wall-clock time.

use core::num::NonZeroU128;

use ixdtf::records::TimeRecord;
use zone_provider::epoch_nanoseconds::EpochNanoseconds;

use crate::{
    builtins::core::{
        calendar::Calendar,
        duration::{
            normalized::{InternalDurationRecord, TimeDuration},
            DateDuration,
        },
        PartialTime,
    },
    error::{ErrorMessage, TemporalError},
    options::{Overflow, ResolvedRoundingOptions, Unit},
    rounding::IncrementRounder,
    utils, TemporalResult, TemporalUnwrap, NS_MAX_INSTANT, NS_MIN_INSTANT, NS_PER_DAY,
};

const NS_PER_HOUR: i64 = 3_600_000_000_000;
const NS_PER_MINUTE: i64 = 60_000_000_000;
const NS_PER_SECOND: i64 = 1_000_000_000;

/// Furthest a date may lie from 1970-01-01, in days.
const MAX_EPOCH_DAYS: i64 = 100_000_001;

/// A date and a wall-clock time.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDateTime {
    pub date: IsoDate,
    pub time: IsoTime,
}

impl IsoDateTime {
    pub(crate) const fn new_unchecked(date: IsoDate, time: IsoTime) -> Self {
        Self { date, time }
    }

    /// Pairs `date` and `time`, failing when the result is out of range.
    pub fn new(date: IsoDate, time: IsoTime) -> TemporalResult<Self> {
        let result = Self::new_unchecked(date, time);
        result.check_within_limits()?;
        Ok(result)
    }

    /// Fails with a `RangeError` unless [`IsoDateTime::is_within_limits`].
    pub fn check_within_limits(&self) -> TemporalResult<()> {
        if self.is_within_limits() {
            Ok(())
        } else {
            Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))
        }
    }

    /// Whether the date-time is strictly less than a day away from the
    /// instant limits.
    pub(crate) fn is_within_limits(&self) -> bool {
        if self.date.to_epoch_days().abs() > MAX_EPOCH_DAYS {
            return false;
        }
        let ns = self.as_nanoseconds().0;
        let slack = i128::from(NS_PER_DAY);
        NS_MIN_INSTANT - slack < ns && ns < NS_MAX_INSTANT + slack
    }

    /// The wall-clock reading of `epoch_nanoseconds` at `offset` nanoseconds
    /// from UTC.
    pub(crate) fn from_epoch_nanos(epoch_nanoseconds: &EpochNanoseconds, offset: i128) -> Self {
        let local = epoch_nanoseconds.0 + offset;
        let day_length = i128::from(NS_PER_DAY);
        let date = IsoDate::from_epoch_days(local.div_euclid(day_length) as i64);
        let time = IsoTime::from_nanoseconds(local.rem_euclid(day_length) as i64);
        Self::new_unchecked(date, time)
    }

    /// Balances a parsed wall-clock reading moved by `shift` nanoseconds. Only
    /// the epoch day range is checked, so the caller can apply an offset before
    /// validating the instant.
    pub(crate) fn balance_shifted(
        year: i32,
        month: u8,
        day: u8,
        time: IsoTime,
        shift: i128,
    ) -> TemporalResult<Self> {
        let (days, time) = time.add(TimeDuration(shift));
        let date = IsoDate::try_balance(year, month.into(), i64::from(day) + days)?;
        Ok(Self::new_unchecked(date, time))
    }

    /// The epoch nanoseconds of this reading taken as UTC.
    pub fn as_nanoseconds(&self) -> EpochNanoseconds {
        let days = i128::from(self.date.to_epoch_days());
        let time = i128::from(self.time.as_nanoseconds());
        EpochNanoseconds(days * i128::from(NS_PER_DAY) + time)
    }

    pub(crate) fn round(&self, resolved_options: ResolvedRoundingOptions) -> TemporalResult<Self> {
        let (days, time) = self.time.round(resolved_options)?;
        Self::new(self.date.add_days(days)?, time)
    }

    /// The difference from this date-time to `other`. Days and larger units
    /// are measured on `calendar`.
    pub(crate) fn diff(
        &self,
        other: &Self,
        calendar: &Calendar,
        largest_unit: Unit,
    ) -> TemporalResult<InternalDurationRecord> {
        let mut time_duration = self.time.diff(&other.time);
        let time_sign = time_duration.sign() as i8;
        let date_sign = self.date.cmp(&other.date) as i8;

        // A time difference pointing against the date difference borrows a day.
        let mut end_date = other.date;
        if time_sign != 0 && time_sign == date_sign {
            end_date = end_date.add_days(i64::from(time_sign))?;
            time_duration = time_duration.add_days(-i64::from(time_sign))?;
        }

        let date_largest_unit = largest_unit.max(Unit::Day);
        let mut date_diff = calendar.date_until(&self.date, &end_date, date_largest_unit)?;
        if largest_unit < Unit::Day {
            time_duration = time_duration.add_days(date_diff.days)?;
            date_diff.days = 0;
        }

        InternalDurationRecord::new(date_diff, time_duration)
    }
}

impl From<IsoDateTime> for zone_provider::provider::IsoDateTime {
    fn from(value: IsoDateTime) -> Self {
        let IsoDateTime { date, time } = value;
        Self {
            year: date.year,
            month: date.month,
            day: date.day,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            millisecond: time.millisecond,
            microsecond: time.microsecond,
            nanosecond: time.nanosecond,
        }
    }
}

// ==== IsoDate ====

/// A proleptic Gregorian date. Defaults to 1970-01-01.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDate {
    /// Year, -271821 through 275760 for values in range.
    pub year: i32,
    /// Month, 1 through 12.
    pub month: u8,
    /// Day of the month, starting at 1.
    pub day: u8,
}

impl Default for IsoDate {
    fn default() -> Self {
        Self::new_unchecked(1970, 1, 1)
    }
}

impl IsoDate {
    pub(crate) const fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Clamps or rejects out of range month and day fields. The year is not
    /// range checked.
    pub(crate) fn regulate(
        year: i32,
        month: u8,
        day: u8,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        if overflow == Overflow::Constrain {
            let month = month.clamp(1, 12);
            let day = day.clamp(1, utils::iso_days_in_month(year, month));
            return Ok(Self::new_unchecked(year, month, day));
        }
        if !is_valid_date(year, month, day) {
            return Err(TemporalError::range().with_message("not a valid ISO date."));
        }
        Ok(Self::new_unchecked(year, month, day))
    }

    /// Fails unless noon of this date is within range. Noon is used so that
    /// both limit dates, which are only partly representable, are accepted.
    pub fn check_within_limits(self) -> TemporalResult<()> {
        IsoDateTime::new_unchecked(self, IsoTime::noon()).check_within_limits()
    }

    pub fn check_validity(&self) -> TemporalResult<()> {
        if is_valid_date(self.year, self.month, self.day) {
            Ok(())
        } else {
            Err(TemporalError::range().with_message("IsoDate does not have valid fields."))
        }
    }

    pub(crate) fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let date = Self::regulate(year, month, day, overflow)?;
        date.check_within_limits()?;
        Ok(date)
    }

    /// The date `day - 1` days after the first of `month`, which may lie outside
    /// `1..=12`. Fails when the result leaves the epoch day range.
    pub(crate) fn try_balance(year: i32, month: i32, day: i64) -> TemporalResult<Self> {
        let (year, month) = balance_year_month(year, month);
        let epoch_days = utils::epoch_days_from_gregorian_date(year, month, 1) + day - 1;
        if epoch_days.abs() > MAX_EPOCH_DAYS {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
        }
        Ok(Self::from_epoch_days(epoch_days))
    }

    pub(crate) fn from_epoch_days(epoch_days: i64) -> Self {
        let (year, month, day) = utils::ymd_from_epoch_days(epoch_days);
        Self::new_unchecked(year, month, day)
    }

    /// Days since 1970-01-01.
    pub(crate) fn to_epoch_days(self) -> i64 {
        utils::epoch_days_from_gregorian_date(self.year, self.month, self.day)
    }

    /// Days since 0001-01-00, the day count the calendar arithmetic uses.
    pub(crate) fn to_rata_die(self) -> i64 {
        self.to_epoch_days() + utils::UNIX_EPOCH_RATA_DIE
    }

    pub(crate) fn from_rata_die(rata_die: i64) -> Self {
        Self::from_epoch_days(rata_die - utils::UNIX_EPOCH_RATA_DIE)
    }

    pub(crate) fn add_days(self, days: i64) -> TemporalResult<Self> {
        Self::try_balance(self.year, self.month.into(), i64::from(self.day) + days)
    }

    /// Adds years and months first, regulating the day with `overflow`, then
    /// weeks and days.
    pub(crate) fn add_date_duration(
        self,
        duration: &DateDuration,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let months = i64::from(self.month) - 1 + duration.months;
        let year = i64::from(self.year) + duration.years + months.div_euclid(12);
        let year = i32::try_from(year)
            .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))?;
        let month = (months.rem_euclid(12) + 1) as u8;

        let result = Self::new_with_overflow(year, month, self.day, overflow)?
            .add_days(duration.days + 7 * duration.weeks)?;
        result.check_within_limits()?;
        Ok(result)
    }

    /// The ISO calendar difference from this date to `other`.
    pub(crate) fn diff_iso_date(&self, other: &Self, largest_unit: Unit) -> DateDuration {
        let sign = other.cmp(self) as i8;
        if sign == 0 {
            return DateDuration::default();
        }

        // Count whole months without passing `other`. The day of the month is
        // kept even where it overflows the target month.
        let mut total_months = 0;
        if matches!(largest_unit, Unit::Year | Unit::Month) {
            total_months =
                (other.year - self.year) * 12 + i32::from(other.month) - i32::from(self.month);
            let passes = |months: i32| {
                let (year, month) = balance_year_month(self.year, i32::from(self.month) + months);
                date_passes(&Self::new_unchecked(year, month, self.day), other, sign)
            };
            while total_months != 0 && passes(total_months) {
                total_months -= i32::from(sign);
            }
        }
        let (years, months) = if largest_unit == Unit::Year {
            (total_months / 12, total_months % 12)
        } else {
            (0, total_months)
        };

        let (year, month) = balance_year_month(self.year, i32::from(self.month) + total_months);
        let day = self.day.min(utils::iso_days_in_month(year, month));
        let days = other.to_epoch_days() - Self::new_unchecked(year, month, day).to_epoch_days();
        let (weeks, days) = if largest_unit == Unit::Week {
            (days / 7, days % 7)
        } else {
            (0, days)
        };

        DateDuration::new_unchecked(i64::from(years), i64::from(months), weeks, days)
    }

    /// Monday is 1, Sunday is 7.
    pub(crate) fn day_of_week(self) -> u16 {
        utils::epoch_days_to_day_of_week(self.to_epoch_days())
    }

    pub(crate) fn day_of_year(self) -> u16 {
        utils::iso_day_of_year(self.year, self.month, self.day)
    }

    pub(crate) fn days_in_month(self) -> u8 {
        utils::iso_days_in_month(self.year, self.month)
    }

    pub(crate) fn days_in_year(self) -> u16 {
        utils::iso_days_in_year(self.year)
    }

    pub(crate) fn in_leap_year(self) -> bool {
        utils::is_leap(self.year)
    }
}

// ==== IsoTime ====

/// A wall-clock time with nanosecond precision. Leap seconds are not
/// represented.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoTime {
    /// 0 through 23.
    pub hour: u8,
    /// 0 through 59.
    pub minute: u8,
    /// 0 through 59.
    pub second: u8,
    /// 0 through 999.
    pub millisecond: u16,
    /// 0 through 999.
    pub microsecond: u16,
    /// 0 through 999.
    pub nanosecond: u16,
}

impl IsoTime {
    pub(crate) const fn new_unchecked(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        }
    }

    pub(crate) const fn noon() -> Self {
        Self::new_unchecked(12, 0, 0, 0, 0, 0)
    }

    /// Creates a time, clamping each field to its range or rejecting the
    /// whole time when any field is out of range.
    pub fn new(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        overflow: Overflow,
    ) -> TemporalResult<IsoTime> {
        let clamped = Self::new_unchecked(
            hour.min(23),
            minute.min(59),
            second.min(59),
            millisecond.min(999),
            microsecond.min(999),
            nanosecond.min(999),
        );
        let exact = Self::new_unchecked(hour, minute, second, millisecond, microsecond, nanosecond);
        if overflow == Overflow::Reject && clamped != exact {
            return Err(TemporalError::range().with_message("IsoTime is not valid"));
        }
        Ok(clamped)
    }

    /// Replaces the fields present in `partial`.
    pub(crate) fn with(&self, partial: PartialTime, overflow: Overflow) -> TemporalResult<Self> {
        Self::new(
            partial.hour.unwrap_or(self.hour),
            partial.minute.unwrap_or(self.minute),
            partial.second.unwrap_or(self.second),
            partial.millisecond.unwrap_or(self.millisecond),
            partial.microsecond.unwrap_or(self.microsecond),
            partial.nanosecond.unwrap_or(self.nanosecond),
            overflow,
        )
    }

    /// Builds a time from a parsed record. A leap second is read as second 59.
    pub(crate) fn from_time_record(record: TimeRecord) -> TemporalResult<Self> {
        let fraction = match record.fraction {
            Some(fraction) => fraction.to_nanoseconds().ok_or(
                TemporalError::range().with_enum(ErrorMessage::FractionalTimeMoreThanNineDigits),
            )?,
            None => 0,
        };
        Self::new(
            record.hour,
            record.minute,
            record.second.min(59),
            (fraction / 1_000_000) as u16,
            (fraction / 1_000 % 1_000) as u16,
            (fraction % 1_000) as u16,
            Overflow::Reject,
        )
    }

    /// The time `nanoseconds` after midnight, which must be less than a day.
    pub(crate) fn from_nanoseconds(nanoseconds: i64) -> Self {
        let (hour, rest) = (nanoseconds / NS_PER_HOUR, nanoseconds % NS_PER_HOUR);
        let (minute, rest) = (rest / NS_PER_MINUTE, rest % NS_PER_MINUTE);
        let (second, rest) = (rest / NS_PER_SECOND, rest % NS_PER_SECOND);
        Self::new_unchecked(
            hour as u8,
            minute as u8,
            second as u8,
            (rest / 1_000_000) as u16,
            (rest / 1_000 % 1_000) as u16,
            (rest % 1_000) as u16,
        )
    }

    /// Nanoseconds since midnight.
    pub(crate) fn as_nanoseconds(&self) -> i64 {
        i64::from(self.hour) * NS_PER_HOUR
            + i64::from(self.minute) * NS_PER_MINUTE
            + i64::from(self.second) * NS_PER_SECOND
            + i64::from(self.millisecond) * 1_000_000
            + i64::from(self.microsecond) * 1_000
            + i64::from(self.nanosecond)
    }

    /// Splits a nanosecond count from midnight into whole days and a time.
    fn carry_days(nanoseconds: i128) -> (i64, Self) {
        let day_length = i128::from(NS_PER_DAY);
        let days = nanoseconds.div_euclid(day_length) as i64;
        (days, Self::from_nanoseconds(nanoseconds.rem_euclid(day_length) as i64))
    }

    /// The time from this time to `other` on the same day.
    pub(crate) fn diff(&self, other: &Self) -> TimeDuration {
        TimeDuration(i128::from(other.as_nanoseconds() - self.as_nanoseconds()))
    }

    /// Rounds to the resolved unit and increment, returning the days carried
    /// into the date (0 or 1) with the rounded time.
    pub(crate) fn round(
        &self,
        resolved_options: ResolvedRoundingOptions,
    ) -> TemporalResult<(i64, Self)> {
        let unit = resolved_options.smallest_unit;
        if unit.is_calendar_unit() || unit == Unit::Auto {
            return Err(TemporalError::range()
                .with_message("Invalid smallestUnit value for time rounding."));
        }
        let length = NonZeroU128::new(unit.as_nanoseconds().temporal_unwrap()?.into())
            .temporal_unwrap()?;
        let increment = resolved_options
            .increment
            .as_extended_increment()
            .checked_mul(length)
            .ok_or(TemporalError::range().with_message("increment exceeded valid range."))?;

        // Increments divide the next larger unit, so rounding the nanoseconds
        // since midnight only changes the fields below the unit.
        let rounded = IncrementRounder::from_signed_num(self.as_nanoseconds(), increment)?
            .round(resolved_options.rounding_mode);
        Ok(Self::carry_days(rounded))
    }

    /// Adds a time duration, returning the days carried and the new time.
    pub(crate) fn add(&self, duration: TimeDuration) -> (i64, Self) {
        Self::carry_days(i128::from(self.as_nanoseconds()) + duration.0)
    }
}

// ==== Helpers ====

/// Whether `month` and `day` form a date in `year`.
pub(crate) fn is_valid_date(year: i32, month: u8, day: u8) -> bool {
    (1..=12).contains(&month) && (1..=utils::iso_days_in_month(year, month)).contains(&day)
}

/// Whether `date` lies beyond `other` when moving in the direction of `sign`.
fn date_passes(date: &IsoDate, other: &IsoDate, sign: i8) -> bool {
    date.cmp(other) as i8 == sign
}

/// Whether a year and month lie within the range of `PlainYearMonth`,
/// -271821-04 through 275760-09.
pub(crate) fn year_month_within_limits(year: i32, month: u8) -> bool {
    (-271_821, 4) <= (year, month) && (year, month) <= (275_760, 9)
}

/// Moves a month outside `1..=12` into the neighbouring years.
fn balance_year_month(year: i32, month: i32) -> (i32, u8) {
    let zero_based = month - 1;
    (
        year + zero_based.div_euclid(12),
        (zero_based.rem_euclid(12) + 1) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::{year_month_within_limits, IsoDate, IsoDateTime, IsoTime};
    use crate::{
        builtins::core::duration::normalized::TimeDuration,
        options::{Overflow, Unit},
    };
    use zone_provider::epoch_nanoseconds::EpochNanoseconds;

    const MAX_DAYS_BASE: i64 = 100_000_000;

    #[test]
    fn epoch_day_limits() {
        assert!(IsoDate::try_balance(1970, 1, MAX_DAYS_BASE).is_ok());
        assert!(IsoDate::try_balance(1970, 1, -MAX_DAYS_BASE).is_ok());
        assert!(IsoDate::try_balance(1970, 1, MAX_DAYS_BASE + 3).is_err());
        assert_eq!(
            IsoDate::try_balance(2024, 14, 0).unwrap(),
            IsoDate::new_unchecked(2025, 1, 31)
        );
    }

    #[test]
    fn limits() {
        assert!(IsoDate::new_unchecked(275760, 9, 13).check_within_limits().is_ok());
        assert!(IsoDate::new_unchecked(275760, 9, 14).check_within_limits().is_err());
        assert!(IsoDate::new_unchecked(-271821, 4, 19).check_within_limits().is_ok());
        assert!(IsoDate::new_unchecked(-271821, 4, 18).check_within_limits().is_err());
        assert!(year_month_within_limits(-271821, 4));
        assert!(!year_month_within_limits(-271821, 3));
        assert!(year_month_within_limits(275760, 9));
        assert!(!year_month_within_limits(275760, 10));
    }

    #[test]
    fn regulate_constrains_day() {
        let date = IsoDate::new_with_overflow(2025, 2, 30, Overflow::Constrain).unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2025, 2, 28));
        let date = IsoDate::new_with_overflow(2024, 2, 30, Overflow::Constrain).unwrap();
        assert_eq!(date, IsoDate::new_unchecked(2024, 2, 29));
        assert!(IsoDate::new_with_overflow(2025, 2, 30, Overflow::Reject).is_err());
    }

    #[test]
    fn time_overflow() {
        let time = IsoTime::new(24, 60, 60, 1000, 0, 0, Overflow::Constrain).unwrap();
        assert_eq!(time, IsoTime::new_unchecked(23, 59, 59, 999, 0, 0));
        assert!(IsoTime::new(24, 0, 0, 0, 0, 0, Overflow::Reject).is_err());
        assert!(IsoTime::new(23, 59, 59, 999, 999, 999, Overflow::Reject).is_ok());
    }

    #[test]
    fn time_addition_carries_days() {
        let (days, time) = IsoTime::new_unchecked(1, 0, 0, 0, 0, 0).add(TimeDuration(
            24 * 3_600_000_000_000 - 1,
        ));
        assert_eq!(days, 1);
        assert_eq!(time, IsoTime::new_unchecked(0, 59, 59, 999, 999, 999));

        let (days, time) = IsoTime::default().add(TimeDuration(-1));
        assert_eq!(days, -1);
        assert_eq!(time.hour, 23);
        assert_eq!(IsoTime::from_nanoseconds(IsoTime::noon().as_nanoseconds()), IsoTime::noon());
    }

    #[test]
    fn epoch_nanoseconds_round_trip() {
        let dt = IsoDateTime::new_unchecked(
            IsoDate::new_unchecked(1969, 12, 31),
            IsoTime::new_unchecked(23, 59, 59, 999, 999, 999),
        );
        assert_eq!(dt.as_nanoseconds(), EpochNanoseconds(-1));
        assert_eq!(IsoDateTime::from_epoch_nanos(&EpochNanoseconds(-1), 0), dt);
    }

    #[test]
    fn shifted_balance_crosses_midnight() {
        let dt = IsoDateTime::balance_shifted(
            2024,
            12,
            31,
            IsoTime::new_unchecked(23, 0, 0, 0, 0, 0),
            2 * 3_600_000_000_000,
        )
        .unwrap();
        assert_eq!(dt.date, IsoDate::new_unchecked(2025, 1, 1));
        assert_eq!(dt.time.hour, 1);
    }

    #[test]
    fn diff_iso_date_months() {
        let one = IsoDate::new_unchecked(2021, 1, 31);
        let two = IsoDate::new_unchecked(2021, 2, 28);
        let result = one.diff_iso_date(&two, Unit::Month);
        assert_eq!((result.months, result.days), (0, 28));

        let one = IsoDate::new_unchecked(1997, 12, 16);
        let two = IsoDate::new_unchecked(2021, 7, 16);
        let result = one.diff_iso_date(&two, Unit::Year);
        assert_eq!((result.years, result.months, result.days), (23, 7, 0));

        let result = one.diff_iso_date(&two, Unit::Month);
        assert_eq!((result.years, result.months), (0, 283));

        let result = two.diff_iso_date(&one, Unit::Year);
        assert_eq!((result.years, result.months, result.days), (-23, -7, 0));

        let result = two.diff_iso_date(&one, Unit::Week);
        assert_eq!((result.weeks, result.days), (-1230, -3));
    }
}
