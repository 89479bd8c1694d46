//! This module implements the internal normalized duration records and the
//! relative rounding machinery built on top of them.

use core::{num::NonZeroU128, ops::Add};

use crate::{
    builtins::core::{calendar::Calendar, timezone::TimeZone},
    error::ErrorMessage,
    iso::IsoDateTime,
    options::{Disambiguation, Overflow, ResolvedRoundingOptions, RoundingMode, Unit},
    provider::TimeZoneProvider,
    rounding::{fraction_rounds_up, IncrementRounder},
    temporal_assert, Sign, TemporalError, TemporalResult, TemporalUnwrap, NS_PER_DAY,
};

use super::{DateDuration, Duration};

/// The largest representable time duration: 2^53 seconds minus one nanosecond.
pub(crate) const MAX_TIME_DURATION: i128 = 9_007_199_254_740_991_999_999_999;

const NS_PER_DAY_128BIT: i128 = NS_PER_DAY as i128;

// ==== TimeDuration ====
//
// A time duration represented in pure nanoseconds.
//
// Invariants:
//
// nanoseconds.abs() <= MAX_TIME_DURATION

/// A `TimeDuration` is the time portion of a duration normalized into nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeDuration(pub(crate) i128);

impl TimeDuration {
    /// The zero time duration.
    pub const ZERO: Self = Self(0);

    pub(crate) fn from_components(
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> TemporalResult<Self> {
        let total = i128::from(hours)
            .checked_mul(3_600_000_000_000)
            .and_then(|ns| ns.checked_add(i128::from(minutes).checked_mul(60_000_000_000)?))
            .and_then(|ns| ns.checked_add(i128::from(seconds).checked_mul(1_000_000_000)?))
            .and_then(|ns| ns.checked_add(i128::from(milliseconds).checked_mul(1_000_000)?))
            .and_then(|ns| ns.checked_add(microseconds.checked_mul(1_000)?))
            .and_then(|ns| ns.checked_add(nanoseconds))
            .ok_or(TemporalError::overflow().with_enum(ErrorMessage::DurationOutOfRange))?;
        Self::checked_new(total)
    }

    /// Creates a `TimeDuration` from nanoseconds, rejecting values beyond the maximum.
    #[inline]
    pub(crate) fn checked_new(nanoseconds: i128) -> TemporalResult<Self> {
        if nanoseconds.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::overflow().with_enum(ErrorMessage::DurationOutOfRange));
        }
        Ok(Self(nanoseconds))
    }

    /// Equivalent to 7.5.27 TimeDurationFromEpochNanosecondsDifference ( one, two )
    pub(crate) fn from_nanosecond_difference(one: i128, two: i128) -> TemporalResult<Self> {
        let result = one - two;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range()
                .with_message("TimeDuration exceeds maxTimeDuration."));
        }
        Ok(Self(result))
    }

    pub(crate) fn add_days(&self, days: i64) -> TemporalResult<Self> {
        let result = self.0 + i128::from(days) * NS_PER_DAY_128BIT;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range()
                .with_message("TimeDuration exceeds maxTimeDuration."));
        }
        Ok(Self(result))
    }

    /// Returns the nanoseconds of this duration.
    #[inline]
    #[must_use]
    pub fn as_nanoseconds(&self) -> i128 {
        self.0
    }

    /// Divides the `TimeDuration` by a divisor, truncating toward zero.
    #[inline]
    pub(super) fn divide(&self, divisor: i128) -> i128 {
        self.0 / divisor
    }

    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        Sign::from(self.0.cmp(&0))
    }

    /// Returns the whole seconds of this duration, truncated toward zero.
    #[inline]
    #[must_use]
    pub fn seconds(&self) -> i64 {
        (self.0 / 1_000_000_000) as i64
    }

    /// Returns the sub-second nanoseconds, carrying the sign of the duration.
    #[inline]
    #[must_use]
    pub fn subseconds(&self) -> i32 {
        (self.0 % 1_000_000_000) as i32
    }

    pub(crate) fn checked_add(&self, other: &Self) -> TemporalResult<Self> {
        let result = self.0 + other.0;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range()
                .with_message("AddTimeDuration exceeded a valid TimeDuration range."));
        }
        Ok(Self(result))
    }

    pub(crate) fn checked_sub(&self, other: &Self) -> TemporalResult<Self> {
        let result = self.0 - other.0;
        if result.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range()
                .with_message("SubtractTimeDuration exceeded a valid TimeDuration range."));
        }
        Ok(Self(result))
    }

    pub(crate) fn round_to_increment(
        &self,
        increment: NonZeroU128,
        mode: RoundingMode,
    ) -> TemporalResult<Self> {
        let rounded = IncrementRounder::from_signed_num(self.0, increment)?.round(mode);
        if rounded.abs() > MAX_TIME_DURATION {
            return Err(TemporalError::range()
                .with_message("TimeDuration exceeds maxTimeDuration."));
        }
        Ok(Self(rounded))
    }

    pub(crate) fn round(&self, options: ResolvedRoundingOptions) -> TemporalResult<Self> {
        let increment = unit_increment(options.smallest_unit, options)?;
        self.round_to_increment(increment, options.rounding_mode)
    }

    /// The division is carried out on integers, so the result is the closest
    /// `f64` to the exact quotient.
    pub(crate) fn total(&self, unit: Unit) -> TemporalResult<f64> {
        let divisor = unit.as_nanoseconds().temporal_unwrap()?;
        Ok(exact_ratio_to_f64(self.0, i128::from(divisor)))
    }

    /// `Duration` whose days and smaller units hold the balanced fields.
    pub(crate) fn balance(&self, largest_unit: Unit) -> TemporalResult<Duration> {
        let sign = self.0.signum();
        let mut nanoseconds = self.0.abs();
        let (mut days, mut hours, mut minutes, mut seconds, mut milliseconds, mut microseconds) =
            (0, 0, 0, 0, 0, 0);

        match largest_unit {
            Unit::Year | Unit::Month | Unit::Week | Unit::Day => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
                minutes = seconds / 60;
                seconds %= 60;
                hours = minutes / 60;
                minutes %= 60;
                days = hours / 24;
                hours %= 24;
            }
            Unit::Hour => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
                minutes = seconds / 60;
                seconds %= 60;
                hours = minutes / 60;
                minutes %= 60;
            }
            Unit::Minute => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
                minutes = seconds / 60;
                seconds %= 60;
            }
            Unit::Second => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
                seconds = milliseconds / 1000;
                milliseconds %= 1000;
            }
            Unit::Millisecond => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
                milliseconds = microseconds / 1000;
                microseconds %= 1000;
            }
            Unit::Microsecond => {
                microseconds = nanoseconds / 1000;
                nanoseconds %= 1000;
            }
            Unit::Nanosecond => {}
            Unit::Auto => {
                return Err(TemporalError::assert().with_message("largestUnit must be resolved."))
            }
        }

        // Bounded by MAX_TIME_DURATION, so every field except microseconds
        // and nanoseconds fits an i64.
        let narrow = |value: i128| {
            i64::try_from(value * sign)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationOutOfRange))
        };
        Duration::new(
            0,
            0,
            0,
            narrow(days)?,
            narrow(hours)?,
            narrow(minutes)?,
            narrow(seconds)?,
            narrow(milliseconds)?,
            microseconds * sign,
            nanoseconds * sign,
        )
    }
}

impl Add<Self> for TimeDuration {
    type Output = TemporalResult<Self>;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(&rhs)
    }
}

/// Returns `unit length × increment` for a time unit or a 24-hour day.
fn unit_increment(unit: Unit, options: ResolvedRoundingOptions) -> TemporalResult<NonZeroU128> {
    let length = NonZeroU128::new(unit.as_nanoseconds().temporal_unwrap()?.into()).temporal_unwrap()?;
    options
        .increment
        .as_extended_increment()
        .checked_mul(length)
        .ok_or(TemporalError::range().with_message("increment exceeded valid range."))
}

/// Converts `numerator / denominator` to the nearest `f64` without first
/// rounding the numerator.
pub(crate) fn exact_ratio_to_f64(numerator: i128, denominator: i128) -> f64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    quotient as f64 + remainder as f64 / denominator as f64
}

// ==== InternalDurationRecord ====
//
// A record consisting of a DateDuration and TimeDuration
//

/// An `InternalDurationRecord` is a duration record that contains
/// a `DateDuration` and a `TimeDuration`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InternalDurationRecord {
    date: DateDuration,
    norm: TimeDuration,
}

impl InternalDurationRecord {
    /// Creates a new `InternalDurationRecord`.
    pub(crate) fn new(date: DateDuration, norm: TimeDuration) -> TemporalResult<Self> {
        if date.sign() != Sign::Zero && norm.sign() != Sign::Zero && date.sign() != norm.sign() {
            return Err(TemporalError::range().with_enum(ErrorMessage::DurationMixedSign));
        }
        Ok(Self { date, norm })
    }

    pub(crate) fn from_date_duration(date: DateDuration) -> TemporalResult<Self> {
        Self::new(date, TimeDuration::default())
    }

    pub(crate) fn date(&self) -> DateDuration {
        self.date
    }

    pub(crate) fn normalized_time_duration(&self) -> TimeDuration {
        self.norm
    }

    pub(crate) fn sign(&self) -> Sign {
        match self.date.sign() {
            Sign::Zero => self.norm.sign(),
            sign => sign,
        }
    }
}

// ==== Nudge Duration Rounding Functions ====

/// The time zone a relative duration is measured in, with the provider that backs it.
pub(crate) type ZoneContext<'a> = Option<(&'a TimeZone, &'a dyn TimeZoneProvider)>;

/// The origin of a relative rounding: a wall-clock date-time on a calendar.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RelativeOrigin<'a> {
    pub(crate) iso: IsoDateTime,
    pub(crate) calendar: &'a Calendar,
}

impl RelativeOrigin<'_> {
    /// Adds a date duration to the origin date, keeping the origin wall-clock time.
    fn add_date(&self, duration: &DateDuration) -> TemporalResult<IsoDateTime> {
        let date = self
            .calendar
            .date_add(&self.iso.date, duration, Overflow::Constrain)?;
        Ok(IsoDateTime::new_unchecked(date.iso, self.iso.time))
    }
}

/// Returns the epoch nanoseconds of a wall-clock date-time, read as UTC when no zone is given.
fn epoch_ns_for(date_time: &IsoDateTime, tz: ZoneContext<'_>) -> TemporalResult<i128> {
    match tz {
        Some((tz, provider)) => tz
            .get_epoch_nanoseconds_for(*date_time, Disambiguation::Compatible, provider)
            .map(|ns| ns.0),
        None => Ok(date_time.as_nanoseconds().0),
    }
}

#[derive(Debug)]
struct NudgeRecord {
    normalized: InternalDurationRecord,
    total: Option<f64>,
    nudge_epoch_ns: i128,
    expanded: bool,
}

impl InternalDurationRecord {
    fn nudge_calendar_unit(
        &self,
        sign: Sign,
        dest_epoch_ns: i128,
        origin: &RelativeOrigin<'_>,
        tz: ZoneContext<'_>,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        let increment = i64::from(options.increment.get());
        let step = increment * i64::from(sign.multiplier());
        let truncate = |value: i64| -> TemporalResult<i64> {
            let rounded = IncrementRounder::from_signed_num(
                value,
                options.increment.as_extended_increment(),
            )?
            .round(RoundingMode::Trunc);
            i64::try_from(rounded)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationOutOfRange))
        };
        let date = self.date();

        let (r1, r2, start_duration, end_duration) = match options.smallest_unit {
            Unit::Year => {
                let years = truncate(date.years)?;
                (
                    years,
                    years + step,
                    DateDuration::new(years, 0, 0, 0)?,
                    DateDuration::new(years + step, 0, 0, 0)?,
                )
            }
            Unit::Month => {
                let months = truncate(date.months)?;
                (
                    months,
                    months + step,
                    DateDuration::new(date.years, months, 0, 0)?,
                    DateDuration::new(date.years, months + step, 0, 0)?,
                )
            }
            Unit::Week => {
                let years_months = date.adjust(0, Some(0), None)?;
                let weeks_start = origin.calendar.date_add(
                    &origin.iso.date,
                    &years_months,
                    Overflow::Constrain,
                )?;
                let weeks_end = weeks_start.iso.add_days(date.days)?;
                let until_result =
                    origin
                        .calendar
                        .date_until(&weeks_start.iso, &weeks_end, Unit::Week)?;
                let weeks = truncate(date.weeks + until_result.weeks)?;
                (
                    weeks,
                    weeks + step,
                    DateDuration::new(date.years, date.months, weeks, 0)?,
                    DateDuration::new(date.years, date.months, weeks + step, 0)?,
                )
            }
            Unit::Day => {
                let days = truncate(date.days)?;
                (
                    days,
                    days + step,
                    DateDuration::new(date.years, date.months, date.weeks, days)?,
                    DateDuration::new(date.years, date.months, date.weeks, days + step)?,
                )
            }
            _ => {
                return Err(
                    TemporalError::assert().with_message("nudged unit must be a date unit.")
                )
            }
        };

        temporal_assert!(
            (sign == Sign::Negative && r1 <= 0 && r1 > r2) || (sign != Sign::Negative && r1 >= 0 && r1 < r2),
            "nudge window must advance in the direction of the duration."
        );

        let start = origin.add_date(&start_duration)?;
        let end = origin.add_date(&end_duration)?;
        let start_epoch_ns = epoch_ns_for(&start, tz)?;
        let end_epoch_ns = epoch_ns_for(&end, tz)?;

        let within_window = if sign == Sign::Negative {
            end_epoch_ns <= dest_epoch_ns && dest_epoch_ns <= start_epoch_ns
        } else {
            start_epoch_ns <= dest_epoch_ns && dest_epoch_ns <= end_epoch_ns
        };
        if !within_window || end_epoch_ns == start_epoch_ns {
            return Err(TemporalError::range()
                .with_message("the rounding window does not contain the destination."));
        }

        // progress = numerator / denominator, both taken in the direction of the duration.
        let numerator = (dest_epoch_ns - start_epoch_ns).unsigned_abs();
        let denominator = (end_epoch_ns - start_epoch_ns).unsigned_abs();

        let total = {
            let scaled = i128::from(r1) * denominator as i128
                + numerator as i128 * i128::from(step);
            exact_ratio_to_f64(scaled, denominator as i128)
        };

        let unsigned_mode = options
            .rounding_mode
            .get_unsigned_round_mode(sign != Sign::Negative);
        let r1_is_even = (r1.unsigned_abs() / increment.unsigned_abs()) % 2 == 0;
        let rounds_up = fraction_rounds_up(numerator, denominator, r1_is_even, unsigned_mode);

        let (duration, nudge_epoch_ns) = if rounds_up {
            (end_duration, end_epoch_ns)
        } else {
            (start_duration, start_epoch_ns)
        };

        Ok(NudgeRecord {
            normalized: InternalDurationRecord::from_date_duration(duration)?,
            total: Some(total),
            nudge_epoch_ns,
            expanded: rounds_up,
        })
    }

    fn nudge_to_zoned_time(
        &self,
        sign: Sign,
        origin: &RelativeOrigin<'_>,
        tz: &TimeZone,
        provider: &dyn TimeZoneProvider,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        let date = self.date();
        let start = origin.add_date(&date)?;
        let end_date = start
            .date
            .add_days(i64::from(sign.multiplier()))?;
        let end = IsoDateTime::new_unchecked(end_date, origin.iso.time);

        let zone = Some((tz, provider));
        let start_epoch_ns = epoch_ns_for(&start, zone)?;
        let end_epoch_ns = epoch_ns_for(&end, zone)?;

        let day_span = TimeDuration::from_nanosecond_difference(end_epoch_ns, start_epoch_ns)?;
        temporal_assert!(
            day_span.sign() == sign,
            "a day must advance in the direction of the duration."
        );

        let increment = unit_increment(options.smallest_unit, options)?;
        let mut rounded = self
            .normalized_time_duration()
            .round_to_increment(increment, options.rounding_mode)?;
        let beyond_day_span = rounded.checked_sub(&day_span)?;

        let (expanded, day_delta, nudge_epoch_ns) = if beyond_day_span.sign() != sign.negate() {
            rounded = beyond_day_span.round_to_increment(increment, options.rounding_mode)?;
            (true, i64::from(sign.multiplier()), end_epoch_ns + rounded.0)
        } else {
            (false, 0, start_epoch_ns + rounded.0)
        };

        let date = date.adjust(date.days + day_delta, None, None)?;
        Ok(NudgeRecord {
            normalized: InternalDurationRecord::new(date, rounded)?,
            total: None,
            nudge_epoch_ns,
            expanded,
        })
    }

    fn nudge_to_day_or_time(
        &self,
        dest_epoch_ns: i128,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<NudgeRecord> {
        let norm = self.normalized_time_duration().add_days(self.date().days)?;

        let total = norm.total(options.smallest_unit)?;

        let increment = unit_increment(options.smallest_unit, options)?;
        let rounded_norm = norm.round_to_increment(increment, options.rounding_mode)?;
        let diff_norm = rounded_norm.checked_sub(&norm)?;

        let whole_days = norm.divide(NS_PER_DAY_128BIT);
        let rounded_whole_days = rounded_norm.divide(NS_PER_DAY_128BIT);
        let day_delta = rounded_whole_days - whole_days;
        let expanded = Sign::from(day_delta.cmp(&0)) == norm.sign();

        let nudge_epoch_ns = dest_epoch_ns + diff_norm.0;

        let (days, remainder) = if options.largest_unit.is_date_unit() {
            (
                rounded_whole_days,
                TimeDuration(rounded_norm.0 - rounded_whole_days * NS_PER_DAY_128BIT),
            )
        } else {
            (0, rounded_norm)
        };

        let days = i64::try_from(days)
            .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationOutOfRange))?;
        let date = self.date().adjust(days, None, None)?;
        Ok(NudgeRecord {
            normalized: InternalDurationRecord::new(date, remainder)?,
            total: Some(total),
            nudge_epoch_ns,
            expanded,
        })
    }

    fn bubble_relative_duration(
        &self,
        sign: Sign,
        nudge_epoch_ns: i128,
        origin: &RelativeOrigin<'_>,
        tz: ZoneContext<'_>,
        largest_unit: Unit,
        smallest_unit: Unit,
    ) -> TemporalResult<InternalDurationRecord> {
        let mut duration = *self;
        if smallest_unit == largest_unit {
            return Ok(duration);
        }

        let step = i64::from(sign.multiplier());
        let mut next = smallest_unit.larger();
        while let Some(unit) = next.filter(|unit| *unit <= largest_unit) {
            next = unit.larger();
            if unit == Unit::Week && largest_unit != Unit::Week {
                continue;
            }

            let date = duration.date();
            let end_duration = match unit {
                Unit::Year => DateDuration::new(date.years + step, 0, 0, 0)?,
                Unit::Month => date.adjust(0, Some(0), Some(date.months + step))?,
                Unit::Week => date.adjust(0, Some(date.weeks + step), None)?,
                _ => {
                    return Err(TemporalError::assert()
                        .with_message("bubbling only carries into calendar units."))
                }
            };

            let end = origin.add_date(&end_duration)?;
            let end_epoch_ns = epoch_ns_for(&end, tz)?;
            let beyond_end = nudge_epoch_ns - end_epoch_ns;

            if Sign::from(beyond_end.cmp(&0)) != sign.negate() {
                duration = InternalDurationRecord::from_date_duration(end_duration)?;
            } else {
                break;
            }
        }

        Ok(duration)
    }

    pub(crate) fn round_relative_duration(
        &self,
        dest_epoch_ns: i128,
        origin: &RelativeOrigin<'_>,
        tz: ZoneContext<'_>,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<InternalDurationRecord> {
        let irregular_unit = options.smallest_unit.is_calendar_unit()
            || (tz.is_some() && options.smallest_unit == Unit::Day);

        let sign = if self.sign() == Sign::Negative {
            Sign::Negative
        } else {
            Sign::Positive
        };

        let nudge_result = match tz {
            _ if irregular_unit => {
                self.nudge_calendar_unit(sign, dest_epoch_ns, origin, tz, options)?
            }
            Some((zone, provider)) => {
                self.nudge_to_zoned_time(sign, origin, zone, provider, options)?
            }
            None => self.nudge_to_day_or_time(dest_epoch_ns, options)?,
        };

        let mut duration = nudge_result.normalized;
        if nudge_result.expanded && options.smallest_unit != Unit::Week {
            let start_unit = options.smallest_unit.max(Unit::Day);
            duration = duration.bubble_relative_duration(
                sign,
                nudge_result.nudge_epoch_ns,
                origin,
                tz,
                options.largest_unit,
                start_unit,
            )?;
        }

        Ok(duration)
    }

    pub(crate) fn total_relative_duration(
        &self,
        dest_epoch_ns: i128,
        origin: &RelativeOrigin<'_>,
        tz: ZoneContext<'_>,
        unit: Unit,
    ) -> TemporalResult<f64> {
        if unit.is_calendar_unit() || (tz.is_some() && unit == Unit::Day) {
            let sign = if self.sign() == Sign::Negative {
                Sign::Negative
            } else {
                Sign::Positive
            };
            let options = ResolvedRoundingOptions {
                largest_unit: unit,
                smallest_unit: unit,
                increment: Default::default(),
                rounding_mode: RoundingMode::Trunc,
            };
            let record = self.nudge_calendar_unit(sign, dest_epoch_ns, origin, tz, options)?;
            return record.total.temporal_unwrap();
        }

        let norm = self.normalized_time_duration().add_days(self.date().days)?;
        norm.total(unit)
    }
}
