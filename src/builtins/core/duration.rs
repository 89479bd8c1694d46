//! This module implements `Duration` along with its methods and components.

use crate::{
    builtins::core::{PlainDateTime, ZonedDateTime},
    error::ErrorMessage,
    iso::{IsoDateTime, IsoTime},
    options::{
        Overflow, Precision, RelativeTo, ResolvedRoundingOptions, RoundingIncrement,
        RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsers::{
        utf16_to_utf8, FormattableDateDuration, FormattableDuration, FormattableTimeDuration,
    },
    provider::TimeZoneProvider,
    temporal_assert, Sign, TemporalError, TemporalResult, NS_PER_DAY,
};
use alloc::string::{String, ToString};
use core::{cmp::Ordering, fmt, str::FromStr};
use ixdtf::{encoding::Utf8, parsers::IsoDurationParser, records::TimeDurationRecord};
use normalized::{InternalDurationRecord, MAX_TIME_DURATION};
use writeable::Writeable;

mod date;
pub(crate) mod normalized;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use date::DateDuration;
#[doc(inline)]
pub use normalized::TimeDuration;

/// A `PartialDuration` is a Duration that may have fields not set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartialDuration {
    /// A potentially existent `years` field.
    pub years: Option<i64>,
    /// A potentially existent `months` field.
    pub months: Option<i64>,
    /// A potentially existent `weeks` field.
    pub weeks: Option<i64>,
    /// A potentially existent `days` field.
    pub days: Option<i64>,
    /// A potentially existent `hours` field.
    pub hours: Option<i64>,
    /// A potentially existent `minutes` field.
    pub minutes: Option<i64>,
    /// A potentially existent `seconds` field.
    pub seconds: Option<i64>,
    /// A potentially existent `milliseconds` field.
    pub milliseconds: Option<i64>,
    /// A potentially existent `microseconds` field.
    pub microseconds: Option<i128>,
    /// A potentially existent `nanoseconds` field.
    pub nanoseconds: Option<i128>,
}

impl PartialDuration {
    /// Returns whether the `PartialDuration` is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The native Rust implementation of `Temporal.Duration`.
///
/// Every field is an integer. Nonzero fields share a single sign, the calendar
/// fields stay below 2^32 in magnitude, and the days and time fields together
/// stay below 2^53 seconds.
///
/// ## Examples
///
/// ```rust
/// use temporal_engine::Duration;
/// use core::str::FromStr;
///
/// let duration = Duration::from_str("P1Y2M3W4DT5H6M7.008009010S").unwrap();
/// assert_eq!(duration.weeks(), 3);
/// assert_eq!(duration.milliseconds(), 8);
/// assert_eq!(duration.nanoseconds(), 10);
/// assert_eq!(duration.to_string(), "P1Y2M3W4DT5H6M7.00800901S");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Duration {
    date: DateDuration,
    hours: i64,
    minutes: i64,
    seconds: i64,
    milliseconds: i64,
    microseconds: i128,
    nanoseconds: i128,
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        duration_to_formattable(self, Precision::Auto).write_to(f)
    }
}

// ==== Private Creation methods ====

impl Duration {
    /// Creates a new `Duration` without validating its fields.
    #[allow(clippy::too_many_arguments)]
    pub(crate) const fn new_unchecked(
        date: DateDuration,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> Self {
        Self {
            date,
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        }
    }

    pub(crate) fn to_internal_duration_record(&self) -> TemporalResult<InternalDurationRecord> {
        InternalDurationRecord::new(self.date, self.time_duration()?)
    }

    pub(crate) fn to_internal_duration_record_with_24_hour_days(
        &self,
    ) -> TemporalResult<InternalDurationRecord> {
        let time = self.time_duration()?.add_days(self.date.days)?;
        let date = self.date.adjust(0, None, None)?;
        InternalDurationRecord::new(date, time)
    }

    pub(crate) fn from_internal(
        internal: InternalDurationRecord,
        largest_unit: Unit,
    ) -> TemporalResult<Self> {
        let time = internal.normalized_time_duration().balance(largest_unit)?;
        let date = internal.date();
        let days = date
            .days
            .checked_add(time.days())
            .ok_or(TemporalError::range().with_enum(ErrorMessage::DurationOutOfRange))?;
        Self::new(
            date.years,
            date.months,
            date.weeks,
            days,
            time.hours,
            time.minutes,
            time.seconds,
            time.milliseconds,
            time.microseconds,
            time.nanoseconds,
        )
    }

    /// Returns the time fields of this duration as a single nanosecond count.
    pub(crate) fn time_duration(&self) -> TemporalResult<TimeDuration> {
        TimeDuration::from_components(
            self.hours,
            self.minutes,
            self.seconds,
            self.milliseconds,
            self.microseconds,
            self.nanoseconds,
        )
    }

    pub(crate) fn default_largest_unit(&self) -> Unit {
        let time_fields = [
            i128::from(self.hours),
            i128::from(self.minutes),
            i128::from(self.seconds),
            i128::from(self.milliseconds),
            self.microseconds,
        ];
        self.date
            .fields()
            .into_iter()
            .map(i128::from)
            .chain(time_fields)
            .position(|value| value != 0)
            .and_then(|index| Unit::DESCENDING.get(index).copied())
            .unwrap_or(Unit::Nanosecond)
    }

    /// Returns whether the duration only holds time fields.
    pub(crate) fn is_time_duration(&self) -> bool {
        self.date == DateDuration::default()
    }

    /// Whole days of the time part are folded into the date part; the rest is dropped.
    pub(crate) fn to_date_duration_record_without_time(&self) -> TemporalResult<DateDuration> {
        let internal = self.to_internal_duration_record_with_24_hour_days()?;
        let days = internal.normalized_time_duration().as_nanoseconds() / i128::from(NS_PER_DAY);
        internal.date().adjust(days as i64, None, None)
    }
}

// ==== Public Duration API ====

impl Duration {
    /// Creates a new validated `Duration`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        years: i64,
        months: i64,
        weeks: i64,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        milliseconds: i64,
        microseconds: i128,
        nanoseconds: i128,
    ) -> TemporalResult<Self> {
        is_valid_duration(
            years,
            months,
            weeks,
            days,
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        )?;
        Ok(Self::new_unchecked(
            DateDuration::new_unchecked(years, months, weeks, days),
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        ))
    }

    /// Creates a `Duration` from a day count and a `TimeDuration`, balancing
    /// the time up to hours.
    pub fn from_day_and_time(days: i64, time: &TimeDuration) -> TemporalResult<Self> {
        let balanced = time.balance(Unit::Hour)?;
        Self::new(
            0,
            0,
            0,
            days,
            balanced.hours,
            balanced.minutes,
            balanced.seconds,
            balanced.milliseconds,
            balanced.microseconds,
            balanced.nanoseconds,
        )
    }

    /// Creates a `Duration` from a provided `PartialDuration`.
    ///
    /// Missing fields default to zero, but at least one field must be set.
    pub fn from_partial_duration(partial: PartialDuration) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }

        Self::new(
            partial.years.unwrap_or_default(),
            partial.months.unwrap_or_default(),
            partial.weeks.unwrap_or_default(),
            partial.days.unwrap_or_default(),
            partial.hours.unwrap_or_default(),
            partial.minutes.unwrap_or_default(),
            partial.seconds.unwrap_or_default(),
            partial.milliseconds.unwrap_or_default(),
            partial.microseconds.unwrap_or_default(),
            partial.nanoseconds.unwrap_or_default(),
        )
    }

    /// Converts a UTF-16 encoded string into a `Duration`.
    pub fn from_utf16(source: &[u16]) -> TemporalResult<Self> {
        Self::from_utf8(utf16_to_utf8(source)?.as_bytes())
    }

    /// Parses a `Duration` from an ISO 8601 duration string.
    pub fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let parse_record = IsoDurationParser::<Utf8>::from_utf8(source).parse()?;

        let (hours, minutes, seconds, fraction_ns) = match parse_record.time {
            Some(TimeDurationRecord::Hours { hours, fraction }) => {
                (hours, 0, 0, fraction_nanoseconds(fraction)? * 3_600)
            }
            Some(TimeDurationRecord::Minutes {
                hours,
                minutes,
                fraction,
            }) => (hours, minutes, 0, fraction_nanoseconds(fraction)? * 60),
            Some(TimeDurationRecord::Seconds {
                hours,
                minutes,
                seconds,
                fraction,
            }) => (hours, minutes, seconds, fraction_nanoseconds(fraction)?),
            None => (0, 0, 0, 0),
        };

        // The fraction of the smallest unit is spread over the smaller units.
        let fraction_minutes = fraction_ns / 60_000_000_000;
        let fraction_seconds = (fraction_ns % 60_000_000_000) / 1_000_000_000;
        let subseconds = fraction_ns % 1_000_000_000;

        let date = parse_record.date.unwrap_or_default();
        let sign = i64::from(parse_record.sign as i8);

        let to_signed = |value: u64| {
            i64::try_from(value)
                .map(|v| v * sign)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DurationOutOfRange))
        };

        Self::new(
            i64::from(date.years) * sign,
            i64::from(date.months) * sign,
            i64::from(date.weeks) * sign,
            to_signed(date.days)?,
            to_signed(hours)?,
            to_signed(minutes.saturating_add(fraction_minutes))?,
            to_signed(seconds.saturating_add(fraction_seconds))?,
            to_signed(subseconds / 1_000_000)?,
            i128::from((subseconds / 1_000) % 1_000) * i128::from(sign),
            i128::from(subseconds % 1_000) * i128::from(sign),
        )
    }

    /// Returns whether the time fields can be combined into a single time
    /// duration without leaving the valid range.
    #[inline]
    #[must_use]
    pub fn is_time_within_range(&self) -> bool {
        self.time_duration().is_ok()
    }

    /// Compares two durations.
    ///
    /// Durations with calendar units are measured from `relative_to`. With a
    /// `ZonedDateTime` anchor, days are measured in real elapsed time.
    #[inline]
    pub fn compare_with_provider(
        &self,
        other: &Duration,
        relative_to: Option<RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Ordering> {
        if self == other {
            return Ok(Ordering::Equal);
        }
        let largest_unit_1 = self.default_largest_unit();
        let largest_unit_2 = other.default_largest_unit();
        let duration_1 = self.to_internal_duration_record()?;
        let duration_2 = other.to_internal_duration_record()?;
        if let Some(RelativeTo::ZonedDateTime(zdt)) = relative_to.as_ref() {
            if largest_unit_1.is_date_unit() || largest_unit_2.is_date_unit() {
                let after1 = zdt.add_as_instant(self, Overflow::Constrain, provider)?;
                let after2 = zdt.add_as_instant(other, Overflow::Constrain, provider)?;
                return Ok(after1.cmp(&after2));
            }
        }
        let (days1, days2) =
            if largest_unit_1.is_calendar_unit() || largest_unit_2.is_calendar_unit() {
                let Some(RelativeTo::PlainDate(plain_date)) = relative_to.as_ref() else {
                    return Err(TemporalError::range().with_enum(ErrorMessage::RelativeToRequired));
                };
                (
                    duration_1.date().days(plain_date)?,
                    duration_2.date().days(plain_date)?,
                )
            } else {
                (self.days(), other.days())
            };
        let time_duration_1 = duration_1.normalized_time_duration().add_days(days1)?;
        let time_duration_2 = duration_2.normalized_time_duration().add_days(days2)?;
        Ok(time_duration_1.cmp(&time_duration_2))
    }
}

// ==== Public `Duration` Getters/Setters ====

impl Duration {
    /// Returns a reference to the inner `DateDuration`
    #[inline]
    #[must_use]
    pub fn date(&self) -> &DateDuration {
        &self.date
    }

    /// Returns the `years` field of duration.
    #[inline]
    #[must_use]
    pub const fn years(&self) -> i64 {
        self.date.years
    }

    /// Returns the `months` field of duration.
    #[inline]
    #[must_use]
    pub const fn months(&self) -> i64 {
        self.date.months
    }

    /// Returns the `weeks` field of duration.
    #[inline]
    #[must_use]
    pub const fn weeks(&self) -> i64 {
        self.date.weeks
    }

    /// Returns the `days` field of duration.
    #[inline]
    #[must_use]
    pub const fn days(&self) -> i64 {
        self.date.days
    }

    /// Returns the `hours` field of duration.
    #[inline]
    #[must_use]
    pub const fn hours(&self) -> i64 {
        self.hours
    }

    /// Returns the `minutes` field of duration.
    #[inline]
    #[must_use]
    pub const fn minutes(&self) -> i64 {
        self.minutes
    }

    /// Returns the `seconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Returns the `milliseconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn milliseconds(&self) -> i64 {
        self.milliseconds
    }

    /// Returns the `microseconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn microseconds(&self) -> i128 {
        self.microseconds
    }

    /// Returns the `nanoseconds` field of duration.
    #[inline]
    #[must_use]
    pub const fn nanoseconds(&self) -> i128 {
        self.nanoseconds
    }
}

// ==== Public Duration methods ====

impl Duration {
    /// Determines the sign for the current self.
    #[inline]
    #[must_use]
    pub fn sign(&self) -> Sign {
        let date_sign = self.date.sign();
        if date_sign != Sign::Zero {
            return date_sign;
        }
        [
            i128::from(self.hours),
            i128::from(self.minutes),
            i128::from(self.seconds),
            i128::from(self.milliseconds),
            self.microseconds,
            self.nanoseconds,
        ]
        .into_iter()
        .find(|value| *value != 0)
        .map_or(Sign::Zero, |value| Sign::from(value.signum() as i8))
    }

    /// Returns whether the current `Duration` is zero.
    ///
    /// Equivalant to `Temporal.Duration.blank()`.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sign() == Sign::Zero
    }

    /// Returns a negated `Duration`
    #[inline]
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            date: self.date.negated(),
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
            milliseconds: -self.milliseconds,
            microseconds: -self.microseconds,
            nanoseconds: -self.nanoseconds,
        }
    }

    /// Returns the absolute value of `Duration`.
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            date: self.date.abs(),
            hours: self.hours.abs(),
            minutes: self.minutes.abs(),
            seconds: self.seconds.abs(),
            milliseconds: self.milliseconds.abs(),
            microseconds: self.microseconds.abs(),
            nanoseconds: self.nanoseconds.abs(),
        }
    }

    /// Returns the result of adding a `Duration` to the current `Duration`
    #[inline]
    pub fn add(&self, other: &Self) -> TemporalResult<Self> {
        // NOTE: Implemented from AddDurations
        let largest_unit = self
            .default_largest_unit()
            .max(other.default_largest_unit());
        if largest_unit.is_calendar_unit() {
            return Err(TemporalError::range().with_enum(ErrorMessage::RelativeToRequired));
        }
        let one = self.to_internal_duration_record_with_24_hour_days()?;
        let two = other.to_internal_duration_record_with_24_hour_days()?;
        let time = (one.normalized_time_duration() + two.normalized_time_duration())?;
        let result = InternalDurationRecord::new(DateDuration::default(), time)?;
        Self::from_internal(result, largest_unit)
    }

    /// Returns the result of subtracting a `Duration` from the current `Duration`
    #[inline]
    pub fn subtract(&self, other: &Self) -> TemporalResult<Self> {
        self.add(&other.negated())
    }

    /// Rounds the current `Duration` according to `options`.
    ///
    /// Without `relative_to`, calendar units are rejected and days are treated
    /// as 24 hours.
    #[inline]
    pub fn round_with_provider(
        &self,
        options: RoundingOptions,
        relative_to: Option<RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let existing_largest_unit = self.default_largest_unit();
        let resolved_options =
            ResolvedRoundingOptions::from_duration_options(options, existing_largest_unit)?;

        let is_zoned_datetime = matches!(relative_to, Some(RelativeTo::ZonedDateTime(_)));

        let hours_to_days_may_occur =
            (self.days() != 0 && is_zoned_datetime) || self.hours().abs() >= 24;

        let calendar_units_present =
            self.years() != 0 || self.months() != 0 || self.weeks() != 0;

        // Nothing to balance or round.
        if resolved_options.is_noop()
            && resolved_options.largest_unit == existing_largest_unit
            && !calendar_units_present
            && !hours_to_days_may_occur
            && self.minutes().abs() < 60
            && self.seconds().abs() < 60
            && self.milliseconds().abs() < 1000
            && self.microseconds().abs() < 1000
            && self.nanoseconds().abs() < 1000
        {
            return Ok(*self);
        }

        match relative_to {
            Some(RelativeTo::ZonedDateTime(zoned_datetime)) => {
                let target_epoch_ns =
                    zoned_datetime.add_as_instant(self, Overflow::Constrain, provider)?;
                let internal = zoned_datetime.diff_with_rounding(
                    &ZonedDateTime::new_unchecked(
                        target_epoch_ns,
                        *zoned_datetime.calendar(),
                        zoned_datetime.timezone().clone(),
                    ),
                    resolved_options,
                    provider,
                )?;
                let largest_unit = if resolved_options.largest_unit.is_date_unit() {
                    Unit::Hour
                } else {
                    resolved_options.largest_unit
                };
                Duration::from_internal(internal, largest_unit)
            }
            Some(RelativeTo::PlainDate(plain_date)) => {
                let internal = self.to_internal_duration_record_with_24_hour_days()?;
                let (target_days, target_time) =
                    IsoTime::default().add(internal.normalized_time_duration());
                let date_duration = internal.date().adjust(target_days, None, None)?;
                let target_date = plain_date.calendar().date_add(
                    &plain_date.iso,
                    &date_duration,
                    Overflow::Constrain,
                )?;
                let plain_dt = PlainDateTime::new_unchecked(
                    IsoDateTime::new_unchecked(plain_date.iso, IsoTime::default()),
                    *plain_date.calendar(),
                );
                let target_dt = PlainDateTime::new_unchecked(
                    IsoDateTime::new_unchecked(target_date.iso, target_time),
                    *plain_date.calendar(),
                );
                let internal = plain_dt.diff_dt_with_rounding(&target_dt, resolved_options)?;
                Duration::from_internal(internal, resolved_options.largest_unit)
            }
            None => {
                if calendar_units_present || resolved_options.largest_unit.is_calendar_unit() {
                    return Err(TemporalError::range().with_enum(ErrorMessage::RelativeToRequired));
                }
                temporal_assert!(
                    !resolved_options.smallest_unit.is_calendar_unit(),
                    "Assertion failed: resolvedOptions contains a calendar unit\n{:?}",
                    resolved_options
                );
                let internal = self.to_internal_duration_record_with_24_hour_days()?;
                let time = internal
                    .normalized_time_duration()
                    .round(resolved_options)?;
                let internal = InternalDurationRecord::new(DateDuration::default(), time)?;
                Duration::from_internal(internal, resolved_options.largest_unit)
            }
        }
    }

    /// Returns the total of the `Duration` in `unit`, as a fractional number.
    pub fn total_with_provider(
        &self,
        unit: Unit,
        relative_to: Option<RelativeTo>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<f64> {
        let unit = UnitGroup::DateTime.validate_required_unit(Some(unit), None)?;
        match relative_to {
            Some(RelativeTo::ZonedDateTime(zoned_datetime)) => {
                let target_epoch_ns =
                    zoned_datetime.add_as_instant(self, Overflow::Constrain, provider)?;
                zoned_datetime.diff_with_total(
                    &ZonedDateTime::new_unchecked(
                        target_epoch_ns,
                        *zoned_datetime.calendar(),
                        zoned_datetime.timezone().clone(),
                    ),
                    unit,
                    provider,
                )
            }
            Some(RelativeTo::PlainDate(plain_date)) => {
                let internal = self.to_internal_duration_record_with_24_hour_days()?;
                let (target_days, target_time) =
                    IsoTime::default().add(internal.normalized_time_duration());
                let date_duration = internal.date().adjust(target_days, None, None)?;
                let target_date = plain_date.calendar().date_add(
                    &plain_date.iso,
                    &date_duration,
                    Overflow::Constrain,
                )?;
                let plain_dt = PlainDateTime::new_unchecked(
                    IsoDateTime::new_unchecked(plain_date.iso, IsoTime::default()),
                    *plain_date.calendar(),
                );
                let target_dt = PlainDateTime::new_unchecked(
                    IsoDateTime::new_unchecked(target_date.iso, target_time),
                    *plain_date.calendar(),
                );
                plain_dt.diff_dt_with_total(&target_dt, unit)
            }
            None => {
                let largest_unit = self.default_largest_unit();
                if largest_unit.is_calendar_unit() || unit.is_calendar_unit() {
                    return Err(TemporalError::range().with_enum(ErrorMessage::RelativeToRequired));
                }
                let internal = self.to_internal_duration_record_with_24_hour_days()?;
                internal.normalized_time_duration().total(unit)
            }
        }
    }

    /// Returns the `Duration` as a formatted string
    pub fn as_temporal_string(&self, options: ToStringRoundingOptions) -> TemporalResult<String> {
        if matches!(options.smallest_unit, Some(Unit::Hour | Unit::Minute))
            || options.precision == Precision::Minute
        {
            return Err(TemporalError::range()
                .with_message("smallestUnit must be second or a smaller unit."));
        }

        let resolved_options = options.resolve()?;

        if resolved_options.smallest_unit == Unit::Nanosecond
            && resolved_options.increment == RoundingIncrement::ONE
        {
            return Ok(duration_to_formattable(self, resolved_options.precision).to_string());
        }

        let rounding_options = ResolvedRoundingOptions::from_to_string_options(&resolved_options);

        let largest = self.default_largest_unit();
        let internal = self.to_internal_duration_record()?;
        let time = internal.normalized_time_duration().round(rounding_options)?;
        let internal = InternalDurationRecord::new(internal.date(), time)?;
        let rounded_largest = largest.max(Unit::Second);
        let rounded = Self::from_internal(internal, rounded_largest)?;

        Ok(duration_to_formattable(&rounded, resolved_options.precision).to_string())
    }
}

pub(crate) fn duration_to_formattable(
    duration: &Duration,
    precision: Precision,
) -> FormattableDuration {
    let sign = duration.sign();
    let duration = duration.abs();

    let date = if duration.is_time_duration() {
        None
    } else {
        Some(FormattableDateDuration {
            years: duration.years() as u32,
            months: duration.months() as u32,
            weeks: duration.weeks() as u32,
            days: duration.days() as u64,
        })
    };

    // Seconds and the sub-second units are combined into one value, which
    // stays representable because the duration is valid.
    let seconds_ns = i128::from(duration.seconds()) * 1_000_000_000
        + i128::from(duration.milliseconds()) * 1_000_000
        + duration.microseconds() * 1_000
        + duration.nanoseconds();

    FormattableDuration {
        precision,
        sign,
        date,
        time: FormattableTimeDuration {
            hours: duration.hours() as u64,
            minutes: duration.minutes() as u64,
            seconds: (seconds_ns / 1_000_000_000) as u64,
            subseconds: (seconds_ns % 1_000_000_000) as u32,
        },
    }
}

/// Returns the nanoseconds of a parsed fraction, which is at most 9 digits.
fn fraction_nanoseconds(fraction: Option<ixdtf::records::Fraction>) -> TemporalResult<u64> {
    let Some(fraction) = fraction else {
        return Ok(0);
    };
    fraction
        .to_nanoseconds()
        .map(u64::from)
        .ok_or(TemporalError::range().with_enum(ErrorMessage::FractionalTimeMoreThanNineDigits))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn is_valid_duration(
    years: i64,
    months: i64,
    weeks: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    milliseconds: i64,
    microseconds: i128,
    nanoseconds: i128,
) -> TemporalResult<()> {
    let fields = [
        i128::from(years),
        i128::from(months),
        i128::from(weeks),
        i128::from(days),
        i128::from(hours),
        i128::from(minutes),
        i128::from(seconds),
        i128::from(milliseconds),
        microseconds,
        nanoseconds,
    ];
    let sign = fields
        .iter()
        .find(|v| **v != 0)
        .map_or(0, |v| v.signum());
    if fields.iter().any(|v| v.signum() == -sign && *v != 0) {
        return Err(TemporalError::range().with_enum(ErrorMessage::DurationMixedSign));
    }

    if [years, months, weeks]
        .into_iter()
        .any(|v| v.unsigned_abs() >= u64::from(u32::MAX) + 1)
    {
        return Err(TemporalError::range().with_enum(ErrorMessage::DurationOutOfRange));
    }

    // Days and time together must stay below 2^53 seconds, checked in exact nanoseconds.
    let total = i128::from(days)
        .checked_mul(i128::from(NS_PER_DAY))
        .and_then(|ns| {
            let time = TimeDuration::from_components(
                hours,
                minutes,
                seconds,
                milliseconds,
                microseconds,
                nanoseconds,
            )
            .ok()?;
            ns.checked_add(time.as_nanoseconds())
        })
        .ok_or(TemporalError::overflow().with_enum(ErrorMessage::DurationOutOfRange))?;
    if total.abs() > MAX_TIME_DURATION {
        return Err(TemporalError::overflow().with_enum(ErrorMessage::DurationOutOfRange));
    }

    Ok(())
}

impl From<DateDuration> for Duration {
    fn from(value: DateDuration) -> Self {
        Self {
            date: value,
            ..Default::default()
        }
    }
}

// ==== FromStr trait impl ====

impl FromStr for Duration {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}
