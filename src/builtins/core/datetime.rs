//! The `PlainDateTime` builtin: a wall-clock date and time tied to a calendar
//! but to no time zone.

use crate::{
    builtins::core::{
        calendar::{Calendar, MonthCode},
        duration::normalized::{InternalDurationRecord, RelativeOrigin},
        Duration, PartialDate, PartialTime, PlainDate, PlainTime, ZonedDateTime,
    },
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, Disambiguation, DisplayCalendar, Overflow,
        ResolvedRoundingOptions, RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsed_intermediates::ParsedDateTime,
    parsers::{utf16_to_utf8, IxdtfStringBuilder},
    provider::TimeZoneProvider,
    TemporalError, TemporalResult, TimeZone,
};
use alloc::string::String;
use core::{cmp::Ordering, fmt, str::FromStr};
use tinystr::TinyAsciiStr;

/// Date and time fields that may each be absent, used by `from_partial` and `with`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct PartialDateTime {
    pub date: PartialDate,
    pub time: PartialTime,
}

impl PartialDateTime {
    /// Returns `true` when neither half carries a field.
    pub fn is_empty(&self) -> bool {
        self.date.is_empty() && self.time.is_empty()
    }
}

/// A calendar date and wall-clock time without a time zone.
///
/// ```rust
/// use temporal_engine::{options::DifferenceSettings, PlainDateTime};
/// use core::str::FromStr;
///
/// let start = PlainDateTime::from_str("2024-01-15T12:00:00").unwrap();
/// let end = PlainDateTime::from_str("2024-01-16T18:30:00").unwrap();
///
/// let duration = start.until(&end, DifferenceSettings::default()).unwrap();
/// assert_eq!(duration.to_string(), "P1DT6H30M");
/// ```
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainDateTime {
    pub(crate) iso: IsoDateTime,
    calendar: Calendar,
}

/// Generates getters that read a wall-clock field straight from the ISO time.
macro_rules! wall_clock_fields {
    ($($name:ident: $ty:ty),+ $(,)?) => {
        impl PlainDateTime {
            $(
                #[inline]
                #[must_use]
                pub fn $name(&self) -> $ty {
                    self.iso.time.$name
                }
            )+
        }
    };
}

wall_clock_fields!(
    hour: u8,
    minute: u8,
    second: u8,
    millisecond: u16,
    microsecond: u16,
    nanosecond: u16,
);

/// Generates getters that ask the calendar to interpret the ISO date.
macro_rules! calendar_fields {
    ($($name:ident: $ty:ty),+ $(,)?) => {
        impl PlainDateTime {
            $(
                pub fn $name(&self) -> $ty {
                    self.calendar.$name(&self.iso.date)
                }
            )+
        }
    };
}

calendar_fields!(
    year: i32,
    month: u8,
    month_code: MonthCode,
    day: u8,
    day_of_week: u16,
    day_of_year: u16,
    week_of_year: Option<u8>,
    year_of_week: Option<i32>,
    days_in_week: u16,
    days_in_month: u16,
    days_in_year: u16,
    months_in_year: u16,
    in_leap_year: bool,
    era: Option<TinyAsciiStr<16>>,
    era_year: Option<i32>,
);

// ==== Construction ====

impl PlainDateTime {
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(iso: IsoDateTime, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Validates `iso` against the representable range before wrapping it.
    fn from_iso(date: IsoDate, time: IsoTime, calendar: Calendar) -> TemporalResult<Self> {
        Ok(Self::new_unchecked(IsoDateTime::new(date, time)?, calendar))
    }

    /// Creates a `PlainDateTime`, clamping out of range fields.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        let time = [hour, minute, second];
        let subsecond = [millisecond, microsecond, nanosecond];
        Self::from_fields(year, month, day, time, subsecond, calendar, Overflow::Constrain)
    }

    /// Creates a `PlainDateTime`, failing on any out of range field.
    ///
    /// ```rust
    /// use temporal_engine::{Calendar, PlainDateTime};
    ///
    /// let leap_day = PlainDateTime::try_new(2024, 2, 29, 23, 59, 59, 0, 0, 0, Calendar::default());
    /// assert!(leap_day.is_ok());
    ///
    /// let not_a_leap_year = PlainDateTime::try_new(2023, 2, 29, 23, 59, 59, 0, 0, 0, Calendar::default());
    /// assert!(not_a_leap_year.is_err());
    /// ```
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn try_new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        let time = [hour, minute, second];
        let subsecond = [millisecond, microsecond, nanosecond];
        Self::from_fields(year, month, day, time, subsecond, calendar, Overflow::Reject)
    }

    /// Creates a `PlainDateTime` from ISO fields, handling out of range fields per `overflow`.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        calendar: Calendar,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let time = [hour, minute, second];
        let subsecond = [millisecond, microsecond, nanosecond];
        Self::from_fields(year, month, day, time, subsecond, calendar, overflow)
    }

    fn from_fields(
        year: i32,
        month: u8,
        day: u8,
        [hour, minute, second]: [u8; 3],
        [millisecond, microsecond, nanosecond]: [u16; 3],
        calendar: Calendar,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let date = IsoDate::new_with_overflow(year, month, day, overflow)?;
        let time = IsoTime::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            overflow,
        )?;
        Self::from_iso(date, time, calendar)
    }

    /// Joins a date and a wall-clock time. The date's calendar is kept.
    #[inline]
    pub fn from_date_and_time(date: PlainDate, time: PlainTime) -> TemporalResult<Self> {
        Self::from_iso(date.iso, time.iso, *date.calendar())
    }

    /// Builds a `PlainDateTime` from partial fields. Date fields are required;
    /// absent time fields are zero.
    ///
    /// ```rust
    /// use temporal_engine::{partial::{PartialDate, PartialDateTime, PartialTime}, PlainDateTime};
    ///
    /// let partial = PartialDateTime {
    ///     date: PartialDate {
    ///         year: Some(2000),
    ///         month: Some(13),
    ///         day: Some(2),
    ///         ..Default::default()
    ///     },
    ///     time: PartialTime {
    ///         hour: Some(4),
    ///         minute: Some(25),
    ///         ..Default::default()
    ///     },
    /// };
    ///
    /// let datetime = PlainDateTime::from_partial(partial, None).unwrap();
    ///
    /// assert_eq!(datetime.month(), 12);
    /// assert_eq!(datetime.hour(), 4);
    /// assert_eq!(datetime.second(), 0);
    /// ```
    pub fn from_partial(
        partial: PartialDateTime,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }
        let date = PlainDate::from_partial(partial.date, overflow)?;
        let time = IsoTime::default().with(partial.time, overflow.unwrap_or_default())?;
        Self::from_iso(date.iso, time, partial.date.calendar)
    }

    /// Parses an IXDTF date-time from UTF-8 bytes. A bare date means midnight.
    pub fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let ParsedDateTime { date, time } = ParsedDateTime::from_utf8(source)?;
        let iso_date = IsoDate::new_with_overflow(
            date.record.year,
            date.record.month,
            date.record.day,
            Overflow::Reject,
        )?;
        Self::from_iso(iso_date, time, date.calendar)
    }

    /// Parses an IXDTF date-time from UTF-16 code units.
    pub fn from_utf16(source: &[u16]) -> TemporalResult<Self> {
        Self::from_utf8(utf16_to_utf8(source)?.as_bytes())
    }
}

// ==== Field updates ====

impl PlainDateTime {
    /// Overwrites the fields present in `partial`, keeping the rest.
    ///
    /// ```rust
    /// use temporal_engine::{partial::{PartialDate, PartialDateTime, PartialTime}, Calendar, PlainDateTime};
    ///
    /// let initial = PlainDateTime::try_new(2000, 12, 2, 0, 0, 0, 0, 0, 0, Calendar::default()).unwrap();
    ///
    /// let partial = PartialDateTime {
    ///     date: PartialDate {
    ///         month: Some(5),
    ///         ..Default::default()
    ///     },
    ///     time: PartialTime {
    ///         hour: Some(4),
    ///         second: Some(30),
    ///         ..Default::default()
    ///     },
    /// };
    ///
    /// let datetime = initial.with(partial, None).unwrap();
    ///
    /// assert_eq!(datetime.year(), 2000);
    /// assert_eq!(datetime.month(), 5);
    /// assert_eq!(datetime.day(), 2);
    /// assert_eq!(datetime.hour(), 4);
    /// assert_eq!(datetime.minute(), 0);
    /// assert_eq!(datetime.second(), 30);
    /// ```
    pub fn with(&self, partial: PartialDateTime, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }

        let mut date = self.to_plain_date();
        if !partial.date.is_empty() {
            date = date.with(partial.date, overflow)?;
        }
        let time = self.iso.time.with(partial.time, overflow.unwrap_or_default())?;
        Self::from_iso(date.iso, time, self.calendar)
    }

    /// Swaps the wall-clock time, using midnight when `time` is `None`.
    #[inline]
    pub fn with_plain_time(&self, time: Option<PlainTime>) -> TemporalResult<Self> {
        Self::from_iso(self.iso.date, time.unwrap_or_default().iso, self.calendar)
    }

    /// Reinterprets the same ISO date-time in another calendar.
    #[inline]
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.iso, calendar)
    }

    #[inline]
    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }
}

// ==== Arithmetic ====

impl PlainDateTime {
    /// Orders two date-times by their ISO fields. Calendars do not take part.
    #[inline]
    #[must_use]
    pub fn compare_iso(&self, other: &Self) -> Ordering {
        self.iso.cmp(&other.iso)
    }

    #[inline]
    pub fn add(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        self.shifted(duration, overflow)
    }

    #[inline]
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.shifted(&duration.negated(), overflow)
    }

    /// The [`Duration`] that takes `self` to `other`.
    #[inline]
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.difference(DifferenceOperation::Until, other, settings)
    }

    /// The [`Duration`] that takes `other` to `self`.
    #[inline]
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.difference(DifferenceOperation::Since, other, settings)
    }

    /// Rounds the wall-clock time. Rounding to `Unit::Day` may move the date.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_datetime_options(options)?;
        if resolved.is_noop() {
            return Ok(*self);
        }
        Ok(Self::new_unchecked(self.iso.round(resolved)?, self.calendar))
    }

    /// Applies the time portion to the wall clock, then adds the date portion
    /// together with any days the clock wrapped through.
    fn shifted(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        let internal = duration.to_internal_duration_record_with_24_hour_days()?;
        let (carried_days, time) = self.iso.time.add(internal.normalized_time_duration());
        let date_part = internal.date().adjust(carried_days, None, None)?;
        let date = self
            .calendar
            .date_add(&self.iso.date, &date_part, overflow.unwrap_or_default())?;
        Self::from_iso(date.iso, time, self.calendar)
    }

    fn difference(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        if self.calendar != other.calendar {
            return Err(TemporalError::calendar_mismatch());
        }
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::DateTime,
            Unit::Day,
            Unit::Nanosecond,
        )?;
        if self.iso == other.iso {
            return Ok(Duration::default());
        }

        let record = self.diff_dt_with_rounding(other, resolved)?;
        let duration = Duration::from_internal(record, resolved.largest_unit)?;
        Ok(match op {
            DifferenceOperation::Until => duration,
            DifferenceOperation::Since => duration.negated(),
        })
    }

    /// Differences two date-times in this calendar and rounds the result
    /// relative to `self`.
    pub(crate) fn diff_dt_with_rounding(
        &self,
        other: &Self,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<InternalDurationRecord> {
        if self.iso == other.iso {
            return Ok(InternalDurationRecord::default());
        }
        self.check_pair(other)?;

        let record = self
            .iso
            .diff(&other.iso, &self.calendar, options.largest_unit)?;
        if options.is_noop() {
            return Ok(record);
        }
        record.round_relative_duration(
            other.iso.as_nanoseconds().0,
            &self.relative_origin(),
            None,
            options,
        )
    }

    /// The difference to `other` expressed as a fractional count of `unit`.
    pub(crate) fn diff_dt_with_total(&self, other: &Self, unit: Unit) -> TemporalResult<f64> {
        if self.iso == other.iso {
            return Ok(0.0);
        }
        self.check_pair(other)?;

        let record = self.iso.diff(&other.iso, &self.calendar, unit)?;
        if unit == Unit::Nanosecond {
            return Ok(record.normalized_time_duration().0 as f64);
        }
        record.total_relative_duration(
            other.iso.as_nanoseconds().0,
            &self.relative_origin(),
            None,
            unit,
        )
    }

    fn check_pair(&self, other: &Self) -> TemporalResult<()> {
        self.iso.check_within_limits()?;
        other.iso.check_within_limits()
    }

    fn relative_origin(&self) -> RelativeOrigin<'_> {
        RelativeOrigin {
            iso: self.iso,
            calendar: &self.calendar,
        }
    }
}

// ==== Conversion and formatting ====

impl PlainDateTime {
    /// Resolves this wall-clock reading in `time_zone`, picking among repeated
    /// or skipped local times per `disambiguation`.
    pub fn to_zoned_date_time_with_provider(
        &self,
        time_zone: TimeZone,
        disambiguation: Disambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<ZonedDateTime> {
        let epoch_ns = time_zone.get_epoch_nanoseconds_for(self.iso, disambiguation, provider)?;
        Ok(ZonedDateTime::new_unchecked(epoch_ns, self.calendar, time_zone))
    }

    #[inline]
    #[must_use]
    pub fn to_plain_date(&self) -> PlainDate {
        PlainDate::new_unchecked(self.iso.date, self.calendar)
    }

    #[inline]
    #[must_use]
    pub fn to_plain_time(&self) -> PlainTime {
        PlainTime::new_unchecked(self.iso.time)
    }

    /// Formats as IXDTF after rounding the time to the requested precision.
    pub fn to_ixdtf_string(
        &self,
        options: ToStringRoundingOptions,
        display_calendar: DisplayCalendar,
    ) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let rounded = self
            .iso
            .round(ResolvedRoundingOptions::from_to_string_options(&resolved))?;
        Ok(IxdtfStringBuilder::default()
            .with_date(rounded.date)
            .with_time(rounded.time, resolved.precision)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build())
    }
}

impl fmt::Display for PlainDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = self
            .to_ixdtf_string(ToStringRoundingOptions::default(), DisplayCalendar::Auto)
            .map_err(|_| fmt::Error)?;
        f.write_str(&string)
    }
}

impl From<PlainDate> for PlainDateTime {
    fn from(value: PlainDate) -> Self {
        let iso = IsoDateTime::new_unchecked(value.iso, IsoTime::default());
        Self::new_unchecked(iso, *value.calendar())
    }
}

impl FromStr for PlainDateTime {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}
