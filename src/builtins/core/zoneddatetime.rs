//! This module contains the core implementation of the `ZonedDateTime`
//! builtin type.

use alloc::string::{String, ToString};
use core::{cmp::Ordering, num::NonZeroU128};
use tinystr::TinyAsciiStr;

use crate::{
    builtins::core::{
        calendar::{Calendar, MonthCode},
        duration::normalized::{InternalDurationRecord, RelativeOrigin, TimeDuration},
        timezone::{TimeZone, UtcOffset},
        Duration, Instant, PartialDate, PartialTime, PlainDate, PlainDateTime, PlainTime,
    },
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, Disambiguation, DisplayCalendar, DisplayOffset,
        DisplayTimeZone, OffsetDisambiguation, Overflow, ResolvedRoundingOptions, RoundingMode,
        RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsed_intermediates::ParsedZonedDateTime,
    parsers::{utf16_to_utf8, FormattableOffset, IxdtfStringBuilder},
    provider::{TimeZoneProvider, TransitionDirection},
    rounding::IncrementRounder,
    temporal_assert,
    time::EpochNanoseconds,
    Sign, TemporalError, TemporalResult, TemporalUnwrap,
};


const NS_PER_MINUTE: NonZeroU128 = match NonZeroU128::new(60_000_000_000) {
    Some(ns) => ns,
    None => NonZeroU128::MIN,
};

/// The fields used to create or patch a `ZonedDateTime`.
///
/// `offset` is checked against the time zone according to the
/// `OffsetDisambiguation` passed alongside it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PartialZonedDateTime {
    /// The date fields, along with the calendar they are resolved in.
    pub date: PartialDate,
    /// The wall-clock time fields.
    pub time: PartialTime,
    /// An optional UTC offset.
    pub offset: Option<UtcOffset>,
    /// The time zone. Required by `from_partial`, rejected by `with`.
    pub timezone: Option<TimeZone>,
}

impl PartialZonedDateTime {
    /// Returns whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
            && self.time.is_empty()
            && self.offset.is_none()
            && self.timezone.is_none()
    }
}

/// How the offset of a wall-clock date-time is chosen when resolving it to an
/// exact time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OffsetBehaviour {
    /// An explicit offset, in nanoseconds, weighed by `OffsetDisambiguation`.
    Option(i64),
    /// The wall-clock time is UTC, as written with the `Z` designator.
    Exact,
    /// Only the time zone decides.
    Wall,
}

/// The native Rust implementation of a Temporal `ZonedDateTime`.
///
/// A `ZonedDateTime` is an exact time paired with a time zone and a calendar.
/// Wall-clock fields are not stored; each accessor resolves the zone offset at
/// the instant through a `TimeZoneProvider`, so the methods of this type carry
/// a `_with_provider` suffix. With the `compiled_data` feature, unsuffixed
/// versions use the compiled tz database.
///
/// The derived `PartialEq` compares time zones by identifier. Use
/// `equals_with_provider` to treat links such as `Asia/Calcutta` and
/// `Asia/Kolkata` as the same zone.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZonedDateTime {
    instant: Instant,
    calendar: Calendar,
    timezone: TimeZone,
}

// ==== Private API ====

impl ZonedDateTime {
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(
        epoch_nanoseconds: EpochNanoseconds,
        calendar: Calendar,
        timezone: TimeZone,
    ) -> Self {
        Self {
            instant: Instant::from(epoch_nanoseconds),
            calendar,
            timezone,
        }
    }

    fn iso_with_provider(
        &self,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<IsoDateTime> {
        self.timezone
            .get_iso_datetime_for(self.instant.epoch_nanoseconds(), provider)
    }

    fn relative_origin(&self, iso: IsoDateTime) -> RelativeOrigin<'_> {
        RelativeOrigin {
            iso,
            calendar: &self.calendar,
        }
    }

    /// Date units move the wall clock, then the time part is added as exact time.
    fn add_zoned_date_time(
        &self,
        duration: InternalDurationRecord,
        overflow: Overflow,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Instant> {
        let time = duration.normalized_time_duration();
        if duration.date().sign() == Sign::Zero {
            return self.instant.add_to_instant(&time);
        }
        let iso = self.iso_with_provider(provider)?;
        let added = self
            .calendar
            .date_add(&iso.date, &duration.date(), overflow)?;
        let intermediate = IsoDateTime::new_unchecked(added.iso, iso.time);
        if !intermediate.is_within_limits() {
            return Err(
                TemporalError::range().with_enum(ErrorMessage::IntermediateDateTimeOutOfRange)
            );
        }
        let intermediate_ns = self.timezone.get_epoch_nanoseconds_for(
            intermediate,
            Disambiguation::Compatible,
            provider,
        )?;
        Instant::from(intermediate_ns).add_to_instant(&time)
    }

    /// Returns the epoch nanoseconds of this `ZonedDateTime` moved by `duration`.
    pub(crate) fn add_as_instant(
        &self,
        duration: &Duration,
        overflow: Overflow,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<EpochNanoseconds> {
        let internal = duration.to_internal_duration_record()?;
        let instant = self.add_zoned_date_time(internal, overflow, provider)?;
        Ok(*instant.epoch_nanoseconds())
    }

    fn add_internal(
        &self,
        duration: &Duration,
        overflow: Overflow,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let epoch_ns = self.add_as_instant(duration, overflow, provider)?;
        Ok(Self::new_unchecked(
            epoch_ns,
            self.calendar,
            self.timezone.clone(),
        ))
    }

    /// The date part is measured between wall-clock dates. The end date is
    /// pulled back a day at a time until the remaining exact time agrees in
    /// sign with the whole difference.
    fn diff_zoned_datetime(
        &self,
        other: &Self,
        largest_unit: Unit,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<InternalDurationRecord> {
        let ns1 = self.instant.epoch_nanoseconds().0;
        let ns2 = other.instant.epoch_nanoseconds().0;
        if ns1 == ns2 {
            return Ok(InternalDurationRecord::default());
        }
        let start = self.iso_with_provider(provider)?;
        let end = other.iso_with_provider(provider)?;

        let sign = if ns2 < ns1 {
            Sign::Negative
        } else {
            Sign::Positive
        };
        let max_correction = if sign == Sign::Positive { 2 } else { 1 };
        let mut day_correction = i64::from(start.time.diff(&end.time).sign() == sign.negate());

        let step = i64::from(sign.multiplier());
        let mut found = None;
        while day_correction <= max_correction {
            let date = IsoDate::try_balance(
                end.date.year,
                i32::from(end.date.month),
                i64::from(end.date.day) - day_correction * step,
            )?;
            let intermediate = IsoDateTime::new_unchecked(date, start.time);
            let intermediate_ns = self.timezone.get_epoch_nanoseconds_for(
                intermediate,
                Disambiguation::Compatible,
                provider,
            )?;
            let time = TimeDuration::from_nanosecond_difference(ns2, intermediate_ns.0)?;
            if time.sign() != sign.negate() {
                found = Some((intermediate, time));
                break;
            }
            day_correction += 1;
        }
        let (intermediate, time) = found.temporal_unwrap()?;

        let date_largest_unit = largest_unit.max(Unit::Day);
        let date_diff =
            self.calendar
                .date_until(&start.date, &intermediate.date, date_largest_unit)?;
        InternalDurationRecord::new(date_diff, time)
    }

    pub(crate) fn diff_with_rounding(
        &self,
        other: &Self,
        options: ResolvedRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<InternalDurationRecord> {
        if options.largest_unit.is_time_unit() {
            return self.instant.diff_instant_internal(&other.instant, options);
        }
        let diff = self.diff_zoned_datetime(other, options.largest_unit, provider)?;
        if options.is_noop() {
            return Ok(diff);
        }
        let iso = self.iso_with_provider(provider)?;
        diff.round_relative_duration(
            other.instant.epoch_nanoseconds().0,
            &self.relative_origin(iso),
            Some((&self.timezone, provider)),
            options,
        )
    }

    pub(crate) fn diff_with_total(
        &self,
        other: &Self,
        unit: Unit,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<f64> {
        if unit.is_time_unit() {
            let diff = TimeDuration::from_nanosecond_difference(
                other.instant.epoch_nanoseconds().0,
                self.instant.epoch_nanoseconds().0,
            )?;
            return diff.total(unit);
        }
        let diff = self.diff_zoned_datetime(other, unit, provider)?;
        let iso = self.iso_with_provider(provider)?;
        diff.total_relative_duration(
            other.instant.epoch_nanoseconds().0,
            &self.relative_origin(iso),
            Some((&self.timezone, provider)),
            unit,
        )
    }

    fn diff_internal_with_provider(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        if self.calendar != other.calendar {
            return Err(TemporalError::calendar_mismatch().with_enum(ErrorMessage::CalendarMismatch));
        }
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::DateTime,
            Unit::Hour,
            Unit::Nanosecond,
        )?;

        let result = if resolved.largest_unit.is_time_unit() {
            let internal = self
                .instant
                .diff_instant_internal(&other.instant, resolved)?;
            Duration::from_internal(internal, resolved.largest_unit)?
        } else {
            // Day lengths differ between zones, so date units need a single zone.
            if !self
                .timezone
                .time_zone_equals_with_provider(&other.timezone, provider)?
            {
                return Err(TemporalError::range().with_enum(ErrorMessage::TzMismatch));
            }
            if self.instant == other.instant {
                return Ok(Duration::default());
            }
            let internal = self.diff_with_rounding(other, resolved, provider)?;
            Duration::from_internal(internal, Unit::Hour)?
        };

        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }
}

// ==== Public API ====

impl ZonedDateTime {
    /// Creates a new `ZonedDateTime` from epoch nanoseconds.
    #[inline]
    pub fn try_new(nanos: i128, calendar: Calendar, timezone: TimeZone) -> TemporalResult<Self> {
        let instant = Instant::try_new(nanos)?;
        Ok(Self {
            instant,
            calendar,
            timezone,
        })
    }

    /// Creates a new `ZonedDateTime` on the ISO calendar.
    #[inline]
    pub fn try_new_iso(nanos: i128, timezone: TimeZone) -> TemporalResult<Self> {
        Self::try_new(nanos, Calendar::ISO, timezone)
    }

    /// Creates a new `ZonedDateTime` on the ISO calendar from epoch milliseconds.
    #[inline]
    pub fn from_epoch_milliseconds(milliseconds: i64, timezone: TimeZone) -> TemporalResult<Self> {
        let instant = Instant::from_epoch_milliseconds(milliseconds)?;
        Ok(Self {
            instant,
            calendar: Calendar::ISO,
            timezone,
        })
    }

    /// Creates a `ZonedDateTime` from a borrowed `PartialZonedDateTime`.
    ///
    /// See [`ZonedDateTime::from_owned_partial_with_provider`].
    pub fn from_partial_with_provider(
        partial: &PartialZonedDateTime,
        overflow: Option<Overflow>,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        Self::from_owned_partial_with_provider(
            partial.clone(),
            overflow,
            disambiguation,
            offset_option,
            provider,
        )
    }

    /// Creates a `ZonedDateTime` from a `PartialZonedDateTime`, taking
    /// ownership of its time zone.
    ///
    /// The time zone and the date fields are required. Missing time fields are
    /// zero. The default options are `Constrain`, `Compatible` and `Reject`.
    pub fn from_owned_partial_with_provider(
        partial: PartialZonedDateTime,
        overflow: Option<Overflow>,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let timezone = partial
            .timezone
            .ok_or(TemporalError::invalid_field().with_enum(ErrorMessage::TimeZoneRequired))?;
        let overflow = overflow.unwrap_or_default();
        let calendar = partial.date.calendar;
        let date = calendar.date_from_partial(&partial.date, overflow)?;
        let time = IsoTime::default().with(partial.time, overflow)?;

        let behaviour = partial
            .offset
            .map_or(OffsetBehaviour::Wall, |offset| {
                OffsetBehaviour::Option(offset.nanoseconds_i64())
            });
        let epoch_ns = interpret_isodatetime_offset(
            date.iso,
            Some(time),
            behaviour,
            &timezone,
            disambiguation.unwrap_or_default(),
            offset_option.unwrap_or(OffsetDisambiguation::Reject),
            false,
            provider,
        )?;
        Ok(Self::new_unchecked(epoch_ns, calendar, timezone))
    }

    /// Parses a `ZonedDateTime` from an IXDTF string with a time zone annotation.
    ///
    /// ```rust
    /// use temporal_engine::{
    ///     options::{Disambiguation, OffsetDisambiguation},
    ///     provider::CompiledTzdbProvider,
    ///     ZonedDateTime,
    /// };
    ///
    /// let provider = CompiledTzdbProvider::default();
    /// let zdt = ZonedDateTime::from_utf8_with_provider(
    ///     b"2024-03-10T03:30-04:00[America/New_York]",
    ///     Disambiguation::Compatible,
    ///     OffsetDisambiguation::Reject,
    ///     &provider,
    /// )
    /// .unwrap();
    /// assert_eq!(zdt.hour_with_provider(&provider).unwrap(), 3);
    /// assert_eq!(zdt.hours_in_day_with_provider(&provider).unwrap(), 23.0);
    /// ```
    pub fn from_utf8_with_provider(
        source: &[u8],
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let parsed = ParsedZonedDateTime::from_utf8_with_provider(source, provider)?;
        Self::from_parsed_with_provider(parsed, disambiguation, offset_option, provider)
    }

    /// Parses a `ZonedDateTime` from a UTF-16 encoded IXDTF string.
    pub fn from_utf16_with_provider(
        source: &[u16],
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let source = utf16_to_utf8(source)?;
        Self::from_utf8_with_provider(source.as_bytes(), disambiguation, offset_option, provider)
    }

    pub(crate) fn from_parsed_with_provider(
        parsed: ParsedZonedDateTime,
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let date = IsoDate::new_with_overflow(
            parsed.date.record.year,
            parsed.date.record.month,
            parsed.date.record.day,
            Overflow::Reject,
        )?;
        let behaviour = match (parsed.has_utc_designator, parsed.offset) {
            (true, _) => OffsetBehaviour::Exact,
            (false, Some(offset)) => OffsetBehaviour::Option(offset),
            (false, None) => OffsetBehaviour::Wall,
        };
        let epoch_ns = interpret_isodatetime_offset(
            date,
            parsed.time,
            behaviour,
            &parsed.timezone,
            disambiguation,
            offset_option,
            parsed.match_minutes,
            provider,
        )?;
        Ok(Self::new_unchecked(
            epoch_ns,
            parsed.date.calendar,
            parsed.timezone,
        ))
    }

    /// Returns the calendar of this `ZonedDateTime`.
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Returns the time zone of this `ZonedDateTime`.
    #[inline]
    #[must_use]
    pub fn timezone(&self) -> &TimeZone {
        &self.timezone
    }

    /// Returns the milliseconds since the epoch, floored.
    #[inline]
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.instant.epoch_milliseconds()
    }

    /// Returns the nanoseconds since the epoch.
    #[inline]
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> &EpochNanoseconds {
        self.instant.epoch_nanoseconds()
    }

    /// Returns the exact time of this `ZonedDateTime` as an [`Instant`].
    #[inline]
    #[must_use]
    pub fn to_instant(&self) -> Instant {
        self.instant
    }

    /// Compares the exact times of two `ZonedDateTime`s, ignoring the zone and calendar.
    #[inline]
    #[must_use]
    pub fn compare_instant(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }

    /// Returns the same exact time in another time zone.
    #[inline]
    #[must_use]
    pub fn with_timezone(&self, timezone: TimeZone) -> Self {
        Self {
            instant: self.instant,
            calendar: self.calendar,
            timezone,
        }
    }

    /// Returns the same exact time viewed through another calendar.
    #[inline]
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self {
            instant: self.instant,
            calendar,
            timezone: self.timezone.clone(),
        }
    }

    /// Creates a new `ZonedDateTime` with the fields of `partial` merged over the
    /// current wall-clock fields.
    ///
    /// Without an explicit offset the current offset is kept when it is still
    /// valid for the new wall-clock time. The default offset option is `Prefer`.
    pub fn with_with_provider(
        &self,
        partial: PartialZonedDateTime,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
        overflow: Option<Overflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }
        if partial.timezone.is_some() {
            return Err(TemporalError::invalid_field()
                .with_message("with does not accept a time zone; use with_timezone."));
        }
        let overflow = overflow.unwrap_or_default();
        let iso = self.iso_with_provider(provider)?;
        let plain_date = PlainDate::new_unchecked(iso.date, self.calendar);
        let date = if partial.date.is_empty() {
            plain_date
        } else {
            plain_date.with(partial.date, Some(overflow))?
        };
        let time = iso.time.with(partial.time, overflow)?;

        let offset = match partial.offset {
            Some(offset) => offset.nanoseconds_i64(),
            None => self.offset_nanoseconds_with_provider(provider)?,
        };
        let epoch_ns = interpret_isodatetime_offset(
            date.iso,
            Some(time),
            OffsetBehaviour::Option(offset),
            &self.timezone,
            disambiguation.unwrap_or_default(),
            offset_option.unwrap_or(OffsetDisambiguation::Prefer),
            false,
            provider,
        )?;
        Ok(Self::new_unchecked(
            epoch_ns,
            self.calendar,
            self.timezone.clone(),
        ))
    }

    /// Returns a new `ZonedDateTime` on the same date at `time`, or at the start
    /// of the day when `time` is `None`.
    pub fn with_plain_time_and_provider(
        &self,
        time: Option<PlainTime>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let iso = self.iso_with_provider(provider)?;
        let epoch_ns = match time {
            Some(time) => self.timezone.get_epoch_nanoseconds_for(
                IsoDateTime::new_unchecked(iso.date, time.iso),
                Disambiguation::Compatible,
                provider,
            )?,
            None => self.timezone.get_start_of_day(&iso.date, provider)?,
        };
        Ok(Self::new_unchecked(
            epoch_ns,
            self.calendar,
            self.timezone.clone(),
        ))
    }

    /// Returns whether both values hold the same exact time, the same time
    /// zone after resolving links, and the same calendar.
    pub fn equals_with_provider(
        &self,
        other: &Self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<bool> {
        if self.instant != other.instant || self.calendar != other.calendar {
            return Ok(false);
        }
        self.timezone
            .time_zone_equals_with_provider(&other.timezone, provider)
    }
}

// ==== Accessors ====

impl ZonedDateTime {
    /// Returns the UTC offset at this exact time, in nanoseconds.
    pub fn offset_nanoseconds_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<i64> {
        let offset = self
            .timezone
            .get_offset_nanos_for(self.instant.epoch_nanoseconds().0, provider)?;
        Ok(offset as i64)
    }

    /// Returns the UTC offset at this exact time as `±HH:MM`, with seconds and
    /// a fraction only when the offset has them.
    pub fn offset_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<String> {
        let offset = self.offset_nanoseconds_with_provider(provider)?;
        Ok(FormattableOffset::from_nanoseconds(offset).to_string())
    }

    pub fn year_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<i32> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.year(&iso.date))
    }

    pub fn month_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.month(&iso.date))
    }

    pub fn month_code_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<MonthCode> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.month_code(&iso.date))
    }

    pub fn day_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.day(&iso.date))
    }

    pub fn hour_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.iso_with_provider(provider)?.time.hour)
    }

    pub fn minute_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.iso_with_provider(provider)?.time.minute)
    }

    pub fn second_with_provider(&self, provider: &impl TimeZoneProvider) -> TemporalResult<u8> {
        Ok(self.iso_with_provider(provider)?.time.second)
    }

    pub fn millisecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self.iso_with_provider(provider)?.time.millisecond)
    }

    pub fn microsecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self.iso_with_provider(provider)?.time.microsecond)
    }

    pub fn nanosecond_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        Ok(self.iso_with_provider(provider)?.time.nanosecond)
    }

    pub fn era_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.era(&iso.date))
    }

    pub fn era_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<i32>> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.era_year(&iso.date))
    }

    pub fn day_of_week_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.day_of_week(&iso.date))
    }

    pub fn day_of_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.day_of_year(&iso.date))
    }

    pub fn week_of_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<u8>> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.week_of_year(&iso.date))
    }

    pub fn year_of_week_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<i32>> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.year_of_week(&iso.date))
    }

    pub fn days_in_week_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.days_in_week(&iso.date))
    }

    pub fn days_in_month_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.days_in_month(&iso.date))
    }

    pub fn days_in_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.days_in_year(&iso.date))
    }

    pub fn months_in_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<u16> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.months_in_year(&iso.date))
    }

    pub fn in_leap_year_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<bool> {
        let iso = self.iso_with_provider(provider)?;
        Ok(self.calendar.in_leap_year(&iso.date))
    }

    /// Returns the length of the current wall-clock day in hours.
    ///
    /// Days that contain a transition are longer or shorter than 24 hours.
    pub fn hours_in_day_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<f64> {
        let today = self.iso_with_provider(provider)?.date;
        let tomorrow = today.add_days(1)?;
        let today_ns = self.timezone.get_start_of_day(&today, provider)?;
        let tomorrow_ns = self.timezone.get_start_of_day(&tomorrow, provider)?;
        TimeDuration::from_nanosecond_difference(tomorrow_ns.0, today_ns.0)?.total(Unit::Hour)
    }

    /// Returns the closest offset transition after or before this exact time.
    ///
    /// Fixed offset zones, and transitions outside of the instant range,
    /// give `None`.
    pub fn get_time_zone_transition_with_provider(
        &self,
        direction: TransitionDirection,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Option<Self>> {
        let transition = self.timezone.get_time_zone_transition(
            self.instant.epoch_nanoseconds().0,
            direction,
            provider,
        )?;
        Ok(transition
            .filter(|ns| ns.check_validity().is_ok())
            .map(|ns| Self::new_unchecked(ns, self.calendar, self.timezone.clone())))
    }
}

// ==== Arithmetic and conversion ====

impl ZonedDateTime {
    /// Adds a duration. Years, months, weeks and days move the wall-clock date;
    /// the time units are added as exact time.
    pub fn add_with_provider(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        self.add_internal(duration, overflow.unwrap_or_default(), provider)
    }

    /// Subtracts a duration.
    pub fn subtract_with_provider(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        self.add_internal(&duration.negated(), overflow.unwrap_or_default(), provider)
    }

    /// Returns the `Duration` from this `ZonedDateTime` to `other`.
    ///
    /// The default largest unit is `Hour`. Day or larger units need both values
    /// to share a time zone.
    pub fn until_with_provider(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        self.diff_internal_with_provider(DifferenceOperation::Until, other, settings, provider)
    }

    /// Returns the `Duration` from `other` to this `ZonedDateTime`.
    pub fn since_with_provider(
        &self,
        other: &Self,
        settings: DifferenceSettings,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Duration> {
        self.diff_internal_with_provider(DifferenceOperation::Since, other, settings, provider)
    }

    /// Returns the first exact time of the current wall-clock day.
    pub fn start_of_day_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let iso = self.iso_with_provider(provider)?;
        let epoch_ns = self.timezone.get_start_of_day(&iso.date, provider)?;
        Ok(Self::new_unchecked(
            epoch_ns,
            self.calendar,
            self.timezone.clone(),
        ))
    }

    /// Rounds the wall-clock time.
    ///
    /// Rounding to `Day` works on the real length of the day, which may not be
    /// 24 hours.
    pub fn round_with_provider(
        &self,
        options: RoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_datetime_options(options)?;
        if resolved.is_noop() {
            return Ok(self.clone());
        }
        let this_ns = self.instant.epoch_nanoseconds().0;
        let iso = self.iso_with_provider(provider)?;

        let epoch_ns = if resolved.smallest_unit == Unit::Day {
            let start = self.timezone.get_start_of_day(&iso.date, provider)?;
            let end = self
                .timezone
                .get_start_of_day(&iso.date.add_days(1)?, provider)?;
            if this_ns < start.0 || this_ns >= end.0 {
                return Err(TemporalError::range().with_enum(ErrorMessage::ZDTOutOfDayBounds));
            }
            let day_length = NonZeroU128::new((end.0 - start.0).unsigned_abs()).temporal_unwrap()?;
            let progress = this_ns - start.0;
            let rounded = IncrementRounder::from_signed_num(progress, day_length)?
                .round(resolved.rounding_mode);
            let candidate = EpochNanoseconds(start.0 + rounded);
            candidate.check_validity()?;
            candidate
        } else {
            let rounded = iso.round(resolved)?;
            let offset = self.timezone.get_offset_nanos_for(this_ns, provider)?;
            interpret_isodatetime_offset(
                rounded.date,
                Some(rounded.time),
                OffsetBehaviour::Option(offset as i64),
                &self.timezone,
                Disambiguation::Compatible,
                OffsetDisambiguation::Prefer,
                false,
                provider,
            )?
        };
        Ok(Self::new_unchecked(
            epoch_ns,
            self.calendar,
            self.timezone.clone(),
        ))
    }

    /// Returns the wall-clock date.
    pub fn to_plain_date_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDate> {
        let iso = self.iso_with_provider(provider)?;
        Ok(PlainDate::new_unchecked(iso.date, self.calendar))
    }

    /// Returns the wall-clock time.
    pub fn to_plain_time_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainTime> {
        let iso = self.iso_with_provider(provider)?;
        Ok(PlainTime::new_unchecked(iso.time))
    }

    /// Returns the wall-clock date and time.
    pub fn to_plain_date_time_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<PlainDateTime> {
        let iso = self.iso_with_provider(provider)?;
        Ok(PlainDateTime::new_unchecked(iso, self.calendar))
    }

    /// Returns the IXDTF string of this `ZonedDateTime`, for example
    /// `2024-03-10T03:30:00-04:00[America/New_York]`.
    pub fn to_ixdtf_string_with_provider(
        &self,
        display_offset: DisplayOffset,
        display_timezone: DisplayTimeZone,
        display_calendar: DisplayCalendar,
        options: ToStringRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let rounded = EpochNanoseconds(
            self.instant
                .round_instant(ResolvedRoundingOptions::from_to_string_options(&resolved))?,
        );
        rounded.check_validity()?;
        let offset = self.timezone.get_offset_nanos_for(rounded.0, provider)?;
        let iso = IsoDateTime::from_epoch_nanos(&rounded, offset);
        let identifier = self.timezone.identifier();
        Ok(IxdtfStringBuilder::default()
            .with_date(iso.date)
            .with_time(iso.time, resolved.precision)
            .with_offset_nanoseconds(offset as i64, display_offset)
            .with_timezone(&identifier, display_timezone)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build())
    }
}

/// A `None` time is the start of the day and only allowed with
/// `OffsetBehaviour::Wall`. `match_minutes` lets an offset written to the
/// minute match a candidate offset that has seconds.
#[allow(clippy::too_many_arguments)]
pub(crate) fn interpret_isodatetime_offset(
    date: IsoDate,
    time: Option<IsoTime>,
    behaviour: OffsetBehaviour,
    timezone: &TimeZone,
    disambiguation: Disambiguation,
    offset_option: OffsetDisambiguation,
    match_minutes: bool,
    provider: &impl TimeZoneProvider,
) -> TemporalResult<EpochNanoseconds> {
    let Some(time) = time else {
        temporal_assert!(
            behaviour == OffsetBehaviour::Wall,
            "a start-of-day time cannot carry an offset: {behaviour:?}"
        );
        return timezone.get_start_of_day(&date, provider);
    };
    let iso = IsoDateTime::new_unchecked(date, time);

    let offset = match (behaviour, offset_option) {
        (OffsetBehaviour::Wall, _) | (OffsetBehaviour::Option(_), OffsetDisambiguation::Ignore) => {
            return timezone.get_epoch_nanoseconds_for(iso, disambiguation, provider);
        }
        (OffsetBehaviour::Exact, _) => 0,
        (OffsetBehaviour::Option(offset), OffsetDisambiguation::Use) => offset,
        (OffsetBehaviour::Option(offset), _) => {
            return match_offset_candidate(
                iso,
                offset,
                timezone,
                disambiguation,
                offset_option,
                match_minutes,
                provider,
            );
        }
    };

    // The wall-clock time is read in the given offset.
    let balanced =
        IsoDateTime::balance_shifted(date.year, date.month, date.day, time, -i128::from(offset))?;
    let ns = balanced.as_nanoseconds();
    ns.check_validity()?;
    Ok(ns)
}

/// Picks the candidate whose offset equals `offset`, falling back to the time
/// zone for `Prefer`.
fn match_offset_candidate(
    iso: IsoDateTime,
    offset: i64,
    timezone: &TimeZone,
    disambiguation: Disambiguation,
    offset_option: OffsetDisambiguation,
    match_minutes: bool,
    provider: &impl TimeZoneProvider,
) -> TemporalResult<EpochNanoseconds> {
    let utc_ns = iso.as_nanoseconds().0;
    let candidates = timezone.get_possible_epoch_ns_for(iso, provider)?;
    for candidate in candidates.as_slice() {
        let candidate_offset = utc_ns - candidate.ns.0;
        if candidate_offset == i128::from(offset) {
            return Ok(candidate.ns);
        }
        if match_minutes {
            let rounded = IncrementRounder::from_signed_num(candidate_offset, NS_PER_MINUTE)?
                .round(RoundingMode::HalfExpand);
            if rounded == i128::from(offset) {
                return Ok(candidate.ns);
            }
        }
    }

    if offset_option == OffsetDisambiguation::Reject {
        #[cfg(feature = "log")]
        log::debug!("offset {offset}ns does not match any candidate in {timezone:?}");
        return Err(TemporalError::time_zone().with_enum(ErrorMessage::OffsetNotFound));
    }
    timezone.get_epoch_nanoseconds_for(iso, disambiguation, provider)
}
