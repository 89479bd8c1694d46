//! An implementation of the Temporal Instant.

use alloc::string::String;
use core::{num::NonZeroU128, str::FromStr};

use crate::{
    builtins::core::{Duration, TimeDuration, ZonedDateTime},
    error::ErrorMessage,
    iso::{IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, DisplayOffset, ResolvedRoundingOptions,
        RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsed_intermediates::offset_record_to_nanoseconds,
    parsers::{parse_instant, utf16_to_utf8, IxdtfStringBuilder},
    provider::TimeZoneProvider,
    rounding::IncrementRounder,
    time::EpochNanoseconds,
    Calendar, TemporalError, TemporalResult, TemporalUnwrap, TimeZone,
};

use ixdtf::records::UtcOffsetRecordOrZ;

use super::duration::normalized::InternalDurationRecord;

const NS_PER_MILLISECOND: i128 = 1_000_000;

/// The native Rust implementation of `Temporal.Instant`.
///
/// An `Instant` is an exact point on the UTC time line, with nanosecond
/// precision and no calendar or time zone.
///
/// ```rust
/// use temporal_engine::Instant;
/// use core::str::FromStr;
///
/// let instant = Instant::from_str("2024-03-15T14:30:45.123Z").unwrap();
/// assert_eq!(instant.epoch_milliseconds(), 1_710_513_045_123);
///
/// // Offsets are applied and dropped.
/// let other = Instant::from_str("2024-03-15T16:30:45.123+02:00").unwrap();
/// assert_eq!(instant, other);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(EpochNanoseconds);

impl From<EpochNanoseconds> for Instant {
    fn from(value: EpochNanoseconds) -> Self {
        Self(value)
    }
}

// ==== Private API ====

impl Instant {
    /// Adds a time duration to this instant, checking the result against the
    /// instant limits.
    pub(crate) fn add_to_instant(&self, duration: &TimeDuration) -> TemporalResult<Self> {
        let result = EpochNanoseconds(self.0 .0 + duration.0);
        result.check_validity()?;
        Ok(Self::from(result))
    }

    pub(crate) fn add_duration_to_instant(&self, duration: &Duration) -> TemporalResult<Self> {
        let largest_unit = duration.default_largest_unit();
        if largest_unit.is_date_unit() {
            return Err(TemporalError::range().with_enum(ErrorMessage::LargestUnitCannotBeDateUnit));
        }
        let internal = duration.to_internal_duration_record_with_24_hour_days()?;
        self.add_to_instant(&internal.normalized_time_duration())
    }

    pub(crate) fn diff_instant_internal(
        &self,
        other: &Self,
        options: ResolvedRoundingOptions,
    ) -> TemporalResult<InternalDurationRecord> {
        let diff = TimeDuration::from_nanosecond_difference(other.0 .0, self.0 .0)?;
        let rounded = if options.is_noop() {
            diff
        } else {
            diff.round(options)?
        };
        InternalDurationRecord::new(Default::default(), rounded)
    }

    pub(crate) fn diff_instant(
        &self,
        op: DifferenceOperation,
        other: &Self,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::Time,
            Unit::Second,
            Unit::Nanosecond,
        )?;

        let internal = self.diff_instant_internal(other, resolved)?;
        let result = Duration::from_internal(internal, resolved.largest_unit)?;
        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }

    pub(crate) fn round_instant(&self, options: ResolvedRoundingOptions) -> TemporalResult<i128> {
        let unit_length = options.smallest_unit.as_nanoseconds().temporal_unwrap()?;
        let increment = options
            .increment
            .as_extended_increment()
            .checked_mul(NonZeroU128::from(
                core::num::NonZeroU64::new(unit_length).temporal_unwrap()?,
            ))
            .temporal_unwrap()?;
        let rounded = IncrementRounder::from_signed_num(self.0 .0, increment)?
            .round_as_if_positive(options.rounding_mode);
        Ok(rounded)
    }
}

// ==== Public API ====

impl Instant {
    /// Creates a new `Instant` from epoch nanoseconds, rejecting values outside
    /// of ±10^8 days around the epoch.
    #[inline]
    pub fn try_new(nanoseconds: i128) -> TemporalResult<Self> {
        let ns = EpochNanoseconds::from(nanoseconds);
        ns.check_validity()?;
        Ok(Self(ns))
    }

    /// Creates a new `Instant` from epoch milliseconds.
    pub fn from_epoch_milliseconds(epoch_milliseconds: i64) -> TemporalResult<Self> {
        Self::try_new(i128::from(epoch_milliseconds) * NS_PER_MILLISECOND)
    }

    /// Converts a UTF-16 encoded string into a `Instant`.
    pub fn from_utf16(source: &[u16]) -> TemporalResult<Self> {
        Self::from_utf8(utf16_to_utf8(source)?.as_bytes())
    }

    /// Parses an instant string: a date-time followed by a UTC offset or `Z`.
    ///
    /// Any bracketed annotation is accepted and ignored.
    pub fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let record = parse_instant(source)?;
        let offset = match record.offset {
            UtcOffsetRecordOrZ::Z => 0,
            UtcOffsetRecordOrZ::Offset(offset) => offset_record_to_nanoseconds(&offset)?,
        };
        let time = IsoTime::from_time_record(record.time)?;
        // The wall-clock fields may sit up to a day past the limits before the
        // offset is applied, so only the balanced epoch value is checked.
        let iso = IsoDateTime::balance_shifted(
            record.date.year,
            record.date.month,
            record.date.day,
            time,
            0,
        )?;
        let ns = iso.as_nanoseconds().0 - i128::from(offset);
        Self::try_new(ns)
    }

    /// Returns a new `Instant` moved forward by `duration`.
    ///
    /// Durations with non-zero years, months, weeks or days are rejected.
    #[inline]
    pub fn add(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add_duration_to_instant(duration)
    }

    /// Returns a new `Instant` moved backward by `duration`.
    #[inline]
    pub fn subtract(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add_duration_to_instant(&duration.negated())
    }

    /// Returns the `Duration` from this instant to `other`.
    #[inline]
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_instant(DifferenceOperation::Until, other, settings)
    }

    /// Returns the `Duration` from `other` to this instant.
    #[inline]
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_instant(DifferenceOperation::Since, other, settings)
    }

    /// Rounds this instant to an hour or smaller unit.
    ///
    /// The increment must divide a solar day.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_instant_options(options)?;
        let ns = self.round_instant(resolved)?;
        Self::try_new(ns)
    }

    /// Returns the milliseconds since the epoch, floored.
    #[must_use]
    pub fn epoch_milliseconds(&self) -> i64 {
        self.0 .0.div_euclid(NS_PER_MILLISECOND) as i64
    }

    /// Returns the nanoseconds since the epoch.
    #[must_use]
    pub fn epoch_nanoseconds(&self) -> &EpochNanoseconds {
        &self.0
    }

    /// Returns a `ZonedDateTime` for this instant in `time_zone`, on the ISO
    /// calendar.
    #[must_use]
    pub fn to_zoned_date_time_iso(&self, time_zone: TimeZone) -> ZonedDateTime {
        ZonedDateTime::new_unchecked(self.0, Calendar::ISO, time_zone)
    }

    /// Returns the IXDTF string of this instant.
    ///
    /// Without a time zone the string ends in `Z`. With one, the wall-clock
    /// time and offset of that zone are written instead.
    pub fn to_ixdtf_string_with_provider(
        &self,
        timezone: Option<&TimeZone>,
        options: ToStringRoundingOptions,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let rounded = Self::try_new(
            self.round_instant(ResolvedRoundingOptions::from_to_string_options(&resolved))?,
        )?;

        let (offset, builder) = match timezone {
            Some(tz) => {
                let offset = tz.get_offset_nanos_for(rounded.0 .0, provider)?;
                let builder = IxdtfStringBuilder::default()
                    .with_offset_nanoseconds(offset as i64, DisplayOffset::Auto);
                (offset, builder)
            }
            None => (0, IxdtfStringBuilder::default().with_z(DisplayOffset::Auto)),
        };
        let iso = IsoDateTime::from_epoch_nanos(&rounded.0, offset);
        Ok(builder
            .with_date(iso.date)
            .with_time(iso.time, resolved.precision)
            .build())
    }
}

impl FromStr for Instant {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::Instant;
    use crate::{
        error::ErrorKind,
        options::{
            DifferenceSettings, Precision, RoundingIncrement, RoundingMode, RoundingOptions,
            ToStringRoundingOptions, Unit,
        },
        provider::NeverProvider,
        Duration, TimeZone, UtcOffset, NS_MAX_INSTANT, NS_MIN_INSTANT,
    };

    #[test]
    fn max_and_minimum_instant_bounds() {
        let max = NS_MAX_INSTANT;
        let min = NS_MIN_INSTANT;

        assert_eq!(Instant::try_new(max).unwrap().epoch_nanoseconds().0, max);
        assert_eq!(Instant::try_new(min).unwrap().epoch_nanoseconds().0, min);
        assert!(Instant::try_new(max + 1).is_err());
        assert!(Instant::try_new(min - 1).is_err());
    }

    #[test]
    fn instant_parsing_limits() {
        let max = Instant::from_str("+275760-09-13T00:00:00Z").unwrap();
        assert_eq!(max.epoch_nanoseconds().0, NS_MAX_INSTANT);
        let min = Instant::from_str("-271821-04-20T00:00:00Z").unwrap();
        assert_eq!(min.epoch_nanoseconds().0, NS_MIN_INSTANT);

        // The wall-clock time is past the limit, but the offset brings it back.
        let max_with_offset = Instant::from_str("+275760-09-13T01:00:00+01:00").unwrap();
        assert_eq!(max_with_offset, max);
        let min_with_offset = Instant::from_str("-271821-04-19T23:00:00-01:00").unwrap();
        assert_eq!(min_with_offset, min);

        assert!(Instant::from_str("+275760-09-13T00:00:00.000000001Z").is_err());
        assert!(Instant::from_str("-271821-04-19T23:59:59.999999999Z").is_err());
    }

    #[test]
    fn parse_requires_offset() {
        assert!(Instant::from_str("2020-01-01T00:00:00").is_err());
        assert!(Instant::from_str("2020-01-01").is_err());
        let annotated = Instant::from_str("2020-01-01T00:00:00+01:00[Europe/Berlin]").unwrap();
        assert_eq!(annotated.epoch_milliseconds(), 1_577_833_200_000);
        let leap = Instant::from_str("2016-12-31T23:59:60Z").unwrap();
        assert_eq!(leap, Instant::from_str("2016-12-31T23:59:59Z").unwrap());
    }

    #[test]
    fn epoch_milliseconds_floor() {
        let instant = Instant::try_new(-1).unwrap();
        assert_eq!(instant.epoch_milliseconds(), -1);
        let instant = Instant::from_epoch_milliseconds(1_500).unwrap();
        assert_eq!(instant.epoch_nanoseconds().0, 1_500_000_000);
    }

    #[test]
    fn basic_instant_until_and_since() {
        let earlier = Instant::from_str("1969-07-20T20:17:00.000000001Z").unwrap();
        let later = Instant::from_str("2024-03-15T14:30:45.5Z").unwrap();

        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Hour),
            smallest_unit: Some(Unit::Second),
            rounding_mode: Some(RoundingMode::Ceil),
            ..Default::default()
        };
        let until = earlier.until(&later, settings).unwrap();
        assert_eq!(until.hours(), 479_082);
        assert_eq!(until.minutes(), 13);
        assert_eq!(until.seconds(), 46);
        assert_eq!(until.nanoseconds(), 0);

        // `since` negates the rounding mode, so a ceiling becomes a floor.
        let since = earlier.since(&later, settings).unwrap();
        assert_eq!(since.hours(), -479_082);
        assert_eq!(since.minutes(), -13);
        assert_eq!(since.seconds(), -45);

        let default = earlier.until(&later, DifferenceSettings::default()).unwrap();
        assert_eq!(default.hours(), 0);
        assert_eq!(default.seconds(), 1_724_696_025);
        assert_eq!(default.milliseconds(), 499);
        assert_eq!(default.microseconds(), 999);
        assert_eq!(default.nanoseconds(), 999);

        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Day),
            ..Default::default()
        };
        assert_eq!(
            earlier.until(&later, settings).unwrap_err().kind(),
            ErrorKind::Range
        );
    }

    #[test]
    fn add_and_subtract_at_the_limits() {
        let max = Instant::try_new(NS_MAX_INSTANT).unwrap();
        let one_ns = Duration::from_str("PT0.000000001S").unwrap();
        assert!(max.add(&one_ns).is_err());
        assert_eq!(
            max.subtract(&one_ns).unwrap().epoch_nanoseconds().0,
            NS_MAX_INSTANT - 1
        );

        let min = Instant::try_new(NS_MIN_INSTANT).unwrap();
        assert!(min.subtract(&one_ns).is_err());
        assert_eq!(
            min.add(&one_ns).unwrap().epoch_nanoseconds().0,
            NS_MIN_INSTANT + 1
        );

        let epoch = Instant::try_new(0).unwrap();
        let day = Duration::from_str("P1D").unwrap();
        assert!(epoch.add(&day).is_err());
        let hours = Duration::from_str("PT24H").unwrap();
        assert_eq!(
            epoch.add(&hours).unwrap().epoch_milliseconds(),
            86_400_000
        );
    }

    #[test]
    fn round_before_the_epoch() {
        // 1969-12-31T23:59:59.5Z
        let instant = Instant::try_new(-500_000_000).unwrap();
        let trunc = instant
            .round(RoundingOptions {
                smallest_unit: Some(Unit::Second),
                rounding_mode: Some(RoundingMode::Trunc),
                ..Default::default()
            })
            .unwrap();
        // Instants round as if positive, so truncation moves to the earlier second.
        assert_eq!(trunc.epoch_nanoseconds().0, -1_000_000_000);

        let half_expand = instant
            .round(RoundingOptions::with_smallest_unit(Unit::Second))
            .unwrap();
        assert_eq!(half_expand.epoch_nanoseconds().0, 0);

        let hours = Instant::from_str("2024-03-15T14:30:45Z")
            .unwrap()
            .round(RoundingOptions {
                smallest_unit: Some(Unit::Hour),
                increment: Some(RoundingIncrement::try_new(6).unwrap()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(hours, Instant::from_str("2024-03-15T12:00:00Z").unwrap());

        let err = instant
            .round(RoundingOptions {
                smallest_unit: Some(Unit::Hour),
                increment: Some(RoundingIncrement::try_new(5).unwrap()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(instant
            .round(RoundingOptions::with_smallest_unit(Unit::Day))
            .is_err());
    }

    #[test]
    fn to_string_with_offsets() {
        let provider = &NeverProvider;
        let instant = Instant::from_str("2024-03-15T14:30:45.123456789Z").unwrap();
        assert_eq!(
            instant
                .to_ixdtf_string_with_provider(None, Default::default(), provider)
                .unwrap(),
            "2024-03-15T14:30:45.123456789Z"
        );

        let options = ToStringRoundingOptions {
            precision: Precision::Digit(2),
            ..Default::default()
        };
        assert_eq!(
            instant
                .to_ixdtf_string_with_provider(None, options, provider)
                .unwrap(),
            "2024-03-15T14:30:45.12Z"
        );

        let options = ToStringRoundingOptions {
            smallest_unit: Some(Unit::Minute),
            ..Default::default()
        };
        let tz = TimeZone::from(UtcOffset::from_minutes(-330).unwrap());
        assert_eq!(
            instant
                .to_ixdtf_string_with_provider(Some(&tz), options, provider)
                .unwrap(),
            "2024-03-15T09:00-05:30"
        );
    }
}
