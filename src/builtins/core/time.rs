//! `PlainTime`, a wall-clock time of day.

use alloc::string::String;
use core::{fmt, str::FromStr};

use crate::{
    builtins::core::{
        duration::normalized::{InternalDurationRecord, TimeDuration},
        DateDuration, Duration, PlainDateTime,
    },
    error::ErrorMessage,
    iso::IsoTime,
    options::{
        DifferenceOperation, DifferenceSettings, Overflow, ResolvedRoundingOptions,
        RoundingOptions, ToStringRoundingOptions, Unit, UnitGroup,
    },
    parsers::{parse_time, utf16_to_utf8, IxdtfStringBuilder},
    TemporalError, TemporalResult,
};

/// Time fields, any of which may be absent.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PartialTime {
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
    pub millisecond: Option<u16>,
    pub microsecond: Option<u16>,
    pub nanosecond: Option<u16>,
}

impl PartialTime {
    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A wall-clock time without a date or a time zone.
///
/// Times order from midnight to the last nanosecond of the day.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainTime {
    pub(crate) iso: IsoTime,
}

impl PlainTime {
    pub(crate) const fn new_unchecked(iso: IsoTime) -> Self {
        Self { iso }
    }

    /// Moves the time by a duration, dropping the days that carry over.
    fn shifted(&self, duration: TimeDuration) -> Self {
        let (_, iso) = self.iso.add(duration);
        Self::new_unchecked(iso)
    }

    fn diff(
        &self,
        op: DifferenceOperation,
        other: &PlainTime,
        settings: DifferenceSettings,
    ) -> TemporalResult<Duration> {
        let resolved = ResolvedRoundingOptions::from_diff_settings(
            settings,
            op,
            UnitGroup::Time,
            Unit::Hour,
            Unit::Nanosecond,
        )?;

        let mut span = self.iso.diff(&other.iso);
        if !resolved.is_noop() {
            span = span.round(resolved)?;
        }

        let internal = InternalDurationRecord::new(DateDuration::default(), span)?;
        let duration = Duration::from_internal(internal, resolved.largest_unit)?;
        Ok(match op {
            DifferenceOperation::Until => duration,
            DifferenceOperation::Since => duration.negated(),
        })
    }
}

impl PlainTime {
    /// Creates a new `PlainTime`, constraining any field into a valid range.
    ///
    /// ```rust
    /// use temporal_engine::PlainTime;
    ///
    /// let time = PlainTime::new(23, 59, 59, 999, 999, 999).unwrap();
    ///
    /// let constrained_time = PlainTime::new(24, 59, 59, 999, 999, 999).unwrap();
    /// assert_eq!(time, constrained_time);
    /// ```
    pub fn new(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            Overflow::Constrain,
        )
    }

    /// Creates a new `PlainTime`, failing when any field is out of range.
    ///
    /// ```rust
    /// use temporal_engine::PlainTime;
    ///
    /// assert!(PlainTime::try_new(23, 59, 59, 999, 999, 999).is_ok());
    /// assert!(PlainTime::try_new(24, 0, 0, 0, 0, 0).is_err());
    /// ```
    pub fn try_new(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            Overflow::Reject,
        )
    }

    pub fn new_with_overflow(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        IsoTime::new(
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
            overflow,
        )
        .map(Self::new_unchecked)
    }

    /// Creates a time from the fields present in `partial`. Absent fields are
    /// zero, and an empty partial is an `InvalidField` error.
    ///
    /// ```rust
    /// use temporal_engine::{partial::PartialTime, PlainTime};
    ///
    /// let partial = PartialTime {
    ///     hour: Some(22),
    ///     ..Default::default()
    /// };
    /// let time = PlainTime::from_partial(partial, None).unwrap();
    /// assert_eq!((time.hour(), time.minute()), (22, 0));
    /// ```
    pub fn from_partial(partial: PartialTime, overflow: Option<Overflow>) -> TemporalResult<Self> {
        Self::default().with(partial, overflow)
    }

    /// Replaces the fields present in `partial`.
    ///
    /// ```rust
    /// use temporal_engine::{partial::PartialTime, PlainTime};
    ///
    /// let initial = PlainTime::try_new(15, 30, 12, 123, 456, 789).unwrap();
    /// let partial = PartialTime {
    ///     hour: Some(22),
    ///     ..Default::default()
    /// };
    /// let time = initial.with(partial, None).unwrap();
    /// assert_eq!((time.hour(), time.minute(), time.nanosecond()), (22, 30, 789));
    /// ```
    pub fn with(&self, partial: PartialTime, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }
        self.iso
            .with(partial, overflow.unwrap_or_default())
            .map(Self::new_unchecked)
    }

    /// Parses a time string. Date-time strings are accepted and their date is
    /// dropped, but a `Z` designator is not.
    pub fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let record = parse_time(source)?;
        IsoTime::from_time_record(record).map(Self::new_unchecked)
    }

    /// Parses a UTF-16 time string.
    pub fn from_utf16(source: &[u16]) -> TemporalResult<Self> {
        Self::from_utf8(utf16_to_utf8(source)?.as_bytes())
    }

    #[inline]
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.iso.hour
    }

    #[inline]
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.iso.minute
    }

    #[inline]
    #[must_use]
    pub const fn second(&self) -> u8 {
        self.iso.second
    }

    #[inline]
    #[must_use]
    pub const fn millisecond(&self) -> u16 {
        self.iso.millisecond
    }

    #[inline]
    #[must_use]
    pub const fn microsecond(&self) -> u16 {
        self.iso.microsecond
    }

    #[inline]
    #[must_use]
    pub const fn nanosecond(&self) -> u16 {
        self.iso.nanosecond
    }

    /// Adds the time portion of `duration`, wrapping around midnight. Days and
    /// larger units are ignored.
    pub fn add(&self, duration: &Duration) -> TemporalResult<Self> {
        Ok(self.shifted(duration.time_duration()?))
    }

    /// Subtracts the time portion of `duration`, wrapping around midnight.
    pub fn subtract(&self, duration: &Duration) -> TemporalResult<Self> {
        self.add(&duration.negated())
    }

    /// The duration from this time to `other`. The largest unit defaults to
    /// hours, so the result is always shorter than a day.
    #[inline]
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    #[inline]
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Since, other, settings)
    }

    /// Rounds to a time unit. Rounding past the last unit of the day wraps to
    /// midnight.
    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        let resolved = ResolvedRoundingOptions::from_time_options(options)?;
        let (_, iso) = self.iso.round(resolved)?;
        Ok(Self::new_unchecked(iso))
    }

    /// Formats the time as `HH:MM[:SS[.fraction]]`, rounded to the requested
    /// precision.
    pub fn to_ixdtf_string(&self, options: ToStringRoundingOptions) -> TemporalResult<String> {
        let resolved = options.resolve()?;
        let (_, iso) = self
            .iso
            .round(ResolvedRoundingOptions::from_to_string_options(&resolved))?;
        Ok(IxdtfStringBuilder::default()
            .with_time(iso, resolved.precision)
            .build())
    }
}

impl fmt::Display for PlainTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = self
            .to_ixdtf_string(ToStringRoundingOptions::default())
            .map_err(|_| fmt::Error)?;
        f.write_str(&string)
    }
}

impl From<PlainDateTime> for PlainTime {
    fn from(value: PlainDateTime) -> Self {
        value.to_plain_time()
    }
}

impl FromStr for PlainTime {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}
