//! This module implements `PlainDate` and any directly related algorithms.

use crate::{
    builtins::core::{
        calendar::{Calendar, MonthCode},
        duration::normalized::{InternalDurationRecord, RelativeOrigin},
        Duration, PlainDateTime, PlainMonthDay, PlainTime, PlainYearMonth, ZonedDateTime,
    },
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, Disambiguation, DisplayCalendar, Overflow,
        ResolvedRoundingOptions, Unit, UnitGroup,
    },
    parsed_intermediates::ParsedDate,
    parsers::{utf16_to_utf8, IxdtfStringBuilder},
    provider::TimeZoneProvider,
    TemporalError, TemporalResult, TimeZone,
};
use alloc::string::String;
use core::{cmp::Ordering, fmt, str::FromStr};
use tinystr::TinyAsciiStr;

/// A partial PlainDate that may or may not be complete.
///
/// The fields are resolved against `calendar`. A year may be given either as
/// the arithmetic `year` or as an `era` and `era_year` pair.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PartialDate {
    // A potentially set `year` field.
    pub year: Option<i32>,
    // A potentially set `month` field.
    pub month: Option<u8>,
    // A potentially set `month_code` field.
    pub month_code: Option<MonthCode>,
    // A potentially set `day` field.
    pub day: Option<u8>,
    // A potentially set `era` field.
    pub era: Option<TinyAsciiStr<16>>,
    // A potentially set `era_year` field.
    pub era_year: Option<i32>,
    /// The calendar the fields are resolved in.
    pub calendar: Calendar,
}

impl PartialDate {
    /// Returns whether no date field is set.
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && self.month.is_none()
            && self.month_code.is_none()
            && self.day.is_none()
            && self.era.is_none()
            && self.era_year.is_none()
    }

    pub const fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }
}

impl From<&PlainDate> for PartialDate {
    fn from(date: &PlainDate) -> Self {
        let fields = date.calendar.fields(&date.iso);
        Self {
            year: Some(fields.year),
            month: Some(fields.month),
            month_code: Some(fields.month_code),
            day: Some(fields.day),
            era: date.era(),
            era_year: date.era_year(),
            calendar: date.calendar,
        }
    }
}

/// A calendar date without a time or a time zone.
///
/// The date is stored as an ISO date and every calendar field is computed
/// through its [`Calendar`].
///
/// ```rust
/// use temporal_engine::{Calendar, Duration, PlainDate};
/// use core::str::FromStr;
///
/// let date = PlainDate::try_new(2024, 1, 31, Calendar::default()).unwrap();
/// let later = date.add(&Duration::from_str("P1M").unwrap(), None).unwrap();
/// assert_eq!(later.to_string(), "2024-02-29");
///
/// let hebrew = PlainDate::from_str("2024-03-15[u-ca=hebrew]").unwrap();
/// assert_eq!(hebrew.month_code().as_str(), "M06");
/// ```
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainDate {
    pub(crate) iso: IsoDate,
    calendar: Calendar,
}

impl fmt::Display for PlainDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

// ==== Private API ====

impl PlainDate {
    /// Create a new `PlainDate` with the date values and calendar slot.
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    pub(crate) fn add_duration_to_date(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        let date_duration = duration.to_date_duration_record_without_time()?;
        self.calendar
            .date_add(&self.iso, &date_duration, overflow.unwrap_or_default())
    }

    pub(crate) fn diff_date(
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
            UnitGroup::Date,
            Unit::Day,
            Unit::Day,
        )?;

        if self.iso == other.iso {
            return Ok(Duration::default());
        }

        let date_duration = self
            .calendar
            .date_until(&self.iso, &other.iso, resolved.largest_unit)?;
        let mut duration = InternalDurationRecord::from_date_duration(date_duration)?;

        // Rounding to a single day is a no-op.
        if resolved.smallest_unit != Unit::Day || resolved.increment.get() != 1 {
            let origin = RelativeOrigin {
                iso: IsoDateTime::new_unchecked(self.iso, IsoTime::default()),
                calendar: &self.calendar,
            };
            duration = duration.round_relative_duration(
                IsoDateTime::new_unchecked(other.iso, IsoTime::default()).as_nanoseconds().0,
                &origin,
                None,
                resolved,
            )?;
        }

        let result = Duration::from_internal(duration, Unit::Day)?;
        match op {
            DifferenceOperation::Until => Ok(result),
            DifferenceOperation::Since => Ok(result.negated()),
        }
    }
}

// ==== Public API ====

impl PlainDate {
    /// Creates a new `PlainDate`, constraining any field that is out of range.
    #[inline]
    pub fn new(year: i32, month: u8, day: u8, calendar: Calendar) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, day, calendar, Overflow::Constrain)
    }

    /// Creates a new `PlainDate`, rejecting any field that is out of range.
    #[inline]
    pub fn try_new(year: i32, month: u8, day: u8, calendar: Calendar) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, day, calendar, Overflow::Reject)
    }

    /// Creates a new `PlainDate` from ISO fields with the provided overflow.
    ///
    /// This is the public facing `RegulateISODate`.
    #[inline]
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        day: u8,
        calendar: Calendar,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let iso = IsoDate::new_with_overflow(year, month, day, overflow)?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates a `PlainDate` from the calendar fields of a `PartialDate`.
    ///
    /// ```rust
    /// use temporal_engine::{partial::PartialDate, PlainDate};
    ///
    /// let partial = PartialDate {
    ///     year: Some(2000),
    ///     month: Some(13),
    ///     day: Some(2),
    ///     ..Default::default()
    /// };
    ///
    /// let date = PlainDate::from_partial(partial, None).unwrap();
    /// assert_eq!(date.month(), 12);
    /// assert_eq!(date.day(), 2);
    /// ```
    pub fn from_partial(partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        let has_year = partial.year.is_some() || partial.era_year.is_some();
        let has_month = partial.month.is_some() || partial.month_code.is_some();
        if !has_year || !has_month || partial.day.is_none() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::RequiredFieldMissing));
        }
        partial
            .calendar
            .date_from_partial(&partial, overflow.unwrap_or_default())
    }

    /// Converts a UTF-16 encoded string into a `PlainDate`.
    pub fn from_utf16(source: &[u16]) -> TemporalResult<Self> {
        Self::from_utf8(utf16_to_utf8(source)?.as_bytes())
    }

    /// Converts a UTF-8 encoded string into a `PlainDate`.
    pub fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let parsed = ParsedDate::from_utf8(source)?;
        Self::try_new(
            parsed.record.year,
            parsed.record.month,
            parsed.record.day,
            parsed.calendar,
        )
    }

    /// Creates a new `PlainDate` with the fields of `partial` merged over this date's fields.
    pub fn with(&self, partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }
        let merged = self.merge_fields(&partial);
        self.calendar
            .date_from_partial(&merged, overflow.unwrap_or_default())
    }

    /// Creates a new `PlainDate` from the current `PlainDate` and the provided calendar.
    #[inline]
    #[must_use]
    pub fn with_calendar(&self, calendar: Calendar) -> Self {
        Self::new_unchecked(self.iso, calendar)
    }

    /// Returns a reference to this `PlainDate`'s calendar.
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Compares the ISO dates of two `PlainDate`s.
    ///
    /// `PlainDate` does not implement `Ord`, since two dates with equal ISO
    /// fields but different calendars are not equal.
    #[inline]
    #[must_use]
    pub fn compare_iso(&self, other: &Self) -> Ordering {
        self.iso.cmp(&other.iso)
    }

    /// Adds a [`Duration`] to the current `PlainDate`.
    ///
    /// Time fields are balanced into whole days first.
    #[inline]
    pub fn add(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        self.add_duration_to_date(duration, overflow)
    }

    /// Subtracts a [`Duration`] from the current `PlainDate`.
    #[inline]
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.add_duration_to_date(&duration.negated(), overflow)
    }

    /// Returns the [`Duration`] from this `PlainDate` until `other`.
    #[inline]
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_date(DifferenceOperation::Until, other, settings)
    }

    /// Returns the [`Duration`] from `other` until this `PlainDate`.
    #[inline]
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff_date(DifferenceOperation::Since, other, settings)
    }
}

// ==== Calendar-derived Public API ====

impl PlainDate {
    /// Returns the calendar year value.
    pub fn year(&self) -> i32 {
        self.calendar.year(&self.iso)
    }

    /// Returns the calendar month value.
    pub fn month(&self) -> u8 {
        self.calendar.month(&self.iso)
    }

    /// Returns the calendar month code value.
    pub fn month_code(&self) -> MonthCode {
        self.calendar.month_code(&self.iso)
    }

    /// Returns the calendar day value.
    pub fn day(&self) -> u8 {
        self.calendar.day(&self.iso)
    }

    pub fn day_of_week(&self) -> u16 {
        self.calendar.day_of_week(&self.iso)
    }

    pub fn day_of_year(&self) -> u16 {
        self.calendar.day_of_year(&self.iso)
    }

    pub fn week_of_year(&self) -> Option<u8> {
        self.calendar.week_of_year(&self.iso)
    }

    pub fn year_of_week(&self) -> Option<i32> {
        self.calendar.year_of_week(&self.iso)
    }

    pub fn days_in_week(&self) -> u16 {
        self.calendar.days_in_week(&self.iso)
    }

    pub fn days_in_month(&self) -> u16 {
        self.calendar.days_in_month(&self.iso)
    }

    pub fn days_in_year(&self) -> u16 {
        self.calendar.days_in_year(&self.iso)
    }

    pub fn months_in_year(&self) -> u16 {
        self.calendar.months_in_year(&self.iso)
    }

    /// Returns whether the `PlainDate` is in a leap year for its calendar.
    pub fn in_leap_year(&self) -> bool {
        self.calendar.in_leap_year(&self.iso)
    }

    /// Returns the era of the `PlainDate`, for calendars with eras.
    pub fn era(&self) -> Option<TinyAsciiStr<16>> {
        self.calendar.era(&self.iso)
    }

    /// Returns the year within the era of the `PlainDate`.
    pub fn era_year(&self) -> Option<i32> {
        self.calendar.era_year(&self.iso)
    }
}

// ==== ToX Methods ====

impl PlainDate {
    /// Converts the current `PlainDate` into a [`PlainDateTime`].
    ///
    /// A missing time defaults to midnight.
    #[inline]
    pub fn to_plain_date_time(&self, time: Option<PlainTime>) -> TemporalResult<PlainDateTime> {
        let time = time.unwrap_or_default();
        let iso = IsoDateTime::new(self.iso, time.iso)?;
        Ok(PlainDateTime::new_unchecked(iso, self.calendar))
    }

    /// Converts the current `PlainDate` into a [`PlainYearMonth`].
    #[inline]
    pub fn to_plain_year_month(&self) -> TemporalResult<PlainYearMonth> {
        let fields = self.calendar.fields(&self.iso);
        let partial = PartialDate {
            year: Some(fields.year),
            month_code: Some(fields.month_code),
            calendar: self.calendar,
            ..Default::default()
        };
        self.calendar
            .year_month_from_partial(&partial, Overflow::Constrain)
    }

    /// Converts the current `PlainDate` into a [`PlainMonthDay`].
    #[inline]
    pub fn to_plain_month_day(&self) -> TemporalResult<PlainMonthDay> {
        let fields = self.calendar.fields(&self.iso);
        let partial = PartialDate {
            month_code: Some(fields.month_code),
            day: Some(fields.day),
            calendar: self.calendar,
            ..Default::default()
        };
        self.calendar
            .month_day_from_partial(&partial, Overflow::Constrain)
    }

    /// Creates a [`ZonedDateTime`] from this date in `time_zone`.
    ///
    /// Without a time, the result is the start of the day in `time_zone`.
    pub fn to_zoned_date_time_with_provider(
        &self,
        time_zone: TimeZone,
        plain_time: Option<PlainTime>,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<ZonedDateTime> {
        let epoch_ns = match plain_time {
            Some(time) => {
                let iso = IsoDateTime::new(self.iso, time.iso)?;
                time_zone.get_epoch_nanoseconds_for(iso, Disambiguation::Compatible, provider)?
            }
            None => time_zone.get_start_of_day(&self.iso, provider)?,
        };
        Ok(ZonedDateTime::new_unchecked(
            epoch_ns,
            self.calendar,
            time_zone,
        ))
    }

    /// Returns the IXDTF string of this date.
    #[inline]
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        IxdtfStringBuilder::default()
            .with_date(self.iso)
            .with_calendar(self.calendar.identifier(), display_calendar)
            .build()
    }
}

impl PlainDate {
    /// A month or month code in `partial` replaces both month fields, and any
    /// year field replaces all year fields.
    pub(crate) fn merge_fields(&self, partial: &PartialDate) -> PartialDate {
        let fields = self.calendar.fields(&self.iso);
        let (month, month_code) = match (partial.month, partial.month_code) {
            (None, None) => (Some(fields.month), Some(fields.month_code)),
            provided => provided,
        };
        let (year, era, era_year) = match (partial.year, partial.era, partial.era_year) {
            (None, None, None) => (Some(fields.year), None, None),
            // An era year on its own stays in the current era.
            (None, None, Some(era_year)) => (None, self.era(), Some(era_year)),
            provided => provided,
        };
        PartialDate {
            year,
            month,
            month_code,
            day: partial.day.or(Some(fields.day)),
            era,
            era_year,
            calendar: self.calendar,
        }
    }
}

// ==== Trait impls ====

impl From<PlainDateTime> for PlainDate {
    fn from(value: PlainDateTime) -> Self {
        value.to_plain_date()
    }
}

impl FromStr for PlainDate {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::RoundingMode;

    fn iso(year: i32, month: u8, day: u8) -> PlainDate {
        PlainDate::try_new(year, month, day, Calendar::default()).unwrap()
    }

    #[test]
    fn new_with_overflow() {
        let constrained =
            PlainDate::new_with_overflow(2025, 2, 30, Calendar::ISO, Overflow::Constrain).unwrap();
        assert_eq!(constrained, iso(2025, 2, 28));

        let leap =
            PlainDate::new_with_overflow(2024, 2, 30, Calendar::ISO, Overflow::Constrain).unwrap();
        assert_eq!(leap, iso(2024, 2, 29));

        let err = PlainDate::new_with_overflow(2025, 2, 30, Calendar::ISO, Overflow::Reject)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        assert!(PlainDate::try_new(275760, 9, 13, Calendar::ISO).is_ok());
        assert!(PlainDate::try_new(275760, 9, 14, Calendar::ISO).is_err());
        assert!(PlainDate::try_new(-271821, 4, 19, Calendar::ISO).is_ok());
        assert!(PlainDate::try_new(-271821, 4, 18, Calendar::ISO).is_err());
    }

    #[test]
    fn add_constrains_to_month_end() {
        let date = iso(2024, 1, 31);
        let month = Duration::from_str("P1M").unwrap();
        assert_eq!(date.add(&month, None).unwrap(), iso(2024, 2, 29));

        let err = date.add(&month, Some(Overflow::Reject)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        // Whole days of the time part are applied, the rest is dropped.
        let hours = Duration::from_str("PT49H").unwrap();
        assert_eq!(date.add(&hours, None).unwrap(), iso(2024, 2, 2));
        assert_eq!(date.subtract(&hours, None).unwrap(), iso(2024, 1, 29));
    }

    #[test]
    fn until_and_since() {
        let start = iso(2024, 1, 15);
        let end = iso(2024, 3, 1);

        let days = start.until(&end, DifferenceSettings::default()).unwrap();
        assert_eq!(days.days(), 46);

        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Month),
            ..Default::default()
        };
        let months = start.until(&end, settings).unwrap();
        assert_eq!((months.months(), months.days()), (1, 15));

        // `since` measures from this date, so the month boundary differs.
        let since = end.since(&start, settings).unwrap();
        assert_eq!((since.months(), since.days()), (1, 17));
        let since = start.since(&end, settings).unwrap();
        assert_eq!((since.months(), since.days()), (-1, -15));
    }

    #[test]
    fn until_rounds_to_smallest_unit() {
        let start = iso(2024, 1, 1);
        let end = iso(2024, 2, 20);
        let settings = DifferenceSettings {
            smallest_unit: Some(Unit::Month),
            rounding_mode: Some(RoundingMode::HalfExpand),
            ..Default::default()
        };
        let result = start.until(&end, settings).unwrap();
        assert_eq!((result.months(), result.days()), (2, 0));

        let settings = DifferenceSettings {
            smallest_unit: Some(Unit::Month),
            ..Default::default()
        };
        let result = start.until(&end, settings).unwrap();
        assert_eq!((result.months(), result.days()), (1, 0));
    }

    #[test]
    fn add_until_round_trip() {
        let pairs = [
            (iso(2019, 1, 31), iso(2024, 8, 15)),
            (iso(2024, 8, 15), iso(2019, 1, 31)),
            (iso(2020, 2, 29), iso(2021, 2, 28)),
        ];
        for (a, b) in pairs {
            for unit in [Unit::Year, Unit::Month, Unit::Week, Unit::Day] {
                let settings = DifferenceSettings {
                    largest_unit: Some(unit),
                    smallest_unit: Some(Unit::Day),
                    ..Default::default()
                };
                let duration = a.until(&b, settings).unwrap();
                assert_eq!(a.add(&duration, None).unwrap(), b, "{unit}");
            }
        }
    }

    #[test]
    fn calendar_mismatch() {
        let one = iso(2024, 1, 1);
        let two = one.with_calendar(Calendar::HEBREW);
        let err = one.until(&two, DifferenceSettings::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CalendarMismatch);
        assert_ne!(one, two);
        assert_eq!(one.compare_iso(&two), Ordering::Equal);
    }

    #[test]
    fn with_fields() {
        let date = iso(2024, 5, 31);
        let result = date
            .with(
                PartialDate {
                    month: Some(6),
                    ..Default::default()
                },
                None,
            )
            .unwrap();
        assert_eq!(result, iso(2024, 6, 30));

        let err = date
            .with(
                PartialDate {
                    month: Some(6),
                    ..Default::default()
                },
                Some(Overflow::Reject),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        let err = date.with(PartialDate::default(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
    }

    #[test]
    fn from_partial_requires_fields() {
        let err = PlainDate::from_partial(
            PartialDate {
                year: Some(2024),
                day: Some(1),
                ..Default::default()
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
    }

    #[test]
    fn string_round_trip() {
        for source in ["2024-03-15", "-000001-01-01", "+275760-09-13", "2024-03-15[u-ca=hebrew]"] {
            let date = PlainDate::from_str(source).unwrap();
            assert_eq!(date.to_string(), source);
            assert_eq!(PlainDate::from_str(&date.to_string()).unwrap(), date);
        }

        let date = PlainDate::from_str("2024-03-15T12:00:00+01:00[Europe/Paris]").unwrap();
        assert_eq!(date, iso(2024, 3, 15));
        assert_eq!(
            date.to_ixdtf_string(DisplayCalendar::Always),
            "2024-03-15[u-ca=iso8601]"
        );
        assert_eq!(
            date.to_ixdtf_string(DisplayCalendar::Critical),
            "2024-03-15[!u-ca=iso8601]"
        );

        assert!(PlainDate::from_str("2024-03-15Z").is_err());
        assert!(PlainDate::from_str("2024-02-30").is_err());
    }

    #[test]
    fn compare_is_a_total_order() {
        let dates = [
            iso(-271821, 4, 19),
            iso(1969, 12, 31),
            iso(2024, 2, 29),
            iso(2024, 3, 1),
            iso(2024, 3, 1).with_calendar(Calendar::JAPANESE),
            iso(275760, 9, 13),
        ];
        for a in &dates {
            assert_eq!(a.compare_iso(a), Ordering::Equal);
            for b in &dates {
                assert_eq!(a.compare_iso(b), b.compare_iso(a).reverse());
            }
        }
        // Calendars are ignored, only the ISO date is compared.
        assert_eq!(dates[3].compare_iso(&dates[4]), Ordering::Equal);
        assert_eq!(dates[4].compare_iso(&dates[2]), Ordering::Greater);
    }

    #[test]
    fn from_utf16() {
        let source: alloc::vec::Vec<u16> = "2024-03-15[u-ca=hebrew]".encode_utf16().collect();
        let date = PlainDate::from_utf16(&source).unwrap();
        assert_eq!(date, PlainDate::from_str("2024-03-15[u-ca=hebrew]").unwrap());

        let err = PlainDate::from_utf16(&[0xDC00]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn projections() {
        let date = iso(2024, 2, 29);
        let year_month = date.to_plain_year_month().unwrap();
        assert_eq!((year_month.year(), year_month.month()), (2024, 2));
        let month_day = date.to_plain_month_day().unwrap();
        assert_eq!(month_day.iso, IsoDate::new_unchecked(1972, 2, 29));

        let date_time = date.to_plain_date_time(None).unwrap();
        assert_eq!(date_time.hour(), 0);
        assert_eq!(PlainDate::from(date_time), date);
    }
}
