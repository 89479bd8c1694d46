//! This module implements `PlainYearMonth` and any directly related algorithms.

use alloc::string::{String, ToString};
use core::{cmp::Ordering, fmt, str::FromStr};

use tinystr::TinyAsciiStr;

use crate::{
    builtins::core::{
        calendar::{Calendar, MonthCode},
        duration::normalized::{InternalDurationRecord, RelativeOrigin},
        DateDuration, Duration, PartialDate, PlainDate,
    },
    error::ErrorMessage,
    iso::{year_month_within_limits, IsoDate, IsoDateTime, IsoTime},
    options::{
        DifferenceOperation, DifferenceSettings, DisplayCalendar, Overflow,
        ResolvedRoundingOptions, Unit, UnitGroup,
    },
    parsed_intermediates::ParsedDate,
    parsers::{utf16_to_utf8, FormattableCalendar, FormattableDate, FormattableYearMonth},
    Sign, TemporalError, TemporalResult,
};

/// A calendar month of a calendar year.
///
/// The ISO date is the reference day of the month: day 1 for calendars other
/// than ISO, and the provided reference day for ISO.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainYearMonth {
    pub(crate) iso: IsoDate,
    calendar: Calendar,
}

impl fmt::Display for PlainYearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

impl PlainYearMonth {
    /// Creates an unvalidated `PlainYearMonth`.
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Creates a `PlainYearMonth` from a resolved reference date, checking the year-month limits.
    pub(crate) fn new_from_iso(iso: IsoDate, calendar: Calendar) -> TemporalResult<Self> {
        if !year_month_within_limits(iso.year, iso.month) {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
        }
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Returns the first day of this month as a `PlainDate`.
    fn first_day(&self) -> TemporalResult<PlainDate> {
        self.to_plain_date(Some(1))
    }

    fn add_duration(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        let overflow = overflow.unwrap_or_default();
        let first_day = self.first_day()?;

        // A negative duration counts back from the last day of the month.
        let anchor = if duration.sign() == Sign::Negative {
            let next_month = self.calendar.date_add(
                &first_day.iso,
                &DateDuration::new(0, 1, 0, 0)?,
                Overflow::Constrain,
            )?;
            next_month.iso.add_days(-1)?
        } else {
            first_day.iso
        };

        let date_duration = duration.to_date_duration_record_without_time()?;
        let added = self.calendar.date_add(&anchor, &date_duration, overflow)?;

        let fields = self.calendar.fields(&added.iso);
        let partial = PartialDate {
            year: Some(fields.year),
            month_code: Some(fields.month_code),
            calendar: self.calendar,
            ..Default::default()
        };
        self.calendar.year_month_from_partial(&partial, overflow)
    }

    fn diff(
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
            Unit::Year,
            Unit::Month,
        )?;
        if resolved.smallest_unit < Unit::Month {
            return Err(TemporalError::range()
                .with_message("PlainYearMonth differences only use years and months."));
        }

        let this_date = self.first_day()?;
        let other_date = other.first_day()?;
        if this_date.iso == other_date.iso {
            return Ok(Duration::default());
        }

        let difference =
            self.calendar
                .date_until(&this_date.iso, &other_date.iso, resolved.largest_unit)?;
        let years_months = DateDuration::new(difference.years, difference.months, 0, 0)?;
        let mut duration = InternalDurationRecord::from_date_duration(years_months)?;

        if resolved.smallest_unit != Unit::Month || resolved.increment.get() != 1 {
            let origin = RelativeOrigin {
                iso: IsoDateTime::new_unchecked(this_date.iso, IsoTime::default()),
                calendar: &self.calendar,
            };
            duration = duration.round_relative_duration(
                IsoDateTime::new_unchecked(other_date.iso, IsoTime::default()).as_nanoseconds().0,
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

impl PlainYearMonth {
    /// Creates a new `PlainYearMonth` from ISO fields, constraining the month.
    #[inline]
    pub fn new(
        year: i32,
        month: u8,
        reference_day: Option<u8>,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, reference_day, calendar, Overflow::Constrain)
    }

    /// Creates a new `PlainYearMonth` from ISO fields, rejecting invalid fields.
    #[inline]
    pub fn try_new(
        year: i32,
        month: u8,
        reference_day: Option<u8>,
        calendar: Calendar,
    ) -> TemporalResult<Self> {
        Self::new_with_overflow(year, month, reference_day, calendar, Overflow::Reject)
    }

    /// Creates a new `PlainYearMonth` from ISO fields with the provided overflow.
    ///
    /// The reference day defaults to 1.
    pub fn new_with_overflow(
        year: i32,
        month: u8,
        reference_day: Option<u8>,
        calendar: Calendar,
        overflow: Overflow,
    ) -> TemporalResult<Self> {
        let day = reference_day.unwrap_or(1);
        let iso = IsoDate::regulate(year, month, day, overflow)?;
        Self::new_from_iso(iso, calendar)
    }

    /// Creates a `PlainYearMonth` from the year and month fields of a `PartialDate`.
    ///
    /// ```rust
    /// use temporal_engine::{partial::PartialDate, PlainYearMonth};
    ///
    /// let partial = PartialDate {
    ///     year: Some(2024),
    ///     month: Some(5),
    ///     ..Default::default()
    /// };
    /// let year_month = PlainYearMonth::from_partial(partial, None).unwrap();
    /// assert_eq!(year_month.to_string(), "2024-05");
    /// ```
    pub fn from_partial(partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        partial
            .calendar
            .year_month_from_partial(&partial, overflow.unwrap_or_default())
    }

    /// Converts a UTF-16 encoded string into a `PlainYearMonth`.
    pub fn from_utf16(source: &[u16]) -> TemporalResult<Self> {
        Self::from_utf8(utf16_to_utf8(source)?.as_bytes())
    }

    /// Converts a UTF-8 encoded string into a `PlainYearMonth`.
    pub fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let parsed = ParsedDate::year_month_from_utf8(source)?;
        let iso = IsoDate::regulate(
            parsed.record.year,
            parsed.record.month,
            parsed.record.day,
            Overflow::Reject,
        )?;
        if !year_month_within_limits(iso.year, iso.month) {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
        }
        // Canonicalize the reference day through the calendar.
        let fields = parsed.calendar.fields(&iso);
        let partial = PartialDate {
            year: Some(fields.year),
            month_code: Some(fields.month_code),
            calendar: parsed.calendar,
            ..Default::default()
        };
        parsed
            .calendar
            .year_month_from_partial(&partial, Overflow::Constrain)
    }

    /// Creates a new `PlainYearMonth` with the year and month fields of `partial`
    /// merged over the current fields.
    pub fn with(&self, partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        let has_fields = partial.year.is_some()
            || partial.month.is_some()
            || partial.month_code.is_some()
            || partial.era.is_some()
            || partial.era_year.is_some();
        if !has_fields {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }
        let merged = PlainDate::new_unchecked(self.iso, self.calendar).merge_fields(&partial);
        self.calendar
            .year_month_from_partial(&merged, overflow.unwrap_or_default())
    }

    /// Returns the ISO year of the reference date.
    #[inline]
    #[must_use]
    pub fn iso_year(&self) -> i32 {
        self.iso.year
    }

    /// Returns the ISO month of the reference date.
    #[inline]
    #[must_use]
    pub fn iso_month(&self) -> u8 {
        self.iso.month
    }

    /// Returns the Calendar value.
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn year(&self) -> i32 {
        self.calendar.year(&self.iso)
    }

    pub fn month(&self) -> u8 {
        self.calendar.month(&self.iso)
    }

    pub fn month_code(&self) -> MonthCode {
        self.calendar.month_code(&self.iso)
    }

    pub fn in_leap_year(&self) -> bool {
        self.calendar.in_leap_year(&self.iso)
    }

    pub fn days_in_year(&self) -> u16 {
        self.calendar.days_in_year(&self.iso)
    }

    pub fn days_in_month(&self) -> u16 {
        self.calendar.days_in_month(&self.iso)
    }

    pub fn months_in_year(&self) -> u16 {
        self.calendar.months_in_year(&self.iso)
    }

    pub fn era(&self) -> Option<TinyAsciiStr<16>> {
        self.calendar.era(&self.iso)
    }

    pub fn era_year(&self) -> Option<i32> {
        self.calendar.era_year(&self.iso)
    }

    /// Compares the ISO reference dates of two `PlainYearMonth`s.
    #[inline]
    #[must_use]
    pub fn compare_iso(&self, other: &Self) -> Ordering {
        self.iso.cmp(&other.iso)
    }

    /// Adds a `Duration`, counting from the first day of the month.
    pub fn add(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        self.add_duration(duration, overflow)
    }

    /// Subtracts a `Duration`, counting back from the last day of the month.
    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.add_duration(&duration.negated(), overflow)
    }

    /// Returns the years and months from this `PlainYearMonth` until `other`.
    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Until, other, settings)
    }

    /// Returns the years and months from `other` until this `PlainYearMonth`.
    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.diff(DifferenceOperation::Since, other, settings)
    }

    /// Creates a `PlainDate` on `day` of this month, constraining the day.
    ///
    /// The day defaults to 1.
    pub fn to_plain_date(&self, day: Option<u8>) -> TemporalResult<PlainDate> {
        let fields = self.calendar.fields(&self.iso);
        let partial = PartialDate {
            year: Some(fields.year),
            month_code: Some(fields.month_code),
            day: Some(day.unwrap_or(1)),
            calendar: self.calendar,
            ..Default::default()
        };
        self.calendar
            .date_from_partial(&partial, Overflow::Constrain)
    }

    /// Returns the IXDTF string of this `PlainYearMonth`.
    ///
    /// The reference day is written whenever the calendar annotation is
    /// required to read the value back.
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        FormattableYearMonth {
            date: FormattableDate(self.iso.year, self.iso.month, self.iso.day),
            calendar: FormattableCalendar {
                show: display_calendar,
                calendar: self.calendar.identifier(),
            },
        }
        .to_string()
    }
}

impl FromStr for PlainYearMonth {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use core::{cmp::Ordering, str::FromStr};

    use super::PlainYearMonth;
    use crate::{
        builtins::core::{calendar::Calendar, Duration, PartialDate, PlainDate},
        error::ErrorKind,
        options::{DifferenceSettings, DisplayCalendar, Overflow, RoundingMode, Unit},
    };

    fn year_month(s: &str) -> PlainYearMonth {
        PlainYearMonth::from_str(s).unwrap()
    }

    #[test]
    fn compare_is_a_total_order() {
        let values = [
            year_month("-271821-04"),
            year_month("2024-02"),
            year_month("2024-03"),
            year_month("2024-03-01[u-ca=hebrew]"),
            year_month("+275760-09"),
        ];
        for a in &values {
            assert_eq!(a.compare_iso(a), Ordering::Equal);
            for b in &values {
                assert_eq!(a.compare_iso(b), b.compare_iso(a).reverse());
            }
        }
        assert_eq!(values[1].compare_iso(&values[2]), Ordering::Less);
        assert_eq!(values[4].compare_iso(&values[3]), Ordering::Greater);
    }

    #[test]
    fn construction_and_limits() {
        let constrained = PlainYearMonth::new(2024, 13, None, Calendar::ISO).unwrap();
        assert_eq!(constrained.to_string(), "2024-12");
        assert!(PlainYearMonth::try_new(2024, 13, None, Calendar::ISO).is_err());

        assert!(PlainYearMonth::from_str("-271821-04").is_ok());
        assert!(PlainYearMonth::from_str("-271821-03").is_err());
        assert!(PlainYearMonth::from_str("+275760-09").is_ok());
        assert!(PlainYearMonth::from_str("+275760-10").is_err());

        let err = PlainYearMonth::new_with_overflow(
            -271_821,
            3,
            None,
            Calendar::ISO,
            Overflow::Constrain,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn add_anchors_at_first_day() {
        let start = year_month("2019-11");
        let result = start.add(&Duration::from_str("P2M").unwrap(), None).unwrap();
        assert_eq!(result.to_string(), "2020-01");

        let result = year_month("2020-01")
            .add(&Duration::from_str("P1M45D").unwrap(), None)
            .unwrap();
        assert_eq!(result.to_string(), "2020-03");
    }

    #[test]
    fn subtract_anchors_at_last_day() {
        let march = year_month("2020-03");
        let result = march
            .subtract(&Duration::from_str("P1D").unwrap(), None)
            .unwrap();
        assert_eq!(result.to_string(), "2020-03");

        let result = march
            .subtract(&Duration::from_str("P31D").unwrap(), None)
            .unwrap();
        assert_eq!(result.to_string(), "2020-02");

        let result = year_month("2020-01")
            .subtract(&Duration::from_str("P1M").unwrap(), None)
            .unwrap();
        assert_eq!(result.to_string(), "2019-12");
    }

    #[test]
    fn until_and_since() {
        let earlier = year_month("2019-03");
        let later = year_month("2021-07");

        let result = earlier.until(&later, DifferenceSettings::default()).unwrap();
        assert_eq!((result.years(), result.months()), (2, 4));

        let result = later.since(&earlier, DifferenceSettings::default()).unwrap();
        assert_eq!((result.years(), result.months()), (2, 4));

        let settings = DifferenceSettings {
            largest_unit: Some(Unit::Month),
            ..Default::default()
        };
        let result = earlier.until(&later, settings).unwrap();
        assert_eq!((result.years(), result.months()), (0, 28));

        let settings = DifferenceSettings {
            smallest_unit: Some(Unit::Year),
            rounding_mode: Some(RoundingMode::Ceil),
            ..Default::default()
        };
        let result = earlier.until(&later, settings).unwrap();
        assert_eq!((result.years(), result.months()), (3, 0));

        let settings = DifferenceSettings {
            smallest_unit: Some(Unit::Day),
            ..Default::default()
        };
        assert!(earlier.until(&later, settings).is_err());

        let same = earlier.until(&earlier, DifferenceSettings::default()).unwrap();
        assert!(same.is_zero());
    }

    #[test]
    fn with_and_partial() {
        let start = year_month("2024-05");
        let partial = PartialDate {
            month: Some(2),
            ..Default::default()
        };
        assert_eq!(start.with(partial, None).unwrap().to_string(), "2024-02");

        let partial = PartialDate {
            day: Some(2),
            ..Default::default()
        };
        let err = start.with(partial, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);

        let partial = PartialDate {
            month: Some(5),
            ..Default::default()
        };
        let err = PlainYearMonth::from_partial(partial, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidField);
    }

    #[test]
    fn to_plain_date_constrains_day() {
        let february = year_month("2024-02");
        assert_eq!(
            february.to_plain_date(Some(31)).unwrap(),
            PlainDate::try_new(2024, 2, 29, Calendar::ISO).unwrap()
        );
        assert_eq!(february.to_plain_date(None).unwrap().day(), 1);
        assert_eq!(february.days_in_month(), 29);
    }

    #[test]
    fn formatting() {
        let ym = year_month("2024-05-17");
        assert_eq!(ym.to_string(), "2024-05");
        assert_eq!(
            ym.to_ixdtf_string(DisplayCalendar::Always),
            "2024-05-01[u-ca=iso8601]"
        );
        assert_eq!(
            ym.to_ixdtf_string(DisplayCalendar::Critical),
            "2024-05-01[!u-ca=iso8601]"
        );

        // Adar II 5784 starts on 2024-03-11.
        let hebrew = PlainDate::from_str("2024-03-15[u-ca=hebrew]")
            .unwrap()
            .to_plain_year_month()
            .unwrap();
        assert_eq!(hebrew.month_code().as_str(), "M06");
        assert_eq!(hebrew.to_string(), "2024-03-11[u-ca=hebrew]");
        assert_eq!(PlainYearMonth::from_str(&hebrew.to_string()).unwrap(), hebrew);
    }
}
