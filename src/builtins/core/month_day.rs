//! This module implements `PlainMonthDay` and any directly related algorithms.

use alloc::string::{String, ToString};
use core::{fmt, str::FromStr};

use crate::{
    builtins::core::{
        calendar::{Calendar, MonthCode},
        PartialDate, PlainDate,
    },
    error::ErrorMessage,
    iso::IsoDate,
    options::{DisplayCalendar, Overflow},
    parsed_intermediates::ParsedDate,
    parsers::{utf16_to_utf8, FormattableCalendar, FormattableDate, FormattableMonthDay},
    TemporalError, TemporalResult,
};

/// The ISO reference year of an ISO `PlainMonthDay`, chosen as a leap year.
const ISO_REFERENCE_YEAR: i32 = 1972;

/// A day of a calendar month, without a year.
///
/// The ISO date holds a reference year in which the month and day exist.
/// Two month-days are only equal when their reference years match.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlainMonthDay {
    pub(crate) iso: IsoDate,
    calendar: Calendar,
}

impl fmt::Display for PlainMonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ixdtf_string(DisplayCalendar::Auto))
    }
}

impl PlainMonthDay {
    /// Creates a new unchecked `PlainMonthDay`
    #[inline]
    #[must_use]
    pub(crate) const fn new_unchecked(iso: IsoDate, calendar: Calendar) -> Self {
        Self { iso, calendar }
    }

    /// Creates a new valid `PlainMonthDay` from ISO fields.
    ///
    /// The reference year defaults to 1972.
    #[inline]
    pub fn new_with_overflow(
        month: u8,
        day: u8,
        calendar: Calendar,
        overflow: Overflow,
        reference_year: Option<i32>,
    ) -> TemporalResult<Self> {
        let year = reference_year.unwrap_or(ISO_REFERENCE_YEAR);
        let iso = IsoDate::new_with_overflow(year, month, day, overflow)?;
        Ok(Self::new_unchecked(iso, calendar))
    }

    /// Creates a `PlainMonthDay` from a `PartialDate`.
    ///
    /// Calendars other than ISO need a `month_code`, or a year to resolve `month` in.
    ///
    /// ```rust
    /// use temporal_engine::{partial::PartialDate, PlainMonthDay};
    ///
    /// let partial = PartialDate {
    ///     month: Some(2),
    ///     day: Some(29),
    ///     ..Default::default()
    /// };
    /// let month_day = PlainMonthDay::from_partial(partial, None).unwrap();
    /// assert_eq!(month_day.to_string(), "02-29");
    /// ```
    pub fn from_partial(partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        partial
            .calendar
            .month_day_from_partial(&partial, overflow.unwrap_or_default())
    }

    /// Converts a UTF-16 encoded string into a `PlainMonthDay`.
    pub fn from_utf16(source: &[u16]) -> TemporalResult<Self> {
        Self::from_utf8(utf16_to_utf8(source)?.as_bytes())
    }

    /// Converts a UTF-8 encoded string into a `PlainMonthDay`.
    pub fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let parsed = ParsedDate::month_day_from_utf8(source)?;
        // A parsed year has already been checked against the day; ISO values
        // always take the reference year.
        if parsed.calendar.is_iso() {
            return Self::new_with_overflow(
                parsed.record.month,
                parsed.record.day,
                parsed.calendar,
                Overflow::Reject,
                None,
            );
        }
        let iso = IsoDate::new_with_overflow(
            parsed.record.year,
            parsed.record.month,
            parsed.record.day,
            Overflow::Reject,
        )?;
        // Canonicalize the reference year through the calendar.
        let fields = parsed.calendar.fields(&iso);
        let partial = PartialDate {
            month_code: Some(fields.month_code),
            day: Some(fields.day),
            calendar: parsed.calendar,
            ..Default::default()
        };
        parsed
            .calendar
            .month_day_from_partial(&partial, Overflow::Constrain)
    }

    /// Creates a new `PlainMonthDay` with the fields of `partial` merged over the
    /// current month code and day.
    ///
    /// A year in `partial` is only used to resolve the month and day.
    pub fn with(&self, partial: PartialDate, overflow: Option<Overflow>) -> TemporalResult<Self> {
        if partial.is_empty() {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::InvalidPartialRecord));
        }
        let (month, month_code) = match (partial.month, partial.month_code) {
            (None, None) => (None, Some(self.month_code())),
            provided => provided,
        };
        let merged = PartialDate {
            year: partial.year,
            month,
            month_code,
            day: partial.day.or(Some(self.day())),
            era: partial.era,
            era_year: partial.era_year,
            calendar: self.calendar,
        };
        self.calendar
            .month_day_from_partial(&merged, overflow.unwrap_or_default())
    }

    /// Returns the ISO day value of `PlainMonthDay`.
    #[inline]
    #[must_use]
    pub fn iso_day(&self) -> u8 {
        self.iso.day
    }

    /// Returns the ISO month value of `PlainMonthDay`.
    #[inline]
    #[must_use]
    pub fn iso_month(&self) -> u8 {
        self.iso.month
    }

    /// Returns the ISO reference year of `PlainMonthDay`.
    #[inline]
    #[must_use]
    pub fn iso_year(&self) -> i32 {
        self.iso.year
    }

    /// Returns a reference to `PlainMonthDay`'s inner `Calendar`.
    #[inline]
    #[must_use]
    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Returns the calendar `monthCode` value of `PlainMonthDay`.
    #[inline]
    pub fn month_code(&self) -> MonthCode {
        self.calendar.month_code(&self.iso)
    }

    /// Returns the calendar day value of `PlainMonthDay`.
    #[inline]
    pub fn day(&self) -> u8 {
        self.calendar.day(&self.iso)
    }

    /// Creates a `PlainDate` for this month and day in the calendar `year`.
    ///
    /// The year defaults to the calendar year of the reference date. A day that
    /// does not exist in `year` is constrained.
    pub fn to_plain_date(&self, year: Option<i32>) -> TemporalResult<PlainDate> {
        let fields = self.calendar.fields(&self.iso);
        let partial = PartialDate {
            year: Some(year.unwrap_or(fields.year)),
            month_code: Some(fields.month_code),
            day: Some(fields.day),
            calendar: self.calendar,
            ..Default::default()
        };
        self.calendar
            .date_from_partial(&partial, Overflow::Constrain)
    }

    /// Returns the IXDTF string of this `PlainMonthDay`.
    ///
    /// The reference year is written whenever the calendar annotation is
    /// required to read the value back.
    pub fn to_ixdtf_string(&self, display_calendar: DisplayCalendar) -> String {
        FormattableMonthDay {
            date: FormattableDate(self.iso.year, self.iso.month, self.iso.day),
            calendar: FormattableCalendar {
                show: display_calendar,
                calendar: self.calendar.identifier(),
            },
        }
        .to_string()
    }
}

impl FromStr for PlainMonthDay {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(s.as_bytes())
    }
}
