//! `Writeable` building blocks for IXDTF and ISO 8601 duration strings.

use crate::{
    iso::{IsoDate, IsoTime},
    options::{DisplayCalendar, DisplayOffset, DisplayTimeZone, Precision},
    Sign,
};
use alloc::string::String;
use writeable::{impl_display_with_writeable, LengthHint, Writeable};

/// Assembles an IXDTF string from its optional parts.
///
/// Parts are always written in grammar order regardless of the order the
/// builder methods are called in.
#[derive(Debug, Default)]
pub struct IxdtfStringBuilder<'a> {
    inner: FormattableIxdtf<'a>,
}

impl<'a> IxdtfStringBuilder<'a> {
    pub fn with_date(mut self, iso: IsoDate) -> Self {
        self.inner.date = Some(FormattableDate(iso.year, iso.month, iso.day));
        self
    }

    pub fn with_time(mut self, time: IsoTime, precision: Precision) -> Self {
        self.inner.time = Some(FormattableTime::from_iso(time, precision));
        self
    }

    /// Adds a numeric UTC offset, written with seconds and a fraction only when
    /// the offset is not minute aligned.
    pub fn with_offset_nanoseconds(mut self, offset: i64, show: DisplayOffset) -> Self {
        self.inner.utc_offset = Some(FormattableUtcOffset {
            show,
            offset: OffsetDesignator::Offset(FormattableOffset::from_nanoseconds(offset)),
        });
        self
    }

    pub fn with_z(mut self, show: DisplayOffset) -> Self {
        self.inner.utc_offset = Some(FormattableUtcOffset {
            show,
            offset: OffsetDesignator::Z,
        });
        self
    }

    pub fn with_timezone(mut self, timezone: &'a str, show: DisplayTimeZone) -> Self {
        self.inner.timezone = Some(FormattableTimeZone { show, timezone });
        self
    }

    pub fn with_calendar(mut self, calendar: &'static str, show: DisplayCalendar) -> Self {
        self.inner.calendar = Some(FormattableCalendar { show, calendar });
        self
    }

    pub fn build(self) -> String {
        self.inner.write_to_string().into_owned()
    }
}

impl Writeable for IxdtfStringBuilder<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        self.inner.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        self.inner.writeable_length_hint()
    }
}

impl_display_with_writeable!(IxdtfStringBuilder<'_>);
impl_display_with_writeable!(FormattableIxdtf<'_>);
impl_display_with_writeable!(FormattableMonthDay<'_>);
impl_display_with_writeable!(FormattableYearMonth<'_>);
impl_display_with_writeable!(FormattableDuration);
impl_display_with_writeable!(FormattableDate);
impl_display_with_writeable!(FormattableTime);
impl_display_with_writeable!(FormattableUtcOffset);
impl_display_with_writeable!(FormattableOffset);
impl_display_with_writeable!(FormattableTimeZone<'_>);
impl_display_with_writeable!(FormattableCalendar<'_>);

// ==== Time and offsets ====

/// A wall-clock time with a sub-second fraction in nanoseconds.
#[derive(Debug, Clone, Copy)]
pub struct FormattableTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
    pub precision: Precision,
    pub include_sep: bool,
}

impl FormattableTime {
    pub(crate) fn from_iso(time: IsoTime, precision: Precision) -> Self {
        let nanosecond = u32::from(time.millisecond) * 1_000_000
            + u32::from(time.microsecond) * 1_000
            + u32::from(time.nanosecond);
        Self {
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            nanosecond,
            precision,
            include_sep: true,
        }
    }

    fn omits_fraction(&self) -> bool {
        self.precision == Precision::Digit(0)
            || (self.precision == Precision::Auto && self.nanosecond == 0)
    }
}

impl Writeable for FormattableTime {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_padded_u8(self.hour, sink)?;
        if self.include_sep {
            sink.write_char(':')?;
        }
        write_padded_u8(self.minute, sink)?;
        if self.precision == Precision::Minute {
            return Ok(());
        }
        if self.include_sep {
            sink.write_char(':')?;
        }
        write_padded_u8(self.second, sink)?;
        if self.omits_fraction() {
            return Ok(());
        }
        sink.write_char('.')?;
        write_nanosecond(self.nanosecond, self.precision, sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let sep = usize::from(self.include_sep);
        if self.precision == Precision::Minute {
            return LengthHint::exact(4 + sep);
        }
        let base = 6 + sep * 2;
        match self.precision {
            _ if self.omits_fraction() => LengthHint::exact(base),
            Precision::Digit(d) => LengthHint::exact(base + 1 + usize::from(d.min(9))),
            _ => LengthHint::between(base + 2, base + 10),
        }
    }
}

/// Either the `Z` designator or a numeric offset.
#[derive(Debug, Clone, Copy)]
pub enum OffsetDesignator {
    Z,
    Offset(FormattableOffset),
}

#[derive(Debug, Clone, Copy)]
pub struct FormattableUtcOffset {
    pub show: DisplayOffset,
    pub offset: OffsetDesignator,
}

impl Writeable for FormattableUtcOffset {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.show == DisplayOffset::Never {
            return Ok(());
        }
        match &self.offset {
            OffsetDesignator::Z => sink.write_char('Z'),
            OffsetDesignator::Offset(offset) => offset.write_to(sink),
        }
    }

    fn writeable_length_hint(&self) -> LengthHint {
        match &self.offset {
            _ if self.show == DisplayOffset::Never => LengthHint::exact(0),
            OffsetDesignator::Z => LengthHint::exact(1),
            OffsetDesignator::Offset(o) => o.writeable_length_hint(),
        }
    }
}

/// A signed UTC offset such as `+05:30` or `-00:44:30`.
#[derive(Debug, Clone, Copy)]
pub struct FormattableOffset {
    pub sign: Sign,
    pub time: FormattableTime,
}

impl FormattableOffset {
    /// Creates an offset from a signed nanosecond count, using minute precision
    /// when the offset has no seconds.
    pub(crate) fn from_nanoseconds(offset: i64) -> Self {
        let sign = if offset < 0 {
            Sign::Negative
        } else {
            Sign::Positive
        };
        let abs = offset.unsigned_abs();
        let nanosecond = (abs % 1_000_000_000) as u32;
        let seconds = abs / 1_000_000_000;
        let precision = if nanosecond == 0 && seconds % 60 == 0 {
            Precision::Minute
        } else {
            Precision::Auto
        };
        Self {
            sign,
            time: FormattableTime {
                hour: (seconds / 3600) as u8,
                minute: ((seconds / 60) % 60) as u8,
                second: (seconds % 60) as u8,
                nanosecond,
                precision,
                include_sep: true,
            },
        }
    }
}

impl Writeable for FormattableOffset {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        match self.sign {
            Sign::Negative => sink.write_char('-')?,
            _ => sink.write_char('+')?,
        }
        self.time.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        self.time.writeable_length_hint() + 1
    }
}

// ==== Digit helpers ====

fn write_padded_u8<W: core::fmt::Write + ?Sized>(num: u8, sink: &mut W) -> core::fmt::Result {
    if num < 10 {
        sink.write_char('0')?;
    }
    num.write_to(sink)
}

/// Writes a nine digit fraction, trimmed to `precision` digits or to its last
/// nonzero digit for `Precision::Auto`.
fn write_nanosecond<W: core::fmt::Write + ?Sized>(
    nanoseconds: u32,
    precision: Precision,
    sink: &mut W,
) -> core::fmt::Result {
    let (digits, significant) = u32_to_digits(nanoseconds);
    let count = match precision {
        Precision::Digit(digit) if digit <= 9 => usize::from(digit),
        _ => significant,
    };
    write_digits(&digits[..count], sink)
}

/// Splits a value below 10^9 into nine decimal digits, returning the count of
/// digits up to and including the last nonzero one.
fn u32_to_digits(mut value: u32) -> ([u8; 9], usize) {
    let mut output = [0; 9];
    let mut significant = 0;
    for (i, out) in output.iter_mut().enumerate().rev() {
        let digit = (value % 10) as u8;
        value /= 10;
        if significant == 0 && digit != 0 {
            significant = i + 1;
        }
        *out = digit;
    }
    (output, significant)
}

fn write_digits<W: core::fmt::Write + ?Sized>(digits: &[u8], sink: &mut W) -> core::fmt::Result {
    digits.iter().try_for_each(|digit| digit.write_to(sink))
}

// ==== Dates ====

/// An ISO year, month and day.
#[derive(Debug, Clone, Copy)]
pub struct FormattableDate(pub i32, pub u8, pub u8);

impl Writeable for FormattableDate {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_year(self.0, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.1, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.2, sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        LengthHint::exact(6 + year_length(self.0))
    }
}

const fn year_length(year: i32) -> usize {
    if 0 <= year && year <= 9999 {
        4
    } else {
        7
    }
}

/// Writes a four digit year, or a signed six digit year outside `0..=9999`.
fn write_year<W: core::fmt::Write + ?Sized>(year: i32, sink: &mut W) -> core::fmt::Result {
    if (0..=9999).contains(&year) {
        let (digits, _) = u32_to_digits(year as u32);
        return write_digits(&digits[5..], sink);
    }
    sink.write_char(if year < 0 { '-' } else { '+' })?;
    let (digits, _) = u32_to_digits(year.unsigned_abs());
    write_digits(&digits[3..], sink)
}

#[derive(Debug, Clone, Copy)]
pub struct FormattableTimeZone<'a> {
    pub show: DisplayTimeZone,
    pub timezone: &'a str,
}

impl Writeable for FormattableTimeZone<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.show == DisplayTimeZone::Never {
            return Ok(());
        }
        sink.write_char('[')?;
        if self.show == DisplayTimeZone::Critical {
            sink.write_char('!')?;
        }
        sink.write_str(self.timezone)?;
        sink.write_char(']')
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if self.show == DisplayTimeZone::Never {
            return LengthHint::exact(0);
        }
        let critical = usize::from(self.show == DisplayTimeZone::Critical);
        LengthHint::exact(2 + critical + self.timezone.len())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FormattableCalendar<'a> {
    pub show: DisplayCalendar,
    pub calendar: &'a str,
}

impl FormattableCalendar<'_> {
    fn is_hidden(&self) -> bool {
        self.show == DisplayCalendar::Never
            || (self.show == DisplayCalendar::Auto && self.calendar == "iso8601")
    }

    /// Whether a year-month or month-day must carry its reference field.
    fn requires_reference(&self) -> bool {
        matches!(
            self.show,
            DisplayCalendar::Always | DisplayCalendar::Critical
        ) || self.calendar != "iso8601"
    }
}

impl Writeable for FormattableCalendar<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.is_hidden() {
            return Ok(());
        }
        sink.write_char('[')?;
        if self.show == DisplayCalendar::Critical {
            sink.write_char('!')?;
        }
        sink.write_str("u-ca=")?;
        sink.write_str(self.calendar)?;
        sink.write_char(']')
    }

    fn writeable_length_hint(&self) -> LengthHint {
        if self.is_hidden() {
            return LengthHint::exact(0);
        }
        let critical = usize::from(self.show == DisplayCalendar::Critical);
        LengthHint::exact(7 + critical + self.calendar.len())
    }
}

/// A month-day, written as `MM-DD` or, when the calendar requires it, with the
/// reference year.
#[derive(Debug, Clone, Copy)]
pub struct FormattableMonthDay<'a> {
    pub date: FormattableDate,
    pub calendar: FormattableCalendar<'a>,
}

impl Writeable for FormattableMonthDay<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.calendar.requires_reference() {
            write_year(self.date.0, sink)?;
            sink.write_char('-')?;
        }
        write_padded_u8(self.date.1, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.date.2, sink)?;
        self.calendar.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let base = self.calendar.writeable_length_hint() + 5;
        if self.calendar.requires_reference() {
            return base + (year_length(self.date.0) + 1);
        }
        base
    }
}

/// A year-month, written as `YYYY-MM` or, when the calendar requires it, with
/// the reference day.
#[derive(Debug, Clone, Copy)]
pub struct FormattableYearMonth<'a> {
    pub date: FormattableDate,
    pub calendar: FormattableCalendar<'a>,
}

impl Writeable for FormattableYearMonth<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        write_year(self.date.0, sink)?;
        sink.write_char('-')?;
        write_padded_u8(self.date.1, sink)?;
        if self.calendar.requires_reference() {
            sink.write_char('-')?;
            write_padded_u8(self.date.2, sink)?;
        }
        self.calendar.write_to(sink)
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let base = self.calendar.writeable_length_hint() + (year_length(self.date.0) + 3);
        if self.calendar.requires_reference() {
            return base + 3;
        }
        base
    }
}

#[derive(Debug, Default)]
pub struct FormattableIxdtf<'a> {
    pub date: Option<FormattableDate>,
    pub time: Option<FormattableTime>,
    pub utc_offset: Option<FormattableUtcOffset>,
    pub timezone: Option<FormattableTimeZone<'a>>,
    pub calendar: Option<FormattableCalendar<'a>>,
}

impl Writeable for FormattableIxdtf<'_> {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if let Some(date) = &self.date {
            date.write_to(sink)?;
        }
        if let Some(time) = &self.time {
            if self.date.is_some() {
                sink.write_char('T')?;
            }
            time.write_to(sink)?;
        }
        if let Some(offset) = &self.utc_offset {
            offset.write_to(sink)?;
        }
        if let Some(timezone) = &self.timezone {
            timezone.write_to(sink)?;
        }
        if let Some(calendar) = &self.calendar {
            calendar.write_to(sink)?;
        }
        Ok(())
    }

    fn writeable_length_hint(&self) -> LengthHint {
        let mut hint = LengthHint::exact(0);
        if let Some(date) = &self.date {
            hint += date.writeable_length_hint();
        }
        if let Some(time) = &self.time {
            hint += time.writeable_length_hint() + usize::from(self.date.is_some());
        }
        if let Some(offset) = &self.utc_offset {
            hint += offset.writeable_length_hint();
        }
        if let Some(timezone) = &self.timezone {
            hint += timezone.writeable_length_hint();
        }
        if let Some(calendar) = &self.calendar {
            hint += calendar.writeable_length_hint();
        }
        hint
    }
}

// ==== Durations ====

/// The absolute date fields of a duration.
#[derive(Debug, Clone, Copy)]
pub struct FormattableDateDuration {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u64,
}

/// The absolute time fields of a duration, with all sub-second units folded
/// into `subseconds` nanoseconds.
#[derive(Debug, Clone, Copy)]
pub struct FormattableTimeDuration {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub subseconds: u32,
}

/// An ISO 8601 duration such as `-P1Y2DT3H0.25S`.
#[derive(Debug, Clone, Copy)]
pub struct FormattableDuration {
    pub precision: Precision,
    pub sign: Sign,
    pub date: Option<FormattableDateDuration>,
    pub time: FormattableTimeDuration,
}

impl FormattableDuration {
    /// Seconds are written when nonzero, when a precision is requested, or when
    /// nothing else would be written.
    fn writes_seconds(&self) -> bool {
        let time = &self.time;
        time.seconds != 0
            || time.subseconds != 0
            || self.precision != Precision::Auto
            || (self.date.is_none() && time.hours == 0 && time.minutes == 0)
    }
}

impl Writeable for FormattableDuration {
    fn write_to<W: core::fmt::Write + ?Sized>(&self, sink: &mut W) -> core::fmt::Result {
        if self.sign == Sign::Negative {
            sink.write_char('-')?;
        }
        sink.write_char('P')?;
        if let Some(date) = self.date {
            write_nonzero_with_suffix(date.years.into(), 'Y', sink)?;
            write_nonzero_with_suffix(date.months.into(), 'M', sink)?;
            write_nonzero_with_suffix(date.weeks.into(), 'W', sink)?;
            write_nonzero_with_suffix(date.days, 'D', sink)?;
        }

        let time = &self.time;
        let write_second = self.writes_seconds();
        if time.hours != 0 || time.minutes != 0 || write_second {
            sink.write_char('T')?;
        }
        write_nonzero_with_suffix(time.hours, 'H', sink)?;
        write_nonzero_with_suffix(time.minutes, 'M', sink)?;
        if !write_second {
            return Ok(());
        }

        time.seconds.write_to(sink)?;
        let omit_fraction = self.precision == Precision::Digit(0)
            || (self.precision == Precision::Auto && time.subseconds == 0);
        if !omit_fraction {
            sink.write_char('.')?;
            write_nanosecond(time.subseconds, self.precision, sink)?;
        }
        sink.write_char('S')
    }
}

fn write_nonzero_with_suffix<W: core::fmt::Write + ?Sized>(
    value: u64,
    suffix: char,
    sink: &mut W,
) -> core::fmt::Result {
    if value == 0 {
        return Ok(());
    }
    value.write_to(sink)?;
    sink.write_char(suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use writeable::assert_writeable_eq;

    fn time(nanosecond: u32, precision: Precision) -> FormattableTime {
        FormattableTime {
            hour: 5,
            minute: 0,
            second: 0,
            nanosecond,
            precision,
            include_sep: true,
        }
    }

    #[test]
    fn offset_string() {
        assert_writeable_eq!(FormattableOffset::from_nanoseconds(4 * 3_600_000_000_000), "+04:00");
        assert_writeable_eq!(
            FormattableOffset::from_nanoseconds(-(5 * 3600 + 30) * 1_000_000_000),
            "-05:00:30"
        );
        assert_writeable_eq!(
            FormattableOffset::from_nanoseconds(-(5 * 3_600_000_000_000 + 123_050_000)),
            "-05:00:00.12305"
        );
        assert_writeable_eq!(FormattableOffset::from_nanoseconds(0), "+00:00");
    }

    #[test]
    fn time_to_precision() {
        assert_writeable_eq!(time(123_050_000, Precision::Digit(8)), "05:00:00.12305000");
        assert_writeable_eq!(time(123_050_002, Precision::Digit(9)), "05:00:00.123050002");
        assert_writeable_eq!(time(123_050_000, Precision::Digit(1)), "05:00:00.1");
        assert_writeable_eq!(time(123_050_000, Precision::Digit(0)), "05:00:00");
        assert_writeable_eq!(time(123_050_000, Precision::Minute), "05:00");
        assert_writeable_eq!(time(0, Precision::Auto), "05:00:00");
    }

    #[test]
    fn date_string() {
        assert_writeable_eq!(FormattableDate(2024, 12, 8), "2024-12-08");
        assert_writeable_eq!(FormattableDate(987654, 12, 8), "+987654-12-08");
        assert_writeable_eq!(FormattableDate(-987654, 12, 8), "-987654-12-08");
        assert_writeable_eq!(FormattableDate(0, 12, 8), "0000-12-08");
        assert_writeable_eq!(FormattableDate(10_000, 12, 8), "+010000-12-08");
        assert_writeable_eq!(FormattableDate(-1, 1, 1), "-000001-01-01");
    }

    #[test]
    fn year_month_and_month_day_reference_fields() {
        let iso = FormattableCalendar {
            show: DisplayCalendar::Auto,
            calendar: "iso8601",
        };
        let hebrew = FormattableCalendar {
            show: DisplayCalendar::Auto,
            calendar: "hebrew",
        };
        let date = FormattableDate(2024, 3, 11);
        assert_writeable_eq!(FormattableYearMonth { date, calendar: iso }, "2024-03");
        assert_writeable_eq!(
            FormattableYearMonth {
                date,
                calendar: hebrew
            },
            "2024-03-11[u-ca=hebrew]"
        );
        assert_writeable_eq!(FormattableMonthDay { date, calendar: iso }, "03-11");
        assert_writeable_eq!(
            FormattableMonthDay {
                date,
                calendar: FormattableCalendar {
                    show: DisplayCalendar::Critical,
                    calendar: "iso8601",
                }
            },
            "2024-03-11[!u-ca=iso8601]"
        );
    }

    #[test]
    fn builder_orders_parts() {
        let result = IxdtfStringBuilder::default()
            .with_calendar("gregory", DisplayCalendar::Auto)
            .with_timezone("Europe/Paris", DisplayTimeZone::Critical)
            .with_offset_nanoseconds(3_600_000_000_000, DisplayOffset::Auto)
            .with_time(IsoTime::new_unchecked(1, 2, 3, 400, 0, 0), Precision::Auto)
            .with_date(IsoDate::new_unchecked(2025, 1, 31))
            .build();
        assert_eq!(
            result,
            "2025-01-31T01:02:03.4+01:00[!Europe/Paris][u-ca=gregory]"
        );
    }

    #[test]
    fn duration_fraction_is_kept_between_units() {
        let duration = FormattableDuration {
            precision: Precision::Auto,
            sign: Sign::Positive,
            date: None,
            time: FormattableTimeDuration {
                hours: 1,
                minutes: 0,
                seconds: 0,
                subseconds: 500_000_000,
            },
        };
        assert_writeable_eq!(duration, "PT1H0.5S");

        let duration = FormattableDuration {
            precision: Precision::Digit(2),
            sign: Sign::Negative,
            date: Some(FormattableDateDuration {
                years: 1,
                months: 0,
                weeks: 0,
                days: 2,
            }),
            time: FormattableTimeDuration {
                hours: 0,
                minutes: 0,
                seconds: 0,
                subseconds: 0,
            },
        };
        assert_writeable_eq!(duration, "-P1Y2DT0.00S");
    }
}
