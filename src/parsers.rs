//! This module implements IXDTF (RFC 9557) parsing and formatting.
//!
//! Scanning is delegated to the `ixdtf` crate. The functions here apply the
//! Temporal specific early errors on top of the scanned records, such as
//! rejecting the `Z` designator for plain values or validating the parsed date.

use crate::{error::ErrorMessage, iso::is_valid_date, TemporalError, TemporalResult};
use alloc::string::String;
use ixdtf::{
    encoding::Utf8,
    parsers::IxdtfParser,
    records::{Annotation, DateRecord, IxdtfParseRecord, TimeRecord, UtcOffsetRecordOrZ},
};

mod formatter;
mod time_zone;

pub use formatter::{
    FormattableCalendar, FormattableDate, FormattableDateDuration, FormattableDuration,
    FormattableIxdtf, FormattableMonthDay, FormattableOffset, FormattableTime,
    FormattableTimeDuration, FormattableTimeZone, FormattableUtcOffset, FormattableYearMonth,
    IxdtfStringBuilder, OffsetDesignator,
};
pub(crate) use time_zone::{parse_allowed_timezone_formats, parse_identifier};

/// The calendar annotation key.
const CALENDAR_KEY: &[u8] = b"u-ca";

/// The reference year used to validate a month-day without a year.
const MONTH_DAY_REFERENCE_YEAR: i32 = 1972;

/// Re-encodes UTF-16 input as UTF-8 for the scanner.
///
/// Unpaired surrogates are a syntax error.
pub(crate) fn utf16_to_utf8(source: &[u16]) -> TemporalResult<String> {
    String::from_utf16(source)
        .map_err(|_| TemporalError::syntax().with_message("Invalid UTF-16 input."))
}

/// The production a string is scanned against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseVariant {
    YearMonth,
    MonthDay,
    DateTime,
    Time,
}

/// Scans `source` against `variant` and applies the early errors shared by all
/// Temporal string productions.
fn parse_ixdtf(source: &[u8], variant: ParseVariant) -> TemporalResult<IxdtfParseRecord<'_, Utf8>> {
    fn cast_handler<'a>(
        _: &mut IxdtfParser<'a, Utf8>,
        handler: impl FnMut(Annotation<'a, Utf8>) -> Option<Annotation<'a, Utf8>>,
    ) -> impl FnMut(Annotation<'a, Utf8>) -> Option<Annotation<'a, Utf8>> {
        handler
    }

    let mut first_calendar: Option<Annotation<'_, Utf8>> = None;
    let mut critical_duplicate_calendar = false;
    let mut parser = IxdtfParser::from_utf8(source);

    let handler = cast_handler(&mut parser, |annotation: Annotation<'_, Utf8>| {
        if annotation.key != CALENDAR_KEY {
            // Unknown keys are left to the scanner, which rejects critical ones.
            return Some(annotation);
        }
        match first_calendar {
            Some(ref first) => {
                critical_duplicate_calendar |= first.critical || annotation.critical;
            }
            None => first_calendar = Some(annotation),
        }
        None
    });

    let mut record = match variant {
        ParseVariant::YearMonth => parser.parse_year_month_with_annotation_handler(handler),
        ParseVariant::MonthDay => parser.parse_month_day_with_annotation_handler(handler),
        ParseVariant::DateTime => parser.parse_with_annotation_handler(handler),
        ParseVariant::Time => parser.parse_time_with_annotation_handler(handler),
    }?;

    if critical_duplicate_calendar {
        return Err(TemporalError::syntax()
            .with_message("Multiple calendar annotations with a critical flag found."));
    }

    record.calendar = first_calendar.map(|annotation| annotation.value);

    // A year-month without a day, or a month-day without a year, is only valid
    // for the ISO calendar.
    if matches!(variant, ParseVariant::YearMonth | ParseVariant::MonthDay) {
        if let Some(calendar) = record.calendar {
            if !calendar.eq_ignore_ascii_case(b"iso8601") {
                return Err(TemporalError::range()
                    .with_message("YearMonth and MonthDay formats are only valid for ISO."));
            }
        }
    }

    if variant == ParseVariant::Time {
        return Ok(record);
    }

    let Some(date) = record.date else {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate));
    };

    let year = match variant {
        ParseVariant::MonthDay => MONTH_DAY_REFERENCE_YEAR,
        _ => date.year,
    };
    let day = match variant {
        ParseVariant::YearMonth => 1,
        _ => date.day,
    };
    if !is_valid_date(year, date.month, day) {
        return Err(TemporalError::range().with_message("Parsed date is not a valid ISO date."));
    }

    Ok(record)
}

/// Rejects the `Z` designator, which is not valid for plain values.
fn check_offset(record: IxdtfParseRecord<'_, Utf8>) -> TemporalResult<IxdtfParseRecord<'_, Utf8>> {
    if record.offset == Some(UtcOffsetRecordOrZ::Z) {
        return Err(TemporalError::range().with_enum(ErrorMessage::UtcDesignatorNotAllowed));
    }
    Ok(record)
}

/// Parses a `TemporalDateTimeString`.
#[inline]
pub(crate) fn parse_date_time(source: &[u8]) -> TemporalResult<IxdtfParseRecord<'_, Utf8>> {
    parse_ixdtf(source, ParseVariant::DateTime).and_then(check_offset)
}

/// Parses a `TemporalZonedDateTimeString`, which requires a time zone annotation.
#[inline]
pub(crate) fn parse_zoned_date_time(source: &[u8]) -> TemporalResult<IxdtfParseRecord<'_, Utf8>> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;
    if record.tz.is_none() {
        return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsTimeZone));
    }
    Ok(record)
}

/// The fields of a `TemporalInstantString`.
#[derive(Debug)]
pub(crate) struct IxdtfParseInstantRecord {
    pub(crate) date: DateRecord,
    pub(crate) time: TimeRecord,
    pub(crate) offset: UtcOffsetRecordOrZ,
}

/// Parses a `TemporalInstantString`, which requires a time and an offset or `Z`.
#[inline]
pub(crate) fn parse_instant(source: &[u8]) -> TemporalResult<IxdtfParseInstantRecord> {
    let record = parse_ixdtf(source, ParseVariant::DateTime)?;

    let IxdtfParseRecord {
        date: Some(date),
        time: Some(time),
        offset: Some(offset),
        ..
    } = record
    else {
        return Err(TemporalError::range().with_enum(ErrorMessage::RequiredFieldMissing));
    };

    Ok(IxdtfParseInstantRecord { date, time, offset })
}

/// Parses a `TemporalYearMonthString`, falling back to a full date-time.
///
/// When both productions fail the error of the year-month production is returned.
#[inline]
pub(crate) fn parse_year_month(source: &[u8]) -> TemporalResult<IxdtfParseRecord<'_, Utf8>> {
    match parse_ixdtf(source, ParseVariant::YearMonth) {
        Ok(record) => check_offset(record),
        Err(e) => parse_date_time(source).map_err(|_| e),
    }
}

/// Parses a `TemporalMonthDayString`, falling back to a full date-time.
#[inline]
pub(crate) fn parse_month_day(source: &[u8]) -> TemporalResult<IxdtfParseRecord<'_, Utf8>> {
    match parse_ixdtf(source, ParseVariant::MonthDay) {
        Ok(record) => check_offset(record),
        Err(e) => parse_date_time(source).map_err(|_| e),
    }
}

/// Parses a `TemporalTimeString`, which may also be a date-time with a time part.
#[inline]
pub(crate) fn parse_time(source: &[u8]) -> TemporalResult<TimeRecord> {
    let record = match parse_ixdtf(source, ParseVariant::Time) {
        Ok(record) => check_offset(record)?,
        Err(e) => parse_date_time(source).map_err(|_| e)?,
    };
    record.time.ok_or(
        TemporalError::range()
            .with_message("PlainTime can only be parsed from strings with a time component."),
    )
}

/// Extracts the calendar annotation from any Temporal string production.
///
/// Returns `Some(&[])` for a valid string without an annotation, and `None`
/// when `source` is not a Temporal string at all.
#[inline]
pub fn parse_allowed_calendar_formats(source: &[u8]) -> Option<&[u8]> {
    [
        ParseVariant::DateTime,
        ParseVariant::Time,
        ParseVariant::YearMonth,
        ParseVariant::MonthDay,
    ]
    .into_iter()
    .find_map(|variant| parse_ixdtf(source, variant).ok())
    .map(|record| record.calendar.unwrap_or(&[]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn date_time_rejects_utc_designator() {
        let err = parse_date_time(b"2020-01-01T00:00Z").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(parse_date_time(b"2020-01-01T00:00+01:00").is_ok());
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert!(parse_date_time(b"2021-02-29").is_err());
        assert!(parse_date_time(b"2020-02-29").is_ok());
        assert!(parse_month_day(b"02-29").is_ok());
        assert!(parse_month_day(b"02-30").is_err());
        assert!(parse_year_month(b"2020-13").is_err());
    }

    #[test]
    fn critical_duplicate_calendar_is_syntax_error() {
        let err = parse_date_time(b"2020-01-01[!u-ca=iso8601][u-ca=gregory]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        let record = parse_date_time(b"2020-01-01[u-ca=hebrew][u-ca=gregory]").unwrap();
        assert_eq!(record.calendar, Some(&b"hebrew"[..]));
    }

    #[test]
    fn unknown_critical_annotation_is_syntax_error() {
        let err = parse_date_time(b"2020-01-01[!foo=bar]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(parse_date_time(b"2020-01-01[foo=bar]").is_ok());
    }

    #[test]
    fn year_month_calendar_must_be_iso() {
        assert!(parse_year_month(b"2020-05[u-ca=iso8601]").is_ok());
        assert!(parse_year_month(b"2020-05[u-ca=hebrew]").is_err());
        // A full date may carry any calendar.
        assert!(parse_year_month(b"2020-05-01[u-ca=hebrew]").is_ok());
    }

    #[test]
    fn zoned_and_instant_requirements() {
        assert!(parse_zoned_date_time(b"2020-01-01T00:00").is_err());
        assert!(parse_zoned_date_time(b"2020-01-01T00:00Z[UTC]").is_ok());
        assert!(parse_instant(b"2020-01-01T00:00").is_err());
        assert!(parse_instant(b"2020-01-01T00:00Z").is_ok());
    }

    #[test]
    fn time_strings() {
        let time = parse_time(b"T12:30:15.5").unwrap();
        assert_eq!((time.hour, time.minute, time.second), (12, 30, 15));
        let time = parse_time(b"2020-01-01T08:00").unwrap();
        assert_eq!(time.hour, 8);
        assert!(parse_time(b"2020-01-01").is_err());
    }

    #[test]
    fn calendar_formats() {
        assert_eq!(
            parse_allowed_calendar_formats(b"2020-01-01[u-ca=japanese]"),
            Some(&b"japanese"[..])
        );
        assert_eq!(parse_allowed_calendar_formats(b"2020-01-01"), Some(&[][..]));
        assert_eq!(parse_allowed_calendar_formats(b"japanese"), None);
    }

    #[test]
    fn scanner_context_is_kept() {
        let err = parse_date_time(b"2020-1x-01").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}
