//! Parsed intermediate types
//!
//! These are values that have been *parsed* from an IXDTF string, with the
//! calendar and time zone annotations resolved, but whose fields have not yet
//! been validated against a calendar or time zone.

use crate::{
    error::ErrorMessage,
    iso::IsoTime,
    parsers,
    provider::TimeZoneProvider,
    Calendar, TemporalError, TemporalResult, TemporalUnwrap, TimeZone,
};
use ixdtf::records::{DateRecord, UtcOffsetRecord, UtcOffsetRecordOrZ};

const NS_PER_SECOND: i64 = 1_000_000_000;

/// Resolves the calendar annotation, defaulting to ISO.
fn resolve_calendar(annotation: Option<&[u8]>) -> TemporalResult<Calendar> {
    annotation.map_or(Ok(Calendar::ISO), Calendar::try_from_utf8)
}

/// A parsed date record with its calendar.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ParsedDate {
    pub(crate) record: DateRecord,
    pub(crate) calendar: Calendar,
}

impl ParsedDate {
    pub(crate) fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let record = parsers::parse_date_time(source)?;
        Ok(Self {
            calendar: resolve_calendar(record.calendar)?,
            record: record.date.temporal_unwrap()?,
        })
    }

    pub(crate) fn year_month_from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let record = parsers::parse_year_month(source)?;
        Ok(Self {
            calendar: resolve_calendar(record.calendar)?,
            record: record.date.temporal_unwrap()?,
        })
    }

    pub(crate) fn month_day_from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let record = parsers::parse_month_day(source)?;
        Ok(Self {
            calendar: resolve_calendar(record.calendar)?,
            record: record.date.temporal_unwrap()?,
        })
    }
}

/// A parsed date-time; a missing time is midnight.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ParsedDateTime {
    pub(crate) date: ParsedDate,
    pub(crate) time: IsoTime,
}

impl ParsedDateTime {
    pub(crate) fn from_utf8(source: &[u8]) -> TemporalResult<Self> {
        let record = parsers::parse_date_time(source)?;
        let time = record
            .time
            .map(IsoTime::from_time_record)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            date: ParsedDate {
                calendar: resolve_calendar(record.calendar)?,
                record: record.date.temporal_unwrap()?,
            },
            time,
        })
    }
}

/// A parsed zoned date-time.
#[derive(Clone, Debug)]
pub(crate) struct ParsedZonedDateTime {
    pub(crate) date: ParsedDate,
    /// A missing time means the start of the day in `timezone`.
    pub(crate) time: Option<IsoTime>,
    /// Whether the string used the `Z` designator instead of an offset.
    pub(crate) has_utc_designator: bool,
    /// Whether the offset was written to the minute only, allowing a match
    /// against offsets rounded to the minute.
    pub(crate) match_minutes: bool,
    /// The numeric offset in nanoseconds, if present.
    pub(crate) offset: Option<i64>,
    pub(crate) timezone: TimeZone,
}

impl ParsedZonedDateTime {
    pub(crate) fn from_utf8_with_provider(
        source: &[u8],
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<Self> {
        let record = parsers::parse_zoned_date_time(source)?;

        // `parse_zoned_date_time` guarantees the annotation exists.
        let annotation = record.tz.temporal_unwrap()?;
        let timezone = TimeZone::from_time_zone_record(annotation.tz, provider)?;

        let (offset, has_utc_designator, match_minutes) = match record.offset {
            Some(UtcOffsetRecordOrZ::Z) => (None, true, true),
            Some(UtcOffsetRecordOrZ::Offset(offset)) => (
                Some(offset_record_to_nanoseconds(&offset)?),
                false,
                offset.is_minute_precision(),
            ),
            None => (None, false, true),
        };

        let Some(date) = record.date else {
            return Err(TemporalError::range().with_enum(ErrorMessage::ParserNeedsDate));
        };

        let time = record.time.map(IsoTime::from_time_record).transpose()?;

        Ok(Self {
            date: ParsedDate {
                record: date,
                calendar: resolve_calendar(record.calendar)?,
            },
            time,
            has_utc_designator,
            match_minutes,
            offset,
            timezone,
        })
    }
}

/// Converts a parsed UTC offset into signed nanoseconds.
pub(crate) fn offset_record_to_nanoseconds(record: &UtcOffsetRecord) -> TemporalResult<i64> {
    let fraction = record
        .fraction()
        .map(|fraction| {
            fraction.to_nanoseconds().ok_or(
                TemporalError::range().with_enum(ErrorMessage::FractionalTimeMoreThanNineDigits),
            )
        })
        .transpose()?
        .unwrap_or(0);
    let seconds = i64::from(record.hour()) * 3600
        + i64::from(record.minute()) * 60
        + i64::from(record.second().unwrap_or(0));
    let magnitude = seconds * NS_PER_SECOND + i64::from(fraction);
    Ok(magnitude * i64::from(record.sign() as i8))
}
