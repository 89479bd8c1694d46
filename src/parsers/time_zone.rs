use ixdtf::{
    encoding::Utf8,
    parsers::{IxdtfParser, TimeZoneParser},
    records::{TimeZoneRecord, UtcOffsetRecord, UtcOffsetRecordOrZ},
};

use crate::{
    builtins::core::timezone::UtcOffset, error::ErrorMessage, provider::TimeZoneProvider,
    TemporalError, TemporalResult, TimeZone,
};

use super::{parse_ixdtf, ParseVariant};

/// Extracts a time zone from any Temporal string that carries one, preferring
/// the bracketed annotation over the offset.
///
/// Sub-minute offsets cannot name a time zone and produce `None`.
pub(crate) fn parse_allowed_timezone_formats(
    source: &str,
    provider: &(impl TimeZoneProvider + ?Sized),
) -> Option<TimeZone> {
    let bytes = source.as_bytes();
    let (offset, annotation) = [
        ParseVariant::DateTime,
        ParseVariant::YearMonth,
        ParseVariant::MonthDay,
    ]
    .into_iter()
    .find_map(|variant| parse_ixdtf(bytes, variant).ok())
    .or_else(|| IxdtfParser::from_utf8(bytes).parse_time().ok())
    .map(|record| (record.offset, record.tz))?;

    if let Some(annotation) = annotation {
        return TimeZone::from_time_zone_record(annotation.tz, provider).ok();
    }

    match offset? {
        UtcOffsetRecordOrZ::Z => Some(TimeZone::utc()),
        UtcOffsetRecordOrZ::Offset(UtcOffsetRecord::MinutePrecision(offset)) => {
            UtcOffset::from_ixdtf_minute_record(offset)
                .ok()
                .map(TimeZone::UtcOffset)
        }
        UtcOffsetRecordOrZ::Offset(_) => None,
    }
}

/// Parses a bare time zone identifier, which is either an IANA name or a
/// minute precision offset.
pub(crate) fn parse_identifier(source: &str) -> TemporalResult<TimeZoneRecord<'_, Utf8>> {
    TimeZoneParser::from_str(source)
        .parse_identifier()
        .map_err(|_| TemporalError::range().with_enum(ErrorMessage::TimeZoneUnknown))
}
