//! This module implements the Temporal `TimeZone` and `UtcOffset`.

use alloc::{
    string::{String, ToString},
    sync::Arc,
};
use core::{fmt, str::FromStr};

use ixdtf::{
    encoding::Utf8,
    parsers::TimeZoneParser,
    records::{MinutePrecisionOffset, TimeZoneRecord, UtcOffsetRecord},
};

use crate::{
    error::ErrorMessage,
    iso::{IsoDate, IsoDateTime, IsoTime},
    options::Disambiguation,
    parsers::{parse_allowed_timezone_formats, parse_identifier, FormattableOffset},
    provider::{
        CandidateEpochNanoseconds, EpochNanosecondsAndOffset, TimeZoneProvider,
        TransitionDirection, UtcOffsetSeconds,
    },
    time::EpochNanoseconds,
    TemporalError, TemporalResult, ZonedDateTime,
};

const NS_PER_MINUTE: i128 = 60_000_000_000;

/// The largest offset a `UtcOffset` can hold, in minutes.
const MAX_OFFSET_MINUTES: i16 = 23 * 60 + 59;

/// A fixed UTC offset with minute precision.
///
/// ```rust
/// use temporal_engine::UtcOffset;
/// use core::str::FromStr;
///
/// let offset = UtcOffset::from_str("+05:30").unwrap();
/// assert_eq!(offset.minutes(), 330);
/// assert_eq!(offset.to_string(), "+05:30");
///
/// let offset = UtcOffset::from_str("-0800").unwrap();
/// assert_eq!(offset.to_string(), "-08:00");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcOffset(i16);

impl UtcOffset {
    /// Creates an offset from signed minutes, rejecting anything a day or longer.
    pub fn from_minutes(minutes: i16) -> TemporalResult<Self> {
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(TemporalError::range().with_message("UTC offset must be less than a day."));
        }
        Ok(Self(minutes))
    }

    pub(crate) fn from_ixdtf_minute_record(record: MinutePrecisionOffset) -> TemporalResult<Self> {
        let minutes = i16::from(record.hour) * 60 + i16::from(record.minute);
        Self::from_minutes(minutes * i16::from(record.sign as i8))
    }

    /// Returns the offset in minutes.
    #[inline]
    #[must_use]
    pub const fn minutes(&self) -> i16 {
        self.0
    }

    /// Returns the offset in nanoseconds.
    #[inline]
    #[must_use]
    pub fn nanoseconds(&self) -> i128 {
        i128::from(self.0) * NS_PER_MINUTE
    }

    /// Returns the offset in nanoseconds as an `i64`. At most 1439 minutes are
    /// stored, so this never overflows.
    pub(crate) const fn nanoseconds_i64(&self) -> i64 {
        self.0 as i64 * 60_000_000_000
    }

    fn as_offset_seconds(self) -> UtcOffsetSeconds {
        UtcOffsetSeconds(i64::from(self.0) * 60)
    }
}

impl FromStr for UtcOffset {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match TimeZoneParser::from_str(s).parse_offset()? {
            UtcOffsetRecord::MinutePrecision(offset) => Self::from_ixdtf_minute_record(offset),
            _ => Err(TemporalError::range()
                .with_message("UTC offset time zones cannot have seconds precision.")),
        }
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&FormattableOffset::from_nanoseconds(self.nanoseconds_i64()), f)
    }
}

/// A Temporal time zone: either a named IANA zone or a fixed UTC offset.
///
/// IANA identifiers are stored in the casing the provider knows them by, so
/// two zones are equal exactly when their identifiers are equal. The name is
/// shared, so cloning a zone never copies it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeZone {
    IanaIdentifier(Arc<str>),
    UtcOffset(UtcOffset),
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::utc()
    }
}

impl From<&ZonedDateTime> for TimeZone {
    fn from(value: &ZonedDateTime) -> Self {
        value.timezone().clone()
    }
}

impl From<UtcOffset> for TimeZone {
    fn from(value: UtcOffset) -> Self {
        Self::UtcOffset(value)
    }
}

// ==== Construction ====

impl TimeZone {
    /// The IANA `UTC` zone.
    pub fn utc() -> Self {
        Self::IanaIdentifier(Arc::from("UTC"))
    }

    /// The fixed offset `+00:00`.
    pub fn zero() -> Self {
        Self::UtcOffset(UtcOffset::default())
    }

    /// Parses an IANA identifier or a minute precision offset, checking named
    /// zones against `provider`.
    pub fn try_from_identifier_str_with_provider(
        source: &str,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        Self::from_time_zone_record(parse_identifier(source)?, provider)
    }

    /// Parses a `±HH:MM` or `±HHMM` offset time zone.
    pub fn try_from_offset_str(source: &str) -> TemporalResult<Self> {
        UtcOffset::from_str(source).map(Self::UtcOffset)
    }

    /// Parses a time zone from an identifier, an offset, or any IXDTF string
    /// that carries a time zone annotation or offset.
    pub fn try_from_str_with_provider(
        source: &str,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        match Self::try_from_identifier_str_with_provider(source, provider) {
            Ok(timezone) => Ok(timezone),
            Err(err) => parse_allowed_timezone_formats(source, provider).ok_or(err),
        }
    }

    pub(crate) fn from_time_zone_record(
        record: TimeZoneRecord<'_, Utf8>,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<Self> {
        match record {
            TimeZoneRecord::Name(name) => {
                let normalized = provider.normalize_identifier(name)?;
                Ok(Self::IanaIdentifier(Arc::from(&*normalized)))
            }
            TimeZoneRecord::Offset(offset) => {
                UtcOffset::from_ixdtf_minute_record(offset).map(Self::UtcOffset)
            }
            _ => Err(TemporalError::range().with_enum(ErrorMessage::TimeZoneUnknown)),
        }
    }
}

// ==== Queries ====

impl TimeZone {
    /// Returns the identifier of this time zone: the normalized IANA name or
    /// a `±HH:MM` offset.
    pub fn identifier(&self) -> String {
        match self {
            Self::IanaIdentifier(identifier) => String::from(&**identifier),
            Self::UtcOffset(offset) => offset.to_string(),
        }
    }

    /// Returns this time zone with any IANA link resolved to its primary zone.
    pub fn primary_identifier_with_provider(
        &self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<Self> {
        match self {
            Self::IanaIdentifier(identifier) => {
                let canonical = provider.canonicalize_identifier(identifier.as_bytes())?;
                if *canonical == **identifier {
                    return Ok(self.clone());
                }
                Ok(Self::IanaIdentifier(Arc::from(&*canonical)))
            }
            Self::UtcOffset(_) => Ok(self.clone()),
        }
    }

    /// Returns whether both zones resolve to the same primary zone.
    pub fn time_zone_equals_with_provider(
        &self,
        other: &Self,
        provider: &impl TimeZoneProvider,
    ) -> TemporalResult<bool> {
        if self == other {
            return Ok(true);
        }
        Ok(self.primary_identifier_with_provider(provider)?
            == other.primary_identifier_with_provider(provider)?)
    }

    pub(crate) fn get_iso_datetime_for(
        &self,
        epoch_ns: &EpochNanoseconds,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<IsoDateTime> {
        let offset = self.get_offset_nanos_for(epoch_ns.0, provider)?;
        Ok(IsoDateTime::from_epoch_nanos(epoch_ns, offset))
    }

    /// Returns the UTC offset of this zone at `utc_epoch`, in nanoseconds.
    pub(crate) fn get_offset_nanos_for(
        &self,
        utc_epoch: i128,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<i128> {
        match self {
            Self::UtcOffset(offset) => Ok(offset.nanoseconds()),
            Self::IanaIdentifier(identifier) => provider
                .get_named_tz_offset_nanoseconds(identifier, utc_epoch)
                .map(|info| info.offset.as_nanoseconds())
                .map_err(Into::into),
        }
    }

    /// Resolves a wall-clock date-time to an exact time, applying `disambiguation`
    /// when the wall-clock time is skipped or repeated.
    pub(crate) fn get_epoch_nanoseconds_for(
        &self,
        iso: IsoDateTime,
        disambiguation: Disambiguation,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<EpochNanoseconds> {
        let candidates = self.get_possible_epoch_ns_for(iso, provider)?;
        disambiguate_possible_epoch_nanos(candidates, iso, disambiguation)
    }

    /// Returns every exact time that shows `iso` on the wall clock of this zone.
    pub(crate) fn get_possible_epoch_ns_for(
        &self,
        iso: IsoDateTime,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<CandidateEpochNanoseconds> {
        let candidates = match self {
            Self::UtcOffset(offset) => {
                iso.check_within_limits()?;
                let ns = EpochNanoseconds(iso.as_nanoseconds().0 - offset.nanoseconds());
                CandidateEpochNanoseconds::One(EpochNanosecondsAndOffset {
                    ns,
                    offset: offset.as_offset_seconds(),
                })
            }
            Self::IanaIdentifier(identifier) => {
                iso.check_within_limits()?;
                provider.get_named_tz_epoch_nanoseconds(identifier, iso.into())?
            }
        };
        for candidate in candidates.as_slice() {
            candidate.ns.check_validity()?;
        }
        Ok(candidates)
    }

    /// Returns the first instant of `iso_date` in this zone.
    pub(crate) fn get_start_of_day(
        &self,
        iso_date: &IsoDate,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<EpochNanoseconds> {
        let iso = IsoDateTime::new_unchecked(*iso_date, IsoTime::default());
        match self.get_possible_epoch_ns_for(iso, provider)? {
            CandidateEpochNanoseconds::One(first) | CandidateEpochNanoseconds::Two([first, _]) => {
                Ok(first.ns)
            }
            CandidateEpochNanoseconds::Zero(gap) => {
                gap.transition_epoch.check_validity()?;
                Ok(gap.transition_epoch)
            }
        }
    }

    /// Returns the closest transition strictly after or before `epoch_ns`.
    ///
    /// Fixed offsets never transition and always return `None`.
    pub(crate) fn get_time_zone_transition(
        &self,
        epoch_ns: i128,
        direction: TransitionDirection,
        provider: &(impl TimeZoneProvider + ?Sized),
    ) -> TemporalResult<Option<EpochNanoseconds>> {
        match self {
            Self::UtcOffset(_) => Ok(None),
            Self::IanaIdentifier(identifier) => provider
                .get_named_tz_transition(identifier, epoch_ns, direction)
                .map_err(Into::into),
        }
    }
}

/// Picks one exact time out of the candidates for a wall-clock date-time.
///
/// A gap is resolved from the offsets on either side of it: `compatible` and
/// `later` read the wall-clock time in the offset before the gap, which moves
/// it forward by the gap length, while `earlier` reads it in the offset after
/// the gap.
fn disambiguate_possible_epoch_nanos(
    candidates: CandidateEpochNanoseconds,
    iso: IsoDateTime,
    disambiguation: Disambiguation,
) -> TemporalResult<EpochNanoseconds> {
    match candidates {
        CandidateEpochNanoseconds::One(one) => Ok(one.ns),
        CandidateEpochNanoseconds::Two([earlier, later]) => match disambiguation {
            Disambiguation::Compatible | Disambiguation::Earlier => Ok(earlier.ns),
            Disambiguation::Later => Ok(later.ns),
            Disambiguation::Reject => {
                Err(TemporalError::time_zone().with_enum(ErrorMessage::TimeZoneAmbiguous))
            }
        },
        CandidateEpochNanoseconds::Zero(gap) => {
            let offset = match disambiguation {
                Disambiguation::Reject => {
                    return Err(TemporalError::time_zone().with_enum(ErrorMessage::TimeZoneGap))
                }
                Disambiguation::Earlier => gap.offset_after,
                Disambiguation::Compatible | Disambiguation::Later => gap.offset_before,
            };
            let ns = EpochNanoseconds(iso.as_nanoseconds().0 - offset.as_nanoseconds());
            ns.check_validity()?;
            Ok(ns)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TimeZone, UtcOffset};
    use crate::{
        error::ErrorKind,
        iso::{IsoDate, IsoDateTime, IsoTime},
        options::Disambiguation,
        provider::{NeverProvider, TransitionDirection},
    };
    use alloc::{string::ToString, sync::Arc};
    use core::str::FromStr;

    #[test]
    fn offset_from_and_to_string() {
        for src in ["+09:30", "-09:30", "-12:30", "+00:00"] {
            let tz = TimeZone::try_from_offset_str(src).unwrap();
            assert_eq!(tz.identifier(), src);
        }
        let tz = TimeZone::try_from_offset_str("+0530").unwrap();
        assert_eq!(tz.identifier(), "+05:30");
        assert!(TimeZone::try_from_offset_str("+05:30:10").is_err());
        assert!(TimeZone::try_from_offset_str("05:30").is_err());
    }

    #[test]
    fn offset_limits() {
        assert_eq!(UtcOffset::from_minutes(1439).unwrap().minutes(), 1439);
        assert!(UtcOffset::from_minutes(1440).is_err());
        assert!(UtcOffset::from_minutes(-1440).is_err());
        assert_eq!(
            UtcOffset::from_str("-23:59").unwrap().nanoseconds(),
            -1439 * 60_000_000_000
        );
        assert_eq!(UtcOffset::from_minutes(-1439).unwrap().to_string(), "-23:59");
        assert_eq!(UtcOffset::from_minutes(1439).unwrap().to_string(), "+23:59");
    }

    #[test]
    fn cloned_zones_share_their_identifier() {
        let tz = TimeZone::utc();
        let copy = tz.clone();
        let (TimeZone::IanaIdentifier(a), TimeZone::IanaIdentifier(b)) = (&tz, &copy) else {
            panic!("UTC is a named zone");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn offset_zones_without_a_provider() {
        let provider = &NeverProvider;
        let tz = TimeZone::try_from_str_with_provider("-03:00", provider).unwrap();
        assert_eq!(tz, TimeZone::UtcOffset(UtcOffset::from_minutes(-180).unwrap()));

        let iso = IsoDateTime::new_unchecked(
            IsoDate::new_unchecked(1970, 1, 1),
            IsoTime::new_unchecked(0, 0, 0, 0, 0, 0),
        );
        let ns = tz
            .get_epoch_nanoseconds_for(iso, Disambiguation::Reject, provider)
            .unwrap();
        assert_eq!(ns.0, 3 * 3_600_000_000_000);
        assert_eq!(
            tz.get_time_zone_transition(ns.0, TransitionDirection::Next, provider)
                .unwrap(),
            None
        );

        let err = TimeZone::try_from_identifier_str_with_provider("Europe/Paris", provider)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TimeZone);
    }

    #[test]
    fn utc_and_zero_differ() {
        assert_eq!(TimeZone::utc().identifier(), "UTC");
        assert_eq!(TimeZone::zero().identifier(), "+00:00");
        assert_ne!(TimeZone::utc(), TimeZone::zero());
    }

    #[cfg(feature = "tzdb")]
    mod tzdb {
        use super::super::TimeZone;
        use crate::{
            error::ErrorKind,
            iso::{IsoDate, IsoDateTime, IsoTime},
            options::Disambiguation,
            provider::{CompiledTzdbProvider, TransitionDirection},
        };

        const NS_PER_HOUR: i128 = 3_600_000_000_000;

        fn new_york(provider: &CompiledTzdbProvider) -> TimeZone {
            TimeZone::try_from_identifier_str_with_provider("America/New_York", provider).unwrap()
        }

        fn local(year: i32, month: u8, day: u8, hour: u8, minute: u8) -> IsoDateTime {
            IsoDateTime::new_unchecked(
                IsoDate::new_unchecked(year, month, day),
                IsoTime::new_unchecked(hour, minute, 0, 0, 0, 0),
            )
        }

        #[test]
        fn identifiers_are_normalized() {
            let provider = &CompiledTzdbProvider::default();
            let tz = TimeZone::try_from_identifier_str_with_provider("america/new_york", provider)
                .unwrap();
            assert_eq!(tz.identifier(), "America/New_York");

            let tz =
                TimeZone::try_from_identifier_str_with_provider("US/Eastern", provider).unwrap();
            assert_eq!(tz.identifier(), "US/Eastern");
            assert_eq!(
                tz.primary_identifier_with_provider(provider).unwrap(),
                new_york(provider)
            );
            assert!(tz
                .time_zone_equals_with_provider(&new_york(provider), provider)
                .unwrap());

            let tz =
                TimeZone::try_from_identifier_str_with_provider("Asia/Calcutta", provider).unwrap();
            assert_eq!(
                tz.primary_identifier_with_provider(provider)
                    .unwrap()
                    .identifier(),
                "Asia/Kolkata"
            );

            let err = TimeZone::try_from_identifier_str_with_provider("Mars/Olympus", provider)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TimeZone);
        }

        #[test]
        fn zones_from_ixdtf_strings() {
            let provider = &CompiledTzdbProvider::default();
            let tz = TimeZone::try_from_str_with_provider(
                "2020-01-01T00:00+01:00[Europe/Paris]",
                provider,
            )
            .unwrap();
            assert_eq!(tz.identifier(), "Europe/Paris");

            let tz = TimeZone::try_from_str_with_provider("2020-01-01T00:00Z", provider).unwrap();
            assert_eq!(tz, TimeZone::utc());

            let tz =
                TimeZone::try_from_str_with_provider("2020-01-01T00:00-07:00", provider).unwrap();
            assert_eq!(tz.identifier(), "-07:00");
        }

        #[test]
        fn gap_disambiguation() {
            let provider = &CompiledTzdbProvider::default();
            let tz = new_york(provider);
            let wall = local(2020, 3, 8, 2, 30);
            let wall_ns = wall.as_nanoseconds().0;

            let compatible = tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Compatible, provider)
                .unwrap();
            // Read with the pre-transition offset of -05:00, giving 03:30 EDT.
            assert_eq!(compatible.0, wall_ns + 5 * NS_PER_HOUR);
            let later = tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Later, provider)
                .unwrap();
            assert_eq!(later, compatible);
            let earlier = tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Earlier, provider)
                .unwrap();
            assert_eq!(earlier.0, wall_ns + 4 * NS_PER_HOUR);

            let err = tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Reject, provider)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TimeZone);
        }

        #[test]
        fn overlap_disambiguation() {
            let provider = &CompiledTzdbProvider::default();
            let tz = new_york(provider);
            let wall = local(2020, 11, 1, 1, 30);

            let candidates = tz.get_possible_epoch_ns_for(wall, provider).unwrap();
            assert_eq!(candidates.len(), 2);

            let earlier = tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Earlier, provider)
                .unwrap();
            let later = tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Later, provider)
                .unwrap();
            let compatible = tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Compatible, provider)
                .unwrap();
            assert_eq!(later.0 - earlier.0, NS_PER_HOUR);
            assert_eq!(compatible, earlier);
            assert!(tz
                .get_epoch_nanoseconds_for(wall, Disambiguation::Reject, provider)
                .is_err());
        }

        #[test]
        fn start_of_day_after_midnight_gap() {
            let provider = &CompiledTzdbProvider::default();
            // Sao Paulo skipped from 00:00 to 01:00 on 2018-11-04.
            let tz =
                TimeZone::try_from_identifier_str_with_provider("America/Sao_Paulo", provider)
                    .unwrap();
            let start = tz
                .get_start_of_day(&IsoDate::new_unchecked(2018, 11, 4), provider)
                .unwrap();
            let local_start = tz.get_iso_datetime_for(&start, provider).unwrap();
            assert_eq!(local_start.time.hour, 1);
            assert_eq!(local_start.time.minute, 0);
        }

        #[test]
        fn transitions() {
            let provider = &CompiledTzdbProvider::default();
            let tz = new_york(provider);
            let start = local(2020, 1, 1, 0, 0).as_nanoseconds().0;
            let next = tz
                .get_time_zone_transition(start, TransitionDirection::Next, provider)
                .unwrap()
                .unwrap();
            // 2020-03-08T07:00Z
            assert_eq!(next.0, local(2020, 3, 8, 7, 0).as_nanoseconds().0);
            let previous = tz
                .get_time_zone_transition(next.0, TransitionDirection::Previous, provider)
                .unwrap()
                .unwrap();
            // 2019-11-03T06:00Z
            assert_eq!(previous.0, local(2019, 11, 3, 6, 0).as_nanoseconds().0);
        }
    }
}
