//! The [`TimeZoneProvider`] trait, along with the values passed in and out of it.
//!
//! A provider answers three questions about a named zone: which instants a
//! wall-clock reading can mean, which offset applies at an instant, and when the
//! offset next (or last) changed.

use alloc::borrow::Cow;
use core::{fmt, str::FromStr};

use crate::{epoch_nanoseconds::EpochNanoseconds, utils, TimeZoneProviderError};

pub type TimeZoneProviderResult<T> = Result<T, TimeZoneProviderError>;

const NS_PER_SECOND: i128 = 1_000_000_000;

/// Seconds to add to UTC to get local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct UtcOffsetSeconds(pub i64);

impl UtcOffsetSeconds {
    pub fn as_nanoseconds(&self) -> i128 {
        i128::from(self.0) * NS_PER_SECOND
    }
}

#[cfg(feature = "tzif")]
mod tzif_offsets {
    use super::UtcOffsetSeconds;
    use tzif::data::{posix::TimeZoneVariantInfo, tzif::LocalTimeTypeRecord};

    impl From<&TimeZoneVariantInfo> for UtcOffsetSeconds {
        fn from(value: &TimeZoneVariantInfo) -> Self {
            // POSIX TZ strings count westward, so the sign is flipped.
            Self(-value.offset.0)
        }
    }

    impl From<LocalTimeTypeRecord> for UtcOffsetSeconds {
        fn from(value: LocalTimeTypeRecord) -> Self {
            Self(value.utoff.0)
        }
    }
}

/// The wall-clock fields a provider resolves against a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
    pub microsecond: u16,
    pub nanosecond: u16,
}

impl IsoDateTime {
    /// Reads the fields as if they were UTC and counts nanoseconds from the epoch.
    pub fn as_nanoseconds(&self) -> EpochNanoseconds {
        let days = utils::epoch_days_from_gregorian_date(self.year, self.month, self.day);
        let seconds = i128::from(days) * i128::from(utils::SECONDS_PER_DAY)
            + i128::from(self.hour) * 3600
            + i128::from(self.minute) * 60
            + i128::from(self.second);
        let subsecond = i128::from(self.millisecond) * 1_000_000
            + i128::from(self.microsecond) * 1_000
            + i128::from(self.nanosecond);
        EpochNanoseconds(seconds * NS_PER_SECOND + subsecond)
    }
}

/// An instant together with the offset the zone applies at it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EpochNanosecondsAndOffset {
    pub ns: EpochNanoseconds,
    pub offset: UtcOffsetSeconds,
}

/// The offset in effect at an instant, and when it took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneTransitionInfo {
    /// Epoch seconds of the transition that introduced `offset`, if there was one.
    pub transition_epoch: Option<i64>,
    pub offset: UtcOffsetSeconds,
}

/// Which way to search for an offset change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDirection {
    Next,
    Previous,
}

impl TransitionDirection {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Previous => "previous",
        }
    }
}

impl FromStr for TransitionDirection {
    type Err = TimeZoneProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Next, Self::Previous]
            .into_iter()
            .find(|direction| direction.as_str() == s)
            .ok_or(TimeZoneProviderError::Range(
                "provided string was not a valid direction.",
            ))
    }
}

impl fmt::Display for TransitionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes the skipped stretch of local time around a forward transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GapEntryOffsets {
    pub offset_before: UtcOffsetSeconds,
    pub offset_after: UtcOffsetSeconds,
    pub transition_epoch: EpochNanoseconds,
}

impl GapEntryOffsets {
    /// How far the wall clock jumped, in nanoseconds.
    pub fn gap_nanoseconds(&self) -> i128 {
        self.offset_after.as_nanoseconds() - self.offset_before.as_nanoseconds()
    }
}

/// The instants a local date-time may refer to: none in a gap, two in an
/// overlap, one otherwise.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CandidateEpochNanoseconds {
    Zero(GapEntryOffsets),
    One(EpochNanosecondsAndOffset),
    Two([EpochNanosecondsAndOffset; 2]),
}

impl CandidateEpochNanoseconds {
    /// The candidates in ascending order.
    pub fn as_slice(&self) -> &[EpochNanosecondsAndOffset] {
        match self {
            Self::Zero(_) => &[],
            Self::One(one) => core::slice::from_ref(one),
            Self::Two(both) => both,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Zero(_))
    }
}

/// A source of named time zone data.
///
/// Identifiers are matched ASCII case-insensitively. Offset-based zones never
/// reach a provider.
pub trait TimeZoneProvider {
    /// The identifier as the provider stores it. Links are left unresolved.
    fn normalize_identifier(&self, ident: &'_ [u8]) -> TimeZoneProviderResult<Cow<'_, str>>;

    /// The primary identifier, following links to their target zone.
    fn canonicalize_identifier(&self, ident: &'_ [u8]) -> TimeZoneProviderResult<Cow<'_, str>>;

    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        local_datetime: IsoDateTime,
    ) -> TimeZoneProviderResult<CandidateEpochNanoseconds>;

    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> TimeZoneProviderResult<TimeZoneTransitionInfo>;

    /// The nearest offset change strictly after (`Next`) or before (`Previous`)
    /// the instant, or `None` when there is no such change.
    fn get_named_tz_transition(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
        direction: TransitionDirection,
    ) -> TimeZoneProviderResult<Option<EpochNanoseconds>>;
}

/// A provider without any zones. Every lookup fails with
/// [`TimeZoneProviderError::UnknownIdentifier`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverProvider;

impl TimeZoneProvider for NeverProvider {
    fn normalize_identifier(&self, _: &'_ [u8]) -> TimeZoneProviderResult<Cow<'_, str>> {
        Err(TimeZoneProviderError::UnknownIdentifier)
    }

    fn canonicalize_identifier(&self, _: &'_ [u8]) -> TimeZoneProviderResult<Cow<'_, str>> {
        Err(TimeZoneProviderError::UnknownIdentifier)
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        _: &str,
        _: IsoDateTime,
    ) -> TimeZoneProviderResult<CandidateEpochNanoseconds> {
        Err(TimeZoneProviderError::UnknownIdentifier)
    }

    fn get_named_tz_offset_nanoseconds(
        &self,
        _: &str,
        _: i128,
    ) -> TimeZoneProviderResult<TimeZoneTransitionInfo> {
        Err(TimeZoneProviderError::UnknownIdentifier)
    }

    fn get_named_tz_transition(
        &self,
        _: &str,
        _: i128,
        _: TransitionDirection,
    ) -> TimeZoneProviderResult<Option<EpochNanoseconds>> {
        Err(TimeZoneProviderError::UnknownIdentifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn local(year: i32, month: u8, day: u8, hour: u8, nanosecond: u16) -> IsoDateTime {
        IsoDateTime {
            year,
            month,
            day,
            hour,
            minute: 0,
            second: 0,
            millisecond: 0,
            microsecond: 0,
            nanosecond,
        }
    }

    #[test]
    fn local_fields_read_as_utc() {
        assert_eq!(
            local(2020, 3, 8, 7, 1).as_nanoseconds(),
            EpochNanoseconds(1_583_650_800_000_000_001)
        );
        assert_eq!(local(1970, 1, 1, 0, 0).as_nanoseconds(), EpochNanoseconds(0));
        assert_eq!(
            local(1969, 12, 31, 23, 0).as_nanoseconds(),
            EpochNanoseconds(-3_600_000_000_000)
        );
    }

    #[test]
    fn candidate_counts() {
        let instant = EpochNanosecondsAndOffset {
            ns: EpochNanoseconds(0),
            offset: UtcOffsetSeconds(3600),
        };
        let gap = CandidateEpochNanoseconds::Zero(GapEntryOffsets::default());
        assert!(gap.is_empty());
        assert_eq!(gap.len(), 0);
        assert_eq!(CandidateEpochNanoseconds::One(instant).as_slice(), &[instant]);
        assert_eq!(CandidateEpochNanoseconds::Two([instant; 2]).len(), 2);
    }

    #[test]
    fn never_provider_rejects() {
        assert_eq!(
            NeverProvider.normalize_identifier(b"UTC"),
            Err(TimeZoneProviderError::UnknownIdentifier)
        );
        assert_eq!(
            NeverProvider.get_named_tz_transition("UTC", 0, TransitionDirection::Next),
            Err(TimeZoneProviderError::UnknownIdentifier)
        );
    }

    #[test]
    fn direction_strings() {
        assert_eq!("next".parse::<TransitionDirection>(), Ok(TransitionDirection::Next));
        assert_eq!(TransitionDirection::Previous.to_string(), "previous");
        assert!(matches!(
            "forward".parse::<TransitionDirection>(),
            Err(TimeZoneProviderError::Range(_))
        ));
    }
}
