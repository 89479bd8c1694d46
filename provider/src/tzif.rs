//! A provider backed by TZif data.
//!
//! `TZif` stands for Time zone information format, laid out by [RFC 8536][rfc8536] and the
//! [tzdata manual][tzif-manual]. The bytes are taken from `jiff-tzdb`, which bundles the
//! compiled tz database, and parsed with the [`tzif` crate][tzif-crate].
//!
//! Files produced in the "slim" format only list transitions up to the year the rule last
//! changed, so lookups past the last transition fall through to the POSIX TZ string footer.
//!
//! [rfc8536]: https://datatracker.ietf.org/doc/html/rfc8536
//! [tzif-manual]: https://man7.org/linux/man-pages/man5/tzfile.5.html
//! [tzif-crate]: https://docs.rs/tzif/latest/tzif/

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::String;
use core::str;
use std::sync::RwLock;

use combine::Parser;

use tzif::data::{
    posix::PosixTzString,
    time::Seconds,
    tzif::{DataBlock, LocalTimeTypeRecord, TzifData},
};

use crate::{
    common::{self, offset_range},
    epoch_nanoseconds::{EpochNanoseconds, NS_IN_S, NS_PER_DAY},
    identifiers,
    provider::{
        CandidateEpochNanoseconds, EpochNanosecondsAndOffset, GapEntryOffsets, IsoDateTime,
        TimeZoneProvider, TimeZoneProviderResult, TimeZoneTransitionInfo, TransitionDirection,
        UtcOffsetSeconds,
    },
    TimeZoneProviderError,
};

/// Parsed TZif data for a single zone.
#[derive(Debug, Clone)]
pub struct Tzif {
    data_block: DataBlock,
    footer: Option<PosixTzString>,
}

impl From<TzifData> for Tzif {
    fn from(value: TzifData) -> Self {
        let TzifData {
            data_block1,
            data_block2,
            footer,
            ..
        } = value;

        // The v1 block only carries 32-bit transitions, prefer the v2+ block when present.
        Self {
            data_block: data_block2.unwrap_or(data_block1),
            footer,
        }
    }
}

impl Tzif {
    pub fn from_bytes(data: &[u8]) -> TimeZoneProviderResult<Self> {
        let Ok((parse_result, _)) = tzif::parse::tzif::tzif().parse(data) else {
            return Err(TimeZoneProviderError::Assert("Illformed Tzif data."));
        };
        Ok(Self::from(parse_result))
    }

    pub fn posix_tz_string(&self) -> Option<&PosixTzString> {
        self.footer.as_ref()
    }

    fn first_record(&self) -> TimeZoneProviderResult<LocalTimeTypeRecord> {
        self.data_block
            .local_time_type_records
            .first()
            .copied()
            .ok_or(TimeZoneProviderError::Assert("Tzif has no local time type records."))
    }

    /// The local time type that applies from transition `idx` onwards.
    fn record_for_transition(&self, idx: usize) -> TimeZoneProviderResult<LocalTimeTypeRecord> {
        let db = &self.data_block;
        let record_idx = db
            .transition_types
            .get(idx)
            .ok_or(TimeZoneProviderError::Assert("Transition type out of range."))?;
        db.local_time_type_records
            .get(*record_idx)
            .copied()
            .ok_or(TimeZoneProviderError::Assert("Local time type out of range."))
    }

    fn transition_info(&self, idx: usize) -> TimeZoneProviderResult<TimeZoneTransitionInfo> {
        let transition_epoch = self
            .data_block
            .transition_times
            .get(idx)
            .map(|seconds| seconds.0);
        Ok(TimeZoneTransitionInfo {
            transition_epoch,
            offset: self.record_for_transition(idx)?.into(),
        })
    }

    /// Returns the offset in effect at exact epoch seconds, with the epoch of the
    /// transition that put it in effect.
    pub fn get(&self, epoch_seconds: &Seconds) -> TimeZoneProviderResult<TimeZoneTransitionInfo> {
        let transitions = &self.data_block.transition_times;

        match transitions.binary_search(epoch_seconds) {
            // A transition at exactly these seconds applies the new offset.
            Ok(idx) => self.transition_info(idx),
            Err(idx) if idx == transitions.len() => {
                let last_transition = transitions.last().map(|seconds| seconds.0);
                match self.posix_tz_string() {
                    Some(posix_tz_string) => {
                        let mut info = common::resolve_posix_tz_string_for_epoch_seconds(
                            posix_tz_string,
                            epoch_seconds.0,
                        );
                        // The rule only governs times after the last listed transition.
                        if let Some(last) = last_transition {
                            if info.transition_epoch.map_or(true, |epoch| epoch < last) {
                                info.transition_epoch = Some(last);
                            }
                        }
                        Ok(info)
                    }
                    None if idx == 0 => Ok(TimeZoneTransitionInfo {
                        transition_epoch: None,
                        offset: self.first_record()?.into(),
                    }),
                    None => self.transition_info(idx - 1),
                }
            }
            // Before the first transition the first local time type is in effect.
            Err(0) => Ok(TimeZoneTransitionInfo {
                transition_epoch: None,
                offset: self.first_record()?.into(),
            }),
            Err(idx) => self.transition_info(idx - 1),
        }
    }

    /// Returns the offset in effect at `epoch_nanoseconds`.
    pub fn offset_for_epoch_nanoseconds(
        &self,
        epoch_nanoseconds: i128,
    ) -> TimeZoneProviderResult<TimeZoneTransitionInfo> {
        let seconds = EpochNanoseconds(epoch_nanoseconds).floor_seconds();
        self.get(&Seconds(seconds))
    }

    /// Returns the exact instants whose local wall-clock reading is `local_datetime`.
    ///
    /// Any local time has at most two candidates, one per offset in effect within a day of it.
    /// Each offset `o` seen a day before or after produces the candidate `local - o`, which is
    /// kept only if that instant actually uses `o`.
    pub fn v2_estimate_tz_pair(
        &self,
        local_datetime: &IsoDateTime,
    ) -> TimeZoneProviderResult<CandidateEpochNanoseconds> {
        let local_ns = local_datetime.as_nanoseconds().0;
        let day = i128::from(NS_PER_DAY);

        let before = self.offset_for_epoch_nanoseconds(local_ns - day)?;
        let after = self.offset_for_epoch_nanoseconds(local_ns + day)?;

        let mut candidates = [None, None];
        let offsets = if before.offset == after.offset {
            [Some(before.offset), None]
        } else {
            [Some(before.offset), Some(after.offset)]
        };

        for (slot, offset) in candidates.iter_mut().zip(offsets) {
            let Some(offset) = offset else {
                continue;
            };
            let ns = local_ns - offset.as_nanoseconds();
            if self.offset_for_epoch_nanoseconds(ns)?.offset == offset {
                *slot = Some(EpochNanosecondsAndOffset {
                    ns: EpochNanoseconds(ns),
                    offset,
                });
            }
        }

        match candidates {
            [Some(first), Some(second)] => {
                // In an overlap the earlier offset is the larger one, so its candidate
                // instant comes first.
                if first.ns <= second.ns {
                    Ok(CandidateEpochNanoseconds::Two([first, second]))
                } else {
                    Ok(CandidateEpochNanoseconds::Two([second, first]))
                }
            }
            [Some(one), None] | [None, Some(one)] => Ok(CandidateEpochNanoseconds::One(one)),
            [None, None] => {
                let transition_epoch = self
                    .get_time_zone_transition(local_ns - day, TransitionDirection::Next)?
                    .unwrap_or(EpochNanoseconds(local_ns));
                Ok(CandidateEpochNanoseconds::Zero(GapEntryOffsets {
                    offset_before: before.offset,
                    offset_after: after.offset,
                    transition_epoch,
                }))
            }
        }
    }

    /// Returns whether the transition at `idx` changes the UTC offset.
    fn is_offset_change(&self, idx: usize) -> TimeZoneProviderResult<bool> {
        let after = UtcOffsetSeconds::from(self.record_for_transition(idx)?);
        let before: UtcOffsetSeconds = match idx.checked_sub(1) {
            Some(prev) => self.record_for_transition(prev)?.into(),
            None => self.first_record()?.into(),
        };
        Ok(!offset_range(before.0, after.0).is_empty())
    }

    /// Returns the closest transition strictly after or before `epoch_nanoseconds` that
    /// changes the UTC offset.
    pub fn get_time_zone_transition(
        &self,
        epoch_nanoseconds: i128,
        direction: TransitionDirection,
    ) -> TimeZoneProviderResult<Option<EpochNanoseconds>> {
        let transitions = &self.data_block.transition_times;
        let last_transition = transitions.last().map(|seconds| seconds.0);

        match direction {
            TransitionDirection::Next => {
                // T * 1e9 > ns holds exactly when T > floor(ns / 1e9).
                let seconds = EpochNanoseconds(epoch_nanoseconds).floor_seconds();
                let start = transitions.partition_point(|t| t.0 <= seconds);
                for idx in start..transitions.len() {
                    if self.is_offset_change(idx)? {
                        return Ok(transitions.get(idx).map(|t| EpochNanoseconds::from(*t)));
                    }
                }
                let Some(posix_tz_string) = self.posix_tz_string() else {
                    return Ok(None);
                };
                let from = match last_transition {
                    Some(last) => epoch_nanoseconds.max(i128::from(last) * NS_IN_S),
                    None => epoch_nanoseconds,
                };
                Ok(common::posix_tz_string_transition(posix_tz_string, from, direction)
                    .map(EpochNanoseconds::from_seconds))
            }
            TransitionDirection::Previous => {
                if let (Some(posix_tz_string), Some(last)) =
                    (self.posix_tz_string(), last_transition)
                {
                    if i128::from(last) * NS_IN_S < epoch_nanoseconds {
                        let candidate = common::posix_tz_string_transition(
                            posix_tz_string,
                            epoch_nanoseconds,
                            direction,
                        );
                        if let Some(seconds) = candidate.filter(|seconds| *seconds > last) {
                            return Ok(Some(EpochNanoseconds::from_seconds(seconds)));
                        }
                    }
                }
                // T * 1e9 < ns holds exactly when T < ceil(ns / 1e9).
                let ceil_seconds = (-(-epoch_nanoseconds).div_euclid(NS_IN_S)) as i64;
                let end = transitions.partition_point(|t| t.0 < ceil_seconds);
                for idx in (0..end).rev() {
                    if self.is_offset_change(idx)? {
                        return Ok(transitions.get(idx).map(|t| EpochNanoseconds::from(*t)));
                    }
                }
                if last_transition.is_none() {
                    if let Some(posix_tz_string) = self.posix_tz_string() {
                        return Ok(common::posix_tz_string_transition(
                            posix_tz_string,
                            epoch_nanoseconds,
                            direction,
                        )
                        .map(EpochNanoseconds::from_seconds));
                    }
                }
                Ok(None)
            }
        }
    }
}

/// A time zone provider over the tz database compiled into the binary by `jiff-tzdb`.
///
/// Zones are parsed on first use and cached for the lifetime of the provider.
#[derive(Debug, Default)]
pub struct CompiledTzdbProvider {
    cache: RwLock<BTreeMap<String, Tzif>>,
}

impl CompiledTzdbProvider {
    /// Looks up the stored casing of `identifier`, accepting links that the bundled data
    /// only carries under their primary name.
    fn normalize_str(identifier: &str) -> TimeZoneProviderResult<&'static str> {
        if let Some((name, _)) = jiff_tzdb::get(identifier) {
            return Ok(name);
        }
        identifiers::normalize_link(identifier)
            .filter(|link| jiff_tzdb::get(identifiers::primary_identifier(link)).is_some())
            .ok_or(TimeZoneProviderError::UnknownIdentifier)
    }

    fn load(identifier: &str) -> TimeZoneProviderResult<Tzif> {
        let (_, bytes) = jiff_tzdb::get(identifier)
            .or_else(|| jiff_tzdb::get(identifiers::primary_identifier(identifier)))
            .ok_or(TimeZoneProviderError::UnknownIdentifier)?;
        let tzif = Tzif::from_bytes(bytes);
        #[cfg(feature = "log")]
        match &tzif {
            Ok(_) => log::debug!("loaded TZif data for {identifier}"),
            Err(err) => log::warn!("could not parse TZif data for {identifier}: {err}"),
        }
        tzif
    }

    /// Runs `f` against the cached data for `identifier`, loading it first if needed.
    pub fn with_tzif<T>(
        &self,
        identifier: &str,
        f: impl FnOnce(&Tzif) -> TimeZoneProviderResult<T>,
    ) -> TimeZoneProviderResult<T> {
        {
            let cache = self
                .cache
                .read()
                .map_err(|_| TimeZoneProviderError::Assert("poisoned RWLock"))?;
            if let Some(tzif) = cache.get(identifier) {
                return f(tzif);
            }
        }

        let tzif = Self::load(identifier)?;
        let mut cache = self
            .cache
            .write()
            .map_err(|_| TimeZoneProviderError::Assert("poisoned RWLock"))?;
        let tzif = cache.entry(identifier.into()).or_insert(tzif);
        f(tzif)
    }
}

impl TimeZoneProvider for CompiledTzdbProvider {
    fn normalize_identifier(&self, ident: &'_ [u8]) -> TimeZoneProviderResult<Cow<'_, str>> {
        let identifier =
            str::from_utf8(ident).map_err(|_| TimeZoneProviderError::UnknownIdentifier)?;
        Self::normalize_str(identifier).map(Cow::Borrowed)
    }

    fn canonicalize_identifier(&self, ident: &'_ [u8]) -> TimeZoneProviderResult<Cow<'_, str>> {
        let identifier =
            str::from_utf8(ident).map_err(|_| TimeZoneProviderError::UnknownIdentifier)?;
        let normalized = Self::normalize_str(identifier)?;
        Ok(Cow::Borrowed(identifiers::primary_identifier(normalized)))
    }

    fn get_named_tz_epoch_nanoseconds(
        &self,
        identifier: &str,
        local_datetime: IsoDateTime,
    ) -> TimeZoneProviderResult<CandidateEpochNanoseconds> {
        self.with_tzif(identifier, |tzif| tzif.v2_estimate_tz_pair(&local_datetime))
    }

    fn get_named_tz_offset_nanoseconds(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> TimeZoneProviderResult<TimeZoneTransitionInfo> {
        EpochNanoseconds(epoch_nanoseconds).check_validity()?;
        self.with_tzif(identifier, |tzif| {
            tzif.offset_for_epoch_nanoseconds(epoch_nanoseconds)
        })
    }

    fn get_named_tz_transition(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
        direction: TransitionDirection,
    ) -> TimeZoneProviderResult<Option<EpochNanoseconds>> {
        self.with_tzif(identifier, |tzif| {
            tzif.get_time_zone_transition(epoch_nanoseconds, direction)
        })
    }
}
