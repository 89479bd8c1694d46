//! POSIX TZ rule evaluation.
//!
//! TZif files only list transitions up to some year. Times after the last listed transition
//! are resolved with the POSIX TZ string stored in the footer, which describes a yearly
//! standard/daylight rule such as `EST5EDT,M3.2.0,M11.1.0`.

use alloc::vec::Vec;
use core::ops::Range;

use tzif::data::posix::{DstTransitionInfo, PosixTzString, TransitionDate, TransitionDay};

use crate::{
    epoch_nanoseconds::NS_IN_S,
    provider::{TimeZoneTransitionInfo, TransitionDirection, UtcOffsetSeconds},
    utils,
};

/// Stores the information about DST transitions for a given year
pub(crate) struct DstTransitionInfoForYear {
    pub(crate) dst_start_seconds: i64,
    pub(crate) dst_end_seconds: i64,
    pub(crate) std_offset: UtcOffsetSeconds,
    pub(crate) dst_offset: UtcOffsetSeconds,
}

impl DstTransitionInfoForYear {
    pub(crate) fn compute(
        posix_tz_string: &PosixTzString,
        dst_variant: &DstTransitionInfo,
        year: i32,
    ) -> Self {
        let std_offset = UtcOffsetSeconds::from(&posix_tz_string.std_info);
        let dst_offset = UtcOffsetSeconds::from(&dst_variant.variant_info);
        let dst_start_seconds =
            calculate_transition_seconds_for_year(year, dst_variant.start_date, std_offset);
        let dst_end_seconds =
            calculate_transition_seconds_for_year(year, dst_variant.end_date, dst_offset);
        Self {
            dst_start_seconds,
            dst_end_seconds,
            std_offset,
            dst_offset,
        }
    }

    /// The two transitions of the year as `(epoch seconds, offset after)`, in time order.
    fn transitions(&self) -> [(i64, UtcOffsetSeconds); 2] {
        let start = (self.dst_start_seconds, self.dst_offset);
        let end = (self.dst_end_seconds, self.std_offset);
        if start.0 <= end.0 {
            [start, end]
        } else {
            [end, start]
        }
    }
}

/// Returns the UTC epoch seconds at which `transition_date` occurs in `year`.
///
/// `offset` is the offset in effect before the transition, since POSIX transition times are
/// expressed in local time.
pub(crate) fn calculate_transition_seconds_for_year(
    year: i32,
    transition_date: TransitionDate,
    offset: UtcOffsetSeconds,
) -> i64 {
    let year_epoch_seconds = utils::epoch_days_for_year(year) * utils::SECONDS_PER_DAY;
    let is_leap = utils::is_leap(year);

    // Zero-indexed day of the year.
    let days = match transition_date.day {
        // Jn: 1..=365, February 29th is never counted.
        TransitionDay::NoLeap(day) if day > 59 => day - 1 + u16::from(is_leap),
        TransitionDay::NoLeap(day) => day - 1,
        // n: 0..=365, February 29th is counted.
        TransitionDay::WithLeap(day) => day,
        TransitionDay::Mwd(month, week, day) => {
            let days_to_month = utils::month_to_day((month - 1) as u8, is_leap);
            let days_in_month = u16::from(utils::iso_days_in_month(year, month as u8));

            // Day of week of the first day of the month, Sunday is 0.
            let first_weekday = (u16::from(utils::epoch_seconds_to_day_of_week(
                year_epoch_seconds,
            )) + days_to_month)
                .rem_euclid(7);

            // The first `day` of the month falls on the zero-indexed day
            // `(day - first_weekday) mod 7`; each further week adds 7.
            let mut day_of_month = (week - u16::from(first_weekday <= day)) * 7 + day - first_weekday;

            // Week 5 is "the last such weekday of the month".
            if day_of_month + 1 > days_in_month {
                day_of_month -= 7
            }

            days_to_month + day_of_month
        }
    };

    year_epoch_seconds + i64::from(days) * utils::SECONDS_PER_DAY + transition_date.time.0
        - offset.0
}

/// Collects the rule transitions of the years around `seconds` in time order.
fn transitions_around(
    posix_tz_string: &PosixTzString,
    dst_variant: &DstTransitionInfo,
    seconds: i64,
) -> Vec<(i64, UtcOffsetSeconds)> {
    let year = utils::epoch_seconds_to_iso_year(seconds);
    let mut transitions = Vec::with_capacity(6);
    for year in year - 1..=year + 1 {
        let info = DstTransitionInfoForYear::compute(posix_tz_string, dst_variant, year);
        transitions.extend(info.transitions());
    }
    transitions
}

/// Resolves the offset in effect at exact epoch `seconds` with a POSIX TZ rule.
pub(crate) fn resolve_posix_tz_string_for_epoch_seconds(
    posix_tz_string: &PosixTzString,
    seconds: i64,
) -> TimeZoneTransitionInfo {
    let std_offset = UtcOffsetSeconds::from(&posix_tz_string.std_info);
    let Some(dst_variant) = &posix_tz_string.dst_info else {
        return TimeZoneTransitionInfo {
            transition_epoch: None,
            offset: std_offset,
        };
    };

    transitions_around(posix_tz_string, dst_variant, seconds)
        .into_iter()
        .rev()
        .find(|(epoch, _)| *epoch <= seconds)
        .map(|(epoch, offset)| TimeZoneTransitionInfo {
            transition_epoch: Some(epoch),
            offset,
        })
        .unwrap_or(TimeZoneTransitionInfo {
            transition_epoch: None,
            offset: std_offset,
        })
}

/// Returns the closest POSIX rule transition strictly after or before `epoch_nanoseconds`.
pub(crate) fn posix_tz_string_transition(
    posix_tz_string: &PosixTzString,
    epoch_nanoseconds: i128,
    direction: TransitionDirection,
) -> Option<i64> {
    let dst_variant = posix_tz_string.dst_info.as_ref()?;
    let std_offset = UtcOffsetSeconds::from(&posix_tz_string.std_info);
    if std_offset == UtcOffsetSeconds::from(&dst_variant.variant_info) {
        return None;
    }
    let seconds = epoch_nanoseconds.div_euclid(NS_IN_S) as i64;
    let transitions = transitions_around(posix_tz_string, dst_variant, seconds);
    match direction {
        TransitionDirection::Next => transitions
            .iter()
            .map(|(epoch, _)| *epoch)
            .find(|epoch| i128::from(*epoch) * NS_IN_S > epoch_nanoseconds),
        TransitionDirection::Previous => transitions
            .iter()
            .rev()
            .map(|(epoch, _)| *epoch)
            .find(|epoch| i128::from(*epoch) * NS_IN_S < epoch_nanoseconds),
    }
}

/// A half-open range between two offsets, whichever is smaller first.
pub(crate) fn offset_range(offset_one: i64, offset_two: i64) -> Range<i64> {
    if offset_one < offset_two {
        return offset_one..offset_two;
    }
    offset_two..offset_one
}
