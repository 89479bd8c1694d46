//! Gregorian calendar equations used while resolving TZif and POSIX TZ data.
//!
//! The epoch day conversions use the days-from-civil formulation over 400 year eras, which
//! stays exact over the full supported year range.

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

const DAYS_IN_400_YEARS: i64 = 146_097;
/// Days from 0000-03-01 to 1970-01-01.
const EPOCH_SHIFT: i64 = 719_468;

/// Returns the number of days since 1970-01-01 for a proleptic Gregorian date.
pub const fn epoch_days_from_gregorian_date(year: i32, month: u8, day: u8) -> i64 {
    let year = year as i64 - (month <= 2) as i64;
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let shifted_month = (month as i64 + 9) % 12;
    let day_of_year = (153 * shifted_month + 2) / 5 + day as i64 - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * DAYS_IN_400_YEARS + day_of_era - EPOCH_SHIFT
}

/// Returns the proleptic Gregorian `(year, month, day)` for days since 1970-01-01.
pub const fn ymd_from_epoch_days(epoch_days: i64) -> (i32, u8, u8) {
    let shifted = epoch_days + EPOCH_SHIFT;
    let era = shifted.div_euclid(DAYS_IN_400_YEARS);
    let day_of_era = shifted - era * DAYS_IN_400_YEARS;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36524 - day_of_era / 146_096) / 365;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let shifted_month = (5 * day_of_year + 2) / 153;
    let day = day_of_year - (153 * shifted_month + 2) / 5 + 1;
    let month = if shifted_month < 10 {
        shifted_month + 3
    } else {
        shifted_month - 9
    };
    let year = year_of_era + era * 400 + (month <= 2) as i64;
    (year as i32, month as u8, day as u8)
}

pub(crate) const fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) const fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Days since the epoch of January 1st of `year`.
pub(crate) fn epoch_days_for_year(year: i32) -> i64 {
    epoch_days_from_gregorian_date(year, 1, 1)
}

/// Days in the year preceding the zero-based `month`.
pub(crate) fn month_to_day(month: u8, is_leap: bool) -> u16 {
    const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    let days = DAYS_BEFORE_MONTH
        .get(usize::from(month))
        .copied()
        .unwrap_or(334);
    if is_leap && month >= 2 {
        days + 1
    } else {
        days
    }
}

/// Day of week for epoch seconds, where Sunday is 0 as in POSIX TZ rules.
pub(crate) fn epoch_seconds_to_day_of_week(seconds: i64) -> u8 {
    // 1970-01-01 was a Thursday.
    (seconds.div_euclid(SECONDS_PER_DAY) + 4).rem_euclid(7) as u8
}

pub(crate) fn epoch_seconds_to_iso_year(seconds: i64) -> i32 {
    ymd_from_epoch_days(seconds.div_euclid(SECONDS_PER_DAY)).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_days_round_trip() {
        for days in [-719_468, -1, 0, 1, 11_016, 18_000, 2_932_896, -100_000_001] {
            let (y, m, d) = ymd_from_epoch_days(days);
            assert_eq!(epoch_days_from_gregorian_date(y, m, d), days);
        }
        assert_eq!(ymd_from_epoch_days(0), (1970, 1, 1));
        assert_eq!(epoch_days_from_gregorian_date(2000, 3, 1), 11_017);
        assert_eq!(ymd_from_epoch_days(-1), (1969, 12, 31));
    }

    #[test]
    fn day_of_week() {
        // 2017-03-12 was a Sunday
        let seconds = epoch_days_from_gregorian_date(2017, 3, 12) * SECONDS_PER_DAY;
        assert_eq!(epoch_seconds_to_day_of_week(seconds), 0);
        assert_eq!(epoch_seconds_to_day_of_week(-1), 3);
    }

    #[test]
    fn days_before_month() {
        assert_eq!(month_to_day(2, true), 60);
        assert_eq!(month_to_day(2, false), 59);
        assert_eq!(month_to_day(0, true), 0);
    }
}
