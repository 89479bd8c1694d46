//! Integer date equations for the proleptic Gregorian calendar.

pub(crate) use zone_provider::utils::{epoch_days_from_gregorian_date, ymd_from_epoch_days};

/// The Rata Die (days since 0001-01-00) of 1970-01-01.
pub(crate) const UNIX_EPOCH_RATA_DIE: i64 = 719_163;

#[inline]
pub(crate) const fn is_leap(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Note: month is 1 based.
pub(crate) const fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap(year) => 29,
        _ => 28,
    }
}

#[inline]
pub(crate) const fn iso_days_in_year(year: i32) -> u16 {
    if is_leap(year) {
        366
    } else {
        365
    }
}

pub(crate) fn iso_day_of_year(year: i32, month: u8, day: u8) -> u16 {
    let start = epoch_days_from_gregorian_date(year, 1, 1);
    (epoch_days_from_gregorian_date(year, month, day) - start + 1) as u16
}

/// Returns the ISO day of the week, Monday is 1 and Sunday is 7.
#[inline]
pub(crate) fn epoch_days_to_day_of_week(epoch_days: i64) -> u16 {
    // 1970-01-01 was a Thursday.
    ((epoch_days + 3).rem_euclid(7) + 1) as u16
}

fn iso_weeks_in_year(year: i32) -> u8 {
    let p = |y: i64| (y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)).rem_euclid(7);
    let year = i64::from(year);
    if p(year) == 4 || p(year - 1) == 3 {
        53
    } else {
        52
    }
}

/// Returns the ISO 8601 week-numbering `(year, week)` for a date.
pub(crate) fn iso_week_of_year(year: i32, month: u8, day: u8) -> (i32, u8) {
    let day_of_year = i32::from(iso_day_of_year(year, month, day));
    let day_of_week = i32::from(epoch_days_to_day_of_week(epoch_days_from_gregorian_date(
        year, month, day,
    )));
    let week = (day_of_year - day_of_week + 10).div_euclid(7);
    if week < 1 {
        (year - 1, iso_weeks_in_year(year - 1))
    } else if week > i32::from(iso_weeks_in_year(year)) {
        (year + 1, 1)
    } else {
        (year, week as u8)
    }
}
