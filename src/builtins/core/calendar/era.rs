//! Calendar era tables.
//!
//! Each era maps an era year onto the arithmetic (extended) year that the
//! calendar uses internally.

use core::ops::RangeInclusive;

use tinystr::{tinystr, TinyAsciiStr};

use super::CalendarKind;

/// Relevant Era info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EraInfo {
    pub(crate) name: TinyAsciiStr<16>,
    pub(crate) range: RangeInclusive<i32>,
    pub(crate) arithmetic_year: ArithmeticYear,
}

/// The way to map an era year to an arithmetic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArithmeticYear {
    /// One era year is one arithmetic year.
    DefaultEra,
    /// The first year of the era is the arithmetic year `offset`.
    Offset(i32),
    /// The era counts backwards, year 1 of the era is arithmetic year 0.
    Inverse,
}

impl EraInfo {
    pub(crate) fn arithmetic_year_for(&self, era_year: i32) -> i32 {
        match self.arithmetic_year {
            ArithmeticYear::DefaultEra => era_year,
            ArithmeticYear::Offset(offset) => offset + era_year - 1,
            ArithmeticYear::Inverse => 1 - era_year,
        }
    }
}

macro_rules! valid_era {
    ($name:literal, $range:expr, $ext:expr ) => {
        EraInfo {
            name: tinystr!(16, $name),
            range: $range,
            arithmetic_year: $ext,
        }
    };
    ($name:literal, $range:expr ) => {
        valid_era!($name, $range, ArithmeticYear::DefaultEra)
    };
}

const BUDDHIST_ERA: EraInfo = valid_era!("be", i32::MIN..=i32::MAX);
const COPTIC_ERA: EraInfo = valid_era!("am", i32::MIN..=i32::MAX);
const ETHIOPIC_ERA: EraInfo = valid_era!("am", 1..=i32::MAX);
const ETHIOPIC_ETHIOAA_ERA: EraInfo =
    valid_era!("aa", i32::MIN..=5500, ArithmeticYear::Offset(-5499));
const ETHIOAA_ERA: EraInfo = valid_era!("aa", i32::MIN..=i32::MAX);
const GREGORY_ERA: EraInfo = valid_era!("ce", 1..=i32::MAX);
const GREGORY_INVERSE_ERA: EraInfo = valid_era!("bce", 1..=i32::MAX, ArithmeticYear::Inverse);
const HEBREW_ERA: EraInfo = valid_era!("am", i32::MIN..=i32::MAX);
const INDIAN_ERA: EraInfo = valid_era!("shaka", i32::MIN..=i32::MAX);
const HIJRI_ERA: EraInfo = valid_era!("ah", 1..=i32::MAX);
const HIJRI_INVERSE_ERA: EraInfo = valid_era!("bh", 1..=i32::MAX, ArithmeticYear::Inverse);
const MEIJI_ERA: EraInfo = valid_era!("meiji", 1..=45, ArithmeticYear::Offset(1868));
const TAISHO_ERA: EraInfo = valid_era!("taisho", 1..=15, ArithmeticYear::Offset(1912));
const SHOWA_ERA: EraInfo = valid_era!("showa", 1..=64, ArithmeticYear::Offset(1926));
const HEISEI_ERA: EraInfo = valid_era!("heisei", 1..=31, ArithmeticYear::Offset(1989));
const REIWA_ERA: EraInfo = valid_era!("reiwa", 1..=i32::MAX, ArithmeticYear::Offset(2019));
const JAPANESE_ERA: EraInfo = valid_era!("ce", 1..=1872);
const JAPANESE_INVERSE_ERA: EraInfo = valid_era!("bce", 1..=i32::MAX, ArithmeticYear::Inverse);
const PERSIAN_ERA: EraInfo = valid_era!("ap", i32::MIN..=i32::MAX);
const ROC_ERA: EraInfo = valid_era!("roc", 1..=i32::MAX);
const ROC_INVERSE_ERA: EraInfo = valid_era!("broc", 1..=i32::MAX, ArithmeticYear::Inverse);

/// Era aliases accepted on input alongside the canonical era codes.
const ERA_ALIASES: &[(&str, &str)] = &[
    ("ad", "ce"),
    ("bc", "bce"),
    ("incar", "am"),
    ("mundi", "aa"),
    ("saka", "shaka"),
    ("minguo", "roc"),
    ("before-roc", "broc"),
    ("minguo-qian", "broc"),
];

/// Returns the eras a calendar supports, the default era first.
pub(crate) fn eras_for(kind: CalendarKind) -> &'static [EraInfo] {
    match kind {
        CalendarKind::Iso | CalendarKind::Chinese | CalendarKind::Dangi => &[],
        CalendarKind::Buddhist => &[BUDDHIST_ERA],
        CalendarKind::Coptic => &[COPTIC_ERA],
        CalendarKind::Ethiopian => &[ETHIOPIC_ERA, ETHIOPIC_ETHIOAA_ERA],
        CalendarKind::EthiopianAmeteAlem => &[ETHIOAA_ERA],
        CalendarKind::Gregorian => &[GREGORY_ERA, GREGORY_INVERSE_ERA],
        CalendarKind::Hebrew => &[HEBREW_ERA],
        CalendarKind::Indian => &[INDIAN_ERA],
        CalendarKind::HijriTabularFriday
        | CalendarKind::HijriTabularThursday
        | CalendarKind::HijriUmmAlQura => &[HIJRI_ERA, HIJRI_INVERSE_ERA],
        CalendarKind::Japanese | CalendarKind::JapaneseExtended => &[
            REIWA_ERA,
            HEISEI_ERA,
            SHOWA_ERA,
            TAISHO_ERA,
            MEIJI_ERA,
            JAPANESE_ERA,
            JAPANESE_INVERSE_ERA,
        ],
        CalendarKind::Persian => &[PERSIAN_ERA],
        CalendarKind::Roc => &[ROC_ERA, ROC_INVERSE_ERA],
    }
}

/// Looks up an era by its code or one of its aliases.
pub(crate) fn era_info(kind: CalendarKind, era: &str) -> Option<&'static EraInfo> {
    let era = ERA_ALIASES
        .iter()
        .find(|(alias, _)| *alias == era)
        .map_or(era, |(_, canonical)| canonical);
    eras_for(kind).iter().find(|info| info.name == era)
}

#[cfg(test)]
mod tests {
    use super::{era_info, eras_for};
    use crate::builtins::core::calendar::CalendarKind;

    #[test]
    fn arithmetic_years() {
        let reiwa = era_info(CalendarKind::Japanese, "reiwa").unwrap();
        assert_eq!(reiwa.arithmetic_year_for(1), 2019);
        let bce = era_info(CalendarKind::Gregorian, "bc").unwrap();
        assert_eq!(bce.arithmetic_year_for(1), 0);
        assert_eq!(bce.arithmetic_year_for(10), -9);
        let aa = era_info(CalendarKind::Ethiopian, "aa").unwrap();
        assert_eq!(aa.arithmetic_year_for(5501), 1);
    }

    #[test]
    fn eraless_calendars() {
        assert!(eras_for(CalendarKind::Iso).is_empty());
        assert!(eras_for(CalendarKind::Chinese).is_empty());
        assert!(era_info(CalendarKind::Dangi, "dangi").is_none());
        assert!(era_info(CalendarKind::Roc, "be").is_none());
    }
}
