use core::str::FromStr;

use tinystr::tinystr;

use super::{Calendar, CalendarKind, MonthCode};
use crate::{
    builtins::core::{duration::DateDuration, PartialDate, PlainDate},
    error::ErrorKind,
    iso::IsoDate,
    options::{Overflow, Unit},
};

fn month_code(code: &str) -> MonthCode {
    MonthCode::from_str(code).unwrap()
}

#[test]
fn calendar_from_str_is_case_insensitive() {
    let calendar = Calendar::try_from_utf8(b"iSo8601").unwrap();
    assert_eq!(calendar, Calendar::default());

    let calendar = Calendar::try_from_utf8(b"iSO8601").unwrap();
    assert_eq!(calendar, Calendar::default());

    let calendar = Calendar::from_str("Islamic-UmAlQura").unwrap();
    assert_eq!(calendar.kind(), CalendarKind::HijriUmmAlQura);
}

#[test]
fn calendar_invalid_ascii_value() {
    let err = Calendar::from_str("Ä°SO8601").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert_eq!(err.into_message(), "Unknown calendar identifier.");

    let _err = Calendar::from_str("\u{0130}SO8601").unwrap_err();

    // An empty calendar annotation is not an identifier.
    let _err = Calendar::from_str("2025-02-07T01:24:00-06:00[u-ca=]").unwrap_err();
}

#[test]
fn calendar_aliases_and_annotations() {
    assert_eq!(
        Calendar::from_str("islamicc").unwrap(),
        Calendar::HIJRI_TABULAR_FRIDAY
    );
    assert_eq!(
        Calendar::from_str("ethiopic-amete-alem").unwrap().identifier(),
        "ethioaa"
    );
    assert_eq!(
        Calendar::from_str("2025-02-07T01:24:00-06:00[u-ca=hebrew]").unwrap(),
        Calendar::HEBREW
    );
    assert_eq!(
        Calendar::from_str("2025-02-07").unwrap(),
        Calendar::ISO
    );
    for kind in CalendarKind::ALL {
        let calendar = Calendar::from_str(kind.identifier()).unwrap();
        assert_eq!(calendar.kind(), kind);
    }
}

#[test]
fn date_until_largest_year() {
    // tests format: (Date one, Date two, (years, months, weeks, days))
    let tests = [
        ((2021, 7, 16), (2021, 7, 16), (0, 0, 0, 0)),
        ((2021, 7, 16), (2021, 7, 17), (0, 0, 0, 1)),
        ((2021, 7, 16), (2021, 7, 23), (0, 0, 0, 7)),
        ((2021, 7, 16), (2021, 8, 16), (0, 1, 0, 0)),
        ((2020, 12, 16), (2021, 1, 16), (0, 1, 0, 0)),
        ((2021, 1, 5), (2021, 2, 5), (0, 1, 0, 0)),
        ((2021, 1, 7), (2021, 3, 7), (0, 2, 0, 0)),
        ((2021, 7, 16), (2021, 8, 17), (0, 1, 0, 1)),
        ((2021, 7, 16), (2021, 8, 13), (0, 0, 0, 28)),
        ((2021, 7, 16), (2021, 9, 16), (0, 2, 0, 0)),
        ((2021, 7, 16), (2022, 7, 16), (1, 0, 0, 0)),
        ((2021, 7, 16), (2031, 7, 16), (10, 0, 0, 0)),
        ((2021, 7, 16), (2022, 7, 19), (1, 0, 0, 3)),
        ((2021, 7, 16), (2022, 9, 19), (1, 2, 0, 3)),
        ((2021, 7, 16), (2031, 12, 16), (10, 5, 0, 0)),
        ((1997, 12, 16), (2021, 7, 16), (23, 7, 0, 0)),
        ((1997, 7, 16), (2021, 7, 16), (24, 0, 0, 0)),
        ((1997, 7, 16), (2021, 7, 15), (23, 11, 0, 29)),
        ((1997, 6, 16), (2021, 6, 15), (23, 11, 0, 30)),
        ((1960, 2, 16), (2020, 3, 16), (60, 1, 0, 0)),
        ((1960, 2, 16), (2021, 3, 15), (61, 0, 0, 27)),
        ((1960, 2, 16), (2020, 3, 15), (60, 0, 0, 28)),
        ((2021, 3, 30), (2021, 7, 16), (0, 3, 0, 16)),
        ((2020, 3, 30), (2021, 7, 16), (1, 3, 0, 16)),
        ((1960, 3, 30), (2021, 7, 16), (61, 3, 0, 16)),
        ((2019, 12, 30), (2021, 7, 16), (1, 6, 0, 16)),
        ((2020, 12, 30), (2021, 7, 16), (0, 6, 0, 16)),
        ((1997, 12, 30), (2021, 7, 16), (23, 6, 0, 16)),
        ((1, 12, 25), (2021, 7, 16), (2019, 6, 0, 21)),
        ((2019, 12, 30), (2021, 3, 5), (1, 2, 0, 5)),
        ((2021, 7, 17), (2021, 7, 16), (0, 0, 0, -1)),
        ((2021, 7, 23), (2021, 7, 16), (0, 0, 0, -7)),
        ((2021, 8, 16), (2021, 7, 16), (0, -1, 0, 0)),
        ((2021, 1, 16), (2020, 12, 16), (0, -1, 0, 0)),
        ((2021, 2, 5), (2021, 1, 5), (0, -1, 0, 0)),
        ((2021, 3, 7), (2021, 1, 7), (0, -2, 0, 0)),
        ((2021, 8, 17), (2021, 7, 16), (0, -1, 0, -1)),
        ((2021, 8, 13), (2021, 7, 16), (0, 0, 0, -28)),
        ((2021, 9, 16), (2021, 7, 16), (0, -2, 0, 0)),
        ((2022, 7, 16), (2021, 7, 16), (-1, 0, 0, 0)),
        ((2031, 7, 16), (2021, 7, 16), (-10, 0, 0, 0)),
        ((2022, 7, 19), (2021, 7, 16), (-1, 0, 0, -3)),
        ((2022, 9, 19), (2021, 7, 16), (-1, -2, 0, -3)),
        ((2031, 12, 16), (2021, 7, 16), (-10, -5, 0, 0)),
        ((2021, 7, 16), (1997, 12, 16), (-23, -7, 0, 0)),
        ((2021, 7, 16), (1997, 7, 16), (-24, 0, 0, 0)),
        ((2021, 7, 15), (1997, 7, 16), (-23, -11, 0, -30)),
        ((2021, 6, 15), (1997, 6, 16), (-23, -11, 0, -29)),
        ((2020, 3, 16), (1960, 2, 16), (-60, -1, 0, 0)),
        ((2021, 3, 15), (1960, 2, 16), (-61, 0, 0, -28)),
        ((2020, 3, 15), (1960, 2, 16), (-60, 0, 0, -28)),
        ((2021, 7, 16), (2021, 3, 30), (0, -3, 0, -17)),
        ((2021, 7, 16), (2020, 3, 30), (-1, -3, 0, -17)),
        ((2021, 7, 16), (1960, 3, 30), (-61, -3, 0, -17)),
        ((2021, 7, 16), (2019, 12, 30), (-1, -6, 0, -17)),
        ((2021, 7, 16), (2020, 12, 30), (0, -6, 0, -17)),
        ((2021, 7, 16), (1997, 12, 30), (-23, -6, 0, -17)),
        ((2021, 7, 16), (1, 12, 25), (-2019, -6, 0, -22)),
        ((2021, 3, 5), (2019, 12, 30), (-1, -2, 0, -6)),
    ];

    // The Gregorian calendar walks the generic calendar path and must agree with ISO.
    for calendar in [Calendar::ISO, Calendar::GREGORIAN] {
        for (one, two, expected) in tests {
            let first = IsoDate::new_unchecked(one.0, one.1, one.2);
            let second = IsoDate::new_unchecked(two.0, two.1, two.2);
            let result = calendar.date_until(&first, &second, Unit::Year).unwrap();
            assert_eq!(
                (result.years, result.months, result.weeks, result.days),
                expected,
                "{} until {one:?} -> {two:?}",
                calendar.identifier()
            );
        }
    }
}

#[test]
fn date_until_largest_month_and_week() {
    let calendar = Calendar::GREGORIAN;
    let one = IsoDate::new_unchecked(2019, 12, 30);
    let two = IsoDate::new_unchecked(2021, 3, 5);
    let result = calendar.date_until(&one, &two, Unit::Month).unwrap();
    assert_eq!((result.years, result.months, result.days), (0, 14, 5));

    let result = calendar.date_until(&one, &two, Unit::Week).unwrap();
    assert_eq!((result.weeks, result.days), (61, 4));
}

#[test]
fn calendar_idempotence() {
    let samples = [
        IsoDate::new_unchecked(1000, 6, 30),
        IsoDate::new_unchecked(1868, 10, 23),
        IsoDate::new_unchecked(1899, 12, 31),
        IsoDate::new_unchecked(1970, 1, 1),
        IsoDate::new_unchecked(1972, 2, 29),
        IsoDate::new_unchecked(2000, 2, 29),
        IsoDate::new_unchecked(2019, 5, 1),
        IsoDate::new_unchecked(2023, 9, 16),
        IsoDate::new_unchecked(2024, 3, 11),
        IsoDate::new_unchecked(2025, 12, 31),
        IsoDate::new_unchecked(2100, 3, 1),
    ];
    for kind in CalendarKind::ALL {
        let calendar = Calendar::new(kind);
        for iso in samples {
            let date = PlainDate::new_unchecked(iso, calendar);
            let partial = PartialDate::from(&date);
            let result = calendar.date_from_partial(&partial, Overflow::Reject).unwrap();
            assert_eq!(result, date, "{kind} idempotence for {iso:?}");
        }
    }
}

#[test]
fn arithmetic_round_trips_in_every_calendar() {
    let start = IsoDate::new_unchecked(2019, 1, 31);
    let end = IsoDate::new_unchecked(2024, 8, 15);
    for kind in CalendarKind::ALL {
        let calendar = Calendar::new(kind);
        for unit in [Unit::Year, Unit::Month, Unit::Week, Unit::Day] {
            let duration = calendar.date_until(&start, &end, unit).unwrap();
            let result = calendar
                .date_add(&start, &duration, Overflow::Constrain)
                .unwrap();
            assert_eq!(result.iso, end, "{kind} {unit} forwards");

            let duration = calendar.date_until(&end, &start, unit).unwrap();
            let result = calendar
                .date_add(&end, &duration, Overflow::Constrain)
                .unwrap();
            assert_eq!(result.iso, start, "{kind} {unit} backwards");
        }
    }
}

#[test]
fn era_accessors() {
    let iso = IsoDate::new_unchecked(2025, 3, 3);
    assert_eq!(Calendar::JAPANESE.era(&iso), Some(tinystr!(16, "reiwa")));
    assert_eq!(Calendar::JAPANESE.era_year(&iso), Some(7));
    assert_eq!(Calendar::JAPANESE.year(&iso), 2025);
    assert_eq!(Calendar::ROC.era_year(&iso), Some(114));
    assert_eq!(Calendar::BUDDHIST.year(&iso), 2568);

    assert_eq!(Calendar::ISO.era(&iso), None);
    assert_eq!(Calendar::CHINESE.era(&iso), None);
    assert_eq!(Calendar::DANGI.era_year(&iso), None);
}

#[test]
fn week_accessors_only_for_gregorian_calendars() {
    let iso = IsoDate::new_unchecked(2021, 1, 1);
    assert_eq!(Calendar::ISO.week_of_year(&iso), Some(53));
    assert_eq!(Calendar::ISO.year_of_week(&iso), Some(2020));
    assert_eq!(Calendar::GREGORIAN.week_of_year(&iso), Some(53));
    assert_eq!(Calendar::HEBREW.week_of_year(&iso), None);
    assert_eq!(Calendar::JAPANESE.year_of_week(&iso), None);
    assert_eq!(Calendar::HEBREW.days_in_week(&iso), 7);
    assert_eq!(Calendar::HEBREW.day_of_week(&iso), 5);
}

#[test]
fn resolve_era_fields() {
    let partial = PartialDate {
        era: Some(tinystr!(16, "reiwa")),
        era_year: Some(7),
        month: Some(3),
        day: Some(3),
        ..Default::default()
    };
    let date = Calendar::JAPANESE
        .date_from_partial(&partial, Overflow::Reject)
        .unwrap();
    assert_eq!(date.iso, IsoDate::new_unchecked(2025, 3, 3));

    let mismatch = PartialDate {
        year: Some(2024),
        ..partial
    };
    let err = Calendar::JAPANESE
        .date_from_partial(&mismatch, Overflow::Reject)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    let missing_year = PartialDate {
        era_year: None,
        ..partial
    };
    let err = Calendar::JAPANESE
        .date_from_partial(&missing_year, Overflow::Reject)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidField);

    let bce = PartialDate {
        era: Some(tinystr!(16, "bce")),
        era_year: Some(1),
        month: Some(1),
        day: Some(1),
        ..Default::default()
    };
    let date = Calendar::GREGORIAN
        .date_from_partial(&bce, Overflow::Reject)
        .unwrap();
    assert_eq!(date.iso, IsoDate::new_unchecked(0, 1, 1));
}

#[test]
fn resolve_missing_and_mismatched_fields() {
    let no_day = PartialDate {
        year: Some(2024),
        month: Some(1),
        ..Default::default()
    };
    let err = Calendar::ISO
        .date_from_partial(&no_day, Overflow::Constrain)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidField);

    let mismatch = PartialDate {
        year: Some(2024),
        month: Some(2),
        month_code: Some(month_code("M03")),
        day: Some(1),
        ..Default::default()
    };
    let err = Calendar::ISO
        .date_from_partial(&mismatch, Overflow::Constrain)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    let constrained = PartialDate {
        year: Some(2025),
        month: Some(13),
        day: Some(40),
        ..Default::default()
    };
    let date = Calendar::GREGORIAN
        .date_from_partial(&constrained, Overflow::Constrain)
        .unwrap();
    assert_eq!(date.iso, IsoDate::new_unchecked(2025, 12, 31));
    assert!(Calendar::GREGORIAN
        .date_from_partial(&constrained, Overflow::Reject)
        .is_err());
}

#[test]
fn hebrew_leap_month_constrain() {
    // 5784 is a leap year, 5785 is not.
    let adar_i = PartialDate {
        year: Some(5784),
        month_code: Some(month_code("M05L")),
        day: Some(1),
        ..Default::default()
    };
    let date = Calendar::HEBREW
        .date_from_partial(&adar_i, Overflow::Reject)
        .unwrap();
    assert_eq!(date.month(), 6);
    assert_eq!(date.month_code().as_str(), "M05L");

    let common_year = PartialDate {
        year: Some(5785),
        ..adar_i
    };
    let date = Calendar::HEBREW
        .date_from_partial(&common_year, Overflow::Constrain)
        .unwrap();
    assert_eq!(date.month_code().as_str(), "M06");
    assert_eq!(date.month(), 6);

    let err = Calendar::HEBREW
        .date_from_partial(&common_year, Overflow::Reject)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    // A leap month code is never valid for a solar calendar.
    let err = Calendar::GREGORIAN
        .date_from_partial(
            &PartialDate {
                year: Some(2024),
                ..adar_i
            },
            Overflow::Constrain,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn add_months_walks_ordinal_months() {
    let calendar = Calendar::HEBREW;
    let shevat = calendar
        .date_from_partial(
            &PartialDate {
                year: Some(5784),
                month_code: Some(month_code("M05")),
                day: Some(10),
                ..Default::default()
            },
            Overflow::Reject,
        )
        .unwrap();
    let next = calendar
        .date_add(
            &shevat.iso,
            &DateDuration::new(0, 1, 0, 0).unwrap(),
            Overflow::Constrain,
        )
        .unwrap();
    assert_eq!(next.month_code().as_str(), "M05L");

    let next_year = calendar
        .date_add(
            &next.iso,
            &DateDuration::new(1, 0, 0, 0).unwrap(),
            Overflow::Constrain,
        )
        .unwrap();
    assert_eq!(next_year.month_code().as_str(), "M06");
    assert_eq!(next_year.year(), 5785);

    let coptic = Calendar::COPTIC;
    let iso = IsoDate::new_unchecked(2024, 8, 20);
    assert_eq!(coptic.month(&iso), 12);
    let thirteenth = coptic
        .date_add(&iso, &DateDuration::new(0, 1, 0, 0).unwrap(), Overflow::Constrain)
        .unwrap();
    assert_eq!(thirteenth.month_code().as_str(), "M13");
    assert_eq!(coptic.months_in_year(&iso), 13);
}

#[test]
fn month_day_reference_years() {
    let partial = PartialDate {
        month_code: Some(month_code("M02")),
        day: Some(29),
        ..Default::default()
    };
    let month_day = Calendar::ISO
        .month_day_from_partial(&partial, Overflow::Reject)
        .unwrap();
    assert_eq!(month_day.iso, IsoDate::new_unchecked(1972, 2, 29));

    let with_year = PartialDate {
        year: Some(2021),
        month: Some(2),
        ..partial
    };
    let month_day = Calendar::ISO
        .month_day_from_partial(&with_year, Overflow::Constrain)
        .unwrap();
    assert_eq!(month_day.iso, IsoDate::new_unchecked(1972, 2, 28));
    assert!(Calendar::ISO
        .month_day_from_partial(&with_year, Overflow::Reject)
        .is_err());

    for kind in CalendarKind::ALL {
        let calendar = Calendar::new(kind);
        let partial = PartialDate {
            month_code: Some(month_code("M01")),
            day: Some(1),
            ..Default::default()
        };
        let month_day = calendar
            .month_day_from_partial(&partial, Overflow::Reject)
            .unwrap();
        assert!(month_day.iso <= IsoDate::new_unchecked(1972, 12, 31), "{kind}");
        assert_eq!(calendar.month_code(&month_day.iso).as_str(), "M01");
        assert_eq!(calendar.day(&month_day.iso), 1);
    }
}

#[test]
fn year_month_reference_day() {
    let partial = PartialDate {
        year: Some(5784),
        month_code: Some(month_code("M07")),
        day: Some(15),
        ..Default::default()
    };
    let year_month = Calendar::HEBREW
        .year_month_from_partial(&partial, Overflow::Reject)
        .unwrap();
    assert_eq!(Calendar::HEBREW.day(&year_month.iso), 1);
    assert_eq!(Calendar::HEBREW.month_code(&year_month.iso).as_str(), "M07");

    let year_month = Calendar::ISO
        .year_month_from_partial(&PartialDate { year: Some(2024), ..partial }, Overflow::Reject)
        .unwrap();
    assert_eq!(year_month.iso, IsoDate::new_unchecked(2024, 7, 1));
}
