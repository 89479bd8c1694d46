use core::str::FromStr;

use crate::{
    error::ErrorKind,
    options::{RelativeTo, RoundingIncrement, RoundingMode, RoundingOptions, Unit},
    partial::PartialDuration,
    Calendar, PlainDate, TimeZone, ZonedDateTime,
};

use super::Duration;

fn round_fields(
    duration: &Duration,
    relative_to: RelativeTo,
    options: RoundingOptions,
) -> [i128; 10] {
    let result = duration.round(options, Some(relative_to)).unwrap();
    [
        result.years().into(),
        result.months().into(),
        result.weeks().into(),
        result.days().into(),
        result.hours().into(),
        result.minutes().into(),
        result.seconds().into(),
        result.milliseconds().into(),
        result.microseconds(),
        result.nanoseconds(),
    ]
}

fn test_duration() -> Duration {
    Duration::new(5, 6, 7, 8, 40, 30, 20, 123, 987, 500).unwrap()
}

// roundingmode-floor.js
#[test]
fn basic_positive_floor_rounding() {
    let duration = test_duration();
    let relative_to = RelativeTo::PlainDate(PlainDate::try_new(2020, 1, 1, Calendar::ISO).unwrap());
    let options = |unit| RoundingOptions {
        smallest_unit: Some(unit),
        rounding_mode: Some(RoundingMode::Floor),
        ..Default::default()
    };

    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Year)),
        [5, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Month)),
        [5, 7, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Week)),
        [5, 7, 3, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Day)),
        [5, 7, 0, 27, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Hour)),
        [5, 7, 0, 27, 16, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Minute)),
        [5, 7, 0, 27, 16, 30, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to, options(Unit::Millisecond)),
        [5, 7, 0, 27, 16, 30, 20, 123, 0, 0]
    );
}

// roundingmode-ceil.js
#[test]
fn basic_negative_ceil_rounding() {
    let duration = test_duration().negated();
    let relative_to = RelativeTo::PlainDate(PlainDate::try_new(2020, 1, 1, Calendar::ISO).unwrap());
    let options = |unit| RoundingOptions {
        smallest_unit: Some(unit),
        rounding_mode: Some(RoundingMode::Ceil),
        ..Default::default()
    };

    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Year)),
        [-5, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to.clone(), options(Unit::Month)),
        [-5, -7, 0, 0, 0, 0, 0, 0, 0, 0]
    );
    assert_eq!(
        round_fields(&duration, relative_to, options(Unit::Day)),
        [-5, -7, 0, -28, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn rounding_increment_on_days() {
    let duration = Duration::from_str("P1M15D").unwrap();
    let relative_to = RelativeTo::PlainDate(PlainDate::try_new(2020, 1, 1, Calendar::ISO).unwrap());
    let options = RoundingOptions {
        smallest_unit: Some(Unit::Day),
        increment: Some(RoundingIncrement::try_new(10).unwrap()),
        rounding_mode: Some(RoundingMode::HalfExpand),
        ..Default::default()
    };
    // Months stay the largest unit, so the increment would span two date units.
    let err = duration
        .round(options, Some(relative_to.clone()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    // January 2020 has 31 days, so P1M15D is 46 days.
    let options = RoundingOptions {
        largest_unit: Some(Unit::Day),
        ..options
    };
    assert_eq!(
        round_fields(&duration, relative_to, options),
        [0, 0, 0, 50, 0, 0, 0, 0, 0, 0]
    );
}

// days-24-hours-relative-to-zoned-date-time.js
#[test]
fn round_relative_to_zoned_datetime() {
    let duration = Duration::new(0, 0, 0, 0, 25, 0, 0, 0, 0, 0).unwrap();
    let zdt = ZonedDateTime::try_new(
        1_000_000_000_000_000_000,
        Calendar::default(),
        TimeZone::try_from_str("+04:30").unwrap(),
    )
    .unwrap();
    let options = RoundingOptions {
        largest_unit: Some(Unit::Day),
        ..Default::default()
    };
    let result = duration
        .round(options, Some(RelativeTo::ZonedDateTime(zdt)))
        .unwrap();
    assert_eq!(result.days(), 1);
    assert_eq!(result.hours(), 1);
}

#[test]
fn round_days_across_dst() {
    // The day after midnight on 2020-03-08 in New York is 23 hours long.
    let duration = Duration::new(0, 0, 0, 0, 23, 0, 0, 0, 0, 0).unwrap();
    let zdt = ZonedDateTime::from_str("2020-03-08T00:00-05:00[America/New_York]").unwrap();
    let options = RoundingOptions {
        largest_unit: Some(Unit::Day),
        ..Default::default()
    };
    let result = duration
        .round(options, Some(RelativeTo::ZonedDateTime(zdt)))
        .unwrap();
    assert_eq!(result.days(), 1);
    assert_eq!(result.hours(), 0);
}

#[test]
fn test_duration_compare() {
    let one = Duration::from_partial_duration(PartialDuration {
        hours: Some(79),
        minutes: Some(10),
        ..Default::default()
    })
    .unwrap();
    let two = Duration::from_partial_duration(PartialDuration {
        days: Some(3),
        hours: Some(7),
        seconds: Some(630),
        ..Default::default()
    })
    .unwrap();
    let three = Duration::from_partial_duration(PartialDuration {
        days: Some(3),
        hours: Some(6),
        minutes: Some(50),
        ..Default::default()
    })
    .unwrap();

    let mut arr = [&one, &two, &three];
    arr.sort_by(|a, b| Duration::compare(a, b, None).unwrap());
    assert_eq!(arr, [&three, &one, &two]);

    // Sorting relative to a date, taking DST changes into account:
    let zdt = ZonedDateTime::from_str("2020-11-01T00:00-07:00[America/Los_Angeles]").unwrap();
    arr.sort_by(|a, b| {
        Duration::compare(a, b, Some(RelativeTo::ZonedDateTime(zdt.clone()))).unwrap()
    });
    assert_eq!(arr, [&one, &three, &two]);
}

#[test]
fn test_duration_total() {
    let d1 = Duration::from_partial_duration(PartialDuration {
        hours: Some(130),
        minutes: Some(20),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(d1.total(Unit::Second, None).unwrap(), 469_200.0);

    // How many 24-hour days is 123456789 seconds?
    let d2 = Duration::from_str("PT123456789S").unwrap();
    assert_eq!(d2.total(Unit::Day, None).unwrap(), 1_428.898_020_833_333_2);

    // Find totals in months, with and without taking DST into account
    let d3 = Duration::from_partial_duration(PartialDuration {
        hours: Some(2756),
        ..Default::default()
    })
    .unwrap();
    let relative_to = ZonedDateTime::from_str("2020-01-01T00:00+01:00[Europe/Rome]").unwrap();
    assert_eq!(
        d3.total(Unit::Month, Some(RelativeTo::ZonedDateTime(relative_to)))
            .unwrap(),
        3.795_833_333_333_333_4
    );
    assert_eq!(
        d3.total(
            Unit::Month,
            Some(RelativeTo::PlainDate(
                PlainDate::try_new(2020, 1, 1, Calendar::default()).unwrap()
            ))
        )
        .unwrap(),
        3.794_444_444_444_444_3
    );
}

// balances-days-up-to-both-years-and-months.js
#[test]
fn balance_days_up_to_both_years_and_months() {
    let two_years = Duration::from_partial_duration(PartialDuration {
        months: Some(11),
        days: Some(396),
        ..Default::default()
    })
    .unwrap();
    let relative_to = PlainDate::try_new(2017, 1, 1, Calendar::default()).unwrap();

    assert_eq!(
        two_years
            .total(Unit::Year, Some(RelativeTo::PlainDate(relative_to)))
            .unwrap(),
        2.0
    );
    assert_eq!(
        two_years
            .negated()
            .total(Unit::Year, Some(RelativeTo::PlainDate(relative_to)))
            .unwrap(),
        -2.0
    );
}

#[test]
fn calendar_units_need_relative_to() {
    let duration = Duration::from_str("P1M").unwrap();
    assert!(duration.total(Unit::Day, None).is_err());
    assert!(duration
        .round(
            RoundingOptions {
                smallest_unit: Some(Unit::Day),
                ..Default::default()
            },
            None
        )
        .is_err());
}
