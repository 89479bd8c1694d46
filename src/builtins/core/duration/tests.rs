use core::{cmp::Ordering, str::FromStr};

use alloc::string::ToString;

use crate::{
    error::ErrorKind,
    options::{
        Precision, RoundingIncrement, RoundingMode, RoundingOptions, ToStringRoundingOptions, Unit,
    },
    partial::PartialDuration,
    provider::NeverProvider,
    Sign,
};

use super::Duration;

fn hms(hours: i64, minutes: i64, seconds: i64) -> Duration {
    Duration::new(0, 0, 0, 0, hours, minutes, seconds, 0, 0, 0).unwrap()
}

#[test]
fn partial_duration_empty() {
    let err = Duration::from_partial_duration(PartialDuration::default());
    assert_eq!(err.unwrap_err().kind(), ErrorKind::InvalidField);
}

#[test]
fn partial_duration_values() {
    let mut partial = PartialDuration::default();
    let _ = partial.years.insert(20);
    let result = Duration::from_partial_duration(partial).unwrap();
    assert_eq!(result.years(), 20);
    assert_eq!(result.sign(), Sign::Positive);

    let partial = PartialDuration {
        days: Some(-3),
        nanoseconds: Some(-5),
        ..Default::default()
    };
    let result = Duration::from_partial_duration(partial).unwrap();
    assert_eq!(result.sign(), Sign::Negative);

    let mixed = PartialDuration {
        days: Some(3),
        nanoseconds: Some(-5),
        ..Default::default()
    };
    let err = Duration::from_partial_duration(mixed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn duration_limits() {
    assert!(Duration::new(0, 0, 0, 0, 0, 0, 9_007_199_254_740_991, 0, 0, 999_999_999).is_ok());
    let err =
        Duration::new(0, 0, 0, 0, 0, 0, 9_007_199_254_740_991, 0, 0, 1_000_000_000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Overflow);
    assert!(Duration::new(i64::from(u32::MAX), 0, 0, 0, 0, 0, 0, 0, 0, 0).is_ok());
    let err = Duration::new(1 << 32, 0, 0, 0, 0, 0, 0, 0, 0, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(Duration::new(0, 0, 0, 0, 0, 0, 0, 0, i128::MAX, 0).is_err());
}

#[test]
fn default_duration_string() {
    let duration = Duration::default();

    let options = ToStringRoundingOptions {
        precision: Precision::Auto,
        smallest_unit: None,
        rounding_mode: None,
    };
    let result = duration.as_temporal_string(options).unwrap();
    assert_eq!(&result, "PT0S");

    let options = ToStringRoundingOptions {
        precision: Precision::Digit(0),
        smallest_unit: None,
        rounding_mode: None,
    };
    let result = duration.as_temporal_string(options).unwrap();
    assert_eq!(&result, "PT0S");

    let options = ToStringRoundingOptions {
        precision: Precision::Digit(1),
        smallest_unit: None,
        rounding_mode: None,
    };
    let result = duration.as_temporal_string(options).unwrap();
    assert_eq!(&result, "PT0.0S");

    let options = ToStringRoundingOptions {
        precision: Precision::Digit(3),
        smallest_unit: None,
        rounding_mode: None,
    };
    let result = duration.as_temporal_string(options).unwrap();
    assert_eq!(&result, "PT0.000S");
}

#[test]
fn duration_to_string_auto_precision() {
    let duration = Duration::new(1, 2, 3, 4, 5, 6, 7, 0, 0, 0).unwrap();
    let result = duration
        .as_temporal_string(ToStringRoundingOptions::default())
        .unwrap();
    assert_eq!(&result, "P1Y2M3W4DT5H6M7S");

    let duration = Duration::new(1, 2, 3, 4, 5, 6, 7, 987, 650, 0).unwrap();
    let result = duration
        .as_temporal_string(ToStringRoundingOptions::default())
        .unwrap();
    assert_eq!(&result, "P1Y2M3W4DT5H6M7.98765S");
}

#[test]
fn empty_date_duration() {
    let duration = Duration::from_partial_duration(PartialDuration {
        hours: Some(1),
        ..Default::default()
    })
    .unwrap();
    let result = duration
        .as_temporal_string(ToStringRoundingOptions::default())
        .unwrap();
    assert_eq!(&result, "PT1H");

    let duration = Duration::new(0, 0, 0, 0, 1, 0, 0, 500, 0, 0).unwrap();
    assert_eq!(duration.to_string(), "PT1H0.5S");
}

#[test]
fn negative_fields_to_string() {
    let duration = Duration::from_partial_duration(PartialDuration {
        years: Some(-1),
        months: Some(-1),
        weeks: Some(-1),
        days: Some(-1),
        hours: Some(-1),
        minutes: Some(-1),
        seconds: Some(-1),
        milliseconds: Some(-1),
        microseconds: Some(-1),
        nanoseconds: Some(-1),
    })
    .unwrap();
    let result = duration
        .as_temporal_string(ToStringRoundingOptions::default())
        .unwrap();
    assert_eq!(&result, "-P1Y1M1W1DT1H1M1.001001001S");

    let duration = Duration::from_partial_duration(PartialDuration {
        milliseconds: Some(-250),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(duration.to_string(), "-PT0.25S");

    let duration = Duration::from_partial_duration(PartialDuration {
        milliseconds: Some(-3500),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(duration.to_string(), "-PT3.5S");

    let duration = Duration::from_partial_duration(PartialDuration {
        weeks: Some(-1),
        days: Some(-1),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(duration.to_string(), "-P1W1D");
}

#[test]
fn preserve_precision_loss() {
    const MAX_SAFE_INT: i64 = 9_007_199_254_740_991;
    let duration = Duration::from_partial_duration(PartialDuration {
        milliseconds: Some(MAX_SAFE_INT),
        microseconds: Some(i128::from(MAX_SAFE_INT)),
        ..Default::default()
    })
    .unwrap();
    let result = duration
        .as_temporal_string(ToStringRoundingOptions::default())
        .unwrap();

    assert_eq!(&result, "PT9016206453995.731991S");
}

#[test]
fn to_string_rounding() {
    let duration = Duration::new(0, 0, 0, 0, 0, 0, 1, 500, 0, 0).unwrap();
    let options = ToStringRoundingOptions {
        smallest_unit: Some(Unit::Second),
        ..Default::default()
    };
    assert_eq!(duration.as_temporal_string(options).unwrap(), "PT1S");

    let options = ToStringRoundingOptions {
        smallest_unit: Some(Unit::Second),
        rounding_mode: Some(RoundingMode::HalfExpand),
        ..Default::default()
    };
    assert_eq!(duration.as_temporal_string(options).unwrap(), "PT2S");

    // Rounding can carry into minutes.
    let duration = Duration::new(0, 0, 0, 0, 0, 0, 59, 999, 0, 0).unwrap();
    let options = ToStringRoundingOptions {
        smallest_unit: Some(Unit::Second),
        rounding_mode: Some(RoundingMode::Ceil),
        ..Default::default()
    };
    assert_eq!(duration.as_temporal_string(options).unwrap(), "PT60S");

    let options = ToStringRoundingOptions {
        smallest_unit: Some(Unit::Minute),
        ..Default::default()
    };
    assert!(duration.as_temporal_string(options).is_err());
}

#[test]
fn duration_from_str() {
    let duration = Duration::from_str("PT0.999999999H").unwrap();
    assert_eq!(duration.minutes(), 59);
    assert_eq!(duration.seconds(), 59);
    assert_eq!(duration.milliseconds(), 999);
    assert_eq!(duration.microseconds(), 996);
    assert_eq!(duration.nanoseconds(), 400);

    let duration = Duration::from_str("PT0.000000011H").unwrap();
    assert_eq!(duration.minutes(), 0);
    assert_eq!(duration.seconds(), 0);
    assert_eq!(duration.milliseconds(), 0);
    assert_eq!(duration.microseconds(), 39);
    assert_eq!(duration.nanoseconds(), 600);

    let duration = Duration::from_str("PT0.999999999M").unwrap();
    assert_eq!(duration.seconds(), 59);
    assert_eq!(duration.milliseconds(), 999);
    assert_eq!(duration.microseconds(), 999);
    assert_eq!(duration.nanoseconds(), 940);

    let duration = Duration::from_str("-PT90S").unwrap();
    assert_eq!(duration.minutes(), 0);
    assert_eq!(duration.seconds(), -90);

    assert!(Duration::from_str("P").is_err());
    assert!(Duration::from_str("PT1.5H30M").is_err());
}

#[test]
fn duration_string_round_trip() {
    for source in [
        "P1Y2M3W4DT5H6M7.00800901S",
        "-P3DT1H",
        "PT0.000000001S",
        "PT36H",
        "PT0S",
    ] {
        let duration = Duration::from_str(source).unwrap();
        assert_eq!(duration.to_string(), source);
        assert_eq!(Duration::from_str(&duration.to_string()).unwrap(), duration);
    }
}

#[test]
fn add_and_subtract() {
    let one = hms(1, 0, 0);
    let two = hms(0, 30, 0);
    assert_eq!(one.add(&two).unwrap(), hms(1, 30, 0));
    assert_eq!(one.subtract(&two).unwrap(), hms(0, 30, 0));

    // Days combine as 24 hours and balance back up to the largest unit.
    let day = Duration::new(0, 0, 0, 1, 0, 0, 0, 0, 0, 0).unwrap();
    let result = day.subtract(&hms(1, 0, 0)).unwrap();
    assert_eq!(result, hms(23, 0, 0));

    let year = Duration::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0).unwrap();
    let err = year.add(&day).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn round_without_relative_to() {
    let duration = hms(25, 0, 0);
    let options = RoundingOptions {
        largest_unit: Some(Unit::Day),
        ..Default::default()
    };
    let result = duration
        .round_with_provider(options, None, &NeverProvider)
        .unwrap();
    assert_eq!(result.days(), 1);
    assert_eq!(result.hours(), 1);

    let duration = hms(1, 30, 0);
    let result = duration
        .round_with_provider(RoundingOptions::with_smallest_unit(Unit::Hour), None, &NeverProvider)
        .unwrap();
    assert_eq!(result, hms(2, 0, 0));

    let options = RoundingOptions {
        largest_unit: None,
        smallest_unit: Some(Unit::Minute),
        rounding_mode: Some(RoundingMode::Floor),
        increment: Some(RoundingIncrement::try_new(15).unwrap()),
    };
    let result = hms(0, 44, 59)
        .round_with_provider(options, None, &NeverProvider)
        .unwrap();
    assert_eq!(result, hms(0, 30, 0));

    let options = RoundingOptions {
        largest_unit: Some(Unit::Hour),
        smallest_unit: Some(Unit::Day),
        ..Default::default()
    };
    assert!(hms(1, 0, 0)
        .round_with_provider(options, None, &NeverProvider)
        .is_err());

    let options = RoundingOptions {
        largest_unit: None,
        smallest_unit: None,
        ..Default::default()
    };
    assert!(hms(1, 0, 0)
        .round_with_provider(options, None, &NeverProvider)
        .is_err());

    let year = Duration::new(1, 0, 0, 0, 0, 0, 0, 0, 0, 0).unwrap();
    let err = year
        .round_with_provider(RoundingOptions::with_smallest_unit(Unit::Day), None, &NeverProvider)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn round_days_is_exact() {
    let duration = Duration::new(0, 0, 0, 1, 12, 0, 0, 0, 0, 0).unwrap();
    let result = duration
        .round_with_provider(RoundingOptions::with_smallest_unit(Unit::Day), None, &NeverProvider)
        .unwrap();
    assert_eq!(result.days(), 2);
    assert_eq!(result.hours(), 0);

    let options = RoundingOptions {
        smallest_unit: Some(Unit::Day),
        rounding_mode: Some(RoundingMode::HalfEven),
        ..RoundingOptions::with_smallest_unit(Unit::Day)
    };
    let result = duration
        .round_with_provider(options, None, &NeverProvider)
        .unwrap();
    assert_eq!(result.days(), 2);

    let duration = Duration::new(0, 0, 0, 2, 12, 0, 0, 0, 0, 0).unwrap();
    let result = duration
        .round_with_provider(options, None, &NeverProvider)
        .unwrap();
    assert_eq!(result.days(), 2);
}

#[test]
fn total_without_relative_to() {
    let duration = hms(1, 30, 0);
    assert_eq!(
        duration
            .total_with_provider(Unit::Minute, None, &NeverProvider)
            .unwrap(),
        90.0
    );
    let duration = Duration::new(0, 0, 0, 1, 12, 0, 0, 0, 0, 0).unwrap();
    assert_eq!(
        duration
            .total_with_provider(Unit::Day, None, &NeverProvider)
            .unwrap(),
        1.5
    );
    assert!(duration
        .total_with_provider(Unit::Month, None, &NeverProvider)
        .is_err());
    assert!(duration
        .total_with_provider(Unit::Auto, None, &NeverProvider)
        .is_err());
}

#[test]
fn compare_without_relative_to() {
    let one = hms(1, 0, 0);
    let two = hms(0, 60, 0);
    assert_eq!(
        one.compare_with_provider(&two, None, &NeverProvider).unwrap(),
        Ordering::Equal
    );

    let day = Duration::new(0, 0, 0, 1, 0, 0, 0, 0, 0, 0).unwrap();
    let hours = hms(25, 0, 0);
    assert_eq!(
        day.compare_with_provider(&hours, None, &NeverProvider).unwrap(),
        Ordering::Less
    );
    assert_eq!(
        hours.compare_with_provider(&day, None, &NeverProvider).unwrap(),
        Ordering::Greater
    );

    let month = Duration::new(0, 1, 0, 0, 0, 0, 0, 0, 0, 0).unwrap();
    assert!(month
        .compare_with_provider(&day, None, &NeverProvider)
        .is_err());
}

#[test]
fn sign_abs_negated() {
    let duration = Duration::new(0, 0, 0, 0, -1, -2, 0, 0, 0, -7).unwrap();
    assert_eq!(duration.sign(), Sign::Negative);
    assert_eq!(duration.abs().sign(), Sign::Positive);
    assert_eq!(duration.negated(), duration.abs());
    assert!(Duration::default().is_zero());
    assert!(duration.is_time_within_range());
}
