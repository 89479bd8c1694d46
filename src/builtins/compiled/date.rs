use crate::{builtins::TZ_PROVIDER, PlainDate, PlainTime, TemporalResult, TimeZone, ZonedDateTime};

impl PlainDate {
    /// Converts this date to a `ZonedDateTime` in `time_zone`, at `plain_time`
    /// or at the start of the day.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn to_zoned_date_time(
        &self,
        time_zone: TimeZone,
        plain_time: Option<PlainTime>,
    ) -> TemporalResult<ZonedDateTime> {
        self.to_zoned_date_time_with_provider(time_zone, plain_time, &*TZ_PROVIDER)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Calendar, PlainDate, TimeZone};

    #[test]
    fn start_of_day_after_midnight_gap() {
        // Clocks in Havana skip from 00:00 to 01:00.
        let date = PlainDate::try_new(2020, 3, 8, Calendar::ISO).unwrap();
        let zdt = date
            .to_zoned_date_time(TimeZone::try_from_str("America/Havana").unwrap(), None)
            .unwrap();
        assert_eq!(zdt.hour().unwrap(), 1);
        assert_eq!(zdt.to_plain_date().unwrap(), date);
    }
}
