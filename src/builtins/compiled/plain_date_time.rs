use crate::{
    builtins::TZ_PROVIDER, options::Disambiguation, PlainDateTime, TemporalResult, TimeZone,
    ZonedDateTime,
};

impl PlainDateTime {
    /// Resolves this wall-clock date-time in `time_zone`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn to_zoned_date_time(
        &self,
        time_zone: TimeZone,
        disambiguation: Disambiguation,
    ) -> TemporalResult<ZonedDateTime> {
        self.to_zoned_date_time_with_provider(time_zone, disambiguation, &*TZ_PROVIDER)
    }
}
