use crate::{
    builtins::TZ_PROVIDER,
    options::{
        DifferenceSettings, Disambiguation, DisplayCalendar, DisplayOffset, DisplayTimeZone,
        OffsetDisambiguation, Overflow, RoundingOptions, ToStringRoundingOptions,
    },
    partial::PartialZonedDateTime,
    provider::TransitionDirection,
    Duration, MonthCode, PlainDate, PlainDateTime, PlainTime, TemporalError, TemporalResult,
    TinyAsciiStr, ZonedDateTime,
};
use alloc::string::String;
use core::str::FromStr;

impl core::fmt::Display for ZonedDateTime {
    /// Writes the IXDTF string of this `ZonedDateTime` with default options.
    ///
    /// Enable with the `compiled_data` feature flag.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let string = self.to_ixdtf_string(
            DisplayOffset::Auto,
            DisplayTimeZone::Auto,
            DisplayCalendar::Auto,
            ToStringRoundingOptions::default(),
        );
        debug_assert!(
            string.is_ok(),
            "A valid ZonedDateTime string with default options."
        );
        f.write_str(&string.map_err(|_| core::fmt::Error)?)
    }
}

impl FromStr for ZonedDateTime {
    type Err = TemporalError;

    /// Parses with `Compatible` disambiguation and rejects mismatched offsets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_utf8(
            s.as_bytes(),
            Disambiguation::Compatible,
            OffsetDisambiguation::Reject,
        )
    }
}

// ==== Construction and arithmetic ====

/// The following [`ZonedDateTime`] methods are feature gated behind the
/// `compiled_data` feature flag.
impl ZonedDateTime {
    pub fn from_utf8(
        source: &[u8],
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
    ) -> TemporalResult<Self> {
        Self::from_utf8_with_provider(source, disambiguation, offset_option, &*TZ_PROVIDER)
    }

    pub fn from_utf16(
        source: &[u16],
        disambiguation: Disambiguation,
        offset_option: OffsetDisambiguation,
    ) -> TemporalResult<Self> {
        Self::from_utf16_with_provider(source, disambiguation, offset_option, &*TZ_PROVIDER)
    }

    pub fn from_partial(
        partial: &PartialZonedDateTime,
        overflow: Option<Overflow>,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
    ) -> TemporalResult<Self> {
        Self::from_partial_with_provider(
            partial,
            overflow,
            disambiguation,
            offset_option,
            &*TZ_PROVIDER,
        )
    }

    pub fn from_owned_partial(
        partial: PartialZonedDateTime,
        overflow: Option<Overflow>,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
    ) -> TemporalResult<Self> {
        Self::from_owned_partial_with_provider(
            partial,
            overflow,
            disambiguation,
            offset_option,
            &*TZ_PROVIDER,
        )
    }

    pub fn with(
        &self,
        partial: PartialZonedDateTime,
        disambiguation: Option<Disambiguation>,
        offset_option: Option<OffsetDisambiguation>,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.with_with_provider(
            partial,
            disambiguation,
            offset_option,
            overflow,
            &*TZ_PROVIDER,
        )
    }

    pub fn with_plain_time(&self, time: Option<PlainTime>) -> TemporalResult<Self> {
        self.with_plain_time_and_provider(time, &*TZ_PROVIDER)
    }

    pub fn add(&self, duration: &Duration, overflow: Option<Overflow>) -> TemporalResult<Self> {
        self.add_with_provider(duration, overflow, &*TZ_PROVIDER)
    }

    pub fn subtract(
        &self,
        duration: &Duration,
        overflow: Option<Overflow>,
    ) -> TemporalResult<Self> {
        self.subtract_with_provider(duration, overflow, &*TZ_PROVIDER)
    }

    pub fn until(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.until_with_provider(other, settings, &*TZ_PROVIDER)
    }

    pub fn since(&self, other: &Self, settings: DifferenceSettings) -> TemporalResult<Duration> {
        self.since_with_provider(other, settings, &*TZ_PROVIDER)
    }

    pub fn round(&self, options: RoundingOptions) -> TemporalResult<Self> {
        self.round_with_provider(options, &*TZ_PROVIDER)
    }

    pub fn start_of_day(&self) -> TemporalResult<Self> {
        self.start_of_day_with_provider(&*TZ_PROVIDER)
    }

    pub fn equals(&self, other: &Self) -> TemporalResult<bool> {
        self.equals_with_provider(other, &*TZ_PROVIDER)
    }

    pub fn get_time_zone_transition(
        &self,
        direction: TransitionDirection,
    ) -> TemporalResult<Option<Self>> {
        self.get_time_zone_transition_with_provider(direction, &*TZ_PROVIDER)
    }

    /// Returns the hours in the current wall-clock day.
    pub fn hours_in_day(&self) -> TemporalResult<f64> {
        self.hours_in_day_with_provider(&*TZ_PROVIDER)
    }

    pub fn to_plain_date(&self) -> TemporalResult<PlainDate> {
        self.to_plain_date_with_provider(&*TZ_PROVIDER)
    }

    pub fn to_plain_time(&self) -> TemporalResult<PlainTime> {
        self.to_plain_time_with_provider(&*TZ_PROVIDER)
    }

    pub fn to_plain_date_time(&self) -> TemporalResult<PlainDateTime> {
        self.to_plain_date_time_with_provider(&*TZ_PROVIDER)
    }

    pub fn to_ixdtf_string(
        &self,
        display_offset: DisplayOffset,
        display_timezone: DisplayTimeZone,
        display_calendar: DisplayCalendar,
        options: ToStringRoundingOptions,
    ) -> TemporalResult<String> {
        self.to_ixdtf_string_with_provider(
            display_offset,
            display_timezone,
            display_calendar,
            options,
            &*TZ_PROVIDER,
        )
    }
}

// ==== Field accessors ====

impl ZonedDateTime {
    pub fn offset(&self) -> TemporalResult<String> {
        self.offset_with_provider(&*TZ_PROVIDER)
    }

    pub fn offset_nanoseconds(&self) -> TemporalResult<i64> {
        self.offset_nanoseconds_with_provider(&*TZ_PROVIDER)
    }

    pub fn era(&self) -> TemporalResult<Option<TinyAsciiStr<16>>> {
        self.era_with_provider(&*TZ_PROVIDER)
    }

    pub fn era_year(&self) -> TemporalResult<Option<i32>> {
        self.era_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn year(&self) -> TemporalResult<i32> {
        self.year_with_provider(&*TZ_PROVIDER)
    }

    pub fn month(&self) -> TemporalResult<u8> {
        self.month_with_provider(&*TZ_PROVIDER)
    }

    pub fn month_code(&self) -> TemporalResult<MonthCode> {
        self.month_code_with_provider(&*TZ_PROVIDER)
    }

    pub fn day(&self) -> TemporalResult<u8> {
        self.day_with_provider(&*TZ_PROVIDER)
    }

    pub fn hour(&self) -> TemporalResult<u8> {
        self.hour_with_provider(&*TZ_PROVIDER)
    }

    pub fn minute(&self) -> TemporalResult<u8> {
        self.minute_with_provider(&*TZ_PROVIDER)
    }

    pub fn second(&self) -> TemporalResult<u8> {
        self.second_with_provider(&*TZ_PROVIDER)
    }

    pub fn millisecond(&self) -> TemporalResult<u16> {
        self.millisecond_with_provider(&*TZ_PROVIDER)
    }

    pub fn microsecond(&self) -> TemporalResult<u16> {
        self.microsecond_with_provider(&*TZ_PROVIDER)
    }

    pub fn nanosecond(&self) -> TemporalResult<u16> {
        self.nanosecond_with_provider(&*TZ_PROVIDER)
    }

    pub fn day_of_week(&self) -> TemporalResult<u16> {
        self.day_of_week_with_provider(&*TZ_PROVIDER)
    }

    pub fn day_of_year(&self) -> TemporalResult<u16> {
        self.day_of_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn week_of_year(&self) -> TemporalResult<Option<u8>> {
        self.week_of_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn year_of_week(&self) -> TemporalResult<Option<i32>> {
        self.year_of_week_with_provider(&*TZ_PROVIDER)
    }

    pub fn days_in_week(&self) -> TemporalResult<u16> {
        self.days_in_week_with_provider(&*TZ_PROVIDER)
    }

    pub fn days_in_month(&self) -> TemporalResult<u16> {
        self.days_in_month_with_provider(&*TZ_PROVIDER)
    }

    pub fn days_in_year(&self) -> TemporalResult<u16> {
        self.days_in_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn months_in_year(&self) -> TemporalResult<u16> {
        self.months_in_year_with_provider(&*TZ_PROVIDER)
    }

    pub fn in_leap_year(&self) -> TemporalResult<bool> {
        self.in_leap_year_with_provider(&*TZ_PROVIDER)
    }
}
