use crate::{builtins::TZ_PROVIDER, TemporalResult, TimeZone};

impl TimeZone {
    /// Parses an IANA identifier or a minute precision offset.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn try_from_identifier_str(source: &str) -> TemporalResult<Self> {
        Self::try_from_identifier_str_with_provider(source, &*TZ_PROVIDER)
    }

    /// Parses a time zone from an identifier, an offset, or an IXDTF string.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn try_from_str(source: &str) -> TemporalResult<Self> {
        Self::try_from_str_with_provider(source, &*TZ_PROVIDER)
    }

    /// Returns this time zone with links resolved to their primary zone.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn primary_identifier(&self) -> TemporalResult<Self> {
        self.primary_identifier_with_provider(&*TZ_PROVIDER)
    }
}
