use crate::{
    builtins::TZ_PROVIDER, options::ToStringRoundingOptions, Instant, TemporalResult, TimeZone,
};
use alloc::string::String;

impl Instant {
    /// Returns the RFC 9557 (IXDTF) string for this `Instant`, written with the
    /// offset of `timezone` or with `Z`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn to_ixdtf_string(
        &self,
        timezone: Option<&TimeZone>,
        options: ToStringRoundingOptions,
    ) -> TemporalResult<String> {
        self.to_ixdtf_string_with_provider(timezone, options, &*TZ_PROVIDER)
    }
}

impl core::fmt::Display for Instant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let string = self.to_ixdtf_string(None, ToStringRoundingOptions::default());
        f.write_str(&string.map_err(|_| core::fmt::Error)?)
    }
}
