use crate::{
    builtins::TZ_PROVIDER,
    options::{RelativeTo, RoundingOptions, Unit},
    Duration, TemporalResult,
};
use core::cmp::Ordering;

#[cfg(test)]
mod tests;

impl Duration {
    /// Rounds this `Duration`, measuring calendar units from `relative_to`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn round(
        &self,
        options: RoundingOptions,
        relative_to: Option<RelativeTo>,
    ) -> TemporalResult<Self> {
        self.round_with_provider(options, relative_to, &*TZ_PROVIDER)
    }

    /// Returns the total of this `Duration` in `unit`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn total(&self, unit: Unit, relative_to: Option<RelativeTo>) -> TemporalResult<f64> {
        self.total_with_provider(unit, relative_to, &*TZ_PROVIDER)
    }

    /// Compares two durations by their length from `relative_to`.
    ///
    /// Enable with the `compiled_data` feature flag.
    pub fn compare(
        &self,
        other: &Duration,
        relative_to: Option<RelativeTo>,
    ) -> TemporalResult<Ordering> {
        self.compare_with_provider(other, relative_to, &*TZ_PROVIDER)
    }
}
