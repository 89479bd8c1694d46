//! The `TimeZoneProvider` trait and the records that cross it.
//!
//! Providers live in the `zone_provider` crate; this module re-exports the
//! pieces needed to implement or supply one.

pub use zone_provider::provider::{
    CandidateEpochNanoseconds, EpochNanosecondsAndOffset, GapEntryOffsets, IsoDateTime,
    NeverProvider, TimeZoneProvider, TimeZoneTransitionInfo,
    TransitionDirection, UtcOffsetSeconds,
};
pub use zone_provider::TimeZoneProviderError;

#[cfg(feature = "tzdb")]
pub use zone_provider::CompiledTzdbProvider;
