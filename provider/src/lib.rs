//! Providers for time zone data
//!
//! The `zone_provider` crate holds the [`TimeZoneProvider`][crate::provider::TimeZoneProvider]
//! trait consumed by `temporal_engine`, the records that flow across it, and a small set of
//! implementations.
//!
//! ## Available providers
//!
//! - `CompiledTzdbProvider`: reads TZif data compiled into the binary through `jiff-tzdb` and
//!   parses it at runtime with the `tzif` crate (enable with the `tzif` feature flag). Parsed
//!   zones are cached, so each zone is only parsed once.
//! - `NeverProvider`: a provider that rejects every named time zone. This is useful for
//!   offset-only time zones and tests.
//!
//! ## Identifiers
//!
//! Identifier handling is split in two steps:
//!
//! - normalization, which maps any casing of a known identifier onto its stored casing
//!   (`america/new_york` to `America/New_York`), and
//! - canonicalization, which additionally resolves IANA links to their primary zone
//!   (`US/Eastern` to `America/New_York`).
//!
//! The link table used for canonicalization lives in [`identifiers`].

#![no_std]
#![cfg_attr(
    not(test),
    warn(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)
)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "tzif")]
pub(crate) mod common;

#[cfg(feature = "tzif")]
pub mod tzif;

pub mod epoch_nanoseconds;
pub mod identifiers;
pub mod provider;

#[doc(hidden)]
pub mod utils;

mod error;
pub use error::TimeZoneProviderError;

#[cfg(feature = "tzif")]
pub use tzif::CompiledTzdbProvider;
