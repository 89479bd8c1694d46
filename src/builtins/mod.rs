//! The built-in Temporal value types.
//!
//! `core` holds the provider-explicit implementations. With `compiled_data`,
//! `compiled` adds the convenience methods that resolve time zones through
//! the crate wide [`TZ_PROVIDER`].

#[cfg(feature = "compiled_data")]
pub(crate) mod compiled;
pub mod core;

pub use core::*;

#[cfg(feature = "compiled_data")]
use crate::provider::CompiledTzdbProvider;
#[cfg(feature = "compiled_data")]
use std::sync::LazyLock;

/// The time zone provider used by the `compiled_data` convenience methods.
#[cfg(feature = "compiled_data")]
pub(crate) static TZ_PROVIDER: LazyLock<CompiledTzdbProvider> =
    LazyLock::new(CompiledTzdbProvider::default);
