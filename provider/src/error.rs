use core::fmt;

/// The error type returned by a [`TimeZoneProvider`][crate::provider::TimeZoneProvider].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimeZoneProviderError {
    /// The requested epoch nanoseconds are outside the representable instant range.
    InstantOutOfRange,
    /// The identifier is not known to the provider.
    UnknownIdentifier,
    /// An internal invariant of the provider data was violated.
    Assert(&'static str),
    /// A value was out of the range the provider supports.
    Range(&'static str),
}

impl fmt::Display for TimeZoneProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstantOutOfRange => {
                f.write_str("instant nanoseconds are not within a valid epoch range.")
            }
            Self::UnknownIdentifier => f.write_str("unknown time zone identifier."),
            Self::Assert(msg) | Self::Range(msg) => f.write_str(msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimeZoneProviderError {}
