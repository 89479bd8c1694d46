//! Error values returned by every fallible operation in the crate.
//!
//! A [`TemporalError`] is a [`ErrorKind`] plus an optional static message. It
//! is `Copy` and never allocates, so it can be returned from `const` code and
//! from `no_std` builds alike.

use core::fmt;

use icu_calendar::DateError;
use ixdtf::ParseError;
use zone_provider::TimeZoneProviderError;

/// The category of a [`TemporalError`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An error with no more specific category.
    #[default]
    Generic,
    /// A value was outside of its valid range.
    Range,
    /// A field set could not be resolved.
    InvalidField,
    /// Arithmetic exceeded the representable bounds.
    Overflow,
    /// A time zone could not be resolved, or an offset did not match it.
    TimeZone,
    /// A string did not match the expected grammar.
    Syntax,
    /// Two calendared values were combined across calendars.
    CalendarMismatch,
    /// An internal invariant was violated.
    Assert,
}

impl ErrorKind {
    /// The name printed in front of the message when an error is displayed.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "Error",
            Self::Range => "RangeError",
            Self::InvalidField => "InvalidFieldError",
            Self::Overflow => "OverflowError",
            Self::TimeZone => "TimeZoneError",
            Self::Syntax => "SyntaxError",
            Self::CalendarMismatch => "CalendarMismatchError",
            Self::Assert => "ImplementationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The error type for `temporal_engine`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalError {
    kind: ErrorKind,
    detail: Detail,
}

/// Where the message of an error comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Detail {
    Empty,
    Text(&'static str),
    Known(ErrorMessage),
    Scanner(ParseError),
    Calendar(DateError),
}

impl Detail {
    fn text(self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Text(text) => text,
            Self::Known(message) => message.text(),
            Self::Scanner(error) => scanner_text(error),
            Self::Calendar(error) => calendar_text(error),
        }
    }
}

impl TemporalError {
    const fn of(kind: ErrorKind) -> Self {
        Self {
            kind,
            detail: Detail::Empty,
        }
    }

    /// A generic error carrying `msg`.
    #[must_use]
    pub fn general(msg: &'static str) -> Self {
        Self::of(ErrorKind::Generic).with_message(msg)
    }

    #[must_use]
    pub const fn range() -> Self {
        Self::of(ErrorKind::Range)
    }

    #[must_use]
    pub const fn invalid_field() -> Self {
        Self::of(ErrorKind::InvalidField)
    }

    #[must_use]
    pub const fn overflow() -> Self {
        Self::of(ErrorKind::Overflow)
    }

    #[must_use]
    pub const fn time_zone() -> Self {
        Self::of(ErrorKind::TimeZone)
    }

    #[must_use]
    pub const fn syntax() -> Self {
        Self::of(ErrorKind::Syntax)
    }

    /// The error for combining two values whose calendars differ.
    #[must_use]
    pub const fn calendar_mismatch() -> Self {
        Self {
            kind: ErrorKind::CalendarMismatch,
            detail: Detail::Known(ErrorMessage::CalendarMismatch),
        }
    }

    /// An internal invariant failed. Debug builds record the source file of
    /// the caller as the message.
    #[must_use]
    #[cfg_attr(debug_assertions, track_caller)]
    pub(crate) const fn assert() -> Self {
        #[cfg(debug_assertions)]
        let detail = Detail::Text(core::panic::Location::caller().file());
        #[cfg(not(debug_assertions))]
        let detail = Detail::Empty;
        Self {
            kind: ErrorKind::Assert,
            detail,
        }
    }

    /// Replaces the message of this error.
    #[must_use]
    pub fn with_message(self, msg: &'static str) -> Self {
        Self {
            detail: Detail::Text(msg),
            ..self
        }
    }

    #[must_use]
    pub(crate) fn with_enum(self, msg: ErrorMessage) -> Self {
        Self {
            detail: Detail::Known(msg),
            ..self
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The message without the kind prefix. Empty when none was attached.
    #[must_use]
    pub fn into_message(self) -> &'static str {
        self.detail.text()
    }
}

impl fmt::Display for TemporalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail.text() {
            "" => f.write_str(self.kind.name()),
            message => write!(f, "{}: {message}", self.kind),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TemporalError {}

impl From<DateError> for TemporalError {
    fn from(error: DateError) -> Self {
        Self {
            kind: ErrorKind::Range,
            detail: Detail::Calendar(error),
        }
    }
}

impl From<ParseError> for TemporalError {
    fn from(error: ParseError) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            detail: Detail::Scanner(error),
        }
    }
}

impl From<TimeZoneProviderError> for TemporalError {
    fn from(error: TimeZoneProviderError) -> Self {
        match error {
            TimeZoneProviderError::InstantOutOfRange => {
                Self::range().with_enum(ErrorMessage::InstantOutOfRange)
            }
            TimeZoneProviderError::UnknownIdentifier => {
                Self::time_zone().with_enum(ErrorMessage::TimeZoneUnknown)
            }
            TimeZoneProviderError::Range(msg) => Self::range().with_message(msg),
            TimeZoneProviderError::Assert(msg) => Self::assert().with_message(msg),
            #[allow(unreachable_patterns)]
            _ => Self::assert(),
        }
    }
}

/// Messages raised from more than one place in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorMessage {
    // Limits
    InstantOutOfRange,
    DateOutOfRange,
    IntermediateDateTimeOutOfRange,
    ZDTOutOfDayBounds,
    DurationOutOfRange,
    DurationMixedSign,
    FractionalDigitsPrecisionInvalid,

    // Calendars and fields
    UnknownCalendar,
    MonthCodeOutOfRange,
    MonthMismatch,
    EraYearMismatch,
    EraRequiresEraYear,
    InvalidPartialRecord,
    RequiredFieldMissing,
    CalendarMismatch,

    // Units and option strings
    RelativeToRequired,
    LargestUnitCannotBeDateUnit,
    SmallestUnitIsRequired,
    SmallestUnitNotTimeUnit,
    SmallestUnitLargerThanLargestUnit,
    UnitNotDate,
    UnitNotTime,
    UnitRequired,
    UnitNoAutoDuringComparison,
    RoundToUnitInvalid,
    UnitInvalid,
    RoundingModeInvalid,
    OverflowOptionInvalid,
    DisambiguationInvalid,
    OffsetOptionInvalid,
    CalendarNameInvalid,
    TimeZoneNameInvalid,

    // Time zones
    TimeZoneRequired,
    TimeZoneUnknown,
    TimeZoneGap,
    TimeZoneAmbiguous,
    OffsetNotFound,
    TzMismatch,

    // Strings
    ParserNeedsDate,
    ParserNeedsTimeZone,
    UtcDesignatorNotAllowed,
    FractionalTimeMoreThanNineDigits,
}

impl ErrorMessage {
    const fn text(self) -> &'static str {
        match self {
            Self::InstantOutOfRange => "Epoch nanoseconds fall outside the representable range.",
            Self::DateOutOfRange => "Date falls outside the supported ISO range.",
            Self::IntermediateDateTimeOutOfRange => {
                "An intermediate date-time fell outside the supported range."
            }
            Self::ZDTOutOfDayBounds => "Date-time lies outside the day that contains it.",
            Self::DurationOutOfRange => "Duration field exceeds the supported range.",
            Self::DurationMixedSign => "Duration fields have mixed signs.",
            Self::FractionalDigitsPrecisionInvalid => "fractionalSecondDigits must be 0 to 9.",
            Self::UnknownCalendar => "Unknown calendar identifier.",
            Self::MonthCodeOutOfRange => "Month code does not exist in this calendar.",
            Self::MonthMismatch => "month and monthCode refer to different months.",
            Self::EraYearMismatch => "era and eraYear disagree with year.",
            Self::EraRequiresEraYear => "era and eraYear must be given together.",
            Self::InvalidPartialRecord => "At least one field must be present.",
            Self::RequiredFieldMissing => "A required field is missing.",
            Self::CalendarMismatch => "Both values must use the same calendar.",
            Self::RelativeToRequired => "relativeTo is required for calendar units",
            Self::LargestUnitCannotBeDateUnit => "largestUnit must be a time unit here.",
            Self::SmallestUnitIsRequired => "smallestUnit is required.",
            Self::SmallestUnitNotTimeUnit => "smallestUnit must be a time unit.",
            Self::SmallestUnitLargerThanLargestUnit => {
                "smallestUnit must not be larger than largestUnit."
            }
            Self::UnitNotDate => "Unit must be a date unit.",
            Self::UnitNotTime => "Unit must be a time unit.",
            Self::UnitRequired => "A unit is required.",
            Self::UnitNoAutoDuringComparison => "'auto' is not a unit a comparison can use.",
            Self::RoundToUnitInvalid => "Cannot round to that unit.",
            Self::UnitInvalid => "Not a unit name.",
            Self::RoundingModeInvalid => "Not a roundingMode value.",
            Self::OverflowOptionInvalid => "Not an overflow value.",
            Self::DisambiguationInvalid => "Not a disambiguation value.",
            Self::OffsetOptionInvalid => "Not an offset option value.",
            Self::CalendarNameInvalid => "Not a calendarName value.",
            Self::TimeZoneNameInvalid => "Not a timeZoneName value.",
            Self::TimeZoneRequired => "A time zone is required.",
            Self::TimeZoneUnknown => "Unknown time zone identifier.",
            Self::TimeZoneGap => "The local time is skipped by the time zone.",
            Self::TimeZoneAmbiguous => "The local time occurs twice in the time zone.",
            Self::OffsetNotFound => "The offset is never used by the time zone at that time.",
            Self::TzMismatch => "Day units need both values in the same time zone.",
            Self::ParserNeedsDate => "The string has no date.",
            Self::ParserNeedsTimeZone => "The string has no time zone annotation.",
            Self::UtcDesignatorNotAllowed => "A 'Z' designator cannot be read as a local time.",
            Self::FractionalTimeMoreThanNineDigits => "Fractional part has more than nine digits.",
        }
    }
}

fn calendar_text(error: DateError) -> &'static str {
    match error {
        DateError::Range { field: "year", .. } => "Year out of range.",
        DateError::Range { field: "month", .. } => "Month out of range.",
        DateError::Range { field: "day", .. } => "Day out of range.",
        DateError::Range { .. } => "Field out of range.",
        DateError::UnknownEra => "Unknown era.",
        DateError::UnknownMonthCode(..) => "Unknown month code.",
        #[allow(unreachable_patterns)]
        _ => "Invalid calendar date.",
    }
}

fn scanner_text(error: ParseError) -> &'static str {
    use ParseError as E;
    match error {
        E::DateYear | E::DateExtendedYear => "Invalid character while parsing year value.",
        E::DateMonth => "Invalid character while parsing month value.",
        E::DateDay => "Invalid character while parsing day value.",
        E::InvalidMonthRange => "Month is out of range.",
        E::InvalidDayRange => "Day is out of range.",
        E::DateUnexpectedEnd | E::AbruptEnd { .. } => "Input ended too early.",
        E::InvalidEnd => "Unexpected characters after the value.",
        E::DateSeparator | E::TimeSeparator | E::DecimalSeparator | E::UtcTimeSeparator => {
            "Misplaced or mixed separator."
        }
        E::TimeRequired => "A time is required.",
        E::TimeHour => "Invalid hour.",
        E::TimeMinuteSecond => "Invalid minute or second.",
        E::TimeSecond => "Invalid second.",
        E::FractionPart | E::ParseFloat => "Invalid fractional part.",
        E::InvalidAnnotation
        | E::AnnotationOpen
        | E::AnnotationClose
        | E::AnnotationChar
        | E::AnnotationKeyValueSeparator
        | E::AnnotationKeyLeadingChar
        | E::AnnotationKeyChar
        | E::AnnotationValueCharPostHyphen
        | E::AnnotationValueChar => "Malformed bracketed annotation.",
        E::CriticalDuplicateCalendar => "A critical calendar annotation is repeated.",
        E::UnrecognizedCritical => "Unknown annotation marked critical.",
        E::TzLeadingChar | E::IanaCharPostSeparator | E::IanaChar => {
            "Malformed time zone identifier."
        }
        E::OffsetNeedsSign => "An offset needs a sign.",
        E::InvalidMinutePrecisionOffset => "Offset is finer than minute precision.",
        E::MonthDayHyphen | E::InvalidMonthDay => "Malformed month-day.",
        E::AmbiguousTimeMonthDay | E::AmbiguousTimeYearMonth => {
            "Time string could also be read as a date."
        }
        E::DurationDisgnator | E::TimeDurationDesignator => "Missing duration designator.",
        E::DateDurationPartOrder | E::TimeDurationPartOrder => "Duration parts are out of order.",
        E::DurationValueExceededRange => "Duration field is too large.",
        E::NonAsciiCodePoint => "Non-ASCII character.",
        E::ImplAssert => "Internal parser error.",
        #[allow(unreachable_patterns)]
        _ => "Malformed string.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = TemporalError::range().with_enum(ErrorMessage::RelativeToRequired);
        assert_eq!(
            alloc::format!("{err}"),
            "RangeError: relativeTo is required for calendar units"
        );
        assert_eq!(alloc::format!("{}", TemporalError::syntax()), "SyntaxError");
        assert_eq!(TemporalError::overflow().into_message(), "");
    }

    #[test]
    fn conversions_keep_kinds() {
        let err = TemporalError::from(ParseError::DateMonth);
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(
            err.into_message(),
            "Invalid character while parsing month value."
        );
        let err = TemporalError::from(TimeZoneProviderError::UnknownIdentifier);
        assert_eq!(err.kind(), ErrorKind::TimeZone);
        let err = TemporalError::from(TimeZoneProviderError::Range("too late"));
        assert_eq!(alloc::format!("{err}"), "RangeError: too late");
        assert_eq!(
            TemporalError::calendar_mismatch().kind(),
            ErrorKind::CalendarMismatch
        );
    }

    #[test]
    fn assertions_are_their_own_kind() {
        let err = TemporalError::assert();
        assert_eq!(err.kind(), ErrorKind::Assert);
        assert!(alloc::format!("{err}").starts_with("ImplementationError"));
    }
}
