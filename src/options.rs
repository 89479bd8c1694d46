//! Option values accepted by the arithmetic, rounding and formatting methods.
//!
//! Every string-valued option parses with [`FromStr`] and prints back its
//! canonical spelling with [`Display`](fmt::Display). Unknown strings are a
//! `RangeError`.

use core::{fmt, str::FromStr};

use crate::{error::ErrorMessage, TemporalError, TemporalResult, NS_PER_DAY};

mod increment;
mod relative_to;

pub use increment::RoundingIncrement;
pub use relative_to::RelativeTo;

/// Implements `FromStr` and `Display` for an option enum from one table. The
/// first spelling of each variant is the one that is displayed.
macro_rules! option_strings {
    ($ty:ty, $invalid:ident, { $($variant:ident => $name:literal $(| $alias:literal)*,)+ }) => {
        impl FromStr for $ty {
            type Err = TemporalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(TemporalError::range().with_enum(ErrorMessage::$invalid)),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $name,)+
                })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DifferenceOperation {
    Until,
    Since,
}

// ==== Units ====

/// A unit of time, ordered from `Nanosecond` up to `Year`. `Auto` sorts
/// below every real unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    /// Let the operation choose.
    Auto = 0,
    Nanosecond,
    Microsecond,
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

option_strings!(Unit, UnitInvalid, {
    Auto => "auto",
    Year => "year" | "years",
    Month => "month" | "months",
    Week => "week" | "weeks",
    Day => "day" | "days",
    Hour => "hour" | "hours",
    Minute => "minute" | "minutes",
    Second => "second" | "seconds",
    Millisecond => "millisecond" | "milliseconds",
    Microsecond => "microsecond" | "microseconds",
    Nanosecond => "nanosecond" | "nanoseconds",
});

impl Unit {
    /// The real units in the order of the fields of a duration.
    pub(crate) const DESCENDING: [Unit; 10] = [
        Unit::Year,
        Unit::Month,
        Unit::Week,
        Unit::Day,
        Unit::Hour,
        Unit::Minute,
        Unit::Second,
        Unit::Millisecond,
        Unit::Microsecond,
        Unit::Nanosecond,
    ];

    /// The next larger unit, or `None` above `Year`.
    pub(crate) fn larger(self) -> Option<Unit> {
        let index = Self::DESCENDING.iter().position(|unit| *unit == self)?;
        index.checked_sub(1).and_then(|i| Self::DESCENDING.get(i).copied())
    }

    /// The largest increment allowed when rounding to this unit, exclusive.
    /// Units of a day or longer have none.
    pub(crate) fn to_maximum_rounding_increment(self) -> Option<u32> {
        match self {
            Unit::Hour => Some(24),
            Unit::Minute | Unit::Second => Some(60),
            Unit::Millisecond | Unit::Microsecond | Unit::Nanosecond => Some(1000),
            _ => None,
        }
    }

    /// Returns the length of this unit in nanoseconds.
    ///
    /// A day counts as 24 hours. Weeks, months and years have no fixed length.
    #[must_use]
    pub fn as_nanoseconds(&self) -> Option<u64> {
        let length = match self {
            Unit::Day => NS_PER_DAY,
            Unit::Hour => 3_600_000_000_000,
            Unit::Minute => 60_000_000_000,
            Unit::Second => 1_000_000_000,
            Unit::Millisecond => 1_000_000,
            Unit::Microsecond => 1_000,
            Unit::Nanosecond => 1,
            Unit::Auto | Unit::Week | Unit::Month | Unit::Year => return None,
        };
        Some(length)
    }

    /// Years, months and weeks.
    #[must_use]
    pub fn is_calendar_unit(&self) -> bool {
        matches!(self, Unit::Year | Unit::Month | Unit::Week)
    }

    #[must_use]
    pub fn is_date_unit(&self) -> bool {
        self.is_calendar_unit() || *self == Unit::Day
    }

    #[must_use]
    pub fn is_time_unit(&self) -> bool {
        *self != Unit::Auto && !self.is_date_unit()
    }
}

/// The group of units an option value is allowed to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitGroup {
    Date,
    Time,
    DateTime,
}

impl UnitGroup {
    /// Like [`UnitGroup::validate_unit`], but a missing unit is an error.
    pub fn validate_required_unit(
        self,
        unit: Option<Unit>,
        extra_unit: Option<Unit>,
    ) -> TemporalResult<Unit> {
        let unit = unit.ok_or(TemporalError::range().with_enum(ErrorMessage::UnitRequired))?;
        self.validate_unit(Some(unit), extra_unit)?;
        Ok(unit)
    }

    /// Checks that `unit` is absent, equal to `extra_unit`, or a member of
    /// this group. `Auto` belongs to no group.
    pub fn validate_unit(self, unit: Option<Unit>, extra_unit: Option<Unit>) -> TemporalResult<()> {
        let Some(unit) = unit else {
            return Ok(());
        };
        if Some(unit) == extra_unit {
            return Ok(());
        }
        let (allowed, message) = match self {
            UnitGroup::Date => (unit.is_date_unit(), ErrorMessage::UnitNotDate),
            UnitGroup::Time => (unit.is_time_unit(), ErrorMessage::UnitNotTime),
            UnitGroup::DateTime => (unit != Unit::Auto, ErrorMessage::UnitNoAutoDuringComparison),
        };
        if allowed {
            Ok(())
        } else {
            Err(TemporalError::range().with_enum(message))
        }
    }
}

// ==== Rounding ====

/// How a value between two multiples of the increment is rounded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Toward positive infinity.
    Ceil,
    /// Toward negative infinity.
    Floor,
    /// Away from zero.
    Expand,
    /// Toward zero.
    Trunc,
    HalfCeil,
    HalfFloor,
    /// Nearest, ties away from zero.
    #[default]
    HalfExpand,
    HalfTrunc,
    /// Nearest, ties to the even multiple.
    HalfEven,
}

option_strings!(RoundingMode, RoundingModeInvalid, {
    Ceil => "ceil",
    Floor => "floor",
    Expand => "expand",
    Trunc => "trunc",
    HalfCeil => "halfCeil",
    HalfFloor => "halfFloor",
    HalfExpand => "halfExpand",
    HalfTrunc => "halfTrunc",
    HalfEven => "halfEven",
});

/// A rounding mode applied to a magnitude, once the sign is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsignedRoundingMode {
    Infinity,
    Zero,
    HalfInfinity,
    HalfZero,
    HalfEven,
}

impl RoundingMode {
    /// The mode that gives the mirrored result on the negated value.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Ceil => Self::Floor,
            Self::Floor => Self::Ceil,
            Self::HalfCeil => Self::HalfFloor,
            Self::HalfFloor => Self::HalfCeil,
            Self::Trunc | Self::Expand | Self::HalfTrunc | Self::HalfExpand | Self::HalfEven => {
                self
            }
        }
    }

    /// The mode to apply to the magnitude of a value with the given sign.
    #[must_use]
    pub const fn get_unsigned_round_mode(self, is_positive: bool) -> UnsignedRoundingMode {
        let mode = if is_positive { self } else { self.negate() };
        match mode {
            Self::Ceil | Self::Expand => UnsignedRoundingMode::Infinity,
            Self::Floor | Self::Trunc => UnsignedRoundingMode::Zero,
            Self::HalfCeil | Self::HalfExpand => UnsignedRoundingMode::HalfInfinity,
            Self::HalfFloor | Self::HalfTrunc => UnsignedRoundingMode::HalfZero,
            Self::HalfEven => UnsignedRoundingMode::HalfEven,
        }
    }
}

/// The settings accepted by the `until` and `since` methods.
#[non_exhaustive]
#[derive(Debug, Default, Clone, Copy)]
pub struct DifferenceSettings {
    pub largest_unit: Option<Unit>,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
    pub increment: Option<RoundingIncrement>,
}

impl DifferenceSettings {
    pub fn new(
        largest_unit: Option<Unit>,
        smallest_unit: Option<Unit>,
        rounding_mode: Option<RoundingMode>,
        increment: Option<RoundingIncrement>,
    ) -> Self {
        Self {
            largest_unit,
            smallest_unit,
            rounding_mode,
            increment,
        }
    }
}

/// The options accepted by the `round` methods.
///
/// The default asks for `largestUnit: "auto"`, since leaving out both units
/// is an error.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct RoundingOptions {
    pub largest_unit: Option<Unit>,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
    pub increment: Option<RoundingIncrement>,
}

impl Default for RoundingOptions {
    fn default() -> Self {
        Self {
            largest_unit: Some(Unit::Auto),
            smallest_unit: None,
            rounding_mode: None,
            increment: None,
        }
    }
}

impl RoundingOptions {
    /// Rounding to `unit` with every other option left at its default.
    pub fn with_smallest_unit(unit: Unit) -> Self {
        Self {
            largest_unit: None,
            smallest_unit: Some(unit),
            rounding_mode: None,
            increment: None,
        }
    }
}

/// Rounding options with every default filled in and every constraint checked.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedRoundingOptions {
    pub(crate) largest_unit: Unit,
    pub(crate) smallest_unit: Unit,
    pub(crate) increment: RoundingIncrement,
    pub(crate) rounding_mode: RoundingMode,
}

/// `auto` and an absent unit both become `default`. The result may not be
/// smaller than `smallest`.
fn resolve_largest_unit(
    requested: Option<Unit>,
    default: Unit,
    smallest: Unit,
) -> TemporalResult<Unit> {
    let largest = match requested {
        Some(Unit::Auto) | None => default,
        Some(unit) => unit,
    };
    if largest < smallest {
        return Err(
            TemporalError::range().with_enum(ErrorMessage::SmallestUnitLargerThanLargestUnit)
        );
    }
    Ok(largest)
}

/// Time units cap the increment below the size of the next larger unit.
fn check_time_increment(increment: RoundingIncrement, unit: Unit) -> TemporalResult<()> {
    match unit.to_maximum_rounding_increment() {
        Some(maximum) => increment.validate(maximum.into(), false),
        None => Ok(()),
    }
}

impl ResolvedRoundingOptions {
    pub(crate) fn from_to_string_options(options: &ResolvedToStringRoundingOptions) -> Self {
        Self {
            largest_unit: Unit::Auto,
            smallest_unit: options.smallest_unit,
            increment: options.increment,
            rounding_mode: options.rounding_mode,
        }
    }

    /// Resolves `until`/`since` settings. `since` measures backwards, so its
    /// rounding mode is negated.
    pub(crate) fn from_diff_settings(
        settings: DifferenceSettings,
        operation: DifferenceOperation,
        unit_group: UnitGroup,
        fallback_largest: Unit,
        fallback_smallest: Unit,
    ) -> TemporalResult<Self> {
        unit_group.validate_unit(settings.largest_unit, Some(Unit::Auto))?;
        unit_group.validate_unit(settings.smallest_unit, None)?;

        let smallest_unit = settings.smallest_unit.unwrap_or(fallback_smallest);
        let largest_unit = resolve_largest_unit(
            settings.largest_unit,
            smallest_unit.max(fallback_largest),
            smallest_unit,
        )?;
        let increment = settings.increment.unwrap_or_default();
        check_time_increment(increment, smallest_unit)?;

        let mode = settings.rounding_mode.unwrap_or(RoundingMode::Trunc);
        let rounding_mode = match operation {
            DifferenceOperation::Until => mode,
            DifferenceOperation::Since => mode.negate(),
        };

        Ok(Self {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode,
        })
    }

    pub(crate) fn from_duration_options(
        options: RoundingOptions,
        existing_largest: Unit,
    ) -> TemporalResult<Self> {
        if options.largest_unit.is_none() && options.smallest_unit.is_none() {
            return Err(TemporalError::range().with_enum(ErrorMessage::SmallestUnitIsRequired));
        }
        UnitGroup::DateTime.validate_unit(options.smallest_unit, None)?;

        let smallest_unit = options.smallest_unit.unwrap_or(Unit::Nanosecond);
        let largest_unit = resolve_largest_unit(
            options.largest_unit,
            existing_largest.max(smallest_unit),
            smallest_unit,
        )?;
        let increment = options.increment.unwrap_or_default();
        check_time_increment(increment, smallest_unit)?;

        // Multiples of a date unit only make sense when nothing larger is kept.
        if increment != RoundingIncrement::ONE
            && smallest_unit.is_date_unit()
            && largest_unit != smallest_unit
        {
            return Err(TemporalError::range()
                .with_message("roundingIncrement is only allowed when rounding to one date unit."));
        }

        Ok(Self {
            largest_unit,
            smallest_unit,
            increment,
            rounding_mode: options.rounding_mode.unwrap_or_default(),
        })
    }

    /// Shared tail of the single value `round` methods.
    fn single_unit(
        options: RoundingOptions,
        smallest_unit: Unit,
        maximum: u64,
        inclusive: bool,
    ) -> TemporalResult<Self> {
        let increment = options.increment.unwrap_or_default();
        increment.validate(maximum, inclusive)?;
        Ok(Self {
            largest_unit: Unit::Auto,
            smallest_unit,
            increment,
            rounding_mode: options.rounding_mode.unwrap_or_default(),
        })
    }

    /// `PlainDateTime` and `ZonedDateTime` may also round to a whole day.
    pub(crate) fn from_datetime_options(options: RoundingOptions) -> TemporalResult<Self> {
        let unit = UnitGroup::Time.validate_required_unit(options.smallest_unit, Some(Unit::Day))?;
        match unit.to_maximum_rounding_increment() {
            Some(maximum) => Self::single_unit(options, unit, maximum.into(), false),
            None => Self::single_unit(options, unit, 1, true),
        }
    }

    pub(crate) fn from_time_options(options: RoundingOptions) -> TemporalResult<Self> {
        let unit = UnitGroup::Time.validate_required_unit(options.smallest_unit, None)?;
        let maximum = unit
            .to_maximum_rounding_increment()
            .ok_or(TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit))?;
        Self::single_unit(options, unit, maximum.into(), false)
    }

    /// An instant is rounded on the UTC day, so the increment must divide a
    /// day evenly and may span all of it.
    pub(crate) fn from_instant_options(options: RoundingOptions) -> TemporalResult<Self> {
        let unit = UnitGroup::Time.validate_required_unit(options.smallest_unit, None)?;
        let unit_length = unit
            .as_nanoseconds()
            .ok_or(TemporalError::range().with_enum(ErrorMessage::RoundToUnitInvalid))?;
        Self::single_unit(options, unit, NS_PER_DAY / unit_length, true)
    }

    pub(crate) fn is_noop(&self) -> bool {
        self.smallest_unit == Unit::Nanosecond && self.increment == RoundingIncrement::ONE
    }
}

// ==== String output ====

/// The precision of the fractional seconds emitted by `to_ixdtf_string`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// As many digits as needed, without trailing zeros.
    #[default]
    Auto,
    /// Hours and minutes only.
    Minute,
    /// Exactly this many fractional second digits (0 to 9).
    Digit(u8),
}

/// Options for rounding a value while converting it to a string.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToStringRoundingOptions {
    pub precision: Precision,
    pub smallest_unit: Option<Unit>,
    pub rounding_mode: Option<RoundingMode>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedToStringRoundingOptions {
    pub(crate) precision: Precision,
    pub(crate) smallest_unit: Unit,
    pub(crate) rounding_mode: RoundingMode,
    pub(crate) increment: RoundingIncrement,
}

impl ToStringRoundingOptions {
    /// Turns the requested precision into a unit and increment to round with.
    /// An explicit `smallest_unit` overrides `precision`.
    pub(crate) fn resolve(&self) -> TemporalResult<ResolvedToStringRoundingOptions> {
        let (precision, smallest_unit, increment) = match (self.smallest_unit, self.precision) {
            (Some(Unit::Minute), _) | (None, Precision::Minute) => {
                (Precision::Minute, Unit::Minute, 1)
            }
            (None, Precision::Auto) => (Precision::Auto, Unit::Nanosecond, 1),
            (Some(unit), _) => {
                let digits = match unit {
                    Unit::Second => 0,
                    Unit::Millisecond => 3,
                    Unit::Microsecond => 6,
                    Unit::Nanosecond => 9,
                    _ => {
                        return Err(
                            TemporalError::range().with_enum(ErrorMessage::SmallestUnitNotTimeUnit)
                        )
                    }
                };
                (Precision::Digit(digits), unit, 1)
            }
            (None, Precision::Digit(digits @ 0..=9)) => {
                let unit = match digits {
                    0 => Unit::Second,
                    1..=3 => Unit::Millisecond,
                    4..=6 => Unit::Microsecond,
                    _ => Unit::Nanosecond,
                };
                // Each digit short of the unit's own three rounds by another factor of ten.
                let missing = u32::from(9 - digits) % 3;
                (Precision::Digit(digits), unit, 10_u32.pow(missing))
            }
            (None, Precision::Digit(_)) => {
                return Err(
                    TemporalError::range().with_enum(ErrorMessage::FractionalDigitsPrecisionInvalid)
                )
            }
        };
        Ok(ResolvedToStringRoundingOptions {
            precision,
            smallest_unit,
            rounding_mode: self.rounding_mode.unwrap_or(RoundingMode::Trunc),
            increment: RoundingIncrement::try_new(increment)?,
        })
    }
}

/// Whether to show the calendar annotation in `to_ixdtf_string` methods.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCalendar {
    /// Emit the annotation unless the calendar is ISO.
    #[default]
    Auto,
    /// Always emit `[u-ca=...]`.
    Always,
    /// Never emit an annotation.
    Never,
    /// Always emit `[!u-ca=...]`.
    Critical,
}

option_strings!(DisplayCalendar, CalendarNameInvalid, {
    Auto => "auto",
    Always => "always",
    Never => "never",
    Critical => "critical",
});

/// Whether to show the UTC offset in `ZonedDateTime::to_ixdtf_string`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOffset {
    #[default]
    Auto,
    Never,
}

option_strings!(DisplayOffset, OffsetOptionInvalid, {
    Auto => "auto",
    Never => "never",
});

/// Whether to show the time zone annotation in `ZonedDateTime::to_ixdtf_string`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTimeZone {
    /// Emit `[id]`.
    #[default]
    Auto,
    /// Emit nothing.
    Never,
    /// Emit `[!id]`.
    Critical,
}

option_strings!(DisplayTimeZone, TimeZoneNameInvalid, {
    Auto => "auto",
    Never => "never",
    Critical => "critical",
});

// ==== Field resolution ====

/// Whether out of range fields are clamped or rejected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    #[default]
    Constrain,
    Reject,
}

option_strings!(Overflow, OverflowOptionInvalid, {
    Constrain => "constrain",
    Reject => "reject",
});

/// Which instant to pick for a wall-clock time that a time zone skips or
/// repeats.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Disambiguation {
    /// `Earlier` for repeated times, `Later` for skipped ones.
    #[default]
    Compatible,
    Earlier,
    Later,
    /// Fail with a `TimeZone` error.
    Reject,
}

option_strings!(Disambiguation, DisambiguationInvalid, {
    Compatible => "compatible",
    Earlier => "earlier",
    Later => "later",
    Reject => "reject",
});

/// What to do when a parsed or given offset disagrees with the time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetDisambiguation {
    /// Trust the offset.
    Use,
    /// Use the offset if the zone can have it, else the zone's rules.
    Prefer,
    /// Trust the time zone.
    Ignore,
    /// Fail unless they agree.
    Reject,
}

option_strings!(OffsetDisambiguation, OffsetOptionInvalid, {
    Use => "use",
    Prefer => "prefer",
    Ignore => "ignore",
    Reject => "reject",
});
