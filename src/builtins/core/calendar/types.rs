//! Implementation of `MonthCode`

use core::fmt;

use tinystr::{tinystr, TinyAsciiStr};

use crate::error::ErrorMessage;
use crate::{TemporalError, TemporalResult};

use super::CalendarKind;

const MONTH_THIRTEEN: TinyAsciiStr<4> = tinystr!(4, "M13");
const MONTH_FIVE_LEAP: TinyAsciiStr<4> = tinystr!(4, "M05L");

/// A month code identifier, `M01` through `M13` with an optional `L` suffix for leap months.
///
/// Month codes identify a month across years, where ordinal months may shift
/// around leap months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthCode(pub(crate) TinyAsciiStr<4>);

impl MonthCode {
    /// Creates the non-leap month code for a month number.
    pub fn from_month_number(month: u8) -> TemporalResult<Self> {
        if !(1..=13).contains(&month) {
            return Err(TemporalError::range().with_enum(ErrorMessage::MonthCodeOutOfRange));
        }
        let inner = TinyAsciiStr::<4>::try_from_raw([b'M', b'0' + month / 10, b'0' + month % 10, 0])
            .map_err(|_| TemporalError::range().with_enum(ErrorMessage::MonthCodeOutOfRange))?;
        Ok(Self(inner))
    }

    /// Validates that the month code can exist in the provided calendar.
    pub(crate) fn validate(&self, kind: CalendarKind) -> TemporalResult<()> {
        let month = self.to_month_integer();
        let valid = match (month, self.is_leap_month()) {
            (1..=12, false) => true,
            (1..=12, true) => matches!(kind, CalendarKind::Chinese | CalendarKind::Dangi)
                || (kind == CalendarKind::Hebrew && self.0 == MONTH_FIVE_LEAP),
            (13, false) => {
                matches!(
                    kind,
                    CalendarKind::Coptic
                        | CalendarKind::Ethiopian
                        | CalendarKind::EthiopianAmeteAlem
                ) && self.0 == MONTH_THIRTEEN
            }
            _ => false,
        };
        if !valid {
            return Err(TemporalError::range().with_enum(ErrorMessage::MonthCodeOutOfRange));
        }
        Ok(())
    }

    /// Returns the month number of the `MonthCode`, ignoring the leap marker.
    pub fn to_month_integer(&self) -> u8 {
        let bytes = self.0.all_bytes();
        (bytes[1] - b'0') * 10 + (bytes[2] - b'0')
    }

    /// Returns whether the `MonthCode` is a leap month.
    pub fn is_leap_month(&self) -> bool {
        self.0.all_bytes()[3] == b'L'
    }

    /// Returns the month code with the leap marker removed.
    pub(crate) fn base(&self) -> Self {
        let bytes = self.0.all_bytes();
        TinyAsciiStr::<4>::try_from_raw([bytes[0], bytes[1], bytes[2], 0])
            .map(Self)
            .unwrap_or(*self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_tinystr(&self) -> TinyAsciiStr<4> {
        self.0
    }

    /// Parses a month code from UTF-8 bytes.
    pub fn try_from_utf8(src: &[u8]) -> TemporalResult<Self> {
        if !(3..=4).contains(&src.len()) {
            return Err(
                TemporalError::range().with_message("Month codes must have 3 or 4 characters.")
            );
        }

        let inner = TinyAsciiStr::<4>::try_from_utf8(src)
            .map_err(|_| TemporalError::range().with_enum(ErrorMessage::MonthCodeOutOfRange))?;

        let bytes = inner.all_bytes();
        if bytes[0] != b'M' {
            return Err(
                TemporalError::range().with_message("First month code character must be 'M'.")
            );
        }
        if !bytes[1].is_ascii_digit() || !bytes[2].is_ascii_digit() {
            return Err(TemporalError::range().with_message("Invalid month code digit."));
        }
        if src.len() == 4 && bytes[3] != b'L' {
            return Err(TemporalError::range().with_message("Leap month code must end with 'L'."));
        }
        if bytes[1] == b'0' && bytes[2] == b'0' {
            return Err(TemporalError::range().with_enum(ErrorMessage::MonthCodeOutOfRange));
        }

        Ok(Self(inner))
    }
}

impl core::str::FromStr for MonthCode {
    type Err = TemporalError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_utf8(s.as_bytes())
    }
}

impl fmt::Display for MonthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
