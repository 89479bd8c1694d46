//! This module implements the calendar dispatcher and related components.
//!
//! A [`Calendar`] is a tag over the closed set of supported calendars, backed by
//! the `icu_calendar` leaf implementations. Every date is stored as an ISO date,
//! and calendar fields are computed on demand by moving through Rata Die day
//! counts.

use crate::{
    builtins::core::{
        duration::DateDuration, PartialDate, PlainDate, PlainDateTime, PlainMonthDay,
        PlainYearMonth, ZonedDateTime,
    },
    error::ErrorMessage,
    iso::IsoDate,
    options::{Overflow, Unit},
    parsers::parse_allowed_calendar_formats,
    utils, TemporalError, TemporalResult,
};
use core::{cmp::Ordering, fmt, str::FromStr};

use icu_calendar::{
    cal::{
        Buddhist, Chinese, Coptic, Dangi, Ethiopian, EthiopianEraStyle, Hebrew, HijriTabular,
        HijriTabularEpoch, HijriTabularLeapYears, HijriUmmAlQura, Indian, Japanese,
        JapaneseExtended, Persian, Roc,
    },
    types::RataDie,
    AnyCalendar, Date, Gregorian, Iso, Ref,
};
use tinystr::{tinystr, TinyAsciiStr};

mod era;
mod types;

pub use types::MonthCode;

type CalendarDate = Date<Ref<'static, AnyCalendar>>;

/// The largest distance in years from the epoch that a calendar year lookup will attempt.
const MAX_YEAR_DISTANCE: i64 = 300_000;

/// The slack in days around the epoch day limits while searching for year starts.
const YEAR_SEARCH_SLACK: i64 = 800;

/// The number of calendar years searched for a `PlainMonthDay` reference date.
const MONTH_DAY_SEARCH_YEARS: i32 = 60;

/// The closed set of calendars supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CalendarKind {
    /// The ISO 8601 calendar.
    #[default]
    Iso,
    /// The proleptic Gregorian calendar with `ce` and `bce` eras.
    Gregorian,
    /// The Thai Buddhist calendar.
    Buddhist,
    /// The traditional Chinese lunisolar calendar.
    Chinese,
    /// The Coptic calendar.
    Coptic,
    /// The traditional Korean lunisolar calendar.
    Dangi,
    /// The Ethiopian calendar counting from the Incarnation.
    Ethiopian,
    /// The Ethiopian calendar counting from the Creation.
    EthiopianAmeteAlem,
    /// The Hebrew lunisolar calendar.
    Hebrew,
    /// The Indian national calendar.
    Indian,
    /// The tabular Hijri calendar with a Friday epoch.
    HijriTabularFriday,
    /// The tabular Hijri calendar with a Thursday epoch.
    HijriTabularThursday,
    /// The Hijri Umm al-Qura calendar.
    HijriUmmAlQura,
    /// The Japanese calendar with modern eras.
    Japanese,
    /// The Japanese calendar with all historical eras.
    JapaneseExtended,
    /// The Persian solar hijri calendar.
    Persian,
    /// The Republic of China calendar.
    Roc,
}

impl CalendarKind {
    /// Every supported calendar kind.
    pub const ALL: [Self; 17] = [
        Self::Iso,
        Self::Gregorian,
        Self::Buddhist,
        Self::Chinese,
        Self::Coptic,
        Self::Dangi,
        Self::Ethiopian,
        Self::EthiopianAmeteAlem,
        Self::Hebrew,
        Self::Indian,
        Self::HijriTabularFriday,
        Self::HijriTabularThursday,
        Self::HijriUmmAlQura,
        Self::Japanese,
        Self::JapaneseExtended,
        Self::Persian,
        Self::Roc,
    ];

    /// Returns the canonical BCP-47 identifier of the calendar.
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Iso => "iso8601",
            Self::Gregorian => "gregory",
            Self::Buddhist => "buddhist",
            Self::Chinese => "chinese",
            Self::Coptic => "coptic",
            Self::Dangi => "dangi",
            Self::Ethiopian => "ethiopic",
            Self::EthiopianAmeteAlem => "ethioaa",
            Self::Hebrew => "hebrew",
            Self::Indian => "indian",
            Self::HijriTabularFriday => "islamic-civil",
            Self::HijriTabularThursday => "islamic-tbla",
            Self::HijriUmmAlQura => "islamic-umalqura",
            Self::Japanese => "japanese",
            Self::JapaneseExtended => "japanext",
            Self::Persian => "persian",
            Self::Roc => "roc",
        }
    }

    /// Looks up a calendar kind from an ASCII case-insensitive identifier.
    pub fn try_from_identifier(bytes: &[u8]) -> Option<Self> {
        let canonical: &[u8] = if bytes.eq_ignore_ascii_case(b"islamicc") {
            b"islamic-civil"
        } else if bytes.eq_ignore_ascii_case(b"ethiopic-amete-alem") {
            b"ethioaa"
        } else {
            bytes
        };
        Self::ALL
            .into_iter()
            .find(|kind| kind.identifier().as_bytes().eq_ignore_ascii_case(canonical))
    }

    /// The month count of calendars whose years always have the same number of months.
    const fn fixed_months_in_year(self) -> Option<i64> {
        match self {
            Self::Chinese | Self::Dangi | Self::Hebrew => None,
            Self::Coptic | Self::Ethiopian | Self::EthiopianAmeteAlem => Some(13),
            _ => Some(12),
        }
    }

    /// The mean year length as a `(days, years)` ratio, used to estimate year starts.
    const fn mean_year(self) -> (i64, i64) {
        match self {
            Self::HijriTabularFriday | Self::HijriTabularThursday | Self::HijriUmmAlQura => {
                (10_631, 30)
            }
            _ => (146_097, 400),
        }
    }
}

impl fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// The arithmetic year, ordinal month, month code and day of a date in some calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CalendarFields {
    pub(crate) year: i32,
    pub(crate) month: u8,
    pub(crate) month_code: MonthCode,
    pub(crate) day: u8,
}

impl CalendarFields {
    fn cmp_to(&self, year: i32, month: u8, day: u8) -> Ordering {
        (year, month, day).cmp(&(self.year, self.month, self.day))
    }
}

/// Which kind of value a set of partial fields is resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolutionType {
    Date,
    YearMonth,
    MonthDay,
}

/// A calendar, shared by handle into a constant table of `icu_calendar` calendars.
#[derive(Clone, Copy)]
pub struct Calendar {
    kind: CalendarKind,
    inner: &'static AnyCalendar,
}

impl fmt::Debug for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Calendar").field(&self.kind).finish()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::ISO
    }
}

impl PartialEq for Calendar {
    fn eq(&self, other: &Self) -> bool {
        self.identifier() == other.identifier()
    }
}

impl Eq for Calendar {}

impl core::hash::Hash for Calendar {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.identifier().hash(state);
    }
}

impl Calendar {
    pub const ISO: Self = Self::new(CalendarKind::Iso);
    pub const GREGORIAN: Self = Self::new(CalendarKind::Gregorian);
    pub const BUDDHIST: Self = Self::new(CalendarKind::Buddhist);
    pub const CHINESE: Self = Self::new(CalendarKind::Chinese);
    pub const COPTIC: Self = Self::new(CalendarKind::Coptic);
    pub const DANGI: Self = Self::new(CalendarKind::Dangi);
    pub const ETHIOPIAN: Self = Self::new(CalendarKind::Ethiopian);
    pub const ETHIOPIAN_AMETE_ALEM: Self = Self::new(CalendarKind::EthiopianAmeteAlem);
    pub const HEBREW: Self = Self::new(CalendarKind::Hebrew);
    pub const INDIAN: Self = Self::new(CalendarKind::Indian);
    pub const HIJRI_TABULAR_FRIDAY: Self = Self::new(CalendarKind::HijriTabularFriday);
    pub const HIJRI_TABULAR_THURSDAY: Self = Self::new(CalendarKind::HijriTabularThursday);
    pub const HIJRI_UMM_AL_QURA: Self = Self::new(CalendarKind::HijriUmmAlQura);
    pub const JAPANESE: Self = Self::new(CalendarKind::Japanese);
    pub const JAPANESE_EXTENDED: Self = Self::new(CalendarKind::JapaneseExtended);
    pub const PERSIAN: Self = Self::new(CalendarKind::Persian);
    pub const ROC: Self = Self::new(CalendarKind::Roc);

    /// Creates a `Calendar` for the provided kind.
    pub const fn new(kind: CalendarKind) -> Self {
        let inner: &'static AnyCalendar = match kind {
            CalendarKind::Iso => const { &AnyCalendar::Iso(Iso) },
            CalendarKind::Gregorian => const { &AnyCalendar::Gregorian(Gregorian) },
            CalendarKind::Buddhist => const { &AnyCalendar::Buddhist(Buddhist) },
            CalendarKind::Chinese => const { &AnyCalendar::Chinese(Chinese::new()) },
            CalendarKind::Coptic => const { &AnyCalendar::Coptic(Coptic) },
            CalendarKind::Dangi => const { &AnyCalendar::Dangi(Dangi::new()) },
            CalendarKind::Ethiopian => {
                const {
                    &AnyCalendar::Ethiopian(Ethiopian::new_with_era_style(
                        EthiopianEraStyle::AmeteMihret,
                    ))
                }
            }
            CalendarKind::EthiopianAmeteAlem => {
                const {
                    &AnyCalendar::Ethiopian(Ethiopian::new_with_era_style(
                        EthiopianEraStyle::AmeteAlem,
                    ))
                }
            }
            CalendarKind::Hebrew => const { &AnyCalendar::Hebrew(Hebrew) },
            CalendarKind::Indian => const { &AnyCalendar::Indian(Indian) },
            CalendarKind::HijriTabularFriday => {
                const {
                    &AnyCalendar::HijriTabular(HijriTabular::new(
                        HijriTabularLeapYears::TypeII,
                        HijriTabularEpoch::Friday,
                    ))
                }
            }
            CalendarKind::HijriTabularThursday => {
                const {
                    &AnyCalendar::HijriTabular(HijriTabular::new(
                        HijriTabularLeapYears::TypeII,
                        HijriTabularEpoch::Thursday,
                    ))
                }
            }
            CalendarKind::HijriUmmAlQura => {
                const { &AnyCalendar::HijriUmmAlQura(HijriUmmAlQura::new()) }
            }
            CalendarKind::Japanese => const { &AnyCalendar::Japanese(Japanese::new()) },
            CalendarKind::JapaneseExtended => {
                const { &AnyCalendar::JapaneseExtended(JapaneseExtended::new()) }
            }
            CalendarKind::Persian => const { &AnyCalendar::Persian(Persian) },
            CalendarKind::Roc => const { &AnyCalendar::Roc(Roc) },
        };
        Self { kind, inner }
    }

    /// Returns a `Calendar` from a slice of UTF-8 encoded identifier bytes.
    pub fn try_from_utf8(bytes: &[u8]) -> TemporalResult<Self> {
        CalendarKind::try_from_identifier(bytes)
            .map(Self::new)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::UnknownCalendar))
    }
}

impl FromStr for Calendar {
    type Err = TemporalError;

    // ParseTemporalCalendarString ( string )
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_allowed_calendar_formats(s.as_bytes()) {
            Some([]) => Ok(Calendar::default()),
            Some(result) => Calendar::try_from_utf8(result),
            None => Calendar::try_from_utf8(s.as_bytes()),
        }
    }
}

impl From<CalendarKind> for Calendar {
    fn from(kind: CalendarKind) -> Self {
        Self::new(kind)
    }
}

// ==== Public `Calendar` methods ====

impl Calendar {
    /// Returns whether the current calendar is `ISO`
    #[inline]
    pub fn is_iso(&self) -> bool {
        self.kind == CalendarKind::Iso
    }

    /// Returns the kind of this calendar.
    #[inline]
    pub fn kind(&self) -> CalendarKind {
        self.kind
    }

    /// Returns the identifier of this calendar.
    #[inline]
    pub fn identifier(&self) -> &'static str {
        self.kind.identifier()
    }

    /// `CalendarDateFromFields`
    pub fn date_from_partial(
        &self,
        partial: &PartialDate,
        overflow: Overflow,
    ) -> TemporalResult<PlainDate> {
        let iso = self.resolve_partial(partial, overflow, ResolutionType::Date)?;
        Ok(PlainDate::new_unchecked(iso, *self))
    }

    /// `CalendarYearMonthFromFields`
    pub fn year_month_from_partial(
        &self,
        partial: &PartialDate,
        overflow: Overflow,
    ) -> TemporalResult<PlainYearMonth> {
        let iso = self.resolve_partial(partial, overflow, ResolutionType::YearMonth)?;
        PlainYearMonth::new_from_iso(iso, *self)
    }

    /// `CalendarMonthDayFromFields`
    pub fn month_day_from_partial(
        &self,
        partial: &PartialDate,
        overflow: Overflow,
    ) -> TemporalResult<PlainMonthDay> {
        let iso = self.resolve_partial(partial, overflow, ResolutionType::MonthDay)?;
        Ok(PlainMonthDay::new_unchecked(iso, *self))
    }

    /// `CalendarDateAdd`
    pub fn date_add(
        &self,
        date: &IsoDate,
        duration: &DateDuration,
        overflow: Overflow,
    ) -> TemporalResult<PlainDate> {
        if self.is_iso() {
            let result = date.add_date_duration(duration, overflow)?;
            return Ok(PlainDate::new_unchecked(result, *self));
        }

        let fields = self.fields(date);
        let mut year = fields.year;
        let mut month = fields.month;

        if duration.years != 0 {
            year = i32::try_from(i64::from(year) + duration.years)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))?;
            let start = self.year_start(year)?;
            month = self.ordinal_for_code(year, start, fields.month_code, overflow)?;
        }

        if duration.months != 0 {
            (year, month) = self.add_months(year, month, duration.months)?;
        }

        let month_start = self.month_start(self.year_start(year)?, month);
        let days_in_month = self.calendar_date(month_start).days_in_month();
        let day = resolve_field(fields.day, days_in_month, overflow)?;

        let additional_days = duration
            .weeks
            .checked_mul(7)
            .and_then(|weeks| weeks.checked_add(duration.days))
            .ok_or(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))?;
        let rata_die = month_start + i64::from(day) - 1 + additional_days;
        check_rata_die(rata_die, 0)?;
        let result = IsoDate::from_rata_die(rata_die);
        result.check_within_limits()?;
        Ok(PlainDate::new_unchecked(result, *self))
    }

    /// `CalendarDateUntil`
    pub fn date_until(
        &self,
        one: &IsoDate,
        two: &IsoDate,
        largest_unit: Unit,
    ) -> TemporalResult<DateDuration> {
        if self.is_iso() || matches!(largest_unit, Unit::Week | Unit::Day) {
            return Ok(one.diff_iso_date(two, largest_unit));
        }
        if !matches!(largest_unit, Unit::Year | Unit::Month) {
            return Err(TemporalError::range().with_enum(ErrorMessage::UnitNotDate));
        }

        let sign: i8 = match one.cmp(two) {
            Ordering::Equal => return Ok(DateDuration::default()),
            Ordering::Less => 1,
            Ordering::Greater => -1,
        };
        let start = self.fields(one);
        let end = self.fields(two);
        let surpasses = |year: i32, month: u8, day: u8| end.cmp_to(year, month, day) as i8 * sign > 0;

        let mut years = 0;
        let (mut year, mut month) = (start.year, start.month);
        if largest_unit == Unit::Year {
            let mut candidate = end.year - start.year;
            if candidate != 0 {
                candidate -= i32::from(sign);
            }
            loop {
                let candidate_year = start.year + candidate;
                let year_start = self.year_start(candidate_year)?;
                let candidate_month = self.ordinal_for_code(
                    candidate_year,
                    year_start,
                    start.month_code,
                    Overflow::Constrain,
                )?;
                if surpasses(candidate_year, candidate_month, start.day) {
                    break;
                }
                years = candidate;
                (year, month) = (candidate_year, candidate_month);
                candidate += i32::from(sign);
            }
        }

        let mut months = 0;
        if largest_unit == Unit::Month {
            let mut jump = self.months_between((year, month), (end.year, end.month))?;
            if jump != 0 {
                jump -= i64::from(sign);
            }
            (year, month) = self.add_months(year, month, jump)?;
            months = jump;
        }
        loop {
            let (next_year, next_month) = self.add_months(year, month, sign.into())?;
            if surpasses(next_year, next_month, start.day) {
                break;
            }
            months += i64::from(sign);
            (year, month) = (next_year, next_month);
        }

        let month_start = self.month_start(self.year_start(year)?, month);
        let day = start.day.min(self.calendar_date(month_start).days_in_month());
        let days = two.to_rata_die() - (month_start + i64::from(day) - 1);

        Ok(DateDuration::new_unchecked(
            i64::from(years),
            months,
            0,
            days,
        ))
    }

    /// `CalendarEra`
    pub fn era(&self, iso_date: &IsoDate) -> Option<TinyAsciiStr<16>> {
        if self.is_iso() {
            return None;
        }
        self.calendar_date_from_iso(iso_date)
            .year()
            .era()
            .map(|era_year| era_year.era)
            .filter(|era| *era != tinystr!(16, "default"))
    }

    /// `CalendarEraYear`
    pub fn era_year(&self, iso_date: &IsoDate) -> Option<i32> {
        if self.is_iso() {
            return None;
        }
        self.calendar_date_from_iso(iso_date)
            .year()
            .era()
            .map(|era_year| era_year.year)
    }

    /// `CalendarYear`
    pub fn year(&self, iso_date: &IsoDate) -> i32 {
        if self.is_iso() {
            return iso_date.year;
        }
        self.calendar_date_from_iso(iso_date).extended_year()
    }

    /// `CalendarMonth`
    pub fn month(&self, iso_date: &IsoDate) -> u8 {
        if self.is_iso() {
            return iso_date.month;
        }
        self.calendar_date_from_iso(iso_date).month().ordinal
    }

    /// `CalendarMonthCode`
    pub fn month_code(&self, iso_date: &IsoDate) -> MonthCode {
        self.fields(iso_date).month_code
    }

    /// `CalendarDay`
    pub fn day(&self, iso_date: &IsoDate) -> u8 {
        if self.is_iso() {
            return iso_date.day;
        }
        self.calendar_date_from_iso(iso_date).day_of_month().0
    }

    /// `CalendarDayOfWeek`
    pub fn day_of_week(&self, iso_date: &IsoDate) -> u16 {
        iso_date.day_of_week()
    }

    /// `CalendarDayOfYear`
    pub fn day_of_year(&self, iso_date: &IsoDate) -> u16 {
        if self.is_iso() {
            return iso_date.day_of_year();
        }
        self.calendar_date_from_iso(iso_date).day_of_year().0
    }

    /// `CalendarWeekOfYear`
    pub fn week_of_year(&self, iso_date: &IsoDate) -> Option<u8> {
        self.has_iso_weeks()
            .then(|| utils::iso_week_of_year(iso_date.year, iso_date.month, iso_date.day).1)
    }

    /// `CalendarYearOfWeek`
    pub fn year_of_week(&self, iso_date: &IsoDate) -> Option<i32> {
        self.has_iso_weeks()
            .then(|| utils::iso_week_of_year(iso_date.year, iso_date.month, iso_date.day).0)
    }

    /// `CalendarDaysInWeek`
    pub fn days_in_week(&self, _iso_date: &IsoDate) -> u16 {
        7
    }

    /// `CalendarDaysInMonth`
    pub fn days_in_month(&self, iso_date: &IsoDate) -> u16 {
        if self.is_iso() {
            return iso_date.days_in_month().into();
        }
        self.calendar_date_from_iso(iso_date).days_in_month().into()
    }

    /// `CalendarDaysInYear`
    pub fn days_in_year(&self, iso_date: &IsoDate) -> u16 {
        if self.is_iso() {
            return iso_date.days_in_year();
        }
        self.calendar_date_from_iso(iso_date).days_in_year()
    }

    /// `CalendarMonthsInYear`
    pub fn months_in_year(&self, iso_date: &IsoDate) -> u16 {
        if self.is_iso() {
            return 12;
        }
        self.calendar_date_from_iso(iso_date).months_in_year().into()
    }

    /// `CalendarInLeapYear`
    pub fn in_leap_year(&self, iso_date: &IsoDate) -> bool {
        if self.is_iso() {
            return iso_date.in_leap_year();
        }
        self.calendar_date_from_iso(iso_date).is_in_leap_year()
    }
}

// ==== Internal field resolution and navigation ====

impl Calendar {
    fn has_iso_weeks(&self) -> bool {
        matches!(self.kind, CalendarKind::Iso | CalendarKind::Gregorian)
    }

    fn calendar_date(&self, rata_die: i64) -> CalendarDate {
        Date::from_rata_die(RataDie::new(rata_die), Ref(self.inner))
    }

    fn calendar_date_from_iso(&self, iso_date: &IsoDate) -> CalendarDate {
        self.calendar_date(iso_date.to_rata_die())
    }

    /// Returns the calendar fields of an ISO date.
    pub(crate) fn fields(&self, iso_date: &IsoDate) -> CalendarFields {
        if self.is_iso() {
            return CalendarFields {
                year: iso_date.year,
                month: iso_date.month,
                month_code: MonthCode(month_code_for_number(iso_date.month)),
                day: iso_date.day,
            };
        }
        let date = self.calendar_date_from_iso(iso_date);
        let month = date.month();
        CalendarFields {
            year: date.extended_year(),
            month: month.ordinal,
            month_code: MonthCode(month.standard_code.0),
            day: date.day_of_month().0,
        }
    }

    /// Returns the Rata Die of the first day of an arithmetic year.
    fn year_start(&self, year: i32) -> TemporalResult<i64> {
        let reference_year = self.calendar_date(utils::UNIX_EPOCH_RATA_DIE).extended_year();
        let distance = i64::from(year) - i64::from(reference_year);
        if distance.abs() > MAX_YEAR_DISTANCE {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
        }
        let (cycle_days, cycle_years) = self.kind.mean_year();
        let mut rata_die = utils::UNIX_EPOCH_RATA_DIE + distance * cycle_days / cycle_years;

        for _ in 0..32 {
            check_rata_die(rata_die, YEAR_SEARCH_SLACK)?;
            let date = self.calendar_date(rata_die);
            let start = rata_die - i64::from(date.day_of_year().0) + 1;
            rata_die = match i64::from(year) - i64::from(date.extended_year()) {
                0 => return Ok(start),
                1 => start + i64::from(date.days_in_year()),
                -1 => start - 1,
                difference => start + difference * cycle_days / cycle_years,
            };
        }
        Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))
    }

    /// Returns the Rata Die of the first day of an ordinal month.
    fn month_start(&self, year_start: i64, month: u8) -> i64 {
        let mut rata_die = year_start;
        for _ in 1..month {
            rata_die += i64::from(self.calendar_date(rata_die).days_in_month());
        }
        rata_die
    }

    fn months_in_arithmetic_year(&self, year: i32) -> TemporalResult<i64> {
        if let Some(months) = self.kind.fixed_months_in_year() {
            return Ok(months);
        }
        if self.kind == CalendarKind::Hebrew {
            return Ok(if is_hebrew_leap_year(year) { 13 } else { 12 });
        }
        let start = self.year_start(year)?;
        Ok(self.calendar_date(start).months_in_year().into())
    }

    /// Finds the ordinal month of a month code in an arithmetic year.
    fn find_month_code(&self, year: i32, year_start: i64, month_code: MonthCode) -> Option<u8> {
        let number = month_code.to_month_integer();
        match self.kind {
            CalendarKind::Chinese | CalendarKind::Dangi => {
                let months = self.calendar_date(year_start).months_in_year();
                let mut rata_die = year_start;
                for ordinal in 1..=months {
                    let date = self.calendar_date(rata_die);
                    if date.month().standard_code.0 == month_code.0 {
                        return Some(ordinal);
                    }
                    rata_die += i64::from(date.days_in_month());
                }
                None
            }
            CalendarKind::Hebrew => match (is_hebrew_leap_year(year), month_code.is_leap_month()) {
                (true, true) => Some(6),
                (false, true) => None,
                (true, false) if number > 5 => Some(number + 1),
                _ => Some(number),
            },
            kind => {
                let months = kind.fixed_months_in_year().unwrap_or(12);
                (!month_code.is_leap_month() && i64::from(number) <= months).then_some(number)
            }
        }
    }

    /// Resolves a month code to an ordinal month, constraining missing leap months.
    fn ordinal_for_code(
        &self,
        year: i32,
        year_start: i64,
        month_code: MonthCode,
        overflow: Overflow,
    ) -> TemporalResult<u8> {
        month_code.validate(self.kind)?;
        if let Some(ordinal) = self.find_month_code(year, year_start, month_code) {
            return Ok(ordinal);
        }
        if overflow == Overflow::Reject || !month_code.is_leap_month() {
            return Err(TemporalError::range().with_enum(ErrorMessage::MonthCodeOutOfRange));
        }
        // Adar I falls back to Adar, other leap months to the month they follow.
        let fallback = if self.kind == CalendarKind::Hebrew {
            MonthCode(tinystr!(4, "M06"))
        } else {
            month_code.base()
        };
        self.find_month_code(year, year_start, fallback)
            .ok_or(TemporalError::range().with_enum(ErrorMessage::MonthCodeOutOfRange))
    }

    /// Moves an ordinal year and month by a signed number of months.
    fn add_months(&self, year: i32, month: u8, months: i64) -> TemporalResult<(i32, u8)> {
        if months == 0 {
            return Ok((year, month));
        }
        if months.abs() > MAX_YEAR_DISTANCE * 14 {
            return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
        }
        let to_year = |year: i64| {
            i32::try_from(year)
                .map_err(|_| TemporalError::range().with_enum(ErrorMessage::DateOutOfRange))
        };

        if let Some(months_per_year) = self.kind.fixed_months_in_year() {
            let index = i64::from(month) - 1 + months;
            let year = to_year(i64::from(year) + index.div_euclid(months_per_year))?;
            return Ok((year, (index.rem_euclid(months_per_year) + 1) as u8));
        }

        let mut year = i64::from(year);
        let mut ordinal = i64::from(month) + months;
        if self.kind == CalendarKind::Hebrew {
            // Every run of 19 Hebrew years holds exactly 235 months.
            let cycles = (ordinal - 1).div_euclid(235);
            year += cycles * 19;
            ordinal -= cycles * 235;
        }
        loop {
            let months_in_year = self.months_in_arithmetic_year(to_year(year)?)?;
            if ordinal > months_in_year {
                ordinal -= months_in_year;
                year += 1;
            } else if ordinal < 1 {
                year -= 1;
                ordinal += self.months_in_arithmetic_year(to_year(year)?)?;
            } else {
                return Ok((to_year(year)?, ordinal as u8));
            }
        }
    }

    /// Counts the ordinal months from one year and month to another.
    fn months_between(&self, from: (i32, u8), to: (i32, u8)) -> TemporalResult<i64> {
        let month_difference = i64::from(to.1) - i64::from(from.1);
        if let Some(months_per_year) = self.kind.fixed_months_in_year() {
            return Ok((i64::from(to.0) - i64::from(from.0)) * months_per_year + month_difference);
        }
        let (low, high, sign) = match from.0.cmp(&to.0) {
            Ordering::Equal => return Ok(month_difference),
            Ordering::Less => (from.0, to.0, 1),
            Ordering::Greater => (to.0, from.0, -1),
        };
        let mut total = 0;
        for year in low..high {
            total += self.months_in_arithmetic_year(year)?;
        }
        Ok(sign * total + month_difference)
    }

    /// Returns the ISO date of an arithmetic year, ordinal month and day.
    fn iso_from_ordinal(
        &self,
        year: i32,
        month: u8,
        day: u8,
        overflow: Overflow,
    ) -> TemporalResult<IsoDate> {
        if self.is_iso() {
            return IsoDate::new_with_overflow(year, month, day, overflow);
        }
        let start = self.year_start(year)?;
        let month = resolve_field(month, self.calendar_date(start).months_in_year(), overflow)?;
        let month_start = self.month_start(start, month);
        let day = resolve_field(day, self.calendar_date(month_start).days_in_month(), overflow)?;
        let result = IsoDate::from_rata_die(month_start + i64::from(day) - 1);
        result.check_within_limits()?;
        Ok(result)
    }

    /// Resolves the arithmetic year from `year` or from `era` and `era_year`.
    fn resolve_year(&self, partial: &PartialDate) -> TemporalResult<Option<i32>> {
        match (partial.era, partial.era_year) {
            (Some(era), Some(era_year)) => {
                let Some(era_info) = era::era_info(self.kind, era.as_str()) else {
                    return Err(TemporalError::range().with_message("Invalid era provided."));
                };
                if !era_info.range.contains(&era_year) {
                    return Err(
                        TemporalError::range().with_message("Year is not valid for the era.")
                    );
                }
                let arithmetic_year = era_info.arithmetic_year_for(era_year);
                if partial.year.is_some_and(|year| year != arithmetic_year) {
                    return Err(TemporalError::range().with_enum(ErrorMessage::EraYearMismatch));
                }
                Ok(Some(arithmetic_year))
            }
            (None, None) => Ok(partial.year),
            _ => Err(TemporalError::invalid_field().with_enum(ErrorMessage::EraRequiresEraYear)),
        }
    }

    /// Resolves the ordinal month of a year from `month` and `month_code`.
    fn resolve_month(
        &self,
        partial: &PartialDate,
        year: i32,
        year_start: Option<i64>,
        overflow: Overflow,
    ) -> TemporalResult<u8> {
        match (partial.month, partial.month_code) {
            (None, None) => {
                Err(TemporalError::invalid_field().with_enum(ErrorMessage::RequiredFieldMissing))
            }
            (Some(month), None) => {
                let months = match year_start {
                    Some(start) => self.calendar_date(start).months_in_year(),
                    None => 12,
                };
                resolve_field(month, months, overflow)
            }
            (month, Some(month_code)) => {
                let ordinal = match year_start {
                    Some(start) => self.ordinal_for_code(year, start, month_code, overflow)?,
                    None => {
                        month_code.validate(self.kind)?;
                        month_code.to_month_integer()
                    }
                };
                if month.is_some_and(|month| month != ordinal) {
                    return Err(TemporalError::range().with_enum(ErrorMessage::MonthMismatch));
                }
                Ok(ordinal)
            }
        }
    }

    pub(crate) fn resolve_partial(
        &self,
        partial: &PartialDate,
        overflow: Overflow,
        resolution: ResolutionType,
    ) -> TemporalResult<IsoDate> {
        let year = self.resolve_year(partial)?;
        let day = match resolution {
            ResolutionType::YearMonth => Some(1),
            _ => partial.day,
        };
        let Some(day) = day else {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::RequiredFieldMissing));
        };
        if resolution == ResolutionType::MonthDay {
            return self.resolve_month_day(partial, year, day, overflow);
        }
        let Some(year) = year else {
            return Err(TemporalError::invalid_field().with_enum(ErrorMessage::RequiredFieldMissing));
        };

        if self.is_iso() {
            let month = self.resolve_month(partial, year, None, overflow)?;
            // Year-month limits are checked on the month, not on its first day.
            if resolution == ResolutionType::YearMonth {
                return IsoDate::regulate(year, month, day, overflow);
            }
            return IsoDate::new_with_overflow(year, month, day, overflow);
        }
        let start = self.year_start(year)?;
        let month = self.resolve_month(partial, year, Some(start), overflow)?;
        self.iso_from_ordinal(year, month, day, overflow)
    }

    fn resolve_month_day(
        &self,
        partial: &PartialDate,
        year: Option<i32>,
        day: u8,
        overflow: Overflow,
    ) -> TemporalResult<IsoDate> {
        if self.is_iso() {
            let month = self.resolve_month(partial, 1972, None, overflow)?;
            // A provided year only constrains the day.
            let checked = IsoDate::regulate(year.unwrap_or(1972), month, day, overflow)?;
            return IsoDate::regulate(1972, checked.month, checked.day, overflow);
        }

        let (month_code, day) = match year {
            Some(year) => {
                let start = self.year_start(year)?;
                let month = self.resolve_month(partial, year, Some(start), overflow)?;
                let date = self.iso_from_ordinal(year, month, day, overflow)?;
                let fields = self.fields(&date);
                (fields.month_code, fields.day)
            }
            None => {
                let Some(month_code) = partial.month_code else {
                    return Err(TemporalError::invalid_field()
                        .with_message("monthCode is required without a year."));
                };
                month_code.validate(self.kind)?;
                (month_code, day)
            }
        };

        if let Some(reference) = self.find_reference_date(month_code, day)? {
            return Ok(reference);
        }
        if overflow == Overflow::Reject {
            return Err(TemporalError::range().with_message("month day does not exist in calendar."));
        }

        // Constrain to the closest month and day that exist in the latest reference year.
        let reference_year = self.fields(&reference_limit()).year;
        for year in (reference_year - MONTH_DAY_SEARCH_YEARS..=reference_year).rev() {
            let start = self.year_start(year)?;
            let month = self.ordinal_for_code(year, start, month_code, Overflow::Constrain)?;
            let month_start = self.month_start(start, month);
            let day = day.min(self.calendar_date(month_start).days_in_month());
            let date = IsoDate::from_rata_die(month_start + i64::from(day) - 1);
            if date <= reference_limit() {
                return Ok(date);
            }
        }
        Err(TemporalError::range().with_message("month day does not exist in calendar."))
    }

    /// Returns the latest ISO date on or before 1972-12-31 carrying the month code and day.
    fn find_reference_date(&self, month_code: MonthCode, day: u8) -> TemporalResult<Option<IsoDate>> {
        let limit = reference_limit();
        let reference_year = self.fields(&limit).year;
        for year in (reference_year - MONTH_DAY_SEARCH_YEARS..=reference_year).rev() {
            let start = self.year_start(year)?;
            let Some(month) = self.find_month_code(year, start, month_code) else {
                continue;
            };
            let month_start = self.month_start(start, month);
            if day > self.calendar_date(month_start).days_in_month() {
                continue;
            }
            let date = IsoDate::from_rata_die(month_start + i64::from(day) - 1);
            if date <= limit {
                return Ok(Some(date));
            }
        }
        Ok(None)
    }
}

impl From<PlainDate> for Calendar {
    fn from(value: PlainDate) -> Self {
        *value.calendar()
    }
}

impl From<PlainDateTime> for Calendar {
    fn from(value: PlainDateTime) -> Self {
        *value.calendar()
    }
}

impl From<ZonedDateTime> for Calendar {
    fn from(value: ZonedDateTime) -> Self {
        *value.calendar()
    }
}

impl From<PlainMonthDay> for Calendar {
    fn from(value: PlainMonthDay) -> Self {
        *value.calendar()
    }
}

impl From<PlainYearMonth> for Calendar {
    fn from(value: PlainYearMonth) -> Self {
        *value.calendar()
    }
}

// ==== Calendar utility functions ====

#[inline]
const fn reference_limit() -> IsoDate {
    IsoDate::new_unchecked(1972, 12, 31)
}

#[inline]
fn is_hebrew_leap_year(year: i32) -> bool {
    (7 * i64::from(year) + 1).rem_euclid(19) < 7
}

fn month_code_for_number(month: u8) -> TinyAsciiStr<4> {
    MonthCode::from_month_number(month)
        .map(|code| code.0)
        .unwrap_or(tinystr!(4, "M01"))
}

fn resolve_field(value: u8, max: u8, overflow: Overflow) -> TemporalResult<u8> {
    match overflow {
        Overflow::Constrain => Ok(value.clamp(1, max)),
        Overflow::Reject if (1..=max).contains(&value) => Ok(value),
        Overflow::Reject => Err(TemporalError::range().with_message("field value out of range.")),
    }
}

fn check_rata_die(rata_die: i64, slack: i64) -> TemporalResult<()> {
    let epoch_days = rata_die - utils::UNIX_EPOCH_RATA_DIE;
    if epoch_days.abs() > 100_000_001 + slack {
        return Err(TemporalError::range().with_enum(ErrorMessage::DateOutOfRange));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
