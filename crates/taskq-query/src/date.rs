//! Date values and day-granular date ranges.
//!
//! Date filters are day-granular from the user's point of view, so every
//! bound is normalized to the start or the end of a calendar day in the time
//! zone of the reference clock. That makes the comparators behave like
//! calendar comparisons:
//!
//! | Query            | Bound                                   |
//! |------------------|-----------------------------------------|
//! | `due:<v`         | before the start of `v`'s day            |
//! | `due:<=v`        | up to the end of `v`'s day               |
//! | `due:>v`         | after the end of `v`'s day               |
//! | `due:>=v`        | from the start of `v`'s day              |
//! | `due:a..b`       | start of `a`'s day to end of `b`'s day   |
//! | `due:v`          | the whole of `v`'s day                   |
//! | `due:none`       | tasks without a date                     |
//!
//! Accepted values, in the order they are tried:
//! - `none`
//! - `today`, `tomorrow`, `yesterday`
//! - signed offsets `[+-]N[mhdwMy]` (minutes, hours, days, weeks, months,
//!   years), landing on the start of the day they reach
//! - `YYYY-MM-DD`, `YYYY/MM/DD`, `DD-MM-YYYY`, `DD/MM/YYYY`,
//!   `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM:SS`

use std::sync::LazyLock;

use chrono::{
    DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone,
};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::query::Operator;

/// A specialized Result type for date parsing.
pub type DateResult<T> = Result<T, DateError>;

/// Errors from parsing date values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    /// The value matches none of the accepted forms.
    #[error("invalid date '{value}' (expected YYYY-MM-DD, YYYY/MM/DD, DD-MM-YYYY, DD/MM/YYYY, today, tomorrow, yesterday, none, or an offset like -7d)")]
    Invalid {
        /// The rejected value.
        value: String,
    },

    /// A relative offset that leaves the representable date range.
    #[error("date offset '{value}' is out of range")]
    OutOfRange {
        /// The rejected offset.
        value: String,
    },

    /// `none` used with a comparison operator.
    #[error("'none' cannot be used with '{operator}'")]
    NoneWithOperator {
        /// The operator written before `none`.
        operator: Operator,
    },

    /// `none` used as one end of a `..` range.
    #[error("'none' cannot be used as a range bound")]
    NoneInRange,

    /// An operator that has no date meaning.
    #[error("operator '{operator}' is not supported for dates")]
    UnsupportedOperator {
        /// The rejected operator.
        operator: Operator,
    },
}

impl DateError {
    fn invalid(value: impl Into<String>) -> Self {
        DateError::Invalid {
            value: value.into(),
        }
    }

    fn out_of_range(value: impl Into<String>) -> Self {
        DateError::OutOfRange {
            value: value.into(),
        }
    }
}

/// A parsed date value.
#[derive(Debug, Clone)]
pub enum ParsedDate<Tz: TimeZone> {
    /// A point in time. Keywords and offsets are already at local midnight.
    Instant(DateTime<Tz>),
    /// The `none` keyword: "has no date", not an instant.
    NoDate,
}

/// A pair of optional bounds.
///
/// Bounds are inclusive unless flagged: `<v` excludes the start of `v`'s
/// day and `>v` excludes the end of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Lower bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<FixedOffset>>,
    /// Upper bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<FixedOffset>>,
    /// `from` itself is outside the range.
    #[serde(skip_serializing_if = "is_false")]
    pub from_exclusive: bool,
    /// `to` itself is outside the range.
    #[serde(skip_serializing_if = "is_false")]
    pub to_exclusive: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl DateRange {
    /// Returns true if `instant` lies within both bounds.
    pub fn contains<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        let after_from = self.from.as_ref().map_or(true, |from| {
            if self.from_exclusive {
                instant > from
            } else {
                instant >= from
            }
        });
        let before_to = self.to.as_ref().map_or(true, |to| {
            if self.to_exclusive {
                instant < to
            } else {
                instant <= to
            }
        });
        after_from && before_to
    }
}

/// What a date field is filtered by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateCondition {
    /// No date filter.
    #[default]
    Any,
    /// The date must fall within the range.
    Range(DateRange),
    /// The date must be absent.
    Missing,
}

impl DateCondition {
    /// Returns the range, if this condition is one.
    pub fn range(&self) -> Option<&DateRange> {
        match self {
            DateCondition::Range(range) => Some(range),
            DateCondition::Any | DateCondition::Missing => None,
        }
    }

    /// Returns the inclusive lower bound, if any.
    pub fn lower_bound(&self) -> Option<&DateTime<FixedOffset>> {
        self.range().and_then(|r| r.from.as_ref())
    }

    /// Returns the inclusive upper bound, if any.
    pub fn upper_bound(&self) -> Option<&DateTime<FixedOffset>> {
        self.range().and_then(|r| r.to.as_ref())
    }

    /// Returns true for [`DateCondition::Any`].
    pub fn is_any(&self) -> bool {
        matches!(self, DateCondition::Any)
    }

    /// Returns true if a task's date satisfies this condition.
    pub fn matches<Tz: TimeZone>(&self, date: Option<&DateTime<Tz>>) -> bool {
        match (self, date) {
            (DateCondition::Any, _) => true,
            (DateCondition::Missing, date) => date.is_none(),
            (DateCondition::Range(range), Some(date)) => range.contains(date),
            (DateCondition::Range(_), None) => false,
        }
    }
}

/// Absolute date formats, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Absolute date-time formats, tried after [`DATE_FORMATS`].
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Separator of a two-sided range.
const RANGE_SEPARATOR: &str = "..";

static OFFSET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?)(\d+)([mhdwMy])$").expect("offset pattern is valid"));

/// Digit widths of the absolute forms: four-digit years, two-digit months,
/// days, hours, minutes and seconds.
static ABSOLUTE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}[-/]\d{2}[-/]\d{2}|\d{2}[-/]\d{2}[-/]\d{4})([ T]\d{2}:\d{2}(:\d{2})?)?$")
        .expect("absolute date pattern is valid")
});

/// Parses a single date value relative to `now`.
///
/// Keywords are case-insensitive; offset units are not (`m` is minutes, `M`
/// is months).
///
/// # Errors
///
/// Returns [`DateError::Invalid`] if no form matches, or
/// [`DateError::OutOfRange`] if an offset overflows.
pub fn parse_date<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> DateResult<ParsedDate<Tz>> {
    let text = text.trim();
    let today = now.date_naive();
    let tz = now.timezone();

    let keyword_day = match text.to_lowercase().as_str() {
        "none" => return Ok(ParsedDate::NoDate),
        "today" => Some(today),
        "tomorrow" => today.succ_opt(),
        "yesterday" => today.pred_opt(),
        _ => None,
    };
    if let Some(day) = keyword_day {
        return Ok(ParsedDate::Instant(start_of_day(day, &tz)));
    }

    if let Some(caps) = OFFSET_PATTERN.captures(text) {
        let negative = &caps[1] == "-";
        let amount: i64 = caps[2]
            .parse()
            .map_err(|_| DateError::out_of_range(text))?;
        let shifted = apply_offset(now, negative, amount, &caps[3])
            .ok_or_else(|| DateError::out_of_range(text))?;
        return Ok(ParsedDate::Instant(start_of_day(shifted.date_naive(), &tz)));
    }

    if !ABSOLUTE_PATTERN.is_match(text) {
        return Err(DateError::invalid(text));
    }

    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(text, format) {
            return Ok(ParsedDate::Instant(start_of_day(day, &tz)));
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            let instant = resolve_forward(&tz, naive).ok_or_else(|| DateError::invalid(text))?;
            return Ok(ParsedDate::Instant(instant));
        }
    }

    Err(DateError::invalid(text))
}

/// Parses the value of a date clause into a condition.
///
/// `:` and `=` accept a single value (one whole day), a `start..end` range
/// or `none`. The comparators take a single value.
///
/// # Errors
///
/// Returns [`DateError::UnsupportedOperator`] for `!=`, the `none` errors
/// when `none` is combined with a comparator or a range, and any error from
/// [`parse_date`].
pub fn parse_date_range<Tz: TimeZone>(
    text: &str,
    operator: Operator,
    now: &DateTime<Tz>,
) -> DateResult<DateCondition> {
    let tz = now.timezone();
    let day_of = |value: &str| -> DateResult<NaiveDate> {
        match parse_date(value, now)? {
            ParsedDate::Instant(instant) => Ok(instant.date_naive()),
            ParsedDate::NoDate if operator.is_exact() => Err(DateError::NoneInRange),
            ParsedDate::NoDate => Err(DateError::NoneWithOperator { operator }),
        }
    };

    let mut exclusive = false;
    let (from, to) = match operator {
        Operator::Lt => {
            exclusive = true;
            (None, Some(start_of_day(day_of(text)?, &tz)))
        }
        Operator::Le => (None, Some(end_of_day(day_of(text)?, &tz))),
        Operator::Gt => {
            exclusive = true;
            (Some(end_of_day(day_of(text)?, &tz)), None)
        }
        Operator::Ge => (Some(start_of_day(day_of(text)?, &tz)), None),
        Operator::Colon | Operator::Eq => {
            if let Some((start, end)) = text.split_once(RANGE_SEPARATOR) {
                (
                    Some(start_of_day(day_of(start)?, &tz)),
                    Some(end_of_day(day_of(end)?, &tz)),
                )
            } else {
                match parse_date(text, now)? {
                    ParsedDate::NoDate => return Ok(DateCondition::Missing),
                    ParsedDate::Instant(instant) => {
                        let day = instant.date_naive();
                        (Some(start_of_day(day, &tz)), Some(end_of_day(day, &tz)))
                    }
                }
            }
        }
        Operator::Ne => return Err(DateError::UnsupportedOperator { operator }),
    };

    Ok(DateCondition::Range(DateRange {
        from_exclusive: exclusive && from.is_some(),
        to_exclusive: exclusive && to.is_some(),
        from: from.map(|dt| fixed(&dt)),
        to: to.map(|dt| fixed(&dt)),
    }))
}

/// Returns the first instant of `day` in `tz`.
///
/// When midnight is skipped by a DST transition, the first valid local time
/// of that day is used instead.
pub fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = day.and_time(NaiveTime::MIN);
    resolve_forward(tz, midnight).unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Returns the last representable instant (23:59:59.999999999) of `day` in
/// `tz`.
pub fn end_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let last = day.and_time(last_nanosecond());
    match tz.from_local_datetime(&last).latest() {
        Some(instant) => instant,
        // Nothing exists at 23:59:59 local; fall back to just before the
        // next day's start.
        None => match day.succ_opt() {
            Some(next) => start_of_day(next, tz) - Duration::nanoseconds(1),
            None => tz.from_utc_datetime(&last),
        },
    }
}

fn last_nanosecond() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// Maps a local time to an instant, moving forward out of DST gaps in
/// quarter-hour steps. Ambiguous times resolve to the earlier instant.
fn resolve_forward<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=16).find_map(|step| {
        let candidate = naive + Duration::minutes(15 * step);
        tz.from_local_datetime(&candidate).earliest()
    })
}

fn apply_offset<Tz: TimeZone>(
    now: &DateTime<Tz>,
    negative: bool,
    amount: i64,
    unit: &str,
) -> Option<DateTime<Tz>> {
    let months = |n: i64| u32::try_from(n).ok().map(Months::new);
    let now = now.clone();

    let delta = match unit {
        "m" => Duration::try_minutes(amount)?,
        "h" => Duration::try_hours(amount)?,
        "d" => Duration::try_days(amount)?,
        "w" => Duration::try_weeks(amount)?,
        "M" | "y" => {
            let months = months(if unit == "y" {
                amount.checked_mul(12)?
            } else {
                amount
            })?;
            return if negative {
                now.checked_sub_months(months)
            } else {
                now.checked_add_months(months)
            };
        }
        _ => return None,
    };

    if negative {
        now.checked_sub_signed(delta)
    } else {
        now.checked_add_signed(delta)
    }
}

fn fixed<Tz: TimeZone>(instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
    instant.with_timezone(&instant.offset().fix())
}
