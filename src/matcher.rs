use crate::{expression::resolve_local, CronError, ExpressionSet, ParseOptions, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::{fmt::Debug, sync::Arc};

/// Default number of matches returned by [`get_future_matches`].
pub const DEFAULT_MATCH_COUNT: usize = 5;
/// Default bound of candidate times examined by [`get_future_matches`].
pub const DEFAULT_MAX_LOOP_COUNT: usize = 100_000;

/// External predicate which accepts or rejects formatted match.
#[derive(Clone)]
pub struct MatchValidator(Arc<dyn Fn(&str) -> bool + Send + Sync>);

impl MatchValidator {
    /// Wraps validation function.
    pub fn new(validator: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(validator))
    }

    #[inline]
    fn accepts(&self, time: &str) -> bool {
        (self.0)(time)
    }
}

impl Debug for MatchValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MatchValidator")
    }
}

/// Options of the [`get_future_matches`].
///
/// Instants are ISO-8601 strings. Instants with an offset (or `Z`) are converted to the `timezone`,
/// instants without an offset are civil times in the `timezone`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct MatchOptions {
    /// Expression text starts with seconds field; ignored for parsed expressions.
    pub has_seconds: bool,
    /// IANA name of the timezone to evaluate expression in, UTC by default.
    pub timezone: Option<String>,
    /// Inclusive lower bound of matches, now by default.
    pub start_at: Option<String>,
    /// Exclusive upper bound of matches.
    pub end_at: Option<String>,
    /// Maximum number of matches to return.
    pub match_count: usize,
    /// Format matches with the offset of the `timezone` instead of UTC.
    pub format_in_timezone: bool,
    /// Maximum number of candidate times to examine.
    pub max_loop_count: usize,
    /// Accepts or rejects every formatted match.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub match_validator: Option<MatchValidator>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            has_seconds: false,
            timezone: None,
            start_at: None,
            end_at: None,
            match_count: DEFAULT_MATCH_COUNT,
            format_in_timezone: false,
            max_loop_count: DEFAULT_MAX_LOOP_COUNT,
            match_validator: None,
        }
    }
}

impl MatchOptions {
    /// Sets whether expression text has seconds field.
    pub fn with_seconds(mut self, has_seconds: bool) -> Self {
        self.has_seconds = has_seconds;
        self
    }

    /// Sets timezone name.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// Sets start instant (inclusive).
    pub fn with_start_at(mut self, start_at: impl Into<String>) -> Self {
        self.start_at = Some(start_at.into());
        self
    }

    /// Sets end instant (exclusive).
    pub fn with_end_at(mut self, end_at: impl Into<String>) -> Self {
        self.end_at = Some(end_at.into());
        self
    }

    /// Sets maximum number of matches.
    pub fn with_match_count(mut self, match_count: usize) -> Self {
        self.match_count = match_count;
        self
    }

    /// Sets whether matches are formatted in the timezone.
    pub fn with_format_in_timezone(mut self, format_in_timezone: bool) -> Self {
        self.format_in_timezone = format_in_timezone;
        self
    }

    /// Sets maximum number of examined candidates.
    pub fn with_max_loop_count(mut self, max_loop_count: usize) -> Self {
        self.max_loop_count = max_loop_count;
        self
    }

    /// Sets match validator.
    pub fn with_match_validator(mut self, validator: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.match_validator = Some(MatchValidator::new(validator));
        self
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions::default().with_seconds(self.has_seconds)
    }
}

/// Cron pattern text or already parsed expressions.
#[derive(Debug, Clone, Copy)]
pub enum CronInput<'a> {
    /// Pattern to parse.
    Text(&'a str),
    /// Parsed expressions.
    Parsed(&'a ExpressionSet),
}

impl<'a> From<&'a str> for CronInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for CronInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a ExpressionSet> for CronInput<'a> {
    fn from(value: &'a ExpressionSet) -> Self {
        Self::Parsed(value)
    }
}

impl CronInput<'_> {
    /// Simplified copy of the expressions; the caller's set stays untouched.
    fn simplified(self, options: ParseOptions) -> Result<ExpressionSet> {
        match self {
            Self::Text(pattern) => Ok(ExpressionSet::parse(pattern, options)?.simplified()),
            Self::Parsed(set) => Ok(set.simplified()),
        }
    }
}

fn resolve_timezone(timezone: Option<&str>) -> Result<Tz> {
    match timezone {
        None => Ok(Tz::UTC),
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| CronError::InvalidTimezone(name.to_owned())),
    }
}

/// Parses ISO-8601 instant in the timezone.
fn parse_instant(input: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let input = input.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(input) {
        return Ok(time.with_timezone(tz));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .ok_or_else(|| CronError::InvalidTimestamp(input.to_owned()))
}

fn format_match(time: &DateTime<Tz>, format_in_timezone: bool) -> String {
    if format_in_timezone {
        time.to_rfc3339_opts(SecondsFormat::Secs, true)
    } else {
        time.with_timezone(&Utc).format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Returns formatted times of the upcoming matches, in ascending order.
///
/// Enumeration stops when `match_count` matches are found, `end_at` is reached,
/// `max_loop_count` candidates are examined, or years are exhausted (after 2099), whichever comes first.
/// Civil times which don't exist in the timezone (DST gap) are skipped.
///
/// Returns [`CronError`] if pattern text is invalid, or timezone or instants can't be parsed.
#[tracing::instrument(skip_all)]
pub fn get_future_matches<'a>(expression: impl Into<CronInput<'a>>, options: &MatchOptions) -> Result<Vec<String>> {
    let tz = resolve_timezone(options.timezone.as_deref())?;
    let start = match &options.start_at {
        Some(start_at) => parse_instant(start_at, &tz)?,
        None => Utc::now().with_timezone(&tz),
    };
    let start = start.with_nanosecond(0).unwrap_or(start);
    let end = options
        .end_at
        .as_deref()
        .map(|end_at| parse_instant(end_at, &tz))
        .transpose()?;

    let set = expression.into().simplified(options.parse_options())?;
    let mut series = set.time_series(start.naive_local());
    let mut matches = Vec::with_capacity(options.match_count.min(DEFAULT_MAX_LOOP_COUNT));

    let mut loop_count = 0;
    while matches.len() < options.match_count && loop_count < options.max_loop_count {
        loop_count += 1;

        let Some(candidate) = series.next() else {
            break;
        };
        let Some(time) = resolve_local(&tz, &candidate, &start) else {
            continue;
        };
        if end.as_ref().is_some_and(|end| time >= *end) {
            break;
        }
        if time < start || !set.is_match_simplified(&candidate) {
            continue;
        }

        let formatted = format_match(&time, options.format_in_timezone);
        match &options.match_validator {
            Some(validator) if !validator.accepts(&formatted) => {
                tracing::trace!(time = %formatted, "match rejected by validator");
            }
            _ => matches.push(formatted),
        }
    }

    if loop_count >= options.max_loop_count && matches.len() < options.match_count {
        tracing::debug!(
            loop_count,
            found = matches.len(),
            requested = options.match_count,
            "candidates limit reached"
        );
    }

    Ok(matches)
}

/// Returns `true` if the `instant` matches the expression in the `timezone` (UTC by default).
///
/// Pattern text is parsed without seconds field, so any second of the matching minute matches.
///
/// Returns [`CronError`] if pattern text is invalid, or timezone or instant can't be parsed.
#[tracing::instrument(skip(expression))]
pub fn is_time_matches<'a>(
    expression: impl Into<CronInput<'a>>,
    instant: &str,
    timezone: Option<&str>,
) -> Result<bool> {
    let tz = resolve_timezone(timezone)?;
    let time = parse_instant(instant, &tz)?;
    let set = expression.into().simplified(ParseOptions::default())?;

    Ok(set.is_match_simplified(&time.naive_local()))
}
