use crate::{
    evaluator,
    pattern::{FieldKind, FieldPattern, FieldValue},
    series::{CalendarValues, TimeSeries},
    CronError, Result,
};
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike};
use std::{fmt::Display, str::FromStr};

/// Options of the cron expression parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ParseOptions {
    /// Expression starts with the seconds field.
    pub has_seconds: bool,
}

impl ParseOptions {
    /// Sets whether expression has seconds field.
    pub fn with_seconds(mut self, has_seconds: bool) -> Self {
        self.has_seconds = has_seconds;
        self
    }
}

/// Well-known schedules, always without seconds.
fn predefined(alias: &str) -> Option<&'static str> {
    let expanded = match alias.to_ascii_lowercase().as_str() {
        "@yearly" | "@annually" => "0 0 1 1 ?",
        "@monthly" => "0 0 1 * ?",
        "@weekly" => "0 0 ? * 0",
        "@daily" | "@midnight" => "0 0 * * ?",
        "@hourly" => "0 * * * ?",
        _ => return None,
    };
    Some(expanded)
}

/// Single cron expression: all 7 fields are always present.
///
/// Fields absent in the source text get defaults: seconds are omitted (matches any second)
/// unless requested, day of week is omitted, year is `*`.
///
/// Created by [`ExpressionSet`] parsing only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Expression {
    second: FieldPattern,
    minute: FieldPattern,
    hour: FieldPattern,
    pub(crate) day_of_month: FieldPattern,
    month: FieldPattern,
    pub(crate) day_of_week: FieldPattern,
    year: FieldPattern,
}

impl Expression {
    fn parse(expr: &str, has_seconds: bool) -> Result<Self> {
        let mut fields: Vec<&str> = expr.split_whitespace().collect();
        let (min, max) = if has_seconds { (5, 7) } else { (4, 6) };

        if fields.len() < min || fields.len() > max {
            return Err(CronError::InvalidFieldCount {
                expr: expr.to_owned(),
                min,
                max,
                found: fields.len(),
            });
        }

        if !has_seconds {
            fields.insert(0, "0");
        }
        if fields.len() == 5 {
            fields.push("?");
        }
        if fields.len() == 6 {
            fields.push("*");
        }

        let parse = |kind: FieldKind, index: usize| FieldPattern::parse(kind, expr, fields[index]);

        Ok(Self {
            second: if has_seconds {
                parse(FieldKind::Second, 0)?
            } else {
                FieldPattern::Omit
            },
            minute: parse(FieldKind::Minute, 1)?,
            hour: parse(FieldKind::Hour, 2)?,
            day_of_month: parse(FieldKind::DayOfMonth, 3)?,
            month: parse(FieldKind::Month, 4)?,
            day_of_week: parse(FieldKind::DayOfWeek, 5)?,
            year: parse(FieldKind::Year, 6)?,
        })
    }

    /// Returns pattern of the particular field.
    pub fn field(&self, kind: FieldKind) -> &FieldPattern {
        match kind {
            FieldKind::Second => &self.second,
            FieldKind::Minute => &self.minute,
            FieldKind::Hour => &self.hour,
            FieldKind::DayOfMonth => &self.day_of_month,
            FieldKind::Month => &self.month,
            FieldKind::DayOfWeek => &self.day_of_week,
            FieldKind::Year => &self.year,
        }
    }

    fn field_mut(&mut self, kind: FieldKind) -> &mut FieldPattern {
        match kind {
            FieldKind::Second => &mut self.second,
            FieldKind::Minute => &mut self.minute,
            FieldKind::Hour => &mut self.hour,
            FieldKind::DayOfMonth => &mut self.day_of_month,
            FieldKind::Month => &mut self.month,
            FieldKind::DayOfWeek => &mut self.day_of_week,
            FieldKind::Year => &mut self.year,
        }
    }

    /// Normalizes days relationship and replaces steps with explicit values.
    ///
    /// When one of day fields is `*` and the other one constrains days, the `*` one becomes omitted,
    /// so only the constraining field is taken into account.
    /// When both fields constrain days, they are combined with OR at match time.
    fn simplify(&mut self) {
        if !self.day_of_month.is_omit() && !self.day_of_week.is_omit() {
            if !self.day_of_month.is_all() && self.day_of_week.is_all() {
                self.day_of_week = FieldPattern::Omit;
            } else if self.day_of_month.is_all() && !self.day_of_week.is_all() {
                self.day_of_month = FieldPattern::Omit;
            }
        }

        for kind in FieldKind::ALL {
            self.field_mut(kind).flatten_steps(kind);
        }
    }

    /// Checks civil time against the expression.
    ///
    /// Days relationship is the same as in [`ExpressionSet::is_match`].
    pub fn is_match(&self, time: &NaiveDateTime) -> bool {
        let mut simplified = self.clone();
        simplified.simplify();
        evaluator::is_match(&simplified, time)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.second, self.minute, self.hour, self.day_of_month, self.month, self.day_of_week, self.year
        )
    }
}

/// Parsed cron pattern: one or more `|`-separated alternative expressions.
///
/// Time matches the set if it matches any of its expressions.
/// The set is immutable after parsing; evaluation works with a simplified copy.
///
/// For the pattern format and usage examples, please refer to the [crate documentation](crate).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SerializedSet", into = "SerializedSet"))]
pub struct ExpressionSet {
    pattern: String,
    options: ParseOptions,
    expressions: Vec<Expression>,
}

/// Serialized form of [`ExpressionSet`]: source text and options, parsed again on deserialization.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedSet {
    pattern: String,
    #[serde(default)]
    has_seconds: bool,
}

#[cfg(feature = "serde")]
impl From<ExpressionSet> for SerializedSet {
    fn from(value: ExpressionSet) -> Self {
        Self {
            pattern: value.pattern,
            has_seconds: value.options.has_seconds,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<SerializedSet> for ExpressionSet {
    type Error = CronError;

    fn try_from(value: SerializedSet) -> Result<Self> {
        Self::parse(value.pattern, ParseOptions::default().with_seconds(value.has_seconds))
    }
}

impl ExpressionSet {
    /// Parses provided `pattern` without seconds field.
    ///
    /// Alternative way to construct [`ExpressionSet`] is to use one of `try_from` or `from_str` methods.
    ///
    /// Returns [`CronError`] in a case provided pattern is unparsable or has format errors.
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        Self::parse(pattern, ParseOptions::default())
    }

    /// Parses and validates provided `pattern` with `options`.
    ///
    /// Predefined aliases (`@daily` etc.) never have seconds, regardless of options.
    pub fn parse(pattern: impl Into<String>, options: ParseOptions) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(CronError::BlankExpression);
        }

        let mut alternatives: Vec<&str> = Vec::new();
        for alternative in pattern.split('|').map(str::trim) {
            if alternative.is_empty() {
                return Err(CronError::BlankExpression);
            }
            if !alternatives.contains(&alternative) {
                alternatives.push(alternative);
            }
        }

        let expressions = alternatives
            .iter()
            .map(|alternative| match predefined(alternative) {
                Some(expanded) => Expression::parse(expanded, false),
                None => Expression::parse(alternative, options.has_seconds),
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(pattern = %pattern, expressions = expressions.len(), "cron pattern parsed");

        Ok(Self {
            pattern,
            options,
            expressions,
        })
    }

    /// Source text of the pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Options the pattern was parsed with.
    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Alternative expressions, in the source order.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Returns a copy with normalized days relationship and without step patterns.
    pub fn simplified(&self) -> Self {
        let mut simplified = self.clone();
        simplified.expressions.iter_mut().for_each(Expression::simplify);
        simplified
    }

    /// Candidate values of the time series: union over all expressions, from year to second.
    ///
    /// Days are the union of day of month and day of week candidates.
    pub(crate) fn calendar_values(&self, start_year: FieldValue) -> CalendarValues {
        const LEVELS: [FieldKind; 6] = [
            FieldKind::Year,
            FieldKind::Month,
            FieldKind::DayOfMonth,
            FieldKind::Hour,
            FieldKind::Minute,
            FieldKind::Second,
        ];

        let mut values = CalendarValues::default();
        for expression in &self.expressions {
            for (level, kind) in LEVELS.into_iter().enumerate() {
                values[level].extend(expression.field(kind).expand(kind, start_year));
            }
            values[2].extend(expression.day_of_week.expand(FieldKind::DayOfWeek, start_year));
        }

        for level in values.iter_mut() {
            level.sort_unstable();
            level.dedup();
        }

        values
    }

    /// Ascending series of candidate civil times starting from `start` (inclusively).
    ///
    /// Must be called on a [simplified](Self::simplified) set.
    pub(crate) fn time_series(&self, start: NaiveDateTime) -> TimeSeries {
        let start_year = start.year().clamp(0, FieldValue::MAX as i32) as FieldValue;
        TimeSeries::new(self.calendar_values(start_year), start)
    }

    /// Checks civil time against the set, must be called on a [simplified](Self::simplified) set.
    #[inline]
    pub(crate) fn is_match_simplified(&self, time: &NaiveDateTime) -> bool {
        self.expressions.iter().any(|expression| evaluator::is_match(expression, time))
    }

    /// Returns `true` if the civil time of provided `time` (in its own timezone) matches the pattern.
    ///
    /// Fractions of a second are ignored.
    pub fn is_match<Tz: TimeZone>(&self, time: &DateTime<Tz>) -> bool {
        self.simplified().is_match_simplified(&time.naive_local())
    }

    /// Returns time of the upcoming event, starting from the provided `current` value (inclusively).
    ///
    /// Events are calculated in the timezone of `current`.
    /// Returns `None` if there is no upcoming event till the end of year 2099.
    pub fn upcoming<Tz: TimeZone>(&self, current: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.iter(current).next()
    }

    /// Returns iterator of events starting from `current` (inclusively), in the timezone of `current`.
    ///
    /// Civil times skipped by DST transition are skipped, repeated ones resolve to the earliest instant
    /// which isn't before `current`.
    pub fn iter<Tz: TimeZone>(&self, current: &DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> {
        let simplified = self.simplified();
        let tz = current.timezone();
        let current = current.with_nanosecond(0).unwrap_or_else(|| current.clone());
        let floor = current.clone();

        simplified
            .time_series(current.naive_local())
            .filter(move |candidate| simplified.is_match_simplified(candidate))
            .filter_map(move |candidate| resolve_local(&tz, &candidate, &floor))
            .filter(move |time| *time >= current)
    }
}

/// Instant of the civil time in `tz`.
///
/// Repeated civil time resolves to the earliest instant unless it precedes `not_before`.
/// Returns `None` for civil time skipped by DST transition.
pub(crate) fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    civil: &NaiveDateTime,
    not_before: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let local = tz.from_local_datetime(civil);
    local
        .clone()
        .earliest()
        .filter(|time| time >= not_before)
        .or_else(|| local.latest())
}

impl Display for ExpressionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl From<ExpressionSet> for String {
    fn from(value: ExpressionSet) -> Self {
        value.pattern
    }
}

impl From<&ExpressionSet> for String {
    fn from(value: &ExpressionSet) -> Self {
        value.pattern.clone()
    }
}

impl TryFrom<String> for ExpressionSet {
    type Error = CronError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&String> for ExpressionSet {
    type Error = CronError;

    fn try_from(value: &String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ExpressionSet {
    type Error = CronError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl FromStr for ExpressionSet {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternItem::*;
    use chrono::{NaiveDate, Utc};
    use chrono_tz::Tz;
    use rstest::rstest;

    fn canonical(pattern: &str, options: ParseOptions) -> Vec<String> {
        ExpressionSet::parse(pattern, options)
            .unwrap()
            .expressions()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[rstest]
    #[case("* * * *", "? * * * * ? *")]
    #[case("0 12 * *", "? 0 12 * * ? *")]
    #[case("0 12 * * mon", "? 0 12 * * 1 *")]
    #[case("0 12 * * mon 2030", "? 0 12 * * 1 2030")]
    #[case("  1-3   *  ?  jan-mar   mon-fri  ", "? 1-3 * ? 1-3 1-5 *")]
    #[case("@yearly", "? 0 0 1 1 ? *")]
    #[case("@annually", "? 0 0 1 1 ? *")]
    #[case("@MONTHLY", "? 0 0 1 * ? *")]
    #[case("@weekly", "? 0 0 ? * 0 *")]
    #[case("@daily", "? 0 0 * * ? *")]
    #[case("@midnight", "? 0 0 * * ? *")]
    #[case("@hourly", "? 0 * * * ? *")]
    fn test_parse_without_seconds(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(canonical(pattern, ParseOptions::default()), vec![expected]);
    }

    #[rstest]
    #[case("* * * * *", "* * * * * ? *")]
    #[case("30 0 12 * *", "30 0 12 * * ? *")]
    #[case("*/20 0 12 * * 5L", "0-59/20 0 12 * * 5L *")]
    #[case("0 0 12 LW * ? 2025-2030", "0 0 12 LW * ? 2025-2030")]
    #[case("@hourly", "? 0 * * * ? *")]
    fn test_parse_with_seconds(#[case] pattern: &str, #[case] expected: &str) {
        assert_eq!(canonical(pattern, ParseOptions::default().with_seconds(true)), vec![expected]);
    }

    #[test]
    fn test_parse_alternatives() {
        assert_eq!(
            canonical("0 12 * * | 30 6 * * sat,sun | 0 12 * *", ParseOptions::default()),
            vec!["? 0 12 * * ? *", "? 30 6 * * 0,6 *"]
        );
        assert_eq!(
            canonical("@daily|0 0 12 L *", ParseOptions::default().with_seconds(true)),
            vec!["? 0 0 * * ? *", "0 0 12 L * ? *"]
        );
    }

    #[rstest]
    #[case("", ParseOptions::default(), CronError::BlankExpression)]
    #[case("   ", ParseOptions::default(), CronError::BlankExpression)]
    #[case("* * * * | ", ParseOptions::default(), CronError::BlankExpression)]
    #[case("* * *", ParseOptions::default(), CronError::InvalidFieldCount { expr: "* * *".into(), min: 4, max: 6, found: 3 })]
    #[case("* * * * * * *", ParseOptions::default(), CronError::InvalidFieldCount { expr: "* * * * * * *".into(), min: 4, max: 6, found: 7 })]
    #[case("* * * *", ParseOptions { has_seconds: true }, CronError::InvalidFieldCount { expr: "* * * *".into(), min: 5, max: 7, found: 4 })]
    #[case("0 0 0 * * ? * *", ParseOptions { has_seconds: true }, CronError::InvalidFieldCount { expr: "0 0 0 * * ? * *".into(), min: 5, max: 7, found: 8 })]
    #[case("@every", ParseOptions::default(), CronError::InvalidFieldCount { expr: "@every".into(), min: 4, max: 6, found: 1 })]
    #[case("60 * ? * *", ParseOptions::default(), CronError::ValueOutOfRange { expr: "60 * ? * *".into(), field: FieldKind::Minute, token: "60".into(), min: 0, max: 59 })]
    #[case("0 0 * * * | 0 24 * *", ParseOptions::default(), CronError::ValueOutOfRange { expr: "0 24 * *".into(), field: FieldKind::Hour, token: "24".into(), min: 0, max: 23 })]
    #[case("0 0 1#1 *", ParseOptions::default(), CronError::UnsupportedModifier { expr: "0 0 1#1 *".into(), field: FieldKind::DayOfMonth, token: "1#1".into() })]
    #[case("0 0 ? * 1W", ParseOptions::default(), CronError::InvalidNumber { expr: "0 0 ? * 1W".into(), field: FieldKind::DayOfWeek, token: "1w".into() })]
    fn test_parse_errors(#[case] pattern: &str, #[case] options: ParseOptions, #[case] expected: CronError) {
        assert_eq!(ExpressionSet::parse(pattern, options).unwrap_err(), expected);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let pattern = "0/5 1,2 ? * mon#2,fril | 0 0 15W,L jan-jun/2 *";
        assert_eq!(ExpressionSet::new(pattern).unwrap(), ExpressionSet::new(pattern).unwrap());
    }

    #[rstest]
    #[case("0 0 1 *", "? 0 0 1 * ? *")]
    #[case("0 0 1 * *", "? 0 0 1 * ? *")]
    #[case("0 0 * * mon", "? 0 0 ? * 1 *")]
    #[case("0 0 * * *", "? 0 0 * * * *")]
    #[case("0 0 * * ?", "? 0 0 * * ? *")]
    #[case("0 0 1 * mon", "? 0 0 1 * 1 *")]
    #[case("*/15 */6 1/10 */4 1-7/2", "? 0,15,30,45 0,6,12,18 1,11,21,31 1,5,9 0,1,3,5 *")]
    #[case("0 0 ? * 1#1", "? 0 0 ? * 1#1 *")]
    fn test_simplified(#[case] pattern: &str, #[case] expected: &str) {
        let set = ExpressionSet::new(pattern).unwrap();
        let simplified = set.simplified();

        assert_eq!(simplified.expressions()[0].to_string(), expected);
        // Original set stays untouched.
        assert_eq!(set, ExpressionSet::new(pattern).unwrap());
    }

    #[test]
    fn test_calendar_values_union() {
        let set = ExpressionSet::new("0 6 1,15 jan | 30 18 ? dec sat 2030-2031").unwrap().simplified();
        let values = set.calendar_values(2025);

        assert_eq!(values[0], (2025..=2099).collect::<Vec<_>>());
        assert_eq!(values[1], vec![1, 12]);
        assert_eq!(values[2], (1..=31).collect::<Vec<_>>());
        assert_eq!(values[3], vec![6, 18]);
        assert_eq!(values[4], vec![0, 30]);
        assert_eq!(values[5], vec![0]);

        let set = ExpressionSet::new("5 4 3,20 2 ? 2024").unwrap().simplified();
        let expected: CalendarValues = [vec![2024], vec![2], vec![3, 20], vec![4], vec![5], vec![0]];
        assert_eq!(set.calendar_values(2020), expected);
    }

    #[test]
    fn test_expression_fields() {
        let set = ExpressionSet::new("0 12 L * ?").unwrap();
        let expression = &set.expressions()[0];

        assert_eq!(expression.field(FieldKind::DayOfMonth), &FieldPattern::List(vec![LastDay]));
        assert_eq!(expression.field(FieldKind::Hour), &FieldPattern::List(vec![Value(12)]));
        assert!(expression.field(FieldKind::Second).is_omit());
        assert!(expression.field(FieldKind::Year).is_all());
    }

    #[rstest]
    #[case("0 12 * *", "2024-01-15 12:00:00", true)]
    #[case("0 12 * *", "2024-01-15 12:00:59", true)]
    #[case("0 12 * *", "2024-01-15 12:01:00", false)]
    #[case("0 12 15 * mon", "2024-01-15 12:00:00", true)]
    #[case("0 12 16 * mon", "2024-01-15 12:00:00", true)]
    #[case("0 12 16 * tue", "2024-01-15 12:00:00", false)]
    #[case("0 12 16 * *", "2024-01-15 12:00:00", false)]
    #[case("0 12 * * tue", "2024-01-15 12:00:00", false)]
    #[case("0 0 * * tue | 0 12 * * mon", "2024-01-15 12:00:00", true)]
    #[case("0 0 1 * *", "2020-01-01 00:00:00", true)]
    #[case("0 0 1 * *", "2020-01-15 00:00:00", false)]
    #[case("0 0 * * 3", "2020-01-15 00:00:00", true)]
    #[case("0 0 * * 3", "2020-01-16 00:00:00", false)]
    #[case("*/15 0 l * *", "2020-01-30 00:15:00", false)]
    fn test_is_match(#[case] pattern: &str, #[case] time: &str, #[case] expected: bool) {
        let civil = NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S").unwrap();
        let set = ExpressionSet::new(pattern).unwrap();

        assert_eq!(set.is_match(&civil.and_utc()), expected, "pattern = {pattern}");
        assert_eq!(
            set.expressions().iter().any(|expression| expression.is_match(&civil)),
            expected,
            "expressions of pattern = {pattern}"
        );
    }

    #[test]
    fn test_upcoming_and_iter() {
        let set = ExpressionSet::new("0 0 L *").unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_nano_opt(0, 0, 0, 500)
            .unwrap()
            .and_utc();

        assert_eq!(set.upcoming(&start).unwrap().to_rfc3339(), "2020-01-31T00:00:00+00:00");
        assert_eq!(
            set.iter(&start).take(3).map(|t| t.to_rfc3339()).collect::<Vec<_>>(),
            vec![
                "2020-01-31T00:00:00+00:00",
                "2020-02-29T00:00:00+00:00",
                "2020-03-31T00:00:00+00:00"
            ]
        );
    }

    #[test]
    fn test_iter_in_timezone() {
        let tz: Tz = "Europe/Kyiv".parse().unwrap();
        let set = ExpressionSet::new("30 3 * *").unwrap();
        let start = tz.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();

        // 3:30 doesn't exist on 2024-03-31 in Kyiv.
        assert_eq!(
            set.iter(&start).take(2).map(|t| t.to_rfc3339()).collect::<Vec<_>>(),
            vec!["2024-04-01T03:30:00+03:00", "2024-04-02T03:30:00+03:00"]
        );
    }

    #[test]
    fn test_iter_in_repeated_hour() {
        let tz: Tz = "Europe/Kyiv".parse().unwrap();
        let set = ExpressionSet::new("*/20 3 * *").unwrap();

        // 3:00-3:59 happens twice on 2024-10-27 in Kyiv.
        let start = tz.with_ymd_and_hms(2024, 10, 27, 3, 10, 0).earliest().unwrap();
        assert_eq!(
            set.iter(&start).take(3).map(|t| t.to_rfc3339()).collect::<Vec<_>>(),
            vec!["2024-10-27T03:20:00+03:00", "2024-10-27T03:40:00+03:00", "2024-10-28T03:00:00+02:00"]
        );

        let start = tz.with_ymd_and_hms(2024, 10, 27, 3, 10, 0).latest().unwrap();
        assert_eq!(
            set.iter(&start).take(3).map(|t| t.to_rfc3339()).collect::<Vec<_>>(),
            vec!["2024-10-27T03:20:00+02:00", "2024-10-27T03:40:00+02:00", "2024-10-28T03:00:00+02:00"]
        );
    }

    #[test]
    fn test_upcoming_none_after_last_year() {
        let set = ExpressionSet::new("0 0 1 1 ? 2020").unwrap();
        let start = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert!(set.upcoming(&start).is_none());
    }

    #[test]
    fn test_conversions() {
        let pattern = "0 0 l,lw *";
        let set = ExpressionSet::from_str(pattern).unwrap();

        assert_eq!(set.to_string(), pattern);
        assert_eq!(set.pattern(), pattern);
        assert_eq!(String::from(&set), pattern);
        assert_eq!(ExpressionSet::try_from(pattern).unwrap(), set);
        assert_eq!(ExpressionSet::try_from(pattern.to_string()).unwrap(), set);
        assert_eq!(ExpressionSet::try_from(&pattern.to_string()).unwrap(), set);
        assert!(ExpressionSet::try_from("0 0 ll *").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let set = ExpressionSet::new("0/5 1,2 ? * mon#2,fril | 0 0 15W,L jan-jun/2 *").unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(serde_json::from_str::<ExpressionSet>(&json).unwrap(), set);

        let set = ExpressionSet::parse("*/10 0 12 ? * 6L", ParseOptions::default().with_seconds(true)).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"pattern":"*/10 0 12 ? * 6L","hasSeconds":true}"#);
        assert_eq!(serde_json::from_str::<ExpressionSet>(&json).unwrap(), set);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    #[case(r#"{"pattern":"0 0 1 13 *"}"#)]
    #[case(r#"{"pattern":"0 0 ? * 1#6","hasSeconds":false}"#)]
    #[case(r#"{"pattern":"0 0 * *","hasSeconds":true}"#)]
    #[case(r#"{"pattern":""}"#)]
    #[case(r#"{"hasSeconds":true}"#)]
    #[case(r#""0 0 1 * *""#)]
    fn test_serde_rejects_invalid(#[case] json: &str) {
        assert!(serde_json::from_str::<ExpressionSet>(json).is_err(), "json = {json}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_defaults() {
        let set: ExpressionSet = serde_json::from_str(r#"{"pattern":"0 0 l *"}"#).unwrap();
        assert_eq!(set, ExpressionSet::new("0 0 l *").unwrap());
        assert!(!set.options().has_seconds);
    }
}
