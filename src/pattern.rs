use crate::{
    series::SeriesWithStep,
    utils::{self, parse_number, parse_string_value},
    CronError, Result,
};
use std::fmt::Display;

/// Minimum valid year.
pub const MIN_YEAR: FieldValue = 1970;
/// Maximum valid year.
pub const MAX_YEAR: FieldValue = 2099;

/// Numeric value of a single cron field.
pub type FieldValue = u16;

/// Kind (position) of the cron expression field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldKind {
    /// Seconds, 0-59.
    Second,
    /// Minutes, 0-59.
    Minute,
    /// Hours, 0-23.
    Hour,
    /// Day of month, 1-31.
    DayOfMonth,
    /// Month, 1-12 or JAN-DEC.
    Month,
    /// Day of week, 0-6 (Sunday is 0, 7 is Sunday as well) or SUN-SAT.
    DayOfWeek,
    /// Year, 1970-2099.
    Year,
}

impl FieldKind {
    /// All fields in the order of the 7-fields expression.
    pub const ALL: [FieldKind; 7] = [
        Self::Second,
        Self::Minute,
        Self::Hour,
        Self::DayOfMonth,
        Self::Month,
        Self::DayOfWeek,
        Self::Year,
    ];

    const DAYS_OF_WEEK: [&'static str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];
    const MONTHS: [&'static str; 12] = [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ];

    /// Inclusive bounds of the field values.
    pub fn min_max(&self) -> (FieldValue, FieldValue) {
        match self {
            Self::Second => (0, 59),
            Self::Minute => (0, 59),
            Self::Hour => (0, 23),
            Self::DayOfMonth => (1, 31),
            Self::Month => (1, 12),
            Self::DayOfWeek => (0, 6),
            Self::Year => (MIN_YEAR, MAX_YEAR),
        }
    }

    /// Snake-case field name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day_of_month",
            Self::Month => "month",
            Self::DayOfWeek => "day_of_week",
            Self::Year => "year",
        }
    }

    /// Upper bound of the range end: Sunday may close a day of week range as `7`.
    fn range_max(&self) -> FieldValue {
        match self {
            Self::DayOfWeek => 7,
            _ => self.min_max().1,
        }
    }

    #[inline]
    fn is_day(&self) -> bool {
        matches!(self, Self::DayOfMonth | Self::DayOfWeek)
    }

    /// Resolves numeric or mnemonic value without bounds validation.
    fn unalias(&self, input: &str) -> Option<FieldValue> {
        match self {
            Self::Month => parse_number(input).or_else(|| parse_string_value(input, &Self::MONTHS).map(|v| v + 1)),
            Self::DayOfWeek => parse_number(input)
                .map(|v| if v == 7 { 0 } else { v })
                .or_else(|| parse_string_value(input, &Self::DAYS_OF_WEEK)),
            _ => parse_number(input),
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsed content of a single field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldPattern {
    /// `*` - each possible value.
    All,
    /// `?` - the field doesn't constrain the match.
    Omit,
    /// Deduplicated and sorted list of items.
    List(Vec<PatternItem>),
}

/// Single comma-separated item of the field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PatternItem {
    /// Particular value.
    Value(FieldValue),
    /// `from-to`, inclusive.
    Range(FieldValue, FieldValue),
    /// `from-to/step`, inclusive; step `0` repeats the `from` value only.
    Step(FieldValue, FieldValue, FieldValue),
    /// `L`: last day of the month (day of month) or Saturday (day of week).
    LastDay,
    /// `LW`: last business day of the month.
    LastWeekday,
    /// `nW`: business day nearest to the day of month.
    NearestWeekday(FieldValue),
    /// `nL`: last particular day of week in the month.
    LastDayOfWeek(FieldValue),
    /// `dow#n`: n-th (1-5) particular day of week in the month.
    NthDayOfWeek(FieldValue, FieldValue),
}

/// Field being parsed, for error reporting.
#[derive(Clone, Copy)]
struct FieldContext<'a> {
    kind: FieldKind,
    expr: &'a str,
}

impl FieldContext<'_> {
    fn invalid_number(&self, token: &str) -> CronError {
        CronError::InvalidNumber {
            expr: self.expr.to_owned(),
            field: self.kind,
            token: token.to_owned(),
        }
    }

    fn out_of_range(&self, token: &str, min: FieldValue, max: FieldValue) -> CronError {
        CronError::ValueOutOfRange {
            expr: self.expr.to_owned(),
            field: self.kind,
            token: token.to_owned(),
            min,
            max,
        }
    }

    fn invalid_range(&self, token: &str) -> CronError {
        CronError::InvalidRange {
            expr: self.expr.to_owned(),
            field: self.kind,
            token: token.to_owned(),
        }
    }

    fn invalid_step(&self, token: &str) -> CronError {
        CronError::InvalidStep {
            expr: self.expr.to_owned(),
            field: self.kind,
            token: token.to_owned(),
        }
    }

    fn invalid_nth(&self, token: &str) -> CronError {
        CronError::InvalidNth {
            expr: self.expr.to_owned(),
            field: self.kind,
            token: token.to_owned(),
        }
    }

    fn unsupported(&self, token: &str) -> CronError {
        CronError::UnsupportedModifier {
            expr: self.expr.to_owned(),
            field: self.kind,
            token: token.to_owned(),
        }
    }

    /// Numeric or mnemonic value, without bounds check.
    fn number(&self, token: &str) -> Result<FieldValue> {
        self.kind.unalias(token).ok_or_else(|| self.invalid_number(token))
    }

    /// Numeric or mnemonic value within the field bounds.
    fn value(&self, token: &str) -> Result<FieldValue> {
        let value = self.number(token)?;
        let (min, max) = self.kind.min_max();
        if value < min || value > max {
            Err(self.out_of_range(token, min, max))
        } else {
            Ok(value)
        }
    }

    /// End of the range: Sunday closes a day of week range as `7`.
    fn range_end(&self, token: &str) -> Result<FieldValue> {
        let value = self.number(token)?;
        Ok(if self.kind == FieldKind::DayOfWeek && value == 0 {
            7
        } else {
            value
        })
    }
}

impl FieldPattern {
    /// Parses single field of the expression `expr`.
    pub(crate) fn parse(kind: FieldKind, expr: &str, input: &str) -> Result<Self> {
        let ctx = FieldContext { kind, expr };
        let input = input.trim().to_ascii_lowercase();

        if input == "*" {
            return Ok(Self::All);
        }

        if input == "?" {
            return if kind.is_day() {
                Ok(Self::Omit)
            } else {
                Err(ctx.unsupported(&input))
            };
        }

        let mut items = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| PatternItem::parse(ctx, part))
            .collect::<Result<Vec<_>>>()?;

        if items.is_empty() {
            return Err(CronError::EmptyField {
                expr: expr.to_owned(),
                field: kind,
            });
        }

        items.sort();
        items.dedup();

        Ok(Self::List(items))
    }

    /// Returns `true` for `*`.
    #[inline]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns `true` for `?`.
    #[inline]
    pub fn is_omit(&self) -> bool {
        matches!(self, Self::Omit)
    }

    /// Replaces step items with the explicit values they produce.
    pub(crate) fn flatten_steps(&mut self, kind: FieldKind) {
        if let Self::List(items) = self {
            if !items.iter().any(|item| matches!(item, PatternItem::Step(..))) {
                return;
            }

            let mut flattened = Vec::with_capacity(items.len());
            for item in items.drain(..) {
                match item {
                    PatternItem::Step(from, to, step) => flattened.extend(
                        SeriesWithStep::new(from, to, step).map(|v| PatternItem::Value(normalize(kind, v))),
                    ),
                    other => flattened.push(other),
                }
            }

            flattened.sort();
            flattened.dedup();
            *items = flattened;
        }
    }

    /// Expands the field into ascending list of candidate values.
    ///
    /// Day of week expands into all days of month: its constraint is applied by the match check.
    /// Calendar-dependent day patterns expand into the whole range as well.
    pub(crate) fn expand(&self, kind: FieldKind, start_year: FieldValue) -> Vec<FieldValue> {
        let (min, max) = kind.min_max();
        let all = || {
            let min = if kind == FieldKind::Year { start_year.max(min) } else { min };
            SeriesWithStep::new(min, max, 1).collect::<Vec<_>>()
        };

        let mut values = match self {
            Self::Omit if kind == FieldKind::Second => vec![0],
            Self::Omit => vec![],
            _ if kind == FieldKind::DayOfWeek => {
                let (min, max) = FieldKind::DayOfMonth.min_max();
                SeriesWithStep::new(min, max, 1).collect()
            }
            Self::All => all(),
            Self::List(items) if items.iter().any(PatternItem::is_calendar_dependent) => all(),
            Self::List(items) => items
                .iter()
                .flat_map(|item| -> Box<dyn Iterator<Item = FieldValue>> {
                    match *item {
                        PatternItem::Value(v) => Box::new(std::iter::once(v)),
                        PatternItem::Range(from, to) => Box::new(SeriesWithStep::new(from, to.min(max), 1)),
                        PatternItem::Step(from, to, step) => Box::new(SeriesWithStep::new(from, to.min(max), step)),
                        _ => Box::new(std::iter::empty()),
                    }
                })
                .collect(),
        };

        values.sort_unstable();
        values.dedup();
        values
    }

    /// Checks plain membership of the value: `*`, values, ranges and steps.
    ///
    /// Omitted seconds match any second, other omitted fields match nothing.
    pub(crate) fn contains(&self, kind: FieldKind, value: FieldValue) -> bool {
        match self {
            Self::All => true,
            Self::Omit => kind == FieldKind::Second,
            Self::List(items) => items.iter().any(|item| {
                item.contains(value) || (kind == FieldKind::DayOfWeek && value == 0 && item.contains(7))
            }),
        }
    }

    /// Returns items of the list, empty for `*` and `?`.
    pub fn items(&self) -> &[PatternItem] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }
}

/// Sunday written as `7` becomes `0`.
#[inline]
fn normalize(kind: FieldKind, value: FieldValue) -> FieldValue {
    if kind == FieldKind::DayOfWeek {
        value % 7
    } else {
        value
    }
}

impl PatternItem {
    fn parse(ctx: FieldContext<'_>, part: &str) -> Result<Self> {
        let kind = ctx.kind;

        if part.contains('/') {
            Self::parse_step(ctx, part)
        } else if part.contains('-') {
            Self::parse_range(ctx, part)
        } else if part.contains('#') {
            if kind != FieldKind::DayOfWeek {
                return Err(ctx.unsupported(part));
            }
            let (dow, instance) = part.split_once('#').ok_or_else(|| ctx.invalid_nth(part))?;
            if instance.contains('#') {
                return Err(ctx.invalid_nth(part));
            }
            let dow = ctx.value(dow)?;
            let instance = parse_number(instance).ok_or_else(|| ctx.invalid_number(instance))?;
            if !(1..=5).contains(&instance) {
                return Err(ctx.out_of_range(part, 1, 5));
            }
            Ok(Self::NthDayOfWeek(dow, instance))
        } else if part == "l" {
            if kind.is_day() {
                Ok(Self::LastDay)
            } else {
                Err(ctx.unsupported(part))
            }
        } else if part == "lw" {
            if kind == FieldKind::DayOfMonth {
                Ok(Self::LastWeekday)
            } else {
                Err(ctx.unsupported(part))
            }
        } else if kind == FieldKind::DayOfMonth && part.contains('w') {
            let day = part.strip_suffix('w').ok_or_else(|| ctx.invalid_number(part))?;
            Ok(Self::NearestWeekday(ctx.value(day)?))
        } else if kind == FieldKind::DayOfWeek && part.ends_with('l') {
            let dow = part.strip_suffix('l').ok_or_else(|| ctx.invalid_number(part))?;
            Ok(Self::LastDayOfWeek(ctx.value(dow)?))
        } else {
            Ok(Self::Value(ctx.value(part)?))
        }
    }

    fn parse_range(ctx: FieldContext<'_>, part: &str) -> Result<Self> {
        let (from, to) = part.split_once('-').ok_or_else(|| ctx.invalid_range(part))?;
        if to.contains('-') {
            return Err(ctx.invalid_range(part));
        }

        let from = ctx.number(from)?;
        let to = ctx.range_end(to)?;
        if from >= to {
            return Err(ctx.invalid_range(part));
        }

        let (min, _) = ctx.kind.min_max();
        let max = ctx.kind.range_max();
        if from < min || to > max {
            return Err(ctx.out_of_range(part, min, max));
        }

        Ok(Self::Range(from, to))
    }

    fn parse_step(ctx: FieldContext<'_>, part: &str) -> Result<Self> {
        let (base, step) = part.split_once('/').ok_or_else(|| ctx.invalid_step(part))?;
        if step.contains('/') {
            return Err(ctx.invalid_step(part));
        }

        let (min, max) = ctx.kind.min_max();
        let (from, to) = match base.split_once('-') {
            Some((_, to)) if to.contains('-') => return Err(ctx.invalid_step(part)),
            Some((from, to)) => {
                let from = if from == "*" { min } else { ctx.number(from)? };
                let to = ctx.range_end(to)?;
                if from >= to {
                    return Err(ctx.invalid_range(part));
                }
                (from, to)
            }
            None if base == "*" => (min, max),
            None => (ctx.number(base)?, max),
        };

        let step = parse_number(step).ok_or_else(|| ctx.invalid_number(step))?;

        if from < min || from > max {
            return Err(ctx.out_of_range(part, min, max));
        }
        if to > ctx.kind.range_max() {
            return Err(ctx.out_of_range(part, min, ctx.kind.range_max()));
        }
        if step > max {
            return Err(ctx.out_of_range(part, 0, max));
        }

        Ok(Self::Step(from, to, step))
    }

    /// Items which can't be expanded without knowing the particular month.
    #[inline]
    fn is_calendar_dependent(&self) -> bool {
        matches!(
            self,
            Self::LastDay
                | Self::LastWeekday
                | Self::NearestWeekday(_)
                | Self::LastDayOfWeek(_)
                | Self::NthDayOfWeek(..)
        )
    }

    /// Plain membership check; calendar-dependent items never match here.
    fn contains(&self, value: FieldValue) -> bool {
        match *self {
            Self::Value(v) => v == value,
            Self::Range(from, to) => (from..=to).contains(&value),
            Self::Step(from, _, 0) => value == from,
            Self::Step(from, to, step) => (from..=to).contains(&value) && (value - from) % step == 0,
            _ => false,
        }
    }
}

/// Day of week and day of month checks which need the calendar.
impl PatternItem {
    /// Checks the day of month against `L`, `LW` and `nW` items.
    pub(crate) fn matches_day_of_month(&self, year: FieldValue, month: FieldValue, day: FieldValue) -> bool {
        match *self {
            Self::LastWeekday => day == utils::last_weekday(year, month),
            Self::LastDay => day == utils::days_in_month(year, month),
            Self::NearestWeekday(target) => day == utils::nearest_weekday(year, month, target),
            _ => false,
        }
    }

    /// Checks the date against `L`, `nL` and `dow#n` items of the day of week field.
    pub(crate) fn matches_day_of_week(&self, year: FieldValue, month: FieldValue, day: FieldValue) -> bool {
        match *self {
            Self::LastDay => utils::day_of_week(year, month, day) == 6,
            Self::LastDayOfWeek(dow) => day == utils::last_dow(year, month, dow),
            Self::NthDayOfWeek(dow, n) => utils::nth_dow(year, month, dow, n) == Some(day),
            _ => false,
        }
    }
}

impl Display for FieldPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "*"),
            Self::Omit => write!(f, "?"),
            Self::List(items) => {
                let values = items.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(",");
                write!(f, "{values}")
            }
        }
    }
}

impl Display for PatternItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Range(from, to) => write!(f, "{from}-{to}"),
            Self::Step(from, to, step) => write!(f, "{from}-{to}/{step}"),
            Self::LastDay => write!(f, "L"),
            Self::LastWeekday => write!(f, "LW"),
            Self::NearestWeekday(day) => write!(f, "{day}W"),
            Self::LastDayOfWeek(dow) => write!(f, "{dow}L"),
            Self::NthDayOfWeek(dow, n) => write!(f, "{dow}#{n}"),
        }
    }
}
