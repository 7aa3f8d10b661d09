//! Single civil time check against an expression, without fields expansion.
use crate::{
    expression::Expression,
    pattern::{FieldKind, FieldPattern, FieldValue, MAX_YEAR, MIN_YEAR},
    utils,
};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Returns `true` if `time` matches all time fields and either of the day fields.
pub(crate) fn is_match(expression: &Expression, time: &NaiveDateTime) -> bool {
    // Calendar helpers work within the year field domain only, any other year never matches.
    let year = match FieldValue::try_from(time.year()) {
        Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => year,
        _ => return false,
    };
    let month = time.month() as FieldValue;
    let day = time.day() as FieldValue;

    let simple = [
        (FieldKind::Second, time.second() as FieldValue),
        (FieldKind::Minute, time.minute() as FieldValue),
        (FieldKind::Hour, time.hour() as FieldValue),
        (FieldKind::Month, month),
        (FieldKind::Year, year),
    ];

    simple
        .into_iter()
        .all(|(kind, value)| expression.field(kind).contains(kind, value))
        && (day_of_month_matches(&expression.day_of_month, year, month, day)
            || day_of_week_matches(&expression.day_of_week, year, month, day))
}

fn day_of_month_matches(pattern: &FieldPattern, year: FieldValue, month: FieldValue, day: FieldValue) -> bool {
    pattern.contains(FieldKind::DayOfMonth, day)
        || pattern
            .items()
            .iter()
            .any(|item| item.matches_day_of_month(year, month, day))
}

fn day_of_week_matches(pattern: &FieldPattern, year: FieldValue, month: FieldValue, day: FieldValue) -> bool {
    pattern.contains(FieldKind::DayOfWeek, utils::day_of_week(year, month, day))
        || pattern
            .items()
            .iter()
            .any(|item| item.matches_day_of_week(year, month, day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExpressionSet;
    use rstest::rstest;

    fn check(pattern: &str, time: &str) -> bool {
        let time = NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S").unwrap();
        ExpressionSet::new(pattern)
            .unwrap()
            .simplified()
            .expressions()
            .iter()
            .any(|expression| is_match(expression, &time))
    }

    #[rstest]
    #[case("0 0 L *", "2020-02-29 00:00:00", true)]
    #[case("0 0 L *", "2021-02-28 00:00:00", true)]
    #[case("0 0 L *", "2020-02-28 00:00:00", false)]
    #[case("0 0 L *", "2020-04-30 00:00:00", true)]
    #[case("0 0 LW *", "2020-05-29 00:00:00", true)]
    #[case("0 0 LW *", "2020-05-31 00:00:00", false)]
    #[case("0 0 LW *", "2020-10-30 00:00:00", true)]
    #[case("0 0 LW *", "2024-12-31 00:00:00", true)]
    #[case("0 0 15W *", "2020-08-14 00:00:00", true)]
    #[case("0 0 15W *", "2020-08-15 00:00:00", false)]
    #[case("0 0 15W *", "2020-09-15 00:00:00", true)]
    #[case("0 0 1W *", "2020-02-03 00:00:00", true)]
    #[case("0 0 1W *", "2020-03-02 00:00:00", true)]
    #[case("0 0 31W *", "2020-05-29 00:00:00", true)]
    #[case("0 0 31W *", "2020-04-30 00:00:00", true)]
    #[case("0 0 30W *", "2020-02-28 00:00:00", true)]
    #[case("0 0 L,15 *", "2020-01-15 00:00:00", true)]
    #[case("0 0 L,15 *", "2020-01-31 00:00:00", true)]
    #[case("0 0 3-5 *", "2020-01-04 00:00:00", true)]
    fn test_day_of_month(#[case] pattern: &str, #[case] time: &str, #[case] expected: bool) {
        assert_eq!(check(pattern, time), expected, "pattern = {pattern}, time = {time}");
    }

    #[rstest]
    #[case("0 0 ? * L", "2020-01-04 00:00:00", true)]
    #[case("0 0 ? * L", "2020-01-05 00:00:00", false)]
    #[case("0 0 ? * 5L", "2023-12-29 00:00:00", true)]
    #[case("0 0 ? * 5L", "2023-12-22 00:00:00", false)]
    #[case("0 0 ? * 0L,6L", "2020-01-25 00:00:00", true)]
    #[case("0 0 ? * 0L,6L", "2020-01-26 00:00:00", true)]
    #[case("0 0 ? * 1#1", "2020-01-06 00:00:00", true)]
    #[case("0 0 ? * 1#1", "2020-01-13 00:00:00", false)]
    #[case("0 0 ? * 6#5", "2020-02-29 00:00:00", true)]
    #[case("0 0 ? * 1#5", "2021-02-22 00:00:00", false)]
    #[case("0 0 ? * mon-fri", "2020-01-03 00:00:00", true)]
    #[case("0 0 ? * mon-fri", "2020-01-04 00:00:00", false)]
    #[case("0 0 ? * sat-sun", "2020-01-05 00:00:00", true)]
    #[case("0 0 ? * 7", "2020-01-05 00:00:00", true)]
    #[case("0 0 ? * 1-7/2", "2020-01-05 00:00:00", true)]
    fn test_day_of_week(#[case] pattern: &str, #[case] time: &str, #[case] expected: bool) {
        assert_eq!(check(pattern, time), expected, "pattern = {pattern}, time = {time}");
    }

    #[rstest]
    #[case("0 0 ? * ?", "2020-01-05 00:00:00", false)]
    #[case("0 12 ? * 1 2020", "2020-01-06 12:00:00", true)]
    #[case("0 12 ? * 1 2021", "2020-01-06 12:00:00", false)]
    #[case("0 12 ? jan-mar 1", "2020-04-06 12:00:00", false)]
    #[case("0 12 ? * 1", "2020-01-06 12:00:30", true)]
    #[case("0 12 ? * 1", "2020-01-06 13:00:00", false)]
    fn test_time_fields(#[case] pattern: &str, #[case] time: &str, #[case] expected: bool) {
        assert_eq!(check(pattern, time), expected, "pattern = {pattern}, time = {time}");
    }

    #[rstest]
    #[case("0 0 ? * 1", "0000-01-03 00:00:00")]
    #[case("0 0 l *", "0001-01-31 00:00:00")]
    #[case("0 0 * *", "1969-12-31 00:00:00")]
    #[case("0 0 ? * 1#1", "2100-01-04 00:00:00")]
    #[case("0 0 * *", "9999-01-01 00:00:00")]
    fn test_years_out_of_domain(#[case] pattern: &str, #[case] time: &str) {
        assert!(!check(pattern, time), "pattern = {pattern}, time = {time}");
    }

    #[test]
    fn test_seconds_field() {
        let time = NaiveDateTime::parse_from_str("2020-01-06 12:00:05", "%Y-%m-%d %H:%M:%S").unwrap();
        let options = crate::ParseOptions::default().with_seconds(true);

        let set = ExpressionSet::parse("5 0 12 ? * 1", options).unwrap().simplified();
        assert!(is_match(&set.expressions()[0], &time));

        let set = ExpressionSet::parse("*/10 0 12 ? * 1", options).unwrap().simplified();
        assert!(!is_match(&set.expressions()[0], &time));
    }
}
