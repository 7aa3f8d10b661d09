/// Common calendar and token helpers.
use crate::pattern::FieldValue;
use std::cmp::Ordering;

const SUNDAY: FieldValue = 0;
const SATURDAY: FieldValue = 6;

/// Converts string of decimal digits into unsigned number, without bounds validation.
pub(crate) fn parse_number(input: &str) -> Option<FieldValue> {
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        None
    } else {
        input.parse::<FieldValue>().ok()
    }
}

/// Converts string with mnemonic value representation into its index in `values`.
pub(crate) fn parse_string_value(input: &str, values: &[&str]) -> Option<FieldValue> {
    if input.is_empty() {
        None
    } else {
        values
            .iter()
            .position(|&x| x.eq_ignore_ascii_case(input))
            .map(|i| i as FieldValue)
    }
}

/// Returns `true` if provided year is leap.
#[inline]
pub(crate) fn is_leap_year(year: FieldValue) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Returns number of days in specified month.
pub(crate) fn days_in_month(year: FieldValue, month: FieldValue) -> FieldValue {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => panic!("Invalid month: {month}"),
    }
}

/// Calculates day of week (Sunday is 0) for specified date.
pub(crate) fn day_of_week(year: FieldValue, month: FieldValue, day: FieldValue) -> FieldValue {
    if day == 0 || month == 0 || month > 12 || day > days_in_month(year, month) {
        panic!("Invalid date: {year:04}-{month:02}-{day:02}");
    }

    let month_offset: FieldValue = if is_leap_year(year) {
        [0, 3, 4, 0, 2, 5, 0, 3, 6, 1, 4, 6]
    } else {
        [0, 3, 3, 6, 1, 4, 6, 2, 5, 0, 3, 5]
    }[(month - 1) as usize];

    let year = year - 1;

    (day + month_offset + 5 * (year % 4) + 4 * (year % 100) + 6 * (year % 400)) % 7
}

/// Returns `true` if the day is Monday to Friday.
#[inline]
pub(crate) fn is_business_day(year: FieldValue, month: FieldValue, day: FieldValue) -> bool {
    !matches!(day_of_week(year, month, day), SUNDAY | SATURDAY)
}

/// Returns day in the month for the last specified day of the week.
pub(crate) fn last_dow(year: FieldValue, month: FieldValue, dow: FieldValue) -> FieldValue {
    if month == 0 || month > 12 || dow > 6 {
        panic!("Invalid month or day of week: {month:02}/{dow}");
    }

    let mut last_day = days_in_month(year, month);
    while day_of_week(year, month, last_day) != dow {
        last_day -= 1;
    }

    last_day
}

/// Returns the last business day (Monday to Friday) of the month.
pub(crate) fn last_weekday(year: FieldValue, month: FieldValue) -> FieldValue {
    let mut last_day = days_in_month(year, month);
    while !is_business_day(year, month, last_day) {
        last_day -= 1;
    }

    last_day
}

/// Returns date (day in the month) of the N-th day of the week,
/// or `None` if the month has less than `n` such days.
pub(crate) fn nth_dow(year: FieldValue, month: FieldValue, dow: FieldValue, n: FieldValue) -> Option<FieldValue> {
    if month == 0 || month > 12 || dow > 6 || n == 0 || n > 5 {
        panic!("Invalid month, day of week or nth occurrence: {month:02}/{dow}/{n}");
    }

    let first_dow = day_of_week(year, month, 1);
    let mut day = 1 + (n - 1) * 7;

    match first_dow.cmp(&dow) {
        Ordering::Greater => day += 7 - (first_dow - dow),
        Ordering::Less => day += dow - first_dow,
        Ordering::Equal => {}
    }

    (day <= days_in_month(year, month)).then_some(day)
}

/// Returns date of the business day nearest to the specified date in the same month.
///
/// Days beyond the end of the month are clamped to its last day.
pub(crate) fn nearest_weekday(year: FieldValue, month: FieldValue, day: FieldValue) -> FieldValue {
    let days_in_month = days_in_month(year, month);
    if day == 0 {
        panic!("Invalid date: {year:04}-{month:02}-{day:02}");
    }
    let day = day.min(days_in_month);

    match day_of_week(year, month, day) {
        SUNDAY if day == days_in_month => day - 2,
        SUNDAY => day + 1,
        SATURDAY if day == 1 => day + 2,
        SATURDAY => day - 1,
        _ => day,
    }
}
