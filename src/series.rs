//! Generators of number series and of candidate date-times.
use crate::{pattern::FieldValue, utils::days_in_month};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Ascending series `from, from + step, ...` up to `to` inclusive.
///
/// Zero step produces the `from` value only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SeriesWithStep {
    next: Option<FieldValue>,
    to: FieldValue,
    step: FieldValue,
}

impl SeriesWithStep {
    #[inline]
    pub(crate) fn new(from: FieldValue, to: FieldValue, step: FieldValue) -> Self {
        Self {
            next: (from <= to).then_some(from),
            to,
            step,
        }
    }
}

impl Iterator for SeriesWithStep {
    type Item = FieldValue;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if self.step == 0 {
            None
        } else {
            current.checked_add(self.step).filter(|next| *next <= self.to)
        };
        Some(current)
    }
}

const YEAR: usize = 0;
const MONTH: usize = 1;
const SECOND: usize = 5;
const LEVELS: usize = 6;

/// Expanded candidate values of every calendar level, from year down to second.
pub(crate) type CalendarValues = [Vec<FieldValue>; LEVELS];

/// Ascending, lazily produced series of civil date-times built from the cross product of
/// candidate values, starting at the first candidate not earlier than `start`.
///
/// Impossible dates (like Feb 30) are skipped by moving to the next month.
/// The series ends when candidate years are exhausted.
#[derive(Debug, Clone)]
pub(crate) struct TimeSeries {
    values: CalendarValues,
    cursor: [usize; LEVELS],
    start: NaiveDateTime,
    exhausted: bool,
}

impl TimeSeries {
    pub(crate) fn new(values: CalendarValues, start: NaiveDateTime) -> Self {
        let mut series = Self {
            exhausted: values.iter().any(Vec::is_empty),
            values,
            cursor: [0; LEVELS],
            start,
        };

        if !series.exhausted {
            series.seek_start();
        }

        series
    }

    /// Positions the cursor at the first candidate not earlier than `start`.
    fn seek_start(&mut self) {
        let start = [
            self.start.year().clamp(0, FieldValue::MAX as i32) as FieldValue,
            self.start.month() as FieldValue,
            self.start.day() as FieldValue,
            self.start.hour() as FieldValue,
            self.start.minute() as FieldValue,
            self.start.second() as FieldValue,
        ];

        for level in YEAR..LEVELS {
            let values = &self.values[level];
            let position = values.partition_point(|v| *v < start[level]);

            if position == values.len() {
                // Nothing left within the start prefix: carry to the outer level.
                if level == YEAR {
                    self.exhausted = true;
                } else {
                    self.increment(level - 1);
                }
                return;
            }

            self.cursor[level] = position;
            if values[position] > start[level] {
                self.reset_inner(level);
                return;
            }
        }
    }

    /// Resets all levels deeper than `level` to their first value.
    #[inline]
    fn reset_inner(&mut self, level: usize) {
        self.cursor[level + 1..].fill(0);
    }

    /// Moves to the next value at `level`, carrying overflow to outer levels.
    fn increment(&mut self, level: usize) {
        let mut level = level;
        loop {
            self.reset_inner(level);
            self.cursor[level] += 1;
            if self.cursor[level] < self.values[level].len() {
                return;
            }

            self.cursor[level] = 0;
            if level == YEAR {
                self.exhausted = true;
                return;
            }
            level -= 1;
        }
    }

    #[inline]
    fn current(&self, level: usize) -> FieldValue {
        self.values[level][self.cursor[level]]
    }
}

impl Iterator for TimeSeries {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let [year, month, day, hour, minute, second] = std::array::from_fn(|level| self.current(level));

            if day > days_in_month(year, month) {
                self.increment(MONTH);
                continue;
            }

            let candidate = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
                .and_then(|date| date.and_hms_opt(hour as u32, minute as u32, second as u32));
            self.increment(SECOND);

            match candidate {
                Some(candidate) if candidate >= self.start => return Some(candidate),
                _ => continue,
            }
        }

        None
    }
}

impl std::iter::FusedIterator for TimeSeries {}
