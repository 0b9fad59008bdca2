//! Recurrence expansion.
//!
//! Turns a base event date range into the ordered occurrence dates of a
//! series. Every occurrence keeps the base event's length in days.

use chrono::{Datelike, Days, Duration, Months, NaiveDate, Weekday};

use crate::error::{DeptCalError, DeptCalResult};
use crate::event::RecurrenceType;

/// One date instance of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    /// 0-based position in the series.
    pub index: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Occurrence {
    /// 1-based index stored on the document.
    pub fn recurrence_index(&self) -> u32 {
        self.index as u32 + 1
    }
}

impl RecurrenceType {
    pub fn is_recurring(self) -> bool {
        self != RecurrenceType::None
    }

    /// Start date of occurrence `i`.
    ///
    /// Anchored variants count from `base`; the weekday/weekend variants walk
    /// forward from the previous occurrence.
    fn nth_start(self, base: NaiveDate, previous: NaiveDate, i: u32) -> Option<NaiveDate> {
        if i == 0 {
            return Some(base);
        }
        match self {
            RecurrenceType::None => Some(base),
            RecurrenceType::Daily => base.checked_add_signed(Duration::days(i64::from(i))),
            RecurrenceType::Weekly => base.checked_add_signed(Duration::weeks(i64::from(i))),
            RecurrenceType::Monthly => add_months_clamped(base, i),
            RecurrenceType::Yearly => add_months_clamped(base, i.checked_mul(12)?),
            RecurrenceType::Weekdays => next_matching(previous, |d| !is_weekend(d)),
            RecurrenceType::Weekends => next_matching(previous, is_weekend),
        }
    }
}

/// Shift by whole months. A day that does not exist in the target month
/// (Jan 31 -> Feb) lands on that month's last day.
fn add_months_clamped(base: NaiveDate, months: u32) -> Option<NaiveDate> {
    base.checked_add_months(Months::new(months))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First day strictly after `from` accepted by `accept`.
fn next_matching(from: NaiveDate, accept: impl Fn(NaiveDate) -> bool) -> Option<NaiveDate> {
    let mut date = from.succ_opt()?;
    while !accept(date) {
        date = date.succ_opt()?;
    }
    Some(date)
}

/// Expand `[start, end]` into `count` occurrences.
///
/// A count of 0 or 1, or a non-recurring type, yields the base range alone.
pub fn expand(
    start: NaiveDate,
    end: NaiveDate,
    recurrence_type: RecurrenceType,
    count: usize,
) -> DeptCalResult<Vec<Occurrence>> {
    let base = Occurrence {
        index: 0,
        start,
        end,
    };
    if count <= 1 || !recurrence_type.is_recurring() {
        return Ok(vec![base]);
    }

    // Every variant advances at least one day per occurrence.
    let last_possible = u64::try_from(count - 1)
        .ok()
        .and_then(|days| start.checked_add_days(Days::new(days)));
    if last_possible.is_none() {
        return Err(DeptCalError::InvalidDate(format!(
            "{} occurrences starting {} run past the supported date range",
            count, start
        )));
    }

    let length = end - start;
    let mut occurrences = Vec::new();
    let mut previous = start;

    for i in 0..count {
        let occ_start = u32::try_from(i)
            .ok()
            .and_then(|i| recurrence_type.nth_start(start, previous, i))
            .ok_or_else(|| {
                DeptCalError::InvalidDate(format!(
                    "occurrence {} of series starting {} is out of range",
                    i + 1,
                    start
                ))
            })?;
        let occ_end = occ_start
            .checked_add_signed(length)
            .ok_or_else(|| DeptCalError::InvalidDate(format!("end of occurrence starting {}", occ_start)))?;

        occurrences.push(Occurrence {
            index: i,
            start: occ_start,
            end: occ_end,
        });
        previous = occ_start;
    }

    Ok(occurrences)
}
