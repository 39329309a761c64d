//! Date selection applied to the observation table before aggregation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects observations by acquisition date.
///
/// A [`FilterSpec::Range`] is closed on both ends. A range whose `start` lies after its
/// `end` is accepted as is and simply matches nothing.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use heatspot::FilterSpec;
///
/// let may_first = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
/// let may_fifth = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
///
/// let range = FilterSpec::range(may_first, may_fifth);
/// assert!(range.contains(NaiveDate::from_ymd_opt(2025, 5, 3).unwrap()));
/// assert!(!FilterSpec::exact(may_first).contains(may_fifth));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterSpec {
    /// Matches rows whose acquisition date equals the given date.
    Exact { date: NaiveDate },
    /// Matches rows with `start <= acq_date <= end`.
    Range { start: NaiveDate, end: NaiveDate },
}

impl FilterSpec {
    pub fn exact(date: NaiveDate) -> Self {
        FilterSpec::Exact { date }
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        FilterSpec::Range { start, end }
    }

    /// Returns `true` when `date` is selected by this filter.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            FilterSpec::Exact { date: exact } => date == exact,
            FilterSpec::Range { start, end } => start <= date && date <= end,
        }
    }

    /// Returns `true` for an inverted range, which selects no dates at all.
    pub fn is_inverted(&self) -> bool {
        matches!(*self, FilterSpec::Range { start, end } if start > end)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Exact { date } => write!(f, "{}", date),
            FilterSpec::Range { start, end } => write!(f, "{}..={}", start, end),
        }
    }
}
