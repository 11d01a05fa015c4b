use chrono::{Duration, NaiveDate};
use serde::Serialize;

pub const WINDOW_DAYS: usize = 30;

/// The fixed run of `WINDOW_DAYS` consecutive calendar dates ending at the
/// reference date, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingWindow {
    end: NaiveDate,
}

impl RatingWindow {
    pub fn ending_at(reference_date: NaiveDate) -> Self {
        Self {
            end: reference_date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.end - Duration::days(WINDOW_DAYS as i64 - 1)
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Window dates, oldest first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start().iter_days().take(WINDOW_DAYS)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start() <= date && date <= self.end
    }

    /// Distance from the reference date in days (0 for the reference date).
    pub fn days_before_end(&self, date: NaiveDate) -> Option<u32> {
        if !self.contains(date) {
            return None;
        }
        u32::try_from((self.end - date).num_days()).ok()
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        usize::try_from((date - self.start()).num_days()).ok()
    }
}

/// A dense daily rating series over a `RatingWindow`. `None` marks a date for
/// which no observation exists at or before it in the entity's whole history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRatingSeries {
    window: RatingWindow,
    values: Vec<Option<i32>>,
}

impl DailyRatingSeries {
    /// Builds a series by evaluating `value_at` once per window date, oldest
    /// first.
    pub fn from_fn(window: RatingWindow, value_at: impl FnMut(NaiveDate) -> Option<i32>) -> Self {
        let values: Vec<Option<i32>> = window.dates().map(value_at).collect();
        debug_assert_eq!(values.len(), WINDOW_DAYS);
        Self { window, values }
    }

    pub fn unknown(window: RatingWindow) -> Self {
        Self {
            window,
            values: vec![None; WINDOW_DAYS],
        }
    }

    pub fn window(&self) -> RatingWindow {
        self.window
    }

    pub fn values(&self) -> &[Option<i32>] {
        &self.values
    }

    pub fn get(&self, date: NaiveDate) -> Option<i32> {
        self.window.index_of(date).and_then(|i| self.values[i])
    }

    /// Rating on the reference date.
    pub fn latest(&self) -> Option<i32> {
        self.values.last().copied().flatten()
    }

    pub fn is_all_unknown(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<i32>)> + '_ {
        self.window.dates().zip(self.values.iter().copied())
    }
}
