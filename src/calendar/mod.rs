// Calendar window math
// Month-aligned ranges rendered by the calendar grid. Nothing here keeps
// state: every window is recomputed from a pivot date.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of months the calendar grid renders side by side.
pub const DEFAULT_MONTHS_IN_VIEW: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month immediately preceding the pivot's month.
pub fn first_month_in_view(pivot: NaiveDate) -> NaiveDate {
    let month_start = start_of_month(pivot);
    month_start
        .checked_sub_months(Months::new(1))
        .unwrap_or(month_start)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub start: NaiveDate,
    pub months: u32,
}

impl ViewWindow {
    /// The window shown when `pivot` is the date of interest: it opens on
    /// the month before the pivot's.
    pub fn around(pivot: NaiveDate, months: u32) -> Self {
        Self {
            start: first_month_in_view(pivot),
            months: months.max(1),
        }
    }

    /// Month the window is built around, one after `start`.
    pub fn focus(&self) -> NaiveDate {
        self.start
            .checked_add_months(Months::new(1))
            .unwrap_or(self.start)
    }

    /// Last day rendered by the window.
    pub fn end(&self) -> NaiveDate {
        self.start
            .checked_add_months(Months::new(self.months))
            .and_then(|after| after.pred_opt())
            .unwrap_or(self.start)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// Moves one month in `direction`, pivoting on the month next to the
    /// focus on that side.
    pub fn navigate(&self, direction: Direction) -> Self {
        let focus = self.focus();
        let pivot = match direction {
            Direction::Forward => focus.checked_add_months(Months::new(1)),
            Direction::Backward => focus.checked_sub_months(Months::new(1)),
        }
        .unwrap_or(focus);

        Self::around(pivot, self.months)
    }
}
