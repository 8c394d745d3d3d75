// --- File: crates/scheduler_widget/src/calendar.rs ---
use chrono::{Datelike, Months, NaiveDate};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One cell of the date picker grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCell {
    /// Padding before the first day of the month
    Blank,
    Day { date: NaiveDate, disabled: bool },
}

/// A month of the date picker, weeks starting on Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    first: NaiveDate,
}

impl MonthView {
    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// e.g. `May 2024`
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    pub fn previous(&self) -> Self {
        Self {
            first: self.first.checked_sub_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            first: self.first.checked_add_months(Months::new(1)).unwrap_or(self.first),
        }
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first;
        if next == self.first {
            // December of the last representable year
            return 31;
        }
        next.signed_duration_since(self.first).num_days() as u32
    }

    /// Rows of up to seven cells, leading blanks for the weekday offset.
    ///
    /// The last row is not padded. Days before `today` are disabled.
    pub fn weeks(&self, today: NaiveDate) -> Vec<Vec<DayCell>> {
        let leading = self.first.weekday().num_days_from_sunday() as usize;
        let cells: Vec<DayCell> = std::iter::repeat(DayCell::Blank)
            .take(leading)
            .chain(
                self.first
                    .iter_days()
                    .take(self.days_in_month() as usize)
                    .map(|date| DayCell::Day {
                        date,
                        disabled: scheduler_common::logic::is_date_disabled(date, today),
                    }),
            )
            .collect();

        cells.chunks(7).map(<[DayCell]>::to_vec).collect()
    }
}
