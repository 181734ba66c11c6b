use super::CalendarSystem;
use std::iter::successors;
use thiserror::Error;
use time::Date;

const DAYS_IN_WEEK: usize = 7;

/// Upper bound on the number of days in a grid, guarding against calendars
/// whose day stepping never reaches the end of the grid
const MAX_GRID_DAYS: usize = 400;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DayCell {
    pub(crate) date: Date,
    pub(crate) in_reference_month: bool,
}

/// The days shown for one month, padded with days from the adjacent months
/// so that every row is a full week.
///
/// An empty frame (no weeks) means the calendar could not lay out the month.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarFrame {
    reference_month: Date,
    weeks: Vec<[DayCell; DAYS_IN_WEEK]>,
}

impl CalendarFrame {
    fn empty(reference_month: Date) -> CalendarFrame {
        CalendarFrame {
            reference_month,
            weeks: Vec::new(),
        }
    }

    /// First day of the month the frame was built for, or the reference date
    /// itself if the month could not be resolved
    pub(crate) fn reference_month(&self) -> Date {
        self.reference_month
    }

    pub(crate) fn weeks(&self) -> &[[DayCell; DAYS_IN_WEEK]] {
        &self.weeks
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub(crate) fn cells(&self) -> impl DoubleEndedIterator<Item = &DayCell> + '_ {
        self.weeks.iter().flatten()
    }

    /// Whether `date` is one of the days of the frame's month, as opposed
    /// to padding or outside the grid entirely
    pub(crate) fn in_month(&self, date: Date) -> bool {
        self.cells()
            .any(|cell| cell.in_reference_month && cell.date == date)
    }
}

/// Lay out the month containing `reference` as whole weeks according to
/// `calendar`'s week and month boundaries.
pub(crate) fn build_grid<C: CalendarSystem>(reference: Date, calendar: &C) -> CalendarFrame {
    match layout(reference, calendar) {
        Some(frame) => frame,
        None => {
            tracing::debug!(%reference, "calendar could not lay out month; showing empty grid");
            CalendarFrame::empty(reference)
        }
    }
}

fn layout<C: CalendarSystem>(reference: Date, calendar: &C) -> Option<CalendarFrame> {
    let month_start = calendar.start_of_month(reference)?;
    let month_end = calendar.end_of_month(reference)?;
    let last_day = calendar.previous_day(month_end)?;
    let grid_start = calendar.start_of_week(month_start)?;
    let grid_end = calendar.end_of_week(last_day)?;
    if grid_start > month_start || grid_end <= last_day {
        return None;
    }
    let days = successors(Some(grid_start), |&d| calendar.next_day(d))
        .take_while(|&d| d < grid_end)
        .take(MAX_GRID_DAYS)
        .map(|date| DayCell {
            date,
            in_reference_month: month_start <= date && date < month_end,
        })
        .collect::<Vec<_>>();
    if days.last().map(|cell| cell.date) != calendar.previous_day(grid_end) {
        // Ran out of days before reaching the end of the grid
        return None;
    }
    if days.len() % DAYS_IN_WEEK != 0 {
        return None;
    }
    let weeks = days
        .chunks_exact(DAYS_IN_WEEK)
        .map(<[DayCell; DAYS_IN_WEEK]>::try_from)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    Some(CalendarFrame {
        reference_month: month_start,
        weeks,
    })
}

/// Move `date` by `n` months.  On failure, the caller keeps its current date.
pub(crate) fn step_month<C: CalendarSystem>(
    date: Date,
    n: i32,
    calendar: &C,
) -> Result<Date, OutOfTimeError> {
    calendar.add_months(date, n).ok_or(OutOfTimeError)
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub(crate) struct OutOfTimeError;
