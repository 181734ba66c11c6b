mod gregorian;
mod grid;
mod widget;
pub(crate) use self::gregorian::{Gregorian, WeekStart};
pub(crate) use self::grid::{build_grid, step_month, CalendarFrame, DayCell};
pub(crate) use self::widget::{MonthView, MAIN_WIDTH};
use ratatui::style::Style;
use time::Date;

pub(crate) trait DateStyler {
    fn date_style(&self, date: Date) -> Style;
}

impl<T: DateStyler + ?Sized> DateStyler for &T {
    fn date_style(&self, date: Date) -> Style {
        (**self).date_style(date)
    }
}

/// The interval queries a calendar must answer for a month grid to be built
/// from it.
///
/// Every method returns `None` when the calendar cannot resolve the
/// requested boundary for the given date (e.g., because it lies outside the
/// representable range).  The `end_of_*` methods return *exclusive* bounds:
/// the first day that is no longer part of the interval.
pub(crate) trait CalendarSystem {
    fn start_of_week(&self, date: Date) -> Option<Date>;

    fn end_of_week(&self, date: Date) -> Option<Date>;

    fn start_of_month(&self, date: Date) -> Option<Date>;

    fn end_of_month(&self, date: Date) -> Option<Date>;

    /// Move `n` months forwards (or backwards if negative), keeping the day
    /// of the month where the target month allows it
    fn add_months(&self, date: Date, n: i32) -> Option<Date>;

    fn next_day(&self, date: Date) -> Option<Date>;

    fn previous_day(&self, date: Date) -> Option<Date>;

    /// Title shown above the grid for the month containing `date`
    fn month_title(&self, date: Date) -> String {
        format!("{} {}", date.month(), date.year())
    }
}

impl<T: CalendarSystem + ?Sized> CalendarSystem for &T {
    fn start_of_week(&self, date: Date) -> Option<Date> {
        (**self).start_of_week(date)
    }

    fn end_of_week(&self, date: Date) -> Option<Date> {
        (**self).end_of_week(date)
    }

    fn start_of_month(&self, date: Date) -> Option<Date> {
        (**self).start_of_month(date)
    }

    fn end_of_month(&self, date: Date) -> Option<Date> {
        (**self).end_of_month(date)
    }

    fn add_months(&self, date: Date, n: i32) -> Option<Date> {
        (**self).add_months(date, n)
    }

    fn next_day(&self, date: Date) -> Option<Date> {
        (**self).next_day(date)
    }

    fn previous_day(&self, date: Date) -> Option<Date> {
        (**self).previous_day(date)
    }

    fn month_title(&self, date: Date) -> String {
        (**self).month_title(date)
    }
}
