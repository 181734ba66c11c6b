use super::CalendarSystem;
use serde::Deserialize;
use time::{Date, Duration, Month, Weekday};

const DAYS_IN_WEEK: i64 = 7;

/// The proleptic Gregorian calendar with a configurable first day of the
/// week
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Gregorian {
    week_start: WeekStart,
}

impl Gregorian {
    pub(crate) fn new(week_start: WeekStart) -> Gregorian {
        Gregorian { week_start }
    }
}

impl CalendarSystem for Gregorian {
    fn start_of_week(&self, date: Date) -> Option<Date> {
        let first = self.week_start.weekday().number_days_from_monday();
        let offset = (date.weekday().number_days_from_monday() + 7 - first) % 7;
        date.checked_sub(Duration::days(offset.into()))
    }

    fn end_of_week(&self, date: Date) -> Option<Date> {
        self.start_of_week(date)?
            .checked_add(Duration::days(DAYS_IN_WEEK))
    }

    fn start_of_month(&self, date: Date) -> Option<Date> {
        date.replace_day(1).ok()
    }

    fn end_of_month(&self, date: Date) -> Option<Date> {
        first_of_next_month(date.year(), date.month())
    }

    fn add_months(&self, date: Date, n: i32) -> Option<Date> {
        let index = date
            .year()
            .checked_mul(12)?
            .checked_add(i32::from(u8::from(date.month())) - 1)?
            .checked_add(n)?;
        let year = index.div_euclid(12);
        let month = u8::try_from(index.rem_euclid(12) + 1).ok()?;
        let month = Month::try_from(month).ok()?;
        let day = date.day().min(month_length(year, month)?);
        Date::from_calendar_date(year, month, day).ok()
    }

    fn next_day(&self, date: Date) -> Option<Date> {
        date.next_day()
    }

    fn previous_day(&self, date: Date) -> Option<Date> {
        date.previous_day()
    }
}

/// First day of the week as read from the configuration file
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WeekStart {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekStart {
    pub(crate) fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sunday,
            WeekStart::Monday => Weekday::Monday,
            WeekStart::Tuesday => Weekday::Tuesday,
            WeekStart::Wednesday => Weekday::Wednesday,
            WeekStart::Thursday => Weekday::Thursday,
            WeekStart::Friday => Weekday::Friday,
            WeekStart::Saturday => Weekday::Saturday,
        }
    }
}

fn first_of_next_month(year: i32, month: Month) -> Option<Date> {
    let (year, month) = match month {
        Month::December => (year.checked_add(1)?, Month::January),
        m => (year, m.next()),
    };
    Date::from_calendar_date(year, month, 1).ok()
}

fn month_length(year: i32, month: Month) -> Option<u8> {
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    match first_of_next_month(year, month) {
        Some(next) => next.previous_day().map(|d| d.day()),
        // Only December of the last representable year has no successor
        None => Some(first.replace_day(31).ok()?.day()),
    }
}
