use crate::calendar::{
    build_grid, step_month, CalendarFrame, CalendarSystem, DateStyler, MonthView, MAIN_WIDTH,
};
use crate::chart::MonthChart;
use crate::config::TemperatureRange;
use crate::daylist::DayList;
use crate::debounce::{Clock, DebouncedWriter};
use crate::detail::DetailView;
use crate::help::Help;
use crate::store::{local_now, Measurement, MeasurementStore};
use crate::theme::{BASE_STYLE, FEVER_STYLE, MEASURED_STYLE};
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::Style,
    widgets::{ListState, StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use std::time::Duration;
use time::{format_description::FormatItem, macros::format_description, Date, PrimitiveDateTime};
use uuid::Uuid;

static DAY_TITLE_FMT: &[FormatItem<'_>] =
    format_description!("[month repr:long] [day], [year]");

#[derive(Debug)]
pub(crate) struct App<S, C, K> {
    writer: DebouncedWriter<S, K>,
    calendar: C,
    range: TemperatureRange,
    today: Date,
    selected: Date,
    frame: CalendarFrame,
    list_state: ListState,
    focus: Focus,
    state: AppState,
}

impl<S: MeasurementStore, C: CalendarSystem, K: Clock> App<S, C, K> {
    pub(crate) fn new(
        writer: DebouncedWriter<S, K>,
        calendar: C,
        range: TemperatureRange,
        today: Date,
    ) -> Self {
        let frame = build_grid(today, &calendar);
        App {
            writer,
            calendar,
            range,
            today,
            selected: today,
            frame,
            list_state: ListState::default(),
            focus: Focus::Grid,
            state: AppState::Calendar,
        }
    }

    /// Start with `date` selected instead of today
    pub(crate) fn start_date(mut self, date: Date) -> Self {
        self.select_date(date);
        self
    }

    /// Run the event loop until the user quits, then save any outstanding
    /// edits.  Edits are saved even if the loop fails.
    pub(crate) fn run<B: Backend>(self, terminal: Terminal<B>) -> io::Result<()> {
        self.run_with(terminal, next_event)
    }

    /// Like `run()`, but events come from `next_event`, which is given the
    /// longest time to wait and returns `None` if nothing happened
    fn run_with<B, E>(mut self, mut terminal: Terminal<B>, mut next_event: E) -> io::Result<()>
    where
        B: Backend,
        E: FnMut(Option<Duration>) -> io::Result<Option<Event>>,
    {
        let r = self.event_loop(&mut terminal, &mut next_event);
        if let Err(e) = &r {
            tracing::error!(error = %e, "event loop failed");
        }
        if self.writer.is_pending() {
            tracing::debug!("saving pending edits before exit");
        }
        self.writer.flush_now();
        r
    }

    fn event_loop<B, E>(&mut self, terminal: &mut Terminal<B>, next_event: &mut E) -> io::Result<()>
    where
        B: Backend,
        E: FnMut(Option<Duration>) -> io::Result<Option<Event>>,
    {
        while !self.quitting() {
            self.draw(terminal)?;
            if let Some(event) = next_event(self.writer.time_until_due())? {
                self.handle_event(&event)?;
            }
            self.writer.poll();
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Calendar => match self.focus {
                Focus::Grid => self.handle_grid_key(key),
                Focus::List => self.handle_list_key(key),
            },
            AppState::Detail(id) => self.handle_detail_key(id, key),
            AppState::Chart | AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Quitting => false,
        }
    }

    fn handle_grid_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('h') | KeyCode::Left => self.shift_days(-1),
            KeyCode::Char('l') | KeyCode::Right => self.shift_days(1),
            KeyCode::Char('k') | KeyCode::Up => self.shift_days(-7),
            KeyCode::Char('j') | KeyCode::Down => self.shift_days(7),
            KeyCode::Char('p') | KeyCode::PageUp => self.shift_months(-1),
            KeyCode::Char('n') | KeyCode::PageDown => self.shift_months(1),
            KeyCode::Char('0') | KeyCode::Home => {
                self.select_date(self.today);
                true
            }
            KeyCode::Tab => {
                self.focus = Focus::List;
                if self.list_state.selected().is_none() && !self.day_records().is_empty() {
                    self.list_state.select(Some(0));
                }
                true
            }
            KeyCode::Char('a') => {
                self.add_measurement();
                true
            }
            KeyCode::Char('c') => {
                if self.month_records().is_empty() {
                    false
                } else {
                    self.state = AppState::Chart;
                    true
                }
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.state = AppState::Quitting;
                true
            }
            _ => false,
        }
    }

    fn handle_list_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.select_record(true),
            KeyCode::Char('k') | KeyCode::Up => self.select_record(false),
            KeyCode::Enter => {
                if let Some(m) = self.selected_record() {
                    self.state = AppState::Detail(m.id);
                    true
                } else {
                    false
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => self
                .selected_record()
                .is_some_and(|m| self.delete_measurement(m.id)),
            KeyCode::Tab | KeyCode::Esc => {
                self.focus = Focus::Grid;
                true
            }
            KeyCode::Char('?') => {
                self.state = AppState::Helping;
                true
            }
            KeyCode::Char('q') => {
                self.state = AppState::Quitting;
                true
            }
            _ => false,
        }
    }

    fn handle_detail_key(&mut self, id: Uuid, key: KeyCode) -> bool {
        match key {
            KeyCode::Char('h') | KeyCode::Left => self.adjust(id, -self.range.step),
            KeyCode::Char('l') | KeyCode::Right => self.adjust(id, self.range.step),
            KeyCode::Char('H') => self.adjust(id, -1.0),
            KeyCode::Char('L') => self.adjust(id, 1.0),
            KeyCode::Char('d') | KeyCode::Delete => {
                let ok = self.delete_measurement(id);
                self.state = AppState::Calendar;
                ok
            }
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => {
                self.state = AppState::Calendar;
                true
            }
            _ => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn store(&self) -> &S {
        self.writer.get_ref()
    }

    fn day_records(&self) -> Vec<Measurement> {
        self.store().records_on_date(self.selected)
    }

    fn month_records(&self) -> Vec<Measurement> {
        self.store().records_in_month(self.selected, &self.calendar)
    }

    fn selected_record(&self) -> Option<Measurement> {
        let i = self.list_state.selected()?;
        self.day_records().get(i).copied()
    }

    fn select_date(&mut self, date: Date) {
        if !self.frame.in_month(date) {
            self.frame = build_grid(date, &self.calendar);
        }
        if date != self.selected {
            self.list_state.select(None);
        }
        self.selected = date;
    }

    fn shift_days(&mut self, n: i32) -> bool {
        let step = |d: Date| {
            if n < 0 {
                self.calendar.previous_day(d)
            } else {
                self.calendar.next_day(d)
            }
        };
        let target = (0..n.unsigned_abs()).try_fold(self.selected, |d, _| step(d));
        if let Some(date) = target {
            self.select_date(date);
            true
        } else {
            false
        }
    }

    fn shift_months(&mut self, n: i32) -> bool {
        match step_month(self.selected, n, &self.calendar) {
            Ok(date) => {
                self.select_date(date);
                true
            }
            Err(e) => {
                tracing::debug!(
                    selected = %self.selected,
                    months = n,
                    error = %e,
                    "cannot change month"
                );
                false
            }
        }
    }

    fn select_record(&mut self, forwards: bool) -> bool {
        let len = self.day_records().len();
        let next = match (self.list_state.selected(), forwards) {
            (None, _) if len > 0 => 0,
            (Some(i), true) if i + 1 < len => i + 1,
            (Some(i), false) if i > 0 => i - 1,
            _ => return false,
        };
        self.list_state.select(Some(next));
        true
    }

    /// Record a new measurement on the selected day at the current time of
    /// day and open it for editing
    fn add_measurement(&mut self) {
        let when = PrimitiveDateTime::new(self.selected, local_now().time());
        let m = self.writer.get_mut().create(when, self.range.min);
        self.writer.flush_now();
        if let Some(i) = self.day_records().iter().position(|r| r.id == m.id) {
            self.list_state.select(Some(i));
        }
        self.state = AppState::Detail(m.id);
    }

    fn delete_measurement(&mut self, id: Uuid) -> bool {
        if let Err(e) = self.writer.get_mut().delete(id) {
            tracing::warn!(error = %e, "could not delete measurement");
            return false;
        }
        self.writer.flush_now();
        let len = self.day_records().len();
        let selection = self.list_state.selected().filter(|_| len > 0).map(|i| i.min(len - 1));
        self.list_state.select(selection);
        true
    }

    /// Change a measurement's temperature by `delta`, within the configured
    /// range.  Returns `false` if the temperature is already at the limit.
    fn adjust(&mut self, id: Uuid, delta: f64) -> bool {
        let Some(mut m) = self.store().get(id) else {
            return false;
        };
        let temperature = self.range.clamp(m.temperature + delta);
        if (temperature - m.temperature).abs() < self.range.step / 2.0 {
            return false;
        }
        m.temperature = temperature;
        match self.writer.get_mut().update(&m) {
            Ok(()) => {
                self.writer.notify();
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not update measurement");
                false
            }
        }
    }
}

/// Wait up to `timeout` (forever if `None`) for a terminal event
fn next_event(timeout: Option<Duration>) -> io::Result<Option<Event>> {
    match timeout {
        Some(t) if !poll(t)? => Ok(None),
        _ => read().map(Some),
    }
}

impl<S: MeasurementStore, C: CalendarSystem, K: Clock> Widget for &mut App<S, C, K> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let month = self.month_records();
        let view = MonthView::new(
            &self.frame,
            self.calendar.month_title(self.selected),
            MeasuredDays {
                records: &month,
                range: self.range,
            },
        )
        .today(self.today)
        .selected(self.selected);
        let [cal_area, _, list_area] = Layout::vertical([
            Constraint::Length(view.height()),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(area);
        view.render(cal_area, buf);
        let [list_area] = Layout::horizontal([MAIN_WIDTH])
            .flex(Flex::Center)
            .areas(list_area);
        let title = self.selected.format(&DAY_TITLE_FMT).unwrap_or_default();
        let day = month
            .iter()
            .filter(|m| m.date.date() == self.selected)
            .copied()
            .collect::<Vec<_>>();
        DayList::new(&title, &day, self.range)
            .focused(self.focus == Focus::List)
            .render(list_area, buf, &mut self.list_state);
        match self.state {
            AppState::Detail(id) => {
                let m = self.writer.get_ref().get(id);
                DetailView::new(m.as_ref(), self.range).render(area, buf);
            }
            AppState::Chart => {
                if let (Some(start), Some(end)) = (
                    self.calendar.start_of_month(self.selected),
                    self.calendar.end_of_month(self.selected),
                ) {
                    let title = self.calendar.month_title(self.selected);
                    MonthChart::new(&title, start, end, &month).render(area, buf);
                }
            }
            AppState::Helping => Help(BASE_STYLE).render(area, buf),
            AppState::Calendar | AppState::Quitting => (),
        }
    }
}

/// Marks the days of a month on which measurements were taken
#[derive(Clone, Copy, Debug, PartialEq)]
struct MeasuredDays<'a> {
    records: &'a [Measurement],
    range: TemperatureRange,
}

impl DateStyler for MeasuredDays<'_> {
    fn date_style(&self, date: Date) -> Style {
        let mut taken = self.records.iter().filter(|m| m.date.date() == date).peekable();
        if taken.peek().is_none() {
            Style::new()
        } else if taken.any(|m| self.range.is_fever(m.temperature)) {
            FEVER_STYLE
        } else {
            MEASURED_STYLE
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Focus {
    Grid,
    List,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Detail(Uuid),
    Chart,
    Helping,
    Quitting,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Gregorian;
    use crate::debounce::tests::ManualClock;
    use crate::store::JsonStore;
    use crate::test_util::buffer_lines;
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;
    use tempfile::tempdir;
    use time::macros::{date, datetime};

    const DELAY: Duration = Duration::from_secs(3);

    fn app(clock: &ManualClock, today: Date) -> App<JsonStore, Gregorian, &ManualClock> {
        let writer = DebouncedWriter::with_clock(JsonStore::in_memory(), DELAY, clock);
        App::new(writer, Gregorian::default(), TemperatureRange::default(), today)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn temperature(app: &App<JsonStore, Gregorian, &ManualClock>, id: Uuid) -> f64 {
        app.store().get(id).map(|m| m.temperature).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_day_and_week_navigation() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        assert!(app.handle_key(KeyCode::Char('l')));
        assert_eq!(app.selected, date!(2023 - 07 - 20));
        assert!(app.handle_key(KeyCode::Up));
        assert_eq!(app.selected, date!(2023 - 07 - 13));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert_eq!(app.selected, date!(2023 - 08 - 03));
        assert_eq!(app.frame.reference_month(), date!(2023 - 08 - 01));
        assert!(app.handle_key(KeyCode::Home));
        assert_eq!(app.selected, date!(2023 - 07 - 19));
        assert_eq!(app.frame.reference_month(), date!(2023 - 07 - 01));
    }

    #[test]
    fn test_month_navigation() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2024 - 01 - 31));
        assert!(app.handle_key(KeyCode::Char('n')));
        assert_eq!(app.selected, date!(2024 - 02 - 29));
        assert_eq!(app.frame.weeks().len(), 5);
        assert!(app.handle_key(KeyCode::PageUp));
        assert_eq!(app.selected, date!(2024 - 01 - 29));
        assert_eq!(app.frame.reference_month(), date!(2024 - 01 - 01));
    }

    #[test]
    fn test_end_of_time_is_rejected() {
        let clock = ManualClock::new();
        let mut app = app(&clock, Date::MAX);
        assert!(!app.handle_key(KeyCode::Char('n')));
        assert!(!app.handle_key(KeyCode::Char('l')));
        assert_eq!(app.selected, Date::MAX);
    }

    #[test]
    fn test_add_measurement_opens_detail() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        assert!(app.handle_key(KeyCode::Char('a')));
        let AppState::Detail(id) = app.state else {
            panic!("expected detail view, got {:?}", app.state);
        };
        let m = app.store().get(id).expect("measurement should exist");
        assert_eq!(m.date.date(), date!(2023 - 07 - 19));
        assert_close(m.temperature, 35.1);
        assert!(!app.store().has_changes());
        assert!(!app.writer.is_pending());
        assert!(app.handle_key(KeyCode::Esc));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_edits_are_debounced() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        app.handle_key(KeyCode::Char('a'));
        let AppState::Detail(id) = app.state else {
            panic!("expected detail view, got {:?}", app.state);
        };
        assert!(!app.handle_key(KeyCode::Char('h')));
        assert!(app.handle_key(KeyCode::Char('l')));
        assert!(app.handle_key(KeyCode::Char('L')));
        assert_close(temperature(&app, id), 36.2);
        assert!(app.store().has_changes());
        assert!(app.writer.is_pending());
        clock.advance(DELAY / 2);
        assert!(app.handle_key(KeyCode::Right));
        clock.advance(DELAY / 2);
        assert!(!app.writer.poll());
        clock.advance(DELAY / 2);
        assert!(app.writer.poll());
        assert!(!app.store().has_changes());
        assert_close(temperature(&app, id), 36.3);
    }

    #[test]
    fn test_adjust_is_clamped() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        app.handle_key(KeyCode::Char('a'));
        let AppState::Detail(id) = app.state else {
            panic!("expected detail view, got {:?}", app.state);
        };
        for _ in 0..5 {
            assert!(app.handle_key(KeyCode::Char('L')));
        }
        assert!(app.handle_key(KeyCode::Char('L')));
        assert_close(temperature(&app, id), 41.0);
        assert!(!app.handle_key(KeyCode::Char('L')));
        assert!(!app.handle_key(KeyCode::Char('l')));
    }

    #[test]
    fn test_list_selection_and_delete() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        app.writer
            .get_mut()
            .create_sample_data(datetime!(2023-07-19 09:30));
        app.writer.flush_now();
        assert!(app.handle_key(KeyCode::Tab));
        assert_eq!(app.list_state.selected(), Some(0));
        assert!(!app.handle_key(KeyCode::Char('k')));
        assert!(app.handle_key(KeyCode::Char('j')));
        assert_eq!(app.list_state.selected(), Some(1));
        let target = app.selected_record().expect("a record should be selected");
        assert!(app.handle_key(KeyCode::Char('d')));
        assert_eq!(app.store().count(), 4);
        assert!(app.store().get(target.id).is_none());
        assert!(!app.store().has_changes());
        assert!(app.handle_key(KeyCode::Enter));
        assert!(matches!(app.state, AppState::Detail(_)));
        assert!(app.handle_key(KeyCode::Char('d')));
        assert_eq!(app.store().count(), 3);
        assert_eq!(app.state, AppState::Calendar);
        assert!(app.handle_key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Grid);
    }

    #[test]
    fn test_chart_requires_measurements() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        assert!(!app.handle_key(KeyCode::Char('c')));
        app.writer.get_mut().create(datetime!(2023-07-02 08:00), 36.8);
        assert!(app.handle_key(KeyCode::Char('c')));
        assert_eq!(app.state, AppState::Chart);
        assert!(app.handle_key(KeyCode::Char('x')));
        assert_eq!(app.state, AppState::Calendar);
    }

    #[test]
    fn test_quit() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.quitting());
        assert!(!app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn test_render_calendar() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        app.writer.get_mut().create(datetime!(2023-07-19 08:15), 36.6);
        app.writer.get_mut().create(datetime!(2023-07-10 21:00), 38.9);
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        let lines = buffer_lines(&buffer);
        assert_eq!(lines[0].trim(), "July 2023");
        assert_eq!(lines[3].trim(), "25     26     27     28     29     30      1");
        assert!(lines[10].contains("┌ July 19, 2023 "));
        assert!(lines[11].contains("08:15  36.6ºC"));
        // The grid is centered with 17 columns of margin
        assert_eq!(buffer[(17 + 7, 5)].style().fg, FEVER_STYLE.fg);
        assert_eq!(buffer[(17 + 21, 6)].style().fg, MEASURED_STYLE.fg);
    }

    #[test]
    fn test_render_help() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        assert!(app.handle_key(KeyCode::Char('?')));
        let area = Rect::new(0, 0, 80, 30);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        let lines = buffer_lines(&buffer);
        assert!(lines.iter().any(|l| l.contains(" Commands ")));
        assert!(app.handle_key(KeyCode::Char(' ')));
        assert_eq!(app.state, AppState::Calendar);
    }

    fn key(c: char) -> Option<Event> {
        Some(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
    }

    fn file_app<'a>(
        clock: &'a ManualClock,
        path: &std::path::Path,
    ) -> App<JsonStore, Gregorian, &'a ManualClock> {
        let writer = DebouncedWriter::with_clock(JsonStore::open(path).unwrap(), DELAY, clock);
        App::new(
            writer,
            Gregorian::default(),
            TemperatureRange::default(),
            date!(2023 - 07 - 19),
        )
    }

    #[test]
    fn test_run_saves_edits_on_quit() {
        let tmpdir = tempdir().unwrap();
        let path = tmpdir.path().join("measurements.json");
        let clock = ManualClock::new();
        let app = file_app(&clock, &path);
        let mut events = VecDeque::from([key('a'), key('l'), key('l'), key('q'), key('q')]);
        let terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let r = app.run_with(terminal, |_| {
            events
                .pop_front()
                .ok_or_else(|| io::Error::other("out of input"))
        });
        assert!(r.is_ok());
        assert!(events.is_empty());
        let saved = JsonStore::open(&path)
            .unwrap()
            .records_on_date(date!(2023 - 07 - 19));
        assert_eq!(saved.len(), 1);
        assert_close(saved[0].temperature, 35.3);
    }

    #[test]
    fn test_run_flushes_when_quiet() {
        let tmpdir = tempdir().unwrap();
        let path = tmpdir.path().join("measurements.json");
        let clock = ManualClock::new();
        let app = file_app(&clock, &path);
        let mut events = VecDeque::from([key('a'), key('l'), None, key('q'), key('q')]);
        let mut waits = Vec::new();
        let terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let r = app.run_with(terminal, |timeout| {
            waits.push(timeout);
            let event = events
                .pop_front()
                .ok_or_else(|| io::Error::other("out of input"))?;
            if event.is_none() {
                clock.advance(timeout.unwrap_or_default());
            }
            Ok(event)
        });
        assert!(r.is_ok());
        assert_eq!(waits, [None, None, Some(DELAY), None, None]);
        let saved = JsonStore::open(&path)
            .unwrap()
            .records_on_date(date!(2023 - 07 - 19));
        assert_close(saved[0].temperature, 35.2);
    }

    #[test]
    fn test_run_saves_edits_when_input_fails() {
        let tmpdir = tempdir().unwrap();
        let path = tmpdir.path().join("measurements.json");
        let clock = ManualClock::new();
        let app = file_app(&clock, &path);
        let mut events = VecDeque::from([key('a'), key('l')]);
        let terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        let r = app.run_with(terminal, |_| {
            events
                .pop_front()
                .ok_or_else(|| io::Error::other("terminal went away"))
        });
        let e = r.unwrap_err();
        assert_eq!(e.to_string(), "terminal went away");
        let saved = JsonStore::open(&path)
            .unwrap()
            .records_on_date(date!(2023 - 07 - 19));
        assert_eq!(saved.len(), 1);
        assert_close(saved[0].temperature, 35.2);
    }

    #[test]
    fn test_render_help_in_tiny_terminal() {
        let clock = ManualClock::new();
        let mut app = app(&clock, date!(2023 - 07 - 19));
        assert!(app.handle_key(KeyCode::Char('?')));
        for (width, height) in [(1, 1), (20, 10), (45, 30)] {
            let area = Rect::new(0, 0, width, height);
            let mut buffer = Buffer::empty(area);
            app.render(area, &mut buffer);
        }
        assert_eq!(app.state, AppState::Helping);
    }
}
