use super::{CalendarFrame, DateStyler, DayCell};
use crate::theme::{BASE_STYLE, PADDING_STYLE, SELECTED_MODIFIER, TITLE_STYLE, WEEKDAY_STYLE};
use ratatui::{prelude::*, widgets::*};
use time::Date;

/// Width of the calendar in columns
pub(crate) const MAIN_WIDTH: u16 = 46;

/// Number of lines above the first week: the title, the weekday header, and
/// the header's rule
pub(crate) const HEADER_LINES: u16 = 3;

/// Number of columns per day of week
const DAY_WIDTH: u16 = 7;

const ACS_HLINE: char = '─';

/// A single month of days laid out by [`build_grid`](super::build_grid)
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthView<'a, S> {
    frame: &'a CalendarFrame,
    title: String,
    today: Option<Date>,
    selected: Option<Date>,
    styler: S,
}

impl<'a, S: DateStyler> MonthView<'a, S> {
    pub(crate) fn new(frame: &'a CalendarFrame, title: String, styler: S) -> Self {
        MonthView {
            frame,
            title,
            today: None,
            selected: None,
            styler,
        }
    }

    pub(crate) fn today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    pub(crate) fn selected(mut self, selected: Date) -> Self {
        self.selected = Some(selected);
        self
    }

    /// Number of lines needed to draw the whole month
    pub(crate) fn height(&self) -> u16 {
        // An empty frame still needs a line for its placeholder
        let weeks = if self.frame.is_empty() {
            1
        } else {
            u16::try_from(self.frame.weeks().len()).unwrap_or(u16::MAX)
        };
        HEADER_LINES.saturating_add(weeks)
    }

    fn day_style(&self, cell: &DayCell) -> Style {
        let style = if cell.in_reference_month {
            BASE_STYLE.patch(self.styler.date_style(cell.date))
        } else {
            PADDING_STYLE
        };
        if Some(cell.date) == self.selected {
            style.add_modifier(SELECTED_MODIFIER)
        } else {
            style
        }
    }

    fn show(&self, cell: &DayCell) -> Span<'static> {
        let day = cell.date.day();
        let s = if Some(cell.date) == self.today {
            format!("[{day:2}]")
        } else {
            format!(" {day:2} ")
        };
        Span::styled(s, self.day_style(cell))
    }
}

impl<S: DateStyler> Widget for MonthView<'_, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let left = area.width.saturating_sub(MAIN_WIDTH) / 2;
        let [_, area] = Layout::horizontal([
            Constraint::Length(left),
            Constraint::Length(MAIN_WIDTH.min(area.width)),
        ])
        .areas(area);
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_title(&self.title);
        let Some(first_week) = self.frame.weeks().first() else {
            canvas.mvprint(HEADER_LINES, 0, "No days to show", Some(PADDING_STYLE));
            return;
        };
        canvas.draw_header(first_week.iter().map(|cell| cell.date));
        for (i, week) in std::iter::zip(0u16.., self.frame.weeks()) {
            for (col, cell) in std::iter::zip(0u16.., week) {
                canvas.draw_day(i, col, self.show(cell));
            }
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, title: &str) {
        let width = u16::try_from(title.chars().count()).unwrap_or(u16::MAX);
        let x = MAIN_WIDTH.saturating_sub(width) / 2;
        self.mvprint(0, x, title, Some(TITLE_STYLE));
    }

    fn draw_header<I: IntoIterator<Item = Date>>(&mut self, dates: I) {
        for (col, date) in std::iter::zip(0u16.., dates) {
            let name = date.weekday().to_string();
            let abbrev = name.get(..2).unwrap_or(name.as_str());
            self.mvprint(1, DAY_WIDTH * col + 1, abbrev, Some(WEEKDAY_STYLE));
        }
        self.hline(2, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, week_no: u16, col: u16, s: Span<'_>) {
        self.mvprint(week_no + HEADER_LINES, DAY_WIDTH * col, s.content, Some(s.style));
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{build_grid, Gregorian, WeekStart};
    use crate::test_util::buffer_lines;
    use time::macros::date;

    struct NullStyler;

    impl DateStyler for NullStyler {
        fn date_style(&self, _date: Date) -> Style {
            Style::new()
        }
    }

    #[test]
    fn test_render_july_2023() {
        let frame = build_grid(date!(2023 - 07 - 19), &Gregorian::default());
        let view = MonthView::new(&frame, String::from("July 2023"), NullStyler)
            .today(date!(2023 - 07 - 04))
            .selected(date!(2023 - 07 - 19));
        assert_eq!(view.height(), 9);
        let area = Rect::new(0, 0, 46, 9);
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        let lines = buffer_lines(&buffer);
        assert_eq!(
            lines,
            [
                "                  July 2023                   ",
                " Su     Mo     Tu     We     Th     Fr     Sa ",
                "──────────────────────────────────────────────",
                " 25     26     27     28     29     30      1 ",
                "  2      3    [ 4]     5      6      7      8 ",
                "  9     10     11     12     13     14     15 ",
                " 16     17     18     19     20     21     22 ",
                " 23     24     25     26     27     28     29 ",
                " 30     31      1      2      3      4      5 ",
            ]
        );
        assert_eq!(buffer[(21, 6)].style().add_modifier, SELECTED_MODIFIER);
        assert_eq!(buffer[(0, 3)].style().fg, PADDING_STYLE.fg);
    }

    #[test]
    fn test_render_monday_header() {
        let frame = build_grid(date!(2024 - 02 - 10), &Gregorian::new(WeekStart::Monday));
        let view = MonthView::new(&frame, String::from("February 2024"), NullStyler);
        let area = Rect::new(0, 0, 46, view.height());
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        let lines = buffer_lines(&buffer);
        assert_eq!(lines[1], " Mo     Tu     We     Th     Fr     Sa     Su ");
        assert_eq!(lines[3], " 29     30     31      1      2      3      4 ");
    }

    #[test]
    fn test_render_empty_frame() {
        let frame = build_grid(Date::MAX, &Gregorian::default());
        let view = MonthView::new(&frame, String::from("December 9999"), NullStyler);
        assert_eq!(view.height(), 4);
        let area = Rect::new(0, 0, 46, 4);
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        let lines = buffer_lines(&buffer);
        assert!(lines[3].starts_with("No days to show"));
    }
}
