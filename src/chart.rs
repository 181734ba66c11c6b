use crate::store::Measurement;
use crate::theme::{
    chart::{AXIS_STYLE, LINE_STYLE},
    BASE_STYLE, TITLE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Block, Chart, Clear, Dataset, GraphType, Widget},
};
use time::{Date, PrimitiveDateTime};

const LOWEST: f64 = 35.0;
const HIGHEST: f64 = 41.0;

/// Line chart of a month's measurements.  The x axis counts days from the
/// start of the month, with the time of day as the fractional part.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MonthChart {
    title: String,
    points: Vec<(f64, f64)>,
    days: f64,
}

impl MonthChart {
    /// `records` are the measurements taken in `[start, end)`
    pub(crate) fn new(title: &str, start: Date, end: Date, records: &[Measurement]) -> Self {
        let points = records
            .iter()
            .map(|m| (day_offset(start, m.date), m.temperature))
            .collect();
        MonthChart {
            title: format!(" Temperature change in {title} "),
            points,
            days: whole_days(start, end).max(1.0),
        }
    }
}

impl Widget for MonthChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let dataset = Dataset::default()
            .name("ºC")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(LINE_STYLE)
            .data(&self.points);
        let last = self.days + 1.0;
        let x_axis = Axis::default()
            .title("Day")
            .style(AXIS_STYLE)
            .bounds([1.0, last])
            .labels(vec![
                Line::raw("1"),
                Line::raw(format!("{:.0}", (1.0 + last) / 2.0)),
                Line::raw(format!("{:.0}", self.days)),
            ]);
        let y_axis = Axis::default()
            .title("ºC")
            .style(AXIS_STYLE)
            .bounds([LOWEST, HIGHEST])
            .labels(vec![
                Line::raw(format!("{LOWEST:.1}")),
                Line::raw("38.0"),
                Line::raw(format!("{HIGHEST:.1}")),
            ]);
        Chart::new(vec![dataset])
            .block(
                Block::bordered()
                    .title(Line::styled(self.title.as_str(), TITLE_STYLE))
                    .title_alignment(Alignment::Center),
            )
            .style(BASE_STYLE)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

fn whole_days(start: Date, end: Date) -> f64 {
    i32::try_from((end - start).whole_days()).map_or(0.0, f64::from)
}

fn day_offset(start: Date, when: PrimitiveDateTime) -> f64 {
    let minutes = u16::from(when.hour()) * 60 + u16::from(when.minute());
    1.0 + whole_days(start, when.date()) + f64::from(minutes) / 1440.0
}
