use crate::config::TemperatureRange;
use crate::store::Measurement;
use crate::theme::{BASE_STYLE, FEVER_STYLE, MUTED_STYLE, TITLE_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Clear, LineGauge, Paragraph, Widget},
};
use time::{format_description::FormatItem, macros::format_description};

static DATE_FMT: &[FormatItem<'_>] =
    format_description!("[month repr:long] [day], [year] [hour]:[minute]");

const WIDTH: u16 = 44;
const HEIGHT: u16 = 11;

/// Popup for editing a single measurement's temperature.  Shows a
/// placeholder when the measurement no longer exists.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DetailView<'a> {
    measurement: Option<&'a Measurement>,
    range: TemperatureRange,
}

impl<'a> DetailView<'a> {
    pub(crate) fn new(measurement: Option<&'a Measurement>, range: TemperatureRange) -> Self {
        DetailView { measurement, range }
    }
}

impl Widget for DetailView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [popup] = Layout::horizontal([WIDTH]).flex(Flex::Center).areas(area);
        let [popup] = Layout::vertical([HEIGHT]).flex(Flex::Center).areas(popup);
        Clear.render(popup, buf);
        let block = Block::bordered()
            .title(" Details ")
            .title_alignment(Alignment::Center)
            .style(BASE_STYLE);
        let inner = block.inner(popup).inner(Margin::new(1, 0));
        block.render(popup, buf);
        let Some(m) = self.measurement else {
            let [line] = Layout::vertical([Constraint::Length(1)])
                .flex(Flex::Center)
                .areas(inner);
            Paragraph::new("No measurement")
                .style(MUTED_STYLE)
                .alignment(Alignment::Center)
                .render(line, buf);
            return;
        };
        let [date_hdr, date, _, temp_hdr, gauge, reading, _, keys] =
            Layout::vertical([Constraint::Length(1); 8]).areas(inner);
        Line::styled("Date", TITLE_STYLE).render(date_hdr, buf);
        Line::raw(m.date.format(&DATE_FMT).unwrap_or_default()).render(date, buf);
        Line::styled("Temperature", TITLE_STYLE).render(temp_hdr, buf);
        let style = if self.range.is_fever(m.temperature) {
            FEVER_STYLE
        } else {
            BASE_STYLE
        };
        LineGauge::default()
            .ratio(self.range.ratio(m.temperature))
            .label(format!("{:.1}", self.range.min))
            .filled_style(style)
            .unfilled_style(MUTED_STYLE)
            .render(gauge, buf);
        let [_, max_label] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(5)]).areas(gauge);
        Line::styled(format!(" {:.1}", self.range.max), Style::new()).render(max_label, buf);
        Line::from_iter([
            Span::raw("Your temperature is "),
            Span::styled(format!("{:.1}ºC", m.temperature), style),
        ])
        .render(reading, buf);
        Line::styled("←/→ adjust  H/L ±1  d delete  Esc back", MUTED_STYLE).render(keys, buf);
    }
}
