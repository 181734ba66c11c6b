use crate::config::TemperatureRange;
use crate::store::Measurement;
use crate::theme::{
    BASE_STYLE, FEVER_STYLE, FOCUSED_BORDER_STYLE, MUTED_STYLE, UNFOCUSED_BORDER_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph, StatefulWidget, Widget},
};
use time::{format_description::FormatItem, macros::format_description};

static TIME_FMT: &[FormatItem<'_>] = format_description!("[hour]:[minute]");

/// The measurements taken on the selected day
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DayList<'a> {
    title: &'a str,
    records: &'a [Measurement],
    range: TemperatureRange,
    focused: bool,
}

impl<'a> DayList<'a> {
    pub(crate) fn new(title: &'a str, records: &'a [Measurement], range: TemperatureRange) -> Self {
        DayList {
            title,
            records,
            range,
            focused: false,
        }
    }

    pub(crate) fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn item(&self, m: &Measurement) -> ListItem<'static> {
        let time = m.date.format(&TIME_FMT).unwrap_or_default();
        let style = if self.range.is_fever(m.temperature) {
            FEVER_STYLE
        } else {
            BASE_STYLE
        };
        ListItem::new(Line::from_iter([
            Span::styled(format!("{time}  "), MUTED_STYLE),
            Span::styled(format!("{:.1}ºC", m.temperature), style),
        ]))
    }
}

impl StatefulWidget for DayList<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut ListState) {
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(if self.focused {
                FOCUSED_BORDER_STYLE
            } else {
                UNFOCUSED_BORDER_STYLE
            })
            .style(BASE_STYLE);
        if self.records.is_empty() {
            Paragraph::new("No measurements")
                .style(MUTED_STYLE)
                .block(block)
                .render(area, buf);
            return;
        }
        let items = self.records.iter().map(|m| self.item(m)).collect::<Vec<_>>();
        let highlight = if self.focused {
            Style::new().add_modifier(Modifier::REVERSED)
        } else {
            Style::new().add_modifier(Modifier::BOLD)
        };
        let list = List::new(items)
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("▶ ");
        StatefulWidget::render(list, area, buf, state);
    }
}
