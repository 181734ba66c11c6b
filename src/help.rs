use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "Calendar:",
    "h, l, LEFT, RIGHT  Previous/next day",
    "k, j, UP, DOWN     Previous/next week",
    "p, PAGE UP         Previous month",
    "n, PAGE DOWN       Next month",
    "0, HOME            Jump to today",
    "a                  Add a measurement",
    "c                  Chart the month",
    "TAB                Switch to the day's list",
    "",
    "Day list:",
    "j, k, UP, DOWN     Select a measurement",
    "ENTER              Edit the measurement",
    "d, DELETE          Delete the measurement",
    "",
    "Editing:",
    "h, l, LEFT, RIGHT  Adjust by one step",
    "H, L               Adjust by one degree",
    "",
    "?                  Show this help",
    "q, ESC             Quit or go back",
    "",
    "Press the Any Key to dismiss.",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = Text::from(TEXT.iter().map(|&s| Line::raw(s)).collect::<Vec<_>>());
        // Border plus one column of padding on each side
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .saturating_add(4)
            .min(area.width);
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(area.height);
        let [popup] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [popup] = Layout::vertical([height]).flex(Flex::Center).areas(popup);
        Clear.render(popup, buf);
        Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Commands ")
                    .title_alignment(Alignment::Center)
                    .padding(Padding::horizontal(1)),
            )
            .style(self.0)
            .render(popup, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::buffer_lines;
    use crate::theme::BASE_STYLE;

    #[test]
    fn test_render() {
        let area = Rect::new(0, 0, 60, 30);
        let mut buffer = Buffer::empty(area);
        Help(BASE_STYLE).render(area, &mut buffer);
        let lines = buffer_lines(&buffer);
        let top = lines
            .iter()
            .position(|l| l.contains(" Commands "))
            .expect("popup title should be drawn");
        assert!(lines[top + 1].contains("│ Calendar:"));
        assert!(lines
            .iter()
            .any(|l| l.contains("│ H, L               Adjust by one degree ")));
        assert!(lines[top + 23].contains("│ Press the Any Key to dismiss."));
        assert!(lines[top + 24].contains("└──"));
        // Popup is centred with the background left alone
        assert!(lines[top + 1].starts_with("     "));
        assert!(lines[top + 1].ends_with("     "));
    }

    #[test]
    fn test_render_narrow() {
        for width in [40, 45, 46, 47] {
            let area = Rect::new(0, 0, width, 30);
            let mut buffer = Buffer::empty(area);
            Help(BASE_STYLE).render(area, &mut buffer);
            let lines = buffer_lines(&buffer);
            let top = lines
                .iter()
                .position(|l| l.contains(" Commands "))
                .expect("popup title should be drawn");
            assert!(lines[top].starts_with('┌'), "width {width}");
            assert!(lines[top].ends_with('┐'), "width {width}");
            assert!(lines[top + 1].starts_with("│ Calendar:"), "width {width}");
            assert!(lines[top + 24].starts_with('└'), "width {width}");
        }
    }

    #[test]
    fn test_render_tiny() {
        for (width, height) in [(1, 1), (2, 2), (10, 3)] {
            let area = Rect::new(0, 0, width, height);
            let mut buffer = Buffer::empty(area);
            Help(BASE_STYLE).render(area, &mut buffer);
            assert_eq!(buffer.area, area);
        }
        let area = Rect::new(0, 0, 80, 5);
        let mut buffer = Buffer::empty(area);
        Help(BASE_STYLE).render(area, &mut buffer);
        let lines = buffer_lines(&buffer);
        assert!(lines[0].contains(" Commands "));
        assert!(lines[1].contains("│ Calendar:"));
        assert!(lines[4].contains("└──"));
    }
}
