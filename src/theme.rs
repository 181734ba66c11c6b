use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

/// Days of the adjacent months that pad out the first & last weeks
pub(crate) const PADDING_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

/// Days on which at least one measurement was taken
pub(crate) const MEASURED_STYLE: Style = BASE_STYLE.fg(Color::LightBlue);

pub(crate) const FEVER_STYLE: Style = BASE_STYLE.fg(Color::LightRed).add_modifier(Modifier::BOLD);

pub(crate) const SELECTED_MODIFIER: Modifier = Modifier::REVERSED;

pub(crate) const FOCUSED_BORDER_STYLE: Style = BASE_STYLE.fg(Color::LightYellow);

pub(crate) const UNFOCUSED_BORDER_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const MUTED_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) mod chart {
    use super::*;

    pub(crate) const LINE_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

    pub(crate) const AXIS_STYLE: Style = BASE_STYLE.fg(Color::Gray);
}
