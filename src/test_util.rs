use ratatui::buffer::Buffer;

/// The text of each row of `buf`
pub(crate) fn buffer_lines(buf: &Buffer) -> Vec<String> {
    buf.content
        .chunks(usize::from(buf.area.width))
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect()
}
