//! Bordered panel that renders a polled resource according to its state.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use crate::poll::PollState;

/// Draws a titled block and fills it with `body` once `state` is ready.
///
/// Loading and failed states show a short notice instead of the body.
pub fn render<T>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    state: &PollState<T>,
    body: impl FnOnce(&mut Frame, Rect, &T),
) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match state {
        PollState::Ready(value) => body(frame, inner, value.as_ref()),
        PollState::Loading => notice(frame, inner, "Loading...", Color::Gray),
        PollState::Failed => notice(frame, inner, "No data available", Color::Red),
    }
}

fn notice(frame: &mut Frame, area: Rect, text: &str, color: Color) {
    let para = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    frame.render_widget(para, area);
}
