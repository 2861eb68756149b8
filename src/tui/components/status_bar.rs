//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::dashboard::HiddenPanelPolicy;
use crate::tui::app::{App, BackendStatus, Mode};

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let status_color = match app.backend {
        BackendStatus::Healthy => Color::Green,
        BackendStatus::Unknown => Color::Yellow,
        BackendStatus::Unreachable(_) => Color::Red,
    };

    let live_color = if app.live.market && app.live.news {
        Color::Green
    } else {
        Color::Gray
    };

    let mode_label = match app.mode {
        Mode::Normal => " NORMAL ",
        Mode::Insert => " SYMBOL ",
        Mode::Settings => " SETTINGS ",
    };

    let policy_label = match app.dashboard.policy() {
        HiddenPanelPolicy::Suspend => " hidden: paused ",
        HiddenPanelPolicy::KeepPolling => " hidden: polling ",
    };

    let error_span = if let Some(ref error) = app.error_message {
        Span::styled(
            format!(" {} ", error.message),
            Style::default().fg(Color::Red),
        )
    } else {
        Span::raw("")
    };

    let hints = " / symbol  r refresh  s settings  q quit ";

    let spans = vec![
        Span::styled(mode_label, Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::styled(
            format!(" {} ", app.backend.label()),
            Style::default().fg(status_color),
        ),
        Span::styled(
            format!(" {} ", app.live.label()),
            Style::default().fg(live_color),
        ),
        Span::raw("│"),
        Span::styled(
            format!(" {} ", app.dashboard.symbol()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("│"),
        Span::styled(policy_label, Style::default().fg(Color::Gray)),
        Span::raw("│"),
        error_span,
        Span::raw(format!(
            "{:>width$}",
            hints,
            width = area.width.saturating_sub(60) as usize
        )),
    ];

    let para = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
