//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::dashboard::DashboardTab;

use super::app::{App, Mode};
use super::components::{status_bar, tab_bar};
use super::settings_dialog;
use super::tabs::{charts, news, overview, signals, trend};

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Symbol input
            Constraint::Length(1), // Tab bar
            Constraint::Min(10),   // Active tab
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_symbol_input(frame, layout[0], app);
    tab_bar::render(frame, layout[1], app);

    match app.current_tab() {
        DashboardTab::Overview => overview::render(frame, layout[2], app),
        DashboardTab::Trend => trend::render(frame, layout[2], app),
        DashboardTab::Signals => signals::render(frame, layout[2], app),
        DashboardTab::News => news::render(frame, layout[2], app),
        DashboardTab::Charts => charts::render(frame, layout[2], app),
    }

    status_bar::render(frame, layout[3], app);

    if app.mode == Mode::Settings {
        settings_dialog::render(frame, area, app);
    }
}

/// Renders the pending symbol field next to the symbol under analysis.
fn render_symbol_input(frame: &mut Frame, area: Rect, app: &App) {
    let editing = app.mode == Mode::Insert;
    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .title(" Symbol (/ to edit, Enter to analyze) ")
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = Line::from(vec![
        Span::raw(app.symbol_input.as_str().to_string()),
        Span::raw("   "),
        Span::styled(
            format!("analyzing {}", app.dashboard.symbol()),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), inner);

    if editing {
        let x = inner.x + app.symbol_input.cursor() as u16;
        frame.set_cursor_position(Position::new(x.min(inner.right().saturating_sub(1)), inner.y));
    }
}
