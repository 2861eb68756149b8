//! Signals tab: one trading signal per dashboard timeframe, fetched together.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::models::TradingSignal;
use crate::tui::app::App;
use crate::tui::components::panel;

use super::{gauge_ratio, signal_color};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    panel::render(
        frame,
        area,
        "Signals",
        &app.dashboard.signals.all.state(),
        |frame, area, signals| render_grid(frame, area, signals),
    );
}

/// Lays the signals out two by two, one cell per timeframe.
fn render_grid(frame: &mut Frame, area: Rect, signals: &[TradingSignal]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let cells: Vec<Rect> = rows
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (signal, cell) in signals.iter().zip(cells) {
        let block = Block::default()
            .title(format!(" {} ", signal.timeframe))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(cell);
        frame.render_widget(block, cell);
        render_signal(frame, inner, signal);
    }
}

/// Signal verdict, confidence gauge, levels and reasons.
pub fn render_signal(frame: &mut Frame, area: Rect, signal: &TradingSignal) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let color = signal_color(signal.signal);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", signal.signal.label()),
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {} {}", signal.symbol, signal.timeframe)),
        ])),
        chunks[0],
    );

    let ratio = gauge_ratio(signal.confidence);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(ratio)
            .label(format!("Confidence {:.0}%", ratio * 100.0)),
        chunks[1],
    );

    let level = |name: &str, value: Option<rust_decimal::Decimal>| {
        value.map(|v| format!("{name} {v:.2}"))
    };
    let levels: Vec<String> = [
        level("Entry", signal.entry_price),
        level("Stop", signal.stop_loss),
        level("Target", signal.take_profit),
    ]
    .into_iter()
    .flatten()
    .collect();
    frame.render_widget(Paragraph::new(levels.join("  ")), chunks[2]);

    let reasons: Vec<Line> = signal
        .reasons
        .iter()
        .map(|r| Line::from(format!("• {r}")))
        .collect();
    frame.render_widget(
        Paragraph::new(reasons).wrap(Wrap { trim: true }),
        chunks[3],
    );
}
