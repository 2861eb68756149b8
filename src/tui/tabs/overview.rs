//! Overview tab: quote card, hourly signal and the trend strip.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use rust_decimal::Decimal;

use crate::models::{MarketQuote, PriceMovement};
use crate::tui::app::App;
use crate::tui::components::panel;

use super::{signals, trend};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(8)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);

    let overview = &app.dashboard.overview;
    panel::render(frame, top[0], "Quote", &overview.quote.state(), render_quote);
    panel::render(
        frame,
        top[1],
        "Signal (1h)",
        &overview.signal.state(),
        signals::render_signal,
    );
    panel::render(
        frame,
        rows[1],
        "Trend",
        &overview.trend.state(),
        trend::render_series,
    );
}

fn render_quote(frame: &mut Frame, area: Rect, quote: &MarketQuote) {
    let (arrow, color) = match quote.movement() {
        PriceMovement::Up => ("▲", Color::Green),
        PriceMovement::Down => ("▼", Color::Red),
        PriceMovement::Flat => ("■", Color::Gray),
    };
    let change = quote.change.unwrap_or(Decimal::ZERO);
    let change_pct = quote.change_percent.unwrap_or(Decimal::ZERO);
    let opt = |v: Option<Decimal>| v.map_or_else(|| "--".to_string(), |v| format!("{v:.2}"));

    let mut lines = vec![
        Line::from(Span::styled(
            quote.symbol.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("{:.2} ", quote.price),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{arrow} {change:+.2} ({change_pct:+.2}%)"),
                Style::default().fg(color),
            ),
        ]),
        Line::from(format!("Bid {}  Ask {}", opt(quote.bid), opt(quote.ask))),
        Line::from(format!("High {}  Low {}", opt(quote.high), opt(quote.low))),
    ];
    if let Some(volume) = quote.volume {
        lines.push(Line::from(format!("Volume {volume:.0}")));
    }
    lines.push(Line::from(Span::styled(
        format!("Updated {}", quote.timestamp),
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}
