//! Trend tab: per-timeframe trend analyses and the consensus verdict.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};
use rust_decimal::Decimal;

use crate::models::MultiTimeframeAnalysis;
use crate::panels::TrendSeries;
use crate::tui::app::App;
use crate::tui::components::panel;

use super::{gauge_ratio, signal_color, trend_color};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(9)])
        .split(area);

    let trend = &app.dashboard.trend;
    panel::render(frame, rows[0], "Trend Analysis", &trend.trend.state(), render_series);
    panel::render(
        frame,
        rows[1],
        "Multi-Timeframe Consensus",
        &trend.consensus.state(),
        render_consensus,
    );
}

/// One column per timeframe with direction, strength and key levels.
pub fn render_series(frame: &mut Frame, area: Rect, series: &TrendSeries) {
    if series.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, series.len() as u32); series.len()];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for ((timeframe, analysis), column) in series.iter().zip(columns.iter()) {
        let color = trend_color(analysis.direction);
        let block = Block::default()
            .title(format!(" {timeframe} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let inner = block.inner(*column);
        frame.render_widget(block, *column);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                analysis.direction.label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            chunks[0],
        );
        let ratio = gauge_ratio(analysis.strength);
        frame.render_widget(
            Gauge::default()
                .gauge_style(Style::default().fg(color))
                .ratio(ratio)
                .label(format!("Strength {:.0}%", ratio * 100.0)),
            chunks[1],
        );

        let mut lines = vec![
            Line::from(format!("Support {}", levels(&analysis.support_levels))),
            Line::from(format!("Resistance {}", levels(&analysis.resistance_levels))),
        ];
        if !analysis.description.is_empty() {
            lines.push(Line::from(Span::styled(
                analysis.description.clone(),
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[2]);
    }
}

fn levels(values: &[Decimal]) -> String {
    if values.is_empty() {
        return "--".to_string();
    }
    values
        .iter()
        .take(3)
        .map(|v| format!("{v:.2}"))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn render_consensus(frame: &mut Frame, area: Rect, analysis: &MultiTimeframeAnalysis) {
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Overall "),
            Span::styled(
                analysis.overall_trend.label(),
                Style::default()
                    .fg(trend_color(analysis.overall_trend))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   Consensus "),
            Span::styled(
                analysis.consensus_signal.label(),
                Style::default()
                    .fg(signal_color(analysis.consensus_signal))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("   Price {:.2}", analysis.current_price)),
        ]),
        Line::from(
            analysis
                .analyses
                .iter()
                .flat_map(|(tf, a)| {
                    [
                        Span::raw(format!("{tf} ")),
                        Span::styled(
                            format!("{}  ", a.direction.label()),
                            Style::default().fg(trend_color(a.direction)),
                        ),
                    ]
                })
                .collect::<Vec<_>>(),
        ),
    ];
    if !analysis.summary.is_empty() {
        lines.push(Line::from(Span::styled(
            analysis.summary.clone(),
            Style::default().fg(Color::Gray),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
