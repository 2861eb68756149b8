//! Charts tab: the multi-timeframe chart grid and the focused chart's detail.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Sparkline},
};

use crate::chart_view::{
    self, MultiChartView, close_sparkline, indicator_readings, indicator_summary,
    moving_average_legend, volume_bars,
};
use crate::models::{Symbol, Timeframe};
use crate::panels::{ChartDetail, ChartSeries};
use crate::poll::PollState;
use crate::settings::IndicatorSettings;
use crate::tui::app::App;
use crate::tui::components::panel;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let settings = app.dashboard.settings();
    let view = app.dashboard.chart_view();
    let detail = app.dashboard.charts.detail.state();
    let symbol = app.dashboard.symbol();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(8)])
        .split(area);
    render_header(frame, rows[0], symbol, &settings);

    let title = format!("{symbol} - Multi-Timeframe Chart");
    panel::render(
        frame,
        rows[1],
        &title,
        &app.dashboard.charts.batch.state(),
        |f, a, series| match view.expanded() {
            Some(expanded) => render_expanded(f, a, view, series, expanded, &detail, &settings),
            None => render_grid(f, a, view, series, &detail, &settings),
        },
    );
}

fn render_header(frame: &mut Frame, area: Rect, symbol: &Symbol, settings: &IndicatorSettings) {
    let mut legend: Vec<Span> = vec![Span::raw(format!("{symbol}  "))];
    for (label, color) in moving_average_legend(settings) {
        legend.push(Span::styled("━ ", Style::default().fg(color)));
        legend.push(Span::raw(format!("{label}  ")));
    }
    let lines = vec![
        Line::from(legend),
        Line::from(Span::styled(
            format!(
                "Indicators: {}   ←/→ focus  Enter expand",
                indicator_summary(settings)
            ),
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_grid(
    frame: &mut Frame,
    area: Rect,
    view: &MultiChartView,
    series: &ChartSeries,
    detail: &PollState<ChartDetail>,
    settings: &IndicatorSettings,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
        ])
        .split(area);
    let cells: Vec<Rect> = rows[..2]
        .iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect();

    for (timeframe, cell) in view.timeframes().iter().zip(cells) {
        render_cell(frame, cell, *timeframe, series, view, false);
    }
    render_detail(frame, rows[2], view.focused(), detail, settings);
}

fn render_expanded(
    frame: &mut Frame,
    area: Rect,
    view: &MultiChartView,
    series: &ChartSeries,
    expanded: Timeframe,
    detail: &PollState<ChartDetail>,
    settings: &IndicatorSettings,
) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(area);
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .split(columns[0]);

    render_cell(frame, main[0], expanded, series, view, true);
    render_detail(frame, main[1], view.focused(), detail, settings);

    let sidebar = view.sidebar();
    if sidebar.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, sidebar.len() as u32); sidebar.len()];
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(columns[1]);
    for (timeframe, slot) in sidebar.iter().zip(slots.iter()) {
        render_cell(frame, *slot, *timeframe, series, view, false);
    }
}

fn render_cell(
    frame: &mut Frame,
    area: Rect,
    timeframe: Timeframe,
    series: &ChartSeries,
    view: &MultiChartView,
    expanded: bool,
) {
    let data = series.get(&timeframe);
    let color = data.map_or(Color::Gray, |d| chart_view::trend_color(d.trend));
    let focused = view.focused() == timeframe;

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    if expanded {
        block = block.border_type(BorderType::Thick);
    }
    if focused {
        block = block.title(Span::styled(
            format!(" ▶ {timeframe} "),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    } else {
        block = block.title(format!(" {timeframe} "));
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(data) = data else {
        frame.render_widget(
            Paragraph::new("-").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", chart_view::trend_label(data.trend)),
            Style::default().fg(Color::Black).bg(color),
        )),
        Line::from(Span::styled(
            data.price
                .map_or_else(|| "--".to_string(), |price| format!("{price:.2}")),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Strength {:.0}%", data.strength),
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_detail(
    frame: &mut Frame,
    area: Rect,
    timeframe: Timeframe,
    detail: &PollState<ChartDetail>,
    settings: &IndicatorSettings,
) {
    panel::render(
        frame,
        area,
        &format!("{timeframe} detail"),
        detail,
        |f, a, detail| {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(a);

            let charts = if settings.volume.enabled {
                Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                    .split(columns[0])
            } else {
                Layout::default()
                    .constraints([Constraint::Percentage(100)])
                    .split(columns[0])
            };

            let points = close_sparkline(&detail.history);
            f.render_widget(
                Sparkline::default()
                    .block(Block::default().title("Close"))
                    .data(&points)
                    .max(100)
                    .style(Style::default().fg(Color::Cyan)),
                charts[0],
            );
            if settings.volume.enabled {
                let volumes = volume_bars(&detail.history);
                f.render_widget(
                    Sparkline::default()
                        .block(Block::default().title("Volume"))
                        .data(&volumes)
                        .style(Style::default().fg(Color::DarkGray)),
                    charts[1],
                );
            }

            let lines: Vec<Line> = indicator_readings(settings, &detail.indicators)
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label:<12}"), Style::default().fg(Color::Gray)),
                        Span::raw(value),
                    ])
                })
                .collect();
            f.render_widget(Paragraph::new(lines), columns[1]);
        },
    );
}
