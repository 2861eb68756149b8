//! News tab: headlines, sentiment and the economic calendar.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use crate::models::{EconomicEvent, MarketSentiment, NewsItem};
use crate::tui::app::App;
use crate::tui::components::panel;

use super::{impact_color, sentiment_label};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(5)])
        .split(columns[1]);

    let news = &app.dashboard.news;
    panel::render(frame, columns[0], "Latest News", &news.news.state(), |f, a, items| {
        render_news(f, a, items)
    });
    panel::render(frame, side[0], "Sentiment", &news.sentiment.state(), render_sentiment);
    panel::render(
        frame,
        side[1],
        "Economic Calendar",
        &news.calendar.state(),
        |f, a, events| render_calendar(f, a, events),
    );
}

fn render_news(frame: &mut Frame, area: Rect, items: &[NewsItem]) {
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new("No news").style(Style::default().fg(Color::Gray)),
            area,
        );
        return;
    }

    let list_items: Vec<ListItem> = items
        .iter()
        .map(|item| {
            let (sentiment, sentiment_color) = sentiment_label(item.sentiment);
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:<8} ", item.impact.label()),
                        Style::default().fg(impact_color(item.impact)),
                    ),
                    Span::styled(
                        item.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled(
                        format!("         {} · {} · ", item.source, item.published_at),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(sentiment, Style::default().fg(sentiment_color)),
                ]),
            ];
            if !item.tags.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("         #{}", item.tags.join(" #")),
                    Style::default().fg(Color::Blue),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    frame.render_widget(List::new(list_items), area);
}

fn render_sentiment(frame: &mut Frame, area: Rect, sentiment: &MarketSentiment) {
    let (label, color) = sentiment_label(sentiment.overall_sentiment);
    let mut lines = vec![
        Line::from(vec![
            Span::raw("Overall "),
            Span::styled(
                format!("{label} ({:+.2})", sentiment.overall_sentiment),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!(
            "News {:+.2}  Technical {:+.2}",
            sentiment.news_sentiment, sentiment.technical_sentiment
        )),
    ];
    if let Some(social) = sentiment.social_sentiment {
        lines.push(Line::from(format!("Social {social:+.2}")));
    }
    lines.push(Line::from(vec![
        Span::styled(
            format!("▲ {} ", sentiment.bullish_count),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("▼ {} ", sentiment.bearish_count),
            Style::default().fg(Color::Red),
        ),
        Span::styled(
            format!("■ {}", sentiment.neutral_count),
            Style::default().fg(Color::Gray),
        ),
    ]));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_calendar(frame: &mut Frame, area: Rect, events: &[EconomicEvent]) {
    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "--".to_string());
    let items: Vec<ListItem> = events
        .iter()
        .map(|event| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:<8} ", event.impact.label()),
                        Style::default().fg(impact_color(event.impact)),
                    ),
                    Span::raw(format!("{} {} ", event.country, event.currency)),
                    Span::styled(
                        event.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(
                        "         {}  A {}  F {}  P {}",
                        event.event_time,
                        dash(&event.actual),
                        dash(&event.forecast),
                        dash(&event.previous)
                    ),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();
    frame.render_widget(List::new(items), area);
}
