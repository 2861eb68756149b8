//! One render module per dashboard tab.

pub mod charts;
pub mod news;
pub mod overview;
pub mod signals;
pub mod trend;

use ratatui::style::Color;

use crate::models::{NewsImpact, SignalStrength, TrendDirection};

fn trend_color(direction: TrendDirection) -> Color {
    match direction {
        TrendDirection::Bullish => Color::Green,
        TrendDirection::Bearish => Color::Red,
        TrendDirection::Sideways => Color::Yellow,
        TrendDirection::Unknown => Color::Gray,
    }
}

fn signal_color(signal: SignalStrength) -> Color {
    if signal.is_buy() {
        Color::Green
    } else if signal.is_sell() {
        Color::Red
    } else {
        Color::Gray
    }
}

fn impact_color(impact: NewsImpact) -> Color {
    match impact {
        NewsImpact::Critical => Color::Magenta,
        NewsImpact::High => Color::Red,
        NewsImpact::Medium => Color::Yellow,
        NewsImpact::Low => Color::Gray,
    }
}

/// Sentiment score bucketed at ±0.2.
fn sentiment_label(score: f64) -> (&'static str, Color) {
    if score > 0.2 {
        ("Positive", Color::Green)
    } else if score < -0.2 {
        ("Negative", Color::Red)
    } else {
        ("Neutral", Color::Gray)
    }
}

/// Percentage in `0..=100` as a gauge ratio. Non-finite input reads as zero.
fn gauge_ratio(percent: f64) -> f64 {
    if percent.is_finite() {
        percent.clamp(0.0, 100.0) / 100.0
    } else {
        0.0
    }
}
