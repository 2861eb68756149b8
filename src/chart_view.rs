//! View model of the multi-timeframe chart grid.
//!
//! Tracks which timeframe has focus and which, if any, is expanded, and
//! derives the display values the chart cells show from the chart batch,
//! the chart detail and the committed indicator settings.

use ratatui::style::Color;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{Candle, TechnicalIndicators, Timeframe, TrendDirection};
use crate::settings::{Indicator, IndicatorSettings};

/// Height of the close-price sparkline, in sparkline units.
const SPARKLINE_SCALE: u64 = 100;

#[derive(Clone, Debug)]
pub struct MultiChartView {
    timeframes: Vec<Timeframe>,
    focused: usize,
    expanded: Option<Timeframe>,
}

impl MultiChartView {
    pub fn new(timeframes: Vec<Timeframe>) -> Self {
        Self {
            timeframes,
            focused: 0,
            expanded: None,
        }
    }

    pub fn timeframes(&self) -> &[Timeframe] {
        &self.timeframes
    }

    /// The timeframe with keyboard focus.
    pub fn focused(&self) -> Timeframe {
        self.timeframes
            .get(self.focused)
            .copied()
            .unwrap_or_default()
    }

    pub fn expanded(&self) -> Option<Timeframe> {
        self.expanded
    }

    pub fn focus_next(&mut self) {
        if !self.timeframes.is_empty() {
            self.focused = (self.focused + 1) % self.timeframes.len();
        }
    }

    pub fn focus_previous(&mut self) {
        if !self.timeframes.is_empty() {
            self.focused = self
                .focused
                .checked_sub(1)
                .unwrap_or(self.timeframes.len() - 1);
        }
    }

    /// Expands `timeframe`, or collapses it if it is the expanded one.
    pub fn toggle_expanded(&mut self, timeframe: Timeframe) {
        self.expanded = if self.expanded == Some(timeframe) {
            None
        } else {
            Some(timeframe)
        };
    }

    /// Timeframes shown beside the expanded chart.
    pub fn sidebar(&self) -> Vec<Timeframe> {
        match self.expanded {
            Some(expanded) => self
                .timeframes
                .iter()
                .copied()
                .filter(|tf| *tf != expanded)
                .collect(),
            None => Vec::new(),
        }
    }
}

pub fn trend_color(direction: TrendDirection) -> Color {
    match direction {
        TrendDirection::Bullish => Color::Rgb(0x4C, 0xAF, 0x50),
        TrendDirection::Bearish => Color::Rgb(0xF4, 0x43, 0x36),
        TrendDirection::Sideways => Color::Rgb(0xFF, 0x98, 0x00),
        TrendDirection::Unknown => Color::Rgb(0x9E, 0x9E, 0x9E),
    }
}

/// Short trend label for a chart cell header.
pub fn trend_label(direction: TrendDirection) -> &'static str {
    match direction {
        TrendDirection::Bullish => "Up",
        TrendDirection::Bearish => "Down",
        TrendDirection::Sideways => "Range",
        TrendDirection::Unknown => "-",
    }
}

/// Enabled indicator keys, upper-cased and comma separated, or `none`.
pub fn indicator_summary(settings: &IndicatorSettings) -> String {
    let enabled: Vec<String> = settings
        .enabled()
        .into_iter()
        .map(|i| i.key().to_uppercase())
        .collect();
    if enabled.is_empty() {
        "none".to_string()
    } else {
        enabled.join(", ")
    }
}

/// Parses a `#rrggbb` string into a terminal color.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    Some(Color::Rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

/// Moving-average lines of the enabled families as `(label, color)`.
pub fn moving_average_legend(settings: &IndicatorSettings) -> Vec<(String, Color)> {
    let mut legend = Vec::new();
    for (name, family) in [("SMA", &settings.sma), ("EMA", &settings.ema)] {
        if !family.enabled {
            continue;
        }
        for (period, color) in family.lines() {
            legend.push((
                format!("{name} {period}"),
                parse_hex_color(color).unwrap_or(Color::Gray),
            ));
        }
    }
    legend
}

/// Indicator values of the enabled categories as `(label, value)` rows.
///
/// The backend reports moving averages for a fixed set of periods; a
/// configured period outside that set shows as `n/a`.
pub fn indicator_readings(
    settings: &IndicatorSettings,
    values: &TechnicalIndicators,
) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    for indicator in settings.enabled() {
        match indicator {
            Indicator::Sma => {
                for &period in settings.sma.periods() {
                    let value = match period {
                        20 => values.sma_20,
                        50 => values.sma_50,
                        200 => values.sma_200,
                        _ => None,
                    };
                    rows.push((format!("SMA {period}"), reading(value)));
                }
            }
            Indicator::Ema => {
                for &period in settings.ema.periods() {
                    let value = match period {
                        12 => values.ema_12,
                        26 => values.ema_26,
                        _ => None,
                    };
                    rows.push((format!("EMA {period}"), reading(value)));
                }
            }
            Indicator::Rsi => rows.push((format!("RSI {}", settings.rsi.period), reading(values.rsi))),
            Indicator::Macd => {
                rows.push(("MACD".to_string(), reading(values.macd)));
                rows.push(("MACD signal".to_string(), reading(values.macd_signal)));
                rows.push(("MACD hist".to_string(), reading(values.macd_histogram)));
            }
            Indicator::Stochastic => {
                rows.push(("Stoch %K".to_string(), reading(values.stoch_k)));
                rows.push(("Stoch %D".to_string(), reading(values.stoch_d)));
            }
            Indicator::BollingerBands => {
                rows.push(("BB upper".to_string(), reading(values.bb_upper)));
                rows.push(("BB middle".to_string(), reading(values.bb_middle)));
                rows.push(("BB lower".to_string(), reading(values.bb_lower)));
            }
            Indicator::Atr => rows.push((format!("ATR {}", settings.atr.period), reading(values.atr))),
            Indicator::Obv => rows.push(("OBV".to_string(), reading(values.obv))),
            // Volume is drawn from the candle history, not reported here.
            Indicator::Volume => {}
        }
    }
    rows
}

fn reading(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Close prices scaled into `0..=100` for a sparkline.
pub fn close_sparkline(history: &[Candle]) -> Vec<u64> {
    let Some(min) = history.iter().map(|c| c.close).min() else {
        return Vec::new();
    };
    let max = history.iter().map(|c| c.close).max().unwrap_or(min);
    let range = max - min;
    history
        .iter()
        .map(|c| {
            if range.is_zero() {
                SPARKLINE_SCALE / 2
            } else {
                ((c.close - min) * Decimal::from(SPARKLINE_SCALE) / range)
                    .round()
                    .to_u64()
                    .unwrap_or(0)
            }
        })
        .collect()
}

/// Volumes of the history, truncated to whole units.
pub fn volume_bars(history: &[Candle]) -> Vec<u64> {
    history.iter().map(|c| c.volume.max(0.0) as u64).collect()
}
