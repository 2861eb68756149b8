use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::Timeframe;
use super::signal::SignalStrength;

/// Trend classification computed by the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Sideways,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TrendDirection {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Bullish => "Bullish",
            TrendDirection::Bearish => "Bearish",
            TrendDirection::Sideways => "Sideways",
            TrendDirection::Unknown => "-",
        }
    }
}

/// Trend analysis for one timeframe.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrendAnalysis {
    pub timeframe: Timeframe,
    pub direction: TrendDirection,
    /// Strength on a 0-100 scale.
    pub strength: f64,
    #[serde(default)]
    pub support_levels: Vec<Decimal>,
    #[serde(default)]
    pub resistance_levels: Vec<Decimal>,
    #[serde(default)]
    pub description: String,
}

/// Latest indicator values for a symbol and timeframe.
///
/// Every value is optional: the backend omits indicators it could not
/// compute from the available history.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TechnicalIndicators {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub timestamp: String,
    #[serde(default)]
    pub sma_20: Option<f64>,
    #[serde(default)]
    pub sma_50: Option<f64>,
    #[serde(default)]
    pub sma_200: Option<f64>,
    #[serde(default)]
    pub ema_12: Option<f64>,
    #[serde(default)]
    pub ema_26: Option<f64>,
    #[serde(default)]
    pub macd: Option<f64>,
    #[serde(default)]
    pub macd_signal: Option<f64>,
    #[serde(default)]
    pub macd_histogram: Option<f64>,
    #[serde(default)]
    pub rsi: Option<f64>,
    #[serde(default)]
    pub stoch_k: Option<f64>,
    #[serde(default)]
    pub stoch_d: Option<f64>,
    #[serde(default)]
    pub bb_upper: Option<f64>,
    #[serde(default)]
    pub bb_middle: Option<f64>,
    #[serde(default)]
    pub bb_lower: Option<f64>,
    #[serde(default)]
    pub atr: Option<f64>,
    #[serde(default)]
    pub obv: Option<f64>,
    #[serde(default)]
    pub vwap: Option<f64>,
}

/// Trend analyses across several timeframes with a consensus verdict.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MultiTimeframeAnalysis {
    pub symbol: String,
    pub timestamp: String,
    pub current_price: Decimal,
    pub analyses: BTreeMap<Timeframe, TrendAnalysis>,
    pub overall_trend: TrendDirection,
    pub consensus_signal: SignalStrength,
    #[serde(default)]
    pub summary: String,
}
