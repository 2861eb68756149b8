use rust_decimal::Decimal;
use serde::Deserialize;

use super::Timeframe;

/// Discrete trading recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

impl SignalStrength {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            SignalStrength::StrongBuy => "STRONG BUY",
            SignalStrength::Buy => "BUY",
            SignalStrength::Neutral => "NEUTRAL",
            SignalStrength::Sell => "SELL",
            SignalStrength::StrongSell => "STRONG SELL",
        }
    }

    /// Returns `true` for buy-side recommendations.
    pub fn is_buy(&self) -> bool {
        matches!(self, SignalStrength::StrongBuy | SignalStrength::Buy)
    }

    /// Returns `true` for sell-side recommendations.
    pub fn is_sell(&self) -> bool {
        matches!(self, SignalStrength::StrongSell | SignalStrength::Sell)
    }
}

/// Trading signal for a symbol and timeframe.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TradingSignal {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub signal: SignalStrength,
    /// Confidence on a 0-100 scale.
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss: Option<Decimal>,
    #[serde(default)]
    pub take_profit: Option<Decimal>,
    pub timestamp: String,
}
