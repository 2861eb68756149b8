use rust_decimal::Decimal;
use serde::Deserialize;

/// Latest price information for a symbol.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MarketQuote {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default)]
    pub bid: Option<Decimal>,
    #[serde(default)]
    pub ask: Option<Decimal>,
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub change: Option<Decimal>,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    pub timestamp: String,
}

/// Direction of the latest price change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceMovement {
    Up,
    Down,
    Flat,
}

impl MarketQuote {
    /// Classifies the reported change; a missing change counts as flat.
    pub fn movement(&self) -> PriceMovement {
        match self.change {
            Some(change) if change > Decimal::ZERO => PriceMovement::Up,
            Some(change) if change < Decimal::ZERO => PriceMovement::Down,
            _ => PriceMovement::Flat,
        }
    }
}
