use rust_decimal::Decimal;
use serde::Deserialize;

/// One OHLCV bar from the history endpoint.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Candle {
    pub timestamp: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: f64,
}
