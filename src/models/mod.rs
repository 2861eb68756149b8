//! Shared models for the market analysis REST API.
//!
//! Contains the request-side vocabulary ([`Symbol`], [`Timeframe`]) and the
//! response snapshots returned by each endpoint. Snapshots are treated as
//! opaque immutable values: the dashboard never merges them, it replaces
//! the held value on every successful fetch.

pub mod analysis;
pub mod candle;
pub mod news;
pub mod quote;
pub mod signal;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use analysis::{MultiTimeframeAnalysis, TechnicalIndicators, TrendAnalysis, TrendDirection};
pub use candle::Candle;
pub use news::{EconomicEvent, MarketSentiment, NewsImpact, NewsItem};
pub use quote::{MarketQuote, PriceMovement};
pub use signal::{SignalStrength, TradingSignal};

/// Symbol analyzed when nothing else has been chosen.
pub const DEFAULT_SYMBOL: &str = "AAPL";

/// Timeframes shown side by side on the dashboard.
pub const DASHBOARD_TIMEFRAMES: [Timeframe; 4] =
    [Timeframe::M15, Timeframe::H1, Timeframe::H4, Timeframe::D1];

/// An upper-cased ticker identifying a tradable instrument.
///
/// No validation against a known-symbol set is performed; an unknown symbol
/// simply yields error responses from the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes user input into a symbol by trimming and upper-casing it.
    ///
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    /// Returns the ticker text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self(DEFAULT_SYMBOL.to_string())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candle aggregation period used as a request parameter.
///
/// Variants are declared from shortest to longest so the derived ordering
/// sorts timeframes chronologically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "45m")]
    M45,
    #[default]
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
    #[serde(rename = "1M")]
    Mn1,
}

impl Timeframe {
    /// Returns the wire name expected by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::M45 => "45m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
            Timeframe::Mn1 => "1M",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_uppercases() {
        assert_eq!(Symbol::parse("  aapl  ").unwrap().as_str(), "AAPL");
        assert_eq!(Symbol::parse("usdjpy").unwrap().as_str(), "USDJPY");
    }

    #[test]
    fn parse_rejects_blank_input() {
        assert!(Symbol::parse("").is_none());
        assert!(Symbol::parse(" \t ").is_none());
    }

    #[test]
    fn timeframes_sort_chronologically() {
        let mut tfs = vec![Timeframe::D1, Timeframe::M15, Timeframe::H4, Timeframe::H1];
        tfs.sort();
        assert_eq!(tfs, DASHBOARD_TIMEFRAMES.to_vec());
    }

    #[test]
    fn timeframe_wire_names_match_serde() {
        for tf in [Timeframe::M15, Timeframe::H1, Timeframe::Mn1] {
            let json = serde_json::to_string(&tf).unwrap();
            assert_eq!(json, format!("\"{}\"", tf.as_str()));
        }
    }
}
