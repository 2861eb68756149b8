//! Messages pushed on the stream channels.

use serde::Deserialize;
use tracing::debug;

use crate::models::{MarketQuote, NewsItem, TechnicalIndicators, TrendAnalysis};

use super::PONG;

/// A message received on either stream channel, tagged by its `type` field.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    MarketUpdate(MarketUpdate),
    NewsUpdate(NewsUpdate),
}

/// Periodic snapshot for one symbol.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MarketUpdate {
    pub symbol: String,
    pub timestamp: String,
    pub data: MarketSnapshot,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MarketSnapshot {
    pub quote: MarketQuote,
    pub indicators: TechnicalIndicators,
    pub trend: TrendAnalysis,
}

/// Headlines published since the previous news update.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewsUpdate {
    pub timestamp: String,
    #[serde(default)]
    pub count: usize,
    pub items: Vec<NewsItem>,
}

/// Parses one text frame.
///
/// Heartbeat replies and frames that are not a known message yield `None`.
pub fn parse_stream_message(text: &str) -> Option<StreamMessage> {
    if text == PONG {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!(error = %e, "ignoring unrecognized stream frame");
            None
        }
    }
}
