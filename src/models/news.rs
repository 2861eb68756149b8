use serde::Deserialize;

use super::Symbol;

/// How strongly a news item or event is expected to move markets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsImpact {
    Critical,
    High,
    Medium,
    Low,
}

impl NewsImpact {
    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            NewsImpact::Critical => "CRITICAL",
            NewsImpact::High => "HIGH",
            NewsImpact::Medium => "MEDIUM",
            NewsImpact::Low => "LOW",
        }
    }
}

/// A news headline.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
    pub published_at: String,
    pub impact: NewsImpact,
    /// Sentiment from -1 (negative) to 1 (positive).
    pub sentiment: f64,
    #[serde(default)]
    pub related_symbols: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewsItem {
    /// Returns `true` if the item lists `symbol` among its related symbols.
    pub fn mentions(&self, symbol: &Symbol) -> bool {
        self.related_symbols
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(symbol.as_str()))
    }
}

/// A scheduled economic calendar event.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EconomicEvent {
    pub id: String,
    pub title: String,
    pub country: String,
    pub currency: String,
    pub event_time: String,
    pub impact: NewsImpact,
    #[serde(default)]
    pub forecast: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Aggregated market sentiment for a symbol.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MarketSentiment {
    pub symbol: String,
    pub timestamp: String,
    pub overall_sentiment: f64,
    pub news_sentiment: f64,
    #[serde(default)]
    pub social_sentiment: Option<f64>,
    pub technical_sentiment: f64,
    #[serde(default)]
    pub bullish_count: u32,
    #[serde(default)]
    pub bearish_count: u32,
    #[serde(default)]
    pub neutral_count: u32,
}
