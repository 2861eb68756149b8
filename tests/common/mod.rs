//! Shared test utilities: JSON fixtures and an in-memory analysis backend.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;

use marketdash::client::MarketApi;
use marketdash::models::{
    Candle, EconomicEvent, MarketQuote, MarketSentiment, MultiTimeframeAnalysis, NewsItem, Symbol,
    TechnicalIndicators, Timeframe, TradingSignal, TrendAnalysis, TrendDirection,
};
use marketdash::{MarketdashError, Result};

pub const QUOTE_JSON: &str = include_str!("../fixtures/quote.json");
pub const TREND_JSON: &str = include_str!("../fixtures/trend.json");
pub const INDICATORS_JSON: &str = include_str!("../fixtures/indicators.json");
pub const MULTI_TIMEFRAME_JSON: &str = include_str!("../fixtures/multi_timeframe.json");
pub const SIGNAL_JSON: &str = include_str!("../fixtures/signal.json");
pub const NEWS_JSON: &str = include_str!("../fixtures/news.json");
pub const CALENDAR_JSON: &str = include_str!("../fixtures/calendar.json");
pub const SENTIMENT_JSON: &str = include_str!("../fixtures/sentiment.json");
pub const HISTORY_JSON: &str = include_str!("../fixtures/history.json");
pub const STORED_SETTINGS_PARTIAL_JSON: &str =
    include_str!("../fixtures/stored_settings_partial.json");

/// Price every fake quote reports.
pub const QUOTE_PRICE: Decimal = dec!(150.23);

/// Parses a fixture, panicking with the fixture type on failure.
pub fn fixture<T: DeserializeOwned>(json: &str) -> T {
    serde_json::from_str(json)
        .unwrap_or_else(|e| panic!("bad {} fixture: {e}", std::any::type_name::<T>()))
}

/// An in-memory [`MarketApi`] that answers from fixtures and counts calls.
///
/// Quotes report [`QUOTE_PRICE`] for whatever symbol is asked. Each quote
/// call pops the next scripted `change`; the last one repeats.
pub struct FakeApi {
    calls: Mutex<HashMap<&'static str, u32>>,
    quote_changes: Mutex<VecDeque<Decimal>>,
    trend_direction: TrendDirection,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::with_quote_changes(&[dec!(1.5)])
    }

    pub fn with_quote_changes(changes: &[Decimal]) -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            quote_changes: Mutex::new(changes.iter().copied().collect()),
            trend_direction: TrendDirection::Bullish,
        }
    }

    /// Number of calls made to `endpoint` so far.
    pub fn calls(&self, endpoint: &str) -> u32 {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    fn record(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_default() += 1;
    }

    fn next_change(&self) -> Decimal {
        let mut changes = self.quote_changes.lock().unwrap();
        if changes.len() > 1 {
            changes.pop_front().unwrap_or_default()
        } else {
            changes.front().copied().unwrap_or_default()
        }
    }
}

impl MarketApi for FakeApi {
    async fn quote(&self, symbol: &Symbol) -> Result<MarketQuote> {
        self.record("quote");
        let mut quote: MarketQuote = fixture(QUOTE_JSON);
        quote.symbol = symbol.as_str().to_string();
        quote.price = QUOTE_PRICE;
        quote.change = Some(self.next_change());
        Ok(quote)
    }

    async fn indicators(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<TechnicalIndicators> {
        self.record("indicators");
        let mut indicators: TechnicalIndicators = fixture(INDICATORS_JSON);
        indicators.symbol = symbol.as_str().to_string();
        indicators.timeframe = timeframe;
        Ok(indicators)
    }

    async fn trend(&self, _symbol: &Symbol, timeframe: Timeframe) -> Result<TrendAnalysis> {
        self.record("trend");
        let mut analysis: TrendAnalysis = fixture(TREND_JSON);
        analysis.timeframe = timeframe;
        analysis.direction = self.trend_direction;
        Ok(analysis)
    }

    async fn multi_timeframe(
        &self,
        symbol: &Symbol,
        _timeframes: &[Timeframe],
    ) -> Result<MultiTimeframeAnalysis> {
        self.record("multi_timeframe");
        let mut analysis: MultiTimeframeAnalysis = fixture(MULTI_TIMEFRAME_JSON);
        analysis.symbol = symbol.as_str().to_string();
        Ok(analysis)
    }

    async fn trading_signal(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<TradingSignal> {
        self.record("signal");
        let mut signal: TradingSignal = fixture(SIGNAL_JSON);
        signal.symbol = symbol.as_str().to_string();
        signal.timeframe = timeframe;
        Ok(signal)
    }

    async fn trading_signals(
        &self,
        symbol: &Symbol,
        timeframes: &[Timeframe],
    ) -> Result<Vec<TradingSignal>> {
        self.record("signals");
        Ok(timeframes
            .iter()
            .map(|&timeframe| {
                let mut signal: TradingSignal = fixture(SIGNAL_JSON);
                signal.symbol = symbol.as_str().to_string();
                signal.timeframe = timeframe;
                signal
            })
            .collect())
    }

    async fn news(&self, _symbols: &[Symbol], limit: u32) -> Result<Vec<NewsItem>> {
        self.record("news");
        let mut items: Vec<NewsItem> = fixture(NEWS_JSON);
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn economic_calendar(&self) -> Result<Vec<EconomicEvent>> {
        self.record("calendar");
        Ok(fixture(CALENDAR_JSON))
    }

    async fn history(&self, _symbol: &Symbol, _timeframe: Timeframe) -> Result<Vec<Candle>> {
        self.record("history");
        Ok(fixture(HISTORY_JSON))
    }

    async fn sentiment(&self, symbol: &Symbol) -> Result<MarketSentiment> {
        self.record("sentiment");
        if symbol.as_str() == "UNKNOWN" {
            return Err(MarketdashError::Io("no sentiment for UNKNOWN".to_string()));
        }
        let mut sentiment: MarketSentiment = fixture(SENTIMENT_JSON);
        sentiment.symbol = symbol.as_str().to_string();
        Ok(sentiment)
    }
}
