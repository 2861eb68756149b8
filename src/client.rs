//! Typed HTTP client for the market analysis REST API.
//!
//! Every method is a single GET round trip with no caching, no retry and no
//! cancellation. A non-success status is reported as an error; callers
//! decide how to degrade (the dashboard panels turn errors into an empty
//! display state).

use std::future::Future;

use reqwest::{Request, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::models::{
    Candle, EconomicEvent, MarketQuote, MarketSentiment, MultiTimeframeAnalysis, NewsItem, Symbol,
    TechnicalIndicators, Timeframe, TradingSignal, TrendAnalysis,
};
use crate::{MarketdashError, Result};

/// Number of headlines requested when the caller has no preference.
pub const DEFAULT_NEWS_LIMIT: u32 = 20;

/// The read-only operations the dashboard needs from the backend.
///
/// [`MarketClient`] is the HTTP implementation; tests substitute in-memory
/// fakes.
pub trait MarketApi: Send + Sync + 'static {
    /// `GET /market/quote/{symbol}`
    fn quote(&self, symbol: &Symbol) -> impl Future<Output = Result<MarketQuote>> + Send;

    /// `GET /market/indicators/{symbol}?timeframe=`
    fn indicators(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> impl Future<Output = Result<TechnicalIndicators>> + Send;

    /// `GET /market/trend/{symbol}?timeframe=`
    fn trend(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> impl Future<Output = Result<TrendAnalysis>> + Send;

    /// `GET /market/multi-timeframe/{symbol}?timeframes=..`
    fn multi_timeframe(
        &self,
        symbol: &Symbol,
        timeframes: &[Timeframe],
    ) -> impl Future<Output = Result<MultiTimeframeAnalysis>> + Send;

    /// `GET /signals/{symbol}?timeframe=`
    fn trading_signal(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> impl Future<Output = Result<TradingSignal>> + Send;

    /// `GET /signals/multi/{symbol}?timeframes=..`
    ///
    /// One signal per requested timeframe, in the backend's order.
    fn trading_signals(
        &self,
        symbol: &Symbol,
        timeframes: &[Timeframe],
    ) -> impl Future<Output = Result<Vec<TradingSignal>>> + Send;

    /// `GET /news/latest?symbols=..&limit=`
    ///
    /// An empty `symbols` slice requests news for all symbols.
    fn news(
        &self,
        symbols: &[Symbol],
        limit: u32,
    ) -> impl Future<Output = Result<Vec<NewsItem>>> + Send;

    /// `GET /news/calendar`
    fn economic_calendar(&self) -> impl Future<Output = Result<Vec<EconomicEvent>>> + Send;

    /// `GET /market/history/{symbol}?timeframe=`
    fn history(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
    ) -> impl Future<Output = Result<Vec<Candle>>> + Send;

    /// `GET /news/sentiment/{symbol}`
    fn sentiment(&self, symbol: &Symbol) -> impl Future<Output = Result<MarketSentiment>> + Send;
}

/// A request against one API resource.
#[derive(Clone, Copy, Debug)]
pub enum Endpoint<'a> {
    Quote(&'a Symbol),
    Indicators(&'a Symbol, Timeframe),
    Trend(&'a Symbol, Timeframe),
    MultiTimeframe(&'a Symbol, &'a [Timeframe]),
    Signal(&'a Symbol, Timeframe),
    MultiSignal(&'a Symbol, &'a [Timeframe]),
    News(&'a [Symbol], u32),
    Calendar,
    History(&'a Symbol, Timeframe),
    Sentiment(&'a Symbol),
}

impl Endpoint<'_> {
    /// Path segments below the API base URL.
    fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::Quote(s) => vec!["market", "quote", s.as_str()],
            Endpoint::Indicators(s, _) => vec!["market", "indicators", s.as_str()],
            Endpoint::Trend(s, _) => vec!["market", "trend", s.as_str()],
            Endpoint::MultiTimeframe(s, _) => vec!["market", "multi-timeframe", s.as_str()],
            Endpoint::Signal(s, _) => vec!["signals", s.as_str()],
            Endpoint::MultiSignal(s, _) => vec!["signals", "multi", s.as_str()],
            Endpoint::News(_, _) => vec!["news", "latest"],
            Endpoint::Calendar => vec!["news", "calendar"],
            Endpoint::History(s, _) => vec!["market", "history", s.as_str()],
            Endpoint::Sentiment(s) => vec!["news", "sentiment", s.as_str()],
        }
    }

    /// Query parameters; list parameters repeat their key once per value.
    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::Indicators(_, tf)
            | Endpoint::Trend(_, tf)
            | Endpoint::Signal(_, tf)
            | Endpoint::History(_, tf) => vec![("timeframe", tf.as_str().to_string())],
            Endpoint::MultiTimeframe(_, tfs) | Endpoint::MultiSignal(_, tfs) => tfs
                .iter()
                .map(|tf| ("timeframes", tf.as_str().to_string()))
                .collect(),
            Endpoint::News(symbols, limit) => {
                let mut query: Vec<(&'static str, String)> = symbols
                    .iter()
                    .map(|s| ("symbols", s.as_str().to_string()))
                    .collect();
                query.push(("limit", limit.to_string()));
                query
            }
            Endpoint::Quote(_) | Endpoint::Calendar | Endpoint::Sentiment(_) => Vec::new(),
        }
    }
}

/// HTTP implementation of [`MarketApi`].
#[derive(Clone, Debug)]
pub struct MarketClient {
    http: reqwest::Client,
    base: Url,
}

impl MarketClient {
    /// Builds a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns [`MarketdashError::Url`] if the base URL does not parse or
    /// cannot carry a path, or [`MarketdashError::Http`] if the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| MarketdashError::Url(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(MarketdashError::Url(format!(
                "{} cannot be used as an API base",
                config.base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        debug!(base_url = %base, "MarketClient initialised");
        Ok(Self { http, base })
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds the GET request for an endpoint without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or request cannot be assembled.
    pub fn request(&self, endpoint: &Endpoint<'_>) -> Result<Request> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| MarketdashError::Url(format!("{} cannot carry a path", self.base)))?;
            segments.pop_if_empty().extend(endpoint.segments());
        }
        Ok(self.http.get(url).query(&endpoint.query()).build()?)
    }

    /// Checks the backend's `/health` endpoint on the server root.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or reports a failure status.
    pub async fn health(&self) -> Result<()> {
        let mut url = self.base.clone();
        url.set_path("/health");
        url.set_query(None);
        self.http.get(url.clone()).send().await?.error_for_status()?;
        info!(url = %url, "backend is healthy");
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint<'_>) -> Result<T> {
        let request = self.request(&endpoint)?;
        debug!(url = %request.url(), "GET");
        let response = self.http.execute(request).await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

impl MarketApi for MarketClient {
    async fn quote(&self, symbol: &Symbol) -> Result<MarketQuote> {
        self.fetch(Endpoint::Quote(symbol)).await
    }

    async fn indicators(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<TechnicalIndicators> {
        self.fetch(Endpoint::Indicators(symbol, timeframe)).await
    }

    async fn trend(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<TrendAnalysis> {
        self.fetch(Endpoint::Trend(symbol, timeframe)).await
    }

    async fn multi_timeframe(
        &self,
        symbol: &Symbol,
        timeframes: &[Timeframe],
    ) -> Result<MultiTimeframeAnalysis> {
        self.fetch(Endpoint::MultiTimeframe(symbol, timeframes)).await
    }

    async fn trading_signal(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<TradingSignal> {
        self.fetch(Endpoint::Signal(symbol, timeframe)).await
    }

    async fn trading_signals(
        &self,
        symbol: &Symbol,
        timeframes: &[Timeframe],
    ) -> Result<Vec<TradingSignal>> {
        self.fetch(Endpoint::MultiSignal(symbol, timeframes)).await
    }

    async fn news(&self, symbols: &[Symbol], limit: u32) -> Result<Vec<NewsItem>> {
        self.fetch(Endpoint::News(symbols, limit)).await
    }

    async fn economic_calendar(&self) -> Result<Vec<EconomicEvent>> {
        self.fetch(Endpoint::Calendar).await
    }

    async fn history(&self, symbol: &Symbol, timeframe: Timeframe) -> Result<Vec<Candle>> {
        self.fetch(Endpoint::History(symbol, timeframe)).await
    }

    async fn sentiment(&self, symbol: &Symbol) -> Result<MarketSentiment> {
        self.fetch(Endpoint::Sentiment(symbol)).await
    }
}
