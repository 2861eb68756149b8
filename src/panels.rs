//! Display panels, each a [`Poller`] bound to one API resource.
//!
//! Every constructor takes the shared client, the initial key and whether
//! the panel starts active, and returns a running poller. The intervals
//! below are the refresh cadence of each panel.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::warn;

use crate::client::{DEFAULT_NEWS_LIMIT, MarketApi};
use crate::models::{
    Candle, DASHBOARD_TIMEFRAMES, EconomicEvent, MarketQuote, MarketSentiment,
    MultiTimeframeAnalysis, NewsItem, Symbol, TechnicalIndicators, Timeframe, TradingSignal,
    TrendAnalysis, TrendDirection,
};
use crate::poll::Poller;

pub const QUOTE_INTERVAL: Duration = Duration::from_secs(60);
pub const TREND_INTERVAL: Duration = Duration::from_secs(300);
pub const SIGNAL_INTERVAL: Duration = Duration::from_secs(300);
pub const NEWS_INTERVAL: Duration = Duration::from_secs(300);
pub const CHART_INTERVAL: Duration = Duration::from_secs(60);
pub const CONSENSUS_INTERVAL: Duration = Duration::from_secs(300);
pub const CHART_DETAIL_INTERVAL: Duration = Duration::from_secs(60);
pub const CALENDAR_INTERVAL: Duration = Duration::from_secs(300);
pub const SENTIMENT_INTERVAL: Duration = Duration::from_secs(300);

/// Trend analyses for every dashboard timeframe.
pub type TrendSeries = BTreeMap<Timeframe, TrendAnalysis>;

/// Chart cells for every dashboard timeframe.
pub type ChartSeries = BTreeMap<Timeframe, ChartData>;

pub type QuotePanel = Poller<Symbol, MarketQuote>;
pub type TrendPanel = Poller<Symbol, TrendSeries>;
pub type SignalPanel = Poller<Symbol, TradingSignal>;
pub type SignalSetPanel = Poller<Symbol, Vec<TradingSignal>>;
pub type NewsPanel = Poller<Symbol, Vec<NewsItem>>;
pub type ConsensusPanel = Poller<Symbol, MultiTimeframeAnalysis>;
pub type ChartBatchPanel = Poller<Symbol, ChartSeries>;
pub type ChartDetailPanel = Poller<(Symbol, Timeframe), ChartDetail>;
pub type CalendarPanel = Poller<(), Vec<EconomicEvent>>;
pub type SentimentPanel = Poller<Symbol, MarketSentiment>;

/// One cell of the multi-timeframe chart grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartData {
    pub timeframe: Timeframe,
    pub trend: TrendDirection,
    pub strength: f64,
    /// Latest quote price, shared by every cell of a batch. `None` when
    /// the quote request failed.
    pub price: Option<Decimal>,
}

impl ChartData {
    pub fn from_trend(
        timeframe: Timeframe,
        analysis: &TrendAnalysis,
        price: Option<Decimal>,
    ) -> Self {
        Self {
            timeframe,
            trend: analysis.direction,
            strength: analysis.strength,
            price,
        }
    }
}

/// Indicator values and price history for one timeframe.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartDetail {
    pub indicators: TechnicalIndicators,
    pub history: Vec<Candle>,
}

pub fn quote<A: MarketApi>(api: Arc<A>, symbol: Symbol, active: bool) -> QuotePanel {
    Poller::spawn("quote", symbol, QUOTE_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move { api.quote(&symbol).await }
    })
}

/// Fetches one trend analysis per dashboard timeframe, one after another.
pub fn trend<A: MarketApi>(api: Arc<A>, symbol: Symbol, active: bool) -> TrendPanel {
    Poller::spawn("trend", symbol, TREND_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move {
            let mut series = TrendSeries::new();
            for timeframe in DASHBOARD_TIMEFRAMES {
                let analysis = api.trend(&symbol, timeframe).await?;
                series.insert(timeframe, analysis);
            }
            Ok(series)
        }
    })
}

pub fn signal<A: MarketApi>(
    api: Arc<A>,
    symbol: Symbol,
    timeframe: Timeframe,
    active: bool,
) -> SignalPanel {
    Poller::spawn("signal", symbol, SIGNAL_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move { api.trading_signal(&symbol, timeframe).await }
    })
}

/// Signals for every dashboard timeframe from a single request.
pub fn signal_set<A: MarketApi>(api: Arc<A>, symbol: Symbol, active: bool) -> SignalSetPanel {
    Poller::spawn("signal set", symbol, SIGNAL_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move { api.trading_signals(&symbol, &DASHBOARD_TIMEFRAMES).await }
    })
}

/// Latest headlines mentioning the symbol.
pub fn news<A: MarketApi>(api: Arc<A>, symbol: Symbol, active: bool) -> NewsPanel {
    Poller::spawn("news", symbol, NEWS_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move {
            api.news(std::slice::from_ref(&symbol), DEFAULT_NEWS_LIMIT)
                .await
        }
    })
}

pub fn consensus<A: MarketApi>(api: Arc<A>, symbol: Symbol, active: bool) -> ConsensusPanel {
    Poller::spawn("consensus", symbol, CONSENSUS_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move { api.multi_timeframe(&symbol, &DASHBOARD_TIMEFRAMES).await }
    })
}

/// Builds the chart grid from one trend request per timeframe, issued in
/// sequence.
///
/// The backend has no per-timeframe price, so each cycle fetches one quote
/// for the batch symbol and every cell shows its price. A failed quote
/// leaves the cells without a price; it does not fail the batch.
pub fn chart_batch<A: MarketApi>(api: Arc<A>, symbol: Symbol, active: bool) -> ChartBatchPanel {
    Poller::spawn("chart batch", symbol, CHART_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move {
            let price = batch_price(api.as_ref(), &symbol).await;
            let mut series = ChartSeries::new();
            for timeframe in DASHBOARD_TIMEFRAMES {
                let analysis = api.trend(&symbol, timeframe).await?;
                series.insert(timeframe, ChartData::from_trend(timeframe, &analysis, price));
            }
            Ok(series)
        }
    })
}

async fn batch_price<A: MarketApi>(api: &A, symbol: &Symbol) -> Option<Decimal> {
    match api.quote(symbol).await {
        Ok(quote) => Some(quote.price),
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "chart price unavailable");
            None
        }
    }
}

/// Indicators and history for the focused chart timeframe.
pub fn chart_detail<A: MarketApi>(
    api: Arc<A>,
    symbol: Symbol,
    timeframe: Timeframe,
    active: bool,
) -> ChartDetailPanel {
    Poller::spawn(
        "chart detail",
        (symbol, timeframe),
        CHART_DETAIL_INTERVAL,
        active,
        move |(symbol, timeframe): (Symbol, Timeframe)| {
            let api = Arc::clone(&api);
            async move {
                let (indicators, history) = tokio::try_join!(
                    api.indicators(&symbol, timeframe),
                    api.history(&symbol, timeframe)
                )?;
                Ok(ChartDetail {
                    indicators,
                    history,
                })
            }
        },
    )
}

pub fn calendar<A: MarketApi>(api: Arc<A>, active: bool) -> CalendarPanel {
    Poller::spawn("calendar", (), CALENDAR_INTERVAL, active, move |()| {
        let api = Arc::clone(&api);
        async move { api.economic_calendar().await }
    })
}

pub fn sentiment<A: MarketApi>(api: Arc<A>, symbol: Symbol, active: bool) -> SentimentPanel {
    Poller::spawn("sentiment", symbol, SENTIMENT_INTERVAL, active, move |symbol: Symbol| {
        let api = Arc::clone(&api);
        async move { api.sentiment(&symbol).await }
    })
}
