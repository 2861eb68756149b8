//! Deserialization tests for the analysis API response types.

mod common;

use rust_decimal_macros::dec;

use common::*;
use marketdash::models::{
    Candle, EconomicEvent, MarketQuote, MarketSentiment, MultiTimeframeAnalysis, NewsImpact,
    NewsItem, PriceMovement, SignalStrength, TechnicalIndicators, Timeframe, TradingSignal,
    TrendAnalysis, TrendDirection,
};

#[test]
fn test_quote_deserializes() {
    let quote: MarketQuote = fixture(QUOTE_JSON);

    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(quote.price, dec!(150.23));
    assert_eq!(quote.bid, Some(dec!(150.20)));
    assert_eq!(quote.ask, Some(dec!(150.26)));
    assert_eq!(quote.high, Some(dec!(151.80)));
    assert_eq!(quote.low, Some(dec!(148.90)));
    assert_eq!(quote.change, Some(dec!(1.5)));
    assert_eq!(quote.change_percent, Some(dec!(1.01)));
    assert_eq!(quote.timestamp, "2024-01-15T15:30:00Z");
    assert_eq!(quote.movement(), PriceMovement::Up);
}

#[test]
fn test_quote_optional_fields_default_to_none() {
    let quote: MarketQuote = serde_json::from_str(
        r#"{"symbol": "USDJPY", "price": 148.125, "timestamp": "2024-01-15T15:30:00Z"}"#,
    )
    .unwrap();

    assert_eq!(quote.price, dec!(148.125));
    assert!(quote.bid.is_none());
    assert!(quote.volume.is_none());
    assert!(quote.change.is_none());
    assert_eq!(quote.movement(), PriceMovement::Flat);
}

#[test]
fn test_trend_deserializes() {
    let trend: TrendAnalysis = fixture(TREND_JSON);

    assert_eq!(trend.timeframe, Timeframe::H1);
    assert_eq!(trend.direction, TrendDirection::Bullish);
    assert_eq!(trend.strength, 72.5);
    assert_eq!(trend.support_levels, vec![dec!(148.5), dec!(146.0)]);
    assert_eq!(trend.resistance_levels, vec![dec!(152.0), dec!(155.25)]);
}

#[test]
fn test_unrecognized_trend_direction_is_unknown() {
    let trend: TrendAnalysis = serde_json::from_str(
        r#"{"timeframe": "4h", "direction": "choppy", "strength": 10.0}"#,
    )
    .unwrap();

    assert_eq!(trend.direction, TrendDirection::Unknown);
    assert!(trend.support_levels.is_empty());
    assert!(trend.description.is_empty());
}

#[test]
fn test_indicators_deserialize() {
    let indicators: TechnicalIndicators = fixture(INDICATORS_JSON);

    assert_eq!(indicators.timeframe, Timeframe::H1);
    assert_eq!(indicators.sma_20, Some(149.82));
    assert_eq!(indicators.sma_200, None);
    assert_eq!(indicators.rsi, Some(61.4));
    assert_eq!(indicators.macd_histogram, Some(0.25));
    assert_eq!(indicators.bb_lower, Some(147.24));
    assert_eq!(indicators.vwap, None);
}

#[test]
fn test_multi_timeframe_deserializes() {
    let analysis: MultiTimeframeAnalysis = fixture(MULTI_TIMEFRAME_JSON);

    assert_eq!(analysis.current_price, dec!(150.23));
    assert_eq!(analysis.overall_trend, TrendDirection::Bullish);
    assert_eq!(analysis.consensus_signal, SignalStrength::Buy);
    assert_eq!(analysis.analyses.len(), 4);

    let ordered: Vec<Timeframe> = analysis.analyses.keys().copied().collect();
    assert_eq!(
        ordered,
        vec![Timeframe::M15, Timeframe::H1, Timeframe::H4, Timeframe::D1]
    );
    assert_eq!(
        analysis.analyses[&Timeframe::D1].direction,
        TrendDirection::Bearish
    );
}

#[test]
fn test_signal_deserializes() {
    let signal: TradingSignal = fixture(SIGNAL_JSON);

    assert_eq!(signal.signal, SignalStrength::StrongBuy);
    assert!(signal.signal.is_buy());
    assert!(!signal.signal.is_sell());
    assert_eq!(signal.signal.label(), "STRONG BUY");
    assert_eq!(signal.confidence, 82.0);
    assert_eq!(signal.reasons.len(), 2);
    assert_eq!(signal.entry_price, Some(dec!(150.23)));
    assert_eq!(signal.stop_loss, Some(dec!(147.80)));
    assert_eq!(signal.take_profit, Some(dec!(155.00)));
}

#[test]
fn test_news_deserializes() {
    let items: Vec<NewsItem> = fixture(NEWS_JSON);

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].impact, NewsImpact::High);
    assert_eq!(items[0].related_symbols, vec!["AAPL".to_string()]);
    assert_eq!(items[1].impact, NewsImpact::Medium);
    assert!(items[1].description.is_none());
    assert!(items[1].url.is_none());
    assert!(items[1].tags.is_empty());
    assert!(items[1].sentiment < 0.0);
}

#[test]
fn test_calendar_deserializes() {
    let events: Vec<EconomicEvent> = fixture(CALENDAR_JSON);

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].impact, NewsImpact::Critical);
    assert_eq!(events[0].forecast.as_deref(), Some("180K"));
    assert!(events[0].actual.is_none());
    assert_eq!(events[1].actual.as_deref(), Some("-0.10%"));
}

#[test]
fn test_sentiment_deserializes() {
    let sentiment: MarketSentiment = fixture(SENTIMENT_JSON);

    assert_eq!(sentiment.overall_sentiment, 0.35);
    assert!(sentiment.social_sentiment.is_none());
    assert_eq!(sentiment.bullish_count, 12);
    assert_eq!(sentiment.bearish_count, 4);
    assert_eq!(sentiment.neutral_count, 7);
}

#[test]
fn test_history_deserializes() {
    let candles: Vec<Candle> = fixture(HISTORY_JSON);

    assert_eq!(candles.len(), 3);
    assert_eq!(candles[2].close, dec!(150.23));
    assert_eq!(candles[0].volume, 1_200_000.0);
}

#[test]
fn test_impact_orders_most_severe_first() {
    let mut impacts = vec![
        NewsImpact::Low,
        NewsImpact::Critical,
        NewsImpact::Medium,
        NewsImpact::High,
    ];
    impacts.sort();
    assert_eq!(
        impacts,
        vec![
            NewsImpact::Critical,
            NewsImpact::High,
            NewsImpact::Medium,
            NewsImpact::Low
        ]
    );
}
