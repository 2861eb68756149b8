//! Terminal market-analysis dashboard.
//!
//! Polls a REST analysis backend for quotes, trend analyses, trading
//! signals, news and calendar data, takes pushed market and news updates
//! over WebSocket, and keeps a persisted indicator configuration that the
//! chart view renders against.

pub mod chart_view;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod panels;
pub mod poll;
pub mod settings;
pub mod stream;
pub mod tui;

pub use error::{MarketdashError, Result};
