//! Crate-level error types.
//!
//! [`MarketdashError`] unifies every error source (configuration, HTTP,
//! WebSocket, JSON, settings storage) behind a single enum so callers can
//! match on the variant they care about while still using the `?` operator.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MarketdashError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum MarketdashError {
    /// An environment variable held an unusable value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Terminal or filesystem I/O failed.
    #[error("io error: {0}")]
    Io(String),

    /// An HTTP request failed in transport or returned a non-success status.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A stream WebSocket operation (connect, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The settings key-value store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// A request URL could not be built from the configured base URL.
    #[error("invalid url: {0}")]
    Url(String),
}
