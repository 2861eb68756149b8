//! Live updates pushed by the backend over WebSocket.
//!
//! The backend serves two channels on its server root, outside the REST
//! prefix:
//! - `/ws/market/{symbol}`: quote, 1h indicators and 1h trend about once a minute
//! - `/ws/news`: newly published headlines, checked every five minutes
//!
//! The client keeps each connection alive by sending the text `ping`
//! every 30 seconds; the server answers `pong`.
//!
//! - [`message`] - Pushed message shapes
//! - [`connection`] - Connect, heartbeat and reconnect loop

mod connection;
mod message;

use std::fmt;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use tungstenite::Message;

use crate::models::Symbol;
use crate::{MarketdashError, Result};

pub use connection::{StreamCommand, StreamConnection, StreamEvent};
pub use message::{MarketSnapshot, MarketUpdate, NewsUpdate, StreamMessage, parse_stream_message};

/// Heartbeat text sent by the client.
pub const PING: &str = "ping";

/// Heartbeat reply sent by the server.
pub const PONG: &str = "pong";

/// Write half of a stream connection.
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of a stream connection.
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// A push channel offered by the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamChannel {
    /// Market updates for one symbol.
    Market(Symbol),
    /// Headlines for all symbols.
    News,
}

impl StreamChannel {
    /// Builds the WebSocket URL of this channel from the REST base URL.
    ///
    /// The scheme becomes `ws` or `wss` and the REST path prefix is
    /// replaced by the channel path.
    ///
    /// # Errors
    ///
    /// Returns [`MarketdashError::Url`] if the base URL is not `http` or
    /// `https`.
    pub fn url(&self, api_base: &Url) -> Result<Url> {
        let scheme = match api_base.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(MarketdashError::Url(format!(
                    "no websocket scheme for {other}:// base {api_base}"
                )));
            }
        };

        let mut url = api_base.clone();
        url.set_scheme(scheme)
            .map_err(|()| MarketdashError::Url(format!("cannot switch {api_base} to {scheme}")))?;
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| MarketdashError::Url(format!("{api_base} cannot carry a path")))?;
            segments.clear();
            match self {
                StreamChannel::Market(symbol) => segments.extend(["ws", "market", symbol.as_str()]),
                StreamChannel::News => segments.extend(["ws", "news"]),
            };
        }
        Ok(url)
    }
}

impl fmt::Display for StreamChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamChannel::Market(symbol) => write!(f, "market:{symbol}"),
            StreamChannel::News => f.write_str("news"),
        }
    }
}

/// Establishes a WebSocket connection to the given URL.
///
/// # Errors
///
/// Returns [`MarketdashError::WebSocket`] if the connection or handshake fails.
pub async fn connect(url: &Url) -> Result<(WsWriter, WsReader)> {
    let (ws_stream, _) = connect_async(url.as_str()).await?;
    info!(url = %url, "WebSocket handshake completed");

    Ok(ws_stream.split())
}

/// Sends the heartbeat text.
///
/// # Errors
///
/// Returns [`MarketdashError::WebSocket`] if sending the message fails.
pub async fn ping(write: &mut WsWriter) -> Result<()> {
    write.send(Message::Text(PING.into())).await?;
    debug!("Sent ping");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn market_channel_lives_on_the_server_root() {
        let channel = StreamChannel::Market(Symbol::parse("aapl").unwrap());
        let url = channel.url(&base("http://localhost:8000/api/v1")).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws/market/AAPL");
    }

    #[test]
    fn https_base_maps_to_wss() {
        let url = StreamChannel::News
            .url(&base("https://analysis.example.com/api/v1/?debug=1"))
            .unwrap();
        assert_eq!(url.as_str(), "wss://analysis.example.com/ws/news");
    }

    #[test]
    fn symbol_segment_is_percent_encoded() {
        let channel = StreamChannel::Market(Symbol::parse("btc/usd").unwrap());
        let url = channel.url(&base("http://localhost:8000/api/v1")).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws/market/BTC%2FUSD");
    }

    #[test]
    fn non_http_base_is_rejected() {
        let err = StreamChannel::News.url(&base("ftp://localhost/api")).unwrap_err();
        assert!(matches!(err, MarketdashError::Url(_)));
    }

    #[test]
    fn channel_display() {
        let channel = StreamChannel::Market(Symbol::parse("msft").unwrap());
        assert_eq!(channel.to_string(), "market:MSFT");
        assert_eq!(StreamChannel::News.to_string(), "news");
    }
}
