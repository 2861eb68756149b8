//! Stream connections against a local WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tungstenite::Message as WsMessage;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};

use marketdash::models::Symbol;
use marketdash::stream::{StreamChannel, StreamCommand, StreamConnection, StreamEvent, StreamMessage};
use marketdash::tui::Message;

const MARKET_UPDATE: &str = r#"{
    "type": "market_update",
    "symbol": "AAPL",
    "timestamp": "2024-01-15T15:31:00",
    "data": {
        "quote": {"symbol": "AAPL", "price": 150.5, "timestamp": "2024-01-15T15:31:00"},
        "indicators": {"symbol": "AAPL", "timeframe": "1h", "timestamp": "2024-01-15T15:31:00"},
        "trend": {"timeframe": "1h", "direction": "bullish", "strength": 70.0}
    }
}"#;

const NEWS_UPDATE: &str = r#"{
    "type": "news_update",
    "timestamp": "2024-01-15T15:35:00",
    "count": 0,
    "items": []
}"#;

/// Accepts connections forever. Each one reports its request path, sends
/// `greeting`, then either hangs up or reads until the client leaves.
async fn serve(
    listener: TcpListener,
    paths: mpsc::UnboundedSender<String>,
    greeting: &'static str,
    hang_up: bool,
) {
    while let Ok((stream, _)) = listener.accept().await {
        let paths = paths.clone();
        tokio::spawn(async move {
            let (path_tx, path_rx) = oneshot::channel();
            let callback = move |req: &Request, resp: Response| {
                let _ = path_tx.send(req.uri().path().to_string());
                Ok::<_, ErrorResponse>(resp)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(stream, callback)
                .await
                .unwrap();
            let _ = paths.send(path_rx.await.unwrap());
            ws.send(WsMessage::Text(greeting.into())).await.unwrap();
            if hang_up {
                let _ = ws.close(None).await;
                return;
            }
            while let Some(Ok(_)) = ws.next().await {}
        });
    }
}

async fn start_server(
    greeting: &'static str,
    hang_up: bool,
) -> (Url, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (paths_tx, paths_rx) = mpsc::unbounded_channel();
    tokio::spawn(serve(listener, paths_tx, greeting, hang_up));
    let base = Url::parse(&format!("http://{addr}/api/v1")).unwrap();
    (base, paths_rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Message>) -> StreamEvent {
    let message = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for a stream event")
        .expect("connection dropped its sender");
    match message {
        Message::Stream(event) => event,
        other => panic!("unexpected message {other:?}"),
    }
}

async fn next_path(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("timed out waiting for a connection")
        .unwrap()
}

#[tokio::test]
async fn market_stream_forwards_updates_and_follows_the_symbol() {
    let (base, mut paths) = start_server(MARKET_UPDATE, false).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let aapl = Symbol::parse("aapl").unwrap();
    let connection =
        StreamConnection::new(base, StreamChannel::Market(aapl.clone()), tx, Some(cmd_rx));
    tokio::spawn(connection.run());

    assert_eq!(next_path(&mut paths).await, "/ws/market/AAPL");
    assert!(matches!(
        next_event(&mut rx).await,
        StreamEvent::Connected(StreamChannel::Market(ref s)) if *s == aapl
    ));
    let StreamEvent::Update(StreamMessage::MarketUpdate(update)) = next_event(&mut rx).await else {
        panic!("expected a market update");
    };
    assert_eq!(update.symbol, "AAPL");

    let msft = Symbol::parse("msft").unwrap();
    cmd_tx.send(StreamCommand::Follow(msft.clone())).unwrap();
    assert_eq!(next_path(&mut paths).await, "/ws/market/MSFT");
    assert!(matches!(
        next_event(&mut rx).await,
        StreamEvent::Connected(StreamChannel::Market(ref s)) if *s == msft
    ));
}

#[tokio::test]
async fn dropped_stream_reconnects_after_backoff() {
    let (base, mut paths) = start_server(NEWS_UPDATE, true).await;
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(StreamConnection::new(base, StreamChannel::News, tx, None).run());

    assert_eq!(next_path(&mut paths).await, "/ws/news");
    assert!(matches!(
        next_event(&mut rx).await,
        StreamEvent::Connected(StreamChannel::News)
    ));
    assert!(matches!(
        next_event(&mut rx).await,
        StreamEvent::Update(StreamMessage::NewsUpdate(_))
    ));
    assert!(matches!(
        next_event(&mut rx).await,
        StreamEvent::Disconnected(StreamChannel::News)
    ));

    assert_eq!(next_path(&mut paths).await, "/ws/news");
    assert!(matches!(
        next_event(&mut rx).await,
        StreamEvent::Connected(StreamChannel::News)
    ));
}
