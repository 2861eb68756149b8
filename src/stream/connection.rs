//! Stream connection lifecycle management.
//!
//! [`StreamConnection`] handles connecting, sending the heartbeat, reading
//! pushed messages and reconnecting with exponential backoff. A market
//! connection also follows the dashboard symbol, reconnecting to the new
//! symbol's channel when told to.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info, warn};
use tungstenite::Message as WsMessage;

use super::{StreamChannel, StreamMessage, WsReader, WsWriter, connect, parse_stream_message, ping};
use crate::models::Symbol;
use crate::tui::Message;

/// Interval between heartbeat pings.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Initial backoff duration between reconnection attempts.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum backoff duration between reconnection attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Commands sent from the main loop to a market connection.
#[derive(Clone, Debug)]
pub enum StreamCommand {
    /// The dashboard switched to another symbol.
    Follow(Symbol),
}

/// What a connection reports to the main loop.
#[derive(Clone, Debug)]
pub enum StreamEvent {
    Connected(StreamChannel),
    Disconnected(StreamChannel),
    Update(StreamMessage),
}

/// Why the reader loop exited.
enum DisconnectReason {
    /// The connection was lost or errored.
    ConnectionError,
    /// The followed symbol changed; its channel lives at another URL.
    Resubscribe,
    /// The message channel to the main loop was closed (app shutting down).
    Shutdown,
}

/// Keeps one stream channel connected and forwards its messages.
pub struct StreamConnection {
    api_base: Url,
    channel: StreamChannel,
    tx: mpsc::UnboundedSender<Message>,
    cmd_rx: Option<mpsc::UnboundedReceiver<StreamCommand>>,
}

impl StreamConnection {
    /// Creates a connection for `channel`, deriving its URL from the REST
    /// base. Pass `cmd_rx` to let a market connection follow symbol changes.
    #[must_use]
    pub fn new(
        api_base: Url,
        channel: StreamChannel,
        tx: mpsc::UnboundedSender<Message>,
        cmd_rx: Option<mpsc::UnboundedReceiver<StreamCommand>>,
    ) -> Self {
        Self {
            api_base,
            channel,
            tx,
            cmd_rx,
        }
    }

    /// Sends an event to the main loop. Returns `false` once it is gone.
    fn notify(&self, event: StreamEvent) -> bool {
        self.tx.send(Message::Stream(event)).is_ok()
    }

    /// Applies a command. Returns `true` if the channel changed.
    fn apply(&mut self, command: StreamCommand) -> bool {
        match command {
            StreamCommand::Follow(symbol) => match &self.channel {
                StreamChannel::Market(current) if *current != symbol => {
                    info!(from = %current, to = %symbol, "stream following new symbol");
                    self.channel = StreamChannel::Market(symbol);
                    true
                }
                _ => false,
            },
        }
    }

    /// Applies commands that queued up while disconnected.
    fn drain_commands(&mut self) {
        while let Some(command) = self.cmd_rx.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.apply(command);
        }
    }

    /// Runs the connection loop until the main loop goes away.
    ///
    /// Connects, pings every 30 seconds, forwards pushed messages, and
    /// reconnects with exponential backoff on disconnection.
    pub async fn run(mut self) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            self.drain_commands();

            let url = match self.channel.url(&self.api_base) {
                Ok(url) => url,
                Err(e) => {
                    error!(channel = %self.channel, "Cannot build stream url: {e}");
                    return;
                }
            };

            info!(url = %url, "Connecting to stream");
            let (write, read) = match connect(&url).await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(channel = %self.channel, "Connection failed: {e}");
                    if !self.notify(StreamEvent::Disconnected(self.channel.clone())) {
                        return;
                    }
                    info!(backoff_secs = backoff.as_secs(), "Backing off before retry");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    continue;
                }
            };

            if !self.notify(StreamEvent::Connected(self.channel.clone())) {
                return;
            }
            info!(channel = %self.channel, "Stream connected");

            // Reset backoff on successful connection
            backoff = INITIAL_BACKOFF;

            match self.read_loop(write, read).await {
                DisconnectReason::Resubscribe => {
                    // No backoff for a planned switch
                }
                DisconnectReason::ConnectionError => {
                    if !self.notify(StreamEvent::Disconnected(self.channel.clone())) {
                        return;
                    }
                    info!(
                        backoff_secs = backoff.as_secs(),
                        "Connection lost, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                DisconnectReason::Shutdown => {
                    info!(channel = %self.channel, "Stream connection shutting down");
                    return;
                }
            }
        }
    }

    /// Reads messages until disconnection, a symbol switch, or shutdown.
    async fn read_loop(&mut self, mut write: WsWriter, mut read: WsReader) -> DisconnectReason {
        let mut heartbeat = interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            if let Some(message) = parse_stream_message(text.as_str())
                                && !self.notify(StreamEvent::Update(message))
                            {
                                return DisconnectReason::Shutdown;
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) => {
                            warn!(channel = %self.channel, "Server closed the stream");
                            return DisconnectReason::ConnectionError;
                        }
                        Some(Ok(_)) => {} // Binary/Ping/Pong frames
                        Some(Err(e)) => {
                            warn!(channel = %self.channel, "WebSocket error: {e}");
                            return DisconnectReason::ConnectionError;
                        }
                        None => {
                            warn!(channel = %self.channel, "WebSocket stream ended");
                            return DisconnectReason::ConnectionError;
                        }
                    }
                }

                cmd = next_command(&mut self.cmd_rx) => {
                    match cmd {
                        Some(command) => {
                            if self.apply(command) {
                                let _ = write.close().await;
                                return DisconnectReason::Resubscribe;
                            }
                        }
                        // Command channel closed, app is shutting down
                        None => return DisconnectReason::Shutdown,
                    }
                }

                _ = heartbeat.tick() => {
                    if let Err(e) = ping(&mut write).await {
                        warn!(channel = %self.channel, "Ping failed: {e}");
                        return DisconnectReason::ConnectionError;
                    }
                }
            }
        }
    }
}

/// Waits for the next command; never resolves without a command channel.
async fn next_command(
    cmd_rx: &mut Option<mpsc::UnboundedReceiver<StreamCommand>>,
) -> Option<StreamCommand> {
    match cmd_rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
