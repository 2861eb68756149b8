use std::fs::File;
use std::sync::{Arc, Mutex};

use marketdash::MarketdashError;
use marketdash::client::MarketClient;
use marketdash::config::fetch_config;
use marketdash::dashboard::Dashboard;
use marketdash::settings::store::{FileStore, MemoryStore, SettingsStore};
use marketdash::stream::{StreamChannel, StreamConnection};
use marketdash::tui::{self, App, Message, event};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// UI tick rate; also bounds how long a fresh panel value waits to be drawn.
const TICK_INTERVAL_MS: u64 = 250;

#[tokio::main]
async fn main() -> Result<(), MarketdashError> {
    let app_config = fetch_config()?;

    // Log to a file; stdout belongs to the terminal UI.
    let log_file = File::create(&app_config.log_file)
        .map_err(|e| MarketdashError::Io(format!("{}: {e}", app_config.log_file.display())))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let store = match &app_config.storage.settings_dir {
        Some(dir) => SettingsStore::new(FileStore::new(dir)),
        None => {
            warn!("no settings directory, indicator settings will not persist");
            SettingsStore::new(MemoryStore::new())
        }
    };

    let client = Arc::new(MarketClient::new(&app_config.api)?);
    info!(base_url = %client.base_url(), symbol = %app_config.dashboard.symbol, "starting dashboard");

    let dashboard = Dashboard::new(
        Arc::clone(&client),
        app_config.dashboard.symbol.clone(),
        app_config.dashboard.hidden_panels,
        store,
    );
    let mut app = App::new(dashboard);

    let mut terminal = tui::setup_terminal()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    event::spawn_event_reader(tx.clone());
    event::spawn_tick_timer(tx.clone(), TICK_INTERVAL_MS);

    if app_config.dashboard.live_updates {
        let (stream_tx, stream_rx) = mpsc::unbounded_channel();
        let market = StreamConnection::new(
            client.base_url().clone(),
            StreamChannel::Market(app_config.dashboard.symbol.clone()),
            tx.clone(),
            Some(stream_rx),
        );
        let news = StreamConnection::new(
            client.base_url().clone(),
            StreamChannel::News,
            tx.clone(),
            None,
        );
        tokio::spawn(market.run());
        tokio::spawn(news.run());
        app = app.with_market_stream(stream_tx);
    }

    let health_tx = tx.clone();
    let health_client = Arc::clone(&client);
    tokio::spawn(async move {
        let status = health_client.health().await.map_err(|e| e.to_string());
        if let Err(ref e) = status {
            warn!(error = %e, "backend health check failed");
        }
        let _ = health_tx.send(Message::Health(status));
    });

    let result = run(&mut terminal, &mut app, &mut rx).await;

    tui::restore_terminal(&mut terminal)?;
    info!("dashboard closed");
    result
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Message>,
) -> Result<(), MarketdashError> {
    loop {
        terminal
            .draw(|frame| tui::render(frame, app))
            .map_err(|e| MarketdashError::Io(format!("failed to draw: {e}")))?;

        let Some(message) = rx.recv().await else {
            break;
        };
        event::update(app, message);

        // Drain whatever queued up while drawing.
        while let Ok(message) = rx.try_recv() {
            event::update(app, message);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
