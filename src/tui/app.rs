//! Application state for the TUI.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::dashboard::{Dashboard, DashboardTab};
use crate::stream::{StreamChannel, StreamCommand, StreamEvent};

use super::input::text_input::TextInput;
use super::settings_dialog::SettingsDialog;

/// How long an error message stays in the status bar.
const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

/// Central application state container.
pub struct App {
    /// Panels, symbol, tab and settings.
    pub dashboard: Dashboard,
    /// Current input mode.
    pub mode: Mode,
    /// Pending symbol, only analyzed once submitted.
    pub symbol_input: TextInput,
    /// Selection state of the settings dialog while it is open.
    pub settings_dialog: SettingsDialog,
    /// Result of the startup health check.
    pub backend: BackendStatus,
    /// Whether each stream channel is currently connected.
    pub live: LiveStatus,
    /// Tells the market stream which symbol to follow.
    market_stream: Option<mpsc::UnboundedSender<StreamCommand>>,
    /// Error message to display (clears after timeout).
    pub error_message: Option<ErrorDisplay>,
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let symbol_input = TextInput::with_text(dashboard.symbol().as_str());
        Self {
            dashboard,
            mode: Mode::Normal,
            symbol_input,
            settings_dialog: SettingsDialog::default(),
            backend: BackendStatus::Unknown,
            live: LiveStatus::default(),
            market_stream: None,
            error_message: None,
            should_quit: false,
        }
    }

    /// Routes symbol changes to a market stream connection.
    #[must_use]
    pub fn with_market_stream(mut self, commands: mpsc::UnboundedSender<StreamCommand>) -> Self {
        self.market_stream = Some(commands);
        self
    }

    pub fn current_tab(&self) -> DashboardTab {
        self.dashboard.tab()
    }

    pub fn next_tab(&mut self) {
        let tab = self.dashboard.tab().next();
        self.dashboard.select_tab(tab);
    }

    pub fn previous_tab(&mut self) {
        let tab = self.dashboard.tab().previous();
        self.dashboard.select_tab(tab);
    }

    /// Submits the pending symbol input to the dashboard.
    pub fn submit_symbol(&mut self) {
        self.mode = Mode::Normal;
        if !self.dashboard.submit_symbol(self.symbol_input.as_str()) {
            return;
        }
        // Show the normalized form of what was submitted.
        self.symbol_input = TextInput::with_text(self.dashboard.symbol().as_str());
        if let Some(commands) = &self.market_stream {
            let _ = commands.send(StreamCommand::Follow(self.dashboard.symbol().clone()));
        }
    }

    /// Records a stream connection change or shows a pushed update.
    pub fn apply_stream(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Connected(channel) => self.live.set(&channel, true),
            StreamEvent::Disconnected(channel) => self.live.set(&channel, false),
            StreamEvent::Update(message) => {
                self.dashboard.apply_stream(message);
            }
        }
    }

    /// Opens the indicator settings dialog.
    pub fn open_settings(&mut self) {
        self.dashboard.open_settings();
        self.settings_dialog = SettingsDialog::default();
        self.mode = Mode::Settings;
    }

    /// Closes the settings dialog, committing the draft if `save` is set.
    pub fn close_settings(&mut self, save: bool) {
        if save {
            self.dashboard.save_settings();
        } else {
            self.dashboard.cancel_settings();
        }
        self.mode = Mode::Normal;
    }

    /// Sets an error message to display.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(ErrorDisplay {
            message: message.into(),
            timestamp: Instant::now(),
        });
    }

    /// Clears error messages older than 5 seconds.
    pub fn clear_stale_errors(&mut self) {
        if let Some(ref error) = self.error_message
            && error.timestamp.elapsed() > ERROR_DISPLAY_TIME
        {
            self.error_message = None;
        }
    }
}

/// Input modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Navigation between tabs and panels.
    #[default]
    Normal,
    /// Typing into the symbol input.
    Insert,
    /// The indicator settings dialog is open.
    Settings,
}

/// Reachability of the analysis backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Healthy,
    Unreachable(String),
}

impl BackendStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BackendStatus::Unknown => "Checking",
            BackendStatus::Healthy => "Online",
            BackendStatus::Unreachable(_) => "Offline",
        }
    }
}

/// Connection state of the stream channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveStatus {
    pub market: bool,
    pub news: bool,
}

impl LiveStatus {
    fn set(&mut self, channel: &StreamChannel, connected: bool) {
        match channel {
            StreamChannel::Market(_) => self.market = connected,
            StreamChannel::News => self.news = connected,
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.market, self.news) {
            (true, true) => "Live",
            (true, false) | (false, true) => "Partly live",
            (false, false) => "Polling",
        }
    }
}

/// An error message shown for a limited time.
#[derive(Clone, Debug)]
pub struct ErrorDisplay {
    pub message: String,
    pub timestamp: Instant,
}
