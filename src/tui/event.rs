//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::dashboard::DashboardTab;
use crate::settings::MovingAverageEdit;
use crate::stream::StreamEvent;

use super::app::{App, BackendStatus, Mode};
use super::input::text_input::TextInput;
use super::settings_dialog::{self, Row};

/// Events that can occur in the application.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),
    /// Outcome of the backend health check.
    Health(Result<(), String>),
    /// Connection change or pushed update from a stream channel.
    Stream(StreamEvent),
    /// Request to quit the application.
    Quit,
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        loop {
            // Poll for events with a 50ms timeout
            match tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await
            {
                Ok(Some(CrosstermEvent::Key(key))) => {
                    if tx.send(Message::Input(Event::Key(key))).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(w, h))) => {
                    if tx.send(Message::Input(Event::Resize(w, h))).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Message>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Message::Input(Event::Tick)).is_err() {
                break;
            }
        }
    });
}

/// Updates application state based on a message.
pub fn update(app: &mut App, message: Message) {
    match message {
        Message::Input(event) => handle_input(app, event),
        Message::Health(Ok(())) => app.backend = BackendStatus::Healthy,
        Message::Health(Err(e)) => {
            app.show_error(format!("backend unreachable: {e}"));
            app.backend = BackendStatus::Unreachable(e);
        }
        Message::Stream(event) => app.apply_stream(event),
        Message::Quit => app.should_quit = true,
    }
}

fn handle_input(app: &mut App, event: Event) {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, _) => {}
        Event::Tick => app.clear_stale_errors(),
    }
}

/// Handles key press events.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Insert => handle_insert_mode(app, key),
        Mode::Settings => handle_settings_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.previous_tab();
            } else {
                app.next_tab();
            }
        }
        KeyCode::BackTab => app.previous_tab(),
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            if let Some(tab) = DashboardTab::from_index(index) {
                app.dashboard.select_tab(tab);
            }
        }
        KeyCode::Char('/') | KeyCode::Char('i') => {
            app.symbol_input.move_end();
            app.mode = Mode::Insert;
        }
        KeyCode::Char('r') => app.dashboard.refresh_visible(),
        KeyCode::Char('s') => app.open_settings(),
        _ => {
            if app.current_tab() == DashboardTab::Charts {
                handle_charts_tab_keys(app, key);
            }
        }
    }
}

fn handle_charts_tab_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.dashboard.focus_previous_chart(),
        KeyCode::Char('l') | KeyCode::Right => app.dashboard.focus_next_chart(),
        KeyCode::Enter | KeyCode::Char(' ') => app.dashboard.toggle_focused_chart(),
        _ => {}
    }
}

/// Handles keys while typing a symbol. Nothing is analyzed until Enter.
fn handle_insert_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_symbol(),
        KeyCode::Esc => app.mode = Mode::Normal,
        KeyCode::Char(c) => app.symbol_input.insert(c),
        KeyCode::Backspace => app.symbol_input.backspace(),
        KeyCode::Delete => app.symbol_input.delete(),
        KeyCode::Left => app.symbol_input.move_left(),
        KeyCode::Right => app.symbol_input.move_right(),
        KeyCode::Home => app.symbol_input.move_home(),
        KeyCode::End => app.symbol_input.move_end(),
        _ => {}
    }
}

fn handle_settings_mode(app: &mut App, key: KeyEvent) {
    let Some(editor) = app.dashboard.settings_editor() else {
        app.mode = Mode::Normal;
        return;
    };
    let rows = settings_dialog::rows(editor.draft());
    let Some(&row) = rows.get(app.settings_dialog.selected) else {
        app.settings_dialog.clamp(rows.len());
        return;
    };

    if let Some(input) = app.settings_dialog.editing.as_mut() {
        match key.code {
            KeyCode::Enter => {
                let text = input.take();
                app.settings_dialog.editing = None;
                if let Some(update) = row.number_update(&text) {
                    app.dashboard.edit_settings(update);
                }
            }
            KeyCode::Esc => app.settings_dialog.editing = None,
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => input.insert(c),
            KeyCode::Backspace => input.backspace(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.close_settings(false),
        KeyCode::Char('w') => app.close_settings(true),
        KeyCode::Char('r') => app.dashboard.reset_settings(),
        KeyCode::Up | KeyCode::Char('k') => app.settings_dialog.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.settings_dialog.select_next(rows.len()),
        KeyCode::Char(' ') => {
            if let Row::Toggle(indicator) = row {
                let enabled = !editor.draft().is_enabled(indicator);
                app.dashboard.edit_settings(indicator.toggle(enabled));
            }
        }
        KeyCode::Enter => {
            if row.is_numeric() {
                app.settings_dialog.editing = Some(TextInput::with_text(&row.value(editor.draft())));
            }
        }
        KeyCode::Char('a') => {
            if let Some(family) = row.family() {
                app.dashboard.edit_settings(family.wrap(MovingAverageEdit::AddPeriod));
            }
        }
        KeyCode::Char('d') => {
            if let Row::MaPeriod { family, index } = row
                && !app
                    .dashboard
                    .edit_settings(family.wrap(MovingAverageEdit::RemovePeriod(index)))
            {
                app.show_error("at least one period is required");
            }
        }
        _ => {}
    }

    if let Some(editor) = app.dashboard.settings_editor() {
        app.settings_dialog
            .clamp(settings_dialog::rows(editor.draft()).len());
    }
}
