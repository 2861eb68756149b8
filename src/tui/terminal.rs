//! Terminal lifecycle for the dashboard.
//!
//! The dashboard draws on the alternate screen in raw mode. Both are undone
//! by [`restore_terminal`] on a normal exit, and by a panic hook when the
//! process panics, so a crash never leaves the shell unusable.

use std::io::{self, IsTerminal, Stdout};
use std::panic;
use std::sync::Once;

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::{MarketdashError, Result};

/// The dashboard's terminal.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Takes over the terminal for drawing.
///
/// Installs the restoring panic hook, enables raw mode, switches to the
/// alternate screen and hides the cursor. Any step that fails undoes the
/// ones before it.
///
/// # Errors
///
/// Returns [`MarketdashError::Io`] if stdout is not a TTY or the terminal
/// cannot be configured.
pub fn setup_terminal() -> Result<Tui> {
    if !io::stdout().is_terminal() {
        return Err(MarketdashError::Io(
            "marketdash draws a full-screen dashboard and needs stdout to be a terminal".to_string(),
        ));
    }
    install_panic_hook();

    enable_raw_mode().map_err(|e| MarketdashError::Io(format!("failed to enable raw mode: {e}")))?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
        let _ = reset_terminal();
        return Err(MarketdashError::Io(format!(
            "failed to enter alternate screen: {e}"
        )));
    }

    Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| {
        let _ = reset_terminal();
        MarketdashError::Io(format!("failed to create terminal: {e}"))
    })
}

/// Hands the terminal back to the shell.
///
/// # Errors
///
/// Returns [`MarketdashError::Io`] if the terminal could not be reset.
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    reset_terminal().map_err(|e| MarketdashError::Io(format!("failed to restore terminal: {e}")))?;
    terminal
        .show_cursor()
        .map_err(|e| MarketdashError::Io(e.to_string()))
}

/// Leaves the alternate screen and raw mode. Safe to call more than once.
fn reset_terminal() -> io::Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    disable_raw_mode()
}

/// Chains a terminal reset in front of the current panic hook, once.
fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = reset_terminal();
            original_hook(panic_info);
        }));
    });
}
