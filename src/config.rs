//! Application configuration loaded from environment variables.
//!
//! Every variable is optional:
//! - `MARKETDASH_API_URL`: base URL of the analysis API
//! - `MARKETDASH_REQUEST_TIMEOUT_SECS`: per-request timeout (transport default if unset)
//! - `MARKETDASH_SYMBOL`: symbol analyzed at startup
//! - `MARKETDASH_HIDDEN_PANELS`: `suspend` or `poll`, see [`HiddenPanelPolicy`]
//! - `MARKETDASH_LIVE_UPDATES`: `on` (default) or `off`, the WebSocket push channels
//! - `MARKETDASH_SETTINGS_DIR`: directory holding the indicator settings
//! - `MARKETDASH_LOG_FILE`: file receiving log output

use std::path::PathBuf;
use std::time::Duration;

use crate::dashboard::HiddenPanelPolicy;
use crate::models::Symbol;

/// Default API endpoint of a locally running backend.
const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default log file, relative to the working directory.
const DEFAULT_LOG_FILE: &str = "marketdash.log";

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub dashboard: DashboardConfig,
    pub storage: StorageConfig,
    pub log_file: PathBuf,
}

/// Remote API settings.
#[derive(Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
}

/// Dashboard startup state and polling policy.
#[derive(Debug)]
pub struct DashboardConfig {
    pub symbol: Symbol,
    pub hidden_panels: HiddenPanelPolicy,
    /// Connect to the backend's push channels alongside polling.
    pub live_updates: bool,
}

/// Where indicator settings are persisted.
#[derive(Debug)]
pub struct StorageConfig {
    /// `None` when no directory could be determined; settings then live in
    /// memory for the session only.
    pub settings_dir: Option<PathBuf>,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`MarketdashError::Config`](crate::MarketdashError::Config) if the
/// timeout is not a positive integer, the symbol is blank, or the hidden
/// panel policy or live update switch is not recognized.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let base_url = non_empty_var("MARKETDASH_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let timeout = match non_empty_var("MARKETDASH_REQUEST_TIMEOUT_SECS") {
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                return Err(crate::MarketdashError::Config(format!(
                    "MARKETDASH_REQUEST_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                )));
            }
        },
        None => None,
    };

    let symbol = match non_empty_var("MARKETDASH_SYMBOL") {
        Some(raw) => Symbol::parse(&raw).ok_or_else(|| {
            crate::MarketdashError::Config("MARKETDASH_SYMBOL is blank".to_string())
        })?,
        None => Symbol::default(),
    };

    let hidden_panels = match non_empty_var("MARKETDASH_HIDDEN_PANELS") {
        Some(raw) => raw.parse::<HiddenPanelPolicy>()?,
        None => HiddenPanelPolicy::default(),
    };

    let live_updates = match non_empty_var("MARKETDASH_LIVE_UPDATES") {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => true,
            "off" | "false" | "0" => false,
            _ => {
                return Err(crate::MarketdashError::Config(format!(
                    "MARKETDASH_LIVE_UPDATES must be on or off, got {raw:?}"
                )));
            }
        },
        None => true,
    };

    let settings_dir = non_empty_var("MARKETDASH_SETTINGS_DIR")
        .map(PathBuf::from)
        .or_else(|| non_empty_var("HOME").map(|home| PathBuf::from(home).join(".config/marketdash")));

    let log_file = non_empty_var("MARKETDASH_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    Ok(AppConfig {
        api: ApiConfig { base_url, timeout },
        dashboard: DashboardConfig {
            symbol,
            hidden_panels,
            live_updates,
        },
        storage: StorageConfig { settings_dir },
        log_file,
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 7] = [
        "MARKETDASH_API_URL",
        "MARKETDASH_REQUEST_TIMEOUT_SECS",
        "MARKETDASH_SYMBOL",
        "MARKETDASH_HIDDEN_PANELS",
        "MARKETDASH_LIVE_UPDATES",
        "MARKETDASH_SETTINGS_DIR",
        "MARKETDASH_LOG_FILE",
    ];

    /// Serializes tests that mutate the process environment.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    /// Helper that temporarily sets env vars, runs `f`, then restores originals.
    ///
    /// Every variable in [`VARS`] not listed in `vars` is cleared for the
    /// duration of `f`.
    fn with_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let originals: Vec<(&str, Option<String>)> =
            VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();

        for k in VARS {
            let value = vars.iter().find(|(name, _)| *name == k).and_then(|(_, v)| *v);
            // SAFETY: ENV_LOCK serializes every test that touches these variables.
            unsafe {
                match value {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values, same single-threaded context.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn defaults_without_env_vars() {
        with_env(&[], || {
            let config = fetch_config().unwrap();
            assert_eq!(config.api.base_url, DEFAULT_API_URL);
            assert!(config.api.timeout.is_none());
            assert_eq!(config.dashboard.symbol.as_str(), "AAPL");
            assert_eq!(config.dashboard.hidden_panels, HiddenPanelPolicy::Suspend);
            assert!(config.dashboard.live_updates);
            assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        });
    }

    #[test]
    fn reads_overrides_from_env() {
        with_env(
            &[
                ("MARKETDASH_API_URL", Some("http://analysis.internal:9000/api/v1")),
                ("MARKETDASH_REQUEST_TIMEOUT_SECS", Some("15")),
                ("MARKETDASH_SYMBOL", Some(" usdjpy ")),
                ("MARKETDASH_HIDDEN_PANELS", Some("poll")),
                ("MARKETDASH_SETTINGS_DIR", Some("/tmp/marketdash")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.api.base_url, "http://analysis.internal:9000/api/v1");
                assert_eq!(config.api.timeout, Some(Duration::from_secs(15)));
                assert_eq!(config.dashboard.symbol.as_str(), "USDJPY");
                assert_eq!(config.dashboard.hidden_panels, HiddenPanelPolicy::KeepPolling);
                assert_eq!(
                    config.storage.settings_dir,
                    Some(PathBuf::from("/tmp/marketdash"))
                );
            },
        );
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        with_env(&[("MARKETDASH_REQUEST_TIMEOUT_SECS", Some("soon"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("MARKETDASH_REQUEST_TIMEOUT_SECS"));
        });
    }

    #[test]
    fn rejects_zero_timeout() {
        with_env(&[("MARKETDASH_REQUEST_TIMEOUT_SECS", Some("0"))], || {
            assert!(fetch_config().is_err());
        });
    }

    #[test]
    fn rejects_blank_symbol() {
        with_env(&[("MARKETDASH_SYMBOL", Some("   "))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("MARKETDASH_SYMBOL"));
        });
    }

    #[test]
    fn rejects_unknown_panel_policy() {
        with_env(&[("MARKETDASH_HIDDEN_PANELS", Some("sometimes"))], || {
            assert!(fetch_config().is_err());
        });
    }

    #[test]
    fn live_updates_can_be_switched_off() {
        with_env(&[("MARKETDASH_LIVE_UPDATES", Some("OFF"))], || {
            assert!(!fetch_config().unwrap().dashboard.live_updates);
        });
        with_env(&[("MARKETDASH_LIVE_UPDATES", Some("maybe"))], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("MARKETDASH_LIVE_UPDATES"));
        });
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[
                ("MARKETDASH_API_URL", Some("")),
                ("MARKETDASH_SYMBOL", Some("")),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.api.base_url, DEFAULT_API_URL);
                assert_eq!(config.dashboard.symbol.as_str(), "AAPL");
            },
        );
    }
}
