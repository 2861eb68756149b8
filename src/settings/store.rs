//! Durable storage of the indicator configuration.
//!
//! The configuration lives under a single fixed key in a [`KeyValueStore`].
//! Loading never fails: absent, corrupt or unreadable data degrades to the
//! built-in defaults. Saving never fails either; a write error is logged
//! and the caller's in-memory settings stay authoritative for the session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{Indicator, IndicatorSettings};
use crate::{MarketdashError, Result};

/// Storage key holding the serialized settings.
pub const SETTINGS_KEY: &str = "market_analysis_indicator_settings";

/// A durable string key-value store.
///
/// Implementations are single-writer; concurrent processes sharing a
/// backing store are not synchronized and the last write wins.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the directory holding the entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MarketdashError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            MarketdashError::Storage(format!("failed to create {}: {e}", self.dir.display()))
        })?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|e| {
            MarketdashError::Storage(format!("failed to write {}: {e}", path.display()))
        })
    }
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| MarketdashError::Storage("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| MarketdashError::Storage("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads and saves [`IndicatorSettings`] through a [`KeyValueStore`].
pub struct SettingsStore {
    backend: Box<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Reads the persisted settings merged over the defaults.
    ///
    /// Never fails; every fault is logged and answered with defaults.
    pub fn load(&self) -> IndicatorSettings {
        let raw = match self.backend.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored indicator settings, using defaults");
                return IndicatorSettings::default();
            }
            Err(e) => {
                warn!(error = %e, "failed to read indicator settings, using defaults");
                return IndicatorSettings::default();
            }
        };

        match merge_stored(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "stored indicator settings are corrupt, using defaults");
                IndicatorSettings::default()
            }
        }
    }

    /// Persists `settings`. Failures are logged and otherwise ignored.
    pub fn save(&self, settings: &IndicatorSettings) {
        let result = serde_json::to_string(settings)
            .map_err(MarketdashError::from)
            .and_then(|json| self.backend.set(SETTINGS_KEY, &json));
        match result {
            Ok(()) => info!("saved indicator settings"),
            Err(e) => warn!(error = %e, "failed to save indicator settings"),
        }
    }
}

/// Merges a stored JSON object over the defaults, key by key.
///
/// A stored category replaces its default record; parameters missing from
/// the stored record are taken from that category's defaults. This one
/// level of default fill departs from strict replacement of the category.
/// The merge reaches into a category's own fields and no deeper, so nested
/// values such as the moving-average `periods` and `colors` lists are
/// replaced whole and never combined element by element. Categories that are absent or fail to
/// decode keep their defaults, and unknown keys are dropped.
///
/// # Errors
///
/// Returns [`MarketdashError::Json`] if `raw` is not a JSON object.
pub fn merge_stored(raw: &str) -> Result<IndicatorSettings> {
    let stored: Map<String, Value> = serde_json::from_str(raw)?;
    let defaults = serde_json::to_value(IndicatorSettings::default())?;
    let mut merged = defaults.clone();

    for (key, value) in stored {
        if Indicator::from_key(&key).is_none() {
            debug!(key = %key, "dropping unknown stored indicator key");
            continue;
        }

        let mut candidate = merged.clone();
        if let Some(slot) = candidate.get_mut(&key) {
            let base = defaults.get(&key).cloned().unwrap_or(Value::Null);
            *slot = overlay(base, value);
        }

        match serde_json::from_value::<IndicatorSettings>(candidate.clone()) {
            Ok(_) => merged = candidate,
            Err(e) => warn!(key = %key, error = %e, "ignoring undecodable stored indicator entry"),
        }
    }

    let mut settings: IndicatorSettings = serde_json::from_value(merged)?;
    settings.repair();
    Ok(settings)
}

/// Replaces a default record with a stored one, keeping default values for
/// fields the stored record does not carry.
fn overlay(base: Value, stored: Value) -> Value {
    match (base, stored) {
        (Value::Object(mut base), Value::Object(stored)) => {
            for (k, v) in stored {
                base.insert(k, v);
            }
            Value::Object(base)
        }
        (_, stored) => stored,
    }
}
