//! Indicator configuration.
//!
//! [`IndicatorSettings`] is the record the chart view renders against. It is
//! loaded once at startup by [`store::SettingsStore`], edited only through
//! the draft held by [`editor::SettingsEditor`], and changed exclusively via
//! the typed [`SettingsUpdate`] reducer.

pub mod editor;
pub mod store;

pub use editor::SettingsEditor;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Period offset used when appending a moving-average line.
const PERIOD_STEP: u32 = 10;

/// Indicator categories, in the order they are shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Indicator {
    Sma,
    Ema,
    Rsi,
    Macd,
    Stochastic,
    BollingerBands,
    Atr,
    Volume,
    Obv,
}

impl Indicator {
    /// All categories in display order.
    pub const ALL: [Indicator; 9] = [
        Self::Sma,
        Self::Ema,
        Self::Rsi,
        Self::Macd,
        Self::Stochastic,
        Self::BollingerBands,
        Self::Atr,
        Self::Volume,
        Self::Obv,
    ];

    /// Returns the storage key of the category.
    pub fn key(self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Stochastic => "stochastic",
            Self::BollingerBands => "bollingerBands",
            Self::Atr => "atr",
            Self::Volume => "volume",
            Self::Obv => "obv",
        }
    }

    /// Looks a category up by storage key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.key() == key)
    }

    /// Returns a human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sma => "Simple Moving Average (SMA)",
            Self::Ema => "Exponential Moving Average (EMA)",
            Self::Rsi => "RSI",
            Self::Macd => "MACD",
            Self::Stochastic => "Stochastic",
            Self::BollingerBands => "Bollinger Bands",
            Self::Atr => "ATR",
            Self::Volume => "Volume",
            Self::Obv => "OBV",
        }
    }

    /// Builds the update that switches this category on or off.
    pub fn toggle(self, enabled: bool) -> SettingsUpdate {
        match self {
            Self::Sma => SettingsUpdate::Sma(MovingAverageEdit::Enabled(enabled)),
            Self::Ema => SettingsUpdate::Ema(MovingAverageEdit::Enabled(enabled)),
            Self::Rsi => SettingsUpdate::Rsi(RsiEdit::Enabled(enabled)),
            Self::Macd => SettingsUpdate::Macd(MacdEdit::Enabled(enabled)),
            Self::Stochastic => SettingsUpdate::Stochastic(StochasticEdit::Enabled(enabled)),
            Self::BollingerBands => SettingsUpdate::BollingerBands(BollingerEdit::Enabled(enabled)),
            Self::Atr => SettingsUpdate::Atr(AtrEdit::Enabled(enabled)),
            Self::Volume => SettingsUpdate::Volume(ToggleEdit::Enabled(enabled)),
            Self::Obv => SettingsUpdate::Obv(ToggleEdit::Enabled(enabled)),
        }
    }
}

/// Complete indicator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSettings {
    pub sma: MovingAverageSettings,
    pub ema: MovingAverageSettings,
    pub rsi: RsiSettings,
    pub macd: MacdSettings,
    pub stochastic: StochasticSettings,
    pub bollinger_bands: BollingerSettings,
    pub atr: AtrSettings,
    pub volume: ToggleSettings,
    pub obv: ToggleSettings,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma: MovingAverageSettings {
                enabled: true,
                periods: vec![20, 50, 200],
                colors: vec![
                    "#2196F3".to_string(),
                    "#FF9800".to_string(),
                    "#9C27B0".to_string(),
                ],
            },
            ema: MovingAverageSettings {
                enabled: false,
                periods: vec![12, 26],
                colors: vec!["#4CAF50".to_string(), "#F44336".to_string()],
            },
            rsi: RsiSettings {
                enabled: true,
                period: 14,
                overbought: 70,
                oversold: 30,
            },
            macd: MacdSettings {
                enabled: true,
                fast_period: 12,
                slow_period: 26,
                signal_period: 9,
            },
            stochastic: StochasticSettings {
                enabled: false,
                k_period: 14,
                d_period: 3,
                overbought: 80,
                oversold: 20,
            },
            bollinger_bands: BollingerSettings {
                enabled: true,
                period: 20,
                std_dev: 2.0,
            },
            atr: AtrSettings {
                enabled: false,
                period: 14,
            },
            volume: ToggleSettings { enabled: true },
            obv: ToggleSettings { enabled: false },
        }
    }
}

impl IndicatorSettings {
    /// Returns whether a category is switched on.
    pub fn is_enabled(&self, indicator: Indicator) -> bool {
        match indicator {
            Indicator::Sma => self.sma.enabled,
            Indicator::Ema => self.ema.enabled,
            Indicator::Rsi => self.rsi.enabled,
            Indicator::Macd => self.macd.enabled,
            Indicator::Stochastic => self.stochastic.enabled,
            Indicator::BollingerBands => self.bollinger_bands.enabled,
            Indicator::Atr => self.atr.enabled,
            Indicator::Volume => self.volume.enabled,
            Indicator::Obv => self.obv.enabled,
        }
    }

    /// Returns the enabled categories in display order.
    pub fn enabled(&self) -> Vec<Indicator> {
        Indicator::ALL
            .into_iter()
            .filter(|i| self.is_enabled(*i))
            .collect()
    }

    /// Applies a single edit.
    ///
    /// Returns `false` when the edit was rejected, e.g. removing the last
    /// moving-average period or addressing an index that does not exist.
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        match update {
            SettingsUpdate::Sma(edit) => self.sma.apply(edit),
            SettingsUpdate::Ema(edit) => self.ema.apply(edit),
            SettingsUpdate::Rsi(edit) => {
                match edit {
                    RsiEdit::Enabled(v) => self.rsi.enabled = v,
                    RsiEdit::Period(v) => self.rsi.period = v,
                    RsiEdit::Overbought(v) => self.rsi.overbought = v,
                    RsiEdit::Oversold(v) => self.rsi.oversold = v,
                }
                true
            }
            SettingsUpdate::Macd(edit) => {
                match edit {
                    MacdEdit::Enabled(v) => self.macd.enabled = v,
                    MacdEdit::FastPeriod(v) => self.macd.fast_period = v,
                    MacdEdit::SlowPeriod(v) => self.macd.slow_period = v,
                    MacdEdit::SignalPeriod(v) => self.macd.signal_period = v,
                }
                true
            }
            SettingsUpdate::Stochastic(edit) => {
                match edit {
                    StochasticEdit::Enabled(v) => self.stochastic.enabled = v,
                    StochasticEdit::KPeriod(v) => self.stochastic.k_period = v,
                    StochasticEdit::DPeriod(v) => self.stochastic.d_period = v,
                    StochasticEdit::Overbought(v) => self.stochastic.overbought = v,
                    StochasticEdit::Oversold(v) => self.stochastic.oversold = v,
                }
                true
            }
            SettingsUpdate::BollingerBands(edit) => {
                match edit {
                    BollingerEdit::Enabled(v) => self.bollinger_bands.enabled = v,
                    BollingerEdit::Period(v) => self.bollinger_bands.period = v,
                    BollingerEdit::StdDev(v) => self.bollinger_bands.std_dev = v,
                }
                true
            }
            SettingsUpdate::Atr(edit) => {
                match edit {
                    AtrEdit::Enabled(v) => self.atr.enabled = v,
                    AtrEdit::Period(v) => self.atr.period = v,
                }
                true
            }
            SettingsUpdate::Volume(ToggleEdit::Enabled(v)) => {
                self.volume.enabled = v;
                true
            }
            SettingsUpdate::Obv(ToggleEdit::Enabled(v)) => {
                self.obv.enabled = v;
                true
            }
        }
    }

    /// Restores the moving-average alignment invariant after loading data
    /// that did not pass through the reducer.
    pub(crate) fn repair(&mut self) {
        let defaults = Self::default();
        self.sma.repair("sma", &defaults.sma);
        self.ema.repair("ema", &defaults.ema);
    }
}

/// A moving-average family drawn as one line per period.
///
/// `periods` and `colors` are index-aligned and never empty; the fields are
/// private so that only [`MovingAverageEdit`] can change their shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSettings {
    pub enabled: bool,
    periods: Vec<u32>,
    colors: Vec<String>,
}

impl MovingAverageSettings {
    /// Returns the configured periods.
    pub fn periods(&self) -> &[u32] {
        &self.periods
    }

    /// Returns the line colors, one per period.
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Iterates `(period, color)` pairs.
    pub fn lines(&self) -> impl Iterator<Item = (u32, &str)> {
        self.periods
            .iter()
            .copied()
            .zip(self.colors.iter().map(String::as_str))
    }

    fn apply(&mut self, edit: MovingAverageEdit) -> bool {
        match edit {
            MovingAverageEdit::Enabled(v) => {
                self.enabled = v;
                true
            }
            MovingAverageEdit::AddPeriod => {
                let next = self
                    .periods
                    .iter()
                    .max()
                    .map_or(PERIOD_STEP, |max| max.saturating_add(PERIOD_STEP));
                self.periods.push(next);
                self.colors.push(random_color());
                true
            }
            MovingAverageEdit::RemovePeriod(index) => {
                if self.periods.len() <= 1 || index >= self.periods.len() {
                    return false;
                }
                self.periods.remove(index);
                self.colors.remove(index);
                true
            }
            MovingAverageEdit::Period { index, value } => match self.periods.get_mut(index) {
                Some(period) => {
                    *period = value;
                    true
                }
                None => false,
            },
            MovingAverageEdit::Color { index, color } => match self.colors.get_mut(index) {
                Some(slot) => {
                    *slot = color;
                    true
                }
                None => false,
            },
        }
    }

    fn repair(&mut self, key: &str, defaults: &Self) {
        if self.periods.is_empty() {
            warn!(key, "stored moving average has no periods, using defaults");
            self.periods = defaults.periods.clone();
            self.colors = defaults.colors.clone();
            return;
        }
        if self.colors.len() != self.periods.len() {
            warn!(
                key,
                periods = self.periods.len(),
                colors = self.colors.len(),
                "realigning moving average colors"
            );
            self.colors.truncate(self.periods.len());
            while self.colors.len() < self.periods.len() {
                self.colors.push(random_color());
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RsiSettings {
    pub enabled: bool,
    pub period: u32,
    pub overbought: u32,
    pub oversold: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdSettings {
    pub enabled: bool,
    pub fast_period: u32,
    pub slow_period: u32,
    pub signal_period: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StochasticSettings {
    pub enabled: bool,
    pub k_period: u32,
    pub d_period: u32,
    pub overbought: u32,
    pub oversold: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerSettings {
    pub enabled: bool,
    pub period: u32,
    pub std_dev: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtrSettings {
    pub enabled: bool,
    pub period: u32,
}

/// Categories with no parameters besides the on/off switch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToggleSettings {
    pub enabled: bool,
}

/// One edit to the configuration, tagged by category.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingsUpdate {
    Sma(MovingAverageEdit),
    Ema(MovingAverageEdit),
    Rsi(RsiEdit),
    Macd(MacdEdit),
    Stochastic(StochasticEdit),
    BollingerBands(BollingerEdit),
    Atr(AtrEdit),
    Volume(ToggleEdit),
    Obv(ToggleEdit),
}

#[derive(Clone, Debug, PartialEq)]
pub enum MovingAverageEdit {
    Enabled(bool),
    /// Appends `max(periods) + 10` with a freshly generated color.
    AddPeriod,
    /// Removes the period and its color; rejected when one period remains.
    RemovePeriod(usize),
    Period { index: usize, value: u32 },
    Color { index: usize, color: String },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RsiEdit {
    Enabled(bool),
    Period(u32),
    Overbought(u32),
    Oversold(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MacdEdit {
    Enabled(bool),
    FastPeriod(u32),
    SlowPeriod(u32),
    SignalPeriod(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StochasticEdit {
    Enabled(bool),
    KPeriod(u32),
    DPeriod(u32),
    Overbought(u32),
    Oversold(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BollingerEdit {
    Enabled(bool),
    Period(u32),
    StdDev(f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AtrEdit {
    Enabled(bool),
    Period(u32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToggleEdit {
    Enabled(bool),
}

/// Generates a random `#rrggbb` color.
pub fn random_color() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..=0xFF_FFFF);
    format!("#{value:06x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(settings: &mut IndicatorSettings) -> bool {
        settings.apply(SettingsUpdate::Sma(MovingAverageEdit::AddPeriod))
    }

    fn remove(settings: &mut IndicatorSettings, index: usize) -> bool {
        settings.apply(SettingsUpdate::Sma(MovingAverageEdit::RemovePeriod(index)))
    }

    #[test]
    fn defaults_are_aligned() {
        let settings = IndicatorSettings::default();
        assert_eq!(settings.sma.periods(), &[20, 50, 200]);
        assert_eq!(settings.sma.colors().len(), 3);
        assert_eq!(settings.ema.periods(), &[12, 26]);
        assert_eq!(settings.ema.colors().len(), 2);
    }

    #[test]
    fn add_period_steps_past_max() {
        let mut settings = IndicatorSettings::default();
        assert!(add(&mut settings));
        assert_eq!(settings.sma.periods(), &[20, 50, 200, 210]);
        assert_eq!(settings.sma.colors().len(), 4);
    }

    #[test]
    fn add_period_uses_max_not_last() {
        let mut settings = IndicatorSettings::default();
        settings.apply(SettingsUpdate::Sma(MovingAverageEdit::Period {
            index: 2,
            value: 5,
        }));
        add(&mut settings);
        assert_eq!(settings.sma.periods().last(), Some(&60));
    }

    #[test]
    fn remove_period_drops_paired_color() {
        let mut settings = IndicatorSettings::default();
        assert!(remove(&mut settings, 1));
        assert_eq!(settings.sma.periods(), &[20, 200]);
        assert_eq!(settings.sma.colors(), &["#2196F3", "#9C27B0"]);
    }

    #[test]
    fn remove_last_period_is_rejected() {
        let mut settings = IndicatorSettings::default();
        assert!(remove(&mut settings, 0));
        assert!(remove(&mut settings, 0));
        assert!(!remove(&mut settings, 0));
        assert_eq!(settings.sma.periods(), &[200]);
        assert_eq!(settings.sma.colors().len(), 1);
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        let mut settings = IndicatorSettings::default();
        assert!(!remove(&mut settings, 7));
        assert_eq!(settings.sma.periods().len(), 3);
    }

    #[test]
    fn arbitrary_edit_sequences_keep_alignment() {
        let mut settings = IndicatorSettings::default();
        let script = [1, 0, 0, 1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 1];
        for (step, op) in script.iter().enumerate() {
            if *op == 1 {
                add(&mut settings);
            } else {
                remove(&mut settings, step % 3);
            }
            assert_eq!(settings.sma.periods().len(), settings.sma.colors().len());
            assert!(!settings.sma.periods().is_empty());
        }
    }

    #[test]
    fn duplicate_and_unsorted_periods_are_allowed() {
        let mut settings = IndicatorSettings::default();
        assert!(settings.apply(SettingsUpdate::Sma(MovingAverageEdit::Period {
            index: 0,
            value: 200,
        })));
        assert_eq!(settings.sma.periods(), &[200, 50, 200]);
    }

    #[test]
    fn random_color_is_hex() {
        for _ in 0..50 {
            let color = random_color();
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn category_edits_touch_only_their_record() {
        let mut settings = IndicatorSettings::default();
        settings.apply(SettingsUpdate::Rsi(RsiEdit::Overbought(75)));
        settings.apply(SettingsUpdate::BollingerBands(BollingerEdit::StdDev(2.5)));
        settings.apply(Indicator::Obv.toggle(true));
        assert_eq!(settings.rsi.overbought, 75);
        assert_eq!(settings.rsi.oversold, 30);
        assert_eq!(settings.bollinger_bands.std_dev, 2.5);
        assert!(settings.obv.enabled);
        assert_eq!(settings.macd, IndicatorSettings::default().macd);
    }

    #[test]
    fn enabled_lists_categories_in_order() {
        let settings = IndicatorSettings::default();
        assert_eq!(
            settings.enabled(),
            vec![
                Indicator::Sma,
                Indicator::Rsi,
                Indicator::Macd,
                Indicator::BollingerBands,
                Indicator::Volume
            ]
        );
    }

    #[test]
    fn repair_realigns_colors() {
        let mut settings: IndicatorSettings = serde_json::from_value(serde_json::json!({
            "sma": { "enabled": true, "periods": [5, 10, 15], "colors": ["#000000"] },
            "ema": { "enabled": false, "periods": [], "colors": [] },
            "rsi": { "enabled": true, "period": 14, "overbought": 70, "oversold": 30 },
            "macd": { "enabled": true, "fastPeriod": 12, "slowPeriod": 26, "signalPeriod": 9 },
            "stochastic": { "enabled": false, "kPeriod": 14, "dPeriod": 3, "overbought": 80, "oversold": 20 },
            "bollingerBands": { "enabled": true, "period": 20, "stdDev": 2.0 },
            "atr": { "enabled": false, "period": 14 },
            "volume": { "enabled": true },
            "obv": { "enabled": false }
        }))
        .unwrap();
        settings.repair();
        assert_eq!(settings.sma.colors().len(), 3);
        assert_eq!(settings.sma.colors()[0], "#000000");
        assert_eq!(settings.ema.periods(), &[12, 26]);
    }

    #[test]
    fn indicator_keys_round_trip() {
        for indicator in Indicator::ALL {
            assert_eq!(Indicator::from_key(indicator.key()), Some(indicator));
        }
        assert_eq!(Indicator::from_key("vwap"), None);
    }
}
