//! Top-level dashboard state: the analyzed symbol, the visible tab, the
//! committed indicator settings and every display panel.
//!
//! The dashboard is the single owner of the settings. Panels and views
//! read them through [`Dashboard::subscribe_settings`]; only a saved
//! settings editor writes them back.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::chart_view::MultiChartView;
use crate::client::{DEFAULT_NEWS_LIMIT, MarketApi};
use crate::models::{DASHBOARD_TIMEFRAMES, NewsItem, Symbol, Timeframe};
use crate::panels::{
    self, CalendarPanel, ChartBatchPanel, ChartDetailPanel, ConsensusPanel, NewsPanel,
    QuotePanel, SentimentPanel, SignalPanel, SignalSetPanel, TrendPanel,
};
use crate::settings::store::SettingsStore;
use crate::settings::{IndicatorSettings, SettingsEditor, SettingsUpdate};
use crate::stream::{MarketUpdate, NewsUpdate, StreamMessage};
use crate::{MarketdashError, Result};

/// Whether panels on hidden tabs keep polling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HiddenPanelPolicy {
    /// Hidden panels pause and catch up when their tab is shown again.
    #[default]
    Suspend,
    /// Every panel polls regardless of visibility.
    KeepPolling,
}

impl FromStr for HiddenPanelPolicy {
    type Err = MarketdashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suspend" => Ok(Self::Suspend),
            "poll" => Ok(Self::KeepPolling),
            other => Err(MarketdashError::Config(format!(
                "unknown hidden panel policy {other:?}, expected \"suspend\" or \"poll\""
            ))),
        }
    }
}

/// Dashboard views, in display order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DashboardTab {
    #[default]
    Overview,
    Trend,
    Signals,
    News,
    Charts,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 5] = [
        DashboardTab::Overview,
        DashboardTab::Trend,
        DashboardTab::Signals,
        DashboardTab::News,
        DashboardTab::Charts,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DashboardTab::Overview => "Overview",
            DashboardTab::Trend => "Trend",
            DashboardTab::Signals => "Signals",
            DashboardTab::News => "News",
            DashboardTab::Charts => "Charts",
        }
    }

    /// Position in [`DashboardTab::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tab at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

pub struct OverviewPanels {
    pub quote: QuotePanel,
    pub signal: SignalPanel,
    pub trend: TrendPanel,
}

pub struct TrendPanels {
    pub trend: TrendPanel,
    pub consensus: ConsensusPanel,
}

pub struct SignalPanels {
    /// Signals for every dashboard timeframe.
    pub all: SignalSetPanel,
}

pub struct NewsPanels {
    pub news: NewsPanel,
    pub calendar: CalendarPanel,
    pub sentiment: SentimentPanel,
}

pub struct ChartPanels {
    pub batch: ChartBatchPanel,
    pub detail: ChartDetailPanel,
}

/// Timeframe of the overview's signal panel.
const OVERVIEW_SIGNAL_TIMEFRAME: Timeframe = Timeframe::H1;

/// The dashboard controller.
pub struct Dashboard {
    symbol: Symbol,
    tab: DashboardTab,
    policy: HiddenPanelPolicy,
    store: SettingsStore,
    settings_tx: watch::Sender<IndicatorSettings>,
    editor: Option<SettingsEditor>,
    chart_view: MultiChartView,
    pub overview: OverviewPanels,
    pub trend: TrendPanels,
    pub signals: SignalPanels,
    pub news: NewsPanels,
    pub charts: ChartPanels,
}

impl Dashboard {
    /// Loads the committed settings from `store` and starts every panel
    /// for `symbol` with the overview visible.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<A: MarketApi>(
        api: Arc<A>,
        symbol: Symbol,
        policy: HiddenPanelPolicy,
        store: SettingsStore,
    ) -> Self {
        let tab = DashboardTab::default();
        let visible = |panel_tab: DashboardTab| {
            policy == HiddenPanelPolicy::KeepPolling || panel_tab == tab
        };
        let settings = store.load();
        let (settings_tx, _) = watch::channel(settings);
        let chart_view = MultiChartView::new(DASHBOARD_TIMEFRAMES.to_vec());

        let overview = OverviewPanels {
            quote: panels::quote(Arc::clone(&api), symbol.clone(), visible(DashboardTab::Overview)),
            signal: panels::signal(
                Arc::clone(&api),
                symbol.clone(),
                OVERVIEW_SIGNAL_TIMEFRAME,
                visible(DashboardTab::Overview),
            ),
            trend: panels::trend(Arc::clone(&api), symbol.clone(), visible(DashboardTab::Overview)),
        };
        let trend = TrendPanels {
            trend: panels::trend(Arc::clone(&api), symbol.clone(), visible(DashboardTab::Trend)),
            consensus: panels::consensus(Arc::clone(&api), symbol.clone(), visible(DashboardTab::Trend)),
        };
        let signals = SignalPanels {
            all: panels::signal_set(Arc::clone(&api), symbol.clone(), visible(DashboardTab::Signals)),
        };
        let news = NewsPanels {
            news: panels::news(Arc::clone(&api), symbol.clone(), visible(DashboardTab::News)),
            calendar: panels::calendar(Arc::clone(&api), visible(DashboardTab::News)),
            sentiment: panels::sentiment(Arc::clone(&api), symbol.clone(), visible(DashboardTab::News)),
        };
        let charts = ChartPanels {
            batch: panels::chart_batch(Arc::clone(&api), symbol.clone(), visible(DashboardTab::Charts)),
            detail: panels::chart_detail(
                api,
                symbol.clone(),
                chart_view.focused(),
                visible(DashboardTab::Charts),
            ),
        };

        info!(symbol = %symbol, tab = %tab, policy = ?policy, "dashboard started");
        Self {
            symbol,
            tab,
            policy,
            store,
            settings_tx,
            editor: None,
            chart_view,
            overview,
            trend,
            signals,
            news,
            charts,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn tab(&self) -> DashboardTab {
        self.tab
    }

    pub fn policy(&self) -> HiddenPanelPolicy {
        self.policy
    }

    /// Analyzes the symbol typed into the pending input.
    ///
    /// Input is trimmed and upper-cased. Blank input, or input naming the
    /// current symbol, changes nothing and returns `false`.
    pub fn submit_symbol(&mut self, input: &str) -> bool {
        let Some(symbol) = Symbol::parse(input) else {
            return false;
        };
        if symbol == self.symbol {
            return false;
        }

        info!(from = %self.symbol, to = %symbol, "switching symbol");
        self.symbol = symbol.clone();

        self.overview.quote.set_key(symbol.clone());
        self.overview.signal.set_key(symbol.clone());
        self.overview.trend.set_key(symbol.clone());
        self.trend.trend.set_key(symbol.clone());
        self.trend.consensus.set_key(symbol.clone());
        self.signals.all.set_key(symbol.clone());
        self.news.news.set_key(symbol.clone());
        self.news.sentiment.set_key(symbol.clone());
        self.charts.batch.set_key(symbol.clone());
        self.charts
            .detail
            .set_key((symbol, self.chart_view.focused()));
        true
    }

    /// Shows `tab`, suspending or resuming panels per the hidden panel policy.
    pub fn select_tab(&mut self, tab: DashboardTab) {
        if tab == self.tab {
            return;
        }
        self.tab = tab;
        self.apply_visibility();
    }

    fn is_visible(&self, tab: DashboardTab) -> bool {
        self.policy == HiddenPanelPolicy::KeepPolling || tab == self.tab
    }

    fn apply_visibility(&self) {
        let on = self.is_visible(DashboardTab::Overview);
        self.overview.quote.set_active(on);
        self.overview.signal.set_active(on);
        self.overview.trend.set_active(on);

        let on = self.is_visible(DashboardTab::Trend);
        self.trend.trend.set_active(on);
        self.trend.consensus.set_active(on);

        let on = self.is_visible(DashboardTab::Signals);
        self.signals.all.set_active(on);

        let on = self.is_visible(DashboardTab::News);
        self.news.news.set_active(on);
        self.news.calendar.set_active(on);
        self.news.sentiment.set_active(on);

        let on = self.is_visible(DashboardTab::Charts);
        self.charts.batch.set_active(on);
        self.charts.detail.set_active(on);
    }

    /// Refetches every panel on the visible tab.
    pub fn refresh_visible(&self) {
        match self.tab {
            DashboardTab::Overview => {
                self.overview.quote.refresh();
                self.overview.signal.refresh();
                self.overview.trend.refresh();
            }
            DashboardTab::Trend => {
                self.trend.trend.refresh();
                self.trend.consensus.refresh();
            }
            DashboardTab::Signals => {
                self.signals.all.refresh();
            }
            DashboardTab::News => {
                self.news.news.refresh();
                self.news.calendar.refresh();
                self.news.sentiment.refresh();
            }
            DashboardTab::Charts => {
                self.charts.batch.refresh();
                self.charts.detail.refresh();
            }
        }
    }

    // -- Pushed updates --

    /// Shows a pushed stream message in the panels it concerns.
    ///
    /// A market update for the current symbol replaces the overview quote
    /// and the matching entry of the overview trend series. A news update
    /// merges the items mentioning the current symbol into the news list,
    /// newest first. Returns `false` if nothing applied.
    pub fn apply_stream(&self, message: StreamMessage) -> bool {
        match message {
            StreamMessage::MarketUpdate(update) => self.apply_market_update(update),
            StreamMessage::NewsUpdate(update) => self.apply_news_update(update),
        }
    }

    fn apply_market_update(&self, update: MarketUpdate) -> bool {
        if Symbol::parse(&update.symbol).as_ref() != Some(&self.symbol) {
            debug!(symbol = %update.symbol, current = %self.symbol, "ignoring market update");
            return false;
        }

        let trend = update.data.trend;
        if let Some(series) = self.overview.trend.state().ready() {
            let mut series = series.as_ref().clone();
            series.insert(trend.timeframe, trend);
            self.overview.trend.publish(self.symbol.clone(), series);
        }
        self.overview
            .quote
            .publish(self.symbol.clone(), update.data.quote);
        true
    }

    fn apply_news_update(&self, update: NewsUpdate) -> bool {
        let fresh: Vec<NewsItem> = update
            .items
            .into_iter()
            .filter(|item| item.mentions(&self.symbol))
            .collect();
        if fresh.is_empty() {
            return false;
        }

        let held = self.news.news.state();
        let held = held.ready().map(|items| items.as_slice()).unwrap_or_default();
        self.news
            .news
            .publish(self.symbol.clone(), merge_news(fresh, held));
        true
    }

    // -- Chart grid --

    pub fn chart_view(&self) -> &MultiChartView {
        &self.chart_view
    }

    pub fn focus_next_chart(&mut self) {
        self.chart_view.focus_next();
        self.sync_chart_detail();
    }

    pub fn focus_previous_chart(&mut self) {
        self.chart_view.focus_previous();
        self.sync_chart_detail();
    }

    /// Expands the focused chart, or collapses it if already expanded.
    pub fn toggle_focused_chart(&mut self) {
        let focused = self.chart_view.focused();
        self.chart_view.toggle_expanded(focused);
    }

    fn sync_chart_detail(&self) {
        self.charts
            .detail
            .set_key((self.symbol.clone(), self.chart_view.focused()));
    }

    // -- Indicator settings --

    /// Returns a copy of the committed settings.
    pub fn settings(&self) -> IndicatorSettings {
        self.settings_tx.borrow().clone()
    }

    /// Returns a receiver notified each time settings are saved.
    pub fn subscribe_settings(&self) -> watch::Receiver<IndicatorSettings> {
        self.settings_tx.subscribe()
    }

    /// Opens the settings editor on the committed settings.
    ///
    /// Reopening while an editor is open discards the open draft.
    pub fn open_settings(&mut self) {
        self.editor = Some(SettingsEditor::open(&self.settings_tx.borrow()));
    }

    pub fn settings_editor(&self) -> Option<&SettingsEditor> {
        self.editor.as_ref()
    }

    /// Applies an edit to the open draft. Returns `false` if no editor is
    /// open or the edit was rejected.
    pub fn edit_settings(&mut self, update: SettingsUpdate) -> bool {
        self.editor
            .as_mut()
            .is_some_and(|editor| editor.apply(update))
    }

    /// Discards the draft's edits, keeping the editor open.
    pub fn reset_settings(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.reset();
        }
    }

    /// Closes the editor without committing the draft.
    pub fn cancel_settings(&mut self) {
        self.editor = None;
    }

    /// Commits the draft in memory and to the store, then closes the editor.
    ///
    /// Returns `false` if no editor was open.
    pub fn save_settings(&mut self) -> bool {
        let Some(editor) = self.editor.take() else {
            return false;
        };
        let settings = editor.save();
        self.store.save(&settings);
        self.settings_tx.send_replace(settings);
        info!("indicator settings committed");
        true
    }
}

/// Puts `fresh` ahead of `held`, dropping held items that share an id with
/// a fresh one, and keeps at most [`DEFAULT_NEWS_LIMIT`] items.
fn merge_news(fresh: Vec<NewsItem>, held: &[NewsItem]) -> Vec<NewsItem> {
    let mut merged = fresh;
    for item in held {
        if !merged.iter().any(|m| m.id == item.id) {
            merged.push(item.clone());
        }
    }
    merged.truncate(DEFAULT_NEWS_LIMIT as usize);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses_known_values() {
        assert_eq!("suspend".parse::<HiddenPanelPolicy>().unwrap(), HiddenPanelPolicy::Suspend);
        assert_eq!(" POLL ".parse::<HiddenPanelPolicy>().unwrap(), HiddenPanelPolicy::KeepPolling);
        assert!(matches!(
            "always".parse::<HiddenPanelPolicy>(),
            Err(MarketdashError::Config(_))
        ));
    }

    #[test]
    fn tab_cycling_wraps() {
        assert_eq!(DashboardTab::Charts.next(), DashboardTab::Overview);
        assert_eq!(DashboardTab::Overview.previous(), DashboardTab::Charts);
        assert_eq!(DashboardTab::Trend.next(), DashboardTab::Signals);
    }

    #[test]
    fn tab_index_round_trips() {
        for tab in DashboardTab::ALL {
            assert_eq!(DashboardTab::from_index(tab.index()), Some(tab));
        }
        assert_eq!(DashboardTab::from_index(5), None);
    }
}
