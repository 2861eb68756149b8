//! Indicator settings dialog: row model, number entry and rendering.
//!
//! The dialog edits the dashboard's settings draft. Rows are derived from
//! the draft on every frame because adding or removing a moving-average
//! period changes how many rows there are.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::chart_view::parse_hex_color;
use crate::settings::{
    AtrEdit, BollingerEdit, Indicator, IndicatorSettings, MacdEdit, MovingAverageEdit, RsiEdit,
    SettingsUpdate, StochasticEdit,
};

use super::app::App;
use super::input::text_input::TextInput;

/// Selection and number-entry state of the open dialog.
#[derive(Clone, Debug, Default)]
pub struct SettingsDialog {
    pub selected: usize,
    /// Text of the number being typed, if any.
    pub editing: Option<TextInput>,
}

impl SettingsDialog {
    pub fn select_next(&mut self, row_count: usize) {
        if self.selected + 1 < row_count {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keeps the selection on a row that still exists.
    pub fn clamp(&mut self, row_count: usize) {
        self.selected = self.selected.min(row_count.saturating_sub(1));
    }
}

/// A moving-average family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaFamily {
    Sma,
    Ema,
}

impl MaFamily {
    pub fn wrap(self, edit: MovingAverageEdit) -> SettingsUpdate {
        match self {
            MaFamily::Sma => SettingsUpdate::Sma(edit),
            MaFamily::Ema => SettingsUpdate::Ema(edit),
        }
    }

    fn label(self) -> &'static str {
        match self {
            MaFamily::Sma => "SMA",
            MaFamily::Ema => "EMA",
        }
    }

    fn periods(self, settings: &IndicatorSettings) -> &[u32] {
        match self {
            MaFamily::Sma => settings.sma.periods(),
            MaFamily::Ema => settings.ema.periods(),
        }
    }

    fn colors(self, settings: &IndicatorSettings) -> &[String] {
        match self {
            MaFamily::Sma => settings.sma.colors(),
            MaFamily::Ema => settings.ema.colors(),
        }
    }
}

/// A numeric parameter of a fixed-shape indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    RsiPeriod,
    RsiOverbought,
    RsiOversold,
    MacdFast,
    MacdSlow,
    MacdSignal,
    StochK,
    StochD,
    StochOverbought,
    StochOversold,
    BollingerPeriod,
    BollingerStdDev,
    AtrPeriod,
}

impl Param {
    fn for_indicator(indicator: Indicator) -> &'static [Param] {
        match indicator {
            Indicator::Rsi => &[Param::RsiPeriod, Param::RsiOverbought, Param::RsiOversold],
            Indicator::Macd => &[Param::MacdFast, Param::MacdSlow, Param::MacdSignal],
            Indicator::Stochastic => &[
                Param::StochK,
                Param::StochD,
                Param::StochOverbought,
                Param::StochOversold,
            ],
            Indicator::BollingerBands => &[Param::BollingerPeriod, Param::BollingerStdDev],
            Indicator::Atr => &[Param::AtrPeriod],
            Indicator::Sma | Indicator::Ema | Indicator::Volume | Indicator::Obv => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Param::RsiPeriod | Param::AtrPeriod | Param::BollingerPeriod => "Period",
            Param::RsiOverbought | Param::StochOverbought => "Overbought",
            Param::RsiOversold | Param::StochOversold => "Oversold",
            Param::MacdFast => "Fast period",
            Param::MacdSlow => "Slow period",
            Param::MacdSignal => "Signal period",
            Param::StochK => "%K period",
            Param::StochD => "%D period",
            Param::BollingerStdDev => "Std dev",
        }
    }

    /// Current value formatted for display and as the initial edit text.
    pub fn value(self, s: &IndicatorSettings) -> String {
        match self {
            Param::RsiPeriod => s.rsi.period.to_string(),
            Param::RsiOverbought => s.rsi.overbought.to_string(),
            Param::RsiOversold => s.rsi.oversold.to_string(),
            Param::MacdFast => s.macd.fast_period.to_string(),
            Param::MacdSlow => s.macd.slow_period.to_string(),
            Param::MacdSignal => s.macd.signal_period.to_string(),
            Param::StochK => s.stochastic.k_period.to_string(),
            Param::StochD => s.stochastic.d_period.to_string(),
            Param::StochOverbought => s.stochastic.overbought.to_string(),
            Param::StochOversold => s.stochastic.oversold.to_string(),
            Param::BollingerPeriod => s.bollinger_bands.period.to_string(),
            Param::BollingerStdDev => s.bollinger_bands.std_dev.to_string(),
            Param::AtrPeriod => s.atr.period.to_string(),
        }
    }

    /// Builds the update for typed text.
    ///
    /// Text that is not a positive number yields the parameter's default.
    pub fn update(self, text: &str) -> SettingsUpdate {
        let d = IndicatorSettings::default();
        let int = |default: u32| parse_positive(text).unwrap_or(default);
        match self {
            Param::RsiPeriod => SettingsUpdate::Rsi(RsiEdit::Period(int(d.rsi.period))),
            Param::RsiOverbought => SettingsUpdate::Rsi(RsiEdit::Overbought(int(d.rsi.overbought))),
            Param::RsiOversold => SettingsUpdate::Rsi(RsiEdit::Oversold(int(d.rsi.oversold))),
            Param::MacdFast => SettingsUpdate::Macd(MacdEdit::FastPeriod(int(d.macd.fast_period))),
            Param::MacdSlow => SettingsUpdate::Macd(MacdEdit::SlowPeriod(int(d.macd.slow_period))),
            Param::MacdSignal => {
                SettingsUpdate::Macd(MacdEdit::SignalPeriod(int(d.macd.signal_period)))
            }
            Param::StochK => {
                SettingsUpdate::Stochastic(StochasticEdit::KPeriod(int(d.stochastic.k_period)))
            }
            Param::StochD => {
                SettingsUpdate::Stochastic(StochasticEdit::DPeriod(int(d.stochastic.d_period)))
            }
            Param::StochOverbought => SettingsUpdate::Stochastic(StochasticEdit::Overbought(int(
                d.stochastic.overbought,
            ))),
            Param::StochOversold => {
                SettingsUpdate::Stochastic(StochasticEdit::Oversold(int(d.stochastic.oversold)))
            }
            Param::BollingerPeriod => {
                SettingsUpdate::BollingerBands(BollingerEdit::Period(int(d.bollinger_bands.period)))
            }
            Param::BollingerStdDev => {
                let value = text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .unwrap_or(d.bollinger_bands.std_dev);
                SettingsUpdate::BollingerBands(BollingerEdit::StdDev(value))
            }
            Param::AtrPeriod => SettingsUpdate::Atr(AtrEdit::Period(int(d.atr.period))),
        }
    }
}

fn parse_positive(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|v| *v > 0)
}

/// One line of the dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row {
    Toggle(Indicator),
    MaPeriod { family: MaFamily, index: usize },
    Param(Param),
}

impl Row {
    /// Moving-average family the row belongs to, if any.
    pub fn family(self) -> Option<MaFamily> {
        match self {
            Row::Toggle(Indicator::Sma) => Some(MaFamily::Sma),
            Row::Toggle(Indicator::Ema) => Some(MaFamily::Ema),
            Row::MaPeriod { family, .. } => Some(family),
            _ => None,
        }
    }

    /// Whether Enter starts number entry on this row.
    pub fn is_numeric(self) -> bool {
        matches!(self, Row::MaPeriod { .. } | Row::Param(_))
    }

    /// Current value as initial edit text.
    pub fn value(self, settings: &IndicatorSettings) -> String {
        match self {
            Row::Toggle(indicator) => settings.is_enabled(indicator).to_string(),
            Row::MaPeriod { family, index } => family
                .periods(settings)
                .get(index)
                .map(u32::to_string)
                .unwrap_or_default(),
            Row::Param(param) => param.value(settings),
        }
    }

    /// Builds the update for typed text on a numeric row.
    ///
    /// A moving-average period that is not a positive number is stored as 0.
    pub fn number_update(self, text: &str) -> Option<SettingsUpdate> {
        match self {
            Row::Toggle(_) => None,
            Row::MaPeriod { family, index } => Some(family.wrap(MovingAverageEdit::Period {
                index,
                value: parse_positive(text).unwrap_or(0),
            })),
            Row::Param(param) => Some(param.update(text)),
        }
    }
}

/// Rows for `settings`, grouped by indicator in display order.
pub fn rows(settings: &IndicatorSettings) -> Vec<Row> {
    let mut rows = Vec::new();
    for indicator in Indicator::ALL {
        rows.push(Row::Toggle(indicator));
        let family = match indicator {
            Indicator::Sma => Some(MaFamily::Sma),
            Indicator::Ema => Some(MaFamily::Ema),
            _ => None,
        };
        if let Some(family) = family {
            for index in 0..family.periods(settings).len() {
                rows.push(Row::MaPeriod { family, index });
            }
        }
        rows.extend(Param::for_indicator(indicator).iter().map(|p| Row::Param(*p)));
    }
    rows
}

/// Renders the dialog centered over `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(editor) = app.dashboard.settings_editor() else {
        return;
    };
    let draft = editor.draft();
    let dialog = &app.settings_dialog;

    let popup = centered_rect(60, 80, area);
    frame.render_widget(Clear, popup);

    let title = if editor.is_dirty() {
        " Indicator Settings (modified) "
    } else {
        " Indicator Settings "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    let items: Vec<ListItem> = rows(draft)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let editing = (i == dialog.selected)
                .then_some(dialog.editing.as_ref())
                .flatten();
            ListItem::new(row_line(row, draft, editing))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(dialog.selected));
    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], &mut state);

    let help = if dialog.editing.is_some() {
        "Enter apply  Esc discard"
    } else {
        "↑/↓ select  Space toggle  Enter edit  a/d add/remove period  r reset  w save  Esc cancel"
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );
}

fn row_line<'a>(row: Row, draft: &IndicatorSettings, editing: Option<&TextInput>) -> Line<'a> {
    let value = |text: String| match editing {
        Some(input) => Span::styled(
            format!("[{}_]", input.as_str()),
            Style::default().fg(Color::Yellow),
        ),
        None => Span::styled(text, Style::default().fg(Color::White)),
    };

    match row {
        Row::Toggle(indicator) => {
            let (mark, color) = if draft.is_enabled(indicator) {
                ("[x]", Color::Green)
            } else {
                ("[ ]", Color::DarkGray)
            };
            Line::from(vec![
                Span::styled(format!("{mark} "), Style::default().fg(color)),
                Span::styled(
                    indicator.label().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        }
        Row::MaPeriod { family, index } => {
            let color = family
                .colors(draft)
                .get(index)
                .and_then(|c| parse_hex_color(c))
                .unwrap_or(Color::Gray);
            Line::from(vec![
                Span::raw("    "),
                Span::styled("■ ", Style::default().fg(color)),
                Span::raw(format!("{} period {}: ", family.label(), index + 1)),
                value(row.value(draft)),
            ])
        }
        Row::Param(param) => Line::from(vec![
            Span::raw("    "),
            Span::raw(format!("{}: ", param.label())),
            value(param.value(draft)),
        ]),
    }
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rows_follow_indicator_order() {
        let settings = IndicatorSettings::default();
        let rows = rows(&settings);
        assert_eq!(rows[0], Row::Toggle(Indicator::Sma));
        assert_eq!(rows[1], Row::MaPeriod { family: MaFamily::Sma, index: 0 });
        assert_eq!(rows[3], Row::MaPeriod { family: MaFamily::Sma, index: 2 });
        assert_eq!(rows[4], Row::Toggle(Indicator::Ema));
        // 9 toggles, 3 + 2 moving-average periods and 13 parameters.
        assert_eq!(rows.len(), 9 + 5 + 13);
        assert_eq!(rows.last(), Some(&Row::Toggle(Indicator::Obv)));
    }

    #[test]
    fn rows_grow_with_added_periods() {
        let mut settings = IndicatorSettings::default();
        let before = rows(&settings).len();
        settings.apply(SettingsUpdate::Ema(MovingAverageEdit::AddPeriod));
        assert_eq!(rows(&settings).len(), before + 1);
    }

    #[test]
    fn unparseable_parameter_falls_back_to_default() {
        assert_eq!(
            Param::RsiPeriod.update("abc"),
            SettingsUpdate::Rsi(RsiEdit::Period(14))
        );
        assert_eq!(
            Param::MacdSlow.update("0"),
            SettingsUpdate::Macd(MacdEdit::SlowPeriod(26))
        );
        assert_eq!(
            Param::BollingerStdDev.update("2.5"),
            SettingsUpdate::BollingerBands(BollingerEdit::StdDev(2.5))
        );
        assert_eq!(
            Param::BollingerStdDev.update("-1"),
            SettingsUpdate::BollingerBands(BollingerEdit::StdDev(2.0))
        );
    }

    #[test]
    fn unparseable_moving_average_period_becomes_zero() {
        let row = Row::MaPeriod { family: MaFamily::Sma, index: 1 };
        assert_eq!(
            row.number_update("x"),
            Some(SettingsUpdate::Sma(MovingAverageEdit::Period { index: 1, value: 0 }))
        );
        assert_eq!(
            row.number_update(" 75 "),
            Some(SettingsUpdate::Sma(MovingAverageEdit::Period { index: 1, value: 75 }))
        );
        assert_eq!(Row::Toggle(Indicator::Rsi).number_update("5"), None);
    }

    #[test]
    fn selection_is_clamped() {
        let mut dialog = SettingsDialog {
            selected: 30,
            editing: None,
        };
        dialog.clamp(27);
        assert_eq!(dialog.selected, 26);
        dialog.select_next(27);
        assert_eq!(dialog.selected, 26);
        dialog.select_previous();
        assert_eq!(dialog.selected, 25);
    }
}
