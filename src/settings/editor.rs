//! Draft-based editing of the indicator configuration.

use super::{IndicatorSettings, SettingsUpdate};

/// An open settings editor.
///
/// Holds a copy of the committed settings taken when the editor opened and
/// a draft that every edit mutates. Nothing outside the editor observes the
/// draft until [`SettingsEditor::save`] hands it back for committing.
#[derive(Clone, Debug)]
pub struct SettingsEditor {
    committed: IndicatorSettings,
    draft: IndicatorSettings,
}

impl SettingsEditor {
    /// Opens an editor on a copy of the committed settings.
    pub fn open(committed: &IndicatorSettings) -> Self {
        Self {
            committed: committed.clone(),
            draft: committed.clone(),
        }
    }

    /// Returns the draft being edited.
    pub fn draft(&self) -> &IndicatorSettings {
        &self.draft
    }

    /// Applies an edit to the draft. See [`IndicatorSettings::apply`].
    pub fn apply(&mut self, update: SettingsUpdate) -> bool {
        self.draft.apply(update)
    }

    /// Discards all edits and starts again from the committed settings.
    pub fn reset(&mut self) {
        self.draft = self.committed.clone();
    }

    /// Returns `true` if the draft differs from the committed settings.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    /// Closes the editor, returning the draft to commit.
    pub fn save(self) -> IndicatorSettings {
        self.draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MovingAverageEdit, RsiEdit};

    #[test]
    fn edits_do_not_touch_committed_settings() {
        let committed = IndicatorSettings::default();
        let mut editor = SettingsEditor::open(&committed);
        editor.apply(SettingsUpdate::Rsi(RsiEdit::Period(21)));
        assert_eq!(editor.draft().rsi.period, 21);
        assert_eq!(committed.rsi.period, 14);
        assert!(editor.is_dirty());
    }

    #[test]
    fn reset_recopies_committed_settings() {
        let committed = IndicatorSettings::default();
        let mut editor = SettingsEditor::open(&committed);
        editor.apply(SettingsUpdate::Sma(MovingAverageEdit::RemovePeriod(2)));
        editor.reset();
        assert_eq!(editor.draft(), &committed);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn save_returns_the_draft() {
        let mut editor = SettingsEditor::open(&IndicatorSettings::default());
        editor.apply(SettingsUpdate::Rsi(RsiEdit::Overbought(75)));
        let saved = editor.save();
        assert_eq!(saved.rsi.overbought, 75);
    }
}
