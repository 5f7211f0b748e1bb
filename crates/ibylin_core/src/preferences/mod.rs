//! Observable holder for reader display preferences.
//!
//! # Responsibility
//! - Keep the current [`ReaderPreferences`] for the reading engine.
//! - Push every change to subscribers.
//!
//! # Invariants
//! - Subscribers always observe a complete preferences value.
//! - Setters replace one field and keep the rest.

use crate::model::reader_preferences::{ReaderPreferences, Theme, BASE_FONT_SIZE_PT};
use log::debug;
use tokio::sync::watch;

pub struct ReaderPreferencesManager {
    tx: watch::Sender<ReaderPreferences>,
}

impl ReaderPreferencesManager {
    pub fn new(initial: ReaderPreferences) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Receiver that observes every future preferences change.
    pub fn subscribe(&self) -> watch::Receiver<ReaderPreferences> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ReaderPreferences {
        self.tx.borrow().clone()
    }

    pub fn set_preferences(&self, preferences: ReaderPreferences) {
        debug!(
            "event=reader_prefs_set module=preferences theme={:?} font_size={}",
            preferences.theme, preferences.font_size
        );
        self.tx.send_replace(preferences);
    }

    /// Sets font size from points; 16pt is a scale of `1.0`.
    pub fn set_font_size(&self, size_pt: f32) {
        let font_size = f64::from(size_pt) / BASE_FONT_SIZE_PT;
        self.update(|prefs| prefs.font_size = font_size);
    }

    pub fn set_theme(&self, theme_name: &str) {
        let theme = Theme::from_name(theme_name);
        self.update(|prefs| prefs.theme = theme);
    }

    pub fn set_font_family(&self, family: impl Into<String>) {
        let family = family.into();
        self.update(|prefs| prefs.font_family = family);
    }

    pub fn set_line_height(&self, height: f32) {
        self.update(|prefs| prefs.line_height = f64::from(height));
    }

    pub fn set_page_margins(&self, margins: f32) {
        self.update(|prefs| prefs.page_margins = f64::from(margins));
    }

    pub fn reset_to_defaults(&self) {
        self.set_preferences(ReaderPreferences::default());
    }

    fn update(&self, change: impl FnOnce(&mut ReaderPreferences)) {
        self.tx.send_modify(|prefs| {
            change(prefs);
            debug!(
                "event=reader_prefs_set module=preferences theme={:?} font_size={}",
                prefs.theme, prefs.font_size
            );
        });
    }
}

impl Default for ReaderPreferencesManager {
    fn default() -> Self {
        Self::new(ReaderPreferences::default())
    }
}
