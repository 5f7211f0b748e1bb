//! Display settings handed to the EPUB reading engine.

use serde::{Deserialize, Serialize};

/// Font size in points that maps to a scale of `1.0`.
pub const BASE_FONT_SIZE_PT: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Sepia,
    Dark,
}

impl Theme {
    /// Maps a UI theme label to a theme; unknown labels fall back to light.
    ///
    /// Matching trims whitespace and ignores ASCII case, so `"Night"` and
    /// `"DARK"` both select [`Theme::Dark`]. `"night"` is accepted alongside
    /// the app's own labels (`默认`, `护眼`, `复古`, `夜间`).
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" | "默认" => Self::Light,
            "sepia" | "护眼" | "复古" => Self::Sepia,
            "dark" | "night" | "夜间" => Self::Dark,
            _ => Self::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Start,
    Left,
    Right,
    Justify,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderPreferences {
    /// Scale relative to the publisher default, `1.0` = 100%.
    pub font_size: f64,
    pub theme: Theme,
    pub font_family: String,
    pub line_height: f64,
    pub page_margins: f64,
    pub text_align: TextAlign,
}

impl Default for ReaderPreferences {
    fn default() -> Self {
        Self {
            font_size: 1.0,
            theme: Theme::Light,
            font_family: "sans-serif".to_string(),
            line_height: 1.2,
            page_margins: 1.0,
            text_align: TextAlign::Justify,
        }
    }
}
