//! Application Settings
//!
//! Key-value preferences. Only `themeColor` is recognized.

use serde::{Deserialize, Serialize};

pub const DEFAULT_THEME_COLOR: &str = "purple";

/// Known theme palettes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    #[default]
    Purple,
    Blue,
    Green,
    Pink,
    Indigo,
    Red,
    Orange,
    Teal,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 8] = [
        ThemeColor::Purple,
        ThemeColor::Blue,
        ThemeColor::Green,
        ThemeColor::Pink,
        ThemeColor::Indigo,
        ThemeColor::Red,
        ThemeColor::Orange,
        ThemeColor::Teal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeColor::Purple => "purple",
            ThemeColor::Blue => "blue",
            ThemeColor::Green => "green",
            ThemeColor::Pink => "pink",
            ThemeColor::Indigo => "indigo",
            ThemeColor::Red => "red",
            ThemeColor::Orange => "orange",
            ThemeColor::Teal => "teal",
        }
    }

    /// Unknown names fall back to purple
    pub fn from_str(s: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|color| color.as_str() == s)
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeColor::Purple => "Purple",
            ThemeColor::Blue => "Blue",
            ThemeColor::Green => "Green",
            ThemeColor::Pink => "Pink",
            ThemeColor::Indigo => "Indigo",
            ThemeColor::Red => "Red",
            ThemeColor::Orange => "Orange",
            ThemeColor::Teal => "Teal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Stored verbatim, see `theme()` for the resolved palette
    pub theme_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme_color: DEFAULT_THEME_COLOR.to_string(),
        }
    }
}

impl Settings {
    pub fn theme(&self) -> ThemeColor {
        ThemeColor::from_str(&self.theme_color)
    }
}

/// Partial settings update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

impl SettingsPatch {
    pub fn theme_color(color: impl Into<String>) -> Self {
        Self {
            theme_color: Some(color.into()),
        }
    }

    /// Provided keys with their storage names
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = Vec::new();
        if let Some(color) = &self.theme_color {
            entries.push(("themeColor", color.as_str()));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.theme_color, "purple");
        assert_eq!(settings.theme(), ThemeColor::Purple);
    }

    #[test]
    fn test_theme_fallback() {
        let settings = Settings {
            theme_color: "chartreuse".to_string(),
        };
        assert_eq!(settings.theme(), ThemeColor::Purple);
        assert_eq!(ThemeColor::from_str("teal"), ThemeColor::Teal);
    }

    #[test]
    fn test_palette_names() {
        let names: Vec<_> = ThemeColor::ALL.iter().map(ThemeColor::name).collect();
        assert_eq!(
            names,
            vec!["Purple", "Blue", "Green", "Pink", "Indigo", "Red", "Orange", "Teal"]
        );
        for color in ThemeColor::ALL {
            assert_eq!(ThemeColor::from_str(color.as_str()), color);
        }
    }

    #[test]
    fn test_patch_entries() {
        assert!(SettingsPatch::default().entries().is_empty());
        assert_eq!(
            SettingsPatch::theme_color("blue").entries(),
            vec![("themeColor", "blue")]
        );
    }

    #[test]
    fn test_settings_json_key() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(json, r#"{"themeColor":"purple"}"#);
    }
}
