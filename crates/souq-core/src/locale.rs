//! # Locale & Theme
//!
//! Shopper-facing presentation preferences: language (and with it the
//! text direction), color theme, and display currency.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Languages written right-to-left.
const RTL_LANGUAGES: &[&str] = &["ar", "fa", "he", "ur"];

/// Text direction of a locale, mapped to the `dir` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// Direction for a locale code such as `ar`, `en` or `ar-SA`.
///
/// ## Example
/// ```rust
/// use souq_core::locale::{direction_for, Direction};
///
/// assert_eq!(direction_for("ar-SA"), Direction::Rtl);
/// assert_eq!(direction_for("en"), Direction::Ltr);
/// ```
pub fn direction_for(locale: &str) -> Direction {
    let language = locale.split(['-', '_']).next().unwrap_or_default();
    if RTL_LANGUAGES
        .iter()
        .any(|rtl| rtl.eq_ignore_ascii_case(language))
    {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the OS setting.
    System,
}

/// What the shopper picked in the header menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub locale: String,
    pub theme: Theme,
    /// Display currency code.
    pub currency: String,
}

impl Preferences {
    pub fn new(locale: impl Into<String>, theme: Theme, currency: impl Into<String>) -> Self {
        Preferences {
            locale: locale.into(),
            theme,
            currency: currency.into(),
        }
    }

    pub fn direction(&self) -> Direction {
        direction_for(&self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_for() {
        assert_eq!(direction_for("ar"), Direction::Rtl);
        assert_eq!(direction_for("AR"), Direction::Rtl);
        assert_eq!(direction_for("fa_IR"), Direction::Rtl);
        assert_eq!(direction_for("en-US"), Direction::Ltr);
        assert_eq!(direction_for(""), Direction::Ltr);
        assert_eq!(Direction::Rtl.as_str(), "rtl");
    }

    #[test]
    fn test_preferences_direction() {
        let prefs = Preferences::new("ar", Theme::Dark, "SAR");
        assert_eq!(prefs.direction(), Direction::Rtl);
    }

    #[test]
    fn test_theme_serde() {
        assert_eq!(serde_json::to_string(&Theme::System).unwrap(), "\"system\"");
        assert_eq!(Theme::default(), Theme::Light);
    }
}
