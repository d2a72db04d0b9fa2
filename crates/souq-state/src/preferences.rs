//! # Preferences State
//!
//! The shopper's language, theme and display currency.
//!
//! Locale and currency must name an entry of the current settings lists;
//! an unknown value is rejected and the store is left as it was.

use std::convert::Infallible;

use souq_core::{Direction, Money, Preferences, Settings, Theme, ValidationError};
use tracing::debug;

use crate::error::StateError;
use crate::settings::SettingsCache;
use crate::store::{Reducer, Store, SubscriptionId};

/// A header menu selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferencesAction {
    SetLocale(String),
    SetTheme(Theme),
    SetCurrency(String),
}

impl Reducer for Preferences {
    type Action = PreferencesAction;
    type Error = Infallible;
    const NAME: &'static str = "preferences";

    fn reduce(&mut self, action: PreferencesAction) -> Result<bool, Infallible> {
        let changed = match action {
            PreferencesAction::SetLocale(locale) => replace_if_changed(&mut self.locale, locale),
            PreferencesAction::SetTheme(theme) => replace_if_changed(&mut self.theme, theme),
            PreferencesAction::SetCurrency(code) => replace_if_changed(&mut self.currency, code),
        };
        Ok(changed)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Initial preferences: the store's defaults.
fn defaults_from(settings: &Settings) -> Preferences {
    let locale = settings
        .languages
        .default_key()
        .or_else(|| settings.languages.entries().first().map(|l| l.code.as_str()))
        .unwrap_or("en");
    let currency = settings
        .currencies
        .default_key()
        .or_else(|| settings.currencies.entries().first().map(|c| c.code.as_str()))
        .unwrap_or_default();

    Preferences::new(locale, settings.common.default_theme, currency)
}

/// Preferences store checked against the settings cache.
#[derive(Clone)]
pub struct PreferencesStore {
    store: Store<Preferences>,
    settings: SettingsCache,
}

impl PreferencesStore {
    /// Starts from the store's default language, currency and theme.
    pub fn new(settings: SettingsCache) -> Self {
        let initial = settings.with(defaults_from);
        PreferencesStore {
            store: Store::new(initial),
            settings,
        }
    }

    /// Applies a selection after checking it against the settings lists.
    pub fn dispatch(&self, action: PreferencesAction) -> Result<bool, StateError> {
        match &action {
            PreferencesAction::SetLocale(code) => self.settings.with(|s| {
                if s.languages.contains(code) {
                    Ok(())
                } else {
                    Err(StateError::invalid(
                        "locale",
                        ValidationError::NotAllowed {
                            field: "language".to_string(),
                            allowed: s.languages.discriminators(),
                        },
                    ))
                }
            })?,
            PreferencesAction::SetCurrency(code) => self.settings.with(|s| {
                if s.currencies.contains(code) {
                    Ok(())
                } else {
                    Err(StateError::invalid(
                        "currency",
                        ValidationError::NotAllowed {
                            field: "currency".to_string(),
                            allowed: s.currencies.discriminators(),
                        },
                    ))
                }
            })?,
            PreferencesAction::SetTheme(_) => {}
        }

        debug!(?action, "Preference selected");
        self.store.dispatch(action).map_err(|never| match never {})
    }

    pub fn get_snapshot(&self) -> Preferences {
        self.store.get_snapshot()
    }

    pub fn direction(&self) -> Direction {
        self.store.with_state(Preferences::direction)
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Preferences) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Formats a base-currency amount in the selected display currency.
    ///
    /// Falls back to the plain amount if the selected currency was removed
    /// from the settings since it was picked.
    pub fn format_money(&self, amount: Money) -> String {
        let code = self.store.with_state(|p| p.currency.clone());
        self.settings
            .with(|s| s.currencies.find(&code).and_then(|c| c.format(amount)))
            .unwrap_or_else(|| amount.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> PreferencesStore {
        PreferencesStore::new(SettingsCache::new(Settings::with_defaults()))
    }

    #[test]
    fn test_starts_from_store_defaults() {
        let store = prefs();
        let p = store.get_snapshot();
        assert_eq!(p.locale, "ar");
        assert_eq!(p.currency, "SAR");
        assert_eq!(p.theme, Theme::Light);
        assert_eq!(store.direction(), Direction::Rtl);
    }

    #[test]
    fn test_switch_locale_and_currency() {
        let store = prefs();
        assert!(store.dispatch(PreferencesAction::SetLocale("en".into())).unwrap());
        assert!(store.dispatch(PreferencesAction::SetCurrency("USD".into())).unwrap());
        assert!(!store.dispatch(PreferencesAction::SetCurrency("USD".into())).unwrap());

        assert_eq!(store.direction(), Direction::Ltr);
        assert_eq!(store.format_money(Money::from_minor(10_000)), "$26.67");
    }

    #[test]
    fn test_unknown_values_are_rejected() {
        let store = prefs();

        let err = store
            .dispatch(PreferencesAction::SetLocale("fr".into()))
            .unwrap_err();
        let StateError::Invalid(errors) = err else {
            panic!("expected field errors");
        };
        assert!(errors.get("locale").is_some());

        assert!(store
            .dispatch(PreferencesAction::SetCurrency("EUR".into()))
            .is_err());
        assert_eq!(store.version(), 0);
        assert_eq!(store.get_snapshot().currency, "SAR");
    }

    #[test]
    fn test_theme() {
        let store = prefs();
        assert!(store.dispatch(PreferencesAction::SetTheme(Theme::Dark)).unwrap());
        assert_eq!(store.get_snapshot().theme, Theme::Dark);
    }

    #[test]
    fn test_format_falls_back_when_currency_removed() {
        let cache = SettingsCache::new(Settings::with_defaults());
        let store = PreferencesStore::new(cache.clone());
        store
            .dispatch(PreferencesAction::SetCurrency("USD".into()))
            .unwrap();

        let mut settings = cache.get();
        settings.currencies.remove_by("USD");
        cache.refresh(settings);

        assert_eq!(store.format_money(Money::from_minor(1250)), "12.50");
    }
}
