//! # Settings State
//!
//! The read-mostly settings cache and the admin settings form.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startup: SettingsCache::load(db)                                       │
//! │       ├── document stored? ──► use it                                   │
//! │       └── fresh database  ──► Settings::with_defaults(), seed it        │
//! │                                                                         │
//! │  views ──► cache.with(|s| ..)   (currency menu, threshold, page size)   │
//! │                                                                         │
//! │  admin: form = SettingsForm::new(cache.get())                           │
//! │       form.dispatch(SettingsAction::Currencies(ListAction::Remove(1)))  │
//! │       form.dispatch(...)                                                │
//! │       save_settings(db, cache, &form.get_snapshot())                    │
//! │            ├── validate() ──► Err(Invalid(field errors)), nothing sent  │
//! │            ├── replace()  ──► Err(SaveFailed), cause logged             │
//! │            └── ok ──► cache.refresh(..) ──► views re-render             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use souq_core::{
    Carousel, CommonSettings, Currency, DeliveryDate, Language, ListAction, Money, PaymentMethod,
    Settings, SiteInfo, ValidationError,
};
use souq_db::Database;
use tracing::{info, warn};

use crate::error::StateError;
use crate::store::{Reducer, Store, SubscriptionId};

// =============================================================================
// Settings Form
// =============================================================================

/// An edit made in the admin settings form.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsAction {
    SetCommon(CommonSettings),
    SetSite(SiteInfo),
    AddCarousel(Carousel),
    RemoveCarousel(usize),
    ReplaceCarousel(usize, Carousel),
    Languages(ListAction<Language>),
    Currencies(ListAction<Currency>),
    PaymentMethods(ListAction<PaymentMethod>),
    DeliveryDates(ListAction<DeliveryDate>),
}

fn carousel_index(index: usize, len: usize) -> Result<usize, ValidationError> {
    if index < len {
        Ok(index)
    } else {
        Err(ValidationError::OutOfRange {
            field: "carousel index".to_string(),
            min: 0,
            max: len as i64 - 1,
        })
    }
}

impl Reducer for Settings {
    type Action = SettingsAction;
    type Error = ValidationError;
    const NAME: &'static str = "settings";

    fn reduce(&mut self, action: SettingsAction) -> Result<bool, ValidationError> {
        match action {
            SettingsAction::SetCommon(common) => {
                let changed = self.common != common;
                self.common = common;
                Ok(changed)
            }
            SettingsAction::SetSite(site) => {
                let changed = self.site != site;
                self.site = site;
                Ok(changed)
            }
            SettingsAction::AddCarousel(carousel) => {
                self.carousels.push(carousel);
                Ok(true)
            }
            SettingsAction::RemoveCarousel(index) => {
                let index = carousel_index(index, self.carousels.len())?;
                self.carousels.remove(index);
                Ok(true)
            }
            SettingsAction::ReplaceCarousel(index, carousel) => {
                let index = carousel_index(index, self.carousels.len())?;
                let changed = self.carousels[index] != carousel;
                self.carousels[index] = carousel;
                Ok(changed)
            }
            SettingsAction::Languages(action) => self.languages.apply(action),
            SettingsAction::Currencies(action) => self.currencies.apply(action),
            SettingsAction::PaymentMethods(action) => self.payment_methods.apply(action),
            SettingsAction::DeliveryDates(action) => self.delivery_dates.apply(action),
        }
    }
}

/// The admin form's working copy of the settings document.
pub type SettingsForm = Store<Settings>;

// =============================================================================
// Settings Cache
// =============================================================================

/// Process-wide copy of the stored settings, read by every view.
#[derive(Clone)]
pub struct SettingsCache {
    store: Store<Settings>,
}

impl SettingsCache {
    pub fn new(settings: Settings) -> Self {
        SettingsCache {
            store: Store::new(settings),
        }
    }

    /// Loads the stored document, seeding defaults on a fresh database.
    pub async fn load(db: &Database) -> Result<Self, StateError> {
        let settings = match db.settings().load().await? {
            Some(settings) => {
                info!(site = %settings.site.name, "Settings loaded");
                settings
            }
            None => {
                let settings = Settings::with_defaults();
                db.settings().seed(&settings).await?;
                info!("No stored settings, seeded defaults");
                settings
            }
        };

        Ok(SettingsCache::new(settings))
    }

    /// A copy of the current document (e.g. to open the admin form).
    pub fn get(&self) -> Settings {
        self.store.get_snapshot()
    }

    /// Reads the current document without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        self.store.with_state(f)
    }

    pub fn free_shipping_threshold(&self) -> Option<Money> {
        self.with(Settings::free_shipping_threshold)
    }

    /// Opens an admin form on a copy of the current document.
    pub fn open_form(&self) -> SettingsForm {
        SettingsForm::new(self.get())
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Settings) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Swaps in a freshly saved document and notifies views.
    pub fn refresh(&self, settings: Settings) {
        self.store.replace(settings);
    }
}

/// Validates and stores the whole document, then refreshes the cache.
///
/// ## Errors
/// - `Invalid` with every failing field; nothing is written
/// - `SaveFailed` when the database rejects the write
pub async fn save_settings(
    db: &Database,
    cache: &SettingsCache,
    settings: &Settings,
) -> Result<(), StateError> {
    settings.validate()?;

    if let Err(e) = db.settings().replace(settings).await {
        warn!(error = %e, "Settings save rejected");
        return Err(StateError::SaveFailed);
    }

    cache.refresh(settings.clone());
    info!("Settings saved");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use souq_db::DbConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_seeds_fresh_database() {
        let db = db().await;
        let cache = SettingsCache::load(&db).await.unwrap();

        assert_eq!(cache.get(), Settings::with_defaults());
        assert!(db.settings().load().await.unwrap().is_some());
        assert_eq!(cache.free_shipping_threshold(), Some(Money::from_minor(35_000)));
    }

    #[test]
    fn test_form_remove_default_currency_clears_default() {
        let form = SettingsForm::new(Settings::with_defaults());
        form.dispatch(SettingsAction::Currencies(ListAction::SetDefault("USD".into())))
            .unwrap();

        let usd = form.with_state(|s| s.currencies.entries().iter().position(|c| c.code == "USD"));
        form.dispatch(SettingsAction::Currencies(ListAction::Remove(usd.unwrap())))
            .unwrap();

        form.with_state(|s| {
            assert_eq!(s.currencies.default_key(), None);
            assert!(s.currencies.entries().iter().all(|c| c.code != "USD"));
        });
    }

    #[test]
    fn test_form_rejects_unknown_default() {
        let form = SettingsForm::new(Settings::with_defaults());
        let err = form
            .dispatch(SettingsAction::Languages(ListAction::SetDefault("fr".into())))
            .unwrap_err();

        assert!(matches!(err, ValidationError::NotAllowed { .. }));
        assert_eq!(form.version(), 0);
    }

    #[test]
    fn test_form_carousels_and_site() {
        let form = SettingsForm::new(Settings::with_defaults());
        let mut site = form.with_state(|s| s.site.clone());

        assert!(!form.dispatch(SettingsAction::SetSite(site.clone())).unwrap());
        site.name = "Souq Riyadh".to_string();
        assert!(form.dispatch(SettingsAction::SetSite(site)).unwrap());

        assert!(form.dispatch(SettingsAction::RemoveCarousel(0)).unwrap());
        assert!(matches!(
            form.dispatch(SettingsAction::RemoveCarousel(0)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_rejects_cleared_default() {
        let db = db().await;
        let cache = SettingsCache::load(&db).await.unwrap();
        let form = cache.open_form();
        form.dispatch(SettingsAction::Currencies(ListAction::SetDefault(String::new())))
            .unwrap();

        let err = save_settings(&db, &cache, &form.get_snapshot())
            .await
            .unwrap_err();

        let StateError::Invalid(errors) = err else {
            panic!("expected field errors, got {err:?}");
        };
        assert!(errors.get("currencies.default").is_some());
        assert_eq!(cache.get().currencies.default_key(), Some("SAR"));
    }

    #[tokio::test]
    async fn test_save_refreshes_cache() {
        let db = db().await;
        let cache = SettingsCache::load(&db).await.unwrap();

        let notified = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&notified);
        cache.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let form = cache.open_form();
        form.dispatch(SettingsAction::Currencies(ListAction::SetDefault("USD".into())))
            .unwrap();
        save_settings(&db, &cache, &form.get_snapshot()).await.unwrap();

        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(cache.get().currencies.default_key(), Some("USD"));

        let stored = db.settings().load().await.unwrap().unwrap();
        assert_eq!(stored.currencies.default_key(), Some("USD"));
    }

    #[tokio::test]
    async fn test_save_failure_is_generic() {
        let db = db().await;
        let cache = SettingsCache::load(&db).await.unwrap();
        db.close().await;

        let err = save_settings(&db, &cache, &Settings::with_defaults())
            .await
            .unwrap_err();
        assert!(matches!(err, StateError::SaveFailed));
    }
}
