//! # Store Settings
//!
//! The settings document edited in the admin dashboard, and the
//! "default selection" invariant of its list editors.
//!
//! ## Default Selection Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  currencies.entries  [ SAR ] [ USD ]        currencies.default = "USD"  │
//! │                                                                         │
//! │  remove(1)  ──►  entries [ SAR ]                                        │
//! │                  reconcile(): "USD" matches no entry                    │
//! │                  default = ""                                           │
//! │                                                                         │
//! │  Runs at the end of EVERY list mutation, inside the same call.          │
//! │  An empty default is a required-field error at save time, never a      │
//! │  dangling reference.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Renaming the default entry's discriminator also clears the default: the
//! list has no notion of entry identity beyond the discriminator.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::{FieldErrors, ValidationError};
use crate::locale::Theme;
use crate::money::{ExchangeRate, Money, Rate};
use crate::validation::{
    validate_currency_code, validate_language_code, validate_page_size, validate_price,
    validate_rate, validate_required,
};

// =============================================================================
// Discriminated
// =============================================================================

/// An entry that a "default X" field can point at.
pub trait Discriminated {
    /// Human name of the entry kind, used in error messages.
    const KIND: &'static str;

    /// The field the default refers to (code or name).
    fn discriminator(&self) -> &str;

    /// Field-level checks for one entry; `path` is e.g. `currencies.entries[0]`.
    fn validate_entry(&self, path: &str, errors: &mut FieldErrors);
}

// =============================================================================
// List Actions
// =============================================================================

/// An edit made through a list editor.
#[derive(Debug, Clone, PartialEq)]
pub enum ListAction<T> {
    Add(T),
    Remove(usize),
    Replace(usize, T),
    SetDefault(String),
}

// =============================================================================
// Selectable List
// =============================================================================

/// Ordered entries plus a default that references one of them by
/// discriminator.
///
/// ## Invariant
/// `default` is empty or equals the discriminator of a current entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectableList<T> {
    entries: Vec<T>,
    default: String,
}

#[derive(Deserialize)]
struct StoredList<T> {
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
    #[serde(default)]
    default: String,
}

/// Loading a stored list reconciles it, so a document edited outside the
/// admin form cannot bring back a dangling default.
impl<'de, T> Deserialize<'de> for SelectableList<T>
where
    T: Deserialize<'de> + Discriminated,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = StoredList::<T>::deserialize(deserializer)?;
        Ok(SelectableList::new(stored.entries, stored.default))
    }
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        SelectableList {
            entries: Vec::new(),
            default: String::new(),
        }
    }
}

impl<T: Discriminated> SelectableList<T> {
    pub fn new(entries: Vec<T>, default: impl Into<String>) -> Self {
        let mut list = SelectableList {
            entries,
            default: default.into(),
        };
        list.reconcile();
        list
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The default discriminator; `None` while unset.
    pub fn default_key(&self) -> Option<&str> {
        if self.default.is_empty() {
            None
        } else {
            Some(&self.default)
        }
    }

    pub fn default_entry(&self) -> Option<&T> {
        self.default_key().and_then(|d| self.find(d))
    }

    pub fn find(&self, discriminator: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|e| e.discriminator() == discriminator)
    }

    pub fn contains(&self, discriminator: &str) -> bool {
        self.find(discriminator).is_some()
    }

    pub fn discriminators(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.discriminator().to_string())
            .collect()
    }

    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
        self.reconcile();
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.reconcile();
        Some(removed)
    }

    pub fn remove_by(&mut self, discriminator: &str) -> Option<T> {
        let index = self
            .entries
            .iter()
            .position(|e| e.discriminator() == discriminator)?;
        self.remove(index)
    }

    /// Replaces the entry at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, entry: T) -> Option<T> {
        let slot = self.entries.get_mut(index)?;
        let previous = std::mem::replace(slot, entry);
        self.reconcile();
        Some(previous)
    }

    /// Edits the entry at `index` in place. Returns `false` if out of range.
    pub fn update(&mut self, index: usize, f: impl FnOnce(&mut T)) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        f(entry);
        self.reconcile();
        true
    }

    pub fn replace_entries(&mut self, entries: Vec<T>) {
        self.entries = entries;
        self.reconcile();
    }

    /// Points the default at an entry; an empty value clears it.
    ///
    /// Returns whether the default changed.
    pub fn set_default(&mut self, value: &str) -> Result<bool, ValidationError> {
        if !value.is_empty() && !self.contains(value) {
            return Err(ValidationError::NotAllowed {
                field: format!("default {}", T::KIND),
                allowed: self.discriminators(),
            });
        }
        if self.default == value {
            return Ok(false);
        }
        self.default = value.to_string();
        Ok(true)
    }

    /// Applies a list editor action. Returns whether the list changed.
    pub fn apply(&mut self, action: ListAction<T>) -> Result<bool, ValidationError> {
        let out_of_range = || ValidationError::OutOfRange {
            field: format!("{} index", T::KIND),
            min: 0,
            max: self.entries.len() as i64 - 1,
        };

        match action {
            ListAction::Add(entry) => {
                self.push(entry);
                Ok(true)
            }
            ListAction::Remove(index) => {
                let err = out_of_range();
                self.remove(index).map(|_| true).ok_or(err)
            }
            ListAction::Replace(index, entry) => {
                let err = out_of_range();
                self.replace(index, entry).map(|_| true).ok_or(err)
            }
            ListAction::SetDefault(value) => self.set_default(&value),
        }
    }

    /// Collects entry errors, duplicate discriminators and a missing default.
    pub fn validate(&self, path: &str, errors: &mut FieldErrors) {
        if self.entries.is_empty() {
            errors.push(
                format!("{path}.entries"),
                ValidationError::Required {
                    field: format!("at least one {}", T::KIND),
                },
            );
        }

        let mut seen = HashSet::new();
        for (i, entry) in self.entries.iter().enumerate() {
            let entry_path = format!("{path}.entries[{i}]");
            entry.validate_entry(&entry_path, errors);

            let discriminator = entry.discriminator();
            if !discriminator.is_empty() && !seen.insert(discriminator) {
                errors.push(
                    entry_path,
                    ValidationError::Duplicate {
                        field: T::KIND.to_string(),
                        value: discriminator.to_string(),
                    },
                );
            }
        }

        if self.default.is_empty() {
            errors.push(
                format!("{path}.default"),
                ValidationError::Required {
                    field: format!("default {}", T::KIND),
                },
            );
        }
    }

    /// Clears the default when it no longer names an entry.
    fn reconcile(&mut self) -> bool {
        if self.default.is_empty() || self.contains(&self.default) {
            return false;
        }
        self.default.clear();
        true
    }
}

// =============================================================================
// List Entries
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    pub code: String,
}

impl Discriminated for Language {
    const KIND: &'static str = "language";

    fn discriminator(&self) -> &str {
        &self.code
    }

    fn validate_entry(&self, path: &str, errors: &mut FieldErrors) {
        errors.check(format!("{path}.name"), validate_required("name", &self.name, 50));
        errors.check(format!("{path}.code"), validate_language_code(&self.code));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub name: String,
    pub code: String,
    pub symbol: String,
    /// Multiplier from the base currency into this one.
    #[ts(type = "string")]
    pub convert_rate: ExchangeRate,
}

impl Currency {
    /// Formats a base-currency amount in this currency.
    ///
    /// Returns `None` if the conversion overflows.
    pub fn format(&self, amount: Money) -> Option<String> {
        amount
            .convert(self.convert_rate)
            .map(|converted| converted.format_with(&self.symbol))
    }
}

impl Discriminated for Currency {
    const KIND: &'static str = "currency";

    fn discriminator(&self) -> &str {
        &self.code
    }

    fn validate_entry(&self, path: &str, errors: &mut FieldErrors) {
        errors.check(format!("{path}.name"), validate_required("name", &self.name, 50));
        errors.check(format!("{path}.code"), validate_currency_code(&self.code));
        errors.check(format!("{path}.symbol"), validate_required("symbol", &self.symbol, 5));
        if !self.convert_rate.is_positive() {
            errors.push(
                format!("{path}.convertRate"),
                ValidationError::MustBePositive {
                    field: "convert rate".to_string(),
                },
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub name: String,
    pub commission: Rate,
}

impl Discriminated for PaymentMethod {
    const KIND: &'static str = "payment method";

    fn discriminator(&self) -> &str {
        &self.name
    }

    fn validate_entry(&self, path: &str, errors: &mut FieldErrors) {
        errors.check(format!("{path}.name"), validate_required("name", &self.name, 50));
        errors.check(
            format!("{path}.commission"),
            validate_rate("commission", self.commission),
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDate {
    pub name: String,
    pub days_to_deliver: u32,
    pub shipping_price: Money,
    /// Items price at which this option ships free; zero means never.
    pub free_shipping_min_price: Money,
}

impl DeliveryDate {
    /// Expected delivery moment for an order placed at `now`.
    pub fn expected_on(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(i64::from(self.days_to_deliver))
    }

    /// Whether an order of `items_price` ships free with this option.
    pub fn ships_free(&self, items_price: Money) -> bool {
        self.free_shipping_min_price.is_positive() && items_price >= self.free_shipping_min_price
    }
}

impl Discriminated for DeliveryDate {
    const KIND: &'static str = "delivery date";

    fn discriminator(&self) -> &str {
        &self.name
    }

    fn validate_entry(&self, path: &str, errors: &mut FieldErrors) {
        errors.check(format!("{path}.name"), validate_required("name", &self.name, 50));
        errors.check(
            format!("{path}.shippingPrice"),
            validate_price("shipping price", self.shipping_price),
        );
        errors.check(
            format!("{path}.freeShippingMinPrice"),
            validate_price("free shipping min price", self.free_shipping_min_price),
        );
    }
}

// =============================================================================
// Carousel, Site, Common
// =============================================================================

/// A home page hero slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Carousel {
    pub title: String,
    pub url: String,
    pub image: String,
    pub button_caption: String,
    #[serde(default = "published")]
    pub is_published: bool,
}

fn published() -> bool {
    true
}

impl Carousel {
    fn validate(&self, path: &str, errors: &mut FieldErrors) {
        errors.check(format!("{path}.title"), validate_required("title", &self.title, 100));
        errors.check(format!("{path}.url"), validate_required("url", &self.url, 500));
        errors.check(format!("{path}.image"), validate_required("image", &self.image, 500));
        errors.check(
            format!("{path}.buttonCaption"),
            validate_required("button caption", &self.button_caption, 50),
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteInfo {
    pub name: String,
    pub slogan: String,
    pub description: String,
    pub keywords: String,
    pub url: String,
    pub logo: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub copyright: String,
}

impl SiteInfo {
    fn validate(&self, errors: &mut FieldErrors) {
        errors.check("site.name", validate_required("name", &self.name, 100));
        errors.check("site.url", validate_required("url", &self.url, 500));
        if !self.url.is_empty() && !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            errors.push(
                "site.url",
                ValidationError::InvalidFormat {
                    field: "url".to_string(),
                    reason: "must start with http:// or https://".to_string(),
                },
            );
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            errors.push(
                "site.email",
                ValidationError::InvalidFormat {
                    field: "email".to_string(),
                    reason: "must be an email address".to_string(),
                },
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CommonSettings {
    pub page_size: u32,
    pub is_maintenance_mode: bool,
    /// Cart subtotal at which the progress bar reaches 100%; zero disables it.
    pub free_shipping_min_price: Money,
    pub default_theme: Theme,
    pub default_color: String,
}

impl Default for CommonSettings {
    fn default() -> Self {
        CommonSettings {
            page_size: 9,
            is_maintenance_mode: false,
            free_shipping_min_price: Money::from_minor(35_000),
            default_theme: Theme::Light,
            default_color: "gold".to_string(),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// The whole settings document. Saved wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub common: CommonSettings,
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default)]
    pub carousels: Vec<Carousel>,
    #[serde(default)]
    pub languages: SelectableList<Language>,
    #[serde(default)]
    pub currencies: SelectableList<Currency>,
    #[serde(default)]
    pub payment_methods: SelectableList<PaymentMethod>,
    #[serde(default)]
    pub delivery_dates: SelectableList<DeliveryDate>,
}

impl Settings {
    /// A complete, valid document for a fresh store.
    pub fn with_defaults() -> Self {
        let languages = SelectableList::new(
            vec![
                Language {
                    name: "العربية".to_string(),
                    code: "ar".to_string(),
                },
                Language {
                    name: "English".to_string(),
                    code: "en".to_string(),
                },
            ],
            "ar",
        );

        let currencies = SelectableList::new(
            vec![
                Currency {
                    name: "Saudi Riyal".to_string(),
                    code: "SAR".to_string(),
                    symbol: "ر.س".to_string(),
                    convert_rate: ExchangeRate::one(),
                },
                Currency {
                    name: "United States Dollar".to_string(),
                    code: "USD".to_string(),
                    symbol: "$".to_string(),
                    convert_rate: ExchangeRate::new(Decimal::new(2667, 4)),
                },
            ],
            "SAR",
        );

        let payment_methods = SelectableList::new(
            vec![
                PaymentMethod {
                    name: "Cash On Delivery".to_string(),
                    commission: Rate::zero(),
                },
                PaymentMethod {
                    name: "Stripe".to_string(),
                    commission: Rate::zero(),
                },
                PaymentMethod {
                    name: "PayPal".to_string(),
                    commission: Rate::zero(),
                },
            ],
            "Cash On Delivery",
        );

        let delivery_dates = SelectableList::new(
            vec![
                DeliveryDate {
                    name: "Tomorrow".to_string(),
                    days_to_deliver: 1,
                    shipping_price: Money::from_minor(5_000),
                    free_shipping_min_price: Money::zero(),
                },
                DeliveryDate {
                    name: "Next 3 Days".to_string(),
                    days_to_deliver: 3,
                    shipping_price: Money::from_minor(2_500),
                    free_shipping_min_price: Money::zero(),
                },
                DeliveryDate {
                    name: "Next 5 Days".to_string(),
                    days_to_deliver: 5,
                    shipping_price: Money::from_minor(1_500),
                    free_shipping_min_price: Money::from_minor(35_000),
                },
            ],
            "Next 5 Days",
        );

        Settings {
            common: CommonSettings::default(),
            site: SiteInfo {
                name: "Souq".to_string(),
                slogan: "Everything you need, delivered".to_string(),
                description: "An Arabic and English online store".to_string(),
                keywords: "souq, store, shopping".to_string(),
                url: "https://souq.example.com".to_string(),
                logo: "/icons/logo.svg".to_string(),
                email: "support@souq.example.com".to_string(),
                phone: "+966 11 000 0000".to_string(),
                address: "Riyadh, Saudi Arabia".to_string(),
                copyright: "© Souq".to_string(),
            },
            carousels: vec![Carousel {
                title: "Ramadan offers".to_string(),
                url: "/search?tag=ramadan".to_string(),
                image: "/images/banner-ramadan.jpg".to_string(),
                button_caption: "Shop now".to_string(),
                is_published: true,
            }],
            languages,
            currencies,
            payment_methods,
            delivery_dates,
        }
    }

    /// Cart progress bar threshold; `None` when free shipping is disabled.
    pub fn free_shipping_threshold(&self) -> Option<Money> {
        Some(self.common.free_shipping_min_price).filter(Money::is_positive)
    }

    /// Validates the whole form, collecting every failing field.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.check("common.pageSize", validate_page_size(self.common.page_size));
        errors.check(
            "common.freeShippingMinPrice",
            validate_price("free shipping min price", self.common.free_shipping_min_price),
        );
        self.site.validate(&mut errors);

        for (i, carousel) in self.carousels.iter().enumerate() {
            carousel.validate(&format!("carousels[{i}]"), &mut errors);
        }

        self.languages.validate("languages", &mut errors);
        self.currencies.validate("currencies", &mut errors);
        self.payment_methods.validate("paymentMethods", &mut errors);
        self.delivery_dates.validate("deliveryDates", &mut errors);

        errors.into_result()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::with_defaults()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
