//! # State Error Type
//!
//! What a view sees when an action or a save fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Souq                                   │
//! │                                                                         │
//! │  dispatch(CartAction::Increment) ── CoreError ──────┐                   │
//! │  dispatch(SetLocale("fr"))  ─────── FieldErrors ────┤                   │
//! │  save_settings(..)                                  ▼                   │
//! │     ├── validate() fails ────────── FieldErrors ── StateError           │
//! │     └── database rejects ────────── SaveFailed      │                   │
//! │                                                     ▼                   │
//! │                                     ErrorPayload { code, message,      │
//! │                                                    fields }            │
//! │                                          │                              │
//! │                   ┌──────────────────────┴──────────────┐               │
//! │                   ▼                                     ▼               │
//! │            toast (message)                  inline (fields[path])      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected settings save is one generic `SaveFailed`; the cause goes to
//! the log, not to the form.

use serde::Serialize;
use souq_core::{CoreError, FieldErrors, ValidationError};
use souq_db::DbError;
use thiserror::Error;
use ts_rs::TS;

/// Errors surfaced by the state layer.
#[derive(Debug, Error)]
pub enum StateError {
    /// A cart rule was violated.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// One or more form fields failed validation.
    #[error("Invalid input: {0}")]
    Invalid(FieldErrors),

    /// The settings document could not be stored.
    #[error("Could not save settings")]
    SaveFailed,

    /// Opening or reading the database failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl StateError {
    /// A single-field validation failure.
    pub fn invalid(path: impl Into<String>, error: ValidationError) -> Self {
        let mut errors = FieldErrors::new();
        errors.push(path, error);
        StateError::Invalid(errors)
    }

    /// Machine-readable code for the view.
    pub fn code(&self) -> ErrorCode {
        match self {
            StateError::Core(CoreError::ItemNotFound(_))
            | StateError::Core(CoreError::NotPublished(_)) => ErrorCode::NotFound,
            StateError::Core(CoreError::InsufficientStock { .. })
            | StateError::Core(CoreError::OutOfStock(_)) => ErrorCode::InsufficientStock,
            StateError::Core(CoreError::Validation(_)) | StateError::Invalid(_) => {
                ErrorCode::ValidationError
            }
            StateError::Core(_) => ErrorCode::CartError,
            StateError::SaveFailed => ErrorCode::SaveFailed,
            StateError::Db(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<FieldErrors> for StateError {
    fn from(errors: FieldErrors) -> Self {
        StateError::Invalid(errors)
    }
}

/// Error codes for views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    InsufficientStock,
    CartError,
    SaveFailed,
    DatabaseError,
}

/// A failing field, rendered inline next to the input at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct FieldMessage {
    pub path: String,
    pub message: String,
}

/// Serialized error handed to a view.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Invalid input: currencies.default: default currency is required",
///   "fields": [{ "path": "currencies.default", "message": "default currency is required" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
    pub fields: Vec<FieldMessage>,
}

impl From<&StateError> for ErrorPayload {
    fn from(err: &StateError) -> Self {
        let fields = match err {
            StateError::Invalid(errors) => errors
                .iter()
                .map(|(path, e)| FieldMessage {
                    path: path.to_string(),
                    message: e.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        };

        ErrorPayload {
            code: err.code(),
            message: err.to_string(),
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err: StateError = CoreError::ItemNotFound("x".into()).into();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err: StateError = CoreError::NotPublished("Abaya".into()).into();
        assert_eq!(err.code(), ErrorCode::NotFound);

        let err: StateError = CoreError::OutOfStock("Abaya".into()).into();
        assert_eq!(err.code(), ErrorCode::InsufficientStock);

        assert_eq!(StateError::SaveFailed.code(), ErrorCode::SaveFailed);
    }

    #[test]
    fn test_payload_carries_field_messages() {
        let err = StateError::invalid(
            "currencies.default",
            ValidationError::Required {
                field: "default currency".to_string(),
            },
        );
        let payload = ErrorPayload::from(&err);

        assert_eq!(payload.code, ErrorCode::ValidationError);
        assert_eq!(
            payload.fields,
            vec![FieldMessage {
                path: "currencies.default".to_string(),
                message: "default currency is required".to_string(),
            }]
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn test_save_failed_is_generic() {
        let payload = ErrorPayload::from(&StateError::SaveFailed);
        assert_eq!(payload.message, "Could not save settings");
        assert!(payload.fields.is_empty());
    }
}
