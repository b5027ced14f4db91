//! Error types for form construction and keyed form operations.
//!
//! Validation failures are never errors: they are recorded on the field
//! descriptor (`is_valid`, `validation_message`, `error_kind`). The types
//! here cover caller mistakes such as addressing a field that does not
//! exist or declaring a rule without the bound it needs.

use crate::models::field::FieldKey;

/// Result alias used by every fallible form operation.
pub type FormResult<T> = Result<T, FormError>;

/// Errors raised while building or addressing a form.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("unknown form field: {0}")]
    UnknownField(FieldKey),

    #[error("field {0} is defined more than once")]
    DuplicateField(FieldKey),

    #[error("field {field} uses rule {rule} but declares no {bound}")]
    MissingBound {
        field: FieldKey,
        rule: &'static str,
        bound: &'static str,
    },

    #[error("field {field} cannot use rule {rule} on a {kind} value")]
    IncompatibleRule {
        field: FieldKey,
        rule: &'static str,
        kind: &'static str,
    },

    #[error("expiry {part} is claimed by both {first} and {second}")]
    DuplicateExpiryPart {
        part: &'static str,
        first: FieldKey,
        second: FieldKey,
    },

    #[error("invalid form definition: {0}")]
    Definition(#[from] serde_json::Error),
}

/// Errors raised while loading [`crate::config::EngineConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read env file: {0}")]
    EnvFile(String),
}
