//! Form validation engine for console input forms.
//!
//! A form is a [`FormState`]: a persistent map of [`FieldDescriptor`]s.
//! The [`FormEngine`] turns UI events (change, blur, submit) into new form
//! states with each field's validity and message recomputed from its rules.
//!
//! ```ignore
//! use formguard::{FieldDescriptor, FormEngine, FormState, Rule};
//!
//! let engine = FormEngine::new();
//! let form = FormState::builder()
//!     .field("email", FieldDescriptor::text("Email: *").rule(Rule::Required).rule(Rule::Email))
//!     .build()?;
//! let form = engine.initialize(&form);
//! let form = engine.apply_change(&form, "email", "ops@example.com")?;
//! assert!(formguard::is_form_valid(&form));
//! ```

pub mod config;
pub mod error;
pub mod functional;
pub mod models;
pub mod services;
pub mod utils;

pub use config::EngineConfig;
pub use error::{ConfigError, FormError, FormResult};
pub use functional::card_rules::CardBrand;
pub use functional::expiry::{Clock, FixedClock, SystemClock};
pub use functional::validation_engine::FormEngine;
pub use models::dictionary::{DictionaryRow, RowPart};
pub use models::field::{
    ErrorKind, ExpiryPart, FieldDescriptor, FieldKey, FieldValue, Rule, RuleKind, RuleSet,
};
pub use models::form::{FormBuilder, FormState};
pub use services::dictionary_service::all_rows_valid;
pub use services::form_service::{
    get_value, hide_field, is_form_valid, set_options, set_validation_message, set_value,
};
pub use utils::logging::{init_logging, LogFormat};
