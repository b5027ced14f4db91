//! Pure rule logic: text rules, card helpers, calendar rules and the
//! engine that dispatches them.

pub mod card_rules;
pub mod expiry;
pub mod validation_engine;
pub mod validation_rules;
