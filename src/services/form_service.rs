//! Form Service
//!
//! Form-level operations: the change and blur handlers a UI calls per
//! event, the whole-form checks a submit button consults, and the
//! programmatic setters used to prefill or annotate fields. Every
//! operation returns a new [`FormState`]; the input form is never
//! modified.

use crate::error::FormResult;
use crate::functional::expiry::Clock;
use crate::functional::validation_engine::FormEngine;
use crate::models::field::{ErrorKind, FieldDescriptor, FieldKey, FieldValue};
use crate::models::form::FormState;

/// Looks up `key` and returns an owned copy ready to be modified.
fn take(form: &FormState, key: &str) -> FormResult<(FieldKey, FieldDescriptor)> {
    let field = form.field(key)?;
    Ok((FieldKey::from(key), field.clone()))
}

impl<C: Clock> FormEngine<C> {
    /// Handles a keystroke or selection: stores the value, marks the field
    /// touched and re-runs its change rules.
    pub fn apply_change(
        &self,
        form: &FormState,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> FormResult<FormState> {
        let (key, mut field) = take(form, key)?;
        field.value = value.into();
        field.is_touched = true;
        self.validate_in_place(&mut field);
        Ok(form.with_field(key, field))
    }

    /// Handles focus leaving a field: everything [`FormEngine::apply_change`]
    /// does, then the checks that only make sense on a complete value
    /// (full card number, expiry pair, exact CVC length, ZIP length).
    ///
    /// The expiry pair check may change the month field when the year is
    /// the one being blurred.
    pub fn apply_blur(
        &self,
        form: &FormState,
        key: &str,
        value: impl Into<FieldValue>,
    ) -> FormResult<FormState> {
        let changed = self.apply_change(form, key, value)?;
        Ok(self.run_blur_rules(changed, &FieldKey::from(key)))
    }

    /// Touches and re-validates every field, then reports whether the form
    /// can be submitted. The returned form shows every error at once.
    pub fn is_form_valid_for_submit(&self, form: &FormState) -> (FormState, bool) {
        let span = tracing::info_span!("form_submit", fields = form.len());
        let _enter = span.enter();

        let checked = form.map_fields(|_, field| {
            let mut field = field.clone();
            field.is_touched = true;
            self.validate_in_place(&mut field);
            Some(field)
        });
        let valid = is_form_valid(&checked);

        if !valid {
            let failing = checked
                .iter()
                .filter(|(_, field)| !field.hidden && !field.is_valid)
                .count();
            log::debug!("Form submit blocked by {} invalid fields", failing);
        }
        (checked, valid)
    }

    /// Touches and re-validates only the required fields that are currently
    /// invalid. Valid and optional fields keep their touch state.
    pub fn mark_required_fields_touched(&self, form: &FormState) -> FormState {
        form.map_fields(|_, field| {
            if !field.validation_rules.is_required() || field.is_valid {
                return None;
            }
            let mut field = field.clone();
            field.is_touched = true;
            self.validate_in_place(&mut field);
            Some(field)
        })
    }

    /// Touches and re-validates one field. With a custom message the field
    /// is forced invalid and shows that message instead, e.g. a rejection
    /// returned by the server.
    pub fn mark_error(
        &self,
        form: &FormState,
        key: &str,
        custom_message: Option<&str>,
    ) -> FormResult<FormState> {
        let (key, mut field) = take(form, key)?;
        field.is_touched = true;
        self.validate_in_place(&mut field);
        if let Some(message) = custom_message {
            field.is_valid = false;
            field.record_failure(ErrorKind::Custom, message);
        }
        Ok(form.with_field(key, field))
    }
}

/// True unless a visible field is invalid. Nothing is touched or
/// re-validated.
pub fn is_form_valid(form: &FormState) -> bool {
    form.iter()
        .all(|(_, field)| field.hidden || field.is_valid)
}

pub fn get_value<'a>(form: &'a FormState, key: &str) -> FormResult<&'a FieldValue> {
    Ok(&form.field(key)?.value)
}

/// Programmatic write used to prefill a form. Only the required rule is
/// consulted; the field's touch state is left alone so no error shows.
pub fn set_value(
    form: &FormState,
    key: &str,
    value: impl Into<FieldValue>,
) -> FormResult<FormState> {
    let (key, mut field) = take(form, key)?;
    field.value = value.into();
    field.reset_verdict();
    field.is_valid = !field.validation_rules.is_required() || !field.value.is_empty();
    if !field.is_valid {
        let message = format!("{} is required", field.plain_label());
        field.record_failure(ErrorKind::Missing, message);
    }
    Ok(form.with_field(key, field))
}

/// Replaces the choices offered by a select field.
pub fn set_options(form: &FormState, key: &str, options: Vec<String>) -> FormResult<FormState> {
    let (key, mut field) = take(form, key)?;
    field.options = options;
    Ok(form.with_field(key, field))
}

/// Hidden fields are ignored by [`is_form_valid`].
pub fn hide_field(form: &FormState, key: &str, hidden: bool) -> FormResult<FormState> {
    let (key, mut field) = take(form, key)?;
    field.hidden = hidden;
    Ok(form.with_field(key, field))
}

pub fn set_validation_message(
    form: &FormState,
    key: &str,
    message: impl Into<String>,
) -> FormResult<FormState> {
    let (key, mut field) = take(form, key)?;
    field.is_valid = false;
    field.record_failure(ErrorKind::Custom, message);
    Ok(form.with_field(key, field))
}
