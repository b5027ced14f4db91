//! Form State Model
//!
//! A form is a persistent map from [`FieldKey`] to [`FieldDescriptor`].
//! Cloning is cheap and every update returns a new map that shares the
//! untouched fields with the old one, so a renderer holding the previous
//! state never observes a half-applied change.

use std::collections::{BTreeMap, HashSet};

use crate::error::{FormError, FormResult};
use crate::models::field::{ExpiryPart, FieldDescriptor, FieldKey, FieldValue, RuleKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    fields: im::HashMap<FieldKey, FieldDescriptor>,
}

impl FormState {
    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    /// Parses a form definition: a JSON object mapping field keys to
    /// descriptors in the console's camelCase shape.
    ///
    /// ```ignore
    /// let form = FormState::from_json(r#"{
    ///     "cardCvc": {"label": "CVC", "validationRules": ["isRequired", "onlyCreditCvc"], "maxLength": 3}
    /// }"#)?;
    /// ```
    pub fn from_json(definition: &str) -> FormResult<Self> {
        let fields: BTreeMap<String, FieldDescriptor> = serde_json::from_str(definition)?;
        fields
            .into_iter()
            .fold(FormState::builder(), |builder, (key, field)| {
                builder.field(key, field)
            })
            .build()
    }

    /// Serializes the form with keys in sorted order.
    pub fn to_json(&self) -> FormResult<String> {
        let sorted: BTreeMap<&str, &FieldDescriptor> = self
            .fields
            .iter()
            .map(|(key, field)| (key.as_str(), field))
            .collect();
        Ok(serde_json::to_string(&sorted)?)
    }

    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(key)
    }

    /// Like [`FormState::get`], but an unknown key is an error.
    pub fn field(&self, key: &str) -> FormResult<&FieldDescriptor> {
        self.fields
            .get(key)
            .ok_or_else(|| FormError::UnknownField(FieldKey::from(key)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldDescriptor)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    /// Key of the field holding the given half of the card expiry pair.
    pub fn expiry_key(&self, part: ExpiryPart) -> Option<&FieldKey> {
        self.fields
            .iter()
            .find(|(_, field)| field.validation_rules.expiry_part() == Some(part))
            .map(|(key, _)| key)
    }

    /// Returns a new form with `key` replaced by `field`.
    pub(crate) fn with_field(&self, key: FieldKey, field: FieldDescriptor) -> FormState {
        FormState {
            fields: self.fields.update(key, field),
        }
    }

    /// Returns a new form where every field has been passed through `f`.
    pub(crate) fn map_fields<F>(&self, mut f: F) -> FormState
    where
        F: FnMut(&FieldKey, &FieldDescriptor) -> Option<FieldDescriptor>,
    {
        let mut fields = self.fields.clone();
        for (key, field) in self.fields.iter() {
            if let Some(updated) = f(key, field) {
                fields.insert(key.clone(), updated);
            }
        }
        FormState { fields }
    }
}

/// Collects field definitions and checks them once, at construction.
#[derive(Debug, Default)]
pub struct FormBuilder {
    fields: Vec<(FieldKey, FieldDescriptor)>,
}

impl FormBuilder {
    pub fn field(mut self, key: impl Into<FieldKey>, field: FieldDescriptor) -> Self {
        self.fields.push((key.into(), field));
        self
    }

    /// Checks every definition and assembles the form.
    ///
    /// Validity flags are taken as declared; run
    /// [`crate::functional::validation_engine::FormEngine::initialize`] to
    /// derive them from the rules.
    pub fn build(self) -> FormResult<FormState> {
        let mut seen = HashSet::new();
        let mut month: Option<FieldKey> = None;
        let mut year: Option<FieldKey> = None;
        let mut fields = im::HashMap::new();

        for (key, field) in self.fields {
            if !seen.insert(key.clone()) {
                return Err(FormError::DuplicateField(key));
            }
            check_definition(&key, &field)?;

            if let Some(part) = field.validation_rules.expiry_part() {
                let slot = match part {
                    ExpiryPart::Month => &mut month,
                    ExpiryPart::Year => &mut year,
                };
                if let Some(first) = slot.as_ref() {
                    return Err(FormError::DuplicateExpiryPart {
                        part: part.as_str(),
                        first: first.clone(),
                        second: key,
                    });
                }
                *slot = Some(key.clone());
            }

            fields.insert(key, field);
        }

        log::debug!("Built form with {} fields", fields.len());
        Ok(FormState { fields })
    }
}

fn check_definition(key: &FieldKey, field: &FieldDescriptor) -> FormResult<()> {
    for rule in field.validation_rules.iter() {
        let kind = rule.kind();

        if kind.needs_max_length() && field.max_length.is_none() {
            return Err(FormError::MissingBound {
                field: key.clone(),
                rule: kind.name(),
                bound: "maxLength",
            });
        }
        if kind == RuleKind::MinLength && field.min_length.is_none() {
            return Err(FormError::MissingBound {
                field: key.clone(),
                rule: kind.name(),
                bound: "minLength",
            });
        }
        if kind.is_text_rule() && matches!(field.value, FieldValue::Flag(_)) {
            return Err(FormError::IncompatibleRule {
                field: key.clone(),
                rule: kind.name(),
                kind: field.value.kind(),
            });
        }
    }
    Ok(())
}
