//! Field Descriptor Model
//!
//! A form field is described by its current value, the rules that apply to
//! it and the validity state derived from those rules. Descriptors are plain
//! data: the engine in [`crate::functional::validation_engine`] is the only
//! place that recomputes `is_valid`, `validation_message` and `error_kind`.

use std::borrow::{Borrow, Cow};
use std::fmt;

use itertools::Itertools;
use rust_decimal::Decimal;
use serde_derive::{Deserialize, Serialize};

use crate::functional::card_rules::CardBrand;

/// Identifier of a field inside a [`crate::models::form::FormState`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Current value of a field.
///
/// Text inputs, checkboxes and multi-selects are the three shapes the
/// consoles use. Serialized untagged so a JSON definition can write
/// `"value": "abc"`, `"value": true` or `"value": ["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl FieldValue {
    /// Empty text, an unchecked flag and a list without elements are all
    /// "no value" for the required rule.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Flag(flag) => !flag,
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// Length seen by the length-based rules: characters for text,
    /// elements for lists. Flags have no length.
    pub fn len(&self) -> Option<usize> {
        match self {
            FieldValue::Text(text) => Some(text.chars().count()),
            FieldValue::Flag(_) => None,
            FieldValue::List(items) => Some(items.len()),
        }
    }

    /// Text rendering the format rules match against.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(text) => Cow::Borrowed(text.as_str()),
            FieldValue::Flag(flag) => Cow::Owned(flag.to_string()),
            FieldValue::List(items) => Cow::Owned(items.iter().join(",")),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Flag(_) => "flag",
            FieldValue::List(_) => "list",
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Which half of a card expiry pair a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPart {
    Month,
    Year,
}

impl ExpiryPart {
    pub fn as_str(self) -> &'static str {
        match self {
            ExpiryPart::Month => "month",
            ExpiryPart::Year => "year",
        }
    }
}

/// A validation rule attached to a field.
///
/// Serialized with the rule names the console forms use, e.g.
/// `"isRequired"` or `{"checkMinValue": 10}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    #[serde(rename = "isRequired")]
    Required,
    #[serde(rename = "onlyAlphaNumLower")]
    AlphaNumLower,
    #[serde(rename = "onlyAlphaNumSpace")]
    AlphaNumSpace,
    #[serde(rename = "onlyAlphaNumSpaceHyphen")]
    AlphaNumSpaceHyphen,
    #[serde(rename = "onlyAlphaNumExtendedCharacters")]
    AlphaNumExtended,
    #[serde(rename = "onlyAlphabets")]
    Alphabets,
    #[serde(rename = "onlyCreditCard")]
    CreditCard,
    #[serde(rename = "onlyCreditNumeric")]
    CreditNumeric,
    #[serde(rename = "onlyCreditMonthYear")]
    CreditMonthYear(ExpiryPart),
    #[serde(rename = "onlyCreditCvc")]
    CreditCvc,
    #[serde(rename = "onlyZipCode")]
    ZipCode,
    #[serde(rename = "checkMaxLength")]
    MaxLength,
    #[serde(rename = "checkMinLength")]
    MinLength,
    #[serde(rename = "emailAddress")]
    Email,
    #[serde(rename = "futureDate")]
    FutureDate,
    #[serde(rename = "checkMinValue")]
    MinValue(Decimal),
    #[serde(rename = "checkMaxValue")]
    MaxValue(Decimal),
    #[serde(rename = "isLoadBalancerSourceIP")]
    LoadBalancerSourceIp,
    #[serde(rename = "isSecuritySourceIP")]
    SecuritySourceIp,
    #[serde(rename = "isEmailNote")]
    EmailNote,
    #[serde(rename = "isValidURL")]
    Url,
}

/// Parameter-free discriminant of [`Rule`], used for lookups and for the
/// engine's dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Required,
    AlphaNumLower,
    AlphaNumSpace,
    AlphaNumSpaceHyphen,
    AlphaNumExtended,
    Alphabets,
    CreditCard,
    CreditNumeric,
    CreditMonthYear,
    CreditCvc,
    ZipCode,
    MaxLength,
    MinLength,
    Email,
    FutureDate,
    MinValue,
    MaxValue,
    LoadBalancerSourceIp,
    SecuritySourceIp,
    EmailNote,
    Url,
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Required => RuleKind::Required,
            Rule::AlphaNumLower => RuleKind::AlphaNumLower,
            Rule::AlphaNumSpace => RuleKind::AlphaNumSpace,
            Rule::AlphaNumSpaceHyphen => RuleKind::AlphaNumSpaceHyphen,
            Rule::AlphaNumExtended => RuleKind::AlphaNumExtended,
            Rule::Alphabets => RuleKind::Alphabets,
            Rule::CreditCard => RuleKind::CreditCard,
            Rule::CreditNumeric => RuleKind::CreditNumeric,
            Rule::CreditMonthYear(_) => RuleKind::CreditMonthYear,
            Rule::CreditCvc => RuleKind::CreditCvc,
            Rule::ZipCode => RuleKind::ZipCode,
            Rule::MaxLength => RuleKind::MaxLength,
            Rule::MinLength => RuleKind::MinLength,
            Rule::Email => RuleKind::Email,
            Rule::FutureDate => RuleKind::FutureDate,
            Rule::MinValue(_) => RuleKind::MinValue,
            Rule::MaxValue(_) => RuleKind::MaxValue,
            Rule::LoadBalancerSourceIp => RuleKind::LoadBalancerSourceIp,
            Rule::SecuritySourceIp => RuleKind::SecuritySourceIp,
            Rule::EmailNote => RuleKind::EmailNote,
            Rule::Url => RuleKind::Url,
        }
    }
}

impl RuleKind {
    /// Name of the rule as written in form definitions.
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Required => "isRequired",
            RuleKind::AlphaNumLower => "onlyAlphaNumLower",
            RuleKind::AlphaNumSpace => "onlyAlphaNumSpace",
            RuleKind::AlphaNumSpaceHyphen => "onlyAlphaNumSpaceHyphen",
            RuleKind::AlphaNumExtended => "onlyAlphaNumExtendedCharacters",
            RuleKind::Alphabets => "onlyAlphabets",
            RuleKind::CreditCard => "onlyCreditCard",
            RuleKind::CreditNumeric => "onlyCreditNumeric",
            RuleKind::CreditMonthYear => "onlyCreditMonthYear",
            RuleKind::CreditCvc => "onlyCreditCvc",
            RuleKind::ZipCode => "onlyZipCode",
            RuleKind::MaxLength => "checkMaxLength",
            RuleKind::MinLength => "checkMinLength",
            RuleKind::Email => "emailAddress",
            RuleKind::FutureDate => "futureDate",
            RuleKind::MinValue => "checkMinValue",
            RuleKind::MaxValue => "checkMaxValue",
            RuleKind::LoadBalancerSourceIp => "isLoadBalancerSourceIP",
            RuleKind::SecuritySourceIp => "isSecuritySourceIP",
            RuleKind::EmailNote => "isEmailNote",
            RuleKind::Url => "isValidURL",
        }
    }

    /// Rules whose check reads `max_length`.
    pub fn needs_max_length(self) -> bool {
        matches!(
            self,
            RuleKind::Alphabets
                | RuleKind::CreditNumeric
                | RuleKind::CreditMonthYear
                | RuleKind::CreditCvc
                | RuleKind::ZipCode
                | RuleKind::MaxLength
        )
    }

    /// Rules that only make sense on text (or list rendered as text) values.
    pub fn is_text_rule(self) -> bool {
        !matches!(self, RuleKind::Required | RuleKind::MaxLength | RuleKind::MinLength)
    }
}

/// Set of rules attached to one field. Membership matters, order does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Rule>", into = "Vec<Rule>")]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, replacing an existing rule of the same kind.
    pub fn with(mut self, rule: Rule) -> Self {
        self.0.retain(|existing| existing.kind() != rule.kind());
        self.0.push(rule);
        self
    }

    pub fn has(&self, kind: RuleKind) -> bool {
        self.0.iter().any(|rule| rule.kind() == kind)
    }

    pub fn is_required(&self) -> bool {
        self.has(RuleKind::Required)
    }

    pub fn min_value(&self) -> Option<Decimal> {
        self.0.iter().find_map(|rule| match rule {
            Rule::MinValue(bound) => Some(*bound),
            _ => None,
        })
    }

    pub fn max_value(&self) -> Option<Decimal> {
        self.0.iter().find_map(|rule| match rule {
            Rule::MaxValue(bound) => Some(*bound),
            _ => None,
        })
    }

    pub fn expiry_part(&self) -> Option<ExpiryPart> {
        self.0.iter().find_map(|rule| match rule {
            Rule::CreditMonthYear(part) => Some(*part),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        iter.into_iter().fold(RuleSet::new(), RuleSet::with)
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        rules.into_iter().collect()
    }
}

impl From<RuleSet> for Vec<Rule> {
    fn from(rules: RuleSet) -> Self {
        rules.0
    }
}

/// Category of the failure currently recorded on a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Required value absent.
    Missing,
    /// Value present but fails a pattern, length or range rule.
    Format,
    /// Value inconsistent with a sibling field (card expiry pair).
    CrossField,
    /// Well-formed value outside the accepted categories (card brand).
    Unsupported,
    /// Message supplied by the caller, e.g. a server-side rejection.
    Custom,
}

/// Full state of one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub label: String,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub is_valid: bool,
    #[serde(default)]
    pub is_touched: bool,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub validation_message: String,
    #[serde(default)]
    pub validation_rules: RuleSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_brand: Option<CardBrand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldDescriptor {
    /// Creates an empty text field.
    pub fn text(label: impl Into<String>) -> Self {
        Self::with_initial(label, FieldValue::default())
    }

    /// Creates an unchecked checkbox field.
    pub fn flag(label: impl Into<String>) -> Self {
        Self::with_initial(label, FieldValue::Flag(false))
    }

    /// Creates an empty multi-select field.
    pub fn list(label: impl Into<String>) -> Self {
        Self::with_initial(label, FieldValue::List(Vec::new()))
    }

    fn with_initial(label: impl Into<String>, value: FieldValue) -> Self {
        Self {
            label: label.into(),
            value,
            is_valid: false,
            is_touched: false,
            is_read_only: false,
            validation_message: String::new(),
            validation_rules: RuleSet::new(),
            max_length: None,
            min_length: None,
            hidden: false,
            custom_class: None,
            card_brand: None,
            error_kind: None,
            options: Vec::new(),
        }
    }

    pub fn value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = value.into();
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.validation_rules = self.validation_rules.with(rule);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.is_read_only = read_only;
        self
    }

    pub fn options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    /// Whether the UI should render `validation_message` for this field.
    pub fn shows_error(&self) -> bool {
        self.is_touched && !self.is_valid
    }

    /// Label with the decorations forms add for display (`Name: *`)
    /// removed, as used in the "is required" message.
    pub fn plain_label(&self) -> String {
        self.label.replacen(':', "", 1).replacen(" *", "", 1)
    }

    pub(crate) fn reset_verdict(&mut self) {
        self.validation_message.clear();
        self.error_kind = None;
    }

    pub(crate) fn record_failure(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.validation_message = message.into();
        self.error_kind = Some(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness_per_value_shape() {
        assert!(FieldValue::from("").is_empty());
        assert!(!FieldValue::from("x").is_empty());
        assert!(FieldValue::Flag(false).is_empty());
        assert!(!FieldValue::Flag(true).is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::List(vec!["a".into()]).is_empty());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(FieldValue::from("äöü").len(), Some(3));
        assert_eq!(FieldValue::List(vec!["a".into(), "b".into()]).len(), Some(2));
        assert_eq!(FieldValue::Flag(true).len(), None);
    }

    #[test]
    fn list_renders_comma_joined() {
        let value = FieldValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(value.as_text(), "a,b");
    }

    #[test]
    fn rule_set_replaces_same_kind() {
        let rules = RuleSet::new()
            .with(Rule::MinValue(Decimal::from(1)))
            .with(Rule::MinValue(Decimal::from(5)));
        assert_eq!(rules.min_value(), Some(Decimal::from(5)));
        assert_eq!(rules.iter().count(), 1);
    }

    #[test]
    fn rule_set_read_from_json_keeps_last_of_a_kind() {
        let parsed: RuleSet =
            serde_json::from_str(r#"[{"checkMinValue":1},"isRequired",{"checkMinValue":5}]"#).unwrap();
        assert_eq!(parsed.iter().count(), 2);
        assert_eq!(parsed.min_value(), Some(Decimal::from(5)));
        assert!(parsed.is_required());
    }

    #[test]
    fn plain_label_strips_first_decoration_only() {
        let field = FieldDescriptor::text("Name: *");
        assert_eq!(field.plain_label(), "Name");
        let field = FieldDescriptor::text("Ratio: a:b");
        assert_eq!(field.plain_label(), "Ratio a:b");
    }

    #[test]
    fn rules_use_console_names_on_the_wire() {
        let rules = RuleSet::new()
            .with(Rule::Required)
            .with(Rule::CreditMonthYear(ExpiryPart::Month));
        let json = serde_json::to_string(&rules).unwrap();
        assert_eq!(json, r#"["isRequired",{"onlyCreditMonthYear":"month"}]"#);

        let parsed: RuleSet = serde_json::from_str(r#"["emailAddress",{"checkMaxValue":100}]"#).unwrap();
        assert!(parsed.has(RuleKind::Email));
        assert_eq!(parsed.max_value(), Some(Decimal::from(100)));
    }

    #[test]
    fn descriptor_reads_camel_case_json() {
        let field: FieldDescriptor = serde_json::from_str(
            r#"{"label":"Zip","value":"9710","isTouched":true,"validationRules":["onlyZipCode"],"maxLength":5}"#,
        )
        .unwrap();
        assert_eq!(field.max_length, Some(5));
        assert!(field.is_touched);
        assert!(!field.is_valid);
        assert!(field.validation_rules.has(RuleKind::ZipCode));
    }
}
