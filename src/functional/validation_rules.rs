//! Composable Validation Rules
//!
//! Pure text rules applied by the field dispatcher. Each rule inspects the
//! text rendering of a field value and either accepts it or returns a
//! [`RuleFailure`] carrying the user-facing message. Whether an empty
//! optional value short-circuits, and whether a failure stops the
//! dispatcher, is decided by the engine, not here.

use std::cmp::Ordering;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::field::ErrorKind;

/// Cached regex patterns for validation
static ALPHA_NUM_LOWER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());
static ALPHA_NUM_SPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9\- ]*[a-zA-Z0-9])?$").unwrap());
static ALPHA_NUM_SPACE_HYPHEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9 -]*$").unwrap());
static ALPHA_NUM_EXTENDED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9 .:/_-]*$").unwrap());
static ALPHABETS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z ]([a-zA-Z ]*[a-zA-Z ])?$").unwrap());
// Kept as the consoles have always matched it: the `.` after the domain
// label is unescaped and `±` is accepted in the local part.
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.±-]+@[a-zA-Z0-9-]+.[a-zA-Z0-9-.]+$").unwrap());
static LOAD_BALANCER_IP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])\.(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])(?:$|/(16|24))$",
    )
    .unwrap()
});
static SECURITY_IP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$|^((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])/(3[0-2]|[1-2]?[0-9])$|^$",
    )
    .unwrap()
});
static EMAIL_NOTE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.,;_@:\- ]+$").unwrap());

/// Keyword accepted by both source-IP rules in place of an address.
pub const ANY_SOURCE: &str = "any";

/// Validation result type for composable validation chains
pub type ValidationResult<T> = Result<T, RuleFailure>;

/// A failed rule: what kind of problem it is and what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl RuleFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for the common [`ErrorKind::Format`] failure.
    pub fn format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Format, message)
    }
}

/// Core validation rule trait for text-based field rules
pub trait ValidationRule {
    fn validate(&self, text: &str, label: &str) -> ValidationResult<()>;
}

fn check(matched: bool, message: impl FnOnce() -> String) -> ValidationResult<()> {
    if matched {
        Ok(())
    } else {
        Err(RuleFailure::format(message()))
    }
}

/// Lowercase alphanumerics with inner hyphens, e.g. resource names.
pub struct AlphaNumLower;

impl ValidationRule for AlphaNumLower {
    fn validate(&self, text: &str, label: &str) -> ValidationResult<()> {
        check(ALPHA_NUM_LOWER_REGEX.is_match(text), || {
            format!(
                "Only lower case alphanumeric and hyphen(-) allowed for {}.",
                label
            )
        })
    }
}

/// Alphanumerics with inner spaces and hyphens.
pub struct AlphaNumSpace;

impl ValidationRule for AlphaNumSpace {
    fn validate(&self, text: &str, label: &str) -> ValidationResult<()> {
        check(ALPHA_NUM_SPACE_REGEX.is_match(text), || {
            format!(
                "Only alphanumeric, space and hyphen(-) allowed for {}.",
                label
            )
        })
    }
}

/// Alphanumerics, spaces and hyphens anywhere.
pub struct AlphaNumSpaceHyphen;

impl ValidationRule for AlphaNumSpaceHyphen {
    fn validate(&self, text: &str, label: &str) -> ValidationResult<()> {
        check(
            ALPHA_NUM_SPACE_HYPHEN_REGEX.is_match(text) && !text.is_empty(),
            || {
                format!(
                    "Only alphanumeric, space and hyphen(-) allowed for {}.",
                    label
                )
            },
        )
    }
}

/// Alphanumerics, spaces and `- _ . : /`.
pub struct AlphaNumExtended;

impl ValidationRule for AlphaNumExtended {
    fn validate(&self, text: &str, label: &str) -> ValidationResult<()> {
        check(
            ALPHA_NUM_EXTENDED_REGEX.is_match(text) && !text.is_empty(),
            || {
                format!(
                    "Only alphanumeric, space and special characters(- _ . : /) allowed for {}.",
                    label
                )
            },
        )
    }
}

/// Letters and spaces, optionally bounded in length.
pub struct Alphabets {
    pub max_length: Option<usize>,
}

impl ValidationRule for Alphabets {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        let within_bound = self
            .max_length
            .map_or(true, |max| text.chars().count() <= max);
        check(ALPHABETS_REGEX.is_match(text) && within_bound, || {
            "Only letters from A-Z or a-z are allowed.".to_string()
        })
    }
}

/// Email address format.
pub struct Email;

impl ValidationRule for Email {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        check(EMAIL_REGEX.is_match(text), || {
            "Invalid email address.".to_string()
        })
    }
}

/// Load balancer source: `any`, an IPv4 address, or one with a /16 or /24
/// suffix.
pub struct LoadBalancerSourceIp;

impl ValidationRule for LoadBalancerSourceIp {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        check(
            (text == ANY_SOURCE || LOAD_BALANCER_IP_REGEX.is_match(text)) && !text.is_empty(),
            || "Invalid IP".to_string(),
        )
    }
}

/// Security rule source: `any`, an IPv4 address, or a CIDR block /0-/32.
pub struct SecuritySourceIp;

impl ValidationRule for SecuritySourceIp {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        check(
            (text == ANY_SOURCE || SECURITY_IP_REGEX.is_match(text)) && !text.is_empty(),
            || "Invalid IP".to_string(),
        )
    }
}

/// Free-text note restricted to a conservative character set.
pub struct EmailNote;

impl ValidationRule for EmailNote {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        check(EMAIL_NOTE_REGEX.is_match(text), || {
            "Only alphanumeric characters, spaces and symbols ( . , ; : @ _ - ) are allowed."
                .to_string()
        })
    }
}

/// Absolute URL parseable by the WHATWG URL parser.
pub struct ValidUrl;

impl ValidationRule for ValidUrl {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        check(url::Url::parse(text).is_ok(), || "Invalid URL".to_string())
    }
}

/// Lower numeric bound.
pub struct MinValue(pub Decimal);

impl ValidationRule for MinValue {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        let below = compare_number(text, self.0) == Some(Ordering::Less);
        check(has_digit(text) && !below, || {
            format!("Value less than {} is not allowed.", self.0)
        })
    }
}

/// Upper numeric bound.
pub struct MaxValue(pub Decimal);

impl ValidationRule for MaxValue {
    fn validate(&self, text: &str, _label: &str) -> ValidationResult<()> {
        let above = compare_number(text, self.0) == Some(Ordering::Greater);
        check(has_digit(text) && !above, || {
            format!("Value more than {} is not allowed.", self.0)
        })
    }
}

pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

/// Reads a numeric input value. Surrounding whitespace, a leading `+` and
/// scientific notation are accepted; anything else is not a number.
pub fn parse_number(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.is_empty() {
        return None;
    }
    Decimal::from_str(unsigned)
        .or_else(|_| Decimal::from_scientific(unsigned))
        .ok()
}

/// Orders a numeric input against a bound. Numbers outside the decimal
/// range are compared as floats; text that is not a number yields `None`.
pub fn compare_number(text: &str, bound: Decimal) -> Option<Ordering> {
    if let Some(number) = parse_number(text) {
        return Some(number.cmp(&bound));
    }
    let wide = text.trim().parse::<f64>().ok()?;
    wide.partial_cmp(&bound.to_f64()?)
}
