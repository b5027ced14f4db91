//! Payment Card Rules
//!
//! Brand detection, digit grouping and the Luhn checksum used by the card
//! number field. Two families of patterns exist per brand: a *prefix*
//! pattern that recognises a brand while the number is still being typed,
//! and a *full* pattern that accepts only complete numbers on blur.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_derive::{Deserialize, Serialize};

/// Styling class used while no brand has been recognised.
pub const DEFAULT_CUSTOM_CLASS: &str = "creditCard-all-images";
/// Input length allowed while no brand has been recognised.
pub const DEFAULT_MAX_LENGTH: usize = 19;
/// Digit count at which an unrecognised number gets a Luhn check.
pub const DEFAULT_VALID_LENGTH: usize = 16;

static VISA_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^4[0-9]{2,}$").unwrap());
static MASTERCARD_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:5[1-5][0-9]{2,}|222[1-9][0-9]{1,}|22[3-9][0-9]{2,}|2[3-6][0-9]{3,}|27[01][0-9]{2,}|2720[0-9]{1,})$",
    )
    .unwrap()
});
static AMEX_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^3[47][0-9]{1,}$").unwrap());
static DISCOVER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^6(?:011|5[0-9]{1}|4[4-9]{1})[0-9]{1,}$").unwrap());

static VISA_FULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^4[0-9]{12}(?:[0-9]{3})?$").unwrap());
static MASTERCARD_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:5[1-5][0-9]{14}|(?:222[1-9]|22[3-9][0-9]|2[3-6][0-9]{2}|27[01][0-9]|2720)[0-9]{12})$",
    )
    .unwrap()
});
static AMEX_FULL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^3[47][0-9]{13}$").unwrap());
static DISCOVER_FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^6(?:011|5[0-9]{1}|4[4-9]{1})[0-9]{1,}$").unwrap());

/// Accepted card brands, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
}

impl CardBrand {
    /// Detection order matters: the first matching brand wins.
    pub const ALL: [CardBrand; 4] = [
        CardBrand::Visa,
        CardBrand::Mastercard,
        CardBrand::Amex,
        CardBrand::Discover,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::Mastercard => "Mastercard",
            CardBrand::Amex => "Amex",
            CardBrand::Discover => "Discover",
        }
    }

    pub fn custom_class(self) -> &'static str {
        match self {
            CardBrand::Visa => "creditCard-visa",
            CardBrand::Mastercard => "creditCard-mastercard",
            CardBrand::Amex => "creditCard-amex",
            CardBrand::Discover => "creditCard-discover",
        }
    }

    /// Number of digits of a complete card number.
    pub fn valid_length(self) -> usize {
        match self {
            CardBrand::Amex => 15,
            _ => 16,
        }
    }

    /// Number of separators the grouped display form inserts.
    pub fn separators(self) -> usize {
        match self {
            CardBrand::Amex => 2,
            _ => 3,
        }
    }

    /// Input length of the grouped display form.
    pub fn display_length(self) -> usize {
        self.valid_length() + self.separators()
    }

    fn prefix_pattern(self) -> &'static Regex {
        match self {
            CardBrand::Visa => &VISA_PREFIX,
            CardBrand::Mastercard => &MASTERCARD_PREFIX,
            CardBrand::Amex => &AMEX_PREFIX,
            CardBrand::Discover => &DISCOVER_PREFIX,
        }
    }

    fn full_pattern(self) -> &'static Regex {
        match self {
            CardBrand::Visa => &VISA_FULL,
            CardBrand::Mastercard => &MASTERCARD_FULL,
            CardBrand::Amex => &AMEX_FULL,
            CardBrand::Discover => &DISCOVER_FULL,
        }
    }

    /// Groups the digits the way the brand prints them.
    pub fn format(self, digits: &str) -> String {
        match self {
            CardBrand::Amex => format_4_6_5(digits),
            _ => format_groups_of_four(digits),
        }
    }
}

/// Brand recognised from the digits typed so far.
pub fn detect_brand(digits: &str) -> Option<CardBrand> {
    CardBrand::ALL
        .into_iter()
        .find(|brand| brand.prefix_pattern().is_match(digits))
}

/// Brand whose complete-number pattern accepts the digits.
pub fn match_full_brand(digits: &str) -> Option<CardBrand> {
    CardBrand::ALL
        .into_iter()
        .find(|brand| brand.full_pattern().is_match(digits))
}

pub fn strip_non_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Mod-10 checksum (ISO/IEC 7812-1). Non-digit characters are ignored.
pub fn luhn_valid(number: &str) -> bool {
    let sum: u32 = number
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, digit)| {
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

fn format_groups_of_four(digits: &str) -> String {
    digits
        .as_bytes()
        .chunks(4)
        .map(String::from_utf8_lossy)
        .join(" ")
}

fn format_4_6_5(digits: &str) -> String {
    let part = |start: usize, end: usize| -> &str {
        let end = end.min(digits.len());
        digits.get(start.min(end)..end).unwrap_or("")
    };

    [part(0, 4), part(4, 10), part(10, 15)]
        .join(" ")
        .trim()
        .to_string()
}

/// Outcome of inspecting a card number while it is being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInspection {
    pub brand: Option<CardBrand>,
    /// Digits regrouped for display; the bare digits if no brand matched.
    pub display: String,
    pub max_length: usize,
    pub custom_class: &'static str,
    pub problem: Option<CardProblem>,
}

/// Why a partially typed card number is already known to be bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardProblem {
    /// No accepted brand matches and enough digits were typed to tell.
    NotAllowed,
    /// Number is complete for its brand but fails the checksum.
    ChecksumFailed,
}

impl CardProblem {
    pub fn message(self) -> &'static str {
        match self {
            CardProblem::NotAllowed => "Card is not allowed.",
            CardProblem::ChecksumFailed => "Invalid card.",
        }
    }
}

/// Inspects a card number being typed.
///
/// `unsupported_after` is the digit count beyond which an unrecognised
/// prefix is reported as not allowed; shorter input is treated as still in
/// progress. The checksum problem wins when both apply.
pub fn inspect_partial(raw: &str, unsupported_after: usize) -> CardInspection {
    let digits = strip_non_digits(raw);
    let brand = detect_brand(&digits);

    let (display, max_length, custom_class, valid_length) = match brand {
        Some(brand) => (
            brand.format(&digits),
            brand.display_length(),
            brand.custom_class(),
            brand.valid_length(),
        ),
        None => (
            digits.clone(),
            DEFAULT_MAX_LENGTH,
            DEFAULT_CUSTOM_CLASS,
            DEFAULT_VALID_LENGTH,
        ),
    };

    let mut problem = None;
    if brand.is_none() && digits.len() > unsupported_after {
        problem = Some(CardProblem::NotAllowed);
    }
    if digits.len() == valid_length && !luhn_valid(&digits) {
        problem = Some(CardProblem::ChecksumFailed);
    }

    CardInspection {
        brand,
        display,
        max_length,
        custom_class,
        problem,
    }
}
