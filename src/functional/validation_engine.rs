//! Field Validation Engine
//!
//! Runs the rules attached to a field in a fixed order and records the
//! verdict on the field. The order and the set of rules that stop the run
//! decide which message wins when several rules are configured together,
//! so both live in one table ([`DISPATCH_ORDER`]) rather than in the rule
//! set.
//!
//! Rules fall into three groups:
//! - stopping rules (`isRequired`, length bounds, every pattern rule) end
//!   the run on failure;
//! - card and expiry rules record a failure and let the run continue, so a
//!   later passing rule leaves the earlier failure in place but a later
//!   failing rule replaces its message;
//! - `onlyCreditNumeric` never fails: it trims the offending character.

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::functional::card_rules::{
    inspect_partial, luhn_valid, match_full_brand, strip_non_digits, CardProblem,
};
use crate::functional::expiry::{
    expiry_in_future, is_after_today, month_in_range, year_not_past, Clock, SystemClock,
};
use crate::functional::validation_rules::{
    AlphaNumExtended, AlphaNumLower, AlphaNumSpace, AlphaNumSpaceHyphen, Alphabets, Email,
    EmailNote, LoadBalancerSourceIp, MaxValue, MinValue, RuleFailure, SecuritySourceIp,
    ValidUrl, ValidationRule,
};
use crate::models::field::{
    ErrorKind, ExpiryPart, FieldDescriptor, FieldKey, FieldValue, RuleKind,
};
use crate::models::form::FormState;

/// Order in which the change rules run. `CreditCvc` and `ZipCode` have no
/// change step; they are checked on blur only.
pub const DISPATCH_ORDER: [RuleKind; 19] = [
    RuleKind::Required,
    RuleKind::AlphaNumLower,
    RuleKind::AlphaNumSpace,
    RuleKind::AlphaNumSpaceHyphen,
    RuleKind::AlphaNumExtended,
    RuleKind::Alphabets,
    RuleKind::CreditCard,
    RuleKind::CreditNumeric,
    RuleKind::CreditMonthYear,
    RuleKind::MaxLength,
    RuleKind::MinLength,
    RuleKind::Email,
    RuleKind::FutureDate,
    RuleKind::MinValue,
    RuleKind::MaxValue,
    RuleKind::LoadBalancerSourceIp,
    RuleKind::SecuritySourceIp,
    RuleKind::EmailNote,
    RuleKind::Url,
];

const FUTURE_DATE_MESSAGE: &str = "Date must be greater than today";
const INVALID_CARD_MESSAGE: &str = "Invalid card.";
const INVALID_CVC_MESSAGE: &str = "Invalid CVC";
const INVALID_ZIP_MESSAGE: &str = "Invalid ZIP code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Running verdict of one validation pass.
struct Pass<'a> {
    field: &'a mut FieldDescriptor,
    valid: bool,
}

impl Pass<'_> {
    fn fail(&mut self, failure: RuleFailure) {
        self.valid = false;
        self.field.record_failure(failure.kind, failure.message);
    }

    /// Empty value on a field that does not require one: nothing to check.
    fn optional_empty(&self) -> bool {
        self.field.value.is_empty() && !self.field.validation_rules.is_required()
    }

    fn text_rule(&mut self, rule: &dyn ValidationRule) -> Flow {
        if self.optional_empty() {
            return Flow::Stop;
        }
        let outcome = rule.validate(&self.field.value.as_text(), &self.field.label);
        match outcome {
            Ok(()) => Flow::Continue,
            Err(failure) => {
                self.fail(failure);
                Flow::Stop
            }
        }
    }
}

/// Validation engine: configuration plus the clock the calendar rules
/// read.
#[derive(Debug, Clone)]
pub struct FormEngine<C: Clock = SystemClock> {
    config: EngineConfig,
    clock: C,
}

impl FormEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl Default for FormEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FormEngine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Returns a copy of `field` with its verdict recomputed from its
    /// rules. Card and numeric rules may also rewrite the value.
    ///
    /// ```
    /// use formguard::{FieldDescriptor, FormEngine, Rule};
    ///
    /// let engine = FormEngine::new();
    /// let field = FieldDescriptor::text("Name: *").rule(Rule::Required);
    /// let checked = engine.validate(&field);
    /// assert!(!checked.is_valid);
    /// assert_eq!(checked.validation_message, "Name is required");
    /// ```
    pub fn validate(&self, field: &FieldDescriptor) -> FieldDescriptor {
        let mut checked = field.clone();
        self.validate_in_place(&mut checked);
        checked
    }

    pub(crate) fn validate_in_place(&self, field: &mut FieldDescriptor) {
        field.reset_verdict();
        let mut pass = Pass {
            field: &mut *field,
            valid: true,
        };

        for kind in DISPATCH_ORDER {
            if !pass.field.validation_rules.has(kind) {
                continue;
            }
            if self.step(kind, &mut pass) == Flow::Stop {
                break;
            }
        }

        let valid = pass.valid;
        field.is_valid = valid;
        if !valid {
            log::trace!(
                "Field '{}' failed validation: {}",
                field.label,
                field.validation_message
            );
        }
    }

    fn step(&self, kind: RuleKind, pass: &mut Pass<'_>) -> Flow {
        match kind {
            RuleKind::Required => required_step(pass),
            RuleKind::AlphaNumLower => pass.text_rule(&AlphaNumLower),
            RuleKind::AlphaNumSpace => pass.text_rule(&AlphaNumSpace),
            RuleKind::AlphaNumSpaceHyphen => pass.text_rule(&AlphaNumSpaceHyphen),
            RuleKind::AlphaNumExtended => pass.text_rule(&AlphaNumExtended),
            RuleKind::Alphabets => {
                let rule = Alphabets {
                    max_length: pass.field.max_length,
                };
                pass.text_rule(&rule)
            }
            RuleKind::CreditCard => self.credit_card_step(pass),
            RuleKind::CreditNumeric => credit_numeric_step(pass),
            RuleKind::CreditMonthYear => self.credit_month_year_step(pass),
            RuleKind::MaxLength => max_length_step(pass),
            RuleKind::MinLength => min_length_step(pass),
            RuleKind::Email => pass.text_rule(&Email),
            RuleKind::FutureDate => self.future_date_step(pass),
            RuleKind::MinValue => match pass.field.validation_rules.min_value() {
                Some(bound) => pass.text_rule(&MinValue(bound)),
                None => Flow::Continue,
            },
            RuleKind::MaxValue => match pass.field.validation_rules.max_value() {
                Some(bound) => pass.text_rule(&MaxValue(bound)),
                None => Flow::Continue,
            },
            RuleKind::LoadBalancerSourceIp => pass.text_rule(&LoadBalancerSourceIp),
            RuleKind::SecuritySourceIp => pass.text_rule(&SecuritySourceIp),
            RuleKind::EmailNote => pass.text_rule(&EmailNote),
            RuleKind::Url => pass.text_rule(&ValidUrl),
            RuleKind::CreditCvc | RuleKind::ZipCode => Flow::Continue,
        }
    }

    fn credit_card_step(&self, pass: &mut Pass<'_>) -> Flow {
        let inspection = inspect_partial(
            &pass.field.value.as_text(),
            self.config.unsupported_card_digits,
        );

        let field = &mut *pass.field;
        field.value = FieldValue::Text(inspection.display);
        field.max_length = Some(inspection.max_length);
        field.custom_class = Some(inspection.custom_class.to_string());
        field.card_brand = inspection.brand;

        if let Some(problem) = inspection.problem {
            let kind = match problem {
                CardProblem::NotAllowed => ErrorKind::Unsupported,
                CardProblem::ChecksumFailed => ErrorKind::Format,
            };
            pass.fail(RuleFailure::new(kind, problem.message()));
        }
        Flow::Continue
    }

    fn credit_month_year_step(&self, pass: &mut Pass<'_>) -> Flow {
        let Some(part) = pass.field.validation_rules.expiry_part() else {
            return Flow::Continue;
        };
        let text = pass.field.value.as_text().into_owned();
        if text.is_empty() {
            return Flow::Continue;
        }

        let within_bound = pass
            .field
            .max_length
            .map_or(true, |max| text.chars().count() <= max);
        let part_ok = match part {
            ExpiryPart::Month => month_in_range(&text),
            ExpiryPart::Year => year_not_past(&text, &self.config.expiry_year_prefix, self.today()),
        };

        if within_bound && !part_ok {
            let message = format!("Invalid {}.", pass.field.label);
            pass.fail(RuleFailure::format(message));
        }
        Flow::Continue
    }

    fn future_date_step(&self, pass: &mut Pass<'_>) -> Flow {
        if pass.field.value.is_empty() {
            return Flow::Continue;
        }
        if is_after_today(&pass.field.value.as_text(), self.today()) {
            Flow::Continue
        } else {
            pass.fail(RuleFailure::format(FUTURE_DATE_MESSAGE));
            Flow::Stop
        }
    }

    /// Recomputes every field's verdict without marking anything touched.
    /// Used once after a form is built, so `is_valid` reflects the rules
    /// before the user interacts with it.
    pub fn initialize(&self, form: &FormState) -> FormState {
        form.map_fields(|_, field| Some(self.validate(field)))
    }

    /// Runs the blur-only rules for `key` on a form where the field's
    /// change rules have already been applied.
    pub(crate) fn run_blur_rules(&self, form: FormState, key: &FieldKey) -> FormState {
        let Some(field) = form.get(key.as_str()) else {
            return form;
        };
        if field.value.is_empty() {
            return form;
        }

        let mut field = field.clone();
        let rules = field.validation_rules.clone();

        if rules.has(RuleKind::CreditCard) {
            blur_card(&mut field);
        }

        let mut form = form.with_field(key.clone(), field);

        if rules.has(RuleKind::CreditMonthYear) {
            form = self.blur_expiry_pair(form);
        }

        let Some(field) = form.get(key.as_str()) else {
            return form;
        };
        let mut field = field.clone();

        if rules.has(RuleKind::CreditCvc) {
            let exact = field.max_length.is_some_and(|max| field.value.len() == Some(max));
            if !exact {
                field.is_valid = false;
                field.record_failure(ErrorKind::Format, INVALID_CVC_MESSAGE);
            }
        }

        if rules.has(RuleKind::ZipCode) {
            let too_long = match (field.value.len(), field.max_length) {
                (Some(len), Some(max)) => len > max,
                _ => false,
            };
            if too_long {
                field.is_valid = false;
                field.record_failure(ErrorKind::Format, INVALID_ZIP_MESSAGE);
            }
        }

        form.with_field(key.clone(), field)
    }

    /// Checks the month/year pair as a whole. The verdict lands on the
    /// month field; the year keeps its own.
    fn blur_expiry_pair(&self, form: FormState) -> FormState {
        let (Some(month_key), Some(year_key)) = (
            form.expiry_key(ExpiryPart::Month).cloned(),
            form.expiry_key(ExpiryPart::Year).cloned(),
        ) else {
            return form;
        };
        let (Some(month), Some(year)) = (form.get(month_key.as_str()), form.get(year_key.as_str())) else {
            return form;
        };

        let pair_failed_before = !month.is_valid && month.error_kind == Some(ErrorKind::CrossField);
        if !((month.is_valid && year.is_valid) || pair_failed_before) {
            return form;
        }
        if month.value.is_empty() || year.value.is_empty() {
            return form;
        }

        let in_future = expiry_in_future(
            &month.value.as_text(),
            &year.value.as_text(),
            &self.config.expiry_year_prefix,
            self.today(),
        );

        let mut month = month.clone();
        if in_future {
            if pair_failed_before {
                self.validate_in_place(&mut month);
            }
        } else {
            log::debug!(
                "Card expiry {}/{} is not in the future",
                month.value.as_text(),
                year.value.as_text()
            );
            month.is_valid = false;
            let message = format!("Invalid {}.", month.label);
            month.record_failure(ErrorKind::CrossField, message);
        }

        form.with_field(month_key, month)
    }
}

fn required_step(pass: &mut Pass<'_>) -> Flow {
    if pass.field.value.is_empty() {
        let message = format!("{} is required", pass.field.plain_label());
        pass.fail(RuleFailure::new(ErrorKind::Missing, message));
        Flow::Stop
    } else {
        Flow::Continue
    }
}

fn credit_numeric_step(pass: &mut Pass<'_>) -> Flow {
    let max_length = pass.field.max_length;
    if let FieldValue::Text(text) = &mut pass.field.value {
        let all_digits = !text.is_empty() && text.chars().all(|c| c.is_ascii_digit());
        let too_long = max_length.is_some_and(|max| text.chars().count() > max);
        if !all_digits || too_long {
            text.pop();
        }
    }
    Flow::Continue
}

fn max_length_step(pass: &mut Pass<'_>) -> Flow {
    match (pass.field.value.len(), pass.field.max_length) {
        (Some(len), Some(max)) if len > max => {
            pass.fail(RuleFailure::format(format!("Max length {} characters.", max)));
            Flow::Stop
        }
        _ => Flow::Continue,
    }
}

fn min_length_step(pass: &mut Pass<'_>) -> Flow {
    match (pass.field.value.len(), pass.field.min_length) {
        (Some(len), Some(min)) if len < min => {
            pass.fail(RuleFailure::format(format!("Min length {} characters.", min)));
            Flow::Stop
        }
        _ => Flow::Continue,
    }
}

/// Complete card number check run when the input loses focus.
fn blur_card(field: &mut FieldDescriptor) {
    let digits = strip_non_digits(&field.value.as_text());

    let failure = if !luhn_valid(&digits) {
        Some(ErrorKind::Format)
    } else if match_full_brand(&digits).is_none() {
        Some(ErrorKind::Unsupported)
    } else {
        None
    };

    if let Some(kind) = failure {
        field.is_valid = false;
        field.record_failure(kind, INVALID_CARD_MESSAGE);
    }
}
