/// Card expiry month/year fields.
///
/// The individual month and year checks run on every change; the pair is
/// checked as a whole when either field loses focus, and its verdict is
/// recorded on the month field.

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Local, NaiveDate};
    use formguard::{
        EngineConfig, ErrorKind, ExpiryPart, FieldDescriptor, FixedClock, FormEngine, FormState,
        Rule,
    };

    fn expiry_form<C: formguard::Clock>(engine: &FormEngine<C>) -> FormState {
        let part = |label: &str, part: ExpiryPart| {
            FieldDescriptor::text(label)
                .rule(Rule::Required)
                .rule(Rule::CreditNumeric)
                .rule(Rule::CreditMonthYear(part))
                .max_length(2)
        };
        let form = FormState::builder()
            .field("cardMonth", part("Month", ExpiryPart::Month))
            .field("cardYear", part("Year", ExpiryPart::Year))
            .build()
            .unwrap();
        engine.initialize(&form)
    }

    fn fixed_engine() -> FormEngine<FixedClock> {
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        FormEngine::with_clock(EngineConfig::default(), FixedClock(today))
    }

    #[test]
    fn test_month_out_of_range() {
        let engine = FormEngine::new();
        let form = expiry_form(&engine);
        let form = engine.apply_change(&form, "cardYear", "99").unwrap();

        let form = engine.apply_blur(&form, "cardMonth", "13").unwrap();
        let month = form.get("cardMonth").unwrap();
        assert!(!month.is_valid);
        assert_eq!(month.validation_message, "Invalid Month.");
    }

    #[test]
    fn test_last_year_is_rejected() {
        let engine = FormEngine::new();
        let last_year = format!("{:02}", (Local::now().year() - 1).rem_euclid(100));

        let form = expiry_form(&engine);
        let form = engine.apply_blur(&form, "cardMonth", "07").unwrap();
        let form = engine.apply_blur(&form, "cardYear", last_year).unwrap();

        let year = form.get("cardYear").unwrap();
        assert!(!year.is_valid);
        assert_eq!(year.validation_message, "Invalid Year.");
    }

    #[test]
    fn test_current_month_is_not_in_the_future() {
        let engine = fixed_engine();
        let form = expiry_form(&engine);
        let form = engine.apply_blur(&form, "cardMonth", "06").unwrap();
        assert!(form.get("cardMonth").unwrap().is_valid);

        let form = engine.apply_blur(&form, "cardYear", "26").unwrap();
        let month = form.get("cardMonth").unwrap();
        let year = form.get("cardYear").unwrap();
        assert!(!month.is_valid);
        assert_eq!(month.validation_message, "Invalid Month.");
        assert_eq!(month.error_kind, Some(ErrorKind::CrossField));
        assert!(year.is_valid);
    }

    #[test]
    fn test_pair_error_clears_when_year_moves_forward() {
        let engine = fixed_engine();
        let form = expiry_form(&engine);
        let form = engine.apply_blur(&form, "cardMonth", "05").unwrap();
        let form = engine.apply_blur(&form, "cardYear", "26").unwrap();
        assert!(!form.get("cardMonth").unwrap().is_valid);

        let form = engine.apply_blur(&form, "cardYear", "27").unwrap();
        let month = form.get("cardMonth").unwrap();
        assert!(month.is_valid);
        assert!(month.validation_message.is_empty());
        assert_eq!(month.error_kind, None);
    }

    #[test]
    fn test_pair_error_clears_when_month_moves_forward() {
        let engine = fixed_engine();
        let form = expiry_form(&engine);
        let form = engine.apply_blur(&form, "cardYear", "26").unwrap();
        let form = engine.apply_blur(&form, "cardMonth", "01").unwrap();
        assert!(!form.get("cardMonth").unwrap().is_valid);

        let form = engine.apply_blur(&form, "cardMonth", "07").unwrap();
        assert!(form.get("cardMonth").unwrap().is_valid);
    }

    #[test]
    fn test_pair_is_not_checked_while_year_is_invalid() {
        let engine = fixed_engine();
        let form = expiry_form(&engine);
        let form = engine.apply_blur(&form, "cardMonth", "07").unwrap();
        let form = engine.apply_blur(&form, "cardYear", "25").unwrap();

        // The year reports its own problem; the month keeps its verdict.
        assert_eq!(form.get("cardYear").unwrap().validation_message, "Invalid Year.");
        assert!(form.get("cardMonth").unwrap().is_valid);
    }

    #[test]
    fn test_year_prefix_comes_from_config() {
        let config = EngineConfig {
            expiry_year_prefix: "21".to_string(),
            ..EngineConfig::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        let engine = FormEngine::with_clock(config, FixedClock(today));

        let form = expiry_form(&engine);
        let form = engine.apply_blur(&form, "cardYear", "00").unwrap();
        assert!(form.get("cardYear").unwrap().is_valid);
    }
}
