/// Card payment form driven through change and blur events.
///
/// Covers brand recognition and digit grouping while typing, the complete
/// number check on blur, and the CVC and ZIP blur rules.

#[cfg(test)]
mod tests {
    use formguard::{CardBrand, ErrorKind, FieldDescriptor, FieldValue, FormEngine, FormState, Rule};

    fn payment_form(engine: &FormEngine) -> FormState {
        let form = FormState::builder()
            .field(
                "cardNumber",
                FieldDescriptor::text("Card number: *")
                    .rule(Rule::Required)
                    .rule(Rule::CreditCard),
            )
            .field(
                "cardCvc",
                FieldDescriptor::text("CVC: *")
                    .rule(Rule::Required)
                    .rule(Rule::CreditNumeric)
                    .rule(Rule::CreditCvc)
                    .max_length(3),
            )
            .field(
                "zipCode",
                FieldDescriptor::text("ZIP code")
                    .rule(Rule::ZipCode)
                    .max_length(5),
            )
            .build()
            .expect("payment form definition is valid");
        engine.initialize(&form)
    }

    fn card(form: &FormState) -> &FieldDescriptor {
        form.get("cardNumber").unwrap()
    }

    #[test]
    fn test_visa_is_grouped_in_fours() {
        let engine = FormEngine::new();
        let form = engine
            .apply_change(&payment_form(&engine), "cardNumber", "4111111111111111")
            .unwrap();

        let field = card(&form);
        assert!(field.is_valid);
        assert_eq!(field.value, FieldValue::from("4111 1111 1111 1111"));
        assert_eq!(field.card_brand, Some(CardBrand::Visa));
        assert!(field.custom_class.as_deref().unwrap().contains("visa"));
        assert_eq!(field.max_length, Some(19));
    }

    #[test]
    fn test_amex_is_grouped_four_six_five() {
        let engine = FormEngine::new();
        let form = engine
            .apply_change(&payment_form(&engine), "cardNumber", "378282246310005")
            .unwrap();

        let field = card(&form);
        assert_eq!(field.value, FieldValue::from("3782 822463 10005"));
        assert_eq!(field.card_brand, Some(CardBrand::Amex));
    }

    #[test]
    fn test_mastercard_and_discover_are_recognised() {
        let engine = FormEngine::new();
        let form = payment_form(&engine);

        let mastercard = engine.apply_change(&form, "cardNumber", "5555555555554444").unwrap();
        assert_eq!(card(&mastercard).card_brand, Some(CardBrand::Mastercard));
        assert!(card(&mastercard).is_valid);

        let discover = engine.apply_change(&form, "cardNumber", "6011111111111117").unwrap();
        assert_eq!(card(&discover).card_brand, Some(CardBrand::Discover));
        assert_eq!(card(&discover).value, FieldValue::from("6011 1111 1111 1117"));
    }

    #[test]
    fn test_retyping_grouped_value_is_stable() {
        let engine = FormEngine::new();
        let form = engine
            .apply_change(&payment_form(&engine), "cardNumber", "41111111")
            .unwrap();
        let shown = card(&form).value.clone();
        assert_eq!(shown, FieldValue::from("4111 1111"));

        let again = engine.apply_change(&form, "cardNumber", shown.clone()).unwrap();
        assert_eq!(card(&again).value, shown);
    }

    #[test]
    fn test_unsupported_brands_are_not_allowed() {
        let engine = FormEngine::new();
        let form = payment_form(&engine);

        for number in ["30569309025904", "3530111333300000"] {
            let updated = engine.apply_change(&form, "cardNumber", number).unwrap();
            let field = card(&updated);
            assert!(!field.is_valid, "{} should be rejected", number);
            assert_eq!(field.validation_message, "Card is not allowed.");
            assert_eq!(field.error_kind, Some(ErrorKind::Unsupported));
            assert_eq!(field.card_brand, None);
        }
    }

    #[test]
    fn test_checksum_failure_while_typing() {
        let engine = FormEngine::new();
        let form = engine
            .apply_change(&payment_form(&engine), "cardNumber", "4111111111111112")
            .unwrap();
        assert_eq!(card(&form).validation_message, "Invalid card.");
        assert_eq!(card(&form).error_kind, Some(ErrorKind::Format));
    }

    #[test]
    fn test_blur_accepts_short_visa() {
        let engine = FormEngine::new();
        let form = engine
            .apply_blur(&payment_form(&engine), "cardNumber", "4222222222222")
            .unwrap();
        assert!(card(&form).is_valid);
        assert!(card(&form).is_touched);
    }

    #[test]
    fn test_blur_rejects_incomplete_number() {
        let engine = FormEngine::new();
        let form = engine
            .apply_blur(&payment_form(&engine), "cardNumber", "411111")
            .unwrap();
        let field = card(&form);
        assert!(!field.is_valid);
        assert_eq!(field.validation_message, "Invalid card.");
    }

    #[test]
    fn test_cvc_length_must_be_exact_on_blur() {
        let engine = FormEngine::new();
        let form = payment_form(&engine);

        let short = engine.apply_blur(&form, "cardCvc", "12").unwrap();
        let cvc = short.get("cardCvc").unwrap();
        assert!(!cvc.is_valid);
        assert_eq!(cvc.validation_message, "Invalid CVC");

        let exact = engine.apply_blur(&form, "cardCvc", "123").unwrap();
        let cvc = exact.get("cardCvc").unwrap();
        assert!(cvc.is_valid);
        assert!(cvc.validation_message.is_empty());
    }

    #[test]
    fn test_cvc_drops_non_digit_input() {
        let engine = FormEngine::new();
        let form = engine
            .apply_change(&payment_form(&engine), "cardCvc", "12x")
            .unwrap();
        assert_eq!(form.get("cardCvc").unwrap().value, FieldValue::from("12"));
    }

    #[test]
    fn test_zip_longer_than_bound_fails_on_blur() {
        let engine = FormEngine::new();
        let form = payment_form(&engine);

        let long = engine.apply_blur(&form, "zipCode", "123456").unwrap();
        assert_eq!(long.get("zipCode").unwrap().validation_message, "Invalid ZIP code");

        let ok = engine.apply_blur(&form, "zipCode", "12345").unwrap();
        assert!(ok.get("zipCode").unwrap().is_valid);

        // Blur rules do not run on an empty value.
        let empty = engine.apply_blur(&form, "zipCode", "").unwrap();
        assert!(empty.get("zipCode").unwrap().is_valid);
    }
}
