use super::*;
use crate::form::{FieldKey, FieldValues};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const EMAIL: FieldKey = FieldKey::new("email");
const PASSWORD: FieldKey = FieldKey::new("password");
const CONFIRMATION: FieldKey = FieldKey::new("password_confirmation");

struct FieldValidationSpy {
    field: FieldKey,
    error: Option<ValidationError>,
    calls: Arc<AtomicUsize>,
}

impl FieldValidationSpy {
    fn new(field: FieldKey, error: Option<ValidationError>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                field,
                error,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl FieldValidator for FieldValidationSpy {
    fn field(&self) -> FieldKey {
        self.field
    }

    fn validate(&self, _fields: &FieldValues) -> ValidationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn values(pairs: &[(FieldKey, &str)]) -> FieldValues {
    FieldValues::from_pairs(pairs.iter().map(|(key, value)| (*key, value.to_string())))
}

#[test]
fn composite_returns_first_failing_rule_and_skips_the_rest() {
    let (first, first_calls) =
        FieldValidationSpy::new(EMAIL, Some(ValidationError::custom("first error")));
    let (second, second_calls) =
        FieldValidationSpy::new(EMAIL, Some(ValidationError::custom("second error")));
    let composite = ValidationComposite::build(vec![Box::new(first), Box::new(second)]);

    let error = composite
        .validate(EMAIL, &values(&[(EMAIL, "any_value")]))
        .expect_err("composite must fail");
    assert_eq!(error.message(), "first error");
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn composite_passes_when_every_rule_passes() {
    let (first, first_calls) = FieldValidationSpy::new(EMAIL, None);
    let (second, second_calls) = FieldValidationSpy::new(EMAIL, None);
    let composite = ValidationComposite::build(vec![Box::new(first), Box::new(second)]);

    assert_eq!(
        composite.validate(EMAIL, &values(&[(EMAIL, "any_value")])),
        Ok(())
    );
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn composite_is_open_for_fields_without_rules() {
    let (spy, calls) = FieldValidationSpy::new(EMAIL, Some(ValidationError::Required));
    let composite = ValidationComposite::build(vec![Box::new(spy)]);

    assert_eq!(
        composite.validate(FieldKey::new("any_field"), &values(&[])),
        Ok(())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn composite_only_consults_rules_of_the_requested_field() {
    let (password_spy, password_calls) =
        FieldValidationSpy::new(PASSWORD, Some(ValidationError::Required));
    let (email_spy, _) = FieldValidationSpy::new(EMAIL, None);
    let composite = ValidationComposite::build(vec![Box::new(password_spy), Box::new(email_spy)]);

    assert_eq!(composite.validate(EMAIL, &values(&[])), Ok(()));
    assert_eq!(password_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        composite.fields().into_iter().collect::<Vec<_>>(),
        vec![EMAIL, PASSWORD]
    );
}

#[test]
fn required_rule_rejects_blank_values() {
    let rule = RequiredFieldValidation::new(EMAIL);
    assert_eq!(rule.validate_value(""), Err(ValidationError::Required));
    assert_eq!(rule.validate_value("   "), Err(ValidationError::Required));
    assert_eq!(rule.validate_value("x"), Ok(()));
}

#[test]
fn required_rule_reads_its_own_field_from_the_map() {
    let rule = RequiredFieldValidation::new(EMAIL);
    let fields = values(&[(EMAIL, ""), (PASSWORD, "secret")]);
    assert_eq!(
        FieldValidator::validate(&rule, &fields),
        Err(ValidationError::Required)
    );
    assert_eq!(
        FieldValidator::validate(&rule, &fields.with(EMAIL, "a@b.com")),
        Ok(())
    );
}

#[test]
fn email_rule_accepts_empty_and_well_formed_addresses() {
    let rule = EmailValidation::new(EMAIL);
    assert_eq!(rule.validate_value(""), Ok(()));
    assert_eq!(rule.validate_value("a@b.com"), Ok(()));
    assert_eq!(rule.validate_value("first.last@mail.example.org"), Ok(()));
    assert_eq!(
        rule.validate_value("not-an-email"),
        Err(ValidationError::InvalidFormat)
    );
    assert_eq!(
        rule.validate_value("a@b"),
        Err(ValidationError::InvalidFormat)
    );
}

#[test]
fn length_rules_count_characters() {
    let min = MinLengthValidation::new(PASSWORD, 6);
    assert_eq!(
        min.validate_value("abc"),
        Err(ValidationError::MinLength { min: 6 })
    );
    assert_eq!(min.validate_value("abcdef"), Ok(()));
    assert_eq!(min.validate_value("ççççää"), Ok(()));

    let max = MaxLengthValidation::new(PASSWORD, 3);
    assert_eq!(max.validate_value("abc"), Ok(()));
    assert_eq!(
        max.validate_value("abcd"),
        Err(ValidationError::MaxLength { max: 3 })
    );
}

#[test]
fn compare_rule_depends_on_the_other_field() {
    let rule = CompareFieldsValidation::new(CONFIRMATION, PASSWORD);
    assert_eq!(
        rule.validate(&values(&[(PASSWORD, "secret"), (CONFIRMATION, "secre")])),
        Err(ValidationError::Mismatch { other: PASSWORD })
    );
    assert_eq!(
        rule.validate(&values(&[(PASSWORD, "secret"), (CONFIRMATION, "secret")])),
        Ok(())
    );
}

#[test]
fn required_then_min_length_reports_errors_in_order() {
    let composite =
        ValidationComposite::build(ValidationBuilder::field(PASSWORD).required().min(6).build());

    assert_eq!(
        composite.validate(PASSWORD, &values(&[(PASSWORD, "")])),
        Err(ValidationError::Required)
    );
    assert_eq!(
        composite.validate(PASSWORD, &values(&[(PASSWORD, "abc")])),
        Err(ValidationError::MinLength { min: 6 })
    );
    assert_eq!(
        composite.validate(PASSWORD, &values(&[(PASSWORD, "abcdef")])),
        Ok(())
    );
}

#[test]
fn single_required_rule_scenario() {
    let composite = ValidationComposite::build(ValidationBuilder::field(EMAIL).required().build());
    assert_eq!(
        composite
            .validate(EMAIL, &values(&[(EMAIL, "")]))
            .map_err(|error| error.message()),
        Err("Required field".into())
    );
    assert_eq!(
        composite.validate(EMAIL, &values(&[(EMAIL, "a@b.com")])),
        Ok(())
    );
}

#[test]
fn builder_keeps_declaration_order_across_rule_kinds() {
    let mut validators = ValidationBuilder::field(CONFIRMATION)
        .required()
        .rule(|value: &str, _fields: &FieldValues| {
            if value.contains(' ') {
                Err(ValidationError::custom("no spaces"))
            } else {
                Ok(())
            }
        })
        .same_as(PASSWORD)
        .max(8)
        .build();
    assert_eq!(validators.len(), 4);
    validators.extend(ValidationBuilder::field(PASSWORD).required().build());
    let composite = ValidationComposite::build(validators);

    let check = |password: &str, confirmation: &str| {
        composite.validate(
            CONFIRMATION,
            &values(&[(PASSWORD, password), (CONFIRMATION, confirmation)]),
        )
    };
    assert_eq!(check("x", ""), Err(ValidationError::Required));
    assert_eq!(
        check("a b", "a b"),
        Err(ValidationError::custom("no spaces"))
    );
    assert_eq!(
        check("abc", "abd"),
        Err(ValidationError::Mismatch { other: PASSWORD })
    );
    assert_eq!(
        check("abcdefghi", "abcdefghi"),
        Err(ValidationError::MaxLength { max: 8 })
    );
    assert_eq!(check("abc", "abc"), Ok(()));
}

#[test]
fn closures_act_as_a_validation_facade() {
    let stub = |_field: FieldKey, _fields: &FieldValues| -> ValidationResult {
        Err(ValidationError::custom("stub error"))
    };
    let error = Validation::validate(&stub, EMAIL, &FieldValues::new())
        .expect_err("stub always fails");
    assert_eq!(error.to_string(), "stub error");
}

#[test]
fn error_messages_are_user_facing() {
    assert_eq!(ValidationError::Required.to_string(), "Required field");
    assert_eq!(ValidationError::InvalidFormat.to_string(), "Invalid value");
    assert_eq!(
        ValidationError::MinLength { min: 5 }.to_string(),
        "Must be at least 5 characters"
    );
    assert_eq!(
        ValidationError::Mismatch { other: PASSWORD }.to_string(),
        "Must match password"
    );
}
