use super::error::ValidationResult;
use super::field::{
    CompareFieldsValidation, EmailValidation, FieldValidator, FnValidator, MaxLengthValidation,
    MinLengthValidation, RequiredFieldValidation,
};
use crate::form::{FieldKey, FieldValues};

/// Collects rules for one field in the order they are declared.
///
/// ```
/// use loginform::form::FieldKey;
/// use loginform::validation::{ValidationBuilder, ValidationComposite};
///
/// let email = FieldKey::new("email");
/// let composite = ValidationComposite::build(
///     ValidationBuilder::field(email).required().email().build(),
/// );
/// assert_eq!(composite.len(), 2);
/// ```
pub struct ValidationBuilder {
    field: FieldKey,
    validators: Vec<Box<dyn FieldValidator>>,
}

impl ValidationBuilder {
    pub fn field(field: FieldKey) -> Self {
        Self {
            field,
            validators: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.validators
            .push(Box::new(RequiredFieldValidation::new(self.field)));
        self
    }

    pub fn email(mut self) -> Self {
        self.validators
            .push(Box::new(EmailValidation::new(self.field)));
        self
    }

    pub fn min(mut self, min: usize) -> Self {
        self.validators
            .push(Box::new(MinLengthValidation::new(self.field, min)));
        self
    }

    pub fn max(mut self, max: usize) -> Self {
        self.validators
            .push(Box::new(MaxLengthValidation::new(self.field, max)));
        self
    }

    pub fn same_as(mut self, other: FieldKey) -> Self {
        self.validators
            .push(Box::new(CompareFieldsValidation::new(self.field, other)));
        self
    }

    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&str, &FieldValues) -> ValidationResult + Send + Sync + 'static,
    {
        self.validators
            .push(Box::new(FnValidator::new(self.field, rule)));
        self
    }

    pub fn build(self) -> Vec<Box<dyn FieldValidator>> {
        self.validators
    }
}
