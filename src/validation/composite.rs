use std::collections::BTreeSet;

use tracing::trace;

use super::error::ValidationResult;
use super::field::FieldValidator;
use crate::form::{FieldKey, FieldValues};

/// What a form asks when it needs the error of one field.
pub trait Validation: Send + Sync {
    fn validate(&self, field: FieldKey, fields: &FieldValues) -> ValidationResult;
}

impl<F> Validation for F
where
    F: Fn(FieldKey, &FieldValues) -> ValidationResult + Send + Sync,
{
    fn validate(&self, field: FieldKey, fields: &FieldValues) -> ValidationResult {
        (self)(field, fields)
    }
}

pub struct ValidationComposite {
    validators: Vec<Box<dyn FieldValidator>>,
}

impl ValidationComposite {
    pub fn build(validators: Vec<Box<dyn FieldValidator>>) -> Self {
        Self { validators }
    }

    pub fn fields(&self) -> BTreeSet<FieldKey> {
        self.validators
            .iter()
            .map(|validator| validator.field())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Validation for ValidationComposite {
    fn validate(&self, field: FieldKey, fields: &FieldValues) -> ValidationResult {
        let result = self
            .validators
            .iter()
            .filter(|validator| validator.field() == field)
            .try_for_each(|validator| validator.validate(fields));
        if let Err(error) = &result {
            trace!(%field, %error, "field rule failed");
        }
        result
    }
}
