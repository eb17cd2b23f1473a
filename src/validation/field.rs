use std::sync::LazyLock;

use regex::Regex;

use super::error::{ValidationError, ValidationResult};
use crate::form::{FieldKey, FieldValues};

/// One rule bound to one field.
///
/// Rules see the whole value map so cross-field checks fit the same shape.
/// They must be pure: a composite stops at the first failure.
pub trait FieldValidator: Send + Sync {
    fn field(&self) -> FieldKey;
    fn validate(&self, fields: &FieldValues) -> ValidationResult;
}

/// A rule that only looks at its own field's value.
pub trait ValueValidator: Send + Sync {
    fn field(&self) -> FieldKey;
    fn validate_value(&self, value: &str) -> ValidationResult;
}

impl<T> FieldValidator for T
where
    T: ValueValidator,
{
    fn field(&self) -> FieldKey {
        ValueValidator::field(self)
    }

    fn validate(&self, fields: &FieldValues) -> ValidationResult {
        self.validate_value(fields.get(ValueValidator::field(self)))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RequiredFieldValidation {
    field: FieldKey,
}

impl RequiredFieldValidation {
    pub const fn new(field: FieldKey) -> Self {
        Self { field }
    }
}

impl ValueValidator for RequiredFieldValidation {
    fn field(&self) -> FieldKey {
        self.field
    }

    fn validate_value(&self, value: &str) -> ValidationResult {
        if value.trim().is_empty() {
            Err(ValidationError::Required)
        } else {
            Ok(())
        }
    }
}

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .ok()
});

/// Empty values pass; pair with `RequiredFieldValidation` when the field is mandatory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EmailValidation {
    field: FieldKey,
}

impl EmailValidation {
    pub const fn new(field: FieldKey) -> Self {
        Self { field }
    }
}

impl ValueValidator for EmailValidation {
    fn field(&self) -> FieldKey {
        self.field
    }

    fn validate_value(&self, value: &str) -> ValidationResult {
        if value.is_empty() {
            return Ok(());
        }
        match EMAIL_PATTERN.as_ref() {
            Some(pattern) if pattern.is_match(value) => Ok(()),
            _ => Err(ValidationError::InvalidFormat),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MinLengthValidation {
    field: FieldKey,
    min: usize,
}

impl MinLengthValidation {
    pub const fn new(field: FieldKey, min: usize) -> Self {
        Self { field, min }
    }
}

impl ValueValidator for MinLengthValidation {
    fn field(&self) -> FieldKey {
        self.field
    }

    fn validate_value(&self, value: &str) -> ValidationResult {
        if value.chars().count() < self.min {
            Err(ValidationError::MinLength { min: self.min })
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MaxLengthValidation {
    field: FieldKey,
    max: usize,
}

impl MaxLengthValidation {
    pub const fn new(field: FieldKey, max: usize) -> Self {
        Self { field, max }
    }
}

impl ValueValidator for MaxLengthValidation {
    fn field(&self) -> FieldKey {
        self.field
    }

    fn validate_value(&self, value: &str) -> ValidationResult {
        if value.chars().count() > self.max {
            Err(ValidationError::MaxLength { max: self.max })
        } else {
            Ok(())
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CompareFieldsValidation {
    field: FieldKey,
    other: FieldKey,
}

impl CompareFieldsValidation {
    pub const fn new(field: FieldKey, other: FieldKey) -> Self {
        Self { field, other }
    }
}

impl FieldValidator for CompareFieldsValidation {
    fn field(&self) -> FieldKey {
        self.field
    }

    fn validate(&self, fields: &FieldValues) -> ValidationResult {
        if fields.get(self.field) == fields.get(self.other) {
            Ok(())
        } else {
            Err(ValidationError::Mismatch { other: self.other })
        }
    }
}

pub struct FnValidator<F> {
    field: FieldKey,
    rule: F,
}

impl<F> FnValidator<F>
where
    F: Fn(&str, &FieldValues) -> ValidationResult + Send + Sync,
{
    pub fn new(field: FieldKey, rule: F) -> Self {
        Self { field, rule }
    }
}

impl<F> FieldValidator for FnValidator<F>
where
    F: Fn(&str, &FieldValues) -> ValidationResult + Send + Sync,
{
    fn field(&self) -> FieldKey {
        self.field
    }

    fn validate(&self, fields: &FieldValues) -> ValidationResult {
        (self.rule)(fields.get(self.field), fields)
    }
}
