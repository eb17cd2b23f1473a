mod builder;
mod composite;
mod error;
mod field;

#[cfg(test)]
mod tests;

pub use builder::ValidationBuilder;
pub use composite::{Validation, ValidationComposite};
pub use error::{ValidationError, ValidationResult};
pub use field::{
    CompareFieldsValidation, EmailValidation, FieldValidator, FnValidator, MaxLengthValidation,
    MinLengthValidation, RequiredFieldValidation, ValueValidator,
};
