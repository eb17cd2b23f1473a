use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use crate::form::FieldKey;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationError {
    Required,
    InvalidFormat,
    MinLength { min: usize },
    MaxLength { max: usize },
    Mismatch { other: FieldKey },
    Custom(Cow<'static, str>),
}

impl ValidationError {
    pub fn custom(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(message.into())
    }

    pub fn message(&self) -> Cow<'static, str> {
        match self {
            ValidationError::Required => Cow::Borrowed("Required field"),
            ValidationError::InvalidFormat => Cow::Borrowed("Invalid value"),
            ValidationError::MinLength { min } => {
                Cow::Owned(format!("Must be at least {min} characters"))
            }
            ValidationError::MaxLength { max } => {
                Cow::Owned(format!("Must be at most {max} characters"))
            }
            ValidationError::Mismatch { other } => Cow::Owned(format!("Must match {other}")),
            ValidationError::Custom(message) => message.clone(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

/// `Ok(())` means the field has no error.
pub type ValidationResult = Result<(), ValidationError>;
