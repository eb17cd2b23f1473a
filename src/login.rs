use crate::auth::{Authentication, AuthenticationParams};
use crate::form::{FieldLens, FormController, FormModel, FormOptions};
use crate::navigation::Navigator;
use crate::storage::SetStorage;
use crate::validation::{ValidationBuilder, ValidationComposite};

pub const PASSWORD_MIN_LENGTH: usize = 5;

pub type LoginForm<V, A> = FormController<AuthenticationParams, V, A>;

/// E-mail is required and well formed, password is required and at least
/// `PASSWORD_MIN_LENGTH` characters.
pub fn make_login_validation() -> ValidationComposite {
    let fields = AuthenticationParams::fields();
    let mut validators = ValidationBuilder::field(fields.email().key())
        .required()
        .email()
        .build();
    validators.extend(
        ValidationBuilder::field(fields.password().key())
            .required()
            .min(PASSWORD_MIN_LENGTH)
            .build(),
    );
    ValidationComposite::build(validators)
}

pub fn make_login_form<A>(
    authentication: A,
    storage: impl SetStorage,
    navigator: impl Navigator,
) -> LoginForm<ValidationComposite, A>
where
    A: Authentication<AuthenticationParams>,
{
    FormController::new(
        FormOptions::default(),
        make_login_validation(),
        authentication,
        storage,
        navigator,
    )
}
