pub use crate::auth::{
    AccountModel, AuthError, Authentication, AuthenticationParams, BoxedAuthFuture,
    RemoteAuthentication, TimeoutAuthentication,
};
pub use crate::form::{
    FieldKey, FieldLens, FieldValues, FormController, FormModel, FormOptions, FormPhase,
    FormSnapshot, RevalidateMode, SubmitGuard, SubmitOutcome,
};
pub use crate::login::{LoginForm, make_login_form, make_login_validation};
pub use crate::navigation::{HistoryNavigator, Navigator, Route};
pub use crate::storage::{InMemoryStorage, SetStorage};
pub use crate::validation::{
    FieldValidator, Validation, ValidationBuilder, ValidationComposite, ValidationError,
    ValidationResult, ValueValidator,
};
