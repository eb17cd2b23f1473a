pub mod auth;
pub mod form;
pub mod login;
pub mod navigation;
pub mod prelude;
pub mod storage;
pub mod validation;

pub use login::{LoginForm, make_login_form, make_login_validation};
