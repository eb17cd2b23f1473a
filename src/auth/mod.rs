mod remote;


use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::future::{Either, select};
use futures_timer::Delay;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::form::FormModel;

pub use remote::{HttpError, HttpPostClient, HttpResponse, HttpStatusCode, RemoteAuthentication};

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, FormModel)]
pub struct AuthenticationParams {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountModel {
    pub access_token: String,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AuthError {
    InvalidCredentials,
    Unexpected,
    TimedOut,
    Rejected(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => f.write_str("Invalid credentials"),
            AuthError::Unexpected => {
                f.write_str("Something went wrong. Please try again soon.")
            }
            AuthError::TimedOut => f.write_str("Authentication timed out"),
            AuthError::Rejected(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult = Result<AccountModel, AuthError>;

pub type BoxedAuthFuture<'a> = Pin<Box<dyn Future<Output = AuthResult> + Send + 'a>>;

/// Exchanges credentials of type `P` for an account token.
pub trait Authentication<P>: Send + Sync {
    type Fut<'a>: Future<Output = AuthResult> + Send + 'a
    where
        Self: 'a,
        P: 'a;

    fn auth<'a>(&'a self, params: &'a P) -> Self::Fut<'a>;
}

impl<P, F> Authentication<P> for F
where
    F: for<'a> Fn(&'a P) -> BoxedAuthFuture<'a> + Send + Sync,
{
    type Fut<'a>
        = BoxedAuthFuture<'a>
    where
        Self: 'a,
        P: 'a;

    fn auth<'a>(&'a self, params: &'a P) -> Self::Fut<'a> {
        (self)(params)
    }
}

/// Fails an attempt with `AuthError::TimedOut` once `timeout` elapses.
pub struct TimeoutAuthentication<A> {
    inner: A,
    timeout: Duration,
}

impl<A> TimeoutAuthentication<A> {
    pub fn new(inner: A, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<P, A> Authentication<P> for TimeoutAuthentication<A>
where
    A: Authentication<P>,
{
    type Fut<'a>
        = BoxedAuthFuture<'a>
    where
        Self: 'a,
        P: 'a;

    fn auth<'a>(&'a self, params: &'a P) -> Self::Fut<'a> {
        let timeout = self.timeout;
        let attempt = Box::pin(self.inner.auth(params));
        Box::pin(async move {
            match select(attempt, Box::pin(Delay::new(timeout))).await {
                Either::Left((result, _)) => result,
                Either::Right(((), _)) => {
                    warn!(?timeout, "authentication timed out");
                    Err(AuthError::TimedOut)
                }
            }
        })
    }
}
