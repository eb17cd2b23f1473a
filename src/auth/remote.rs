use std::fmt::{Display, Formatter};

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    AccountModel, AuthError, AuthResult, Authentication, AuthenticationParams, BoxedAuthFuture,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HttpStatusCode(pub u16);

impl HttpStatusCode {
    pub const OK: Self = Self(200);
    pub const BAD_REQUEST: Self = Self(400);
    pub const UNAUTHORIZED: Self = Self(401);
    pub const SERVER_ERROR: Self = Self(500);
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: HttpStatusCode,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HttpError(pub String);

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "http request failed: {}", self.0)
    }
}

impl std::error::Error for HttpError {}

pub trait HttpPostClient: Send + Sync {
    fn post<'a>(&'a self, url: &'a str, body: Value)
    -> BoxFuture<'a, Result<HttpResponse, HttpError>>;
}

/// Authenticates by posting the credentials as JSON to `url`.
pub struct RemoteAuthentication<C> {
    url: String,
    client: C,
}

impl<C> RemoteAuthentication<C>
where
    C: HttpPostClient,
{
    pub fn new(url: impl Into<String>, client: C) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl<C> Authentication<AuthenticationParams> for RemoteAuthentication<C>
where
    C: HttpPostClient,
{
    type Fut<'a>
        = BoxedAuthFuture<'a>
    where
        Self: 'a;

    fn auth<'a>(&'a self, params: &'a AuthenticationParams) -> Self::Fut<'a> {
        Box::pin(self.authenticate(params))
    }
}

impl<C> RemoteAuthentication<C>
where
    C: HttpPostClient,
{
    async fn authenticate(&self, params: &AuthenticationParams) -> AuthResult {
        let body = serde_json::to_value(params).map_err(|error| {
            warn!(%error, "failed to encode authentication params");
            AuthError::Unexpected
        })?;
        let response = self.client.post(&self.url, body).await.map_err(|error| {
            warn!(url = %self.url, %error, "authentication request failed");
            AuthError::Unexpected
        })?;
        debug!(url = %self.url, status = response.status.0, "authentication responded");

        match response.status {
            HttpStatusCode::OK => response
                .body
                .and_then(|body| serde_json::from_value::<AccountModel>(body).ok())
                .ok_or(AuthError::Unexpected),
            HttpStatusCode::UNAUTHORIZED => Err(AuthError::InvalidCredentials),
            _ => Err(AuthError::Unexpected),
        }
    }
}
