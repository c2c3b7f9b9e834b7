use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use tracing::debug;

use crate::auth::jwt::verify;
use crate::config::AuthSettings;
use crate::utils::error::Error;

pub const TOKEN_COOKIE: &str = "token";

/// The authenticated identity of a request, taken from the `token` cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    AuthSettings: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthSettings::from_ref(state);

        let token = token_from_cookies(&parts.headers).ok_or(Error::MissingToken)?;
        let claims = verify(&token, &auth.jwt_secret).inspect_err(|_| {
            debug!("rejected token on {}", parts.uri.path());
        })?;

        Ok(Principal(claims.username))
    }
}

/// Find the `token` cookie among all `Cookie` headers.
pub fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn login_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{TOKEN_COOKIE}={token}; HttpOnly; Path=/; Max-Age={max_age_secs}; Secure")
}

/// `Set-Cookie` value that clears the token.
pub fn logout_cookie() -> String {
    format!("{TOKEN_COOKIE}=; HttpOnly; Path=/; Max-Age=0; Secure")
}
