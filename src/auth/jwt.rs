//! HS256 tokens issued at login and checked on subscribe.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::utils::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// Issue a token for `username` valid for `ttl_secs` seconds.
pub fn sign(username: &str, secret: &str, ttl_secs: u64) -> Result<String> {
    let now = Utc::now();
    let ttl = Duration::seconds(ttl_secs.min(i32::MAX as u64) as i64);
    let claims = Claims {
        username: username.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Check signature and expiry. A token without a username is rejected.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| Error::InvalidToken)?;

    if data.claims.username.is_empty() {
        return Err(Error::InvalidToken);
    }

    Ok(data.claims)
}
