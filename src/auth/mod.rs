//! Cookie-based authentication in front of the subscribe endpoint.
//!
//! The broker itself never sees tokens. Handlers take a `Principal`, which
//! only exists once the `token` cookie has been verified against
//! `AuthSettings::jwt_secret`.

pub mod jwt;
pub mod principal;

pub use jwt::{Claims, sign, verify};
pub use principal::{Principal, login_cookie, logout_cookie, token_from_cookies};
