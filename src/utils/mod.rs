//! The `utils` module holds the pieces shared across `beacon`: the crate
//! error type and logging setup.

pub mod error;
pub mod logging;
