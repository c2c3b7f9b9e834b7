//! The `client` module models one streaming subscriber.
//!
//! `Subscriber` is the cloneable membership record the registry keeps, and
//! `Connection` ties that record's registration to the lifetime of the
//! stream that owns it.

pub mod connection;
pub mod subscriber;

pub use connection::Connection;
pub use subscriber::{Subscriber, SubscriberId};
