//! # Beacon
//!
//! `beacon` is a minimalist, in-memory fan-out broadcast server built with
//! Rust. Clients hold a Server-Sent Events stream open on a named channel;
//! publishers post short text messages to a channel and every subscriber
//! connected at that moment receives them. Delivery is best-effort and
//! nothing is persisted.
//!
//! ## Core Modules
//!
//! - `broker`: the channel registry, broadcast dispatcher, keep-alive
//!   heartbeat and the reaper that drops channels left empty.
//! - `client`: a subscriber's membership record and the connection that
//!   registers and deregisters it.
//! - `auth`: cookie-based JWT login producing the principal of a stream.
//! - `config`: loading server configuration from files and environment.
//! - `transport`: the HTTP router, SSE stream and JSON bodies.
//! - `utils`: the crate error type and logging setup.

pub mod auth;
pub mod broker;
pub mod client;
pub mod config;
pub mod transport;
pub mod utils;
