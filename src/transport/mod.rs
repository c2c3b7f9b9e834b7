//! The `transport` module is responsible for handling network communication
//! with clients over HTTP.
//!
//! It defines the JSON bodies exchanged with clients, the SSE subscribe
//! stream, and the router that forwards publish requests to the broker.

pub mod http;
pub mod message;
pub mod sse;

pub use http::{AppState, bind, router, serve};

#[cfg(test)]
mod tests;
