//! Broadcast delivery
//!
//! The dispatcher validates publish payloads and fans a message out to a
//! snapshot of a channel's subscribers. Each send is independent: a closed
//! subscriber is logged and skipped, the rest still receive the message, and
//! the returned count only includes successful sends.
//!
//! Publishing to a channel nobody listens on returns `0`; it is not an error.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::broker::message::StreamEvent;
use crate::broker::registry::Registry;
use crate::utils::error::{Error, Result};

/// Extract the `message` field of a publish body, which must be a string.
pub fn text_message(body: &Value) -> Result<&str> {
    body.get("message")
        .and_then(Value::as_str)
        .ok_or(Error::InvalidMessage)
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Validate `body` and broadcast its `message` to `channel_id`.
    ///
    /// An invalid body is rejected before the registry is consulted.
    pub fn publish(&self, channel_id: &str, body: &Value) -> Result<usize> {
        let message = text_message(body)?;
        Ok(self.broadcast(channel_id, message))
    }

    /// Send `message` to every current subscriber of `channel_id` and return
    /// how many sends succeeded.
    pub fn broadcast(&self, channel_id: &str, message: &str) -> usize {
        let subscribers = self.registry.snapshot_subscribers(channel_id);

        if subscribers.is_empty() {
            debug!(channel = %channel_id, "no active listeners");
            return 0;
        }

        let event = StreamEvent::Message(message.to_string());
        let mut delivered = 0;

        for subscriber in &subscribers {
            match subscriber.send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        channel = %channel_id,
                        subscriber = %subscriber.id,
                        "failed to deliver message: {e}"
                    );
                }
            }
        }

        info!(
            channel = %channel_id,
            delivered,
            attempted = subscribers.len(),
            "broadcast"
        );

        delivered
    }
}
