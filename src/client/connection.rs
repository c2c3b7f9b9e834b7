//! Subscriber connection lifecycle
//!
//! A `Connection` owns one subscriber's place in the registry for as long as
//! the stream is alive. Opening it queues the acknowledgement and subscribes;
//! closing it (explicitly, or by dropping it when the transport tears the
//! stream down) unsubscribes exactly once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use crate::broker::message::StreamEvent;
use crate::broker::registry::Registry;
use crate::client::subscriber::{Subscriber, SubscriberId};

#[derive(Debug)]
pub struct Connection {
    subscriber: Subscriber,
    registry: Arc<Registry>,
    closed: AtomicBool,
}

impl Connection {
    /// Register a new stream for `principal` on `channel_id`.
    ///
    /// Returns the connection and the receiving end of its push channel. The
    /// first event on the receiver is always `StreamEvent::Connected`.
    pub fn open(
        registry: Arc<Registry>,
        channel_id: &str,
        principal: &str,
    ) -> (Self, UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscriber = Subscriber::new(channel_id, principal, tx);

        // The receiver is still in hand, so queueing cannot fail here.
        let _ = subscriber.send(StreamEvent::Connected {
            channel_id: channel_id.to_string(),
            principal: principal.to_string(),
        });

        registry.subscribe(channel_id, subscriber.clone());

        info!(
            channel = %channel_id,
            principal = %principal,
            subscriber = %subscriber.id,
            "client connected"
        );

        let connection = Self {
            subscriber,
            registry,
            closed: AtomicBool::new(false),
        };

        (connection, rx)
    }

    pub fn id(&self) -> &SubscriberId {
        &self.subscriber.id
    }

    pub fn channel_id(&self) -> &str {
        &self.subscriber.channel_id
    }

    pub fn principal(&self) -> &str {
        &self.subscriber.principal
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Leave the channel. Only the first call has an effect; it returns
    /// `true`, later calls return `false`.
    pub fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        self.registry
            .unsubscribe(&self.subscriber.channel_id, &self.subscriber.id);

        info!(
            channel = %self.subscriber.channel_id,
            principal = %self.subscriber.principal,
            subscriber = %self.subscriber.id,
            "client disconnected"
        );

        true
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}
