//! Process-wide keep-alive
//!
//! Long-lived streams sitting idle get cut by proxies. The heartbeat sweeps
//! every connected subscriber on a fixed interval and queues a `Ping`.
//! Failed pings are only logged; removing a subscriber is left to its own
//! connection closing.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::broker::message::StreamEvent;
use crate::broker::registry::Registry;

#[derive(Debug)]
pub struct Heartbeat {
    registry: Arc<Registry>,
    interval: Duration,
}

impl Heartbeat {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new(registry: Arc<Registry>, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// Ping every subscriber once. Returns the number of pings accepted.
    pub fn tick(&self) -> usize {
        let subscribers = self.registry.all_subscribers();
        let mut pinged = 0;

        for subscriber in &subscribers {
            match subscriber.send(StreamEvent::Ping) {
                Ok(()) => pinged += 1,
                Err(e) => {
                    warn!(
                        channel = %subscriber.channel_id,
                        subscriber = %subscriber.id,
                        "keep-alive failed: {e}"
                    );
                }
            }
        }

        debug!(pinged, total = subscribers.len(), "heartbeat");
        pinged
    }

    /// Tick forever. The first sweep happens one interval after start.
    pub async fn run(self) {
        // tokio intervals must be non-zero
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick();
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
