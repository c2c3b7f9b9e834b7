//! Channel registry
//!
//! The registry is the only shared mutable state of the broker. It maps each
//! channel id to its `Channel` and is responsible for:
//! - creating channels on first subscribe
//! - cancelling pending removal when a draining channel gains a subscriber
//! - arming a `Reaper` when a channel loses its last subscriber
//! - handing out point-in-time subscriber snapshots for delivery
//!
//! Concurrency and usage notes:
//! - Channels live in a `DashMap`. Every mutation of one channel id runs
//!   under that entry's shard lock, so add/remove/create/reap for one id are
//!   serialized while unrelated ids do not share a lock.
//! - Snapshots are copied out under a read lock and iterated without it;
//!   callers never hold registry locks across I/O.
//! - Scheduling a reaper spawns a tokio task, so the registry must be used
//!   from within a tokio runtime.
//!
//! Per-channel lifecycle:
//!
//! ```text
//!   ABSENT --subscribe--> ACTIVE --last unsubscribe--> DRAINING
//!                           ^                             |   |
//!                           +--------subscribe------------+   |
//!   ABSENT <--------------------reaper fires------------------+
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::broker::channel::Channel;
use crate::broker::reaper::{Channels, Reaper};
use crate::client::{Subscriber, SubscriberId};

#[derive(Debug)]
pub struct Registry {
    channels: Channels,
    grace: Duration,
    sequence: AtomicU64,
}

impl Registry {
    /// How long an empty channel is kept before its entry is removed.
    pub const DEFAULT_GRACE: Duration = Duration::from_secs(10);

    pub fn new() -> Self {
        Self::with_grace(Self::DEFAULT_GRACE)
    }

    pub fn with_grace(grace: Duration) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            grace,
            sequence: AtomicU64::new(1),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Add `subscriber` to `channel_id`, creating the channel if needed and
    /// cancelling any pending removal.
    pub fn subscribe(&self, channel_id: &str, subscriber: Subscriber) {
        let subscriber_id = subscriber.id.clone();

        let mut channel = self
            .channels
            .entry(channel_id.to_string())
            .or_insert_with(|| {
                let instance = self.next_sequence();
                info!(channel = %channel_id, instance, "created channel");
                Channel::new(channel_id, instance)
            });

        if channel.cancel_reaper() {
            debug!(channel = %channel_id, "cancelled pending channel removal");
        }

        channel.subscribe(subscriber);

        debug!(
            channel = %channel_id,
            subscriber = %subscriber_id,
            subscribers = channel.len(),
            "subscribed"
        );
    }

    /// Remove `subscriber_id` from `channel_id`. Removing a subscriber that is
    /// not a member is a no-op. Returns whether a member was removed.
    pub fn unsubscribe(&self, channel_id: &str, subscriber_id: &SubscriberId) -> bool {
        let Some(mut channel) = self.channels.get_mut(channel_id) else {
            return false;
        };

        if channel.unsubscribe(subscriber_id).is_none() {
            return false;
        }

        debug!(
            channel = %channel_id,
            subscriber = %subscriber_id,
            subscribers = channel.len(),
            "unsubscribed"
        );

        if channel.is_empty() {
            let reaper = Reaper::schedule(
                self.channels.clone(),
                channel_id.to_string(),
                self.next_sequence(),
                self.grace,
            );
            channel.arm_reaper(reaper);
        }

        true
    }

    /// Point-in-time copy of a channel's subscribers. Empty if the channel is
    /// absent.
    pub fn snapshot_subscribers(&self, channel_id: &str) -> Vec<Subscriber> {
        self.channels
            .get(channel_id)
            .map(|channel| channel.snapshot())
            .unwrap_or_default()
    }

    /// Point-in-time copy of every subscriber across all channels.
    pub fn all_subscribers(&self) -> Vec<Subscriber> {
        self.channels
            .iter()
            .flat_map(|entry| entry.value().snapshot())
            .collect()
    }

    pub fn contains_channel(&self, channel_id: &str) -> bool {
        self.channels.contains_key(channel_id)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn subscriber_count(&self, channel_id: &str) -> usize {
        self.channels
            .get(channel_id)
            .map(|channel| channel.len())
            .unwrap_or(0)
    }

    pub fn channel_instance(&self, channel_id: &str) -> Option<u64> {
        self.channels.get(channel_id).map(|channel| channel.instance)
    }

    /// True while the channel exists, is empty and has a removal pending.
    pub fn is_draining(&self, channel_id: &str) -> bool {
        self.channels
            .get(channel_id)
            .is_some_and(|channel| channel.is_empty() && channel.is_draining())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
