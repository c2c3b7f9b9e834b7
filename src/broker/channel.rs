//! Channel bookkeeping
//!
//! A `Channel` holds the current subscribers of one channel id plus the
//! reaper that is pending while the channel sits empty. Subscribers are keyed
//! by their connection id, so adding the same connection twice is a no-op.
//!
//! Concurrency note: a `Channel` is only ever touched through its registry
//! entry, which serializes all access per channel id.

use std::collections::HashMap;

use crate::broker::reaper::Reaper;
use crate::client::{Subscriber, SubscriberId};

pub type ChannelId = String;

#[derive(Debug)]
pub struct Channel {
    pub id: ChannelId,
    /// Lifecycle number; a channel recreated under the same id gets a new one.
    pub instance: u64,
    subscribers: HashMap<SubscriberId, Subscriber>,
    reaper: Option<Reaper>,
}

impl Channel {
    pub fn new(id: &str, instance: u64) -> Self {
        Self {
            id: id.to_string(),
            instance,
            subscribers: HashMap::new(),
            reaper: None,
        }
    }

    /// Add a subscriber. Returns `false` if it was already a member.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> bool {
        self.subscribers
            .insert(subscriber.id.clone(), subscriber)
            .is_none()
    }

    /// Remove a subscriber, returning it if it was a member.
    pub fn unsubscribe(&mut self, id: &SubscriberId) -> Option<Subscriber> {
        self.subscribers.remove(id)
    }

    #[cfg(test)]
    pub fn contains(&self, id: &SubscriberId) -> bool {
        self.subscribers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Point-in-time copy of the members, safe to iterate without the lock.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.subscribers.values().cloned().collect()
    }

    /// Install a pending reaper, aborting any previous one.
    pub fn arm_reaper(&mut self, reaper: Reaper) {
        if let Some(previous) = self.reaper.replace(reaper) {
            previous.cancel();
        }
    }

    /// Abort the pending reaper, if any. Returns whether one was pending.
    pub fn cancel_reaper(&mut self) -> bool {
        match self.reaper.take() {
            Some(reaper) => {
                reaper.cancel();
                true
            }
            None => false,
        }
    }

    pub fn reaper_token(&self) -> Option<u64> {
        self.reaper.as_ref().map(Reaper::token)
    }

    pub fn is_draining(&self) -> bool {
        self.reaper.is_some()
    }
}
