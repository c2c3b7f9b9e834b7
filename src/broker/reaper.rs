//! Deferred removal of empty channels
//!
//! When a channel loses its last subscriber the registry arms a `Reaper`: a
//! tokio task that sleeps for the grace period and then removes the channel
//! entry. A new subscriber aborts the task and clears it from the channel in
//! the same locked step.
//!
//! The removal itself is a `remove_if` guarded by two checks made under the
//! entry lock: the channel must still be empty, and its pending reaper must
//! still carry this reaper's token. A timer that lost the race to a
//! re-subscribe therefore never removes anything, even if the abort arrives
//! after the sleep has already completed.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::broker::channel::{Channel, ChannelId};

pub type Channels = Arc<DashMap<ChannelId, Channel>>;

#[derive(Debug)]
pub struct Reaper {
    token: u64,
    handle: JoinHandle<()>,
}

impl Reaper {
    /// Spawn the removal timer for `channel_id`. Must be called from within a
    /// tokio runtime.
    pub fn schedule(
        channels: Channels,
        channel_id: ChannelId,
        token: u64,
        grace: Duration,
    ) -> Self {
        debug!(channel = %channel_id, token, ?grace, "scheduling channel removal");

        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;

            let removed = channels.remove_if(&channel_id, |_, channel| {
                channel.is_empty() && channel.reaper_token() == Some(token)
            });

            match removed {
                Some((id, channel)) => {
                    info!(channel = %id, instance = channel.instance, "removed idle channel");
                }
                None => {
                    debug!(channel = %channel_id, token, "stale reaper, channel kept");
                }
            }
        });

        Self { token, handle }
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}
