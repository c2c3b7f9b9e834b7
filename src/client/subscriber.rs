use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::error::SendError;
use uuid::Uuid;

use crate::broker::message::StreamEvent;

pub type SubscriberId = String;

/// Membership record of one live stream in a channel.
///
/// The registry stores clones of this value. Holding one does not keep the
/// connection open: once the stream's receiving half is gone every `send`
/// fails, which is how the broker observes a dead subscriber.
#[derive(Debug, Clone)]
pub struct Subscriber {
    /// Unique per connection (UUID v4).
    pub id: SubscriberId,

    /// Channel the connection subscribed to.
    pub channel_id: String,

    /// Authenticated identity, used for logging and the acknowledgement.
    pub principal: String,

    sender: UnboundedSender<StreamEvent>,
}

impl Subscriber {
    pub fn new(channel_id: &str, principal: &str, sender: UnboundedSender<StreamEvent>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            channel_id: channel_id.to_string(),
            principal: principal.to_string(),
            sender,
        }
    }

    /// Queue an event on the subscriber's stream.
    pub fn send(&self, event: StreamEvent) -> Result<(), SendError<StreamEvent>> {
        self.sender.send(event)
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
