//! Events pushed down a subscriber's stream
//!
//! `StreamEvent` is transport agnostic: the broker only ever queues these
//! values on a subscriber's push channel. The SSE transport maps each variant
//! to an `event:` name and a `data:` payload.
//!
//! Variants:
//! - `Connected`: the acknowledgement queued once when a connection opens
//! - `Message`: a published text message
//! - `Ping`: the process-wide keep-alive emitted by the heartbeat

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Connected {
        channel_id: String,
        principal: String,
    },
    Message(String),
    Ping,
}

impl StreamEvent {
    /// Name used for the SSE `event:` field.
    pub fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::Connected { .. } => "connected",
            StreamEvent::Message(_) => "message",
            StreamEvent::Ping => "ping",
        }
    }

    /// Text carried in the SSE `data:` field.
    pub fn data(&self) -> String {
        match self {
            StreamEvent::Connected {
                channel_id,
                principal,
            } => format!("connected to \"{channel_id}\" as {principal}"),
            StreamEvent::Message(text) => text.clone(),
            StreamEvent::Ping => "keep-alive".to_string(),
        }
    }
}
