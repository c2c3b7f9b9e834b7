//! Channel registry, broadcast delivery, keep-alive and idle-channel reaping.

pub mod channel;
pub mod dispatcher;
pub mod heartbeat;
pub mod message;
pub mod reaper;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use heartbeat::Heartbeat;
pub use message::StreamEvent;
pub use registry::Registry;
