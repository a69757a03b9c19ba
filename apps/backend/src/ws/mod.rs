//! Realtime delivery: wire protocol, connection registry, fan-out, websocket actor.

pub mod fanout;
pub mod protocol;
pub mod registry;
pub mod session;

pub use fanout::{DeliveryReport, Fanout, Notification, PendingDelivery, RetryPolicy};
pub use protocol::{ClientMsg, Inbound, ServerMsg};
pub use registry::{Connection, ConnectionRegistry, DeliveryError, MessageSink};
