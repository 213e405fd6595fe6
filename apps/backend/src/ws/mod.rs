pub mod hub;
pub mod protocol;
pub mod session;

pub use hub::TopicHub;
pub use protocol::{EventEnvelope, Topic};
