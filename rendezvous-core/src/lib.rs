pub mod clock;
pub mod listener;
pub mod model;

pub use clock::now_millis;
pub use listener::DisconnectListener;
pub use model::*;

/// Sender name used for chat from a connection that is not in the named room.
pub const ANONYMOUS_SENDER: &str = "Anonymous";

pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
