mod candidate_queue;
mod negotiation_state;
mod peer_session;
mod signal_sink;

pub use candidate_queue::*;
pub use negotiation_state::*;
pub use peer_session::*;
pub use signal_sink::*;
