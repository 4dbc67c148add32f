pub use rendezvous_core::{ConnectionId, RoomId};

pub mod model {
    pub use rendezvous_core::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use rendezvous_server::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use rendezvous_peer::*;
}
