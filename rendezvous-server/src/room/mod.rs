mod room;
mod room_outcome;
mod room_registry;

pub use room::*;
pub use room_outcome::*;
pub use room_registry::*;
