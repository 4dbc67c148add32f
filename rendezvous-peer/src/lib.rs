mod client;
mod engine;
mod error;
mod session;
mod transport;

pub use client::*;
pub use engine::*;
pub use error::*;
pub use session::*;
pub use transport::*;
