pub mod config;
pub mod payload;
pub mod protocol;

pub use config::*;
pub use payload::*;
pub use protocol::*;
