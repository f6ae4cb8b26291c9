pub mod client;
pub mod config;
pub mod encoder;
pub mod interpreter;
pub mod retry;
pub mod sink;
pub mod source;

pub use client::*;
pub use config::*;
pub use encoder::*;
pub use interpreter::*;
pub use retry::*;
pub use sink::*;
pub use source::*;
