pub mod compile;
pub mod dispatch;
pub mod split;

pub use compile::*;
pub use dispatch::*;
pub use split::*;
