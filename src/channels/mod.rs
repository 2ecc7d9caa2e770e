//! Chat transport boundary.

pub mod console;
pub mod traits;

pub use console::ConsoleChannel;
pub use traits::{Channel, ChannelMessage};
