//! Session state: dialogue turns, aliases, persona, rolling history and the
//! load/reset/save lifecycle.

pub mod aliases;
pub mod history;
pub mod persona;
pub mod state;
pub mod types;

pub use aliases::AliasTable;
pub use history::HistoryBuffer;
pub use persona::build_persona;
pub use state::{Session, SessionFlags, SessionState};
pub use types::{Role, Turn};
