//! Sessions: conversation records, their event logs, and the store that owns them.

pub mod event;
pub mod record;
pub mod store;

pub use event::Event;
pub use record::{Session, State};
pub use store::{InMemorySessionStore, SessionStore};
