//! Storage abstraction traits

mod session_store;

pub use session_store::{InMemorySessionStore, SessionStore};
