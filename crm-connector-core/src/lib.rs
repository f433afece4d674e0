//! CRM Connector Core Library
//!
//! Business logic behind the connector gateway:
//! - Lead search / fetch reshaping (`LeadService`)
//! - Authorization-code flow bookkeeping (`AuthService`)
//! - Static connector descriptors (`/tools/list`, handshake metadata)
//!
//! Storage is abstracted behind the [`SessionStore`] trait so the web layer
//! decides where per-cookie sessions live.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{AuthService, LeadService};
pub use traits::{InMemorySessionStore, SessionStore};
