//! Request middleware

mod cors;

pub use cors::cors;
