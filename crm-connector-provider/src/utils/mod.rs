//! Utility modules.

/// Epoch-millisecond timestamp helpers for Salesforce token responses.
pub mod datetime;

/// Log sanitization utilities to keep tokens and large payloads out of logs.
pub mod log_sanitizer;
