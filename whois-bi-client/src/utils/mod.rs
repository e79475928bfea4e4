//! Utility modules.

/// Timestamp helpers for the server's string timestamps.
pub mod datetime;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;
