//! Command and reply models for the cache driver
//!
//! Defines the JSON shapes read from and written to a driver session.

pub mod commands;
pub mod replies;

// Re-export commonly used types
pub use commands::Command;
pub use replies::Reply;
