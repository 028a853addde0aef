//! The message-driven front end: one task owns the registry and answers host messages with events.

/// The service task and its handle.
pub mod actor;
