//! The wire model: host messages, drawing operations, paint specifications and canvas keywords.

/// Host-to-core messages and core-to-host events.
pub mod messages;
/// Drawing operations and their per-operation decoding.
pub mod ops;
/// Paint specifications (solid, pattern, gradients).
pub mod paint;
/// Canvas keyword enums.
pub mod style;
