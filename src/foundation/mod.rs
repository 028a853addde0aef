//! Identifiers, pixel and geometry primitives, and the crate error type.

/// Surface and asset identifiers, sizes and premultiplied pixels.
pub mod core;
/// [`StageError`](error::StageError) and [`StageResult`](error::StageResult).
pub mod error;
pub(crate) mod math;
