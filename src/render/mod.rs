//! Drawing contexts: the canvas-2D trait, the `vello_cpu` raster implementation and a recorder.

/// Surface backends that create drawing contexts.
pub mod backend;
pub(crate) mod blur;
/// CSS color parsing.
pub mod color;
pub(crate) mod composite;
/// The [`DrawingContext`](context::DrawingContext) trait and resolved paint types.
pub mod context;
/// CPU raster context.
pub mod cpu;
pub(crate) mod geom;
/// Call-recording context for tests and debugging.
pub mod recording;
/// Font shorthand parsing and text outlines.
pub mod text;
