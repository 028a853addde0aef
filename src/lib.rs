//! canvas-stage executes serialized canvas-2D operation streams against named raster surfaces.
//!
//! The host registers a surface together with the images it will draw, waits for the readiness
//! event, then submits operation batches and reads pixel regions back:
//!
//! - [`SurfaceRegistry`] owns surfaces and their loaded images
//! - [`AssetLoader`] fetches and decodes a surface's manifest in request order
//! - [`interpreter`](stage::interpreter) applies batches through the [`DrawingContext`] trait
//! - [`export`](stage::export::export) copies a region out as RGBA bytes and a PNG data URI
//! - [`StageService`] wraps all of it in one tokio task speaking [`HostMessage`]/[`CoreEvent`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Asset fetching, decoding and loading.
pub mod assets;
/// Identifiers, pixel types and the crate error.
pub mod foundation;
/// Drawing contexts and backends.
pub mod render;
/// The wire model.
pub mod scene;
/// The message-driven service.
pub mod service;
/// Surfaces, configuration, interpretation and export.
pub mod stage;

pub use crate::assets::decode::DecodedImage;
pub use crate::assets::fetch::{AssetFetcher, DefaultFetcher, FetchOpts, MemoryFetcher};
pub use crate::assets::loader::AssetLoader;
pub use crate::foundation::core::{AssetId, Rgba8Premul, Size, SurfaceId};
pub use crate::foundation::error::{StageError, StageResult};
pub use crate::render::backend::{CpuBackend, RecordingBackend, SurfaceBackend};
pub use crate::render::context::{DrawingContext, FrameRGBA, Paint, Shadow};
pub use crate::render::cpu::{CpuBackendOpts, RasterContext};
pub use crate::render::recording::{DrawCall, RecordingContext};
pub use crate::scene::messages::{AssetRequest, CoreEvent, ExportRequest, HostMessage};
pub use crate::scene::ops::{Operation, RawOperation};
pub use crate::scene::paint::{ColorStop, PaintSpec};
pub use crate::service::actor::{StageHandle, StageService};
pub use crate::stage::config::StageConfig;
pub use crate::stage::export::ExportedImage;
pub use crate::stage::registry::{Surface, SurfaceRegistry};
