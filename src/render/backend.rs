use std::sync::Arc;

use crate::foundation::core::Size;
use crate::foundation::error::StageResult;
use crate::render::context::DrawingContext;
use crate::render::cpu::{CpuBackendOpts, RasterContext};
use crate::render::recording::RecordingContext;
use crate::render::text::FontBook;

/// Creates the drawing context bound to each newly registered surface.
///
/// The registry is generic over this trait so interpreter and service tests can run against
/// [`RecordingBackend`] while production uses [`CpuBackend`].
pub trait SurfaceBackend: Send + Sync {
    /// Context type produced for every surface.
    type Context: DrawingContext + Send;

    /// Create a fresh, transparent context of `size`.
    fn create(&self, size: Size) -> StageResult<Self::Context>;
}

/// CPU raster backend powered by `vello_cpu`.
#[derive(Clone, Debug)]
pub struct CpuBackend {
    opts: CpuBackendOpts,
    fonts: Arc<FontBook>,
}

impl CpuBackend {
    /// Backend with the given options. Fonts are loaded on first text draw.
    pub fn new(opts: CpuBackendOpts) -> Self {
        let fonts = Arc::new(FontBook::new(opts.fonts_dir.clone()));
        Self { opts, fonts }
    }

    /// Options this backend was built with.
    pub fn opts(&self) -> &CpuBackendOpts {
        &self.opts
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new(CpuBackendOpts::default())
    }
}

impl SurfaceBackend for CpuBackend {
    type Context = RasterContext;

    fn create(&self, size: Size) -> StageResult<RasterContext> {
        RasterContext::new(size, self.fonts.clone())
    }
}

/// Backend producing [`RecordingContext`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct RecordingBackend;

impl SurfaceBackend for RecordingBackend {
    type Context = RecordingContext;

    fn create(&self, size: Size) -> StageResult<RecordingContext> {
        Ok(RecordingContext::new(size))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
