use std::io::Cursor;

use anyhow::Context as _;
use base64::Engine as _;

use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::SurfaceBackend;
use crate::render::context::DrawingContext;
use crate::scene::messages::ExportRequest;
use crate::stage::registry::SurfaceRegistry;

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A region read back from a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedImage {
    /// Region width in pixels.
    pub width: u32,
    /// Region height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8, row-major.
    pub pixels: Vec<u8>,
    /// The same pixels encoded as PNG.
    pub png: Vec<u8>,
}

impl ExportedImage {
    /// `data:image/png;base64,...` form of [`ExportedImage::png`].
    pub fn data_uri(&self) -> String {
        let mut out = String::with_capacity(PNG_DATA_URI_PREFIX.len() + self.png.len() * 4 / 3 + 4);
        out.push_str(PNG_DATA_URI_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(&self.png, &mut out);
        out
    }
}

/// Copy `(x, y, width, height)` of a surface into a same-size image.
///
/// The region is not rescaled. Fractional origins are floored and pixels outside the surface
/// read as transparent black.
#[tracing::instrument(skip(registry, req), fields(id = %req.surface_id, width = req.width, height = req.height))]
pub fn export<B: SurfaceBackend>(
    registry: &SurfaceRegistry<B>,
    req: &ExportRequest,
) -> StageResult<ExportedImage> {
    if req.width == 0 || req.height == 0 {
        return Err(StageError::validation(format!(
            "export region must be non-empty, got {}x{}",
            req.width, req.height
        )));
    }
    let cap = registry.config().dimension_cap();
    if req.width > cap || req.height > cap {
        return Err(StageError::validation(format!(
            "export region {}x{} exceeds the {cap}px limit",
            req.width, req.height
        )));
    }
    if !req.x.is_finite() || !req.y.is_finite() {
        return Err(StageError::validation("export origin must be finite"));
    }

    let surface = registry.get(&req.surface_id)?;
    let ctx = surface.context();
    let source = ctx.read_pixels();
    let pixels = crop_rgba8(
        &source,
        ctx.width(),
        ctx.height(),
        export_origin(req.x),
        export_origin(req.y),
        req.width,
        req.height,
    );
    let png = encode_png(&pixels, req.width, req.height)?;
    Ok(ExportedImage {
        width: req.width,
        height: req.height,
        pixels,
        png,
    })
}

// Any origin this far out already misses every surface.
fn export_origin(v: f64) -> i64 {
    v.floor().clamp(-f64::from(i32::MAX), f64::from(i32::MAX)) as i64
}

/// Copy a `width` x `height` window at `(x, y)` out of an RGBA8 buffer, padding with zeros.
pub(crate) fn crop_rgba8(
    src: &[u8],
    src_width: u32,
    src_height: u32,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let mut out = vec![0u8; (width as usize) * (height as usize) * 4];
    let sw = i64::from(src_width);
    let sh = i64::from(src_height);

    let x0 = x.clamp(0, sw);
    let x1 = x.saturating_add(i64::from(width)).clamp(0, sw);
    if x1 <= x0 {
        return out;
    }
    let run = ((x1 - x0) as usize) * 4;
    let dst_col = ((x0 - x) as usize) * 4;

    for row in 0..i64::from(height) {
        let sy = y.saturating_add(row);
        if sy < 0 || sy >= sh {
            continue;
        }
        let src_start = ((sy * sw + x0) as usize) * 4;
        let dst_start = (row as usize) * (width as usize) * 4 + dst_col;
        if let (Some(from), Some(to)) = (
            src.get(src_start..src_start + run),
            out.get_mut(dst_start..dst_start + run),
        ) {
            to.copy_from_slice(from);
        }
    }
    out
}

/// Encode straight RGBA8 as PNG.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> StageResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba.to_vec())
        .context("rgba buffer does not match the image size")?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Recover the PNG bytes from a `data:image/png;base64,...` URI.
pub fn png_from_data_uri(uri: &str) -> StageResult<Vec<u8>> {
    let payload = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| StageError::validation("not a base64 png data uri"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .context("decode png data uri")?;
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/stage/export.rs"]
mod tests;
