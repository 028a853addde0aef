use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::AssetId;
use crate::foundation::error::StageResult;

/// A decoded bitmap owned by one surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Asset id the image was loaded under.
    pub id: AssetId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, tightly packed, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap already-premultiplied pixels.
    pub fn from_premul(id: AssetId, width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            id,
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }

    /// Premultiplied pixel at `(x, y)`; `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8_premul.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Decode encoded image bytes (PNG, JPEG, GIF, BMP, WebP) into premultiplied RGBA8.
pub fn decode_image(id: AssetId, bytes: &[u8]) -> StageResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage::from_premul(id, width, height, rgba8_premul))
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
