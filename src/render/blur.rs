use crate::foundation::error::{StageError, StageResult};
use crate::foundation::math::mul_div255_u8;

/// Parameters of one shadow pass, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShadowParams {
    /// Premultiplied shadow color.
    pub color: [u8; 4],
    pub offset_x: f64,
    pub offset_y: f64,
    /// Canvas `shadowBlur`; the gaussian sigma is half of it.
    pub blur: f64,
}

/// Build the shadow layer for a premultiplied source layer.
///
/// The source alpha is tinted with the shadow color, shifted by the (rounded) offset and blurred.
pub(crate) fn shadow_layer(
    src: &[u8],
    width: u32,
    height: u32,
    params: ShadowParams,
) -> StageResult<Vec<u8>> {
    let expected = (width as usize) * (height as usize) * 4;
    if src.len() != expected {
        return Err(StageError::validation("shadow source length mismatch"));
    }

    let w = i64::from(width);
    let h = i64::from(height);
    // Offsets past the layer edge all shift the shadow fully out of view.
    let dx = (params.offset_x.round() as i64).clamp(-w, w);
    let dy = (params.offset_y.round() as i64).clamp(-h, h);

    let mut tinted = vec![0u8; expected];
    for y in 0..h {
        let sy = y - dy;
        if sy < 0 || sy >= h {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if sx < 0 || sx >= w {
                continue;
            }
            let a = src[((sy * w + sx) as usize) * 4 + 3];
            if a == 0 {
                continue;
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                tinted[out + c] = mul_div255_u8(u16::from(params.color[c]), u16::from(a));
            }
        }
    }

    let sigma = (params.blur / 2.0) as f32;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Ok(tinted);
    }
    let radius = blur_radius(sigma, width, height);
    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut out = vec![0u8; expected];
    let mut tmp = vec![0u8; expected];
    blur_rgba8_premul_q16(&tinted, &mut out, &mut tmp, width, height, &kernel);
    Ok(out)
}

/// Kernel radius for `sigma`, capped at the larger layer side: taps past it only ever read
/// transparent samples.
pub(crate) fn blur_radius(sigma: f32, width: u32, height: u32) -> u32 {
    let cap = width.max(height);
    let wanted = (f64::from(sigma) * 3.0).ceil();
    if wanted >= f64::from(cap) { cap } else { wanted as u32 }
}

pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f32) -> StageResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(StageError::validation("blur sigma must be finite and > 0"));
    }

    let r = i64::from(radius);
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }
    if sum <= 0.0 {
        return Err(StageError::validation("gaussian kernel sum is zero"));
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

pub(crate) fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }

    horizontal_blur_q16(src, tmp, width, height, kernel_q16);
    vertical_blur_q16(tmp, dst, width, height, kernel_q16);
}

// Samples outside the surface read as transparent so shadows fade out at the edges.
fn horizontal_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    for y in 0..i64::from(height) {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = x + ki as i64 - radius;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_blur_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = y + ki as i64 - radius;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
