use crate::foundation::error::{StageError, StageResult};
use crate::scene::style::CompositeOp;

/// Composite a premultiplied RGBA8 layer onto `dst` with a canvas composite operator.
///
/// `alpha` scales the layer (global alpha). `clip`, when present, holds one coverage byte per pixel;
/// the composited result is interpolated towards the untouched destination outside the clip.
pub(crate) fn composite_layer(
    dst: &mut [u8],
    src: &[u8],
    op: CompositeOp,
    alpha: f32,
    clip: Option<&[u8]>,
) -> StageResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StageError::validation(
            "composite_layer expects equal-length rgba8 buffers",
        ));
    }
    if let Some(mask) = clip
        && mask.len() * 4 != dst.len()
    {
        return Err(StageError::validation(
            "composite_layer clip mask does not match the layer size",
        ));
    }

    let alpha = if alpha.is_finite() {
        alpha.clamp(0.0, 1.0)
    } else {
        1.0
    };

    for (i, (d, s)) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)).enumerate() {
        let coverage = clip.map_or(255u8, |m| m[i]);
        if coverage == 0 {
            continue;
        }
        // Untouched source pixels are a no-op for the operators that keep the destination there.
        if s[3] == 0 && keeps_destination_under_empty_source(op) {
            continue;
        }

        let sp = [
            f32::from(s[0]) / 255.0 * alpha,
            f32::from(s[1]) / 255.0 * alpha,
            f32::from(s[2]) / 255.0 * alpha,
            f32::from(s[3]) / 255.0 * alpha,
        ];
        let dp = [
            f32::from(d[0]) / 255.0,
            f32::from(d[1]) / 255.0,
            f32::from(d[2]) / 255.0,
            f32::from(d[3]) / 255.0,
        ];

        let out = composite_pixel(op, sp, dp);

        let c = f32::from(coverage) / 255.0;
        for k in 0..4 {
            let v = dp[k] + (out[k] - dp[k]) * c;
            d[k] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(())
}

/// Multiply the destination by `1 - coverage * clip` (clearRect).
pub(crate) fn erase_layer(dst: &mut [u8], coverage: &[u8], clip: Option<&[u8]>) -> StageResult<()> {
    if dst.len() != coverage.len() * 4 {
        return Err(StageError::validation("erase_layer coverage size mismatch"));
    }
    for (i, d) in dst.chunks_exact_mut(4).enumerate() {
        let mut cov = u32::from(coverage[i]);
        if let Some(mask) = clip {
            cov = (cov * u32::from(mask.get(i).copied().unwrap_or(0)) + 127) / 255;
        }
        if cov == 0 {
            continue;
        }
        let keep = 255 - cov;
        for v in d.iter_mut() {
            *v = ((u32::from(*v) * keep + 127) / 255) as u8;
        }
    }
    Ok(())
}

fn keeps_destination_under_empty_source(op: CompositeOp) -> bool {
    !matches!(
        op,
        CompositeOp::SourceIn
            | CompositeOp::SourceOut
            | CompositeOp::DestinationIn
            | CompositeOp::DestinationAtop
            | CompositeOp::Copy
    )
}

fn composite_pixel(op: CompositeOp, s: [f32; 4], d: [f32; 4]) -> [f32; 4] {
    let sa = s[3];
    let da = d[3];
    let porter_duff = |fa: f32, fb: f32| -> [f32; 4] {
        [
            (s[0] * fa + d[0] * fb).clamp(0.0, 1.0),
            (s[1] * fa + d[1] * fb).clamp(0.0, 1.0),
            (s[2] * fa + d[2] * fb).clamp(0.0, 1.0),
            (s[3] * fa + d[3] * fb).clamp(0.0, 1.0),
        ]
    };

    match op {
        CompositeOp::SourceOver => porter_duff(1.0, 1.0 - sa),
        CompositeOp::SourceIn => porter_duff(da, 0.0),
        CompositeOp::SourceOut => porter_duff(1.0 - da, 0.0),
        CompositeOp::SourceAtop => porter_duff(da, 1.0 - sa),
        CompositeOp::DestinationOver => porter_duff(1.0 - da, 1.0),
        CompositeOp::DestinationIn => porter_duff(0.0, sa),
        CompositeOp::DestinationOut => porter_duff(0.0, 1.0 - sa),
        CompositeOp::DestinationAtop => porter_duff(1.0 - da, sa),
        CompositeOp::Lighter => porter_duff(1.0, 1.0),
        CompositeOp::Copy => porter_duff(1.0, 0.0),
        CompositeOp::Xor => porter_duff(1.0 - da, 1.0 - sa),
        CompositeOp::Multiply => blend_separable(s, d, |s, d| s * d),
        CompositeOp::Screen => blend_separable(s, d, |s, d| s + d - s * d),
        CompositeOp::Overlay => blend_separable(s, d, |s, d| hard_light(d, s)),
        CompositeOp::Darken => blend_separable(s, d, f32::min),
        CompositeOp::Lighten => blend_separable(s, d, f32::max),
        CompositeOp::ColorDodge => blend_separable(s, d, |s, d| {
            if d <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }),
        CompositeOp::ColorBurn => blend_separable(s, d, |s, d| {
            if d >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - d) / s).min(1.0)
            }
        }),
        CompositeOp::HardLight => blend_separable(s, d, hard_light),
        CompositeOp::SoftLight => blend_separable(s, d, |s, d| {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }),
        CompositeOp::Difference => blend_separable(s, d, |s, d| (d - s).abs()),
        CompositeOp::Exclusion => blend_separable(s, d, |s, d| d + s - 2.0 * d * s),
        CompositeOp::Hue => blend_non_separable(s, d, |cs, cb| {
            set_lum(set_sat(cs, sat(cb)), lum(cb))
        }),
        CompositeOp::Saturation => blend_non_separable(s, d, |cs, cb| {
            set_lum(set_sat(cb, sat(cs)), lum(cb))
        }),
        CompositeOp::Color => blend_non_separable(s, d, |cs, cb| set_lum(cs, lum(cb))),
        CompositeOp::Luminosity => blend_non_separable(s, d, |cs, cb| set_lum(cb, lum(cs))),
    }
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

fn unpremul(p: [f32; 4]) -> [f32; 3] {
    if p[3] <= 0.0 {
        return [0.0; 3];
    }
    [
        (p[0] / p[3]).clamp(0.0, 1.0),
        (p[1] / p[3]).clamp(0.0, 1.0),
        (p[2] / p[3]).clamp(0.0, 1.0),
    ]
}

// out_a = sa + da * (1 - sa)
// out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
fn mix_blended(s: [f32; 4], d: [f32; 4], b: [f32; 3]) -> [f32; 4] {
    let (sa, da) = (s[3], d[3]);
    let mut out = [0.0f32; 4];
    for c in 0..3 {
        out[c] = (s[c] * (1.0 - da) + d[c] * (1.0 - sa) + b[c].clamp(0.0, 1.0) * sa * da)
            .clamp(0.0, 1.0);
    }
    out[3] = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);
    out
}

fn blend_separable<F>(s: [f32; 4], d: [f32; 4], f: F) -> [f32; 4]
where
    F: Fn(f32, f32) -> f32,
{
    let sc = unpremul(s);
    let dc = unpremul(d);
    mix_blended(s, d, [f(sc[0], dc[0]), f(sc[1], dc[1]), f(sc[2], dc[2])])
}

fn blend_non_separable<F>(s: [f32; 4], d: [f32; 4], f: F) -> [f32; 4]
where
    F: Fn([f32; 3], [f32; 3]) -> [f32; 3],
{
    mix_blended(s, d, f(unpremul(s), unpremul(d)))
}

fn lum(c: [f32; 3]) -> f32 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: [f32; 3]) -> [f32; 3] {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l - n > f32::EPSILON {
        for v in &mut out {
            *v = l + (*v - l) * l / (l - n);
        }
    }
    if x > 1.0 && x - l > f32::EPSILON {
        for v in &mut out {
            *v = l + (*v - l) * (1.0 - l) / (x - l);
        }
    }
    out
}

fn set_lum(c: [f32; 3], l: f32) -> [f32; 3] {
    let delta = l - lum(c);
    clip_color([c[0] + delta, c[1] + delta, c[2] + delta])
}

fn sat(c: [f32; 3]) -> f32 {
    c[0].max(c[1]).max(c[2]) - c[0].min(c[1]).min(c[2])
}

fn set_sat(c: [f32; 3], s: f32) -> [f32; 3] {
    let max = c[0].max(c[1]).max(c[2]);
    let min = c[0].min(c[1]).min(c[2]);
    let range = max - min;
    if range <= f32::EPSILON {
        return [0.0; 3];
    }
    let mut out = [0.0f32; 3];
    for k in 0..3 {
        out[k] = (c[k] - min) * s / range;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
