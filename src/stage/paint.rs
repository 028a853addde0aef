use crate::foundation::core::SurfaceId;
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::SurfaceBackend;
use crate::render::color::parse_css_color;
use crate::render::context::{DrawingContext, Paint};
use crate::scene::paint::{ColorStop, PaintSpec};
use crate::stage::registry::{Surface, SurfaceRegistry};

/// Resolve a paint specification against the surface registered as `id`.
pub fn resolve_in<B: SurfaceBackend>(
    registry: &SurfaceRegistry<B>,
    id: &SurfaceId,
    spec: &PaintSpec,
) -> StageResult<Paint> {
    resolve(registry.get(id)?, spec)
}

/// Turn a [`PaintSpec`] into a [`Paint`] using the surface's loaded images.
///
/// Plain colors pass through untouched; the context decides what an unparseable color does.
/// Gradient stops keep their order and are checked the way `addColorStop` checks them: the
/// offset must lie in `[0, 1]` and the color must parse. Gradient radii must be non-negative.
pub fn resolve<C: DrawingContext>(surface: &Surface<C>, spec: &PaintSpec) -> StageResult<Paint> {
    match spec {
        PaintSpec::Plain(color) => Ok(Paint::Color(color.clone())),
        PaintSpec::Pattern { id, repetition } => Ok(Paint::Pattern {
            image: surface.image(id)?.clone(),
            repetition: *repetition,
        }),
        PaintSpec::LinearGradient {
            x1,
            y1,
            x2,
            y2,
            stops,
        } => {
            let tag = spec.tag();
            check_finite(tag, &[*x1, *y1, *x2, *y2])?;
            Ok(Paint::LinearGradient {
                x0: *x1,
                y0: *y1,
                x1: *x2,
                y1: *y2,
                stops: checked_stops(tag, stops)?,
            })
        }
        PaintSpec::RadialGradient {
            x1,
            y1,
            r1,
            x2,
            y2,
            r2,
            stops,
        } => {
            let tag = spec.tag();
            check_finite(tag, &[*x1, *y1, *r1, *x2, *y2, *r2])?;
            if *r1 < 0.0 || *r2 < 0.0 {
                return Err(StageError::invalid_op(
                    tag,
                    format!("radii must be non-negative, got {r1} and {r2}"),
                ));
            }
            Ok(Paint::RadialGradient {
                x0: *x1,
                y0: *y1,
                r0: *r1,
                x1: *x2,
                y1: *y2,
                r1: *r2,
                stops: checked_stops(tag, stops)?,
            })
        }
    }
}

fn check_finite(tag: &str, values: &[f64]) -> StageResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(StageError::invalid_op(tag, "gradient geometry must be finite"))
    }
}

fn checked_stops(tag: &str, stops: &[ColorStop]) -> StageResult<Vec<ColorStop>> {
    for (i, stop) in stops.iter().enumerate() {
        if !(0.0..=1.0).contains(&stop.offset) {
            return Err(StageError::invalid_op(
                tag,
                format!("stop #{i} offset {} is outside [0, 1]", stop.offset),
            ));
        }
        if parse_css_color(&stop.color).is_none() {
            return Err(StageError::invalid_op(
                tag,
                format!("stop #{i} color '{}' is not a valid CSS color", stop.color),
            ));
        }
    }
    Ok(stops.to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/stage/paint.rs"]
mod tests;
