//! Applies operation batches to a surface's drawing context.
//!
//! A batch runs strictly in order. The first failing operation stops the batch; everything
//! applied before it stays applied and later batches run normally.

use crate::foundation::core::SurfaceId;
use crate::foundation::error::{StageError, StageResult};
use crate::render::backend::SurfaceBackend;
use crate::render::context::{DrawingContext, Shadow};
use crate::scene::ops::{Operation, RawOperation};
use crate::stage::paint::resolve;
use crate::stage::registry::{Surface, SurfaceRegistry};

/// Apply typed operations to the surface registered as `id`.
///
/// Fails with [`StageError::SurfaceNotFound`] before touching anything, or with
/// [`StageError::BatchAborted`] naming the index and tag of the operation that failed.
pub fn apply<B: SurfaceBackend>(
    registry: &mut SurfaceRegistry<B>,
    id: &SurfaceId,
    operations: &[Operation],
) -> StageResult<()> {
    apply_to(registry.get_mut(id)?, operations)
}

/// Apply wire operations, decoding each one just before it runs.
///
/// A malformed payload therefore aborts the batch at its own index, after the operations in
/// front of it have been applied.
#[tracing::instrument(skip(registry, id, operations), fields(id = %id, count = operations.len()))]
pub fn apply_raw<B: SurfaceBackend>(
    registry: &mut SurfaceRegistry<B>,
    id: &SurfaceId,
    operations: &[RawOperation],
) -> StageResult<()> {
    let surface = registry.get_mut(id)?;
    for (index, raw) in operations.iter().enumerate() {
        let result = raw
            .decode()
            .and_then(|op| apply_one(surface, &op));
        if let Err(e) = result {
            return Err(aborted(surface.id(), index, &raw.tag, e));
        }
    }
    Ok(())
}

/// Apply typed operations to an already borrowed surface.
#[tracing::instrument(skip(surface, operations), fields(id = %surface.id(), count = operations.len()))]
pub fn apply_to<C: DrawingContext>(
    surface: &mut Surface<C>,
    operations: &[Operation],
) -> StageResult<()> {
    for (index, op) in operations.iter().enumerate() {
        if let Err(e) = apply_one(surface, op) {
            return Err(aborted(surface.id(), index, op.tag(), e));
        }
    }
    Ok(())
}

fn aborted(surface: &SurfaceId, index: usize, tag: &str, e: StageError) -> StageError {
    tracing::warn!(surface = %surface, index, tag, error = %e, "batch aborted");
    StageError::BatchAborted {
        surface: surface.clone(),
        index,
        tag: tag.to_owned(),
        source: Box::new(e),
    }
}

fn text_max_width(max_width: Option<f64>) -> Option<f64> {
    // The host sends -1 for "no limit".
    max_width.filter(|w| *w > -1.0)
}

/// Apply one operation. Asset lookups and paint resolution happen before the context is touched,
/// so a failing operation leaves the drawing state as it was.
pub(crate) fn apply_one<C: DrawingContext>(
    surface: &mut Surface<C>,
    op: &Operation,
) -> StageResult<()> {
    match op {
        Operation::BeginPath => surface.context_mut().begin_path(),
        Operation::ClosePath => surface.context_mut().close_path(),
        Operation::MoveTo { x, y } => surface.context_mut().move_to(*x, *y),
        Operation::LineTo { x, y } => surface.context_mut().line_to(*x, *y),
        Operation::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        } => surface.context_mut().arc(
            *x,
            *y,
            *radius,
            *start_angle,
            *end_angle,
            *anticlockwise,
        )?,
        Operation::ArcTo {
            x1,
            y1,
            x2,
            y2,
            radius,
        } => surface.context_mut().arc_to(*x1, *y1, *x2, *y2, *radius)?,
        Operation::QuadraticCurveTo { cpx, cpy, x, y } => {
            surface.context_mut().quadratic_curve_to(*cpx, *cpy, *x, *y)
        }
        Operation::BezierCurveTo {
            cp1x,
            cp1y,
            cp2x,
            cp2y,
            x,
            y,
        } => surface
            .context_mut()
            .bezier_curve_to(*cp1x, *cp1y, *cp2x, *cp2y, *x, *y),
        Operation::Rect {
            x,
            y,
            width,
            height,
        } => surface.context_mut().rect(*x, *y, *width, *height),
        Operation::FillPath(rule) => surface.context_mut().fill(*rule),
        Operation::StrokePath => surface.context_mut().stroke(),
        Operation::Clip(rule) => surface.context_mut().clip(*rule),
        Operation::FillRect {
            x,
            y,
            width,
            height,
        } => surface.context_mut().fill_rect(*x, *y, *width, *height),
        Operation::StrokeRect {
            x,
            y,
            width,
            height,
        } => surface.context_mut().stroke_rect(*x, *y, *width, *height),
        Operation::ClearRect {
            x,
            y,
            width,
            height,
        } => surface.context_mut().clear_rect(*x, *y, *width, *height),
        Operation::StrokeStyle(spec) => {
            let paint = resolve(surface, spec)?;
            surface.context_mut().set_stroke_style(paint);
        }
        Operation::FillStyle(spec) => {
            let paint = resolve(surface, spec)?;
            surface.context_mut().set_fill_style(paint);
        }
        Operation::GlobalAlpha(alpha) => surface.context_mut().set_global_alpha(*alpha),
        Operation::LineWidth(width) => surface.context_mut().set_line_width(*width),
        Operation::LineCap(cap) => surface.context_mut().set_line_cap(*cap),
        Operation::LineJoin(join) => surface.context_mut().set_line_join(*join),
        Operation::MiterLimit(limit) => surface.context_mut().set_miter_limit(*limit),
        Operation::LineDash(segments) => surface.context_mut().set_line_dash(segments),
        Operation::Font(font) => surface.context_mut().set_font(font),
        Operation::TextBaseline(baseline) => surface.context_mut().set_text_baseline(*baseline),
        Operation::TextAlign(align) => surface.context_mut().set_text_align(*align),
        Operation::TextDirection(direction) => surface.context_mut().set_direction(*direction),
        Operation::Shadow {
            offset_x,
            offset_y,
            blur,
            color,
        } => surface.context_mut().set_shadow(Shadow {
            offset_x: *offset_x,
            offset_y: *offset_y,
            blur: *blur,
            color: color.clone(),
        }),
        Operation::Smoothing(enabled) => surface.context_mut().set_image_smoothing(*enabled),
        Operation::Composition(op) => surface.context_mut().set_composite_op(*op),
        Operation::FillText {
            text,
            x,
            y,
            max_width,
        } => surface
            .context_mut()
            .fill_text(text, *x, *y, text_max_width(*max_width)),
        Operation::StrokeText {
            text,
            x,
            y,
            max_width,
        } => surface
            .context_mut()
            .stroke_text(text, *x, *y, text_max_width(*max_width)),
        Operation::DrawImage { id, x, y } => {
            let image = surface.image(id)?.clone();
            surface.context_mut().draw_image(&image, *x, *y);
        }
        Operation::ScaleImage {
            id,
            x,
            y,
            width,
            height,
        } => {
            let image = surface.image(id)?.clone();
            surface
                .context_mut()
                .draw_image_scaled(&image, *x, *y, *width, *height);
        }
        Operation::SliceImage {
            id,
            sx,
            sy,
            s_width,
            s_height,
            dx,
            dy,
            d_width,
            d_height,
        } => {
            let image = surface.image(id)?.clone();
            surface.context_mut().draw_image_slice(
                &image, *sx, *sy, *s_width, *s_height, *dx, *dy, *d_width, *d_height,
            );
        }
        Operation::Save => surface.context_mut().save(),
        Operation::Restore => surface.context_mut().restore(),
        Operation::Translate { x, y } => surface.context_mut().translate(*x, *y),
        Operation::Rotate(angle) => surface.context_mut().rotate(*angle),
        Operation::Scale { x, y } => surface.context_mut().scale(*x, *y),
        Operation::Transform { a, b, c, d, e, f } => {
            surface.context_mut().transform(*a, *b, *c, *d, *e, *f)
        }
        Operation::Skip => {}
        Operation::Unknown { tag } => {
            tracing::debug!(tag = %tag, "ignoring unknown operation");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/stage/interpreter.rs"]
mod tests;
