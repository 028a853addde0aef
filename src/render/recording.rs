use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{AssetId, Size};
use crate::foundation::error::{StageError, StageResult};
use crate::render::context::{DrawingContext, FrameRGBA, Paint, Shadow};
use crate::scene::style::{
    CompositeOp, Direction, FillRule, LineCap, LineJoin, TextAlign, TextBaseline,
};

/// One recorded call on a [`RecordingContext`].
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum DrawCall {
    BeginPath,
    ClosePath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    },
    ArcTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        radius: f64,
    },
    QuadraticCurveTo(f64, f64, f64, f64),
    BezierCurveTo(f64, f64, f64, f64, f64, f64),
    Rect(f64, f64, f64, f64),
    Fill(Option<FillRule>),
    Stroke,
    Clip(Option<FillRule>),
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    ClearRect(f64, f64, f64, f64),
    StrokeStyle(Paint),
    FillStyle(Paint),
    GlobalAlpha(f64),
    LineWidth(f64),
    LineCap(LineCap),
    LineJoin(LineJoin),
    MiterLimit(f64),
    LineDash(Vec<f64>),
    Font(String),
    TextBaseline(TextBaseline),
    TextAlign(TextAlign),
    Direction(Direction),
    Shadow(Shadow),
    ImageSmoothing(bool),
    CompositeOp(CompositeOp),
    FillText {
        text: String,
        x: f64,
        y: f64,
        max_width: Option<f64>,
    },
    StrokeText {
        text: String,
        x: f64,
        y: f64,
        max_width: Option<f64>,
    },
    DrawImage {
        id: AssetId,
        dx: f64,
        dy: f64,
    },
    DrawImageScaled {
        id: AssetId,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    },
    DrawImageSlice {
        id: AssetId,
        src: [f64; 4],
        dst: [f64; 4],
    },
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    Transform([f64; 6]),
}

/// A [`DrawingContext`] that records calls instead of rasterising them.
///
/// Arc radii are validated like the raster context so that failure behaviour matches.
#[derive(Clone, Debug, Default)]
pub struct RecordingContext {
    size: Option<Size>,
    calls: Vec<DrawCall>,
}

impl RecordingContext {
    /// An empty recording for a surface of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size: Some(size),
            calls: Vec::new(),
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the recording empty.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    fn push(&mut self, call: DrawCall) {
        self.calls.push(call);
    }
}

fn check_radius(tag: &str, radius: f64) -> StageResult<()> {
    if radius < 0.0 {
        return Err(StageError::invalid_op(
            tag,
            format!("radius must be non-negative, got {radius}"),
        ));
    }
    Ok(())
}

impl DrawingContext for RecordingContext {
    fn width(&self) -> u32 {
        self.size.map_or(0, |s| s.width)
    }

    fn height(&self) -> u32 {
        self.size.map_or(0, |s| s.height)
    }

    fn begin_path(&mut self) {
        self.push(DrawCall::BeginPath);
    }

    fn close_path(&mut self) {
        self.push(DrawCall::ClosePath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCall::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCall::LineTo(x, y));
    }

    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> StageResult<()> {
        check_radius("ARC", radius)?;
        self.push(DrawCall::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        });
        Ok(())
    }

    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> StageResult<()> {
        check_radius("ARC_TO", radius)?;
        self.push(DrawCall::ArcTo {
            x1,
            y1,
            x2,
            y2,
            radius,
        });
        Ok(())
    }

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.push(DrawCall::QuadraticCurveTo(cpx, cpy, x, y));
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.push(DrawCall::BezierCurveTo(cp1x, cp1y, cp2x, cp2y, x, y));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCall::Rect(x, y, width, height));
    }

    fn fill(&mut self, rule: Option<FillRule>) {
        self.push(DrawCall::Fill(rule));
    }

    fn stroke(&mut self) {
        self.push(DrawCall::Stroke);
    }

    fn clip(&mut self, rule: Option<FillRule>) {
        self.push(DrawCall::Clip(rule));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCall::FillRect(x, y, width, height));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCall::StrokeRect(x, y, width, height));
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCall::ClearRect(x, y, width, height));
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        self.push(DrawCall::StrokeStyle(paint));
    }

    fn set_fill_style(&mut self, paint: Paint) {
        self.push(DrawCall::FillStyle(paint));
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.push(DrawCall::GlobalAlpha(alpha));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCall::LineWidth(width));
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.push(DrawCall::LineCap(cap));
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.push(DrawCall::LineJoin(join));
    }

    fn set_miter_limit(&mut self, limit: f64) {
        self.push(DrawCall::MiterLimit(limit));
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.push(DrawCall::LineDash(segments.to_vec()));
    }

    fn set_font(&mut self, font: &str) {
        self.push(DrawCall::Font(font.to_owned()));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.push(DrawCall::TextBaseline(baseline));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.push(DrawCall::TextAlign(align));
    }

    fn set_direction(&mut self, direction: Direction) {
        self.push(DrawCall::Direction(direction));
    }

    fn set_shadow(&mut self, shadow: Shadow) {
        self.push(DrawCall::Shadow(shadow));
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.push(DrawCall::ImageSmoothing(enabled));
    }

    fn set_composite_op(&mut self, op: CompositeOp) {
        self.push(DrawCall::CompositeOp(op));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.push(DrawCall::FillText {
            text: text.to_owned(),
            x,
            y,
            max_width,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.push(DrawCall::StrokeText {
            text: text.to_owned(),
            x,
            y,
            max_width,
        });
    }

    fn draw_image(&mut self, image: &Arc<DecodedImage>, dx: f64, dy: f64) {
        self.push(DrawCall::DrawImage {
            id: image.id.clone(),
            dx,
            dy,
        });
    }

    fn draw_image_scaled(&mut self, image: &Arc<DecodedImage>, dx: f64, dy: f64, dw: f64, dh: f64) {
        self.push(DrawCall::DrawImageScaled {
            id: image.id.clone(),
            dx,
            dy,
            dw,
            dh,
        });
    }

    fn draw_image_slice(
        &mut self,
        image: &Arc<DecodedImage>,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    ) {
        self.push(DrawCall::DrawImageSlice {
            id: image.id.clone(),
            src: [sx, sy, sw, sh],
            dst: [dx, dy, dw, dh],
        });
    }

    fn save(&mut self) {
        self.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.push(DrawCall::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.push(DrawCall::Translate(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.push(DrawCall::Rotate(angle));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.push(DrawCall::Scale(x, y));
    }

    fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.push(DrawCall::Transform([a, b, c, d, e, f]));
    }

    fn snapshot(&self) -> FrameRGBA {
        FrameRGBA::transparent(self.width(), self.height())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
