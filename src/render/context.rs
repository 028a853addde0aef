use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::StageResult;
use crate::scene::paint::ColorStop;
use crate::scene::style::{
    CompositeOp, Direction, FillRule, LineCap, LineJoin, Repetition, TextAlign, TextBaseline,
};

/// A resolved paint, ready to be installed as fill or stroke style.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// CSS color string, exactly as supplied.
    Color(String),
    /// Image pattern.
    Pattern {
        /// Pattern source.
        image: Arc<DecodedImage>,
        /// Tiling mode.
        repetition: Repetition,
    },
    /// Linear gradient between two points.
    LinearGradient {
        /// Start x.
        x0: f64,
        /// Start y.
        y0: f64,
        /// End x.
        x1: f64,
        /// End y.
        y1: f64,
        /// Stops in application order.
        stops: Vec<ColorStop>,
    },
    /// Two-circle radial gradient.
    RadialGradient {
        /// Start center x.
        x0: f64,
        /// Start center y.
        y0: f64,
        /// Start radius.
        r0: f64,
        /// End center x.
        x1: f64,
        /// End center y.
        y1: f64,
        /// End radius.
        r1: f64,
        /// Stops in application order.
        stops: Vec<ColorStop>,
    },
}

impl Default for Paint {
    fn default() -> Self {
        Self::Color("#000000".to_owned())
    }
}

/// Shadow parameters (set as a group by the `SHADOW` operation).
#[derive(Clone, Debug, PartialEq)]
pub struct Shadow {
    /// Horizontal offset in device pixels.
    pub offset_x: f64,
    /// Vertical offset in device pixels.
    pub offset_y: f64,
    /// Blur amount (sigma is half of this).
    pub blur: f64,
    /// CSS color string.
    pub color: String,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            blur: 0.0,
            color: "rgba(0, 0, 0, 0)".to_owned(),
        }
    }
}

/// A snapshot of surface pixels as RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// A fully transparent frame.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
            premultiplied: true,
        }
    }
}

/// The immediate-mode 2D drawing capability the interpreter drives.
///
/// Method semantics follow the HTML canvas 2D context. Methods that can reject their input return
/// a [`StageResult`]; everything else silently ignores unusable values (non-finite numbers,
/// unparseable colors) the way a canvas does.
pub trait DrawingContext {
    /// Surface width in pixels.
    fn width(&self) -> u32;
    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Discard the current path.
    fn begin_path(&mut self);
    /// Close the current subpath.
    fn close_path(&mut self);
    /// Begin a subpath at `(x, y)`.
    fn move_to(&mut self, x: f64, y: f64);
    /// Add a line to `(x, y)`.
    fn line_to(&mut self, x: f64, y: f64);
    /// Add a circular arc; fails on a negative radius.
    fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> StageResult<()>;
    /// Add a tangent arc; fails on a negative radius.
    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> StageResult<()>;
    /// Add a quadratic Bézier segment.
    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64);
    /// Add a cubic Bézier segment.
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64);
    /// Add a closed rectangle subpath.
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Fill the current path.
    fn fill(&mut self, rule: Option<FillRule>);
    /// Stroke the current path.
    fn stroke(&mut self);
    /// Intersect the clip region with the current path.
    fn clip(&mut self, rule: Option<FillRule>);

    /// Fill a rectangle.
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Stroke a rectangle.
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Clear a rectangle to transparent black.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Install the stroke paint.
    fn set_stroke_style(&mut self, paint: Paint);
    /// Install the fill paint.
    fn set_fill_style(&mut self, paint: Paint);
    /// Set the global alpha.
    fn set_global_alpha(&mut self, alpha: f64);
    /// Set the line width.
    fn set_line_width(&mut self, width: f64);
    /// Set the line cap.
    fn set_line_cap(&mut self, cap: LineCap);
    /// Set the line join.
    fn set_line_join(&mut self, join: LineJoin);
    /// Set the miter limit.
    fn set_miter_limit(&mut self, limit: f64);
    /// Set the dash pattern.
    fn set_line_dash(&mut self, segments: &[f64]);
    /// Set the font from a CSS shorthand string.
    fn set_font(&mut self, font: &str);
    /// Set the text baseline.
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    /// Set the text alignment.
    fn set_text_align(&mut self, align: TextAlign);
    /// Set the text direction.
    fn set_direction(&mut self, direction: Direction);
    /// Set all shadow parameters.
    fn set_shadow(&mut self, shadow: Shadow);
    /// Enable or disable image smoothing.
    fn set_image_smoothing(&mut self, enabled: bool);
    /// Set the composite operation.
    fn set_composite_op(&mut self, op: CompositeOp);

    /// Fill text; `max_width` of `None` means unconstrained.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);
    /// Stroke text; `max_width` of `None` means unconstrained.
    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);

    /// Draw an image at its natural size.
    fn draw_image(&mut self, image: &Arc<DecodedImage>, dx: f64, dy: f64);
    /// Draw an image scaled into a destination rectangle.
    fn draw_image_scaled(&mut self, image: &Arc<DecodedImage>, dx: f64, dy: f64, dw: f64, dh: f64);
    /// Draw a source sub-rectangle of an image into a destination rectangle.
    #[allow(clippy::too_many_arguments)]
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
    );

    /// Push the drawing state.
    fn save(&mut self);
    /// Pop the drawing state; no-op on an empty stack.
    fn restore(&mut self);
    /// Translate the current transform.
    fn translate(&mut self, x: f64, y: f64);
    /// Rotate the current transform by `angle` radians.
    fn rotate(&mut self, angle: f64);
    /// Scale the current transform.
    fn scale(&mut self, x: f64, y: f64);
    /// Multiply the current transform by `[a c e; b d f; 0 0 1]`.
    fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64);

    /// Current surface pixels.
    fn snapshot(&self) -> FrameRGBA;

    /// Current surface pixels as straight-alpha RGBA8, row-major.
    fn read_pixels(&self) -> Vec<u8> {
        let frame = self.snapshot();
        if !frame.premultiplied {
            return frame.data;
        }
        frame
            .data
            .chunks_exact(4)
            .flat_map(|px| Rgba8Premul::from_array([px[0], px[1], px[2], px[3]]).to_straight_rgba())
            .collect()
    }
}
