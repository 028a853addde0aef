use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use kurbo::{Affine, BezPath, Cap, Join, Rect, Shape, Stroke};
use vello_cpu::peniko::{Extend, Fill, Gradient, ImageQuality, ImageSampler};
use vello_cpu::{Image, ImageSource, PaintType, Pixmap, RenderContext};

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{AssetId, Size};
use crate::foundation::error::{StageError, StageResult};
use crate::foundation::math::{affine_is_finite, affine_is_singular, mul_div255_u8};
use crate::render::blur::{ShadowParams, shadow_layer};
use crate::render::color::{color_to_premul, parse_css_color};
use crate::render::composite::{composite_layer, erase_layer};
use crate::render::context::{DrawingContext, FrameRGBA, Paint, Shadow};
use crate::render::geom::{PathBuilder, transform_path};
use crate::render::text::{Anchor, FontBook, FontSpec, text_outline};
use crate::scene::paint::ColorStop;
use crate::scene::style::{
    CompositeOp, Direction, FillRule, LineCap, LineJoin, Repetition, TextAlign, TextBaseline,
};

/// Options for the CPU raster backend.
#[derive(Debug, Clone, Default)]
pub struct CpuBackendOpts {
    pub(crate) fonts_dir: Option<PathBuf>,
}

impl CpuBackendOpts {
    /// Load additional `.ttf`/`.otf`/`.ttc` fonts from `dir` next to the system fonts.
    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = Some(dir.into());
        self
    }

    /// Configured extra font directory, if any.
    pub fn fonts_dir(&self) -> Option<&std::path::Path> {
        self.fonts_dir.as_deref()
    }
}

#[derive(Clone, Debug)]
struct DrawState {
    transform: Affine,
    fill: Paint,
    stroke: Paint,
    global_alpha: f32,
    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    dash: Vec<f64>,
    font: FontSpec,
    text_baseline: TextBaseline,
    text_align: TextAlign,
    direction: Direction,
    shadow: Shadow,
    smoothing: bool,
    composite: CompositeOp,
    clip: Option<Arc<Vec<u8>>>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Paint::default(),
            stroke: Paint::default(),
            global_alpha: 1.0,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: Vec::new(),
            font: FontSpec::default(),
            text_baseline: TextBaseline::default(),
            text_align: TextAlign::default(),
            direction: Direction::default(),
            shadow: Shadow::default(),
            smoothing: true,
            composite: CompositeOp::SourceOver,
            clip: None,
        }
    }
}

#[derive(Clone)]
struct CachedPixmap {
    source: Arc<DecodedImage>,
    pixmap: Arc<Pixmap>,
}

#[derive(Clone)]
struct CachedPattern {
    source: Arc<DecodedImage>,
    pixmap: Arc<Pixmap>,
    border: (u32, u32),
}

/// A canvas-2D drawing context over a premultiplied RGBA8 buffer, rasterised with `vello_cpu`.
///
/// Each draw call is rendered into a scratch layer and then composited onto the surface with the
/// current composite operation, global alpha, shadow and clip.
pub struct RasterContext {
    width: u32,
    height: u32,
    renderer: Option<RenderContext>,
    scratch: Option<Pixmap>,
    pixels: Vec<u8>,
    path: PathBuilder,
    state: DrawState,
    stack: Vec<DrawState>,
    fonts: Arc<FontBook>,
    image_cache: HashMap<AssetId, CachedPixmap>,
    pattern_cache: HashMap<(AssetId, Repetition), CachedPattern>,
}

impl std::fmt::Debug for RasterContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterContext")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("saved_states", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl RasterContext {
    /// A transparent surface of `size`. Each side must fit in `u16`.
    pub fn new(size: Size, fonts: Arc<FontBook>) -> StageResult<Self> {
        let w: u16 = size
            .width
            .try_into()
            .map_err(|_| StageError::validation("surface width exceeds u16"))?;
        let h: u16 = size
            .height
            .try_into()
            .map_err(|_| StageError::validation("surface height exceeds u16"))?;

        let (renderer, scratch) = if w == 0 || h == 0 {
            (None, None)
        } else {
            (Some(RenderContext::new(w, h)), Some(Pixmap::new(w, h)))
        };

        Ok(Self {
            width: size.width,
            height: size.height,
            renderer,
            scratch,
            pixels: vec![0; size.area() * 4],
            path: PathBuilder::new(),
            state: DrawState::default(),
            stack: Vec::new(),
            fonts,
            image_cache: HashMap::new(),
            pattern_cache: HashMap::new(),
        })
    }

    /// Premultiplied RGBA8 surface bytes.
    pub fn pixels_premul(&self) -> &[u8] {
        &self.pixels
    }

    fn drawable(&self) -> bool {
        if affine_is_singular(self.state.transform) {
            tracing::debug!("draw skipped under a singular transform");
            return false;
        }
        self.renderer.is_some()
    }

    /// Render one draw into the scratch layer and return its premultiplied bytes.
    fn rasterize<F>(&mut self, draw: F) -> Option<Vec<u8>>
    where
        F: FnOnce(&mut RenderContext),
    {
        let renderer = self.renderer.as_mut()?;
        let scratch = self.scratch.as_mut()?;
        renderer.reset();
        renderer.set_fill_rule(Fill::NonZero);
        renderer.set_aliasing_threshold(None);
        draw(renderer);
        renderer.flush();
        renderer.render_to_pixmap(scratch);
        Some(scratch.data_as_u8_slice().to_vec())
    }

    fn shadow_params(&self) -> Option<ShadowParams> {
        let shadow = &self.state.shadow;
        let color = parse_css_color(&shadow.color)?;
        let premul = color_to_premul(color);
        if premul.a == 0 {
            return None;
        }
        let blur = if shadow.blur.is_finite() && shadow.blur > 0.0 {
            shadow.blur
        } else {
            0.0
        };
        let ox = if shadow.offset_x.is_finite() { shadow.offset_x } else { 0.0 };
        let oy = if shadow.offset_y.is_finite() { shadow.offset_y } else { 0.0 };
        if blur == 0.0 && ox == 0.0 && oy == 0.0 {
            return None;
        }
        Some(ShadowParams {
            color: premul.to_array(),
            offset_x: ox,
            offset_y: oy,
            blur,
        })
    }

    /// Composite a rendered layer (and its shadow) onto the surface.
    fn commit(&mut self, layer: Vec<u8>) {
        let op = self.state.composite;
        let alpha = self.state.global_alpha;
        let clip = self.state.clip.clone();
        let clip = clip.as_deref().map(Vec::as_slice);

        if let Some(params) = self.shadow_params() {
            match shadow_layer(&layer, self.width, self.height, params) {
                Ok(shadow) => {
                    if let Err(e) = composite_layer(&mut self.pixels, &shadow, op, alpha, clip) {
                        tracing::debug!(error = %e, "shadow composite skipped");
                    }
                }
                Err(e) => tracing::debug!(error = %e, "shadow skipped"),
            }
        }
        if let Err(e) = composite_layer(&mut self.pixels, &layer, op, alpha, clip) {
            tracing::debug!(error = %e, "composite skipped");
        }
    }

    fn coverage_of<F>(&mut self, draw: F) -> Option<Vec<u8>>
    where
        F: FnOnce(&mut RenderContext),
    {
        let layer = self.rasterize(|ctx| {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            draw(ctx);
        })?;
        Some(layer.chunks_exact(4).map(|px| px[3]).collect())
    }

    /// The vello paint for `paint`, plus an extra paint-space transform (pattern borders).
    fn paint_for(&mut self, paint: &Paint) -> Option<(PaintType, Affine)> {
        match paint {
            Paint::Color(s) => {
                parse_css_color(s).map(|c| (PaintType::from(c), Affine::IDENTITY))
            }
            Paint::LinearGradient {
                x0,
                y0,
                x1,
                y1,
                stops,
            } => {
                if ![*x0, *y0, *x1, *y1].iter().all(|v| v.is_finite()) {
                    return None;
                }
                if x0 == x1 && y0 == y1 {
                    return None;
                }
                let gradient = Gradient::new_linear((*x0, *y0), (*x1, *y1));
                gradient_paint(gradient, stops)
            }
            Paint::RadialGradient {
                x0,
                y0,
                r0,
                x1,
                y1,
                r1,
                stops,
            } => {
                if ![*x0, *y0, *r0, *x1, *y1, *r1].iter().all(|v| v.is_finite()) {
                    return None;
                }
                if *r0 < 0.0 || *r1 < 0.0 || (x0 == x1 && y0 == y1 && r0 == r1) {
                    return None;
                }
                let gradient =
                    Gradient::new_two_point_radial((*x0, *y0), *r0 as f32, (*x1, *y1), *r1 as f32);
                gradient_paint(gradient, stops)
            }
            Paint::Pattern { image, repetition } => self.pattern_paint(image, *repetition),
        }
    }

    fn image_pixmap(&mut self, image: &Arc<DecodedImage>) -> Option<Arc<Pixmap>> {
        if let Some(hit) = self.image_cache.get(&image.id)
            && Arc::ptr_eq(&hit.source, image)
        {
            return Some(hit.pixmap.clone());
        }
        let pixmap = match pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height) {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::debug!(asset = %image.id, error = %e, "image not drawable");
                return None;
            }
        };
        self.image_cache.insert(
            image.id.clone(),
            CachedPixmap {
                source: image.clone(),
                pixmap: pixmap.clone(),
            },
        );
        Some(pixmap)
    }

    fn sampler(&self, x_extend: Extend, y_extend: Extend) -> ImageSampler {
        ImageSampler {
            x_extend,
            y_extend,
            quality: if self.state.smoothing {
                ImageQuality::Medium
            } else {
                ImageQuality::Low
            },
            alpha: 1.0,
        }
    }

    fn pattern_paint(
        &mut self,
        image: &Arc<DecodedImage>,
        repetition: Repetition,
    ) -> Option<(PaintType, Affine)> {
        if image.width == 0 || image.height == 0 {
            return None;
        }
        let key = (image.id.clone(), repetition);
        let cached = match self.pattern_cache.get(&key) {
            Some(hit) if Arc::ptr_eq(&hit.source, image) => hit.clone(),
            _ => {
                // Non-repeating axes get a transparent border so padding extends transparency.
                let bx = u32::from(!repetition.repeats_x());
                let by = u32::from(!repetition.repeats_y());
                let bytes = bordered_premul(image, bx, by);
                let pixmap = match pixmap_from_premul_bytes(
                    &bytes,
                    image.width + 2 * bx,
                    image.height + 2 * by,
                ) {
                    Ok(p) => Arc::new(p),
                    Err(e) => {
                        tracing::debug!(asset = %image.id, error = %e, "pattern not drawable");
                        return None;
                    }
                };
                let entry = CachedPattern {
                    source: image.clone(),
                    pixmap,
                    border: (bx, by),
                };
                self.pattern_cache.insert(key, entry.clone());
                entry
            }
        };

        let extend = |repeats: bool| if repeats { Extend::Repeat } else { Extend::Pad };
        let brush = Image {
            image: ImageSource::Pixmap(cached.pixmap),
            sampler: self.sampler(
                extend(repetition.repeats_x()),
                extend(repetition.repeats_y()),
            ),
        };
        let (bx, by) = cached.border;
        Some((
            PaintType::from(brush),
            Affine::translate((-f64::from(bx), -f64::from(by))),
        ))
    }

    fn stroke_style(&self) -> Stroke {
        let join = match self.state.line_join {
            LineJoin::Miter => Join::Miter,
            LineJoin::Round => Join::Round,
            LineJoin::Bevel => Join::Bevel,
        };
        let cap = match self.state.line_cap {
            LineCap::Butt => Cap::Butt,
            LineCap::Round => Cap::Round,
            LineCap::Square => Cap::Square,
        };
        let stroke = Stroke::new(self.state.line_width)
            .with_join(join)
            .with_miter_limit(self.state.miter_limit)
            .with_caps(cap);
        let dash_total: f64 = self.state.dash.iter().sum();
        if self.state.dash.is_empty() || dash_total <= 0.0 {
            stroke
        } else {
            stroke.with_dashes(0.0, self.state.dash.iter().copied())
        }
    }

    /// Fill a device-space path with the fill style.
    fn fill_device_path(&mut self, path: BezPath, rule: FillRule) {
        if !self.drawable() {
            return;
        }
        let fill = self.state.fill.clone();
        let Some((paint, paint_tf)) = self.paint_for(&fill) else {
            return;
        };
        let ctm = self.state.transform;
        let layer = self.rasterize(|ctx| {
            ctx.set_fill_rule(fill_rule(rule));
            ctx.set_transform(Affine::IDENTITY);
            ctx.set_paint(paint);
            ctx.set_paint_transform(ctm * paint_tf);
            ctx.fill_path(&path);
        });
        if let Some(layer) = layer {
            self.commit(layer);
        }
    }

    /// Stroke a user-space path placed with `placement` under the current transform.
    fn stroke_user_path(&mut self, path: BezPath, placement: Affine) {
        if !self.drawable() || affine_is_singular(placement) {
            return;
        }
        let stroke_paint = self.state.stroke.clone();
        let Some((paint, paint_tf)) = self.paint_for(&stroke_paint) else {
            return;
        };
        let stroke = self.stroke_style();
        let transform = self.state.transform * placement;
        let layer = self.rasterize(|ctx| {
            ctx.set_stroke(stroke);
            ctx.set_transform(transform);
            ctx.set_paint(paint);
            ctx.set_paint_transform(placement.inverse() * paint_tf);
            ctx.stroke_path(&path);
        });
        if let Some(layer) = layer {
            self.commit(layer);
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>, stroke: bool) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        if matches!(max_width, Some(w) if w.is_nan() || w <= 0.0) {
            return;
        }
        let anchor = Anchor::resolve(self.state.text_align, self.state.direction);
        let outline = match text_outline(
            text,
            &self.state.font,
            anchor,
            self.state.text_baseline,
            &self.fonts,
        ) {
            Ok(Some(path)) => path,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(error = %e, "text run skipped");
                return;
            }
        };

        let mut squeeze = 1.0;
        if let Some(max) = max_width {
            let run_width = outline.bounding_box().width();
            if run_width > max {
                squeeze = max / run_width;
            }
        }
        let placement = Affine::translate((x, y)) * Affine::scale_non_uniform(squeeze, 1.0);

        if stroke {
            self.stroke_user_path(outline, placement);
        } else {
            let device = transform_path(&outline, self.state.transform * placement);
            self.fill_device_path(device, FillRule::NonZero);
        }
    }

    fn blit(&mut self, image: &Arc<DecodedImage>, src: Rect, dst: Rect) {
        let coords = [src.x0, src.y0, src.x1, src.y1, dst.x0, dst.y0, dst.x1, dst.y1];
        if !coords.iter().all(|v| v.is_finite()) {
            return;
        }
        let src = src.abs();
        let dst = dst.abs();
        if src.is_zero_area() || dst.is_zero_area() {
            return;
        }
        let visible = src.intersect(Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        if visible.is_zero_area() || !self.drawable() {
            return;
        }
        let Some(pixmap) = self.image_pixmap(image) else {
            return;
        };

        let placement = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate((-src.x0, -src.y0));
        let transform = self.state.transform * placement;
        let brush = Image {
            image: ImageSource::Pixmap(pixmap),
            sampler: self.sampler(Extend::Pad, Extend::Pad),
        };
        let layer = self.rasterize(|ctx| {
            ctx.set_transform(transform);
            ctx.set_paint(brush);
            ctx.set_paint_transform(Affine::IDENTITY);
            ctx.fill_rect(&visible);
        });
        if let Some(layer) = layer {
            self.commit(layer);
        }
    }

    fn concat(&mut self, m: Affine) {
        if !affine_is_finite(m) {
            tracing::debug!("non-finite transform ignored");
            return;
        }
        self.state.transform *= m;
    }
}

impl DrawingContext for RasterContext {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn begin_path(&mut self) {
        self.path.begin();
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(self.state.transform, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.path.line_to(self.state.transform, x, y);
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
        self.path.arc(
            self.state.transform,
            x,
            y,
            radius,
            start_angle,
            end_angle,
            anticlockwise,
        )
    }

    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> StageResult<()> {
        self.path.arc_to(self.state.transform, x1, y1, x2, y2, radius)
    }

    fn quadratic_curve_to(&mut self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.path.quad_to(self.state.transform, cpx, cpy, x, y);
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.path
            .cubic_to(self.state.transform, cp1x, cp1y, cp2x, cp2y, x, y);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.path.rect(self.state.transform, x, y, width, height);
    }

    fn fill(&mut self, rule: Option<FillRule>) {
        if self.path.is_empty() {
            return;
        }
        let path = self.path.path().clone();
        self.fill_device_path(path, rule.unwrap_or_default());
    }

    fn stroke(&mut self) {
        if self.path.is_empty() || affine_is_singular(self.state.transform) {
            return;
        }
        let user = transform_path(self.path.path(), self.state.transform.inverse());
        self.stroke_user_path(user, Affine::IDENTITY);
    }

    fn clip(&mut self, rule: Option<FillRule>) {
        if self.renderer.is_none() {
            return;
        }
        let rule = rule.unwrap_or_default();
        let coverage = if self.path.is_empty() {
            Some(vec![0u8; (self.width as usize) * (self.height as usize)])
        } else {
            let path = self.path.path().clone();
            self.coverage_of(|ctx| {
                ctx.set_fill_rule(fill_rule(rule));
                ctx.fill_path(&path);
            })
        };
        let Some(coverage) = coverage else {
            return;
        };
        let mask = match &self.state.clip {
            Some(prev) => prev
                .iter()
                .zip(coverage.iter())
                .map(|(a, b)| mul_div255_u8(u16::from(*a), u16::from(*b)))
                .collect(),
            None => coverage,
        };
        self.state.clip = Some(Arc::new(mask));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) || width == 0.0 || height == 0.0 {
            return;
        }
        let path = Rect::new(x, y, x + width, y + height).abs().to_path(0.1);
        let device = transform_path(&path, self.state.transform);
        self.fill_device_path(device, FillRule::NonZero);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) {
            return;
        }
        if width == 0.0 && height == 0.0 {
            return;
        }
        let mut path = BezPath::new();
        if width == 0.0 || height == 0.0 {
            path.move_to((x, y));
            path.line_to((x + width, y + height));
        } else {
            path.move_to((x, y));
            path.line_to((x + width, y));
            path.line_to((x + width, y + height));
            path.line_to((x, y + height));
            path.close_path();
        }
        self.stroke_user_path(path, Affine::IDENTITY);
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if ![x, y, width, height].iter().all(|v| v.is_finite()) || width == 0.0 || height == 0.0 {
            return;
        }
        if !self.drawable() {
            return;
        }
        let transform = self.state.transform;
        let rect = Rect::new(x, y, x + width, y + height).abs();
        let Some(coverage) = self.coverage_of(|ctx| {
            ctx.set_transform(transform);
            ctx.fill_rect(&rect);
        }) else {
            return;
        };
        let clip = self.state.clip.clone();
        if let Err(e) = erase_layer(&mut self.pixels, &coverage, clip.as_deref().map(Vec::as_slice)) {
            tracing::debug!(error = %e, "clear skipped");
        }
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        if let Paint::Color(s) = &paint
            && parse_css_color(s).is_none()
        {
            tracing::debug!(color = %s, "unparseable stroke color ignored");
            return;
        }
        self.state.stroke = paint;
    }

    fn set_fill_style(&mut self, paint: Paint) {
        if let Paint::Color(s) = &paint
            && parse_css_color(s).is_none()
        {
            tracing::debug!(color = %s, "unparseable fill color ignored");
            return;
        }
        self.state.fill = paint;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha as f32;
        }
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    fn set_miter_limit(&mut self, limit: f64) {
        if limit.is_finite() && limit > 0.0 {
            self.state.miter_limit = limit;
        }
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        if segments.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return;
        }
        let mut dash = segments.to_vec();
        if dash.len() % 2 == 1 {
            dash.extend_from_slice(segments);
        }
        self.state.dash = dash;
    }

    fn set_font(&mut self, font: &str) {
        match FontSpec::parse(font) {
            Some(spec) => self.state.font = spec,
            None => tracing::debug!(font, "unparseable font ignored"),
        }
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.text_baseline = baseline;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    fn set_direction(&mut self, direction: Direction) {
        self.state.direction = direction;
    }

    fn set_shadow(&mut self, shadow: Shadow) {
        self.state.shadow = shadow;
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.state.smoothing = enabled;
    }

    fn set_composite_op(&mut self, op: CompositeOp) {
        self.state.composite = op;
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, false);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, true);
    }

    fn draw_image(&mut self, image: &Arc<DecodedImage>, dx: f64, dy: f64) {
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        self.blit(
            image,
            Rect::new(0.0, 0.0, w, h),
            Rect::new(dx, dy, dx + w, dy + h),
        );
    }

    fn draw_image_scaled(&mut self, image: &Arc<DecodedImage>, dx: f64, dy: f64, dw: f64, dh: f64) {
        let (w, h) = (f64::from(image.width), f64::from(image.height));
        self.blit(
            image,
            Rect::new(0.0, 0.0, w, h),
            Rect::new(dx, dy, dx + dw, dy + dh),
        );
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
        self.blit(
            image,
            Rect::new(sx, sy, sx + sw, sy + sh),
            Rect::new(dx, dy, dx + dw, dy + dh),
        );
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.concat(Affine::translate((x, y)));
    }

    fn rotate(&mut self, angle: f64) {
        self.concat(Affine::rotate(angle));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.concat(Affine::scale_non_uniform(x, y));
    }

    fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.concat(Affine::new([a, b, c, d, e, f]));
    }

    fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.pixels.clone(),
            premultiplied: true,
        }
    }
}

fn fill_rule(rule: FillRule) -> Fill {
    match rule {
        FillRule::NonZero => Fill::NonZero,
        FillRule::EvenOdd => Fill::EvenOdd,
    }
}

/// Gradient stops sorted by offset; equal offsets keep their given order.
fn sorted_stops(stops: &[ColorStop]) -> Vec<(f32, vello_cpu::peniko::Color)> {
    let mut out: Vec<(f32, vello_cpu::peniko::Color)> = stops
        .iter()
        .filter(|s| s.offset.is_finite())
        .filter_map(|s| {
            let color = parse_css_color(&s.color)?;
            Some((s.offset.clamp(0.0, 1.0) as f32, color))
        })
        .collect();
    out.sort_by(|a, b| a.0.total_cmp(&b.0));
    out
}

fn gradient_paint(gradient: Gradient, stops: &[ColorStop]) -> Option<(PaintType, Affine)> {
    let stops = sorted_stops(stops);
    match stops.as_slice() {
        [] => None,
        [(_, color)] => Some((PaintType::from(*color), Affine::IDENTITY)),
        many => Some((
            PaintType::from(gradient.with_stops(many)),
            Affine::IDENTITY,
        )),
    }
}

fn bordered_premul(image: &DecodedImage, bx: u32, by: u32) -> Vec<u8> {
    if bx == 0 && by == 0 {
        return image.rgba8_premul.as_ref().clone();
    }
    let w = image.width as usize;
    let ow = w + 2 * bx as usize;
    let oh = image.height as usize + 2 * by as usize;
    let mut out = vec![0u8; ow * oh * 4];
    for (y, row) in image.rgba8_premul.chunks_exact(w * 4).enumerate() {
        let start = ((y + by as usize) * ow + bx as usize) * 4;
        out[start..start + w * 4].copy_from_slice(row);
    }
    out
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> StageResult<Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StageError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StageError::validation("pixmap height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(StageError::validation("pixmap has zero area"));
    }
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StageError::validation("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
