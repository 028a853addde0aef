use crate::foundation::core::AssetId;
use crate::foundation::error::{StageError, StageResult};
use crate::scene::paint::PaintSpec;
use crate::scene::style::{CompositeOp, Direction, FillRule, LineCap, LineJoin, TextAlign, TextBaseline};

/// One drawing instruction.
///
/// Wire shape: `{ "type": TAG, "value": payload }` where the payload shape is fixed by the tag.
/// Decode untyped input with [`RawOperation::decode`], which maps unknown tags to
/// [`Operation::Unknown`] instead of failing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    tag = "type",
    content = "value",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Operation {
    /// Start a new, empty path.
    BeginPath,
    /// Close the current subpath.
    ClosePath,
    /// Start a subpath at a point.
    MoveTo {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
    /// Straight segment to a point.
    LineTo {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
    /// Circular arc around `(x, y)`. Angles are radians, clockwise from +x in y-down space.
    Arc {
        /// Center x.
        x: f64,
        /// Center y.
        y: f64,
        /// Radius, must be non-negative.
        radius: f64,
        /// Start angle.
        start_angle: f64,
        /// End angle.
        end_angle: f64,
        /// Sweep counter-clockwise instead of clockwise.
        #[serde(default)]
        anticlockwise: bool,
    },
    /// Tangent arc through two control points.
    ArcTo {
        /// First control point x.
        x1: f64,
        /// First control point y.
        y1: f64,
        /// Second control point x.
        x2: f64,
        /// Second control point y.
        y2: f64,
        /// Radius, must be non-negative.
        radius: f64,
    },
    /// Quadratic Bézier segment.
    QuadraticCurveTo {
        /// Control point x.
        cpx: f64,
        /// Control point y.
        cpy: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
    },
    /// Cubic Bézier segment.
    BezierCurveTo {
        /// First control point x.
        cp1x: f64,
        /// First control point y.
        cp1y: f64,
        /// Second control point x.
        cp2x: f64,
        /// Second control point y.
        cp2y: f64,
        /// End x.
        x: f64,
        /// End y.
        y: f64,
    },
    /// Closed rectangular subpath.
    Rect {
        /// Left.
        x: f64,
        /// Top.
        y: f64,
        /// Width (may be negative).
        width: f64,
        /// Height (may be negative).
        height: f64,
    },
    /// Fill the current path; `None` uses the default (non-zero) rule.
    FillPath(Option<FillRule>),
    /// Stroke the current path.
    StrokePath,
    /// Intersect the clip region with the current path.
    Clip(Option<FillRule>),
    /// Fill a rectangle without touching the current path.
    FillRect {
        /// Left.
        x: f64,
        /// Top.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// Stroke a rectangle without touching the current path.
    StrokeRect {
        /// Left.
        x: f64,
        /// Top.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// Clear a rectangle to transparent black.
    ClearRect {
        /// Left.
        x: f64,
        /// Top.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// Set the stroke paint.
    StrokeStyle(PaintSpec),
    /// Set the fill paint.
    FillStyle(PaintSpec),
    /// Set the global alpha in `[0, 1]`.
    GlobalAlpha(f64),
    /// Set the line width.
    LineWidth(f64),
    /// Set the line cap.
    LineCap(LineCap),
    /// Set the line join.
    LineJoin(LineJoin),
    /// Set the miter limit.
    MiterLimit(f64),
    /// Set the dash pattern (empty list disables dashing).
    LineDash(Vec<f64>),
    /// Set the CSS font shorthand.
    Font(String),
    /// Set the text baseline.
    TextBaseline(TextBaseline),
    /// Set the text alignment.
    TextAlign(TextAlign),
    /// Set the text direction.
    TextDirection(Direction),
    /// Set every shadow property at once.
    Shadow {
        /// Horizontal offset in device pixels.
        offset_x: f64,
        /// Vertical offset in device pixels.
        offset_y: f64,
        /// Blur amount.
        blur: f64,
        /// CSS color string.
        color: String,
    },
    /// Toggle image smoothing.
    Smoothing(bool),
    /// Set the composite operation.
    Composition(CompositeOp),
    /// Fill text. A `max_width` of `-1` (or absent) means unconstrained.
    FillText {
        /// Text to draw.
        text: String,
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
        /// Optional maximum advance width.
        #[serde(default)]
        max_width: Option<f64>,
    },
    /// Stroke text. Same `max_width` convention as [`Operation::FillText`].
    StrokeText {
        /// Text to draw.
        text: String,
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
        /// Optional maximum advance width.
        #[serde(default)]
        max_width: Option<f64>,
    },
    /// Blit an asset at its natural size.
    DrawImage {
        /// Asset id.
        id: AssetId,
        /// Destination x.
        x: f64,
        /// Destination y.
        y: f64,
    },
    /// Blit an asset scaled to a destination rectangle.
    ScaleImage {
        /// Asset id.
        id: AssetId,
        /// Destination x.
        x: f64,
        /// Destination y.
        y: f64,
        /// Destination width.
        width: f64,
        /// Destination height.
        height: f64,
    },
    /// Blit a sub-rectangle of an asset into a destination rectangle.
    SliceImage {
        /// Asset id.
        id: AssetId,
        /// Source x.
        sx: f64,
        /// Source y.
        sy: f64,
        /// Source width.
        s_width: f64,
        /// Source height.
        s_height: f64,
        /// Destination x.
        dx: f64,
        /// Destination y.
        dy: f64,
        /// Destination width.
        d_width: f64,
        /// Destination height.
        d_height: f64,
    },
    /// Push the drawing state.
    Save,
    /// Pop the drawing state.
    Restore,
    /// Translate the current transform.
    Translate {
        /// X offset.
        x: f64,
        /// Y offset.
        y: f64,
    },
    /// Rotate the current transform (radians, clockwise).
    Rotate(f64),
    /// Scale the current transform.
    Scale {
        /// Horizontal factor.
        #[serde(rename = "width")]
        x: f64,
        /// Vertical factor.
        #[serde(rename = "height")]
        y: f64,
    },
    /// Multiply the current transform by `[a c e; b d f; 0 0 1]`.
    Transform {
        /// Matrix a.
        a: f64,
        /// Matrix b.
        b: f64,
        /// Matrix c.
        c: f64,
        /// Matrix d.
        d: f64,
        /// Matrix e.
        e: f64,
        /// Matrix f.
        f: f64,
    },
    /// Explicit no-op.
    Skip,
    /// A tag this version does not know. Applying it does nothing.
    #[serde(skip)]
    Unknown {
        /// The unrecognised tag.
        tag: String,
    },
}

const UNIT_TAGS: &[&str] = &[
    "BEGIN_PATH",
    "CLOSE_PATH",
    "STROKE_PATH",
    "SAVE",
    "RESTORE",
    "SKIP",
];

const PAYLOAD_TAGS: &[&str] = &[
    "MOVE_TO",
    "LINE_TO",
    "ARC",
    "ARC_TO",
    "QUADRATIC_CURVE_TO",
    "BEZIER_CURVE_TO",
    "RECT",
    "FILL_PATH",
    "CLIP",
    "FILL_RECT",
    "STROKE_RECT",
    "CLEAR_RECT",
    "STROKE_STYLE",
    "FILL_STYLE",
    "GLOBAL_ALPHA",
    "LINE_WIDTH",
    "LINE_CAP",
    "LINE_JOIN",
    "MITER_LIMIT",
    "LINE_DASH",
    "FONT",
    "TEXT_BASELINE",
    "TEXT_ALIGN",
    "TEXT_DIRECTION",
    "SHADOW",
    "SMOOTHING",
    "COMPOSITION",
    "FILL_TEXT",
    "STROKE_TEXT",
    "DRAW_IMAGE",
    "SCALE_IMAGE",
    "SLICE_IMAGE",
    "TRANSLATE",
    "ROTATE",
    "SCALE",
    "TRANSFORM",
];

impl Operation {
    /// Wire tag of this operation.
    pub fn tag(&self) -> &str {
        match self {
            Self::BeginPath => "BEGIN_PATH",
            Self::ClosePath => "CLOSE_PATH",
            Self::MoveTo { .. } => "MOVE_TO",
            Self::LineTo { .. } => "LINE_TO",
            Self::Arc { .. } => "ARC",
            Self::ArcTo { .. } => "ARC_TO",
            Self::QuadraticCurveTo { .. } => "QUADRATIC_CURVE_TO",
            Self::BezierCurveTo { .. } => "BEZIER_CURVE_TO",
            Self::Rect { .. } => "RECT",
            Self::FillPath(_) => "FILL_PATH",
            Self::StrokePath => "STROKE_PATH",
            Self::Clip(_) => "CLIP",
            Self::FillRect { .. } => "FILL_RECT",
            Self::StrokeRect { .. } => "STROKE_RECT",
            Self::ClearRect { .. } => "CLEAR_RECT",
            Self::StrokeStyle(_) => "STROKE_STYLE",
            Self::FillStyle(_) => "FILL_STYLE",
            Self::GlobalAlpha(_) => "GLOBAL_ALPHA",
            Self::LineWidth(_) => "LINE_WIDTH",
            Self::LineCap(_) => "LINE_CAP",
            Self::LineJoin(_) => "LINE_JOIN",
            Self::MiterLimit(_) => "MITER_LIMIT",
            Self::LineDash(_) => "LINE_DASH",
            Self::Font(_) => "FONT",
            Self::TextBaseline(_) => "TEXT_BASELINE",
            Self::TextAlign(_) => "TEXT_ALIGN",
            Self::TextDirection(_) => "TEXT_DIRECTION",
            Self::Shadow { .. } => "SHADOW",
            Self::Smoothing(_) => "SMOOTHING",
            Self::Composition(_) => "COMPOSITION",
            Self::FillText { .. } => "FILL_TEXT",
            Self::StrokeText { .. } => "STROKE_TEXT",
            Self::DrawImage { .. } => "DRAW_IMAGE",
            Self::ScaleImage { .. } => "SCALE_IMAGE",
            Self::SliceImage { .. } => "SLICE_IMAGE",
            Self::Save => "SAVE",
            Self::Restore => "RESTORE",
            Self::Translate { .. } => "TRANSLATE",
            Self::Rotate(_) => "ROTATE",
            Self::Scale { .. } => "SCALE",
            Self::Transform { .. } => "TRANSFORM",
            Self::Skip => "SKIP",
            Self::Unknown { tag } => tag,
        }
    }

    /// True for tags this version understands.
    pub fn is_known_tag(tag: &str) -> bool {
        UNIT_TAGS.contains(&tag) || PAYLOAD_TAGS.contains(&tag)
    }

    fn unit_from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "BEGIN_PATH" => Self::BeginPath,
            "CLOSE_PATH" => Self::ClosePath,
            "STROKE_PATH" => Self::StrokePath,
            "SAVE" => Self::Save,
            "RESTORE" => Self::Restore,
            "SKIP" => Self::Skip,
            _ => return None,
        })
    }
}

/// An operation exactly as received: a tag plus an untyped payload.
///
/// Batches travel in this form so that one malformed operation fails at its own index instead of
/// rejecting the whole message.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawOperation {
    /// Operation tag.
    #[serde(rename = "type")]
    pub tag: String,
    /// Tag-specific payload; absent payloads decode as `null`.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl RawOperation {
    /// Decode into a typed [`Operation`].
    ///
    /// Unknown tags decode to [`Operation::Unknown`]. A known tag with a malformed payload or an
    /// unrecognised keyword yields [`StageError::InvalidOperation`].
    pub fn decode(&self) -> StageResult<Operation> {
        if let Some(op) = Operation::unit_from_tag(&self.tag) {
            return Ok(op);
        }
        if !PAYLOAD_TAGS.contains(&self.tag.as_str()) {
            return Ok(Operation::Unknown {
                tag: self.tag.clone(),
            });
        }

        let mut obj = serde_json::Map::with_capacity(2);
        obj.insert("type".to_owned(), serde_json::Value::String(self.tag.clone()));
        obj.insert("value".to_owned(), self.value.clone());
        serde_json::from_value(serde_json::Value::Object(obj))
            .map_err(|e| StageError::invalid_op(&self.tag, e.to_string()))
    }
}

impl From<&Operation> for RawOperation {
    fn from(op: &Operation) -> Self {
        let value = match op {
            Operation::Unknown { .. } => serde_json::Value::Null,
            other => serde_json::to_value(other)
                .ok()
                .and_then(|mut v| v.get_mut("value").map(serde_json::Value::take))
                .unwrap_or(serde_json::Value::Null),
        };
        Self {
            tag: op.tag().to_owned(),
            value,
        }
    }
}

impl From<Operation> for RawOperation {
    fn from(op: Operation) -> Self {
        Self::from(&op)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/ops.rs"]
mod tests;
