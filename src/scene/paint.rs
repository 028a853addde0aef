use crate::foundation::core::AssetId;
use crate::scene::style::Repetition;

/// One gradient color stop.
///
/// The host historically sent the offset under `value`; both names are accepted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorStop {
    /// Position along the gradient, expected in `[0, 1]`.
    #[serde(alias = "value")]
    pub offset: f64,
    /// CSS color string.
    pub color: String,
}

impl ColorStop {
    /// Construct a stop.
    pub fn new(offset: f64, color: impl Into<String>) -> Self {
        Self {
            offset,
            color: color.into(),
        }
    }
}

/// Abstract fill/stroke specification as it arrives on the wire.
///
/// Wire shape: `{ "type": "PLAIN" | "PATTERN" | "LINEAR_GRADIENT" | "RADIAL_GRADIENT", "value": .. }`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintSpec {
    /// A CSS color string, passed through untouched.
    Plain(String),
    /// An image pattern over a loaded asset.
    Pattern {
        /// Asset id on the owning surface.
        id: AssetId,
        /// Tiling mode.
        #[serde(default)]
        repetition: Repetition,
    },
    /// Linear gradient from `(x1, y1)` to `(x2, y2)`.
    LinearGradient {
        /// Start x.
        x1: f64,
        /// Start y.
        y1: f64,
        /// End x.
        x2: f64,
        /// End y.
        y2: f64,
        /// Stops, applied in this order.
        #[serde(default)]
        stops: Vec<ColorStop>,
    },
    /// Two-circle radial gradient.
    RadialGradient {
        /// Start circle center x.
        x1: f64,
        /// Start circle center y.
        y1: f64,
        /// Start circle radius.
        r1: f64,
        /// End circle center x.
        x2: f64,
        /// End circle center y.
        y2: f64,
        /// End circle radius.
        r2: f64,
        /// Stops, applied in this order.
        #[serde(default)]
        stops: Vec<ColorStop>,
    },
}

impl PaintSpec {
    /// Solid color shorthand.
    pub fn plain(color: impl Into<String>) -> Self {
        Self::Plain(color.into())
    }

    /// Wire tag of this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Plain(_) => "PLAIN",
            Self::Pattern { .. } => "PATTERN",
            Self::LinearGradient { .. } => "LINEAR_GRADIENT",
            Self::RadialGradient { .. } => "RADIAL_GRADIENT",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/paint.rs"]
mod tests;
