//! Canvas keyword values carried by style operations.
//!
//! Every keyword deserializes from (and serializes to) the exact string the canvas API uses. An
//! unrecognised keyword is a decode error, which the interpreter reports as an invalid operation.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Winding rule for `fill` and `clip`.
pub enum FillRule {
    /// `nonzero`.
    #[default]
    NonZero,
    /// `evenodd`.
    EvenOdd,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// `lineCap`.
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Half-disc past the endpoint.
    Round,
    /// Half-square past the endpoint.
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// `lineJoin`.
pub enum LineJoin {
    /// Sharp corner, limited by `miterLimit`.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// `textAlign`.
pub enum TextAlign {
    /// Leading edge for the current direction.
    #[default]
    Start,
    /// Trailing edge for the current direction.
    End,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Centered on the anchor.
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// `textBaseline`.
pub enum TextBaseline {
    /// Top of the em square.
    Top,
    /// Hanging baseline.
    Hanging,
    /// Middle of the em square.
    Middle,
    /// Alphabetic baseline.
    #[default]
    Alphabetic,
    /// Ideographic baseline.
    Ideographic,
    /// Bottom of the em square.
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// `direction`. `inherit` resolves to left-to-right on a detached surface.
pub enum Direction {
    /// Left to right.
    Ltr,
    /// Right to left.
    Rtl,
    /// Whatever the surface inherits.
    #[default]
    Inherit,
}

impl Direction {
    /// True for right-to-left text.
    pub fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Pattern repetition mode.
pub enum Repetition {
    /// Tile both ways. The empty string also means this.
    #[default]
    #[serde(alias = "")]
    Repeat,
    /// Tile along x only.
    RepeatX,
    /// Tile along y only.
    RepeatY,
    /// Draw once.
    NoRepeat,
}

impl Repetition {
    /// Whether the pattern tiles along x.
    pub fn repeats_x(self) -> bool {
        matches!(self, Self::Repeat | Self::RepeatX)
    }

    /// Whether the pattern tiles along y.
    pub fn repeats_y(self) -> bool {
        matches!(self, Self::Repeat | Self::RepeatY)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// `globalCompositeOperation`: Porter-Duff operators, `lighter`, and the blend modes.
pub enum CompositeOp {
    /// Source over destination.
    #[default]
    SourceOver,
    /// Source where the destination is.
    SourceIn,
    /// Source where the destination is not.
    SourceOut,
    /// Source atop the destination.
    SourceAtop,
    /// Destination over source.
    DestinationOver,
    /// Destination where the source is.
    DestinationIn,
    /// Destination where the source is not.
    DestinationOut,
    /// Destination atop the source.
    DestinationAtop,
    /// Additive.
    Lighter,
    /// Source replaces the destination.
    Copy,
    /// Exclusive or of coverage.
    Xor,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Overlay blend.
    Overlay,
    /// Darken blend.
    Darken,
    /// Lighten blend.
    Lighten,
    /// Color dodge blend.
    ColorDodge,
    /// Color burn blend.
    ColorBurn,
    /// Hard light blend.
    HardLight,
    /// Soft light blend.
    SoftLight,
    /// Difference blend.
    Difference,
    /// Exclusion blend.
    Exclusion,
    /// Hue of the source, saturation and luminosity of the destination.
    Hue,
    /// Saturation of the source.
    Saturation,
    /// Hue and saturation of the source.
    Color,
    /// Luminosity of the source.
    Luminosity,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/style.rs"]
mod tests;
