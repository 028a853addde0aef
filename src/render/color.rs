use vello_cpu::peniko::Color;

use crate::foundation::core::Rgba8Premul;

/// Parse a CSS color string (`#rgb`, `rgb()`, `hsl()`, named colors, `transparent`, ...).
///
/// Returns `None` for strings a canvas would ignore.
pub fn parse_css_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let dynamic = vello_cpu::peniko::color::parse_color(s).ok()?;
    Some(dynamic.to_alpha_color())
}

/// Straight-alpha RGBA8 of a color.
pub fn color_to_rgba8(c: Color) -> [u8; 4] {
    let rgba = c.to_rgba8();
    [rgba.r, rgba.g, rgba.b, rgba.a]
}

/// Premultiplied RGBA8 of a color.
pub fn color_to_premul(c: Color) -> Rgba8Premul {
    let [r, g, b, a] = color_to_rgba8(c);
    Rgba8Premul::from_straight_rgba(r, g, b, a)
}

#[cfg(test)]
#[path = "../../tests/unit/render/color.rs"]
mod tests;
