use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use kurbo::{Affine, BezPath, Point};
use usvg::tiny_skia_path::PathSegment;

use crate::foundation::error::StageResult;
use crate::scene::style::{Direction, TextAlign, TextBaseline};

pub(crate) const DEFAULT_FONT: &str = "10px sans-serif";

/// A parsed CSS `font` shorthand.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// `normal`, `italic` or `oblique`.
    pub style: &'static str,
    /// Numeric weight (100..=900).
    pub weight: u16,
    /// Font size in CSS pixels.
    pub size_px: f64,
    /// Family list in priority order, generic names included.
    pub families: Vec<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            style: "normal",
            weight: 400,
            size_px: 10.0,
            families: vec!["sans-serif".to_owned()],
        }
    }
}

impl FontSpec {
    /// Parse a CSS font shorthand such as `italic bold 12px/1.5 "Fira Sans", serif`.
    ///
    /// Returns `None` when the string is not a valid shorthand; a canvas keeps its previous font
    /// in that case.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let mut spec = Self {
            families: Vec::new(),
            ..Self::default()
        };

        let mut rest = s;
        loop {
            let (token, tail) = split_token(rest)?;
            let lower = token.to_ascii_lowercase();
            match lower.as_str() {
                "normal" | "small-caps" => {}
                "italic" | "oblique" => {
                    spec.style = if lower == "italic" { "italic" } else { "oblique" };
                }
                "bold" | "bolder" => spec.weight = 700,
                "lighter" => spec.weight = 300,
                _ if is_numeric_weight(&lower) => {
                    spec.weight = lower.parse().ok()?;
                }
                _ if is_stretch_keyword(&lower) => {}
                _ => {
                    let (size_part, line_height) = match lower.split_once('/') {
                        Some((size, lh)) => (size.to_owned(), Some(lh.to_owned())),
                        None => (lower.clone(), None),
                    };
                    spec.size_px = parse_font_size(&size_part)?;
                    let mut tail = tail;
                    if line_height.as_deref() == Some("") {
                        // `12px / 1.5`
                        let (_, after) = split_token(tail)?;
                        tail = after;
                    } else if tail.trim_start().starts_with('/') {
                        let after_slash = tail.trim_start()[1..].trim_start();
                        let (_, after) = split_token(after_slash)?;
                        tail = after;
                    }
                    spec.families = parse_families(tail)?;
                    return Some(spec);
                }
            }
            rest = tail;
        }
    }

    /// Value for an SVG `font-family` attribute.
    fn family_attr(&self) -> String {
        self.families
            .iter()
            .map(|f| {
                if is_generic_family(f) || !f.contains(' ') {
                    f.clone()
                } else {
                    format!("'{f}'")
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn is_numeric_weight(s: &str) -> bool {
    s.len() == 3
        && s.ends_with("00")
        && matches!(s.as_bytes()[0], b'1'..=b'9')
}

fn is_stretch_keyword(s: &str) -> bool {
    matches!(
        s,
        "ultra-condensed"
            | "extra-condensed"
            | "condensed"
            | "semi-condensed"
            | "semi-expanded"
            | "expanded"
            | "extra-expanded"
            | "ultra-expanded"
    )
}

fn is_generic_family(s: &str) -> bool {
    matches!(
        s,
        "serif" | "sans-serif" | "monospace" | "cursive" | "fantasy" | "system-ui"
    )
}

fn parse_font_size(s: &str) -> Option<f64> {
    let keyword = match s {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        _ => None,
    };
    if keyword.is_some() {
        return keyword;
    }

    // Relative units resolve against the 10px default of a detached canvas.
    let (number, scale, divisor) = if let Some(n) = s.strip_suffix("px") {
        (n, 1.0, 1.0)
    } else if let Some(n) = s.strip_suffix("pt") {
        (n, 4.0, 3.0)
    } else if let Some(n) = s.strip_suffix("rem") {
        (n, 10.0, 1.0)
    } else if let Some(n) = s.strip_suffix("em") {
        (n, 10.0, 1.0)
    } else if let Some(n) = s.strip_suffix('%') {
        (n, 10.0, 100.0)
    } else {
        return None;
    };
    let v: f64 = number.parse().ok()?;
    let px = v * scale / divisor;
    (px.is_finite() && px >= 0.0).then_some(px)
}

fn parse_families(s: &str) -> Option<Vec<String>> {
    let families: Vec<String> = s
        .split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_owned())
        .filter(|f| !f.is_empty())
        .collect();
    if families.is_empty() {
        None
    } else {
        Some(families)
    }
}

/// Horizontal anchor of a text run after resolving `textAlign` against `direction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Anchor {
    Left,
    Center,
    Right,
}

impl Anchor {
    pub(crate) fn resolve(align: TextAlign, direction: Direction) -> Self {
        let rtl = direction.is_rtl();
        match align {
            TextAlign::Left => Self::Left,
            TextAlign::Right => Self::Right,
            TextAlign::Center => Self::Center,
            TextAlign::Start if rtl => Self::Right,
            TextAlign::Start => Self::Left,
            TextAlign::End if rtl => Self::Left,
            TextAlign::End => Self::Right,
        }
    }

    fn svg_anchor(self) -> &'static str {
        match self {
            Self::Left => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }
}

fn svg_baseline(baseline: TextBaseline) -> &'static str {
    match baseline {
        TextBaseline::Top => "text-before-edge",
        TextBaseline::Hanging => "hanging",
        TextBaseline::Middle => "middle",
        TextBaseline::Alphabetic => "alphabetic",
        TextBaseline::Ideographic => "ideographic",
        TextBaseline::Bottom => "text-after-edge",
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Tabs and newlines render as spaces on a canvas.
            '\t' | '\n' | '\r' | '\u{c}' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

/// A one-element SVG document placing `text` at the origin.
pub(crate) fn text_svg(text: &str, font: &FontSpec, anchor: Anchor, baseline: TextBaseline) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1">"#,
            r#"<text x="0" y="0" xml:space="preserve" font-family="{family}" font-size="{size}" "#,
            r#"font-style="{style}" font-weight="{weight}" text-anchor="{anchor}" "#,
            r#"dominant-baseline="{baseline}">{text}</text></svg>"#
        ),
        family = escape_xml(&font.family_attr()),
        size = font.size_px,
        style = font.style,
        weight = font.weight,
        anchor = anchor.svg_anchor(),
        baseline = svg_baseline(baseline),
        text = escape_xml(text),
    )
}

/// Lazily built font database shared by every surface of a backend.
#[derive(Debug, Default)]
pub struct FontBook {
    fonts_dir: Option<PathBuf>,
    db: OnceLock<Arc<usvg::fontdb::Database>>,
}

impl FontBook {
    /// System fonts, plus every font file found in `fonts_dir` when given.
    pub fn new(fonts_dir: Option<PathBuf>) -> Self {
        Self {
            fonts_dir,
            db: OnceLock::new(),
        }
    }

    pub(crate) fn database(&self) -> Arc<usvg::fontdb::Database> {
        self.db
            .get_or_init(|| build_fontdb(self.fonts_dir.as_deref()))
            .clone()
    }
}

fn build_fontdb(fonts_dir: Option<&Path>) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = fonts_dir {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }

            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);
            families.push(usvg::fontdb::Family::Monospace);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

/// Glyph outlines of a text run anchored at the origin, in CSS pixels.
///
/// Returns `None` when nothing would be drawn (empty text, or no usable font).
pub(crate) fn text_outline(
    text: &str,
    font: &FontSpec,
    anchor: Anchor,
    baseline: TextBaseline,
    book: &FontBook,
) -> StageResult<Option<BezPath>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let opts = usvg::Options {
        fontdb: book.database(),
        font_resolver: make_font_resolver(),
        ..Default::default()
    };
    let svg = text_svg(text, font, anchor, baseline);
    let tree = usvg::Tree::from_str(&svg, &opts).with_context(|| "lay out text run")?;

    let mut out = BezPath::new();
    collect_group(tree.root(), &mut out);
    if out.elements().is_empty() {
        return Ok(None);
    }
    Ok(Some(out))
}

fn collect_group(group: &usvg::Group, out: &mut BezPath) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect_group(g, out),
            usvg::Node::Path(p) => append_path(p, out),
            usvg::Node::Text(t) => collect_group(t.flattened(), out),
            usvg::Node::Image(_) => {}
        }
    }
}

fn append_path(path: &usvg::Path, out: &mut BezPath) {
    let t = path.abs_transform();
    let affine = Affine::new([
        f64::from(t.sx),
        f64::from(t.ky),
        f64::from(t.kx),
        f64::from(t.sy),
        f64::from(t.tx),
        f64::from(t.ty),
    ]);
    let pt = |p: usvg::tiny_skia_path::Point| affine * Point::new(f64::from(p.x), f64::from(p.y));

    for seg in path.data().segments() {
        match seg {
            PathSegment::MoveTo(p) => out.move_to(pt(p)),
            PathSegment::LineTo(p) => out.line_to(pt(p)),
            PathSegment::QuadTo(c, p) => out.quad_to(pt(c), pt(p)),
            PathSegment::CubicTo(c1, c2, p) => out.curve_to(pt(c1), pt(c2), pt(p)),
            PathSegment::Close => out.close_path(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
