use super::*;

#[test]
fn default_font_parses() {
    assert_eq!(FontSpec::parse(DEFAULT_FONT), Some(FontSpec::default()));
}

#[test]
fn parses_full_shorthand() {
    let f = FontSpec::parse(r#"italic small-caps bold 12pt/1.5 "Fira Sans", serif"#).unwrap();
    assert_eq!(f.style, "italic");
    assert_eq!(f.weight, 700);
    assert!((f.size_px - 16.0).abs() < 1e-9);
    assert_eq!(f.families, vec!["Fira Sans".to_owned(), "serif".to_owned()]);
}

#[test]
fn parses_units_and_keywords() {
    assert_eq!(FontSpec::parse("2em monospace").unwrap().size_px, 20.0);
    assert_eq!(FontSpec::parse("150% monospace").unwrap().size_px, 15.0);
    assert_eq!(FontSpec::parse("x-large serif").unwrap().size_px, 24.0);
    assert_eq!(FontSpec::parse("300 14px serif").unwrap().weight, 300);
    assert_eq!(FontSpec::parse("14px / 2 serif").unwrap().families, vec!["serif".to_owned()]);
}

#[test]
fn rejects_invalid_shorthand() {
    assert_eq!(FontSpec::parse(""), None);
    assert_eq!(FontSpec::parse("bold"), None);
    assert_eq!(FontSpec::parse("12px"), None);
    assert_eq!(FontSpec::parse("twelve serif"), None);
}

#[test]
fn anchor_follows_direction() {
    assert_eq!(Anchor::resolve(TextAlign::Start, Direction::Ltr), Anchor::Left);
    assert_eq!(Anchor::resolve(TextAlign::Start, Direction::Rtl), Anchor::Right);
    assert_eq!(Anchor::resolve(TextAlign::End, Direction::Inherit), Anchor::Right);
    assert_eq!(Anchor::resolve(TextAlign::End, Direction::Rtl), Anchor::Left);
    assert_eq!(Anchor::resolve(TextAlign::Center, Direction::Rtl), Anchor::Center);
    assert_eq!(Anchor::resolve(TextAlign::Left, Direction::Rtl), Anchor::Left);
}

#[test]
fn svg_snippet_escapes_text_and_sets_layout() {
    let svg = text_svg("a<b & \"c\"", &FontSpec::default(), Anchor::Center, TextBaseline::Top);
    assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
    assert!(svg.contains(r#"text-anchor="middle""#));
    assert!(svg.contains(r#"dominant-baseline="text-before-edge""#));
    assert!(svg.contains(r#"font-size="10""#));
}

#[test]
fn blank_text_has_no_outline() {
    let book = FontBook::new(None);
    let out = text_outline("   ", &FontSpec::default(), Anchor::Left, TextBaseline::Alphabetic, &book)
        .unwrap();
    assert!(out.is_none());
}
