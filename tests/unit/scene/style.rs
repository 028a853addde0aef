use super::*;

const COMPOSITE_KEYWORDS: [&str; 26] = [
    "source-over",
    "source-in",
    "source-out",
    "source-atop",
    "destination-over",
    "destination-in",
    "destination-out",
    "destination-atop",
    "lighter",
    "copy",
    "xor",
    "multiply",
    "screen",
    "overlay",
    "darken",
    "lighten",
    "color-dodge",
    "color-burn",
    "hard-light",
    "soft-light",
    "difference",
    "exclusion",
    "hue",
    "saturation",
    "color",
    "luminosity",
];

#[test]
fn composite_keywords_match_the_canvas_names() {
    for kw in COMPOSITE_KEYWORDS {
        let json = serde_json::json!(kw);
        let op: CompositeOp = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(serde_json::to_value(op).unwrap(), json);
    }
}

#[test]
fn unknown_keyword_is_an_error() {
    let err = serde_json::from_str::<LineCap>("\"pointy\"").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("pointy"), "{msg}");
    assert!(msg.contains("butt"), "{msg}");

    let json: Result<LineJoin, _> = serde_json::from_str("\"sharp\"");
    assert!(json.is_err());
}

#[test]
fn empty_repetition_means_repeat() {
    let r: Repetition = serde_json::from_str("\"\"").unwrap();
    assert_eq!(r, Repetition::Repeat);
    assert!(r.repeats_x() && r.repeats_y());

    let r: Repetition = serde_json::from_str("\"repeat-y\"").unwrap();
    assert!(!r.repeats_x() && r.repeats_y());
    assert_eq!(serde_json::to_string(&Repetition::NoRepeat).unwrap(), "\"no-repeat\"");
}

#[test]
fn defaults_match_canvas() {
    assert_eq!(FillRule::default(), FillRule::NonZero);
    assert_eq!(LineCap::default(), LineCap::Butt);
    assert_eq!(LineJoin::default(), LineJoin::Miter);
    assert_eq!(TextAlign::default(), TextAlign::Start);
    assert_eq!(TextBaseline::default(), TextBaseline::Alphabetic);
    assert_eq!(CompositeOp::default(), CompositeOp::SourceOver);
    assert_eq!(
        serde_json::to_string(&FillRule::EvenOdd).unwrap(),
        "\"evenodd\""
    );
    assert_eq!(
        serde_json::to_string(&TextBaseline::Ideographic).unwrap(),
        "\"ideographic\""
    );
}
