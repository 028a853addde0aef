use super::*;

#[test]
fn plain_decodes_from_wire() {
    let spec: PaintSpec = serde_json::from_str(r##"{"type":"PLAIN","value":"#ff0000"}"##).unwrap();
    assert_eq!(spec, PaintSpec::plain("#ff0000"));
    assert_eq!(spec.tag(), "PLAIN");
}

#[test]
fn gradient_stops_accept_legacy_value_field() {
    let spec: PaintSpec = serde_json::from_str(
        r#"{"type":"LINEAR_GRADIENT","value":{"x1":0,"y1":0,"x2":10,"y2":0,
            "stops":[{"value":0,"color":"red"},{"offset":1,"color":"blue"}]}}"#,
    )
    .unwrap();
    let PaintSpec::LinearGradient { stops, x2, .. } = spec else {
        panic!("expected linear gradient");
    };
    assert_eq!(x2, 10.0);
    assert_eq!(
        stops,
        vec![ColorStop::new(0.0, "red"), ColorStop::new(1.0, "blue")]
    );
}

#[test]
fn pattern_repetition_defaults_to_repeat() {
    let spec: PaintSpec =
        serde_json::from_str(r#"{"type":"PATTERN","value":{"id":"tile"}}"#).unwrap();
    assert_eq!(
        spec,
        PaintSpec::Pattern {
            id: AssetId::from("tile"),
            repetition: Repetition::Repeat
        }
    );
}

#[test]
fn unknown_paint_type_is_rejected() {
    let res: Result<PaintSpec, _> = serde_json::from_str(r#"{"type":"CONIC","value":{}}"#);
    assert!(res.is_err());
}
