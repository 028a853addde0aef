use super::*;

#[test]
fn ids_serialize_as_plain_strings() {
    let id = SurfaceId::from("main");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"main\"");
    let back: AssetId = serde_json::from_str("\"hero\"").unwrap();
    assert_eq!(back.as_str(), "hero");
    assert_eq!(back.to_string(), "hero");
}

#[test]
fn premul_and_back_is_close() {
    let p = Rgba8Premul::from_straight_rgba(200, 100, 50, 128);
    assert_eq!(p.a, 128);
    assert_eq!(p.r, ((200u16 * 128 + 127) / 255) as u8);

    let s = p.to_straight_rgba();
    for (got, want) in s.iter().zip([200u8, 100, 50, 128]) {
        assert!((i16::from(*got) - i16::from(want)).abs() <= 1, "{s:?}");
    }
}

#[test]
fn opaque_and_transparent_are_exact() {
    let p = Rgba8Premul::from_straight_rgba(12, 34, 56, 255);
    assert_eq!(p.to_straight_rgba(), [12, 34, 56, 255]);
    assert_eq!(Rgba8Premul::transparent().to_straight_rgba(), [0, 0, 0, 0]);
    assert_eq!(Rgba8Premul::from_array(p.to_array()), p);
}

#[test]
fn size_area() {
    assert_eq!(Size::new(3, 4).area(), 12);
    assert_eq!(Size::new(0, 4).area(), 0);
}
