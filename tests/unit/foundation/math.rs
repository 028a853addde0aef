use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(100, 128), 50);
}

#[test]
fn singular_transforms_are_detected() {
    assert!(!affine_is_singular(kurbo::Affine::IDENTITY));
    assert!(affine_is_singular(kurbo::Affine::scale_non_uniform(0.0, 1.0)));
    assert!(affine_is_singular(kurbo::Affine::translate((f64::NAN, 0.0))));
}
