use super::*;

fn one(dst: [u8; 4], src: [u8; 4], op: CompositeOp) -> [u8; 4] {
    let mut d = dst.to_vec();
    composite_layer(&mut d, &src, op, 1.0, None).unwrap();
    [d[0], d[1], d[2], d[3]]
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

#[test]
fn source_over_replaces_with_opaque_source() {
    assert_eq!(one(BLUE, RED, CompositeOp::SourceOver), RED);
    assert_eq!(one(BLUE, CLEAR, CompositeOp::SourceOver), BLUE);
}

#[test]
fn porter_duff_operators() {
    assert_eq!(one(BLUE, RED, CompositeOp::DestinationOver), BLUE);
    assert_eq!(one(CLEAR, RED, CompositeOp::DestinationOver), RED);
    assert_eq!(one(CLEAR, RED, CompositeOp::SourceIn), CLEAR);
    assert_eq!(one(BLUE, RED, CompositeOp::SourceIn), RED);
    assert_eq!(one(BLUE, RED, CompositeOp::SourceOut), CLEAR);
    assert_eq!(one(BLUE, RED, CompositeOp::DestinationOut), CLEAR);
    assert_eq!(one(BLUE, RED, CompositeOp::Xor), CLEAR);
    assert_eq!(one(BLUE, CLEAR, CompositeOp::Copy), CLEAR);
    assert_eq!(one(BLUE, CLEAR, CompositeOp::DestinationIn), CLEAR);
    assert_eq!(one(BLUE, RED, CompositeOp::Lighter), [255, 0, 255, 255]);
}

#[test]
fn separable_blends() {
    let gray = [128, 128, 128, 255];
    let white = [255, 255, 255, 255];
    assert_eq!(one(white, gray, CompositeOp::Multiply), gray);
    assert_eq!(one(RED, BLUE, CompositeOp::Screen), [255, 0, 255, 255]);
    assert_eq!(one(RED, BLUE, CompositeOp::Darken), [0, 0, 0, 255]);
    assert_eq!(one(RED, BLUE, CompositeOp::Lighten), [255, 0, 255, 255]);
    assert_eq!(one(white, white, CompositeOp::Difference), [0, 0, 0, 255]);
}

#[test]
fn luminosity_of_white_over_color_is_white() {
    let white = [255, 255, 255, 255];
    assert_eq!(one(RED, white, CompositeOp::Luminosity), white);
}

#[test]
fn global_alpha_scales_source() {
    let mut d = CLEAR.to_vec();
    composite_layer(&mut d, &RED, CompositeOp::SourceOver, 0.5, None).unwrap();
    assert!((127..=128).contains(&d[3]));
    assert!((127..=128).contains(&d[0]));
}

#[test]
fn clip_mask_limits_the_effect() {
    let mut d = [BLUE, BLUE].concat();
    let s = [RED, RED].concat();
    composite_layer(&mut d, &s, CompositeOp::Copy, 1.0, Some(&[255, 0])).unwrap();
    assert_eq!(&d[0..4], &RED);
    assert_eq!(&d[4..8], &BLUE);
}

#[test]
fn erase_clears_covered_pixels() {
    let mut d = [BLUE, BLUE].concat();
    erase_layer(&mut d, &[255, 0], None).unwrap();
    assert_eq!(&d[0..4], &CLEAR);
    assert_eq!(&d[4..8], &BLUE);
}

#[test]
fn mismatched_lengths_are_rejected() {
    let mut d = vec![0u8; 8];
    assert!(composite_layer(&mut d, &[0u8; 4], CompositeOp::SourceOver, 1.0, None).is_err());
    assert!(composite_layer(&mut d, &[0u8; 8], CompositeOp::SourceOver, 1.0, Some(&[0])).is_err());
}
