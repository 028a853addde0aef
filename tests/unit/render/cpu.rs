use super::*;

fn ctx(w: u32, h: u32) -> RasterContext {
    RasterContext::new(Size::new(w, h), Arc::new(FontBook::new(None))).unwrap()
}

fn px(c: &RasterContext, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * c.width() + x) * 4) as usize;
    let p = c.pixels_premul();
    [p[i], p[i + 1], p[i + 2], p[i + 3]]
}

fn color(s: &str) -> Paint {
    Paint::Color(s.to_owned())
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

#[test]
fn new_surface_is_transparent() {
    let c = ctx(3, 2);
    assert_eq!(c.snapshot().data, vec![0u8; 24]);
    assert!(RasterContext::new(Size::new(70_000, 1), Arc::new(FontBook::new(None))).is_err());
}

#[test]
fn fill_rect_covers_exact_pixels() {
    let mut c = ctx(4, 4);
    c.set_fill_style(color("#ff0000"));
    c.fill_rect(1.0, 1.0, 2.0, 2.0);
    assert_eq!(px(&c, 1, 1), RED);
    assert_eq!(px(&c, 2, 2), RED);
    assert_eq!(px(&c, 0, 0), CLEAR);
    assert_eq!(px(&c, 3, 3), CLEAR);
}

#[test]
fn transforms_apply_to_rects() {
    let mut c = ctx(4, 4);
    c.set_fill_style(color("blue"));
    c.translate(2.0, 2.0);
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    assert_eq!(px(&c, 2, 2), BLUE);
    assert_eq!(px(&c, 0, 0), CLEAR);
}

#[test]
fn unparseable_color_keeps_previous_style() {
    let mut c = ctx(2, 2);
    c.set_fill_style(color("#00f"));
    c.set_fill_style(color("definitely-not-a-color"));
    c.fill_rect(0.0, 0.0, 2.0, 2.0);
    assert_eq!(px(&c, 1, 1), BLUE);
}

#[test]
fn global_alpha_scales_coverage() {
    let mut c = ctx(2, 2);
    c.set_fill_style(color("red"));
    c.set_global_alpha(0.5);
    c.fill_rect(0.0, 0.0, 2.0, 2.0);
    let p = px(&c, 0, 0);
    assert!((126..=129).contains(&p[3]), "{p:?}");
    assert_eq!(p[0], p[3]);
}

#[test]
fn clear_rect_erases() {
    let mut c = ctx(4, 4);
    c.set_fill_style(color("red"));
    c.fill_rect(0.0, 0.0, 4.0, 4.0);
    c.clear_rect(0.0, 0.0, 2.0, 4.0);
    assert_eq!(px(&c, 0, 0), CLEAR);
    assert_eq!(px(&c, 1, 3), CLEAR);
    assert_eq!(px(&c, 3, 0), RED);
}

#[test]
fn path_fill_and_stroke() {
    let mut c = ctx(8, 8);
    c.set_fill_style(color("red"));
    c.begin_path();
    c.rect(0.0, 0.0, 4.0, 4.0);
    c.fill(None);
    assert_eq!(px(&c, 2, 2), RED);
    assert_eq!(px(&c, 6, 6), CLEAR);

    c.set_stroke_style(color("blue"));
    c.set_line_width(2.0);
    c.begin_path();
    c.move_to(0.0, 7.0);
    c.line_to(8.0, 7.0);
    c.stroke();
    assert_eq!(px(&c, 4, 7), BLUE);
    assert_eq!(px(&c, 4, 5), CLEAR);
}

#[test]
fn clip_is_saved_and_restored() {
    let mut c = ctx(4, 4);
    c.set_fill_style(color("red"));
    c.save();
    c.begin_path();
    c.rect(0.0, 0.0, 2.0, 2.0);
    c.clip(None);
    c.fill_rect(0.0, 0.0, 4.0, 4.0);
    assert_eq!(px(&c, 0, 0), RED);
    assert_eq!(px(&c, 3, 3), CLEAR);

    c.restore();
    c.set_fill_style(color("blue"));
    c.fill_rect(3.0, 3.0, 1.0, 1.0);
    assert_eq!(px(&c, 3, 3), BLUE);
}

#[test]
fn restore_brings_back_styles_and_transform() {
    let mut c = ctx(4, 4);
    c.set_fill_style(color("red"));
    c.save();
    c.set_fill_style(color("blue"));
    c.translate(2.0, 2.0);
    c.restore();
    c.restore();
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    assert_eq!(px(&c, 0, 0), RED);
}

#[test]
fn destination_over_draws_behind() {
    let mut c = ctx(2, 1);
    c.set_fill_style(color("red"));
    c.fill_rect(0.0, 0.0, 1.0, 1.0);
    c.set_composite_op(CompositeOp::DestinationOver);
    c.set_fill_style(color("blue"));
    c.fill_rect(0.0, 0.0, 2.0, 1.0);
    assert_eq!(px(&c, 0, 0), RED);
    assert_eq!(px(&c, 1, 0), BLUE);
}

#[test]
fn shadow_is_offset_in_device_space() {
    let mut c = ctx(10, 4);
    c.set_shadow(Shadow {
        offset_x: 5.0,
        offset_y: 0.0,
        blur: 0.0,
        color: "#000000".to_owned(),
    });
    c.set_fill_style(color("red"));
    c.fill_rect(0.0, 0.0, 2.0, 2.0);
    assert_eq!(px(&c, 0, 0), RED);
    assert_eq!(px(&c, 6, 1), [0, 0, 0, 255]);
    assert_eq!(px(&c, 3, 0), CLEAR);
}

fn stops(a: &str, b: &str) -> Vec<ColorStop> {
    vec![ColorStop::new(0.5, a), ColorStop::new(0.5, b)]
}

#[test]
fn gradient_stop_order_is_visible() {
    let mut fwd = ctx(8, 1);
    fwd.set_fill_style(Paint::LinearGradient {
        x0: 0.0,
        y0: 0.0,
        x1: 8.0,
        y1: 0.0,
        stops: stops("red", "blue"),
    });
    fwd.fill_rect(0.0, 0.0, 8.0, 1.0);

    let mut rev = ctx(8, 1);
    rev.set_fill_style(Paint::LinearGradient {
        x0: 0.0,
        y0: 0.0,
        x1: 8.0,
        y1: 0.0,
        stops: stops("blue", "red"),
    });
    rev.fill_rect(0.0, 0.0, 8.0, 1.0);

    assert_eq!(px(&fwd, 1, 0), RED);
    assert_eq!(px(&fwd, 6, 0), BLUE);
    assert_eq!(px(&rev, 1, 0), BLUE);
    assert_eq!(px(&rev, 6, 0), RED);
    assert_ne!(fwd.snapshot(), rev.snapshot());
}

#[test]
fn empty_gradient_paints_nothing() {
    let mut c = ctx(2, 2);
    c.set_fill_style(Paint::LinearGradient {
        x0: 0.0,
        y0: 0.0,
        x1: 2.0,
        y1: 0.0,
        stops: Vec::new(),
    });
    c.fill_rect(0.0, 0.0, 2.0, 2.0);
    assert_eq!(c.snapshot().data, vec![0u8; 16]);
}

fn image(id: &str, w: u32, h: u32, px: [u8; 4]) -> Arc<DecodedImage> {
    Arc::new(DecodedImage::from_premul(
        AssetId::from(id),
        w,
        h,
        px.repeat((w * h) as usize),
    ))
}

#[test]
fn draw_image_blits_at_offset() {
    let mut c = ctx(4, 4);
    c.set_image_smoothing(false);
    c.draw_image(&image("dot", 2, 2, BLUE), 1.0, 1.0);
    assert_eq!(px(&c, 1, 1), BLUE);
    assert_eq!(px(&c, 2, 2), BLUE);
    assert_eq!(px(&c, 0, 0), CLEAR);
    assert_eq!(px(&c, 3, 3), CLEAR);
}

#[test]
fn scaled_and_sliced_images() {
    let mut c = ctx(4, 4);
    c.set_image_smoothing(false);
    let img = image("dot", 1, 1, RED);
    c.draw_image_scaled(&img, 0.0, 0.0, 4.0, 2.0);
    assert_eq!(px(&c, 3, 1), RED);
    assert_eq!(px(&c, 3, 2), CLEAR);

    let mut s = ctx(4, 4);
    s.set_image_smoothing(false);
    s.draw_image_slice(&image("big", 4, 4, BLUE), 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 4.0, 4.0);
    assert_eq!(px(&s, 3, 3), BLUE);
}

#[test]
fn patterns_honour_repetition() {
    let tile = image("tile", 1, 1, RED);

    let mut rep = ctx(4, 4);
    rep.set_image_smoothing(false);
    rep.set_fill_style(Paint::Pattern {
        image: tile.clone(),
        repetition: Repetition::Repeat,
    });
    rep.fill_rect(0.0, 0.0, 4.0, 4.0);
    assert_eq!(px(&rep, 3, 3), RED);

    let mut once = ctx(4, 4);
    once.set_image_smoothing(false);
    once.set_fill_style(Paint::Pattern {
        image: tile,
        repetition: Repetition::NoRepeat,
    });
    once.fill_rect(0.0, 0.0, 4.0, 4.0);
    assert_eq!(px(&once, 0, 0), RED);
    assert_eq!(px(&once, 3, 3), CLEAR);
}

#[test]
fn zero_area_surface_ignores_draws() {
    let mut c = ctx(0, 5);
    c.set_fill_style(color("red"));
    c.fill_rect(0.0, 0.0, 10.0, 10.0);
    c.begin_path();
    c.rect(0.0, 0.0, 1.0, 1.0);
    c.clip(None);
    c.fill(None);
    assert!(c.snapshot().data.is_empty());
}

#[test]
fn negative_arc_radius_fails() {
    let mut c = ctx(2, 2);
    assert!(c.arc(1.0, 1.0, -1.0, 0.0, 1.0, false).is_err());
    assert!(c.arc_to(0.0, 0.0, 1.0, 1.0, -1.0).is_err());
}

#[test]
fn text_with_non_positive_max_width_draws_nothing() {
    let mut c = ctx(20, 20);
    c.fill_text("hello", 0.0, 10.0, Some(0.0));
    assert_eq!(c.snapshot().data, vec![0u8; 20 * 20 * 4]);
}

#[test]
fn extreme_shadow_values_do_not_break_drawing() {
    for (blur, offset) in [(1e10, 0.0), (1e6, 0.0), (0.0, 1e300), (f64::MAX, -1e300)] {
        let mut c = ctx(4, 4);
        c.set_shadow(Shadow {
            offset_x: offset,
            offset_y: offset,
            blur,
            color: "black".to_owned(),
        });
        c.set_fill_style(color("#ff0000"));
        c.fill_rect(1.0, 1.0, 2.0, 2.0);
        assert_eq!(px(&c, 1, 1), RED, "blur {blur} offset {offset}");
    }
}
