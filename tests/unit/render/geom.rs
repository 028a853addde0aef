use std::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::{PathEl, Shape};

use super::*;

#[test]
fn line_to_without_subpath_acts_as_move_to() {
    let mut p = PathBuilder::new();
    p.line_to(Affine::IDENTITY, 3.0, 4.0);
    assert_eq!(p.path().elements(), &[PathEl::MoveTo(Point::new(3.0, 4.0))]);
}

#[test]
fn close_reopens_at_subpath_start() {
    let mut p = PathBuilder::new();
    p.move_to(Affine::IDENTITY, 1.0, 1.0);
    p.line_to(Affine::IDENTITY, 5.0, 1.0);
    p.close();
    p.line_to(Affine::IDENTITY, 5.0, 5.0);
    assert_eq!(
        p.path().elements(),
        &[
            PathEl::MoveTo(Point::new(1.0, 1.0)),
            PathEl::LineTo(Point::new(5.0, 1.0)),
            PathEl::ClosePath,
            PathEl::MoveTo(Point::new(1.0, 1.0)),
            PathEl::LineTo(Point::new(5.0, 5.0)),
        ]
    );
}

#[test]
fn points_are_mapped_through_the_transform() {
    let mut p = PathBuilder::new();
    p.rect(Affine::translate((10.0, 20.0)), 0.0, 0.0, 2.0, 3.0);
    let bounds = p.path().bounding_box();
    assert_eq!((bounds.x0, bounds.y0, bounds.x1, bounds.y1), (10.0, 20.0, 12.0, 23.0));
}

#[test]
fn arc_sweep_follows_canvas_rules() {
    assert_eq!(arc_sweep(0.0, TAU, false), TAU);
    assert_eq!(arc_sweep(0.0, 3.0 * TAU, false), TAU);
    assert!((arc_sweep(0.0, -FRAC_PI_2, false) - 3.0 * FRAC_PI_2).abs() < 1e-12);
    assert!((arc_sweep(0.0, FRAC_PI_2, true) + 3.0 * FRAC_PI_2).abs() < 1e-12);
    assert_eq!(arc_sweep(TAU, 0.0, true), -TAU);
    assert_eq!(arc_sweep(1.0, 1.0, false), 0.0);
}

#[test]
fn full_circle_arc_spans_the_disc() {
    let mut p = PathBuilder::new();
    p.arc(Affine::IDENTITY, 10.0, 10.0, 5.0, 0.0, TAU, false).unwrap();
    let b = p.path().bounding_box();
    assert!((b.x0 - 5.0).abs() < 0.1 && (b.x1 - 15.0).abs() < 0.1);
    assert!((b.y0 - 5.0).abs() < 0.1 && (b.y1 - 15.0).abs() < 0.1);
}

#[test]
fn arc_connects_to_existing_subpath() {
    let mut p = PathBuilder::new();
    p.move_to(Affine::IDENTITY, 0.0, 0.0);
    p.arc(Affine::IDENTITY, 10.0, 0.0, 2.0, PI, TAU, false).unwrap();
    let PathEl::LineTo(start) = p.path().elements()[1] else {
        panic!("expected a connecting line");
    };
    assert!((start - Point::new(8.0, 0.0)).hypot() < 1e-9);
}

#[test]
fn negative_radii_are_rejected() {
    let mut p = PathBuilder::new();
    assert!(p.arc(Affine::IDENTITY, 0.0, 0.0, -1.0, 0.0, 1.0, false).is_err());
    assert!(p.arc_to(Affine::IDENTITY, 0.0, 0.0, 1.0, 1.0, -1.0).is_err());
    assert!(p.is_empty());
}

#[test]
fn arc_to_right_angle_corner() {
    let plan = arc_to_plan(
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        2.0,
    )
    .unwrap();
    assert!((plan.t1 - Point::new(8.0, 0.0)).hypot() < 1e-9);
    assert!((plan.t2 - Point::new(10.0, 2.0)).hypot() < 1e-9);
    assert!((plan.center - Point::new(8.0, 2.0)).hypot() < 1e-9);
    assert!((plan.sweep - FRAC_PI_2).abs() < 1e-9);
}

#[test]
fn collinear_arc_to_degenerates_to_line() {
    assert!(arc_to_plan(Point::ZERO, Point::new(5.0, 0.0), Point::new(10.0, 0.0), 2.0).is_none());

    let mut p = PathBuilder::new();
    p.move_to(Affine::IDENTITY, 0.0, 0.0);
    p.arc_to(Affine::IDENTITY, 5.0, 0.0, 10.0, 0.0, 2.0).unwrap();
    assert_eq!(p.path().elements()[1], PathEl::LineTo(Point::new(5.0, 0.0)));
}
