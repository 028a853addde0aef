use std::f64::consts::{PI, TAU};

use kurbo::{Affine, BezPath, Point, Vec2};

use crate::foundation::error::{StageError, StageResult};
use crate::foundation::math::affine_is_singular;

const ARC_TOLERANCE: f64 = 0.05;

/// The current default path, kept in device space.
///
/// Points are mapped through the transform active when they were added, like a canvas path.
#[derive(Clone, Debug, Default)]
pub(crate) struct PathBuilder {
    path: BezPath,
    current: Option<Point>,
    start: Option<Point>,
    needs_move: bool,
}

impl PathBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn path(&self) -> &BezPath {
        &self.path
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.path.elements().is_empty()
    }

    pub(crate) fn begin(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn close(&mut self) {
        if self.current.is_none() || self.needs_move {
            return;
        }
        self.path.close_path();
        self.current = self.start;
        self.needs_move = true;
    }

    pub(crate) fn move_to(&mut self, ctm: Affine, x: f64, y: f64) {
        let p = ctm * Point::new(x, y);
        if !finite(p) {
            return;
        }
        self.path.move_to(p);
        self.current = Some(p);
        self.start = Some(p);
        self.needs_move = false;
    }

    pub(crate) fn line_to(&mut self, ctm: Affine, x: f64, y: f64) {
        let p = ctm * Point::new(x, y);
        if !finite(p) {
            return;
        }
        if !self.ensure_subpath(p) {
            return;
        }
        self.path.line_to(p);
        self.current = Some(p);
    }

    pub(crate) fn quad_to(&mut self, ctm: Affine, cpx: f64, cpy: f64, x: f64, y: f64) {
        let c = ctm * Point::new(cpx, cpy);
        let p = ctm * Point::new(x, y);
        if !finite(c) || !finite(p) {
            return;
        }
        self.ensure_subpath(c);
        self.path.quad_to(c, p);
        self.current = Some(p);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn cubic_to(
        &mut self,
        ctm: Affine,
        cp1x: f64,
        cp1y: f64,
        cp2x: f64,
        cp2y: f64,
        x: f64,
        y: f64,
    ) {
        let c1 = ctm * Point::new(cp1x, cp1y);
        let c2 = ctm * Point::new(cp2x, cp2y);
        let p = ctm * Point::new(x, y);
        if !finite(c1) || !finite(c2) || !finite(p) {
            return;
        }
        self.ensure_subpath(c1);
        self.path.curve_to(c1, c2, p);
        self.current = Some(p);
    }

    pub(crate) fn rect(&mut self, ctm: Affine, x: f64, y: f64, w: f64, h: f64) {
        if ![x, y, w, h].iter().all(|v| v.is_finite()) {
            return;
        }
        self.move_to(ctm, x, y);
        self.line_to(ctm, x + w, y);
        self.line_to(ctm, x + w, y + h);
        self.line_to(ctm, x, y + h);
        self.close();
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn arc(
        &mut self,
        ctm: Affine,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        anticlockwise: bool,
    ) -> StageResult<()> {
        if radius < 0.0 {
            return Err(StageError::invalid_op(
                "ARC",
                format!("radius must be non-negative, got {radius}"),
            ));
        }
        if ![x, y, radius, start_angle, end_angle]
            .iter()
            .all(|v| v.is_finite())
        {
            return Ok(());
        }

        let sweep = arc_sweep(start_angle, end_angle, anticlockwise);
        let center = Point::new(x, y);
        let start = center + Vec2::from_angle(start_angle) * radius;
        let start_dev = ctm * start;
        if self.current.is_some() && !self.needs_move {
            self.path.line_to(start_dev);
        } else {
            self.path.move_to(start_dev);
            self.start = Some(start_dev);
            self.needs_move = false;
        }
        self.current = Some(start_dev);

        if radius == 0.0 || sweep == 0.0 {
            return Ok(());
        }

        let arc = kurbo::Arc::new(center, (radius, radius), start_angle, sweep, 0.0);
        for el in arc.append_iter(ARC_TOLERANCE) {
            self.path.push(ctm * el);
        }
        let end = center + Vec2::from_angle(start_angle + sweep) * radius;
        self.current = Some(ctm * end);
        Ok(())
    }

    pub(crate) fn arc_to(
        &mut self,
        ctm: Affine,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        radius: f64,
    ) -> StageResult<()> {
        if radius < 0.0 {
            return Err(StageError::invalid_op(
                "ARC_TO",
                format!("radius must be non-negative, got {radius}"),
            ));
        }
        if ![x1, y1, x2, y2, radius].iter().all(|v| v.is_finite()) {
            return Ok(());
        }

        if self.current.is_none() {
            self.move_to(ctm, x1, y1);
        }
        let Some(current_dev) = self.current else {
            return Ok(());
        };
        if affine_is_singular(ctm) {
            self.line_to(ctm, x1, y1);
            return Ok(());
        }

        let p0 = ctm.inverse() * current_dev;
        let p1 = Point::new(x1, y1);
        let p2 = Point::new(x2, y2);

        let Some(plan) = arc_to_plan(p0, p1, p2, radius) else {
            self.line_to(ctm, x1, y1);
            return Ok(());
        };

        self.line_to(ctm, plan.t1.x, plan.t1.y);
        let arc = kurbo::Arc::new(plan.center, (radius, radius), plan.start_angle, plan.sweep, 0.0);
        for el in arc.append_iter(ARC_TOLERANCE) {
            self.path.push(ctm * el);
        }
        self.current = Some(ctm * plan.t2);
        Ok(())
    }

    fn ensure_subpath(&mut self, p: Point) -> bool {
        if self.current.is_none() {
            self.path.move_to(p);
            self.current = Some(p);
            self.start = Some(p);
            self.needs_move = false;
            return false;
        }
        if self.needs_move {
            if let Some(start) = self.start {
                self.path.move_to(start);
            }
            self.needs_move = false;
        }
        true
    }
}

/// Signed sweep of a canvas `arc()` call.
pub(crate) fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        let delta = start - end;
        if delta >= TAU {
            -TAU
        } else {
            -delta.rem_euclid(TAU)
        }
    } else {
        let delta = end - start;
        if delta >= TAU {
            TAU
        } else {
            delta.rem_euclid(TAU)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ArcToPlan {
    pub t1: Point,
    pub t2: Point,
    pub center: Point,
    pub start_angle: f64,
    pub sweep: f64,
}

/// Tangent points and arc of `arcTo`, or `None` when it degenerates to a straight line.
pub(crate) fn arc_to_plan(p0: Point, p1: Point, p2: Point, radius: f64) -> Option<ArcToPlan> {
    if radius == 0.0 || p0 == p1 || p1 == p2 {
        return None;
    }
    let v1 = p0 - p1;
    let v2 = p2 - p1;
    let cross = v1.cross(v2);
    if cross.abs() <= 1e-9 * v1.hypot() * v2.hypot() {
        return None;
    }
    let u1 = v1.normalize();
    let u2 = v2.normalize();
    let theta = u1.dot(u2).clamp(-1.0, 1.0).acos();
    let half = theta / 2.0;
    let dist = radius / half.tan();
    let t1 = p1 + u1 * dist;
    let t2 = p1 + u2 * dist;
    let bisector = (u1 + u2).normalize();
    let center = p1 + bisector * (radius / half.sin());

    let a1 = (t1 - center).atan2();
    let a2 = (t2 - center).atan2();
    let mut sweep = a2 - a1;
    while sweep > PI {
        sweep -= TAU;
    }
    while sweep <= -PI {
        sweep += TAU;
    }

    Some(ArcToPlan {
        t1,
        t2,
        center,
        start_angle: a1,
        sweep,
    })
}

/// Map every element of a device-space path through `affine`.
pub(crate) fn transform_path(path: &BezPath, affine: Affine) -> BezPath {
    let mut out = path.clone();
    out.apply_affine(affine);
    out
}

fn finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
#[path = "../../tests/unit/render/geom.rs"]
mod tests;
