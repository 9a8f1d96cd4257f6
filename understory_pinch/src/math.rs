// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small geometry helpers over Kurbo types.
//!
//! Matrices follow Kurbo's convention: `a * b` applies `b` first. Helpers named
//! `post_*` apply their operation *after* the given matrix, so
//! `post_translate(m, v)` is `Affine::translate(v) * m`.

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Midpoint of the segment between two points.
#[must_use]
pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Uniform scale of an affine matrix.
///
/// Only the x scale coefficient is read. Every matrix produced by this crate
/// is scale + translate with equal x/y scale, so this is the magnification.
#[must_use]
pub fn uniform_scale(m: &Affine) -> f64 {
    m.as_coeffs()[0]
}

/// Maps `pt` through the inverse of `m`.
///
/// Returns `None` when `m` is singular.
#[must_use]
pub fn inverse_map_point(m: &Affine, pt: Point) -> Option<Point> {
    if m.determinant().abs() < SINGULAR_EPSILON {
        return None;
    }
    Some(m.inverse() * pt)
}

/// Uniform scale by `s` about `center`.
#[must_use]
pub fn scale_about(s: f64, center: Point) -> Affine {
    let c = center.to_vec2();
    Affine::translate(c) * Affine::scale(s) * Affine::translate(-c)
}

/// Applies a translation after `m`.
#[must_use]
pub fn post_translate(m: Affine, delta: Vec2) -> Affine {
    Affine::translate(delta) * m
}

/// Applies a uniform scale about `center` after `m`.
#[must_use]
pub fn post_scale_about(m: Affine, s: f64, center: Point) -> Affine {
    scale_about(s, center) * m
}

/// Fit-center matrix mapping a `src` sized rectangle at the origin into a
/// `dst` sized rectangle at the origin.
///
/// The source is uniformly scaled to be fully contained and then centered.
/// Returns `None` if either size has no area.
#[must_use]
pub fn fit_center(src: Size, dst: Size) -> Option<Affine> {
    if !has_area(src) || !has_area(dst) {
        return None;
    }
    let s = (dst.width / src.width).min(dst.height / src.height);
    let tx = (dst.width - src.width * s) * 0.5;
    let ty = (dst.height - src.height * s) * 0.5;
    Some(Affine::translate((tx, ty)) * Affine::scale(s))
}

/// Returns `true` for finite sizes with strictly positive width and height.
#[must_use]
pub fn has_area(size: Size) -> bool {
    size.width > 0.0 && size.height > 0.0 && size.width.is_finite() && size.height.is_finite()
}

/// Linear interpolation between two scalars.
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Component-wise linear interpolation of all six matrix coefficients.
///
/// `t == 1.0` returns `end` exactly.
#[must_use]
pub fn lerp_affine(start: Affine, end: Affine, t: f64) -> Affine {
    if t >= 1.0 {
        return end;
    }
    let s = start.as_coeffs();
    let e = end.as_coeffs();
    let mut out = [0.0; 6];
    for (i, c) in out.iter_mut().enumerate() {
        *c = lerp(s[i], e[i], t);
    }
    Affine::new(out)
}

/// Interpolates the four edges of a rectangle independently.
///
/// `t == 1.0` returns `end` exactly.
#[must_use]
pub fn lerp_rect(start: Rect, end: Rect, t: f64) -> Rect {
    if t >= 1.0 {
        return end;
    }
    Rect::new(
        lerp(start.x0, end.x0, t),
        lerp(start.y0, end.y0, t),
        lerp(start.x1, end.x1, t),
        lerp(start.y1, end.y1, t),
    )
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Point, Rect, Size, Vec2};

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn inverse_round_trips_points() {
        let m = Affine::translate((13.0, -7.5)) * Affine::scale(2.5);
        for p in [
            Point::new(0.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(-333.25, 1e4),
        ] {
            let back = inverse_map_point(&m, m * p).unwrap();
            assert!(close(back.x, p.x), "x mismatch for {p:?}");
            assert!(close(back.y, p.y), "y mismatch for {p:?}");
        }
    }

    #[test]
    fn inverse_of_singular_matrix_is_none() {
        assert_eq!(inverse_map_point(&Affine::scale(0.0), Point::ORIGIN), None);
    }

    #[test]
    fn fit_center_square_into_smaller_square() {
        let m = fit_center(Size::new(1000.0, 1000.0), Size::new(500.0, 500.0)).unwrap();
        assert!(close(uniform_scale(&m), 0.5));
        let bounds = m.transform_rect_bbox(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        assert_eq!(bounds, Rect::new(0.0, 0.0, 500.0, 500.0));
    }

    #[test]
    fn fit_center_letterboxes_wide_image() {
        let m = fit_center(Size::new(200.0, 100.0), Size::new(100.0, 100.0)).unwrap();
        let bounds = m.transform_rect_bbox(Rect::new(0.0, 0.0, 200.0, 100.0));
        assert!(close(bounds.y0, 25.0));
        assert!(close(bounds.y1, 75.0));
        assert!(close(bounds.width(), 100.0));
    }

    #[test]
    fn fit_center_rejects_empty_sizes() {
        assert!(fit_center(Size::ZERO, Size::new(10.0, 10.0)).is_none());
        assert!(fit_center(Size::new(10.0, 10.0), Size::new(10.0, 0.0)).is_none());
    }

    #[test]
    fn scale_about_keeps_center_fixed() {
        let c = Point::new(40.0, -12.0);
        let moved = scale_about(3.0, c) * c;
        assert!(close(moved.x, c.x));
        assert!(close(moved.y, c.y));
    }

    #[test]
    fn post_ops_apply_after_matrix() {
        let m = Affine::scale(2.0);
        let p = post_translate(m, Vec2::new(5.0, 0.0)) * Point::new(1.0, 1.0);
        assert_eq!(p, Point::new(7.0, 2.0));
        let q = post_scale_about(m, 2.0, Point::ORIGIN) * Point::new(1.0, 1.0);
        assert_eq!(q, Point::new(4.0, 4.0));
    }

    #[test]
    fn distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(30.0, 40.0);
        assert!(close(distance(a, b), 50.0));
        assert_eq!(midpoint(a, b), Point::new(15.0, 20.0));
    }

    #[test]
    fn lerp_hits_endpoints() {
        let a = Affine::scale(1.0);
        let b = Affine::translate((10.0, 20.0)) * Affine::scale(3.0);
        assert_eq!(lerp_affine(a, b, 0.0), a);
        assert_eq!(lerp_affine(a, b, 1.0), b);
        let r = lerp_rect(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 200.0, 200.0),
            0.5,
        );
        assert_eq!(r, Rect::new(0.0, 0.0, 150.0, 150.0));
    }
}
