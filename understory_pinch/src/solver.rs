// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pan clamping and gesture-end correction.

use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::config::ZoomSettle;
use crate::math;
use crate::model::TransformModel;

/// Clamps a pan `delta` so that the image edges never move inward past the
/// viewport edges.
///
/// `bounds` is the displayed image rectangle before the pan. Along an axis
/// where the image is smaller than the viewport the delta is zeroed.
#[must_use]
pub fn clamp_pan(bounds: Rect, viewport: Size, delta: Vec2) -> Vec2 {
    Vec2::new(
        clamp_axis(bounds.x0, bounds.x1, viewport.width, delta.x),
        clamp_axis(bounds.y0, bounds.y1, viewport.height, delta.y),
    )
}

fn clamp_axis(min: f64, max: f64, extent: f64, delta: f64) -> f64 {
    if max - min < extent {
        0.0
    } else if min + delta > 0.0 {
        // Only the part of the move that brings the edge back to 0 is allowed.
        if min < 0.0 { -min } else { 0.0 }
    } else if max + delta < extent {
        if max > extent { extent - max } else { 0.0 }
    } else {
        delta
    }
}

/// Translation that brings `bounds` into a valid resting position.
///
/// Axes smaller than the viewport are centered; larger axes snap to the
/// nearer viewport edge if an edge has moved inward.
#[must_use]
pub fn settle_offset(bounds: Rect, viewport: Size) -> Vec2 {
    Vec2::new(
        settle_axis(bounds.x0, bounds.x1, viewport.width),
        settle_axis(bounds.y0, bounds.y1, viewport.height),
    )
}

fn settle_axis(min: f64, max: f64, extent: f64) -> f64 {
    if max - min < extent {
        extent * 0.5 - (max + min) * 0.5
    } else if min > 0.0 {
        -min
    } else if max < extent {
        extent - max
    } else {
        0.0
    }
}

/// The correction computed when a pinch ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleCorrection {
    /// Scale applied about the anchor after the current outer transform.
    ///
    /// `f64::INFINITY` when the outer transform had collapsed; `target` is
    /// then a plain reset to fit.
    pub scale_post: f64,
    /// Translation applied after the scale.
    pub offset: Vec2,
    /// Outer transform the correction animates to.
    pub target: Affine,
}

impl ScaleCorrection {
    /// Whether the correction moves anything at all.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.scale_post != 1.0 || self.offset != Vec2::ZERO
    }

    /// `true` if the image ended up smaller than its resting size and had to
    /// be scaled up.
    ///
    /// A `scale_post` of exactly `1.0` counts as over-zoomed.
    #[must_use]
    pub fn was_under_zoomed(&self) -> bool {
        self.scale_post > 1.0
    }
}

/// Computes the minimal correction that puts `model` back into range.
///
/// `anchor` is the last pinch midpoint: scale corrections are applied about it
/// so the content under the fingers moves as little as possible. A degenerate
/// outer layer (zero, negative or non-finite scale) is corrected back to
/// identity. Returns `None` when the model is not ready.
#[must_use]
pub fn scale_end(
    model: &TransformModel,
    anchor: Point,
    max_scale: f64,
    settle: ZoomSettle,
) -> Option<ScaleCorrection> {
    let image = model.image_size().filter(|_| model.is_ready())?;
    let outer = model.outer_transform();
    let current = model.current_transform();
    let current_scale = math::uniform_scale(&current);
    let outer_scale = math::uniform_scale(&outer);
    if !(outer_scale > 0.0 && outer_scale.is_finite()) {
        return Some(ScaleCorrection {
            scale_post: f64::INFINITY,
            offset: Vec2::ZERO,
            target: Affine::IDENTITY,
        });
    }

    let mut scale_post = 1.0;
    if current_scale > max_scale {
        scale_post = max_scale / current_scale;
    }
    let over_max = scale_post != 1.0;
    // Never smaller than fit-center.
    if outer_scale * scale_post < 1.0 {
        scale_post = 1.0 / outer_scale;
    }
    // Zoom within range snaps back to fit unless the caller keeps it.
    if settle == ZoomSettle::SnapToFit && !over_max && outer_scale * scale_post > 1.0 {
        scale_post = 1.0 / outer_scale;
    }

    let trial = math::post_scale_about(current, scale_post, anchor);
    let bounds = trial.transform_rect_bbox(image.to_rect());
    let offset = settle_offset(bounds, model.viewport_size());
    let target = math::post_translate(math::post_scale_about(outer, scale_post, anchor), offset);

    Some(ScaleCorrection {
        scale_post,
        offset,
        target,
    })
}
