// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Rect, Size, Vec2};

use crate::math;
use crate::solver;

/// Two-layer transform of an image shown inside a viewport.
///
/// The *inner* layer is derived: it fits the image's intrinsic rectangle into
/// the viewport, centered and uniformly scaled. The *outer* layer is the
/// user-controlled pan/zoom applied on top of it; identity means the image is
/// shown exactly fit-centered.
///
/// The model is "ready" when an image with positive size is attached and the
/// viewport has positive size. Geometry queries on a model that is not ready
/// return identity/empty values.
#[derive(Clone, Debug)]
pub struct TransformModel {
    image: Option<Size>,
    viewport: Size,
    outer: Affine,
    mask: Option<Rect>,
}

impl TransformModel {
    /// Creates a model with no image, an empty viewport and identity outer
    /// transform.
    #[must_use]
    pub fn new() -> Self {
        Self {
            image: None,
            viewport: Size::ZERO,
            outer: Affine::IDENTITY,
            mask: None,
        }
    }

    /// Sets the intrinsic size of the displayed image.
    pub fn attach_image(&mut self, intrinsic: Size) {
        self.image = Some(intrinsic);
    }

    /// Forgets the displayed image; the model stops being ready.
    pub fn detach_image(&mut self) {
        self.image = None;
    }

    /// Intrinsic size of the attached image, if any.
    #[must_use]
    pub fn image_size(&self) -> Option<Size> {
        self.image
    }

    /// Updates the viewport size after a layout change.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Current viewport size.
    #[must_use]
    pub fn viewport_size(&self) -> Size {
        self.viewport
    }

    /// Returns `true` when transforms can be computed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_sizes().is_some()
    }

    /// Fit-center transform from image space into the viewport.
    ///
    /// Identity when the model is not ready; check [`Self::is_ready`] first.
    #[must_use]
    pub fn inner_transform(&self) -> Affine {
        self.ready_sizes()
            .and_then(|(image, viewport)| math::fit_center(image, viewport))
            .unwrap_or(Affine::IDENTITY)
    }

    /// The user pan/zoom layer.
    #[must_use]
    pub fn outer_transform(&self) -> Affine {
        self.outer
    }

    /// Replaces the outer layer wholesale.
    pub fn set_outer_transform(&mut self, outer: Affine) {
        self.outer = outer;
    }

    /// Inner transform followed by the outer transform: image space to viewport.
    #[must_use]
    pub fn current_transform(&self) -> Affine {
        self.outer * self.inner_transform()
    }

    /// The image rectangle as currently displayed, in viewport coordinates.
    ///
    /// [`Rect::ZERO`] when not ready.
    #[must_use]
    pub fn image_bounds(&self) -> Rect {
        match self.image {
            Some(image) if self.is_ready() => self
                .current_transform()
                .transform_rect_bbox(image.to_rect()),
            _ => Rect::ZERO,
        }
    }

    /// Pans the outer layer by `delta`, clamped so the image edges never move
    /// inward past the viewport edges.
    ///
    /// An axis along which the image is smaller than the viewport does not
    /// pan at all. Returns whether either axis moved.
    pub fn scroll_by(&mut self, delta: Vec2) -> bool {
        if !self.is_ready() {
            return false;
        }
        let clamped = solver::clamp_pan(self.image_bounds(), self.viewport, delta);
        if clamped == Vec2::ZERO {
            return false;
        }
        self.outer = math::post_translate(self.outer, clamped);
        true
    }

    /// Whether a vertical pan could move the image at all.
    #[must_use]
    pub fn can_pan_vertically(&self) -> bool {
        self.is_ready() && self.image_bounds().height() > self.viewport.height
    }

    /// Current clip rectangle in viewport coordinates.
    #[must_use]
    pub fn mask(&self) -> Option<Rect> {
        self.mask
    }

    /// Assigns the clip rectangle immediately.
    pub fn set_mask(&mut self, mask: Rect) {
        self.mask = Some(mask);
    }

    /// Resets the outer layer to identity and clears the mask.
    ///
    /// Image and viewport geometry are kept.
    pub fn reset(&mut self) {
        self.outer = Affine::IDENTITY;
        self.mask = None;
    }

    fn ready_sizes(&self) -> Option<(Size, Size)> {
        let image = self.image?;
        (math::has_area(image) && math::has_area(self.viewport)).then_some((image, self.viewport))
    }
}

impl Default for TransformModel {
    fn default() -> Self {
        Self::new()
    }
}
