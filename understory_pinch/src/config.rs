// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning values and the max-scale policy hook.

use kurbo::Size;

/// Default upper bound for the effective image scale.
pub const DEFAULT_MAX_SCALE: f64 = 4.0;

/// Lowest effective max scale; misconfigured policies are clamped up to this.
pub const MIN_MAX_SCALE: f64 = 1.0;

/// How a pinch settles once the last pointer is lifted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ZoomSettle {
    /// Animate the outer layer back to the fit-center scale, unless the image
    /// was zoomed past the max scale, in which case it settles at the max.
    #[default]
    SnapToFit,
    /// Keep the pinched zoom level, only correcting over-zoom and edges.
    KeepZoom,
}

/// Policy hook for the maximum effective scale of the image.
///
/// The effective scale is the fit-center scale multiplied by the user's zoom.
pub trait ScalePolicy {
    /// Maximum effective scale for an image of `image` size shown in a
    /// `viewport` sized view.
    fn max_scale(&self, image: Size, viewport: Size) -> f64 {
        let _ = (image, viewport);
        DEFAULT_MAX_SCALE
    }
}

/// A [`ScalePolicy`] with a constant max scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedMaxScale(pub f64);

impl Default for FixedMaxScale {
    fn default() -> Self {
        Self(DEFAULT_MAX_SCALE)
    }
}

impl ScalePolicy for FixedMaxScale {
    fn max_scale(&self, _image: Size, _viewport: Size) -> f64 {
        self.0
    }
}

/// Clamps a policy result into the usable range.
pub(crate) fn sanitize_max_scale(raw: f64) -> f64 {
    if raw.is_finite() && raw > MIN_MAX_SCALE {
        raw
    } else {
        MIN_MAX_SCALE
    }
}

/// Parameters of the vertical drag-to-dismiss gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DismissConfig {
    /// Whether single-pointer drags on a non-pannable image dismiss it.
    pub enabled: bool,
    /// Vertical speed (units per second) that turns a drag into a fling-out.
    pub fling_out_speed: f64,
    /// Offset a fling-out travels to before the dismiss is requested.
    pub fling_out_distance: f64,
    /// Duration of the spring back to rest, in milliseconds.
    pub spring_back_ms: f64,
    /// Fraction of half the viewport height past which a release dismisses.
    pub commit_ratio: f64,
    /// Lowest alpha reported while dragging.
    pub min_alpha: f64,
}

impl Default for DismissConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fling_out_speed: 3200.0,
            fling_out_distance: 2000.0,
            spring_back_ms: 200.0,
            commit_ratio: 2.0 / 3.0,
            min_alpha: 0.5,
        }
    }
}

/// Tuning for a [`PinchView`](crate::PinchView).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchConfig {
    /// Duration of the gesture-end scale correction, in milliseconds.
    pub scale_animation_ms: f64,
    /// Per-tick multiplier applied to fling velocity.
    pub fling_damping: f64,
    /// Per-tick speed under which a fling stops.
    pub fling_stop_speed: f64,
    /// Animation ticks per second; used to convert velocities to per-tick.
    pub frames_per_second: f64,
    /// Longest press, in milliseconds, that still counts as a tap.
    pub tap_timeout_ms: u64,
    /// Largest displacement that still counts as a tap.
    pub touch_slop: f64,
    /// Drag-to-dismiss parameters.
    pub dismiss: DismissConfig,
    /// Gesture-end zoom policy.
    pub zoom_settle: ZoomSettle,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            scale_animation_ms: 200.0,
            fling_damping: 0.9,
            fling_stop_speed: 1.0,
            frames_per_second: 60.0,
            tap_timeout_ms: 80,
            touch_slop: 8.0,
            dismiss: DismissConfig::default(),
            zoom_settle: ZoomSettle::default(),
        }
    }
}
