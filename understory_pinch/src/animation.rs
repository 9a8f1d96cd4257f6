// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-driven animations: tweens, flings and the per-track scheduler.
//!
//! Three independent tracks exist:
//! - the *matrix* track, holding either a scale-correction tween or a fling;
//! - the *mask* track, holding a clip rectangle tween;
//! - the *dismiss* track, holding a spring-back or fling-out of the dismiss
//!   offset.
//!
//! Starting an animation replaces whatever ran on the same track; tracks never
//! affect each other.

use kurbo::{Affine, Rect, Vec2};

use crate::gesture::DismissProgress;
use crate::math;
use crate::model::TransformModel;

/// Values that can be linearly interpolated.
pub trait Interpolate: Copy {
    /// Returns the value at fraction `t` in `[0, 1]` between `start` and `end`.
    fn interpolate(start: Self, end: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(start: Self, end: Self, t: f64) -> Self {
        if t >= 1.0 { end } else { math::lerp(start, end, t) }
    }
}

impl Interpolate for Affine {
    fn interpolate(start: Self, end: Self, t: f64) -> Self {
        math::lerp_affine(start, end, t)
    }
}

impl Interpolate for Rect {
    fn interpolate(start: Self, end: Self, t: f64) -> Self {
        math::lerp_rect(start, end, t)
    }
}

impl Interpolate for DismissProgress {
    fn interpolate(start: Self, end: Self, t: f64) -> Self {
        Self {
            offset: f64::interpolate(start.offset, end.offset, t),
            alpha: f64::interpolate(start.alpha, end.alpha, t),
        }
    }
}

/// Linear tween from `start` to `end` over a fixed duration in milliseconds.
///
/// A non-positive or non-finite duration completes on the first advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T> {
    start: T,
    end: T,
    duration_ms: f64,
    elapsed_ms: f64,
}

impl<T: Interpolate> Tween<T> {
    /// Creates a tween that has not advanced yet.
    #[must_use]
    pub fn new(start: T, end: T, duration_ms: f64) -> Self {
        Self {
            start,
            end,
            duration_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Fraction of the duration elapsed, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if !(self.duration_ms > 0.0 && self.duration_ms.is_finite()) {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Current interpolated value.
    #[must_use]
    pub fn value(&self) -> T {
        T::interpolate(self.start, self.end, self.progress())
    }

    /// Advances by `dt_ms` and returns the new value.
    pub fn advance(&mut self, dt_ms: f64) -> T {
        if dt_ms > 0.0 {
            self.elapsed_ms += dt_ms;
        }
        self.value()
    }

    /// Whether the tween has reached `end`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Target value.
    #[must_use]
    pub fn end(&self) -> T {
        self.end
    }
}

/// Inertial pan that decays geometrically every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fling {
    velocity: Vec2,
    damping: f64,
    stop_speed: f64,
}

impl Fling {
    /// Creates a fling from a per-tick velocity.
    #[must_use]
    pub fn new(per_tick: Vec2, damping: f64, stop_speed: f64) -> Self {
        Self {
            velocity: per_tick,
            damping,
            stop_speed,
        }
    }

    /// Creates a fling from a velocity in units per second.
    ///
    /// The velocity is converted once to units per tick.
    #[must_use]
    pub fn from_velocity(
        per_second: Vec2,
        frames_per_second: f64,
        damping: f64,
        stop_speed: f64,
    ) -> Self {
        let fps = if frames_per_second > 0.0 { frames_per_second } else { 60.0 };
        Self::new(per_second / fps, damping, stop_speed)
    }

    /// Current per-tick velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Runs one tick: scrolls by the current velocity via `scroll`, then decays.
    ///
    /// Returns `false` once the fling is over, either because `scroll` could
    /// not move or because the decayed speed dropped below the stop speed.
    pub fn step(&mut self, scroll: impl FnOnce(Vec2) -> bool) -> bool {
        let moved = scroll(self.velocity);
        self.velocity *= self.damping;
        moved && self.velocity.hypot() >= self.stop_speed
    }
}

/// Animation on the matrix track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatrixAnimation {
    /// Tween of the whole outer transform.
    Correction(Tween<Affine>),
    /// Inertial pan.
    Fling(Fling),
}

/// What a dismiss track animation does once it completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissMotion {
    /// Return to rest, nothing happens on completion.
    SpringBack,
    /// Leave the screen; a dismiss is requested on completion.
    FlingOut,
}

/// Animation on the dismiss track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DismissAnimation {
    /// Completion behavior.
    pub motion: DismissMotion,
    /// Offset/alpha tween.
    pub tween: Tween<DismissProgress>,
}

/// Result of one [`Animator::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Whether any track still has an animation.
    pub running: bool,
    /// Set when a fling-out finished on this tick.
    pub fling_out_finished: bool,
}

/// One animation slot per track.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    matrix: Option<MatrixAnimation>,
    mask: Option<Tween<Rect>>,
    dismiss: Option<DismissAnimation>,
}

impl Animator {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a matrix track animation, discarding the previous one.
    pub fn start_matrix(&mut self, animation: MatrixAnimation) {
        self.matrix = Some(animation);
    }

    /// Cancels the matrix track.
    pub fn cancel_matrix(&mut self) {
        self.matrix = None;
    }

    /// Current matrix track animation.
    #[must_use]
    pub fn matrix(&self) -> Option<&MatrixAnimation> {
        self.matrix.as_ref()
    }

    /// Whether a scale-correction tween is running.
    #[must_use]
    pub fn is_correcting(&self) -> bool {
        matches!(self.matrix, Some(MatrixAnimation::Correction(_)))
    }

    /// Starts a mask tween, discarding the previous one.
    pub fn start_mask(&mut self, tween: Tween<Rect>) {
        self.mask = Some(tween);
    }

    /// Cancels the mask track.
    pub fn cancel_mask(&mut self) {
        self.mask = None;
    }

    /// Whether a mask tween is running.
    #[must_use]
    pub fn is_masking(&self) -> bool {
        self.mask.is_some()
    }

    /// Starts a dismiss track animation, discarding the previous one.
    pub fn start_dismiss(&mut self, animation: DismissAnimation) {
        self.dismiss = Some(animation);
    }

    /// Cancels the dismiss track.
    pub fn cancel_dismiss(&mut self) {
        self.dismiss = None;
    }

    /// Motion of the running dismiss animation, if any.
    #[must_use]
    pub fn dismiss_motion(&self) -> Option<DismissMotion> {
        self.dismiss.map(|d| d.motion)
    }

    /// Cancels every track.
    pub fn cancel_all(&mut self) {
        self.matrix = None;
        self.mask = None;
        self.dismiss = None;
    }

    /// Whether any track is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.matrix.is_some() || self.mask.is_some() || self.dismiss.is_some()
    }

    /// Advances every track by one frame of `dt_ms` milliseconds.
    ///
    /// Each track writes its full value before returning: the outer transform
    /// and mask into `model`, the dismiss state into `dismiss`.
    pub fn tick(
        &mut self,
        dt_ms: f64,
        model: &mut TransformModel,
        dismiss: &mut DismissProgress,
    ) -> TickReport {
        let mut report = TickReport::default();

        match self.matrix.as_mut() {
            Some(MatrixAnimation::Correction(tween)) => {
                model.set_outer_transform(tween.advance(dt_ms));
                if tween.is_finished() {
                    self.matrix = None;
                }
            }
            Some(MatrixAnimation::Fling(fling)) => {
                if !fling.step(|delta| model.scroll_by(delta)) {
                    self.matrix = None;
                }
            }
            None => {}
        }

        if let Some(tween) = self.mask.as_mut() {
            model.set_mask(tween.advance(dt_ms));
            if tween.is_finished() {
                self.mask = None;
            }
        }

        if let Some(animation) = self.dismiss.as_mut() {
            *dismiss = animation.tween.advance(dt_ms);
            if animation.tween.is_finished() {
                report.fling_out_finished = animation.motion == DismissMotion::FlingOut;
                self.dismiss = None;
            }
        }

        report.running = self.is_running();
        report
    }
}
