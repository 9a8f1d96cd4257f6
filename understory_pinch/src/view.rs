// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::{Drain, Vec};

use kurbo::{Affine, Point, Rect, Size, Vec2};
use tracing::{debug, trace};

use crate::animation::{Animator, DismissAnimation, DismissMotion, Fling, MatrixAnimation, Tween};
use crate::config::{FixedMaxScale, PinchConfig, ScalePolicy, sanitize_max_scale};
use crate::gesture::{
    DismissProgress, DismissReason, GestureTrack, MIN_PINCH_DISTANCE, PinchEvent, PinchMode,
    ScaleContext, TouchAction, TouchEvent, VelocityTracker,
};
use crate::math;
use crate::model::TransformModel;
use crate::scratch::ScratchPool;
use crate::solver::{self, ScaleCorrection};

/// Gesture-driven pan/zoom/dismiss engine for one image in one viewport.
///
/// Feed raw touch events into [`PinchView::handle_touch_event`] and call
/// [`PinchView::tick`] once per frame while it reports running animations.
/// Render with [`PinchView::current_transform`], clipped to
/// [`PinchView::mask`], offset vertically by [`PinchView::dismiss_progress`].
///
/// Everything runs on the caller's thread; each call leaves the state fully
/// updated, so it can be read for rendering between calls.
#[derive(Debug)]
pub struct PinchView<P = FixedMaxScale> {
    config: PinchConfig,
    policy: P,
    model: TransformModel,
    animator: Animator,
    mode: PinchMode,
    scale_context: Option<ScaleContext>,
    track: GestureTrack,
    velocity: VelocityTracker,
    dismiss: DismissProgress,
    /// Pointer y at which the dismiss offset would be zero.
    dismiss_anchor: f64,
    release_velocity: Option<Vec2>,
    events: Vec<PinchEvent>,
    pointer_scratch: ScratchPool<Vec<Point>>,
}

impl<P: ScalePolicy + Default> PinchView<P> {
    /// Creates an engine with the given configuration and a default policy.
    #[must_use]
    pub fn new(config: PinchConfig) -> Self {
        Self::with_policy(config, P::default())
    }
}

impl<P: ScalePolicy + Default> Default for PinchView<P> {
    fn default() -> Self {
        Self::new(PinchConfig::default())
    }
}

impl<P: ScalePolicy> PinchView<P> {
    /// Creates an engine with an explicit max-scale policy.
    #[must_use]
    pub fn with_policy(config: PinchConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            model: TransformModel::new(),
            animator: Animator::new(),
            mode: PinchMode::Free,
            scale_context: None,
            track: GestureTrack::default(),
            velocity: VelocityTracker::default(),
            dismiss: DismissProgress::REST,
            dismiss_anchor: 0.0,
            release_velocity: None,
            events: Vec::new(),
            pointer_scratch: ScratchPool::default(),
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &PinchConfig {
        &self.config
    }

    /// Replaces the configuration; takes effect from the next event or tick.
    pub fn set_config(&mut self, config: PinchConfig) {
        self.config = config;
    }

    /// The max-scale policy.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Attaches an image with the given intrinsic size.
    pub fn attach_image(&mut self, intrinsic: Size) {
        self.model.attach_image(intrinsic);
    }

    /// Detaches the image. Any gesture in progress is abandoned.
    pub fn detach_image(&mut self) {
        self.model.detach_image();
        self.animator.cancel_matrix();
        self.scale_context = None;
        self.track.end();
        self.set_mode(PinchMode::Free);
    }

    /// Updates the viewport size after a layout change.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.model.set_viewport_size(size);
    }

    /// The underlying transform model.
    #[must_use]
    pub fn model(&self) -> &TransformModel {
        &self.model
    }

    /// Whether an image and viewport with positive size are both present.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.model.is_ready()
    }

    /// Fit-center transform; identity when not ready.
    #[must_use]
    pub fn inner_transform(&self) -> Affine {
        self.model.inner_transform()
    }

    /// User pan/zoom layer.
    #[must_use]
    pub fn outer_transform(&self) -> Affine {
        self.model.outer_transform()
    }

    /// Image space to viewport transform for rendering and hit testing.
    #[must_use]
    pub fn current_transform(&self) -> Affine {
        self.model.current_transform()
    }

    /// Displayed image rectangle; empty when not ready.
    #[must_use]
    pub fn image_bounds(&self) -> Rect {
        self.model.image_bounds()
    }

    /// Clip rectangle, if one was ever set since the last reset.
    #[must_use]
    pub fn mask(&self) -> Option<Rect> {
        self.model.mask()
    }

    /// Active gesture mode.
    #[must_use]
    pub fn pinch_mode(&self) -> PinchMode {
        self.mode
    }

    /// Scale context of the pinch in progress.
    #[must_use]
    pub fn scale_context(&self) -> Option<ScaleContext> {
        self.scale_context
    }

    /// Vertical dismiss offset and alpha for the container.
    #[must_use]
    pub fn dismiss_progress(&self) -> DismissProgress {
        self.dismiss
    }

    /// Velocity of the last single-pointer gesture at release, in units per
    /// second. Pass it to [`PinchView::fling`] to opt into inertia.
    #[must_use]
    pub fn release_velocity(&self) -> Option<Vec2> {
        self.release_velocity
    }

    /// Whether any animation is running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Effective max scale from the policy, never below 1.
    #[must_use]
    pub fn max_scale(&self) -> f64 {
        let image = self.model.image_size().unwrap_or(Size::ZERO);
        sanitize_max_scale(self.policy.max_scale(image, self.model.viewport_size()))
    }

    /// Drains pending notifications.
    pub fn drain_events(&mut self) -> Drain<'_, PinchEvent> {
        self.events.drain(..)
    }

    /// Moves the mask to `mask`.
    ///
    /// Without a previous mask, or with a non-positive duration, the mask is
    /// assigned immediately. Otherwise it tweens from the current mask over
    /// `duration_ms`. Any running mask tween is cancelled first; image
    /// animations are not touched.
    pub fn set_mask(&mut self, mask: Rect, duration_ms: f64) {
        self.animator.cancel_mask();
        match self.model.mask() {
            Some(current) if duration_ms > 0.0 && duration_ms.is_finite() => {
                self.animator.start_mask(Tween::new(current, mask, duration_ms));
            }
            _ => self.model.set_mask(mask),
        }
    }

    /// Back to fit-center: identity outer transform, no mask, Free mode and
    /// no animations. Image and viewport are kept.
    pub fn reset(&mut self) {
        self.model.reset();
        self.animator.cancel_all();
        self.scale_context = None;
        self.track = GestureTrack::default();
        self.velocity.clear();
        self.dismiss = DismissProgress::REST;
        self.release_velocity = None;
        self.set_mode(PinchMode::Free);
    }

    /// Pans the image, clamped to the valid range. Returns whether it moved.
    pub fn scroll_by(&mut self, delta: Vec2) -> bool {
        self.model.scroll_by(delta)
    }

    /// Starts an inertial pan with `velocity` in units per second.
    ///
    /// Replaces any running matrix animation. Returns `false` when not ready.
    pub fn fling(&mut self, velocity: Vec2) -> bool {
        if !self.model.is_ready() {
            return false;
        }
        let fling = Fling::from_velocity(
            velocity,
            self.config.frames_per_second,
            self.config.fling_damping,
            self.config.fling_stop_speed,
        );
        trace!(?velocity, "fling");
        self.animator.start_matrix(MatrixAnimation::Fling(fling));
        true
    }

    /// Advances all animations by one frame of `dt_ms` milliseconds.
    ///
    /// Returns `true` while animations are still running.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        let report = self.animator.tick(dt_ms, &mut self.model, &mut self.dismiss);
        if report.fling_out_finished {
            // The gesture that flung is over even if its pointer is still down.
            self.track.end();
            self.set_mode(PinchMode::Free);
            self.request_dismiss(DismissReason::FlingOut);
        }
        report.running
    }

    /// Feeds one raw touch event.
    ///
    /// Returns whether the event was consumed. Events are ignored while the
    /// model is not ready or while the view is flinging out.
    pub fn handle_touch_event(&mut self, event: &TouchEvent) -> bool {
        trace!(
            action = ?event.action,
            pointers = event.pointer_count(),
            mode = ?self.mode,
            "touch"
        );
        if !self.model.is_ready() || self.is_flinging_out() {
            return false;
        }
        match event.action {
            TouchAction::Down => {
                self.on_down(event);
                true
            }
            TouchAction::PointerDown(_) => {
                self.on_pointer_down(event);
                true
            }
            TouchAction::Move => self.on_move(event),
            TouchAction::PointerUp(index) => {
                self.on_pointer_up(event, index);
                true
            }
            TouchAction::Up => {
                self.on_up(event, false);
                true
            }
            TouchAction::Cancel => {
                self.on_up(event, true);
                true
            }
        }
    }

    fn on_down(&mut self, event: &TouchEvent) {
        let Some(pos) = event.primary() else {
            return;
        };
        self.track.begin(pos, event.time_ms);
        self.velocity.clear();
        self.velocity.add(event.time_ms, pos);
        self.release_velocity = None;
        // A running correction finishes undisturbed; flings stop on touch.
        if !self.animator.is_correcting() {
            self.animator.cancel_matrix();
        }
        if self.animator.dismiss_motion() == Some(DismissMotion::SpringBack) {
            self.animator.cancel_dismiss();
        }
    }

    fn on_pointer_down(&mut self, event: &TouchEvent) {
        self.track.observe(event);
        self.animator.cancel_matrix();
        self.set_mode(PinchMode::Scale);
        self.scale_context = None;
        if let [p0, p1, ..] = event.pointers[..] {
            self.track.last = math::midpoint(p0, p1);
            self.scale_context = ScaleContext::capture(&self.model.outer_transform(), p0, p1);
        }
    }

    fn on_move(&mut self, event: &TouchEvent) -> bool {
        self.track.observe(event);
        if self.animator.is_correcting() {
            return true;
        }
        match (self.mode, &event.pointers[..]) {
            (PinchMode::Scale, [p0, p1, ..]) => {
                self.pinch_move(*p0, *p1);
                true
            }
            // A lone pointer left over from a pinch does not pan.
            (PinchMode::Scale, _) => true,
            (_, [pos]) => self.single_move(*pos, event.time_ms),
            _ => true,
        }
    }

    fn pinch_move(&mut self, p0: Point, p1: Point) {
        let mid = math::midpoint(p0, p1);
        self.track.last = mid;
        let Some(ctx) = self.scale_context else {
            // Capture was deferred by a degenerate pinch; retry on this move.
            self.scale_context = ScaleContext::capture(&self.model.outer_transform(), p0, p1);
            return;
        };
        let distance = math::distance(p0, p1);
        // Coincident pointers would collapse the image to a point.
        if distance.is_nan() || distance <= MIN_PINCH_DISTANCE {
            return;
        }
        self.model.set_outer_transform(ctx.outer_for(distance, mid));
    }

    fn single_move(&mut self, pos: Point, time_ms: u64) -> bool {
        self.velocity.add(time_ms, pos);
        let delta = pos - self.track.last;
        self.track.last = pos;
        let dismiss = self.config.dismiss;
        let vy = self.velocity.velocity().y;

        match self.mode {
            PinchMode::Free => {
                if !self.drag_committed(time_ms, delta) {
                    return true;
                }
                if dismiss.enabled && vy.abs() > dismiss.fling_out_speed {
                    self.fling_out(vy);
                    return false;
                }
                if dismiss.enabled && !self.model.can_pan_vertically() {
                    let start_y = self.track.start.map_or(pos.y, |(p, _)| p.y);
                    self.dismiss_anchor = start_y - self.dismiss.offset;
                    self.set_mode(PinchMode::DragDismiss);
                    self.update_dismiss_drag(pos);
                    return true;
                }
                self.set_mode(PinchMode::Scroll);
                self.model.scroll_by(delta);
            }
            PinchMode::Scroll => {
                self.model.scroll_by(delta);
            }
            PinchMode::DragDismiss => {
                if dismiss.enabled && vy.abs() > dismiss.fling_out_speed {
                    self.fling_out(vy);
                    return false;
                }
                self.update_dismiss_drag(pos);
            }
            PinchMode::Scale => {}
        }
        true
    }

    fn drag_committed(&self, time_ms: u64, delta: Vec2) -> bool {
        self.track.max_displacement > self.config.touch_slop
            || (self.track.elapsed(time_ms) >= self.config.tap_timeout_ms && delta != Vec2::ZERO)
    }

    fn update_dismiss_drag(&mut self, pos: Point) {
        self.dismiss = DismissProgress::for_offset(
            pos.y - self.dismiss_anchor,
            self.model.viewport_size().height,
            self.config.dismiss.min_alpha,
        );
    }

    fn fling_out(&mut self, vy: f64) {
        let dismiss = self.config.dismiss;
        let target = if vy > 0.0 {
            dismiss.fling_out_distance
        } else {
            -dismiss.fling_out_distance
        };
        let remaining = (dismiss.fling_out_distance - self.dismiss.offset.abs()).max(0.0);
        let duration_ms = remaining / vy.abs() * 1000.0;
        debug!(vy, duration_ms, "dismiss fling-out");
        self.set_mode(PinchMode::DragDismiss);
        self.animator.start_dismiss(DismissAnimation {
            motion: DismissMotion::FlingOut,
            tween: Tween::new(
                self.dismiss,
                DismissProgress {
                    offset: target,
                    alpha: self.dismiss.alpha,
                },
                duration_ms,
            ),
        });
    }

    fn spring_back(&mut self) {
        if self.dismiss == DismissProgress::REST || self.is_flinging_out() {
            return;
        }
        self.animator.start_dismiss(DismissAnimation {
            motion: DismissMotion::SpringBack,
            tween: Tween::new(
                self.dismiss,
                DismissProgress::REST,
                self.config.dismiss.spring_back_ms,
            ),
        });
    }

    fn on_pointer_up(&mut self, event: &TouchEvent, index: usize) {
        self.track.observe(event);
        if self.mode != PinchMode::Scale || event.pointer_count() <= 2 {
            // With one pointer left the pinch stays in Scale until release.
            return;
        }
        let mut remaining = self.pointer_scratch.take();
        remaining.extend(
            event
                .pointers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, p)| *p)
                .take(2),
        );
        if let [p0, p1] = remaining[..] {
            self.track.last = math::midpoint(p0, p1);
            self.scale_context = ScaleContext::capture(&self.model.outer_transform(), p0, p1);
        }
        self.pointer_scratch.give(remaining);
    }

    fn on_up(&mut self, event: &TouchEvent, canceled: bool) {
        self.track.observe(event);
        if self.track.max_pointers == 1 {
            self.release_velocity = Some(self.velocity.velocity());
        }
        self.velocity.clear();

        let mut next = PinchMode::Free;
        let mut dismissed = false;
        if !canceled && self.is_tap(event.time_ms) {
            self.request_dismiss(DismissReason::Tap);
            dismissed = true;
        } else {
            match self.mode {
                PinchMode::Scale => {
                    if self.scale_end().is_some_and(|c| !c.was_under_zoomed()) {
                        next = PinchMode::Scroll;
                    }
                    self.scale_context = None;
                }
                PinchMode::DragDismiss => {
                    let half = self.model.viewport_size().height * 0.5;
                    if self.dismiss.offset.abs() > half * self.config.dismiss.commit_ratio {
                        self.request_dismiss(DismissReason::Drag);
                        dismissed = true;
                    }
                }
                PinchMode::Free | PinchMode::Scroll => {}
            }
        }
        self.set_mode(next);
        // Any offset left by an interrupted drag or spring-back returns to rest.
        if !dismissed {
            self.spring_back();
        }
        self.track.end();
    }

    fn is_flinging_out(&self) -> bool {
        self.animator.dismiss_motion() == Some(DismissMotion::FlingOut)
    }

    fn is_tap(&self, time_ms: u64) -> bool {
        self.track.start.is_some()
            && self.track.max_pointers == 1
            && self.track.elapsed(time_ms) < self.config.tap_timeout_ms
            && self.track.max_displacement <= self.config.touch_slop
    }

    /// Runs the gesture-end correction and starts its animation if needed.
    fn scale_end(&mut self) -> Option<ScaleCorrection> {
        let correction = solver::scale_end(
            &self.model,
            self.track.last,
            self.max_scale(),
            self.config.zoom_settle,
        )?;
        if correction.is_change() {
            debug!(
                scale_post = correction.scale_post,
                dx = correction.offset.x,
                dy = correction.offset.y,
                "scale correction"
            );
            self.animator.start_matrix(MatrixAnimation::Correction(Tween::new(
                self.model.outer_transform(),
                correction.target,
                self.config.scale_animation_ms,
            )));
        }
        Some(correction)
    }

    fn request_dismiss(&mut self, reason: DismissReason) {
        debug!(?reason, "dismiss requested");
        self.events.push(PinchEvent::DismissRequested(reason));
    }

    fn set_mode(&mut self, mode: PinchMode) {
        if self.mode == mode {
            return;
        }
        debug!(from = ?self.mode, to = ?mode, "pinch mode");
        self.mode = mode;
        self.events.push(PinchEvent::ModeChanged(mode));
    }
}
