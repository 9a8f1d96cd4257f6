// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch input types and per-gesture tracking state.

use kurbo::{Point, Vec2};
use smallvec::SmallVec;

use crate::math;

/// Pointer lifecycle action carried by a [`TouchEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchAction {
    /// First pointer went down.
    Down,
    /// An additional pointer went down at the given index.
    PointerDown(usize),
    /// One or more pointers moved.
    Move,
    /// A non-last pointer was lifted at the given index.
    PointerUp(usize),
    /// The last pointer was lifted.
    Up,
    /// The gesture was aborted by the host.
    Cancel,
}

/// A raw touch event.
///
/// `pointers` lists every pointer currently down, ordered by pointer index,
/// in viewport coordinates. For [`TouchAction::PointerUp`] and
/// [`TouchAction::Up`] the lifted pointer is still included.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent {
    /// What happened.
    pub action: TouchAction,
    /// Pointer positions, by pointer index.
    pub pointers: SmallVec<[Point; 4]>,
    /// Event timestamp in milliseconds.
    pub time_ms: u64,
}

impl TouchEvent {
    /// Creates an event from any pointer list.
    pub fn new(
        action: TouchAction,
        pointers: impl IntoIterator<Item = Point>,
        time_ms: u64,
    ) -> Self {
        Self {
            action,
            pointers: pointers.into_iter().collect(),
            time_ms,
        }
    }

    /// First pointer down at `pos`.
    #[must_use]
    pub fn down(pos: Point, time_ms: u64) -> Self {
        Self::new(TouchAction::Down, [pos], time_ms)
    }

    /// Pointers moved to `pointers`.
    pub fn moved(pointers: impl IntoIterator<Item = Point>, time_ms: u64) -> Self {
        Self::new(TouchAction::Move, pointers, time_ms)
    }

    /// Last pointer lifted at `pos`.
    #[must_use]
    pub fn up(pos: Point, time_ms: u64) -> Self {
        Self::new(TouchAction::Up, [pos], time_ms)
    }

    /// Number of pointers in the event.
    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Position of the first pointer, if any.
    #[must_use]
    pub fn primary(&self) -> Option<Point> {
        self.pointers.first().copied()
    }
}

/// Which interaction currently owns the pointer stream.
///
/// Exactly one mode is active at a time; [`PinchMode::Free`] is both the
/// initial and the idle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PinchMode {
    /// No gesture in progress.
    #[default]
    Free,
    /// Single pointer panning.
    Scroll,
    /// Two or more pointers zooming.
    Scale,
    /// Single pointer vertical drag-to-dismiss.
    DragDismiss,
}

/// Pinch state captured when a two-pointer gesture (re)starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleContext {
    /// Point under the pinch midpoint, in fit-center (pre-outer) space.
    pub center: Point,
    /// Outer scale divided by the pinch distance at capture time.
    pub base: f64,
}

/// Pinch distances below this cannot anchor a scale context.
pub const MIN_PINCH_DISTANCE: f64 = 1e-6;

impl ScaleContext {
    /// Captures the context for pointers `p1`/`p2` against the current outer
    /// transform.
    ///
    /// Returns `None` for coincident pointers or a singular outer transform.
    #[must_use]
    pub fn capture(outer: &kurbo::Affine, p1: Point, p2: Point) -> Option<Self> {
        let distance = math::distance(p1, p2);
        if distance.is_nan() || distance <= MIN_PINCH_DISTANCE {
            return None;
        }
        let center = math::inverse_map_point(outer, math::midpoint(p1, p2))?;
        Some(Self {
            center,
            base: math::uniform_scale(outer) / distance,
        })
    }

    /// Outer transform for a pinch of `distance` centered on `midpoint`.
    ///
    /// Scales by `base * distance` about the captured center, then moves the
    /// center under `midpoint`. The result replaces the outer transform rather
    /// than composing with it, so repeated moves do not accumulate drift.
    #[must_use]
    pub fn outer_for(&self, distance: f64, midpoint: Point) -> kurbo::Affine {
        let scale = self.base * distance;
        math::post_translate(math::scale_about(scale, self.center), midpoint - self.center)
    }
}

/// Vertical dismiss offset and the alpha the host should render with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DismissProgress {
    /// Vertical offset of the whole view.
    pub offset: f64,
    /// Suggested alpha for the container, in `[min_alpha, 1]`.
    pub alpha: f64,
}

impl DismissProgress {
    /// Resting state: no offset, fully opaque.
    pub const REST: Self = Self {
        offset: 0.0,
        alpha: 1.0,
    };

    /// Progress for a drag of `offset` in a viewport of `viewport_height`.
    #[must_use]
    pub fn for_offset(offset: f64, viewport_height: f64, min_alpha: f64) -> Self {
        let half = viewport_height * 0.5;
        let alpha = if half > 0.0 {
            (1.0 - offset.abs() / half).max(min_alpha)
        } else {
            min_alpha
        };
        Self {
            offset,
            alpha: alpha.min(1.0),
        }
    }
}

impl Default for DismissProgress {
    fn default() -> Self {
        Self::REST
    }
}

/// Why a dismiss was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DismissReason {
    /// A short tap.
    Tap,
    /// A drag released past the commit threshold.
    Drag,
    /// A fast vertical fling finished leaving the screen.
    FlingOut,
}

/// Notifications for the host, drained with
/// [`PinchView::drain_events`](crate::PinchView::drain_events).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinchEvent {
    /// The active mode changed.
    ModeChanged(PinchMode),
    /// The host should run its close sequence.
    DismissRequested(DismissReason),
}

const VELOCITY_SAMPLES: usize = 8;
const VELOCITY_HORIZON_MS: u64 = 100;

/// Estimates pointer velocity from recent samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct VelocityTracker {
    samples: [(u64, Point); VELOCITY_SAMPLES],
    len: usize,
    next: usize,
}

impl VelocityTracker {
    /// Drops all samples.
    pub fn clear(&mut self) {
        self.len = 0;
        self.next = 0;
    }

    /// Records a pointer position.
    pub fn add(&mut self, time_ms: u64, pos: Point) {
        self.samples[self.next] = (time_ms, pos);
        self.next = (self.next + 1) % VELOCITY_SAMPLES;
        self.len = (self.len + 1).min(VELOCITY_SAMPLES);
    }

    /// Velocity in units per second over the last 100 ms of samples.
    ///
    /// Zero with fewer than two samples or no elapsed time.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        if self.len < 2 {
            return Vec2::ZERO;
        }
        let newest_idx = (self.next + VELOCITY_SAMPLES - 1) % VELOCITY_SAMPLES;
        let (newest_t, newest_p) = self.samples[newest_idx];
        let mut oldest = (newest_t, newest_p);
        for back in 1..self.len {
            let idx = (newest_idx + VELOCITY_SAMPLES - back) % VELOCITY_SAMPLES;
            let sample = self.samples[idx];
            if newest_t.saturating_sub(sample.0) > VELOCITY_HORIZON_MS {
                break;
            }
            oldest = sample;
        }
        let dt_ms = newest_t.saturating_sub(oldest.0);
        if dt_ms == 0 {
            return Vec2::ZERO;
        }
        (newest_p - oldest.1) * (1000.0 / dt_ms as f64)
    }
}

/// Bookkeeping for the gesture that started with the last `Down`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GestureTrack {
    /// Position and time of the first pointer down.
    pub(crate) start: Option<(Point, u64)>,
    /// Last single-pointer position, or last pinch midpoint.
    pub(crate) last: Point,
    /// Most pointers seen at once during this gesture.
    pub(crate) max_pointers: usize,
    /// Furthest the primary pointer got from its start.
    pub(crate) max_displacement: f64,
}

impl GestureTrack {
    pub(crate) fn begin(&mut self, pos: Point, time_ms: u64) {
        *self = Self {
            start: Some((pos, time_ms)),
            last: pos,
            max_pointers: 1,
            max_displacement: 0.0,
        };
    }

    pub(crate) fn observe(&mut self, event: &TouchEvent) {
        self.max_pointers = self.max_pointers.max(event.pointer_count());
        if let (Some((start, _)), Some(p)) = (self.start, event.primary()) {
            self.max_displacement = self.max_displacement.max(math::distance(start, p));
        }
    }

    pub(crate) fn elapsed(&self, time_ms: u64) -> u64 {
        self.start.map_or(0, |(_, t)| time_ms.saturating_sub(t))
    }

    pub(crate) fn end(&mut self) {
        self.start = None;
    }
}
