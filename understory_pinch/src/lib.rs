// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pinch --heading-base-level=0

//! Understory Pinch: a headless pinch/pan/dismiss engine for a single image.
//!
//! This crate interprets a raw stream of touch events against one image shown
//! in a fixed-size viewport and maintains the transform used to draw it:
//! - Single-pointer panning, clamped so image edges never move inward past
//!   the viewport edges.
//! - Two-pointer pinch zoom about the fingers' midpoint.
//! - A vertical drag-to-dismiss gesture with fling-out and spring-back.
//! - Gesture-end correction back into the valid zoom range, inertial flings
//!   and a tweened clip mask.
//!
//! It does **not** draw anything or own the image pixels. Callers are
//! expected to:
//! - Report the image's intrinsic size and the viewport size.
//! - Forward touch events to [`PinchView::handle_touch_event`].
//! - Call [`PinchView::tick`] every frame while it returns `true`.
//! - Draw the image through [`PinchView::current_transform`], clipped to
//!   [`PinchView::mask`], and apply [`PinchView::dismiss_progress`] to the
//!   container.
//! - Drain [`PinchEvent`]s and run their own close sequence on
//!   [`PinchEvent::DismissRequested`].
//!
//! ## Transform layers
//!
//! The displayed transform is `outer * inner`: the *inner* layer fits the
//! image into the viewport (centered, uniformly scaled) and is derived from
//! the two sizes; the *outer* layer is the user's pan/zoom, identity at rest.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use understory_pinch::{PinchConfig, PinchMode, PinchView, TouchAction, TouchEvent};
//!
//! let mut view: PinchView = PinchView::new(PinchConfig::default());
//! view.attach_image(Size::new(1000.0, 1000.0));
//! view.set_viewport_size(Size::new(500.0, 500.0));
//! assert_eq!(view.image_bounds(), Rect::new(0.0, 0.0, 500.0, 500.0));
//!
//! // Two fingers spread from 100 to 200 units apart around the center.
//! let (a, b) = (Point::new(200.0, 250.0), Point::new(300.0, 250.0));
//! view.handle_touch_event(&TouchEvent::down(a, 0));
//! view.handle_touch_event(&TouchEvent::new(TouchAction::PointerDown(1), [a, b], 10));
//! let (a, b) = (Point::new(150.0, 250.0), Point::new(350.0, 250.0));
//! view.handle_touch_event(&TouchEvent::moved([a, b], 20));
//! assert_eq!(view.pinch_mode(), PinchMode::Scale);
//! assert!((view.image_bounds().width() - 1000.0).abs() < 1e-9);
//!
//! // Releasing settles back to fit over a short animation.
//! view.handle_touch_event(&TouchEvent::new(TouchAction::PointerUp(1), [a, b], 30));
//! view.handle_touch_event(&TouchEvent::up(a, 40));
//! while view.tick(16.0) {}
//! assert!((view.image_bounds().width() - 500.0).abs() < 1e-9);
//! ```
//!
//! ## Design notes
//!
//! - Only scale and translation are ever produced; rotation is not supported.
//! - Each pinch move rebuilds the outer transform from the [`ScaleContext`]
//!   captured when the pinch started, instead of composing with the previous
//!   frame.
//! - The dismiss offset is a separate vertical offset of the whole view and
//!   never feeds into the outer transform.
//! - Everything is single-threaded and frame driven; there are no timers.
//!
//! This crate is `no_std`.

#![no_std]

extern crate alloc;

pub mod animation;
mod config;
mod gesture;
pub mod math;
mod model;
pub mod scratch;
pub mod solver;
mod view;

pub use config::{
    DEFAULT_MAX_SCALE, DismissConfig, FixedMaxScale, MIN_MAX_SCALE, PinchConfig, ScalePolicy,
    ZoomSettle,
};
pub use gesture::{
    DismissProgress, DismissReason, MIN_PINCH_DISTANCE, PinchEvent, PinchMode, ScaleContext,
    TouchAction, TouchEvent, VelocityTracker,
};
pub use model::TransformModel;
pub use view::PinchView;
