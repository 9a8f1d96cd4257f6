// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Rect, Size, Vec2};
use understory_pinch::{PinchConfig, PinchView, TouchAction, TouchEvent, ZoomSettle};

fn ready_view(config: PinchConfig) -> PinchView {
    let mut view = PinchView::new(config);
    view.attach_image(Size::new(4000.0, 3000.0));
    view.set_viewport_size(Size::new(1080.0, 1920.0));
    view
}

/// Two pointers down around the viewport center.
fn pinching_view() -> PinchView {
    let mut view = ready_view(PinchConfig::default());
    let (a, b) = (Point::new(440.0, 960.0), Point::new(640.0, 960.0));
    view.handle_touch_event(&TouchEvent::down(a, 0));
    view.handle_touch_event(&TouchEvent::new(TouchAction::PointerDown(1), [a, b], 5));
    view
}

fn zoomed_view() -> PinchView {
    let config = PinchConfig {
        zoom_settle: ZoomSettle::KeepZoom,
        ..PinchConfig::default()
    };
    let mut view = ready_view(config);
    let (a, b) = (Point::new(440.0, 960.0), Point::new(640.0, 960.0));
    view.handle_touch_event(&TouchEvent::down(a, 0));
    view.handle_touch_event(&TouchEvent::new(TouchAction::PointerDown(1), [a, b], 5));
    let (a, b) = (Point::new(240.0, 960.0), Point::new(840.0, 960.0));
    view.handle_touch_event(&TouchEvent::moved([a, b], 10));
    view.handle_touch_event(&TouchEvent::new(TouchAction::PointerUp(1), [a, b], 15));
    view.handle_touch_event(&TouchEvent::up(a, 20));
    while view.tick(16.0) {}
    view
}

fn bench_pinch_moves(c: &mut Criterion) {
    let moves: Vec<TouchEvent> = (0..240_u32)
        .map(|i| {
            let spread = 100.0 + f64::from(i % 120) * 3.0;
            TouchEvent::moved(
                [
                    Point::new(540.0 - spread, 960.0),
                    Point::new(540.0 + spread, 960.0),
                ],
                10 + u64::from(i) * 8,
            )
        })
        .collect();

    c.bench_function("pinch/moves_240", |b| {
        b.iter_batched(
            pinching_view,
            |mut view| {
                for event in &moves {
                    view.handle_touch_event(black_box(event));
                }
                black_box(view.outer_transform())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_pinch_release(c: &mut Criterion) {
    c.bench_function("pinch/release_and_settle", |b| {
        b.iter_batched(
            pinching_view,
            |mut view| {
                let (a, b) = (Point::new(0.0, 960.0), Point::new(1080.0, 960.0));
                view.handle_touch_event(&TouchEvent::moved([a, b], 10));
                view.handle_touch_event(&TouchEvent::new(TouchAction::PointerUp(1), [a, b], 15));
                view.handle_touch_event(&TouchEvent::up(a, 20));
                while view.tick(16.0) {}
                black_box(view.current_transform())
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_fling_ticks(c: &mut Criterion) {
    c.bench_function("animation/fling_to_rest", |b| {
        b.iter_batched(
            zoomed_view,
            |mut view| {
                view.fling(Vec2::new(-2400.0, 1800.0));
                let mut ticks = 0_u32;
                while view.tick(16.0) {
                    ticks += 1;
                }
                black_box((ticks, view.image_bounds()))
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_mask_ticks(c: &mut Criterion) {
    c.bench_function("animation/mask_tween_60_frames", |b| {
        b.iter_batched(
            || {
                let mut view = ready_view(PinchConfig::default());
                view.set_mask(Rect::new(0.0, 0.0, 1080.0, 1920.0), 0.0);
                view.set_mask(Rect::new(200.0, 600.0, 880.0, 1320.0), 1000.0);
                view
            },
            |mut view| {
                for _ in 0..60 {
                    view.tick(black_box(16.0));
                }
                black_box(view.mask())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_pinch_moves,
    bench_pinch_release,
    bench_fling_ticks,
    bench_mask_ticks
);
criterion_main!(benches);
