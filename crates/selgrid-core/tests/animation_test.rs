//! Integration tests for the easing curves and timelines.

use proptest::prelude::*;
use selgrid_core::animation::*;
use std::time::{Duration, Instant};

#[test]
fn easing_functions_are_monotonic() {
    for easing in [linear, decelerate] {
        let mut prev = 0.0f64;
        for i in 0..=100 {
            let t = f64::from(i) / 100.0;
            let v = easing(t);
            assert!(v >= prev - 1e-9, "easing should be monotonic at t={t}");
            prev = v;
        }
    }
}

#[test]
fn timeline_sampled_at_frame_rate_reaches_end() {
    let t0 = Instant::now();
    let tl = Timeline::new(t0, Duration::from_millis(500)).easing(decelerate);
    let frame = Duration::from_micros(16_667);
    let mut now = t0;
    let mut frames = 0;
    while !tl.is_complete(now) {
        now += frame;
        frames += 1;
        assert!(frames < 100, "timeline never completed");
    }
    assert_eq!(tl.value(now), 1.0);
    assert_eq!(frames, 30);
}

proptest! {
    #[test]
    fn easing_output_in_unit_range(t in -10.0f64..10.0) {
        for easing in [linear, decelerate] {
            let v = easing(t);
            prop_assert!((0.0..=1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn timeline_progress_is_monotonic(
        duration_ms in 1u64..5_000,
        a in 0u64..10_000,
        b in 0u64..10_000,
    ) {
        let t0 = Instant::now();
        let tl = Timeline::new(t0, Duration::from_millis(duration_ms));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p_lo = tl.progress(t0 + Duration::from_millis(lo));
        let p_hi = tl.progress(t0 + Duration::from_millis(hi));
        prop_assert!(p_lo <= p_hi);
        prop_assert!((0.0..=1.0).contains(&p_hi));
    }
}
