//! Property-based invariant tests for geometry primitives (Rect, Point, Size).
//!
//! 1. Intersection is commutative.
//! 2. Intersection is idempotent (A ∩ A = A).
//! 3. Intersection result fits within both inputs.
//! 4. Union contains both inputs.
//! 5. Contains agrees with intersection against a 1x1 rectangle at the point.
//! 6. Translation preserves size and containment.

use proptest::prelude::*;
use selgrid_core::geometry::{Point, Rect};

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-500i32..=500, -500i32..=500, 0i32..=500, 0i32..=500)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn point_strategy() -> impl Strategy<Value = Point> {
    (-600i32..=600, -600i32..=600).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn intersection_commutative(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(a.intersection(&b), b.intersection(&a));
    }

    #[test]
    fn intersection_idempotent(a in rect_strategy()) {
        if a.is_empty() {
            prop_assert_eq!(a.intersection_opt(&a), None);
        } else {
            prop_assert_eq!(a.intersection(&a), a);
        }
    }

    #[test]
    fn intersection_within_inputs(a in rect_strategy(), b in rect_strategy()) {
        if let Some(i) = a.intersection_opt(&b) {
            prop_assert!(i.x >= a.x && i.x >= b.x);
            prop_assert!(i.y >= a.y && i.y >= b.y);
            prop_assert!(i.right() <= a.right() && i.right() <= b.right());
            prop_assert!(i.bottom() <= a.bottom() && i.bottom() <= b.bottom());
        }
    }

    #[test]
    fn union_contains_both(a in rect_strategy(), b in rect_strategy()) {
        let u = a.union(&b);
        prop_assert!(u.x <= a.x && u.x <= b.x);
        prop_assert!(u.right() >= a.right() && u.right() >= b.right());
        prop_assert!(u.bottom() >= a.bottom() && u.bottom() >= b.bottom());
    }

    #[test]
    fn contains_matches_unit_rect(r in rect_strategy(), p in point_strategy()) {
        let pixel = Rect::new(p.x, p.y, 1, 1);
        prop_assert_eq!(r.contains(p), r.intersects(&pixel));
    }

    #[test]
    fn translate_preserves_containment(
        r in rect_strategy(),
        p in point_strategy(),
        dx in -100i32..=100,
        dy in -100i32..=100,
    ) {
        let moved = r.translate(dx, dy);
        prop_assert_eq!(moved.size(), r.size());
        prop_assert_eq!(r.contains(p), moved.contains(Point::new(p.x + dx, p.y + dy)));
    }
}
