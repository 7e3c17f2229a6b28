//! Property tests for coordinate mapping and signing order.

use proptest::prelude::*;
use signkit_placement::{
    clamp_to_bounds, field_rect_to_pixels, to_percent, BoundingRect, PercentPoint,
    RecipientRoster, RecipientType, Role,
};

fn rect() -> impl Strategy<Value = BoundingRect> {
    (-500.0f64..500.0, -500.0f64..500.0, 1.0f64..3000.0, 1.0f64..3000.0)
        .prop_map(|(left, top, width, height)| BoundingRect::new(left, top, width, height))
}

#[derive(Debug, Clone)]
enum RosterOp {
    Add,
    Remove(usize),
    SetRole(usize, Role),
    Reorder(usize, u32),
}

fn roster_op() -> impl Strategy<Value = RosterOp> {
    prop_oneof![
        Just(RosterOp::Add),
        any::<usize>().prop_map(RosterOp::Remove),
        (
            any::<usize>(),
            prop_oneof![Just(Role::Signer), Just(Role::Reviewer), Just(Role::Approver)]
        )
            .prop_map(|(i, role)| RosterOp::SetRole(i, role)),
        (any::<usize>(), 0u32..8).prop_map(|(i, order)| RosterOp::Reorder(i, order)),
    ]
}

proptest! {
    #[test]
    fn prop_dropped_field_stays_on_page(
        rect in rect(),
        fx in 0.0f64..=1.0,
        fy in 0.0f64..=1.0,
        width in 1.0f64..=100.0,
        height in 1.0f64..=100.0,
    ) {
        let pointer_x = rect.left + fx * rect.width;
        let pointer_y = rect.top + fy * rect.height;
        if let Ok(point) = to_percent(pointer_x, pointer_y, &rect) {
            let corner = clamp_to_bounds(point.x, point.y, width, height);
            prop_assert!(corner.x >= 0.0 && corner.y >= 0.0);
            prop_assert!(corner.x + width <= 100.0 + 1e-9);
            prop_assert!(corner.y + height <= 100.0 + 1e-9);
        }
    }

    #[test]
    fn prop_pointer_outside_is_rejected(rect in rect(), dx in 0.001f64..1000.0) {
        prop_assert!(to_percent(rect.right() + dx, rect.top, &rect).is_err());
        prop_assert!(to_percent(rect.left - dx, rect.top, &rect).is_err());
        prop_assert!(to_percent(rect.left, rect.bottom() + dx, &rect).is_err());
    }

    #[test]
    fn prop_pixels_scale_with_zoom(
        x in 0.0f64..75.0,
        y in 0.0f64..94.0,
        width in 100.0f64..1000.0,
        height in 100.0f64..1000.0,
        factor in 0.5f64..2.0,
    ) {
        let position = PercentPoint::new(x, y);
        let base = BoundingRect::new(0.0, 0.0, width, height);
        let zoomed = BoundingRect::new(0.0, 0.0, width * factor, height * factor);

        let a = field_rect_to_pixels(position, 25.0, 6.0, &base);
        let b = field_rect_to_pixels(position, 25.0, 6.0, &zoomed);
        prop_assert!((b.left - a.left * factor).abs() < 1e-6);
        prop_assert!((b.top - a.top * factor).abs() < 1e-6);
        prop_assert!((b.width - a.width * factor).abs() < 1e-6);
        prop_assert!((b.height - a.height * factor).abs() < 1e-6);

        // Mapping the zoomed pixel corner back gives the same percentages
        let back = to_percent(b.left, b.top, &zoomed).unwrap();
        prop_assert!((back.x - x).abs() < 1e-6);
        prop_assert!((back.y - y).abs() < 1e-6);
    }

    #[test]
    fn prop_signing_order_stays_dense(ops in prop::collection::vec(roster_op(), 1..40)) {
        let mut roster = RecipientRoster::new();
        for op in ops {
            let ids: Vec<_> = roster.iter().map(|r| r.id).collect();
            let pick = |i: usize| (!ids.is_empty()).then(|| ids[i % ids.len()]);
            match op {
                RosterOp::Add => {
                    roster.add(RecipientType::TeamMember);
                }
                RosterOp::Remove(i) => {
                    if let Some(id) = pick(i) {
                        roster.remove(id).unwrap();
                    }
                }
                RosterOp::SetRole(i, role) => {
                    if let Some(id) = pick(i) {
                        roster.set_role(id, role).unwrap();
                    }
                }
                RosterOp::Reorder(i, order) => {
                    if let Some(id) = pick(i) {
                        let _ = roster.reorder(id, order);
                    }
                }
            }
            prop_assert!(roster.orders_are_dense());
            for r in roster.iter() {
                prop_assert_eq!(r.order.is_some(), r.role == Role::Signer);
            }
        }
    }
}
