use proptest::prelude::*;
use showreel_core::mapping::line_scale;
use showreel_core::{CircularProgress, DotProgress, ElementBounds, TiltMapping, Vec2};

#[test]
fn test_circle_progress_endpoints() {
    let ring = CircularProgress::new(24.0).unwrap();
    assert_eq!(ring.dash_offset(0.0), ring.circumference());
    assert_eq!(ring.dash_offset(1.0), 0.0);
}

#[test]
fn test_pointer_at_center_is_flat_with_centered_glare() {
    let bounds = ElementBounds::new(40.0, 60.0, 300.0, 200.0);
    let offset = bounds.normalized_offset(bounds.center());
    assert_eq!(offset, Vec2::ZERO);

    let out = TiltMapping::default().map(offset);
    assert_eq!((out.rotate_x_deg, out.rotate_y_deg), (0.0, 0.0));
    assert_eq!((out.glare_x_pct, out.glare_y_pct), (50.0, 50.0));
}

#[test]
fn test_dot_sweep_moves_one_step_at_a_time() {
    let dots = DotProgress::new(5).unwrap();
    let mut previous = 0;
    for step in 0..=100 {
        let active = dots.active_dot(step as f32 / 100.0);
        assert!(active == previous || active == previous + 1);
        let lit = dots
            .opacities(step as f32 / 100.0)
            .iter()
            .filter(|&&o| o == dots.active_opacity)
            .count();
        assert_eq!(lit, 1);
        previous = active;
    }
    assert_eq!(previous, 4);
}

proptest! {
    #[test]
    fn prop_progress_mappings_are_monotonic(a in -0.5f32..1.5, b in -0.5f32..1.5, radius in 1.0f32..200.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let ring = CircularProgress::new(radius).unwrap();

        prop_assert!(line_scale(lo) <= line_scale(hi));
        // Less offset means more of the ring is drawn
        prop_assert!(ring.dash_offset(lo) >= ring.dash_offset(hi));
        prop_assert!(ring.sweep(lo) <= ring.sweep(hi));
    }

    #[test]
    fn prop_dot_ranges_partition_unit_interval(count in 1usize..32, value in 0.0f32..=1.0) {
        let dots = DotProgress::new(count).unwrap();
        let active = dots.active_dot(value);
        prop_assert!(active < count);

        let (lo, hi) = dots.range(active);
        prop_assert!(value >= lo - 1e-6 && value <= hi + 1e-6);
        // Any other dot only touches the value at a shared boundary
        for i in (0..count).filter(|&i| i != active) {
            let (other_lo, other_hi) = dots.range(i);
            let strictly_inside = value > other_lo + 1e-6 && value < other_hi - 1e-6;
            prop_assert!(!strictly_inside);
        }
    }

    #[test]
    fn prop_tilt_is_bounded(x in -5.0f32..5.0, y in -5.0f32..5.0, max in 0.0f32..45.0) {
        let mapping = TiltMapping { max_tilt_deg: max, glare_opacity: 0.4 };
        let out = mapping.map(Vec2::new(x, y));
        prop_assert!(out.rotate_x_deg.abs() <= max);
        prop_assert!(out.rotate_y_deg.abs() <= max);
        prop_assert!((0.0..=100.0).contains(&out.glare_x_pct));
        prop_assert!((0.0..=0.4).contains(&out.glare_opacity));
    }
}
