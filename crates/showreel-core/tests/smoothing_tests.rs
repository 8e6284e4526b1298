use proptest::prelude::*;
use showreel_core::mapping::line_scale;
use showreel_core::{ExponentialSmoother, Smoother, Spring, SpringConfig};

const FRAME: f32 = 1.0 / 60.0;

#[test]
fn test_jump_to_bottom_animates_through_intermediate_values() {
    let mut spring = Spring::new(SpringConfig::scroll_progress(), 0.0).unwrap();
    spring.update(1.0);

    let mut previous = line_scale(spring.value());
    let mut intermediate = 0;
    for _ in 0..600 {
        let scale = line_scale(spring.tick(FRAME));
        assert!(scale >= previous, "progress went backwards");
        assert!(scale - previous < 0.2, "single-frame jump {}", scale - previous);
        if scale > 0.0 && scale < 1.0 {
            intermediate += 1;
        }
        previous = scale;
        if spring.is_settled() {
            break;
        }
    }

    assert!(spring.is_settled());
    assert_eq!(previous, 1.0);
    assert!(intermediate > 10);
}

#[test]
fn test_backgrounded_tab_resumes_smoothly() {
    let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
    spring.update(1.0);
    spring.tick(FRAME);

    let before = spring.value();
    // A 30 second gap is integrated as one clamped step
    let after = spring.tick(30.0);
    let mut reference = Spring::new(SpringConfig::default(), 0.0).unwrap();
    reference.update(1.0);
    reference.tick(FRAME);
    assert_eq!(after, reference.tick(0.1));
    assert!(after.is_finite() && after != before);
}

#[test]
fn test_exponential_smoother_reaches_target() {
    let mut smoother = ExponentialSmoother::new(0.1, 0.001, 0.0).unwrap();
    smoother.update(1.0);
    let mut steps = 0;
    while !smoother.is_settled() && steps < 1000 {
        smoother.tick(FRAME);
        steps += 1;
    }
    assert_eq!(smoother.value(), 1.0);
    assert!(steps > 10);
}

fn spring_config() -> impl Strategy<Value = SpringConfig> {
    (50.0f32..500.0, 5.0f32..40.0, 0.5f32..3.0).prop_map(|(stiffness, damping, mass)| {
        SpringConfig {
            stiffness,
            damping,
            mass,
            ..SpringConfig::default()
        }
    })
}

proptest! {
    #[test]
    fn prop_spring_settles_within_rest_delta(
        config in spring_config(),
        start in -100.0f32..100.0,
        target in -100.0f32..100.0,
    ) {
        let mut spring = Spring::new(config, start).unwrap();
        spring.update(target);

        let mut steps = 0;
        while !spring.is_settled() && steps < 7200 {
            spring.tick(FRAME);
            steps += 1;
        }
        prop_assert!(spring.is_settled(), "not settled after {} steps", steps);
        prop_assert!((spring.value() - target).abs() < config.rest_delta);
    }

    #[test]
    fn prop_overdamped_spring_never_overshoots(
        start in -10.0f32..10.0,
        target in -10.0f32..10.0,
        dts in proptest::collection::vec(0.0f32..0.2, 1..200),
    ) {
        let mut spring = Spring::new(SpringConfig::scroll_progress(), start).unwrap();
        spring.update(target);

        let mut distance = (start - target).abs();
        for dt in dts {
            let next = (spring.tick(dt) - target).abs();
            prop_assert!(next <= distance + 1e-4, "distance grew from {} to {}", distance, next);
            distance = next;
        }
    }

    #[test]
    fn prop_rapid_retargeting_stays_bounded(
        targets in proptest::collection::vec(-100.0f32..100.0, 1..300),
    ) {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        for target in targets {
            spring.update(target);
            let value = spring.tick(FRAME);
            prop_assert!(value.is_finite());
            prop_assert!(value.abs() < 1000.0, "diverged to {}", value);
        }
    }
}
