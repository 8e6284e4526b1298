//! Spring and low-pass smoothing
//!
//! `Spring` integrates a damped harmonic oscillator in closed form, so a step of any
//! length lands exactly on the analytic trajectory instead of accumulating Euler error.
//! Steps are still clamped to `MAX_DT` so a long pause (backgrounded tab) resumes as a
//! short step instead of a teleport.

use crate::ConfigError;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Longest step accepted by `tick`, in seconds
pub const MAX_DT: f32 = 0.1;

/// Common interface for smoothing filters
pub trait Smoother {
    /// Record a new target without moving the current value
    fn update(&mut self, target: f32);

    /// Advance by `dt` seconds and return the new current value
    fn tick(&mut self, dt: f32) -> f32;

    /// Jump to `value` and stop all motion
    fn reset(&mut self, value: f32);

    /// Current value
    fn value(&self) -> f32;

    /// Target value
    fn target(&self) -> f32;

    /// Whether the value rests on the target
    fn is_settled(&self) -> bool;
}

/// Spring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Spring constant
    pub stiffness: f32,
    /// Damping coefficient
    pub damping: f32,
    /// Moving mass
    pub mass: f32,
    /// Distance below which the spring may settle
    pub rest_delta: f32,
    /// Speed below which the spring may settle
    pub rest_speed: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            rest_delta: 0.01,
            rest_speed: 0.01,
        }
    }
}

impl SpringConfig {
    /// Scroll progress bars
    pub fn scroll_progress() -> Self {
        Self {
            stiffness: 100.0,
            damping: 30.0,
            rest_delta: 0.001,
            ..Self::default()
        }
    }

    /// Pointer tilt cards
    pub fn tilt() -> Self {
        Self {
            stiffness: 150.0,
            damping: 15.0,
            rest_delta: 0.001,
            ..Self::default()
        }
    }

    /// Check all parameters are finite and positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("mass", self.mass),
            ("rest_delta", self.rest_delta),
            ("rest_speed", self.rest_speed),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidConfig(format!(
                    "spring {} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Damping ratio (1.0 = critically damped)
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

/// Critically/under/over-damped spring following a target
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    settled: bool,
}

impl Spring {
    /// Spring resting at `initial`
    pub fn new(config: SpringConfig, initial: f32) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            settled: true,
        })
    }

    /// Current velocity (units per second)
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Parameters
    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    fn integrate(&mut self, t: f32) {
        let k = self.config.stiffness;
        let m = self.config.mass;
        let omega0 = (k / m).sqrt();
        let zeta = self.config.damping_ratio();

        let x0 = self.value - self.target;
        let v0 = self.velocity;

        let (x, v) = if (zeta - 1.0).abs() < 1e-4 {
            // Critically damped
            let b = v0 + omega0 * x0;
            let e = (-omega0 * t).exp();
            (e * (x0 + b * t), e * (v0 - omega0 * b * t))
        } else if zeta < 1.0 {
            let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
            let e = (-zeta * omega0 * t).exp();
            let (sin, cos) = (omega_d * t).sin_cos();
            let x = e * (x0 * cos + (v0 + zeta * omega0 * x0) / omega_d * sin);
            let v = e * (v0 * cos - (zeta * omega0 * v0 + omega0 * omega0 * x0) / omega_d * sin);
            (x, v)
        } else {
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -omega0 * (zeta - root);
            let r2 = -omega0 * (zeta + root);
            let c1 = (v0 - r2 * x0) / (r1 - r2);
            let c2 = x0 - c1;
            let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
            (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
        };

        self.value = self.target + x;
        self.velocity = v;
    }
}

impl Smoother for Spring {
    fn update(&mut self, target: f32) {
        if !target.is_finite() || target == self.target {
            return;
        }
        self.target = target;
        self.settled = false;
    }

    fn tick(&mut self, dt: f32) -> f32 {
        if self.settled {
            return self.value;
        }
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
        if dt > 0.0 {
            self.integrate(dt);
        }

        if (self.value - self.target).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
        {
            self.value = self.target;
            self.velocity = 0.0;
            self.settled = true;
        }
        self.value
    }

    fn reset(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        self.settled = true;
    }

    fn value(&self) -> f32 {
        self.value
    }

    fn target(&self) -> f32 {
        self.target
    }

    fn is_settled(&self) -> bool {
        self.settled
    }
}

/// Frame-rate independent exponential approach
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialSmoother {
    time_constant: f32,
    rest_delta: f32,
    value: f32,
    target: f32,
}

impl ExponentialSmoother {
    /// Smoother that covers ~63% of the remaining distance every `time_constant` seconds
    pub fn new(time_constant: f32, rest_delta: f32, initial: f32) -> Result<Self, ConfigError> {
        if !time_constant.is_finite() || time_constant <= 0.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "time_constant must be positive, got {}",
                time_constant
            )));
        }
        if !rest_delta.is_finite() || rest_delta <= 0.0 {
            return Err(ConfigError::InvalidConfig(format!(
                "rest_delta must be positive, got {}",
                rest_delta
            )));
        }
        Ok(Self {
            time_constant,
            rest_delta,
            value: initial,
            target: initial,
        })
    }
}

impl Smoother for ExponentialSmoother {
    fn update(&mut self, target: f32) {
        if target.is_finite() {
            self.target = target;
        }
    }

    fn tick(&mut self, dt: f32) -> f32 {
        if self.is_settled() {
            self.value = self.target;
            return self.value;
        }
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DT) } else { 0.0 };
        let alpha = 1.0 - (-dt / self.time_constant).exp();
        self.value += (self.target - self.value) * alpha;

        if (self.value - self.target).abs() < self.rest_delta {
            self.value = self.target;
        }
        self.value
    }

    fn reset(&mut self, value: f32) {
        self.value = value;
        self.target = value;
    }

    fn value(&self) -> f32 {
        self.value
    }

    fn target(&self) -> f32 {
        self.target
    }

    fn is_settled(&self) -> bool {
        self.value == self.target
    }
}

/// Two independent springs driven as a vector
#[derive(Debug, Clone, PartialEq)]
pub struct Spring2 {
    x: Spring,
    y: Spring,
}

impl Spring2 {
    /// Spring pair resting at `initial`
    pub fn new(config: SpringConfig, initial: Vec2) -> Result<Self, ConfigError> {
        Ok(Self {
            x: Spring::new(config, initial.x)?,
            y: Spring::new(config, initial.y)?,
        })
    }

    /// Record a new target
    pub fn update(&mut self, target: Vec2) {
        self.x.update(target.x);
        self.y.update(target.y);
    }

    /// Advance both axes
    pub fn tick(&mut self, dt: f32) -> Vec2 {
        Vec2::new(self.x.tick(dt), self.y.tick(dt))
    }

    /// Jump to `value` and stop
    pub fn reset(&mut self, value: Vec2) {
        self.x.reset(value.x);
        self.y.reset(value.y);
    }

    /// Current value
    pub fn value(&self) -> Vec2 {
        Vec2::new(self.x.value(), self.y.value())
    }

    /// Target value
    pub fn target(&self) -> Vec2 {
        Vec2::new(self.x.target(), self.y.target())
    }

    /// Both axes at rest
    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_settled(spring: &mut impl Smoother, dt: f32, max_steps: usize) -> Option<usize> {
        (0..max_steps).find(|_| {
            spring.tick(dt);
            spring.is_settled()
        })
    }

    #[test]
    fn test_update_does_not_move_value() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.update(1.0);
        assert_eq!(spring.value(), 0.0);
        assert!(!spring.is_settled());
    }

    #[test]
    fn test_settles_on_target() {
        let mut spring = Spring::new(SpringConfig::scroll_progress(), 0.0).unwrap();
        spring.update(1.0);

        let steps = run_until_settled(&mut spring, 1.0 / 60.0, 10_000);
        assert!(steps.is_some());
        assert_eq!(spring.value(), 1.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_overdamped_moves_monotonically() {
        // damping ratio 1.5
        let mut spring = Spring::new(SpringConfig::scroll_progress(), 0.0).unwrap();
        spring.update(1.0);

        let mut last = 0.0;
        for _ in 0..600 {
            let v = spring.tick(1.0 / 60.0);
            assert!(v >= last - 1e-6, "value went backwards: {} < {}", v, last);
            assert!(v <= 1.0 + 1e-6, "overdamped spring overshot: {}", v);
            last = v;
        }
    }

    #[test]
    fn test_critically_damped_does_not_overshoot() {
        let config = SpringConfig {
            stiffness: 100.0,
            damping: 20.0,
            ..SpringConfig::default()
        };
        assert!((config.damping_ratio() - 1.0).abs() < 1e-6);

        let mut spring = Spring::new(config, 0.0).unwrap();
        spring.update(1.0);
        for _ in 0..300 {
            assert!(spring.tick(1.0 / 60.0) <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut a = Spring::new(SpringConfig::default(), 0.0).unwrap();
        let mut b = a.clone();
        a.update(1.0);
        b.update(1.0);

        a.tick(5.0);
        b.tick(MAX_DT);
        assert_eq!(a.value(), b.value());
    }

    #[test]
    fn test_retarget_is_continuous() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.update(1.0);
        spring.tick(0.05);
        let before = spring.value();

        spring.update(-1.0);
        assert_eq!(spring.value(), before);
        let after = spring.tick(0.001);
        assert!((after - before).abs() < 0.01);
    }

    #[test]
    fn test_reset_jumps() {
        let mut spring = Spring::new(SpringConfig::default(), 0.0).unwrap();
        spring.update(1.0);
        spring.tick(0.05);
        spring.reset(0.5);
        assert_eq!(spring.value(), 0.5);
        assert!(spring.is_settled());
    }

    #[test]
    fn test_invalid_config() {
        let config = SpringConfig {
            stiffness: 0.0,
            ..SpringConfig::default()
        };
        assert!(Spring::new(config, 0.0).is_err());
    }

    #[test]
    fn test_exponential_smoother() {
        let mut smoother = ExponentialSmoother::new(0.1, 0.001, 0.0).unwrap();
        smoother.update(1.0);

        let first = smoother.tick(0.1);
        assert!((first - (1.0 - (-1.0f32).exp())).abs() < 1e-5);

        assert!(run_until_settled(&mut smoother, 1.0 / 60.0, 1000).is_some());
        assert_eq!(smoother.value(), 1.0);
    }

    #[test]
    fn test_spring2_settles_both_axes() {
        let mut spring = Spring2::new(SpringConfig::tilt(), Vec2::ZERO).unwrap();
        spring.update(Vec2::new(1.0, -1.0));
        for _ in 0..2000 {
            spring.tick(1.0 / 60.0);
        }
        assert!(spring.is_settled());
        assert_eq!(spring.value(), Vec2::new(1.0, -1.0));
    }
}
