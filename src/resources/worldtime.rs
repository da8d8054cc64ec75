//! Simulation clock resource.
//!
//! Holds the scaled frame delta and a fixed-timestep accumulator. The
//! FixedUpdate phase consumes the accumulator in `fixed_delta` slices.

use bevy_ecs::prelude::Resource;

const DEFAULT_FIXED_HZ: f32 = 50.0;
/// Frame deltas above this are clamped before feeding the accumulator.
const MAX_FRAME_DELTA: f32 = 0.25;

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
    /// Delta of the phase step currently running: `fixed_delta` inside
    /// FixedUpdate, `delta` elsewhere.
    pub step_delta: f32,
    /// Length of one FixedUpdate step in seconds.
    pub fixed_delta: f32,
    /// Upper bound of FixedUpdate steps per frame.
    pub max_fixed_steps: u32,
    accumulator: f32,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
            step_delta: 0.0,
            fixed_delta: 1.0 / DEFAULT_FIXED_HZ,
            max_fixed_steps: 8,
            accumulator: 0.0,
        }
    }
}

impl WorldTime {
    /// Non-finite or negative scales are ignored.
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        if time_scale.is_finite() && time_scale >= 0.0 {
            self.time_scale = time_scale;
        }
        self
    }

    pub fn with_fixed_hz(mut self, hz: f32) -> Self {
        if hz > 0.0 {
            self.fixed_delta = 1.0 / hz;
        }
        self
    }

    pub fn with_max_fixed_steps(mut self, steps: u32) -> Self {
        self.max_fixed_steps = steps.max(1);
        self
    }

    /// Advance by an unscaled frame delta. A non-finite delta counts as zero.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt } else { 0.0 };
        let scaled = dt.clamp(0.0, MAX_FRAME_DELTA) * self.time_scale;
        self.elapsed += scaled;
        self.delta = scaled;
        self.step_delta = scaled;
        self.frame_count += 1;
        self.accumulator += scaled;
    }

    /// Number of FixedUpdate steps owed this frame, consuming them from the
    /// accumulator. Steps beyond `max_fixed_steps` are dropped.
    pub fn take_fixed_steps(&mut self) -> u32 {
        if self.fixed_delta <= 0.0 {
            return 0;
        }
        let mut steps = 0;
        while self.accumulator >= self.fixed_delta && steps < self.max_fixed_steps {
            self.accumulator -= self.fixed_delta;
            steps += 1;
        }
        if steps == self.max_fixed_steps && self.accumulator >= self.fixed_delta {
            self.accumulator %= self.fixed_delta;
        }
        steps
    }

    /// Fraction of a fixed step left in the accumulator.
    pub fn interpolation_alpha(&self) -> f32 {
        if self.fixed_delta <= 0.0 {
            0.0
        } else {
            self.accumulator / self.fixed_delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_advance_applies_time_scale() {
        let mut time = WorldTime::default().with_time_scale(0.5);
        time.advance(0.1);
        assert!((time.delta - 0.05).abs() < EPSILON);
        assert!((time.elapsed - 0.05).abs() < EPSILON);
        assert_eq!(time.frame_count, 1);
    }

    #[test]
    fn test_fixed_steps_consumed_from_accumulator() {
        let mut time = WorldTime::default().with_fixed_hz(10.0);
        time.advance(0.25);
        assert_eq!(time.take_fixed_steps(), 2);
        assert!((time.interpolation_alpha() - 0.5).abs() < EPSILON);
        assert_eq!(time.take_fixed_steps(), 0);
    }

    #[test]
    fn test_fixed_steps_capped() {
        let mut time = WorldTime::default()
            .with_fixed_hz(100.0)
            .with_max_fixed_steps(3);
        time.advance(0.2);
        assert_eq!(time.take_fixed_steps(), 3);
        assert!(time.interpolation_alpha() < 1.0);
    }

    #[test]
    fn test_non_finite_delta_counts_as_zero() {
        let mut time = WorldTime::default().with_fixed_hz(10.0);
        time.advance(f32::NAN);
        time.advance(f32::INFINITY);
        assert_eq!(time.elapsed, 0.0);
        assert_eq!(time.delta, 0.0);
        assert_eq!(time.frame_count, 2);
        assert_eq!(time.take_fixed_steps(), 0);

        time.advance(0.25);
        assert_eq!(time.take_fixed_steps(), 2);
        assert!(time.elapsed.is_finite());
    }

    #[test]
    fn test_bad_time_scale_is_ignored() {
        let time = WorldTime::default().with_time_scale(f32::NAN).with_time_scale(-2.0);
        assert_eq!(time.time_scale, 1.0);
    }
}
