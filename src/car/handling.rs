use super::control::ControlInput;
use crate::config::HandlingParams;
use std::f64::consts::{LN_10, PI};

impl HandlingParams {
    /// The friction coefficient for the current surface.
    pub fn friction(&self, off_road: bool) -> f64 {
        if off_road {
            self.off_road_friction
        } else {
            self.on_road_friction
        }
    }

    /// The heading change for one tick.
    ///
    /// Proportional to speed, so a stationary car cannot turn.
    pub fn rotation_delta(&self, steering: f64, speed: f64) -> f64 {
        steering * PI * (speed / self.rotation_rate) * self.time_step
    }

    /// The longitudinal acceleration requested by `input` at the given speed.
    /// Negative values push the car backwards.
    pub fn acceleration(&self, input: &ControlInput, speed: f64) -> f64 {
        if input.reverse {
            -input.throttle * self.max_acceleration
        } else {
            input.throttle * self.gradual_acceleration(speed)
        }
    }

    /// Full-throttle forward acceleration, eased in logarithmically as the
    /// car approaches its top speed.
    pub fn gradual_acceleration(&self, speed: f64) -> f64 {
        let ratio = speed / self.max_velocity();
        if ratio > 1.0 || ratio.is_nan() {
            return self.max_acceleration;
        }
        let ratio = f64::max(ratio, 0.0);
        let eased = 1.0 - (10.0 - 9.0 * ratio).ln() / LN_10;
        let c = self.accel_coeff;
        let a = self.max_acceleration;
        (eased * a * (1.0 - c) + a * c) * (1.0 + c)
    }
}
