//! Tuning parameters for cars and races.

use crate::lidar::LidarSensor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("{name} friction {friction} would reverse velocity within one time step of {time_step}")]
    UnstableFriction {
        name: &'static str,
        friction: f64,
        time_step: f64,
    },
    #[error("acceleration coefficient {0} must be between 0.0 and 1.0")]
    InvalidAccelCoeff(f64),
    #[error("a race needs at least one lap")]
    ZeroLaps,
}

/// The handling model of a car. Immutable once the car is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlingParams {
    /// Friction coefficient on the drivable surface.
    pub on_road_friction: f64,
    /// Friction coefficient off the drivable surface.
    pub off_road_friction: f64,
    /// The maximum forward acceleration, and the reverse acceleration at full throttle.
    pub max_acceleration: f64,
    /// Steering rate divisor; higher values make steering less sensitive.
    pub rotation_rate: f64,
    /// The integration time step of one tick.
    pub time_step: f64,
    /// Shapes the forward acceleration curve.
    pub accel_coeff: f64,
    /// The throttle applied when a human driver reverses.
    pub reverse_scale: f64,
    /// The distance a corner is pushed out of an obstacle per tick.
    pub collision_nudge: f64,
}

impl Default for HandlingParams {
    fn default() -> Self {
        Self {
            on_road_friction: 0.9,
            off_road_friction: 1.55,
            max_acceleration: 15.0,
            rotation_rate: 50.0,
            time_step: 0.06,
            accel_coeff: 0.3,
            reverse_scale: 0.4,
            collision_nudge: 1.0,
        }
    }
}

impl HandlingParams {
    /// The top speed of the car on the road, in units per tick.
    pub fn max_velocity(&self) -> f64 {
        self.max_acceleration / self.on_road_friction
    }

    /// Checks that the parameters describe a stable handling model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("on_road_friction", self.on_road_friction)?;
        positive("off_road_friction", self.off_road_friction)?;
        positive("max_acceleration", self.max_acceleration)?;
        positive("rotation_rate", self.rotation_rate)?;
        positive("time_step", self.time_step)?;
        non_negative("reverse_scale", self.reverse_scale)?;
        non_negative("collision_nudge", self.collision_nudge)?;
        if !(0.0..=1.0).contains(&self.accel_coeff) {
            return Err(ConfigError::InvalidAccelCoeff(self.accel_coeff));
        }
        for (name, friction) in [
            ("on-road", self.on_road_friction),
            ("off-road", self.off_road_friction),
        ] {
            if friction * self.time_step >= 1.0 {
                return Err(ConfigError::UnstableFriction {
                    name,
                    friction,
                    time_step: self.time_step,
                });
            }
        }
        Ok(())
    }
}

/// The attributes of a simulated car.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarAttributes {
    /// The car's width.
    pub width: f64,
    /// The car's length, front to rear.
    pub length: f64,
    /// The car's handling model.
    pub handling: HandlingParams,
}

impl Default for CarAttributes {
    fn default() -> Self {
        Self {
            width: 32.0,
            length: 56.0,
            handling: HandlingParams::default(),
        }
    }
}

impl CarAttributes {
    /// Checks the footprint and the handling model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("length", self.length)?;
        self.handling.validate()
    }
}

/// How the reward signal for trained controllers is computed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardParams {
    /// Granted each time a checkpoint is passed.
    pub checkpoint_bonus: f64,
    /// Multiplied by the car's speed when the reward is read.
    pub speed_weight: f64,
    /// Added when the reward is read if the last command was full throttle.
    pub full_throttle_bonus: f64,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            checkpoint_bonus: 10.0,
            speed_weight: 0.001,
            full_throttle_bonus: 0.005,
        }
    }
}

/// Race-wide settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// The number of laps needed to finish.
    pub num_laps: usize,
    /// The reward model.
    pub reward: RewardParams,
    /// The lidar sensor fitted to policy-driven cars.
    pub lidar: LidarSensor,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            num_laps: 2,
            reward: RewardParams::default(),
            lidar: LidarSensor::default(),
        }
    }
}

impl RaceConfig {
    /// Checks the race settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_laps == 0 {
            return Err(ConfigError::ZeroLaps);
        }
        positive("lidar range", self.lidar.range)?;
        non_negative("checkpoint_bonus", self.reward.checkpoint_bonus)?;
        non_negative("speed_weight", self.reward.speed_weight)?;
        non_negative("full_throttle_bonus", self.reward.full_throttle_bonus)
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}
