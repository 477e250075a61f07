/// Who drives a car. Fixed when the car is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Driver {
    /// A person at the keyboard, or anything mimicking one.
    Human,
    /// An external controller reading lidar and reward, e.g. a trained network.
    Policy,
}

/// The keys a human driver is holding down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// One tick's worth of driving commands.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlInput {
    /// Steering from full left (-1) to full right (1).
    pub steering: f64,
    /// Throttle from 0 to 1.
    pub throttle: f64,
    /// Whether the throttle drives the car backwards.
    pub reverse: bool,
}

impl ControlInput {
    /// Creates a new control input.
    pub fn new(steering: f64, throttle: f64, reverse: bool) -> Self {
        Self {
            steering,
            throttle,
            reverse,
        }
    }

    /// Maps held keys to a control input.
    ///
    /// Holding `down` reverses at `reverse_scale` throttle; holding both
    /// `up` and `down` drives forwards at the difference.
    pub fn from_keys(keys: KeyState, reverse_scale: f64) -> Self {
        let held = |key: bool| if key { 1.0 } else { 0.0 };
        let steering = held(keys.right) - held(keys.left);
        let linear = reverse_scale * held(keys.down) - held(keys.up);
        Self {
            steering,
            throttle: linear.abs(),
            reverse: linear > 0.0,
        }
    }

    /// Clamps the input to its valid range. Non-finite values become zero.
    pub fn sanitized(self) -> Self {
        let clamp = |value: f64, min: f64| {
            if value.is_finite() {
                value.clamp(min, 1.0)
            } else {
                log::warn!("Ignoring non-finite control value {}", value);
                0.0
            }
        };
        Self {
            steering: clamp(self.steering, -1.0),
            throttle: clamp(self.throttle, 0.0),
            reverse: self.reverse,
        }
    }

    /// Whether the input asks for full forward throttle.
    pub fn is_full_throttle(&self) -> bool {
        !self.reverse && self.throttle >= 1.0
    }
}
