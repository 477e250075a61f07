pub use car::{Car, ControlInput, Driver, KeyState};
pub use cgmath;
pub use checkpoint::LapProgress;
pub use config::{CarAttributes, ConfigError, HandlingParams, RaceConfig, RewardParams};
pub use lidar::{HitMode, LidarReading, LidarSensor, NUM_PROBES};
pub use simulation::{Observation, SimError, Simulation};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use track::{RegionData, SpawnData, SpawnPoint, Track, TrackData, TrackError};
pub use util::{Interval, Rect};

mod car;
mod checkpoint;
mod config;
mod debug;
pub mod lidar;
pub mod math;
mod simulation;
mod track;
mod util;

new_key_type! {
    /// Unique ID of a [Car].
    pub struct CarId;
}

type CarSet = SlotMap<CarId, Car>;
