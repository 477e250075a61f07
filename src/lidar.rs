use crate::debug::{debug_hit, debug_probe};
use crate::math::{heading_vector, Point2d, Polyline};
use cgmath::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// The number of distances in a [`LidarReading`].
pub const NUM_PROBES: usize = 4;

/// Index of the probe along the car's axis, reaching both ahead and behind.
pub const PROBE_AXIAL: usize = 0;
/// Index of the probe at 90° to the right of the heading.
pub const PROBE_RIGHT: usize = 1;
/// Index of the probe at 45° to the right of the heading.
pub const PROBE_FORWARD_RIGHT: usize = 2;
/// Index of the probe at 45° to the left of the heading.
pub const PROBE_FORWARD_LEFT: usize = 3;

/// Which intersection of a probe with an obstacle is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitMode {
    /// The first crossing found when scanning the obstacle's segments in order.
    #[default]
    First,
    /// The crossing closest to the car's centre.
    Nearest,
}

/// A synthetic lidar sensor mounted on the centre of a car.
///
/// Probes are fixed-length segments cast from the car's centre. Each probe
/// reports the distance to the obstacle it hits, or the sensor's range if it
/// hits nothing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidarSensor {
    /// The length of each probe.
    pub range: f64,
    /// How hits along a probe are chosen.
    pub mode: HitMode,
}

/// A single lidar scan.
#[derive(Clone, Debug, PartialEq)]
pub struct LidarReading {
    /// The distance measured by each probe, in `[0, range]`.
    pub distances: [f64; NUM_PROBES],
    /// The end points of each probe.
    pub probes: [[Point2d; 2]; NUM_PROBES],
    /// Every point at which a probe hit an obstacle.
    pub hits: SmallVec<[Point2d; 8]>,
}

impl Default for LidarSensor {
    fn default() -> Self {
        Self {
            range: 250.0,
            mode: HitMode::First,
        }
    }
}

impl LidarSensor {
    /// Creates a sensor with the given probe length.
    pub fn new(range: f64) -> Self {
        Self {
            range,
            ..Default::default()
        }
    }

    /// Computes the probe segments for a car at `centre` facing `heading` radians.
    pub fn probes(&self, centre: Point2d, heading: f64) -> [[Point2d; 2]; NUM_PROBES] {
        let ray = |angle: f64| self.range * heading_vector(heading + angle);
        let mut probes = [[centre; 2]; NUM_PROBES];
        probes[PROBE_AXIAL] = [centre - ray(0.0), centre + ray(0.0)];
        probes[PROBE_RIGHT] = [centre, centre + ray(FRAC_PI_2)];
        probes[PROBE_FORWARD_RIGHT] = [centre, centre + ray(FRAC_PI_4)];
        probes[PROBE_FORWARD_LEFT] = [centre, centre + ray(-FRAC_PI_4)];
        probes
    }

    /// Scans the obstacles from a car at `centre` facing `heading` radians.
    ///
    /// Each probe reports the smallest distance from `centre` to a hit across
    /// all obstacles. The axial probe is cast as two half-rays, ahead and
    /// behind, and reports the nearer of the two.
    pub fn scan(&self, centre: Point2d, heading: f64, obstacles: &[&Polyline]) -> LidarReading {
        let probes = self.probes(centre, heading);
        let mut distances = [self.range; NUM_PROBES];
        let mut hits = SmallVec::new();

        for (idx, (probe, distance)) in probes.iter().zip(distances.iter_mut()).enumerate() {
            let [start, end] = *probe;
            *distance = if idx == PROBE_AXIAL {
                let behind = self.cast(centre, start, obstacles, &mut hits);
                let ahead = self.cast(centre, end, obstacles, &mut hits);
                f64::min(behind, ahead)
            } else {
                self.cast(centre, end, obstacles, &mut hits)
            };
            debug_probe(start, end, *distance);
        }

        LidarReading {
            distances,
            probes,
            hits,
        }
    }

    /// Casts a single ray from `from` to `to`, returning the distance to the
    /// closest hit across all obstacles, or the range if nothing is hit.
    fn cast(
        &self,
        from: Point2d,
        to: Point2d,
        obstacles: &[&Polyline],
        hits: &mut SmallVec<[Point2d; 8]>,
    ) -> f64 {
        let mut distance = self.range;
        for obstacle in obstacles {
            let hit = match self.mode {
                HitMode::First => obstacle.first_intersection(from, to),
                HitMode::Nearest => obstacle.nearest_intersection(from, to),
            };
            if let Some(hit) = hit {
                debug_hit(hit);
                hits.push(hit);
                distance = f64::min(distance, from.distance(hit));
            }
        }
        distance
    }
}
