use crate::checkpoint::LapProgress;
use crate::config::{CarAttributes, HandlingParams, RewardParams};
use crate::math::{heading_vector, rot90, rotate_about, sign, Point2d, Vector2d};
use crate::track::Track;
use crate::util::{Interval, Rect};
use crate::CarId;
use cgmath::prelude::*;

pub use control::{ControlInput, Driver, KeyState};

mod control;
mod handling;

/// A simulated car.
#[derive(Clone, Debug)]
pub struct Car {
    /// The car's ID
    id: CarId,
    /// Who drives the car.
    driver: Driver,
    /// Half the car's width.
    half_wid: f64,
    /// Half the car's length.
    half_len: f64,
    /// The handling model.
    handling: HandlingParams,
    /// The heading in radians. Not wrapped, so it may exceed a full turn.
    heading: f64,
    /// The velocity in units per tick.
    vel: Vector2d,
    /// The corners of the footprint: front left, front right, rear right, rear left.
    corners: [Point2d; 4],
    /// The bounding rectangle of the corners.
    bounds: Rect,
    /// The friction coefficient applied on the last update.
    friction: f64,
    /// Whether the car was off the road on the last update.
    off_road: bool,
    /// Checkpoint progress.
    progress: LapProgress,
    /// Cleared once, when the car is killed.
    alive: bool,
    /// Set once the car completes the race.
    finished: bool,
    /// Reward accumulated since it was last read.
    reward: f64,
    /// The most recent control input.
    input: ControlInput,
}

impl Car {
    /// Creates a new car centred on `position`, facing `heading` radians.
    pub(crate) fn new(
        id: CarId,
        attributes: &CarAttributes,
        driver: Driver,
        position: Point2d,
        heading: f64,
    ) -> Self {
        let half_wid = 0.5 * attributes.width;
        let half_len = 0.5 * attributes.length;
        let fwd = heading_vector(heading);
        let right = rot90(fwd);
        let corners = [
            position + half_len * fwd - half_wid * right,
            position + half_len * fwd + half_wid * right,
            position - half_len * fwd + half_wid * right,
            position - half_len * fwd - half_wid * right,
        ];
        Self {
            id,
            driver,
            half_wid,
            half_len,
            handling: attributes.handling,
            heading,
            vel: Vector2d::new(0.0, 0.0),
            corners,
            bounds: bounding_rect(&corners),
            friction: attributes.handling.on_road_friction,
            off_road: false,
            progress: LapProgress::default(),
            alive: true,
            finished: false,
            reward: 0.0,
            input: ControlInput::default(),
        }
    }

    /// Gets the car's ID.
    pub fn id(&self) -> CarId {
        self.id
    }

    /// Who drives the car.
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// Whether the car is driven by an external controller.
    pub fn is_ai(&self) -> bool {
        self.driver == Driver::Policy
    }

    /// The car's width.
    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// The car's length.
    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    /// The handling model.
    pub fn handling(&self) -> &HandlingParams {
        &self.handling
    }

    /// The centroid of the car's footprint.
    pub fn position(&self) -> Point2d {
        Point2d::centroid(&self.corners)
    }

    /// The heading in radians. Not wrapped to a single turn.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// The heading in degrees, wrapped to `[0, 360)`.
    pub fn heading_degrees(&self) -> f64 {
        self.heading.to_degrees().rem_euclid(360.0)
    }

    /// A unit vector in the direction the car is facing.
    pub fn direction(&self) -> Vector2d {
        heading_vector(self.heading)
    }

    /// The velocity in units per tick.
    pub fn velocity(&self) -> Vector2d {
        self.vel
    }

    /// The magnitude of the velocity.
    pub fn speed(&self) -> f64 {
        self.vel.magnitude()
    }

    /// The corners of the footprint: front left, front right, rear right, rear left.
    pub fn corners(&self) -> [Point2d; 4] {
        self.corners
    }

    /// The axis-aligned bounding rectangle of the footprint.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The friction coefficient applied on the last update.
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Whether the car was off the road on the last update.
    pub fn is_off_road(&self) -> bool {
        self.off_road
    }

    /// The car's checkpoint progress.
    pub fn progress(&self) -> LapProgress {
        self.progress
    }

    /// The total number of checkpoints passed.
    pub fn checkpoints_passed(&self) -> usize {
        self.progress.checkpoints_passed()
    }

    /// The number of laps completed on a track with `num_checkpoints` checkpoints.
    pub fn laps_done(&self, num_checkpoints: usize) -> usize {
        self.progress.laps_done(num_checkpoints)
    }

    /// Whether the car is still racing or waiting to be read.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the car has completed the race.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The most recent control input.
    pub fn input(&self) -> ControlInput {
        self.input
    }

    /// Sets the control input used by subsequent updates.
    pub(crate) fn set_input(&mut self, input: ControlInput) {
        self.input = input.sanitized();
    }

    /// Kills the car. There is no way back.
    pub(crate) fn kill(&mut self) {
        self.alive = false;
    }

    /// Marks the car as having completed the race.
    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }

    /// Reads and clears the reward accumulated since the last read.
    ///
    /// The reading also rewards the current speed and a full-throttle command.
    /// Only policy-driven cars earn reward; human cars always read zero.
    pub(crate) fn take_reward(&mut self, params: &RewardParams) -> f64 {
        if !self.is_ai() {
            return 0.0;
        }
        let mut reward = self.reward + params.speed_weight * self.speed();
        if self.input.is_full_throttle() {
            reward += params.full_throttle_bonus;
        }
        self.reward = 0.0;
        reward
    }

    /// Advances the checkpoint counter if the car is inside the next checkpoint,
    /// granting `bonus` reward. Returns `true` if a checkpoint was passed.
    pub(crate) fn update_checkpoints(&mut self, track: &Track, bonus: f64) -> bool {
        let passed = self.progress.update(track.checkpoints(), self.position());
        if passed && self.is_ai() {
            self.reward += bonus;
        }
        passed
    }

    /// Integrates the car's motion over one tick.
    ///
    /// # Parameters
    /// * `track` - The track, for the map boundary and obstacles
    /// * `off_road` - Whether the car is off the drivable surface
    pub(crate) fn integrate(&mut self, track: &Track, off_road: bool) {
        let params = self.handling;
        self.off_road = off_road;
        self.friction = params.friction(off_road);

        // Steer. Turning needs speed.
        let speed = self.speed();
        self.rotate(params.rotation_delta(self.input.steering, speed));

        // Accelerate along the new heading
        let acc = params.acceleration(&self.input, speed) * self.direction();
        self.vel += (acc - self.friction * self.vel) * params.time_step;
        let max_vel = params.max_velocity();
        if self.vel.magnitude2() > max_vel * max_vel {
            self.vel = self.vel.normalize_to(max_vel);
        }

        self.translate(track);
        self.bounds = bounding_rect(&self.corners);
    }

    /// Rotates the footprint by `angle` radians about a pivot a quarter of
    /// the car's length ahead of its centre.
    fn rotate(&mut self, angle: f64) {
        if angle == 0.0 {
            return;
        }
        let pivot = self.position() + 0.5 * self.half_len * self.direction();
        self.heading += angle;
        for corner in &mut self.corners {
            *corner = rotate_about(*corner, pivot, angle);
        }
    }

    /// Moves the footprint by the velocity, resolving collisions with
    /// obstacles and the map boundary.
    fn translate(&mut self, track: &Track) {
        let mut disp = self.vel;

        // Push human-driven cars out of obstacles a fixed step at a time
        if self.driver == Driver::Human {
            if let Some(nudge) = self.obstacle_nudge(track, disp) {
                log::trace!("Car {:?} nudged out of obstacle by {:?}", self.id, nudge);
                if nudge.x != 0.0 {
                    disp.x = nudge.x;
                }
                if nudge.y != 0.0 {
                    disp.y = nudge.y;
                }
            }
        }

        // Stop at the map boundary
        let map = track.bounds();
        let current = bounding_rect(&self.corners);
        let allowed_x = Interval::new(map.x.min - current.x.min, map.x.max - current.x.max);
        let allowed_y = Interval::new(map.y.min - current.y.min, map.y.max - current.y.max);
        let clamped = Vector2d::new(allowed_x.clamp(disp.x), allowed_y.clamp(disp.y));
        if clamped.x != disp.x {
            self.vel.x = 0.0;
        }
        if clamped.y != disp.y {
            self.vel.y = 0.0;
        }

        for corner in &mut self.corners {
            *corner += clamped;
        }
    }

    /// Finds the first corner that would end up inside an obstacle and
    /// returns a unit step along the axis of its largest offset from the
    /// obstacle's edge, pointing back out. Only the stepped axis is non-zero.
    fn obstacle_nudge(&self, track: &Track, disp: Vector2d) -> Option<Vector2d> {
        let step = self.handling.collision_nudge;
        self.corners.iter().find_map(|corner| {
            let moved = *corner + disp;
            let block = track.blocks().find(|block| block.contains(moved))?;
            let offset = block.nearest_point(moved).offset;
            Some(if offset.x.abs() >= offset.y.abs() {
                Vector2d::new(-step * sign(offset.x), 0.0)
            } else {
                Vector2d::new(0.0, -step * sign(offset.y))
            })
        })
    }
}

/// The bounding rectangle of a car's corners.
fn bounding_rect(corners: &[Point2d; 4]) -> Rect {
    let xs = corners.map(|p| p.x);
    let ys = corners.map(|p| p.y);
    Rect {
        x: Interval::new(
            xs.iter().copied().fold(f64::INFINITY, f64::min),
            xs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        ),
        y: Interval::new(
            ys.iter().copied().fold(f64::INFINITY, f64::min),
            ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        ),
    }
}
