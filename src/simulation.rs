use crate::car::{Car, ControlInput, Driver, KeyState};
use crate::config::{CarAttributes, ConfigError, RaceConfig};
use crate::debug::debug_footprint;
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::lidar::{LidarReading, NUM_PROBES};
use crate::math::Point2d;
use crate::track::Track;
use crate::{CarId, CarSet};
use thiserror::Error;

/// Errors raised by [`Simulation`] operations.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("no car with ID {0:?}")]
    UnknownCar(CarId),
    #[error("the track has no spawn named `{0}`")]
    UnknownSpawn(String),
    #[error("car {id:?} is not driven by a {expected:?} driver")]
    WrongDriver { id: CarId, expected: Driver },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What an external controller sees of its car after a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observation {
    /// The lidar distances.
    pub distances: [f64; NUM_PROBES],
    /// The reward earned since the last observation.
    pub reward: f64,
    /// Whether the car is still alive.
    pub alive: bool,
    /// Whether the car has completed the race.
    pub finished: bool,
}

/// A race simulation.
pub struct Simulation {
    /// The track being raced on.
    track: Track,
    /// The race settings.
    config: RaceConfig,
    /// The cars in the race.
    cars: CarSet,
    /// The order in which cars are updated each tick.
    order: Vec<CarId>,
    /// The current frame of simulation.
    frame: usize,
    /// The first car to complete the race.
    winner: Option<CarId>,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation on the given track.
    pub fn new(track: Track, config: RaceConfig) -> Result<Self, SimError> {
        config.validate()?;
        log::info!(
            "Starting a {} lap race on a track with {} checkpoints",
            config.num_laps,
            track.num_checkpoints()
        );
        Ok(Self {
            track,
            config,
            cars: CarSet::with_key(),
            order: vec![],
            frame: 0,
            winner: None,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        })
    }

    /// Adds a car at the spawn point reserved for its kind of driver.
    pub fn add_car(
        &mut self,
        attributes: &CarAttributes,
        driver: Driver,
    ) -> Result<CarId, SimError> {
        let spawn = self.track.spawn_for(driver);
        let (position, heading) = (spawn.position, spawn.heading);
        self.add_car_at(attributes, driver, position, heading)
    }

    /// Adds a car at the named spawn point.
    pub fn add_car_at_spawn(
        &mut self,
        attributes: &CarAttributes,
        driver: Driver,
        spawn: &str,
    ) -> Result<CarId, SimError> {
        let spawn = self
            .track
            .spawn(spawn)
            .ok_or_else(|| SimError::UnknownSpawn(spawn.to_string()))?;
        let (position, heading) = (spawn.position, spawn.heading);
        self.add_car_at(attributes, driver, position, heading)
    }

    /// Adds a car centred on `position`, facing `heading` radians.
    pub fn add_car_at(
        &mut self,
        attributes: &CarAttributes,
        driver: Driver,
        position: Point2d,
        heading: f64,
    ) -> Result<CarId, SimError> {
        attributes.validate()?;
        let id = self
            .cars
            .insert_with_key(|id| Car::new(id, attributes, driver, position, heading));
        self.order.push(id);
        log::debug!("Added {:?} car {:?} at {:?}", driver, id, position);
        Ok(id)
    }

    /// Removes a car from the simulation.
    pub fn remove_car(&mut self, id: CarId) -> Result<Car, SimError> {
        let car = self.cars.remove(id).ok_or(SimError::UnknownCar(id))?;
        self.order.retain(|other| *other != id);
        log::debug!("Removed car {:?}", id);
        Ok(car)
    }

    /// Kills a car. A dead car is no longer advanced and cannot be revived.
    pub fn kill(&mut self, id: CarId) -> Result<(), SimError> {
        let car = self.car_mut(id)?;
        if car.is_alive() {
            car.kill();
            log::debug!(
                "Killed car {:?} after {} checkpoints",
                id,
                car.checkpoints_passed()
            );
        }
        Ok(())
    }

    /// Sets the keys held by the driver of a human-driven car.
    pub fn set_keys(&mut self, id: CarId, keys: KeyState) -> Result<(), SimError> {
        let car = self.car_of(id, Driver::Human)?;
        let input = ControlInput::from_keys(keys, car.handling().reverse_scale);
        car.set_input(input);
        Ok(())
    }

    /// Sets the command for a policy-driven car.
    ///
    /// Out of range values are clamped and non-finite values treated as zero.
    pub fn set_action(&mut self, id: CarId, input: ControlInput) -> Result<(), SimError> {
        self.car_of(id, Driver::Policy)?.set_input(input);
        Ok(())
    }

    /// Advances the simulation by one tick.
    ///
    /// Cars are updated one after another in the order they were added.
    /// Dead and finished cars stay where they are.
    pub fn step(&mut self) {
        for id in &self.order {
            let car = &mut self.cars[*id];
            if !car.is_alive() || car.is_finished() {
                continue;
            }
            let finished = Self::advance_car(&self.track, &self.config, car);
            debug_footprint(*id, &car.corners());
            if finished && self.winner.is_none() {
                log::info!("Car {:?} won the race on frame {}", id, self.frame);
                self.winner = Some(*id);
            }
        }
        self.frame += 1;

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Gets the track.
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Gets the race settings.
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// Returns an iterator over all the cars, in update order.
    pub fn iter_cars(&self) -> impl Iterator<Item = &Car> {
        self.order.iter().map(|id| &self.cars[*id])
    }

    /// Gets a reference to the car with the given ID.
    pub fn car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(id)
    }

    /// The first car to complete the race, if any.
    pub fn winner(&self) -> Option<CarId> {
        self.winner
    }

    /// Whether the race has been won, or no car is left racing.
    pub fn is_race_over(&self) -> bool {
        self.winner.is_some()
            || !self
                .cars
                .values()
                .any(|car| car.is_alive() && !car.is_finished())
    }

    /// Scans the track walls with the lidar sensor of a car.
    pub fn lidar(&self, id: CarId) -> Result<LidarReading, SimError> {
        let car = self.cars.get(id).ok_or(SimError::UnknownCar(id))?;
        Ok(self
            .config
            .lidar
            .scan(car.position(), car.heading(), &self.track.walls()))
    }

    /// Reads and clears the reward a car earned since the last read.
    pub fn take_reward(&mut self, id: CarId) -> Result<f64, SimError> {
        let params = self.config.reward;
        Ok(self.car_mut(id)?.take_reward(&params))
    }

    /// Everything an external controller needs for its next decision.
    /// Reading an observation clears the car's reward.
    pub fn observe(&mut self, id: CarId) -> Result<Observation, SimError> {
        let distances = self.lidar(id)?.distances;
        let reward = self.take_reward(id)?;
        let car = &self.cars[id];
        Ok(Observation {
            distances,
            reward,
            alive: car.is_alive(),
            finished: car.is_finished(),
        })
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    fn car_mut(&mut self, id: CarId) -> Result<&mut Car, SimError> {
        self.cars.get_mut(id).ok_or(SimError::UnknownCar(id))
    }

    /// Gets a car, checking who drives it.
    fn car_of(&mut self, id: CarId, expected: Driver) -> Result<&mut Car, SimError> {
        let car = self.car_mut(id)?;
        if car.driver() == expected {
            Ok(car)
        } else {
            Err(SimError::WrongDriver { id, expected })
        }
    }

    /// Runs one tick for a single car. Returns `true` if the car just
    /// completed the race.
    fn advance_car(track: &Track, config: &RaceConfig, car: &mut Car) -> bool {
        let off_road = track.is_off_road(car.position());
        car.integrate(track, off_road);
        // Checkpoints are judged where the car ended up
        if off_road || track.is_off_road(car.position()) {
            return false;
        }

        if car.update_checkpoints(track, config.reward.checkpoint_bonus) {
            log::debug!(
                "Car {:?} passed checkpoint {}",
                car.id(),
                car.checkpoints_passed()
            );
        }
        if car.laps_done(track.num_checkpoints()) >= config.num_laps {
            car.finish();
            return true;
        }
        false
    }
}
