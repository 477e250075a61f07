use race_sim::lidar::{PROBE_FORWARD_LEFT, PROBE_FORWARD_RIGHT};
use race_sim::{
    CarAttributes, ControlInput, Driver, RaceConfig, RegionData, Simulation, SpawnData, Track,
    TrackData,
};
use std::time::Instant;

const NUM_CARS: usize = 20;
const MAX_FRAMES: usize = 20_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let track = match std::env::args().nth(1) {
        Some(path) => Track::from_json(&std::fs::read_to_string(path)?)?,
        None => Track::new(&circuit())?,
    };
    log::info!(
        "Loaded a {}x{} track",
        track.bounds().width(),
        track.bounds().height()
    );

    let mut sim = Simulation::new(track, RaceConfig::default())?;
    let range = sim.config().lidar.range;
    let mut cars = Vec::with_capacity(NUM_CARS);
    for i in 0..NUM_CARS {
        // Slightly different cars, so they don't all finish together
        let attrs = CarAttributes {
            length: 50.0 + i as f64 * 0.5,
            ..Default::default()
        };
        cars.push(sim.add_car(&attrs, Driver::Policy)?);
    }

    let start = Instant::now();
    let mut total_reward = 0.0;
    while !sim.is_race_over() && sim.frame() < MAX_FRAMES {
        for id in &cars {
            let obs = sim.observe(*id)?;
            total_reward += obs.reward;
            // Steer towards whichever side has more room
            let [left, right] = [PROBE_FORWARD_LEFT, PROBE_FORWARD_RIGHT].map(|p| obs.distances[p]);
            let steering = 2.0 * (right - left) / range;
            sim.set_action(*id, ControlInput::new(steering, 1.0, false))?;
        }
        sim.step();
    }
    let frame = start.elapsed() / sim.frame().max(1) as u32;

    match sim.winner() {
        Some(id) => log::info!("Car {:?} won after {} frames", id, sim.frame()),
        None => log::info!("Nobody finished within {} frames", sim.frame()),
    }
    log::info!(
        "Avg. frame: {:?} for {} cars, total reward {:.1}",
        frame,
        cars.len(),
        total_reward
    );
    Ok(())
}

/// A rectangular circuit with a checkpoint on each straight.
fn circuit() -> TrackData {
    let rect = |name: &str, [x1, y1]: [f64; 2], [x2, y2]: [f64; 2]| RegionData {
        name: name.to_string(),
        points: vec![[x1, y1], [x2, y1], [x2, y2], [x1, y2]],
    };
    TrackData {
        width: 1200.0,
        height: 900.0,
        regions: vec![
            rect("wall:Outer", [50.0, 50.0], [1150.0, 850.0]),
            rect("wall:Inner", [250.0, 250.0], [950.0, 650.0]),
            rect("checkpoint:0", [580.0, 50.0], [620.0, 250.0]),
            rect("checkpoint:1", [950.0, 430.0], [1150.0, 470.0]),
            rect("checkpoint:2", [580.0, 650.0], [620.0, 850.0]),
            rect("checkpoint:3", [50.0, 430.0], [250.0, 470.0]),
        ],
        spawns: vec![SpawnData {
            name: "spawn:AI".to_string(),
            position: [300.0, 150.0],
            heading: 0.0,
        }],
    }
}
