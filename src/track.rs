use crate::car::Driver;
use crate::math::{Point2d, Polyline};
use crate::util::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when building a [`Track`].
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("map size {width} x {height} must be positive and finite")]
    InvalidSize { width: f64, height: f64 },
    #[error("region `{0}` needs at least two points")]
    TooFewPoints(String),
    #[error("region `{0}` has a non-finite coordinate")]
    NonFinitePoint(String),
    #[error("region name `{0}` is not of the form `wall:Outer`, `wall:Inner`, `block:*` or `checkpoint:<index>`")]
    UnknownRegion(String),
    #[error("region `{0}` is defined more than once")]
    DuplicateRegion(String),
    #[error("the track has no `wall:{0}` region")]
    MissingWall(&'static str),
    #[error("the track has no checkpoints")]
    NoCheckpoints,
    #[error("checkpoint {0} is missing; checkpoints must be numbered from 0 without gaps")]
    MissingCheckpoint(usize),
    #[error("the track has no spawn points")]
    NoSpawns,
    #[error("spawn `{0}` has a non-finite position or heading")]
    InvalidSpawn(String),
    #[error("invalid track JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A track as supplied by a map loader.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackData {
    /// The width of the map.
    pub width: f64,
    /// The height of the map.
    pub height: f64,
    /// The named polygons of the track.
    pub regions: Vec<RegionData>,
    /// The named starting positions.
    pub spawns: Vec<SpawnData>,
}

/// A named polygon. The name is tagged with its role, e.g. `checkpoint:3`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionData {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// A named starting position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpawnData {
    pub name: String,
    pub position: [f64; 2],
    /// The initial heading in radians.
    #[serde(default)]
    pub heading: f64,
}

/// A starting position on the track.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnPoint {
    pub name: String,
    pub position: Point2d,
    pub heading: f64,
}

/// The static geometry of a race track. Read-only once built.
#[derive(Clone, Debug)]
pub struct Track {
    /// The map boundary.
    bounds: Rect,
    /// The outer edge of the drivable surface.
    outer_wall: Polyline,
    /// The inner edge of the drivable surface.
    inner_wall: Polyline,
    /// Hard obstacles, by name.
    blocks: BTreeMap<String, Polyline>,
    /// The checkpoints, in the order they must be passed.
    checkpoints: Vec<Polyline>,
    /// The starting positions.
    spawns: Vec<SpawnPoint>,
}

/// The role of a named region.
enum Role {
    Outer,
    Inner,
    Block,
    Checkpoint(usize),
}

impl Role {
    fn parse(name: &str) -> Option<Self> {
        let (role, id) = name.split_once(':')?;
        let id = id.trim();
        match role.trim().to_ascii_lowercase().as_str() {
            "wall" if id.eq_ignore_ascii_case("outer") => Some(Role::Outer),
            "wall" if id.eq_ignore_ascii_case("inner") => Some(Role::Inner),
            "block" => Some(Role::Block),
            "checkpoint" => id.parse().ok().map(Role::Checkpoint),
            _ => None,
        }
    }
}

impl Track {
    /// Builds and validates a track.
    pub fn new(data: &TrackData) -> Result<Self, TrackError> {
        if !(data.width.is_finite() && data.height.is_finite())
            || data.width <= 0.0
            || data.height <= 0.0
        {
            return Err(TrackError::InvalidSize {
                width: data.width,
                height: data.height,
            });
        }

        let mut outer_wall = None;
        let mut inner_wall = None;
        let mut blocks = BTreeMap::new();
        let mut checkpoints = BTreeMap::new();

        for region in &data.regions {
            let role = Role::parse(&region.name)
                .ok_or_else(|| TrackError::UnknownRegion(region.name.clone()))?;
            let polyline = Self::build_polyline(region)?;
            let previous = match role {
                Role::Outer => outer_wall.replace(polyline),
                Role::Inner => inner_wall.replace(polyline),
                Role::Block => blocks.insert(region.name.clone(), polyline),
                Role::Checkpoint(idx) => checkpoints.insert(idx, polyline),
            };
            if previous.is_some() {
                return Err(TrackError::DuplicateRegion(region.name.clone()));
            }
        }

        let outer_wall = outer_wall.ok_or(TrackError::MissingWall("Outer"))?;
        let inner_wall = inner_wall.ok_or(TrackError::MissingWall("Inner"))?;
        if checkpoints.is_empty() {
            return Err(TrackError::NoCheckpoints);
        }
        // Keys are sorted, so any gap shows up as a key/position mismatch.
        if let Some(missing) = checkpoints.keys().enumerate().find(|(pos, idx)| pos != *idx) {
            return Err(TrackError::MissingCheckpoint(missing.0));
        }
        let checkpoints = checkpoints.into_values().collect::<Vec<_>>();

        let spawns = data
            .spawns
            .iter()
            .map(|spawn| {
                let [x, y] = spawn.position;
                if [x, y, spawn.heading].iter().all(|v| v.is_finite()) {
                    Ok(SpawnPoint {
                        name: spawn.name.clone(),
                        position: Point2d::new(x, y),
                        heading: spawn.heading,
                    })
                } else {
                    Err(TrackError::InvalidSpawn(spawn.name.clone()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        if spawns.is_empty() {
            return Err(TrackError::NoSpawns);
        }

        log::info!(
            "Loaded {}x{} track with {} checkpoints, {} blocks and {} spawns",
            data.width,
            data.height,
            checkpoints.len(),
            blocks.len(),
            spawns.len()
        );

        Ok(Self {
            bounds: Rect::from_size(data.width, data.height),
            outer_wall,
            inner_wall,
            blocks,
            checkpoints,
            spawns,
        })
    }

    /// Parses and builds a track from JSON.
    pub fn from_json(json: &str) -> Result<Self, TrackError> {
        let data: TrackData = serde_json::from_str(json)?;
        Self::new(&data)
    }

    fn build_polyline(region: &RegionData) -> Result<Polyline, TrackError> {
        if region.points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(TrackError::NonFinitePoint(region.name.clone()));
        }
        let points = region
            .points
            .iter()
            .map(|&[x, y]| Point2d::new(x, y))
            .collect();
        Polyline::new(points).ok_or_else(|| TrackError::TooFewPoints(region.name.clone()))
    }

    /// The map boundary.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The outer and inner walls, which the lidar senses.
    pub fn walls(&self) -> [&Polyline; 2] {
        [&self.outer_wall, &self.inner_wall]
    }

    /// The hard obstacles that human-driven cars collide with.
    pub fn blocks(&self) -> impl Iterator<Item = &Polyline> {
        self.blocks.values()
    }

    /// The checkpoints, in the order they must be passed.
    pub fn checkpoints(&self) -> &[Polyline] {
        &self.checkpoints
    }

    /// The number of checkpoints in one lap.
    pub fn num_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }

    /// The starting positions.
    pub fn spawns(&self) -> &[SpawnPoint] {
        &self.spawns
    }

    /// Finds a spawn point by name.
    pub fn spawn(&self, name: &str) -> Option<&SpawnPoint> {
        self.spawns.iter().find(|spawn| spawn.name == name)
    }

    /// Finds the spawn point reserved for the given kind of driver.
    ///
    /// Picks the first spawn whose name contains `ai` or `human`
    /// (case-insensitive), falling back to the first spawn.
    pub fn spawn_for(&self, driver: Driver) -> &SpawnPoint {
        let tag = match driver {
            Driver::Human => "human",
            Driver::Policy => "ai",
        };
        self.spawns
            .iter()
            .find(|spawn| spawn.name.to_ascii_lowercase().contains(tag))
            .unwrap_or(&self.spawns[0])
    }

    /// Whether a point lies off the drivable surface.
    ///
    /// The road is the region inside exactly one of the two walls.
    pub fn is_off_road(&self, point: Point2d) -> bool {
        self.outer_wall.contains(point) == self.inner_wall.contains(point)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A square circuit: a 1000 x 1000 map with a 100-unit wide road.
    pub(crate) fn square_track_data(num_checkpoints: usize) -> TrackData {
        let region = |name: &str, points: &[[f64; 2]]| RegionData {
            name: name.to_string(),
            points: points.to_vec(),
        };
        let mut regions = vec![
            region(
                "wall:Outer",
                &[[100.0, 100.0], [900.0, 100.0], [900.0, 900.0], [100.0, 900.0]],
            ),
            region(
                "wall:Inner",
                &[[200.0, 200.0], [800.0, 200.0], [800.0, 800.0], [200.0, 800.0]],
            ),
            region(
                "block:cone",
                &[[600.0, 172.0], [640.0, 172.0], [640.0, 196.0], [600.0, 196.0]],
            ),
        ];
        // Checkpoints are slabs across the road, spread clockwise (on screen)
        // starting from the top straight.
        let centres = [[500.0, 150.0], [850.0, 500.0], [500.0, 850.0], [150.0, 500.0]];
        for i in 0..num_checkpoints {
            let [cx, cy] = centres[i % 4];
            let shift = (i / 4) as f64 * 20.0;
            let pts = if i % 2 == 0 {
                [
                    [cx - 5.0 + shift, cy - 50.0],
                    [cx + 5.0 + shift, cy - 50.0],
                    [cx + 5.0 + shift, cy + 50.0],
                    [cx - 5.0 + shift, cy + 50.0],
                ]
            } else {
                [
                    [cx - 50.0, cy - 5.0 + shift],
                    [cx + 50.0, cy - 5.0 + shift],
                    [cx + 50.0, cy + 5.0 + shift],
                    [cx - 50.0, cy + 5.0 + shift],
                ]
            };
            regions.push(region(&format!("checkpoint:{}", i), &pts));
        }
        TrackData {
            width: 1000.0,
            height: 1000.0,
            regions,
            spawns: vec![
                SpawnData {
                    name: "spawn:Human".to_string(),
                    position: [300.0, 150.0],
                    heading: 0.0,
                },
                SpawnData {
                    name: "spawn:AI".to_string(),
                    position: [300.0, 160.0],
                    heading: 0.0,
                },
            ],
        }
    }

    #[test]
    fn builds_square_track() {
        let track = Track::new(&square_track_data(4)).unwrap();
        assert_eq!(track.num_checkpoints(), 4);
        assert_eq!(track.blocks().count(), 1);
        assert_eq!(track.bounds(), Rect::from_size(1000.0, 1000.0));
    }

    #[test]
    fn off_road_rule() {
        let track = Track::new(&square_track_data(4)).unwrap();
        // On the road
        assert!(!track.is_off_road(Point2d::new(150.0, 500.0)));
        // Infield
        assert!(track.is_off_road(Point2d::new(500.0, 500.0)));
        // Outside the outer wall
        assert!(track.is_off_road(Point2d::new(50.0, 50.0)));
    }

    #[test]
    fn spawn_lookup() {
        let track = Track::new(&square_track_data(4)).unwrap();
        assert_eq!(track.spawn("spawn:AI").unwrap().position, Point2d::new(300.0, 160.0));
        assert!(track.spawn("nope").is_none());
        assert_eq!(track.spawn_for(Driver::Human).name, "spawn:Human");
        assert_eq!(track.spawn_for(Driver::Policy).name, "spawn:AI");
    }

    #[test]
    fn checkpoint_names_are_ordered_numerically() {
        let mut data = square_track_data(12);
        data.regions.reverse();
        let track = Track::new(&data).unwrap();
        let first = track.checkpoints()[0].points()[0];
        assert_eq!(first, Point2d::new(495.0, 100.0));
        assert_eq!(track.num_checkpoints(), 12);
    }

    #[test]
    fn rejects_missing_walls_and_checkpoints() {
        let mut data = square_track_data(4);
        data.regions.retain(|r| r.name != "wall:Inner");
        assert!(matches!(Track::new(&data), Err(TrackError::MissingWall("Inner"))));

        let data = square_track_data(0);
        assert!(matches!(Track::new(&data), Err(TrackError::NoCheckpoints)));

        let mut data = square_track_data(4);
        data.regions.retain(|r| r.name != "checkpoint:1");
        assert!(matches!(Track::new(&data), Err(TrackError::MissingCheckpoint(1))));
    }

    #[test]
    fn rejects_malformed_regions() {
        let mut data = square_track_data(4);
        data.regions[2].points.truncate(1);
        assert!(matches!(Track::new(&data), Err(TrackError::TooFewPoints(name)) if name == "block:cone"));

        let mut data = square_track_data(4);
        data.regions[0].name = "lava:pit".to_string();
        assert!(matches!(Track::new(&data), Err(TrackError::UnknownRegion(_))));

        let mut data = square_track_data(4);
        data.regions[0].points[1][0] = f64::NAN;
        assert!(matches!(Track::new(&data), Err(TrackError::NonFinitePoint(_))));

        let mut data = square_track_data(4);
        let dup = data.regions[3].clone();
        data.regions.push(dup);
        assert!(matches!(Track::new(&data), Err(TrackError::DuplicateRegion(_))));

        let mut data = square_track_data(4);
        data.spawns.clear();
        assert!(matches!(Track::new(&data), Err(TrackError::NoSpawns)));

        let mut data = square_track_data(4);
        data.height = 0.0;
        assert!(matches!(Track::new(&data), Err(TrackError::InvalidSize { .. })));
    }

    #[test]
    fn loads_from_json() {
        let json = serde_json::to_string(&square_track_data(4)).unwrap();
        let track = Track::from_json(&json).unwrap();
        assert_eq!(track.num_checkpoints(), 4);

        assert!(matches!(Track::from_json("{ not json"), Err(TrackError::Json(_))));
    }
}
