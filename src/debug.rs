//! Shapes drawn by a visual debugger. Only recorded with the `debug` feature.

use crate::math::Point2d;
use crate::CarId;
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

#[cfg(feature = "debug")]
fn record(shape: serde_json::Value) {
    FRAME.with(|frame| frame.borrow_mut().push(shape));
}

/// Records a lidar probe and the distance it measured.
#[allow(unused)]
pub fn debug_probe(start: Point2d, end: Point2d, distance: f64) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "probe",
        "start": [start.x, start.y],
        "end": [end.x, end.y],
        "distance": distance,
    }));
}

/// Records a point where a probe hit an obstacle.
#[allow(unused)]
pub fn debug_hit(point: Point2d) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "hit",
        "point": [point.x, point.y],
    }));
}

/// Records the footprint of a car.
#[allow(unused)]
pub fn debug_footprint(id: CarId, corners: &[Point2d; 4]) {
    #[cfg(feature = "debug")]
    record(json!({
        "type": "car",
        "id": format!("{:?}", id),
        "corners": corners.map(|p| [p.x, p.y]),
    }));
}

/// Takes every shape recorded since the last call, as a JSON array.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(FRAME.with(|frame| frame.take()))
}
