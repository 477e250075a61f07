use super::{Point2d, Vector2d};
use cgmath::{Basis2, Rad, Rotation, Rotation2};

/// Rotates a vector 90 degrees clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// A unit vector pointing along the given heading.
///
/// A heading of zero points along the positive x-axis and positive angles
/// turn towards the positive y-axis.
pub fn heading_vector(heading: f64) -> Vector2d {
    Vector2d::new(heading.cos(), heading.sin())
}

/// Rotates a point about a pivot by `angle` radians.
pub fn rotate_about(point: Point2d, pivot: Point2d, angle: f64) -> Point2d {
    let rot: Basis2<f64> = Rotation2::from_angle(Rad(angle));
    pivot + rot.rotate_vector(point - pivot)
}

/// Returns `-1.0`, `0.0` or `1.0` according to the sign of `value`.
///
/// Unlike `f64::signum`, zero maps to zero.
pub fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
