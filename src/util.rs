//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;

use crate::math::Point2d;

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Float> Interval<T> {
    /// The smallest interval containing every value, or `None` if there are none.
    pub fn enclosing(values: impl IntoIterator<Item = T>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| {
            Some(match acc {
                None => Self::new(v, v),
                Some(i) => Self::new(T::min(i.min, v), T::max(i.max, v)),
            })
        })
    }

    /// Returns the centre/mid-point of the interval.
    pub fn midpoint(&self) -> T {
        T::from(0.5).unwrap() * (self.min + self.max)
    }

    /// Clamps a value to the interval.
    /// Unlike `f64::clamp`, an inverted interval does not panic; the lower bound wins.
    pub fn clamp(&self, value: T) -> T {
        T::max(self.min, T::min(self.max, value))
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// An axis-aligned rectangle.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct Rect {
    pub x: Interval<f64>,
    pub y: Interval<f64>,
}

impl Rect {
    /// Creates a rectangle spanning the origin to `(width, height)`.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self {
            x: Interval::new(0.0, width),
            y: Interval::new(0.0, height),
        }
    }

    /// The bounding rectangle of a set of points, or `None` if there are none.
    pub fn bounding(points: &[Point2d]) -> Option<Self> {
        Some(Self {
            x: Interval::enclosing(points.iter().map(|p| p.x))?,
            y: Interval::enclosing(points.iter().map(|p| p.y))?,
        })
    }

    /// The centre of the rectangle.
    pub fn centre(&self) -> Point2d {
        Point2d::new(self.x.midpoint(), self.y.midpoint())
    }

    /// The width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x.length()
    }

    /// The height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y.length()
    }

    /// Returns true if the point lies inside or on the edge of the rectangle.
    pub fn contains(&self, point: Point2d) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y)
    }
}
