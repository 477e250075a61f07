use super::{segment_intersection, Point2d, Vector2d};
use crate::util::Rect;
use cgmath::prelude::*;
use itertools::Itertools;

/// Tolerance used when deciding whether a point lies on an edge.
const EDGE_EPSILON: f64 = 1e-9;

/// A closed sequence of points.
///
/// Consecutive points, plus the last and first point, form the segments used
/// for both containment and intersection tests.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    points: Vec<Point2d>,
    bounds: Rect,
}

/// The result of a [`Polyline::nearest_point`] query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// The vector from the nearest point on the polyline to the query point.
    pub offset: Vector2d,
    /// The end points of the segment containing the nearest point.
    pub segment: [Point2d; 2],
}

impl Nearest {
    /// The distance from the query point to the polyline.
    pub fn distance(&self) -> f64 {
        self.offset.magnitude()
    }
}

impl Polyline {
    /// Creates a polyline, or `None` if fewer than two points are given.
    pub fn new(points: Vec<Point2d>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let bounds = Rect::bounding(&points)?;
        Some(Self { points, bounds })
    }

    /// The points of the polyline.
    pub fn points(&self) -> &[Point2d] {
        &self.points
    }

    /// The axis-aligned bounding box of the polyline.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The segments of the polyline, ending with the one that closes the loop.
    pub fn segments(&self) -> impl Iterator<Item = (Point2d, Point2d)> + '_ {
        self.points.iter().copied().circular_tuple_windows()
    }

    /// Tests whether a point lies inside the polygon formed by the polyline.
    ///
    /// Uses the even-odd rule. Points lying on an edge are outside, so a car
    /// sitting exactly on a boundary does not flicker in and out.
    pub fn contains(&self, point: Point2d) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        if self.segments().any(|(a, b)| on_segment(point, a, b)) {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.segments() {
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Finds the segment closest to the point.
    ///
    /// The point is projected onto each segment, clamped to the segment's end
    /// points. Ties go to the first segment in iteration order.
    pub fn nearest_point(&self, point: Point2d) -> Nearest {
        let mut best: Option<(f64, Nearest)> = None;
        for (a, b) in self.segments() {
            let offset = point - closest_on_segment(point, a, b);
            let dist2 = offset.magnitude2();
            if best.map_or(true, |(d, _)| dist2 < d) {
                let segment = [a, b];
                best = Some((dist2, Nearest { offset, segment }));
            }
        }
        // A polyline always has at least one segment
        best.map(|(_, nearest)| nearest).unwrap_or(Nearest {
            offset: Vector2d::new(0.0, 0.0),
            segment: [point, point],
        })
    }

    /// Finds where a segment first crosses the polyline, scanning the
    /// polyline's segments in order.
    ///
    /// The first crossing found wins, which is not necessarily the one
    /// closest to `start`. See [`Polyline::nearest_intersection`].
    pub fn first_intersection(&self, start: Point2d, end: Point2d) -> Option<Point2d> {
        self.segments()
            .find_map(|(a, b)| segment_intersection(a, b, start, end))
    }

    /// Every crossing between a segment and the polyline, in segment order.
    pub fn intersections(
        &self,
        start: Point2d,
        end: Point2d,
    ) -> impl Iterator<Item = Point2d> + '_ {
        self.segments()
            .filter_map(move |(a, b)| segment_intersection(a, b, start, end))
    }

    /// Finds the crossing between a segment and the polyline that is
    /// closest to `start`.
    pub fn nearest_intersection(&self, start: Point2d, end: Point2d) -> Option<Point2d> {
        self.intersections(start, end)
            .fold(None, |best: Option<Point2d>, hit| match best {
                Some(p) if p.distance2(start) <= hit.distance2(start) => Some(p),
                _ => Some(hit),
            })
    }
}

/// The point on segment `ab` closest to `point`.
/// A zero-length segment collapses to its start point.
fn closest_on_segment(point: Point2d, a: Point2d, b: Point2d) -> Point2d {
    let ab = b - a;
    let len2 = ab.magnitude2();
    if len2 == 0.0 {
        return a;
    }
    let t = ((point - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + t * ab
}

/// Whether `point` lies on segment `ab`.
fn on_segment(point: Point2d, a: Point2d, b: Point2d) -> bool {
    (point - closest_on_segment(point, a, b)).magnitude2() <= EDGE_EPSILON * EDGE_EPSILON
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn poly(points: &[[f64; 2]]) -> Polyline {
        Polyline::new(points.iter().map(|p| Point2d::new(p[0], p[1])).collect()).unwrap()
    }

    fn square() -> Polyline {
        poly(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]])
    }

    #[test]
    fn needs_two_points() {
        assert!(Polyline::new(vec![]).is_none());
        assert!(Polyline::new(vec![Point2d::new(1.0, 1.0)]).is_none());
        assert!(Polyline::new(vec![Point2d::new(1.0, 1.0), Point2d::new(2.0, 1.0)]).is_some());
    }

    #[test]
    fn segments_wrap_around() {
        let segs = square().segments().collect::<Vec<_>>();
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[0], (Point2d::new(0.0, 0.0), Point2d::new(10.0, 0.0)));
        assert_eq!(segs[3], (Point2d::new(0.0, 10.0), Point2d::new(0.0, 0.0)));
    }

    #[test]
    fn contains_interior_points() {
        let sq = square();
        assert!(sq.contains(Point2d::new(5.0, 5.0)));
        assert!(sq.contains(Point2d::new(0.1, 9.9)));
        assert!(!sq.contains(Point2d::new(-0.1, 5.0)));
        assert!(!sq.contains(Point2d::new(15.0, 5.0)));
    }

    #[test]
    fn edges_and_corners_are_outside() {
        let sq = square();
        assert!(!sq.contains(Point2d::new(0.0, 5.0)));
        assert!(!sq.contains(Point2d::new(10.0, 5.0)));
        assert!(!sq.contains(Point2d::new(5.0, 0.0)));
        assert!(!sq.contains(Point2d::new(10.0, 10.0)));
    }

    #[test]
    fn contains_concave_polygon() {
        // A "U" shape open towards +y
        let u = poly(&[
            [0.0, 0.0],
            [30.0, 0.0],
            [30.0, 30.0],
            [20.0, 30.0],
            [20.0, 10.0],
            [10.0, 10.0],
            [10.0, 30.0],
            [0.0, 30.0],
        ]);
        assert!(u.contains(Point2d::new(5.0, 20.0)));
        assert!(u.contains(Point2d::new(25.0, 20.0)));
        assert!(!u.contains(Point2d::new(15.0, 20.0)));
        assert!(u.contains(Point2d::new(15.0, 5.0)));
    }

    #[test]
    fn two_point_polyline_contains_nothing() {
        let line = poly(&[[0.0, 0.0], [10.0, 10.0]]);
        assert!(!line.contains(Point2d::new(5.0, 5.0)));
        assert!(!line.contains(Point2d::new(5.0, 4.0)));
    }

    #[test]
    fn outside_bounding_box_is_never_contained() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let pts = (0..rng.gen_range(3..9))
                .map(|_| [rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)])
                .collect::<Vec<_>>();
            let shape = poly(&pts);
            let b = shape.bounds();
            for _ in 0..20 {
                let p = Point2d::new(
                    b.x.max + rng.gen_range(0.001..50.0),
                    rng.gen_range(-200.0..200.0),
                );
                assert!(!shape.contains(p));
                let p = Point2d::new(
                    rng.gen_range(-200.0..200.0),
                    b.y.min - rng.gen_range(0.001..50.0),
                );
                assert!(!shape.contains(p));
            }
        }
    }

    #[test]
    fn convex_polygons_contain_their_centroid() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let n = rng.gen_range(3..12);
            let r = rng.gen_range(1.0..100.0);
            let cx = rng.gen_range(-500.0..500.0);
            let cy = rng.gen_range(-500.0..500.0);
            let pts = (0..n)
                .map(|i| {
                    let a = std::f64::consts::TAU * i as f64 / n as f64;
                    [cx + r * a.cos(), cy + r * a.sin()]
                })
                .collect::<Vec<_>>();
            let shape = poly(&pts);
            let centroid = Point2d::new(
                pts.iter().map(|p| p[0]).sum::<f64>() / n as f64,
                pts.iter().map(|p| p[1]).sum::<f64>() / n as f64,
            );
            assert!(shape.contains(centroid));
        }
    }

    #[test]
    fn nearest_point_projects_onto_segment() {
        let sq = square();
        let n = sq.nearest_point(Point2d::new(4.0, -3.0));
        assert_approx_eq!(n.offset.x, 0.0);
        assert_approx_eq!(n.offset.y, -3.0);
        assert_eq!(n.segment, [Point2d::new(0.0, 0.0), Point2d::new(10.0, 0.0)]);

        // Beyond a corner the projection clamps to the end point
        let n = sq.nearest_point(Point2d::new(13.0, 14.0));
        assert_approx_eq!(n.offset.x, 3.0);
        assert_approx_eq!(n.offset.y, 4.0);
        assert_approx_eq!(n.distance(), 5.0);
    }

    #[test]
    fn nearest_point_ties_pick_first_segment() {
        // Equidistant from the bottom and left edges
        let n = square().nearest_point(Point2d::new(2.0, 2.0));
        assert_eq!(n.segment, [Point2d::new(0.0, 0.0), Point2d::new(10.0, 0.0)]);
    }

    #[test]
    fn nearest_point_handles_zero_length_segments() {
        let shape = poly(&[[0.0, 0.0], [0.0, 0.0], [10.0, 0.0]]);
        let n = shape.nearest_point(Point2d::new(-3.0, 4.0));
        assert_approx_eq!(n.distance(), 5.0);
    }

    #[test]
    fn nearest_distance_matches_returned_segment() {
        let mut rng = StdRng::seed_from_u64(5);
        let shape = poly(&[[0.0, 0.0], [40.0, 5.0], [35.0, 30.0], [10.0, 25.0], [-5.0, 12.0]]);
        for _ in 0..500 {
            let p = Point2d::new(rng.gen_range(-60.0..90.0), rng.gen_range(-60.0..90.0));
            let n = shape.nearest_point(p);
            let [a, b] = n.segment;
            let expected = (p - closest_on_segment(p, a, b)).magnitude();
            assert!(n.distance() >= 0.0);
            assert_approx_eq!(n.distance(), expected);
            // No other segment is closer
            for (a, b) in shape.segments() {
                assert!((p - closest_on_segment(p, a, b)).magnitude() >= n.distance() - 1e-9);
            }
        }
    }

    #[test]
    fn first_intersection_follows_segment_order() {
        let sq = square();
        // Crosses the bottom edge (segment 0) and the top edge (segment 2)
        let hit = sq.first_intersection(Point2d::new(5.0, 20.0), Point2d::new(5.0, -20.0));
        let hit = hit.unwrap();
        assert_approx_eq!(hit.y, 0.0);

        let hit = sq.nearest_intersection(Point2d::new(5.0, 20.0), Point2d::new(5.0, -20.0));
        assert_approx_eq!(hit.unwrap().y, 10.0);

        assert_eq!(
            sq.first_intersection(Point2d::new(20.0, 20.0), Point2d::new(30.0, -20.0)),
            None
        );
    }
}
