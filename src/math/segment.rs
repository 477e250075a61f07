use super::{Point2d, Vector2d};

/// The z-component of the cross product of two planar vectors.
fn cross(a: Vector2d, b: Vector2d) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Finds the point at which two line segments intersect.
///
/// Both parametric solutions must lie within `[0, 1]`, so segments that only
/// touch at an end point still intersect. Parallel and collinear segments
/// (including zero-length ones) never intersect; overlapping collinear
/// segments are not resolved.
///
/// # Parameters
/// * `a1`, `a2` - The end points of the first segment
/// * `b1`, `b2` - The end points of the second segment
pub fn segment_intersection(
    a1: Point2d,
    a2: Point2d,
    b1: Point2d,
    b2: Point2d,
) -> Option<Point2d> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = cross(r, s);
    if denom == 0.0 {
        return None;
    }
    let qp = b1 - a1;
    let ua = cross(qp, s) / denom;
    let ub = cross(qp, r) / denom;
    // NaN fails both range checks.
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(a1 + ua * r)
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    #[test]
    fn crossing_segments() {
        let hit = segment_intersection(p(0.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(10.0, 0.0));
        let hit = hit.unwrap();
        assert_approx_eq!(hit.x, 5.0);
        assert_approx_eq!(hit.y, 5.0);
    }

    #[test]
    fn touching_end_points_intersect() {
        let hit = segment_intersection(p(0.0, 0.0), p(4.0, 0.0), p(4.0, 0.0), p(4.0, 3.0));
        assert_eq!(hit, Some(p(4.0, 0.0)));
    }

    #[test]
    fn disjoint_segments() {
        let hit = segment_intersection(p(0.0, 0.0), p(1.0, 1.0), p(3.0, 0.0), p(2.0, 1.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn parallel_and_degenerate_segments() {
        // Parallel
        assert_eq!(
            segment_intersection(p(0.0, 0.0), p(5.0, 0.0), p(0.0, 1.0), p(5.0, 1.0)),
            None
        );
        // Collinear overlap is deliberately unresolved
        assert_eq!(
            segment_intersection(p(0.0, 0.0), p(5.0, 0.0), p(2.0, 0.0), p(8.0, 0.0)),
            None
        );
        // Zero-length
        assert_eq!(
            segment_intersection(p(1.0, 1.0), p(1.0, 1.0), p(0.0, 0.0), p(2.0, 2.0)),
            None
        );
    }

    #[test]
    fn non_finite_input_never_intersects() {
        let hit = segment_intersection(p(f64::NAN, 0.0), p(5.0, 5.0), p(0.0, 5.0), p(5.0, 0.0));
        assert_eq!(hit, None);
    }

    #[test]
    fn intersection_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut rand_point = || p(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        for _ in 0..2000 {
            let (a1, a2, b1, b2) = (rand_point(), rand_point(), rand_point(), rand_point());
            let ab = segment_intersection(a1, a2, b1, b2);
            let ba = segment_intersection(b1, b2, a1, a2);
            match (ab, ba) {
                (Some(ab), Some(ba)) => {
                    assert_approx_eq!(ab.x, ba.x, 1e-6);
                    assert_approx_eq!(ab.y, ba.y, 1e-6);
                }
                (None, None) => {}
                other => panic!("asymmetric result {:?}", other),
            }
        }
    }
}
