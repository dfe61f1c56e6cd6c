//! Segment intersection, containment and distance queries.

use crate::constants::POINT_EPSILON;
use crate::model::Point;

/// Where two segments meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Intersection point
    pub point: Point,
    /// Parametric position on the first segment (0 at `p1`, 1 at `p2`)
    pub t: f64,
    /// Parametric position on the second segment (0 at `p3`, 1 at `p4`)
    pub u: f64,
}

/// Orientation of the triplet `(a, b, c)`: >0 left turn, <0 right turn, 0 collinear.
pub fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `p` lies within the bounding box of `a`-`b`; only meaningful for collinear points.
fn on_segment(a: &Point, p: &Point, b: &Point) -> bool {
    p.x <= a.x.max(b.x) + POINT_EPSILON
        && p.x >= a.x.min(b.x) - POINT_EPSILON
        && p.y <= a.y.max(b.y) + POINT_EPSILON
        && p.y >= a.y.min(b.y) - POINT_EPSILON
}

fn sign(value: f64) -> i8 {
    if value.abs() <= POINT_EPSILON {
        0
    } else if value > 0.0 {
        1
    } else {
        -1
    }
}

/// Whether segments `p1-p2` and `p3-p4` touch or cross, collinear overlaps included.
pub fn segments_intersect(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> bool {
    let o1 = sign(orientation(p1, p2, p3));
    let o2 = sign(orientation(p1, p2, p4));
    let o3 = sign(orientation(p3, p4, p1));
    let o4 = sign(orientation(p3, p4, p2));

    if o1 != o2 && o3 != o4 {
        return true;
    }

    (o1 == 0 && on_segment(p1, p3, p2))
        || (o2 == 0 && on_segment(p1, p4, p2))
        || (o3 == 0 && on_segment(p3, p1, p4))
        || (o4 == 0 && on_segment(p3, p2, p4))
}

/// Intersection point of segments `p1-p2` and `p3-p4`.
///
/// Parallel and collinear segments return `None`.
pub fn segment_intersection(p1: &Point, p2: &Point, p3: &Point, p4: &Point) -> Option<SegmentHit> {
    let d1x = p2.x - p1.x;
    let d1y = p2.y - p1.y;
    let d2x = p4.x - p3.x;
    let d2y = p4.y - p3.y;

    let denom = d1x * d2y - d1y * d2x;
    if denom.abs() < f64::EPSILON {
        return None;
    }

    let t = ((p3.x - p1.x) * d2y - (p3.y - p1.y) * d2x) / denom;
    let u = ((p3.x - p1.x) * d1y - (p3.y - p1.y) * d1x) / denom;

    let tol = 1e-9;
    if !(-tol..=1.0 + tol).contains(&t) || !(-tol..=1.0 + tol).contains(&u) {
        return None;
    }

    let t = t.clamp(0.0, 1.0);
    let u = u.clamp(0.0, 1.0);
    Some(SegmentHit {
        point: p1.lerp(p2, t),
        t,
        u,
    })
}

/// Edge pairs `(i, j)`, `i < j`, that share no endpoint in a closed ring of `n` points.
fn non_adjacent_edge_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| {
        ((i + 2)..n)
            .filter(move |&j| !(i == 0 && j == n - 1))
            .map(move |j| (i, j))
    })
}

/// All pairs of non-adjacent edges that intersect.
pub fn self_intersecting_edges(points: &[Point]) -> Vec<(usize, usize)> {
    let n = points.len();
    if n < 4 {
        return Vec::new();
    }

    non_adjacent_edge_pairs(n)
        .filter(|&(i, j)| {
            segments_intersect(
                &points[i],
                &points[(i + 1) % n],
                &points[j],
                &points[(j + 1) % n],
            )
        })
        .collect()
}

/// Whether any two non-adjacent edges of the closed polygon intersect.
pub fn find_self_intersections(points: &[Point]) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }

    non_adjacent_edge_pairs(n).any(|(i, j)| {
        segments_intersect(
            &points[i],
            &points[(i + 1) % n],
            &points[j],
            &points[(j + 1) % n],
        )
    })
}

/// Point-in-polygon via ray casting.
pub fn point_in_polygon(point: &Point, points: &[Point]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let vi = &points[i];
        let vj = &points[j];

        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Closest point to `p` on segment `a-b`.
pub fn project_onto_segment(p: &Point, a: &Point, b: &Point) -> Point {
    let l2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if l2 == 0.0 {
        return *a;
    }

    let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / l2).clamp(0.0, 1.0);
    a.lerp(b, t)
}

/// Distance from `p` to segment `a-b`; a zero-length segment measures to `a`.
pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    p.distance_to(&project_onto_segment(p, a, b))
}

/// Whether two polygons overlap: a vertex of one inside the other or crossing edges.
pub fn polygons_intersect(a: &[Point], b: &[Point]) -> bool {
    if a.iter().any(|p| point_in_polygon(p, b)) || b.iter().any(|p| point_in_polygon(p, a)) {
        return true;
    }

    let na = a.len();
    let nb = b.len();
    (0..na).any(|i| {
        (0..nb).any(|k| {
            segments_intersect(&a[i], &a[(i + 1) % na], &b[k], &b[(k + 1) % nb])
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square() -> Vec<Point> {
        vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]
    }

    #[test]
    fn test_crossing_segments() {
        let hit = segment_intersection(&p(0.0, 0.0), &p(10.0, 10.0), &p(0.0, 10.0), &p(10.0, 0.0))
            .unwrap();
        assert!(approx_eq(hit.point.x, 5.0));
        assert!(approx_eq(hit.point.y, 5.0));
        assert!(approx_eq(hit.t, 0.5));
        assert!(approx_eq(hit.u, 0.5));
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        assert!(
            segment_intersection(&p(0.0, 0.0), &p(10.0, 0.0), &p(0.0, 1.0), &p(10.0, 1.0))
                .is_none()
        );
        assert!(!segments_intersect(
            &p(0.0, 0.0),
            &p(10.0, 0.0),
            &p(0.0, 1.0),
            &p(10.0, 1.0)
        ));
    }

    #[test]
    fn test_disjoint_segments() {
        assert!(
            segment_intersection(&p(0.0, 0.0), &p(1.0, 1.0), &p(5.0, 0.0), &p(6.0, -1.0))
                .is_none()
        );
    }

    #[test]
    fn test_collinear_overlap_counts_as_intersection() {
        assert!(segments_intersect(
            &p(0.0, 0.0),
            &p(10.0, 0.0),
            &p(5.0, 0.0),
            &p(15.0, 0.0)
        ));
    }

    #[test]
    fn test_simple_square_has_no_self_intersection() {
        assert!(!find_self_intersections(&square()));
    }

    #[test]
    fn test_bowtie_self_intersects() {
        let bowtie = vec![p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)];
        assert!(find_self_intersections(&bowtie));
        assert_eq!(self_intersecting_edges(&bowtie), vec![(0, 2)]);
    }

    #[test]
    fn test_triangle_never_self_intersects() {
        assert!(!find_self_intersections(&[p(0.0, 0.0), p(1.0, 0.0), p(0.5, 1.0)]));
    }

    #[test]
    fn test_point_in_polygon() {
        assert!(point_in_polygon(&p(5.0, 5.0), &square()));
        assert!(!point_in_polygon(&p(15.0, 5.0), &square()));
        assert!(!point_in_polygon(&p(5.0, 5.0), &square()[..2]));
    }

    #[test]
    fn test_distance_to_segment() {
        assert!(approx_eq(
            distance_to_segment(&p(5.0, 3.0), &p(0.0, 0.0), &p(10.0, 0.0)),
            3.0
        ));
        // Beyond the end clamps to the endpoint
        assert!(approx_eq(
            distance_to_segment(&p(13.0, 4.0), &p(0.0, 0.0), &p(10.0, 0.0)),
            5.0
        ));
        // Degenerate segment
        assert!(approx_eq(
            distance_to_segment(&p(3.0, 4.0), &p(0.0, 0.0), &p(0.0, 0.0)),
            5.0
        ));
    }

    #[test]
    fn test_polygons_intersect() {
        let shifted: Vec<Point> = square().iter().map(|q| p(q.x + 5.0, q.y + 5.0)).collect();
        let far: Vec<Point> = square().iter().map(|q| p(q.x + 50.0, q.y)).collect();
        assert!(polygons_intersect(&square(), &shifted));
        assert!(!polygons_intersect(&square(), &far));
    }
}
