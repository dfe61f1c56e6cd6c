//! Area, perimeter, winding and shape descriptors.

use serde::{Deserialize, Serialize};

use crate::model::{BoundingBox, Point};

/// Vertex ordering of a closed polygon in image space (y axis pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Positive signed shoelace sum; clockwise on screen
    Clockwise,
    /// Negative signed shoelace sum
    CounterClockwise,
    /// Zero area, no defined orientation
    Degenerate,
}

/// Signed shoelace area; positive for clockwise polygons in image space.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum * 0.5
}

/// Polygon area via the shoelace formula. 0 for fewer than 3 points.
pub fn area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Closed-loop perimeter. 0 for fewer than 2 points.
pub fn perimeter(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }

    (0..n)
        .map(|i| points[i].distance_to(&points[(i + 1) % n]))
        .sum()
}

pub fn winding(points: &[Point]) -> Winding {
    let signed = signed_area(points);
    if signed > 0.0 {
        Winding::Clockwise
    } else if signed < 0.0 {
        Winding::CounterClockwise
    } else {
        Winding::Degenerate
    }
}

/// Return the points in clockwise order, reversing if needed.
///
/// The first vertex is kept in place so indices stay recognizable.
pub fn normalize_winding(points: &[Point]) -> Vec<Point> {
    match winding(points) {
        Winding::CounterClockwise => {
            let mut out = Vec::with_capacity(points.len());
            out.push(points[0]);
            out.extend(points[1..].iter().rev().copied());
            out
        }
        Winding::Clockwise | Winding::Degenerate => points.to_vec(),
    }
}

/// Area centroid, falling back to the vertex average for zero-area input.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let signed = signed_area(points);
    if signed.abs() < f64::EPSILON {
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        return Some(Point::new(sx / n, sy / n));
    }

    let n = points.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    let factor = 1.0 / (6.0 * signed);
    Some(Point::new(cx * factor, cy * factor))
}

/// Convex hull using the monotone chain algorithm.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup_by(|a, b| a.approx_eq(b));

    if sorted.len() < 3 {
        return sorted;
    }

    let cross = |o: &Point, a: &Point, b: &Point| (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x);

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Morphology descriptors of one polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonMetrics {
    pub area: f64,
    pub perimeter: f64,
    /// `4πA / P²`; 1 for a circle, 0 for degenerate input
    pub circularity: f64,
    /// Area divided by convex hull area
    pub solidity: f64,
    pub centroid: Point,
    pub bounding_box: BoundingBox,
}

impl PolygonMetrics {
    /// Compute metrics, `None` for an empty point list.
    pub fn compute(points: &[Point]) -> Option<Self> {
        let bounding_box = BoundingBox::from_points(points)?;
        let centroid = centroid(points)?;
        let area = area(points);
        let perimeter = perimeter(points);

        let circularity = if perimeter > 0.0 {
            4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
        } else {
            0.0
        };

        let hull_area = self::area(&convex_hull(points));
        let solidity = if hull_area > 0.0 { area / hull_area } else { 0.0 };

        Some(Self {
            area,
            perimeter,
            circularity,
            solidity,
            centroid,
            bounding_box,
        })
    }
}
