//! Polygon simplification: Ramer-Douglas-Peucker plus zoom-adaptive point budgets.
//!
//! The zoom-adaptive path is for rendering and interaction; it never touches
//! the committed segmentation. User-invoked simplification at a fixed
//! tolerance lives in [`crate::mutation`].

use crate::constants::{DEFAULT_MAX_POINTS, DEFAULT_MIN_POINTS};
use crate::model::{Point, Polygon};

/// Zoom range used when computing the adaptive target.
const TARGET_ZOOM_MIN: f64 = 0.2;
const TARGET_ZOOM_MAX: f64 = 5.0;

/// Below this zoom, large polygons skip RDP and are sampled directly.
const FAST_PATH_ZOOM: f64 = 0.5;
const FAST_PATH_MIN_POINTS: usize = 100;
const FAST_PATH_SAMPLE_CAP: usize = 50;

/// Point budget for zoom-adaptive simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointBudget {
    /// Never simplify below this many points
    pub min_points: usize,
    /// Never keep more than this many points
    pub max_points: usize,
}

impl Default for PointBudget {
    fn default() -> Self {
        Self {
            min_points: DEFAULT_MIN_POINTS,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl PointBudget {
    pub fn new(min_points: usize, max_points: usize) -> Self {
        Self {
            min_points,
            max_points: max_points.max(min_points),
        }
    }

    /// Point count to aim for at the given zoom; more detail when zoomed in.
    pub fn target(&self, zoom: f64) -> usize {
        let zoom = zoom.clamp(TARGET_ZOOM_MIN, TARGET_ZOOM_MAX);
        // Fields are public, so an inverted budget can skip `new`
        let max_points = self.max_points.max(self.min_points);
        let span = (max_points - self.min_points) as f64;
        let target = self.min_points as f64 + span * (1.0 - (-zoom / 2.0).exp());
        (target.round() as usize).clamp(self.min_points, max_points)
    }
}

/// RDP tolerance for a zoom level; tighter as zoom increases.
pub fn zoom_tolerance(zoom: f64) -> f64 {
    (1.0 / zoom.max(1.0)).max(0.1)
}

/// Simplify a point sequence with Ramer-Douglas-Peucker.
///
/// First and last points are always kept. Sequences with fewer than 3 points
/// are returned unchanged.
pub fn rdp(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    // Explicit stack; contours from the segmentation model can have thousands of points.
    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_idx = start;
        for i in (start + 1)..end {
            let d = perpendicular_distance(&points[i], &points[start], &points[end]);
            if d > max_dist {
                max_dist = d;
                max_idx = i;
            }
        }

        if max_dist > tolerance {
            kept[max_idx] = true;
            stack.push((start, max_idx));
            stack.push((max_idx, end));
        }
    }

    points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn perpendicular_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq == 0.0 {
        return p.distance_to(a);
    }

    let cross = dx * (a.y - p.y) - dy * (a.x - p.x);
    cross.abs() / length_sq.sqrt()
}

/// Pick `count` evenly spaced points, always keeping the first and last.
pub fn uniform_sample(points: &[Point], count: usize) -> Vec<Point> {
    let len = points.len();
    if count >= len {
        return points.to_vec();
    }
    match count {
        0 => return Vec::new(),
        1 => return vec![points[0]],
        _ => {}
    }

    let step = (len - 1) as f64 / (count - 1) as f64;
    (0..count)
        .map(|i| points[((i as f64 * step).round() as usize).min(len - 1)])
        .collect()
}

/// Zoom-adaptive simplification of a point sequence.
///
/// Never returns fewer than `budget.min_points` points (unless the input was
/// already that small) and never more than `budget.max_points`.
pub fn simplify_points(points: &[Point], zoom: f64, budget: PointBudget) -> Vec<Point> {
    if points.len() <= budget.min_points {
        return points.to_vec();
    }

    let target = budget.target(zoom);
    if points.len() <= target {
        return points.to_vec();
    }

    let clamped = zoom.clamp(TARGET_ZOOM_MIN, TARGET_ZOOM_MAX);
    if clamped < FAST_PATH_ZOOM && points.len() > FAST_PATH_MIN_POINTS {
        let count = target.min(FAST_PATH_SAMPLE_CAP).max(budget.min_points);
        return uniform_sample(points, count);
    }

    let simplified = rdp(points, zoom_tolerance(zoom));
    if simplified.len() < budget.min_points {
        uniform_sample(points, budget.min_points)
    } else if simplified.len() > target {
        uniform_sample(&simplified, target)
    } else {
        simplified
    }
}

/// Zoom-adaptive simplification of one polygon.
pub fn simplify_polygon(polygon: &Polygon, zoom: f64, budget: PointBudget) -> Polygon {
    polygon.with_points(simplify_points(&polygon.points, zoom, budget))
}

/// Simplify every polygon independently.
pub fn simplify_all(polygons: &[Polygon], zoom: f64, budget: PointBudget) -> Vec<Polygon> {
    polygons
        .iter()
        .map(|p| simplify_polygon(p, zoom, budget))
        .collect()
}
