//! Polygon integrity checks.

use std::collections::BTreeMap;

use crate::constants::{MIN_POLYGON_VERTICES, POINT_EPSILON};
use crate::model::{Point, Polygon, PolygonId};

use super::intersect::find_self_intersections;

/// Outcome of a validation pass. Errors accumulate; nothing is fixed up.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Count pairs of points whose coordinates match within [`POINT_EPSILON`].
///
/// Each pair is counted once, regardless of whether the points are adjacent.
pub fn find_duplicate_points(points: &[Point]) -> usize {
    let mut sorted: Vec<&Point> = points.iter().collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut count = 0;
    for i in 0..sorted.len() {
        for other in &sorted[i + 1..] {
            if other.x - sorted[i].x > POINT_EPSILON {
                break;
            }
            if sorted[i].approx_eq(other) {
                count += 1;
            }
        }
    }
    count
}

/// Which checks [`validate_points`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checks {
    pub duplicates: bool,
    pub self_intersections: bool,
}

impl Checks {
    pub const ALL: Checks = Checks {
        duplicates: true,
        self_intersections: true,
    };

    /// Vertex count and finiteness only.
    pub const NONE: Checks = Checks {
        duplicates: false,
        self_intersections: false,
    };
}

pub(crate) fn validate_points(points: &[Point], checks: Checks) -> Vec<String> {
    let mut errors = Vec::new();

    if points.len() < MIN_POLYGON_VERTICES {
        errors.push(format!(
            "Polygon must have at least {} points, has {}",
            MIN_POLYGON_VERTICES,
            points.len()
        ));
    }

    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        errors.push("Polygon contains non-finite coordinates".to_string());
    }

    if checks.duplicates {
        let duplicates = find_duplicate_points(points);
        if duplicates > 0 {
            errors.push(format!("Polygon has {} duplicate points", duplicates));
        }
    }

    if checks.self_intersections && find_self_intersections(points) {
        errors.push("Polygon has self-intersections".to_string());
    }

    errors
}

/// Validate a single polygon: id, vertex count, duplicates, self-intersections.
///
/// `kind` is a closed enum, so an unrecognized kind can't reach this point; it
/// is rejected when the polygon is deserialized.
pub fn validate_polygon(polygon: &Polygon) -> ValidationReport {
    let mut errors = Vec::new();

    if polygon.id.is_empty() {
        errors.push("Polygon must have an id".to_string());
    }

    errors.extend(validate_points(&polygon.points, Checks::ALL));
    ValidationReport::from_errors(errors)
}

/// Validate every polygon and the uniqueness of ids across the set.
pub fn validate_polygon_set(polygons: &[Polygon]) -> ValidationReport {
    let mut errors = Vec::new();

    for (index, polygon) in polygons.iter().enumerate() {
        let report = validate_polygon(polygon);
        errors.extend(
            report
                .errors
                .into_iter()
                .map(|e| format!("Polygon {} ({}): {}", index, polygon.id, e)),
        );
    }

    let mut counts: BTreeMap<&PolygonId, usize> = BTreeMap::new();
    for polygon in polygons {
        *counts.entry(&polygon.id).or_default() += 1;
    }
    for (id, count) in counts {
        if count > 1 {
            errors.push(format!("Duplicate polygon id '{}' used by {} polygons", id, count));
        }
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PolygonKind;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn square(id: &str) -> Polygon {
        Polygon::new(
            id,
            vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)],
            PolygonKind::External,
        )
    }

    #[test]
    fn test_valid_square() {
        let report = validate_polygon(&square("a"));
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_duplicate_points_counted_once_per_pair() {
        assert_eq!(find_duplicate_points(&[p(0.0, 0.0), p(1.0, 0.0)]), 0);
        assert_eq!(find_duplicate_points(&[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.0)]), 1);
        // Three coincident points form three pairs
        assert_eq!(
            find_duplicate_points(&[p(2.0, 2.0), p(2.0, 2.0), p(2.0, 2.0)]),
            3
        );
    }

    #[test]
    fn test_duplicate_epsilon_boundary() {
        let within = [p(1.0, 1.0), p(1.0 + POINT_EPSILON / 2.0, 1.0)];
        let outside = [p(1.0, 1.0), p(1.0 + POINT_EPSILON * 10.0, 1.0)];
        assert_eq!(find_duplicate_points(&within), 1);
        assert_eq!(find_duplicate_points(&outside), 0);
    }

    #[test]
    fn test_multiple_failures_accumulate() {
        let poly = Polygon::new("", vec![p(0.0, 0.0), p(0.0, 0.0)], PolygonKind::Internal);
        let report = validate_polygon(&poly);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_self_intersection_reported() {
        let bowtie = Polygon::new(
            "bow",
            vec![p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)],
            PolygonKind::External,
        );
        let report = validate_polygon(&bowtie);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("self-intersections"));
    }

    #[test]
    fn test_set_reports_each_duplicate_id_once() {
        let set = vec![square("a"), square("a"), square("a"), square("b")];
        let report = validate_polygon_set(&set);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("'a' used by 3 polygons"));
    }

    #[test]
    fn test_set_prefixes_per_polygon_errors() {
        let mut bad = square("b");
        bad.points.truncate(2);
        let report = validate_polygon_set(&[square("a"), bad]);
        assert!(!report.is_valid);
        assert!(report.errors[0].starts_with("Polygon 1 (b):"));
    }
}
