//! Vertex and polygon edits on a segmentation.
//!
//! Every operation takes the current [`SegmentationResult`] and returns a new
//! one, or an [`EditError`] with the input left untouched. Geometry is
//! validated before anything is handed back, so a partially applied edit
//! can't escape.

use crate::color_utils::color_for_index;
use crate::constants::MIN_POLYGON_VERTICES;
use crate::error::EditError;
use crate::geometry::{normalize_winding, validate_points, Checks};
use crate::model::{IdGenerator, Point, Polygon, PolygonId, PolygonKind, SegmentationResult};
use crate::simplify::rdp;

/// Result of a fixed-tolerance simplification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyOutcome {
    /// Vertex count before simplification
    pub before: usize,
    /// Vertex count after simplification
    pub after: usize,
}

impl SimplifyOutcome {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }

    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Replace one polygon's points after validating them with `checks`.
fn edit_points(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    checks: Checks,
    edit: impl FnOnce(&Polygon) -> Result<Vec<Point>, EditError>,
) -> Result<SegmentationResult, EditError> {
    let index = segmentation.position(id)?;
    let polygon = &segmentation.polygons()[index];
    let points = edit(polygon)?;

    let errors = validate_points(&points, checks);
    if !errors.is_empty() {
        log::warn!("Edit on polygon {} rejected: {}", id, errors.join("; "));
        return Err(EditError::invalid_all(errors));
    }

    Ok(segmentation.splice_polygon(index, vec![polygon.with_points(points)]))
}

fn check_point_index(polygon: &Polygon, index: usize) -> Result<(), EditError> {
    if index >= polygon.points.len() {
        return Err(EditError::InvalidPointIndex {
            index,
            len: polygon.points.len(),
        });
    }
    Ok(())
}

/// Append a vertex after the last one.
pub fn add_point(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    point: Point,
) -> Result<SegmentationResult, EditError> {
    edit_points(segmentation, id, Checks::ALL, |polygon| {
        let mut points = polygon.points.clone();
        points.push(point);
        Ok(points)
    })
}

/// Insert a vertex on edge `segment_index`, i.e. right after that vertex.
pub fn insert_point_into_segment(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    segment_index: usize,
    point: Point,
) -> Result<SegmentationResult, EditError> {
    edit_points(segmentation, id, Checks::ALL, |polygon| {
        let len = polygon.points.len();
        if segment_index >= len {
            log::warn!("Invalid segment index {} for polygon {}", segment_index, id);
            return Err(EditError::InvalidSegmentIndex {
                index: segment_index,
                len,
            });
        }
        let mut points = polygon.points.clone();
        points.insert(segment_index + 1, point);
        Ok(points)
    })
}

/// Remove a vertex. Fails on polygons already at the minimum vertex count.
pub fn remove_point(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    point_index: usize,
) -> Result<SegmentationResult, EditError> {
    edit_points(segmentation, id, Checks::ALL, |polygon| {
        if polygon.points.len() <= MIN_POLYGON_VERTICES {
            return Err(EditError::TooFewVertices {
                id: id.clone(),
                len: polygon.points.len(),
                min: MIN_POLYGON_VERTICES,
            });
        }
        check_point_index(polygon, point_index)?;
        let mut points = polygon.points.clone();
        points.remove(point_index);
        Ok(points)
    })
}

/// Insert a copy of vertex `point_index` right after it.
///
/// The copy coincides with the original, so the result fails the duplicate
/// check until the copy is moved. It is a drag base, not a committable state:
/// the session keeps it in the drag buffer and commits through [`move_point`].
pub fn duplicate_point(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    point_index: usize,
) -> Result<SegmentationResult, EditError> {
    edit_points(segmentation, id, Checks::NONE, |polygon| {
        check_point_index(polygon, point_index)?;
        let mut points = polygon.points.clone();
        points.insert(point_index + 1, points[point_index]);
        Ok(points)
    })
}

/// Move vertex `point_index` to `point`.
pub fn move_point(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    point_index: usize,
    point: Point,
) -> Result<SegmentationResult, EditError> {
    edit_points(segmentation, id, Checks::ALL, |polygon| {
        check_point_index(polygon, point_index)?;
        let mut points = polygon.points.clone();
        points[point_index] = point;
        Ok(points)
    })
}

/// Move a vertex without validation, for live drag previews only.
pub(crate) fn preview_move_point(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    point_index: usize,
    point: Point,
) -> Result<SegmentationResult, EditError> {
    let index = segmentation.position(id)?;
    let polygon = &segmentation.polygons()[index];
    check_point_index(polygon, point_index)?;

    let mut points = polygon.points.clone();
    points[point_index] = point;
    Ok(segmentation.splice_polygon(index, vec![polygon.with_points(points)]))
}

/// Simplify one polygon with RDP at a fixed tolerance.
///
/// Nothing to remove is a success with an unchanged outcome. Results that
/// would drop below the minimum vertex count or self-intersect are rejected.
pub fn simplify_polygon(
    segmentation: &SegmentationResult,
    id: &PolygonId,
    tolerance: f64,
) -> Result<(SegmentationResult, SimplifyOutcome), EditError> {
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(EditError::invalid(format!(
            "Simplification tolerance must be a non-negative number, got {}",
            tolerance
        )));
    }

    let before = segmentation.require(id)?.points.len();
    let updated = edit_points(segmentation, id, Checks::ALL, |polygon| {
        let simplified = rdp(&polygon.points, tolerance);
        if simplified.len() < MIN_POLYGON_VERTICES {
            return Err(EditError::invalid(format!(
                "Simplification at tolerance {} would leave {} points",
                tolerance,
                simplified.len()
            )));
        }
        Ok(simplified)
    })?;

    let after = updated.require(id)?.points.len();
    log::debug!("✂️ Simplified polygon {}: {} -> {} points", id, before, after);
    Ok((updated, SimplifyOutcome { before, after }))
}

/// Add a new polygon with a fresh id and a generated color.
pub fn create_polygon(
    segmentation: &SegmentationResult,
    ids: &mut IdGenerator,
    points: Vec<Point>,
    kind: PolygonKind,
) -> Result<(SegmentationResult, PolygonId), EditError> {
    let errors = validate_points(&points, Checks::ALL);
    if !errors.is_empty() {
        log::warn!("Polygon creation rejected: {}", errors.join("; "));
        return Err(EditError::invalid_all(errors));
    }

    let id = ids.next_id(segmentation);
    let polygon = Polygon::new(id.clone(), normalize_winding(&points), kind)
        .with_color(color_for_index(segmentation.len()));
    Ok((segmentation.with_added(polygon), id))
}

/// Remove a polygon together with any internal polygons parented to it.
pub fn delete_polygon(
    segmentation: &SegmentationResult,
    id: &PolygonId,
) -> Result<SegmentationResult, EditError> {
    segmentation.require(id)?;
    Ok(segmentation.retained(|p| &p.id != id && p.parent_id.as_ref() != Some(id)))
}
