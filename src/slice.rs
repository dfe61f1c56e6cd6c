//! Splitting one polygon into two along a cut line.
//!
//! A slice is a two-click gesture: the first click anchors the start of the
//! cut, the second one finishes it. The cut must cross the polygon boundary
//! exactly twice; the boundary is then walked from one crossing to the other
//! in both directions, giving two closed paths that share the cut as an edge.

use serde::{Deserialize, Serialize};

use crate::constants::{SLICE_AREA_WEIGHT, SLICE_PERIMETER_WEIGHT};
use crate::error::EditError;
use crate::geometry::{
    area, perimeter, point_in_polygon, segment_intersection, validate_points, Checks,
};
use crate::model::{IdGenerator, Point, Polygon, PolygonId, SegmentationResult};

/// Edge hits this close to the end of an edge belong to the next edge, so a
/// cut through a vertex is counted once.
const EDGE_END_TOLERANCE: f64 = 1e-9;

/// What happens to the two halves of a sliced polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlicePolicy {
    /// Both halves get fresh ids
    #[default]
    SplitBoth,
    /// The larger half keeps the original id and label, the smaller one gets a fresh id
    KeepLargerId,
    /// Only the larger half is kept, under the original id
    KeepLargerOnly,
}

/// Ranking used to decide which half is "larger".
pub fn score(points: &[Point]) -> f64 {
    SLICE_AREA_WEIGHT * area(points) + SLICE_PERIMETER_WEIGHT * perimeter(points)
}

/// A place where the cut crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPoint {
    /// Edge index (edge `i` runs from vertex `i` to vertex `i + 1`)
    pub edge: usize,
    /// Parametric position along the edge, in `[0, 1)`
    pub t: f64,
    pub point: Point,
}

/// The two boundary crossings of a cut, ordered along the boundary.
pub fn cut_points(points: &[Point], start: Point, end: Point) -> Result<[CutPoint; 2], EditError> {
    if start.approx_eq(&end) {
        return Err(EditError::ZeroLengthCut);
    }

    let n = points.len();
    let mut hits: Vec<CutPoint> = (0..n)
        .filter_map(|edge| {
            let a = points[edge];
            let b = points[(edge + 1) % n];
            let hit = segment_intersection(&start, &end, &a, &b)?;
            (hit.u < 1.0 - EDGE_END_TOLERANCE).then(|| CutPoint {
                edge,
                t: hit.u,
                point: a.lerp(&b, hit.u),
            })
        })
        .collect();

    if hits.len() != 2 {
        return Err(EditError::IntersectionCount { found: hits.len() });
    }

    hits.sort_by(|a, b| a.edge.cmp(&b.edge).then(a.t.total_cmp(&b.t)));
    Ok([hits[0], hits[1]])
}

/// Append `point` unless it repeats the previous one.
fn push_distinct(path: &mut Vec<Point>, point: Point) {
    if path.last().is_none_or(|last| !last.approx_eq(&point)) {
        path.push(point);
    }
}

/// Boundary walk from `from` to `to`, both cut points included.
fn walk(points: &[Point], from: &CutPoint, to: &CutPoint) -> Vec<Point> {
    let n = points.len();
    let mut path = vec![from.point];

    let mut index = (from.edge + 1) % n;
    let steps = (to.edge + n - from.edge) % n;
    for _ in 0..steps {
        push_distinct(&mut path, points[index]);
        index = (index + 1) % n;
    }
    push_distinct(&mut path, to.point);

    if path.len() > 1 && path[0].approx_eq(&path[path.len() - 1]) {
        path.pop();
    }
    path
}

/// Split a closed point ring along the cut `start`-`end`.
///
/// The two returned paths together hold every original vertex once, plus
/// both cut points each.
pub fn split_points(
    points: &[Point],
    start: Point,
    end: Point,
) -> Result<(Vec<Point>, Vec<Point>), EditError> {
    let [first, second] = cut_points(points, start, end)?;
    let path_a = walk(points, &first, &second);
    let path_b = walk(points, &second, &first);

    for path in [&path_a, &path_b] {
        let errors = validate_points(path, Checks::ALL);
        if !errors.is_empty() {
            return Err(EditError::invalid_all(errors));
        }
    }
    Ok((path_a, path_b))
}

/// Result of a successful slice.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceOutcome {
    pub segmentation: SegmentationResult,
    /// Ids of the polygons that replaced the sliced one, larger half first
    pub parts: Vec<PolygonId>,
}

/// Slice polygon `id` along `start`-`end`, replacing it according to `policy`.
///
/// Internal polygons parented to the sliced polygon follow the half that
/// holds most of their vertices. Holes in a dropped half are dropped with it;
/// holes outside both halves lose their parent.
pub fn slice_polygon(
    segmentation: &SegmentationResult,
    ids: &mut IdGenerator,
    id: &PolygonId,
    start: Point,
    end: Point,
    policy: SlicePolicy,
) -> Result<SliceOutcome, EditError> {
    let index = segmentation.position(id)?;
    let original = &segmentation.polygons()[index];

    let (path_a, path_b) = split_points(&original.points, start, end).inspect_err(|e| {
        log::warn!("Slice of polygon {} rejected: {}", id, e);
    })?;
    let (larger, smaller) = if score(&path_a) >= score(&path_b) {
        (path_a, path_b)
    } else {
        (path_b, path_a)
    };

    let (replacements, dropped): (Vec<Polygon>, Vec<Point>) = match policy {
        SlicePolicy::SplitBoth => {
            let larger_id = ids.next_id(segmentation);
            let smaller_id = ids.next_id(segmentation);
            let parts = vec![
                original.with_points(larger).with_id(larger_id),
                original.with_points(smaller).with_id(smaller_id),
            ];
            (parts, Vec::new())
        }
        SlicePolicy::KeepLargerId => {
            let smaller_id = ids.next_id(segmentation);
            let mut smaller = original.with_points(smaller).with_id(smaller_id);
            smaller.label = None;
            (vec![original.with_points(larger), smaller], Vec::new())
        }
        SlicePolicy::KeepLargerOnly => (vec![original.with_points(larger)], smaller),
    };

    let parts: Vec<PolygonId> = replacements.iter().map(|p| p.id.clone()).collect();
    let spliced = segmentation.splice_polygon(index, replacements.clone());
    let reparented = reparent_children(&spliced, id, &replacements, &dropped);

    log::debug!(
        "🔪 Sliced polygon {} into {:?} ({:?})",
        id,
        parts.iter().map(PolygonId::as_str).collect::<Vec<_>>(),
        policy
    );
    Ok(SliceOutcome {
        segmentation: reparented,
        parts,
    })
}

fn vertices_inside(child: &Polygon, outline: &[Point]) -> usize {
    child
        .points
        .iter()
        .filter(|q| point_in_polygon(q, outline))
        .count()
}

fn reparent_children(
    segmentation: &SegmentationResult,
    old_parent: &PolygonId,
    parts: &[Polygon],
    dropped: &[Point],
) -> SegmentationResult {
    segmentation.filter_map_polygons(|polygon| {
        if polygon.parent_id.as_ref() != Some(old_parent) {
            return Some(polygon.clone());
        }

        let best = parts
            .iter()
            .map(|part| (part, vertices_inside(polygon, &part.points)))
            .filter(|(_, inside)| *inside > 0)
            .max_by_key(|(_, inside)| *inside);
        let in_dropped = vertices_inside(polygon, dropped);

        match best {
            Some((part, inside)) if inside >= in_dropped => {
                Some(polygon.clone().with_parent(part.id.clone()))
            }
            _ if in_dropped > 0 => {
                log::debug!("Dropping hole {} with the discarded half of {}", polygon.id, old_parent);
                None
            }
            _ => {
                let mut orphan = polygon.clone();
                orphan.parent_id = None;
                Some(orphan)
            }
        }
    })
}

/// Where the slice gesture currently is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SlicePhase {
    #[default]
    Idle,
    /// First click placed on `polygon_id`
    Started { polygon_id: PolygonId, start: Point },
}

/// Two-click slice gesture.
#[derive(Debug, Clone, Default)]
pub struct SliceTool {
    phase: SlicePhase,
}

impl SliceTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SlicePhase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, SlicePhase::Started { .. })
    }

    /// Anchor the start of the cut. Restarts an active gesture.
    pub fn start(&mut self, polygon_id: PolygonId, start: Point) {
        log::debug!("🔪 Slice started on polygon {} at ({:.1}, {:.1})", polygon_id, start.x, start.y);
        self.phase = SlicePhase::Started { polygon_id, start };
    }

    /// Place the end of the cut and compute the slice.
    ///
    /// The gesture ends either way; on failure the segmentation is untouched
    /// and a new first click is needed.
    pub fn finish(
        &mut self,
        segmentation: &SegmentationResult,
        ids: &mut IdGenerator,
        end: Point,
        policy: SlicePolicy,
    ) -> Result<SliceOutcome, EditError> {
        match std::mem::take(&mut self.phase) {
            SlicePhase::Idle => Err(EditError::SliceNotStarted),
            SlicePhase::Started { polygon_id, start } => {
                slice_polygon(segmentation, ids, &polygon_id, start, end, policy)
            }
        }
    }

    /// Abandon the gesture. Returns whether one was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.phase = SlicePhase::Idle;
        if was_active {
            log::debug!("Slice cancelled");
        }
        was_active
    }
}
