//! Geometry kernel: pure functions over point sequences in image space.
//!
//! Nothing in here logs or mutates; callers decide what to do with results.

mod intersect;
mod measure;
mod validate;

pub use intersect::{
    distance_to_segment, find_self_intersections, orientation, point_in_polygon,
    polygons_intersect, project_onto_segment, segment_intersection, segments_intersect,
    self_intersecting_edges, SegmentHit,
};
pub use measure::{
    area, centroid, convex_hull, normalize_winding, perimeter, signed_area, winding,
    PolygonMetrics, Winding,
};
pub use validate::{find_duplicate_points, validate_polygon, validate_polygon_set, ValidationReport};

pub(crate) use validate::{validate_points, Checks};
