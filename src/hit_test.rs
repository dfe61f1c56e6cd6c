//! Zoom-aware vertex and edge hit testing.
//!
//! Distances are measured in screen pixels against a radius derived from the
//! base radius and the zoom factor, see [`effective_radius`].

use crate::constants::MIN_ZOOM;
use crate::geometry::{point_in_polygon, project_onto_segment};
use crate::model::{Point, Polygon, PolygonId};
use crate::view::{to_screen, ViewState};

/// Hit radius for `zoom`, scaled by a zoom band factor.
///
/// | zoom            | factor |
/// |-----------------|--------|
/// | `> 4`           | 2.0    |
/// | `(3, 4]`        | 1.5    |
/// | `[0.7, 3]`      | 1.0    |
/// | `[0.5, 0.7)`    | 0.8    |
/// | `< 0.5`         | 0.6    |
///
/// Non-finite or non-positive zoom is treated as [`MIN_ZOOM`].
pub fn effective_radius(zoom: f64, base_radius: f64) -> f64 {
    let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { MIN_ZOOM };
    let factor = if zoom > 4.0 {
        2.0
    } else if zoom > 3.0 {
        1.5
    } else if zoom >= 0.7 {
        1.0
    } else if zoom >= 0.5 {
        0.8
    } else {
        0.6
    };
    base_radius * factor / zoom
}

/// Whether the pointer at `(screen_x, screen_y)` is on `vertex` (image space).
pub fn is_near_vertex(
    screen_x: f64,
    screen_y: f64,
    vertex: Point,
    zoom: f64,
    pan: Point,
    base_radius: f64,
) -> bool {
    let on_screen = to_screen(vertex, zoom, pan);
    let distance = Point::new(screen_x, screen_y).distance_to(&on_screen);
    distance <= effective_radius(zoom, base_radius)
}

/// Whether the pointer is on the edge `a`-`b` (image space).
pub fn is_near_edge(screen: Point, a: Point, b: Point, view: &ViewState, base_radius: f64) -> bool {
    edge_distance(screen, a, b, view).0 <= effective_radius(view.zoom(), base_radius)
}

/// Screen distance to the edge and the closest point on it in image space.
fn edge_distance(screen: Point, a: Point, b: Point, view: &ViewState) -> (f64, Point) {
    let a_screen = view.image_to_screen(a);
    let b_screen = view.image_to_screen(b);
    let closest = project_onto_segment(&screen, &a_screen, &b_screen);
    (screen.distance_to(&closest), view.screen_to_image(closest))
}

/// A vertex under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexHit {
    pub polygon_id: PolygonId,
    pub vertex_index: usize,
}

/// An edge under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeHit {
    pub polygon_id: PolygonId,
    /// Edge `i` runs from vertex `i` to vertex `i + 1`
    pub edge_index: usize,
    /// Closest point on the edge, in image space
    pub point: Point,
    /// Pointer distance to the edge in screen pixels
    pub distance: f64,
}

/// Whether the pointer can possibly be within `radius` of the polygon.
fn near_bounds(polygon: &Polygon, image: &Point, radius: f64, zoom: f64) -> bool {
    polygon
        .bounding_box()
        .is_some_and(|bbox| bbox.expanded(radius / zoom).contains(image))
}

/// First vertex within the hit radius, scanning polygons and vertices in order.
pub fn find_hovered_vertex(
    polygons: &[Polygon],
    screen: Point,
    view: &ViewState,
    base_radius: f64,
) -> Option<VertexHit> {
    let radius = effective_radius(view.zoom(), base_radius);
    let image = view.screen_to_image(screen);

    polygons
        .iter()
        .filter(|polygon| near_bounds(polygon, &image, radius, view.zoom()))
        .find_map(|polygon| {
            polygon
                .points
                .iter()
                .position(|&vertex| {
                    is_near_vertex(screen.x, screen.y, vertex, view.zoom(), view.pan(), base_radius)
                })
                .map(|vertex_index| VertexHit {
                    polygon_id: polygon.id.clone(),
                    vertex_index,
                })
        })
}

/// Closest edge of `polygon` within the hit radius.
pub fn find_nearest_edge(
    polygon: &Polygon,
    screen: Point,
    view: &ViewState,
    base_radius: f64,
) -> Option<EdgeHit> {
    let radius = effective_radius(view.zoom(), base_radius);
    if !near_bounds(polygon, &view.screen_to_image(screen), radius, view.zoom()) {
        return None;
    }

    polygon
        .edges()
        .enumerate()
        .map(|(edge_index, (a, b))| {
            let (distance, point) = edge_distance(screen, a, b, view);
            EdgeHit {
                polygon_id: polygon.id.clone(),
                edge_index,
                point,
                distance,
            }
        })
        .filter(|hit| hit.distance <= radius)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Topmost polygon containing the image point; later polygons draw on top.
pub fn find_polygon_at<'a>(polygons: &'a [Polygon], image: &Point) -> Option<&'a PolygonId> {
    polygons
        .iter()
        .rev()
        .find(|polygon| point_in_polygon(image, &polygon.points))
        .map(|polygon| &polygon.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PolygonKind;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn square(id: &str, offset: f64) -> Polygon {
        Polygon::new(
            id,
            vec![
                Point::new(offset, offset),
                Point::new(offset + 10.0, offset),
                Point::new(offset + 10.0, offset + 10.0),
                Point::new(offset, offset + 10.0),
            ],
            PolygonKind::External,
        )
    }

    #[test]
    fn test_radius_bands() {
        assert!(approx_eq(effective_radius(5.0, 10.0), 4.0));
        assert!(approx_eq(effective_radius(4.0, 10.0), 3.75));
        assert!(approx_eq(effective_radius(2.0, 10.0), 5.0));
        assert!(approx_eq(effective_radius(0.7, 10.0), 10.0 / 0.7));
        assert!(approx_eq(effective_radius(0.6, 10.0), 8.0 / 0.6));
        assert!(approx_eq(effective_radius(0.5, 10.0), 16.0));
        assert!(approx_eq(effective_radius(0.25, 10.0), 24.0));
    }

    #[test]
    fn test_radius_with_invalid_zoom_is_finite() {
        assert!(effective_radius(0.0, 10.0).is_finite());
        assert!(effective_radius(f64::NAN, 10.0).is_finite());
        assert!(effective_radius(-1.0, 10.0) > 0.0);
    }

    #[test]
    fn test_exact_position_always_hits() {
        let pan = Point::new(13.0, -7.0);
        let vertex = Point::new(42.5, 17.25);
        for &zoom in &[0.05, 0.3, 0.5, 0.69, 1.0, 3.5, 4.0, 8.0, 100.0] {
            let s = to_screen(vertex, zoom, pan);
            assert!(is_near_vertex(s.x, s.y, vertex, zoom, pan, 10.0), "zoom {}", zoom);
        }
    }

    #[test]
    fn test_twice_radius_never_hits() {
        let pan = Point::new(0.0, 0.0);
        let vertex = Point::new(100.0, 100.0);
        for &zoom in &[0.05, 0.3, 0.5, 0.69, 1.0, 3.5, 4.0, 8.0, 100.0] {
            let s = to_screen(vertex, zoom, pan);
            let r = effective_radius(zoom, 10.0);
            assert!(!is_near_vertex(s.x + 2.0 * r, s.y, vertex, zoom, pan, 10.0), "zoom {}", zoom);
            assert!(is_near_vertex(s.x + 0.5 * r, s.y, vertex, zoom, pan, 10.0), "zoom {}", zoom);
        }
    }

    #[test]
    fn test_hover_reports_first_match() {
        let polygons = vec![square("a", 0.0), square("b", 0.0)];
        let view = ViewState::identity();
        let hit = find_hovered_vertex(&polygons, Point::new(10.5, 0.5), &view, 10.0).unwrap();
        assert_eq!(hit.polygon_id, PolygonId::from("a"));
        assert_eq!(hit.vertex_index, 1);
    }

    #[test]
    fn test_hover_none_when_far() {
        let polygons = vec![square("a", 0.0), square("b", 100.0)];
        let view = ViewState::identity();
        assert!(find_hovered_vertex(&polygons, Point::new(50.0, 50.0), &view, 10.0).is_none());
        let hit = find_hovered_vertex(&polygons, Point::new(111.0, 111.0), &view, 10.0).unwrap();
        assert_eq!(hit.polygon_id, PolygonId::from("b"));
        assert_eq!(hit.vertex_index, 2);
    }

    #[test]
    fn test_nearest_edge() {
        let polygon = square("a", 0.0);
        let view = ViewState::new(2.0, Point::new(0.0, 0.0));
        // Screen (10, -1) is image (5, -0.5), just above the top edge
        let hit = find_nearest_edge(&polygon, Point::new(10.0, -1.0), &view, 10.0).unwrap();
        assert_eq!(hit.edge_index, 0);
        assert!(approx_eq(hit.point.x, 5.0));
        assert!(approx_eq(hit.point.y, 0.0));
        assert!(approx_eq(hit.distance, 1.0));

        assert!(is_near_edge(Point::new(10.0, -1.0), polygon.points[0], polygon.points[1], &view, 10.0));
        assert!(find_nearest_edge(&polygon, Point::new(10.0, 10.0), &view, 10.0).is_none());
    }

    #[test]
    fn test_polygon_at_prefers_topmost() {
        let outer = Polygon::new(
            "outer",
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
                Point::new(0.0, 50.0),
            ],
            PolygonKind::External,
        );
        let polygons = vec![outer, square("inner", 20.0)];
        assert_eq!(
            find_polygon_at(&polygons, &Point::new(25.0, 25.0)),
            Some(&PolygonId::from("inner"))
        );
        assert_eq!(
            find_polygon_at(&polygons, &Point::new(5.0, 5.0)),
            Some(&PolygonId::from("outer"))
        );
        assert_eq!(find_polygon_at(&polygons, &Point::new(60.0, 5.0)), None);
    }
}
