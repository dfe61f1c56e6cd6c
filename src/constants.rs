//! Global constants for the polygon editing engine

/// Tolerance (image-space units) under which two coordinates are the same point.
pub const POINT_EPSILON: f64 = 1e-6;

/// Minimum number of vertices for a closed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Smallest zoom factor a view can hold.
pub const MIN_ZOOM: f64 = 0.01;

/// Largest zoom factor a view can hold.
pub const MAX_ZOOM: f64 = 100.0;

/// Default screen-space hit radius for vertices and edges, in pixels.
pub const DEFAULT_HIT_RADIUS: f64 = 10.0;

/// Default lower bound for zoom-adaptive simplification.
pub const DEFAULT_MIN_POINTS: usize = 8;

/// Default upper bound for zoom-adaptive simplification.
pub const DEFAULT_MAX_POINTS: usize = 1000;

/// Default number of committed states kept by the history.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Weight of the area term when ranking slice results.
pub const SLICE_AREA_WEIGHT: f64 = 0.7;

/// Weight of the perimeter term when ranking slice results.
pub const SLICE_PERIMETER_WEIGHT: f64 = 0.3;

/// Pointer travel (screen pixels) before a press on a vertex turns into a drag.
pub const MIN_DRAG_DISTANCE: f64 = 3.0;
