//! Data models for the polygon editing engine.

mod point;
mod polygon;
mod segmentation;

pub use point::{BoundingBox, Point};
pub use polygon::{Polygon, PolygonId, PolygonKind};
pub use segmentation::{IdGenerator, SegmentationResult};
