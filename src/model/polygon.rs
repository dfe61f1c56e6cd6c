//! Polygon data model for segmentation objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BoundingBox, Point};

/// Identifier of a polygon, unique within one segmentation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolygonId(String);

impl PolygonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolygonId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whether a polygon bounds an object or cuts a hole into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolygonKind {
    /// Object boundary
    #[default]
    External,
    /// Hole or exclusion region inside an external polygon
    Internal,
}

impl PolygonKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            PolygonKind::External => "external",
            PolygonKind::Internal => "internal",
        }
    }
}

/// A closed polygon; the last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Unique identifier within the segmentation
    pub id: PolygonId,
    /// Ordered boundary vertices in image coordinates
    pub points: Vec<Point>,
    /// External boundary or internal hole
    #[serde(alias = "type")]
    pub kind: PolygonKind,
    /// Display color, usually `#RRGGBB`
    #[serde(default)]
    pub color: String,
    /// Optional user label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// External polygon an internal polygon belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<PolygonId>,
}

impl Polygon {
    /// Create a polygon with the given id, points and kind.
    pub fn new(id: impl Into<PolygonId>, points: Vec<Point>, kind: PolygonKind) -> Self {
        Self {
            id: id.into(),
            points,
            kind,
            color: String::new(),
            label: None,
            parent_id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<PolygonId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<PolygonId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edge `index` as a pair of endpoints, wrapping the last edge to the first point.
    pub fn edge(&self, index: usize) -> Option<(Point, Point)> {
        let n = self.points.len();
        if index >= n || n < 2 {
            return None;
        }
        Some((self.points[index], self.points[(index + 1) % n]))
    }

    /// Iterate over all edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        let count = if n < 2 { 0 } else { n };
        (0..count).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    /// Copy of this polygon with a different point list.
    pub fn with_points(&self, points: Vec<Point>) -> Polygon {
        Polygon {
            points,
            ..self.clone()
        }
    }
}

impl From<String> for PolygonId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
