//! Segmentation result: the polygon set owned by an editor session.

use serde::{Deserialize, Serialize};

use super::{Polygon, PolygonId};
use crate::error::{EditError, FormatError};
use crate::geometry::{normalize_winding, validate_polygon_set};

/// All polygons of one image plus the image dimensions.
///
/// Polygons are only changed through the mutation, slice and simplification
/// operations, which hand back a new value instead of patching fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    polygons: Vec<Polygon>,
    #[serde(default)]
    image_width: u32,
    #[serde(default)]
    image_height: u32,
}

impl SegmentationResult {
    /// Create an empty segmentation for an image of the given size.
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            polygons: Vec::new(),
            image_width,
            image_height,
        }
    }

    /// Build a segmentation from imported polygons.
    ///
    /// The set is validated as a whole and every polygon is normalized to
    /// clockwise winding.
    pub fn with_polygons(
        polygons: Vec<Polygon>,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self, EditError> {
        let report = validate_polygon_set(&polygons);
        if !report.is_valid {
            return Err(EditError::invalid_all(report.errors));
        }

        let polygons = polygons
            .into_iter()
            .map(|p| {
                let points = normalize_winding(&p.points);
                Polygon { points, ..p }
            })
            .collect();

        Ok(Self {
            polygons,
            image_width,
            image_height,
        })
    }

    /// Parse and validate a segmentation received from persistence.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let raw: SegmentationResult = serde_json::from_str(json)?;
        let result = Self::with_polygons(raw.polygons, raw.image_width, raw.image_height)?;
        log::debug!(
            "📥 Imported segmentation with {} polygons",
            result.polygons.len()
        );
        Ok(result)
    }

    /// Serialize for the persistence collaborator.
    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn get(&self, id: &PolygonId) -> Option<&Polygon> {
        self.polygons.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PolygonId) -> bool {
        self.get(id).is_some()
    }

    /// Look up a polygon, failing with [`EditError::PolygonNotFound`].
    pub fn require(&self, id: &PolygonId) -> Result<&Polygon, EditError> {
        self.get(id)
            .ok_or_else(|| EditError::PolygonNotFound(id.clone()))
    }

    pub(crate) fn position(&self, id: &PolygonId) -> Result<usize, EditError> {
        self.polygons
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| EditError::PolygonNotFound(id.clone()))
    }

    /// Copy with the polygon at `index` replaced by `replacements` (in place, in order).
    pub(crate) fn splice_polygon(&self, index: usize, replacements: Vec<Polygon>) -> Self {
        let mut polygons = self.polygons.clone();
        polygons.splice(index..=index, replacements);
        Self {
            polygons,
            ..*self
        }
    }

    /// Copy with a polygon appended.
    pub(crate) fn with_added(&self, polygon: Polygon) -> Self {
        let mut polygons = self.polygons.clone();
        polygons.push(polygon);
        Self {
            polygons,
            ..*self
        }
    }

    /// Copy keeping only the polygons for which `keep` returns true.
    pub(crate) fn retained(&self, keep: impl Fn(&Polygon) -> bool) -> Self {
        Self {
            polygons: self.polygons.iter().filter(|p| keep(p)).cloned().collect(),
            ..*self
        }
    }

    /// Copy with every polygon passed through `f`; `None` drops the polygon.
    pub(crate) fn filter_map_polygons(&self, f: impl Fn(&Polygon) -> Option<Polygon>) -> Self {
        Self {
            polygons: self.polygons.iter().filter_map(f).collect(),
            ..*self
        }
    }
}

/// Generates fresh `polygon-xxxxxxxx` ids.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id not used by any polygon in `existing`.
    pub fn next_id(&mut self, existing: &SegmentationResult) -> PolygonId {
        loop {
            let id = PolygonId::new(format!("polygon-{:08x}", self.next));
            self.next = self.next.wrapping_add(1);
            if !existing.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, PolygonKind};

    fn square(id: &str) -> Polygon {
        Polygon::new(
            id,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(0.0, 10.0),
            ],
            PolygonKind::External,
        )
    }

    #[test]
    fn test_with_polygons_rejects_duplicate_ids() {
        let err = SegmentationResult::with_polygons(vec![square("a"), square("a")], 100, 100)
            .unwrap_err();
        assert!(matches!(err, EditError::Validation { .. }));
    }

    #[test]
    fn test_with_polygons_normalizes_winding() {
        let mut reversed = square("a");
        reversed.points.reverse();
        let result = SegmentationResult::with_polygons(vec![reversed], 100, 100).unwrap();
        assert!(crate::geometry::signed_area(&result.polygons()[0].points) > 0.0);
    }

    #[test]
    fn test_json_roundtrip_uses_camel_case() {
        let result = SegmentationResult::with_polygons(vec![square("a")], 640, 480).unwrap();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"imageWidth\":640"));

        let parsed = SegmentationResult::from_json(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_from_json_rejects_invalid_polygon() {
        let json = r#"{"polygons":[{"id":"a","points":[{"x":0,"y":0},{"x":1,"y":1}],"kind":"external"}],"imageWidth":10,"imageHeight":10}"#;
        assert!(SegmentationResult::from_json(json).is_err());
    }

    #[test]
    fn test_require_missing_polygon() {
        let result = SegmentationResult::new(10, 10);
        let err = result.require(&PolygonId::new("nope")).unwrap_err();
        assert_eq!(err, EditError::PolygonNotFound(PolygonId::new("nope")));
    }

    #[test]
    fn test_id_generator_skips_existing() {
        let existing =
            SegmentationResult::with_polygons(vec![square("polygon-00000000")], 10, 10).unwrap();
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(&existing).as_str(), "polygon-00000001");
        assert_eq!(ids.next_id(&existing).as_str(), "polygon-00000002");
    }
}
