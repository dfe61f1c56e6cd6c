//! Error types for editing and import/export operations.

use thiserror::Error;

use crate::model::PolygonId;

/// Errors returned by editing operations.
///
/// Every variant leaves the committed state untouched; the session stays usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Resulting geometry failed validation
    #[error("Validation failed: {}", reasons.join("; "))]
    Validation {
        /// Human-readable reasons, one per failed check
        reasons: Vec<String>,
    },

    /// No polygon with this id exists in the segmentation
    #[error("Polygon not found: {0}")]
    PolygonNotFound(PolygonId),

    /// Point index outside the polygon's vertex range
    #[error("Invalid point index {index} for polygon with {len} points")]
    InvalidPointIndex {
        /// Requested index
        index: usize,
        /// Number of vertices in the polygon
        len: usize,
    },

    /// Segment index outside the polygon's edge range
    #[error("Invalid segment index {index} for polygon with {len} segments")]
    InvalidSegmentIndex {
        /// Requested index
        index: usize,
        /// Number of edges in the polygon
        len: usize,
    },

    /// Removing a vertex would leave fewer than the minimum
    #[error("Polygon {id} has only {len} points, cannot go below {min}")]
    TooFewVertices {
        /// Affected polygon
        id: PolygonId,
        /// Current vertex count
        len: usize,
        /// Minimum allowed vertex count
        min: usize,
    },

    /// Cut line with start and end at the same position
    #[error("Cut line has zero length")]
    ZeroLengthCut,

    /// Cut line did not cross the polygon boundary exactly twice
    #[error("Cut line must cross the polygon exactly twice, found {found} intersections")]
    IntersectionCount {
        /// Number of intersections found
        found: usize,
    },

    /// Slice finish or cancel requested without a started slice
    #[error("No slice in progress")]
    SliceNotStarted,

    /// Operation needs a selected polygon
    #[error("No polygon selected")]
    NoSelection,
}

impl EditError {
    /// Create a validation error with a single reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Validation {
            reasons: vec![reason.into()],
        }
    }

    /// Create a validation error from a list of reasons.
    pub fn invalid_all(reasons: Vec<String>) -> Self {
        Self::Validation { reasons }
    }

    /// Whether this error was caused by the caller passing a bad index.
    pub fn is_index_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPointIndex { .. } | Self::InvalidSegmentIndex { .. }
        )
    }
}

/// Errors that can occur while importing or exporting data.
#[derive(Error, Debug)]
pub enum FormatError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally valid data with invalid content
    #[error("Invalid format: {message}")]
    InvalidFormat {
        /// Description of the format error
        message: String,
    },
}

impl FormatError {
    /// Create an invalid format error with a message.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }
}

impl From<EditError> for FormatError {
    fn from(err: EditError) -> Self {
        Self::invalid_format(err.to_string())
    }
}
