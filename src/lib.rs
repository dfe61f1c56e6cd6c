//! polyseg - polygon geometry and editing engine for segmentation canvases
//!
//! The crate holds everything between pointer events and a validated polygon
//! set: the data model, geometry kernel, zoom-adaptive simplification, vertex
//! editing, polygon slicing, hit testing and an undo history that treats drag
//! gestures as a single edit. Rendering, storage and networking belong to the
//! host application.
//!
//! ```no_run
//! use polyseg::{EditMode, EditorConfig, EditorSession, Point, SegmentationResult};
//!
//! let mut session = EditorSession::new(SegmentationResult::new(512, 512), EditorConfig::default());
//! session.set_mode(EditMode::Edit);
//! session.pointer_move(Point::new(120.0, 80.0));
//! ```

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hit_test;
pub mod history;
pub mod model;
pub mod mutation;
pub mod session;
pub mod simplify;
pub mod slice;
pub mod view;

pub use config::{init_logging, EditorConfig, LogLevel};
pub use error::{EditError, FormatError};
pub use event::{EditorEvent, EventSink, LogSink, NullSink, Operation, RecordingSink};
pub use history::{History, HistoryConfig};
pub use model::{BoundingBox, IdGenerator, Point, Polygon, PolygonId, PolygonKind, SegmentationResult};
pub use session::{EditMode, EditorSession, SaveTicket};
pub use simplify::PointBudget;
pub use slice::{SlicePolicy, SliceTool};
pub use view::ViewState;
