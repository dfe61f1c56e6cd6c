//! Diagnostic events emitted by an editor session.
//!
//! The session reports what happened (commits, rejections, mode switches,
//! saves) through an [`EventSink`]. Hosts use it for toasts and status bars,
//! or just let [`LogSink`] forward everything to the `log` facade.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::Level;

use crate::error::EditError;
use crate::hit_test::VertexHit;
use crate::model::PolygonId;
use crate::session::EditMode;

/// Edits that produce a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddPoint,
    InsertPoint,
    RemovePoint,
    DuplicatePoint,
    MovePoint,
    Simplify,
    Slice,
    CreatePolygon,
    DeletePolygon,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddPoint => "add point",
            Operation::InsertPoint => "insert point",
            Operation::RemovePoint => "remove point",
            Operation::DuplicatePoint => "duplicate point",
            Operation::MovePoint => "move point",
            Operation::Simplify => "simplify",
            Operation::Slice => "slice",
            Operation::CreatePolygon => "create polygon",
            Operation::DeletePolygon => "delete polygon",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something the host may want to show or record.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// An edit was committed as a new history entry
    Committed { operation: Operation, revision: u64 },
    /// An edit was refused; nothing changed
    Rejected { operation: Operation, error: EditError },
    /// Simplification ran but had nothing to remove
    NothingToSimplify { polygon_id: PolygonId },
    Undone { revision: u64 },
    Redone { revision: u64 },
    ModeChanged { from: EditMode, to: EditMode },
    SelectionChanged { polygon_id: Option<PolygonId> },
    HoverChanged { hit: Option<VertexHit> },
    DragStarted { polygon_id: PolygonId, vertex_index: usize },
    DragCancelled,
    SliceStarted { polygon_id: PolygonId },
    SliceCancelled,
    /// History was replaced by a segmentation from persistence
    Loaded { polygons: usize },
    SaveStarted { revision: u64 },
    SaveSucceeded { revision: u64 },
    /// Save failed; in-memory edits are kept
    SaveFailed { revision: u64, message: String },
}

impl EditorEvent {
    /// Severity used when the event is logged.
    pub fn level(&self) -> Level {
        match self {
            EditorEvent::Rejected { .. } | EditorEvent::SaveFailed { .. } => Level::Warn,
            EditorEvent::Committed { .. }
            | EditorEvent::Loaded { .. }
            | EditorEvent::SaveSucceeded { .. } => Level::Info,
            EditorEvent::HoverChanged { .. } => Level::Trace,
            _ => Level::Debug,
        }
    }
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorEvent::Committed { operation, revision } => {
                write!(f, "{} committed (revision {})", operation, revision)
            }
            EditorEvent::Rejected { operation, error } => {
                write!(f, "{} rejected: {}", operation, error)
            }
            EditorEvent::NothingToSimplify { polygon_id } => {
                write!(f, "Nothing to simplify in polygon {}", polygon_id)
            }
            EditorEvent::Undone { revision } => write!(f, "Undo to revision {}", revision),
            EditorEvent::Redone { revision } => write!(f, "Redo to revision {}", revision),
            EditorEvent::ModeChanged { from, to } => {
                write!(f, "Mode {} -> {}", from.name(), to.name())
            }
            EditorEvent::SelectionChanged { polygon_id: Some(id) } => write!(f, "Selected {}", id),
            EditorEvent::SelectionChanged { polygon_id: None } => f.write_str("Selection cleared"),
            EditorEvent::HoverChanged { hit: Some(hit) } => {
                write!(f, "Hover {} vertex {}", hit.polygon_id, hit.vertex_index)
            }
            EditorEvent::HoverChanged { hit: None } => f.write_str("Hover cleared"),
            EditorEvent::DragStarted {
                polygon_id,
                vertex_index,
            } => write!(f, "Dragging {} vertex {}", polygon_id, vertex_index),
            EditorEvent::DragCancelled => f.write_str("Drag cancelled"),
            EditorEvent::SliceStarted { polygon_id } => write!(f, "Slicing {}", polygon_id),
            EditorEvent::SliceCancelled => f.write_str("Slice cancelled"),
            EditorEvent::Loaded { polygons } => write!(f, "Loaded {} polygons", polygons),
            EditorEvent::SaveStarted { revision } => write!(f, "Saving revision {}", revision),
            EditorEvent::SaveSucceeded { revision } => write!(f, "Saved revision {}", revision),
            EditorEvent::SaveFailed { revision, message } => {
                write!(f, "Save of revision {} failed: {}", revision, message)
            }
        }
    }
}

/// Receives session events.
pub trait EventSink {
    fn emit(&mut self, event: EditorEvent);
}

/// Forwards events to the `log` facade at their own level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: EditorEvent) {
        log::log!(target: "polyseg::session", event.level(), "{}", event);
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: EditorEvent) {}
}

/// Collects events in memory. Clones share the same buffer, so a host can
/// keep one handle and give the other to the session.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<EditorEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<EditorEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: EditorEvent) {
        log::log!(target: "polyseg::session", event.level(), "{}", event);
        self.events.borrow_mut().push(event);
    }
}
