//! Interactive editing session.
//!
//! An [`EditorSession`] owns everything one canvas needs: the committed
//! segmentation history, the view, the current mode, selection and hover,
//! and any in-progress gesture. Hosts feed it pointer events in screen
//! coordinates (or call the direct editing methods) and render
//! [`EditorSession::render_polygons`].
//!
//! Every successful edit commits exactly one history entry. Vertex drags go
//! through the history's drag buffer and commit once, on release.

use std::fmt;

use crate::config::EditorConfig;
use crate::constants::MIN_DRAG_DISTANCE;
use crate::error::{EditError, FormatError};
use crate::event::{EditorEvent, EventSink, LogSink, Operation};
use crate::hit_test::{find_hovered_vertex, find_nearest_edge, find_polygon_at, VertexHit};
use crate::history::History;
use crate::model::{IdGenerator, Point, Polygon, PolygonId, PolygonKind, SegmentationResult};
use crate::mutation::{self, SimplifyOutcome};
use crate::simplify::simplify_all;
use crate::slice::{slice_polygon, SliceOutcome, SlicePhase, SliceTool};
use crate::view::ViewState;


/// Interaction mode of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Pan and select only
    #[default]
    View,
    /// Drag vertices of polygons
    Edit,
    /// Two-click slice of the selected polygon
    Slice,
    /// Click on an edge of the selected polygon to insert a vertex
    PointAdd,
}

impl EditMode {
    pub fn name(&self) -> &'static str {
        match self {
            EditMode::View => "View",
            EditMode::Edit => "Edit",
            EditMode::Slice => "Slice",
            EditMode::PointAdd => "Add Point",
        }
    }
}

/// What the pointer is doing between down and up.
#[derive(Debug, Clone, PartialEq, Default)]
enum PointerState {
    #[default]
    Idle,
    /// Dragging the view; `last` is the previous pointer position
    Panning { last: Point },
    /// Pressed on a vertex but not moved far enough to start a drag yet
    PotentialDrag {
        polygon_id: PolygonId,
        vertex_index: usize,
        start: Point,
    },
    DraggingVertex(VertexDrag),
}

/// A vertex drag in progress.
#[derive(Debug, Clone, PartialEq)]
struct VertexDrag {
    polygon_id: PolygonId,
    vertex_index: usize,
    /// State the drag edits; the committed state, or a duplicated-vertex copy of it
    base: SegmentationResult,
    /// Reported when the drag commits
    operation: Operation,
}

/// Snapshot handed to the persistence collaborator by [`EditorSession::begin_save`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    revision: u64,
    segmentation: SegmentationResult,
}

impl SaveTicket {
    /// History revision the snapshot was taken from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn segmentation(&self) -> &SegmentationResult {
        &self.segmentation
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        self.segmentation.to_json()
    }
}

/// One editor canvas: segmentation history, view and interaction state.
pub struct EditorSession {
    history: History<SegmentationResult>,
    view: ViewState,
    mode: EditMode,
    selected: Option<PolygonId>,
    hovered: Option<VertexHit>,
    pointer: PointerState,
    slice_tool: SliceTool,
    ids: IdGenerator,
    config: EditorConfig,
    saved_revision: Option<u64>,
    sink: Box<dyn EventSink>,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("mode", &self.mode)
            .field("view", &self.view)
            .field("selected", &self.selected)
            .field("revision", &self.history.revision())
            .field("polygons", &self.segmentation().len())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Start a session on `initial`, which counts as already saved.
    pub fn new(initial: SegmentationResult, config: EditorConfig) -> Self {
        let history = History::with_config(initial, config.history_config());
        let saved_revision = Some(history.revision());
        Self {
            history,
            view: ViewState::default(),
            mode: EditMode::default(),
            selected: None,
            hovered: None,
            pointer: PointerState::Idle,
            slice_tool: SliceTool::new(),
            ids: IdGenerator::new(),
            config,
            saved_revision,
            sink: Box::new(LogSink),
        }
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    fn emit(&mut self, event: EditorEvent) {
        self.sink.emit(event);
    }

    // ========================================================================
    // State accessors
    // ========================================================================

    /// What the canvas shows, including an in-progress drag.
    pub fn segmentation(&self) -> &SegmentationResult {
        self.history.present()
    }

    /// Last committed state, ignoring any in-progress drag.
    pub fn committed(&self) -> &SegmentationResult {
        self.history.committed()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn set_view(&mut self, view: ViewState) {
        self.view = view;
    }

    /// Zoom around a screen point, keeping the image point under it fixed.
    pub fn zoom_to_cursor(&mut self, new_zoom: f64, cursor: Point) {
        self.view = self.view.zoom_to_cursor(new_zoom, cursor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.view = self.view.pan_by(dx, dy);
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn selected(&self) -> Option<&PolygonId> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<&VertexHit> {
        self.hovered.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.pointer, PointerState::DraggingVertex(_))
    }

    pub fn slice_phase(&self) -> &SlicePhase {
        self.slice_tool.phase()
    }

    /// Polygons to draw at the current zoom. Never committed.
    pub fn render_polygons(&self) -> Vec<Polygon> {
        simplify_all(
            self.segmentation().polygons(),
            self.view.zoom(),
            self.config.point_budget(),
        )
    }

    // ========================================================================
    // Mode and selection
    // ========================================================================

    /// Switch mode. Any gesture in progress is cancelled.
    pub fn set_mode(&mut self, mode: EditMode) {
        if mode == self.mode {
            return;
        }
        self.cancel_gestures();
        self.set_hover(None);
        let from = self.mode;
        self.mode = mode;
        log::debug!("Mode: {} -> {}", from.name(), mode.name());
        self.emit(EditorEvent::ModeChanged { from, to: mode });
    }

    /// Select a polygon by id, or clear the selection.
    pub fn select(&mut self, id: Option<PolygonId>) -> Result<(), EditError> {
        if let Some(id) = &id {
            self.segmentation().require(id)?;
        }
        self.set_selection(id);
        Ok(())
    }

    fn set_selection(&mut self, id: Option<PolygonId>) {
        if self.selected != id {
            self.selected = id.clone();
            self.emit(EditorEvent::SelectionChanged { polygon_id: id });
        }
    }

    fn set_hover(&mut self, hit: Option<VertexHit>) {
        if self.hovered != hit {
            self.hovered = hit.clone();
            self.emit(EditorEvent::HoverChanged { hit });
        }
    }

    /// Drop selection and hover that point at polygons which no longer exist.
    fn sync_selection(&mut self) {
        let selection_gone = self
            .selected
            .as_ref()
            .is_some_and(|id| !self.segmentation().contains(id));
        if selection_gone {
            self.set_selection(None);
        }

        let hover_gone = self.hovered.as_ref().is_some_and(|hit| {
            self.segmentation()
                .get(&hit.polygon_id)
                .is_none_or(|p| hit.vertex_index >= p.points.len())
        });
        if hover_gone {
            self.set_hover(None);
        }
    }

    fn require_selection(&self) -> Result<PolygonId, EditError> {
        self.selected.clone().ok_or(EditError::NoSelection)
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Committed entries, base state included.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Step back one edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.cancel_gestures();
        if self.history.undo().is_none() {
            return false;
        }
        let revision = self.history.revision();
        self.emit(EditorEvent::Undone { revision });
        self.sync_selection();
        true
    }

    /// Re-apply an undone edit. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.cancel_gestures();
        if self.history.redo().is_none() {
            return false;
        }
        let revision = self.history.revision();
        self.emit(EditorEvent::Redone { revision });
        self.sync_selection();
        true
    }

    /// Commit a successful edit or report the rejection.
    fn apply(
        &mut self,
        operation: Operation,
        result: Result<SegmentationResult, EditError>,
    ) -> Result<(), EditError> {
        match result {
            Ok(updated) => {
                self.history.commit(updated);
                let revision = self.history.revision();
                self.emit(EditorEvent::Committed {
                    operation,
                    revision,
                });
                self.sync_selection();
                Ok(())
            }
            Err(error) => Err(self.reject(operation, error)),
        }
    }

    fn reject(&mut self, operation: Operation, error: EditError) -> EditError {
        self.emit(EditorEvent::Rejected {
            operation,
            error: error.clone(),
        });
        error
    }

    /// Cancel an active vertex drag or slice without touching history.
    fn cancel_gestures(&mut self) {
        match std::mem::take(&mut self.pointer) {
            PointerState::DraggingVertex(_) => {
                self.history.cancel_dragging();
                self.emit(EditorEvent::DragCancelled);
            }
            PointerState::Idle | PointerState::Panning { .. } | PointerState::PotentialDrag { .. } => {}
        }
        if self.slice_tool.cancel() {
            self.emit(EditorEvent::SliceCancelled);
        }
    }

    // ========================================================================
    // Direct editing API
    // ========================================================================

    pub fn add_point(&mut self, id: &PolygonId, point: Point) -> Result<(), EditError> {
        self.cancel_gestures();
        let result = mutation::add_point(self.committed(), id, point);
        self.apply(Operation::AddPoint, result)
    }

    pub fn insert_point(
        &mut self,
        id: &PolygonId,
        segment_index: usize,
        point: Point,
    ) -> Result<(), EditError> {
        self.cancel_gestures();
        let result = mutation::insert_point_into_segment(self.committed(), id, segment_index, point);
        self.apply(Operation::InsertPoint, result)
    }

    pub fn remove_point(&mut self, id: &PolygonId, point_index: usize) -> Result<(), EditError> {
        self.cancel_gestures();
        let result = mutation::remove_point(self.committed(), id, point_index);
        self.apply(Operation::RemovePoint, result)
    }

    /// Duplicate a vertex and start dragging the copy.
    ///
    /// The copy coincides with its original, so it stays in the drag buffer
    /// until [`pointer_up`](Self::pointer_up) commits it somewhere else. A
    /// release on the original position is rejected like any invalid move.
    pub fn duplicate_point(&mut self, id: &PolygonId, point_index: usize) -> Result<(), EditError> {
        self.cancel_gestures();
        let base = match mutation::duplicate_point(self.committed(), id, point_index) {
            Ok(base) => base,
            Err(error) => return Err(self.reject(Operation::DuplicatePoint, error)),
        };

        let before = self.history.committed().clone();
        self.history.start_dragging(before);
        self.history.update_during_drag(base.clone());
        self.set_selection(Some(id.clone()));
        self.emit(EditorEvent::DragStarted {
            polygon_id: id.clone(),
            vertex_index: point_index + 1,
        });
        self.pointer = PointerState::DraggingVertex(VertexDrag {
            polygon_id: id.clone(),
            vertex_index: point_index + 1,
            base,
            operation: Operation::DuplicatePoint,
        });
        Ok(())
    }

    pub fn move_point(
        &mut self,
        id: &PolygonId,
        point_index: usize,
        point: Point,
    ) -> Result<(), EditError> {
        self.cancel_gestures();
        let result = mutation::move_point(self.committed(), id, point_index, point);
        self.apply(Operation::MovePoint, result)
    }

    /// Remove the vertex under the pointer, if any.
    pub fn remove_hovered_point(&mut self) -> Result<(), EditError> {
        let Some(hit) = self.hovered.clone() else {
            return Ok(());
        };
        self.remove_point(&hit.polygon_id, hit.vertex_index)
    }

    /// Simplify one polygon at a fixed tolerance.
    ///
    /// Nothing to remove is reported as success without a history entry.
    pub fn simplify_polygon(
        &mut self,
        id: &PolygonId,
        tolerance: f64,
    ) -> Result<SimplifyOutcome, EditError> {
        self.cancel_gestures();
        match mutation::simplify_polygon(self.committed(), id, tolerance) {
            Ok((_, outcome)) if !outcome.changed() => {
                self.emit(EditorEvent::NothingToSimplify {
                    polygon_id: id.clone(),
                });
                Ok(outcome)
            }
            Ok((updated, outcome)) => {
                self.apply(Operation::Simplify, Ok(updated))?;
                Ok(outcome)
            }
            Err(error) => Err(self.reject(Operation::Simplify, error)),
        }
    }

    /// Slice polygon `id` along the image-space cut `start`-`end`.
    ///
    /// Returns the ids of the replacement polygons; the first one is selected.
    pub fn slice(
        &mut self,
        id: &PolygonId,
        start: Point,
        end: Point,
    ) -> Result<Vec<PolygonId>, EditError> {
        self.cancel_gestures();
        let result = slice_polygon(
            self.history.committed(),
            &mut self.ids,
            id,
            start,
            end,
            self.config.slice_policy,
        );
        self.commit_slice(result)
    }

    fn commit_slice(
        &mut self,
        result: Result<SliceOutcome, EditError>,
    ) -> Result<Vec<PolygonId>, EditError> {
        match result {
            Ok(outcome) => {
                let parts = outcome.parts;
                self.apply(Operation::Slice, Ok(outcome.segmentation))?;
                self.set_selection(parts.first().cloned());
                Ok(parts)
            }
            Err(error) => Err(self.reject(Operation::Slice, error)),
        }
    }

    /// Add a polygon with a fresh id; returns the id.
    pub fn create_polygon(
        &mut self,
        points: Vec<Point>,
        kind: PolygonKind,
    ) -> Result<PolygonId, EditError> {
        self.cancel_gestures();
        match mutation::create_polygon(self.history.committed(), &mut self.ids, points, kind) {
            Ok((updated, id)) => {
                self.apply(Operation::CreatePolygon, Ok(updated))?;
                Ok(id)
            }
            Err(error) => Err(self.reject(Operation::CreatePolygon, error)),
        }
    }

    pub fn delete_polygon(&mut self, id: &PolygonId) -> Result<(), EditError> {
        self.cancel_gestures();
        let result = mutation::delete_polygon(self.committed(), id);
        self.apply(Operation::DeletePolygon, result)
    }

    // ========================================================================
    // Pointer input (screen coordinates)
    // ========================================================================

    pub fn pointer_down(&mut self, screen: Point) {
        // A duplicated vertex follows the pointer until release
        if self.is_dragging() {
            return;
        }
        let image = self.view.screen_to_image(screen);
        match self.mode {
            EditMode::View => {
                self.pointer = PointerState::Panning { last: screen };
                let hit = find_polygon_at(self.segmentation().polygons(), &image).cloned();
                self.set_selection(hit);
            }
            EditMode::Edit => self.edit_pointer_down(screen, image),
            EditMode::PointAdd => self.point_add_pointer_down(screen, image),
            EditMode::Slice => self.slice_pointer_down(image),
        }
    }

    fn edit_pointer_down(&mut self, screen: Point, image: Point) {
        let hit = find_hovered_vertex(
            self.segmentation().polygons(),
            screen,
            &self.view,
            self.config.hit_radius,
        );
        match hit {
            Some(hit) => {
                self.set_selection(Some(hit.polygon_id.clone()));
                self.pointer = PointerState::PotentialDrag {
                    polygon_id: hit.polygon_id,
                    vertex_index: hit.vertex_index,
                    start: screen,
                };
            }
            None => {
                let hit = find_polygon_at(self.segmentation().polygons(), &image).cloned();
                self.set_selection(hit);
            }
        }
    }

    fn point_add_pointer_down(&mut self, screen: Point, image: Point) {
        let edge = self.selected.as_ref().and_then(|id| {
            let polygon = self.segmentation().get(id)?;
            find_nearest_edge(polygon, screen, &self.view, self.config.hit_radius)
        });

        match edge {
            Some(edge) => {
                // Rejections are reported through the sink
                let _ = self.insert_point(&edge.polygon_id, edge.edge_index, edge.point);
            }
            None => {
                let hit = find_polygon_at(self.segmentation().polygons(), &image).cloned();
                self.set_selection(hit);
            }
        }
    }

    fn slice_pointer_down(&mut self, image: Point) {
        if self.slice_tool.is_active() {
            let result = self.slice_tool.finish(
                self.history.committed(),
                &mut self.ids,
                image,
                self.config.slice_policy,
            );
            // Rejections are reported through the sink
            let _ = self.commit_slice(result);
            return;
        }

        match self.require_selection() {
            Ok(polygon_id) => {
                self.slice_tool.start(polygon_id.clone(), image);
                self.emit(EditorEvent::SliceStarted { polygon_id });
            }
            Err(_) => {
                let hit = find_polygon_at(self.segmentation().polygons(), &image).cloned();
                self.set_selection(hit);
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        match std::mem::take(&mut self.pointer) {
            PointerState::Idle => {
                if self.mode == EditMode::Edit {
                    let hit = find_hovered_vertex(
                        self.segmentation().polygons(),
                        screen,
                        &self.view,
                        self.config.hit_radius,
                    );
                    self.set_hover(hit);
                }
            }
            PointerState::Panning { last } => {
                self.view = self.view.pan_by(screen.x - last.x, screen.y - last.y);
                self.pointer = PointerState::Panning { last: screen };
            }
            PointerState::PotentialDrag {
                polygon_id,
                vertex_index,
                start,
            } => {
                if screen.distance_to(&start) < MIN_DRAG_DISTANCE {
                    self.pointer = PointerState::PotentialDrag {
                        polygon_id,
                        vertex_index,
                        start,
                    };
                    return;
                }

                let base = self.history.committed().clone();
                self.history.start_dragging(base.clone());
                self.emit(EditorEvent::DragStarted {
                    polygon_id: polygon_id.clone(),
                    vertex_index,
                });
                let drag = VertexDrag {
                    polygon_id,
                    vertex_index,
                    base,
                    operation: Operation::MovePoint,
                };
                self.drag_vertex(&drag, screen);
                self.pointer = PointerState::DraggingVertex(drag);
            }
            PointerState::DraggingVertex(drag) => {
                self.drag_vertex(&drag, screen);
                self.pointer = PointerState::DraggingVertex(drag);
            }
        }
    }

    fn drag_vertex(&mut self, drag: &VertexDrag, screen: Point) {
        let image = self.view.screen_to_image(screen);
        match mutation::preview_move_point(&drag.base, &drag.polygon_id, drag.vertex_index, image) {
            Ok(preview) => self.history.update_during_drag(preview),
            Err(e) => log::warn!("Drag preview failed: {}", e),
        }
    }

    pub fn pointer_up(&mut self, screen: Point) {
        match std::mem::take(&mut self.pointer) {
            PointerState::DraggingVertex(drag) => {
                let image = self.view.screen_to_image(screen);
                match mutation::move_point(&drag.base, &drag.polygon_id, drag.vertex_index, image) {
                    Ok(updated) => {
                        self.history.finish_dragging(updated);
                        let revision = self.history.revision();
                        self.emit(EditorEvent::Committed {
                            operation: drag.operation,
                            revision,
                        });
                    }
                    Err(error) => {
                        self.history.cancel_dragging();
                        self.reject(drag.operation, error);
                    }
                }
            }
            PointerState::Idle | PointerState::Panning { .. } | PointerState::PotentialDrag { .. } => {}
        }
    }

    /// Escape key: cancel a drag or slice, otherwise clear the selection.
    pub fn escape(&mut self) {
        let busy = self.is_dragging() || self.slice_tool.is_active();
        if busy {
            self.cancel_gestures();
        } else {
            self.pointer = PointerState::Idle;
            self.set_selection(None);
        }
    }

    // ========================================================================
    // Persistence boundary
    // ========================================================================

    /// Whether committed edits exist that haven't been saved.
    pub fn is_dirty(&self) -> bool {
        self.saved_revision != Some(self.history.revision())
    }

    /// Snapshot the committed state for saving. Editing can continue meanwhile.
    pub fn begin_save(&mut self) -> SaveTicket {
        let revision = self.history.revision();
        self.emit(EditorEvent::SaveStarted { revision });
        SaveTicket {
            revision,
            segmentation: self.history.committed().clone(),
        }
    }

    /// Record the outcome of a save started with [`begin_save`](Self::begin_save).
    ///
    /// A failed save keeps every in-memory edit.
    pub fn complete_save<E: fmt::Display>(&mut self, ticket: SaveTicket, result: Result<(), E>) {
        match result {
            Ok(()) => {
                self.saved_revision = Some(ticket.revision);
                self.emit(EditorEvent::SaveSucceeded {
                    revision: ticket.revision,
                });
            }
            Err(e) => self.emit(EditorEvent::SaveFailed {
                revision: ticket.revision,
                message: e.to_string(),
            }),
        }
    }

    /// Replace everything with a segmentation from persistence; history restarts.
    pub fn replace_from_persistence(&mut self, segmentation: SegmentationResult) {
        self.cancel_gestures();
        let polygons = segmentation.len();
        self.history.clear_history(segmentation);
        self.saved_revision = Some(self.history.revision());
        self.sync_selection();
        self.emit(EditorEvent::Loaded { polygons });
    }

    /// Parse, validate and load a segmentation received as JSON.
    pub fn load_json(&mut self, json: &str) -> Result<(), FormatError> {
        let segmentation = SegmentationResult::from_json(json)?;
        self.replace_from_persistence(segmentation);
        Ok(())
    }
}
