// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session state.
//!
//! This module holds everything an editor needs while a single media item is
//! being annotated: the media and catalog references, the annotator role, the
//! current segment collection and an undo/redo history. It is the calling
//! layer for the segment model, so it also owns logging and the checks that
//! the engine leaves to its caller (export completeness, known labels).

use crate::io::csv::export_csv;
use crate::models::label::{LabelCatalog, LabelId};
use crate::models::project::{Project, Role};
use crate::models::segment::{Segment, SegmentId};
use crate::models::timeline::SegmentCollection;
use crate::util::path::{default_export_name, default_project_name};
use crate::util::snap::{snap_move_start, snap_to_reference, SnapTarget};
use crate::Result;

/// Maximum number of undo snapshots kept.
pub const HISTORY_LIMIT: usize = 50;

/// Session-level rejections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0} segment(s) still need text and a label")]
    IncompleteSegments(usize),

    #[error("no media is loaded")]
    MissingMedia,

    #[error("media duration is not known yet")]
    UnknownDuration,

    #[error("no label catalog is loaded")]
    MissingCatalog,

    #[error("no segment {0} in this session")]
    UnknownSegment(SegmentId),

    #[error("label {0} is not in the loaded catalog")]
    UnknownLabel(LabelId),
}

/// History system for undo/redo functionality.
#[derive(Debug)]
struct History {
    /// Undo stack (past states)
    undo_stack: Vec<SegmentCollection>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<SegmentCollection>,
    max_size: usize,
}

impl History {
    fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Save current state before making a change
    fn push(&mut self, segments: SegmentCollection) {
        self.undo_stack.push(segments);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // A new edit invalidates anything undone
        self.redo_stack.clear();
    }

    fn undo(&mut self, current: SegmentCollection) -> Option<SegmentCollection> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    fn redo(&mut self, current: SegmentCollection) -> Option<SegmentCollection> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Annotation state for one media item.
#[derive(Debug)]
pub struct EditSession {
    media_path: Option<String>,
    duration_ms: Option<i64>,
    labels_path: Option<String>,
    catalog: Option<LabelCatalog>,
    role: Role,
    segments: SegmentCollection,
    history: History,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            media_path: None,
            duration_ms: None,
            labels_path: None,
            catalog: None,
            role: Role::default(),
            segments: SegmentCollection::new(),
            history: History::new(HISTORY_LIMIT),
        }
    }

    /// Start annotating a new media item. Existing segments and history are
    /// discarded.
    pub fn open_media(&mut self, media_path: impl Into<String>, duration_ms: Option<i64>) {
        let media_path = media_path.into();
        log::info!("Opened media {} (duration: {:?}ms)", media_path, duration_ms);
        self.media_path = Some(media_path);
        self.duration_ms = duration_ms;
        self.segments = SegmentCollection::new();
        self.history.clear();
    }

    /// Record the media duration once playback metadata is available.
    pub fn set_duration(&mut self, duration_ms: i64) {
        if let Err(e) = self.segments.validate(Some(duration_ms)) {
            log::warn!("Segments do not fit media duration {}ms: {}", duration_ms, e);
        }
        self.duration_ms = Some(duration_ms);
    }

    /// Attach a validated label catalog and the path it was read from.
    pub fn load_catalog(&mut self, labels_path: impl Into<String>, catalog: LabelCatalog) {
        let labels_path = labels_path.into();
        log::info!(
            "Loaded {} labels (version {}) from {}",
            catalog.len(),
            catalog.version,
            labels_path
        );
        for seg in &self.segments {
            if let Some(id) = seg.label_id.filter(|id| !catalog.contains(*id)) {
                log::warn!("Segment {} refers to label {} missing from catalog", seg.id, id);
            }
        }
        self.labels_path = Some(labels_path);
        self.catalog = Some(catalog);
    }

    /// Replace the session with a decoded project. The catalog referenced by
    /// the project is loaded separately.
    pub fn load_project(&mut self, project: Project) {
        if let Some(current) = self.media_path.as_deref() {
            if current != project.media_path {
                log::warn!(
                    "Project media {} differs from the open media {}",
                    project.media_path,
                    current
                );
                self.duration_ms = None;
            }
        }
        log::info!(
            "Loaded project for {} with {} segments",
            project.media_path,
            project.segments.len()
        );
        if self.labels_path.as_deref() != Some(project.labels_path.as_str()) {
            self.catalog = None;
        }
        self.media_path = Some(project.media_path);
        self.labels_path = Some(project.labels_path);
        self.role = project.role;
        self.segments = project.segments;
        self.history.clear();
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn media_path(&self) -> Option<&str> {
        self.media_path.as_deref()
    }

    pub fn labels_path(&self) -> Option<&str> {
        self.labels_path.as_deref()
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.duration_ms
    }

    pub fn catalog(&self) -> Option<&LabelCatalog> {
        self.catalog.as_ref()
    }

    pub fn segments(&self) -> &SegmentCollection {
        &self.segments
    }

    /// Identifier of the segment at canonical position `index`.
    pub fn segment_at(&self, index: usize) -> Option<SegmentId> {
        self.segments.segments().get(index).map(|seg| seg.id)
    }

    /// Create a default-length segment at `point_ms`.
    pub fn create_at(&mut self, point_ms: i64) -> Result<SegmentId> {
        let duration_ms = self.require_duration()?;
        let (next, id) = self.segments.create_at(point_ms, duration_ms)?;
        self.commit(next, "create");
        Ok(id)
    }

    /// Move a segment, optionally snapping either edge to `snap`. Returns
    /// whether the segments changed.
    pub fn move_segment(
        &mut self,
        id: SegmentId,
        proposed_start_ms: i64,
        snap: Option<SnapTarget>,
    ) -> Result<bool> {
        let duration_ms = self.require_duration()?;
        let length = self.require_segment(id)?.duration_ms();
        let start = match snap {
            Some(target) => snap_move_start(proposed_start_ms, length, target),
            None => proposed_start_ms,
        };
        let next = self.segments.move_segment(id, start, duration_ms);
        Ok(self.commit(next, "move"))
    }

    /// Drag the start boundary of a segment, optionally snapping to `snap`.
    pub fn resize_start(
        &mut self,
        id: SegmentId,
        proposed_start_ms: i64,
        snap: Option<SnapTarget>,
    ) -> Result<bool> {
        self.require_segment(id)?;
        let start = snap.map_or(proposed_start_ms, |t| snap_to_reference(proposed_start_ms, t));
        let next = self.segments.resize_start(id, start);
        Ok(self.commit(next, "resize start"))
    }

    /// Drag the end boundary of a segment, optionally snapping to `snap`.
    pub fn resize_end(
        &mut self,
        id: SegmentId,
        proposed_end_ms: i64,
        snap: Option<SnapTarget>,
    ) -> Result<bool> {
        let duration_ms = self.require_duration()?;
        self.require_segment(id)?;
        let end = snap.map_or(proposed_end_ms, |t| snap_to_reference(proposed_end_ms, t));
        let next = self.segments.resize_end(id, end, duration_ms);
        Ok(self.commit(next, "resize end"))
    }

    pub fn set_text(&mut self, id: SegmentId, text: impl Into<String>) -> Result<()> {
        self.require_segment(id)?;
        let next = self.segments.set_text(id, text);
        self.commit(next, "set text");
        Ok(())
    }

    /// Assign a label from the loaded catalog, or clear it with `None`.
    pub fn set_label(&mut self, id: SegmentId, label_id: Option<LabelId>) -> Result<()> {
        self.require_segment(id)?;
        if let Some(label_id) = label_id {
            let catalog = self.catalog.as_ref().ok_or(SessionError::MissingCatalog)?;
            if !catalog.contains(label_id) {
                return Err(SessionError::UnknownLabel(label_id).into());
            }
        }
        let next = self.segments.set_label(id, label_id);
        self.commit(next, "set label");
        Ok(())
    }

    pub fn delete(&mut self, id: SegmentId) -> Result<()> {
        self.require_segment(id)?;
        let next = self.segments.remove(id);
        self.commit(next, "delete");
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the state before the last edit. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.segments.clone()) {
            Some(previous) => {
                self.segments = self.segments.restore(&previous);
                log::info!("Undo, {} segments", self.segments.len());
                true
            }
            None => false,
        }
    }

    /// Reapply the last undone edit.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.segments.clone()) {
            Some(next) => {
                self.segments = self.segments.restore(&next);
                log::info!("Redo, {} segments", self.segments.len());
                true
            }
            None => false,
        }
    }

    /// Number of segments still lacking text or a label.
    pub fn incomplete_count(&self) -> usize {
        self.segments.iter().filter(|seg| !seg.is_complete()).count()
    }

    /// A project can be saved once both media and catalog are known.
    pub fn can_save(&self) -> bool {
        self.media_path.is_some() && self.labels_path.is_some()
    }

    /// Snapshot the session as a project for persistence.
    pub fn to_project(&self) -> Result<Project> {
        let media_path = self.media_path.clone().ok_or(SessionError::MissingMedia)?;
        let labels_path = self.labels_path.clone().ok_or(SessionError::MissingCatalog)?;
        Ok(Project {
            version: crate::PROJECT_VERSION,
            media_path,
            labels_path,
            role: self.role,
            segments: self.segments.sorted(),
        })
    }

    /// Render the export text. Every segment must be complete.
    pub fn export_csv(&self) -> Result<String> {
        if self.media_path.is_none() {
            return Err(SessionError::MissingMedia.into());
        }
        let incomplete = self.incomplete_count();
        if incomplete > 0 {
            return Err(SessionError::IncompleteSegments(incomplete).into());
        }
        let text = export_csv(&self.segments);
        log::info!("Exported {} segments", self.segments.len());
        Ok(text)
    }

    /// Suggested file name for saving the project, e.g. `clip_A.ann`.
    pub fn project_file_name(&self) -> Option<String> {
        self.media_path
            .as_deref()
            .map(|media| default_project_name(media, self.role))
    }

    /// Suggested file name for the export, e.g. `clip_A.csv`.
    pub fn export_file_name(&self) -> Option<String> {
        self.media_path
            .as_deref()
            .map(|media| default_export_name(media, self.role))
    }

    fn require_duration(&self) -> Result<i64> {
        self.duration_ms
            .ok_or_else(|| SessionError::UnknownDuration.into())
    }

    fn require_segment(&self, id: SegmentId) -> Result<&Segment> {
        self.segments
            .get(id)
            .ok_or_else(|| SessionError::UnknownSegment(id).into())
    }

    /// Install `next` as the current state, recording history only when the
    /// segments actually changed.
    fn commit(&mut self, next: SegmentCollection, action: &str) -> bool {
        if next == self.segments {
            log::debug!("{} left segments unchanged", action);
            return false;
        }
        let previous = std::mem::replace(&mut self.segments, next);
        self.history.push(previous);
        log::info!("Applied {}, total segments: {}", action, self.segments.len());
        true
    }
}
