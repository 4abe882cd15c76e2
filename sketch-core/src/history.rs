//! The stroke history timeline.
//!
//! History is one ordered list of records plus a cursor. Records up to and
//! including the cursor are active (visible); records after it are shelved
//! and form the redo tail. Appending while records are shelved discards them.
//!
//! Every operation takes the [`SceneSync`] so that the surface always shows
//! exactly the active records.

use std::collections::HashSet;

use crate::record::{StrokeId, StrokeRecord};
use crate::scene::Surface;
use crate::sync::SceneSync;
use crate::{CanvasError, CanvasResult};

/// One row of the history view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry<'a> {
    /// Position in the timeline.
    pub index: usize,
    /// The stroke.
    pub record: &'a StrokeRecord,
    /// Whether the stroke is currently visible.
    pub active: bool,
}

/// Ordered stroke records with an undo/redo cursor.
#[derive(Debug, Clone, Default)]
pub struct History {
    records: Vec<StrokeRecord>,
    /// Number of active records (cursor + 1).
    active: usize,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records, active and shelved.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in order.
    #[must_use]
    pub fn records(&self) -> &[StrokeRecord] {
        &self.records
    }

    /// Records currently visible.
    #[must_use]
    pub fn active(&self) -> &[StrokeRecord] {
        &self.records[..self.active]
    }

    /// Records available for redo.
    #[must_use]
    pub fn shelved(&self) -> &[StrokeRecord] {
        &self.records[self.active..]
    }

    /// Every record with its visibility, in order.
    pub fn entries(&self) -> impl Iterator<Item = HistoryEntry<'_>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| HistoryEntry {
                index,
                record,
                active: index < self.active,
            })
    }

    /// Index of the last active record, `-1` when nothing is active.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn current_index(&self) -> isize {
        self.active as isize - 1
    }

    /// Whether [`undo`](Self::undo) would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.active > 0
    }

    /// Whether [`redo`](Self::redo) would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.active < self.records.len()
    }

    /// Append a completed stroke, discarding any shelved records first.
    ///
    /// Returns the number of shelved records discarded.
    pub fn append<S: Surface>(&mut self, record: StrokeRecord, sync: &mut SceneSync<S>) -> usize {
        let truncated = self.records.split_off(self.active);
        for dropped in &truncated {
            sync.release(&dropped.id);
        }
        if !truncated.is_empty() {
            tracing::debug!("Discarded {} shelved strokes", truncated.len());
        }

        tracing::trace!("Appending stroke {}", record.id);
        self.records.push(record);
        self.active = self.records.len();
        truncated.len()
    }

    /// Hide the last active record. Returns `false` if nothing was active.
    pub fn undo<S: Surface>(&mut self, sync: &mut SceneSync<S>) -> bool {
        if self.active == 0 {
            return false;
        }
        sync.detach(&self.records[self.active - 1]);
        self.active -= 1;
        true
    }

    /// Show the first shelved record. Returns `false` if nothing was shelved.
    pub fn redo<S: Surface>(&mut self, sync: &mut SceneSync<S>) -> bool {
        if self.active == self.records.len() {
            return false;
        }
        self.active += 1;
        sync.attach(&self.records[self.active - 1]);
        true
    }

    /// Step with undo/redo until `index` is the current index.
    ///
    /// `-1` hides everything.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::IndexOutOfRange`] unless `-1 <= index < len`.
    pub fn jump_to<S: Surface>(&mut self, index: isize, sync: &mut SceneSync<S>) -> CanvasResult<()> {
        let target = index
            .checked_add(1)
            .and_then(|t| usize::try_from(t).ok())
            .filter(|&t| t <= self.records.len())
            .ok_or(CanvasError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })?;

        while self.active > target {
            self.undo(sync);
        }
        while self.active < target {
            self.redo(sync);
        }
        tracing::debug!("Jumped to history index {index}");
        Ok(())
    }

    /// Remove one record, active or shelved.
    ///
    /// The cursor keeps pointing at the same last active record.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::IndexOutOfRange`] unless `index < len`.
    pub fn remove_at<S: Surface>(
        &mut self,
        index: usize,
        sync: &mut SceneSync<S>,
    ) -> CanvasResult<StrokeRecord> {
        if index >= self.records.len() {
            return Err(CanvasError::IndexOutOfRange {
                index: isize::try_from(index).unwrap_or(isize::MAX),
                len: self.records.len(),
            });
        }

        let record = self.records.remove(index);
        sync.release(&record.id);
        if index < self.active {
            self.active -= 1;
        }
        tracing::debug!("Removed stroke {} at index {index}", record.id);
        Ok(record)
    }

    /// Remove every record.
    pub fn clear<S: Surface>(&mut self, sync: &mut SceneSync<S>) {
        sync.detach_all();
        for record in self.records.drain(..) {
            sync.release(&record.id);
        }
        self.active = 0;
    }

    /// Whether the surface shows exactly the active records.
    #[must_use]
    pub fn in_sync_with<S: Surface>(&self, sync: &SceneSync<S>) -> bool {
        let active: HashSet<&StrokeId> = self.active().iter().map(|r| &r.id).collect();
        let attached: HashSet<&StrokeId> = sync.attached_ids().collect();
        active == attached
            && self
                .shelved()
                .iter()
                .all(|record| sync.node_of(&record.id).is_some())
    }
}
