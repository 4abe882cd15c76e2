//! The whiteboard session.
//!
//! A [`Whiteboard`] owns the history, the attached surface and at most one
//! open gesture. Every operation runs to completion on the caller's thread;
//! only [`Whiteboard::save`] hands work to a future, and that future owns a
//! snapshot so drawing can continue while it runs.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;

use crate::codec::{self, SerializableRecord};
use crate::config::WhiteboardOptions;
use crate::history::History;
use crate::record::{StrokeId, StrokeRecord};
use crate::scene::{NodeId, Scene, Surface};
use crate::snapshot::{effective_scale, png_data_url, Rasterizer, SceneSnapshot, SnapshotPath};
use crate::stroke::{Point, StrokeBuilder};
use crate::style::{ConcreteStyle, StyleDefaults, StyleResolver};
use crate::sync::SceneSync;
use crate::{CanvasError, CanvasResult};

/// Pending raster export resolving to a PNG `data:` URL.
pub type ExportFuture = BoxFuture<'static, CanvasResult<String>>;

/// Observable history state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    /// Whether undo would do anything.
    pub can_undo: bool,
    /// Whether redo would do anything.
    pub can_redo: bool,
    /// Index of the last visible record, `-1` when none.
    pub current_index: isize,
    /// Number of records, visible and shelved.
    pub len: usize,
}

enum Gesture {
    Idle,
    Dragging {
        builder: StrokeBuilder,
        node: NodeId,
        style: ConcreteStyle,
    },
}

/// A freehand drawing session bound to one surface.
pub struct Whiteboard<S: Surface = Scene> {
    options: WhiteboardOptions,
    resolver: StyleResolver,
    history: History,
    sync: Option<SceneSync<S>>,
    gesture: Gesture,
    rasterizer: Option<Arc<dyn Rasterizer>>,
}

impl<S: Surface> std::fmt::Debug for Whiteboard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Whiteboard")
            .field("options", &self.options)
            .field("history_len", &self.history.len())
            .field("current_index", &self.history.current_index())
            .field("attached", &self.sync.is_some())
            .field("drawing", &self.is_drawing())
            .finish_non_exhaustive()
    }
}

impl<S: Surface> Whiteboard<S> {
    /// Create a session with no surface attached yet.
    #[must_use]
    pub fn new(options: WhiteboardOptions) -> Self {
        Self {
            options,
            resolver: StyleResolver::default(),
            history: History::new(),
            sync: None,
            gesture: Gesture::Idle,
            rasterizer: None,
        }
    }

    /// Use `rasterizer` for PNG export.
    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Fall back to `defaults` instead of the standard style.
    #[must_use]
    pub fn with_style_defaults(mut self, defaults: StyleDefaults) -> Self {
        self.resolver = StyleResolver::new(defaults);
        self
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &WhiteboardOptions {
        &self.options
    }

    /// Mutable options. Changes apply to strokes begun afterwards.
    pub fn options_mut(&mut self) -> &mut WhiteboardOptions {
        &mut self.options
    }

    /// Bind the session to a surface.
    ///
    /// Applies the background color and restores
    /// [`initial_state`](WhiteboardOptions::initial_state). Setup runs once;
    /// attaching again while a surface is bound is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial state cannot be restored.
    pub fn attach(&mut self, mut surface: S) -> CanvasResult<()> {
        if self.sync.is_some() {
            tracing::warn!("Surface already attached, ignoring");
            return Ok(());
        }

        surface.set_background(&self.resolver.background(&self.options));
        let mut sync = SceneSync::new(surface);
        let initial = std::mem::take(&mut self.options.initial_state);
        let restored = if initial.is_empty() {
            Ok(())
        } else {
            codec::restore_into(
                &mut self.history,
                initial,
                &self.options,
                &self.resolver,
                &mut sync,
            )
        };
        self.sync = Some(sync);
        tracing::debug!("Surface attached with {} strokes", self.history.len());
        restored
    }

    /// Whether a surface is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sync.is_some()
    }

    /// The attached surface.
    #[must_use]
    pub fn surface(&self) -> Option<&S> {
        self.sync.as_ref().map(SceneSync::surface)
    }

    /// Whether a gesture is open.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Open a gesture at `start`.
    ///
    /// The brush is sampled now; option changes during the drag do not
    /// affect this stroke.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoSurface`] if nothing is attached, or
    /// [`CanvasError::GestureInProgress`] if a gesture is already open.
    pub fn begin_stroke(&mut self, start: Point) -> CanvasResult<()> {
        if self.is_drawing() {
            return Err(CanvasError::GestureInProgress);
        }
        let sync = self.sync.as_mut().ok_or(CanvasError::NoSurface)?;

        let style = self.resolver.resolve(&self.options, None);
        let builder = StrokeBuilder::begin(start);
        let node = sync
            .surface_mut()
            .append_path(&style, builder.path_data());
        tracing::trace!("Stroke started at ({}, {}) on {node}", start.x, start.y);
        self.gesture = Gesture::Dragging {
            builder,
            node,
            style,
        };
        Ok(())
    }

    /// Add a sample to the open gesture and update its live node.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoActiveGesture`] if no gesture is open.
    pub fn extend_stroke(&mut self, point: Point) -> CanvasResult<()> {
        let Gesture::Dragging { builder, node, .. } = &mut self.gesture else {
            return Err(CanvasError::NoActiveGesture);
        };
        let sync = self.sync.as_mut().ok_or(CanvasError::NoSurface)?;
        let data = builder.extend(point);
        sync.surface_mut().set_path_data(*node, data)
    }

    /// Close the open gesture and append it to history.
    ///
    /// Any shelved records are discarded at this point.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoActiveGesture`] if no gesture is open.
    pub fn finish_stroke(&mut self) -> CanvasResult<StrokeId> {
        let Gesture::Dragging {
            builder,
            node,
            style,
        } = std::mem::replace(&mut self.gesture, Gesture::Idle)
        else {
            return Err(CanvasError::NoActiveGesture);
        };
        let sync = self.sync.as_mut().ok_or(CanvasError::NoSurface)?;

        let geometry = builder.finish();
        sync.surface_mut().set_path_data(node, &geometry)?;
        let record = StrokeRecord::line(geometry, style.brush());
        let id = record.id.clone();
        sync.adopt(id.clone(), node);
        self.history.append(record, sync);
        debug_assert!(self.history.in_sync_with(sync));

        tracing::debug!("Stroke {id} appended at index {}", self.history.current_index());
        Ok(id)
    }

    /// Hide the last visible stroke. Returns `false` if there was none.
    pub fn undo(&mut self) -> bool {
        match self.sync.as_mut() {
            Some(sync) => self.history.undo(sync),
            None => false,
        }
    }

    /// Show the next shelved stroke. Returns `false` if there was none.
    pub fn redo(&mut self) -> bool {
        match self.sync.as_mut() {
            Some(sync) => self.history.redo(sync),
            None => false,
        }
    }

    /// Remove every stroke.
    pub fn clear(&mut self) {
        if let Some(sync) = self.sync.as_mut() {
            self.history.clear(sync);
            tracing::debug!("History cleared");
        }
    }

    /// Step to `index`, where `-1` hides everything.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::IndexOutOfRange`] unless `-1 <= index < len`.
    pub fn jump_to(&mut self, index: isize) -> CanvasResult<()> {
        match self.sync.as_mut() {
            Some(sync) => self.history.jump_to(index, sync),
            None if index == -1 => Ok(()),
            None => Err(CanvasError::IndexOutOfRange { index, len: 0 }),
        }
    }

    /// Delete one stroke from history, visible or shelved.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::IndexOutOfRange`] unless `index < len`.
    pub fn remove_from_history(&mut self, index: usize) -> CanvasResult<StrokeRecord> {
        match self.sync.as_mut() {
            Some(sync) => self.history.remove_at(index, sync),
            None => Err(CanvasError::IndexOutOfRange {
                index: isize::try_from(index).unwrap_or(isize::MAX),
                len: 0,
            }),
        }
    }

    /// Project the full history into portable records.
    #[must_use]
    pub fn serialize(&self) -> Vec<SerializableRecord> {
        match self.sync.as_ref() {
            Some(sync) => codec::serialize(&self.history, sync),
            None => Vec::new(),
        }
    }

    /// Serialize the full history as a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        codec::to_json(&self.serialize())
    }

    /// Rebuild history from portable records. Every record ends up visible.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NoSurface`] if nothing is attached, or
    /// [`CanvasError::RestoreIntoNonEmpty`] if history already has records.
    pub fn restore(&mut self, records: Vec<SerializableRecord>) -> CanvasResult<()> {
        let sync = self.sync.as_mut().ok_or(CanvasError::NoSurface)?;
        codec::restore_into(
            &mut self.history,
            records,
            &self.options,
            &self.resolver,
            sync,
        )
    }

    /// Restore from a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or [`restore`](Self::restore) fails.
    pub fn restore_json(&mut self, json: &str) -> CanvasResult<()> {
        self.restore(codec::from_json(json)?)
    }

    /// The history timeline.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Snapshot of the observable history state.
    #[must_use]
    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            current_index: self.current_index(),
            len: self.history.len(),
        }
    }

    /// Whether undo would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Index of the last visible record, `-1` when none.
    #[must_use]
    pub fn current_index(&self) -> isize {
        self.history.current_index()
    }

    /// Copy the visible drawing for export.
    ///
    /// Returns `None` when no surface is attached.
    #[must_use]
    pub fn snapshot(&self) -> Option<SceneSnapshot> {
        let sync = self.sync.as_ref()?;
        let style = self.resolver.resolve(&self.options, None);
        let (width, height) = sync.surface().client_size();
        let paths = self
            .history
            .active()
            .iter()
            .filter_map(|record| sync.path_node(&record.id))
            .map(|node| SnapshotPath {
                data: node.data,
                style: node.style,
            })
            .collect();

        Some(SceneSnapshot {
            width,
            height,
            background: self.resolver.background(&self.options),
            linecap: style.linecap,
            linejoin: style.linejoin,
            paths,
        })
    }

    /// Start a PNG export of the visible drawing.
    ///
    /// Returns `None` when no stroke is visible or no surface is attached. The
    /// snapshot is taken before this returns, so later strokes are not part
    /// of the export.
    #[must_use]
    pub fn save(&self) -> Option<ExportFuture> {
        if self.history.active().is_empty() {
            return None;
        }
        let snapshot = self.snapshot()?;
        let ratio = self
            .sync
            .as_ref()
            .map_or(1.0, |sync| sync.surface().device_pixel_ratio());
        let scale = effective_scale(self.options.export_scale, ratio);
        let rasterizer = self.rasterizer.clone();
        tracing::debug!(
            "Exporting {} strokes at scale {scale}",
            snapshot.paths.len()
        );

        Some(
            async move {
                let rasterizer = rasterizer
                    .ok_or_else(|| CanvasError::Export("no rasterizer configured".to_string()))?;
                let png = rasterizer.rasterize(&snapshot, scale)?;
                Ok(png_data_url(&png))
            }
            .boxed(),
        )
    }
}
