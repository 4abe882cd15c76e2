//! Serialization of history to and from JSON-safe records.
//!
//! The full history is serialized, shelved records included. Restoring
//! activates every record.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::WhiteboardOptions;
use crate::history::History;
use crate::record::{now_ms, StrokeId, StrokeKind, StrokeRecord};
use crate::scene::Surface;
use crate::stroke::PathData;
use crate::style::{BrushSnapshot, StyleResolver};
use crate::sync::SceneSync;
use crate::{CanvasError, CanvasResult};

/// Portable form of a [`StrokeRecord`].
///
/// Field names follow the persisted JSON layout:
/// `{"id", "kind", "timestamp", "pathData", "style": {"color", "size"}}`.
/// Records written with the older `type` / `brush` names are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializableRecord {
    /// Identifier of the original record.
    pub id: String,
    /// Mark kind.
    #[serde(alias = "type", default)]
    pub kind: StrokeKind,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// SVG path data.
    pub path_data: String,
    /// Brush the mark was drawn with.
    #[serde(alias = "brush")]
    pub style: BrushSnapshot,
}

impl SerializableRecord {
    fn into_record(self) -> StrokeRecord {
        StrokeRecord {
            id: StrokeId::from_string(self.id),
            kind: self.kind,
            created_at: self.timestamp.unwrap_or_else(now_ms),
            geometry: PathData::new(self.path_data),
            style: self.style,
        }
    }
}

/// Project every record, active and shelved, in order.
///
/// Path data is read from each record's live node when it has one.
#[must_use]
pub fn serialize<S: Surface>(history: &History, sync: &SceneSync<S>) -> Vec<SerializableRecord> {
    history
        .records()
        .iter()
        .map(|record| SerializableRecord {
            id: record.id.to_string(),
            kind: record.kind,
            timestamp: Some(record.created_at),
            path_data: sync
                .path_data(&record.id)
                .unwrap_or_else(|| record.geometry.clone())
                .to_string(),
            style: record.style.clone(),
        })
        .collect()
}

/// Rebuild history from serialized records into an empty `history`.
///
/// Each record keeps its own color and size; cap, join and extra
/// declarations come from `options`. Every restored record ends up active.
/// A repeated id gets a fresh one so each record keeps its own node.
///
/// # Errors
///
/// Returns [`CanvasError::RestoreIntoNonEmpty`] if `history` has records.
pub fn restore_into<S: Surface>(
    history: &mut History,
    records: Vec<SerializableRecord>,
    options: &WhiteboardOptions,
    resolver: &StyleResolver,
    sync: &mut SceneSync<S>,
) -> CanvasResult<()> {
    if !history.is_empty() {
        return Err(CanvasError::RestoreIntoNonEmpty {
            len: history.len(),
        });
    }

    let count = records.len();
    let mut seen = HashSet::with_capacity(count);
    for serialized in records {
        let mut record = serialized.into_record();
        if !seen.insert(record.id.clone()) {
            tracing::warn!("Duplicate stroke id {} in restored records", record.id);
            record.id = StrokeId::new();
            seen.insert(record.id.clone());
        }
        let style = resolver.resolve(options, Some(&record.style));
        sync.materialize(&record, &style);
        history.append(record, sync);
    }

    tracing::debug!("Restored {count} strokes");
    Ok(())
}

/// Rebuild a fresh history from serialized records.
#[must_use]
pub fn restore<S: Surface>(
    records: Vec<SerializableRecord>,
    options: &WhiteboardOptions,
    resolver: &StyleResolver,
    sync: &mut SceneSync<S>,
) -> History {
    let mut history = History::new();
    // A fresh history is empty, so the precondition holds.
    let _ = restore_into(&mut history, records, options, resolver, sync);
    history
}

/// Encode records as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(records: &[SerializableRecord]) -> CanvasResult<String> {
    serde_json::to_string(records).map_err(CanvasError::Serialization)
}

/// Decode records from a JSON array.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or a record is incomplete.
pub fn from_json(json: &str) -> CanvasResult<Vec<SerializableRecord>> {
    serde_json::from_str(json).map_err(CanvasError::Serialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn serialized(id: &str, path: &str, color: &str) -> SerializableRecord {
        SerializableRecord {
            id: id.to_string(),
            kind: StrokeKind::Line,
            timestamp: Some(1_700_000_000_000),
            path_data: path.to_string(),
            style: BrushSnapshot {
                color: color.to_string(),
                size: "4px".to_string(),
            },
        }
    }

    #[test]
    fn test_restore_activates_everything() {
        let mut sync = SceneSync::new(Scene::default());
        let history = restore(
            vec![
                serialized("a", "M0,0L1,1", "#ff0000"),
                serialized("b", "M2,2L3,3", "#00ff00"),
            ],
            &WhiteboardOptions::default(),
            &StyleResolver::default(),
            &mut sync,
        );

        assert_eq!(history.len(), 2);
        assert_eq!(history.current_index(), 1);
        assert!(history.in_sync_with(&sync));
        assert_eq!(history.records()[0].created_at, 1_700_000_000_000);
    }

    #[test]
    fn test_restored_style_uses_record_brush() {
        let mut sync = SceneSync::new(Scene::default());
        let options = WhiteboardOptions::new()
            .with_color("#999999")
            .with_linecap(crate::LineCap::Square);
        let history = restore(
            vec![serialized("a", "M0,0L1,1", "#ff0000")],
            &options,
            &StyleResolver::default(),
            &mut sync,
        );

        let node = sync
            .path_node(&history.records()[0].id)
            .expect("materialized node");
        assert_eq!(node.style.color, "#ff0000");
        assert_eq!(node.style.width, "4px");
        assert_eq!(node.style.linecap, crate::LineCap::Square);
    }

    #[test]
    fn test_restore_into_non_empty_rejected() {
        let mut sync = SceneSync::new(Scene::default());
        let options = WhiteboardOptions::default();
        let resolver = StyleResolver::default();
        let mut history = restore(
            vec![serialized("a", "M0,0L1,1", "#000")],
            &options,
            &resolver,
            &mut sync,
        );

        let result = restore_into(
            &mut history,
            vec![serialized("b", "M0,0L1,1", "#000")],
            &options,
            &resolver,
            &mut sync,
        );
        assert!(matches!(
            result,
            Err(CanvasError::RestoreIntoNonEmpty { len: 1 })
        ));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_serialize_includes_shelved() {
        let mut sync = SceneSync::new(Scene::default());
        let mut history = restore(
            vec![
                serialized("a", "M0,0L1,1", "#000"),
                serialized("b", "M1,1L2,2", "#000"),
            ],
            &WhiteboardOptions::default(),
            &StyleResolver::default(),
            &mut sync,
        );
        history.undo(&mut sync);

        let out = serialize(&history, &sync);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].id, "b");
        assert_eq!(out[1].path_data, "M1,1L2,2");
    }

    #[test]
    fn test_json_layout() {
        let json = to_json(&[serialized("a", "M0,0L1,1", "#123456")]).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(value[0]["kind"], "line");
        assert_eq!(value[0]["pathData"], "M0,0L1,1");
        assert_eq!(value[0]["style"]["color"], "#123456");
        assert_eq!(value[0]["timestamp"], 1_700_000_000_000_u64);
    }

    #[test]
    fn test_legacy_field_names_accepted() {
        let json = r##"[{"id":"x","type":"line","pathData":"M0,0L1,1","brush":{"color":"#fff","size":"2px"}}]"##;
        let records = from_json(json).expect("legacy records");
        assert_eq!(records[0].kind, StrokeKind::Line);
        assert_eq!(records[0].style.size, "2px");
        assert!(records[0].timestamp.is_none());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let json = r##"[{"id":"x","kind":"circle","pathData":"","style":{"color":"#fff","size":"2px"}}]"##;
        assert!(from_json(json).is_err());
    }

    #[test]
    fn test_duplicate_ids_get_fresh_ids() {
        let mut sync = SceneSync::new(Scene::default());
        let history = restore(
            vec![
                serialized("dup", "M0,0L1,1", "#000"),
                serialized("dup", "M1,1L2,2", "#000"),
            ],
            &WhiteboardOptions::default(),
            &StyleResolver::default(),
            &mut sync,
        );
        assert_ne!(history.records()[0].id, history.records()[1].id);
        assert_eq!(sync.surface().attached_count(), 2);
        assert!(history.in_sync_with(&sync));
    }
}
