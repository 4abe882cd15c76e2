//! WebAssembly bindings for sketch-core.
//!
//! The browser host forwards pointer events and mirrors the drawing by
//! rendering [`WasmWhiteboard::svg_markup`]. PNG encoding is left to the host.

use wasm_bindgen::prelude::*;

use crate::{OptionsDocument, Point, Scene, Whiteboard};

/// Initialize the sketch WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Whiteboard instance for WASM.
#[wasm_bindgen]
pub struct WasmWhiteboard {
    board: Whiteboard<Scene>,
}

#[wasm_bindgen]
impl WasmWhiteboard {
    /// Create a whiteboard with a surface of the given size.
    ///
    /// `options_json` is an optional options document
    /// (`{"color": "#333", "initialState": [...]}` and so on).
    ///
    /// # Errors
    ///
    /// Returns an error string if the options or initial state are invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f32,
        height: f32,
        options_json: Option<String>,
    ) -> Result<WasmWhiteboard, String> {
        let options = match options_json.as_deref() {
            Some(json) if !json.trim().is_empty() => OptionsDocument::from_json(json)
                .map_err(|e| e.to_string())?
                .into_options(),
            _ => crate::WhiteboardOptions::default(),
        };
        let mut board = Whiteboard::new(options);
        board
            .attach(Scene::new(width, height))
            .map_err(|e| e.to_string())?;
        Ok(Self { board })
    }

    /// Start a stroke.
    ///
    /// # Errors
    ///
    /// Returns an error string if a stroke is already in progress.
    #[wasm_bindgen(js_name = pointerStart)]
    pub fn pointer_start(&mut self, x: f64, y: f64) -> Result<(), String> {
        self.board
            .begin_stroke(Point::new(x, y))
            .map_err(|e| e.to_string())
    }

    /// Extend the current stroke.
    ///
    /// # Errors
    ///
    /// Returns an error string if no stroke is in progress.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<(), String> {
        self.board
            .extend_stroke(Point::new(x, y))
            .map_err(|e| e.to_string())
    }

    /// Finish the current stroke, returning its ID.
    ///
    /// # Errors
    ///
    /// Returns an error string if no stroke is in progress.
    #[wasm_bindgen(js_name = pointerEnd)]
    pub fn pointer_end(&mut self) -> Result<String, String> {
        self.board
            .finish_stroke()
            .map(|id| id.to_string())
            .map_err(|e| e.to_string())
    }

    /// Undo the last stroke.
    pub fn undo(&mut self) -> bool {
        self.board.undo()
    }

    /// Redo the next stroke.
    pub fn redo(&mut self) -> bool {
        self.board.redo()
    }

    /// Remove every stroke.
    pub fn clear(&mut self) {
        self.board.clear();
    }

    /// Jump to a history index (`-1` hides everything).
    ///
    /// # Errors
    ///
    /// Returns an error string if the index is out of range.
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&mut self, index: i32) -> Result<(), String> {
        let index = isize::try_from(index).map_err(|e| e.to_string())?;
        self.board.jump_to(index).map_err(|e| e.to_string())
    }

    /// Delete one stroke from history.
    ///
    /// # Errors
    ///
    /// Returns an error string if the index is out of range.
    #[wasm_bindgen(js_name = removeFromHistory)]
    pub fn remove_from_history(&mut self, index: u32) -> Result<(), String> {
        let index = usize::try_from(index).map_err(|e| e.to_string())?;
        self.board
            .remove_from_history(index)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.board.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.board.can_redo()
    }

    /// Index of the last visible stroke, `-1` when none.
    #[wasm_bindgen(js_name = currentIndex)]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn current_index(&self) -> i32 {
        self.board.current_index() as i32
    }

    /// History state as JSON (`{"canUndo", "canRedo", "currentIndex", "len"}`).
    #[wasm_bindgen(js_name = historyStateJson)]
    #[must_use]
    pub fn history_state_json(&self) -> String {
        serde_json::to_string(&self.board.state()).unwrap_or_default()
    }

    /// Serialize the full history as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if serialization fails.
    #[wasm_bindgen(js_name = serializeJson)]
    pub fn serialize_json(&self) -> Result<String, String> {
        self.board.to_json().map_err(|e| e.to_string())
    }

    /// Restore history from JSON into an empty whiteboard.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing fails or history is not empty.
    #[wasm_bindgen(js_name = restoreJson)]
    pub fn restore_json(&mut self, json: &str) -> Result<(), String> {
        self.board.restore_json(json).map_err(|e| e.to_string())
    }

    /// SVG markup of the visible drawing.
    #[wasm_bindgen(js_name = svgMarkup)]
    #[must_use]
    pub fn svg_markup(&self) -> String {
        self.board
            .snapshot()
            .map(|snapshot| snapshot.to_svg())
            .unwrap_or_default()
    }

    /// SVG data URL of the visible drawing, `undefined` when no stroke is visible.
    #[wasm_bindgen(js_name = svgDataUrl)]
    #[must_use]
    pub fn svg_data_url(&self) -> Option<String> {
        if self.board.history().active().is_empty() {
            return None;
        }
        self.board.snapshot().map(|snapshot| snapshot.svg_data_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke(board: &mut WasmWhiteboard, from: (f64, f64), to: (f64, f64)) -> String {
        board.pointer_start(from.0, from.1).expect("start");
        board.pointer_move(to.0, to.1).expect("move");
        board.pointer_end().expect("end")
    }

    #[test]
    fn wasm_whiteboard_new_creates_empty_instance() {
        let board = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        assert!(!board.can_undo());
        assert_eq!(board.current_index(), -1);
        assert!(board.svg_data_url().is_none());
    }

    #[test]
    fn svg_data_url_is_none_after_undoing_everything() {
        let mut board = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        stroke(&mut board, (0.0, 0.0), (10.0, 10.0));
        assert!(board.svg_data_url().is_some());
        assert!(board.undo());
        assert!(board.svg_data_url().is_none());
    }

    #[test]
    fn new_rejects_invalid_options() {
        assert!(WasmWhiteboard::new(640.0, 480.0, Some("{ nope".to_string())).is_err());
    }

    #[test]
    fn pointer_lifecycle_appends_stroke() {
        let mut board = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        stroke(&mut board, (0.0, 0.0), (10.0, 10.0));
        assert!(board.can_undo());
        assert_eq!(board.current_index(), 0);
        assert!(board.svg_markup().contains("<path"));
    }

    #[test]
    fn pointer_end_without_start_is_error() {
        let mut board = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        assert!(board.pointer_end().is_err());
    }

    #[test]
    fn history_state_json_is_camel_case() {
        let mut board = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        stroke(&mut board, (0.0, 0.0), (10.0, 10.0));
        board.undo();
        let state: serde_json::Value =
            serde_json::from_str(&board.history_state_json()).expect("json");
        assert_eq!(state["canRedo"], true);
        assert_eq!(state["currentIndex"], -1);
    }

    #[test]
    fn jump_to_out_of_range_is_error() {
        let mut board = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        stroke(&mut board, (0.0, 0.0), (10.0, 10.0));
        assert!(board.jump_to(5).is_err());
        assert!(board.jump_to(-1).is_ok());
        assert_eq!(board.current_index(), -1);
    }

    #[test]
    fn json_roundtrip_through_options() {
        let mut source = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        stroke(&mut source, (0.0, 0.0), (10.0, 10.0));
        stroke(&mut source, (5.0, 5.0), (15.0, 15.0));
        let json = source.serialize_json().expect("serialize");

        let options = format!(r#"{{"initialState": {json}}}"#);
        let copy = WasmWhiteboard::new(640.0, 480.0, Some(options)).expect("restore");
        assert_eq!(copy.current_index(), 1);
        assert_eq!(copy.serialize_json().expect("serialize"), json);
    }

    #[test]
    fn restore_json_into_non_empty_is_error() {
        let mut board = WasmWhiteboard::new(640.0, 480.0, None).expect("new");
        stroke(&mut board, (0.0, 0.0), (10.0, 10.0));
        let json = board.serialize_json().expect("serialize");
        assert!(board.restore_json(&json).is_err());
    }
}
