use std::sync::{Arc, Mutex, MutexGuard};

use lifeline_core::svg::render_svg;
use lifeline_core::{NavState, SceneController, Story, StoryConfig};
use lifeline_protocol::Point;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Handle table. Freed handles are reused by later loads.
struct Slots<T> {
    entries: Vec<Option<T>>,
}

impl<T> Slots<T> {
    const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, value: T) -> usize {
        match self.entries.iter().position(Option::is_none) {
            Some(handle) => {
                self.entries[handle] = Some(value);
                handle
            }
            None => {
                self.entries.push(Some(value));
                self.entries.len() - 1
            }
        }
    }

    fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.entries.get_mut(handle).and_then(Option::as_mut)
    }

    fn release(&mut self, handle: usize) -> bool {
        self.entries
            .get_mut(handle)
            .and_then(Option::take)
            .is_some()
    }
}

static STORIES: Mutex<Slots<SceneController>> = Mutex::new(Slots::new());

fn stories() -> MutexGuard<'static, Slots<SceneController>> {
    STORIES.lock().unwrap_or_else(|e| e.into_inner())
}

fn with_story<T>(
    handle: usize,
    f: impl FnOnce(&mut SceneController) -> T,
) -> Result<T, JsError> {
    let mut stories = stories();
    let controller = stories
        .get_mut(handle)
        .ok_or_else(|| JsError::new("invalid story handle"))?;
    Ok(f(controller))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

/// Load a dataset (CSV or JSON bytes) and draw the first scene. `config`
/// is an optional JSON override of the story configuration. Returns a
/// handle for later calls.
#[wasm_bindgen]
pub fn load_story(data: &[u8], config: Option<String>) -> Result<usize, JsError> {
    let config = match config {
        Some(json) => {
            StoryConfig::from_json(json.as_bytes()).map_err(|e| JsError::new(&e.to_string()))?
        }
        None => StoryConfig::default(),
    };
    let story = Story::from_bytes(data, config).map_err(|e| JsError::new(&e.to_string()))?;
    let mut controller = SceneController::new(Arc::new(story));
    controller.start();
    Ok(stories().insert(controller))
}

/// Drop a loaded story. Returns `false` for an unknown or already freed
/// handle.
#[wasm_bindgen]
pub fn free_story(handle: usize) -> bool {
    stories().release(handle)
}

fn nav_json(
    handle: usize,
    f: impl FnOnce(&mut SceneController) -> NavState,
) -> Result<String, JsError> {
    let nav = with_story(handle, f)?;
    to_json(&nav)
}

/// Navigation state as JSON: `{slide, title, back_disabled, next_disabled}`.
#[wasm_bindgen]
pub fn nav_state(handle: usize) -> Result<String, JsError> {
    nav_json(handle, |c| c.nav_state())
}

#[wasm_bindgen]
pub fn advance(handle: usize) -> Result<String, JsError> {
    nav_json(handle, SceneController::advance)
}

#[wasm_bindgen]
pub fn retreat(handle: usize) -> Result<String, JsError> {
    nav_json(handle, SceneController::retreat)
}

/// Jump to a slide. An out-of-range slide is an error.
#[wasm_bindgen]
pub fn render_slide(handle: usize, slide: usize) -> Result<String, JsError> {
    let nav = with_story(handle, |c| c.render(slide))?
        .map_err(|e| JsError::new(&e.to_string()))?;
    to_json(&nav)
}

/// Select a country for the drill-down scene; `None` clears it.
#[wasm_bindgen]
pub fn select_country(handle: usize, country: Option<String>) -> Result<String, JsError> {
    nav_json(handle, |c| c.select_country(country))
}

#[wasm_bindgen]
pub fn toggle_projection(handle: usize) -> Result<String, JsError> {
    nav_json(handle, SceneController::toggle_projection)
}

/// Feed a pointer position in story coordinates. Returns whether the
/// canvas changed and should be redrawn.
#[wasm_bindgen]
pub fn pointer_move(handle: usize, x: f64, y: f64) -> Result<bool, JsError> {
    with_story(handle, |c| c.pointer_moved(Point::new(x, y)))
}

#[wasm_bindgen]
pub fn pointer_leave(handle: usize) -> Result<bool, JsError> {
    with_story(handle, SceneController::pointer_left)
}

/// Click in story coordinates. Returns the new navigation state as JSON,
/// or `None` when no control was hit.
#[wasm_bindgen]
pub fn click(handle: usize, x: f64, y: f64) -> Result<Option<String>, JsError> {
    with_story(handle, |c| c.click(Point::new(x, y)))?
        .map(|nav| to_json(&nav))
        .transpose()
}

/// The current canvas as render commands, JSON encoded.
#[wasm_bindgen]
pub fn render_commands(handle: usize) -> Result<String, JsError> {
    let commands = with_story(handle, |c| c.commands())?;
    to_json(&commands)
}

/// The current canvas as a standalone SVG document.
#[wasm_bindgen]
pub fn render_svg_string(handle: usize, dark: bool) -> Result<String, JsError> {
    with_story(handle, |c| {
        let viewport = c.story().viewport();
        render_svg(&c.commands(), viewport.width, viewport.height, dark)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freed_handles_are_reused() {
        let mut slots = Slots::new();
        assert_eq!(slots.insert("a"), 0);
        assert_eq!(slots.insert("b"), 1);
        assert!(slots.release(0));
        assert!(!slots.release(0));
        assert!(slots.get_mut(0).is_none());
        assert_eq!(slots.insert("c"), 0);
        assert_eq!(slots.get_mut(0).copied(), Some("c"));
        assert_eq!(slots.entries.len(), 2);
        assert!(!slots.release(7));
    }

    #[test]
    fn controllers_fit_in_a_slot() {
        let csv = b"country,year,life_expectancy\nChina,1960,44.0\n";
        let story = Story::from_bytes(csv, StoryConfig::default()).unwrap();
        let mut slots = Slots::new();
        let handle = slots.insert(SceneController::new(Arc::new(story)));
        let nav = slots.get_mut(handle).map(SceneController::start).unwrap();
        assert_eq!(nav.slide, 0);
        assert!(slots.release(handle));
    }
}
