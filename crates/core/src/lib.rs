//! Scene dispatch and rendering lifecycle for the life-expectancy story.
//!
//! ```text
//!   CSV / JSON ─▶ Dataset ─▶ ScaleRegistry ─┐
//!                                           ├─▶ Scene::render ─▶ Canvas ─▶ RenderCommand[] ─▶ Renderer
//!   advance / retreat ─▶ SceneController ───┘   (teardown first)           (SVG, egui, TUI, JSON)
//! ```

pub mod annotation;
pub mod canvas;
pub mod config;
pub mod controller;
pub mod error;
pub mod layer;
pub mod model;
pub mod parsers;
pub mod scales;
pub mod scenes;
pub mod story;
pub mod svg;
pub mod tooltip;
pub mod views;

pub use config::StoryConfig;
pub use controller::{NavState, SceneController, SceneState};
pub use error::StoryError;
pub use story::Story;
