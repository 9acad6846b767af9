//! The scene state machine.
//!
//! States are the slide indices `0..=MAX_SLIDE`. `advance` and `retreat`
//! move one step and clamp at both ends; every call re-renders, so the
//! navigation state handed back is always current.

use std::sync::Arc;

use lifeline_protocol::{Point, RenderCommand};
use serde::Serialize;
use tracing::{debug, error};

use crate::canvas::{Canvas, ControlAction, HoverKey};
use crate::error::StoryError;
use crate::layer::teardown;
use crate::scenes::{SCENE_COUNT, SceneContext, Storyline};
use crate::story::Story;
use crate::tooltip::{HoverHandler, TooltipController};

pub const MAX_SLIDE: usize = SCENE_COUNT - 1;

/// Which scene is visible, plus the parameters scenes read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneState {
    current_slide: usize,
    selected_country: Option<String>,
    show_projection: bool,
}

impl SceneState {
    pub fn current_slide(&self) -> usize {
        self.current_slide
    }

    pub fn selected_country(&self) -> Option<&str> {
        self.selected_country.as_deref()
    }

    pub fn show_projection(&self) -> bool {
        self.show_projection
    }
}

/// What the navigation controls should show after a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavState {
    pub slide: usize,
    pub title: String,
    pub back_disabled: bool,
    pub next_disabled: bool,
}

pub struct SceneController {
    story: Arc<Story>,
    storyline: Storyline,
    state: SceneState,
    canvas: Canvas,
    tooltip: TooltipController,
    hovered: Option<(HoverKey, Arc<dyn HoverHandler>)>,
}

impl SceneController {
    /// A controller on slide 0. Nothing is drawn until [`start`](Self::start).
    pub fn new(story: Arc<Story>) -> Self {
        let canvas = Canvas::new(story.viewport(), story.scales());
        let storyline = Storyline::from_config(story.config());
        Self {
            story,
            storyline,
            state: SceneState::default(),
            canvas,
            tooltip: TooltipController::new(),
            hovered: None,
        }
    }

    /// Draw the initial scene.
    pub fn start(&mut self) -> NavState {
        self.redraw()
    }

    pub fn advance(&mut self) -> NavState {
        let from = self.state.current_slide;
        if from < MAX_SLIDE {
            self.state.current_slide += 1;
        }
        debug!(from, to = self.state.current_slide, "advance");
        self.redraw()
    }

    pub fn retreat(&mut self) -> NavState {
        let from = self.state.current_slide;
        if from > 0 {
            self.state.current_slide -= 1;
        }
        debug!(from, to = self.state.current_slide, "retreat");
        self.redraw()
    }

    /// Tear down and draw `slide`, making it current.
    ///
    /// A slide outside the storyline is an internal error: the canvas is
    /// left torn down, the state is untouched, and the next navigation
    /// renders normally.
    #[tracing::instrument(skip(self), fields(current = self.state.current_slide))]
    pub fn render(&mut self, slide: usize) -> Result<NavState, StoryError> {
        teardown(&mut self.canvas, &mut self.tooltip);
        self.hovered = None;

        let Some(scene) = self.storyline.get(slide) else {
            error!(slide, max = MAX_SLIDE, "render dispatched for unknown slide");
            return Err(StoryError::SlideOutOfRange {
                slide,
                max: MAX_SLIDE,
            });
        };
        self.state.current_slide = slide;
        let ctx = SceneContext {
            dataset: self.story.dataset(),
            scales: self.story.scales(),
            selected_country: self.state.selected_country.as_deref(),
            show_projection: self.state.show_projection,
        };
        scene.render(&ctx, &mut self.canvas);
        Ok(self.nav_state())
    }

    /// Set or clear the drill-down selection and re-render.
    pub fn select_country(&mut self, country: Option<String>) -> NavState {
        debug!(?country, "select country");
        self.state.selected_country = country;
        self.redraw()
    }

    pub fn toggle_projection(&mut self) -> NavState {
        self.state.show_projection = !self.state.show_projection;
        debug!(show = self.state.show_projection, "toggle projection");
        self.redraw()
    }

    /// Track the pointer (outer coordinates). Entering a mark shows its
    /// tooltip; leaving every mark hides it. Returns whether the canvas
    /// changed.
    pub fn pointer_moved(&mut self, position: Point) -> bool {
        let hit = self
            .canvas
            .hover_target_at(position)
            .map(|(key, target)| (key, target.record, Arc::clone(&target.handler)));
        let Some((key, index, handler)) = hit else {
            return self.pointer_left();
        };
        if self.hovered.as_ref().is_some_and(|(k, _)| *k == key) {
            return false;
        }
        let Some(record) = self.story.dataset().get(index) else {
            return false;
        };
        let command = handler.on_hover_start(record, position);
        self.tooltip.apply(&mut self.canvas, command);
        self.hovered = Some((key, handler));
        true
    }

    pub fn pointer_left(&mut self) -> bool {
        let Some((_, handler)) = self.hovered.take() else {
            return false;
        };
        self.tooltip.apply(&mut self.canvas, handler.on_hover_end());
        true
    }

    /// Handle a click on scene controls. Clicking the selected country
    /// again clears the selection. Returns `None` when nothing was hit.
    pub fn click(&mut self, position: Point) -> Option<NavState> {
        let action = self.canvas.control_at(position)?.action.clone();
        Some(match action {
            ControlAction::SelectCountry(country) => {
                if self.state.selected_country.as_deref() == Some(country.as_str()) {
                    self.select_country(None)
                } else {
                    self.select_country(Some(country))
                }
            }
            ControlAction::ToggleProjection => self.toggle_projection(),
        })
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    pub fn storyline(&self) -> &Storyline {
        &self.storyline
    }

    pub fn commands(&self) -> Vec<RenderCommand> {
        self.canvas.commands()
    }

    pub fn nav_state(&self) -> NavState {
        let slide = self.state.current_slide;
        NavState {
            slide,
            title: self
                .storyline
                .get(slide)
                .map(|s| s.title().to_string())
                .unwrap_or_default(),
            back_disabled: slide == 0,
            next_disabled: slide == MAX_SLIDE,
        }
    }

    /// Re-render the current slide. The current slide is always in range.
    fn redraw(&mut self) -> NavState {
        match self.render(self.state.current_slide) {
            Ok(nav) => nav,
            Err(_) => self.nav_state(),
        }
    }
}
