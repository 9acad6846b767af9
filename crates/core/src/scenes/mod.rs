//! The five narrative scenes.
//!
//! Every scene filters the shared dataset on its own, draws into a fresh
//! plot layer and optionally adds annotations, hover targets and controls.
//! The controller indexes [`Storyline`] directly and never special-cases
//! a slide.

mod baseline;
mod dips;
mod drilldown;
mod projection;
mod trajectory;

use std::sync::Arc;

use lifeline_protocol::{Paint, Point, Rect, RenderCommand, TextAlign, ThemeToken};

use crate::canvas::{Canvas, ControlAction, HoverTarget, LayerBuilder};
use crate::config::StoryConfig;
use crate::model::{CountryGroup, Dataset, Row};
use crate::scales::ScaleRegistry;
use crate::tooltip::HoverHandler;

pub use baseline::BaselineScene;
pub use dips::{Dip, DipScene, DipTooltip, find_dips};
pub use drilldown::DrilldownScene;
pub use projection::{ProjectionScene, Trend};
pub use trajectory::TrajectoryScene;

pub const SCENE_COUNT: usize = 5;

/// Everything a scene may read while rendering.
#[derive(Clone, Copy)]
pub struct SceneContext<'a> {
    pub dataset: &'a Dataset,
    pub scales: &'a ScaleRegistry,
    /// Drill-down selection.
    pub selected_country: Option<&'a str>,
    pub show_projection: bool,
}

pub trait Scene: Send + Sync {
    fn title(&self) -> &str;

    /// Draw this scene onto a canvas that has just been torn down.
    fn render(&self, ctx: &SceneContext<'_>, canvas: &mut Canvas);
}

/// The fixed, ordered list of scenes.
pub struct Storyline {
    scenes: [Box<dyn Scene>; SCENE_COUNT],
}

impl Storyline {
    pub fn from_config(config: &StoryConfig) -> Self {
        Self {
            scenes: [
                Box::new(BaselineScene::new(config.baseline.clone())),
                Box::new(TrajectoryScene::new(config.trajectory.clone())),
                Box::new(DrilldownScene::new(config.drilldown.clone())),
                Box::new(DipScene::new(config.dips.clone())),
                Box::new(ProjectionScene::new(
                    config.projection.clone(),
                    config.y_domain,
                )),
            ],
        }
    }

    pub fn get(&self, slide: usize) -> Option<&dyn Scene> {
        self.scenes.get(slide).map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.scenes.iter().map(|s| s.title())
    }
}

// Shared drawing helpers.

const PANEL_GAP: f64 = 20.0;
const BUTTON_WIDTH: f64 = 160.0;
const BUTTON_HEIGHT: f64 = 22.0;
const BUTTON_SPACING: f64 = 6.0;
const CONTROL_FONT: f64 = 11.0;

fn in_focus<'c>(countries: &'c [String]) -> impl Fn(&str) -> bool + 'c {
    move |country: &str| countries.iter().any(|c| c == country)
}

/// One polyline per group through its points in year order.
fn draw_series(
    layer: &mut LayerBuilder<'_>,
    scales: &ScaleRegistry,
    group: &CountryGroup<'_>,
    width: f64,
    opacity: f32,
) {
    let points = group
        .in_year_order()
        .iter()
        .map(|row| scales.project_record(row.record))
        .collect();
    layer.path(points, scales.color.paint(group.country), width, opacity, false);
}

/// Circles with hover targets, one per row.
fn draw_hover_marks(
    layer: &mut LayerBuilder<'_>,
    scales: &ScaleRegistry,
    rows: &[Row<'_>],
    radius: f64,
    fill: impl Fn(&Row<'_>) -> Paint,
    handler: &Arc<dyn HoverHandler>,
) {
    for row in rows {
        let center = scales.project_record(row.record);
        layer.circle(center, radius, fill(row), 1.0);
        layer.hover(HoverTarget {
            center,
            radius,
            record: row.index,
            handler: Arc::clone(handler),
        });
    }
}

/// Top-left corner of the control panel in the right margin, outer space.
fn panel_origin(canvas: &Canvas) -> Point {
    let viewport = canvas.viewport();
    Point::new(
        viewport.width - viewport.margins.right + PANEL_GAP,
        viewport.margins.top,
    )
}

/// A clickable labelled button in a controls layer.
fn draw_button(
    layer: &mut LayerBuilder<'_>,
    origin: Point,
    label: &str,
    active: bool,
    swatch: Option<Paint>,
    action: ControlAction,
) {
    let rect = Rect::new(origin.x, origin.y, BUTTON_WIDTH, BUTTON_HEIGHT);
    let fill = if active {
        ThemeToken::ControlActive
    } else {
        ThemeToken::ControlBackground
    };
    layer.rect(rect, fill.into(), Some(ThemeToken::AxisLine.into()));
    let mut text_x = origin.x + 8.0;
    if let Some(paint) = swatch {
        layer.rect(
            Rect::new(origin.x + 6.0, origin.y + 6.0, 10.0, 10.0),
            paint,
            None,
        );
        text_x += 14.0;
    }
    layer.push(RenderCommand::DrawText {
        position: Point::new(text_x, origin.y + BUTTON_HEIGHT * 0.7),
        text: label.to_string(),
        color: ThemeToken::ControlText.into(),
        font_size: CONTROL_FONT,
        align: TextAlign::Left,
        bold: active,
    });
    layer.control(rect, action);
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::canvas::Canvas;
    use crate::config::StoryConfig;
    use crate::model::{Dataset, Record};
    use crate::scales::ScaleRegistry;

    pub fn dataset(rows: &[(&str, i32, f64)]) -> Dataset {
        Dataset::new(
            rows.iter()
                .map(|(c, y, v)| Record::new(*c, *y, *v).unwrap())
                .collect(),
        )
    }

    pub fn setup(dataset: &Dataset) -> (ScaleRegistry, Canvas) {
        let config = StoryConfig::default();
        let scales = ScaleRegistry::build(dataset, &config);
        let canvas = Canvas::new(config.viewport(), &scales);
        (scales, canvas)
    }
}
