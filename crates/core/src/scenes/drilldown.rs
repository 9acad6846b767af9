use std::sync::Arc;

use lifeline_protocol::{Point, RenderCommand, TextAlign, ThemeToken};
use tracing::{debug, warn};

use crate::annotation::{AnnotationRenderer, AnnotationSpec, DataPoint, Offset};
use crate::canvas::{Canvas, ControlAction, LayerTag};
use crate::config::DrilldownConfig;
use crate::model::group_by_country;
use crate::scenes::{
    BUTTON_HEIGHT, BUTTON_SPACING, CONTROL_FONT, Scene, SceneContext, draw_button,
    draw_hover_marks, draw_series, in_focus, panel_origin,
};
use crate::tooltip::{HoverHandler, RecordTooltip};

const LINE_WIDTH: f64 = 2.0;
const SELECTED_WIDTH: f64 = 3.0;
const DIMMED_OPACITY: f32 = 0.25;
const MARK_RADIUS: f64 = 3.0;

/// A sub-population with a country picker in the right margin.
pub struct DrilldownScene {
    config: DrilldownConfig,
}

impl DrilldownScene {
    pub fn new(config: DrilldownConfig) -> Self {
        Self { config }
    }
}

impl Scene for DrilldownScene {
    fn title(&self) -> &str {
        "A closer look at sub-Saharan Africa"
    }

    fn render(&self, ctx: &SceneContext<'_>, canvas: &mut Canvas) {
        let until = self.config.until_year;
        let focus = in_focus(&self.config.countries);
        let rows = ctx
            .dataset
            .select(|r| focus(r.country.as_str()) && r.year <= until);
        let groups = group_by_country(&rows);
        // A selection outside this scene's data behaves like no selection.
        let selected = ctx
            .selected_country
            .filter(|s| groups.iter().any(|g| g.country == *s));

        {
            let mut layer = canvas.begin_layer(LayerTag::Plot);
            for group in &groups {
                let (width, opacity) = match selected {
                    None => (LINE_WIDTH, 1.0),
                    Some(s) if s == group.country => (SELECTED_WIDTH, 1.0),
                    Some(_) => (LINE_WIDTH, DIMMED_OPACITY),
                };
                draw_series(&mut layer, ctx.scales, group, width, opacity);
            }
            if let Some(group) = selected.and_then(|s| groups.iter().find(|g| g.country == s)) {
                let handler: Arc<dyn HoverHandler> = Arc::new(RecordTooltip);
                let paint = ctx.scales.color.paint(group.country);
                draw_hover_marks(
                    &mut layer,
                    ctx.scales,
                    &group.in_year_order(),
                    MARK_RADIUS,
                    |_| paint,
                    &handler,
                );
            }
        }

        if !groups.is_empty() {
            let origin = panel_origin(canvas);
            let mut panel = canvas.begin_layer(LayerTag::Controls);
            panel.push(RenderCommand::DrawText {
                position: Point::new(origin.x, origin.y - 8.0),
                text: "Select a country".to_string(),
                color: ThemeToken::NarrativeText.into(),
                font_size: CONTROL_FONT,
                align: TextAlign::Left,
                bold: true,
            });
            for (i, group) in groups.iter().enumerate() {
                let y = origin.y + i as f64 * (BUTTON_HEIGHT + BUTTON_SPACING);
                draw_button(
                    &mut panel,
                    Point::new(origin.x, y),
                    group.country,
                    selected == Some(group.country),
                    Some(ctx.scales.color.paint(group.country)),
                    ControlAction::SelectCountry(group.country.to_string()),
                );
            }
        }
        debug!(
            series = groups.len(),
            selected = selected.unwrap_or("none"),
            "drilldown rendered"
        );

        let anchor = &self.config.anchor_country;
        let year = self.config.anchor_year;
        let value = groups
            .iter()
            .find(|g| g.country == anchor.as_str())
            .and_then(|g| g.value_at(year));
        let Some(value) = value else {
            if !rows.is_empty() {
                warn!(country = %anchor, year, "no anchor value, annotation omitted");
            }
            return;
        };
        let note = &self.config.note;
        let spec = AnnotationSpec::new(
            note.title.clone(),
            note.label.clone(),
            DataPoint::new(f64::from(year), value),
            Offset::new(50.0, -90.0),
        );
        AnnotationRenderer::place(canvas, ctx.scales, &[spec]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::scenes::test_support::{dataset, setup};

    fn sample() -> crate::model::Dataset {
        dataset(&[
            ("Kenya", 1990, 57.0),
            ("Kenya", 2000, 51.0),
            ("Zimbabwe", 1990, 60.0),
            ("Zimbabwe", 2000, 44.0),
            ("Zimbabwe", 2021, 59.0),
            ("Japan", 2000, 81.0),
        ])
    }

    fn render(selected: Option<&str>) -> Canvas {
        let data = sample();
        let (scales, mut canvas) = setup(&data);
        let ctx = SceneContext {
            dataset: &data,
            scales: &scales,
            selected_country: selected,
            show_projection: false,
        };
        DrilldownScene::new(StoryConfig::default().drilldown).render(&ctx, &mut canvas);
        canvas
    }

    fn opacities(canvas: &Canvas) -> Vec<f32> {
        canvas
            .layer_commands(LayerTag::Plot)
            .filter_map(|c| match c {
                RenderCommand::DrawPath { opacity, .. } => Some(*opacity),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn panel_lists_focus_countries_present() {
        let canvas = render(None);
        let actions: Vec<_> = canvas.control_targets().map(|t| t.action.clone()).collect();
        assert_eq!(
            actions,
            vec![
                ControlAction::SelectCountry("Kenya".into()),
                ControlAction::SelectCountry("Zimbabwe".into()),
            ]
        );
        assert_eq!(opacities(&canvas), vec![1.0, 1.0]);
        assert_eq!(canvas.hover_targets().count(), 0);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 1);
    }

    #[test]
    fn selection_emphasizes_one_series() {
        let canvas = render(Some("Zimbabwe"));
        assert_eq!(opacities(&canvas), vec![DIMMED_OPACITY, 1.0]);
        // 2021 is past the cut-off.
        assert_eq!(canvas.hover_targets().count(), 2);
    }

    #[test]
    fn unknown_selection_is_ignored() {
        let canvas = render(Some("Japan"));
        assert_eq!(opacities(&canvas), vec![1.0, 1.0]);
        assert_eq!(canvas.hover_targets().count(), 0);
    }

    #[test]
    fn empty_filter_draws_no_panel() {
        let data = dataset(&[("Japan", 2000, 81.0)]);
        let (scales, mut canvas) = setup(&data);
        let ctx = SceneContext {
            dataset: &data,
            scales: &scales,
            selected_country: None,
            show_projection: false,
        };
        DrilldownScene::new(StoryConfig::default().drilldown).render(&ctx, &mut canvas);
        assert_eq!(canvas.layer_count(LayerTag::Controls), 0);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 0);
        assert_eq!(canvas.layer_count(LayerTag::Plot), 1);
    }
}
