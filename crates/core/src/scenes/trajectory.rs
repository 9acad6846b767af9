use std::sync::Arc;

use lifeline_protocol::ThemeToken;
use tracing::{debug, warn};

use crate::annotation::{AnnotationRenderer, AnnotationSpec, DataPoint, Offset};
use crate::canvas::{Canvas, LayerTag};
use crate::config::TrajectoryConfig;
use crate::model::group_by_country;
use crate::scenes::{Scene, SceneContext, draw_hover_marks, draw_series, in_focus};
use crate::tooltip::{HoverHandler, RecordTooltip};

const LINE_WIDTH: f64 = 2.0;
const MARK_RADIUS: f64 = 3.0;

/// Focus countries as lines up to a cut-off year, with hoverable points.
pub struct TrajectoryScene {
    config: TrajectoryConfig,
}

impl TrajectoryScene {
    pub fn new(config: TrajectoryConfig) -> Self {
        Self { config }
    }
}

impl Scene for TrajectoryScene {
    fn title(&self) -> &str {
        "East Asia's climb"
    }

    fn render(&self, ctx: &SceneContext<'_>, canvas: &mut Canvas) {
        let until = self.config.until_year;
        let focus = in_focus(&self.config.countries);
        let rows = ctx
            .dataset
            .select(|r| focus(r.country.as_str()) && r.year <= until);
        let groups = group_by_country(&rows);
        let handler: Arc<dyn HoverHandler> = Arc::new(RecordTooltip);
        {
            let mut layer = canvas.begin_layer(LayerTag::Plot);
            for group in &groups {
                draw_series(&mut layer, ctx.scales, group, LINE_WIDTH, 1.0);
            }
            draw_hover_marks(
                &mut layer,
                ctx.scales,
                &rows,
                MARK_RADIUS,
                |_| ThemeToken::NeutralMark.into(),
                &handler,
            );
        }
        debug!(
            series = groups.len(),
            marks = rows.len(),
            "trajectory rendered"
        );

        let anchor = &self.config.anchor_country;
        let value = groups
            .iter()
            .find(|g| g.country == anchor.as_str())
            .and_then(|g| g.value_at(until));
        let Some(value) = value else {
            if !rows.is_empty() {
                warn!(country = %anchor, year = until, "no anchor value, annotation omitted");
            }
            return;
        };
        let note = &self.config.note;
        let spec = AnnotationSpec::new(
            note.title.clone(),
            note.label.clone(),
            DataPoint::new(f64::from(until), value),
            Offset::new(-120.0, -30.0),
        )
        .nudged(-10.0, 0.0);
        AnnotationRenderer::place(canvas, ctx.scales, &[spec]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::scenes::test_support::{dataset, setup};
    use lifeline_protocol::{Paint, Point, RenderCommand};

    fn paths(canvas: &Canvas) -> Vec<(Paint, Vec<Point>)> {
        canvas
            .layer_commands(LayerTag::Plot)
            .filter_map(|c| match c {
                RenderCommand::DrawPath { points, stroke, .. } => Some((*stroke, points.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn groups_focus_countries_up_to_cutoff() {
        let mut rows = Vec::new();
        // Out of order on purpose: paths must still run in year order.
        for year in [2000, 1960, 1990, 1970, 1980] {
            for (country, base) in [("China", 44.0), ("Japan", 68.0), ("France", 70.0)] {
                rows.push((country, year, base + f64::from(year - 1960) * 0.3));
            }
        }
        let data = dataset(&rows);
        let (scales, mut canvas) = setup(&data);
        let ctx = SceneContext {
            dataset: &data,
            scales: &scales,
            selected_country: None,
            show_projection: false,
        };
        TrajectoryScene::new(StoryConfig::default().trajectory).render(&ctx, &mut canvas);

        let paths = paths(&canvas);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].0, scales.color.paint("China"));
        assert_eq!(paths[1].0, scales.color.paint("Japan"));
        let cutoff = scales.x.apply(1990.0);
        for (_, points) in &paths {
            assert_eq!(points.len(), 4);
            assert!(points.windows(2).all(|w| w[0].x < w[1].x));
            assert!(points.iter().all(|p| p.x <= cutoff));
        }
        // China and Japan, four years each.
        assert_eq!(canvas.hover_targets().count(), 8);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 1);
    }

    #[test]
    fn missing_anchor_year_omits_annotation() {
        let data = dataset(&[("China", 1960, 44.0), ("China", 1970, 58.0)]);
        let (scales, mut canvas) = setup(&data);
        let ctx = SceneContext {
            dataset: &data,
            scales: &scales,
            selected_country: None,
            show_projection: false,
        };
        TrajectoryScene::new(StoryConfig::default().trajectory).render(&ctx, &mut canvas);
        assert_eq!(paths(&canvas).len(), 1);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 0);
    }
}
