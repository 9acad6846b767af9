use std::sync::Arc;

use lifeline_protocol::Point;
use tracing::debug;

use crate::annotation::{AnnotationRenderer, AnnotationSpec, DataPoint, Offset};
use crate::canvas::{Canvas, HoverTarget, LayerTag};
use crate::config::DipConfig;
use crate::model::{Dataset, Record, group_by_country};
use crate::scenes::{Scene, SceneContext, draw_series};
use crate::tooltip::{HoverHandler, TooltipCommand, record_content};

const LINE_WIDTH: f64 = 1.5;
const LINE_OPACITY: f32 = 0.6;
const DIP_RADIUS: f64 = 4.5;

/// A year-over-year fall in one country's life expectancy.
#[derive(Debug, Clone, PartialEq)]
pub struct Dip {
    pub country: String,
    /// Dataset index of the low point.
    pub record: usize,
    pub from_year: i32,
    pub year: i32,
    /// Size of the fall, always positive.
    pub drop: f64,
}

/// Every fall of at least `threshold` between consecutive records of a
/// country (in year order) whose low point lies in `window`.
///
/// Results follow first-seen country order, then year.
pub fn find_dips(dataset: &Dataset, threshold: f64, window: [i32; 2]) -> Vec<Dip> {
    let [start, end] = window;
    let rows: Vec<_> = dataset.rows().collect();
    let mut dips = Vec::new();
    for group in group_by_country(&rows) {
        for pair in group.in_year_order().windows(2) {
            let (prev, cur) = (pair[0].record, pair[1].record);
            let drop = prev.life_expectancy - cur.life_expectancy;
            if drop >= threshold && drop > 0.0 && (start..=end).contains(&cur.year) {
                dips.push(Dip {
                    country: cur.country.clone(),
                    record: pair[1].index,
                    from_year: prev.year,
                    year: cur.year,
                    drop,
                });
            }
        }
    }
    dips
}

/// Record tooltip with the size of the fall appended.
#[derive(Debug, Clone, Copy)]
pub struct DipTooltip {
    pub drop: f64,
}

impl HoverHandler for DipTooltip {
    fn on_hover_start(&self, record: &Record, pointer: Point) -> TooltipCommand {
        TooltipCommand::Show {
            content: format!("{} (-{:.1})", record_content(record), self.drop),
            position: pointer,
        }
    }
}

/// Countries that suffered a sudden fall, with each fall marked.
pub struct DipScene {
    config: DipConfig,
}

impl DipScene {
    pub fn new(config: DipConfig) -> Self {
        Self { config }
    }
}

impl Scene for DipScene {
    fn title(&self) -> &str {
        "Sudden reversals"
    }

    fn render(&self, ctx: &SceneContext<'_>, canvas: &mut Canvas) {
        let [start, end] = self.config.window;
        let dips = find_dips(ctx.dataset, self.config.threshold, self.config.window);
        let affected: Vec<&str> = {
            let mut seen: Vec<&str> = Vec::new();
            for dip in &dips {
                if !seen.contains(&dip.country.as_str()) {
                    seen.push(&dip.country);
                }
            }
            seen
        };
        let rows = ctx.dataset.select(|r| {
            affected.contains(&r.country.as_str()) && (start..=end).contains(&r.year)
        });
        let groups = group_by_country(&rows);

        {
            let mut layer = canvas.begin_layer(LayerTag::Plot);
            for group in &groups {
                draw_series(&mut layer, ctx.scales, group, LINE_WIDTH, LINE_OPACITY);
            }
            for dip in &dips {
                let Some(record) = ctx.dataset.get(dip.record) else {
                    continue;
                };
                let center = ctx.scales.project_record(record);
                layer.circle(
                    center,
                    DIP_RADIUS,
                    ctx.scales.color.paint(&dip.country),
                    1.0,
                );
                layer.hover(HoverTarget {
                    center,
                    radius: DIP_RADIUS,
                    record: dip.record,
                    handler: Arc::new(DipTooltip { drop: dip.drop }),
                });
            }
        }
        debug!(
            dips = dips.len(),
            countries = groups.len(),
            "dips rendered"
        );

        // Largest fall; the first one wins a tie.
        let largest = dips.iter().fold(None::<&Dip>, |best, dip| match best {
            Some(b) if b.drop >= dip.drop => Some(b),
            _ => Some(dip),
        });
        let Some(record) = largest.and_then(|d| ctx.dataset.get(d.record)) else {
            return;
        };
        let note = &self.config.note;
        let spec = AnnotationSpec::new(
            note.title.clone(),
            note.label.clone(),
            DataPoint::new(f64::from(record.year), record.life_expectancy),
            Offset::new(-100.0, -60.0),
        );
        AnnotationRenderer::place(canvas, ctx.scales, &[spec]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::scenes::test_support::{dataset, setup};

    fn sample() -> Dataset {
        dataset(&[
            ("Peru", 2019, 76.0),
            ("Peru", 2020, 73.5),
            ("Peru", 2021, 72.4),
            ("Peru", 2022, 74.0),
            ("India", 2019, 70.9),
            ("India", 2021, 67.2),
            ("India", 2020, 70.1),
            ("Japan", 2019, 84.4),
            ("Japan", 2020, 84.6),
            ("Chad", 1990, 51.0),
            ("Chad", 1995, 48.0),
        ])
    }

    #[test]
    fn finds_falls_above_threshold_in_window() {
        let dips = find_dips(&sample(), 1.0, [2000, 2023]);
        let summary: Vec<_> = dips
            .iter()
            .map(|d| (d.country.as_str(), d.from_year, d.year))
            .collect();
        // Peru 2020-21 fell 1.1, India 2019-20 only 0.8, Chad is outside the window.
        assert_eq!(
            summary,
            vec![("Peru", 2019, 2020), ("Peru", 2020, 2021), ("India", 2020, 2021)]
        );
        assert!((dips[0].drop - 2.5).abs() < 1e-9);
        assert!(dips.iter().all(|d| d.drop >= 1.0));
    }

    #[test]
    fn zero_threshold_ignores_flat_years() {
        let data = dataset(&[("A", 2001, 50.0), ("A", 2002, 50.0)]);
        assert!(find_dips(&data, 0.0, [2000, 2023]).is_empty());
    }

    #[test]
    fn marks_each_dip_and_annotates_the_largest() {
        let data = sample();
        let (scales, mut canvas) = setup(&data);
        let ctx = SceneContext {
            dataset: &data,
            scales: &scales,
            selected_country: None,
            show_projection: false,
        };
        DipScene::new(StoryConfig::default().dips).render(&ctx, &mut canvas);
        assert_eq!(canvas.hover_targets().count(), 3);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 1);

        // Largest fall is India 2020 -> 2021 (2.9 years).
        let india_2021 = scales.project(2021.0, 67.2);
        let connector_start = canvas
            .layer_commands(LayerTag::Annotation)
            .find_map(|c| match c {
                lifeline_protocol::RenderCommand::DrawLine { from, .. } => Some(*from),
                _ => None,
            });
        assert_eq!(connector_start, Some(india_2021));
    }

    #[test]
    fn tooltip_reports_the_drop() {
        let record = Record::new("Peru", 2020, 73.5).unwrap();
        let cmd = DipTooltip { drop: 2.5 }.on_hover_start(&record, Point::new(1.0, 2.0));
        assert_eq!(
            cmd,
            TooltipCommand::Show {
                content: "Peru<br/>2020: 73.5 yrs (-2.5)".into(),
                position: Point::new(1.0, 2.0),
            }
        );
    }

    #[test]
    fn no_dips_means_no_annotation() {
        let data = dataset(&[("Japan", 2019, 84.4), ("Japan", 2020, 84.6)]);
        let (scales, mut canvas) = setup(&data);
        let ctx = SceneContext {
            dataset: &data,
            scales: &scales,
            selected_country: None,
            show_projection: false,
        };
        DipScene::new(StoryConfig::default().dips).render(&ctx, &mut canvas);
        assert_eq!(canvas.hover_targets().count(), 0);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 0);
    }
}
