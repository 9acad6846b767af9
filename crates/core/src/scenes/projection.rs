use lifeline_protocol::{Point, RenderCommand, TextAlign, ThemeToken};
use tracing::debug;

use crate::annotation::{AnnotationRenderer, AnnotationSpec, DataPoint, Offset, wrap_words};
use crate::canvas::{Canvas, ControlAction, LayerTag};
use crate::config::ProjectionConfig;
use crate::model::{CountryGroup, group_by_country};
use crate::scenes::{Scene, SceneContext, draw_button, draw_series, in_focus, panel_origin};

const LINE_WIDTH: f64 = 2.0;
const PROJECTION_OPACITY: f32 = 0.8;
const CTA_ORIGIN: Point = Point { x: 12.0, y: 22.0 };
const CTA_WRAP: usize = 46;
const CTA_LINE_HEIGHT: f64 = 16.0;

/// Least-squares line through `(year, life expectancy)` points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    /// Fit a line. Needs at least two distinct years.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum();
        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn at(&self, year: f64) -> f64 {
        self.intercept + self.slope * year
    }
}

/// Actual trajectories, an optional dashed trend to the target year, and
/// the closing call to action.
pub struct ProjectionScene {
    config: ProjectionConfig,
    y_domain: [f64; 2],
}

impl ProjectionScene {
    pub fn new(config: ProjectionConfig, y_domain: [f64; 2]) -> Self {
        Self { config, y_domain }
    }

    /// Dashed segment from the last actual point to the clamped projection.
    fn project(&self, group: &CountryGroup<'_>) -> Option<(DataPoint, DataPoint)> {
        let rows = group.in_year_order();
        let last = rows.last()?.record;
        let target = self.config.target_year;
        if last.year >= target {
            return None;
        }
        let fit: Vec<(f64, f64)> = rows
            .iter()
            .filter(|r| r.record.year >= self.config.fit_from)
            .map(|r| (f64::from(r.record.year), r.record.life_expectancy))
            .collect();
        let trend = Trend::fit(&fit)?;
        let lo = self.y_domain[0].min(self.y_domain[1]);
        let hi = self.y_domain[0].max(self.y_domain[1]);
        let value = trend.at(f64::from(target)).clamp(lo, hi);
        Some((
            DataPoint::new(f64::from(last.year), last.life_expectancy),
            DataPoint::new(f64::from(target), value),
        ))
    }
}

impl Scene for ProjectionScene {
    fn title(&self) -> &str {
        "Looking ahead"
    }

    fn render(&self, ctx: &SceneContext<'_>, canvas: &mut Canvas) {
        let focus = in_focus(&self.config.countries);
        let rows = ctx.dataset.select(|r| focus(r.country.as_str()));
        let groups = group_by_country(&rows);

        let mut highest: Option<DataPoint> = None;
        let mut projected = 0;
        {
            let mut layer = canvas.begin_layer(LayerTag::Plot);
            for group in &groups {
                draw_series(&mut layer, ctx.scales, group, LINE_WIDTH, 1.0);
            }
            if ctx.show_projection {
                for group in &groups {
                    let Some((from, to)) = self.project(group) else {
                        continue;
                    };
                    layer.path(
                        vec![
                            ctx.scales.project(from.year, from.life_expectancy),
                            ctx.scales.project(to.year, to.life_expectancy),
                        ],
                        ctx.scales.color.paint(group.country),
                        LINE_WIDTH,
                        PROJECTION_OPACITY,
                        true,
                    );
                    projected += 1;
                    if highest.is_none_or(|h| to.life_expectancy > h.life_expectancy) {
                        highest = Some(to);
                    }
                }
            }

            let cta = &self.config.call_to_action;
            let mut y = CTA_ORIGIN.y;
            layer.push(RenderCommand::DrawText {
                position: Point::new(CTA_ORIGIN.x, y),
                text: cta.title.clone(),
                color: ThemeToken::NarrativeText.into(),
                font_size: 14.0,
                align: TextAlign::Left,
                bold: true,
            });
            for line in wrap_words(&cta.label, CTA_WRAP) {
                y += CTA_LINE_HEIGHT;
                layer.push(RenderCommand::DrawText {
                    position: Point::new(CTA_ORIGIN.x, y),
                    text: line,
                    color: ThemeToken::NarrativeText.into(),
                    font_size: 11.0,
                    align: TextAlign::Left,
                    bold: false,
                });
            }
        }

        let origin = panel_origin(canvas);
        let label = if ctx.show_projection {
            "Hide projection".to_string()
        } else {
            format!("Show {} projection", self.config.target_year)
        };
        draw_button(
            &mut canvas.begin_layer(LayerTag::Controls),
            origin,
            &label,
            ctx.show_projection,
            None,
            ControlAction::ToggleProjection,
        );
        debug!(
            series = groups.len(),
            projected,
            show = ctx.show_projection,
            "projection rendered"
        );

        let Some(anchor) = highest else {
            return;
        };
        let note = &self.config.note;
        let spec = AnnotationSpec::new(
            note.title.clone(),
            note.label.clone(),
            anchor,
            Offset::new(-90.0, 40.0),
        );
        AnnotationRenderer::place(canvas, ctx.scales, &[spec]);
    }
}
