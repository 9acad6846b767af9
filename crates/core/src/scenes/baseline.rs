use tracing::debug;

use crate::annotation::{AnnotationRenderer, AnnotationSpec, DataPoint, Offset};
use crate::canvas::{Canvas, LayerTag};
use crate::config::BaselineConfig;
use crate::scenes::{Scene, SceneContext};

const RADIUS: f64 = 4.0;
const OPACITY: f32 = 0.8;

/// Every country in the baseline year as a colored dot.
pub struct BaselineScene {
    config: BaselineConfig,
}

impl BaselineScene {
    pub fn new(config: BaselineConfig) -> Self {
        Self { config }
    }
}

impl Scene for BaselineScene {
    fn title(&self) -> &str {
        "Where the world started"
    }

    fn render(&self, ctx: &SceneContext<'_>, canvas: &mut Canvas) {
        let year = self.config.year;
        let rows = ctx.dataset.select(|r| r.year == year);
        {
            let mut layer = canvas.begin_layer(LayerTag::Plot);
            for row in &rows {
                layer.circle(
                    ctx.scales.project_record(row.record),
                    RADIUS,
                    ctx.scales.color.paint(&row.record.country),
                    OPACITY,
                );
            }
        }
        debug!(year, marks = rows.len(), "baseline rendered");

        if rows.is_empty() {
            return;
        }
        let note = &self.config.note;
        let spec = AnnotationSpec::new(
            note.title.clone(),
            note.label.clone(),
            DataPoint::new(f64::from(year), self.config.note_value),
            Offset::new(80.0, -60.0),
        )
        .nudged(20.0, 0.0);
        AnnotationRenderer::place(canvas, ctx.scales, &[spec]);
    }
}
