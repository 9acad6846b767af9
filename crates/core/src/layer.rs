use tracing::debug;

use crate::canvas::{Canvas, LayerTag};
use crate::tooltip::TooltipController;

/// Clear everything a scene render leaves behind: plot layers with their
/// hover targets, annotation groups, the live tooltip, and control panels.
/// The axes are untouched.
///
/// Idempotent, and safe on a canvas that has never been drawn on.
pub fn teardown(canvas: &mut Canvas, tooltip: &mut TooltipController) {
    let plot = canvas.remove_layers(LayerTag::Plot);
    let annotations = canvas.remove_layers(LayerTag::Annotation);
    tooltip.hide(canvas);
    let controls = canvas.remove_layers(LayerTag::Controls);
    debug!(plot, annotations, controls, "teardown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::model::Dataset;
    use crate::scales::ScaleRegistry;
    use lifeline_protocol::{Point, Rect, ThemeToken};

    #[test]
    fn teardown_clears_every_scene_layer() {
        let config = StoryConfig::default();
        let scales = ScaleRegistry::build(&Dataset::default(), &config);
        let mut canvas = Canvas::new(config.viewport(), &scales);
        let mut tips = TooltipController::new();
        let axes = canvas.axes().len();

        // First teardown on a fresh canvas is a no-op.
        teardown(&mut canvas, &mut tips);

        canvas.begin_layer(LayerTag::Plot).circle(
            Point::new(1.0, 1.0),
            3.0,
            ThemeToken::NeutralMark.into(),
            1.0,
        );
        canvas.begin_layer(LayerTag::Annotation);
        canvas.begin_layer(LayerTag::Controls).rect(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            ThemeToken::ControlBackground.into(),
            None,
        );
        tips.show(&mut canvas, "x".into(), Point::new(0.0, 0.0));

        teardown(&mut canvas, &mut tips);
        teardown(&mut canvas, &mut tips);

        for tag in [
            LayerTag::Plot,
            LayerTag::Annotation,
            LayerTag::Controls,
            LayerTag::Tooltip,
        ] {
            assert_eq!(canvas.layer_count(tag), 0, "{tag:?}");
        }
        assert!(tips.live().is_none());
        assert_eq!(canvas.axes().len(), axes);
    }
}
