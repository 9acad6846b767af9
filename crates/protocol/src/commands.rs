use serde::{Deserialize, Serialize};

use crate::theme::Paint;
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core flattens its canvas into a `Vec<RenderCommand>` after every
/// scene render. Renderers consume this list sequentially; each command
/// carries all the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled circle (scatter and hover marks).
    DrawCircle {
        center: Point,
        radius: f64,
        fill: Paint,
        opacity: f32,
    },

    /// Draw an unfilled polyline through `points` in order.
    DrawPath {
        points: Vec<Point>,
        stroke: Paint,
        width: f64,
        opacity: f32,
        dashed: bool,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: Paint,
        width: f64,
    },

    /// Draw a filled rectangle with an optional border.
    DrawRect {
        rect: Rect,
        fill: Paint,
        border: Option<Paint>,
    },

    /// Draw a text string. `position` is the baseline anchor.
    DrawText {
        position: Point,
        text: String,
        color: Paint,
        font_size: f64,
        align: TextAlign,
        bold: bool,
    },

    /// Push a translation (applied to all subsequent commands until the
    /// matching `PopTransform`).
    PushTransform { translate: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group. `class` names the layer the group belongs to
    /// (`plot-layer`, `annotation-group`, ...).
    BeginGroup { id: String, class: String },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeToken;
    use crate::types::Color;

    #[test]
    fn circle_serializes_with_variant_tag() {
        let cmd = RenderCommand::DrawCircle {
            center: Point::new(1.0, 2.0),
            radius: 4.0,
            fill: Paint::Color(Color::from_hex(0xe15759)),
            opacity: 0.8,
        };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert!(json.starts_with("{\"DrawCircle\""));
        assert!(json.contains("\"radius\":4.0"));
    }

    #[test]
    fn path_deserializes_from_host_json() {
        let json = r#"{"DrawPath":{"points":[{"x":0.0,"y":1.0},{"x":2.0,"y":3.0}],
            "stroke":{"Token":"NeutralMark"},"width":2.0,"opacity":1.0,"dashed":true}}"#;
        let cmd: RenderCommand = match serde_json::from_str(json) {
            Ok(cmd) => cmd,
            Err(e) => panic!("failed to parse: {e}"),
        };
        match cmd {
            RenderCommand::DrawPath {
                points,
                stroke,
                dashed,
                ..
            } => {
                assert_eq!(points.len(), 2);
                assert_eq!(stroke, Paint::Token(ThemeToken::NeutralMark));
                assert!(dashed);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
