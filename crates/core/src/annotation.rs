//! Callout annotations anchored in data space.

use lifeline_protocol::{Point, RenderCommand, TextAlign, ThemeToken};

use crate::canvas::{Canvas, LayerTag};
use crate::scales::ScaleRegistry;

const NOTE_WIDTH: f64 = 120.0;
/// Characters per wrapped label line at `LABEL_SIZE`.
const WRAP_CHARS: usize = 22;
const TITLE_SIZE: f64 = 12.0;
const LABEL_SIZE: f64 = 11.0;
const LINE_HEIGHT: f64 = 14.0;
const TEXT_GAP: f64 = 4.0;

/// A `(year, life expectancy)` position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub year: f64,
    pub life_expectancy: f64,
}

impl DataPoint {
    pub fn new(year: f64, life_expectancy: f64) -> Self {
        Self {
            year,
            life_expectancy,
        }
    }
}

/// A pixel displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationSpec {
    pub title: String,
    pub label: String,
    pub anchor: DataPoint,
    /// From the anchor to the note.
    pub offset: Offset,
    /// Applied to the scaled anchor before the offset.
    pub nudge: Offset,
}

impl AnnotationSpec {
    pub fn new(
        title: impl Into<String>,
        label: impl Into<String>,
        anchor: DataPoint,
        offset: Offset,
    ) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            anchor,
            offset,
            nudge: Offset::default(),
        }
    }

    pub fn nudged(mut self, dx: f64, dy: f64) -> Self {
        self.nudge = Offset::new(dx, dy);
        self
    }

    /// Anchor position in plot space under `scales`.
    pub fn subject(&self, scales: &ScaleRegistry) -> Point {
        scales
            .project(self.anchor.year, self.anchor.life_expectancy)
            .offset(self.nudge.dx, self.nudge.dy)
    }
}

pub struct AnnotationRenderer;

impl AnnotationRenderer {
    /// Draw every spec into one new annotation group. An empty list draws
    /// nothing and creates no group.
    pub fn place(canvas: &mut Canvas, scales: &ScaleRegistry, specs: &[AnnotationSpec]) {
        if specs.is_empty() {
            return;
        }
        let mut layer = canvas.begin_layer(LayerTag::Annotation);
        for spec in specs {
            for command in callout(spec, scales) {
                layer.push(command);
            }
        }
    }
}

/// Connector, underline, bold title, and wrapped label for one spec.
///
/// The note sits at `subject + offset`. The underline runs away from the
/// subject horizontally; text stacks above it when the note is above the
/// subject and below it otherwise.
fn callout(spec: &AnnotationSpec, scales: &ScaleRegistry) -> Vec<RenderCommand> {
    let subject = spec.subject(scales);
    let note = subject.offset(spec.offset.dx, spec.offset.dy);
    let leftward = spec.offset.dx < 0.0;
    let above = spec.offset.dy <= 0.0;

    let mut commands = vec![
        RenderCommand::DrawLine {
            from: subject,
            to: note,
            color: ThemeToken::AnnotationConnector.into(),
            width: 1.0,
        },
        RenderCommand::DrawLine {
            from: note,
            to: note.offset(if leftward { -NOTE_WIDTH } else { NOTE_WIDTH }, 0.0),
            color: ThemeToken::AnnotationConnector.into(),
            width: 1.0,
        },
    ];

    let align = if leftward {
        TextAlign::Right
    } else {
        TextAlign::Left
    };
    let mut lines: Vec<(String, f64, bool)> = vec![(spec.title.clone(), TITLE_SIZE, true)];
    lines.extend(
        wrap_words(&spec.label, WRAP_CHARS)
            .into_iter()
            .map(|l| (l, LABEL_SIZE, false)),
    );

    let count = lines.len() as f64;
    for (i, (text, font_size, bold)) in lines.into_iter().enumerate() {
        let y = if above {
            note.y - TEXT_GAP - (count - 1.0 - i as f64) * LINE_HEIGHT
        } else {
            note.y + TEXT_GAP + (i as f64 + 1.0) * LINE_HEIGHT
        };
        let color = if bold {
            ThemeToken::AnnotationTitle
        } else {
            ThemeToken::AnnotationLabel
        };
        commands.push(RenderCommand::DrawText {
            position: Point::new(note.x, y),
            text,
            color: color.into(),
            font_size,
            align,
            bold,
        });
    }
    commands
}

/// Greedy word wrap to at most `max_chars` per line. Words longer than the
/// limit get a line of their own.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::model::Dataset;

    fn setup() -> (Canvas, ScaleRegistry) {
        let config = StoryConfig::default();
        let scales = ScaleRegistry::build(&Dataset::default(), &config);
        (Canvas::new(config.viewport(), &scales), scales)
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_words("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap_words("", 10), Vec::<String>::new());
        assert_eq!(
            wrap_words("extraordinarily long", 5),
            vec!["extraordinarily", "long"]
        );
    }

    #[test]
    fn empty_list_creates_no_group() {
        let (mut canvas, scales) = setup();
        AnnotationRenderer::place(&mut canvas, &scales, &[]);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 0);
    }

    #[test]
    fn anchor_is_scaled_at_place_time() {
        let (mut canvas, scales) = setup();
        let spec = AnnotationSpec::new(
            "Wide income gap",
            "label",
            DataPoint::new(1960.0, 60.0),
            Offset::new(80.0, -60.0),
        )
        .nudged(20.0, 0.0);
        AnnotationRenderer::place(&mut canvas, &scales, std::slice::from_ref(&spec));
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 1);

        let subject = scales.project(1960.0, 60.0).offset(20.0, 0.0);
        let connector = canvas.layer_commands(LayerTag::Annotation).next();
        assert_eq!(
            connector,
            Some(&RenderCommand::DrawLine {
                from: subject,
                to: subject.offset(80.0, -60.0),
                color: ThemeToken::AnnotationConnector.into(),
                width: 1.0,
            })
        );
    }

    #[test]
    fn leftward_notes_right_align_text() {
        let (mut canvas, scales) = setup();
        let spec = AnnotationSpec::new(
            "East Asia's Gains",
            "rose",
            DataPoint::new(1990.0, 69.0),
            Offset::new(-120.0, -30.0),
        );
        AnnotationRenderer::place(&mut canvas, &scales, &[spec.clone(), spec]);
        assert_eq!(canvas.layer_count(LayerTag::Annotation), 1);
        let aligns: Vec<TextAlign> = canvas
            .layer_commands(LayerTag::Annotation)
            .filter_map(|c| match c {
                RenderCommand::DrawText { align, .. } => Some(*align),
                _ => None,
            })
            .collect();
        assert_eq!(aligns.len(), 4);
        assert!(aligns.iter().all(|a| *a == TextAlign::Right));
    }
}
