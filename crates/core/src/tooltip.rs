use lifeline_protocol::{Point, Rect, RenderCommand, TextAlign, ThemeToken};

use crate::canvas::{Canvas, LayerTag};
use crate::model::Record;

/// Line separator inside tooltip content.
pub const LINE_BREAK: &str = "<br/>";

const FONT_SIZE: f64 = 11.0;
const LINE_HEIGHT: f64 = 14.0;
const CHAR_WIDTH: f64 = 6.5;
const PADDING: f64 = 6.0;
/// Distance between the pointer and the tooltip's top-left corner.
const POINTER_GAP: f64 = 12.0;

/// The live hover overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub content: String,
    /// Pointer position in outer (page) coordinates.
    pub position: Point,
}

/// What a hover handler asks the tooltip controller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipCommand {
    Show { content: String, position: Point },
    Hide,
}

/// Hover behavior attached to a data mark.
pub trait HoverHandler: Send + Sync {
    fn on_hover_start(&self, record: &Record, pointer: Point) -> TooltipCommand;

    fn on_hover_end(&self) -> TooltipCommand {
        TooltipCommand::Hide
    }
}

/// `"<country><br/><year>: <value> yrs"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordTooltip;

impl HoverHandler for RecordTooltip {
    fn on_hover_start(&self, record: &Record, pointer: Point) -> TooltipCommand {
        TooltipCommand::Show {
            content: record_content(record),
            position: pointer,
        }
    }
}

pub fn record_content(record: &Record) -> String {
    format!(
        "{}{LINE_BREAK}{}: {} yrs",
        record.country, record.year, record.life_expectancy
    )
}

/// Keeps at most one tooltip alive on the canvas.
#[derive(Debug, Default)]
pub struct TooltipController {
    live: Option<Tooltip>,
}

impl TooltipController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> Option<&Tooltip> {
        self.live.as_ref()
    }

    /// Replace any existing tooltip with a new one at `position`.
    pub fn show(&mut self, canvas: &mut Canvas, content: String, position: Point) {
        self.hide(canvas);
        draw_tooltip(canvas, &content, position);
        self.live = Some(Tooltip { content, position });
    }

    /// Remove the tooltip. Safe to call when none is showing.
    pub fn hide(&mut self, canvas: &mut Canvas) {
        canvas.remove_layers(LayerTag::Tooltip);
        self.live = None;
    }

    pub fn apply(&mut self, canvas: &mut Canvas, command: TooltipCommand) {
        match command {
            TooltipCommand::Show { content, position } => self.show(canvas, content, position),
            TooltipCommand::Hide => self.hide(canvas),
        }
    }
}

/// Draw the tooltip box below-right of the pointer, pulled back inside the
/// canvas when it would overflow. The first line is bold.
fn draw_tooltip(canvas: &mut Canvas, content: &str, position: Point) {
    let lines: Vec<&str> = content.split(LINE_BREAK).collect();
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let w = widest as f64 * CHAR_WIDTH + PADDING * 2.0;
    let h = lines.len() as f64 * LINE_HEIGHT + PADDING * 2.0;

    let viewport = *canvas.viewport();
    let mut x = position.x + POINTER_GAP;
    let mut y = position.y + POINTER_GAP;
    if x + w > viewport.width {
        x = (position.x - POINTER_GAP - w).max(0.0);
    }
    if y + h > viewport.height {
        y = (position.y - POINTER_GAP - h).max(0.0);
    }

    let mut layer = canvas.begin_layer(LayerTag::Tooltip);
    layer.rect(
        Rect::new(x, y, w, h),
        ThemeToken::TooltipBackground.into(),
        Some(ThemeToken::TooltipBorder.into()),
    );
    for (i, line) in lines.iter().enumerate() {
        layer.push(RenderCommand::DrawText {
            position: Point::new(x + PADDING, y + PADDING + (i as f64 + 0.8) * LINE_HEIGHT),
            text: (*line).to_string(),
            color: ThemeToken::TooltipText.into(),
            font_size: FONT_SIZE,
            align: TextAlign::Left,
            bold: i == 0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::model::Dataset;
    use crate::scales::ScaleRegistry;

    fn canvas() -> Canvas {
        let config = StoryConfig::default();
        Canvas::new(
            config.viewport(),
            &ScaleRegistry::build(&Dataset::default(), &config),
        )
    }

    fn texts(canvas: &Canvas) -> Vec<String> {
        canvas
            .layer_commands(LayerTag::Tooltip)
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn record_content_format() {
        let r = Record::new("China", 1990, 69.1).unwrap();
        assert_eq!(record_content(&r), "China<br/>1990: 69.1 yrs");
        let whole = Record::new("Japan", 1960, 70.0).unwrap();
        assert_eq!(record_content(&whole), "Japan<br/>1960: 70 yrs");
    }

    #[test]
    fn show_replaces_existing_tooltip() {
        let mut c = canvas();
        let mut tips = TooltipController::new();
        tips.show(&mut c, "A<br/>1".into(), Point::new(10.0, 10.0));
        tips.show(&mut c, "B<br/>2".into(), Point::new(20.0, 20.0));
        assert_eq!(c.layer_count(LayerTag::Tooltip), 1);
        assert_eq!(texts(&c), vec!["B", "2"]);
        assert_eq!(tips.live().map(|t| t.position), Some(Point::new(20.0, 20.0)));
    }

    #[test]
    fn hide_is_idempotent() {
        let mut c = canvas();
        let mut tips = TooltipController::new();
        tips.hide(&mut c);
        tips.apply(
            &mut c,
            TooltipCommand::Show {
                content: "A".into(),
                position: Point::new(0.0, 0.0),
            },
        );
        tips.apply(&mut c, TooltipCommand::Hide);
        tips.apply(&mut c, TooltipCommand::Hide);
        assert!(tips.live().is_none());
        assert_eq!(c.layer_count(LayerTag::Tooltip), 0);
    }

    #[test]
    fn tooltip_stays_inside_canvas() {
        let mut c = canvas();
        let mut tips = TooltipController::new();
        tips.show(&mut c, "Somewhere far<br/>2020: 80 yrs".into(), Point::new(795.0, 495.0));
        let rect = c
            .layer_commands(LayerTag::Tooltip)
            .find_map(|cmd| match cmd {
                RenderCommand::DrawRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert!(rect.x + rect.w <= 800.0);
        assert!(rect.y + rect.h <= 500.0);
    }
}
