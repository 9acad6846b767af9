use egui::{Align2, CornerRadius, FontId, Pos2, Rect, Stroke, StrokeKind};
use lifeline_protocol::{Point, RenderCommand, TextAlign, Viewport};

use crate::theme::{self, ThemeMode};

const DASH_LENGTH: f32 = 6.0;
const DASH_GAP: f32 = 4.0;

/// Uniform fit of the story viewport into a screen rect, letterboxed and
/// centered. Maps both ways so pointer input lands in story coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub origin: Pos2,
    pub scale: f32,
}

impl Fit {
    pub fn new(viewport: &Viewport, available: Rect) -> Self {
        let sx = available.width() / viewport.width as f32;
        let sy = available.height() / viewport.height as f32;
        let scale = sx.min(sy).max(f32::EPSILON);
        let used = egui::vec2(viewport.width as f32 * scale, viewport.height as f32 * scale);
        Self {
            origin: available.min + (available.size() - used) / 2.0,
            scale,
        }
    }

    pub fn to_story(&self, pos: Pos2) -> Point {
        let local = (pos - self.origin) / self.scale;
        Point::new(f64::from(local.x), f64::from(local.y))
    }

    pub fn rect(&self, viewport: &Viewport) -> Rect {
        Rect::from_min_size(
            self.origin,
            egui::vec2(
                viewport.width as f32 * self.scale,
                viewport.height as f32 * self.scale,
            ),
        )
    }
}

/// Accumulated translation for PushTransform/PopTransform, in story units.
#[derive(Debug, Clone, Copy, Default)]
struct Transform {
    tx: f64,
    ty: f64,
}

struct Mapper {
    fit: Fit,
    stack: Vec<Transform>,
}

impl Mapper {
    fn current(&self) -> Transform {
        self.stack.last().copied().unwrap_or_default()
    }

    fn pos(&self, p: Point) -> Pos2 {
        let t = self.current();
        self.fit.origin + egui::vec2((p.x + t.tx) as f32, (p.y + t.ty) as f32) * self.fit.scale
    }

    fn len(&self, v: f64) -> f32 {
        v as f32 * self.fit.scale
    }
}

/// Render a list of `RenderCommand` into an egui `Painter`.
pub fn render_commands(
    painter: &egui::Painter,
    commands: &[RenderCommand],
    fit: Fit,
    mode: ThemeMode,
) {
    let mut mapper = Mapper {
        fit,
        stack: Vec::new(),
    };

    for cmd in commands {
        match cmd {
            RenderCommand::PushTransform { translate } => {
                let t = mapper.current();
                mapper.stack.push(Transform {
                    tx: t.tx + translate.x,
                    ty: t.ty + translate.y,
                });
            }
            RenderCommand::PopTransform => {
                mapper.stack.pop();
            }
            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                opacity,
            } => {
                let color = theme::paint(*fill, mode).gamma_multiply(*opacity);
                painter.circle_filled(mapper.pos(*center), mapper.len(*radius), color);
            }
            RenderCommand::DrawPath {
                points,
                stroke,
                width,
                opacity,
                dashed,
            } => {
                if points.len() < 2 {
                    continue;
                }
                let color = theme::paint(*stroke, mode).gamma_multiply(*opacity);
                let stroke = Stroke::new(mapper.len(*width).max(1.0), color);
                let pts: Vec<Pos2> = points.iter().map(|p| mapper.pos(*p)).collect();
                if *dashed {
                    painter.extend(egui::Shape::dashed_line(
                        &pts,
                        stroke,
                        DASH_LENGTH * fit.scale,
                        DASH_GAP * fit.scale,
                    ));
                } else {
                    painter.add(egui::Shape::line(pts, stroke));
                }
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width,
            } => {
                painter.line_segment(
                    [mapper.pos(*from), mapper.pos(*to)],
                    Stroke::new(mapper.len(*width).max(1.0), theme::paint(*color, mode)),
                );
            }
            RenderCommand::DrawRect { rect, fill, border } => {
                let r = Rect::from_min_max(
                    mapper.pos(Point::new(rect.x, rect.y)),
                    mapper.pos(Point::new(rect.x + rect.w, rect.y + rect.h)),
                );
                painter.rect_filled(r, CornerRadius::same(2), theme::paint(*fill, mode));
                if let Some(border) = border {
                    painter.rect_stroke(
                        r,
                        CornerRadius::same(2),
                        Stroke::new(1.0, theme::paint(*border, mode)),
                        StrokeKind::Inside,
                    );
                }
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
                bold,
            } => {
                // Story text positions are baselines.
                let anchor = match align {
                    TextAlign::Left => Align2::LEFT_BOTTOM,
                    TextAlign::Center => Align2::CENTER_BOTTOM,
                    TextAlign::Right => Align2::RIGHT_BOTTOM,
                };
                let pos = mapper.pos(*position);
                let font = FontId::proportional(mapper.len(*font_size).max(6.0));
                let color = theme::paint(*color, mode);
                painter.text(pos, anchor, text, font.clone(), color);
                if *bold {
                    // The default fonts carry no bold face.
                    painter.text(pos + egui::vec2(0.6, 0.0), anchor, text, font, color);
                }
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}
