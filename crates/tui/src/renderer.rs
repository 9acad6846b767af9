use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use lifeline_core::SceneController;
use lifeline_core::canvas::ControlAction;
use lifeline_protocol::{Paint, Point, RenderCommand, TextAlign, ThemeToken, Viewport};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        Block, Paragraph,
        canvas::{Canvas, Circle, Context, Line, Rectangle},
    },
};

/// Pieces a dashed segment is cut into.
const DASH_PIECES: usize = 8;

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background => Color::Black,
        ThemeToken::AxisLine => Color::DarkGray,
        ThemeToken::AxisText => Color::Gray,
        ThemeToken::NeutralMark => Color::Gray,
        ThemeToken::UnknownSeries => Color::DarkGray,
        ThemeToken::AnnotationConnector => Color::White,
        ThemeToken::AnnotationTitle => Color::White,
        ThemeToken::AnnotationLabel => Color::Gray,
        ThemeToken::TooltipBackground => Color::Rgb(30, 30, 40),
        ThemeToken::TooltipBorder => Color::Gray,
        ThemeToken::TooltipText => Color::LightYellow,
        ThemeToken::ControlBackground => Color::DarkGray,
        ThemeToken::ControlActive => Color::Green,
        ThemeToken::ControlText => Color::White,
        ThemeToken::NarrativeText => Color::White,
    }
}

fn paint_to_color(paint: Paint) -> Color {
    match paint {
        Paint::Token(token) => theme_to_color(token),
        Paint::Color(c) => Color::Rgb(c.r, c.g, c.b),
    }
}

/// Maps story coordinates (origin top-left, y down) onto the canvas widget
/// (origin bottom-left, y up), honoring the transform stack.
struct Projector {
    height: f64,
    stack: Vec<Point>,
    /// Story units per terminal column, for text alignment.
    char_width: f64,
}

impl Projector {
    fn new(viewport: &Viewport, area: Rect) -> Self {
        Self {
            height: viewport.height,
            stack: Vec::new(),
            char_width: viewport.width / f64::from(area.width.max(1)),
        }
    }

    fn offset(&self) -> Point {
        self.stack
            .iter()
            .fold(Point::new(0.0, 0.0), |acc, t| acc.offset(t.x, t.y))
    }

    fn map(&self, p: Point) -> (f64, f64) {
        let o = self.offset();
        (p.x + o.x, self.height - (p.y + o.y))
    }
}

fn draw_commands(ctx: &mut Context<'_>, commands: &[RenderCommand], projector: &mut Projector) {
    for cmd in commands {
        match cmd {
            RenderCommand::PushTransform { translate } => projector.stack.push(*translate),
            RenderCommand::PopTransform => {
                projector.stack.pop();
            }
            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                ..
            } => {
                let (x, y) = projector.map(*center);
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: *radius,
                    color: paint_to_color(*fill),
                });
            }
            RenderCommand::DrawPath {
                points,
                stroke,
                dashed,
                ..
            } => {
                let color = paint_to_color(*stroke);
                for pair in points.windows(2) {
                    let (x1, y1) = projector.map(pair[0]);
                    let (x2, y2) = projector.map(pair[1]);
                    if *dashed {
                        for i in (0..DASH_PIECES).step_by(2) {
                            let t0 = i as f64 / DASH_PIECES as f64;
                            let t1 = (i + 1) as f64 / DASH_PIECES as f64;
                            ctx.draw(&Line::new(
                                x1 + (x2 - x1) * t0,
                                y1 + (y2 - y1) * t0,
                                x1 + (x2 - x1) * t1,
                                y1 + (y2 - y1) * t1,
                                color,
                            ));
                        }
                    } else {
                        ctx.draw(&Line::new(x1, y1, x2, y2, color));
                    }
                }
            }
            RenderCommand::DrawLine {
                from, to, color, ..
            } => {
                let (x1, y1) = projector.map(*from);
                let (x2, y2) = projector.map(*to);
                ctx.draw(&Line::new(x1, y1, x2, y2, paint_to_color(*color)));
            }
            RenderCommand::DrawRect { rect, border, fill } => {
                let (x, y) = projector.map(Point::new(rect.x, rect.y + rect.h));
                ctx.draw(&Rectangle {
                    x,
                    y,
                    width: rect.w,
                    height: rect.h,
                    color: paint_to_color(border.unwrap_or(*fill)),
                });
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                align,
                bold,
                ..
            } => {
                let width = text.chars().count() as f64 * projector.char_width;
                let shift = match align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => width / 2.0,
                    TextAlign::Right => width,
                };
                let (x, y) = projector.map(position.offset(-shift, 0.0));
                let mut style = Style::default().fg(paint_to_color(*color));
                if *bold {
                    style = style.add_modifier(Modifier::BOLD);
                }
                ctx.print(x, y, Span::styled(text.clone(), style));
            }
            RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
        }
    }
}

/// Terminal cell to story coordinates (cell centers).
fn cell_to_story(viewport: &Viewport, area: Rect, column: u16, row: u16) -> Option<Point> {
    if column < area.x
        || row < area.y
        || column >= area.x + area.width
        || row >= area.y + area.height
    {
        return None;
    }
    let x = (f64::from(column - area.x) + 0.5) * viewport.width / f64::from(area.width);
    let y = (f64::from(row - area.y) + 0.5) * viewport.height / f64::from(area.height);
    Some(Point::new(x, y))
}

/// The nth country button of the current scene, if it has a picker.
fn nth_country(controller: &SceneController, n: usize) -> Option<String> {
    controller
        .canvas()
        .control_targets()
        .filter_map(|t| match &t.action {
            ControlAction::SelectCountry(c) => Some(c.clone()),
            ControlAction::ToggleProjection => None,
        })
        .nth(n)
}

/// Restores the terminal on drop, so an error or panic inside the event
/// loop never leaves raw mode or the alternate screen behind.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = Self;
        execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    }
}

pub fn run(controller: &mut SceneController) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    event_loop(&mut terminal, controller, || {
        if event::poll(Duration::from_millis(100))? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    })
}

/// Draw and dispatch input until quit. `next_event` yields `None` when no
/// input arrived within its poll interval.
fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut SceneController,
    mut next_event: impl FnMut() -> Result<Option<Event>>,
) -> Result<()> {
    let viewport = controller.story().viewport();
    let mut nav = controller.start();
    let scene_count = controller.storyline().len();

    loop {
        let size = terminal.size()?;
        let canvas_area = Rect::new(0, 1, size.width, size.height.saturating_sub(2));
        let commands = controller.commands();

        terminal.draw(|frame| {
            let area = frame.area();

            let header = Block::default()
                .title(format!(
                    " lifeline | {}/{} {} ",
                    nav.slide + 1,
                    scene_count,
                    nav.title
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, Rect::new(0, 0, area.width, 1));

            let canvas = Canvas::default()
                .marker(Marker::Braille)
                .background_color(Color::Black)
                .x_bounds([0.0, viewport.width])
                .y_bounds([0.0, viewport.height])
                .paint(|ctx| {
                    let mut projector = Projector::new(&viewport, canvas_area);
                    draw_commands(ctx, &commands, &mut projector);
                });
            frame.render_widget(canvas, canvas_area);

            let enabled = Style::default().fg(Color::White);
            let disabled = Style::default().fg(Color::DarkGray);
            let footer = ratatui::text::Line::from(vec![
                Span::styled(" ← back ", if nav.back_disabled { disabled } else { enabled }),
                Span::raw("|"),
                Span::styled(" next → ", if nav.next_disabled { disabled } else { enabled }),
                Span::raw("| 1-9 pick country | 0 clear | p projection | q quit"),
            ]);
            frame.render_widget(
                Paragraph::new(footer).style(Style::default().bg(Color::DarkGray)),
                Rect::new(0, area.height.saturating_sub(1), area.width, 1),
            );
        })?;

        let Some(event) = next_event()? else {
            continue;
        };
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Left | KeyCode::Char('h') => nav = controller.retreat(),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                    nav = controller.advance();
                }
                KeyCode::Char('p') => nav = controller.toggle_projection(),
                KeyCode::Char('0') => nav = controller.select_country(None),
                KeyCode::Char(c @ '1'..='9') => {
                    let n = c as usize - '1' as usize;
                    if let Some(country) = nth_country(controller, n) {
                        nav = controller.select_country(Some(country));
                    }
                }
                _ => {}
            },
            Event::Mouse(mouse) => {
                let point = cell_to_story(&viewport, canvas_area, mouse.column, mouse.row);
                match (mouse.kind, point) {
                    (MouseEventKind::Moved, Some(p)) => {
                        controller.pointer_moved(p);
                    }
                    (MouseEventKind::Moved, None) => {
                        controller.pointer_left();
                    }
                    (MouseEventKind::Down(MouseButton::Left), Some(p)) => {
                        if let Some(next) = controller.click(p) {
                            nav = next;
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(())
}
