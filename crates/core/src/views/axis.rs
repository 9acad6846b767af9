use lifeline_protocol::{Point, RenderCommand, TextAlign, ThemeToken, Viewport};

use crate::scales::ScaleRegistry;

const TICK_COUNT: usize = 10;
const TICK_LENGTH: f64 = 6.0;
const LABEL_GAP: f64 = 9.0;
const FONT_SIZE: f64 = 10.0;

/// Render the bottom year axis and the left life-expectancy axis, in plot
/// space. Each axis is a domain line plus outward ticks with labels.
pub fn render_axes(viewport: &Viewport, scales: &ScaleRegistry) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(64);
    let height = viewport.plot_height();
    let width = viewport.plot_width();

    commands.push(RenderCommand::DrawLine {
        from: Point::new(0.0, height),
        to: Point::new(width, height),
        color: ThemeToken::AxisLine.into(),
        width: 1.0,
    });
    let x_step = scales.x.tick_step(TICK_COUNT);
    for tick in scales.x.ticks(TICK_COUNT) {
        let x = scales.x.apply(tick);
        commands.push(RenderCommand::DrawLine {
            from: Point::new(x, height),
            to: Point::new(x, height + TICK_LENGTH),
            color: ThemeToken::AxisLine.into(),
            width: 1.0,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, height + TICK_LENGTH + LABEL_GAP + 3.0),
            text: format_tick(tick, x_step),
            color: ThemeToken::AxisText.into(),
            font_size: FONT_SIZE,
            align: TextAlign::Center,
            bold: false,
        });
    }

    commands.push(RenderCommand::DrawLine {
        from: Point::new(0.0, 0.0),
        to: Point::new(0.0, height),
        color: ThemeToken::AxisLine.into(),
        width: 1.0,
    });
    let y_step = scales.y.tick_step(TICK_COUNT);
    for tick in scales.y.ticks(TICK_COUNT) {
        let y = scales.y.apply(tick);
        commands.push(RenderCommand::DrawLine {
            from: Point::new(-TICK_LENGTH, y),
            to: Point::new(0.0, y),
            color: ThemeToken::AxisLine.into(),
            width: 1.0,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(-LABEL_GAP, y + FONT_SIZE * 0.35),
            text: format_tick(tick, y_step),
            color: ThemeToken::AxisText.into(),
            font_size: FONT_SIZE,
            align: TextAlign::Right,
            bold: false,
        });
    }

    commands
}

/// Format a tick label with just enough decimals for `step`.
fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()).max(0.0) as usize
    };
    format!("{value:.decimals$}")
}
