//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use std::fmt::Write as _;

use lifeline_protocol::{Paint, RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the color palette.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif;font-size:11px">"#,
    );
    let _ = write!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background, dark),
    );

    for cmd in commands {
        match cmd {
            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                opacity,
            } => {
                let _ = write!(
                    svg,
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="{}" opacity="{opacity}"/>"#,
                    center.x,
                    center.y,
                    paint(*fill, dark),
                );
            }
            RenderCommand::DrawPath {
                points,
                stroke,
                width: line_width,
                opacity,
                dashed,
            } => {
                let mut d = String::with_capacity(points.len() * 16);
                for (i, p) in points.iter().enumerate() {
                    let _ = write!(d, "{}{},{}", if i == 0 { "M" } else { "L" }, p.x, p.y);
                }
                let dash = if *dashed {
                    r#" stroke-dasharray="6,4""#
                } else {
                    ""
                };
                let _ = write!(
                    svg,
                    r#"<path d="{d}" fill="none" stroke="{}" stroke-width="{line_width}" opacity="{opacity}"{dash}/>"#,
                    paint(*stroke, dark),
                );
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let _ = write!(
                    svg,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{line_width}"/>"#,
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    paint(*color, dark),
                );
            }
            RenderCommand::DrawRect { rect, fill, border } => {
                let stroke = border
                    .map(|b| format!(r#" stroke="{}""#, paint(b, dark)))
                    .unwrap_or_default();
                let _ = write!(
                    svg,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" rx="2"{stroke}/>"#,
                    rect.x,
                    rect.y,
                    rect.w,
                    rect.h,
                    paint(*fill, dark),
                );
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
                bold,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let weight = if *bold { r#" font-weight="bold""# } else { "" };
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}"{weight}>{}</text>"#,
                    position.x,
                    position.y,
                    paint(*color, dark),
                    escape_xml(text),
                );
            }
            RenderCommand::PushTransform { translate } => {
                let _ = write!(
                    svg,
                    r#"<g transform="translate({},{})">"#,
                    translate.x, translate.y
                );
            }
            RenderCommand::BeginGroup { id, class } => {
                let _ = write!(
                    svg,
                    r#"<g id="{}" class="{}">"#,
                    escape_xml(id),
                    escape_xml(class)
                );
            }
            RenderCommand::PopTransform | RenderCommand::EndGroup => svg.push_str("</g>"),
        }
    }

    svg.push_str("</svg>");
    svg
}

fn paint(paint: Paint, dark: bool) -> String {
    match paint {
        Paint::Token(token) => resolve_color(token, dark).to_string(),
        Paint::Color(color) => color.to_hex(),
    }
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    if dark {
        match token {
            ThemeToken::Background => "#181818",
            ThemeToken::AxisLine => "#616161",
            ThemeToken::AxisText | ThemeToken::AnnotationLabel => "#bdbdbd",
            ThemeToken::NeutralMark => "#9e9e9e",
            ThemeToken::UnknownSeries => "#757575",
            ThemeToken::AnnotationConnector => "#e0e0e0",
            ThemeToken::AnnotationTitle | ThemeToken::NarrativeText => "#ececec",
            ThemeToken::TooltipBackground => "#263238",
            ThemeToken::TooltipBorder => "#546e7a",
            ThemeToken::TooltipText | ThemeToken::ControlText => "#eceff1",
            ThemeToken::ControlBackground => "#2a2a2a",
            ThemeToken::ControlActive => "#1e3a5f",
        }
    } else {
        match token {
            ThemeToken::Background => "#ffffff",
            ThemeToken::AxisLine => "#333333",
            ThemeToken::AxisText | ThemeToken::AnnotationLabel => "#444444",
            ThemeToken::NeutralMark => "#555555",
            ThemeToken::UnknownSeries => "#999999",
            ThemeToken::AnnotationConnector => "#333333",
            ThemeToken::AnnotationTitle | ThemeToken::NarrativeText => "#1a1a2e",
            ThemeToken::TooltipBackground => "#ffffff",
            ThemeToken::TooltipBorder => "#999999",
            ThemeToken::TooltipText | ThemeToken::ControlText => "#222222",
            ThemeToken::ControlBackground => "#f3f3f3",
            ThemeToken::ControlActive => "#d6e4f0",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_protocol::{Color, Point, Rect};

    #[test]
    fn basic_svg_output() {
        let commands = vec![
            RenderCommand::PushTransform {
                translate: Point::new(60.0, 40.0),
            },
            RenderCommand::DrawCircle {
                center: Point::new(10.0, 20.0),
                radius: 4.0,
                fill: Paint::Color(Color::from_hex(0x4e79a7)),
                opacity: 0.8,
            },
            RenderCommand::PopTransform,
        ];
        let svg = render_svg(&commands, 800.0, 500.0, false);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"<g transform="translate(60,40)">"#));
        assert!(svg.contains(r##"fill="#4e79a7""##));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn dashed_paths_and_theme_tokens() {
        let commands = vec![RenderCommand::DrawPath {
            points: vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            stroke: ThemeToken::NeutralMark.into(),
            width: 2.0,
            opacity: 1.0,
            dashed: true,
        }];
        let svg = render_svg(&commands, 100.0, 100.0, true);
        assert!(svg.contains(r#"d="M0,0L5,5""#));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("#9e9e9e"));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: "Côte d'Ivoire <1960>".into(),
            color: ThemeToken::TooltipText.into(),
            font_size: 11.0,
            align: TextAlign::Left,
            bold: true,
        }];
        let svg = render_svg(&commands, 400.0, 100.0, false);
        assert!(svg.contains("Côte d&apos;Ivoire &lt;1960&gt;"));
        assert!(svg.contains(r#"font-weight="bold""#));
    }

    #[test]
    fn rect_border_is_optional() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
            fill: ThemeToken::ControlBackground.into(),
            border: None,
        }];
        let svg = render_svg(&commands, 10.0, 10.0, false);
        assert!(!svg.contains("stroke="));
    }
}
