use lifeline_protocol::{Paint, ThemeToken};

/// Resolved RGBA color for egui rendering.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ResolvedColor {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            ThemeMode::Dark => egui::Visuals::dark(),
            ThemeMode::Light => egui::Visuals::light(),
        }
    }
}

pub fn resolve(token: ThemeToken, mode: ThemeMode) -> egui::Color32 {
    match mode {
        ThemeMode::Dark => resolve_dark(token),
        ThemeMode::Light => resolve_light(token),
    }
    .to_color32()
}

/// Data colors pass through; tokens go through the palette.
pub fn paint(paint: Paint, mode: ThemeMode) -> egui::Color32 {
    match paint {
        Paint::Token(token) => resolve(token, mode),
        Paint::Color(c) => egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a),
    }
}

// Catppuccin Mocha
fn resolve_dark(token: ThemeToken) -> ResolvedColor {
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(0x1e, 0x1e, 0x2e), // Base
        AxisLine => ResolvedColor::rgb(0x6c, 0x70, 0x86),   // Overlay0
        AxisText => ResolvedColor::rgb(0xa6, 0xad, 0xc8),   // Subtext0
        NeutralMark => ResolvedColor::rgb(0x93, 0x99, 0xb2), // Overlay2
        UnknownSeries => ResolvedColor::rgb(0x58, 0x5b, 0x70), // Surface2

        AnnotationConnector => ResolvedColor::rgb(0xba, 0xc2, 0xde), // Subtext1
        AnnotationTitle => ResolvedColor::rgb(0xcd, 0xd6, 0xf4),     // Text
        AnnotationLabel => ResolvedColor::rgb(0xa6, 0xad, 0xc8),

        TooltipBackground => ResolvedColor::rgba(0x31, 0x32, 0x44, 240), // Surface0
        TooltipBorder => ResolvedColor::rgb(0x45, 0x47, 0x5a),          // Surface1
        TooltipText => ResolvedColor::rgb(0xcd, 0xd6, 0xf4),

        ControlBackground => ResolvedColor::rgb(0x31, 0x32, 0x44),
        ControlActive => ResolvedColor::rgba(0x89, 0xb4, 0xfa, 90), // Blue
        ControlText => ResolvedColor::rgb(0xcd, 0xd6, 0xf4),

        NarrativeText => ResolvedColor::rgb(0xf9, 0xe2, 0xaf), // Yellow
    }
}

fn resolve_light(token: ThemeToken) -> ResolvedColor {
    use ThemeToken::*;
    match token {
        Background => ResolvedColor::rgb(255, 255, 255),
        AxisLine => ResolvedColor::rgb(60, 60, 70),
        AxisText => ResolvedColor::rgb(80, 80, 100),
        NeutralMark => ResolvedColor::rgb(100, 100, 110),
        UnknownSeries => ResolvedColor::rgb(170, 170, 180),

        AnnotationConnector => ResolvedColor::rgb(60, 60, 70),
        AnnotationTitle => ResolvedColor::rgb(20, 20, 30),
        AnnotationLabel => ResolvedColor::rgb(80, 80, 100),

        TooltipBackground => ResolvedColor::rgba(255, 255, 255, 245),
        TooltipBorder => ResolvedColor::rgb(180, 180, 190),
        TooltipText => ResolvedColor::rgb(20, 20, 30),

        ControlBackground => ResolvedColor::rgb(245, 245, 248),
        ControlActive => ResolvedColor::rgba(50, 110, 220, 60),
        ControlText => ResolvedColor::rgb(40, 40, 50),

        NarrativeText => ResolvedColor::rgb(150, 100, 10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_protocol::Color;

    #[test]
    fn data_colors_ignore_the_mode() {
        let c = Paint::Color(Color::from_hex(0xe15759));
        assert_eq!(paint(c, ThemeMode::Dark), paint(c, ThemeMode::Light));
    }

    #[test]
    fn background_differs_per_mode() {
        assert_ne!(
            resolve(ThemeToken::Background, ThemeMode::Dark),
            resolve(ThemeToken::Background, ThemeMode::Light)
        );
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
    }
}
