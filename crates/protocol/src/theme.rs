use serde::{Deserialize, Serialize};

use crate::types::Color;

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,
    AxisLine,
    AxisText,

    /// Hover marks that sit on top of colored series.
    NeutralMark,
    /// Series color for countries outside the categorical domain.
    UnknownSeries,

    AnnotationConnector,
    AnnotationTitle,
    AnnotationLabel,

    TooltipBackground,
    TooltipBorder,
    TooltipText,

    // Control panel
    ControlBackground,
    ControlActive,
    ControlText,

    NarrativeText,
}

/// What a mark is painted with: a theme token, or a concrete data color
/// coming from the categorical scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Paint {
    Token(ThemeToken),
    Color(Color),
}

impl From<ThemeToken> for Paint {
    fn from(token: ThemeToken) -> Self {
        Paint::Token(token)
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Paint::Color(color)
    }
}
