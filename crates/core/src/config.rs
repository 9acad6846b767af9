//! Static story configuration.
//!
//! Every field has a default matching the narrative as published, so an
//! empty JSON object (or no config file at all) reproduces it exactly.

use lifeline_protocol::{Margins, Viewport};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{axis} domain [{lo}, {hi}] is empty or not finite")]
    DegenerateDomain { axis: &'static str, lo: f64, hi: f64 },
    #[error("plot area {width}x{height} is not positive")]
    EmptyPlot { width: f64, height: f64 },
    #[error("dip threshold {0} must be a non-negative number")]
    InvalidThreshold(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub canvas: CanvasConfig,
    /// Year range shown on the x axis.
    pub x_domain: [f64; 2],
    /// Life expectancy range shown on the y axis.
    pub y_domain: [f64; 2],
    pub baseline: BaselineConfig,
    pub trajectory: TrajectoryConfig,
    pub drilldown: DrilldownConfig,
    pub dips: DipConfig,
    pub projection: ProjectionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub margins: Margins,
}

/// Title and body text of a scene's callout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteText {
    pub title: String,
    pub label: String,
}

impl NoteText {
    fn new(title: &str, label: &str) -> Self {
        Self {
            title: title.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    pub year: i32,
    /// Life expectancy the callout points at.
    pub note_value: f64,
    pub note: NoteText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryConfig {
    pub countries: Vec<String>,
    /// Last year included (inclusive).
    pub until_year: i32,
    /// Country whose `until_year` value anchors the callout.
    pub anchor_country: String,
    pub note: NoteText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrilldownConfig {
    pub countries: Vec<String>,
    pub until_year: i32,
    pub anchor_country: String,
    pub anchor_year: i32,
    pub note: NoteText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DipConfig {
    /// Inclusive year window in which drops are looked for.
    pub window: [i32; 2],
    /// Minimum year-over-year drop, in years of life expectancy.
    pub threshold: f64,
    pub note: NoteText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub countries: Vec<String>,
    /// First year used for the trend fit.
    pub fit_from: i32,
    pub target_year: i32,
    pub note: NoteText,
    pub call_to_action: NoteText,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            x_domain: [1960.0, 2030.0],
            y_domain: [30.0, 85.0],
            baseline: BaselineConfig::default(),
            trajectory: TrajectoryConfig::default(),
            drilldown: DrilldownConfig::default(),
            dips: DipConfig::default(),
            projection: ProjectionConfig::default(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            margins: Margins {
                top: 40.0,
                right: 200.0,
                bottom: 50.0,
                left: 60.0,
            },
        }
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            year: 1960,
            note_value: 60.0,
            note: NoteText::new(
                "Wide income gap",
                "High-income countries start around 70+ yrs, low-income around 35–45 yrs",
            ),
        }
    }
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            countries: strings(&["China", "Japan", "South Korea"]),
            until_year: 1990,
            anchor_country: "China".to_string(),
            note: NoteText::new(
                "East Asia's Gains",
                "China, Japan & South Korea rose ~20 yrs in three decades",
            ),
        }
    }
}

impl Default for DrilldownConfig {
    fn default() -> Self {
        Self {
            countries: strings(&[
                "Nigeria",
                "Kenya",
                "South Africa",
                "Zimbabwe",
                "Botswana",
                "Uganda",
            ]),
            until_year: 2020,
            anchor_country: "Zimbabwe".to_string(),
            anchor_year: 2000,
            note: NoteText::new(
                "Stalled progress",
                "Southern Africa lost more than a decade of gains during the HIV/AIDS epidemic",
            ),
        }
    }
}

impl Default for DipConfig {
    fn default() -> Self {
        Self {
            window: [2000, 2023],
            threshold: 1.0,
            note: NoteText::new(
                "Sudden reversals",
                "The pandemic years erased gains that took a decade to build",
            ),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            countries: strings(&["Japan", "China", "India", "Nigeria"]),
            fit_from: 2000,
            target_year: 2030,
            note: NoteText::new(
                "Projected 2030",
                "If recent trends hold, the gap narrows but does not close",
            ),
            call_to_action: NoteText::new(
                "What comes next?",
                "Where these lines go after 2030 depends on health systems we invest in today.",
            ),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl StoryConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: StoryConfig = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_domain("x", self.x_domain)?;
        check_domain("y", self.y_domain)?;
        let viewport = self.viewport();
        if !(viewport.plot_width() > 0.0 && viewport.plot_height() > 0.0) {
            return Err(ConfigError::EmptyPlot {
                width: viewport.plot_width(),
                height: viewport.plot_height(),
            });
        }
        if !(self.dips.threshold >= 0.0 && self.dips.threshold.is_finite()) {
            return Err(ConfigError::InvalidThreshold(self.dips.threshold));
        }
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.canvas.width,
            height: self.canvas.height,
            margins: self.canvas.margins,
        }
    }
}

fn check_domain(axis: &'static str, [lo, hi]: [f64; 2]) -> Result<(), ConfigError> {
    if lo.is_finite() && hi.is_finite() && lo != hi {
        Ok(())
    } else {
        Err(ConfigError::DegenerateDomain { axis, lo, hi })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = StoryConfig::from_json(b"{}").unwrap();
        assert_eq!(config, StoryConfig::default());
        assert_eq!(config.viewport().plot_width(), 540.0);
        assert_eq!(config.viewport().plot_height(), 410.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            StoryConfig::from_json(br#"{"trajectory": {"until_year": 1980}}"#).unwrap();
        assert_eq!(config.trajectory.until_year, 1980);
        assert_eq!(config.trajectory.anchor_country, "China");
        assert_eq!(config.baseline.year, 1960);
    }

    #[test]
    fn rejects_degenerate_domain() {
        let err = StoryConfig::from_json(br#"{"y_domain": [50.0, 50.0]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::DegenerateDomain { axis: "y", .. }));
    }

    #[test]
    fn rejects_margins_larger_than_canvas() {
        let err = StoryConfig::from_json(br#"{"canvas": {"width": 200.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPlot { .. }));
    }

    #[test]
    fn rejects_negative_threshold() {
        let err = StoryConfig::from_json(br#"{"dips": {"threshold": -1.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(_)));
    }
}
