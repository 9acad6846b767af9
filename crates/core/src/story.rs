use lifeline_protocol::Viewport;
use tracing::debug;

use crate::config::StoryConfig;
use crate::error::StoryError;
use crate::model::Dataset;
use crate::parsers::parse_auto;
use crate::scales::ScaleRegistry;

/// Session context: the loaded dataset, the scales built from it, and the
/// configuration. Immutable once constructed.
#[derive(Debug)]
pub struct Story {
    dataset: Dataset,
    scales: ScaleRegistry,
    config: StoryConfig,
}

impl Story {
    pub fn new(dataset: Dataset, config: StoryConfig) -> Result<Self, StoryError> {
        config.validate()?;
        let scales = ScaleRegistry::build(&dataset, &config);
        debug!(
            records = dataset.len(),
            countries = scales.color.domain().len(),
            "story loaded"
        );
        Ok(Self {
            dataset,
            scales,
            config,
        })
    }

    /// Parse a CSV or JSON dataset and build the session around it.
    pub fn from_bytes(data: &[u8], config: StoryConfig) -> Result<Self, StoryError> {
        Self::new(parse_auto(data)?, config)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn scales(&self) -> &ScaleRegistry {
        &self.scales
    }

    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.config.viewport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_csv() {
        let story = Story::from_bytes(
            b"country,year,life_expectancy\nChad,1960,38.0\nJapan,1960,67.7\n",
            StoryConfig::default(),
        )
        .unwrap();
        assert_eq!(story.dataset().len(), 2);
        assert_eq!(story.scales().color.domain(), ["Chad", "Japan"]);
    }

    #[test]
    fn bad_data_is_a_parse_error() {
        let err = Story::from_bytes(b"country,year,life_expectancy\nChad,abc,38\n", StoryConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoryError::Parse(_)));
    }

    #[test]
    fn bad_config_is_rejected() {
        let config = StoryConfig {
            x_domain: [2000.0, 2000.0],
            ..StoryConfig::default()
        };
        let err = Story::new(Dataset::default(), config).unwrap_err();
        assert!(matches!(err, StoryError::Config(_)));
    }
}
