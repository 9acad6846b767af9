use thiserror::Error;

use crate::config::ConfigError;
use crate::parsers::ParseError;

#[derive(Debug, Error)]
pub enum StoryError {
    /// A render was dispatched for a slide the storyline does not have.
    /// Navigation guards make this unreachable from `advance`/`retreat`.
    #[error("slide {slide} is out of range (last slide is {max})")]
    SlideOutOfRange { slide: usize, max: usize },
    #[error("dataset: {0}")]
    Parse(#[from] ParseError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
