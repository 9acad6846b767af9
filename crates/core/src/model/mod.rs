pub mod dataset;
pub mod record;

pub use dataset::{CountryGroup, Dataset, Row, group_by_country};
pub use record::{Record, RecordError};
