use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("country name is empty")]
    EmptyCountry,
    #[error("life expectancy {0} is not a finite number")]
    NonFiniteLifeExpectancy(f64),
}

/// One observation: a country's life expectancy in a given year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub country: String,
    pub year: i32,
    /// Life expectancy at birth, in years.
    pub life_expectancy: f64,
}

impl Record {
    /// Build a validated record. Non-finite life expectancy is rejected so it
    /// can never reach scale arithmetic.
    pub fn new(
        country: impl Into<String>,
        year: i32,
        life_expectancy: f64,
    ) -> Result<Self, RecordError> {
        let country = country.into();
        if country.trim().is_empty() {
            return Err(RecordError::EmptyCountry);
        }
        if !life_expectancy.is_finite() {
            return Err(RecordError::NonFiniteLifeExpectancy(life_expectancy));
        }
        Ok(Self {
            country,
            year,
            life_expectancy,
        })
    }
}
