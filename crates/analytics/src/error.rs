use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("No price snapshot available for symbol '{0}'")]
    MissingPriceData(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
