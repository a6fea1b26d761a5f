use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("I/O error while writing the analysis output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize the analysis output: {0}")]
    Json(#[from] serde_json::Error),
}
