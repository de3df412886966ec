use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("The file is empty or could not be read")]
    EmptyInput,

    #[error("No valid records found. Check that the CSV file has the expected business-unit columns ({expected})")]
    NoValidRecords { expected: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
