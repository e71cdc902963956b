use thiserror::Error;

/// Errors that can occur while loading or reading sheets
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Sheet already exists: {name}")]
    SheetAlreadyExists { name: String },

    #[error("Empty upload: {name}")]
    EmptyInput { name: String },

    #[error("Unsupported file format: {name}")]
    UnsupportedFormat { name: String },

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
