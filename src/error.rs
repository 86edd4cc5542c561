use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MigrateError>;
