use std::path::PathBuf;

use crate::catalog::FoodId;

/// A catalog or meal-log source could not be read into the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("no header row found after {preamble} preamble rows")]
    MissingHeader { preamble: usize },
    #[error("missing column `{0}`")]
    MissingColumn(String),
    #[error("row {row}: invalid value {value:?} in column `{column}`")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
    #[error("duplicate food id {0}")]
    DuplicateId(FoodId),
    #[error("load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Appending to the meal-log store failed; nothing was written.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("meal log {0} is locked by another writer")]
    Locked(PathBuf),
    #[error("meal log io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode meal rows: {0}")]
    Encode(#[from] csv::Error),
    #[error("format meal date: {0}")]
    Date(#[from] time::error::Format),
    #[error("meal log header: {0}")]
    Header(String),
    #[error("meal entry references no foods")]
    EmptyEntry,
    #[error("append task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A submission or selection change was rejected before touching any state.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("a meal needs at least one food")]
    EmptyMeal,
    #[error("unknown food `{0}`")]
    UnknownFood(String),
    #[error("unknown food id {0}")]
    UnknownId(FoodId),
    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(u8),
    #[error("unknown nutrient column `{0}`")]
    UnknownMacro(String),
}
