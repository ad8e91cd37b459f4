// src/error.rs
//! Typed failures, one enum per concern.
//!
//! Extraction functions return these instead of sentinels; callers decide
//! whether a failure skips one bill, blanks one field, or aborts the run.

use std::path::PathBuf;

use thiserror::Error;

/// (a) transport and (b) response-shape failures from the remote APIs.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned invalid JSON: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url}: unexpected response shape ({detail})")]
    Shape { url: String, detail: String },
}

/// (c) date normalization failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse date {input:?}")]
pub struct DateError {
    pub input: String,
}

/// (d) literal / array parse failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected end of input at {pos}")]
    Eof { pos: usize },

    #[error("unexpected character {found:?} at {pos}")]
    Unexpected { found: char, pos: usize },

    #[error("trailing input at {pos}")]
    Trailing { pos: usize },

    #[error("invalid number {0:?}")]
    Number(String),

    #[error("expected {expected}, found {found}")]
    Type { expected: &'static str, found: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("bill {id}: probability vector has {got} values, {expected} required")]
    ProbsTooShort { id: String, expected: usize, got: usize },

    #[error("bill {id}: probability vector is empty")]
    ProbsEmpty { id: String },

    #[error("column {0:?} not found")]
    MissingColumn(String),

    #[error("bill {id}: column {column:?} value {value:?} is not numeric")]
    NotNumeric { id: String, column: String, value: String },

    #[error("no rows left after filtering")]
    Empty,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column {0:?} not found")]
    MissingColumn(String),

    #[error("row {row} has {got} cells, header has {expected}")]
    Ragged { row: usize, expected: usize, got: usize },

    #[error("table headers do not match")]
    HeaderMismatch,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("model has not been fitted yet")]
    NotFitted,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("training data is empty")]
    EmptyTrainingSet,

    #[error("training labels contain a single class")]
    SingleClass,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
