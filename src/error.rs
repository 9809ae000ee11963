//! Error types shared across the pipeline.
//!
//! Extraction never fails (it degrades to empty text), so it has no error
//! type. Everything else reports through the enums below.

use thiserror::Error;

/// Failure while turning model output into typed records
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no JSON payload found in response")]
    NoPayload,

    #[error("unexpected JSON shape: {0}")]
    Shape(String),

    #[error("card {index} is missing its {field}")]
    IncompleteCard { index: usize, field: &'static str },
}

/// Failure reported by a text generator
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Provider(String),

    #[error("empty response from model")]
    EmptyResponse,
}

/// Failure while reading or writing stored blobs
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while rendering an artifact into a file format
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("presentation packaging failed: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("render I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Top-level error for job lookups and artifact views
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("job {0} not found")]
    JobNotFound(u64),

    #[error("job {id} is a {actual} job, not {expected}")]
    WrongKind {
        id: u64,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("job log failed: {0}")]
    JobLog(String),

    #[error("stored artifact is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

pub type Result<T, E = StudyError> = std::result::Result<T, E>;
