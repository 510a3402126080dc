//! Error types for page segmentation runs.
//!
//! * [`SegmentError`] is fatal: the batch cannot start (missing input
//!   directory, empty page range, unreadable configuration).
//! * [`PageError`] is scoped to one page: it is recorded in that page's
//!   outcome and the batch moves on to the next page.
//!
//! Geometry stages never fail. Ambiguous layouts resolve through fallbacks, so
//! neither type has a variant for "no separator lines" or "no header rule".

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a segmentation run before any page is processed.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("input directory not found: '{path}'")]
    InputDirNotFound { path: PathBuf },

    #[error("no page images found in '{path}'")]
    NoPages { path: PathBuf },

    #[error("start page must be >= 1")]
    InvalidStartPage,

    #[error("start page {start} exceeds last page {last}")]
    StartPageOutOfRange { start: u32, last: u32 },

    #[error("end page {end} must be >= start page {start}")]
    EndBeforeStart { start: u32, end: u32 },

    #[error("end page {end} exceeds last page {last}")]
    EndPageOutOfRange { end: u32, last: u32 },

    #[error("no page images in range {start}-{end}")]
    NoPagesInRange { start: u32, end: u32 },

    #[error("failed to load config '{path}': {detail}")]
    Config { path: PathBuf, detail: String },

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report for '{path}': {detail}")]
    Report { path: PathBuf, detail: String },
}

/// Failure confined to a single page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to open page image '{path}': {detail}")]
    Load { path: PathBuf, detail: String },

    #[error("page image '{path}' has no pixels")]
    EmptyImage { path: PathBuf },

    #[error("failed to write '{path}': {detail}")]
    Save { path: PathBuf, detail: String },
}
