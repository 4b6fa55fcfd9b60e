//! Error types for the pagemaster library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pagemaster library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No input files were given
    #[error("No input files provided")]
    NoInputs,

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A source PDF could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    /// Merging the sources failed
    #[error("Merge failed: {0}")]
    Merge(String),

    /// Merged document disagrees with the scanned sources
    #[error("Page count mismatch: expected {expected} pages, found {actual}")]
    PageCountMismatch { expected: usize, actual: usize },

    /// Attributor called outside its contract
    #[error("Page attribution error: {0}")]
    Attribution(String),

    /// Writing the output failed
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
