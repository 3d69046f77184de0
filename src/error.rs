//! Errors that end the processing of a single input file.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StampError>;

#[derive(Debug, Error)]
pub enum StampError {
    #[error("cannot read PDF {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },

    #[error("page {page} out of range (document has {total} page(s))")]
    PageOutOfRange { page: i64, total: usize },

    #[error("malformed PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("cannot write {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot list directory {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
