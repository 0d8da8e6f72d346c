use std::path::PathBuf;

use thiserror::Error;

/// Failures of the single outbound request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("response is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),
}

/// Reasons the target text does not accept a new imported section.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("could not find start marker")]
    AnchorNotFound,
    #[error("start marker occurs {0} times, expected exactly once")]
    AnchorNotUnique(usize),
    #[error("could not find end marker")]
    TerminatorNotFound,
    #[error("HTML structure might be corrupted ({marker} count {before} -> {after})")]
    StructureChanged {
        marker: &'static str,
        before: usize,
        after: usize,
    },
}

/// Terminal outcomes of a run after the page has been fetched.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No BBSes found")]
    NoListings,
    #[error("{path}: {source}")]
    Patch {
        path: PathBuf,
        #[source]
        source: PatchError,
    },
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
