use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build an archive with no files")]
    EmptyArchive,

    #[error("too many archive entries: {count} (max 65535)")]
    TooManyEntries { count: usize },

    #[error("archive payload too large: {size} bytes")]
    ArchiveTooLarge { size: u64 },

    #[error("archive truncated at {offset:#x}: need {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("archive entry {hash:#010x} points outside the data region ({offset}+{size})")]
    BadIndex { hash: u32, offset: u32, size: u32 },

    #[error("validation failed with {errors} error(s)")]
    ValidationFailed { errors: usize },

    #[error("asset not found: {path} (tried {})", display_paths(.tried))]
    AssetNotFound { path: String, tried: Vec<PathBuf> },

    #[error("export cancelled before {stage}")]
    Cancelled { stage: crate::export::Stage },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
