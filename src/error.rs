use std::{io, path::PathBuf};

use thiserror::Error;

/// The sticker feed could not be turned into a catalog.
#[derive(Error, Debug)]
pub enum CatalogLoadError {
    #[error("sticker catalog not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("could not read sticker catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("sticker catalog is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("sticker catalog must be a JSON array")]
    NotASequence,

    #[error("sticker catalog entry {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// An import document failed the shape check. Current state is left as it was.
#[derive(Error, Debug)]
pub enum ImportValidationError {
    #[error("import is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("import must be a JSON object")]
    NotAnObject,

    #[error("import has no placements; it doesn't look like a Sticker Year export")]
    MissingPlacements,

    #[error("import field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable at {}: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not encode state: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{input}` is not a YYYY-MM-DD calendar day")]
pub struct DayKeyError {
    pub input: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),

    #[error(transparent)]
    Import(#[from] ImportValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    DayKey(#[from] DayKeyError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("{0}")]
    Usage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
