use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Malformed or truncated JSON input.
///
/// Terminal for the read loop only: records emitted before the error stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} (record {record}, byte {offset})")]
pub struct ParseError {
    /// Zero-based index of the record being read when parsing failed
    pub record: usize,
    /// Byte offset in the input where the failing record or token starts
    pub offset: u64,
    pub message: String,
}

impl ParseError {
    pub fn new(record: usize, offset: u64, message: impl Into<String>) -> Self {
        ParseError {
            record,
            offset,
            message: message.into(),
        }
    }
}

/// Failure while pulling the next record from the input
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Problems found in a schema table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema entry {index} has an empty output name")]
    EmptyOutputName { index: usize },

    #[error("output name `{name}` is not a valid column name")]
    InvalidOutputName { name: String },

    #[error("output name `{name}` has an empty source path")]
    EmptyPath { name: String },

    #[error("output name `{name}` has an empty path segment")]
    EmptySegment { name: String },

    #[error("output name `{name}` is declared more than once")]
    DuplicateOutputName { name: String },
}

/// Stream-level failures surfaced to the caller
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to open input {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output {}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, FlattenError>;
