//! # clickflat - Streaming JSON log flattener
//!
//! Converts one large JSON document (an array of nested log records, or a
//! single nested record) into a JSON array of flat records that follow a fixed,
//! wide column layout suitable for ClickHouse ingestion.
//!
//! ## Modules
//!
//! - **flatten**: incremental reader, schema-driven flattener, incremental writer
//! - **error**: parse, schema and I/O error types
//!
//! Memory use is bounded by the largest single record, not by the document:
//! each raw record is dropped once flattened and each flat record once written.
//!
//! ## Quick Start
//!
//! ```rust
//! use clickflat::{flatten_json, FlattenConfig};
//!
//! # fn main() -> clickflat::Result<()> {
//! let input = br#"[{"tag": "boot", "deviceInfo": {"model": "Pixel 8"}}]"#;
//! let mut output = Vec::new();
//!
//! let report = flatten_json(&input[..], &mut output, &FlattenConfig::default())?;
//! assert_eq!(report.records, 1);
//! assert!(report.parse_error.is_none());
//!
//! // output is `[{"timestamp":"…","tag":"boot",…,"deviceInfo_model":"Pixel 8",…,"type":"INFO","valid":true}]`
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, trace, warn};

pub mod error;
pub mod flatten;

// Re-export commonly used types for convenience
pub use error::{FlattenError, ParseError, ReadError, Result, SchemaError};
pub use flatten::{
    AbsenceRule, ArrayWriter, FlatRecord, FlattenConfig, Flattener, ParserBackend, RecordReader,
    Schema, SchemaEntry, SCHEMA,
};

/// Outcome of a flattening run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlattenReport {
    /// Records written to the output array
    pub records: usize,

    /// Set when malformed input stopped the run early.
    /// The output still holds every record flattened before the error.
    pub parse_error: Option<ParseError>,
}

impl FlattenReport {
    pub fn is_complete(&self) -> bool {
        self.parse_error.is_none()
    }
}

/// Main entry point: flatten a JSON document from `reader` into `writer`
/// using the built-in schema.
pub fn flatten_json<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    config: &FlattenConfig,
) -> Result<FlattenReport> {
    let flattener = Flattener::builtin(config.absence)?;
    flatten_with(&flattener, reader, writer, config)
}

/// Flatten with an explicit flattener.
///
/// A parse error ends the read loop and is returned inside the report; the
/// output array is closed either way. I/O errors are returned as `Err`.
pub fn flatten_with<R: BufRead, W: Write>(
    flattener: &Flattener,
    reader: R,
    writer: W,
    config: &FlattenConfig,
) -> Result<FlattenReport> {
    info!(absence = ?config.absence, parser = ?config.parser, "flattening started");

    let mut records = RecordReader::new(reader)
        .with_parser(config.parser)
        .with_max_record_bytes(config.max_record_bytes);
    let mut output = ArrayWriter::begin(writer)?;
    let mut parse_error = None;

    while let Some(item) = records.next() {
        match item {
            Ok(raw) => {
                let flat = flattener.flatten(&raw);
                output.write_record(&flat)?;
                trace!(record = output.written(), offset = records.offset(), "record written");
            }
            Err(ReadError::Parse(e)) => {
                warn!(record = e.record, offset = e.offset, "stopping at malformed input: {}", e.message);
                parse_error = Some(e);
                break;
            }
            Err(ReadError::Io(e)) => {
                if let Err(close) = output.finish() {
                    warn!("failed to close output after read error: {close}");
                }
                return Err(FlattenError::Io(e));
            }
        }
    }

    let records = output.written();
    output.finish()?;

    info!(records, complete = parse_error.is_none(), "flattening finished");
    Ok(FlattenReport { records, parse_error })
}

/// Flatten `input` into a newly created (or truncated) `output` file
pub fn flatten_file(input: &Path, output: &Path, config: &FlattenConfig) -> Result<FlattenReport> {
    let source = File::open(input).map_err(|source| FlattenError::Open {
        path: input.to_path_buf(),
        source,
    })?;
    let sink = File::create(output).map_err(|source| FlattenError::Create {
        path: output.to_path_buf(),
        source,
    })?;

    info!(input = %input.display(), output = %output.display(), "flattening file");
    flatten_json(BufReader::new(source), BufWriter::new(sink), config)
}
