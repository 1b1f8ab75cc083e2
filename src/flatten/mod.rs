//! JSON flattening - map nested log records onto a flat column layout
//!
//! The pipeline has three stages, one record at a time:
//!
//! - [`RecordReader`] pulls raw records out of a JSON document incrementally
//! - [`Flattener`] maps each record through the static [`SCHEMA`] table
//! - [`ArrayWriter`] serializes flat records as a JSON array as they arrive

pub mod types;
pub mod schema;
pub mod extractor;
pub mod reader;
pub mod writer;

pub use types::{AbsenceRule, DefaultPolicy, FieldPath, FlatRecord, FlattenConfig, ParserBackend, SchemaEntry};
pub use schema::{Schema, SCHEMA};
pub use extractor::{is_falsy, lookup, Flattener};
pub use reader::RecordReader;
pub use writer::ArrayWriter;
