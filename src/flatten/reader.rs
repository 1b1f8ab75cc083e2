//! Incremental record reader
//!
//! Walks the top-level structure of a JSON document and yields one raw record
//! per array element (or a single record for a non-array document). Only the
//! bytes of the element currently being read are buffered.

use crate::error::{ParseError, ReadError};
use crate::flatten::types::ParserBackend;
use serde_json::Value;
use std::io::{BufRead, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    FirstElement,
    NextElement,
    Done,
}

/// Finds where a single JSON value ends in a byte stream.
///
/// Objects, arrays and strings end at their closing delimiter. Bare tokens
/// (numbers, literals) end before the next structural byte or at end of input.
#[derive(Debug)]
struct ValueScanner {
    bare: bool,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl ValueScanner {
    fn for_first_byte(first: u8) -> Self {
        ValueScanner {
            bare: !matches!(first, b'{' | b'[' | b'"'),
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }

    /// Feed the next chunk; returns the end index (exclusive) once the value is complete
    fn feed(&mut self, chunk: &[u8]) -> Option<usize> {
        if self.bare {
            return chunk.iter().position(|b| is_delimiter(*b));
        }

        for (i, &b) in chunk.iter().enumerate() {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return Some(i + 1);
                    }
                }
                continue;
            }

            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn complete_at_eof(&self) -> bool {
        self.bare
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_delimiter(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b',' | b']' | b'}')
}

fn describe(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("`{}`", b as char)
    } else {
        format!("byte 0x{b:02x}")
    }
}

/// Pull-based reader yielding raw records from a JSON document
pub struct RecordReader<R> {
    inner: R,
    parser: ParserBackend,
    max_record_bytes: Option<usize>,
    buf: Vec<u8>,
    offset: u64,
    records: usize,
    state: State,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        RecordReader {
            inner,
            parser: ParserBackend::Serde,
            max_record_bytes: None,
            buf: Vec::new(),
            offset: 0,
            records: 0,
            state: State::Start,
        }
    }

    pub fn with_parser(mut self, parser: ParserBackend) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_max_record_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_record_bytes = limit;
        self
    }

    /// Bytes consumed from the input so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn advance(&mut self) -> Result<Option<Value>, ReadError> {
        match self.state {
            State::Done => Ok(None),
            State::Start => match self.skip_whitespace()? {
                None => Err(self.error(self.offset, "expected a JSON value, found end of input")),
                Some(b'[') => {
                    self.bump();
                    self.state = State::FirstElement;
                    self.advance()
                }
                Some(_) => {
                    let value = self.read_value()?;
                    self.expect_end()?;
                    self.state = State::Done;
                    self.records += 1;
                    Ok(Some(value))
                }
            },
            State::FirstElement => match self.skip_whitespace()? {
                Some(b']') => self.close_array(),
                Some(_) => self.read_element(),
                None => Err(self.error(self.offset, "unexpected end of input: unterminated array")),
            },
            State::NextElement => match self.skip_whitespace()? {
                Some(b',') => {
                    self.bump();
                    self.read_element()
                }
                Some(b']') => self.close_array(),
                Some(b) => Err(self.error(
                    self.offset,
                    format!("expected `,` or `]` after array element, found {}", describe(b)),
                )),
                None => Err(self.error(self.offset, "unexpected end of input: unterminated array")),
            },
        }
    }

    fn read_element(&mut self) -> Result<Option<Value>, ReadError> {
        let value = self.read_value()?;
        self.records += 1;
        self.state = State::NextElement;
        Ok(Some(value))
    }

    fn close_array(&mut self) -> Result<Option<Value>, ReadError> {
        self.bump();
        self.expect_end()?;
        self.state = State::Done;
        Ok(None)
    }

    /// Buffer the bytes of exactly one JSON value, then parse them
    fn read_value(&mut self) -> Result<Value, ReadError> {
        let first = match self.skip_whitespace()? {
            Some(b) => b,
            None => return Err(self.error(self.offset, "unexpected end of input: expected a value")),
        };
        let start = self.offset;
        if matches!(first, b',' | b']' | b'}' | b':') {
            return Err(self.error(start, format!("expected a JSON value, found {}", describe(first))));
        }

        // inside an array a bare token cut off by EOF is truncated input
        let top_level = self.state == State::Start;
        let mut scanner = ValueScanner::for_first_byte(first);
        self.buf.clear();

        loop {
            let chunk = match self.inner.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if chunk.is_empty() {
                if top_level && scanner.complete_at_eof() {
                    break;
                }
                return Err(self.error(start, "unexpected end of input inside record"));
            }

            let end = scanner.feed(chunk);
            let take = end.unwrap_or(chunk.len());
            if let Some(limit) = self.max_record_bytes {
                if self.buf.len() + take > limit {
                    return Err(self.error(start, format!("record exceeds {limit} bytes")));
                }
            }

            self.buf.extend_from_slice(&chunk[..take]);
            self.inner.consume(take);
            self.offset += take as u64;

            if end.is_some() {
                break;
            }
        }

        self.parse_buffer(start)
    }

    fn parse_buffer(&mut self, start: u64) -> Result<Value, ReadError> {
        let parsed = match self.parser {
            ParserBackend::Serde => {
                serde_json::from_slice::<Value>(&self.buf).map_err(|e| e.to_string())
            }
            ParserBackend::Simd => {
                simd_json::serde::from_slice::<Value>(&mut self.buf).map_err(|e| e.to_string())
            }
        };
        parsed.map_err(|message| self.error(start, format!("invalid JSON: {message}")))
    }

    /// After the top-level value only whitespace may follow
    fn expect_end(&mut self) -> Result<(), ReadError> {
        match self.skip_whitespace()? {
            None => Ok(()),
            Some(b) => Err(self.error(
                self.offset,
                format!("trailing characters after top-level value: found {}", describe(b)),
            )),
        }
    }

    /// Consume whitespace and peek the next byte without consuming it
    fn skip_whitespace(&mut self) -> Result<Option<u8>, ReadError> {
        loop {
            let chunk = match self.inner.fill_buf() {
                Ok(chunk) => chunk,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if chunk.is_empty() {
                return Ok(None);
            }

            let skipped = chunk.iter().take_while(|b| is_whitespace(**b)).count();
            let next = chunk.get(skipped).copied();
            self.inner.consume(skipped);
            self.offset += skipped as u64;

            if next.is_some() {
                return Ok(next);
            }
        }
    }

    /// Consume the byte last returned by `skip_whitespace`
    fn bump(&mut self) {
        self.inner.consume(1);
        self.offset += 1;
    }

    fn error(&self, offset: u64, message: impl Into<String>) -> ReadError {
        ReadError::Parse(ParseError::new(self.records, offset, message))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Value, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => None,
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}
