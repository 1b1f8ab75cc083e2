use serde::Serialize;
use std::io::{self, Write};

/// Writes records as one JSON array, incrementally.
///
/// Each record is serialized straight into the sink; nothing beyond the
/// current record is held in memory.
pub struct ArrayWriter<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> ArrayWriter<W> {
    /// Open the array by writing `[`
    pub fn begin(mut writer: W) -> io::Result<Self> {
        writer.write_all(b"[")?;
        Ok(ArrayWriter { writer, written: 0 })
    }

    /// Append one record, preceded by `,` if it is not the first
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        if self.written > 0 {
            self.writer.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.writer, record).map_err(io::Error::from)?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Close the array with `]`, flush, and hand back the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.write_all(b"]")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
