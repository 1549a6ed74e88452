//! A fixed-schema CSV sink for one row per chunk processed: which worker
//! handled it, where it started, how much it read, how long the read took,
//! and whether it contained a match.

use std::io::{self, Write};

use common::ErrorKind;

#[derive(Debug, thiserror::Error)]
#[error("writing log row: {0}")]
pub struct LogSinkError(#[from] io::Error);

impl LogSinkError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Io
    }
}

/// One chunk's worth of bookkeeping, as reported by a worker and resolved
/// by the coordinator after matching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogRow {
    pub process_id: u32,
    pub file_offset: u64,
    pub bytes_read: u32,
    pub elapsed_seconds: f64,
    pub found: bool,
}

/// Writes chunk log rows as CSV to any `Write` sink.
///
/// The header is written once, on construction, matching the teacher
/// convention of emitting a ready-to-append stream rather than buffering
/// rows for a later write-all.
pub struct LogSink<W: Write> {
    out: W,
}

impl<W: Write> LogSink<W> {
    pub fn new(mut out: W) -> Result<Self, LogSinkError> {
        writeln!(out, "process_id,file_offset,bytes_read,elapsed_time,found")?;
        Ok(Self { out })
    }

    pub fn write_row(&mut self, row: LogRow) -> Result<(), LogSinkError> {
        writeln!(
            self.out,
            "{},{},{},{:.6},{}",
            row.process_id,
            row.file_offset,
            row.bytes_read,
            row.elapsed_seconds,
            u8::from(row.found)
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), LogSinkError> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_then_rows_with_six_decimal_elapsed_time() {
        let mut buf = Vec::new();
        {
            let mut sink = LogSink::new(&mut buf).unwrap();
            sink.write_row(LogRow {
                process_id: 2,
                file_offset: 8192,
                bytes_read: 4096,
                elapsed_seconds: 0.125,
                found: true,
            })
            .unwrap();
            sink.write_row(LogRow {
                process_id: 3,
                file_offset: 12288,
                bytes_read: 512,
                elapsed_seconds: 0.0,
                found: false,
            })
            .unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "process_id,file_offset,bytes_read,elapsed_time,found"
        );
        assert_eq!(lines.next().unwrap(), "2,8192,4096,0.125000,1");
        assert_eq!(lines.next().unwrap(), "3,12288,512,0.000000,0");
        assert!(lines.next().is_none());
    }
}
