use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use common::FileRange;
use protocol::Assignment;

/// Hands out non-overlapping, paragraph-boundary-aligned byte ranges over a
/// single input file, one request at a time, advancing a single cursor
/// regardless of which worker is asking.
///
/// Alignment is best-effort: each chunk is trimmed back to the last newline
/// it contains so a worker never reports a range that splits a line, but a
/// chunk with no newline at all (a single paragraph far larger than the
/// chunk size) is handed out whole rather than starved.
pub struct Dispatcher {
    file: File,
    file_len: u64,
    next_offset: u64,
    exhausted: bool,
}

impl Dispatcher {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        Ok(Self {
            file,
            file_len,
            next_offset: 0,
            exhausted: false,
        })
    }

    /// Produces the next assignment. Once the file is exhausted, every
    /// subsequent call returns a stop signal.
    pub fn next_assignment(&mut self) -> io::Result<Assignment> {
        if self.exhausted || self.next_offset >= self.file_len {
            self.exhausted = true;
            return Ok(Assignment::stop());
        }

        let remaining = self.file_len - self.next_offset;
        let want = remaining.min(common::CHUNK_SIZE as u64) as usize;
        let mut buf = vec![0u8; want];
        self.file.seek(SeekFrom::Start(self.next_offset))?;
        read_exact_at_most(&mut self.file, &mut buf)?;

        let at_end_of_file = self.next_offset + want as u64 >= self.file_len;
        let usable = if at_end_of_file {
            want
        } else {
            match buf.iter().rposition(|&b| b == b'\n') {
                Some(idx) => idx + 1,
                None => want,
            }
        };

        let range = FileRange::new(self.next_offset, usable as u32);
        self.next_offset += usable as u64;
        Ok(Assignment::range(range))
    }
}

fn read_exact_at_most(file: &mut File, buf: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
