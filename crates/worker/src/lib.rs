//! The worker side of the coordinator/worker cycle.
//!
//! A worker is a pull-based client: it asks for work, blocks for an
//! assignment, performs exactly one read against the shared file, and
//! reports the bytes back. It never decides what to read next on its own —
//! the dispatcher on the other end of the assignment pipe already aligned
//! the range on a paragraph boundary, so the worker's job here is pure I/O.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::Instant;

use common::ErrorKind;
use protocol::{read_assignment, write_request, write_result, ChunkResult, ProtocolError, Request};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("opening input file: {0}")]
    Open(#[source] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("reading assigned range: {0}")]
    Read(#[source] std::io::Error),
}

impl WorkerError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Open(_) | Self::Read(_) => ErrorKind::FileOpen,
            Self::Protocol(e) => e.kind(),
        }
    }
}

/// Runs the request/assignment/result cycle until the coordinator sends a
/// stop signal or closes the assignment pipe.
///
/// `assignment_in` and `result_out` are opposite ends of the two pipes a
/// self-re-exec worker process inherits on its stdin/stdout; tests pass
/// in-memory or socket-backed substitutes instead.
pub fn run(
    worker_id: u32,
    file_path: &Path,
    mut assignment_in: impl Read,
    mut result_out: impl Write,
) -> Result<(), WorkerError> {
    let mut file = File::open(file_path).map_err(WorkerError::Open)?;
    tracing::debug!(worker_id, path = %file_path.display(), "worker started");

    loop {
        write_request(&mut result_out, Request { worker_id })?;
        result_out.flush().map_err(ProtocolError::Io)?;

        let Some(assignment) = read_assignment(&mut assignment_in)? else {
            tracing::debug!(worker_id, "assignment pipe closed, exiting");
            return Ok(());
        };
        let Some(range) = assignment.range else {
            tracing::debug!(worker_id, "received stop, exiting");
            return Ok(());
        };

        let start = Instant::now();
        file.seek(SeekFrom::Start(range.offset))
            .map_err(WorkerError::Read)?;
        let mut payload = vec![0u8; range.length as usize];
        let filled = read_assigned_range(&mut file, &mut payload)?;
        payload.truncate(filled);
        let elapsed_seconds = start.elapsed().as_secs_f64();
        tracing::trace!(worker_id, offset = range.offset, bytes_read = filled, elapsed_seconds, "chunk read");

        write_result(
            &mut result_out,
            &ChunkResult {
                worker_id,
                offset: range.offset,
                elapsed_seconds,
                payload,
            },
        )?;
        result_out.flush().map_err(ProtocolError::Io)?;
    }
}

/// Fills `buf` from `file`, returning the number of bytes actually read.
/// A short final read at end of file is expected (the dispatcher's last
/// chunk can be shorter than the nominal chunk size); only a hard I/O error
/// is reported as a failure.
fn read_assigned_range(file: &mut File, buf: &mut [u8]) -> Result<usize, WorkerError> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(WorkerError::Read(e)),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use common::FileRange;
    use protocol::{read_message, write_assignment, Assignment, Incoming};
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn requests_one_range_then_stops() {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(b"alpha beta\n\ngamma delta\n").unwrap();

        // Assignment pipe: one range, then stop.
        let mut assignment_bytes = Vec::new();
        write_assignment(
            &mut assignment_bytes,
            &Assignment::range(FileRange::new(0, 12)),
        )
        .unwrap();
        write_assignment(&mut assignment_bytes, &Assignment::stop()).unwrap();

        let mut result_bytes = Vec::new();
        run(
            0,
            input.path(),
            std::io::Cursor::new(assignment_bytes),
            &mut result_bytes,
        )
        .unwrap();

        let mut cursor = std::io::Cursor::new(result_bytes);
        // First frame out is the initial pull request.
        match read_message(&mut cursor).unwrap().unwrap() {
            Incoming::Request(req) => assert_eq!(req.worker_id, 0),
            Incoming::Result(_) => panic!("expected a request first"),
        }
        match read_message(&mut cursor).unwrap().unwrap() {
            Incoming::Result(result) => {
                assert_eq!(result.offset, 0);
                assert_eq!(result.payload, b"alpha beta\n\n");
            }
            Incoming::Request(_) => panic!("expected a result"),
        }
        // Second pull request precedes the stop, and nothing follows it.
        match read_message(&mut cursor).unwrap().unwrap() {
            Incoming::Request(req) => assert_eq!(req.worker_id, 0),
            Incoming::Result(_) => panic!("expected the second request"),
        }
        assert!(read_message(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn closed_assignment_pipe_ends_the_loop_cleanly() {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(b"only content\n").unwrap();

        let mut result_bytes = Vec::new();
        let result = run(
            1,
            input.path(),
            std::io::Cursor::new(Vec::<u8>::new()),
            &mut result_bytes,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn missing_file_is_reported_as_an_open_error() {
        let mut assignment_bytes = Vec::new();
        write_assignment(&mut assignment_bytes, &Assignment::stop()).unwrap();

        let err = run(
            0,
            Path::new("/nonexistent/does-not-exist"),
            std::io::Cursor::new(assignment_bytes),
            std::io::sink(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileOpen);
    }
}
