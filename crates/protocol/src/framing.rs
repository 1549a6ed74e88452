use std::io::{self, Read, Write};

use common::FileRange;

use crate::error::ProtocolError;
use crate::message::{Assignment, ChunkResult, Request, TAG_REQUEST, TAG_RESULT};

/// Anything a worker or the coordinator can receive on the result/request
/// pipe: both message shapes share a tag so one reader loop can multiplex
/// them.
#[derive(Debug)]
pub enum Incoming {
    Request(Request),
    Result(ChunkResult),
}

/// Reads exactly `buf.len()` bytes, retrying on `Interrupted` and on short
/// reads, exactly as a blocking pipe read can legitimately return fewer
/// bytes than requested without the peer going away.
///
/// Returns `Ok(false)` only when the very first read of this call sees a
/// clean zero-byte return — the peer closed its end between messages, which
/// is how a worker signals it has exited. Any zero-byte return *after* a
/// partial read has already landed is a truncated message, not a clean
/// shutdown, and is reported as an error.
fn read_exact_or_eof(r: &mut impl Read, buf: &mut [u8]) -> Result<bool, ProtocolError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(ProtocolError::Truncated {
                    expected: buf.len() - filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtocolError::Io(e)),
        }
    }
    Ok(true)
}

fn read_exact(r: &mut impl Read, buf: &mut [u8]) -> Result<(), ProtocolError> {
    if read_exact_or_eof(r, buf)? {
        Ok(())
    } else {
        Err(ProtocolError::Truncated { expected: buf.len() })
    }
}

fn write_exact(w: &mut impl Write, mut buf: &[u8]) -> Result<(), ProtocolError> {
    while !buf.is_empty() {
        match w.write(buf) {
            Ok(0) => {
                return Err(ProtocolError::Truncated { expected: buf.len() });
            }
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ProtocolError::Io(e)),
        }
    }
    Ok(())
}

fn read_u32(r: &mut impl Read) -> Result<u32, ProtocolError> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_ne_bytes(buf))
}

fn read_u64(r: &mut impl Read) -> Result<u64, ProtocolError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(u64::from_ne_bytes(buf))
}

fn read_f64(r: &mut impl Read) -> Result<f64, ProtocolError> {
    let mut buf = [0u8; 8];
    read_exact(r, &mut buf)?;
    Ok(f64::from_ne_bytes(buf))
}

/// Guards against a corrupt or hostile length prefix forcing an enormous
/// allocation; a real chunk is never larger than `common::CHUNK_SIZE`.
const MAX_PAYLOAD: usize = common::CHUNK_SIZE * 2;

/// Sends `(tag=REQUEST, worker_id)` on the worker-to-coordinator pipe.
pub fn write_request(w: &mut impl Write, request: Request) -> Result<(), ProtocolError> {
    write_exact(w, &TAG_REQUEST.to_ne_bytes())?;
    write_exact(w, &request.worker_id.to_ne_bytes())
}

/// Sends `(stop, [offset, length])` on the coordinator-to-worker pipe. This
/// pipe carries only assignments, so frames here have no leading tag.
pub fn write_assignment(w: &mut impl Write, assignment: &Assignment) -> Result<(), ProtocolError> {
    write_exact(w, &[u8::from(assignment.stop)])?;
    if let Some(range) = assignment.range {
        write_exact(w, &range.offset.to_ne_bytes())?;
        write_exact(w, &range.length.to_ne_bytes())?;
    }
    Ok(())
}

/// Reads one assignment, or `Ok(None)` if the coordinator closed the
/// assignment pipe (the worker's cue to exit even without an explicit stop).
pub fn read_assignment(r: &mut impl Read) -> Result<Option<Assignment>, ProtocolError> {
    let mut stop_byte = [0u8; 1];
    if !read_exact_or_eof(r, &mut stop_byte)? {
        return Ok(None);
    }
    if stop_byte[0] != 0 {
        return Ok(Some(Assignment::stop()));
    }
    let offset = read_u64(r)?;
    let length = read_u32(r)?;
    Ok(Some(Assignment::range(FileRange::new(offset, length))))
}

/// Sends `(tag=RESULT, worker_id, offset, bytes_read, elapsed_seconds,
/// payload)` on the worker-to-coordinator pipe.
pub fn write_result(w: &mut impl Write, result: &ChunkResult) -> Result<(), ProtocolError> {
    write_exact(w, &TAG_RESULT.to_ne_bytes())?;
    write_exact(w, &result.worker_id.to_ne_bytes())?;
    write_exact(w, &result.offset.to_ne_bytes())?;
    write_exact(w, &result.bytes_read().to_ne_bytes())?;
    write_exact(w, &result.elapsed_seconds.to_ne_bytes())?;
    write_exact(w, &result.payload)
}

/// Reads one frame from the worker-to-coordinator pipe, or `Ok(None)` on a
/// clean shutdown (the worker process exited and closed its stdout).
pub fn read_message(r: &mut impl Read) -> Result<Option<Incoming>, ProtocolError> {
    let mut tag_buf = [0u8; 4];
    if !read_exact_or_eof(r, &mut tag_buf)? {
        return Ok(None);
    }
    let tag = u32::from_ne_bytes(tag_buf);
    match tag {
        TAG_REQUEST => {
            let worker_id = read_u32(r)?;
            Ok(Some(Incoming::Request(Request { worker_id })))
        }
        TAG_RESULT => {
            let worker_id = read_u32(r)?;
            let offset = read_u64(r)?;
            let bytes_read = read_u32(r)? as usize;
            if bytes_read > MAX_PAYLOAD {
                return Err(ProtocolError::Allocation(bytes_read));
            }
            let elapsed_seconds = read_f64(r)?;
            let mut payload = vec![0u8; bytes_read];
            read_exact(r, &mut payload)?;
            Ok(Some(Incoming::Result(ChunkResult {
                worker_id,
                offset,
                elapsed_seconds,
                payload,
            })))
        }
        other => Err(ProtocolError::UnknownTag(other)),
    }
}
