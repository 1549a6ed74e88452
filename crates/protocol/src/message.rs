use common::FileRange;

/// Fixed-width tag prefixing every frame sent on the worker-to-coordinator
/// pipe, so the two message shapes can share one stream.
pub(crate) const TAG_REQUEST: u32 = 1;
pub(crate) const TAG_RESULT: u32 = 2;

/// A worker's pull signal: "I'm idle, give me more work."
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub worker_id: u32,
}

/// What the coordinator hands back on the assignment pipe: either a stop
/// signal or a concrete range to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub stop: bool,
    pub range: Option<FileRange>,
}

impl Assignment {
    #[must_use]
    pub const fn stop() -> Self {
        Self {
            stop: true,
            range: None,
        }
    }

    #[must_use]
    pub const fn range(range: FileRange) -> Self {
        Self {
            stop: false,
            range: Some(range),
        }
    }
}

/// What a worker reports back after reading and trimming a chunk.
///
/// `bytes_read` doubles as the payload length and the effective length the
/// coordinator's cursors advance by; there is no separate raw-read count
/// because the worker never reports bytes the coordinator cannot use.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkResult {
    pub worker_id: u32,
    pub offset: u64,
    pub elapsed_seconds: f64,
    pub payload: Vec<u8>,
}

impl ChunkResult {
    #[must_use]
    pub fn bytes_read(&self) -> u32 {
        self.payload.len() as u32
    }

    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.offset + self.payload.len() as u64
    }
}
