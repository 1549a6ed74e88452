use common::ErrorKind;

/// Everything that can go wrong reading or writing a frame: pipe I/O
/// failures, a peer closing mid-message, an unrecognized tag, or an
/// oversized payload the reader refuses to allocate for.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("I/O error on pipe: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer closed the pipe mid-message (expected {expected} more bytes)")]
    Truncated { expected: usize },

    #[error("unknown message tag {0}")]
    UnknownTag(u32),

    #[error("refusing to allocate a {0}-byte payload")]
    Allocation(usize),
}

impl ProtocolError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Truncated { .. } | Self::UnknownTag(_) => ErrorKind::Protocol,
            Self::Allocation(_) => ErrorKind::Allocation,
        }
    }
}
