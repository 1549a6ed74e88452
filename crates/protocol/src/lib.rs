//! Wire format for the two pipes connecting the coordinator to each worker:
//! an assignment pipe (coordinator to worker) and a request/result pipe
//! (worker to coordinator). All integers are host-endian fixed-width; this
//! is a same-machine, same-binary protocol so there is no cross-endian
//! concern.

mod error;
mod framing;
mod message;

pub use error::ProtocolError;
pub use framing::{
    read_assignment, read_message, write_assignment, write_request, write_result, Incoming,
};
pub use message::{Assignment, ChunkResult, Request};
