//! Orchestrates a pool of self-re-exec worker processes over a single input
//! file: dispatching aligned byte ranges, reassembling results in order,
//! stitching paragraphs across chunk boundaries, matching, and logging.

mod coordinator;
mod dispatcher;
mod reorder;
mod stitcher;

pub use coordinator::{run, CoordinatorError};
pub use dispatcher::Dispatcher;
pub use reorder::ReorderBuffer;
pub use stitcher::Stitcher;
