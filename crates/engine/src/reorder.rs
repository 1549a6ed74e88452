use std::collections::BTreeMap;

use protocol::ChunkResult;

/// Holds out-of-order chunk results until the ones preceding them in file
/// order have arrived, so the stitcher always sees chunk bytes in the same
/// sequence they appear in the file even though workers can finish their
/// reads in any order.
pub struct ReorderBuffer {
    pending: BTreeMap<u64, ChunkResult>,
    next_expected_offset: u64,
}

impl ReorderBuffer {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_expected_offset: 0,
        }
    }

    pub fn insert(&mut self, result: ChunkResult) {
        self.pending.insert(result.offset, result);
    }

    /// Removes and returns every chunk now contiguous with what has already
    /// been released, in file order.
    pub fn drain_ready(&mut self) -> Vec<ChunkResult> {
        let mut ready = Vec::new();
        while let Some(result) = self.pending.remove(&self.next_expected_offset) {
            self.next_expected_offset = result.end_offset();
            ready.push(result);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(offset: u64, len: usize) -> ChunkResult {
        ChunkResult {
            worker_id: 0,
            offset,
            elapsed_seconds: 0.0,
            payload: vec![b'a'; len],
        }
    }

    #[test]
    fn releases_in_order_even_when_inserted_out_of_order() {
        let mut buf = ReorderBuffer::new();
        buf.insert(chunk(8, 4));
        assert!(buf.drain_ready().is_empty());

        buf.insert(chunk(0, 4));
        let ready = buf.drain_ready();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].offset, 0);

        buf.insert(chunk(4, 4));
        let ready = buf.drain_ready();
        assert_eq!(ready.iter().map(|c| c.offset).collect::<Vec<_>>(), vec![4, 8]);
    }

    #[test]
    fn a_zero_length_final_chunk_does_not_stall() {
        let mut buf = ReorderBuffer::new();
        buf.insert(chunk(0, 0));
        assert_eq!(buf.drain_ready().len(), 1);
    }
}
