/// A contiguous byte region of the input file.
///
/// Invariant upheld by callers: `offset + length` never exceeds the file size
/// at the time of read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileRange {
    pub offset: u64,
    pub length: u32,
}

impl FileRange {
    #[must_use]
    pub const fn new(offset: u64, length: u32) -> Self {
        Self { offset, length }
    }

    /// The offset one past the end of this range, i.e. where the next range
    /// in file order begins.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}
