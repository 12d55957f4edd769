//! Restartable infinite sampler over dataset indices

/// Yields `0, 1, ..., len - 1` forever, wrapping transparently
///
/// An empty range yields nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclicSampler {
    len: usize,
    cursor: usize,
    passes: u64,
}

impl CyclicSampler {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            cursor: 0,
            passes: 0,
        }
    }

    /// Go back to index 0
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    /// Continue from `position`, wrapped into the range
    pub fn seek(&mut self, position: usize) {
        if self.len > 0 {
            self.cursor = position % self.len;
        }
    }

    /// Index the next call to `next` returns
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of completed passes over the range
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Iterator for CyclicSampler {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let index = self.cursor;
        self.cursor += 1;
        if self.cursor == self.len {
            self.cursor = 0;
            self.passes += 1;
        }
        Some(index)
    }
}
