//! Response Aggregator: ordered concatenation of streamed chunks.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResponseAggregator {
    buffer: String,
    chunks: usize
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk in arrival order. Returns the chunk's 1-based
    /// sequence number.
    pub fn append(&mut self, chunk: &str) -> usize {
        self.buffer.push_str(chunk);
        self.chunks += 1;
        self.chunks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes the aggregator and returns the full text.
    pub fn finish(self) -> String {
        self.buffer
    }

    /// Drops accumulated text. Used when a session fails, since partial
    /// answers are never surfaced.
    pub fn discard(&mut self) {
        self.buffer.clear();
        self.chunks = 0;
    }
}
