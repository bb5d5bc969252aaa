use crate::constants::DEFAULT_CHUNK_SIZE;
use std::collections::VecDeque;

/// Splits arbitrary-length audio into fixed-size outbound chunks.
///
/// Bytes are accumulated until at least one full chunk is available. Full
/// chunks are emitted in input order; anything shorter stays buffered until
/// more data arrives or [`flush`](Self::flush) is called.
///
/// Concatenating every chunk returned by [`push`](Self::push) followed by the
/// final [`flush`](Self::flush) always reproduces the concatenated input.
#[derive(Debug)]
pub struct ChunkScheduler {
    chunk_size: usize,
    buffer: Vec<u8>,
}

/// Chunks produced by a single [`ChunkScheduler::push`] call.
pub struct ChunkIterator {
    queue: VecDeque<Vec<u8>>,
}

impl Iterator for ChunkIterator {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.queue.len(), Some(self.queue.len()))
    }
}

impl ExactSizeIterator for ChunkIterator {}

impl Default for ChunkScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ChunkScheduler {
    /// Creates a scheduler emitting chunks of `chunk_size` bytes.
    ///
    /// A `chunk_size` of zero is treated as one byte.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            buffer: Vec::with_capacity(chunk_size.max(1)),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of bytes waiting for a full chunk.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Accepts some bytes, returns zero or more full chunks (ready to send).
    /// Buffers any leftover partial chunk internally.
    pub fn push(&mut self, data: &[u8]) -> ChunkIterator {
        self.buffer.extend_from_slice(data);

        let full = self.buffer.len() - self.buffer.len() % self.chunk_size;
        let queue: VecDeque<Vec<u8>> = self.buffer[..full]
            .chunks_exact(self.chunk_size)
            .map(<[u8]>::to_vec)
            .collect();
        self.buffer.drain(..full);

        // Keep a single large push from pinning its allocation.
        if self.buffer.capacity() > self.chunk_size * 4 {
            self.buffer.shrink_to(self.chunk_size);
        }

        ChunkIterator { queue }
    }

    /// Returns the remaining buffered bytes as a final, possibly short or
    /// empty, chunk and resets the accumulator.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}
