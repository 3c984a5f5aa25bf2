//! Fixed-capacity response buffer

/// Owned buffer with a fixed capacity and a running length. Reads go into
/// [`ResponseBuffer::spare_mut`], so the length can never pass the capacity.
#[derive(Debug, Clone)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    len: usize,
}

impl ResponseBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// Unfilled tail of the buffer
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    /// Up to `max` bytes of the unfilled tail
    pub fn spare_up_to(&mut self, max: usize) -> &mut [u8] {
        let end = self.data.len().min(self.len + max);
        &mut self.data[self.len..end]
    }

    /// Mark `n` more bytes as filled; clamped to the capacity
    pub fn advance(&mut self, n: usize) {
        self.len = (self.len + n).min(self.data.len());
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.data.truncate(self.len);
        self.data
    }
}
