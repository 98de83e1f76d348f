//! Per-worker pool of synthetic payload bytes.
//!
//! # Responsibilities
//! - Generate a fixed buffer of random printable bytes at worker startup
//! - Serve zero-copy slices of that buffer to response generators
//!
//! # Design Decisions
//! - Immutable after construction and owned per worker, so no synchronization
//! - Payloads larger than the pool re-use it chunk by chunk instead of
//!   allocating per request

use axum::body::Bytes;

/// Default pool (and default `/data` response) length in bytes.
pub const DEFAULT_POOL_LENGTH: usize = 1024;

// Printable ASCII range, inclusive.
const PRINTABLE_MIN: u8 = 33;
const PRINTABLE_MAX: u8 = 126;

/// Fixed buffer of random printable bytes; every synthetic payload is sliced
/// out of it.
#[derive(Debug, Clone)]
pub struct ContentPool {
    bytes: Bytes,
}

impl ContentPool {
    /// Generate a pool of [`DEFAULT_POOL_LENGTH`] random printable bytes.
    pub fn generate() -> Self {
        Self::with_length(DEFAULT_POOL_LENGTH)
    }

    pub fn with_length(length: usize) -> Self {
        let buf: Vec<u8> = (0..length)
            .map(|_| fastrand::u8(PRINTABLE_MIN..=PRINTABLE_MAX))
            .collect();
        Self {
            bytes: Bytes::from(buf),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Zero-copy view of `length` bytes starting at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + length` exceeds the pool length.
    pub fn slice(&self, offset: usize, length: usize) -> Bytes {
        self.bytes.slice(offset..offset + length)
    }
}
