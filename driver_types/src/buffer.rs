//! Bounded response buffers
//!
//! A buffer shared with a driver must keep its size for the whole time the
//! grant is active, because the driver-side grant records the region length
//! once at establishment. `BoundedBuffer` therefore exposes no growth API at
//! all: the capacity chosen at allocation is the capacity for the buffer's
//! entire life.

use alloc::vec::Vec;
use core::fmt;

/// Fixed-capacity, zero-initialized byte buffer
///
/// Allocation failure is reported, not aborted on, so callers can unwind
/// an in-progress operation cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedBuffer {
    bytes: Vec<u8>,
}

impl BoundedBuffer {
    /// Allocates a zero-filled buffer of exactly `capacity` bytes
    ///
    /// Returns `None` if the allocator cannot satisfy the request.
    pub fn try_allocate(capacity: usize) -> Option<Self> {
        let mut bytes = Vec::new();
        if bytes.try_reserve_exact(capacity).is_err() {
            return None;
        }
        bytes.resize(capacity, 0);
        Some(Self { bytes })
    }

    /// Returns the fixed capacity in bytes
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the buffer contents
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the buffer contents mutably
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Copies `src` into the buffer starting at `offset`, clamped to
    /// capacity
    ///
    /// Returns the number of bytes actually written. Writes past the end
    /// are silently truncated; the driver-facing contract is "at most
    /// capacity", never a fault.
    pub fn write_at(&mut self, offset: usize, src: &[u8]) -> usize {
        if offset >= self.bytes.len() {
            return 0;
        }
        let writable = self.bytes.len() - offset;
        let count = core::cmp::min(src.len(), writable);
        self.bytes[offset..offset + count].copy_from_slice(&src[..count]);
        count
    }

    /// Consumes the buffer, keeping at most `length` bytes
    ///
    /// `length` is the driver-reported response length and may exceed the
    /// capacity; the result is clamped so the caller never observes more
    /// than `capacity` bytes.
    pub fn into_response(mut self, length: usize) -> Vec<u8> {
        let keep = core::cmp::min(length, self.bytes.len());
        self.bytes.truncate(keep);
        self.bytes
    }
}

impl fmt::Display for BoundedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer[{}]", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_zero_filled() {
        let buffer = BoundedBuffer::try_allocate(16).unwrap();
        assert_eq!(buffer.capacity(), 16);
        assert!(buffer.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_capacity() {
        let buffer = BoundedBuffer::try_allocate(0).unwrap();
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.into_response(10).is_empty());
    }

    #[test]
    fn test_write_at_within_capacity() {
        let mut buffer = BoundedBuffer::try_allocate(8).unwrap();
        let written = buffer.write_at(0, b"hello");
        assert_eq!(written, 5);
        assert_eq!(&buffer.as_slice()[..5], b"hello");
        assert_eq!(&buffer.as_slice()[5..], &[0, 0, 0]);
    }

    #[test]
    fn test_write_at_clamps_to_capacity() {
        let mut buffer = BoundedBuffer::try_allocate(4).unwrap();
        let written = buffer.write_at(0, b"overflowing");
        assert_eq!(written, 4);
        assert_eq!(buffer.as_slice(), b"over");
    }

    #[test]
    fn test_write_at_past_end_writes_nothing() {
        let mut buffer = BoundedBuffer::try_allocate(4).unwrap();
        assert_eq!(buffer.write_at(4, b"x"), 0);
        assert_eq!(buffer.write_at(100, b"x"), 0);
    }

    #[test]
    fn test_into_response_truncates_to_reported_length() {
        let mut buffer = BoundedBuffer::try_allocate(8).unwrap();
        buffer.write_at(0, b"hello");
        assert_eq!(buffer.into_response(5), b"hello");
    }

    #[test]
    fn test_into_response_clamps_to_capacity() {
        let mut buffer = BoundedBuffer::try_allocate(4).unwrap();
        buffer.write_at(0, b"hunk");
        // Driver claims more than fits; the caller sees at most capacity.
        assert_eq!(buffer.into_response(1000), b"hunk");
    }
}
