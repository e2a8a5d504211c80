//! Per-transfer state
//!
//! A transfer walks an [`AddressRange`] one byte at a time. The bridge keeps
//! its own address cursor: only the first packet carries the address, every
//! later packet implicitly targets the next one. [`TransferState`] tracks
//! that cursor so the initial packet is sent exactly once, accumulates the
//! running checksum and groups bytes into fixed size chunks for display.

use crate::checksum::{Checksum, Digest};
use crate::protocol::Addressing;
use crate::range::AddressRange;

/// Size of the display chunks handed to the progress observer
pub const CHUNK_SIZE: usize = 16;

/// A block of consecutive bytes and the address of the first one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    address: u32,
    data: [u8; CHUNK_SIZE],
    len: usize,
}

impl Chunk {
    fn new(address: u32) -> Self {
        Self {
            address,
            data: [0; CHUNK_SIZE],
            len: 0,
        }
    }

    /// Address of the first byte
    pub fn address(&self) -> u32 {
        self.address
    }

    /// The bytes in this chunk
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    fn is_full(&self) -> bool {
        self.len == CHUNK_SIZE
    }
}

/// Mutable state of one read or write pass over a range
#[derive(Debug)]
pub struct TransferState {
    range: AddressRange,
    offset: usize,
    checksum: Checksum,
    chunk: Chunk,
}

impl TransferState {
    /// Start a transfer at the beginning of `range`
    pub fn new(range: AddressRange) -> Self {
        Self {
            range,
            offset: 0,
            checksum: Checksum::new(),
            chunk: Chunk::new(range.start()),
        }
    }

    /// Bytes completed so far
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total bytes in the transfer
    pub fn total(&self) -> usize {
        self.range.len()
    }

    /// Address of the next byte
    pub fn address(&self) -> u32 {
        self.range.address_at(self.offset)
    }

    /// Whether every byte of the range has been recorded
    pub fn is_complete(&self) -> bool {
        self.offset >= self.range.len()
    }

    /// Cursor handling for the next packet
    pub fn addressing(&self) -> Addressing {
        if self.offset == 0 {
            Addressing::Initial(self.range.start_u16())
        } else {
            Addressing::Repeat
        }
    }

    /// Record the byte at the current address and advance
    ///
    /// Returns a chunk when it fills up, or the final partial chunk once the
    /// range is complete.
    pub fn record(&mut self, byte: u8) -> Option<Chunk> {
        debug_assert!(!self.is_complete(), "recorded past end of range");

        self.checksum.update_byte(byte);
        self.chunk.data[self.chunk.len] = byte;
        self.chunk.len += 1;
        self.offset += 1;

        if self.chunk.is_full() || self.is_complete() {
            let full = self.chunk;
            self.chunk = Chunk::new(self.address());
            Some(full)
        } else {
            None
        }
    }

    /// Finish the transfer and return the checksum of every recorded byte
    pub fn finish(self) -> Digest {
        self.checksum.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_addressing_once() {
        let range = AddressRange::new(0x1234, 0x1237).unwrap();
        let mut state = TransferState::new(range);
        assert_eq!(state.addressing(), Addressing::Initial(0x1234));
        state.record(0);
        assert_eq!(state.addressing(), Addressing::Repeat);
        assert_eq!(state.address(), 0x1235);
        state.record(0);
        assert_eq!(state.addressing(), Addressing::Repeat);
    }

    #[test]
    fn test_chunks_shrink_at_end() {
        let range = AddressRange::new(0x0100, 0x0100 + 20).unwrap();
        let mut state = TransferState::new(range);
        let mut chunks = Vec::new();
        for i in 0..20u8 {
            if let Some(chunk) = state.record(i) {
                chunks.push(chunk);
            }
        }
        assert!(state.is_complete());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].address(), 0x0100);
        assert_eq!(chunks[0].as_slice(), &(0..16).collect::<Vec<u8>>()[..]);
        assert_eq!(chunks[1].address(), 0x0110);
        assert_eq!(chunks[1].as_slice(), &[16, 17, 18, 19]);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let range = AddressRange::new(0, 32).unwrap();
        let mut state = TransferState::new(range);
        let count = (0..32u8).filter_map(|b| state.record(b)).count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_checksum_independent_of_chunking() {
        let data: Vec<u8> = (0..37u8).collect();
        let range = AddressRange::new(0xFF00, 0xFF00 + data.len() as u32).unwrap();
        let mut state = TransferState::new(range);
        for &b in &data {
            state.record(b);
        }
        assert_eq!(state.offset(), data.len());
        assert_eq!(state.finish(), Digest::of(&data));
    }
}
