//! Frame Producers
//!
//! Bit sources pulled one symbol at a time by the scheduler. Both are plain
//! iterators over `bool` (true = mark) so they can be checked on the host
//! without any timing involved.

use heapless::Vec;

use crate::config::PAYLOAD_CAPACITY;
use crate::types::{ModemError, WordFormat};

/// One RTTY character: start bit, data bits LSB first, stop bits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RttyFramer {
    byte: u8,
    format: WordFormat,
    /// Next frame position to emit
    position: u8,
}

impl RttyFramer {
    /// Frame a character
    #[must_use]
    pub const fn new(byte: u8, format: WordFormat) -> Self {
        Self {
            byte,
            format,
            position: 0,
        }
    }

    /// Character being framed
    #[must_use]
    pub const fn byte(&self) -> u8 {
        self.byte
    }

    /// Next frame position
    #[must_use]
    pub const fn position(&self) -> u8 {
        self.position
    }

    /// Whether every symbol of the frame has been emitted
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.position >= self.format.frame_len()
    }

    /// Symbol at a frame position
    const fn bit_at(&self, position: u8) -> bool {
        let data_bits = self.format.data_bits.count();
        if position == 0 {
            false
        } else if position <= data_bits {
            (self.byte >> (position - 1)) & 1 == 1
        } else {
            true
        }
    }
}

impl Iterator for RttyFramer {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.is_exhausted() {
            return None;
        }
        let bit = self.bit_at(self.position);
        self.position += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::from(self.format.frame_len().saturating_sub(self.position));
        (left, Some(left))
    }
}

impl ExactSizeIterator for RttyFramer {}

/// Raw bit stream from a pre-encoded buffer, MSB first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryFramer {
    buffer: Vec<u8, PAYLOAD_CAPACITY>,
    /// Byte currently being shifted out
    index: usize,
    /// Bit of the current byte to send next
    mask: u8,
    /// Bits left to send
    remaining: usize,
}

impl BinaryFramer {
    /// Copy a payload into a frame of exactly `bit_count` bits
    pub fn new(payload: &[u8], bit_count: usize) -> Result<Self, ModemError> {
        let buffer = Vec::from_slice(payload).map_err(|()| ModemError::PayloadTooLarge {
            len: payload.len(),
            capacity: PAYLOAD_CAPACITY,
        })?;
        let available = payload.len() * 8;
        if bit_count > available {
            return Err(ModemError::BitCountExceedsBuffer {
                bit_count,
                available,
            });
        }
        Ok(Self {
            buffer,
            index: 0,
            mask: 0x80,
            remaining: bit_count,
        })
    }

    /// Bits left to send
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether the last `next` call finished a byte
    #[must_use]
    pub const fn at_byte_boundary(&self) -> bool {
        self.mask == 0x80
    }
}

impl Iterator for BinaryFramer {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.buffer[self.index] & self.mask != 0;
        self.remaining -= 1;
        self.mask >>= 1;
        if self.mask == 0 {
            self.index += 1;
            self.mask = 0x80;
        }
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BinaryFramer {}
