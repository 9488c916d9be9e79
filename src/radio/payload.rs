//! Payload Staging
//!
//! Fixed-capacity byte buffer the telemetry serializer writes into before the
//! channel encoder runs. A write that does not fit is refused as a whole and
//! reported, so a truncated packet can never reach the air.

use heapless::Vec;

use crate::config::STAGING_CAPACITY;
use crate::types::ModemError;

/// Bounded staging buffer for an outgoing payload
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayloadWriter<const N: usize = STAGING_CAPACITY> {
    buffer: Vec<u8, N>,
}

impl<const N: usize> PayloadWriter<N> {
    /// Create an empty writer
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Append bytes, or refuse if they would not all fit
    pub fn write(&mut self, data: &[u8]) -> Result<usize, ModemError> {
        self.buffer
            .extend_from_slice(data)
            .map_err(|()| ModemError::PayloadOverflow {
                len: self.buffer.len(),
                requested: data.len(),
            })?;
        Ok(data.len())
    }

    /// Staged bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of staged bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been staged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes the writer can hold
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Discard staged bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
