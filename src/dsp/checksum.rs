//! Sentence Checksum
//!
//! CRC16 over a telemetry sentence, compatible with the UKHAS habitat
//! parser: polynomial 0x1021 seeded with 0xFFFF, MSB first, no final XOR
//! (the XMODEM update loop with an all-ones seed). The checksummed text
//! starts after the first `$`; any later `$` is skipped as well.

use core::fmt::Write;

use crc::{Crc, CRC_16_IBM_3740};
use heapless::String;

/// CRC16/XMODEM update rule seeded with 0xFFFF
pub static SENTENCE_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Sentence delimiter excluded from the checksum
pub const DELIMITER: u8 = b'$';

/// Length of the `*XXXX\n` suffix
pub const SUFFIX_LEN: usize = 6;

/// Checksum a sentence
///
/// Everything up to and including the first `$` is left out, as is every
/// later `$`. Text without any `$` is checksummed whole.
#[must_use]
pub fn sentence_checksum(sentence: &[u8]) -> u16 {
    let body = sentence
        .iter()
        .position(|&b| b == DELIMITER)
        .map_or(sentence, |first| &sentence[first + 1..]);

    let mut digest = SENTENCE_CRC.digest();
    for &byte in body.iter().filter(|&&b| b != DELIMITER) {
        digest.update(&[byte]);
    }
    digest.finalize()
}

/// Format the `*XXXX\n` checksum suffix
#[must_use]
pub fn checksum_suffix(checksum: u16) -> String<SUFFIX_LEN> {
    let mut suffix = String::new();
    // Six characters always fit the buffer
    let _ = write!(suffix, "*{checksum:04X}\n");
    suffix
}
