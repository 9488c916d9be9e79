//! System configuration and hardware constants
//!
//! Compile-time constants for the beacon transmitter: clock rates, DAC
//! scaling, keying defaults and buffer sizes. Runtime-adjustable settings are
//! collected in [`ModemConfig`].

use crate::types::{BaudRate, FskShaping, ModulationMode, WordFormat};

/// Tone synthesizer interrupt rate
pub const SAMPLE_RATE_HZ: u32 = 62_500;

/// Frequency span of the full fine DAC range
pub const FINE_FULL_SCALE_HZ: u32 = 3_000;

/// Frequency span of the full coarse DAC range
pub const COARSE_FULL_SCALE_HZ: u32 = 30_000;

/// Default mark/space separation
pub const DEFAULT_SHIFT_HZ: u32 = 425;

/// Default fine channel word for the mark level
pub const DEFAULT_SHIFT: u16 = fine_word(DEFAULT_SHIFT_HZ);

/// Coarse channel word that puts the carrier on 434.630 MHz (bench trimmed)
pub const DEFAULT_CARRIER_WORD: u16 = 0x7C29;

/// Default symbol rate
pub const DEFAULT_BAUD: BaudRate = BaudRate::Baud50;

/// AFSK phase step for the mark tone (750 Hz)
pub const DEFAULT_MARK_STEP: u8 = 3;

/// AFSK phase step for the space tone (500 Hz)
pub const DEFAULT_SPACE_STEP: u8 = 2;

/// Largest encoded binary frame, in bytes
pub const PAYLOAD_CAPACITY: usize = 300;

/// Size of the buffer the telemetry serializer stages into
pub const STAGING_CAPACITY: usize = 100;

/// DAC bus clock
///
/// A 3-byte write has to finish well inside one sample period.
pub const DAC_SPI_FREQUENCY_HZ: u32 = 8_000_000;

/// Bits clocked out per DAC command
pub const DAC_COMMAND_BITS: u32 = 24;

/// Hardware watchdog timeout
pub const WATCHDOG_TIMEOUT_MS: u32 = 8_000;

/// Power amplifier settle time after enable
pub const PA_SETTLE_MS: u32 = 100;

/// Dwell on each level of the chatter preamble
pub const CHATTER_DWELL_MS: u32 = 200;

/// Chatter rounds sent at startup
pub const STARTUP_CHATTER_ROUNDS: u8 = 5;

/// Convert a frequency offset into a fine channel word
#[must_use]
pub const fn fine_word(offset_hz: u32) -> u16 {
    let word = offset_hz as u64 * 0xFFFF / FINE_FULL_SCALE_HZ as u64;
    if word > 0xFFFF {
        0xFFFF
    } else {
        word as u16
    }
}

/// Runtime modem settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModemConfig {
    /// Symbol rate preset
    pub baud: BaudRate,
    /// Fine channel word for mark in FSK
    pub shift: u16,
    /// Coarse channel word written at startup
    pub carrier_word: u16,
    /// RTTY character format
    pub word_format: WordFormat,
    /// FSK or AFSK
    pub mode: ModulationMode,
    /// FSK transition strategy
    pub fsk_shaping: FskShaping,
    /// AFSK phase step for mark
    pub mark_step: u8,
    /// AFSK phase step for space
    pub space_step: u8,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            baud: DEFAULT_BAUD,
            shift: DEFAULT_SHIFT,
            carrier_word: DEFAULT_CARRIER_WORD,
            word_format: WordFormat::RTTY_8N2,
            mode: ModulationMode::Fsk,
            fsk_shaping: FskShaping::Instant,
            mark_step: DEFAULT_MARK_STEP,
            space_step: DEFAULT_SPACE_STEP,
        }
    }
}

/// Timer assignments on the flight board
pub mod timers {
    //! Hardware timer assignments

    /// Symbol scheduler timer
    pub const SYMBOL: u8 = 6;

    /// Tone synthesizer timer
    pub const SAMPLE: u8 = 7;
}

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// DAC chip select (active low)
    pub const DAC_CS: &str = "PA4";

    /// SPI1 clock
    pub const DAC_SCK: &str = "PA5";

    /// SPI1 data out
    pub const DAC_MOSI: &str = "PA7";

    /// Power amplifier enable
    pub const PA_EN: &str = "PB0";
}
