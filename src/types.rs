//! Shared types used across the modem
//!
//! Small domain enums that carry the modem's configuration and state
//! between the foreground API and the interrupt handlers.

use core::fmt;

/// Output channel of the dual transmitter DAC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DacChannel {
    /// Carrier centre frequency (about 30 kHz full scale)
    Coarse,
    /// Frequency offset used for keying (about 3 kHz full scale)
    Fine,
}

impl DacChannel {
    /// Channel id as used in the DAC command byte
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Coarse => 0,
            Self::Fine => 1,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for DacChannel {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Coarse => defmt::write!(f, "COARSE"),
            Self::Fine => defmt::write!(f, "FINE"),
        }
    }
}

/// How a symbol is put on the carrier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModulationMode {
    /// Fine channel switched directly between two levels
    #[default]
    Fsk,
    /// Two audio tones synthesized on the fine channel
    Afsk,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ModulationMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Fsk => defmt::write!(f, "FSK"),
            Self::Afsk => defmt::write!(f, "AFSK"),
        }
    }
}

/// How FSK moves the fine channel between mark and space
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FskShaping {
    /// Write the new level at the symbol boundary
    #[default]
    Instant,
    /// Walk the step-response table over several samples
    Ramp,
}

/// One of the two keying states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Binary 1 / idle / stop bit
    Mark,
    /// Binary 0 / start bit
    Space,
}

impl Tone {
    /// Tone carrying the given bit
    #[must_use]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            Self::Mark
        } else {
            Self::Space
        }
    }

    /// Bit carried by this tone
    #[must_use]
    pub const fn bit(self) -> bool {
        matches!(self, Self::Mark)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Tone {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Mark => defmt::write!(f, "MARK"),
            Self::Space => defmt::write!(f, "SPACE"),
        }
    }
}

/// Symbol rate preset
///
/// The symbol timer runs from a 15.625 kHz timebase and fires at twice the
/// symbol rate; the compare value is the timer's reload divisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BaudRate {
    /// About 50 baud
    #[default]
    Baud50,
    /// About 300 baud
    Baud300,
}

impl BaudRate {
    /// Timer input frequency after prescaling
    pub const TIMEBASE_HZ: u32 = 15_625;

    /// Compare (reload) value for the symbol timer
    #[must_use]
    pub const fn timer_compare(self) -> u8 {
        match self {
            Self::Baud50 => 156,
            Self::Baud300 => 25,
        }
    }

    /// Interrupt rate of the symbol timer in millihertz
    #[must_use]
    pub const fn interrupt_mhz(self) -> u32 {
        Self::TIMEBASE_HZ * 1000 / (self.timer_compare() as u32 + 1)
    }

    /// Effective symbol rate in millibaud (one symbol per two interrupts)
    #[must_use]
    pub const fn symbol_rate_mbaud(self) -> u32 {
        self.interrupt_mhz() / 2
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BaudRate {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Baud50 => defmt::write!(f, "50 baud"),
            Self::Baud300 => defmt::write!(f, "300 baud"),
        }
    }
}

/// RTTY data word width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataBits {
    /// 7-bit ASCII
    Seven,
    /// 8-bit
    Eight,
}

impl DataBits {
    /// Number of data bits
    #[must_use]
    pub const fn count(self) -> u8 {
        match self {
            Self::Seven => 7,
            Self::Eight => 8,
        }
    }
}

/// RTTY stop bit count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit
    One,
    /// Two stop bits
    Two,
}

impl StopBits {
    /// Number of stop bits
    #[must_use]
    pub const fn count(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Asynchronous character format for RTTY
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordFormat {
    /// Data bits per character
    pub data_bits: DataBits,
    /// Stop bits per character
    pub stop_bits: StopBits,
}

impl WordFormat {
    /// 8 data bits, no parity, 2 stop bits
    pub const RTTY_8N2: Self = Self::new(DataBits::Eight, StopBits::Two);
    /// 7 data bits, no parity, 2 stop bits
    pub const RTTY_7N2: Self = Self::new(DataBits::Seven, StopBits::Two);
    /// 8 data bits, no parity, 1 stop bit
    pub const RTTY_8N1: Self = Self::new(DataBits::Eight, StopBits::One);
    /// 7 data bits, no parity, 1 stop bit
    pub const RTTY_7N1: Self = Self::new(DataBits::Seven, StopBits::One);

    /// Create a word format
    #[must_use]
    pub const fn new(data_bits: DataBits, stop_bits: StopBits) -> Self {
        Self {
            data_bits,
            stop_bits,
        }
    }

    /// Symbols per character, start bit included
    #[must_use]
    pub const fn frame_len(self) -> u8 {
        1 + self.data_bits.count() + self.stop_bits.count()
    }
}

impl Default for WordFormat {
    fn default() -> Self {
        Self::RTTY_8N2
    }
}

impl fmt::Display for WordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}N{}", self.data_bits.count(), self.stop_bits.count())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for WordFormat {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}N{}", self.data_bits.count(), self.stop_bits.count());
    }
}

/// What the symbol scheduler is currently doing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransmissionState {
    /// Nothing loaded
    #[default]
    Idle,
    /// Sending one RTTY character
    RttyFraming,
    /// Sending a raw bit stream
    BinaryFraming,
    /// Frame exhausted, waiting for the foreground to notice
    Complete,
}

#[cfg(feature = "embedded")]
impl defmt::Format for TransmissionState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "IDLE"),
            Self::RttyFraming => defmt::write!(f, "RTTY"),
            Self::BinaryFraming => defmt::write!(f, "BINARY"),
            Self::Complete => defmt::write!(f, "COMPLETE"),
        }
    }
}

/// Errors reported by the foreground modem API
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModemError {
    /// Payload does not fit the frame buffer
    PayloadTooLarge {
        /// Bytes offered
        len: usize,
        /// Bytes the buffer holds
        capacity: usize,
    },
    /// More bits requested than the buffer holds
    BitCountExceedsBuffer {
        /// Bits requested
        bit_count: usize,
        /// Bits available in the buffer
        available: usize,
    },
    /// A staging write would overflow the payload buffer
    PayloadOverflow {
        /// Bytes already staged
        len: usize,
        /// Bytes the write tried to add
        requested: usize,
    },
    /// The DAC transaction failed on the bus
    Dac,
    /// The modem core is lent to the interrupt side and was not returned
    CoreUnavailable,
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge { len, capacity } => {
                write!(f, "payload of {len} bytes exceeds {capacity} byte frame buffer")
            }
            Self::BitCountExceedsBuffer {
                bit_count,
                available,
            } => write!(f, "{bit_count} bits requested but buffer holds {available}"),
            Self::PayloadOverflow { len, requested } => {
                write!(f, "staging {requested} more bytes after {len} overflows buffer")
            }
            Self::Dac => write!(f, "DAC bus transaction failed"),
            Self::CoreUnavailable => write!(f, "modem core is not available"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ModemError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::PayloadTooLarge { len, capacity } => {
                defmt::write!(f, "PayloadTooLarge({}/{})", len, capacity);
            }
            Self::BitCountExceedsBuffer {
                bit_count,
                available,
            } => defmt::write!(f, "BitCountExceedsBuffer({}/{})", bit_count, available),
            Self::PayloadOverflow { len, requested } => {
                defmt::write!(f, "PayloadOverflow({}+{})", len, requested);
            }
            Self::Dac => defmt::write!(f, "Dac"),
            Self::CoreUnavailable => defmt::write!(f, "CoreUnavailable"),
        }
    }
}
