//! Symbol Scheduler
//!
//! Runs from the symbol timer interrupt, which fires at twice the symbol
//! rate. A one-bit prescaler lets every other interrupt through, and each
//! effective tick pulls exactly one bit from the active frame.

use crate::radio::framer::{BinaryFramer, RttyFramer};
use crate::types::{Tone, TransmissionState, WordFormat};

/// Result of one symbol timer interrupt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolEvent {
    /// No frame loaded; the interrupt should not be running
    Idle,
    /// Prescaler half-tick, nothing emitted
    Held,
    /// A new symbol starts now
    Symbol {
        /// Tone to key
        tone: Tone,
        /// A byte boundary was crossed in a long frame
        feed_watchdog: bool,
    },
    /// Frame exhausted; stop the symbol timer
    Complete,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SymbolEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Held => defmt::write!(f, "Held"),
            Self::Symbol { tone, .. } => defmt::write!(f, "Symbol({})", tone),
            Self::Complete => defmt::write!(f, "Complete"),
        }
    }
}

/// Frame currently being clocked out
#[derive(Clone, Debug, Default)]
enum Frame {
    #[default]
    Idle,
    Rtty(RttyFramer),
    Binary(BinaryFramer),
    Complete,
}

/// Symbol-rate state machine
#[derive(Clone, Debug, Default)]
pub struct SymbolScheduler {
    frame: Frame,
    /// Set on the interrupt that is skipped
    half_tick: bool,
}

impl SymbolScheduler {
    /// Create an idle scheduler
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frame: Frame::Idle,
            half_tick: false,
        }
    }

    /// Current transmission state
    #[must_use]
    pub const fn state(&self) -> TransmissionState {
        match self.frame {
            Frame::Idle => TransmissionState::Idle,
            Frame::Rtty(_) => TransmissionState::RttyFraming,
            Frame::Binary(_) => TransmissionState::BinaryFraming,
            Frame::Complete => TransmissionState::Complete,
        }
    }

    /// Load one RTTY character
    pub fn load_rtty(&mut self, byte: u8, format: WordFormat) {
        self.frame = Frame::Rtty(RttyFramer::new(byte, format));
        self.half_tick = false;
    }

    /// Load a binary frame
    pub fn load_binary(&mut self, framer: BinaryFramer) {
        self.frame = Frame::Binary(framer);
        self.half_tick = false;
    }

    /// Return to idle after the foreground has seen completion
    pub fn acknowledge(&mut self) {
        if matches!(self.frame, Frame::Complete) {
            self.frame = Frame::Idle;
        }
    }

    /// Bits left in a binary frame
    #[must_use]
    pub fn remaining_bits(&self) -> Option<usize> {
        match &self.frame {
            Frame::Binary(framer) => Some(framer.remaining()),
            _ => None,
        }
    }

    /// Handle one symbol timer interrupt
    pub fn on_interrupt(&mut self) -> SymbolEvent {
        if matches!(self.frame, Frame::Idle | Frame::Complete) {
            return SymbolEvent::Idle;
        }

        if !self.half_tick {
            self.half_tick = true;
            return SymbolEvent::Held;
        }
        self.half_tick = false;

        let next = match &mut self.frame {
            Frame::Rtty(framer) => framer.next().map(|bit| (bit, false)),
            Frame::Binary(framer) => framer
                .next()
                .map(|bit| (bit, framer.at_byte_boundary())),
            Frame::Idle | Frame::Complete => None,
        };

        match next {
            Some((bit, feed_watchdog)) => SymbolEvent::Symbol {
                tone: Tone::from_bit(bit),
                feed_watchdog,
            },
            None => {
                self.frame = Frame::Complete;
                SymbolEvent::Complete
            }
        }
    }
}
