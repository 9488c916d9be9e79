//! Host fakes shared by the integration tests
//!
//! Recording implementations of the `embedded-hal` traits and of the modem's
//! own seams, plus a clock backend that runs the interrupt entry points from
//! inside the foreground busy-wait.

#![allow(dead_code)]

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use beacon_modem::drivers::dac::FrequencyDac;
use beacon_modem::radio::engine::Watchdog;
use beacon_modem::radio::modem::ModemClocks;
use beacon_modem::radio::scheduler::SymbolEvent;
use beacon_modem::radio::shared::SharedModem;
use beacon_modem::types::DacChannel;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiBus};

// ============================================================================
// SPI bus and chip select
// ============================================================================

/// Activity seen on the DAC bus, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusEvent {
    CsLow,
    CsHigh,
    Byte(u8),
    Flush,
}

pub type BusLog = Rc<RefCell<Vec<BusEvent>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FakeSpiError;

impl spi::Error for FakeSpiError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// SPI bus that logs every byte; can be told to fail
pub struct RecordingSpi {
    pub log: BusLog,
    pub fail: bool,
}

impl RecordingSpi {
    pub fn new(log: &BusLog) -> Self {
        Self {
            log: Rc::clone(log),
            fail: false,
        }
    }
}

impl spi::ErrorType for RecordingSpi {
    type Error = FakeSpiError;
}

impl SpiBus for RecordingSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        if self.fail {
            return Err(FakeSpiError);
        }
        let mut log = self.log.borrow_mut();
        log.extend(words.iter().map(|&b| BusEvent::Byte(b)));
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        read.fill(0);
        self.write(write)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        self.write(&words.to_vec())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(BusEvent::Flush);
        Ok(())
    }
}

/// Chip select line that logs its edges
pub struct RecordingPin {
    pub log: BusLog,
}

impl RecordingPin {
    pub fn new(log: &BusLog) -> Self {
        Self {
            log: Rc::clone(log),
        }
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(BusEvent::CsLow);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push(BusEvent::CsHigh);
        Ok(())
    }
}

/// Plain output pin that remembers its level
#[derive(Default)]
pub struct LevelPin {
    pub high: bool,
}

impl digital::ErrorType for LevelPin {
    type Error = Infallible;
}

impl OutputPin for LevelPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

// ============================================================================
// Modem seams
// ============================================================================

/// Operation seen by the DAC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DacOp {
    Write(DacChannel, u16),
    PowerOff,
}

/// DAC that records every operation
#[derive(Default)]
pub struct RecordingDac {
    pub ops: Vec<DacOp>,
    pub fail: bool,
}

impl RecordingDac {
    /// Values written to the fine channel, in order
    pub fn fine_writes(&self) -> Vec<u16> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DacOp::Write(DacChannel::Fine, v) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

impl FrequencyDac for RecordingDac {
    type Error = ();

    fn write(&mut self, channel: DacChannel, value: u16) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.ops.push(DacOp::Write(channel, value));
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.ops.push(DacOp::PowerOff);
        Ok(())
    }
}

/// Watchdog that counts feeds
#[derive(Default)]
pub struct CountingWatchdog {
    pub feeds: u32,
}

impl Watchdog for CountingWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

/// Delay that only adds up the requested time
#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
    }
}

// ============================================================================
// Simulated clocks
// ============================================================================

pub type TestShared = SharedModem<RecordingDac, CountingWatchdog>;

/// Clock backend that plays the interrupt handlers during the busy-wait
///
/// Every `idle` call is one symbol timer period: the sample handler runs
/// `samples_per_symbol_tick` times (when its clock is on), then the symbol
/// handler runs once. Like the firmware glue, the symbol clock stops itself
/// on completion.
pub struct SimClocks<'a> {
    shared: &'a TestShared,
    pub divisor: u8,
    pub symbol_running: bool,
    pub sample_running: bool,
    pub samples_per_symbol_tick: usize,
    pub events: Vec<SymbolEvent>,
    pub sample_ticks: usize,
    pub sample_clock_starts: usize,
    pub symbol_clock_stops: usize,
    idle_calls: usize,
}

/// Idle calls after which a transmission is considered hung
const HANG_LIMIT: usize = 1_000_000;

impl<'a> SimClocks<'a> {
    pub fn new(shared: &'a TestShared, samples_per_symbol_tick: usize) -> Self {
        Self {
            shared,
            divisor: 0,
            symbol_running: false,
            sample_running: false,
            samples_per_symbol_tick,
            events: Vec::new(),
            sample_ticks: 0,
            sample_clock_starts: 0,
            symbol_clock_stops: 0,
            idle_calls: 0,
        }
    }

    /// Symbols emitted so far
    pub fn symbols(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SymbolEvent::Symbol { tone, .. } => Some(tone.bit()),
                _ => None,
            })
            .collect()
    }
}

impl ModemClocks for SimClocks<'_> {
    fn set_symbol_divisor(&mut self, compare: u8) {
        self.divisor = compare;
    }

    fn start_symbol_clock(&mut self) {
        self.symbol_running = true;
    }

    fn stop_symbol_clock(&mut self) {
        self.symbol_running = false;
        self.symbol_clock_stops += 1;
    }

    fn start_sample_clock(&mut self) {
        self.sample_running = true;
        self.sample_clock_starts += 1;
    }

    fn stop_sample_clock(&mut self) {
        self.sample_running = false;
    }

    fn idle(&mut self) {
        self.idle_calls += 1;
        assert!(self.idle_calls < HANG_LIMIT, "transmission never completed");

        if self.sample_running {
            for _ in 0..self.samples_per_symbol_tick {
                self.shared.on_sample_interrupt();
                self.sample_ticks += 1;
            }
        }
        if self.symbol_running {
            let event = self.shared.on_symbol_interrupt();
            self.events.push(event);
            if event == SymbolEvent::Complete {
                self.symbol_running = false;
            }
        }
    }
}

// ============================================================================
// RTTY receiver model
// ============================================================================

/// Decode a symbol stream of 8N2 characters back into bytes
///
/// Panics on a framing error, which is what the tests want to catch.
pub fn decode_8n2(symbols: &[bool]) -> Vec<u8> {
    assert_eq!(symbols.len() % 11, 0, "partial character on the air");
    symbols
        .chunks(11)
        .map(|frame| {
            assert!(!frame[0], "missing start bit");
            assert!(frame[9] && frame[10], "missing stop bits");
            frame[1..9]
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | (u8::from(bit) << i))
        })
        .collect()
}
