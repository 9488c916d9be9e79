//! Balloon Beacon Modem Library
//!
//! This library implements the radio modem of a high-altitude balloon
//! telemetry beacon. Framed telemetry is turned into a keyed carrier by two
//! periodic interrupts driving a dual SPI DAC that steers the transmitter.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    FOREGROUND (blocking)                     │
//! │  transmit_sentence  │  transmit_binary  │  set_fsk/set_afsk   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  INTERRUPT CONTEXTS                          │
//! │  Symbol scheduler (2x baud)  │  Tone synthesizer (62.5 kHz)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   HAL / DRIVER LAYER                         │
//! │  SPI DAC  │  PA enable  │  Timers  │  Watchdog                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **One owner for shared state**: the modem core is lent to the interrupts
//!   for a transmission and handed back on completion
//! - **Type-driven design**: modes, channels and word formats are enums
//! - **No unsafe in application code**: all unsafe isolated in the binary
//! - **Functional core, imperative shell**: framing and synthesis are pure and
//!   host-testable, hardware sits behind `embedded-hal` traits
//! - **Explicit error handling**: all fallible foreground operations return
//!   `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Must come first so the logging macros are visible to every module
mod fmt;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Symbol and sample timers and the independent watchdog on the STM32G474.
#[cfg(feature = "embedded")]
pub mod hal;

/// Peripheral Drivers
///
/// Transmitter DAC and power amplifier.
pub mod drivers;

/// Digital Signal Processing
///
/// Lookup tables, tone synthesis and the sentence checksum.
pub mod dsp;

/// Radio Modem
///
/// Framing, symbol scheduling and the blocking transmit API.
pub mod radio;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::drivers::dac::{Dac, DacError, FrequencyDac};
    pub use crate::drivers::power_amp::PowerAmp;
    pub use crate::radio::engine::{ModemCore, Watchdog};
    pub use crate::radio::modem::{Modem, ModemClocks};
    pub use crate::radio::payload::PayloadWriter;
    pub use crate::radio::scheduler::SymbolEvent;
    pub use crate::radio::shared::SharedModem;

    // Logging
    #[cfg(feature = "embedded")]
    pub use defmt::{debug, error, info, trace, warn};
}
