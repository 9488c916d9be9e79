//! Radio Modem
//!
//! The symbol-rate side of the transmitter and the foreground API that
//! drives it:
//! - RTTY and binary frame producers
//! - Interrupt-driven symbol scheduler
//! - Modem core and its hand-off to the interrupt handlers
//! - Blocking transmit calls and mode control

pub mod framer;
pub mod scheduler;
pub mod engine;
pub mod shared;
pub mod modem;
pub mod payload;
