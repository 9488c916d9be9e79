//! Peripheral Drivers
//!
//! Drivers for the transmitter's external parts, written against the
//! `embedded-hal` traits so they run on the flight board and on the host.

pub mod dac;
pub mod power_amp;
