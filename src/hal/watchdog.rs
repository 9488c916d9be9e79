//! Independent Watchdog
//!
//! The IWDG is the beacon's only recovery path: a hung bus or a stalled
//! transmission ends in a full reset.

use embassy_stm32::peripherals::IWDG;
use embassy_stm32::wdg::IndependentWatchdog;

use crate::config::WATCHDOG_TIMEOUT_MS;
use crate::radio::engine::Watchdog;

/// Running independent watchdog
pub struct BeaconWatchdog<'d> {
    wdg: IndependentWatchdog<'d, IWDG>,
}

impl<'d> BeaconWatchdog<'d> {
    /// Start the watchdog with the configured timeout
    #[must_use]
    pub fn start(mut wdg: IndependentWatchdog<'d, IWDG>) -> Self {
        wdg.unleash();
        info!("watchdog armed, {} ms", WATCHDOG_TIMEOUT_MS);
        Self { wdg }
    }
}

impl Watchdog for BeaconWatchdog<'_> {
    fn feed(&mut self) {
        self.wdg.pet();
    }
}
