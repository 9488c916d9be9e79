//! Power Amplifier Control
//!
//! The transmitter's PA is switched by a single enable line. It needs a
//! short settle time after power-up before the carrier is usable.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::PA_SETTLE_MS;

/// Power amplifier enable line
pub struct PowerAmp<P> {
    pin: P,
    enabled: bool,
}

impl<P: OutputPin> PowerAmp<P> {
    /// Wrap the enable pin; the PA is assumed off
    #[must_use]
    pub fn new(pin: P) -> Self {
        Self { pin, enabled: false }
    }

    /// Power the amplifier and wait for it to settle
    pub fn enable<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), P::Error> {
        self.pin.set_high()?;
        delay.delay_ms(PA_SETTLE_MS);
        self.enabled = true;
        info!("PA enabled");
        Ok(())
    }

    /// Shut the amplifier down
    pub fn disable(&mut self) -> Result<(), P::Error> {
        self.pin.set_low()?;
        self.enabled = false;
        info!("PA disabled");
        Ok(())
    }

    /// Whether the amplifier is powered
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Give back the enable pin
    pub fn release(self) -> P {
        self.pin
    }
}
