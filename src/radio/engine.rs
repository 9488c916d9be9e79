//! Modem Core
//!
//! Everything the two interrupt handlers touch, in one owned value: the
//! symbol scheduler, the tone synthesizer, the DAC and the watchdog. The
//! foreground owns it while idle and lends it out for a transmission.

use crate::config::ModemConfig;
use crate::drivers::dac::FrequencyDac;
use crate::dsp::synth::ToneSynthesizer;
use crate::radio::scheduler::{SymbolEvent, SymbolScheduler};
use crate::types::{DacChannel, ModemError, TransmissionState};

/// Hardware watchdog that must be fed during long transmissions
pub trait Watchdog {
    /// Restart the watchdog countdown
    fn feed(&mut self);
}

/// Interrupt-side modem state
pub struct ModemCore<D, W> {
    dac: D,
    watchdog: W,
    scheduler: SymbolScheduler,
    synth: ToneSynthesizer,
    /// DAC writes dropped in interrupt context
    dac_faults: u32,
}

impl<D, W> ModemCore<D, W>
where
    D: FrequencyDac,
    W: Watchdog,
{
    /// Assemble a core from its peripherals
    #[must_use]
    pub fn new(dac: D, watchdog: W, config: &ModemConfig) -> Self {
        Self {
            dac,
            watchdog,
            scheduler: SymbolScheduler::new(),
            synth: ToneSynthesizer::new(config),
            dac_faults: 0,
        }
    }

    /// Symbol timer interrupt body
    pub fn on_symbol_tick(&mut self) -> SymbolEvent {
        let event = self.scheduler.on_interrupt();
        if let SymbolEvent::Symbol {
            tone,
            feed_watchdog,
        } = event
        {
            if let Some(word) = self.synth.select(tone) {
                self.write_fine(word);
            }
            if feed_watchdog {
                self.watchdog.feed();
            }
        }
        event
    }

    /// Sample timer interrupt body
    pub fn on_sample_tick(&mut self) {
        if let Some(word) = self.synth.render() {
            self.write_fine(word);
        }
    }

    /// Write a channel from the foreground
    pub fn write(&mut self, channel: DacChannel, value: u16) -> Result<(), ModemError> {
        self.dac.write(channel, value).map_err(|_| ModemError::Dac)?;
        if channel == DacChannel::Fine {
            self.synth.note_level(value);
        }
        Ok(())
    }

    /// Power the DAC down
    pub fn power_off(&mut self) -> Result<(), ModemError> {
        self.dac.power_off().map_err(|_| ModemError::Dac)
    }

    /// Feed the watchdog
    pub fn feed_watchdog(&mut self) {
        self.watchdog.feed();
    }

    /// Current transmission state
    #[must_use]
    pub const fn state(&self) -> TransmissionState {
        self.scheduler.state()
    }

    /// Symbol scheduler
    #[must_use]
    pub const fn scheduler(&self) -> &SymbolScheduler {
        &self.scheduler
    }

    /// Symbol scheduler, mutable
    pub fn scheduler_mut(&mut self) -> &mut SymbolScheduler {
        &mut self.scheduler
    }

    /// Tone synthesizer
    #[must_use]
    pub const fn synth(&self) -> &ToneSynthesizer {
        &self.synth
    }

    /// Tone synthesizer, mutable
    pub fn synth_mut(&mut self) -> &mut ToneSynthesizer {
        &mut self.synth
    }

    /// DAC driver
    #[must_use]
    pub const fn dac(&self) -> &D {
        &self.dac
    }

    /// Watchdog
    #[must_use]
    pub const fn watchdog(&self) -> &W {
        &self.watchdog
    }

    /// Interrupt-context DAC writes that failed
    #[must_use]
    pub const fn dac_faults(&self) -> u32 {
        self.dac_faults
    }

    /// Take the peripherals back
    pub fn into_parts(self) -> (D, W) {
        (self.dac, self.watchdog)
    }

    fn write_fine(&mut self, word: u16) {
        if self.dac.write(DacChannel::Fine, word).is_err() {
            self.dac_faults = self.dac_faults.wrapping_add(1);
            warn!("fine DAC write failed ({} total)", self.dac_faults);
        }
    }
}
