//! Foreground Modem API
//!
//! Blocking transmit calls for RTTY sentences and binary frames. Each call
//! lends the [`ModemCore`] to the interrupt side, starts the clocks and spins
//! on the completion flag; the only way out of a stuck transmission is the
//! hardware watchdog.
//!
//! Because every call takes `&mut self` and blocks until the core is back,
//! mode and configuration changes can only happen while the modem is idle.

use embedded_hal::delay::DelayNs;

use crate::config::{ModemConfig, CHATTER_DWELL_MS};
use crate::drivers::dac::FrequencyDac;
use crate::dsp::checksum::{checksum_suffix, sentence_checksum};
use crate::radio::engine::{ModemCore, Watchdog};
use crate::radio::framer::BinaryFramer;
use crate::radio::scheduler::SymbolScheduler;
use crate::radio::shared::SharedModem;
use crate::types::{BaudRate, DacChannel, FskShaping, ModemError, ModulationMode, WordFormat};

/// Control over the two modem interrupt sources
pub trait ModemClocks {
    /// Program the symbol timer's compare value
    fn set_symbol_divisor(&mut self, compare: u8);

    /// Enable the symbol timer interrupt
    ///
    /// The interrupt handler disables it again when the scheduler reports
    /// completion.
    fn start_symbol_clock(&mut self);

    /// Disable the symbol timer interrupt
    ///
    /// Called once a frame has completed; must tolerate an already stopped
    /// timer.
    fn stop_symbol_clock(&mut self);

    /// Enable the sample timer interrupt
    fn start_sample_clock(&mut self);

    /// Disable the sample timer interrupt
    fn stop_sample_clock(&mut self);

    /// Body of the completion busy-wait
    fn idle(&mut self) {
        core::hint::spin_loop();
    }
}

/// Blocking modem front end
pub struct Modem<'a, D, W, C> {
    shared: &'a SharedModem<D, W>,
    /// Present whenever no transmission is running
    core: Option<ModemCore<D, W>>,
    clocks: C,
    config: ModemConfig,
}

impl<'a, D, W, C> Modem<'a, D, W, C>
where
    D: FrequencyDac,
    W: Watchdog,
    C: ModemClocks,
{
    /// Build a modem around its peripherals
    pub fn new(
        shared: &'a SharedModem<D, W>,
        dac: D,
        watchdog: W,
        mut clocks: C,
        config: ModemConfig,
    ) -> Self {
        clocks.set_symbol_divisor(config.baud.timer_compare());
        Self {
            shared,
            core: Some(ModemCore::new(dac, watchdog, &config)),
            clocks,
            config,
        }
    }

    /// Bring the transmitter to its idle carrier
    ///
    /// Powers the DAC down, writes the carrier word to the coarse channel and
    /// parks the fine channel at zero.
    pub fn start(&mut self) -> Result<(), ModemError> {
        let carrier = self.config.carrier_word;
        let core = self.core_mut()?;
        core.power_off()?;
        core.write(DacChannel::Coarse, carrier)?;
        core.write(DacChannel::Fine, 0)?;
        info!("modem started, carrier word {=u16:#x}", carrier);
        Ok(())
    }

    /// Power the DAC down
    pub fn shutdown(&mut self) -> Result<(), ModemError> {
        self.core_mut()?.power_off()
    }

    /// Switch to audio frequency-shift keying
    pub fn set_afsk(&mut self) -> Result<(), ModemError> {
        self.set_mode(ModulationMode::Afsk)
    }

    /// Switch to direct frequency-shift keying
    pub fn set_fsk(&mut self) -> Result<(), ModemError> {
        self.set_mode(ModulationMode::Fsk)
    }

    /// Select the modulation mode
    pub fn set_mode(&mut self, mode: ModulationMode) -> Result<(), ModemError> {
        self.core_mut()?.synth_mut().set_mode(mode);
        self.config.mode = mode;
        Ok(())
    }

    /// Current modulation mode
    #[must_use]
    pub const fn mode(&self) -> ModulationMode {
        self.config.mode
    }

    /// Set the fine channel word used for mark
    pub fn set_shift(&mut self, shift: u16) -> Result<(), ModemError> {
        self.core_mut()?.synth_mut().set_shift(shift);
        self.config.shift = shift;
        Ok(())
    }

    /// Select a baud preset
    pub fn set_baud(&mut self, baud: BaudRate) {
        self.clocks.set_symbol_divisor(baud.timer_compare());
        self.config.baud = baud;
    }

    /// Set the RTTY character format
    pub fn set_word_format(&mut self, format: WordFormat) {
        self.config.word_format = format;
    }

    /// Choose how FSK moves between levels
    pub fn set_fsk_shaping(&mut self, shaping: FskShaping) -> Result<(), ModemError> {
        self.core_mut()?.synth_mut().set_shaping(shaping);
        self.config.fsk_shaping = shaping;
        Ok(())
    }

    /// Set the AFSK phase steps
    pub fn set_afsk_steps(&mut self, mark_step: u8, space_step: u8) -> Result<(), ModemError> {
        self.core_mut()?.synth_mut().set_steps(mark_step, space_step);
        self.config.mark_step = mark_step;
        self.config.space_step = space_step;
        Ok(())
    }

    /// Current settings
    #[must_use]
    pub const fn config(&self) -> &ModemConfig {
        &self.config
    }

    /// Feed the watchdog from the foreground
    pub fn feed_watchdog(&mut self) -> Result<(), ModemError> {
        self.core_mut()?.feed_watchdog();
        Ok(())
    }

    /// Toggle the fine channel between space and mark twice
    ///
    /// An easily recognised pre/post amble for ground stations.
    pub fn chatter<T: DelayNs>(&mut self, delay: &mut T) -> Result<(), ModemError> {
        let shift = self.config.shift;
        for level in [0, shift, 0, shift] {
            self.core_mut()?.write(DacChannel::Fine, level)?;
            delay.delay_ms(CHATTER_DWELL_MS);
        }
        Ok(())
    }

    /// Send text as RTTY characters
    pub fn transmit_string(&mut self, text: impl AsRef<[u8]>) -> Result<(), ModemError> {
        let text = text.as_ref();
        if text.is_empty() {
            return Ok(());
        }

        let format = self.config.word_format;
        let sampling = self.lend()?;
        let mut result = Ok(());
        for &byte in text {
            result = self.send_frame(|scheduler| scheduler.load_rtty(byte, format));
            if result.is_err() {
                break;
            }
        }
        self.reclaim(sampling)?;
        result
    }

    /// Send a sentence followed by `*XXXX\n` with its checksum
    pub fn transmit_sentence(&mut self, sentence: impl AsRef<[u8]>) -> Result<(), ModemError> {
        let sentence = sentence.as_ref();
        self.transmit_string(sentence)?;

        let checksum = sentence_checksum(sentence);
        debug!("sentence checksum {=u16:#X}", checksum);
        self.transmit_string(checksum_suffix(checksum).as_bytes())
    }

    /// Send the first `bit_count` bits of a pre-encoded buffer, MSB first
    pub fn transmit_binary(&mut self, payload: &[u8], bit_count: usize) -> Result<(), ModemError> {
        let framer = BinaryFramer::new(payload, bit_count)?;

        let sampling = self.lend()?;
        let result = self.send_frame(|scheduler| scheduler.load_binary(framer));
        self.reclaim(sampling)?;
        debug!("binary frame of {} bits sent", bit_count);
        result
    }

    /// The core, when idle
    #[must_use]
    pub fn core(&self) -> Option<&ModemCore<D, W>> {
        self.core.as_ref()
    }

    /// Clock backend
    #[must_use]
    pub const fn clocks(&self) -> &C {
        &self.clocks
    }

    /// Take the modem apart
    pub fn into_parts(self) -> (Option<ModemCore<D, W>>, C) {
        (self.core, self.clocks)
    }

    fn core_mut(&mut self) -> Result<&mut ModemCore<D, W>, ModemError> {
        self.core.as_mut().ok_or(ModemError::CoreUnavailable)
    }

    /// Hand the core to the interrupts; returns whether the sample clock runs
    fn lend(&mut self) -> Result<bool, ModemError> {
        let mut core = self.core.take().ok_or(ModemError::CoreUnavailable)?;
        core.synth_mut().begin();
        let sampling = core.synth().needs_sample_clock();
        self.shared.lend(core);
        if sampling {
            self.clocks.start_sample_clock();
        }
        Ok(sampling)
    }

    fn reclaim(&mut self, sampling: bool) -> Result<(), ModemError> {
        if sampling {
            self.clocks.stop_sample_clock();
        }
        self.core = self.shared.reclaim();
        if self.core.is_none() {
            error!("modem core lost");
            return Err(ModemError::CoreUnavailable);
        }
        Ok(())
    }

    /// Load one frame, run the symbol clock and wait for completion
    fn send_frame(&mut self, load: impl FnOnce(&mut SymbolScheduler)) -> Result<(), ModemError> {
        self.shared
            .begin_frame(load)
            .ok_or(ModemError::CoreUnavailable)?;
        self.clocks.start_symbol_clock();

        while !self.shared.is_complete() {
            self.clocks.idle();
        }
        // The interrupt handler has already stopped the timer
        self.clocks.stop_symbol_clock();

        self.shared
            .with_core(|core| {
                core.scheduler_mut().acknowledge();
                core.feed_watchdog();
            })
            .ok_or(ModemError::CoreUnavailable)
    }
}
