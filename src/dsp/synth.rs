//! Tone Synthesizer
//!
//! Produces the fine-channel DAC words that key the carrier. In AFSK mode a
//! phase accumulator walks the sine table once per sample interrupt; in FSK
//! mode the symbol scheduler's tone selection is written straight to the DAC,
//! or optionally eased in over the step-response table.

use crate::config::ModemConfig;
use crate::dsp::tables::{sine_magnitude, SINE_HALF_PERIOD, SINE_PERIOD, STEP_RESPONSE};
use crate::types::{FskShaping, ModulationMode, Tone};

/// Phase accumulator over one waveform period
///
/// The step is capped at half a period so a single advance can never jump
/// across a reflection boundary unnoticed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseAccumulator {
    /// Current phase (0 to `SINE_PERIOD - 1`)
    phase: u8,
    /// Phase increment per sample
    step: u8,
}

impl PhaseAccumulator {
    /// Create an accumulator at phase zero
    #[must_use]
    pub const fn new(step: u8) -> Self {
        Self {
            phase: 0,
            step: clamp_step(step),
        }
    }

    /// Set the phase increment
    pub fn set_step(&mut self, step: u8) {
        self.step = clamp_step(step);
    }

    /// Current phase increment
    #[must_use]
    pub const fn step(&self) -> u8 {
        self.step
    }

    /// Advance by one step and return the new phase
    pub fn next_phase(&mut self) -> u8 {
        let next = (u16::from(self.phase) + u16::from(self.step)) % SINE_PERIOD;
        self.phase = next as u8;
        self.phase
    }

    /// Advance and return the waveform magnitude
    pub fn next_magnitude(&mut self) -> u16 {
        sine_magnitude(self.next_phase())
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> u8 {
        self.phase
    }

    /// Reset phase
    pub fn reset(&mut self) {
        self.phase = 0;
    }
}

impl Default for PhaseAccumulator {
    fn default() -> Self {
        Self::new(0)
    }
}

const fn clamp_step(step: u8) -> u8 {
    if step > SINE_HALF_PERIOD {
        SINE_HALF_PERIOD
    } else {
        step
    }
}

/// Step-response transition between two fine channel levels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Ramp {
    start: u16,
    target: u16,
    delta: i32,
    sample: usize,
}

impl Ramp {
    fn new(start: u16, target: u16) -> Self {
        Self {
            start,
            target,
            delta: i32::from(target) - i32::from(start),
            sample: 0,
        }
    }

    /// Next DAC word, `None` once the ramp has landed on the target
    fn next(&mut self) -> Option<u16> {
        let last = STEP_RESPONSE.len() - 1;
        let value = match self.sample {
            s if s < last => {
                let weighted = self.delta * i32::from(STEP_RESPONSE[s]) / 256;
                (i32::from(self.start) + weighted) as u16
            }
            s if s == last => self.target,
            _ => return None,
        };
        self.sample += 1;
        Some(value)
    }
}

/// Fine channel waveform generator
#[derive(Clone, Debug)]
pub struct ToneSynthesizer {
    mode: ModulationMode,
    shaping: FskShaping,
    accumulator: PhaseAccumulator,
    mark_step: u8,
    space_step: u8,
    /// Fine channel word for mark in FSK
    shift: u16,
    /// Last word handed out for the fine channel
    level: u16,
    ramp: Option<Ramp>,
}

impl ToneSynthesizer {
    /// Create a synthesizer from the modem settings
    #[must_use]
    pub fn new(config: &ModemConfig) -> Self {
        Self {
            mode: config.mode,
            shaping: config.fsk_shaping,
            accumulator: PhaseAccumulator::new(config.mark_step),
            mark_step: clamp_step(config.mark_step),
            space_step: clamp_step(config.space_step),
            shift: config.shift,
            level: 0,
            ramp: None,
        }
    }

    /// Current modulation mode
    #[must_use]
    pub const fn mode(&self) -> ModulationMode {
        self.mode
    }

    /// Switch between FSK and AFSK
    pub fn set_mode(&mut self, mode: ModulationMode) {
        self.mode = mode;
        self.ramp = None;
    }

    /// FSK transition strategy
    #[must_use]
    pub const fn shaping(&self) -> FskShaping {
        self.shaping
    }

    /// Choose the FSK transition strategy
    pub fn set_shaping(&mut self, shaping: FskShaping) {
        self.shaping = shaping;
        self.ramp = None;
    }

    /// Fine channel word used for mark in FSK
    #[must_use]
    pub const fn shift(&self) -> u16 {
        self.shift
    }

    /// Set the FSK mark level
    pub fn set_shift(&mut self, shift: u16) {
        self.shift = shift;
    }

    /// Set AFSK phase steps for mark and space
    pub fn set_steps(&mut self, mark_step: u8, space_step: u8) {
        self.mark_step = clamp_step(mark_step);
        self.space_step = clamp_step(space_step);
    }

    /// AFSK phase step for a tone
    #[must_use]
    pub const fn step_for(&self, tone: Tone) -> u8 {
        match tone {
            Tone::Mark => self.mark_step,
            Tone::Space => self.space_step,
        }
    }

    /// FSK fine channel word for a tone
    #[must_use]
    pub const fn level_for(&self, tone: Tone) -> u16 {
        match tone {
            Tone::Mark => self.shift,
            Tone::Space => 0,
        }
    }

    /// Last fine channel word produced
    #[must_use]
    pub const fn level(&self) -> u16 {
        self.level
    }

    /// Record a fine channel write made outside the synthesizer
    pub fn note_level(&mut self, level: u16) {
        self.level = level;
    }

    /// Current phase accumulator
    #[must_use]
    pub const fn accumulator(&self) -> &PhaseAccumulator {
        &self.accumulator
    }

    /// Whether the sample interrupt has work to do in this configuration
    #[must_use]
    pub fn needs_sample_clock(&self) -> bool {
        self.mode == ModulationMode::Afsk || self.shaping == FskShaping::Ramp
    }

    /// Whether a ramp is still in progress
    #[must_use]
    pub const fn is_ramping(&self) -> bool {
        self.ramp.is_some()
    }

    /// Prepare for a new transmission
    ///
    /// The accumulator restarts at phase zero on the mark (idle) tone.
    pub fn begin(&mut self) {
        self.accumulator.reset();
        self.accumulator.set_step(self.mark_step);
        self.ramp = None;
    }

    /// Apply a symbol chosen by the scheduler
    ///
    /// Returns the word to write immediately when the fine channel switches
    /// at the symbol boundary (instant FSK).
    pub fn select(&mut self, tone: Tone) -> Option<u16> {
        match (self.mode, self.shaping) {
            (ModulationMode::Afsk, _) => {
                self.accumulator.set_step(self.step_for(tone));
                None
            }
            (ModulationMode::Fsk, FskShaping::Instant) => {
                self.level = self.level_for(tone);
                Some(self.level)
            }
            (ModulationMode::Fsk, FskShaping::Ramp) => {
                let target = self.level_for(tone);
                if target != self.level {
                    self.ramp = Some(Ramp::new(self.level, target));
                }
                None
            }
        }
    }

    /// Produce the fine channel word for one sample interrupt, if any
    pub fn render(&mut self) -> Option<u16> {
        let word = match self.mode {
            ModulationMode::Afsk => Some(self.accumulator.next_magnitude() << 8),
            ModulationMode::Fsk => {
                let next = self.ramp.as_mut().and_then(Ramp::next);
                if next.is_none() {
                    self.ramp = None;
                }
                next
            }
        };
        if let Some(word) = word {
            self.level = word;
        }
        word
    }
}

impl Default for ToneSynthesizer {
    fn default() -> Self {
        Self::new(&ModemConfig::default())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ToneSynthesizer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Synth({}, step={}, level={})",
            self.mode,
            self.accumulator.step(),
            self.level
        );
    }
}
