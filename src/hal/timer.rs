//! Modem Timers
//!
//! TIM6 clocks the symbol scheduler and TIM7 the tone synthesizer. Both are
//! basic timers running from the 16 MHz HSI timebase; only their update
//! interrupts are used.

use embassy_stm32::pac;
use embassy_stm32::pac::timer::TimBasic;

use crate::config::SAMPLE_RATE_HZ;
use crate::radio::modem::ModemClocks;
use crate::types::BaudRate;

/// Timer kernel clock with the default clock tree
pub const TIMER_CLOCK_HZ: u32 = 16_000_000;

/// Prescaler that brings the kernel clock down to the symbol timebase
const SYMBOL_PRESCALER: u16 = (TIMER_CLOCK_HZ / BaudRate::TIMEBASE_HZ - 1) as u16;

/// Reload value for the sample clock
const SAMPLE_RELOAD: u16 = (TIMER_CLOCK_HZ / SAMPLE_RATE_HZ - 1) as u16;

/// Basic timer used as a periodic interrupt source
#[derive(Clone, Copy)]
pub struct PeriodicTimer {
    regs: TimBasic,
}

impl PeriodicTimer {
    /// Symbol scheduler timer
    #[must_use]
    pub const fn symbol() -> Self {
        Self { regs: pac::TIM6 }
    }

    /// Tone synthesizer timer
    #[must_use]
    pub const fn sample() -> Self {
        Self { regs: pac::TIM7 }
    }

    /// Program prescaler and reload, leaving the timer stopped
    pub fn configure(&self, prescaler: u16, reload: u16) {
        self.regs.cr1().modify(|w| w.set_cen(false));
        self.regs.psc().write_value(prescaler);
        self.regs.arr().write(|w| w.set_arr(reload));
        // Latch the new prescaler; the update flag it raises is discarded
        self.regs.egr().write(|w| w.set_ug(true));
        self.regs.sr().modify(|w| w.set_uif(false));
    }

    /// Change the reload value of a running timer
    pub fn set_reload(&self, reload: u16) {
        self.regs.arr().write(|w| w.set_arr(reload));
    }

    /// Start counting with the update interrupt enabled
    pub fn start(&self) {
        self.regs.cnt().write(|w| w.set_cnt(0));
        self.regs.sr().modify(|w| w.set_uif(false));
        self.regs.dier().modify(|w| w.set_uie(true));
        self.regs.cr1().modify(|w| w.set_cen(true));
    }

    /// Stop counting and mask the update interrupt
    pub fn stop(&self) {
        self.regs.dier().modify(|w| w.set_uie(false));
        self.regs.cr1().modify(|w| w.set_cen(false));
    }

    /// Acknowledge the update interrupt; returns whether it was pending
    pub fn acknowledge(&self) -> bool {
        let pending = self.regs.sr().read().uif();
        self.regs.sr().modify(|w| w.set_uif(false));
        pending
    }
}

/// Both modem timers
pub struct BeaconClocks {
    symbol: PeriodicTimer,
    sample: PeriodicTimer,
}

impl BeaconClocks {
    /// Enable the timer clocks and program both timers
    #[must_use]
    pub fn new(baud: BaudRate) -> Self {
        pac::RCC.apb1enr1().modify(|w| {
            w.set_tim6en(true);
            w.set_tim7en(true);
        });

        let symbol = PeriodicTimer::symbol();
        symbol.configure(SYMBOL_PRESCALER, u16::from(baud.timer_compare()));

        let sample = PeriodicTimer::sample();
        sample.configure(0, SAMPLE_RELOAD);

        Self { symbol, sample }
    }
}

impl ModemClocks for BeaconClocks {
    fn set_symbol_divisor(&mut self, compare: u8) {
        self.symbol.set_reload(u16::from(compare));
    }

    fn start_symbol_clock(&mut self) {
        self.symbol.start();
    }

    fn stop_symbol_clock(&mut self) {
        self.symbol.stop();
    }

    fn start_sample_clock(&mut self) {
        self.sample.start();
    }

    fn stop_sample_clock(&mut self) {
        self.sample.stop();
    }

    fn idle(&mut self) {
        cortex_m::asm::wfi();
    }
}
