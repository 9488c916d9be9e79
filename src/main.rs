//! Balloon Beacon Main Application
//!
//! Entry point for the STM32G474-based beacon transmitter. Brings up the DAC,
//! power amplifier, modem timers and watchdog, then alternates an RTTY
//! telemetry sentence with an AFSK binary frame.

#![no_std]
#![no_main]

use core::fmt::Write as _;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::mode::Blocking;
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_time::{Delay, Duration, Timer};
use heapless::String;
use {defmt_rtt as _, panic_probe as _};

use beacon_modem::hal::timer::{BeaconClocks, PeriodicTimer};
use beacon_modem::hal::watchdog::BeaconWatchdog;
use beacon_modem::prelude::*;

type BeaconDac = Dac<Spi<'static, Blocking>, Output<'static>>;

static MODEM: SharedModem<BeaconDac, BeaconWatchdog<'static>> = SharedModem::new();

/// Fixed frame sent on binary slots until the FEC encoder is wired in
const TEST_FRAME: [u8; 8] = [0xAA, 0xAA, 0x2D, 0xD4, 0x4A, 0x4F, 0x45, 0x59];

/// Symbol clock: one scheduler step per update
#[interrupt]
unsafe fn TIM6_DAC() {
    let timer = PeriodicTimer::symbol();
    timer.acknowledge();
    if MODEM.on_symbol_interrupt() == SymbolEvent::Complete {
        timer.stop();
    }
}

/// Sample clock: one synthesizer step per update
#[interrupt]
unsafe fn TIM7_DAC() {
    PeriodicTimer::sample().acknowledge();
    MODEM.on_sample_interrupt();
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Balloon beacon firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(embassy_stm32::Config::default());

    // Watchdog first so a hang during bring-up still resets
    let watchdog = BeaconWatchdog::start(IndependentWatchdog::new(
        p.IWDG,
        WATCHDOG_TIMEOUT_MS * 1_000,
    ));

    // DAC on SPI1: PA5 = SCK, PA7 = MOSI, PA4 = chip select
    let mut spi_config = spi::Config::default();
    spi_config.frequency = Hertz(DAC_SPI_FREQUENCY_HZ);
    spi_config.mode = spi::MODE_0;
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PA5, p.PA7, spi_config);
    let cs = Output::new(p.PA4, Level::High, Speed::VeryHigh);
    let dac = defmt::unwrap!(Dac::new(spi, cs));

    let mut delay = Delay;
    let mut power_amp = PowerAmp::new(Output::new(p.PB0, Level::Low, Speed::Low));

    let config = ModemConfig::default();
    let clocks = BeaconClocks::new(config.baud);

    interrupt::TIM6_DAC.set_priority(Priority::P1);
    interrupt::TIM7_DAC.set_priority(Priority::P2);
    // SAFETY: both handlers only touch `MODEM`, which guards its state with a
    // critical section
    unsafe {
        interrupt::TIM6_DAC.enable();
        interrupt::TIM7_DAC.enable();
    }

    let mut modem = Modem::new(&MODEM, dac, watchdog, clocks, config);
    if let Err(e) = modem.start() {
        warn!("modem start failed: {}", e);
    }
    if power_amp.enable(&mut delay).is_err() {
        warn!("PA enable failed");
    }

    for _ in 0..STARTUP_CHATTER_ROUNDS {
        if let Err(e) = modem.chatter(&mut delay) {
            warn!("chatter failed: {}", e);
        }
        if let Err(e) = modem.feed_watchdog() {
            warn!("watchdog feed failed: {}", e);
        }
    }

    info!("Beacon up, {} {}", config.baud, config.word_format);

    let mut tick: u32 = 0;
    let mut binary_slot = false;
    loop {
        tick = tick.wrapping_add(1);

        let result = if binary_slot {
            send_binary(&mut modem)
        } else {
            send_sentence(&mut modem, tick)
        };
        if let Err(e) = result {
            warn!("transmission {} failed: {}", tick, e);
        }
        binary_slot = !binary_slot;

        if let Err(e) = modem.feed_watchdog() {
            warn!("watchdog feed failed: {}", e);
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

fn send_sentence<C: ModemClocks>(
    modem: &mut Modem<'static, BeaconDac, BeaconWatchdog<'static>, C>,
    tick: u32,
) -> Result<(), ModemError> {
    let mut sentence: String<STAGING_CAPACITY> = String::new();
    // Position and sensor fields stay at zero until their drivers report
    let _ = write!(sentence, "$$JOEY,{tick},00:00:00,0.0,0.0,0,0.0,0,0");

    modem.set_fsk()?;
    modem.transmit_sentence(sentence.as_bytes())
}

fn send_binary<C: ModemClocks>(
    modem: &mut Modem<'static, BeaconDac, BeaconWatchdog<'static>, C>,
) -> Result<(), ModemError> {
    let mut staging: PayloadWriter = PayloadWriter::new();
    staging.write(&TEST_FRAME)?;

    modem.set_afsk()?;
    modem.transmit_binary(staging.as_slice(), staging.len() * 8)
}
