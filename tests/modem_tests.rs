//! Tests for the blocking modem API
//!
//! The interrupt handlers run from inside the busy-wait through simulated
//! clocks, so whole transmissions execute on the host.
//!
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test modem_tests

mod common;

use beacon_modem::config::{
    ModemConfig, CHATTER_DWELL_MS, DEFAULT_CARRIER_WORD, DEFAULT_SHIFT, STAGING_CAPACITY,
};
use beacon_modem::dsp::checksum::sentence_checksum;
use beacon_modem::dsp::tables::SINE_HALF;
use beacon_modem::radio::modem::Modem;
use beacon_modem::radio::payload::PayloadWriter;
use beacon_modem::types::{
    BaudRate, DacChannel, FskShaping, ModemError, ModulationMode, WordFormat,
};
use common::{
    decode_8n2, CountingWatchdog, DacOp, MockDelay, RecordingDac, SimClocks, TestShared,
};

type TestModem<'a> = Modem<'a, RecordingDac, CountingWatchdog, SimClocks<'a>>;

fn new_modem(shared: &TestShared, samples_per_symbol_tick: usize) -> TestModem<'_> {
    Modem::new(
        shared,
        RecordingDac::default(),
        CountingWatchdog::default(),
        SimClocks::new(shared, samples_per_symbol_tick),
        ModemConfig::default(),
    )
}

fn fine_writes(modem: &TestModem<'_>) -> Vec<u16> {
    modem.core().unwrap().dac().fine_writes()
}

fn to_bits(levels: &[u16]) -> Vec<bool> {
    levels.iter().map(|&l| l == DEFAULT_SHIFT).collect()
}

// ============================================================================
// Startup Tests
// ============================================================================

#[test]
fn test_new_programs_symbol_divisor() {
    let shared = TestShared::new();
    let modem = new_modem(&shared, 0);
    assert_eq!(modem.clocks().divisor, 156);
}

#[test]
fn test_start_sequence() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.start().unwrap();
    assert_eq!(
        modem.core().unwrap().dac().ops,
        vec![
            DacOp::PowerOff,
            DacOp::Write(DacChannel::Coarse, DEFAULT_CARRIER_WORD),
            DacOp::Write(DacChannel::Fine, 0),
        ]
    );
}

#[test]
fn test_chatter_toggles_fine_channel() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    let mut delay = MockDelay::default();
    modem.chatter(&mut delay).unwrap();

    assert_eq!(
        fine_writes(&modem),
        vec![0, DEFAULT_SHIFT, 0, DEFAULT_SHIFT]
    );
    assert_eq!(delay.total_ns, 4 * u64::from(CHATTER_DWELL_MS) * 1_000_000);
}

#[test]
fn test_shutdown_powers_dac_down() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.shutdown().unwrap();
    assert_eq!(modem.core().unwrap().dac().ops, vec![DacOp::PowerOff]);
}

#[test]
fn test_dac_failure_surfaces_in_foreground() {
    let shared = TestShared::new();
    let dac = RecordingDac {
        fail: true,
        ..RecordingDac::default()
    };
    let mut modem = Modem::new(
        &shared,
        dac,
        CountingWatchdog::default(),
        SimClocks::new(&shared, 0),
        ModemConfig::default(),
    );
    assert_eq!(modem.start(), Err(ModemError::Dac));
}

// ============================================================================
// RTTY Tests
// ============================================================================

#[test]
fn test_sentence_decodes_with_checksum() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    let sentence = "$$JOEY,1,00:00:00,0.0,0.0,0,0.0,0,0";
    modem.transmit_sentence(sentence).unwrap();

    let received = decode_8n2(&to_bits(&fine_writes(&modem)));
    let text = String::from_utf8(received).unwrap();
    assert_eq!(text, format!("{sentence}*CE29\n"));

    let (body, suffix) = text.trim_end().split_once('*').unwrap();
    let checksum = u16::from_str_radix(suffix, 16).unwrap();
    assert_eq!(checksum, sentence_checksum(body.as_bytes()));
}

#[test]
fn test_symbols_match_dac_writes() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.transmit_string("HI").unwrap();

    let on_air = modem.clocks().symbols();
    assert_eq!(on_air.len(), 22);
    assert_eq!(to_bits(&fine_writes(&modem)), on_air);
}

#[test]
fn test_string_feeds_watchdog_per_character() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.transmit_string("ABCDE").unwrap();
    assert_eq!(modem.core().unwrap().watchdog().feeds, 5);
}

#[test]
fn test_empty_string_sends_nothing() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.transmit_string("").unwrap();
    assert!(modem.clocks().events.is_empty());
    assert!(fine_writes(&modem).is_empty());
}

#[test]
fn test_replay_is_identical() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);

    modem.transmit_sentence("$$TEST").unwrap();
    let first_events = modem.clocks().events.clone();
    let first_writes = fine_writes(&modem);

    modem.transmit_sentence("$$TEST").unwrap();
    let events = &modem.clocks().events;
    let writes = fine_writes(&modem);

    assert_eq!(&events[first_events.len()..], first_events.as_slice());
    assert_eq!(&writes[first_writes.len()..], first_writes.as_slice());
}

#[test]
fn test_word_format_applies_to_next_string() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.set_word_format(WordFormat::RTTY_7N1);
    modem.transmit_string("ab").unwrap();
    assert_eq!(modem.clocks().symbols().len(), 18);
}

#[test]
fn test_core_returns_after_transmission() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.transmit_string("x").unwrap();
    assert!(!shared.is_lent());
    assert!(shared.is_complete());
    assert!(modem.core().is_some());
    assert!(!modem.clocks().symbol_running);
}

#[test]
fn test_symbol_clock_released_after_each_frame() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.transmit_string("abc").unwrap();
    assert_eq!(modem.clocks().symbol_clock_stops, 3);
    modem.transmit_binary(&[0xFF], 8).unwrap();
    assert_eq!(modem.clocks().symbol_clock_stops, 4);
}

#[test]
fn test_fsk_instant_leaves_sample_clock_off() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 4);
    modem.transmit_string("x").unwrap();
    assert_eq!(modem.clocks().sample_clock_starts, 0);
    assert_eq!(modem.clocks().sample_ticks, 0);
}

#[test]
fn test_fsk_ramp_settles_on_levels() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 60);
    modem.set_fsk_shaping(FskShaping::Ramp).unwrap();
    modem.transmit_string("U").unwrap();

    let writes = fine_writes(&modem);
    assert!(writes.len() > 11);
    assert!(writes.iter().all(|&w| w <= DEFAULT_SHIFT));
    // Ends on the stop bits
    assert_eq!(*writes.last().unwrap(), DEFAULT_SHIFT);
    assert!(!modem.clocks().sample_running);
}

// ============================================================================
// Binary Tests
// ============================================================================

#[test]
fn test_binary_frame_bits() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.transmit_binary(&[0xA5, 0x3C], 12).unwrap();

    let expected: Vec<bool> = "101001010011".chars().map(|c| c == '1').collect();
    assert_eq!(to_bits(&fine_writes(&modem)), expected);
    assert_eq!(modem.clocks().symbols(), expected);
}

#[test]
fn test_binary_feeds_watchdog() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.transmit_binary(&[0xA5, 0x3C], 12).unwrap();
    // One byte boundary plus the completion feed
    assert_eq!(modem.core().unwrap().watchdog().feeds, 2);
}

#[test]
fn test_binary_rejects_oversized_bit_count() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    assert_eq!(
        modem.transmit_binary(&[0xFF], 9),
        Err(ModemError::BitCountExceedsBuffer {
            bit_count: 9,
            available: 8
        })
    );
    assert!(modem.core().is_some());
    assert!(modem.clocks().events.is_empty());
}

// ============================================================================
// AFSK Tests
// ============================================================================

#[test]
fn test_afsk_runs_sample_clock_during_transmission() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 8);
    modem.set_afsk().unwrap();
    assert_eq!(modem.mode(), ModulationMode::Afsk);

    modem.transmit_binary(&[0xA5, 0x3C], 12).unwrap();
    let clocks = modem.clocks();
    assert_eq!(clocks.sample_clock_starts, 1);
    assert!(!clocks.sample_running);
    assert!(clocks.sample_ticks > 0);

    let writes = fine_writes(&modem);
    assert_eq!(writes.len(), clocks.sample_ticks);
    assert!(writes.iter().all(|&w| w & 0xFF == 0));
    // Last bit is a one
    assert_eq!(modem.core().unwrap().synth().accumulator().step(), 3);
}

#[test]
fn test_afsk_phase_restarts_each_transmission() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 8);
    modem.set_afsk().unwrap();

    modem.transmit_string("A").unwrap();
    let first = fine_writes(&modem);
    modem.transmit_string("A").unwrap();
    let all = fine_writes(&modem);
    assert_eq!(&all[first.len()..], first.as_slice());
}

#[test]
fn test_afsk_replay_after_space_ending_frame() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 8);
    modem.set_afsk().unwrap();

    // All-zero frame leaves the accumulator on the space step
    modem.transmit_binary(&[0x00], 8).unwrap();
    let first = fine_writes(&modem);
    modem.transmit_binary(&[0x00], 8).unwrap();
    let all = fine_writes(&modem);
    assert_eq!(&all[first.len()..], first.as_slice());
}

#[test]
fn test_afsk_starts_on_mark_tone() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 1);
    modem.set_afsk().unwrap();
    modem.transmit_binary(&[0x00], 8).unwrap();
    let before = fine_writes(&modem).len();
    modem.transmit_binary(&[0x00], 8).unwrap();

    // First sample precedes the first symbol: phase 0 + mark step 3
    let writes = fine_writes(&modem);
    assert_eq!(writes[0], u16::from(SINE_HALF[3]) << 8);
    assert_eq!(writes[before], u16::from(SINE_HALF[3]) << 8);
}

#[test]
fn test_afsk_steps_follow_setter() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 8);
    modem.set_afsk().unwrap();
    modem.set_afsk_steps(5, 4).unwrap();
    modem.transmit_binary(&[0x00], 8).unwrap();
    assert_eq!(modem.core().unwrap().synth().accumulator().step(), 4);
    assert_eq!(modem.config().space_step, 4);
}

#[test]
fn test_switching_back_to_fsk() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 8);
    modem.set_afsk().unwrap();
    modem.set_fsk().unwrap();
    modem.transmit_string("x").unwrap();
    assert_eq!(fine_writes(&modem).len(), 11);
}

// ============================================================================
// Settings Tests
// ============================================================================

#[test]
fn test_baud_setter_reprograms_divisor() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.set_baud(BaudRate::Baud300);
    assert_eq!(modem.clocks().divisor, 25);
    assert_eq!(modem.config().baud, BaudRate::Baud300);
}

#[test]
fn test_shift_setter_changes_mark_level() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    modem.set_shift(1000).unwrap();
    modem.transmit_string("\u{7f}").unwrap();
    let writes = fine_writes(&modem);
    assert_eq!(writes[0], 0);
    assert_eq!(writes[1], 1000);
}

// ============================================================================
// Payload Staging Tests
// ============================================================================

#[test]
fn test_staging_accepts_until_full() {
    let mut writer: PayloadWriter = PayloadWriter::new();
    assert_eq!(writer.capacity(), STAGING_CAPACITY);
    assert_eq!(writer.write(&[1; 60]), Ok(60));
    assert_eq!(writer.write(&[2; 40]), Ok(40));
    assert_eq!(writer.len(), STAGING_CAPACITY);
}

#[test]
fn test_staging_refuses_overflow_whole() {
    let mut writer: PayloadWriter = PayloadWriter::new();
    writer.write(&[0; 90]).unwrap();
    assert_eq!(
        writer.write(&[0; 11]),
        Err(ModemError::PayloadOverflow {
            len: 90,
            requested: 11
        })
    );
    assert_eq!(writer.len(), 90);
}

#[test]
fn test_staged_payload_goes_out() {
    let shared = TestShared::new();
    let mut modem = new_modem(&shared, 0);
    let mut writer = PayloadWriter::<4>::new();
    writer.write(&[0x80, 0x01]).unwrap();
    modem
        .transmit_binary(writer.as_slice(), writer.len() * 8)
        .unwrap();

    let bits = modem.clocks().symbols();
    assert_eq!(bits.len(), 16);
    assert!(bits[0] && bits[15]);
    assert_eq!(bits.iter().filter(|&&b| b).count(), 2);

    writer.clear();
    assert!(writer.is_empty());
}
