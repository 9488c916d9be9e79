//! Waveform Lookup Tables
//!
//! The sine table holds one half period; the second half is produced by
//! reflecting about the mid level, so a full cycle is twice the table long.

/// Entries in the half-period sine table
pub const SINE_HALF_PERIOD: u8 = 125;

/// Phase values in one full cycle
pub const SINE_PERIOD: u16 = 2 * SINE_HALF_PERIOD as u16;

/// Reflection level: `magnitude(p + half) == SINE_MAX - magnitude(p)`
pub const SINE_MAX: u16 = 256;

/// First half of `128 + 124 * sin(2 * pi * p / 250)`
pub static SINE_HALF: [u8; SINE_HALF_PERIOD as usize] = [
    128, 131, 134, 137, 140, 144, 147, 150, 153, 156, 159, 162, 165, 168, 171, 174, 177, 179,
    182, 185, 188, 190, 193, 196, 198, 201, 203, 206, 208, 211, 213, 215, 217, 219, 222, 224,
    225, 227, 229, 231, 233, 234, 236, 237, 239, 240, 241, 243, 244, 245, 246, 247, 248, 248,
    249, 250, 250, 251, 251, 252, 252, 252, 252, 252, 252, 252, 252, 251, 251, 250, 250, 249,
    248, 248, 247, 246, 245, 244, 243, 241, 240, 239, 237, 236, 234, 233, 231, 229, 227, 225,
    224, 222, 219, 217, 215, 213, 211, 208, 206, 203, 201, 198, 196, 193, 190, 188, 185, 182,
    179, 177, 174, 171, 168, 165, 162, 159, 156, 153, 150, 147, 144, 140, 137, 134, 131,
];

/// Step-response weights out of 256 for the FSK ramp, one per sample
pub static STEP_RESPONSE: [u8; 50] = [
    4, 7, 11, 15, 19, 23, 28, 32, 37, 42, 47, 52, 57, 62, 67, 73, 78, 84, 90, 95, 101, 107, 113,
    119, 125, 130, 136, 142, 148, 154, 160, 165, 171, 177, 182, 188, 193, 198, 203, 208, 213, 218,
    223, 227, 232, 236, 240, 244, 248, 251,
];

/// Waveform magnitude at a phase in `0..SINE_PERIOD`
///
/// Phases past the end of the cycle are folded back in.
#[must_use]
pub fn sine_magnitude(phase: u8) -> u16 {
    let phase = (u16::from(phase) % SINE_PERIOD) as u8;
    if phase < SINE_HALF_PERIOD {
        u16::from(SINE_HALF[usize::from(phase)])
    } else {
        SINE_MAX - u16::from(SINE_HALF[usize::from(phase - SINE_HALF_PERIOD)])
    }
}
