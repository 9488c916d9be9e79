//! Digital Signal Processing
//!
//! Provides the signal side of the modem:
//! - Sine and step-response lookup tables
//! - Phase-accumulator tone synthesis for AFSK and FSK shaping
//! - Sentence checksum

pub mod tables;
pub mod synth;
pub mod checksum;
