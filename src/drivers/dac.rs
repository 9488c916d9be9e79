//! Transmitter DAC Driver
//!
//! Dual 16-bit SPI DAC steering the transmitter's VCXO. The coarse channel
//! sets the carrier, the fine channel keys it. Every command is a 3-byte
//! transaction framed by chip select; each byte waits for the bus to finish.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::types::DacChannel;

/// DAC command bytes
pub mod cmd {
    /// Write and update channel (OR in the channel id)
    pub const WRITE: u8 = 0x30;
    /// Power down both channels to high impedance
    pub const POWER_DOWN: u8 = 0x4F;
}

/// Sink for frequency-control words
///
/// Implemented by [`Dac`]; the modem core only needs this seam.
pub trait FrequencyDac {
    /// Bus error type
    type Error;

    /// Write a 16-bit word to a channel
    fn write(&mut self, channel: DacChannel, value: u16) -> Result<(), Self::Error>;

    /// Power the DAC down
    fn power_off(&mut self) -> Result<(), Self::Error>;
}

/// DAC transaction error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DacError<S, P> {
    /// SPI transfer failed
    Spi(S),
    /// Chip select could not be driven
    Pin(P),
}

#[cfg(feature = "embedded")]
impl<S, P> defmt::Format for DacError<S, P> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Spi(_) => defmt::write!(f, "DacError::Spi"),
            Self::Pin(_) => defmt::write!(f, "DacError::Pin"),
        }
    }
}

/// Command frame for a channel write
#[must_use]
pub const fn write_frame(channel: DacChannel, value: u16) -> [u8; 3] {
    [cmd::WRITE | channel.id(), (value >> 8) as u8, (value & 0xFF) as u8]
}

/// Command frame for power-down
pub const POWER_DOWN_FRAME: [u8; 3] = [cmd::POWER_DOWN, 0x00, 0x00];

/// SPI DAC driver
pub struct Dac<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS> Dac<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Create the driver, leaving the device deselected
    pub fn new(spi: SPI, mut cs: CS) -> Result<Self, DacError<SPI::Error, CS::Error>> {
        cs.set_high().map_err(DacError::Pin)?;
        Ok(Self { spi, cs })
    }

    /// Write a value to one of the channels
    pub fn write(
        &mut self,
        channel: DacChannel,
        value: u16,
    ) -> Result<(), DacError<SPI::Error, CS::Error>> {
        self.transaction(write_frame(channel, value))
    }

    /// Power down and put the outputs in high impedance
    pub fn power_off(&mut self) -> Result<(), DacError<SPI::Error, CS::Error>> {
        self.transaction(POWER_DOWN_FRAME)
    }

    /// Borrow the SPI bus
    #[must_use]
    pub fn spi(&self) -> &SPI {
        &self.spi
    }

    /// Give back the bus and chip select
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    fn transaction(&mut self, frame: [u8; 3]) -> Result<(), DacError<SPI::Error, CS::Error>> {
        self.cs.set_low().map_err(DacError::Pin)?;

        let sent = frame.iter().try_for_each(|&byte| {
            self.spi.write(&[byte])?;
            self.spi.flush()
        });

        // Deselect even if the transfer failed
        let released = self.cs.set_high();
        sent.map_err(DacError::Spi)?;
        released.map_err(DacError::Pin)
    }
}

impl<SPI, CS> FrequencyDac for Dac<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = DacError<SPI::Error, CS::Error>;

    fn write(&mut self, channel: DacChannel, value: u16) -> Result<(), Self::Error> {
        Dac::write(self, channel, value)
    }

    fn power_off(&mut self) -> Result<(), Self::Error> {
        Dac::power_off(self)
    }
}
