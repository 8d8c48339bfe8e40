use derive_more::Display;

use super::LinkError;
use crate::common::Freq;

/// The sideband selected by the up-conversion mixer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum Sideband {
    /// Upper sideband.
    #[display("usb")]
    Usb,
    /// Lower sideband.
    #[display("lsb")]
    Lsb,
}

impl std::str::FromStr for Sideband {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usb" => Ok(Self::Usb),
            "lsb" => Ok(Self::Lsb),
            _ => Err(LinkError::new(format!("unknown sideband: {s}"))),
        }
    }
}

/// The ADC line of a readout port.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum AdcLine {
    /// Readout line.
    #[display("r")]
    Read,
    /// Monitor line.
    #[display("m")]
    Monitor,
}

/// Drives the LO synthesizers, mixers and NCOs of a chassis.
///
/// A DAC path is addressed by `(group, line)`, an ADC path by `(group, adc_line)`.
pub trait FrequencyController: Send {
    /// Returns the LO multiplier of a DAC path. The LO frequency is this times 100 MHz.
    fn lo_multiplier(&mut self, group: u8, line: u8) -> Result<u32, LinkError>;

    /// Sets the LO multiplier of a DAC path.
    fn set_lo_multiplier(&mut self, group: u8, line: u8, multiplier: u32) -> Result<(), LinkError>;

    /// Returns the mixer sideband of a DAC path.
    fn sideband(&mut self, group: u8, line: u8) -> Result<Sideband, LinkError>;

    /// Sets the mixer sideband of a DAC path.
    fn set_sideband(&mut self, group: u8, line: u8, sideband: Sideband) -> Result<(), LinkError>;

    /// Returns the coarse NCO frequency of a DAC path.
    fn dac_coarse_nco(&mut self, group: u8, line: u8) -> Result<Freq, LinkError>;

    /// Sets the coarse NCO frequency of a DAC path.
    fn set_dac_coarse_nco(&mut self, group: u8, line: u8, freq: Freq) -> Result<(), LinkError>;

    /// Returns the fine NCO frequency of a DAC channel.
    fn dac_fine_nco(&mut self, group: u8, line: u8, channel: usize) -> Result<Freq, LinkError>;

    /// Sets the fine NCO frequency of a DAC channel.
    fn set_dac_fine_nco(
        &mut self,
        group: u8,
        line: u8,
        channel: usize,
        freq: Freq,
    ) -> Result<(), LinkError>;

    /// Returns the coarse NCO frequency of an ADC path.
    fn adc_coarse_nco(&mut self, group: u8, line: AdcLine) -> Result<Freq, LinkError>;

    /// Sets the coarse NCO frequency of an ADC path.
    fn set_adc_coarse_nco(&mut self, group: u8, line: AdcLine, freq: Freq) -> Result<(), LinkError>;
}
