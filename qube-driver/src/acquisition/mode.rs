use derive_more::Display;
use qube_core::descriptor::DspUnit;

use crate::error::QubeDriverError;

/// The DSP pipeline of a mux channel.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    /// Raw samples of every shot.
    #[display("1")]
    Raw,
    /// Decimated samples of every shot.
    #[display("2")]
    Decimated,
    /// Decimated samples averaged over shots.
    #[default]
    #[display("3")]
    Averaged,
    /// One summed value per window and shot.
    #[display("A")]
    Summed,
    /// One summed value per window, averaged over shots.
    #[display("B")]
    SummedAveraged,
}

impl AcquisitionMode {
    /// Whether the FIR filter and decimation run.
    #[must_use]
    pub const fn decimation(&self) -> bool {
        !matches!(self, Self::Raw)
    }

    /// Whether repetitions are integrated.
    #[must_use]
    pub const fn averaging(&self) -> bool {
        matches!(self, Self::Averaged | Self::SummedAveraged)
    }

    /// Whether each window is multiplied by the window coefficients and summed.
    #[must_use]
    pub const fn summation(&self) -> bool {
        matches!(self, Self::Summed | Self::SummedAveraged)
    }

    /// Returns the DSP stages enabled by this mode.
    #[must_use]
    pub fn dsp_units(&self) -> Vec<DspUnit> {
        let mut units = Vec::new();
        if self.decimation() {
            units.extend([DspUnit::ComplexFir, DspUnit::Decimation]);
        }
        if self.averaging() {
            units.push(DspUnit::Integration);
        }
        if self.summation() {
            units.extend([DspUnit::ComplexWindow, DspUnit::Sum]);
        }
        units
    }
}

impl std::str::FromStr for AcquisitionMode {
    type Err = QubeDriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Self::Raw),
            "2" => Ok(Self::Decimated),
            "3" => Ok(Self::Averaged),
            "A" => Ok(Self::Summed),
            "B" => Ok(Self::SummedAveraged),
            _ => Err(QubeDriverError::InvalidItem {
                name: "acquisition mode",
                value: s.to_string(),
            }),
        }
    }
}
