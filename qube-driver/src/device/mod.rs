mod awg;
mod capture;
mod frequency;
mod register;
mod switch;

pub use awg::*;
pub use capture::*;
pub use frequency::*;
pub use register::RegisterField;
pub use switch::*;

use derive_more::Display;
use getset::Getters;
use qube_core::common::{AwgId, CaptureUnitId, Freq};

use crate::error::QubeDriverError;

/// The role of a device.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Role {
    /// A control line. AWGs and the DAC path only.
    #[display("control")]
    Control,
    /// A readout line. Also owns a capture module and an ADC path.
    #[display("readout")]
    Readout,
}

/// A logical device: one control or readout port of a chassis.
#[derive(Getters)]
pub struct Device {
    #[getset(get = "pub")]
    /// The device name, `<chassis>-<channel>`.
    name: String,
    #[getset(get = "pub")]
    /// The chassis this device belongs to.
    chassis: String,
    awg: AwgCapability,
    frequency: FrequencyCapability,
    capture: Option<CaptureCapability>,
    switch: Option<SwitchCapability>,
}

impl Device {
    /// Creates a new control [`Device`].
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        chassis: impl Into<String>,
        awg: AwgCapability,
        frequency: FrequencyCapability,
    ) -> Self {
        Self {
            name: name.into(),
            chassis: chassis.into(),
            awg,
            frequency,
            capture: None,
            switch: None,
        }
    }

    /// Attaches a capture module, making this a readout device.
    #[must_use]
    pub fn with_capture(mut self, capture: CaptureCapability) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Attaches a microwave switch.
    #[must_use]
    pub fn with_switch(mut self, switch: SwitchCapability) -> Self {
        self.switch = Some(switch);
        self
    }

    /// Returns the role of this device.
    #[must_use]
    pub const fn role(&self) -> Role {
        if self.capture.is_some() {
            Role::Readout
        } else {
            Role::Control
        }
    }

    /// Returns the AWG channels.
    #[must_use]
    pub const fn awg(&self) -> &AwgCapability {
        &self.awg
    }

    /// Returns the AWG channels mutably.
    pub fn awg_mut(&mut self) -> &mut AwgCapability {
        &mut self.awg
    }

    /// Returns the DAC path.
    #[must_use]
    pub const fn frequency(&self) -> &FrequencyCapability {
        &self.frequency
    }

    fn unsupported(&self, capability: &'static str) -> QubeDriverError {
        QubeDriverError::InvalidDevice {
            device: self.name.clone(),
            capability,
        }
    }

    /// Returns the capture module, or an error if this is not a readout device.
    pub fn readout(&self) -> Result<&CaptureCapability, QubeDriverError> {
        self.capture.as_ref().ok_or_else(|| self.unsupported("readout"))
    }

    /// Returns the capture module mutably, or an error if this is not a readout device.
    pub fn readout_mut(&mut self) -> Result<&mut CaptureCapability, QubeDriverError> {
        match self.capture.as_mut() {
            Some(capture) => Ok(capture),
            None => Err(QubeDriverError::InvalidDevice {
                device: self.name.clone(),
                capability: "readout",
            }),
        }
    }

    /// Returns the microwave switch, or an error if this device has none.
    pub fn switch(&self) -> Result<&SwitchCapability, QubeDriverError> {
        self.switch
            .as_ref()
            .ok_or_else(|| self.unsupported("microwave switch"))
    }

    /// Compiles and writes the capture parameters of mux channels.
    ///
    /// The current sequence settings are used.
    pub fn upload_readout_parameters(&self, muxs: &[usize]) -> Result<(), QubeDriverError> {
        self.readout()?
            .upload_parameters(muxs, self.awg.repetition_time(), self.awg.shots())
    }

    /// Makes `awg` the start trigger of the capture module and arms `units`.
    pub fn set_trigger_board(
        &self,
        awg: AwgId,
        units: &[CaptureUnitId],
    ) -> Result<(), QubeDriverError> {
        self.readout()?.set_trigger_board(awg, units)
    }

    /// Returns the coarse NCO frequency of the ADC path.
    pub fn rx_coarse_frequency(&self) -> Result<Freq, QubeDriverError> {
        let line = self.readout()?.adc_line();
        self.frequency.adc_coarse_frequency(line)
    }

    /// Sets the coarse NCO frequency of the ADC path.
    pub fn set_rx_coarse_frequency(&self, freq: Freq) -> Result<(), QubeDriverError> {
        let line = self.readout()?.adc_line();
        self.frequency.set_adc_coarse_frequency(line, freq)
    }
}
