use qube_core::{
    common::{
        Freq, MHz, Resolution, ADC_COARSE_NCO_RESOLUTION_MHZ, DAC_COARSE_NCO_RESOLUTION_MHZ,
        DAC_FINE_NCO_RESOLUTION_MHZ, LO_RESOLUTION_MHZ, NCO_SAMPLE_RATE_MHZ,
    },
    link::{lock, AdcLine, SharedFrequencyController, Sideband},
};

use crate::error::QubeDriverError;

const LO: Resolution = Resolution::new(LO_RESOLUTION_MHZ);
const DAC_COARSE_NCO: Resolution = Resolution::new(DAC_COARSE_NCO_RESOLUTION_MHZ);
const DAC_FINE_NCO: Resolution = Resolution::new(DAC_FINE_NCO_RESOLUTION_MHZ);
const ADC_COARSE_NCO: Resolution = Resolution::new(ADC_COARSE_NCO_RESOLUTION_MHZ);

fn check(
    name: &'static str,
    resolution: Resolution,
    freq: Freq,
    include_zero: bool,
) -> Result<(), QubeDriverError> {
    let ok = if include_zero {
        resolution.check_including_zero(freq.mhz())
    } else {
        resolution.check(freq.mhz())
    };
    if ok {
        Ok(())
    } else {
        Err(QubeDriverError::NotMultipleOf {
            name,
            value: freq.mhz(),
            resolution: resolution.step(),
        })
    }
}

/// The LO, mixer and NCOs of the DAC path of a device.
pub struct FrequencyCapability {
    ctrl: SharedFrequencyController,
    group: u8,
    line: u8,
    num_fine_channels: usize,
}

impl FrequencyCapability {
    /// Creates a new [`FrequencyCapability`] for the DAC path `(group, line)`.
    #[must_use]
    pub fn new(
        ctrl: SharedFrequencyController,
        group: u8,
        line: u8,
        num_fine_channels: usize,
    ) -> Self {
        Self {
            ctrl,
            group,
            line,
            num_fine_channels,
        }
    }

    /// Returns the `(group, line)` of the DAC path.
    #[must_use]
    pub const fn path(&self) -> (u8, u8) {
        (self.group, self.line)
    }

    /// Returns the LO frequency.
    pub fn lo_frequency(&self) -> Result<Freq, QubeDriverError> {
        let multiplier = lock(&self.ctrl).lo_multiplier(self.group, self.line)?;
        Ok(multiplier as f64 * LO_RESOLUTION_MHZ * MHz)
    }

    /// Sets the LO frequency. It must be a multiple of 100 MHz.
    pub fn set_lo_frequency(&self, freq: Freq) -> Result<(), QubeDriverError> {
        check("LO frequency", LO, freq, false)?;
        let multiplier = u32::try_from(LO.ticks(freq.mhz())).map_err(|_| {
            QubeDriverError::out_of_range(
                "LO frequency",
                freq.mhz(),
                0.0,
                u32::MAX as f64 * LO_RESOLUTION_MHZ,
            )
        })?;
        lock(&self.ctrl).set_lo_multiplier(self.group, self.line, multiplier)?;
        Ok(())
    }

    /// Returns the mixer sideband.
    pub fn sideband(&self) -> Result<Sideband, QubeDriverError> {
        Ok(lock(&self.ctrl).sideband(self.group, self.line)?)
    }

    /// Sets the mixer sideband.
    pub fn set_sideband(&self, sideband: Sideband) -> Result<(), QubeDriverError> {
        lock(&self.ctrl).set_sideband(self.group, self.line, sideband)?;
        Ok(())
    }

    /// Returns the coarse NCO frequency of the DAC.
    pub fn dac_coarse_frequency(&self) -> Result<Freq, QubeDriverError> {
        Ok(lock(&self.ctrl).dac_coarse_nco(self.group, self.line)?)
    }

    /// Sets the coarse NCO frequency of the DAC. It must be a nonzero multiple of 12000/2^11 MHz.
    pub fn set_dac_coarse_frequency(&self, freq: Freq) -> Result<(), QubeDriverError> {
        check("TX coarse NCO frequency", DAC_COARSE_NCO, freq, false)?;
        lock(&self.ctrl).set_dac_coarse_nco(self.group, self.line, freq)?;
        Ok(())
    }

    fn check_fine_channel(&self, channel: usize) -> Result<(), QubeDriverError> {
        if channel < self.num_fine_channels {
            Ok(())
        } else {
            Err(QubeDriverError::out_of_range(
                "fine NCO channel",
                channel as f64,
                0.0,
                self.num_fine_channels.saturating_sub(1) as f64,
            ))
        }
    }

    /// Returns the fine NCO frequency of a DAC channel.
    pub fn dac_fine_frequency(&self, channel: usize) -> Result<Freq, QubeDriverError> {
        self.check_fine_channel(channel)?;
        Ok(lock(&self.ctrl).dac_fine_nco(self.group, self.line, channel)?)
    }

    /// Sets the fine NCO frequency of a DAC channel.
    ///
    /// It must be a multiple of 2000/2^10 MHz within the NCO Nyquist band. Zero is allowed.
    pub fn set_dac_fine_frequency(
        &self,
        channel: usize,
        freq: Freq,
    ) -> Result<(), QubeDriverError> {
        self.check_fine_channel(channel)?;
        let nyquist = NCO_SAMPLE_RATE_MHZ / 2.0;
        if freq.mhz().abs() > nyquist {
            return Err(QubeDriverError::out_of_range(
                "TX fine NCO frequency",
                freq.mhz(),
                -nyquist,
                nyquist,
            ));
        }
        check("TX fine NCO frequency", DAC_FINE_NCO, freq, true)?;
        lock(&self.ctrl).set_dac_fine_nco(self.group, self.line, channel, freq)?;
        Ok(())
    }

    /// Returns the coarse NCO frequency of an ADC line in the same group.
    pub fn adc_coarse_frequency(&self, line: AdcLine) -> Result<Freq, QubeDriverError> {
        Ok(lock(&self.ctrl).adc_coarse_nco(self.group, line)?)
    }

    /// Sets the coarse NCO frequency of an ADC line.
    ///
    /// It must be a nonzero multiple of 6000/2^10 MHz.
    pub fn set_adc_coarse_frequency(
        &self,
        line: AdcLine,
        freq: Freq,
    ) -> Result<(), QubeDriverError> {
        check("RX coarse NCO frequency", ADC_COARSE_NCO, freq, false)?;
        lock(&self.ctrl).set_adc_coarse_nco(self.group, line, freq)?;
        Ok(())
    }
}
