use num_complex::{Complex32, Complex64};
use qube_driver::{
    acquisition::{
        gaussian_fir_coefficients, rectangular_window_coefficients, AcquisitionMode,
        AcquisitionWindow, DEFAULT_FIR_SIGMA,
    },
    core::{
        common::{Freq, MUX_CHANNELS},
        link::Sideband,
    },
    device::{AwgCapability, RegisterField, Role},
    error::QubeDriverError,
};

use super::QubeController;
use crate::{error::QubeError, session::DaqState, session::Session};

/// The error of a setting that has been replaced, or `None` if `setting` is current.
#[must_use]
pub fn obsoleted(setting: &str) -> Option<QubeError> {
    let (setting, replacement) = match setting {
        "repeat_count" => ("repeat_count", "shots"),
        "acquisition_count" => ("acquisition_count", "acquisition_number"),
        "filter_pre_coefficients" => ("filter_pre_coefficients", "acquisition_fir_coefficients"),
        "average_window_coefficients" => {
            ("average_window_coefficients", "acquisition_window_coefficients")
        }
        _ => return None,
    };
    Some(QubeError::Obsoleted {
        setting,
        replacement,
    })
}

impl QubeController {
    /// Returns the role of the selected device.
    pub fn role(&self, session: &Session) -> Result<Role, QubeError> {
        Ok(self.device(session)?.role())
    }

    /// Returns the number of shots.
    pub fn shots(&self, session: &Session) -> Result<u32, QubeError> {
        Ok(self.device(session)?.awg().shots())
    }

    /// Sets the number of shots.
    pub fn set_shots(&self, session: &Session, shots: u32) -> Result<u32, QubeError> {
        if shots == 0 {
            return Err(QubeDriverError::out_of_range("shots", 0.0, 1.0, u32::MAX as f64).into());
        }
        self.device(session)?.awg_mut().set_shots(shots);
        Ok(shots)
    }

    /// Returns the repetition time in \[ns\].
    pub fn repetition_time(&self, session: &Session) -> Result<u64, QubeError> {
        Ok(self.device(session)?.awg().repetition_time())
    }

    /// Sets the repetition time in \[ns\]. It must be a multiple of 10240 ns.
    pub fn set_repetition_time(&self, session: &Session, ns: f64) -> Result<u64, QubeError> {
        let mut dev = self.device(session)?;
        AwgCapability::check_repetition_time(ns)?;
        Ok(dev.awg_mut().set_repetition_time(ns)?)
    }

    /// Returns the sequence length in \[ns\].
    pub fn sequence_length(&self, session: &Session) -> Result<u64, QubeError> {
        Ok(self.device(session)?.awg().sequence_length())
    }

    /// Sets the sequence length in \[ns\]. It must be a multiple of 128 ns below 199936 ns.
    pub fn set_sequence_length(&self, session: &Session, ns: f64) -> Result<u64, QubeError> {
        let mut dev = self.device(session)?;
        AwgCapability::check_sequence_length(ns)?;
        Ok(dev.awg_mut().set_sequence_length(ns))
    }

    /// Returns the number of AWG channels of the selected device.
    pub fn dac_channels(&self, session: &Session) -> Result<usize, QubeError> {
        Ok(self.device(session)?.awg().num_awgs())
    }

    /// Arms AWG channels of the selected device for the next trigger.
    pub fn upload_parameters(
        &self,
        session: &mut Session,
        channels: &[usize],
    ) -> Result<bool, QubeError> {
        let (chassis, awgs) = {
            let dev = self.device(session)?;
            (dev.chassis().clone(), dev.awg().awg_ids_of(channels)?)
        };
        session.ledger_mut().register_awgs(&chassis, awgs);
        session.set_state(DaqState::Armed);
        tracing::debug!("armed AWGs: {:?}", session.ledger().awgs());
        Ok(true)
    }

    /// Writes waveforms to AWG channels of the selected device.
    pub fn upload_waveform(
        &self,
        session: &Session,
        waveforms: &[Vec<Complex64>],
        channels: &[usize],
    ) -> Result<bool, QubeError> {
        self.device(session)?.awg().upload_waveform(waveforms, channels)?;
        Ok(true)
    }

    /// Writes the capture parameters of mux channels and arms their capture units.
    pub fn upload_readout_parameters(
        &self,
        session: &mut Session,
        muxs: &[usize],
    ) -> Result<bool, QubeError> {
        let (chassis, device, module, units) = {
            let dev = self.device(session)?;
            let capture = dev.readout()?;
            let units = capture.units(muxs)?;
            dev.upload_readout_parameters(muxs)?;
            (dev.chassis().clone(), dev.name().clone(), capture.module(), units)
        };
        session
            .ledger_mut()
            .register_capture_units(&chassis, &device, module, units);
        session.set_state(DaqState::Armed);
        tracing::debug!("armed capture units: {:?}", session.ledger().captures());
        Ok(true)
    }

    /// Reads the captured data of mux channels, one row per channel.
    pub fn download_waveform(
        &self,
        session: &Session,
        muxs: &[usize],
    ) -> Result<Vec<Vec<Complex32>>, QubeError> {
        Ok(self.device(session)?.readout()?.download(muxs)?)
    }

    /// Returns the number of acquisition windows of a mux channel.
    pub fn acquisition_number(&self, session: &Session, mux: usize) -> Result<usize, QubeError> {
        Ok(self.device(session)?.readout()?.mux(mux)?.num_windows())
    }

    /// Sets the number of acquisition windows of a mux channel.
    pub fn set_acquisition_number(
        &self,
        session: &Session,
        mux: usize,
        n: usize,
    ) -> Result<usize, QubeError> {
        self.device(session)?.readout_mut()?.set_num_windows(mux, n)?;
        Ok(n)
    }

    /// Returns the acquisition windows of a mux channel.
    pub fn acquisition_window(
        &self,
        session: &Session,
        mux: usize,
    ) -> Result<Vec<AcquisitionWindow>, QubeError> {
        Ok(self.device(session)?.readout()?.mux(mux)?.windows().clone())
    }

    /// Sets the acquisition windows of a mux channel from `(start, end)` pairs in \[ns\].
    pub fn set_acquisition_window(
        &self,
        session: &Session,
        mux: usize,
        windows: &[(f64, f64)],
    ) -> Result<Vec<AcquisitionWindow>, QubeError> {
        let windows = windows
            .iter()
            .map(|&(start, end)| AcquisitionWindow::from_ns(start, end))
            .collect::<Result<Vec<_>, _>>()?;
        self.device(session)?
            .readout_mut()?
            .set_windows(mux, windows.clone())?;
        Ok(windows)
    }

    /// Returns the acquisition mode of a mux channel.
    pub fn acquisition_mode(
        &self,
        session: &Session,
        mux: usize,
    ) -> Result<AcquisitionMode, QubeError> {
        Ok(self.device(session)?.readout()?.mux(mux)?.mode())
    }

    /// Sets the acquisition mode of a mux channel.
    pub fn set_acquisition_mode(
        &self,
        session: &Session,
        mux: usize,
        mode: AcquisitionMode,
    ) -> Result<AcquisitionMode, QubeError> {
        self.device(session)?.readout_mut()?.set_mode(mux, mode)?;
        Ok(mode)
    }

    /// Whether the capture units of mux channels are armed in `session`.
    ///
    /// All channels when `mux` is `None`.
    pub fn acquisition_mux_enable(
        &self,
        session: &Session,
        mux: Option<usize>,
    ) -> Result<Vec<bool>, QubeError> {
        let dev = self.device(session)?;
        let capture = dev.readout()?;
        let muxs = match mux {
            Some(m) => vec![m],
            None => (0..MUX_CHANNELS).collect(),
        };
        let enabled = capture
            .units(&muxs)?
            .into_iter()
            .map(|unit| {
                session
                    .ledger()
                    .is_unit_armed(dev.chassis(), capture.module(), unit)
            })
            .collect();
        Ok(enabled)
    }

    /// Sets the complex FIR coefficients of a mux channel.
    pub fn set_acquisition_fir_coefficients(
        &self,
        session: &Session,
        mux: usize,
        coefs: Vec<Complex64>,
    ) -> Result<bool, QubeError> {
        self.device(session)?
            .readout_mut()?
            .set_fir_coefficients(mux, coefs)?;
        Ok(true)
    }

    /// Sets the complex window coefficients of a mux channel.
    pub fn set_acquisition_window_coefficients(
        &self,
        session: &Session,
        mux: usize,
        coefs: Vec<Complex64>,
    ) -> Result<bool, QubeError> {
        self.device(session)?
            .readout_mut()?
            .set_window_coefficients(mux, coefs)?;
        Ok(true)
    }

    /// Sets Gaussian band-pass FIR coefficients for a baseband frequency.
    pub fn debug_auto_acquisition_fir_coefficients(
        &self,
        session: &Session,
        mux: usize,
        baseband: Freq,
        sigma: Option<f64>,
    ) -> Result<bool, QubeError> {
        let mut dev = self.device(session)?;
        let capture = dev.readout_mut()?;
        capture.mux(mux)?;
        let coefs = gaussian_fir_coefficients(baseband, sigma.unwrap_or(DEFAULT_FIR_SIGMA))?;
        capture.set_fir_coefficients(mux, coefs)?;
        Ok(true)
    }

    /// Sets a rectangular demodulation window for a baseband frequency.
    ///
    /// The window spans the longest acquisition window.
    pub fn debug_auto_acquisition_window_coefficients(
        &self,
        session: &Session,
        mux: usize,
        baseband: Freq,
    ) -> Result<bool, QubeError> {
        let mut dev = self.device(session)?;
        let capture = dev.readout_mut()?;
        let coefs = rectangular_window_coefficients(baseband, capture.mux(mux)?.windows())?;
        capture.set_window_coefficients(mux, coefs)?;
        Ok(true)
    }

    /// Whether the microwave switch of the selected device is connected.
    pub fn debug_microwave_switch(&self, session: &Session) -> Result<bool, QubeError> {
        Ok(self.device(session)?.switch()?.is_on()?)
    }

    /// Connects or disconnects the microwave switch of the selected device.
    pub fn set_debug_microwave_switch(
        &self,
        session: &Session,
        on: bool,
    ) -> Result<bool, QubeError> {
        self.device(session)?.switch()?.set(on)?;
        Ok(on)
    }

    /// Reads or writes a bit field of the AWG control registers of the selected device.
    ///
    /// Writes `data` if given. Returns the value of the field.
    pub fn debug_awg_ctrl_reg(
        &self,
        session: &Session,
        field: RegisterField,
        data: Option<u32>,
    ) -> Result<u32, QubeError> {
        let value = self.device(session)?.awg().access_register(field, data)?;
        tracing::debug!("AWG register {:?}: {:#x}", field, value);
        Ok(value)
    }

    /// Reads or writes a bit field of the capture control registers of the selected device.
    pub fn debug_cap_ctrl_reg(
        &self,
        session: &Session,
        field: RegisterField,
        data: Option<u32>,
    ) -> Result<u32, QubeError> {
        let value = self
            .device(session)?
            .readout()?
            .access_register(field, data)?;
        tracing::debug!("capture register {:?}: {:#x}", field, value);
        Ok(value)
    }

    /// Returns the LO frequency.
    pub fn frequency_local(&self, session: &Session) -> Result<Freq, QubeError> {
        Ok(self.device(session)?.frequency().lo_frequency()?)
    }

    /// Sets the LO frequency. It must be a multiple of 100 MHz.
    pub fn set_frequency_local(&self, session: &Session, freq: Freq) -> Result<Freq, QubeError> {
        self.device(session)?.frequency().set_lo_frequency(freq)?;
        Ok(freq)
    }

    /// Returns the coarse NCO frequency of the DAC.
    pub fn frequency_tx_nco(&self, session: &Session) -> Result<Freq, QubeError> {
        Ok(self.device(session)?.frequency().dac_coarse_frequency()?)
    }

    /// Sets the coarse NCO frequency of the DAC.
    pub fn set_frequency_tx_nco(&self, session: &Session, freq: Freq) -> Result<Freq, QubeError> {
        self.device(session)?
            .frequency()
            .set_dac_coarse_frequency(freq)?;
        Ok(freq)
    }

    /// Returns the fine NCO frequency of an AWG channel.
    pub fn frequency_tx_fine_nco(
        &self,
        session: &Session,
        channel: usize,
    ) -> Result<Freq, QubeError> {
        Ok(self.device(session)?.frequency().dac_fine_frequency(channel)?)
    }

    /// Sets the fine NCO frequency of an AWG channel.
    pub fn set_frequency_tx_fine_nco(
        &self,
        session: &Session,
        channel: usize,
        freq: Freq,
    ) -> Result<Freq, QubeError> {
        self.device(session)?
            .frequency()
            .set_dac_fine_frequency(channel, freq)?;
        Ok(freq)
    }

    /// Returns the coarse NCO frequency of the ADC.
    pub fn frequency_rx_nco(&self, session: &Session) -> Result<Freq, QubeError> {
        Ok(self.device(session)?.rx_coarse_frequency()?)
    }

    /// Sets the coarse NCO frequency of the ADC.
    pub fn set_frequency_rx_nco(&self, session: &Session, freq: Freq) -> Result<Freq, QubeError> {
        self.device(session)?.set_rx_coarse_frequency(freq)?;
        Ok(freq)
    }

    /// Returns the mixer sideband.
    pub fn frequency_sideband(&self, session: &Session) -> Result<Sideband, QubeError> {
        Ok(self.device(session)?.frequency().sideband()?)
    }

    /// Sets the mixer sideband.
    pub fn set_frequency_sideband(
        &self,
        session: &Session,
        sideband: Sideband,
    ) -> Result<Sideband, QubeError> {
        self.device(session)?.frequency().set_sideband(sideband)?;
        Ok(sideband)
    }
}
