use getset::{CopyGetters, Getters};
use num_complex::{Complex32, Complex64};
use qube_core::{
    common::{AwgId, CaptureModuleId, CaptureUnitId, MUX_CHANNELS, WINDOWS_MAX},
    link::{lock, AdcLine, SharedCaptureController},
};

use super::RegisterField;
use crate::{
    acquisition::{
        compile_capture_param, default_fir_coefficients, default_windows,
        validate_fir_coefficients, validate_window_coefficients, validate_windows,
        AcquisitionMode, AcquisitionWindow, ReadoutSettings,
    },
    error::QubeDriverError,
};

/// The acquisition settings of one multiplexed readout channel.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct MuxChannel {
    #[getset(get = "pub")]
    /// Acquisition windows.
    windows: Vec<AcquisitionWindow>,
    #[getset(get_copy = "pub")]
    /// Number of acquisition windows per repetition.
    num_windows: usize,
    #[getset(get_copy = "pub")]
    /// DSP pipeline.
    mode: AcquisitionMode,
    #[getset(get = "pub")]
    /// Complex FIR coefficients.
    fir_coefficients: Vec<Complex64>,
    #[getset(get = "pub")]
    /// Complex window coefficients.
    window_coefficients: Vec<Complex64>,
}

impl Default for MuxChannel {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            num_windows: 1,
            mode: AcquisitionMode::default(),
            fir_coefficients: default_fir_coefficients(),
            window_coefficients: Vec::new(),
        }
    }
}

/// The capture module of a readout device and its mux channels.
pub struct CaptureCapability {
    ctrl: SharedCaptureController,
    module: CaptureModuleId,
    adc_line: AdcLine,
    mux: [MuxChannel; MUX_CHANNELS],
}

impl CaptureCapability {
    /// Creates a new [`CaptureCapability`] with default acquisition settings.
    #[must_use]
    pub fn new(ctrl: SharedCaptureController, module: CaptureModuleId, adc_line: AdcLine) -> Self {
        Self {
            ctrl,
            module,
            adc_line,
            mux: Default::default(),
        }
    }

    /// Returns the capture module.
    #[must_use]
    pub const fn module(&self) -> CaptureModuleId {
        self.module
    }

    /// Returns the ADC line of the readout port.
    #[must_use]
    pub const fn adc_line(&self) -> AdcLine {
        self.adc_line
    }

    /// Reads or writes a bit field of the capture control registers.
    pub fn access_register(
        &self,
        field: RegisterField,
        data: Option<u32>,
    ) -> Result<u32, QubeDriverError> {
        field.access(&mut *lock(&self.ctrl), data)
    }

    fn check_mux(mux: usize) -> Result<usize, QubeDriverError> {
        if mux < MUX_CHANNELS {
            Ok(mux)
        } else {
            Err(QubeDriverError::out_of_range(
                "mux channel",
                mux as f64,
                0.0,
                (MUX_CHANNELS - 1) as f64,
            ))
        }
    }

    /// Returns the capture unit of a mux channel.
    pub fn unit(&self, mux: usize) -> Result<CaptureUnitId, QubeDriverError> {
        Ok(self.module.units()[Self::check_mux(mux)?])
    }

    /// Returns the capture units of mux channels.
    pub fn units(&self, muxs: &[usize]) -> Result<Vec<CaptureUnitId>, QubeDriverError> {
        muxs.iter().map(|&m| self.unit(m)).collect()
    }

    /// Returns the settings of a mux channel.
    pub fn mux(&self, mux: usize) -> Result<&MuxChannel, QubeDriverError> {
        Ok(&self.mux[Self::check_mux(mux)?])
    }

    fn mux_mut(&mut self, mux: usize) -> Result<&mut MuxChannel, QubeDriverError> {
        Ok(&mut self.mux[Self::check_mux(mux)?])
    }

    /// Sets the acquisition windows of a mux channel.
    pub fn set_windows(
        &mut self,
        mux: usize,
        windows: Vec<AcquisitionWindow>,
    ) -> Result<(), QubeDriverError> {
        validate_windows(&windows)?;
        let ch = self.mux_mut(mux)?;
        ch.num_windows = windows.len();
        ch.windows = windows;
        Ok(())
    }

    /// Sets the number of acquisition windows of a mux channel.
    pub fn set_num_windows(&mut self, mux: usize, n: usize) -> Result<(), QubeDriverError> {
        if !(1..=WINDOWS_MAX).contains(&n) {
            return Err(QubeDriverError::out_of_range(
                "number of acquisition windows",
                n as f64,
                1.0,
                WINDOWS_MAX as f64,
            ));
        }
        self.mux_mut(mux)?.num_windows = n;
        Ok(())
    }

    /// Sets the DSP pipeline of a mux channel.
    pub fn set_mode(&mut self, mux: usize, mode: AcquisitionMode) -> Result<(), QubeDriverError> {
        self.mux_mut(mux)?.mode = mode;
        Ok(())
    }

    /// Sets the complex FIR coefficients of a mux channel.
    pub fn set_fir_coefficients(
        &mut self,
        mux: usize,
        coefs: Vec<Complex64>,
    ) -> Result<(), QubeDriverError> {
        validate_fir_coefficients(&coefs)?;
        self.mux_mut(mux)?.fir_coefficients = coefs;
        Ok(())
    }

    /// Sets the complex window coefficients of a mux channel.
    pub fn set_window_coefficients(
        &mut self,
        mux: usize,
        coefs: Vec<Complex64>,
    ) -> Result<(), QubeDriverError> {
        validate_window_coefficients(&coefs)?;
        self.mux_mut(mux)?.window_coefficients = coefs;
        Ok(())
    }

    /// Compiles and writes the capture parameters of mux channels.
    ///
    /// Every parameter is compiled before the first one is written.
    pub fn upload_parameters(
        &self,
        muxs: &[usize],
        repetition_time: u64,
        shots: u32,
    ) -> Result<(), QubeDriverError> {
        let params = muxs
            .iter()
            .map(|&m| -> Result<_, QubeDriverError> {
                let ch = self.mux(m)?;
                let param = compile_capture_param(&ReadoutSettings {
                    windows: &ch.windows,
                    repetition_time,
                    shots,
                    mode: ch.mode,
                    fir_coefficients: &ch.fir_coefficients,
                    window_coefficients: &ch.window_coefficients,
                })?;
                Ok((self.unit(m)?, param))
            })
            .collect::<Result<Vec<_>, QubeDriverError>>()?;

        let mut ctrl = lock(&self.ctrl);
        params
            .iter()
            .try_for_each(|(unit, param)| ctrl.set_capture_params(*unit, param))?;
        Ok(())
    }

    /// Makes `awg` the start trigger of this module and arms `units`.
    pub fn set_trigger_board(
        &self,
        awg: AwgId,
        units: &[CaptureUnitId],
    ) -> Result<(), QubeDriverError> {
        let mut ctrl = lock(&self.ctrl);
        ctrl.select_trigger_awg(self.module, awg)?;
        ctrl.enable_start_trigger(units)?;
        Ok(())
    }

    /// Reads the captured samples of mux channels, one row per channel.
    pub fn download(&self, muxs: &[usize]) -> Result<Vec<Vec<Complex32>>, QubeDriverError> {
        let units = self.units(muxs)?;
        let mut ctrl = lock(&self.ctrl);
        units
            .into_iter()
            .map(|unit| -> Result<_, QubeDriverError> {
                let n = ctrl.num_captured_samples(unit)?;
                Ok(ctrl.get_capture_data(unit, n)?)
            })
            .collect()
    }

    /// Forcibly stops capture units.
    pub fn terminate(&self, units: &[CaptureUnitId]) -> Result<(), QubeDriverError> {
        lock(&self.ctrl).terminate_capture_units(units)?;
        Ok(())
    }
}
