use num_complex::Complex64;
use qube::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServerError;

/// One request line.
///
/// Settings with an optional `value` are read when it is omitted and written otherwise.
///
/// Times are in ns, frequencies in MHz and DAQ durations in seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "setting", rename_all = "snake_case")]
pub enum Request {
    /// Names of the opened devices.
    ListDevices,
    /// Selects the device of the session.
    SelectDevice {
        /// Device name.
        device: String,
    },
    /// Reloads the skew table from the configuration file.
    ReloadSkew,
    /// Number of shots.
    Shots {
        /// New value.
        value: Option<u32>,
    },
    /// Repetition time.
    RepetitionTime {
        /// New value.
        value: Option<f64>,
    },
    /// Sequence length.
    SequenceLength {
        /// New value.
        value: Option<f64>,
    },
    /// Number of AWG channels.
    DacChannels,
    /// Arms AWG channels.
    UploadParameters {
        /// Channel indices.
        channels: Vec<usize>,
    },
    /// Writes waveforms, one row per channel.
    UploadWaveform {
        /// `[re, im]` samples.
        waveforms: Vec<Vec<Complex64>>,
        /// Channel indices.
        channels: Vec<usize>,
    },
    /// Writes capture parameters and arms mux channels.
    UploadReadoutParameters {
        /// Mux channels.
        muxs: Vec<usize>,
    },
    /// Reads captured data, one row per mux channel.
    DownloadWaveform {
        /// Mux channels.
        muxs: Vec<usize>,
    },
    /// Number of acquisition windows.
    AcquisitionNumber {
        /// Mux channel.
        mux: usize,
        /// New value.
        value: Option<usize>,
    },
    /// Acquisition windows.
    AcquisitionWindow {
        /// Mux channel.
        mux: usize,
        /// New `(start, end)` pairs.
        value: Option<Vec<(f64, f64)>>,
    },
    /// Acquisition mode, one of `1`, `2`, `3`, `A`, `B`.
    AcquisitionMode {
        /// Mux channel.
        mux: usize,
        /// New value.
        value: Option<String>,
    },
    /// Whether mux channels are armed.
    AcquisitionMuxEnable {
        /// Mux channel, all when omitted.
        mux: Option<usize>,
    },
    /// FIR coefficients.
    AcquisitionFirCoefficients {
        /// Mux channel.
        mux: usize,
        /// `[re, im]` coefficients.
        value: Vec<Complex64>,
    },
    /// Window coefficients.
    AcquisitionWindowCoefficients {
        /// Mux channel.
        mux: usize,
        /// `[re, im]` coefficients.
        value: Vec<Complex64>,
    },
    /// LO frequency.
    FrequencyLocal {
        /// New value.
        value: Option<f64>,
    },
    /// DAC coarse NCO frequency.
    FrequencyTxNco {
        /// New value.
        value: Option<f64>,
    },
    /// DAC fine NCO frequency.
    FrequencyTxFineNco {
        /// AWG channel.
        channel: usize,
        /// New value.
        value: Option<f64>,
    },
    /// ADC coarse NCO frequency.
    FrequencyRxNco {
        /// New value.
        value: Option<f64>,
    },
    /// Mixer sideband.
    FrequencySideband {
        /// New value.
        value: Option<Sideband>,
    },
    /// Routes trigger AWGs to the armed capture units.
    DaqStart,
    /// Fires the armed AWGs.
    DaqTrigger,
    /// Waits for the armed AWGs.
    DaqStop,
    /// Disarms every channel.
    DaqClear,
    /// Forcibly stops the armed channels.
    DaqTerminate,
    /// `daq_stop` timeout.
    DaqTimeout {
        /// New value.
        value: Option<f64>,
    },
    /// Delay between the clock reading and the fire time.
    DaqSyncDelay {
        /// New value.
        value: Option<f64>,
    },
    /// Sets Gaussian FIR coefficients for a baseband frequency.
    DebugAutoAcquisitionFirCoefficients {
        /// Mux channel.
        mux: usize,
        /// Baseband frequency.
        bb_frequency: f64,
        /// Envelope width in taps.
        sigma: Option<f64>,
    },
    /// Sets rectangular window coefficients for a baseband frequency.
    DebugAutoAcquisitionWindowCoefficients {
        /// Mux channel.
        mux: usize,
        /// Baseband frequency.
        bb_frequency: f64,
    },
    /// Microwave switch.
    DebugMicrowaveSwitch {
        /// New value.
        value: Option<bool>,
    },
    /// Bit field of an AWG control register.
    DebugAwgCtrlReg {
        /// Block address.
        addr: u32,
        /// Register offset.
        offset: u32,
        /// First bit.
        pos: u32,
        /// Field width.
        bits: u32,
        /// New value.
        data: Option<u32>,
    },
    /// Bit field of a capture control register.
    DebugCapCtrlReg {
        /// Block address.
        addr: u32,
        /// Register offset.
        offset: u32,
        /// First bit.
        pos: u32,
        /// Field width.
        bits: u32,
        /// New value.
        data: Option<u32>,
    },
}

/// The reply to one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// The value of the setting.
    Ok(Value),
    /// The error message.
    Error(String),
}

impl Request {
    /// Parses a request line. Obsoleted settings are rejected by name.
    pub fn parse(line: &str) -> Result<Self, ServerError> {
        let value: Value = serde_json::from_str(line)?;
        let setting = value
            .get("setting")
            .and_then(Value::as_str)
            .ok_or(ServerError::MissingSetting)?;
        if let Some(e) = obsoleted(setting) {
            return Err(e.into());
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn ok(value: impl Serialize) -> Result<Value, ServerError> {
    Ok(serde_json::to_value(value)?)
}

fn windows(windows: &[AcquisitionWindow]) -> Vec<(u64, u64)> {
    windows.iter().map(|w| (w.start(), w.end())).collect()
}

/// Runs one request in `session`.
pub async fn dispatch(
    qube: &QubeController,
    session: &mut Session,
    request: Request,
) -> Result<Value, ServerError> {
    match request {
        Request::ListDevices => ok(qube.list_devices()),
        Request::SelectDevice { device } => ok(qube.select_device(session, &device)?),
        Request::ReloadSkew => ok(qube.reload_skew()?),
        Request::Shots { value: None } => ok(qube.shots(session)?),
        Request::Shots { value: Some(v) } => ok(qube.set_shots(session, v)?),
        Request::RepetitionTime { value: None } => ok(qube.repetition_time(session)?),
        Request::RepetitionTime { value: Some(v) } => ok(qube.set_repetition_time(session, v)?),
        Request::SequenceLength { value: None } => ok(qube.sequence_length(session)?),
        Request::SequenceLength { value: Some(v) } => ok(qube.set_sequence_length(session, v)?),
        Request::DacChannels => ok(qube.dac_channels(session)?),
        Request::UploadParameters { channels } => ok(qube.upload_parameters(session, &channels)?),
        Request::UploadWaveform { waveforms, channels } => {
            ok(qube.upload_waveform(session, &waveforms, &channels)?)
        }
        Request::UploadReadoutParameters { muxs } => {
            ok(qube.upload_readout_parameters(session, &muxs)?)
        }
        Request::DownloadWaveform { muxs } => ok(qube.download_waveform(session, &muxs)?),
        Request::AcquisitionNumber { mux, value: None } => {
            ok(qube.acquisition_number(session, mux)?)
        }
        Request::AcquisitionNumber { mux, value: Some(n) } => {
            ok(qube.set_acquisition_number(session, mux, n)?)
        }
        Request::AcquisitionWindow { mux, value: None } => {
            ok(windows(&qube.acquisition_window(session, mux)?))
        }
        Request::AcquisitionWindow { mux, value: Some(w) } => {
            ok(windows(&qube.set_acquisition_window(session, mux, &w)?))
        }
        Request::AcquisitionMode { mux, value: None } => {
            ok(qube.acquisition_mode(session, mux)?.to_string())
        }
        Request::AcquisitionMode { mux, value: Some(mode) } => {
            let mode = mode.parse::<AcquisitionMode>().map_err(QubeError::from)?;
            ok(qube.set_acquisition_mode(session, mux, mode)?.to_string())
        }
        Request::AcquisitionMuxEnable { mux } => ok(qube.acquisition_mux_enable(session, mux)?),
        Request::AcquisitionFirCoefficients { mux, value } => {
            ok(qube.set_acquisition_fir_coefficients(session, mux, value)?)
        }
        Request::AcquisitionWindowCoefficients { mux, value } => {
            ok(qube.set_acquisition_window_coefficients(session, mux, value)?)
        }
        Request::FrequencyLocal { value: None } => ok(qube.frequency_local(session)?.mhz()),
        Request::FrequencyLocal { value: Some(f) } => {
            ok(qube.set_frequency_local(session, f * MHz)?.mhz())
        }
        Request::FrequencyTxNco { value: None } => ok(qube.frequency_tx_nco(session)?.mhz()),
        Request::FrequencyTxNco { value: Some(f) } => {
            ok(qube.set_frequency_tx_nco(session, f * MHz)?.mhz())
        }
        Request::FrequencyTxFineNco { channel, value: None } => {
            ok(qube.frequency_tx_fine_nco(session, channel)?.mhz())
        }
        Request::FrequencyTxFineNco { channel, value: Some(f) } => {
            ok(qube.set_frequency_tx_fine_nco(session, channel, f * MHz)?.mhz())
        }
        Request::FrequencyRxNco { value: None } => ok(qube.frequency_rx_nco(session)?.mhz()),
        Request::FrequencyRxNco { value: Some(f) } => {
            ok(qube.set_frequency_rx_nco(session, f * MHz)?.mhz())
        }
        Request::FrequencySideband { value: None } => ok(qube.frequency_sideband(session)?),
        Request::FrequencySideband { value: Some(sb) } => {
            ok(qube.set_frequency_sideband(session, sb)?)
        }
        Request::DaqStart => ok(qube.daq_start(session)?),
        Request::DaqTrigger => ok(qube.daq_trigger(session)?),
        Request::DaqStop => ok(qube.daq_stop(session).await?),
        Request::DaqClear => ok(qube.daq_clear(session)?),
        Request::DaqTerminate => ok(qube.daq_terminate(session)?),
        Request::DaqTimeout { value: None } => ok(qube.daq_timeout(session)),
        Request::DaqTimeout { value: Some(secs) } => ok(qube.set_daq_timeout(session, secs)?),
        Request::DaqSyncDelay { value: None } => ok(qube.daq_sync_delay(session)),
        Request::DaqSyncDelay { value: Some(secs) } => ok(qube.set_daq_sync_delay(session, secs)?),
        Request::DebugAutoAcquisitionFirCoefficients {
            mux,
            bb_frequency,
            sigma,
        } => ok(qube.debug_auto_acquisition_fir_coefficients(
            session,
            mux,
            bb_frequency * MHz,
            sigma,
        )?),
        Request::DebugAutoAcquisitionWindowCoefficients { mux, bb_frequency } => {
            ok(qube.debug_auto_acquisition_window_coefficients(session, mux, bb_frequency * MHz)?)
        }
        Request::DebugMicrowaveSwitch { value: None } => ok(qube.debug_microwave_switch(session)?),
        Request::DebugMicrowaveSwitch { value: Some(on) } => {
            ok(qube.set_debug_microwave_switch(session, on)?)
        }
        Request::DebugAwgCtrlReg {
            addr,
            offset,
            pos,
            bits,
            data,
        } => {
            let field = RegisterField::new(addr, offset, pos, bits).map_err(QubeError::from)?;
            ok(qube.debug_awg_ctrl_reg(session, field, data)?)
        }
        Request::DebugCapCtrlReg {
            addr,
            offset,
            pos,
            bits,
            data,
        } => {
            let field = RegisterField::new(addr, offset, pos, bits).map_err(QubeError::from)?;
            ok(qube.debug_cap_ctrl_reg(session, field, data)?)
        }
    }
}

/// Parses and runs one request line.
pub async fn handle_line(qube: &QubeController, session: &mut Session, line: &str) -> Response {
    let result = match Request::parse(line) {
        Ok(request) => {
            tracing::debug!("{:?}", request);
            dispatch(qube, session, request).await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(value) => Response::Ok(value),
        Err(e) => {
            tracing::debug!("{}", e);
            Response::Error(e.to_string())
        }
    }
}
