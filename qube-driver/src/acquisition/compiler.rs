use num_complex::Complex64;
use qube_core::{
    common::{round_div, CAPTURE_WORD_INTERVAL, FIR_COEF_FULL_SCALE, WINDOW_COEF_FULL_SCALE},
    descriptor::CaptureParam,
};

use super::{quantize_coefficients, validate_windows, AcquisitionMode, AcquisitionWindow};
use crate::error::{QubeDriverError, WindowError};

/// The settings of one mux channel that determine its capture parameter.
#[derive(Clone, Copy, Debug)]
pub struct ReadoutSettings<'a> {
    /// Acquisition windows.
    pub windows: &'a [AcquisitionWindow],
    /// Repetition time in \[ns\].
    pub repetition_time: u64,
    /// Number of shots.
    pub shots: u32,
    /// DSP pipeline.
    pub mode: AcquisitionMode,
    /// Complex FIR coefficients.
    pub fir_coefficients: &'a [Complex64],
    /// Complex window coefficients.
    pub window_coefficients: &'a [Complex64],
}

fn to_words(ns: u64) -> Result<u32, QubeDriverError> {
    u32::try_from(round_div(ns, CAPTURE_WORD_INTERVAL)).map_err(|_| {
        QubeDriverError::out_of_range("capture word count", ns as f64, 0.0, u32::MAX as f64)
    })
}

/// Translates acquisition windows into capture words.
///
/// Returns the capture delay and one `(capture_words, blank_words)` pair per window.
/// The blank after the last window extends to the first window of the next repetition.
pub fn sum_sections(
    windows: &[AcquisitionWindow],
    repetition_time: u64,
) -> Result<(u32, Vec<(u32, u32)>), QubeDriverError> {
    validate_windows(windows)?;

    let delay = to_words(windows[0].start())?;
    let next_start = to_words(repetition_time)? as u64 + delay as u64;
    let last_end = windows.last().map_or(0, AcquisitionWindow::end);
    if (next_start * CAPTURE_WORD_INTERVAL) < last_end {
        return Err(WindowError::ExceedsRepetition {
            end: last_end,
            next_start: next_start * CAPTURE_WORD_INTERVAL,
        }
        .into());
    }

    let starts = windows
        .iter()
        .skip(1)
        .map(|w| to_words(w.start()))
        .chain(std::iter::once(u32::try_from(next_start).map_err(|_| {
            QubeDriverError::out_of_range(
                "capture word count",
                next_start as f64,
                0.0,
                u32::MAX as f64,
            )
        })));
    let mut section_start = delay;
    let sections = windows
        .iter()
        .zip(starts)
        .map(|(w, next)| -> Result<(u32, u32), QubeDriverError> {
            let end = to_words(w.end())?;
            let next = next?;
            let section = (end - section_start, next - end);
            section_start = next;
            Ok(section)
        })
        .collect::<Result<Vec<_>, QubeDriverError>>()?;

    Ok((delay, sections))
}

/// Compiles the capture parameter of one mux channel.
#[tracing::instrument(level = "debug", skip_all, fields(mode = %settings.mode))]
pub fn compile_capture_param(settings: &ReadoutSettings) -> Result<CaptureParam, QubeDriverError> {
    let (delay, sections) = sum_sections(settings.windows, settings.repetition_time)?;

    let mut param = CaptureParam::new();
    param.set_num_integ_sections(settings.shots);
    param.set_capture_delay(delay);
    sections
        .iter()
        .for_each(|&(capture, blank)| param.add_sum_section(capture, blank));

    let mode = settings.mode;
    if mode.decimation() {
        param.set_complex_fir_coefs(quantize_coefficients(
            settings.fir_coefficients,
            FIR_COEF_FULL_SCALE,
        ));
    }
    if mode.summation() {
        param.set_sum_range(0, CaptureParam::MAX_SUM_SECTION_LEN);
        param.set_complex_window_coefs(quantize_coefficients(
            settings.window_coefficients,
            WINDOW_COEF_FULL_SCALE,
        ));
    }
    param.enable_dsp_units(mode.dsp_units());

    tracing::debug!(
        "capture delay: {}, sections: {:?}, units: {:?}",
        param.capture_delay(),
        param.sum_sections(),
        param.dsp_units()
    );
    Ok(param)
}
