use std::f64::consts::PI;

use num_complex::{Complex, Complex64};
use qube_core::common::{
    Freq, ADC_BASEBAND_SAMPLE_INTERVAL, ADC_BASEBAND_SAMPLE_RATE_MHZ,
    ADC_DECIMATED_SAMPLE_RATE_MHZ, FIR_COEFS_MAX, SAMPLES_PER_CAPTURE_WORD, WINDOW_COEFS_MAX,
};

use super::AcquisitionWindow;
use crate::error::QubeDriverError;

const AUTO_COEF_SCALE: f64 = 1.0 - 1e-3;

/// The default Gaussian width of [`gaussian_fir_coefficients`] in taps.
pub const DEFAULT_FIR_SIGMA: f64 = 3.0;

/// The FIR coefficients of a freshly created mux channel.
#[must_use]
pub fn default_fir_coefficients() -> Vec<Complex64> {
    vec![Complex64::new(1.0, 0.0); 8]
}

fn validate(
    name: &'static str,
    coefs: &[Complex64],
    max_len: usize,
) -> Result<(), QubeDriverError> {
    if coefs.is_empty() || coefs.len() > max_len {
        return Err(QubeDriverError::out_of_range(
            name,
            coefs.len() as f64,
            1.0,
            max_len as f64,
        ));
    }
    let peak = coefs.iter().map(|c| c.norm()).fold(0.0, f64::max);
    if peak >= 1.0 {
        return Err(QubeDriverError::out_of_range(
            "coefficient magnitude",
            peak,
            0.0,
            1.0,
        ));
    }
    Ok(())
}

/// Checks the number and magnitude of complex FIR coefficients.
pub fn validate_fir_coefficients(coefs: &[Complex64]) -> Result<(), QubeDriverError> {
    validate("number of FIR coefficients", coefs, FIR_COEFS_MAX)
}

/// Checks the number and magnitude of complex window coefficients.
pub fn validate_window_coefficients(coefs: &[Complex64]) -> Result<(), QubeDriverError> {
    validate("number of window coefficients", coefs, WINDOW_COEFS_MAX)
}

/// Converts coefficients to fixed point, truncating toward zero.
#[must_use]
pub fn quantize_coefficients(coefs: &[Complex64], full_scale: f64) -> Vec<Complex<i32>> {
    coefs
        .iter()
        .map(|c| Complex::new((c.re * full_scale) as i32, (c.im * full_scale) as i32))
        .collect()
}

fn check_baseband(freq: Freq) -> Result<f64, QubeDriverError> {
    let mhz = freq.mhz();
    let nyquist = ADC_BASEBAND_SAMPLE_RATE_MHZ / 2.0;
    if mhz <= -nyquist || nyquist <= mhz {
        return Err(QubeDriverError::out_of_range(
            "baseband frequency",
            mhz,
            -nyquist,
            nyquist,
        ));
    }
    Ok(mhz)
}

/// A Gaussian band-pass FIR filter centered on the band nearest to `baseband`.
///
/// The baseband is split into [`FIR_COEFS_MAX`] bands. `sigma` is the width of the
/// envelope in taps.
pub fn gaussian_fir_coefficients(
    baseband: Freq,
    sigma: f64,
) -> Result<Vec<Complex64>, QubeDriverError> {
    let mhz = check_baseband(baseband)?;
    let n = FIR_COEFS_MAX as f64;
    let band_step = ADC_BASEBAND_SAMPLE_RATE_MHZ / n;
    let band = (mhz / band_step + 0.5 + n) as i64 - FIR_COEFS_MAX as i64;
    let band_center = band_step * band as f64;
    Ok((0..FIR_COEFS_MAX)
        .map(|i| {
            let x = i as f64 - (n - 1.0) / 2.0;
            let envelope = (-0.5 * x * x / (sigma * sigma)).exp();
            let phase = 2.0 * PI * (band_center / ADC_BASEBAND_SAMPLE_RATE_MHZ) * i as f64;
            Complex64::from_polar(envelope * AUTO_COEF_SCALE, phase)
        })
        .collect())
}

/// A rectangular demodulation window at `baseband` spanning the longest of `windows`.
pub fn rectangular_window_coefficients(
    baseband: Freq,
    windows: &[AcquisitionWindow],
) -> Result<Vec<Complex64>, QubeDriverError> {
    let mhz = check_baseband(baseband)?;
    let longest = windows.iter().map(AcquisitionWindow::len).max().unwrap_or(0);
    let num_samples = longest / (SAMPLES_PER_CAPTURE_WORD as u64 * ADC_BASEBAND_SAMPLE_INTERVAL);
    Ok((0..num_samples)
        .map(|i| {
            let phase = -2.0 * PI * (mhz / ADC_DECIMATED_SAMPLE_RATE_MHZ) * i as f64;
            Complex64::from_polar(AUTO_COEF_SCALE, phase)
        })
        .collect())
}
