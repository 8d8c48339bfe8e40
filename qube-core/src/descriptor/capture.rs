use std::collections::BTreeSet;

use getset::{CopyGetters, Getters};
use num_complex::Complex;

/// A stage of the capture DSP pipeline.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DspUnit {
    /// Complex FIR filter.
    ComplexFir,
    /// Decimation by four.
    Decimation,
    /// Complex window multiplication.
    ComplexWindow,
    /// Summation over a sum section.
    Sum,
    /// Integration over repetitions.
    Integration,
}

/// A captured interval followed by a blank interval, both in capture words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CopyGetters)]
pub struct SumSection {
    #[getset(get_copy = "pub")]
    /// The number of captured words.
    capture_words: u32,
    #[getset(get_copy = "pub")]
    /// The number of words skipped after the capture.
    blank_words: u32,
}

impl SumSection {
    /// Creates a new [`SumSection`].
    #[must_use]
    pub const fn new(capture_words: u32, blank_words: u32) -> Self {
        Self {
            capture_words,
            blank_words,
        }
    }
}

/// The parameter block of one capture unit.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct CaptureParam {
    #[getset(get_copy = "pub")]
    /// The number of words to wait after the start trigger.
    capture_delay: u32,
    #[getset(get = "pub")]
    /// The sum sections of one repetition.
    sum_sections: Vec<SumSection>,
    #[getset(get_copy = "pub")]
    /// The number of repetitions to capture.
    num_integ_sections: u32,
    #[getset(get_copy = "pub")]
    /// The first word of a section included in the summation.
    sum_start_word_no: u32,
    #[getset(get_copy = "pub")]
    /// The number of words of a section included in the summation.
    num_words_to_sum: u32,
    #[getset(get = "pub")]
    /// Quantized complex FIR coefficients.
    complex_fir_coefs: Vec<Complex<i32>>,
    #[getset(get = "pub")]
    /// Quantized complex window coefficients.
    complex_window_coefs: Vec<Complex<i32>>,
    #[getset(get = "pub")]
    /// The enabled DSP stages.
    dsp_units: BTreeSet<DspUnit>,
}

impl Default for CaptureParam {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureParam {
    /// Sums every word of a section.
    pub const MAX_SUM_SECTION_LEN: u32 = u32::MAX;

    /// Creates an empty [`CaptureParam`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            capture_delay: 0,
            sum_sections: Vec::new(),
            num_integ_sections: 1,
            sum_start_word_no: 0,
            num_words_to_sum: Self::MAX_SUM_SECTION_LEN,
            complex_fir_coefs: Vec::new(),
            complex_window_coefs: Vec::new(),
            dsp_units: BTreeSet::new(),
        }
    }

    /// Sets the capture delay.
    pub fn set_capture_delay(&mut self, words: u32) {
        self.capture_delay = words;
    }

    /// Appends a sum section.
    pub fn add_sum_section(&mut self, capture_words: u32, blank_words: u32) {
        self.sum_sections
            .push(SumSection::new(capture_words, blank_words));
    }

    /// Sets the number of repetitions to capture.
    pub fn set_num_integ_sections(&mut self, n: u32) {
        self.num_integ_sections = n;
    }

    /// Sets the range of words included in the summation.
    pub fn set_sum_range(&mut self, start_word_no: u32, num_words: u32) {
        self.sum_start_word_no = start_word_no;
        self.num_words_to_sum = num_words;
    }

    /// Sets the complex FIR coefficients.
    pub fn set_complex_fir_coefs(&mut self, coefs: Vec<Complex<i32>>) {
        self.complex_fir_coefs = coefs;
    }

    /// Sets the complex window coefficients.
    pub fn set_complex_window_coefs(&mut self, coefs: Vec<Complex<i32>>) {
        self.complex_window_coefs = coefs;
    }

    /// Enables the given DSP stages.
    pub fn enable_dsp_units(&mut self, units: impl IntoIterator<Item = DspUnit>) {
        self.dsp_units.extend(units);
    }

    /// Whether `unit` is enabled.
    #[must_use]
    pub fn is_enabled(&self, unit: DspUnit) -> bool {
        self.dsp_units.contains(&unit)
    }
}
