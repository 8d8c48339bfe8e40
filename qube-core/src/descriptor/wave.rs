use getset::{CopyGetters, Getters};
use num_complex::Complex;

/// A quantized IQ sample.
pub type IqSample = Complex<i16>;

/// A run of samples followed by blank words.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct WaveChunk {
    #[getset(get = "pub")]
    /// The samples of this chunk.
    iq_samples: Vec<IqSample>,
    #[getset(get_copy = "pub")]
    /// The number of blank words output after the samples.
    num_blank_words: u32,
    #[getset(get_copy = "pub")]
    /// The number of times this chunk is repeated.
    num_repeats: u32,
}

/// The program of one AWG.
#[derive(Clone, Debug, PartialEq, Getters, CopyGetters)]
pub struct WaveSequence {
    #[getset(get_copy = "pub")]
    /// The number of words to wait before the first chunk.
    num_wait_words: u32,
    #[getset(get_copy = "pub")]
    /// The number of times the whole sequence is repeated.
    num_repeats: u32,
    #[getset(get = "pub")]
    /// The chunks of this sequence.
    chunks: Vec<WaveChunk>,
}

impl WaveSequence {
    /// Creates an empty [`WaveSequence`].
    #[must_use]
    pub const fn new(num_wait_words: u32, num_repeats: u32) -> Self {
        Self {
            num_wait_words,
            num_repeats,
            chunks: Vec::new(),
        }
    }

    /// Appends a chunk.
    pub fn add_chunk(&mut self, iq_samples: Vec<IqSample>, num_blank_words: u32, num_repeats: u32) {
        self.chunks.push(WaveChunk {
            iq_samples,
            num_blank_words,
            num_repeats,
        });
    }
}
