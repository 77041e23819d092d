//! Error types for the rANS coders.

use thiserror::Error;

/// Error variants for statistics construction, encoding and decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// More distinct symbols than probability slots: some symbol would be
    /// left with frequency 0.
    #[error("statistics overflow: {distinct} distinct symbols do not fit a total of {total}")]
    StatisticsOverflow {
        /// Number of symbols with a nonzero raw count.
        distinct: usize,
        /// Requested probability total.
        total: u32,
    },

    /// Probability total is not a power of two, or the scale bit count is
    /// outside the supported range.
    #[error("invalid probability scale: {0}")]
    InvalidScale(u32),

    /// Decoder needed more words than the input holds.
    #[error("buffer underrun: {needed} more word(s) required")]
    BufferUnderrun {
        /// Words still required when the input ran out.
        needed: usize,
    },

    /// Encoder ran out of room at the front of its output buffer.
    #[error("buffer overflow: output capacity of {capacity} words exhausted")]
    BufferOverflow {
        /// Capacity of the output buffer in words.
        capacity: usize,
    },

    /// Adapted CDF is no longer monotone or no longer sums to the scale.
    #[error("adaptive distribution diverged at cumulative index {index}")]
    AdaptiveDivergence {
        /// First offending cumulative index.
        index: usize,
    },

    /// Alphabet is empty or larger than 256 symbols.
    #[error("invalid alphabet size: {0}")]
    InvalidAlphabet(usize),

    /// Symbol has normalized frequency 0 and cannot be coded.
    #[error("symbol {0} has zero frequency")]
    UnencodableSymbol(u8),

    /// Coder asked to encode a zero-width range.
    #[error("cannot encode a symbol with frequency 0")]
    ZeroFrequency,

    /// Lane count not supported by the interleaved or vectorized coders.
    #[error("unsupported lane count: {0}")]
    InvalidLaneCount(usize),

    /// Adaptive block size is not a power of two.
    #[error("adaptive split size {0} is not a power of two")]
    InvalidSplitSize(usize),

    /// Adaptation shift too large for the probability scale.
    #[error("adaptation rate {0} out of range")]
    InvalidAdaptRate(u32),

    /// Decoding consumed the stream but a coder state did not return to its
    /// initial value.
    #[error("corrupt stream: final coder state mismatch")]
    CorruptStream,
}

/// A specialized Result type for rANS operations.
pub type Result<T> = std::result::Result<T, Error>;
