//! Runtime configuration for the block-level coders.
//!
//! The radix is a type parameter of the coders and is not part of these
//! structs; everything else that can be chosen at setup time lives here.

use crate::error::{Error, Result};
use crate::stats::{NormalizePolicy, MAX_SCALE_BITS};

/// Lane counts the block codec can instantiate.
pub const SUPPORTED_LANES: [usize; 4] = [1, 2, 4, 8];

/// How the lanes of a block are driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// One scalar coder per lane, stepped one symbol at a time.
    #[default]
    Interleaved,
    /// All lanes stepped in lockstep over a state array.
    ///
    /// Always encodes through reciprocals and decodes through the slot
    /// table; [`EncodePath`] and [`DecodePath`] are ignored.
    Vectorized,
}

/// How the encoder computes `x / freq`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EncodePath {
    /// Integer division on every symbol.
    Division,
    /// Precomputed reciprocal and a high multiply.
    #[default]
    Reciprocal,
}

/// How the decoder finds the symbol owning a slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodePath {
    /// Binary search over the cumulative frequencies.
    Search,
    /// Direct lookup in a table with one entry per slot.
    #[default]
    Table,
}

/// Configuration of a [`BlockCodec`](crate::codec::BlockCodec).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct CoderConfig {
    /// Probability total is `2^scale_bits`, `1..=16` (default: 14).
    pub scale_bits: u32,
    /// Number of interleaved states, one of 1, 2, 4 or 8 (default: 1).
    ///
    /// Encoder and decoder must agree on it; the stream does not record it.
    pub lanes: usize,
    /// See [`Layout`] (default: `Interleaved`).
    pub layout: Layout,
    /// See [`EncodePath`] (default: `Reciprocal`).
    pub encode_path: EncodePath,
    /// See [`DecodePath`] (default: `Table`).
    pub decode_path: DecodePath,
    /// Normalization used when the codec builds statistics itself
    /// (default: `Fast`).
    pub normalization: NormalizePolicy,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            scale_bits: 14,
            lanes: 1,
            layout: Layout::Interleaved,
            encode_path: EncodePath::Reciprocal,
            decode_path: DecodePath::Table,
            normalization: NormalizePolicy::Fast,
        }
    }
}

impl CoderConfig {
    /// Sets [`scale_bits`][CoderConfig::scale_bits].
    pub fn with_scale_bits(mut self, scale_bits: u32) -> Self {
        self.scale_bits = scale_bits;
        self
    }

    /// Sets [`lanes`][CoderConfig::lanes].
    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    /// Sets [`layout`][CoderConfig::layout].
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets [`encode_path`][CoderConfig::encode_path].
    pub fn with_encode_path(mut self, encode_path: EncodePath) -> Self {
        self.encode_path = encode_path;
        self
    }

    /// Sets [`decode_path`][CoderConfig::decode_path].
    pub fn with_decode_path(mut self, decode_path: DecodePath) -> Self {
        self.decode_path = decode_path;
        self
    }

    /// Sets [`normalization`][CoderConfig::normalization].
    pub fn with_normalization(mut self, normalization: NormalizePolicy) -> Self {
        self.normalization = normalization;
        self
    }

    /// Probability total.
    pub fn scale(&self) -> u32 {
        1 << self.scale_bits
    }

    /// Check every field.
    ///
    /// # Errors
    /// - `Error::InvalidScale` if `scale_bits` is outside `1..=16`.
    /// - `Error::InvalidLaneCount` if `lanes` is not 1, 2, 4 or 8.
    pub fn validate(&self) -> Result<()> {
        if self.scale_bits == 0 || self.scale_bits > MAX_SCALE_BITS {
            return Err(Error::InvalidScale(self.scale_bits));
        }
        if !SUPPORTED_LANES.contains(&self.lanes) {
            return Err(Error::InvalidLaneCount(self.lanes));
        }
        Ok(())
    }
}

/// Configuration of the adaptive order-1 coder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct AdaptiveConfig {
    /// Probability total is `2^scale_bits`, `1..=16` (default: 14).
    pub scale_bits: u32,
    /// Each update moves the live CDF `1 / 2^adapt_rate` of the way to the
    /// target, `0..=15` (default: 1).
    pub adapt_rate: u32,
    /// Symbols per independently decodable block; a power of two
    /// (default: 2^16).
    pub split_size: usize,
    /// Training weight added per observed symbol pair on top of the
    /// smoothing count of 1 (default: 16).
    pub increment: u32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            scale_bits: 14,
            adapt_rate: 1,
            split_size: 1 << 16,
            increment: 16,
        }
    }
}

impl AdaptiveConfig {
    /// Sets [`scale_bits`][AdaptiveConfig::scale_bits].
    pub fn with_scale_bits(mut self, scale_bits: u32) -> Self {
        self.scale_bits = scale_bits;
        self
    }

    /// Sets [`adapt_rate`][AdaptiveConfig::adapt_rate].
    pub fn with_adapt_rate(mut self, adapt_rate: u32) -> Self {
        self.adapt_rate = adapt_rate;
        self
    }

    /// Sets [`split_size`][AdaptiveConfig::split_size].
    pub fn with_split_size(mut self, split_size: usize) -> Self {
        self.split_size = split_size;
        self
    }

    /// Sets [`increment`][AdaptiveConfig::increment].
    pub fn with_increment(mut self, increment: u32) -> Self {
        self.increment = increment;
        self
    }

    /// Probability total.
    pub fn scale(&self) -> u32 {
        1 << self.scale_bits
    }

    /// Check every field.
    ///
    /// # Errors
    /// - `Error::InvalidScale` if `scale_bits` is outside `1..=16`.
    /// - `Error::InvalidAdaptRate` if `adapt_rate` exceeds 15.
    /// - `Error::InvalidSplitSize` unless `split_size` is a power of two.
    pub fn validate(&self) -> Result<()> {
        if self.scale_bits == 0 || self.scale_bits > MAX_SCALE_BITS {
            return Err(Error::InvalidScale(self.scale_bits));
        }
        if self.adapt_rate > 15 {
            return Err(Error::InvalidAdaptRate(self.adapt_rate));
        }
        if !self.split_size.is_power_of_two() {
            return Err(Error::InvalidSplitSize(self.split_size));
        }
        Ok(())
    }
}
