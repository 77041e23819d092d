//! Precomputed per-symbol encode/decode constants.
//!
//! The encoder step `x' = (x / f) << b + x % f + start` is rewritten as
//! `x' = x + bias + q * (2^b - f)` with `q = x / f`, and `q` is obtained by a
//! high multiply with a fixed-point reciprocal instead of a division.
//!
//! The reciprocal is 64 bits wide for every radix, which makes the quotient
//! exact for any state below `2^63` (Alverson, "Integer Division using
//! reciprocals"). States of the 8- and 16-bit radices stay below `2^32`, the
//! 32-bit radix below `2^63`.

use crate::error::{Error, Result};
use crate::radix::Radix;
use crate::stats::{SymbolStats, MAX_SCALE_BITS};

/// Division-free encoder constants for one symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderSymbol {
    /// Renormalization threshold: emit words while `x >= x_max`.
    pub(crate) x_max: u64,
    /// Fixed-point reciprocal of `freq`.
    pub(crate) rcp_freq: u64,
    /// Added after the multiply; folds `start` (and, for `freq < 2`, the
    /// identity correction).
    pub(crate) bias: u64,
    pub(crate) freq: u32,
    /// `2^scale_bits - freq`
    pub(crate) cmpl_freq: u32,
    pub(crate) rcp_shift: u32,
}

impl EncoderSymbol {
    /// Build the constants for a symbol occupying `[cum_start, cum_start + freq)`.
    ///
    /// # Errors
    /// Returns `Error::InvalidScale` if `scale_bits` is outside `1..=16` or
    /// the range does not fit in `2^scale_bits`.
    pub fn new<R: Radix>(cum_start: u32, freq: u32, scale_bits: u32) -> Result<Self> {
        check_scale_bits(scale_bits)?;
        let scale = 1u32 << scale_bits;
        if cum_start as u64 + freq as u64 > scale as u64 {
            return Err(Error::InvalidScale(scale));
        }

        let x_max = R::x_max(freq, scale_bits);
        let cmpl_freq = scale - freq;

        if freq < 2 {
            // q = x - 1 for every x >= 1, and bias absorbs the difference:
            // x + (start + scale - 1) + (x - 1) * (scale - 1) = x * scale + start.
            return Ok(Self {
                x_max,
                rcp_freq: u64::MAX,
                bias: cum_start as u64 + scale as u64 - 1,
                freq,
                cmpl_freq,
                rcp_shift: 0,
            });
        }

        // ceil(log2(freq)); exact when freq is a power of two.
        let shift = 32 - (freq - 1).leading_zeros();
        let rcp_freq = (((1u128 << (shift + 63)) + freq as u128 - 1) / freq as u128) as u64;

        Ok(Self {
            x_max,
            rcp_freq,
            bias: cum_start as u64,
            freq,
            cmpl_freq,
            rcp_shift: shift - 1,
        })
    }

    /// Normalized frequency.
    pub fn freq(&self) -> u32 {
        self.freq
    }

    /// `x / freq` via the reciprocal.
    #[inline]
    pub(crate) fn quotient(&self, x: u64) -> u64 {
        (((x as u128 * self.rcp_freq as u128) >> 64) as u64) >> self.rcp_shift
    }

    /// State update for an already renormalized `x`.
    #[inline]
    pub(crate) fn apply(&self, x: u64) -> u64 {
        x + self.bias + self.quotient(x) * self.cmpl_freq as u64
    }
}

/// Decoder constants for one symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderSymbol {
    /// Start of the symbol's cumulative range.
    pub cum_start: u32,
    /// Normalized frequency.
    pub freq: u32,
}

impl DecoderSymbol {
    /// Constants for a symbol occupying `[cum_start, cum_start + freq)`.
    pub fn new(cum_start: u32, freq: u32) -> Self {
        Self { cum_start, freq }
    }
}

/// Encoder constants for every symbol of normalized statistics.
///
/// # Errors
/// Returns `Error::InvalidScale` unless the statistics sum to a power of two
/// no larger than `2^16`.
pub fn encoder_symbols<R: Radix>(stats: &SymbolStats) -> Result<Vec<EncoderSymbol>> {
    let scale_bits = stats.scale_bits()?;
    stats
        .freq()
        .iter()
        .zip(stats.cum_freq())
        .map(|(&f, &c)| EncoderSymbol::new::<R>(c, f, scale_bits))
        .collect()
}

/// Decoder constants for every symbol of normalized statistics.
pub fn decoder_symbols(stats: &SymbolStats) -> Vec<DecoderSymbol> {
    stats
        .freq()
        .iter()
        .zip(stats.cum_freq())
        .map(|(&f, &c)| DecoderSymbol::new(c, f))
        .collect()
}

/// Index of the symbol whose range holds `slot`.
///
/// `syms` must cover a complete probability total; zero-width entries are
/// never returned.
#[inline]
pub fn search(syms: &[DecoderSymbol], slot: u32) -> usize {
    syms.partition_point(|d| d.cum_start <= slot) - 1
}

pub(crate) fn check_scale_bits(scale_bits: u32) -> Result<()> {
    if scale_bits == 0 || scale_bits > MAX_SCALE_BITS {
        return Err(Error::InvalidScale(scale_bits));
    }
    Ok(())
}
