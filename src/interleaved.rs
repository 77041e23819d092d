//! Interleaved rANS: `N` independent coder states sharing one stream.
//!
//! Symbol `i` is coded on lane `i % N`. The encoder walks the input backward,
//! so a trailing partial group is coded first, and flushes lanes
//! `N-1, ..., 0`. The decoder inits lanes `0, ..., N-1` and then decodes in
//! forward order, each lane renormalizing on its own. The lanes never touch
//! each other's state; only the order in which they advance the shared
//! cursor is fixed.

use crate::cursor::{WordReader, WordWriter};
use crate::error::{Error, Result};
use crate::radix::Radix;
use crate::rans::{RansDecoder, RansEncoder};
use crate::stats::SymbolStats;
use crate::symbol::{search, DecoderSymbol, EncoderSymbol};
use crate::table::SymbolTable;

/// Interleaved rANS encoder with `N` lanes.
#[derive(Debug, Clone)]
pub struct InterleavedRansEncoder<R: Radix, const N: usize> {
    lanes: [RansEncoder<R>; N],
}

impl<R: Radix, const N: usize> InterleavedRansEncoder<R, N> {
    /// Create an `N`-way interleaved encoder.
    pub fn new() -> Self {
        Self {
            lanes: [RansEncoder::new(); N],
        }
    }

    /// Encode a symbol into one of the interleaved streams.
    ///
    /// # Errors
    /// Same as [`RansEncoder::encode`].
    #[inline]
    pub fn encode(
        &mut self,
        lane: usize,
        out: &mut WordWriter<'_, R::Word>,
        cum_freq: u32,
        freq: u32,
        scale_bits: u32,
    ) -> Result<()> {
        self.lanes[lane].encode(out, cum_freq, freq, scale_bits)
    }

    /// Encode a symbol on `lane` with precomputed constants.
    ///
    /// # Errors
    /// Same as [`RansEncoder::encode_symbol`].
    #[inline]
    pub fn encode_symbol(
        &mut self,
        lane: usize,
        out: &mut WordWriter<'_, R::Word>,
        sym: &EncoderSymbol,
    ) -> Result<()> {
        self.lanes[lane].encode_symbol(out, sym)
    }

    /// Encode all of `data` through the reciprocal path.
    ///
    /// # Errors
    /// `Error::UnencodableSymbol` for a byte whose frequency is 0,
    /// `Error::BufferOverflow` if `out` fills up.
    pub fn encode_symbols(
        &mut self,
        out: &mut WordWriter<'_, R::Word>,
        data: &[u8],
        syms: &[EncoderSymbol],
    ) -> Result<()> {
        for (i, &b) in data.iter().enumerate().rev() {
            let sym = symbol_for(syms, b)?;
            self.lanes[i % N].encode_symbol(out, sym)?;
        }
        Ok(())
    }

    /// Encode all of `data` through the division path.
    ///
    /// # Errors
    /// Same as [`encode_symbols`](Self::encode_symbols).
    pub fn encode_division(
        &mut self,
        out: &mut WordWriter<'_, R::Word>,
        data: &[u8],
        stats: &SymbolStats,
        scale_bits: u32,
    ) -> Result<()> {
        let (freq, cum) = (stats.freq(), stats.cum_freq());
        for (i, &b) in data.iter().enumerate().rev() {
            let s = b as usize;
            match freq.get(s) {
                Some(&f) if f > 0 => self.lanes[i % N].encode(out, cum[s], f, scale_bits)?,
                _ => return Err(Error::UnencodableSymbol(b)),
            }
        }
        Ok(())
    }

    /// Flush every lane, last lane first, so lane 0's state opens the stream.
    ///
    /// # Errors
    /// Returns `Error::BufferOverflow` if `out` fills up.
    pub fn flush(&self, out: &mut WordWriter<'_, R::Word>) -> Result<()> {
        for lane in self.lanes.iter().rev() {
            lane.flush(out)?;
        }
        Ok(())
    }

    /// Current state of every lane.
    pub fn states(&self) -> [u64; N] {
        std::array::from_fn(|lane| self.lanes[lane].get_state())
    }
}

impl<R: Radix, const N: usize> Default for InterleavedRansEncoder<R, N> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn symbol_for(syms: &[EncoderSymbol], b: u8) -> Result<&EncoderSymbol> {
    match syms.get(b as usize) {
        Some(sym) if sym.freq() > 0 => Ok(sym),
        _ => Err(Error::UnencodableSymbol(b)),
    }
}

/// Interleaved rANS decoder with `N` lanes.
#[derive(Debug, Clone)]
pub struct InterleavedRansDecoder<R: Radix, const N: usize> {
    lanes: [RansDecoder<R>; N],
}

impl<R: Radix, const N: usize> InterleavedRansDecoder<R, N> {
    /// Read the lane states in the order the encoder left them.
    ///
    /// # Errors
    /// Same as [`RansDecoder::init`].
    pub fn init(input: &mut WordReader<'_, R::Word>) -> Result<Self> {
        let lanes = (0..N)
            .map(|_| RansDecoder::init(input))
            .collect::<Result<Vec<_>>>()?;
        let lanes: [RansDecoder<R>; N] = lanes
            .try_into()
            .map_err(|_| Error::InvalidLaneCount(N))?;
        Ok(Self { lanes })
    }

    /// Get current cumulative frequency for a lane.
    #[inline]
    pub fn decode_get(&self, lane: usize, scale_bits: u32) -> u32 {
        self.lanes[lane].decode_get(scale_bits)
    }

    /// Decode for a lane.
    ///
    /// # Errors
    /// Same as [`RansDecoder::decode_advance`].
    #[inline]
    pub fn decode_advance(
        &mut self,
        lane: usize,
        input: &mut WordReader<'_, R::Word>,
        cum_freq: u32,
        freq: u32,
        scale_bits: u32,
    ) -> Result<()> {
        self.lanes[lane].decode_advance(input, cum_freq, freq, scale_bits)
    }

    /// Table decode for a lane, without renormalization.
    #[inline]
    pub fn decode_symbol(&mut self, lane: usize, table: &SymbolTable) -> u8 {
        self.lanes[lane].decode_symbol(table)
    }

    /// Renormalize one lane.
    ///
    /// # Errors
    /// Returns `Error::BufferUnderrun` if the input is exhausted.
    #[inline]
    pub fn renorm(&mut self, lane: usize, input: &mut WordReader<'_, R::Word>) -> Result<()> {
        self.lanes[lane].renorm(input)
    }

    /// Fill `out` through the slot table.
    ///
    /// # Errors
    /// Returns `Error::BufferUnderrun` if the input is exhausted.
    pub fn decode_table(
        &mut self,
        input: &mut WordReader<'_, R::Word>,
        out: &mut [u8],
        table: &SymbolTable,
    ) -> Result<()> {
        for (i, byte) in out.iter_mut().enumerate() {
            let lane = &mut self.lanes[i % N];
            *byte = lane.decode_symbol(table);
            lane.renorm(input)?;
        }
        Ok(())
    }

    /// Fill `out` by binary search over the decoder symbols.
    ///
    /// # Errors
    /// Returns `Error::BufferUnderrun` if the input is exhausted.
    pub fn decode_search(
        &mut self,
        input: &mut WordReader<'_, R::Word>,
        out: &mut [u8],
        syms: &[DecoderSymbol],
        scale_bits: u32,
    ) -> Result<()> {
        for (i, byte) in out.iter_mut().enumerate() {
            let lane = &mut self.lanes[i % N];
            let sym = search(syms, lane.decode_get(scale_bits));
            *byte = sym as u8;
            lane.decode_advance_symbol(input, &syms[sym], scale_bits)?;
        }
        Ok(())
    }

    /// True when every lane is back at the initial state.
    pub fn is_final(&self) -> bool {
        self.lanes.iter().all(RansDecoder::is_final)
    }
}
