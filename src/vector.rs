//! Vectorized rANS: `W` lanes stepped in lockstep.
//!
//! The lane states live in one `[u64; W]` and each group of `W` symbols is
//! coded with straight-line loops over the lanes, which the compiler can map
//! onto SIMD registers. Word emission and consumption still happen lane by
//! lane in the interleaved order, so the stream is byte-identical to
//! [`InterleavedRansEncoder`](crate::interleaved::InterleavedRansEncoder)
//! with `N = W`.

use std::marker::PhantomData;

use crate::cursor::{WordReader, WordWriter};
use crate::error::Result;
use crate::interleaved::symbol_for;
use crate::radix::Radix;
use crate::rans::{RansDecoder, RansEncoder};
use crate::symbol::EncoderSymbol;
use crate::table::SymbolTable;

/// Lockstep encoder over `W` lanes.
#[derive(Debug, Clone)]
pub struct VectorRansEncoder<R: Radix, const W: usize> {
    state: [u64; W],
    _radix: PhantomData<R>,
}

impl<R: Radix, const W: usize> VectorRansEncoder<R, W> {
    /// All lanes in the initial state.
    pub fn new() -> Self {
        Self {
            state: [R::LOWER_BOUND; W],
            _radix: PhantomData,
        }
    }

    /// Current lane states.
    pub fn states(&self) -> [u64; W] {
        self.state
    }

    /// Encode `data`, symbol `i` on lane `i % W`.
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
        let full = data.len() / W * W;

        // Partial group first: it is the end of the input.
        for i in (full..data.len()).rev() {
            let sym = symbol_for(syms, data[i])?;
            let mut lane = RansEncoder::<R>::from_state(self.state[i % W]);
            lane.encode_symbol(out, sym)?;
            self.state[i % W] = lane.get_state();
        }

        let placeholder = EncoderSymbol::default();
        for group in data[..full].chunks_exact(W).rev() {
            let mut descs = [&placeholder; W];
            for (d, &b) in descs.iter_mut().zip(group) {
                *d = symbol_for(syms, b)?;
            }
            self.encode_group(out, &descs)?;
        }
        Ok(())
    }

    fn encode_group(
        &mut self,
        out: &mut WordWriter<'_, R::Word>,
        descs: &[&EncoderSymbol; W],
    ) -> Result<()> {
        // Renormalization depends only on each lane's own state, so emitting
        // every lane (highest first) before updating any of them writes the
        // same words as the one-lane-at-a-time loop.
        for lane in (0..W).rev() {
            let x_max = descs[lane].x_max;
            while self.state[lane] >= x_max {
                out.put(R::word(self.state[lane]))?;
                self.state[lane] >>= R::WORD_BITS;
            }
        }

        let mut q = [0u64; W];
        for lane in 0..W {
            let d = descs[lane];
            let hi = (self.state[lane] as u128 * d.rcp_freq as u128) >> 64;
            q[lane] = (hi as u64) >> d.rcp_shift;
        }
        for lane in 0..W {
            let d = descs[lane];
            self.state[lane] += d.bias + q[lane] * d.cmpl_freq as u64;
        }
        Ok(())
    }

    /// Flush lanes `W-1, ..., 0`.
    ///
    /// # Errors
    /// Returns `Error::BufferOverflow` if `out` fills up.
    pub fn flush(&self, out: &mut WordWriter<'_, R::Word>) -> Result<()> {
        for &state in self.state.iter().rev() {
            RansEncoder::<R>::from_state(state).flush(out)?;
        }
        Ok(())
    }
}

impl<R: Radix, const W: usize> Default for VectorRansEncoder<R, W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lockstep table decoder over `W` lanes.
#[derive(Debug, Clone)]
pub struct VectorRansDecoder<R: Radix, const W: usize> {
    state: [u64; W],
    _radix: PhantomData<R>,
}

impl<R: Radix, const W: usize> VectorRansDecoder<R, W> {
    /// Read the lane states, lane 0 first.
    ///
    /// # Errors
    /// Same as [`RansDecoder::init`].
    pub fn init(input: &mut WordReader<'_, R::Word>) -> Result<Self> {
        let mut state = [0u64; W];
        for s in state.iter_mut() {
            *s = RansDecoder::<R>::init(input)?.get_state();
        }
        Ok(Self {
            state,
            _radix: PhantomData,
        })
    }

    /// Fill `out`, symbol `i` from lane `i % W`.
    ///
    /// # Errors
    /// Returns `Error::BufferUnderrun` if the input is exhausted.
    pub fn decode_symbols(
        &mut self,
        input: &mut WordReader<'_, R::Word>,
        out: &mut [u8],
        table: &SymbolTable,
    ) -> Result<()> {
        let full = out.len() / W * W;
        let scale_bits = table.scale_bits();
        let (groups, tail) = out.split_at_mut(full);

        for group in groups.chunks_exact_mut(W) {
            for lane in 0..W {
                let (sym, slot) = table.lookup(self.state[lane]);
                group[lane] = sym;
                self.state[lane] =
                    slot.freq as u64 * (self.state[lane] >> scale_bits) + slot.bias as u64;
            }
            for lane in 0..W {
                self.renorm(lane, input)?;
            }
        }

        for (offset, byte) in tail.iter_mut().enumerate() {
            let lane = (full + offset) % W;
            let (sym, slot) = table.lookup(self.state[lane]);
            *byte = sym;
            self.state[lane] =
                slot.freq as u64 * (self.state[lane] >> scale_bits) + slot.bias as u64;
            self.renorm(lane, input)?;
        }
        Ok(())
    }

    #[inline]
    fn renorm(&mut self, lane: usize, input: &mut WordReader<'_, R::Word>) -> Result<()> {
        while self.state[lane] < R::LOWER_BOUND {
            self.state[lane] = (self.state[lane] << R::WORD_BITS) | R::widen(input.next_word()?);
        }
        Ok(())
    }

    /// True when every lane is back at the initial state.
    pub fn is_final(&self) -> bool {
        self.state.iter().all(|&s| s == R::LOWER_BOUND)
    }
}
