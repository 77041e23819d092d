//! Range Asymmetric Numeral Systems (rANS).
//!
//! rANS is a variant of ANS that uses multiplication and division
//! to update the state, making it more flexible than tANS for
//! large alphabets or dynamic distributions.
//!
//! Symbols are encoded in reverse and the words go to a [`WordWriter`] from
//! the back of its buffer; the decoder reads them front to back through a
//! [`WordReader`] and yields the symbols in forward order.

use std::marker::PhantomData;

use crate::cursor::{WordReader, WordWriter};
use crate::error::{Error, Result};
use crate::radix::Radix;
use crate::symbol::{DecoderSymbol, EncoderSymbol};
use crate::table::SymbolTable;

/// rANS encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RansEncoder<R: Radix> {
    state: u64,
    _radix: PhantomData<R>,
}

impl<R: Radix> RansEncoder<R> {
    /// Create a new rANS encoder in the initial state `L`.
    pub fn new() -> Self {
        Self::from_state(R::LOWER_BOUND)
    }

    /// Create an encoder at an arbitrary state.
    pub fn from_state(state: u64) -> Self {
        Self {
            state,
            _radix: PhantomData,
        }
    }

    /// Return the current internal state.
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Return to the initial state, e.g. to start a new block after `flush`.
    pub fn reset(&mut self) {
        self.state = R::LOWER_BOUND;
    }

    #[inline]
    fn renorm(&mut self, out: &mut WordWriter<'_, R::Word>, x_max: u64) -> Result<()> {
        while self.state >= x_max {
            out.put(R::word(self.state))?;
            self.state >>= R::WORD_BITS;
        }
        Ok(())
    }

    /// Encode a symbol with given cumulative frequency and frequency.
    ///
    /// # Arguments
    /// * `out` - Output cursor, written backward
    /// * `cum_freq` - Cumulative frequency of symbol
    /// * `freq` - Frequency of symbol
    /// * `scale_bits` - Precision in bits (total frequency = 1 << scale_bits)
    ///
    /// # Errors
    /// Returns `Error::ZeroFrequency` if `freq` is 0 and
    /// `Error::BufferOverflow` if `out` is full.
    #[inline]
    pub fn encode(
        &mut self,
        out: &mut WordWriter<'_, R::Word>,
        cum_freq: u32,
        freq: u32,
        scale_bits: u32,
    ) -> Result<()> {
        if freq == 0 {
            return Err(Error::ZeroFrequency);
        }
        self.renorm(out, R::x_max(freq, scale_bits))?;

        // state = (x / freq) * total + (x % freq) + cum_freq
        let f = freq as u64;
        self.state = ((self.state / f) << scale_bits) + (self.state % f) + cum_freq as u64;
        Ok(())
    }

    /// Encode with precomputed constants, replacing the division by a
    /// reciprocal multiply. Produces the same words and state as
    /// [`encode`](Self::encode).
    ///
    /// # Errors
    /// Same as [`encode`](Self::encode).
    #[inline]
    pub fn encode_symbol(
        &mut self,
        out: &mut WordWriter<'_, R::Word>,
        sym: &EncoderSymbol,
    ) -> Result<()> {
        if sym.freq == 0 {
            return Err(Error::ZeroFrequency);
        }
        self.renorm(out, sym.x_max)?;
        self.state = sym.apply(self.state);
        Ok(())
    }

    /// Write the final state, least significant word first in stream order.
    ///
    /// # Errors
    /// Returns `Error::BufferOverflow` if `out` cannot hold the state.
    pub fn flush(&self, out: &mut WordWriter<'_, R::Word>) -> Result<()> {
        for k in (0..R::FLUSH_WORDS).rev() {
            out.put(R::word(self.state >> (k as u32 * R::WORD_BITS)))?;
        }
        Ok(())
    }
}

impl<R: Radix> Default for RansEncoder<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// rANS decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RansDecoder<R: Radix> {
    state: u64,
    _radix: PhantomData<R>,
}

impl<R: Radix> RansDecoder<R> {
    /// Read the state flushed by the encoder.
    ///
    /// # Errors
    /// - `Error::BufferUnderrun` if fewer than `R::FLUSH_WORDS` words remain.
    /// - `Error::CorruptStream` if the state lies outside `[L, radix·L)`.
    pub fn init(input: &mut WordReader<'_, R::Word>) -> Result<Self> {
        let mut state = 0u64;
        for k in 0..R::FLUSH_WORDS {
            let word = input.next_word().map_err(|_| Error::BufferUnderrun {
                needed: R::FLUSH_WORDS - k,
            })?;
            state |= R::widen(word) << (k as u32 * R::WORD_BITS);
        }
        if !(R::LOWER_BOUND..R::upper_bound()).contains(&state) {
            return Err(Error::CorruptStream);
        }
        Ok(Self {
            state,
            _radix: PhantomData,
        })
    }

    /// Return the current internal state.
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// True when the decoder is back at the encoder's initial state, which
    /// holds after the last symbol of an intact stream.
    pub fn is_final(&self) -> bool {
        self.state == R::LOWER_BOUND
    }

    /// Get current cumulative frequency slot from state.
    #[inline]
    pub fn decode_get(&self, scale_bits: u32) -> u32 {
        (self.state & ((1u64 << scale_bits) - 1)) as u32
    }

    /// Pop the symbol occupying `[cum_freq, cum_freq + freq)` and renormalize.
    ///
    /// # Errors
    /// Returns `Error::BufferUnderrun` if renormalization runs out of input.
    #[inline]
    pub fn decode_advance(
        &mut self,
        input: &mut WordReader<'_, R::Word>,
        cum_freq: u32,
        freq: u32,
        scale_bits: u32,
    ) -> Result<()> {
        let mask = (1u64 << scale_bits) - 1;

        // state = freq * (state / total) + (state % total) - cum_freq
        self.state =
            freq as u64 * (self.state >> scale_bits) + (self.state & mask) - cum_freq as u64;
        self.renorm(input)
    }

    /// [`decode_advance`](Self::decode_advance) with precomputed constants.
    ///
    /// # Errors
    /// Same as [`decode_advance`](Self::decode_advance).
    #[inline]
    pub fn decode_advance_symbol(
        &mut self,
        input: &mut WordReader<'_, R::Word>,
        sym: &DecoderSymbol,
        scale_bits: u32,
    ) -> Result<()> {
        self.decode_advance(input, sym.cum_start, sym.freq, scale_bits)
    }

    /// Decode one symbol through the slot table. Does not renormalize; call
    /// [`renorm`](Self::renorm) afterwards.
    #[inline]
    pub fn decode_symbol(&mut self, table: &SymbolTable) -> u8 {
        let (sym, slot) = table.lookup(self.state);
        self.state = slot.freq as u64 * (self.state >> table.scale_bits()) + slot.bias as u64;
        sym
    }

    /// Pull words until the state is back in `[L, radix·L)`.
    ///
    /// # Errors
    /// Returns `Error::BufferUnderrun` if the input is exhausted.
    #[inline]
    pub fn renorm(&mut self, input: &mut WordReader<'_, R::Word>) -> Result<()> {
        while self.state < R::LOWER_BOUND {
            self.state = (self.state << R::WORD_BITS) | R::widen(input.next_word()?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radix::{Rans16, Rans32, Rans8};
    use crate::stats::{NormalizePolicy, SymbolStats};
    use proptest::prelude::*;

    fn roundtrip<R: Radix>(input: &[usize], symbols: &[(u32, u32)], total_bits: u32) -> Vec<usize> {
        let mut buf = vec![R::Word::default(); input.len() * 2 + R::FLUSH_WORDS];
        let mut out = WordWriter::new(&mut buf);
        let mut encoder = RansEncoder::<R>::new();
        for &idx in input.iter().rev() {
            let (cum_freq, freq) = symbols[idx];
            encoder.encode(&mut out, cum_freq, freq, total_bits).unwrap();
        }
        encoder.flush(&mut out).unwrap();
        let start = out.position();

        let mut reader = WordReader::new(&buf[start..]);
        let mut decoder = RansDecoder::<R>::init(&mut reader).unwrap();
        let mut output = Vec::with_capacity(input.len());
        for _ in 0..input.len() {
            let cf = decoder.decode_get(total_bits);
            let idx = symbols.iter().rposition(|&(c, _)| c <= cf).unwrap();
            output.push(idx);
            let (cum_freq, freq) = symbols[idx];
            decoder.decode_advance(&mut reader, cum_freq, freq, total_bits).unwrap();
        }
        assert!(decoder.is_final());
        assert_eq!(reader.remaining(), 0);
        output
    }

    #[test]
    fn test_rans_basic_roundtrip() {
        let symbols = [(0, 128), (128, 64), (192, 64)];
        let input: Vec<usize> = vec![0, 1, 2, 0, 0];
        assert_eq!(roundtrip::<Rans8>(&input, &symbols, 8), input);
        assert_eq!(roundtrip::<Rans16>(&input, &symbols, 8), input);
        assert_eq!(roundtrip::<Rans32>(&input, &symbols, 8), input);
    }

    #[test]
    fn zero_frequency_is_rejected() {
        let mut buf = [0u16; 4];
        let mut out = WordWriter::new(&mut buf);
        let mut encoder = RansEncoder::<Rans16>::new();
        assert_eq!(encoder.encode(&mut out, 0, 0, 8), Err(Error::ZeroFrequency));
    }

    #[test]
    fn flush_puts_low_word_first() {
        let mut buf = [0u16; 2];
        let mut out = WordWriter::new(&mut buf);
        RansEncoder::<Rans16>::from_state(0x1234_5678).flush(&mut out).unwrap();
        assert_eq!(buf, [0x5678, 0x1234]);

        let mut bytes = [0u8; 4];
        let mut out = WordWriter::new(&mut bytes);
        RansEncoder::<Rans8>::from_state(0x0089_abcd).flush(&mut out).unwrap();
        assert_eq!(bytes, [0xcd, 0xab, 0x89, 0x00]);
    }

    #[test]
    fn init_needs_the_whole_state() {
        let words = [0u32];
        let mut reader = WordReader::new(&words);
        assert_eq!(
            RansDecoder::<Rans32>::init(&mut reader),
            Err(Error::BufferUnderrun { needed: 1 })
        );

        let words = [0u16, 0];
        let mut reader = WordReader::new(&words);
        assert_eq!(RansDecoder::<Rans16>::init(&mut reader), Err(Error::CorruptStream));
    }

    #[test]
    fn truncated_stream_underruns() {
        let data: Vec<u8> = (0..2000u32).map(|i| (i * 7 % 251) as u8).collect();
        let mut stats = SymbolStats::from_bytes(&data);
        stats.normalize(1 << 12, NormalizePolicy::Fast).unwrap();

        let mut buf = vec![0u16; data.len() + 2];
        let mut out = WordWriter::new(&mut buf);
        let mut encoder = RansEncoder::<Rans16>::new();
        for &b in data.iter().rev() {
            let (c, f) = (stats.cum_freq()[b as usize], stats.freq()[b as usize]);
            encoder.encode(&mut out, c, f, 12).unwrap();
        }
        encoder.flush(&mut out).unwrap();
        let start = out.position();
        let stream = &buf[start..buf.len() - 1];

        let mut reader = WordReader::new(stream);
        let mut decoder = RansDecoder::<Rans16>::init(&mut reader).unwrap();
        let mut result = Ok(());
        for _ in 0..data.len() {
            let (_, c, f) = stats.find(decoder.decode_get(12));
            result = decoder.decode_advance(&mut reader, c, f, 12);
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result, Err(Error::BufferUnderrun { needed: 1 }));
    }

    /// Sampled states of `[L, radix·L)`: both ends plus a uniform stride.
    fn sample_states<R: Radix>() -> Vec<u64> {
        let lo = R::LOWER_BOUND;
        let hi = R::upper_bound();
        let step = (hi - lo) / 61;
        let mut states: Vec<u64> = (0..61).map(|i| lo + i * step + i).collect();
        states.extend([lo, lo + 1, hi - 2, hi - 1]);
        states
    }

    fn check_fast_path<R: Radix>() {
        const FREQS: [u32; 6] = [1, 2, 3, 7, 100, 16384];
        let scale_bits = 14;
        let scale = 1u32 << scale_bits;

        for s in 0..256u32 {
            let freq = FREQS[(s % 6) as usize];
            let cum_start = (s * 37) % (scale - freq + 1);
            let sym = EncoderSymbol::new::<R>(cum_start, freq, scale_bits).unwrap();

            for x in sample_states::<R>() {
                let mut slow_buf = vec![R::Word::default(); 8];
                let mut fast_buf = vec![R::Word::default(); 8];
                let mut slow_out = WordWriter::new(&mut slow_buf);
                let mut fast_out = WordWriter::new(&mut fast_buf);

                let mut slow = RansEncoder::<R>::from_state(x);
                let mut fast = RansEncoder::<R>::from_state(x);
                slow.encode(&mut slow_out, cum_start, freq, scale_bits).unwrap();
                fast.encode_symbol(&mut fast_out, &sym).unwrap();

                assert_eq!(slow.get_state(), fast.get_state(), "freq {freq} x {x}");
                assert_eq!(slow_out.as_slice(), fast_out.as_slice());
            }
        }
    }

    #[test]
    fn fast_path_matches_division_rans8() {
        check_fast_path::<Rans8>();
    }

    #[test]
    fn fast_path_matches_division_rans16() {
        check_fast_path::<Rans16>();
    }

    #[test]
    fn fast_path_matches_division_rans32() {
        check_fast_path::<Rans32>();
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_rans_roundtrip_small_alphabet(
            a in 1u32..200,
            b in 1u32..200,
            c in 1u32..200,
            input in prop::collection::vec(0usize..3, 1..60),
        ) {
            let total_bits = 8;
            let total = 1u32 << total_bits;
            let sum = a + b + c;
            prop_assume!(sum < total);

            let f0 = a;
            let f1 = b;
            let f2 = total - f0 - f1;

            let symbols = [(0u32, f0), (f0, f1), (f0 + f1, f2)];
            prop_assert_eq!(&roundtrip::<Rans8>(&input, &symbols, total_bits), &input);
            prop_assert_eq!(&roundtrip::<Rans16>(&input, &symbols, total_bits), &input);
            prop_assert_eq!(&roundtrip::<Rans32>(&input, &symbols, total_bits), &input);
        }

        #[test]
        fn prop_fast_path_any_state(
            freq in 1u32..=16384,
            cum_seed in 0u32..16384,
            x in (1u64 << 31)..(1u64 << 63),
        ) {
            let cum_start = cum_seed % (16384 - freq + 1);
            let sym = EncoderSymbol::new::<Rans32>(cum_start, freq, 14).unwrap();
            let mut slow_buf = [0u32; 4];
            let mut fast_buf = [0u32; 4];
            let mut slow_out = WordWriter::new(&mut slow_buf);
            let mut fast_out = WordWriter::new(&mut fast_buf);
            let mut slow = RansEncoder::<Rans32>::from_state(x);
            let mut fast = RansEncoder::<Rans32>::from_state(x);
            slow.encode(&mut slow_out, cum_start, freq, 14).unwrap();
            fast.encode_symbol(&mut fast_out, &sym).unwrap();
            prop_assert_eq!(slow.get_state(), fast.get_state());
            prop_assert_eq!(slow_out.as_slice(), fast_out.as_slice());
        }
    }
}
