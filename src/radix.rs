//! Renormalization radices.
//!
//! A radix fixes the word size streamed during renormalization and the lower
//! bound `L` of the state interval `[L, L << WORD_BITS)`. States are always
//! held in a `u64`; for the 8- and 16-bit radices they never exceed 32 bits.

use std::fmt::Debug;

/// Word size and state bounds of one rANS variant.
pub trait Radix: Copy + Debug + Default + 'static {
    /// Stream word type.
    type Word: Copy + Debug + Default + PartialEq + Eq + 'static;

    /// Bits per stream word.
    const WORD_BITS: u32;

    /// Lower bound `L` of the normalized state interval.
    const LOWER_BOUND: u64;

    /// Words written by `flush` and read back by `init`.
    const FLUSH_WORDS: usize;

    /// Low `WORD_BITS` of `x`.
    fn word(x: u64) -> Self::Word;

    /// Zero-extend a word.
    fn widen(w: Self::Word) -> u64;

    /// Exclusive upper bound of the normalized state interval.
    #[inline]
    fn upper_bound() -> u64 {
        Self::LOWER_BOUND << Self::WORD_BITS
    }

    /// Encoder renormalization threshold for a symbol of frequency `freq`.
    #[inline]
    fn x_max(freq: u32, scale_bits: u32) -> u64 {
        ((Self::LOWER_BOUND >> scale_bits) << Self::WORD_BITS) * freq as u64
    }
}

/// Byte-wise rANS: 32-bit state, `L = 2^23`, 8-bit words.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rans8;

/// 16-bit word rANS: 32-bit state, `L = 2^16`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rans16;

/// 32-bit word rANS: 64-bit state, `L = 2^31`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rans32;

impl Radix for Rans8 {
    type Word = u8;
    const WORD_BITS: u32 = 8;
    const LOWER_BOUND: u64 = 1 << 23;
    const FLUSH_WORDS: usize = 4;

    #[inline]
    fn word(x: u64) -> u8 {
        x as u8
    }

    #[inline]
    fn widen(w: u8) -> u64 {
        w as u64
    }
}

impl Radix for Rans16 {
    type Word = u16;
    const WORD_BITS: u32 = 16;
    const LOWER_BOUND: u64 = 1 << 16;
    const FLUSH_WORDS: usize = 2;

    #[inline]
    fn word(x: u64) -> u16 {
        x as u16
    }

    #[inline]
    fn widen(w: u16) -> u64 {
        w as u64
    }
}

impl Radix for Rans32 {
    type Word = u32;
    const WORD_BITS: u32 = 32;
    const LOWER_BOUND: u64 = 1 << 31;
    const FLUSH_WORDS: usize = 2;

    #[inline]
    fn word(x: u64) -> u32 {
        x as u32
    }

    #[inline]
    fn widen(w: u32) -> u64 {
        w as u64
    }
}
