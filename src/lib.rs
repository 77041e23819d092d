//! # Range Asymmetric Numeral Systems (rANS)
//!
//! *Near-entropy byte coding with multiply-shift encoders, O(1) table
//! decoders and interleaved lanes.*
//!
//! ## Intuition First
//!
//! Think of the coder state as one big integer that every symbol pushes
//! "deeper". A likely symbol grows the integer by a little, an unlikely one
//! by a lot, so after the whole message the integer has about as many bits
//! as the message's information content. To keep the integer in a machine
//! register, its low words are streamed out whenever it grows too large and
//! streamed back in when the decoder shrinks it.
//!
//! ## The Problem
//!
//! A plain rANS step costs one division per encoded symbol and one search
//! per decoded symbol, and each step depends on the previous one. This
//! crate removes all three bottlenecks:
//! - **Division**: [`EncoderSymbol`] replaces `x / freq` by a reciprocal
//!   multiply that is exact for every reachable state.
//! - **Search**: [`SymbolTable`] maps every probability slot straight to
//!   its symbol.
//! - **Dependency chains**: [`InterleavedRansEncoder`] and
//!   [`VectorRansEncoder`] run independent states on alternating symbols
//!   of one stream.
//!
//! ## Mathematical Formulation
//!
//! With frequencies `f_s` summing to `M = 2^b` and cumulative starts `c_s`:
//!
//! ```text
//! encode:  x' = (x / f_s) * M + (x mod f_s) + c_s
//! decode:  s  = symbol with c_s <= x mod M < c_s + f_s
//!          x  = f_s * (x' / M) + (x' mod M) - c_s
//! ```
//!
//! Between steps the state lives in `[L, L * 2^w)` for a word size `w`.
//! Three word sizes are provided as [`Radix`] types: [`Rans8`], [`Rans16`]
//! and [`Rans32`].
//!
//! ## Stream Layout
//!
//! The encoder consumes symbols last to first and fills its buffer from
//! the back ([`WordWriter`]); its final flush lands at the front. The
//! decoder reads that flush first and then walks forward ([`WordReader`]),
//! producing symbols first to last. The stream carries no length and no
//! model: the caller supplies both.
//!
//! ## Adaptive Mode
//!
//! [`AdaptiveCoder`] drives a live distribution toward an order-1 target
//! trained on the input ([`MixModel`]) and restarts it every
//! `split_size` symbols, each block being its own flushed stream.
//!
//! ## Failure Modes
//!
//! 1. **Starved symbols**: normalization never gives a present symbol
//!    frequency 0; asking for more symbols than slots is an error.
//! 2. **Damaged input**: running out of words and ending off the initial
//!    state are both reported, never silently decoded.
//!
//! ## References
//!
//! - Duda, J. (2013). "Asymmetric numeral systems: entropy coding combining
//!   speed of Huffman coding with compression rate of arithmetic coding."
//! - Giesen, F. (2014). "Interleaved entropy coders."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adaptive;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod error;
pub mod interleaved;
pub mod radix;
pub mod rans;
pub mod stats;
pub mod symbol;
pub mod table;
pub mod vector;

pub use adaptive::{AdaptiveCdf, AdaptiveCoder, MixModel};
pub use codec::BlockCodec;
pub use config::{AdaptiveConfig, CoderConfig, DecodePath, EncodePath, Layout};
pub use cursor::{WordReader, WordWriter};
pub use error::{Error, Result};
pub use interleaved::{InterleavedRansDecoder, InterleavedRansEncoder};
pub use radix::{Radix, Rans16, Rans32, Rans8};
pub use rans::{RansDecoder, RansEncoder};
pub use stats::{NormalizePolicy, SymbolStats};
pub use symbol::{DecoderSymbol, EncoderSymbol};
pub use table::{Slot, SymbolTable};
pub use vector::{VectorRansDecoder, VectorRansEncoder};
