//! Whole-block encoding and decoding.
//!
//! [`BlockCodec`] owns everything derived from one set of statistics (the
//! encoder descriptors and the slot table) and drives the lane coders over
//! a complete buffer. The lane count and code paths come from a
//! [`CoderConfig`] and are resolved to the const-generic coders here.

use std::marker::PhantomData;

use crate::config::{CoderConfig, DecodePath, EncodePath, Layout};
use crate::cursor::{WordReader, WordWriter};
use crate::error::{Error, Result};
use crate::interleaved::{InterleavedRansDecoder, InterleavedRansEncoder};
use crate::radix::Radix;
use crate::stats::SymbolStats;
use crate::symbol::{decoder_symbols, encoder_symbols, DecoderSymbol, EncoderSymbol};
use crate::table::SymbolTable;
use crate::vector::{VectorRansDecoder, VectorRansEncoder};

/// Encoder and decoder for blocks coded with one fixed set of statistics.
#[derive(Clone, Debug)]
pub struct BlockCodec<R: Radix> {
    config: CoderConfig,
    stats: SymbolStats,
    symbols: Vec<EncoderSymbol>,
    decoders: Vec<DecoderSymbol>,
    table: SymbolTable,
    _radix: PhantomData<R>,
}

impl<R: Radix> BlockCodec<R> {
    /// Build the descriptors and table for normalized `stats`.
    ///
    /// # Errors
    /// - Whatever [`CoderConfig::validate`] reports.
    /// - `Error::InvalidScale` if `stats` is not normalized to
    ///   `2^config.scale_bits`.
    pub fn new(stats: &SymbolStats, config: CoderConfig) -> Result<Self> {
        config.validate()?;
        if stats.scale_bits()? != config.scale_bits {
            return Err(Error::InvalidScale(stats.total()));
        }
        let symbols = encoder_symbols::<R>(stats)?;
        let table = SymbolTable::new(stats)?;
        Ok(Self {
            config,
            stats: stats.clone(),
            symbols,
            decoders: decoder_symbols(stats),
            table,
            _radix: PhantomData,
        })
    }

    /// Count `data` and normalize with the configured policy.
    ///
    /// # Errors
    /// Same as [`new`](Self::new) and [`SymbolStats::normalize`].
    pub fn from_data(data: &[u8], config: CoderConfig) -> Result<Self> {
        config.validate()?;
        let mut stats = SymbolStats::from_bytes(data);
        stats.normalize(config.scale(), config.normalization)?;
        Self::new(&stats, config)
    }

    /// Configuration in use.
    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// Statistics the codec was built from.
    pub fn stats(&self) -> &SymbolStats {
        &self.stats
    }

    /// Slot table used by the table decoder.
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Upper bound on the coded size of `len` symbols, in words.
    pub fn max_encoded_len(&self, len: usize) -> usize {
        let per_symbol = self.config.scale_bits.div_ceil(R::WORD_BITS) as usize;
        len * per_symbol + self.config.lanes * R::FLUSH_WORDS
    }

    /// Encode `data` into a freshly allocated stream.
    ///
    /// # Errors
    /// `Error::UnencodableSymbol` if `data` holds a byte with frequency 0.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<R::Word>> {
        let mut buf = vec![R::Word::default(); self.max_encoded_len(data.len())];
        let start = self.encode_into(data, &mut buf)?;
        buf.drain(..start);
        Ok(buf)
    }

    /// Encode `data` into the back of `out`.
    ///
    /// Returns the offset in `out` where the coded stream starts; the
    /// stream is `out[offset..]`.
    ///
    /// # Errors
    /// - `Error::UnencodableSymbol` if `data` holds a byte with frequency 0.
    /// - `Error::BufferOverflow` if `out` is too small.
    pub fn encode_into(&self, data: &[u8], out: &mut [R::Word]) -> Result<usize> {
        let mut writer = WordWriter::new(out);
        match self.config.lanes {
            1 => self.encode_lanes::<1>(&mut writer, data)?,
            2 => self.encode_lanes::<2>(&mut writer, data)?,
            4 => self.encode_lanes::<4>(&mut writer, data)?,
            8 => self.encode_lanes::<8>(&mut writer, data)?,
            n => return Err(Error::InvalidLaneCount(n)),
        }
        log::debug!(
            "encoded {} symbols into {} words ({} lanes, {}-bit words, {:?})",
            data.len(),
            writer.written(),
            self.config.lanes,
            R::WORD_BITS,
            self.config.layout
        );
        Ok(writer.position())
    }

    fn encode_lanes<const N: usize>(
        &self,
        out: &mut WordWriter<'_, R::Word>,
        data: &[u8],
    ) -> Result<()> {
        match self.config.layout {
            Layout::Vectorized => {
                let mut encoder = VectorRansEncoder::<R, N>::new();
                encoder.encode_symbols(out, data, &self.symbols)?;
                encoder.flush(out)
            }
            Layout::Interleaved => {
                let mut encoder = InterleavedRansEncoder::<R, N>::new();
                match self.config.encode_path {
                    EncodePath::Reciprocal => encoder.encode_symbols(out, data, &self.symbols)?,
                    EncodePath::Division => {
                        encoder.encode_division(out, data, &self.stats, self.config.scale_bits)?
                    }
                }
                encoder.flush(out)
            }
        }
    }

    /// Decode `len` symbols from `words`.
    ///
    /// # Errors
    /// - `Error::BufferUnderrun` if `words` is truncated.
    /// - `Error::CorruptStream` if the stream does not end where an intact
    ///   stream of `len` symbols would.
    pub fn decode(&self, words: &[R::Word], len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.decode_into(words, &mut out)?;
        Ok(out)
    }

    /// Fill `out` from `words`, returning the number of words consumed.
    ///
    /// # Errors
    /// Same as [`decode`](Self::decode).
    pub fn decode_into(&self, words: &[R::Word], out: &mut [u8]) -> Result<usize> {
        let mut reader = WordReader::new(words);
        let intact = match self.config.lanes {
            1 => self.decode_lanes::<1>(&mut reader, out)?,
            2 => self.decode_lanes::<2>(&mut reader, out)?,
            4 => self.decode_lanes::<4>(&mut reader, out)?,
            8 => self.decode_lanes::<8>(&mut reader, out)?,
            n => return Err(Error::InvalidLaneCount(n)),
        };
        if !intact {
            log::warn!(
                "decoded {} symbols but the coder did not return to its initial state",
                out.len()
            );
            return Err(Error::CorruptStream);
        }
        log::debug!(
            "decoded {} symbols from {} words ({} lanes, {}-bit words)",
            out.len(),
            reader.position(),
            self.config.lanes,
            R::WORD_BITS
        );
        Ok(reader.position())
    }

    fn decode_lanes<const N: usize>(
        &self,
        input: &mut WordReader<'_, R::Word>,
        out: &mut [u8],
    ) -> Result<bool> {
        match self.config.layout {
            Layout::Vectorized => {
                let mut decoder = VectorRansDecoder::<R, N>::init(input)?;
                decoder.decode_symbols(input, out, &self.table)?;
                Ok(decoder.is_final())
            }
            Layout::Interleaved => {
                let mut decoder = InterleavedRansDecoder::<R, N>::init(input)?;
                match self.config.decode_path {
                    DecodePath::Table => decoder.decode_table(input, out, &self.table)?,
                    DecodePath::Search => {
                        decoder.decode_search(input, out, &self.decoders, self.config.scale_bits)?
                    }
                }
                Ok(decoder.is_final())
            }
        }
    }
}
