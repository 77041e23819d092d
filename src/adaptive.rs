//! Adaptive order-1 mixing.
//!
//! A [`MixModel`] holds one target CDF per preceding symbol, trained on the
//! whole input. While coding, a single live [`AdaptiveCdf`] supplies the
//! symbol intervals; after each symbol `s` it moves a fixed fraction of the
//! way toward the target row of `s`:
//!
//! ```text
//! cdf[i] += (mix[s][i] - cdf[i]) >> adapt_rate
//! ```
//!
//! The live CDF is reset to uniform every `split_size` symbols. Each such
//! block, including a shorter final one, is coded as a separate rANS stream
//! with its own flush, so blocks decode independently and the stream
//! layout does not depend on whether the length is a multiple of the block
//! size.

use std::marker::PhantomData;

use crate::config::AdaptiveConfig;
use crate::cursor::{WordReader, WordWriter};
use crate::error::{Error, Result};
use crate::radix::Radix;
use crate::rans::{RansDecoder, RansEncoder};
use crate::stats::{NormalizePolicy, SymbolStats, MAX_SYMBOLS};

/// Per-context target distributions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MixModel {
    symbol_count: usize,
    scale: u32,
    /// `symbol_count` rows of `symbol_count + 1` cumulative values.
    rows: Vec<u32>,
}

impl MixModel {
    /// Count symbol pairs in `data` and normalize each context row.
    ///
    /// Every pair starts at weight 1 so no symbol is ever starved; each
    /// observed `(prev, cur)` adds `config.increment`.
    ///
    /// # Errors
    /// - `Error::InvalidAlphabet` for `symbol_count` outside `1..=256`.
    /// - `Error::UnencodableSymbol` for a byte `>= symbol_count`.
    /// - `Error::StatisticsOverflow` if the alphabet is larger than the scale.
    /// - Whatever [`AdaptiveConfig::validate`] reports.
    pub fn train(data: &[u8], symbol_count: usize, config: &AdaptiveConfig) -> Result<Self> {
        config.validate()?;
        if symbol_count == 0 || symbol_count > MAX_SYMBOLS {
            return Err(Error::InvalidAlphabet(symbol_count));
        }
        if let Some(&b) = data.iter().find(|&&b| b as usize >= symbol_count) {
            return Err(Error::UnencodableSymbol(b));
        }

        let mut counts = vec![1u32; symbol_count * symbol_count];
        for pair in data.windows(2) {
            let cell = &mut counts[pair[0] as usize * symbol_count + pair[1] as usize];
            *cell = cell.saturating_add(config.increment);
        }

        let scale = config.scale();
        let mut rows = Vec::with_capacity(symbol_count * (symbol_count + 1));
        for row in counts.chunks_exact(symbol_count) {
            let mut stats = SymbolStats::from_counts(row)?;
            stats.normalize(scale, NormalizePolicy::Fast)?;
            rows.extend_from_slice(stats.cum_freq());
        }

        log::debug!(
            "trained order-1 model over {} symbols, {} contexts, scale {}",
            data.len(),
            symbol_count,
            scale
        );
        Ok(Self {
            symbol_count,
            scale,
            rows,
        })
    }

    /// Alphabet size.
    pub fn symbol_count(&self) -> usize {
        self.symbol_count
    }

    /// Probability total of every row.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Target CDF after symbol `prev`.
    pub fn row(&self, prev: u8) -> &[u32] {
        let width = self.symbol_count + 1;
        let start = prev as usize * width;
        &self.rows[start..start + width]
    }
}

/// The live, adapted CDF.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdaptiveCdf {
    cdf: Vec<u32>,
    initial: Vec<u32>,
    adapt_rate: u32,
}

impl AdaptiveCdf {
    /// Equal frequencies over `symbol_count` symbols summing to `scale`;
    /// the first `scale % symbol_count` symbols get one extra unit.
    ///
    /// # Errors
    /// - `Error::InvalidAlphabet` for `symbol_count` outside `1..=256`.
    /// - `Error::StatisticsOverflow` if `symbol_count > scale`.
    pub fn uniform(symbol_count: usize, scale: u32, adapt_rate: u32) -> Result<Self> {
        if symbol_count == 0 || symbol_count > MAX_SYMBOLS {
            return Err(Error::InvalidAlphabet(symbol_count));
        }
        if symbol_count > scale as usize {
            return Err(Error::StatisticsOverflow {
                distinct: symbol_count,
                total: scale,
            });
        }
        let base = scale / symbol_count as u32;
        let extra = scale as usize % symbol_count;
        let mut cdf = Vec::with_capacity(symbol_count + 1);
        let mut acc = 0u32;
        cdf.push(acc);
        for s in 0..symbol_count {
            acc += base + u32::from(s < extra);
            cdf.push(acc);
        }
        Ok(Self {
            initial: cdf.clone(),
            cdf,
            adapt_rate,
        })
    }

    /// Back to the uniform distribution.
    pub fn reset(&mut self) {
        self.cdf.copy_from_slice(&self.initial);
    }

    /// Cumulative values, `symbol_count + 1` of them.
    pub fn cdf(&self) -> &[u32] {
        &self.cdf
    }

    /// Move toward `target` and check the result.
    ///
    /// # Errors
    /// Returns `Error::AdaptiveDivergence` naming the first cumulative index
    /// where the CDF is not strictly increasing, or the last index if the
    /// total changed. The CDF is left as computed.
    pub fn adapt(&mut self, target: &[u32]) -> Result<()> {
        let last = self.cdf.len() - 1;
        if target.len() != self.cdf.len() {
            return Err(Error::AdaptiveDivergence { index: last });
        }
        let total = self.cdf[last];
        for (c, &t) in self.cdf.iter_mut().zip(target) {
            let step = (t as i64 - *c as i64) >> self.adapt_rate;
            *c = (*c as i64 + step).clamp(0, u32::MAX as i64) as u32;
        }

        if let Some(i) = (1..=last).find(|&i| self.cdf[i] <= self.cdf[i - 1]) {
            return Err(Error::AdaptiveDivergence { index: i });
        }
        if self.cdf[0] != 0 || self.cdf[last] != total {
            return Err(Error::AdaptiveDivergence { index: last });
        }
        Ok(())
    }

    /// `(start, freq)` of `sym`, or `None` outside the alphabet.
    #[inline]
    pub fn interval(&self, sym: u8) -> Option<(u32, u32)> {
        let s = sym as usize;
        let end = *self.cdf.get(s + 1)?;
        Some((self.cdf[s], end - self.cdf[s]))
    }

    /// Symbol whose interval holds `slot`, with that interval.
    #[inline]
    pub fn find(&self, slot: u32) -> (u8, u32, u32) {
        let last = self.cdf.len() - 1;
        let sym = self.cdf[1..last].partition_point(|&c| c <= slot);
        (sym as u8, self.cdf[sym], self.cdf[sym + 1] - self.cdf[sym])
    }
}

/// Two-pass adaptive coder over a trained [`MixModel`].
#[derive(Clone, Debug)]
pub struct AdaptiveCoder<R: Radix> {
    model: MixModel,
    config: AdaptiveConfig,
    _radix: PhantomData<R>,
}

impl<R: Radix> AdaptiveCoder<R> {
    /// Coder for a model trained with the same `config`.
    ///
    /// # Errors
    /// `Error::InvalidScale` if the model was trained for another scale,
    /// or whatever [`AdaptiveConfig::validate`] reports.
    pub fn new(model: MixModel, config: AdaptiveConfig) -> Result<Self> {
        config.validate()?;
        if model.scale() != config.scale() {
            return Err(Error::InvalidScale(model.scale()));
        }
        Ok(Self {
            model,
            config,
            _radix: PhantomData,
        })
    }

    /// Train on `data` and build the coder in one step.
    ///
    /// # Errors
    /// Same as [`MixModel::train`].
    pub fn train(data: &[u8], symbol_count: usize, config: AdaptiveConfig) -> Result<Self> {
        let model = MixModel::train(data, symbol_count, &config)?;
        Self::new(model, config)
    }

    /// The trained model; the decoder needs the same one.
    pub fn model(&self) -> &MixModel {
        &self.model
    }

    fn live_cdf(&self) -> Result<AdaptiveCdf> {
        AdaptiveCdf::uniform(self.model.symbol_count(), self.config.scale(), self.config.adapt_rate)
    }

    /// Upper bound on the coded size of `len` symbols, in words.
    pub fn max_encoded_len(&self, len: usize) -> usize {
        let per_symbol = self.config.scale_bits.div_ceil(R::WORD_BITS) as usize;
        let blocks = len.div_ceil(self.config.split_size).max(1);
        len * per_symbol + blocks * R::FLUSH_WORDS
    }

    /// Encode `data`, one flushed stream per block.
    ///
    /// Empty input produces no words.
    ///
    /// # Errors
    /// - `Error::UnencodableSymbol` for a byte outside the alphabet.
    /// - `Error::AdaptiveDivergence` if an update breaks the CDF.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<R::Word>> {
        let mut buf = vec![R::Word::default(); self.max_encoded_len(data.len())];
        let mut out = WordWriter::new(&mut buf);
        let mut cdf = self.live_cdf()?;
        let mut intervals = Vec::with_capacity(self.config.split_size.min(data.len()));
        let scale_bits = self.config.scale_bits;
        let mut encoder = RansEncoder::<R>::new();

        // Later blocks go behind earlier ones, so walk the blocks backward.
        for (index, block) in data.chunks(self.config.split_size).enumerate().rev() {
            intervals.clear();
            cdf.reset();
            for &b in block {
                let (start, freq) = cdf.interval(b).ok_or(Error::UnencodableSymbol(b))?;
                intervals.push((start, freq));
                cdf.adapt(self.model.row(b))?;
            }

            encoder.reset();
            for &(start, freq) in intervals.iter().rev() {
                encoder.encode(&mut out, start, freq, scale_bits)?;
            }
            encoder.flush(&mut out)?;
            log::trace!("adaptive block {} ({} symbols) encoded", index, block.len());
        }

        let start = out.position();
        log::debug!(
            "adaptive encode: {} symbols into {} words",
            data.len(),
            out.written()
        );
        buf.drain(..start);
        Ok(buf)
    }

    /// Decode `len` symbols.
    ///
    /// # Errors
    /// - `Error::BufferUnderrun` if `words` is truncated.
    /// - `Error::CorruptStream` if a block does not end on the initial state.
    /// - `Error::AdaptiveDivergence` if an update breaks the CDF.
    pub fn decode(&self, words: &[R::Word], len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        let mut input = WordReader::new(words);
        let mut cdf = self.live_cdf()?;
        let scale_bits = self.config.scale_bits;

        for (index, block) in out.chunks_mut(self.config.split_size).enumerate() {
            cdf.reset();
            let mut decoder = RansDecoder::<R>::init(&mut input)?;
            for byte in block.iter_mut() {
                let (sym, start, freq) = cdf.find(decoder.decode_get(scale_bits));
                decoder.decode_advance(&mut input, start, freq, scale_bits)?;
                cdf.adapt(self.model.row(sym))?;
                *byte = sym;
            }
            if !decoder.is_final() {
                log::warn!("adaptive block {} did not end on the initial state", index);
                return Err(Error::CorruptStream);
            }
            log::trace!("adaptive block {} ({} symbols) decoded", index, block.len());
        }

        log::debug!(
            "adaptive decode: {} symbols from {} words",
            len,
            input.position()
        );
        Ok(out)
    }
}
