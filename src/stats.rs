//! Symbol statistics and frequency normalization.
//!
//! A histogram of raw counts is rescaled so the frequencies sum exactly to a
//! probability total. Every symbol that occurs in the source keeps a
//! frequency of at least 1; a starved symbol could not be encoded at all.

use crate::error::{Error, Result};

/// Largest supported alphabet.
pub const MAX_SYMBOLS: usize = 256;

/// Largest supported probability scale, in bits.
pub const MAX_SCALE_BITS: u32 = 16;

/// How raw counts are rescaled to the probability total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalizePolicy {
    /// Proportional rescale with largest-remainder rounding.
    #[default]
    Fast,
    /// `Fast`, then greedy unit moves that lower the coded size
    /// `-Σ count·log2(freq)` until no single move helps.
    Optimal,
    /// Rescale the cumulative counts, then repair starved symbols by
    /// stealing from the smallest frequency above 1.
    Cumulative,
}

/// Raw counts plus their normalized frequencies and cumulative starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolStats {
    raw: Vec<u32>,
    freq: Vec<u32>,
    cum_freq: Vec<u32>,
    total: u32,
}

impl SymbolStats {
    /// Histogram of a byte sequence over the full 256-symbol alphabet.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut raw = vec![0u32; MAX_SYMBOLS];
        for &b in data {
            raw[b as usize] = raw[b as usize].saturating_add(1);
        }
        Self::with_raw(raw)
    }

    /// Statistics from explicit counts, one per symbol.
    ///
    /// # Errors
    /// Returns `Error::InvalidAlphabet` for an empty slice or one longer
    /// than [`MAX_SYMBOLS`].
    pub fn from_counts(counts: &[u32]) -> Result<Self> {
        if counts.is_empty() || counts.len() > MAX_SYMBOLS {
            return Err(Error::InvalidAlphabet(counts.len()));
        }
        Ok(Self::with_raw(counts.to_vec()))
    }

    fn with_raw(raw: Vec<u32>) -> Self {
        let freq = raw.clone();
        let cum_freq = cumulative(&freq);
        Self {
            raw,
            freq,
            cum_freq,
            total: 0,
        }
    }

    /// Rescale so the frequencies sum to `target_total`.
    ///
    /// An empty histogram hands the whole total to symbol 0 so that the
    /// derived tables stay well formed.
    ///
    /// # Errors
    /// - `Error::InvalidScale` if `target_total` is 0 or above `2^16`.
    /// - `Error::StatisticsOverflow` if more symbols occur than there are
    ///   slots in `target_total`.
    pub fn normalize(&mut self, target_total: u32, policy: NormalizePolicy) -> Result<()> {
        if target_total == 0 || target_total > 1 << MAX_SCALE_BITS {
            return Err(Error::InvalidScale(target_total));
        }
        let distinct = self.distinct();
        if distinct > target_total as usize {
            return Err(Error::StatisticsOverflow {
                distinct,
                total: target_total,
            });
        }

        let freq = if distinct == 0 {
            let mut freq = vec![0u32; self.raw.len()];
            freq[0] = target_total;
            freq
        } else {
            match policy {
                NormalizePolicy::Fast => normalize_fast(&self.raw, target_total),
                NormalizePolicy::Optimal => normalize_optimal(&self.raw, target_total),
                NormalizePolicy::Cumulative => normalize_cumulative(&self.raw, target_total)?,
            }
        };

        let sum: u64 = freq.iter().map(|&f| f as u64).sum();
        let starved = self.raw.iter().zip(&freq).any(|(&c, &f)| c > 0 && f == 0);
        if sum != target_total as u64 || starved {
            return Err(Error::StatisticsOverflow {
                distinct,
                total: target_total,
            });
        }

        self.cum_freq = cumulative(&freq);
        self.freq = freq;
        self.total = target_total;
        log::debug!(
            "normalized {} symbols ({} present) to total {} with {:?}",
            self.raw.len(),
            distinct,
            target_total,
            policy
        );
        Ok(())
    }

    /// Number of symbols with a nonzero raw count.
    pub fn distinct(&self) -> usize {
        self.raw.iter().filter(|&&c| c > 0).count()
    }

    /// Alphabet size.
    pub fn symbol_count(&self) -> usize {
        self.raw.len()
    }

    /// Raw counts.
    pub fn raw_counts(&self) -> &[u32] {
        &self.raw
    }

    /// Normalized frequencies (raw counts before [`normalize`](Self::normalize)).
    pub fn freq(&self) -> &[u32] {
        &self.freq
    }

    /// Exclusive prefix sums of [`freq`](Self::freq); one entry longer.
    ///
    /// Before normalization the sums of raw counts saturate at `u32::MAX`.
    pub fn cum_freq(&self) -> &[u32] {
        &self.cum_freq
    }

    /// Probability total, or 0 before normalization.
    pub fn total(&self) -> u32 {
        self.total
    }

    /// True once [`normalize`](Self::normalize) succeeded.
    pub fn is_normalized(&self) -> bool {
        self.total != 0
    }

    /// `log2` of the probability total.
    ///
    /// # Errors
    /// Returns `Error::InvalidScale` unless the statistics are normalized to
    /// a power of two.
    pub fn scale_bits(&self) -> Result<u32> {
        if self.total == 0 || !self.total.is_power_of_two() {
            return Err(Error::InvalidScale(self.total));
        }
        Ok(self.total.trailing_zeros())
    }

    /// `(symbol, cum_start, freq)` of the symbol whose range holds `slot`.
    pub fn find(&self, slot: u32) -> (u8, u32, u32) {
        let k = self.freq.len();
        let sym = self.cum_freq[..k].partition_point(|&c| c <= slot) - 1;
        (sym as u8, self.cum_freq[sym], self.freq[sym])
    }

    /// Empirical order-0 entropy of the raw counts, in bits per symbol.
    pub fn entropy(&self) -> f64 {
        let sum: u64 = self.raw.iter().map(|&c| c as u64).sum();
        if sum == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .raw
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| c as f64 * (c as f64).log2())
            .sum();
        (sum as f64).log2() - weighted / sum as f64
    }
}

fn cumulative(freq: &[u32]) -> Vec<u32> {
    let mut cum = Vec::with_capacity(freq.len() + 1);
    let mut acc = 0u32;
    cum.push(0);
    for &f in freq {
        acc = acc.saturating_add(f);
        cum.push(acc);
    }
    cum
}

fn present(raw: &[u32]) -> Vec<usize> {
    (0..raw.len()).filter(|&s| raw[s] > 0).collect()
}

fn normalize_fast(raw: &[u32], target: u32) -> Vec<u32> {
    let total: u64 = raw.iter().map(|&c| c as u64).sum();
    let mut freq = vec![0u32; raw.len()];
    let mut rem = vec![0u64; raw.len()];
    let mut sum = 0u64;

    for (s, &c) in raw.iter().enumerate() {
        if c == 0 {
            continue;
        }
        let exact = c as u64 * target as u64;
        freq[s] = ((exact / total) as u32).max(1);
        rem[s] = exact % total;
        sum += freq[s] as u64;
    }

    let mut order = present(raw);
    let target = target as u64;
    if sum < target {
        // Largest remainders first, ties to the more frequent symbol.
        order.sort_by(|&a, &b| rem[b].cmp(&rem[a]).then(raw[b].cmp(&raw[a])));
        let mut need = target - sum;
        let mut i = 0;
        while need > 0 {
            freq[order[i % order.len()]] += 1;
            need -= 1;
            i += 1;
        }
    } else if sum > target {
        // Surplus only comes from symbols bumped up to 1.
        order.sort_by(|&a, &b| rem[a].cmp(&rem[b]).then(freq[b].cmp(&freq[a])));
        let mut excess = sum - target;
        while excess > 0 {
            let mut progressed = false;
            for &s in &order {
                if excess == 0 {
                    break;
                }
                if freq[s] > 1 {
                    freq[s] -= 1;
                    excess -= 1;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }
    freq
}

fn normalize_optimal(raw: &[u32], target: u32) -> Vec<u32> {
    const EPS: f64 = 1e-9;

    let mut freq = normalize_fast(raw, target);
    let symbols = present(raw);
    let gain = |s: usize, f: u32| raw[s] as f64 * ((f as f64 + 1.0).log2() - (f as f64).log2());
    let loss = |s: usize, f: u32| raw[s] as f64 * ((f as f64).log2() - (f as f64 - 1.0).log2());

    for _ in 0..target {
        let up = symbols
            .iter()
            .map(|&s| (gain(s, freq[s]), s))
            .max_by(|a, b| a.0.total_cmp(&b.0));
        let down = symbols
            .iter()
            .filter(|&&s| freq[s] > 1)
            .map(|&s| (loss(s, freq[s]), s))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        match (up, down) {
            (Some((g, u)), Some((l, d))) if u != d && g > l + EPS => {
                freq[u] += 1;
                freq[d] -= 1;
            }
            _ => break,
        }
    }
    freq
}

fn normalize_cumulative(raw: &[u32], target: u32) -> Result<Vec<u32>> {
    let k = raw.len();
    let mut raw_cum = vec![0u64; k + 1];
    for i in 0..k {
        raw_cum[i + 1] = raw_cum[i] + raw[i] as u64;
    }
    let total = raw_cum[k];

    let mut cum: Vec<u32> = raw_cum
        .iter()
        .map(|&c| (target as u64 * c / total) as u32)
        .collect();

    for i in 0..k {
        if raw[i] == 0 || cum[i + 1] != cum[i] {
            continue;
        }
        let mut best: Option<(u32, usize)> = None;
        for j in 0..k {
            let f = cum[j + 1] - cum[j];
            if f > 1 && best.map_or(true, |(bf, _)| f < bf) {
                best = Some((f, j));
            }
        }
        let Some((_, steal)) = best else {
            return Err(Error::StatisticsOverflow {
                distinct: present(raw).len(),
                total: target,
            });
        };
        if steal < i {
            for c in &mut cum[steal + 1..=i] {
                *c -= 1;
            }
        } else {
            for c in &mut cum[i + 1..=steal] {
                *c += 1;
            }
        }
    }

    Ok(cum.windows(2).map(|w| w[1] - w[0]).collect())
}
