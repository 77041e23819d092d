//! Direct-lookup decode table.
//!
//! One slot per unit of probability scale. Slot `s` belongs to the symbol
//! whose cumulative range holds `s` and stores that symbol's frequency and
//! the offset of `s` inside the range, so the decoder step becomes
//! `x' = freq * (x >> b) + bias` with no search.

use crate::error::Result;
use crate::stats::SymbolStats;

/// Decode constants of one table slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot {
    /// Frequency of the owning symbol.
    pub freq: u32,
    /// `slot - cum_start` of the owning symbol.
    pub bias: u32,
}

/// Slot table for O(1) decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    slots: Vec<Slot>,
    slot_to_symbol: Vec<u8>,
    scale_bits: u32,
}

impl SymbolTable {
    /// Build the table from normalized statistics.
    ///
    /// # Errors
    /// Returns `Error::InvalidScale` unless the statistics sum to a power of
    /// two.
    pub fn new(stats: &SymbolStats) -> Result<Self> {
        let scale_bits = stats.scale_bits()?;
        let scale = 1usize << scale_bits;
        let mut slots = vec![Slot::default(); scale];
        let mut slot_to_symbol = vec![0u8; scale];

        for (sym, (&freq, &start)) in stats.freq().iter().zip(stats.cum_freq()).enumerate() {
            let start = start as usize;
            for (bias, (slot, owner)) in slots[start..start + freq as usize]
                .iter_mut()
                .zip(&mut slot_to_symbol[start..start + freq as usize])
                .enumerate()
            {
                *slot = Slot {
                    freq,
                    bias: bias as u32,
                };
                *owner = sym as u8;
            }
        }

        log::debug!("built {}-slot decode table", scale);
        Ok(Self {
            slots,
            slot_to_symbol,
            scale_bits,
        })
    }

    /// `log2` of the number of slots.
    pub fn scale_bits(&self) -> u32 {
        self.scale_bits
    }

    /// Symbol and slot constants for the low `scale_bits` of `x`.
    #[inline]
    pub fn lookup(&self, x: u64) -> (u8, Slot) {
        let idx = (x & ((1u64 << self.scale_bits) - 1)) as usize;
        (self.slot_to_symbol[idx], self.slots[idx])
    }

    /// All slots.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Owning symbol of every slot.
    pub fn slot_to_symbol(&self) -> &[u8] {
        &self.slot_to_symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::NormalizePolicy;

    #[test]
    fn slots_follow_cumulative_ranges() {
        let mut stats = SymbolStats::from_counts(&[6, 0, 2]).unwrap();
        stats.normalize(8, NormalizePolicy::Fast).unwrap();
        let table = SymbolTable::new(&stats).unwrap();

        assert_eq!(table.slot_to_symbol(), &[0, 0, 0, 0, 0, 0, 2, 2]);
        assert_eq!(table.slots()[5], Slot { freq: 6, bias: 5 });
        assert_eq!(table.slots()[6], Slot { freq: 2, bias: 0 });
        assert_eq!(table.lookup(0b1_0111), (2, Slot { freq: 2, bias: 1 }));
    }

    #[test]
    fn table_agrees_with_search() {
        let mut stats = SymbolStats::from_bytes(b"the quick brown fox jumps over the lazy dog");
        stats.normalize(1 << 10, NormalizePolicy::Optimal).unwrap();
        let table = SymbolTable::new(&stats).unwrap();
        for slot in 0..1u32 << 10 {
            let (sym, start, freq) = stats.find(slot);
            let (tsym, entry) = table.lookup(slot as u64);
            assert_eq!(sym, tsym);
            assert_eq!(entry.freq, freq);
            assert_eq!(entry.bias, slot - start);
        }
    }

    #[test]
    fn unnormalized_stats_are_rejected() {
        let stats = SymbolStats::from_bytes(b"abc");
        assert!(SymbolTable::new(&stats).is_err());
    }
}
