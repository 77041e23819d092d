use ans_coders::{
    BlockCodec, CoderConfig, Layout, NormalizePolicy, Radix, Rans16, Rans32, Rans8, RansDecoder,
    RansEncoder, SymbolStats, WordReader, WordWriter,
};
use proptest::prelude::*;

fn three_symbol_roundtrip<R: Radix>(input: &[usize], total_bits: u32) -> Vec<usize> {
    // Setup 3 symbols with total power-of-2 frequency
    let total = 1u32 << total_bits;
    let freq0 = total / 2; // 50%
    let freq1 = total / 4; // 25%
    let freq2 = total - freq0 - freq1;
    let symbols = [(0, freq0), (freq0, freq1), (freq0 + freq1, freq2)];

    let mut buf = vec![R::Word::default(); input.len() * 2 + R::FLUSH_WORDS];
    let mut out = WordWriter::new(&mut buf);
    let mut encoder = RansEncoder::<R>::new();

    // Encode in reverse
    for &sym_idx in input.iter().rev() {
        let (cum_freq, freq) = symbols[sym_idx];
        encoder.encode(&mut out, cum_freq, freq, total_bits).unwrap();
    }
    encoder.flush(&mut out).unwrap();

    // Decode
    let mut reader = WordReader::new(out.as_slice());
    let mut decoder = RansDecoder::<R>::init(&mut reader).unwrap();
    let mut output = Vec::new();
    for _ in 0..input.len() {
        let cf = decoder.decode_get(total_bits);
        let sym_idx = if cf < symbols[1].0 {
            0
        } else if cf < symbols[2].0 {
            1
        } else {
            2
        };
        output.push(sym_idx);
        let (cum_freq, freq) = symbols[sym_idx];
        decoder.decode_advance(&mut reader, cum_freq, freq, total_bits).unwrap();
    }
    assert!(decoder.is_final());
    output
}

fn policy() -> impl Strategy<Value = NormalizePolicy> {
    prop_oneof![
        Just(NormalizePolicy::Fast),
        Just(NormalizePolicy::Optimal),
        Just(NormalizePolicy::Cumulative),
    ]
}

proptest! {
    #[test]
    fn test_rans_roundtrip(
        input in prop::collection::vec(0..3usize, 1..100),
        total_bits in 8..16u32,
    ) {
        prop_assert_eq!(three_symbol_roundtrip::<Rans8>(&input, total_bits), input.clone());
        prop_assert_eq!(three_symbol_roundtrip::<Rans16>(&input, total_bits), input.clone());
        prop_assert_eq!(three_symbol_roundtrip::<Rans32>(&input, total_bits), input);
    }

    #[test]
    fn test_normalized_sum_and_floor(
        counts in prop::collection::vec(0u32..5000, 1..256),
        scale_bits in 8..=16u32,
        policy in policy(),
    ) {
        let mut stats = SymbolStats::from_counts(&counts).unwrap();
        stats.normalize(1 << scale_bits, policy).unwrap();
        let sum: u32 = stats.freq().iter().sum();
        prop_assert_eq!(sum, 1 << scale_bits);
        for (&raw, &freq) in counts.iter().zip(stats.freq()) {
            prop_assert!(raw == 0 || freq >= 1);
        }
    }

    #[test]
    fn test_block_codec_roundtrip(
        data in prop::collection::vec(any::<u8>(), 0..2000),
        lanes in prop_oneof![Just(1usize), Just(2), Just(4), Just(8)],
        vectorized in any::<bool>(),
        policy in policy(),
    ) {
        let layout = if vectorized { Layout::Vectorized } else { Layout::Interleaved };
        let config = CoderConfig::default()
            .with_scale_bits(11)
            .with_lanes(lanes)
            .with_layout(layout)
            .with_normalization(policy);
        let codec = BlockCodec::<Rans16>::from_data(&data, config).unwrap();
        let words = codec.encode(&data).unwrap();
        prop_assert_eq!(codec.decode(&words, data.len()).unwrap(), data);
    }
}
