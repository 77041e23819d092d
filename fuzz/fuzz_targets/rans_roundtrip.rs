#![no_main]
use ans_coders::{BlockCodec, CoderConfig, Layout, Rans16};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u8)| {
    let (input, knobs) = data;
    let scale_bits = (knobs as u32 % 8) + 9; // 9 to 16 bits
    let lanes = [1, 2, 4, 8][(knobs as usize >> 3) % 4];
    let layout = if knobs & 0x20 != 0 {
        Layout::Vectorized
    } else {
        Layout::Interleaved
    };

    let config = CoderConfig::default()
        .with_scale_bits(scale_bits)
        .with_lanes(lanes)
        .with_layout(layout);
    let codec = BlockCodec::<Rans16>::from_data(&input, config).unwrap();
    let words = codec.encode(&input).unwrap();
    assert_eq!(codec.decode(&words, input.len()).unwrap(), input);

    // Arbitrary bytes read as a stream must fail cleanly, never panic.
    let noise: Vec<u16> = input
        .chunks(2)
        .map(|c| c.iter().fold(0u16, |acc, &b| acc << 8 | b as u16))
        .collect();
    let _ = codec.decode(&noise, input.len());
});
