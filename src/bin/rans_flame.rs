use ans_coders::{BlockCodec, CoderConfig, Layout, Rans32};

fn main() -> ans_coders::Result<()> {
    let input = (0..10000).map(|i| (i % 3) as u8).collect::<Vec<_>>();
    let config = CoderConfig::default()
        .with_scale_bits(8)
        .with_lanes(4)
        .with_layout(Layout::Vectorized);
    let codec = BlockCodec::<Rans32>::from_data(&input, config)?;

    for _ in 0..1000 {
        let words = codec.encode(&input)?;
        let output = codec.decode(&words, input.len())?;
        assert_eq!(output, input);
    }
    Ok(())
}
