use ans_coders::{
    AdaptiveCoder, AdaptiveConfig, BlockCodec, CoderConfig, DecodePath, EncodePath, Layout, Rans16,
    Rans32, Rans8, RansDecoder, RansEncoder, SymbolStats, WordReader, WordWriter,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn sample(len: usize) -> Vec<u8> {
    // Skewed, text-like bytes.
    (0..len as u32)
        .map(|i| {
            let h = i.wrapping_mul(2_654_435_761) >> 24;
            match h {
                0..=127 => b'e',
                128..=191 => b't',
                192..=223 => b'a',
                _ => (h % 26) as u8 + b'a',
            }
        })
        .collect()
}

fn bench_rans_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("rans_single");
    let input = (0..1000).map(|i| (i % 3) as u32).collect::<Vec<_>>();
    let total_bits = 8;
    let symbols = [(0, 128), (128, 64), (192, 64)];
    let mut buf = vec![0u16; input.len() + 2];

    group.bench_function("encode", |b| {
        b.iter(|| {
            let mut out = WordWriter::new(&mut buf);
            let mut encoder = RansEncoder::<Rans16>::new();
            for &idx in input.iter().rev() {
                let (cf, f) = symbols[idx as usize];
                encoder.encode(&mut out, cf, f, total_bits).unwrap();
            }
            encoder.flush(&mut out).unwrap();
            out.position()
        })
    });

    let mut out = WordWriter::new(&mut buf);
    let mut encoder = RansEncoder::<Rans16>::new();
    for &idx in input.iter().rev() {
        let (cf, f) = symbols[idx as usize];
        encoder.encode(&mut out, cf, f, total_bits).unwrap();
    }
    encoder.flush(&mut out).unwrap();
    let stream = out.as_slice().to_vec();

    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut reader = WordReader::new(&stream);
            let mut decoder = RansDecoder::<Rans16>::init(&mut reader).unwrap();
            for _ in 0..input.len() {
                let cf = decoder.decode_get(total_bits);
                let idx = if cf < 128 {
                    0
                } else if cf < 192 {
                    1
                } else {
                    2
                };
                let (ccf, f) = symbols[idx];
                decoder.decode_advance(&mut reader, ccf, f, total_bits).unwrap();
            }
            decoder.get_state()
        })
    });
}

fn bench_block_paths(c: &mut Criterion) {
    let data = sample(1 << 16);
    let mut group = c.benchmark_group("block");
    group.throughput(Throughput::Bytes(data.len() as u64));

    let variants = [
        (
            "division-search-x1",
            CoderConfig::default()
                .with_encode_path(EncodePath::Division)
                .with_decode_path(DecodePath::Search),
        ),
        ("reciprocal-table-x1", CoderConfig::default()),
        ("reciprocal-table-x2", CoderConfig::default().with_lanes(2)),
        ("reciprocal-table-x4", CoderConfig::default().with_lanes(4)),
        ("vector-x4", CoderConfig::default().with_lanes(4).with_layout(Layout::Vectorized)),
        ("vector-x8", CoderConfig::default().with_lanes(8).with_layout(Layout::Vectorized)),
    ];

    for (name, config) in variants {
        let codec = BlockCodec::<Rans32>::from_data(&data, config).unwrap();
        let words = codec.encode(&data).unwrap();
        group.bench_with_input(BenchmarkId::new("encode", name), &data, |b, data| {
            b.iter(|| codec.encode(data).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("decode", name), &words, |b, words| {
            b.iter(|| codec.decode(words, data.len()).unwrap())
        });
    }
    group.finish();
}

fn bench_radices(c: &mut Criterion) {
    let data = sample(1 << 16);
    let mut group = c.benchmark_group("radix");
    group.throughput(Throughput::Bytes(data.len() as u64));
    let config = CoderConfig::default().with_lanes(2);

    let mut stats = SymbolStats::from_bytes(&data);
    stats.normalize(config.scale(), config.normalization).unwrap();

    let r8 = BlockCodec::<Rans8>::new(&stats, config).unwrap();
    group.bench_function("encode/8", |b| b.iter(|| r8.encode(&data).unwrap()));
    let r16 = BlockCodec::<Rans16>::new(&stats, config).unwrap();
    group.bench_function("encode/16", |b| b.iter(|| r16.encode(&data).unwrap()));
    let r32 = BlockCodec::<Rans32>::new(&stats, config).unwrap();
    group.bench_function("encode/32", |b| b.iter(|| r32.encode(&data).unwrap()));
    group.finish();
}

fn bench_adaptive(c: &mut Criterion) {
    let data = sample(1 << 16);
    let mut group = c.benchmark_group("adaptive");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(20);

    let coder = AdaptiveCoder::<Rans32>::train(&data, 256, AdaptiveConfig::default()).unwrap();
    let words = coder.encode(&data).unwrap();
    group.bench_function("encode", |b| b.iter(|| coder.encode(&data).unwrap()));
    group.bench_function("decode", |b| b.iter(|| coder.decode(&words, data.len()).unwrap()));
    group.finish();
}

criterion_group!(benches, bench_rans_single, bench_block_paths, bench_radices, bench_adaptive);
criterion_main!(benches);
