// In splatpress-core/benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use splatpress::kernels::byte_delta;
use splatpress::{AttributeBuffer, ChunkedCodec, CodecConfig, RecordLayout};

// --- Mock splat data ---

const VERTEX_COUNT: usize = 16_384;
const VERTEX_STRIDE: usize = 248;

/// Slowly drifting f32 attributes with noise in the low mantissa bits.
fn generate_splat_bytes(count: usize, stride: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let fields = stride / 4;
    let mut values = Vec::with_capacity(count * fields);
    for i in 0..count {
        for k in 0..fields {
            let noise: f32 = rng.random_range(-1.0e-4..1.0e-4);
            values.push(k as f32 + i as f32 * 0.001 + noise);
        }
    }
    bytemuck::cast_slice(&values).to_vec()
}

// --- Benchmark Suite ---

fn bench_byte_delta(c: &mut Criterion) {
    let data = generate_splat_bytes(VERTEX_COUNT, VERTEX_STRIDE);
    let filtered = byte_delta::encode(&data, VERTEX_STRIDE, VERTEX_COUNT).unwrap();
    let mut scratch = vec![0u8; data.len()];

    let mut group = c.benchmark_group("Byte Delta Filter");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("filter", |b| {
        b.iter(|| {
            byte_delta::filter(
                black_box(&data),
                &mut scratch,
                VERTEX_STRIDE,
                VERTEX_COUNT,
            )
        })
    });
    group.bench_function("unfilter", |b| {
        b.iter(|| {
            byte_delta::unfilter(
                black_box(&filtered),
                &mut scratch,
                VERTEX_STRIDE,
                VERTEX_COUNT,
            )
        })
    });
    group.finish();
}

fn bench_container(c: &mut Criterion) {
    let data = generate_splat_bytes(VERTEX_COUNT, VERTEX_STRIDE);
    let layout = RecordLayout::new(VERTEX_COUNT, VERTEX_STRIDE);
    let buffer = AttributeBuffer::new(&data, layout).unwrap();

    let mut group = c.benchmark_group("Chunked Container");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for config in CodecConfig::presets() {
        let codec = ChunkedCodec::new(config);
        // The fastest level is representative enough for a regression bench.
        let level = codec.levels()[0];
        let compressed = codec.compress(&buffer, level).unwrap();
        let mut restored = vec![0u8; data.len()];

        group.bench_function(format!("compress {} @{}", codec.name(), level), |b| {
            b.iter(|| black_box(codec.compress(black_box(&buffer), level)))
        });
        group.bench_function(format!("decompress {} @{}", codec.name(), level), |b| {
            b.iter(|| codec.decompress_into(black_box(&compressed), layout, &mut restored))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_byte_delta, bench_container);
criterion_main!(benches);
