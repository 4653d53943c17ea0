use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nvraw_rs::nvraw::{BayerPhase, ChunkKind, decode, read_chunks, write_chunk};

fn synthetic_capture(width: u32, height: u32) -> Vec<u8> {
    let mut header = Vec::new();
    for v in [width, height, BayerPhase::RGGB.code() as u32, 10, 1, 1, 0, 0, 0] {
        header.extend_from_slice(&v.to_le_bytes());
    }

    let mut data = Vec::with_capacity(8 + (width * height * 2) as usize);
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    for i in 0..width * height {
        data.extend_from_slice(&((i % 1024) as u16).to_le_bytes());
    }

    let mut file = Vec::new();
    write_chunk(&mut file, ChunkKind::Header, &header);
    write_chunk(&mut file, ChunkKind::Data, &data);
    file
}

fn benchmark_decode_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_by_size");

    let sizes = [
        (640, 480, "640x480"),
        (1920, 1080, "1920x1080"),
        (4056, 3040, "4056x3040"),
    ];

    for (width, height, label) in sizes {
        let file = synthetic_capture(width, height);
        group.bench_with_input(BenchmarkId::from_parameter(label), &file, |b, file| {
            b.iter(|| decode(black_box(file)));
        });
    }

    group.finish();
}

fn benchmark_chunk_walk(c: &mut Criterion) {
    let file = synthetic_capture(1920, 1080);
    c.bench_function("chunk_walk", |b| {
        b.iter(|| read_chunks(black_box(&file)).count());
    });
}

criterion_group!(benches, benchmark_decode_sizes, benchmark_chunk_walk);
criterion_main!(benches);
