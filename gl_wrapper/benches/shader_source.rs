use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gl_wrapper::program::ShaderSource;

const COMBINED: &str = include_str!("../tests/fixtures/combined.shader");

pub fn split_combined(c: &mut Criterion) {
    c.bench_function("parse_combined", |b| {
        b.iter(|| ShaderSource::parse_combined(black_box(COMBINED)))
    });
}

criterion_group!(benches, split_combined);
criterion_main!(benches);
