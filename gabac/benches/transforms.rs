use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gabac::_internal_test_data::{REPETITIVE_BYTES, RUNS};
use gabac::transform::{transform_equality_coding, transform_match_coding, transform_rle_coding};

fn equality(c: &mut Criterion) {
    c.bench_function("Equality coding of 4k runs", |b| {
        b.iter_batched(
            || RUNS.clone(),
            |values| {
                let (flags, _) = transform_equality_coding(values);
                assert_eq!(flags.len(), RUNS.len());
            },
            BatchSize::SmallInput,
        )
    });
}

fn match_coding(c: &mut Criterion) {
    c.bench_function("Match coding of 4k bytes, window 256", |b| {
        b.iter_batched(
            || REPETITIVE_BYTES.clone(),
            |values| {
                let (_, lengths, _) = transform_match_coding(values, 256);
                assert!(!lengths.is_empty());
            },
            BatchSize::SmallInput,
        )
    });
}

fn rle(c: &mut Criterion) {
    c.bench_function("RLE coding of 4k runs", |b| {
        b.iter_batched(
            || RUNS.clone(),
            |values| {
                let (lengths, _) = transform_rle_coding(values, 255);
                assert!(!lengths.is_empty());
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, equality, match_coding, rle);
criterion_main!(benches);
