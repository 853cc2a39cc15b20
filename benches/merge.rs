use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tabgroups::context::{LineRange, merge_ranges};

fn windows(count: usize, spacing: usize) -> Vec<LineRange> {
    // Interleaved so the sort has real work to do
    (0..count)
        .map(|i| {
            let line = ((i * 7919) % count) * spacing;
            LineRange::around(line, 5, count * spacing, format!("mark {}", i))
        })
        .collect()
}

fn merge_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_ranges");

    for (name, count, spacing) in [
        ("100_dense", 100, 4),
        ("100_sparse", 100, 40),
        ("10k_dense", 10_000, 4),
        ("10k_sparse", 10_000, 40),
    ] {
        let input = windows(count, spacing);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(name, |b| b.iter(|| merge_ranges(black_box(input.clone()))));
    }

    group.finish();
}

criterion_group!(benches, merge_benchmark);
criterion_main!(benches);
