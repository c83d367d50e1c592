//! Benchmarks for whole-file compression and archive member operations.
//!
//! Measures codec throughput per algorithm and the cost of the rewrite paths
//! used by member removal.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use filepack_core::Algorithm;
use filepack_core::Archive;
use filepack_core::ArchiveFormat;
use filepack_core::CompressOptions;
use filepack_core::Compression;
use filepack_core::test_utils::redundant_text;
use filepack_core::test_utils::write_file;
use std::hint::black_box;
use tempfile::TempDir;

const INPUT_SIZE: usize = 1024 * 1024;

fn benchmark_compress(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let source = write_file(temp.path(), "input.txt", &redundant_text(INPUT_SIZE));

    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(INPUT_SIZE as u64));

    for algorithm in Algorithm::ALL {
        group.bench_with_input(
            BenchmarkId::new("algorithm", algorithm.name()),
            &algorithm,
            |b, &algorithm| {
                let target = temp.path().join(format!("out.{}", algorithm.extension()));
                let options = CompressOptions::default()
                    .with_target_path(&target)
                    .with_overwrite(true);
                b.iter(|| {
                    let mut file = Compression::new(&source).unwrap();
                    black_box(file.compress(algorithm, &options).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn benchmark_uncompressed_size(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();

    let mut group = c.benchmark_group("uncompressed_size");
    group.throughput(Throughput::Bytes(INPUT_SIZE as u64));

    for algorithm in Algorithm::ALL {
        let source = write_file(
            temp.path(),
            &format!("input-{}.txt", algorithm.name()),
            &redundant_text(INPUT_SIZE),
        );
        let mut file = Compression::new(&source).unwrap();
        file.compress(algorithm, &CompressOptions::default().with_in_place(true))
            .unwrap();

        group.bench_function(algorithm.name(), |b| {
            b.iter(|| black_box(file.uncompressed_size(algorithm).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_remove_member(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_member");
    group.sample_size(20);

    for format in [ArchiveFormat::Tar, ArchiveFormat::Zip, ArchiveFormat::SevenZip] {
        group.bench_with_input(BenchmarkId::new("format", format), &format, |b, &format| {
            b.iter_batched(
                || {
                    let temp = TempDir::new().unwrap();
                    let archive =
                        Archive::new(temp.path().join(format!("bench.{}", format.extension())))
                            .unwrap();
                    for i in 0..50 {
                        let source =
                            write_file(temp.path(), &format!("file_{i:03}.txt"), &redundant_text(4096));
                        archive.add_member(&source, None).unwrap();
                    }
                    (temp, archive)
                },
                |(_temp, archive)| archive.remove_member("file_025.txt").unwrap(),
                criterion::BatchSize::PerIteration,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compress,
    benchmark_uncompressed_size,
    benchmark_remove_member
);
criterion_main!(benches);
