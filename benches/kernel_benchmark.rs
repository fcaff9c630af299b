use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wdsvm::api::SVM;
use wdsvm::utils::synthetic::{planted_motif, MotifConfig};
use wdsvm::{Dataset, Kernel, KernelMatrix, LabeledSequences, WeightedDegreeKernel};

fn dataset(n: usize, length: usize) -> LabeledSequences {
    planted_motif(&MotifConfig {
        n_positive: n / 2,
        n_negative: n - n / 2,
        length,
        ..MotifConfig::default()
    })
    .unwrap()
}

fn bench_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("wd_pair");

    for length in [50, 200, 1000] {
        let data = dataset(2, length);
        let x = data.sequences().get(0);
        let y = data.sequences().get(1);
        let kernel = WeightedDegreeKernel::new(20).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, _| {
            b.iter(|| kernel.compute(black_box(x), black_box(y)))
        });
    }

    group.finish();
}

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("wd_matrix");
    group.sample_size(10);

    let data = dataset(200, 100);
    let kernel = WeightedDegreeKernel::standard(10).unwrap();
    group.bench_function("200x100_d10", |b| {
        b.iter(|| KernelMatrix::compute(&kernel, black_box(data.sequences())))
    });

    group.finish();
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(10);

    let data = dataset(200, 20);
    group.bench_function("motif_200_d6", |b| {
        b.iter(|| {
            SVM::with_kernel(WeightedDegreeKernel::new(6).unwrap())
                .with_c(10.0)
                .train(black_box(&data))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pair, bench_matrix, bench_train);
criterion_main!(benches);
