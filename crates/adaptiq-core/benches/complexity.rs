use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adaptiq_core::complexity::ComplexityEstimator;

const CHAPTER: &str = "Photosynthesis is the process by which green plants use sunlight, \
water and carbon dioxide to make glucose and oxygen. Chlorophyll in the chloroplasts \
absorbs light energy. The light-dependent reactions take place in the thylakoid \
membranes, while the Calvin cycle takes place in the stroma.";

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_complexity");
    let estimator = ComplexityEstimator::new();

    group.bench_function("paragraph", |b| {
        b.iter(|| estimator.estimate_complexity(black_box(CHAPTER)))
    });

    let long = CHAPTER.repeat(200);
    group.bench_function("chapter", |b| {
        b.iter(|| estimator.estimate_complexity(black_box(&long)))
    });

    group.bench_function("stop words only", |b| {
        b.iter(|| estimator.estimate_complexity(black_box("the and of to it is a")))
    });

    group.finish();
}

criterion_group!(benches, bench_estimate);
criterion_main!(benches);
