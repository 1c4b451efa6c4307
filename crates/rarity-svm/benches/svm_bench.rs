//! Criterion benchmarks for rarity-svm: fitting and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rarity_svm::SvmConfig;

fn make_classification(
    n_samples: usize,
    n_features: usize,
    n_classes: usize,
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        let row: Vec<f64> = (0..n_features)
            .map(|_| class as f64 * 3.0 + rng.r#gen::<f64>() * 2.0)
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn bench_svm_fit(c: &mut Criterion) {
    let (features, labels) = make_classification(500, 4, 5, 42);
    let cfg = SvmConfig::new();

    c.bench_function("svm_fit_500x4_5class", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_svm_predict_proba_batch(c: &mut Criterion) {
    let (features, labels) = make_classification(500, 4, 5, 42);
    let model = SvmConfig::new().fit(&features, &labels).unwrap();

    c.bench_function("svm_predict_proba_batch_500x4", |b| {
        b.iter(|| model.predict_proba_batch(&features).unwrap());
    });
}

criterion_group!(benches, bench_svm_fit, bench_svm_predict_proba_batch);
criterion_main!(benches);
