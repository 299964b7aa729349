//! Benchmarks for landmark smoothing

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rep_counter::{
    constants::NUM_POSE_LANDMARKS,
    filters::{create_filter, LandmarkFilter},
    landmarks::{Frame, Landmark},
};

/// Noisy full-body frames drifting slowly across the image
fn noisy_frames(count: usize) -> Vec<Frame> {
    (0..count)
        .map(|i| {
            let t = i as f64 * 0.05;
            (0..NUM_POSE_LANDMARKS)
                .map(|j| {
                    let jitter = 0.01 * (rand::random::<f64>() - 0.5);
                    Landmark::new(
                        0.5 + 0.2 * (t + j as f64).sin() + jitter,
                        0.5 + 0.2 * (t + j as f64).cos() + jitter,
                        0.8 + 0.2 * rand::random::<f64>(),
                    )
                })
                .collect::<Vec<_>>()
                .into()
        })
        .collect()
}

fn benchmark_smoothers(c: &mut Criterion) {
    let mut group = c.benchmark_group("smoothers");
    let frames = noisy_frames(100);

    for name in ["none", "moving_average:3", "moving_average:5", "moving_average:10"] {
        group.bench_with_input(BenchmarkId::new("sequence_100", name), &frames, |b, data| {
            let mut filter: Box<dyn LandmarkFilter> = create_filter(name).unwrap();
            b.iter(|| {
                filter.reset();
                for frame in data {
                    black_box(filter.apply(black_box(frame)));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_smoothers);
criterion_main!(benches);
