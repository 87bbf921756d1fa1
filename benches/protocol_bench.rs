use bb84_sim::amplification::{HashAlgorithm, PrivacyAmplifier};
use bb84_sim::config::RunConfig;
use bb84_sim::montecarlo::MonteCarloRunner;
use bb84_sim::protocol::Protocol;
use bb84_sim::SimulatedChannel;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_single_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    let protocol = Protocol::<SimulatedChannel>::default();

    for bits in [200usize, 10_000] {
        let config = RunConfig::with_bit_count(bits).noise(0.02).seed(7);
        group.bench_function(format!("clean-{bits}"), |b| {
            b.iter(|| protocol.run_once(black_box(&config)).unwrap())
        });
    }

    let config = RunConfig::with_bit_count(10_000).eavesdropper(true).seed(7);
    group.bench_function("eavesdropper-10000", |b| {
        b.iter(|| protocol.run_once(black_box(&config)).unwrap())
    });
}

fn bench_amplification(c: &mut Criterion) {
    let mut group = c.benchmark_group("amplification");
    let key: Vec<bool> = (0..4096).map(|i| i % 3 == 0).collect();
    let salt = [9u8; 32];

    for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256] {
        let amplifier = PrivacyAmplifier::new(algorithm);
        group.bench_function(format!("{algorithm:?}-4096"), |b| {
            b.iter(|| amplifier.amplify(black_box(&key), 2048, &salt))
        });
    }
}

fn bench_batch(c: &mut Criterion) {
    let runner = MonteCarloRunner::<SimulatedChannel>::default();
    let config = RunConfig::with_bit_count(1000).noise(0.03).seed(11);
    c.bench_function("batch-50x1000", |b| {
        b.iter(|| runner.run(black_box(&config), 50).unwrap())
    });
}

criterion_group!(benches, bench_single_run, bench_amplification, bench_batch);
criterion_main!(benches);
