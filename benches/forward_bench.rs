use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mnist_mlp::config::{Config, Variant};
use mnist_mlp::model::Mlp;
use mnist_mlp::train::Trainer;
use ndarray::Array1;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use std::hint::black_box;

fn gen_input(len: usize) -> Array1<f32> {
    Array1::<f32>::random(len, Uniform::new(0.0, 1.0))
}

fn network(variant: Variant) -> (Mlp, Trainer) {
    let mut config = Config::preset(variant);
    config.network.seed = Some(0);
    (
        Mlp::new(&config.network).unwrap(),
        Trainer::new(&config.training).unwrap(),
    )
}

fn forward_pass_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("MLP_Forward");
    let input = gen_input(784);

    // multiply-adds of the 784-16-16-10 network
    group.throughput(Throughput::Elements((784 * 16 + 16 * 16 + 16 * 10) as u64));
    for variant in [Variant::ReluSoftmax, Variant::Sigmoid] {
        let (nn, _) = network(variant);
        group.bench_with_input(
            BenchmarkId::new("forward_pass", format!("{variant:?}")),
            &input,
            |b, input| b.iter(|| nn.forward(black_box(input.view()))),
        );
    }
    group.finish();
}

fn train_step_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("MLP_Train_Step");
    let input = gen_input(784);

    for variant in [Variant::ReluSoftmax, Variant::Sigmoid] {
        let (mut nn, trainer) = network(variant);
        group.bench_with_input(
            BenchmarkId::new("forward_backward_update", format!("{variant:?}")),
            &input,
            |b, input| b.iter(|| trainer.train_example(&mut nn, black_box(input.view()), 3)),
        );
    }
    group.finish();
}

criterion_group!(benches, forward_pass_benchmark, train_step_benchmark);
criterion_main!(benches);
