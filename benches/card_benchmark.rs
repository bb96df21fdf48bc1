use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ma5card::{
    combinations, CardGenerator, CardType, LegDefinition, ParticleRecord, ParticleRegistry,
    ProcessDefinition,
};

fn registry() -> ParticleRegistry {
    ParticleRegistry::new([
        ParticleRecord::new(1, "d", "d~", "ZERO", 3, -1.0 / 3.0),
        ParticleRecord::new(2, "u", "u~", "ZERO", 3, 2.0 / 3.0),
        ParticleRecord::new(5, "b", "b~", "ZERO", 3, -1.0 / 3.0),
        ParticleRecord::new(6, "t", "t~", "WT", 3, 2.0 / 3.0),
        ParticleRecord::new(11, "e-", "e+", "ZERO", 1, -1.0),
        ParticleRecord::new(12, "ve", "ve~", "ZERO", 1, 0.0),
        ParticleRecord::new(21, "g", "g", "ZERO", 8, 0.0),
        ParticleRecord::new(24, "w+", "w-", "WW", 1, 1.0),
    ])
}

fn ttbar() -> ProcessDefinition {
    let j = [-2, -1, 1, 2];
    ProcessDefinition::new(vec![
        LegDefinition::initial([21]),
        LegDefinition::initial([21]),
        LegDefinition::final_state([6]),
        LegDefinition::final_state([-6]),
    ])
    .with_decay(
        ProcessDefinition::new(vec![
            LegDefinition::initial([6]),
            LegDefinition::final_state([24]),
            LegDefinition::final_state([5]),
        ])
        .with_decay(ProcessDefinition::new(vec![
            LegDefinition::initial([24]),
            LegDefinition::final_state([-11]),
            LegDefinition::final_state([12]),
        ])),
    )
    .with_decay(
        ProcessDefinition::new(vec![
            LegDefinition::initial([-6]),
            LegDefinition::final_state([-24]),
            LegDefinition::final_state([-5]),
        ])
        .with_decay(ProcessDefinition::new(vec![
            LegDefinition::initial([-24]),
            LegDefinition::final_state(j),
            LegDefinition::final_state(j),
        ])),
    )
}

fn combinations_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinations");
    for size in [4usize, 8, 12] {
        let labels: Vec<String> = (1..=size).map(|i| format!("j[{}]", i)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &labels, |b, labels| {
            b.iter(|| black_box(combinations(labels.as_slice())));
        });
    }
    group.finish();
}

fn card_benchmark(c: &mut Criterion) {
    let registry = registry();
    let generator = CardGenerator::new(&registry);
    let history = ["define j = u d u~ d~"];
    let processes = [ttbar()];
    c.bench_function("parton card", |b| {
        b.iter(|| {
            black_box(
                generator
                    .generate(&history, &processes, CardType::Parton)
                    .unwrap(),
            )
        });
    });
    c.bench_function("hadron card", |b| {
        b.iter(|| {
            black_box(
                generator
                    .generate(&history, &processes, CardType::Hadron)
                    .unwrap(),
            )
        });
    });
}

criterion_group!(benches, combinations_benchmark, card_benchmark);
criterion_main!(benches);
