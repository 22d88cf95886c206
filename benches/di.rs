use criterion::{black_box, criterion_group, criterion_main, Criterion};
use forge_di::{CapabilityProbes, Container, ModuleBuilder, RegKey};

fn bench_singleton_hit(c: &mut Criterion) {
    struct Value(u64);

    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.single(Value(42));
    container.use_module(module.build()).unwrap();
    let _ = container.resolve(RegKey::of_type::<Value>(), None).unwrap();

    c.bench_function("singleton_hit", |b| {
        b.iter(|| {
            let v = container.resolve(RegKey::of_type::<Value>(), None).unwrap();
            black_box(v);
        })
    });
}

fn bench_singleton_cold(c: &mut Criterion) {
    struct ExpensiveToCreate {
        #[allow(dead_code)]
        data: Vec<u64>,
    }

    c.bench_function("singleton_cold_expensive", |b| {
        b.iter_batched(
            || {
                let container = Container::new();
                let mut module = ModuleBuilder::new();
                module.single_with::<ExpensiveToCreate>(Vec::new(), CapabilityProbes::none(), |_| {
                    Ok(ExpensiveToCreate { data: (0..1000).collect() })
                });
                container.use_module(module.build()).unwrap();
                container
            },
            |container| {
                let v = container.resolve(RegKey::of_type::<ExpensiveToCreate>(), None).unwrap();
                black_box(v);
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_scoped_resolve(c: &mut Criterion) {
    struct PerRequest(u64);

    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.scoped::<PerRequest>(Vec::new(), CapabilityProbes::none(), |_| Ok(PerRequest(0)));
    container.use_module(module.build()).unwrap();

    c.bench_function("scoped_resolve_new_scope", |b| {
        b.iter(|| {
            let scope = container.create_scope(Default::default()).unwrap();
            let v = scope.resolve(RegKey::of_type::<PerRequest>()).unwrap();
            black_box(v);
        })
    });
}

fn bench_deep_dependency_chain(c: &mut Criterion) {
    struct Leaf;
    struct Mid {
        #[allow(dead_code)]
        leaf: std::rc::Rc<dyn std::any::Any>,
    }
    struct Root {
        #[allow(dead_code)]
        mid: std::rc::Rc<dyn std::any::Any>,
    }

    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.single(Leaf);
    module.single_with::<Mid>(
        vec![forge_di::ParamSource::Dependency(RegKey::of_type::<Leaf>())],
        CapabilityProbes::none(),
        |args| Ok(Mid { leaf: args[0].clone() }),
    );
    module.single_with::<Root>(
        vec![forge_di::ParamSource::Dependency(RegKey::of_type::<Mid>())],
        CapabilityProbes::none(),
        |args| Ok(Root { mid: args[0].clone() }),
    );
    container.use_module(module.build()).unwrap();
    let _ = container.resolve(RegKey::of_type::<Root>(), None).unwrap();

    c.bench_function("resolve_cached_three_level_chain", |b| {
        b.iter(|| {
            let v = container.resolve(RegKey::of_type::<Root>(), None).unwrap();
            black_box(v);
        })
    });
}

criterion_group!(
    benches,
    bench_singleton_hit,
    bench_singleton_cold,
    bench_scoped_resolve,
    bench_deep_dependency_chain
);
criterion_main!(benches);
