//! Lookup benchmarks for lexicon-store

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lexicon::prelude::*;
use serde_json::{Map, Value, json};
use std::hint::black_box;
use std::sync::Arc;

fn populated(namespaces: usize, leaves: usize) -> Resolver<MemoryRepository> {
    let resolver = Resolver::new(Arc::new(MemoryRepository::new()));
    let mut tree = Map::new();
    for n in 0..namespaces {
        let mut namespace = Map::new();
        for l in 0..leaves {
            namespace.insert(format!("key_{}", l), json!(format!("value {} {}", n, l)));
        }
        tree.insert(format!("ns_{}", n), Value::Object(namespace));
    }
    resolver.store_translations("en", &Value::Object(tree)).unwrap();
    resolver
}

fn flatten_benchmark(c: &mut Criterion) {
    let normalizer = lexicon::KeyNormalizer::default();
    let dotted = Key::from("a.b.c.d.e");
    let segments = Key::from(["a", "b.c", "d", "e"]);
    let scope = Key::from("scope.inner");

    let mut group = c.benchmark_group("flatten");
    group.throughput(Throughput::Elements(1));

    group.bench_function("dotted", |b| {
        b.iter(|| normalizer.flatten(black_box(&dotted), None, None))
    });
    group.bench_function("segments_with_scope", |b| {
        b.iter(|| normalizer.flatten(black_box(&segments), Some(&scope), None))
    });

    group.finish();
}

fn lookup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let options = LookupOptions::new();

    for leaves in [10, 100, 1000] {
        let resolver = populated(10, leaves);
        let leaf = Key::from("ns_5.key_7");
        let namespace = Key::from("ns_5");

        group.bench_with_input(BenchmarkId::new("leaf", leaves), &leaves, |b, _| {
            b.iter(|| resolver.lookup("en", black_box(&leaf), &options).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("namespace", leaves), &leaves, |b, _| {
            b.iter(|| resolver.lookup("en", black_box(&namespace), &options).unwrap())
        });
    }

    group.finish();
}

fn miss_benchmark(c: &mut Criterion) {
    let recorder = RecordingResolver::new(populated(10, 100));
    let missing = Key::from("ns_1.absent");
    let options = LookupOptions::new();

    // The first miss records the stub; later misses find it and stop there.
    c.bench_function("recorded_miss", |b| {
        b.iter(|| {
            let _ = recorder.resolve("en", black_box(&missing), &options);
        })
    });
}

fn translate_benchmark(c: &mut Criterion) {
    let resolver = populated(1, 1);
    resolver
        .store_translations(
            "en",
            &json!({ "inbox": { "one": "One message for %{name}", "other": "%{count} messages for %{name}" } }),
        )
        .unwrap();
    let translator = Translator::new(Arc::new(resolver));
    let key = Key::from("inbox");
    let options = LookupOptions::new().count(42).arg("name", "Lucy");

    c.bench_function("translate_plural_interpolated", |b| {
        b.iter(|| translator.translate("en", black_box(&key), &options).unwrap())
    });
}

criterion_group!(
    benches,
    flatten_benchmark,
    lookup_benchmark,
    miss_benchmark,
    translate_benchmark
);
criterion_main!(benches);
