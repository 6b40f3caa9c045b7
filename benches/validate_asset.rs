//! Benchmark: validation of a fully parsed asset

use archetype_gltf::{validate, Category, Extensions, GltfDataBuffer, Options, Parser};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

/// A node chain of length `count` hanging off a single scene
fn node_chain(count: usize) -> Value {
    let nodes: Vec<Value> = (0..count)
        .map(|i| {
            if i + 1 < count {
                json!({ "children": [i + 1] })
            } else {
                json!({})
            }
        })
        .collect();

    json!({
        "asset": { "version": "2.0" },
        "scenes": [{ "nodes": [0] }],
        "nodes": nodes
    })
}

fn validate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_node_chain");
    for count in [16, 256, 4096] {
        let data = GltfDataBuffer::from_bytes(node_chain(count).to_string().into_bytes());
        let mut document = Parser::new(Extensions::empty())
            .load_gltf(&data, ".", Options::empty())
            .expect("synthetic document loads");
        document.parse(Category::all()).expect("synthetic document parses");
        let asset = document.into_asset();

        group.bench_with_input(BenchmarkId::from_parameter(count), &asset, |b, asset| {
            b.iter(|| black_box(validate(asset).is_ok()))
        });
    }
    group.finish();
}

criterion_group!(benches, validate_benchmark);
criterion_main!(benches);
