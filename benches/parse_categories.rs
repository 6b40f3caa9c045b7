//! Benchmark: category parsing
//!
//! Measures load and parse time for a synthetic document as the requested
//! category mask grows.

use archetype_gltf::{Category, Extensions, GltfDataBuffer, Options, Parser};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};

/// A flat scene with `count` nodes, each with a mesh, material and texture
fn synthetic_document(count: usize) -> Value {
    let nodes: Vec<Value> = (0..count)
        .map(|i| json!({ "name": format!("Node {i}"), "mesh": i, "translation": [i as f32, 0.0, 0.0] }))
        .collect();
    let meshes: Vec<Value> = (0..count)
        .map(|i| json!({ "primitives": [{ "attributes": { "POSITION": 0 }, "material": i }] }))
        .collect();
    let materials: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "pbrMetallicRoughness": { "baseColorTexture": { "index": i } },
                "extensions": { "KHR_materials_emissive_strength": { "emissiveStrength": 2.0 } }
            })
        })
        .collect();
    let textures: Vec<Value> = (0..count).map(|_| json!({ "source": 0 })).collect();

    json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": (0..count).collect::<Vec<_>>() }],
        "nodes": nodes,
        "meshes": meshes,
        "materials": materials,
        "textures": textures,
        "images": [{ "uri": "albedo.png" }],
        "buffers": [{ "byteLength": 36, "uri": "geometry.bin" }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" }]
    })
}

fn load_benchmark(c: &mut Criterion) {
    let data = GltfDataBuffer::from_bytes(synthetic_document(256).to_string().into_bytes());

    c.bench_function("load_gltf_header", |b| {
        b.iter(|| {
            let mut parser = Parser::new(Extensions::empty());
            black_box(parser.load_gltf(&data, ".", Options::empty()).is_ok())
        })
    });
}

fn category_benchmark(c: &mut Criterion) {
    let data = GltfDataBuffer::from_bytes(synthetic_document(256).to_string().into_bytes());
    let masks = [
        ("nodes", Category::NODES),
        ("materials", Category::MATERIALS),
        ("renderable", Category::ONLY_RENDERABLE),
        ("all", Category::all()),
    ];

    let mut group = c.benchmark_group("parse_categories");
    for (label, mask) in masks {
        group.bench_with_input(BenchmarkId::from_parameter(label), &mask, |b, &mask| {
            b.iter(|| {
                let mut parser = Parser::new(Extensions::KHR_MATERIALS_EMISSIVE_STRENGTH);
                let mut document = parser
                    .load_gltf(&data, ".", Options::empty())
                    .expect("synthetic document loads");
                black_box(document.parse(mask).is_ok())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, load_benchmark, category_benchmark);
criterion_main!(benches);
