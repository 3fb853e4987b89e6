//! Benchmarks for change propagation.
//!
//! Run with: `cargo bench --package rebind-core --bench fanout`
//!
//! Measures one property write notifying N watchers, and a write that
//! re-renders N compiled text bindings in the in-memory document.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rebind_core::dom::Document;
use rebind_core::reactive::{make_reactive, Watcher};
use rebind_core::{Compiler, ViewModel};
use serde_json::json;

const SIZES: &[usize] = &[1, 16, 256];

fn view_model() -> ViewModel {
    ViewModel::new(make_reactive(json!({ "n": 0, "user": { "name": "Ada" } })).unwrap())
}

fn bench_watcher_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("watcher_fanout");

    for &size in SIZES {
        let vm = view_model();
        let watchers: Vec<Arc<Watcher>> = (0..size)
            .map(|_| Watcher::new(&vm, "n", |_, new, _| {
                let _ = black_box(new);
                Ok(())
            }))
            .collect::<Result<_, _>>()
            .unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut n = 0.0;
            b.iter(|| {
                n += 1.0;
                vm.set("n", black_box(n)).unwrap();
            });
        });
        drop(watchers);
    }

    group.finish();
}

fn bench_dotted_path(c: &mut Criterion) {
    let vm = view_model();
    let _watcher = Watcher::new(&vm, "user.name", |_, _, _| Ok(())).unwrap();
    let names = ["Ada", "Grace"];

    c.bench_function("dotted_path_write", |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            vm.set("user.name", names[i % 2]).unwrap();
        });
    });
}

fn bench_text_bindings(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_bindings");

    for &size in SIZES {
        let markup = format!(r#"<div id="app">{}</div>"#, "<p>{{ n }}</p>".repeat(size));
        let document = Document::parse(&markup).unwrap();
        let vm = view_model();
        let compiler = Compiler::mount(&document, "#app", vm.clone()).unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut n = 0.0;
            b.iter(|| {
                n += 1.0;
                vm.set("n", n).unwrap();
            });
        });
        drop(compiler);
    }

    group.finish();
}

criterion_group!(benches, bench_watcher_fanout, bench_dotted_path, bench_text_bindings);
criterion_main!(benches);
