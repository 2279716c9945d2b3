use std::collections::BTreeSet;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nestview_context::{build_context_graph, reduce};
use nestview_core::{Attrs, CompoundGraph, ContextOptions, ROOT_ID};

/// Sizes as (chapters, sections per chapter, items per section).
const TIERS: &[(&str, usize, usize, usize)] = &[
    ("small", 4, 4, 4),
    ("medium", 10, 8, 8),
    ("large", 20, 12, 12),
];

/// Three-level hierarchy under `ROOT` where every item references the
/// previous two items, giving long chains with plenty of shortcuts.
fn layered_graph(chapters: usize, sections: usize, items: usize) -> CompoundGraph {
    let mut g = CompoundGraph::new();
    let mut previous: Vec<String> = Vec::new();

    for c in 0..chapters {
        let chapter = format!("c{c:03}");
        let _ = g.set_parent(&chapter, ROOT_ID);
        for s in 0..sections {
            let section = format!("{chapter}.s{s:03}");
            let _ = g.set_parent(&section, &chapter);
            for i in 0..items {
                let item = format!("{section}.i{i:03}");
                let _ = g.set_parent(&item, &section);
                for prior in previous.iter().rev().take(2) {
                    g.set_edge(prior, &item, Attrs::new());
                }
                previous.push(item);
            }
        }
    }
    g
}

fn bench_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("context.pipeline");

    for &(name, chapters, sections, items) in TIERS {
        let graph = layered_graph(chapters, sections, items);
        let middle = format!("c{:03}.s000", chapters / 2);
        let context: BTreeSet<String> = BTreeSet::from([middle]);
        group.throughput(Throughput::Elements(graph.node_count() as u64));

        group.bench_with_input(BenchmarkId::new("build", name), &graph, |b, graph| {
            b.iter(|| black_box(build_context_graph(graph, &context, &ContextOptions::default())));
        });

        group.bench_with_input(BenchmarkId::new("reduce_whole", name), &graph, |b, graph| {
            b.iter(|| black_box(reduce(graph)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_context);
criterion_main!(benches);
