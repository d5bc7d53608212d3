use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vidink::overlay::raster::Raster;
use vidink::overlay::window::{SketchWindow, WindowIndex};

fn window(anchor: u32) -> SketchWindow {
    SketchWindow {
        anchor,
        start: anchor.saturating_sub(1),
        end: anchor + 5,
        raster: Raster {
            image: String::new(),
            width: 640,
            height: 360,
        },
        created_at: None,
    }
}

fn populated_index(count: u32) -> WindowIndex {
    let mut index = WindowIndex::default();
    for i in 0..count {
        index.insert("video", window(i * 10));
    }
    index
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_1k_disjoint_windows", |b| {
        b.iter(|| black_box(populated_index(1_000)))
    });

    c.bench_function("insert_with_eviction", |b| {
        b.iter_batched(
            || populated_index(1_000),
            |mut index| {
                // Lands across two existing windows and evicts both.
                black_box(index.insert("video", window(5_005)));
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_query(c: &mut Criterion) {
    let index = populated_index(1_000);

    c.bench_function("query_at_1k_windows", |b| {
        b.iter(|| black_box(index.query_at("video", 5_001.5)))
    });

    c.bench_function("query_nearest_1k_windows", |b| {
        b.iter(|| black_box(index.query_nearest("video", 5_001.5, 5)))
    });
}

criterion_group!(benches, bench_insert, bench_query);
criterion_main!(benches);
