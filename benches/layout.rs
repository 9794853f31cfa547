// this_file: benches/layout.rs
//! Benchmarks for the wrap/place hot path

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use photopoet::layout::{wrap, MeasureText};
use photopoet::place::{place, LayoutMetrics};
use photopoet::style::Anchor;

/// Fixed-advance measurer so the bench isolates the wrap loop from shaping.
struct FixedAdvance {
    advance: f32,
}

impl MeasureText for FixedAdvance {
    fn measure(&self, text: &str) -> photopoet::Result<f32> {
        Ok(text.chars().count() as f32 * self.advance)
    }
}

const POEM: &str = "Silent dawn breaks gold across the sleeping hills\n\
and every window wakes to hold the light it spills\n\
\n\
a river keeps the morning in its slow embrace\n\
while shadows fold their edges from the day's first trace";

fn bench_wrap(c: &mut Criterion) {
    let measurer = FixedAdvance { advance: 9.5 };
    c.bench_function("wrap_four_paragraphs", |b| {
        b.iter(|| wrap(black_box(POEM), &measurer, black_box(320.0)).unwrap())
    });
}

fn bench_wrap_and_place(c: &mut Criterion) {
    let measurer = FixedAdvance { advance: 9.5 };
    let metrics = LayoutMetrics::from_font_size(24.0);
    c.bench_function("wrap_and_place_bottom_center", |b| {
        b.iter(|| {
            let lines = wrap(black_box(POEM), &measurer, black_box(320.0)).unwrap();
            place(
                &lines,
                &metrics,
                Anchor::BottomCenter,
                black_box(800.0),
                black_box(600.0),
            )
        })
    });
}

criterion_group!(benches, bench_wrap, bench_wrap_and_place);
criterion_main!(benches);
