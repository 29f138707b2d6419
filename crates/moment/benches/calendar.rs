use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use moment::Moment;

fn bench_fields(c: &mut Criterion) {
    let moments: Vec<Moment> = (0..1_000i64)
        .map(|i| Moment::of_epoch_milli(1_577_746_077_615 + i * 7_919_000_003))
        .collect();

    c.bench_function("fields", |b| {
        b.iter(|| {
            for moment in &moments {
                black_box(black_box(moment).fields());
            }
        })
    });

    c.bench_function("start_end_of_day", |b| {
        b.iter(|| {
            for moment in &moments {
                black_box(black_box(moment).start_of_day());
                black_box(black_box(moment).end_of_day());
            }
        })
    });
}

fn bench_parse_date(c: &mut Criterion) {
    let inputs = ["2019-12-30", "2020-02-29", "1900-03-01", "2019-02-29"];

    c.bench_function("parse_date", |b| {
        b.iter(|| {
            for input in inputs {
                let _ = black_box(Moment::parse_date(black_box(input)));
            }
        })
    });
}

criterion_group!(benches, bench_fields, bench_parse_date);
criterion_main!(benches);
