use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cronwalk::Schedule;

fn parse_and_take_100(_n: u64) {
    let schedule: Schedule = "15 15 15 l 3 ? *".parse().expect("valid schedule");
    let now = Utc::now();
    for _ in schedule.iter_after(&now, false).take(100) {}
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("parse_and_take_100", |b| {
        b.iter(|| parse_and_take_100(black_box(20)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
