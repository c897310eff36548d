//! Recursion benchmarks for ramify
//!
//! Measures the cost of compiling recursion onto spawned tasks against the
//! sequential evaluation of the same definitions, plus raw spawn latency.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ramify::{fun, prec, rec, spawn, Continuations, Definition};

fn fib_def() -> Definition<u64, u64> {
    fun(
        |x: &u64| *x < 2,
        |x| x,
        |x, f: &Continuations<u64, u64>| {
            let a = f.recurse(x - 1);
            let b = f.recurse(x - 2);
            a.get() + b.get()
        },
    )
}

fn bench_spawn_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn_latency");

    group.bench_function("spawn_noop", |b| {
        b.iter(|| {
            let future = spawn(|| black_box(42));
            future.get()
        })
    });

    group.finish();
}

fn bench_fib(c: &mut Criterion) {
    let mut group = c.benchmark_group("fib");

    for n in [10u64, 16] {
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |b, &n| {
            let fib = prec(fib_def());
            b.iter(|| fib.call(black_box(n)).get())
        });

        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, &n| {
            let fib = fib_def();
            b.iter(|| rec(black_box(n), &fib))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_spawn_latency, bench_fib);
criterion_main!(benches);
