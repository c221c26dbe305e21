use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId, Throughput};
use swap_pool::{Config, SwapQueue, ThreadPool};
use std::collections::VecDeque;
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

// Benchmark 1: Смена буферов против одного мьютекса
fn bench_queue_vs_single_lock(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_throughput");

    for size in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(
            BenchmarkId::new("swap_queue", size),
            &size,
            |b, &size| {
                let queue = SwapQueue::new(size);
                b.iter(|| {
                    for i in 0..size {
                        queue.put(black_box(i));
                    }
                    for _ in 0..size {
                        black_box(queue.get());
                    }
                });
            },
        );

        // Baseline: один мьютекс на обе стороны
        group.bench_with_input(
            BenchmarkId::new("single_mutex", size),
            &size,
            |b, &size| {
                let queue = Mutex::new(VecDeque::new());
                b.iter(|| {
                    for i in 0..size {
                        queue.lock().unwrap().push_back(black_box(i));
                    }
                    for _ in 0..size {
                        black_box(queue.lock().unwrap().pop_front());
                    }
                });
            },
        );
    }

    group.finish();
}

// Benchmark 2: Конкурентные производители против одного потребителя
fn bench_queue_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_mpmc");
    group.sample_size(20);

    let total = 10_000usize;
    group.throughput(Throughput::Elements(total as u64));

    for threads in [1, 2, 4] {
        group.bench_with_input(
            BenchmarkId::new("producers", threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    let queue = SwapQueue::new(256);
                    let per_producer = total / threads;
                    thread::scope(|s| {
                        for _ in 0..threads {
                            s.spawn(|| {
                                for i in 0..per_producer {
                                    queue.put(black_box(i));
                                }
                            });
                        }
                        for _ in 0..total {
                            black_box(queue.get());
                        }
                    });
                });
            },
        );
    }

    group.finish();
}

// Benchmark 3: Пропускная способность пула по числу воркеров
fn bench_pool_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_scaling");
    group.sample_size(10);

    let tasks = 5_000usize;
    group.throughput(Throughput::Elements(tasks as u64));

    for threads in [2, 4, 8] {
        if threads <= num_cpus::get() * 2 {
            group.bench_with_input(
                BenchmarkId::new("threads", threads),
                &threads,
                |b, &threads| {
                    b.iter(|| {
                        let pool = ThreadPool::new(threads, 512);
                        let counter = Arc::new(AtomicUsize::new(0));
                        for _ in 0..tasks {
                            let counter = Arc::clone(&counter);
                            pool.execute(move || {
                                counter.fetch_add(1, Ordering::Relaxed);
                            });
                        }
                        pool.shutdown();
                        black_box(counter.load(Ordering::Relaxed));
                    });
                },
            );
        }
    }

    group.finish();
}

// Benchmark 4: CPU-bound vs I/O-bound config
fn bench_config_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("config_comparison");
    group.sample_size(10);

    let tasks = 5_000usize;
    group.throughput(Throughput::Elements(tasks as u64));

    group.bench_function("cpu_bound", |b| {
        b.iter(|| {
            let pool = ThreadPool::with_config(Config::cpu_bound());
            let counter = Arc::new(AtomicUsize::new(0));
            for i in 0..tasks {
                let counter = Arc::clone(&counter);
                pool.execute(move || {
                    let mut sum = 0u64;
                    for j in 0..100 {
                        sum = sum.wrapping_add(i as u64 * j);
                    }
                    black_box(sum);
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
            pool.shutdown();
        });
    });

    group.bench_function("io_bound", |b| {
        b.iter(|| {
            let pool = ThreadPool::with_config(Config::io_bound());
            let counter = Arc::new(AtomicUsize::new(0));
            for i in 0..tasks {
                let counter = Arc::clone(&counter);
                pool.execute(move || {
                    let mut sum = 0u64;
                    for j in 0..100 {
                        sum = sum.wrapping_add(i as u64 * j);
                    }
                    black_box(sum);
                    counter.fetch_add(1, Ordering::Relaxed);
                });
            }
            pool.shutdown();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_queue_vs_single_lock,
    bench_queue_mpmc,
    bench_pool_scaling,
    bench_config_comparison,
);

criterion_main!(benches);
