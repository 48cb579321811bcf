//! Benchmarks for the SPSC array queue.
//!
//! Compares ferry-queue against crossbeam-queue's ArrayQueue. Note that
//! ArrayQueue is MPMC, so it pays for multi-producer handling that an SPSC
//! queue avoids.

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use crossbeam_queue::ArrayQueue;
use ferry_queue::spsc;

/// Message sizes to benchmark
#[allow(unused)]
#[derive(Debug, Clone, Copy)]
struct Small(u64);

#[allow(unused)]
#[derive(Debug, Clone, Copy)]
struct Medium([u64; 16]); // 128 bytes

#[allow(unused)]
#[derive(Debug, Clone, Copy)]
struct Large([u64; 32]); // 256 bytes

// ============================================================================
// Single-threaded latency benchmarks
// ============================================================================

fn bench_single_thread_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_thread_latency");

    // --- Small message (8 bytes) ---
    group.bench_function("ferry_spsc/u64", |b| {
        let (mut tx, mut rx) = spsc::queue::<u64>(1024);
        b.iter(|| {
            tx.offer(black_box(42)).unwrap();
            black_box(rx.poll().unwrap())
        });
    });

    group.bench_function("crossbeam_array/u64", |b| {
        let q = ArrayQueue::<u64>::new(1024);
        b.iter(|| {
            q.push(black_box(42)).unwrap();
            black_box(q.pop().unwrap())
        });
    });

    // --- Medium message (128 bytes) ---
    group.bench_function("ferry_spsc/128b", |b| {
        let (mut tx, mut rx) = spsc::queue::<Medium>(1024);
        let msg = Medium([0; 16]);
        b.iter(|| {
            tx.offer(black_box(msg)).unwrap();
            black_box(rx.poll().unwrap())
        });
    });

    group.bench_function("crossbeam_array/128b", |b| {
        let q = ArrayQueue::<Medium>::new(1024);
        let msg = Medium([0; 16]);
        b.iter(|| {
            q.push(black_box(msg)).unwrap();
            black_box(q.pop().unwrap())
        });
    });

    // --- Large message (256 bytes) ---
    group.bench_function("ferry_spsc/256b", |b| {
        let (mut tx, mut rx) = spsc::queue::<Large>(1024);
        let msg = Large([0; 32]);
        b.iter(|| {
            tx.offer(black_box(msg)).unwrap();
            black_box(rx.poll().unwrap())
        });
    });

    group.bench_function("crossbeam_array/256b", |b| {
        let q = ArrayQueue::<Large>::new(1024);
        let msg = Large([0; 32]);
        b.iter(|| {
            q.push(black_box(msg)).unwrap();
            black_box(q.pop().unwrap())
        });
    });

    group.finish();
}

// ============================================================================
// Cross-thread throughput benchmarks
// ============================================================================

const THROUGHPUT_COUNT: u64 = 1_000_000;

fn bench_cross_thread_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_thread_throughput");
    group.throughput(Throughput::Elements(THROUGHPUT_COUNT));
    group.sample_size(10);

    group.bench_function("ferry_spsc/u64", |b| {
        b.iter(|| {
            let (mut tx, mut rx) = spsc::queue::<u64>(1024);

            let producer = thread::spawn(move || {
                for i in 0..THROUGHPUT_COUNT {
                    while tx.offer(i).is_err() {
                        std::hint::spin_loop();
                    }
                }
            });

            let consumer = thread::spawn(move || {
                let mut received = 0u64;
                while received < THROUGHPUT_COUNT {
                    if rx.poll().is_some() {
                        received += 1;
                    } else {
                        std::hint::spin_loop();
                    }
                }
                received
            });

            producer.join().unwrap();
            black_box(consumer.join().unwrap())
        });
    });

    group.bench_function("crossbeam_array/u64", |b| {
        b.iter(|| {
            let q = Arc::new(ArrayQueue::<u64>::new(1024));
            let producer_q = Arc::clone(&q);
            let consumer_q = Arc::clone(&q);

            let producer = thread::spawn(move || {
                for i in 0..THROUGHPUT_COUNT {
                    while producer_q.push(i).is_err() {
                        std::hint::spin_loop();
                    }
                }
            });

            let consumer = thread::spawn(move || {
                let mut received = 0u64;
                while received < THROUGHPUT_COUNT {
                    if consumer_q.pop().is_some() {
                        received += 1;
                    } else {
                        std::hint::spin_loop();
                    }
                }
                received
            });

            producer.join().unwrap();
            black_box(consumer.join().unwrap())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_thread_latency,
    bench_cross_thread_throughput
);
criterion_main!(benches);
