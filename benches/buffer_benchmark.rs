use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use priority_exchange::prelude::*;
use std::sync::Arc;
use std::thread;

fn benchmark_put_get_roundtrip(c: &mut Criterion) {
    c.bench_function("put_get_roundtrip", |b| {
        let buffer = BoundedBuffer::new(16).expect("Failed to create buffer");
        b.iter(|| {
            buffer
                .put(Message::new(black_box(42), 5, 0))
                .expect("Failed to put");
            black_box(buffer.get().expect("Failed to get"));
        });
    });
}

fn benchmark_priority_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("priority_drain");

    for capacity in [4usize, 16] {
        group.bench_function(format!("capacity_{}", capacity), |b| {
            b.iter_batched(
                || {
                    let buffer = BoundedBuffer::new(capacity).expect("Failed to create buffer");
                    for i in 0..capacity {
                        buffer
                            .put(Message::new(i as i32, (i % 10) as u8, 0))
                            .expect("Failed to put");
                    }
                    buffer
                },
                |buffer| {
                    while !buffer.is_empty() {
                        black_box(buffer.get().expect("Failed to get"));
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_contended_handoff(c: &mut Criterion) {
    c.bench_function("contended_handoff_1000", |b| {
        b.iter(|| {
            let buffer = Arc::new(BoundedBuffer::new(5).expect("Failed to create buffer"));

            let writer = Arc::clone(&buffer);
            let producer = thread::spawn(move || {
                for i in 0..1000 {
                    writer
                        .put(Message::new(i, (i % 10) as u8, 0))
                        .expect("Failed to put");
                }
            });

            let reader = Arc::clone(&buffer);
            let consumer = thread::spawn(move || {
                for _ in 0..1000 {
                    black_box(reader.get().expect("Failed to get"));
                }
            });

            producer.join().expect("Producer panicked");
            consumer.join().expect("Consumer panicked");
        });
    });
}

criterion_group!(
    benches,
    benchmark_put_get_roundtrip,
    benchmark_priority_drain,
    benchmark_contended_handoff
);
criterion_main!(benches);
