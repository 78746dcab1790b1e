use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use evtdis::{Dispatcher, Event, FieldType, FieldValue, HandlerError, Publisher, SchemaRegistry};

fn tick() -> Event {
    let registry = SchemaRegistry::new();
    registry.define("Tick", [("count", FieldType::Int)]).unwrap();
    registry
        .construct("Tick", [("count", FieldValue::Int(1))])
        .unwrap()
}

fn noop(_: &Event) -> Result<(), HandlerError> {
    Ok(())
}

fn bench_subscribe(c: &mut Criterion) {
    let publisher = Publisher::new("bench");
    let dispatcher = Dispatcher::new("sub", noop);
    c.bench_function("publisher_subscribe_unsubscribe", |b| {
        b.iter(|| {
            publisher.subscribe(black_box("Tick"), &dispatcher);
            publisher.unsubscribe(black_box("Tick"), &dispatcher);
        })
    });
}

fn bench_publish_fan_out(c: &mut Criterion) {
    let event = tick();
    let mut group = c.benchmark_group("publish_fan_out");
    group.throughput(Throughput::Elements(1));

    for subs in [0usize, 1, 10, 100] {
        let publisher = Publisher::new("bench");
        let dispatchers: Vec<Dispatcher> = (0..subs)
            .map(|i| Dispatcher::new(&format!("d{i}"), noop))
            .collect();
        for d in &dispatchers {
            publisher.subscribe("Tick", d);
            d.start().unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(subs), &subs, |b, _| {
            b.iter(|| publisher.publish(black_box(&event)).unwrap())
        });

        for d in &dispatchers {
            d.stop().unwrap();
        }
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let event = tick();
    c.bench_function("publish_and_drain_1000", |b| {
        b.iter(|| {
            let publisher = Publisher::new("bench");
            let dispatcher = Dispatcher::new("drain", noop);
            publisher.subscribe("Tick", &dispatcher);
            dispatcher.start().unwrap();
            for _ in 0..1_000 {
                publisher.publish(&event).unwrap();
            }
            dispatcher.stop().unwrap();
            black_box(dispatcher.stats().handled)
        })
    });
}

criterion_group!(
    benches,
    bench_subscribe,
    bench_publish_fan_out,
    bench_end_to_end,
);
criterion_main!(benches);
