//! # Oracle Hot-Path Benchmarks
//!
//! | Path | Per-call work |
//! |------|---------------|
//! | Event decode | JSON field lookups + address parse |
//! | Dedup check | Hash lookup, occasional GC sweep |
//! | Status code | One uniform draw |
//! | Index set | Three distinct draws |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fs_oracle_network::{
    decode_oracle_request, generate_index_set, pick_status_code, OracleIndex, RequestDedupCache,
    RequestKey,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use shared_bus::{event_names, LedgerEvent};
use shared_types::{Address, FlightKey};
use std::time::{Duration, Instant};

fn request_event(block: u64) -> LedgerEvent {
    LedgerEvent::new(
        block,
        event_names::ORACLE_REQUEST,
        json!({
            "index": "5",
            "airline": Address::dev_account(0).to_string(),
            "flight": "A1111",
            "timestamp": "1633963343",
        }),
    )
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let event = request_event(12);
    group.bench_function("oracle_request", |b| {
        b.iter(|| black_box(decode_oracle_request(black_box(&event)).is_ok()))
    });
    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup");
    let airline = Address::dev_account(0);

    for size in [100u64, 1_000, 4_000] {
        let keys: Vec<RequestKey> = (0..size)
            .map(|i| {
                let index = OracleIndex::new((i % 10) as u8).unwrap();
                RequestKey::new(index, &FlightKey::new(airline, "A1111", 1_633_963_343 + i))
            })
            .collect();

        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("check_and_insert", size), &keys, |b, keys| {
            b.iter(|| {
                let mut cache = RequestDedupCache::new(Duration::from_secs(120), 4096);
                let now = Instant::now();
                for key in keys {
                    black_box(cache.check_and_insert(key.clone(), now));
                }
            })
        });
    }
    group.finish();
}

fn bench_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("random");
    let mut rng = StdRng::seed_from_u64(7);
    group.bench_function("pick_status_code", |b| {
        b.iter(|| black_box(pick_status_code(&mut rng)))
    });
    group.bench_function("generate_index_set", |b| {
        b.iter(|| black_box(generate_index_set(&mut rng)))
    });
    group.finish();
}

criterion_group!(benches, bench_decode, bench_dedup, bench_random);
criterion_main!(benches);
