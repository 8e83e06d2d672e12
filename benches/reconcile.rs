//! Performance benchmarks for kicksync
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use kicksync::{
    BackendClient, InternetStatus, KickInterval, RawLogEntry, ServiceState, ServiceStatus,
    SimBackend, SimConfig, Snapshot, WifiStatus, MAX_LOG_ENTRIES,
};
use std::time::Duration;

fn snapshot_with_logs(count: u64) -> Snapshot {
    Snapshot {
        current_state: ServiceStatus::Running,
        wifi_status: WifiStatus::Connected,
        internet_status: InternetStatus::Online,
        last_kick_time_ms: Some(1_700_000_000_000),
        interval_seconds: 120,
        logs: (0..count)
            .map(|i| RawLogEntry {
                id: i,
                message: format!("Kick OK ({i})"),
                timestamp_ms: 1_700_000_000_000 + i,
            })
            .collect(),
        error_message: None,
    }
}

fn bench_quantize(c: &mut Criterion) {
    c.bench_function("KickInterval::quantize", |b| {
        b.iter(|| {
            (0..400u64)
                .map(KickInterval::quantize)
                .filter(|i| *i == KickInterval::Secs120)
                .count()
        });
    });
}

fn bench_snapshot_codec(c: &mut Criterion) {
    let snapshot = snapshot_with_logs(MAX_LOG_ENTRIES as u64);
    let bytes = serde_json::to_vec(&snapshot).unwrap();

    c.bench_function("Snapshot serialize", |b| {
        b.iter(|| serde_json::to_vec(&snapshot).unwrap());
    });

    c.bench_function("Snapshot deserialize", |b| {
        b.iter(|| serde_json::from_slice::<Snapshot>(&bytes).unwrap());
    });
}

fn bench_merge(c: &mut Criterion) {
    let snapshot = snapshot_with_logs(MAX_LOG_ENTRIES as u64);
    let state = ServiceState::default().merge_snapshot(&snapshot);

    c.bench_function("ServiceState merge (full log)", |b| {
        b.iter(|| state.merge_snapshot(&snapshot));
    });

    let mut group = c.benchmark_group("merge_throughput");
    for count in [1, 10, 50] {
        let snapshot = snapshot_with_logs(count);
        group.bench_function(format!("{} entries", count), |b| {
            b.iter(|| state.merge_snapshot(&snapshot));
        });
    }
    group.finish();
}

fn bench_sim_status(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    // Pre-populate a running simulation with a full log buffer
    let sim = rt.block_on(async {
        let sim = SimBackend::new(SimConfig {
            start_delay: Duration::from_millis(1),
            ..SimConfig::default()
        });
        sim.start_service().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        for _ in 0..60 {
            sim.kick_now().await.unwrap();
        }
        sim
    });

    c.bench_function("SimBackend status", |b| {
        b.to_async(&rt)
            .iter(|| async { sim.status().await.unwrap() });
    });

    c.bench_function("SimBackend kick_now", |b| {
        b.to_async(&rt)
            .iter(|| async { sim.kick_now().await.unwrap() });
    });
}

criterion_group!(
    benches,
    bench_quantize,
    bench_snapshot_codec,
    bench_merge,
    bench_sim_status,
);
criterion_main!(benches);
