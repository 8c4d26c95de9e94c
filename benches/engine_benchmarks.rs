//! Benchmarks for the hot paths of a driver tick

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use phonekit::catalog::{all_methods, lookup, ServiceType};
use phonekit::session::{completion_percentage, Progress, Session, SessionStatus};
use phonekit::storage::{apply_patch, FileBackend, MemoryBackend, SessionPatch, SessionStore};
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;

fn running_session(service: ServiceType, method: &str, total: u32) -> Session {
    let mut session = Session::new(
        "bench-user",
        "bench-device",
        service,
        method,
        Progress::initial(total, "starting"),
        serde_json::json!({}),
    );
    session.status = SessionStatus::Running;
    session
}

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");

    group.bench_function("lookup", |b| {
        b.iter(|| lookup(black_box(ServiceType::FrpBypass), black_box("universal_frp_bypass")))
    });

    group.bench_function("phase_for_every_step", |b| {
        b.iter(|| {
            for spec in all_methods() {
                for step in 1..=spec.total_steps {
                    black_box(spec.phase_for_step(step));
                }
            }
        })
    });

    group.finish();
}

fn bench_progress(c: &mut Criterion) {
    let mut group = c.benchmark_group("progress");

    group.bench_function("completion_percentage", |b| {
        b.iter(|| completion_percentage(black_box(7), black_box(20)))
    });

    group.bench_function("apply_progress_patch", |b| {
        b.iter_batched(
            || running_session(ServiceType::DataEraser, "gutmann_erase", 20),
            |mut session| {
                let progress =
                    Progress::at_step(5, 20, "overwriting_pass", Duration::from_millis(400));
                apply_patch(
                    &mut session,
                    SessionPatch::expecting(&[SessionStatus::Running]).progress(progress),
                )
                .unwrap();
                session
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_store_updates(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("store_update");

    let memory = MemoryBackend::new();
    let temp_dir = TempDir::new().unwrap();
    let file = rt.block_on(FileBackend::new(temp_dir.path())).unwrap();
    let stores: [(&str, &dyn SessionStore); 2] = [("memory", &memory), ("file", &file)];

    for (name, store) in stores {
        let session = running_session(ServiceType::SystemRepair, "deep_repair", 16);
        rt.block_on(store.create(&session)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(name), &session.id, |b, id| {
            b.to_async(&rt).iter(|| async {
                let progress = Progress::at_step(3, 16, "scanning", Duration::from_millis(90));
                store
                    .update_fields(
                        id,
                        SessionPatch::expecting(&[SessionStatus::Running]).progress(progress),
                    )
                    .await
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_catalog, bench_progress, bench_store_updates);
criterion_main!(benches);
