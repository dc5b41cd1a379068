//! # Curator Kernel Benchmarks
//!
//! | Area | Operation | Target |
//! |------|-----------|--------|
//! | Registry | `register_domain_capability` (new key) | < 50µs |
//! | Registry | `discover_by_capability_name` | < 5µs |
//! | Registry | `discover_routes` over 1k entries | < 1ms |
//! | Container | `start_all` over a 50-service chain | < 50ms |

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ck_03_capability_registry::RegistryApi;
use ck_04_route_index::RouteQuery;
use ck_tests::fixtures::{capability, kernel, CallLog, RecordingService};
use shared_types::{CallerContext, TenantScope};

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => panic!("tokio runtime: {e}"),
    }
}

/// Kernel with `content_service` started and `count` capabilities published.
fn populated_kernel(rt: &tokio::runtime::Runtime, count: usize) -> kernel_runtime::Kernel {
    let kernel = kernel();
    rt.block_on(async {
        kernel
            .container()
            .register_service(
                "content_service",
                RecordingService::new("content_service", &CallLog::default()),
                vec![],
                TenantScope::Global,
            )
            .unwrap();
        kernel.container().start("content_service").await.unwrap();
    });
    let system = CallerContext::system();
    for i in 0..count {
        let realm = if i % 2 == 0 { "content" } else { "journey" };
        kernel
            .registry()
            .register_domain_capability(
                capability(realm, &format!("capability_{i}"), "content_service", "1.0.0"),
                &system,
            )
            .unwrap();
    }
    kernel
}

// ============================================================================
// REGISTRY
// ============================================================================

fn bench_registration(c: &mut Criterion) {
    let rt = runtime();
    let kernel = populated_kernel(&rt, 0);
    let system = CallerContext::system();
    let counter = AtomicU64::new(0);

    let mut group = c.benchmark_group("ck-03-capability-registry");
    group.throughput(Throughput::Elements(1));
    group.bench_function("register_new_key", |b| {
        b.iter(|| {
            let n = counter.fetch_add(1, Ordering::Relaxed);
            let definition =
                capability("content", &format!("bench_{n}"), "content_service", "1.0.0");
            black_box(kernel.registry().register_domain_capability(definition, &system))
        })
    });

    let versions = AtomicU64::new(1);
    group.bench_function("register_upgrade", |b| {
        b.iter(|| {
            let minor = versions.fetch_add(1, Ordering::Relaxed);
            let definition = capability(
                "content",
                "upgraded",
                "content_service",
                &format!("1.{minor}.0"),
            );
            black_box(kernel.registry().register_domain_capability(definition, &system))
        })
    });
    group.finish();
}

fn bench_discovery(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("ck-03-discovery");

    for size in [100usize, 1_000] {
        let kernel = populated_kernel(&rt, size);

        group.bench_with_input(BenchmarkId::new("by_name", size), &kernel, |b, kernel| {
            b.iter(|| {
                black_box(
                    kernel
                        .registry()
                        .discover_by_capability_name("content", "capability_42"),
                )
            })
        });

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("routes_by_realm", size), &kernel, |b, kernel| {
            b.iter(|| {
                black_box(
                    kernel
                        .registry()
                        .discover_routes(&RouteQuery::all().realm("content")),
                )
            })
        });
    }
    group.finish();
}

// ============================================================================
// CONTAINER
// ============================================================================

fn bench_start_all(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("ck-02-lifecycle-container");
    group.measurement_time(Duration::from_secs(10));

    for size in [10usize, 50] {
        group.bench_with_input(BenchmarkId::new("start_all_chain", size), &size, |b, &size| {
            b.to_async(&rt).iter(|| async move {
                let kernel = kernel();
                let log = CallLog::default();
                for i in 0..size {
                    let name = format!("svc_{i:03}");
                    let deps = if i == 0 {
                        vec![]
                    } else {
                        vec![format!("svc_{:03}", i - 1)]
                    };
                    kernel
                        .container()
                        .register_service(&name, RecordingService::new(&name, &log), deps, TenantScope::Global)
                        .unwrap();
                }
                black_box(kernel.container().start_all().await.unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_registration, bench_discovery, bench_start_all);
criterion_main!(benches);
