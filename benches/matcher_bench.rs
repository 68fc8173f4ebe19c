//! Benchmarks for the offer scheduler.
//!
//! Benchmarks cover:
//! - First-fit planning over growing waiting queues
//! - A full offer round through the scheduler (match, promote, launch)
//! - Node-loss reversion

use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use offer_scheduler::config::{SchedulerConfig, TaskTemplate};
use offer_scheduler::core::{
    expand_submission, CommandInfo, ContainerInfo, ExecutorInfo, FirstFitMatcher, MasterInfo,
    Offer, OfferMatcher, Scheduler, SchedulerCore, SubmitInfo, TaskRequest,
};
use offer_scheduler::infra::InMemoryDriver;
use offer_scheduler::util::{ExecutorId, NodeId, OfferId, Resources, CPUS, MEM, PORTS};

// ============================================================================
// Helper Functions
// ============================================================================

fn template() -> TaskTemplate {
    TaskTemplate {
        executor: ExecutorInfo {
            executor_id: ExecutorId::from("bench-exec"),
            name: "bench".into(),
            command: CommandInfo::default(),
        },
        resources_per_task: Resources::new().with_scalar(CPUS, 0.5).with_scalar(MEM, 256.0),
        container: ContainerInfo::default(),
    }
}

fn submission(id: &str, instances: u32) -> SubmitInfo {
    SubmitInfo {
        instances,
        config_path: String::new(),
        id: id.into(),
        package_path: String::new(),
    }
}

fn offers(count: u32) -> Vec<Offer> {
    (0..count)
        .map(|i| Offer {
            id: OfferId::from(format!("o{i}")),
            node_id: NodeId::from(format!("n{i}")),
            hostname: String::new(),
            resources: Resources::new()
                .with_scalar(CPUS, 8.0)
                .with_scalar(MEM, 16_384.0)
                .with_ranges(PORTS, [(31_000, 32_000)]),
        })
        .collect()
}

// ============================================================================
// Matcher Benchmarks
// ============================================================================

fn bench_first_fit_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_fit_plan");
    let batch = offers(16);

    for size in [100_u32, 1_000, 10_000] {
        let tasks: Vec<TaskRequest> = expand_submission(&submission("job", size), &template())
            .unwrap_or_default();
        let waiting: Vec<&TaskRequest> = tasks.iter().collect();

        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &waiting, |b, waiting| {
            b.iter(|| black_box(FirstFitMatcher.plan(waiting, &batch)));
        });
    }
    group.finish();
}

// ============================================================================
// Scheduler Benchmarks
// ============================================================================

fn bench_offer_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("offer_round");

    for size in [100_u32, 1_000] {
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let s = SchedulerCore::new(
                    SchedulerConfig::default(),
                    Arc::new(template()),
                    InMemoryDriver::new(),
                );
                let _ = s.on_registered("fw".into(), MasterInfo::default());
                let _ = s.submit(&submission("job", size));
                let _ = s.on_offers(offers(16));
                black_box(s.snapshot().running.len())
            });
        });
    }
    group.finish();
}

fn bench_node_loss(c: &mut Criterion) {
    c.bench_function("node_loss_revert_256", |b| {
        b.iter(|| {
            let s = SchedulerCore::new(
                SchedulerConfig::default(),
                Arc::new(template()),
                InMemoryDriver::new(),
            );
            let _ = s.on_registered("fw".into(), MasterInfo::default());
            let _ = s.submit(&submission("job", 256));
            let _ = s.on_offers(offers(16));
            let _ = s.on_node_lost(&NodeId::from("n0"));
            black_box(s.snapshot().waiting.len())
        });
    });
}

criterion_group!(matcher_benches, bench_first_fit_plan);

criterion_group!(scheduler_benches, bench_offer_round, bench_node_loss);

criterion_main!(matcher_benches, scheduler_benches);
