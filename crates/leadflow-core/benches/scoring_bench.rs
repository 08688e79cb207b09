//! # Lifecycle Benchmarks
//!
//! Performance benchmarks for leadflow-core scoring and orchestration.
//!
//! Run with: `cargo bench -p leadflow-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use leadflow_core::{
    BusinessDomain, LeadService, LeadSource, LeadStage, NewLead, is_valid_transition, score,
};
use std::hint::black_box;

/// Create an in-memory service holding N leads, every other one contacted.
fn create_service(size: usize) -> LeadService {
    let mut service = LeadService::new();
    for i in 0..size {
        let domain = if i % 3 == 0 {
            None
        } else {
            Some(BusinessDomain::ALL[i % BusinessDomain::ALL.len()])
        };
        let source = LeadSource::ALL[i % LeadSource::ALL.len()];
        let lead = service.create(NewLead::new(source, domain)).expect("create");
        if i % 2 == 0 {
            service
                .update_stage(lead.id, LeadStage::Contacted)
                .expect("contacted");
        }
    }
    service
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_score_matrix(c: &mut Criterion) {
    c.bench_function("score_matrix", |b| {
        b.iter(|| {
            for source in LeadSource::ALL {
                for stage in LeadStage::ALL {
                    for activity in [0, 2, 5, 9] {
                        black_box(score(source, stage, activity, Some(BusinessDomain::First)));
                        black_box(score(source, stage, activity, None));
                    }
                }
            }
        });
    });
}

fn bench_transition_matrix(c: &mut Criterion) {
    c.bench_function("transition_matrix", |b| {
        b.iter(|| {
            for from in LeadStage::ALL {
                for to in LeadStage::ALL {
                    black_box(is_valid_transition(from, to));
                }
            }
        });
    });
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(create_service(size)));
        });
    }

    group.finish();
}

fn bench_list_by_stage(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_by_stage");

    for size in [100, 1000, 10000].iter() {
        let service = create_service(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(service.list(Some(LeadStage::Contacted))));
        });
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    for size in [100, 1000, 10000].iter() {
        let service = create_service(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(service.stats()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_score_matrix,
    bench_transition_matrix,
    bench_create,
    bench_list_by_stage,
    bench_stats,
);
criterion_main!(benches);
