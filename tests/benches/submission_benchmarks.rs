//! # Ledger Gateway Submission Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | Transaction Identity Issuer | issue one id | < 10µs |
//! | Endorsement policies | evaluate 16 endorsements | < 1µs |
//! | Target Resolver | resolve 3 names | < 10µs |
//! | Submission Service | full submission, in-memory ledger | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lg_submission::{
    Endorsement, EndorsementPolicy, NetworkDirectory, ProposalResponse, ScriptedLedger,
    SubmissionApi, SubmissionConfig, SubmissionService, TargetPurpose, TargetResolver,
    TransactionIdIssuer, TransactionRequest,
};
use lg_tests::integration::fixtures::{org1_events, org1_identity, DIRECTORY};
use shared_bus::InMemoryEventHub;
use shared_types::{OrgId, PeerName, ValidationCode};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Transaction Identity Issuer
// ============================================================================

fn bench_transaction_ids(c: &mut Criterion) {
    let mut group = c.benchmark_group("transaction-identity-issuer");
    let issuer = TransactionIdIssuer::new();
    let identity = org1_identity();

    group.throughput(Throughput::Elements(1));
    group.bench_function("issue", |b| {
        b.iter(|| black_box(issuer.issue(&identity).ok()))
    });
    group.finish();
}

// ============================================================================
// Endorsement Policies
// ============================================================================

fn bench_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("endorsement-policy");

    for size in [1usize, 4, 16] {
        let endorsements: Vec<_> = (0..size)
            .map(|i| Endorsement::Responded {
                peer: PeerName::new(format!("peer{i}")),
                response: ProposalResponse::success(Vec::new()),
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        for policy in [EndorsementPolicy::FirstResponder, EndorsementPolicy::Unanimous] {
            group.bench_with_input(
                BenchmarkId::new(policy.to_string(), size),
                &endorsements,
                |b, endorsements| b.iter(|| black_box(policy.evaluate(endorsements))),
            );
        }
    }
    group.finish();
}

// ============================================================================
// Target Resolver
// ============================================================================

fn bench_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("target-resolver");
    let directory = NetworkDirectory::from_json_str(DIRECTORY).expect("valid directory");
    let resolver = TargetResolver::new(Arc::new(directory));
    let caller = OrgId::new("org1");
    let names = [
        PeerName::new("peer0"),
        PeerName::new("peer1"),
        PeerName::new("peer2"),
    ];

    group.bench_function("resolve_proposal_targets", |b| {
        b.iter(|| black_box(resolver.resolve(&caller, &names, TargetPurpose::Proposal).ok()))
    });
    group.finish();
}

// ============================================================================
// Submission Service
// ============================================================================

fn bench_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("submission-service");
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");

    let ledger = Arc::new(ScriptedLedger::new());
    let hub = InMemoryEventHub::new();
    ledger.commit_through(hub.clone(), org1_events(), ValidationCode::Valid, Duration::ZERO);
    let directory = NetworkDirectory::from_json_str(DIRECTORY).expect("valid directory");
    let service = SubmissionService::new(
        SubmissionConfig::interactive(),
        ledger,
        Arc::new(hub),
        Arc::new(directory),
    );

    group.bench_function("submit_committed", |b| {
        b.iter(|| {
            let request = TransactionRequest::builder("mychannel", "tuna-app", "changeTunaHolder")
                .targets(["peer0", "peer1"])
                .args(["1", "Barry"])
                .identity(org1_identity())
                .build()
                .expect("valid request");
            black_box(runtime.block_on(service.submit_transaction(request)).ok())
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_transaction_ids,
    bench_policies,
    bench_resolver,
    bench_submission
);
criterion_main!(benches);
