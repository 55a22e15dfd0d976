//! End-to-end registration flows against the in-memory store.
//!
//! These tests drive the public service and session APIs with real adapters
//! so the collision protocol is exercised against an actual unique index
//! rather than mock expectations.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use ledger_backend::domain::ports::{
    PayerRegistrationCommand, PayerRegistrationQuery, RegisterPayerRequest, UpdatePayerRequest,
};
use ledger_backend::domain::{
    AllocationSession, AllocationState, ConfiguredAllocator, LocalityId, NumberWidth,
    PayerChanges, PayerDetails, PayerName, PayerRecord, PayerRegistrationService,
    RegistrationError, RegistrationNumber, RegistrationPolicy, RegistrationStrategy,
};
use ledger_backend::outbound::memory::InMemoryPayerStore;
use mockable::DefaultClock;
use rstest::rstest;

type Service =
    PayerRegistrationService<InMemoryPayerStore, ConfiguredAllocator<InMemoryPayerStore, InMemoryPayerStore>>;

fn number(text: &str, width: NumberWidth) -> RegistrationNumber {
    RegistrationNumber::parse(text, width).expect("valid number")
}

fn details(name: &str) -> PayerDetails {
    PayerDetails {
        name: PayerName::new(name).expect("valid name"),
        locality_id: LocalityId::random(),
    }
}

fn seeded(numbers: &[&str], width: NumberWidth) -> InMemoryPayerStore {
    InMemoryPayerStore::with_payers(numbers.iter().map(|text| {
        PayerRecord::new(number(text, width), details("Existing Payer"), Utc::now())
    }))
}

fn service(
    store: &InMemoryPayerStore,
    strategy: RegistrationStrategy,
    policy: RegistrationPolicy,
) -> Service {
    let repository = Arc::new(store.clone());
    let allocator = ConfiguredAllocator::for_strategy(
        strategy,
        Arc::clone(&repository),
        Arc::new(store.clone()),
        policy.width(),
    );
    PayerRegistrationService::new(
        repository,
        Arc::new(allocator),
        policy,
        Arc::new(DefaultClock),
    )
}

fn optimistic(store: &InMemoryPayerStore) -> Service {
    service(store, RegistrationStrategy::Optimistic, RegistrationPolicy::default())
}

async fn register(service: &Service, candidate: &RegistrationNumber, name: &str) -> String {
    service
        .submit(RegisterPayerRequest {
            candidate: candidate.as_str().to_owned(),
            payer: details(name),
        })
        .await
        .expect("registration succeeds")
        .payer
        .registration_number()
        .as_str()
        .to_owned()
}

#[tokio::test]
async fn sequential_commits_from_empty_store_are_consecutive() {
    let store = InMemoryPayerStore::new();
    let service = optimistic(&store);

    for n in 1..=12_u64 {
        let candidate = service.request_candidate().await.expect("candidate");
        assert_eq!(candidate.value(), n);
        let committed = register(&service, &candidate, "Payer").await;
        assert_eq!(committed, format!("{n:05}"));
    }
    assert_eq!(store.len().await, 12);
}

#[tokio::test]
async fn candidate_is_stable_until_committed() {
    let store = seeded(&["00041", "00042"], NumberWidth::DEFAULT);
    let service = optimistic(&store);

    let first = service.request_candidate().await.expect("candidate");
    let second = service.request_candidate().await.expect("candidate");

    assert_eq!(first, second);
    assert_eq!(first.as_str(), "00043");
}

#[tokio::test]
async fn second_session_regenerates_after_losing_the_number() {
    let store = seeded(&["00042"], NumberWidth::DEFAULT);
    let service = optimistic(&store);
    let mut session_a = AllocationSession::new();
    let mut session_b = AllocationSession::new();

    let offered_a = session_a
        .request_candidate(&service)
        .await
        .expect("candidate for A");
    let offered_b = session_b
        .request_candidate(&service)
        .await
        .expect("candidate for B");
    assert_eq!(offered_a.as_str(), "00043");
    assert_eq!(offered_b.as_str(), "00043");

    let committed_a = session_a
        .submit(&service, details("Session A Payer"))
        .await
        .expect("A commits");
    assert_eq!(committed_a.payer.registration_number().as_str(), "00043");
    assert!(!committed_a.regenerated);

    let committed_b = session_b
        .submit(&service, details("Session B Payer"))
        .await
        .expect("B commits after regenerating");
    assert_eq!(committed_b.payer.registration_number().as_str(), "00044");
    assert!(committed_b.regenerated);
    assert_eq!(
        session_b.state(),
        &AllocationState::Committed {
            registration_number: number("00044", NumberWidth::DEFAULT)
        }
    );
}

#[tokio::test]
async fn joined_submissions_of_one_candidate_commit_distinct_numbers() {
    let store = seeded(&["00042"], NumberWidth::DEFAULT);
    let service = optimistic(&store);
    let candidate = service.request_candidate().await.expect("candidate");

    let (a, b) = tokio::join!(
        register(&service, &candidate, "Payer A"),
        register(&service, &candidate, "Payer B"),
    );

    let committed: BTreeSet<_> = [a, b].into_iter().collect();
    assert_eq!(
        committed,
        BTreeSet::from(["00043".to_owned(), "00044".to_owned()])
    );
    assert_eq!(store.len().await, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_sessions_never_share_a_number() {
    const SESSIONS: u32 = 8;
    let store = InMemoryPayerStore::new();
    let policy =
        RegistrationPolicy::new(NumberWidth::DEFAULT, SESSIONS).expect("valid policy");
    let service = Arc::new(service(&store, RegistrationStrategy::Optimistic, policy));

    let handles: Vec<_> = (0..SESSIONS)
        .map(|index| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let candidate = service.request_candidate().await?;
                let response = service
                    .submit(RegisterPayerRequest {
                        candidate: candidate.as_str().to_owned(),
                        payer: details(&format!("Parallel Payer {index}")),
                    })
                    .await?;
                Ok::<_, RegistrationError>(response.payer.registration_number().value())
            })
        })
        .collect();

    let mut committed = BTreeSet::new();
    for handle in handles {
        let value = handle
            .await
            .expect("task completes")
            .expect("registration succeeds");
        assert!(committed.insert(value), "number {value} issued twice");
    }

    assert_eq!(committed, (1..=u64::from(SESSIONS)).collect::<BTreeSet<_>>());
    assert_eq!(store.len().await, 8);
}

#[rstest]
#[case::optimistic(RegistrationStrategy::Optimistic)]
#[case::sequence(RegistrationStrategy::Sequence)]
#[tokio::test]
async fn exhausted_width_reports_overflow(#[case] strategy: RegistrationStrategy) {
    let width = NumberWidth::new(2).expect("valid width");
    let store = seeded(&["99"], width);
    let policy = RegistrationPolicy::new(width, 2).expect("valid policy");
    let service = service(&store, strategy, policy);

    let error = service.request_candidate().await.expect_err("overflow");
    assert_eq!(error, RegistrationError::Overflow { width: 2 });
}

#[tokio::test]
async fn sequence_strategy_offers_distinct_candidates() {
    let store = seeded(&["00042"], NumberWidth::DEFAULT);
    let service = service(
        &store,
        RegistrationStrategy::Sequence,
        RegistrationPolicy::default(),
    );

    let first = service.request_candidate().await.expect("candidate");
    let second = service.request_candidate().await.expect("candidate");
    assert_eq!(first.as_str(), "00043");
    assert_eq!(second.as_str(), "00044");

    // Committing out of order never collides because nothing else holds them.
    assert_eq!(register(&service, &second, "Second Payer").await, "00044");
    assert_eq!(register(&service, &first, "First Payer").await, "00043");
}

#[tokio::test]
async fn manual_number_is_committed_as_entered() {
    let store = seeded(&["00042"], NumberWidth::DEFAULT);
    let service = optimistic(&store);
    let mut session = AllocationSession::new();

    session.request_candidate(&service).await.expect("candidate");
    session.edit("00100").expect("edit");
    let response = session
        .submit(&service, details("Manual Entry"))
        .await
        .expect("commit");

    assert_eq!(response.payer.registration_number().as_str(), "00100");
    let next = service.request_candidate().await.expect("candidate");
    assert_eq!(next.as_str(), "00101");
}

#[tokio::test]
async fn malformed_manual_number_is_rejected_before_store_access() {
    let store = seeded(&["00042"], NumberWidth::DEFAULT);
    let service = optimistic(&store);
    let mut session = AllocationSession::new();

    session.request_candidate(&service).await.expect("candidate");
    session.edit("1A2B3").expect("edit");
    let error = session
        .submit(&service, details("Manual Entry"))
        .await
        .expect_err("format error");

    assert!(error.to_string().contains("invalid registration number"));
    assert_eq!(session.candidate(), Some("1A2B3"));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn edit_mode_renumbering_respects_uniqueness() {
    let store = seeded(&["00007", "00042"], NumberWidth::DEFAULT);
    let service = optimistic(&store);

    let clash = service
        .update(UpdatePayerRequest {
            registration_number: "00007".to_owned(),
            changes: PayerChanges {
                registration_number: Some("00042".to_owned()),
                ..PayerChanges::default()
            },
        })
        .await
        .expect_err("number taken");
    assert_eq!(clash, RegistrationError::conflict("00042", 1));

    let moved = service
        .update(UpdatePayerRequest {
            registration_number: "00007".to_owned(),
            changes: PayerChanges {
                registration_number: Some("00008".to_owned()),
                name: Some(PayerName::new("Renamed Payer").expect("valid name")),
                ..PayerChanges::default()
            },
        })
        .await
        .expect("renumbered");
    assert_eq!(moved.registration_number().as_str(), "00008");

    assert_eq!(service.find_payer("00007").await, Ok(None));
    let found = service
        .find_payer("00008")
        .await
        .expect("lookup succeeds")
        .expect("payer moved");
    assert_eq!(found.name().as_ref(), "Renamed Payer");
}
