//! Integration tests for the data synchronization flow
//!
//! Loader → instrumented provider → telemetry → enrichment, end to end:
//! - Rebinding discards the superseded response
//! - Every provider call yields exactly one telemetry event
//! - Telemetry follows settlement order, not dispatch order
//! - Loaded collections feed the enrichment join

use books_core::{
    enrich, Account, AccountId, CategoryId, DelegationId, OrganizationId, Transaction,
};
use data_sync::{
    AccountsLoader, CategoriesLoader, DataProvider, DelegationsLoader, InMemoryProvider,
    InstrumentedProvider, LoadStatus, Operation, ProviderError, TransactionsLoader,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{CallStatus, TelemetryRecorder};

struct TestEnvironment {
    backend: Arc<InMemoryProvider>,
    provider: Arc<dyn DataProvider>,
    recorder: TelemetryRecorder,
}

impl TestEnvironment {
    fn new(backend: InMemoryProvider) -> Self {
        let backend = Arc::new(backend);
        let recorder = TelemetryRecorder::new();
        let provider: Arc<dyn DataProvider> =
            Arc::new(InstrumentedProvider::new(Arc::clone(&backend), recorder.clone()));
        Self {
            backend,
            provider,
            recorder,
        }
    }

    fn statuses(&self) -> Vec<CallStatus> {
        self.recorder.snapshot().iter().map(|e| e.status()).collect()
    }
}

#[tokio::test(start_paused = true)]
async fn test_rebind_before_settlement_keeps_latest_key() {
    let backend = InMemoryProvider::sample()
        .with_scope_latency("org-1", Duration::from_millis(300))
        .with_scope_latency("org-2", Duration::from_millis(30));
    let env = TestEnvironment::new(backend);
    let loader = DelegationsLoader::new(Arc::clone(&env.provider));

    let first = loader.bind("org-1").unwrap();
    let second = loader.bind("org-2").unwrap();
    second.await.unwrap();
    first.await.unwrap();

    let state = loader.snapshot();
    assert_eq!(state.status, LoadStatus::Ready);
    assert_eq!(state.key, Some(OrganizationId::new("org-2")));
    assert_eq!(state.data_key, Some(OrganizationId::new("org-2")));

    // Both calls were observed, in settlement order
    let events = env.recorder.snapshot();
    assert_eq!(events.len(), 2);
    assert!(events[0].duration_ms() < events[1].duration_ms());
    assert_eq!(env.backend.calls(Operation::ListDelegations), 2);
}

#[tokio::test]
async fn test_provider_failure_recorded_once_and_surfaced() {
    let env = TestEnvironment::new(InMemoryProvider::sample());
    env.backend
        .fail_next(Operation::ListAccounts, ProviderError::backend("row level security violation"));

    let notified = Arc::new(AtomicUsize::new(0));
    let subscription = {
        let notified = Arc::clone(&notified);
        let recorder = env.recorder.clone();
        env.recorder.subscribe(move || {
            // The triggering event is already visible
            assert_eq!(recorder.snapshot().last().unwrap().status(), CallStatus::Error);
            notified.fetch_add(1, Ordering::SeqCst);
        })
    };

    let loader = AccountsLoader::new(Arc::clone(&env.provider));
    loader.bind("del-demo").unwrap().await.unwrap();

    assert_eq!(loader.error().as_deref(), Some("row level security violation"));
    assert_eq!(loader.snapshot().status, LoadStatus::Failed);
    assert_eq!(env.statuses(), vec![CallStatus::Error]);
    assert_eq!(
        env.recorder.snapshot()[0].error(),
        Some("row level security violation")
    );
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    assert!(subscription.unsubscribe());
    loader.refresh().unwrap().await.unwrap();
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert_eq!(env.statuses(), vec![CallStatus::Error, CallStatus::Ok]);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_surfaces_as_loader_error() {
    let backend = Arc::new(InMemoryProvider::sample().with_latency(Duration::from_secs(30)));
    let recorder = TelemetryRecorder::new();
    let provider: Arc<dyn DataProvider> = Arc::new(
        InstrumentedProvider::new(Arc::clone(&backend), recorder.clone())
            .with_deadline(Duration::from_secs(2)),
    );

    let loader = CategoriesLoader::new(provider);
    loader.bind("org-demo").unwrap().await.unwrap();

    assert_eq!(loader.error().as_deref(), Some("listCategories timed out after 2000ms"));
    let events = recorder.snapshot();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status(), CallStatus::Timeout);
    assert_eq!(events[0].table(), Some("categories"));
}

#[tokio::test(start_paused = true)]
async fn test_aborted_superseded_request_recorded() {
    let env = TestEnvironment::new(
        InMemoryProvider::sample().with_scope_latency("del-old", Duration::from_secs(1)),
    );
    let loader = AccountsLoader::with_config(
        Arc::clone(&env.provider),
        &data_sync::config::LoaderConfig { abort_superseded: true },
    );

    let first = loader.bind("del-old").unwrap();
    // Let the first request reach the provider before superseding it
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = loader.bind("del-demo").unwrap();

    assert!(first.await.unwrap_err().is_cancelled());
    second.await.unwrap();

    let statuses = env.statuses();
    assert_eq!(statuses.len(), 2);
    assert!(statuses.contains(&CallStatus::Aborted));
    assert!(statuses.contains(&CallStatus::Ok));
    assert_eq!(loader.snapshot().data_key, Some(DelegationId::new("del-demo")));
}

#[tokio::test]
async fn test_loaded_collections_enrich() {
    let env = TestEnvironment::new(InMemoryProvider::sample());
    env.backend.push_transaction(
        DelegationId::new("del-demo"),
        Transaction::new(
            Decimal::new(-999, 2),
            AccountId::new("acc-closed"),
            CategoryId::new("cat-gone"),
        ),
    );

    let accounts = AccountsLoader::new(Arc::clone(&env.provider));
    let categories = CategoriesLoader::new(Arc::clone(&env.provider));
    let transactions = TransactionsLoader::new(Arc::clone(&env.provider));

    for request in [
        accounts.bind("del-demo"),
        categories.bind("org-demo"),
        transactions.bind("del-demo"),
    ]
    .into_iter()
    .flatten()
    {
        request.await.unwrap();
    }

    let rows = enrich(&transactions.data(), &accounts.data(), &categories.data());
    assert_eq!(rows.len(), 5);

    let ids: Vec<_> = rows.iter().map(|r| r.transaction.id.as_str().to_string()).collect();
    assert_eq!(&ids[..4], &["tx-1", "tx-2", "tx-3", "tx-4"]);

    assert_eq!(rows[0].account_label().as_deref(), Some("Acme - Main"));
    assert_eq!(rows[2].account_label().as_deref(), Some("Petty Cash"));
    assert_eq!(rows[0].category_label(), Some("Member Dues"));

    // Orphaned references stay unresolved
    assert!(rows[4].account.is_none());
    assert!(rows[4].category.is_none());

    assert_eq!(env.recorder.len(), 3);
    assert!(env.statuses().iter().all(|s| *s == CallStatus::Ok));
}

#[tokio::test]
async fn test_new_account_visible_after_refresh() {
    let env = TestEnvironment::new(InMemoryProvider::sample());
    let loader = AccountsLoader::new(Arc::clone(&env.provider));
    loader.bind("del-demo").unwrap().await.unwrap();
    assert_eq!(loader.data().len(), 2);

    env.backend
        .upsert_account(Account::bank(DelegationId::new("del-demo"), "Savings", "Acme"));
    assert_eq!(loader.data().len(), 2);

    loader.refresh().unwrap().await.unwrap();
    assert_eq!(loader.data().len(), 3);
}
