//! Property-based tests for loader invariants
//!
//! These tests use proptest to verify:
//! - Latest key wins: whatever order responses settle in, the final state
//!   reflects only the last bound key
//! - One event per call: every dispatched request yields one telemetry event

use books_core::{Account, DelegationId};
use data_sync::config::LoaderConfig;
use data_sync::{
    AccountsLoader, DataProvider, Fixtures, InMemoryProvider, InstrumentedProvider, LoadStatus,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use telemetry::TelemetryRecorder;

const SCOPES: usize = 4;

fn scope(index: usize) -> String {
    format!("del-{index}")
}

/// Strategy for per-scope provider latencies (milliseconds)
fn latency_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..200, SCOPES)
}

/// Strategy for a bind schedule: scope index and pause before the next bind
fn schedule_strategy() -> impl Strategy<Value = Vec<(usize, u64)>> {
    prop::collection::vec((0..SCOPES, 0u64..60), 1..10)
}

/// One account per scope, named after it
fn fixtures() -> Fixtures {
    Fixtures {
        accounts: (0..SCOPES)
            .map(|i| Account::cash_box(DelegationId::new(scope(i)), scope(i)))
            .collect(),
        ..Fixtures::default()
    }
}

struct Outcome {
    status: LoadStatus,
    key: Option<DelegationId>,
    data_key: Option<DelegationId>,
    names: Vec<String>,
    dispatched: usize,
    events: usize,
}

fn run_schedule(latencies: &[u64], schedule: &[(usize, u64)], abort_superseded: bool) -> Outcome {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();

    runtime.block_on(async {
        let backend = latencies
            .iter()
            .enumerate()
            .fold(InMemoryProvider::new(fixtures()), |backend, (i, ms)| {
                backend.with_scope_latency(scope(i), Duration::from_millis(*ms))
            });
        let recorder = TelemetryRecorder::new();
        let provider: Arc<dyn DataProvider> =
            Arc::new(InstrumentedProvider::new(backend, recorder.clone()));
        let loader = AccountsLoader::with_config(provider, &LoaderConfig { abort_superseded });

        let mut handles = Vec::new();
        for (index, pause) in schedule {
            if let Some(handle) = loader.bind(scope(*index)) {
                handles.push(handle);
            }
            tokio::time::sleep(Duration::from_millis(*pause)).await;
        }

        let dispatched = handles.len();
        for handle in handles {
            // Superseded requests may have been aborted
            let _ = handle.await;
        }

        let state = loader.snapshot();
        Outcome {
            status: state.status,
            key: state.key,
            data_key: state.data_key,
            names: state.data.iter().map(|a| a.name.clone()).collect(),
            dispatched,
            events: recorder.len(),
        }
    })
}

proptest! {
    /// Property: the final state belongs to the last bound key
    #[test]
    fn prop_latest_key_wins(
        latencies in latency_strategy(),
        schedule in schedule_strategy(),
        abort_superseded in any::<bool>(),
    ) {
        let outcome = run_schedule(&latencies, &schedule, abort_superseded);
        let last = scope(schedule.last().unwrap().0);

        prop_assert_eq!(outcome.status, LoadStatus::Ready);
        prop_assert_eq!(outcome.key, Some(DelegationId::new(last.clone())));
        prop_assert_eq!(outcome.data_key, Some(DelegationId::new(last.clone())));
        prop_assert_eq!(outcome.names, vec![last]);
    }

    /// Property: without aborts, every dispatched request is recorded once
    #[test]
    fn prop_one_event_per_request(
        latencies in latency_strategy(),
        schedule in schedule_strategy(),
    ) {
        let outcome = run_schedule(&latencies, &schedule, false);

        prop_assert!(outcome.dispatched >= 1);
        prop_assert_eq!(outcome.events, outcome.dispatched);
    }
}
