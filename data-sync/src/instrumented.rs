//! Telemetry instrumentation for data providers
//!
//! [`InstrumentedProvider`] wraps any [`DataProvider`] and records exactly one
//! [`TelemetryEvent`] per call attempt:
//!
//! | Outcome                         | Status    |
//! |---------------------------------|-----------|
//! | success                         | `ok`      |
//! | deadline exceeded               | `timeout` |
//! | future dropped before settling  | `aborted` |
//! | backend reported cancellation   | `aborted` |
//! | any other failure               | `error`   |
//!
//! The event is recorded before the outcome is returned to the caller.
//! Recording cannot fail, so it never masks the call's own result.

use crate::config::ProviderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{DataProvider, Operation};
use async_trait::async_trait;
use books_core::{Account, Category, Delegation, DelegationId, OrganizationId, Transaction};
use std::future::Future;
use std::time::Duration;
use telemetry::{CallStatus, TelemetryEvent, TelemetryRecorder};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Provider wrapper that times every call and records telemetry
#[derive(Debug)]
pub struct InstrumentedProvider<P> {
    inner: P,
    recorder: TelemetryRecorder,
    deadline: Option<Duration>,
}

impl<P: DataProvider> InstrumentedProvider<P> {
    /// Wrap `inner`, recording into `recorder`, without a deadline
    pub fn new(inner: P, recorder: TelemetryRecorder) -> Self {
        Self {
            inner,
            recorder,
            deadline: None,
        }
    }

    /// Wrap `inner` using the configured deadline
    pub fn from_config(inner: P, recorder: TelemetryRecorder, config: &ProviderConfig) -> Self {
        Self {
            inner,
            recorder,
            deadline: config.deadline(),
        }
    }

    /// Fail calls that do not settle within `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Recorder receiving the events
    pub fn recorder(&self) -> &TelemetryRecorder {
        &self.recorder
    }

    /// Wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn observe<T, F>(&self, operation: Operation, call: F) -> ProviderResult<T>
    where
        F: Future<Output = ProviderResult<T>> + Send,
    {
        let mut guard = CallGuard::start(&self.recorder, operation);

        let result = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    operation: operation.label(),
                    after_ms: deadline.as_millis() as u64,
                }),
            },
            None => call.await,
        };

        guard.settle(&result);
        result
    }
}

/// Records the call's event on settlement, or `aborted` if dropped first
struct CallGuard<'a> {
    recorder: &'a TelemetryRecorder,
    operation: Operation,
    started: Instant,
    settled: bool,
}

impl<'a> CallGuard<'a> {
    fn start(recorder: &'a TelemetryRecorder, operation: Operation) -> Self {
        Self {
            recorder,
            operation,
            started: Instant::now(),
            settled: false,
        }
    }

    fn settle<T>(&mut self, result: &ProviderResult<T>) {
        self.settled = true;
        let elapsed = self.started.elapsed();

        let event = match result {
            Ok(_) => {
                debug!("{} succeeded in {:?}", self.operation, elapsed);
                self.event(CallStatus::Ok, elapsed)
            }
            Err(err) => {
                warn!("{} failed after {:?}: {}", self.operation, elapsed, err);
                self.event(err.status(), elapsed).with_error(err.to_string())
            }
        };
        self.recorder.record(event);
    }

    fn event(&self, status: CallStatus, elapsed: Duration) -> TelemetryEvent {
        TelemetryEvent::new(self.operation.label(), elapsed, status)
            .with_table(self.operation.table())
    }
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let elapsed = self.started.elapsed();
        debug!("{} aborted after {:?}", self.operation, elapsed);
        let event = self
            .event(CallStatus::Aborted, elapsed)
            .with_error(ProviderError::Aborted { operation: self.operation.label() }.to_string());
        self.recorder.record(event);
    }
}

#[async_trait]
impl<P: DataProvider> DataProvider for InstrumentedProvider<P> {
    async fn list_delegations(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Delegation>> {
        self.observe(Operation::ListDelegations, self.inner.list_delegations(organization_id))
            .await
    }

    async fn list_accounts(&self, delegation_id: &DelegationId) -> ProviderResult<Vec<Account>> {
        self.observe(Operation::ListAccounts, self.inner.list_accounts(delegation_id))
            .await
    }

    async fn list_categories(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Category>> {
        self.observe(Operation::ListCategories, self.inner.list_categories(organization_id))
            .await
    }

    async fn list_transactions(
        &self,
        delegation_id: &DelegationId,
    ) -> ProviderResult<Vec<Transaction>> {
        self.observe(Operation::ListTransactions, self.inner.list_transactions(delegation_id))
            .await
    }
}
