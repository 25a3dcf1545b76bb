//! JSON row provider
//!
//! Serves raw JSON row payloads, the shape a remote table API answers with.
//! Every response is decoded through [`books_core::decode_rows`]; a payload
//! with a malformed row fails the call with [`ProviderError::InvalidRecord`].

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{DataProvider, Operation};
use async_trait::async_trait;
use books_core::{
    decode_rows, Account, Category, Delegation, DelegationId, OrganizationId, Record, Transaction,
};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// [`DataProvider`] over raw JSON payloads keyed by operation and scope id
#[derive(Debug, Default)]
pub struct JsonRowsProvider {
    payloads: RwLock<HashMap<(Operation, String), Value>>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl JsonRowsProvider {
    /// Empty provider; every scope answers with no rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the payload returned by `operation` for `scope`
    pub fn set_rows(&self, operation: Operation, scope: impl Into<String>, payload: Value) {
        self.payloads.write().insert((operation, scope.into()), payload);
    }

    /// Builder form of [`set_rows`](Self::set_rows)
    pub fn with_rows(self, operation: Operation, scope: impl Into<String>, payload: Value) -> Self {
        self.set_rows(operation, scope, payload);
        self
    }

    /// Number of calls served for `operation`
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls.lock().get(&operation).copied().unwrap_or(0)
    }

    fn fetch<T: Record>(&self, operation: Operation, scope: &str) -> ProviderResult<Vec<T>> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        let payload = self
            .payloads
            .read()
            .get(&(operation, scope.to_string()))
            .cloned()
            .unwrap_or(Value::Null);

        decode_rows(payload).map_err(|err| {
            warn!("{} for {} returned invalid rows: {}", operation, scope, err);
            ProviderError::from(err)
        })
    }
}

#[async_trait]
impl DataProvider for JsonRowsProvider {
    async fn list_delegations(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Delegation>> {
        self.fetch(Operation::ListDelegations, organization_id.as_str())
    }

    async fn list_accounts(&self, delegation_id: &DelegationId) -> ProviderResult<Vec<Account>> {
        self.fetch(Operation::ListAccounts, delegation_id.as_str())
    }

    async fn list_categories(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Category>> {
        self.fetch(Operation::ListCategories, organization_id.as_str())
    }

    async fn list_transactions(
        &self,
        delegation_id: &DelegationId,
    ) -> ProviderResult<Vec<Transaction>> {
        self.fetch(Operation::ListTransactions, delegation_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountsLoader, InstrumentedProvider, LoadStatus};
    use books_core::AccountKind;
    use serde_json::json;
    use std::sync::Arc;
    use telemetry::{CallStatus, TelemetryRecorder};

    fn accounts_payload() -> Value {
        json!([
            {"id": "a1", "delegation_id": "d1", "name": "Main",
             "kind": "bank", "bank_name": "Acme"},
            {"id": "a2", "delegation_id": "d1", "name": "Till", "kind": "cash"},
        ])
    }

    #[tokio::test]
    async fn test_decodes_rows() {
        let provider =
            JsonRowsProvider::new().with_rows(Operation::ListAccounts, "d1", accounts_payload());

        let accounts = provider.list_accounts(&DelegationId::new("d1")).await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].display_name(), "Acme - Main");
        assert_eq!(accounts[1].kind, AccountKind::CashBox);

        // Unknown scope answers with no rows
        let none = provider.list_accounts(&DelegationId::new("d2")).await.unwrap();
        assert!(none.is_empty());
        assert_eq!(provider.calls(Operation::ListAccounts), 2);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_invalid_record() {
        let provider = JsonRowsProvider::new().with_rows(
            Operation::ListAccounts,
            "d1",
            json!([{"id": "a1", "delegation_id": "d1", "name": "X", "kind": "vault"}]),
        );

        let err = provider.list_accounts(&DelegationId::new("d1")).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRecord(_)));
        assert_eq!(err.status(), CallStatus::Error);
        assert!(err.to_string().contains("accounts"));
    }

    #[tokio::test]
    async fn test_non_array_payload_rejected() {
        let provider = JsonRowsProvider::new().with_rows(
            Operation::ListCategories,
            "o1",
            json!({"error": "not a row set"}),
        );

        let err = provider
            .list_categories(&OrganizationId::new("o1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRecord(_)));
    }

    #[tokio::test]
    async fn test_invalid_rows_recorded_and_surfaced() {
        let backend = JsonRowsProvider::new().with_rows(
            Operation::ListAccounts,
            "d1",
            json!([
                {"id": "a1", "delegation_id": "d1", "name": "Main", "kind": "bank"},
                {"id": "a2", "delegation_id": "d1", "kind": "cash"},
            ]),
        );
        let recorder = TelemetryRecorder::new();
        let provider = Arc::new(InstrumentedProvider::new(backend, recorder.clone()));

        let loader = AccountsLoader::new(provider);
        loader.bind("d1").unwrap().await.unwrap();

        let state = loader.snapshot();
        assert_eq!(state.status, LoadStatus::Failed);
        assert!(state.data.is_empty());
        let message = state.error.unwrap();
        assert!(message.contains("row 1"), "{}", message);

        let events = recorder.snapshot();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status(), CallStatus::Error);
        assert_eq!(events[0].table(), Some("accounts"));
        assert_eq!(events[0].error(), Some(message.as_str()));
    }
}
