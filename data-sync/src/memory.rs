//! In-memory data provider
//!
//! Serves records from fixture collections. Used by the dashboard binary
//! and tests; supports simulated latency and scripted failures.

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{DataProvider, Operation};
use async_trait::async_trait;
use books_core::{
    decode_rows, Account, AccountId, Category, CategoryId, Delegation, DelegationId,
    OrganizationId, Transaction, TransactionId,
};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::time::Duration;

/// Record collections served by [`InMemoryProvider`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixtures {
    /// Delegations
    pub delegations: Vec<Delegation>,
    /// Accounts
    pub accounts: Vec<Account>,
    /// Categories
    pub categories: Vec<Category>,
    /// Transactions with the delegation that recorded them
    pub transactions: Vec<(DelegationId, Transaction)>,
}

impl Fixtures {
    /// Parse a fixture document.
    ///
    /// Expected shape: an object with optional `delegations`, `accounts`,
    /// `categories` arrays and a `transactions` object mapping delegation id
    /// to an array of transaction rows.
    pub fn from_json(content: &str) -> crate::Result<Self> {
        let mut document: Value = serde_json::from_str(content).map_err(books_core::Error::from)?;
        let mut take = |key: &str| document.get_mut(key).map(Value::take).unwrap_or(Value::Null);

        let delegations = decode_rows(take("delegations"))?;
        let accounts = decode_rows(take("accounts"))?;
        let categories = decode_rows(take("categories"))?;

        let mut transactions = Vec::new();
        match take("transactions") {
            Value::Null => {}
            Value::Object(by_delegation) => {
                for (delegation, rows) in by_delegation {
                    let delegation = DelegationId::new(delegation);
                    for tx in decode_rows::<Transaction>(rows)? {
                        transactions.push((delegation.clone(), tx));
                    }
                }
            }
            _ => {
                return Err(crate::Error::Config(
                    "fixture `transactions` must map delegation ids to rows".to_string(),
                ))
            }
        }

        Ok(Self {
            delegations,
            accounts,
            categories,
            transactions,
        })
    }

    /// Read and parse a fixture file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Small demo data set for `org-demo` / `del-demo`
    pub fn sample() -> Self {
        let org = OrganizationId::new("org-demo");
        let del = DelegationId::new("del-demo");

        let category = |id: &str, name: &str, sort_order| Category {
            id: CategoryId::new(id),
            organization_id: org.clone(),
            name: name.to_string(),
            sort_order,
        };
        let tx = |id: &str, cents: i64, account: &str, category: &str, description: &str| {
            let mut tx = Transaction::new(
                Decimal::new(cents, 2),
                AccountId::new(account),
                CategoryId::new(category),
            );
            tx.id = TransactionId::new(id);
            tx.extra
                .insert("description".to_string(), Value::String(description.to_string()));
            (del.clone(), tx)
        };

        let mut petty_cash = Account::cash_box(del.clone(), "Petty Cash");
        petty_cash.id = AccountId::new("acc-cash");
        let mut main = Account::bank(del.clone(), "Main", "Acme");
        main.id = AccountId::new("acc-main");

        Self {
            delegations: vec![Delegation {
                id: del.clone(),
                organization_id: org.clone(),
                name: "Head Office".to_string(),
            }],
            accounts: vec![petty_cash, main],
            categories: vec![
                category("cat-supplies", "Supplies", 30),
                category("cat-dues", "Member Dues", 10),
                category("cat-rent", "Rent", 20),
            ],
            transactions: vec![
                tx("tx-1", 150_000, "acc-main", "cat-dues", "Annual dues"),
                tx("tx-2", -80_000, "acc-main", "cat-rent", "March rent"),
                tx("tx-3", -1_250, "acc-cash", "cat-supplies", "Printer paper"),
                tx("tx-4", 5_000, "acc-cash", "cat-dues", "Cash dues"),
            ],
        }
    }
}

/// Fixture-backed [`DataProvider`]
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    fixtures: RwLock<Fixtures>,
    latency: Duration,
    scope_latency: HashMap<String, Duration>,
    failures: Mutex<HashMap<Operation, VecDeque<ProviderError>>>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl InMemoryProvider {
    /// Provider serving `fixtures`
    pub fn new(fixtures: Fixtures) -> Self {
        Self {
            fixtures: RwLock::new(fixtures),
            ..Default::default()
        }
    }

    /// Provider serving [`Fixtures::sample`]
    pub fn sample() -> Self {
        Self::new(Fixtures::sample())
    }

    /// Delay every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Delay calls for one scope id, overriding the default latency
    pub fn with_scope_latency(mut self, scope: impl Into<String>, latency: Duration) -> Self {
        self.scope_latency.insert(scope.into(), latency);
        self
    }

    /// Make the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: Operation, error: ProviderError) {
        self.failures.lock().entry(operation).or_default().push_back(error);
    }

    /// Number of calls served for `operation`
    pub fn calls(&self, operation: Operation) -> usize {
        self.calls.lock().get(&operation).copied().unwrap_or(0)
    }

    /// Add or replace an account
    pub fn upsert_account(&self, account: Account) {
        let mut fixtures = self.fixtures.write();
        match fixtures.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => fixtures.accounts.push(account),
        }
    }

    /// Add or replace a category
    pub fn upsert_category(&self, category: Category) {
        let mut fixtures = self.fixtures.write();
        match fixtures.categories.iter_mut().find(|c| c.id == category.id) {
            Some(existing) => *existing = category,
            None => fixtures.categories.push(category),
        }
    }

    /// Record a transaction for a delegation
    pub fn push_transaction(&self, delegation_id: DelegationId, transaction: Transaction) {
        self.fixtures.write().transactions.push((delegation_id, transaction));
    }

    async fn begin(&self, operation: Operation, scope: &str) -> ProviderResult<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        let latency = self.scope_latency.get(scope).copied().unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let scripted = self
            .failures
            .lock()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataProvider for InMemoryProvider {
    async fn list_delegations(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Delegation>> {
        self.begin(Operation::ListDelegations, organization_id.as_str()).await?;
        let fixtures = self.fixtures.read();
        Ok(fixtures
            .delegations
            .iter()
            .filter(|d| &d.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_accounts(&self, delegation_id: &DelegationId) -> ProviderResult<Vec<Account>> {
        self.begin(Operation::ListAccounts, delegation_id.as_str()).await?;
        let fixtures = self.fixtures.read();
        Ok(fixtures
            .accounts
            .iter()
            .filter(|a| &a.delegation_id == delegation_id)
            .cloned()
            .collect())
    }

    async fn list_categories(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Category>> {
        self.begin(Operation::ListCategories, organization_id.as_str()).await?;
        let fixtures = self.fixtures.read();
        Ok(fixtures
            .categories
            .iter()
            .filter(|c| &c.organization_id == organization_id)
            .cloned()
            .collect())
    }

    async fn list_transactions(
        &self,
        delegation_id: &DelegationId,
    ) -> ProviderResult<Vec<Transaction>> {
        self.begin(Operation::ListTransactions, delegation_id.as_str()).await?;
        let fixtures = self.fixtures.read();
        Ok(fixtures
            .transactions
            .iter()
            .filter(|(owner, _)| owner == delegation_id)
            .map(|(_, tx)| tx.clone())
            .collect())
    }
}
