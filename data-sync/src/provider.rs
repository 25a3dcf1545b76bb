//! Data provider interface
//!
//! The remote data source is an external collaborator. Everything in this
//! crate talks to it through [`DataProvider`], so backends (remote service,
//! in-memory fixtures, instrumented wrappers) are interchangeable.

use crate::error::ProviderResult;
use async_trait::async_trait;
use books_core::{
    Account, Category, Delegation, DelegationId, OrganizationId, Transaction,
};
use std::fmt;
use std::sync::Arc;

/// Provider operations, used for telemetry labels and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List delegations of an organization
    ListDelegations,
    /// List accounts of a delegation
    ListAccounts,
    /// List categories of an organization
    ListCategories,
    /// List transactions of a delegation
    ListTransactions,
}

impl Operation {
    /// Telemetry label
    pub fn label(&self) -> &'static str {
        match self {
            Operation::ListDelegations => "listDelegations",
            Operation::ListAccounts => "listAccounts",
            Operation::ListCategories => "listCategories",
            Operation::ListTransactions => "listTransactions",
        }
    }

    /// Table the operation reads
    pub fn table(&self) -> &'static str {
        match self {
            Operation::ListDelegations => "delegations",
            Operation::ListAccounts => "accounts",
            Operation::ListCategories => "categories",
            Operation::ListTransactions => "transactions",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Remote source of bookkeeping records.
///
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Delegations owned by an organization
    async fn list_delegations(&self, organization_id: &OrganizationId)
        -> ProviderResult<Vec<Delegation>>;

    /// Accounts owned by a delegation
    async fn list_accounts(&self, delegation_id: &DelegationId) -> ProviderResult<Vec<Account>>;

    /// Categories owned by an organization, in provider order
    async fn list_categories(&self, organization_id: &OrganizationId)
        -> ProviderResult<Vec<Category>>;

    /// Transactions recorded by a delegation
    async fn list_transactions(&self, delegation_id: &DelegationId)
        -> ProviderResult<Vec<Transaction>>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    async fn list_delegations(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Delegation>> {
        (**self).list_delegations(organization_id).await
    }

    async fn list_accounts(&self, delegation_id: &DelegationId) -> ProviderResult<Vec<Account>> {
        (**self).list_accounts(delegation_id).await
    }

    async fn list_categories(
        &self,
        organization_id: &OrganizationId,
    ) -> ProviderResult<Vec<Category>> {
        (**self).list_categories(organization_id).await
    }

    async fn list_transactions(
        &self,
        delegation_id: &DelegationId,
    ) -> ProviderResult<Vec<Transaction>> {
        (**self).list_transactions(delegation_id).await
    }
}
