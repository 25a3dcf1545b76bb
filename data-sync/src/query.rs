//! Entity queries driven by loaders
//!
//! Each query binds a scope key type to one provider operation and an
//! optional post-processing rule.

use crate::error::ProviderResult;
use crate::provider::DataProvider;
use books_core::{
    sort_categories, Account, Category, Delegation, DelegationId, OrganizationId, Transaction,
};
use futures::future::{BoxFuture, FutureExt};
use std::fmt::Debug;
use std::sync::Arc;

/// One loadable entity collection
pub trait EntityQuery: Send + Sync + 'static {
    /// Scope the collection is keyed by
    type Key: AsRef<str> + Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Collection element
    type Item: Clone + Debug + Send + Sync + 'static;

    /// Entity name used in logs and fallback messages
    const ENTITY: &'static str;

    /// Issue the provider call for `key`
    fn fetch(
        provider: Arc<dyn DataProvider>,
        key: Self::Key,
    ) -> BoxFuture<'static, ProviderResult<Vec<Self::Item>>>;

    /// Applied to a successful result before it is stored
    fn post_process(_items: &mut Vec<Self::Item>) {}
}

/// Delegations of an organization
#[derive(Debug, Clone, Copy)]
pub struct DelegationsQuery;

impl EntityQuery for DelegationsQuery {
    type Key = OrganizationId;
    type Item = Delegation;
    const ENTITY: &'static str = "delegations";

    fn fetch(
        provider: Arc<dyn DataProvider>,
        key: OrganizationId,
    ) -> BoxFuture<'static, ProviderResult<Vec<Delegation>>> {
        async move { provider.list_delegations(&key).await }.boxed()
    }
}

/// Accounts of a delegation
#[derive(Debug, Clone, Copy)]
pub struct AccountsQuery;

impl EntityQuery for AccountsQuery {
    type Key = DelegationId;
    type Item = Account;
    const ENTITY: &'static str = "accounts";

    fn fetch(
        provider: Arc<dyn DataProvider>,
        key: DelegationId,
    ) -> BoxFuture<'static, ProviderResult<Vec<Account>>> {
        async move { provider.list_accounts(&key).await }.boxed()
    }
}

/// Categories of an organization, sorted by `sort_order`
#[derive(Debug, Clone, Copy)]
pub struct CategoriesQuery;

impl EntityQuery for CategoriesQuery {
    type Key = OrganizationId;
    type Item = Category;
    const ENTITY: &'static str = "categories";

    fn fetch(
        provider: Arc<dyn DataProvider>,
        key: OrganizationId,
    ) -> BoxFuture<'static, ProviderResult<Vec<Category>>> {
        async move { provider.list_categories(&key).await }.boxed()
    }

    fn post_process(items: &mut Vec<Category>) {
        sort_categories(items);
    }
}

/// Transactions of a delegation
#[derive(Debug, Clone, Copy)]
pub struct TransactionsQuery;

impl EntityQuery for TransactionsQuery {
    type Key = DelegationId;
    type Item = Transaction;
    const ENTITY: &'static str = "transactions";

    fn fetch(
        provider: Arc<dyn DataProvider>,
        key: DelegationId,
    ) -> BoxFuture<'static, ProviderResult<Vec<Transaction>>> {
        async move { provider.list_transactions(&key).await }.boxed()
    }
}
