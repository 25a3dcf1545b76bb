//! Enrichment join
//!
//! Denormalizes transactions with the account and category they reference.
//!
//! # Invariants
//!
//! - Output order equals input transaction order
//! - Unknown references resolve to `None`, never to an error or placeholder
//! - Duplicate ids in the lookup collections: first match wins
//! - Inputs are never mutated

use crate::types::{Account, AccountId, Category, CategoryId, Transaction};
use serde::Serialize;
use std::collections::HashMap;

/// Transaction with its resolved account and category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeTransaction {
    /// The underlying transaction
    #[serde(flatten)]
    pub transaction: Transaction,

    /// Resolved account, if the reference matched
    pub account: Option<Account>,

    /// Resolved category, if the reference matched
    pub category: Option<Category>,
}

impl CompositeTransaction {
    /// Account display name, if the account resolved
    pub fn account_label(&self) -> Option<String> {
        self.account.as_ref().map(Account::display_name)
    }

    /// Category name, if the category resolved
    pub fn category_label(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// Join transactions with accounts and categories by linear scan.
///
/// O(T × (A + C)); fine for a single delegation's books. Use
/// [`enrich_indexed`] for large collections.
pub fn enrich(
    transactions: &[Transaction],
    accounts: &[Account],
    categories: &[Category],
) -> Vec<CompositeTransaction> {
    transactions
        .iter()
        .map(|tx| CompositeTransaction {
            transaction: tx.clone(),
            account: accounts.iter().find(|a| a.id == tx.account_id).cloned(),
            category: categories.iter().find(|c| c.id == tx.category_id).cloned(),
        })
        .collect()
}

/// Same result as [`enrich`], indexing accounts and categories by id first.
pub fn enrich_indexed(
    transactions: &[Transaction],
    accounts: &[Account],
    categories: &[Category],
) -> Vec<CompositeTransaction> {
    let mut account_index: HashMap<&AccountId, &Account> = HashMap::with_capacity(accounts.len());
    for account in accounts {
        account_index.entry(&account.id).or_insert(account);
    }

    let mut category_index: HashMap<&CategoryId, &Category> =
        HashMap::with_capacity(categories.len());
    for category in categories {
        category_index.entry(&category.id).or_insert(category);
    }

    transactions
        .iter()
        .map(|tx| CompositeTransaction {
            transaction: tx.clone(),
            account: account_index.get(&tx.account_id).map(|a| (*a).clone()),
            category: category_index.get(&tx.category_id).map(|c| (*c).clone()),
        })
        .collect()
}
