//! Balances derived from loaded transactions

use crate::types::{Account, Category, CategoryId, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Aggregate movement figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    /// Sum of positive amounts
    pub inflow: Decimal,

    /// Magnitude of the sum of negative amounts
    pub outflow: Decimal,

    /// inflow - outflow
    pub net: Decimal,

    /// Number of transactions counted
    pub count: usize,
}

impl Totals {
    fn add(&mut self, amount: Decimal) {
        if amount.is_sign_negative() {
            self.outflow += -amount;
        } else {
            self.inflow += amount;
        }
        self.net += amount;
        self.count += 1;
    }
}

/// Balance of one account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    /// The account
    pub account: Account,

    /// Movements on the account
    pub totals: Totals,
}

impl AccountBalance {
    /// Current balance
    pub fn balance(&self) -> Decimal {
        self.totals.net
    }
}

/// Total per category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category
    pub category: Category,

    /// Movements in the category
    pub totals: Totals,
}

/// Per-category totals plus movements whose category did not resolve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    /// One entry per category, in category order
    pub categories: Vec<CategoryTotal>,

    /// Movements referencing an unknown category
    pub uncategorized: Totals,
}

/// Totals over all transactions
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for tx in transactions {
        totals.add(tx.amount);
    }
    totals
}

/// Balance per account, in account order.
///
/// Transactions on accounts not in `accounts` are skipped.
pub fn account_balances(transactions: &[Transaction], accounts: &[Account]) -> Vec<AccountBalance> {
    let mut by_account: HashMap<&str, Totals> = HashMap::new();
    for tx in transactions {
        by_account.entry(tx.account_id.as_str()).or_default().add(tx.amount);
    }

    accounts
        .iter()
        .map(|account| AccountBalance {
            account: account.clone(),
            totals: by_account.get(account.id.as_str()).copied().unwrap_or_default(),
        })
        .collect()
}

/// Totals per category, in the order the categories were given
pub fn category_breakdown(
    transactions: &[Transaction],
    categories: &[Category],
) -> CategoryBreakdown {
    let mut by_category: HashMap<&CategoryId, Totals> = HashMap::new();
    let mut uncategorized = Totals::default();

    for tx in transactions {
        if categories.iter().any(|c| c.id == tx.category_id) {
            by_category.entry(&tx.category_id).or_default().add(tx.amount);
        } else {
            uncategorized.add(tx.amount);
        }
    }

    CategoryBreakdown {
        categories: categories
            .iter()
            .map(|category| CategoryTotal {
                category: category.clone(),
                totals: by_category.get(&category.id).copied().unwrap_or_default(),
            })
            .collect(),
        uncategorized,
    }
}
