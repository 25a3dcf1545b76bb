//! Books Core
//!
//! Domain records and pure view-model computations for the bookkeeping
//! dashboard.
//!
//! # Contents
//!
//! - **Records**: delegations, accounts, categories and transactions as served
//!   by the remote data provider, validated at decode time
//! - **Enrichment**: transactions joined with their account and category
//! - **Balances**: per-account and per-category totals
//!
//! Nothing in this crate performs I/O.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod balance;
pub mod enrichment;
pub mod error;
pub mod records;
pub mod types;

// Re-exports
pub use balance::{account_balances, category_breakdown, totals, AccountBalance, Totals};
pub use enrichment::{enrich, enrich_indexed, CompositeTransaction};
pub use error::{Error, Result};
pub use records::{decode_rows, decode_rows_str, Record};
pub use types::{
    sort_categories, Account, AccountIcon, AccountId, AccountKind, Category, CategoryId,
    Delegation, DelegationId, OrganizationId, Transaction, TransactionId,
};
