//! Data Sync
//!
//! Client-side data synchronization for the bookkeeping dashboard.
//!
//! # Architecture
//!
//! ```text
//!  consuming view ──bind(scope id)──▶ EntityLoader<Q>
//!                                          │ spawn
//!                                          ▼
//!                              InstrumentedProvider<P> ──record──▶ TelemetryRecorder
//!                                          │                            │
//!                                          ▼                            ▼
//!                                  DataProvider (remote)          subscribers
//! ```
//!
//! - **Loaders** track `Idle/Loading/Ready/Failed` per scope key and discard
//!   stale responses with a generation counter
//! - **Instrumentation** records one telemetry event per provider call
//! - **Enrichment** (from `books-core`) turns loaded collections into rows
//!
//! # Example
//!
//! ```no_run
//! use data_sync::{AccountsLoader, InMemoryProvider, InstrumentedProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let recorder = telemetry::global().clone();
//!     let provider = Arc::new(InstrumentedProvider::new(InMemoryProvider::sample(), recorder));
//!
//!     let accounts = AccountsLoader::new(provider);
//!     if let Some(request) = accounts.bind("del-demo") {
//!         request.await.unwrap();
//!     }
//!     println!("{} accounts", accounts.data().len());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod instrumented;
pub mod loader;
pub mod memory;
pub mod provider;
pub mod query;
pub mod rows;

// Re-exports
pub use config::Config;
pub use error::{Error, ProviderError, ProviderResult, Result};
pub use instrumented::InstrumentedProvider;
pub use loader::{
    AccountsLoader, CategoriesLoader, DelegationsLoader, EntityLoader, LoadState, LoadStatus,
    TransactionsLoader,
};
pub use memory::{Fixtures, InMemoryProvider};
pub use provider::{DataProvider, Operation};
pub use query::{AccountsQuery, CategoriesQuery, DelegationsQuery, EntityQuery, TransactionsQuery};
pub use rows::JsonRowsProvider;
