//! Entity loaders
//!
//! A loader owns one entity collection for one scope key and refetches it
//! whenever the key changes.
//!
//! # State machine
//!
//! ```text
//!   Idle ──bind(key)──▶ Loading ──ok──▶ Ready
//!                          │  ▲
//!                          │  └──bind(new key) / refresh()
//!                          └──err──▶ Failed
//! ```
//!
//! # Invariants
//!
//! - Every dispatch bumps a generation counter; a settlement whose generation
//!   is no longer current is discarded (stale response) and never observed
//! - A failure keeps the last known data (and its `data_key`)
//! - An empty or blank key is ignored: no request, no state change
//! - State is published through a `watch` channel after every transition

use crate::config::LoaderConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::provider::DataProvider;
use crate::query::{
    AccountsQuery, CategoriesQuery, DelegationsQuery, EntityQuery, TransactionsQuery,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

/// Loader over delegations of an organization
pub type DelegationsLoader = EntityLoader<DelegationsQuery>;
/// Loader over accounts of a delegation
pub type AccountsLoader = EntityLoader<AccountsQuery>;
/// Loader over categories of an organization
pub type CategoriesLoader = EntityLoader<CategoriesQuery>;
/// Loader over transactions of a delegation
pub type TransactionsLoader = EntityLoader<TransactionsQuery>;

/// Lifecycle of a loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No key bound yet
    Idle,
    /// Request in flight for the current key
    Loading,
    /// Data loaded for the current key
    Ready,
    /// Last request for the current key failed
    Failed,
}

/// Consumer view of a loader
#[derive(Debug, Clone, PartialEq)]
pub struct LoadState<K, T> {
    /// Lifecycle status
    pub status: LoadStatus,

    /// Key most recently bound
    pub key: Option<K>,

    /// Last successfully loaded collection
    pub data: Vec<T>,

    /// Key `data` was loaded for
    pub data_key: Option<K>,

    /// Message of the last failure for the current key
    pub error: Option<String>,
}

impl<K, T> LoadState<K, T> {
    fn idle() -> Self {
        Self {
            status: LoadStatus::Idle,
            key: None,
            data: Vec::new(),
            data_key: None,
            error: None,
        }
    }

    /// Request in flight
    pub fn loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Settled successfully for the current key
    pub fn is_ready(&self) -> bool {
        self.status == LoadStatus::Ready
    }

    /// Settled with an error for the current key
    pub fn is_failed(&self) -> bool {
        self.status == LoadStatus::Failed
    }
}

struct Control {
    generation: u64,
    in_flight: Option<AbortHandle>,
}

struct Shared<Q: EntityQuery> {
    control: Mutex<Control>,
    state: watch::Sender<LoadState<Q::Key, Q::Item>>,
}

impl<Q: EntityQuery> Shared<Q> {
    fn settle(&self, generation: u64, key: Q::Key, result: ProviderResult<Vec<Q::Item>>) {
        let mut control = self.control.lock();
        if control.generation != generation {
            debug!(
                "Discarding stale {} response for {:?} (generation {} < {})",
                Q::ENTITY,
                key,
                generation,
                control.generation
            );
            return;
        }
        control.in_flight = None;

        match result {
            Ok(mut items) => {
                Q::post_process(&mut items);
                info!("Loaded {} {} for {:?}", items.len(), Q::ENTITY, key);
                self.state.send_modify(|state| {
                    state.status = LoadStatus::Ready;
                    state.data = items;
                    state.data_key = Some(key);
                    state.error = None;
                });
            }
            Err(err) => {
                let message = error_message(Q::ENTITY, &err);
                warn!("Failed to load {} for {:?}: {}", Q::ENTITY, key, message);
                self.state.send_modify(|state| {
                    state.status = LoadStatus::Failed;
                    state.error = Some(message);
                });
            }
        }
    }
}

/// Message surfaced to consumers: the error text, or a generic fallback
fn error_message(entity: &str, err: &ProviderError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        format!("failed to load {}", entity)
    } else {
        message
    }
}

/// Loads one entity collection for an externally supplied scope key.
///
/// Requires a Tokio runtime: requests are spawned as tasks.
pub struct EntityLoader<Q: EntityQuery> {
    provider: Arc<dyn DataProvider>,
    shared: Arc<Shared<Q>>,
    abort_superseded: bool,
}

impl<Q: EntityQuery> EntityLoader<Q> {
    /// Loader with default configuration
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self::with_config(provider, &LoaderConfig::default())
    }

    /// Loader with explicit configuration
    pub fn with_config(provider: Arc<dyn DataProvider>, config: &LoaderConfig) -> Self {
        let (state, _) = watch::channel(LoadState::idle());
        Self {
            provider,
            shared: Arc::new(Shared {
                control: Mutex::new(Control {
                    generation: 0,
                    in_flight: None,
                }),
                state,
            }),
            abort_superseded: config.abort_superseded,
        }
    }

    /// Bind the loader to `key`.
    ///
    /// Returns the spawned request, or `None` when nothing was dispatched
    /// (empty key, or the key is already bound).
    pub fn bind(&self, key: impl Into<Q::Key>) -> Option<JoinHandle<()>> {
        let key = key.into();
        if key.as_ref().is_empty() {
            debug!("Ignoring empty {} key", Q::ENTITY);
            return None;
        }

        let mut control = self.shared.control.lock();
        if self.shared.state.borrow().key.as_ref() == Some(&key) {
            return None;
        }
        Some(self.dispatch(&mut control, key))
    }

    /// Refetch for the currently bound key
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        let mut control = self.shared.control.lock();
        let key = self.shared.state.borrow().key.clone()?;
        Some(self.dispatch(&mut control, key))
    }

    fn dispatch(&self, control: &mut Control, key: Q::Key) -> JoinHandle<()> {
        control.generation += 1;
        let generation = control.generation;

        if let Some(previous) = control.in_flight.take() {
            if self.abort_superseded {
                debug!("Aborting superseded {} request", Q::ENTITY);
                previous.abort();
            }
        }

        self.shared.state.send_modify(|state| {
            state.status = LoadStatus::Loading;
            state.key = Some(key.clone());
            state.error = None;
        });
        debug!("Loading {} for {:?} (generation {})", Q::ENTITY, key, generation);

        let shared = Arc::clone(&self.shared);
        let provider = Arc::clone(&self.provider);
        let handle = tokio::spawn(async move {
            let result = Q::fetch(provider, key.clone()).await;
            shared.settle(generation, key, result);
        });
        control.in_flight = Some(handle.abort_handle());
        handle
    }

    /// Current state
    pub fn snapshot(&self) -> LoadState<Q::Key, Q::Item> {
        self.shared.state.borrow().clone()
    }

    /// Receiver notified on every state transition
    pub fn watch(&self) -> watch::Receiver<LoadState<Q::Key, Q::Item>> {
        self.shared.state.subscribe()
    }

    /// Last successfully loaded collection
    pub fn data(&self) -> Vec<Q::Item> {
        self.shared.state.borrow().data.clone()
    }

    /// Request in flight
    pub fn loading(&self) -> bool {
        self.shared.state.borrow().loading()
    }

    /// Last failure message for the current key
    pub fn error(&self) -> Option<String> {
        self.shared.state.borrow().error.clone()
    }
}

impl<Q: EntityQuery> Drop for EntityLoader<Q> {
    fn drop(&mut self) {
        let mut control = self.shared.control.lock();
        // Pending settlements become stale
        control.generation += 1;
        if let Some(in_flight) = control.in_flight.take() {
            if self.abort_superseded {
                in_flight.abort();
            }
        }
    }
}

impl<Q: EntityQuery> fmt::Debug for EntityLoader<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("EntityLoader")
            .field("entity", &Q::ENTITY)
            .field("status", &state.status)
            .field("key", &state.key)
            .field("items", &state.data.len())
            .finish()
    }
}
