//! Application state for the REST API.
//!
//! Shared state available to all request handlers: the primary store, the
//! search index, the mirror synchronizer pairing them, and the server
//! configuration.

use std::sync::Arc;

use scifun_persistence::index::SearchIndex;
use scifun_persistence::store::DocumentStore;
use scifun_persistence::sync::MirrorSync;

use crate::config::ServerConfig;

/// Shared application state.
///
/// # Type Parameters
///
/// * `S` - the primary store (must implement [`DocumentStore`])
/// * `I` - the search index (must implement [`SearchIndex`])
pub struct AppState<S, I> {
    store: Arc<S>,
    index: Arc<I>,
    sync: MirrorSync<S, I>,
    config: Arc<ServerConfig>,
}

// Manual Clone since S and I live behind Arcs and need not be Clone
impl<S, I> Clone for AppState<S, I> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
            sync: self.sync.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: DocumentStore, I: SearchIndex> AppState<S, I> {
    /// Creates state from a store/index pair and configuration.
    pub fn new(store: Arc<S>, index: Arc<I>, config: ServerConfig) -> Self {
        let sync = MirrorSync::new(Arc::clone(&store), Arc::clone(&index));
        Self {
            store,
            index,
            sync,
            config: Arc::new(config),
        }
    }

    /// The primary store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The search index.
    pub fn index(&self) -> &I {
        &self.index
    }

    /// The mirror synchronizer.
    pub fn sync(&self) -> &MirrorSync<S, I> {
        &self.sync
    }

    /// Server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
