//! Edge store implementation
//!
//! This module provides the edge store abstraction consumed by the permission
//! engine and an in-memory implementation for single-process use and tests.

use crate::types::Edge;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Edge store error types.
#[derive(Debug, Error)]
pub enum EdgeStoreError {
    /// Backend unavailable or failed
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for edge store operations.
pub type EdgeStoreResult<T> = Result<T, EdgeStoreError>;

/// Edge store trait for namespaced directed edges.
///
/// Expected outcomes such as "nothing to remove" are reported as `false`;
/// errors are reserved for backend failures.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// Insert an edge, or replace the relation of the edge already
    /// connecting the same endpoints (keeping its id).
    ///
    /// Returns `true` once the relation is in place.
    async fn add(&self, edge: Edge) -> EdgeStoreResult<bool>;

    /// Apply several edges with [`EdgeStore::add`] semantics.
    ///
    /// Returns the number of edges applied. Edges are not applied atomically.
    async fn batch_add(&self, edges: Vec<Edge>) -> EdgeStoreResult<usize>;

    /// Remove an edge by id.
    async fn remove_by_id(&self, id: &str) -> EdgeStoreResult<bool>;

    /// Remove the edge connecting the given endpoints.
    async fn remove_by_endpoints(
        &self,
        namespace: &str,
        source_id: &str,
        target_id: &str,
    ) -> EdgeStoreResult<bool>;

    /// Get all edges leaving a source, in storage order.
    async fn get_by_source_id(&self, namespace: &str, source_id: &str)
        -> EdgeStoreResult<Vec<Edge>>;

    /// Get all edges leaving any of the sources in a single round trip.
    async fn get_by_source_ids(
        &self,
        namespace: &str,
        source_ids: &[String],
    ) -> EdgeStoreResult<Vec<Edge>>;

    /// Get the edge connecting the given endpoints.
    async fn get_by_endpoints(
        &self,
        namespace: &str,
        source_id: &str,
        target_id: &str,
    ) -> EdgeStoreResult<Option<Edge>>;

    /// Get an edge by id.
    async fn get_by_id(&self, id: &str) -> EdgeStoreResult<Option<Edge>>;

    /// Replace the relation of an edge.
    async fn update_by_id(&self, id: &str, relation: &str) -> EdgeStoreResult<bool>;

    /// Get store statistics.
    async fn stats(&self) -> EdgeStoreStats;
}

/// Edge store statistics.
#[derive(Debug, Clone, Default)]
pub struct EdgeStoreStats {
    /// Read round trips served
    pub reads: u64,
    /// Write round trips served
    pub writes: u64,
    /// Edges currently stored
    pub edges: usize,
}

/// In-memory edge store implementation.
///
/// Edges are kept in insertion order, which is the order lookups return them
/// in. Failure injection lets callers exercise how they react to a backend
/// outage.
pub struct MemoryEdgeStore {
    /// Stored edges
    edges: Arc<RwLock<Vec<Edge>>>,
    /// Statistics
    stats: Arc<RwLock<EdgeStoreStats>>,
    /// Fail every read with a backend error
    fail_reads: AtomicBool,
    /// Fail every write with a backend error
    fail_writes: AtomicBool,
}

impl std::fmt::Debug for MemoryEdgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEdgeStore")
            .field("fail_reads", &self.fail_reads.load(Ordering::Relaxed))
            .field("fail_writes", &self.fail_writes.load(Ordering::Relaxed))
            .finish()
    }
}

impl MemoryEdgeStore {
    /// Create a new, empty in-memory edge store.
    pub fn new() -> Self {
        Self {
            edges: Arc::new(RwLock::new(Vec::new())),
            stats: Arc::new(RwLock::new(EdgeStoreStats::default())),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    async fn begin_read(&self) -> EdgeStoreResult<()> {
        self.stats.write().await.reads += 1;
        if self.fail_reads.load(Ordering::Relaxed) {
            tracing::warn!("Injected edge store read failure");
            return Err(EdgeStoreError::Backend("edge store unavailable".to_string()));
        }
        Ok(())
    }

    async fn begin_write(&self) -> EdgeStoreResult<()> {
        self.stats.write().await.writes += 1;
        if self.fail_writes.load(Ordering::Relaxed) {
            tracing::warn!("Injected edge store write failure");
            return Err(EdgeStoreError::Backend("edge store unavailable".to_string()));
        }
        Ok(())
    }

    fn upsert(edges: &mut Vec<Edge>, edge: Edge) {
        let position = edges
            .iter()
            .position(|e| e.connects(&edge.namespace, &edge.source_id, &edge.target_id));
        match position {
            Some(idx) => {
                edges[idx].relation = edge.relation;
                edges[idx].updated_at = Utc::now();
            }
            None => edges.push(edge),
        }
    }
}

impl Default for MemoryEdgeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EdgeStore for MemoryEdgeStore {
    async fn add(&self, edge: Edge) -> EdgeStoreResult<bool> {
        self.begin_write().await?;
        let mut edges = self.edges.write().await;
        Self::upsert(&mut edges, edge);
        Ok(true)
    }

    async fn batch_add(&self, new_edges: Vec<Edge>) -> EdgeStoreResult<usize> {
        self.begin_write().await?;
        let count = new_edges.len();
        let mut edges = self.edges.write().await;
        for edge in new_edges {
            Self::upsert(&mut edges, edge);
        }
        tracing::debug!(count, total = edges.len(), "Applied edge batch");
        Ok(count)
    }

    async fn remove_by_id(&self, id: &str) -> EdgeStoreResult<bool> {
        self.begin_write().await?;
        let mut edges = self.edges.write().await;
        let before = edges.len();
        edges.retain(|e| e.id != id);
        Ok(edges.len() != before)
    }

    async fn remove_by_endpoints(
        &self,
        namespace: &str,
        source_id: &str,
        target_id: &str,
    ) -> EdgeStoreResult<bool> {
        self.begin_write().await?;
        let mut edges = self.edges.write().await;
        let before = edges.len();
        edges.retain(|e| !e.connects(namespace, source_id, target_id));
        Ok(edges.len() != before)
    }

    async fn get_by_source_id(
        &self,
        namespace: &str,
        source_id: &str,
    ) -> EdgeStoreResult<Vec<Edge>> {
        self.begin_read().await?;
        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .filter(|e| e.namespace == namespace && e.source_id == source_id)
            .cloned()
            .collect())
    }

    async fn get_by_source_ids(
        &self,
        namespace: &str,
        source_ids: &[String],
    ) -> EdgeStoreResult<Vec<Edge>> {
        self.begin_read().await?;
        let wanted: HashSet<&str> = source_ids.iter().map(String::as_str).collect();
        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .filter(|e| e.namespace == namespace && wanted.contains(e.source_id.as_str()))
            .cloned()
            .collect())
    }

    async fn get_by_endpoints(
        &self,
        namespace: &str,
        source_id: &str,
        target_id: &str,
    ) -> EdgeStoreResult<Option<Edge>> {
        self.begin_read().await?;
        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .find(|e| e.connects(namespace, source_id, target_id))
            .cloned())
    }

    async fn get_by_id(&self, id: &str) -> EdgeStoreResult<Option<Edge>> {
        self.begin_read().await?;
        let edges = self.edges.read().await;
        Ok(edges.iter().find(|e| e.id == id).cloned())
    }

    async fn update_by_id(&self, id: &str, relation: &str) -> EdgeStoreResult<bool> {
        self.begin_write().await?;
        let mut edges = self.edges.write().await;
        match edges.iter_mut().find(|e| e.id == id) {
            Some(edge) => {
                edge.relation = relation.to_string();
                edge.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn stats(&self) -> EdgeStoreStats {
        let mut stats = self.stats.read().await.clone();
        stats.edges = self.edges.read().await.len();
        stats
    }
}

// ============================================================================
// Tests
// ============================================================================
