//! # Resource Edges
//!
//! A generic directed-edge store used as the single persistence substrate for
//! holder → resource grants, instead of one table per resource type.
//!
//! ## Overview
//!
//! - **Edge**: `(namespace, source_id, target_id, relation)` with an id
//! - **EdgeStore**: async contract implemented by storage backends
//! - **MemoryEdgeStore**: in-memory backend for single-process use and tests
//!
//! ## Features
//!
//! - `memory` (default): in-memory edge store
//!
//! ## Usage
//!
//! ```rust,no_run
//! use resource_edges::{Edge, EdgeStore, MemoryEdgeStore};
//!
//! async fn example() {
//!     let store = MemoryEdgeStore::new();
//!     store
//!         .add(Edge::new("RESOURCE", "application:a1", "user:u1", "owner"))
//!         .await
//!         .unwrap();
//!
//!     let sources = vec!["application:a1".to_string(), "application:a2".to_string()];
//!     let edges = store.get_by_source_ids("RESOURCE", &sources).await.unwrap();
//!     assert_eq!(edges.len(), 1);
//! }
//! ```
//!
//! ## Uniqueness
//!
//! `(namespace, source_id, target_id)` is unique. Adding an edge for endpoints
//! that are already connected replaces the relation in place.

pub mod store;
pub mod types;

// Re-export main types
pub use store::{EdgeStore, EdgeStoreError, EdgeStoreResult, EdgeStoreStats, MemoryEdgeStore};
pub use types::Edge;
