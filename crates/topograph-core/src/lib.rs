//! topograph-core: Shared graph entity types for the topograph collector.
//!
//! This crate provides the data contracts between the transformation
//! pipeline and the downstream graph aggregator:
//! - `Node` and `Edge` values describing the cluster topology graph
//! - `Operation` tags (Create/Update/Delete) for graph mutations
//! - The `NodeStore` lookup trait used to resolve edge targets

pub mod store;
pub mod types;

pub use store::{MemoryNodeStore, NodeStore};
pub use types::{Edge, EdgeType, Node, Operation};
