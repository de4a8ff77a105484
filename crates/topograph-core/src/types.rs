//! Core graph entity types for the topograph collector.
//!
//! These types are the wire contract between the transformation pipeline
//! and whatever graph database the aggregator loads. They carry no
//! behavior beyond construction and property access.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Nodes ─────────────────────────────────────────────────────────

/// A generic graph vertex derived from one cluster resource.
///
/// `uid` is the source resource's unique identifier and stays stable
/// across updates to the same resource. Properties always carry the
/// identity baseline (`kind`, `apigroup`, `version`) plus whatever the
/// resource's adapter contributed. A node is built once during
/// transformation and never mutated after it leaves the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uid: String,
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Set one property. Later writes to the same key win.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.properties.insert(key.to_string(), value.into());
    }

    /// Read a property back as a string slice, if present and a string.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

// ── Edges ─────────────────────────────────────────────────────────

/// A relationship between two nodes, identified by their UIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source_uid: String,
    pub target_uid: String,
    pub edge_type: EdgeType,
}

/// The type of relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    ParentPolicy,
    ParentNamespace,
}

// ── Operations ────────────────────────────────────────────────────

/// Lifecycle tag applied to a graph mutation.
///
/// The pipeline emits bare nodes; the aggregator pairs each node with
/// the operation it derives from the watch event type and applies the
/// mutation to the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
}
