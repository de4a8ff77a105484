//! Policy adapter.
//!
//! Policies are the one registry kind with relationships: a policy
//! propagated into a managed namespace carries labels naming its parent
//! policy and parent namespace. `build_node` copies those hints onto
//! the node; `build_edges` resolves them against the store into real
//! edges, skipping any parent that is not (yet) known.

use topograph_core::{Edge, EdgeType, Node, NodeStore};

use crate::resources::Policy;
use crate::transform::{common_node, Transform};

/// Metadata labels carrying parent relationship hints.
const PARENT_POLICY_LABEL: &str = "parent-policy";
const PARENT_NAMESPACE_LABEL: &str = "parent-namespace";

impl Transform for Policy {
    fn build_node(&self) -> Node {
        let mut node = common_node("Policy", &self.api_version, &self.metadata);
        if let Some(action) = &self.spec.remediation_action {
            node.set("remediationAction", action.as_str());
        }
        if let Some(state) = &self.status.compliance_state {
            node.set("compliant", state.as_str());
        }
        node.set("valid", self.status.valid);

        // Aggregate rule count across all non-null role templates.
        let rules: i64 = self
            .spec
            .role_templates
            .iter()
            .flatten()
            .map(|template| template.rules.len() as i64)
            .sum();
        node.set("numRules", rules);

        for label in [PARENT_NAMESPACE_LABEL, PARENT_POLICY_LABEL] {
            if let Some(value) = self.metadata.labels.get(label) {
                node.set(label, value.as_str());
            }
        }
        node
    }

    fn build_edges(&self, store: &dyn NodeStore) -> Vec<Edge> {
        let mut edges = Vec::new();
        let hints = [
            (PARENT_POLICY_LABEL, EdgeType::ParentPolicy),
            (PARENT_NAMESPACE_LABEL, EdgeType::ParentNamespace),
        ];

        for (label, edge_type) in hints {
            let Some(parent) = self.metadata.labels.get(label) else {
                continue;
            };
            match store.find_by_property("name", parent) {
                Some(target) => edges.push(Edge {
                    source_uid: self.metadata.uid.clone(),
                    target_uid: target.uid,
                    edge_type,
                }),
                None => tracing::debug!(
                    policy = %self.metadata.name,
                    parent = %parent,
                    label,
                    "Parent not in store; edge omitted"
                ),
            }
        }
        edges
    }
}
