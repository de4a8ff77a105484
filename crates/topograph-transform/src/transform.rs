//! The transformation contract and per-kind adapters.
//!
//! Every adapter starts from the common baseline (identity fields plus
//! universally present metadata) and layers its kind's properties on
//! top, so every emitted node has a minimum common shape regardless of
//! kind. Optional fields absent from the resource are omitted from the
//! property map, never inserted as null.

use topograph_core::{Edge, Node, NodeStore};

use crate::error::{Result, TransformError};
use crate::resources::{
    ClusterNode, ConfigMap, CronJob, DaemonSet, Deployment, GenericResource, Job, Namespace,
    ObjectMeta, PersistentVolume, Pod, ReplicaSet, Resource, Secret, Service, StatefulSet,
    Unstructured,
};

// ── Contract ──────────────────────────────────────────────────────

/// The capability set a resource adapter implements to plug into the
/// pipeline.
pub trait Transform {
    /// Build this resource's graph node. Deterministic and side-effect
    /// free aside from logging; starts from the common baseline.
    fn build_node(&self) -> Node;

    /// Build this resource's relationships, resolving targets through
    /// `store`. An unresolvable target means the edge is omitted; this
    /// never fails.
    fn build_edges(&self, store: &dyn NodeStore) -> Vec<Edge> {
        let _ = store;
        Vec::new()
    }
}

// ── Common baseline ───────────────────────────────────────────────

/// Split an `apiVersion` string into (group, version). The core API
/// group has no group segment.
pub(crate) fn api_group_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Build the baseline node every adapter starts from.
pub(crate) fn common_node(kind: &str, api_version: &str, meta: &ObjectMeta) -> Node {
    let (group, version) = api_group_version(api_version);
    let mut node = Node::new(&meta.uid);
    node.set("kind", kind);
    node.set("apigroup", group);
    node.set("version", version);
    node.set("name", meta.name.as_str());
    if let Some(namespace) = &meta.namespace {
        node.set("namespace", namespace.as_str());
    }
    if let Some(created) = &meta.creation_timestamp {
        node.set("created", created.to_rfc3339());
    }
    if !meta.labels.is_empty() {
        node.set(
            "labels",
            serde_json::to_value(&meta.labels).unwrap_or_default(),
        );
    }
    node
}

// ── Config and storage kinds ──────────────────────────────────────

impl Transform for ConfigMap {
    fn build_node(&self) -> Node {
        common_node("ConfigMap", &self.api_version, &self.metadata)
    }
}

impl Transform for Secret {
    fn build_node(&self) -> Node {
        let mut node = common_node("Secret", &self.api_version, &self.metadata);
        if let Some(secret_type) = &self.secret_type {
            node.set("type", secret_type.as_str());
        }
        node
    }
}

impl Transform for PersistentVolume {
    fn build_node(&self) -> Node {
        let mut node = common_node("PersistentVolume", &self.api_version, &self.metadata);
        if let Some(storage) = self.spec.capacity.get("storage") {
            node.set("capacity", storage.as_str());
        }
        if let Some(policy) = &self.spec.persistent_volume_reclaim_policy {
            node.set("reclaimPolicy", policy.as_str());
        }
        if let Some(phase) = &self.status.phase {
            node.set("status", phase.as_str());
        }
        if let Some(class) = &self.spec.storage_class_name {
            node.set("storageClassName", class.as_str());
        }
        node
    }
}

// ── Workload kinds ────────────────────────────────────────────────

impl Transform for CronJob {
    fn build_node(&self) -> Node {
        let mut node = common_node("CronJob", &self.api_version, &self.metadata);
        node.set("schedule", self.spec.schedule.as_str());
        if let Some(suspend) = self.spec.suspend {
            node.set("suspend", suspend);
        }
        node.set("active", self.status.active.len() as i64);
        if let Some(last) = &self.status.last_schedule_time {
            node.set("lastSchedule", last.to_rfc3339());
        }
        node
    }
}

impl Transform for DaemonSet {
    fn build_node(&self) -> Node {
        let mut node = common_node("DaemonSet", &self.api_version, &self.metadata);
        node.set("available", self.status.number_available);
        node.set("current", self.status.current_number_scheduled);
        node.set("desired", self.status.desired_number_scheduled);
        node.set("ready", self.status.number_ready);
        node.set("updated", self.status.updated_number_scheduled);
        node
    }
}

impl Transform for Deployment {
    fn build_node(&self) -> Node {
        let mut node = common_node("Deployment", &self.api_version, &self.metadata);
        node.set("available", self.status.available_replicas);
        node.set("current", self.status.replicas);
        node.set("ready", self.status.ready_replicas);
        if let Some(desired) = self.spec.replicas {
            node.set("desired", desired);
        }
        node
    }
}

impl Transform for Job {
    fn build_node(&self) -> Node {
        let mut node = common_node("Job", &self.api_version, &self.metadata);
        node.set("successful", self.status.succeeded);
        if let Some(completions) = self.spec.completions {
            node.set("completions", completions);
        }
        if let Some(parallelism) = self.spec.parallelism {
            node.set("parallelism", parallelism);
        }
        node
    }
}

impl Transform for Pod {
    fn build_node(&self) -> Node {
        let mut node = common_node("Pod", &self.api_version, &self.metadata);
        if let Some(host_ip) = &self.status.host_ip {
            node.set("hostIP", host_ip.as_str());
        }
        if let Some(pod_ip) = &self.status.pod_ip {
            node.set("podIP", pod_ip.as_str());
        }
        let restarts: i64 = self
            .status
            .container_statuses
            .iter()
            .map(|c| c.restart_count)
            .sum();
        node.set("restarts", restarts);
        if let Some(started) = &self.status.start_time {
            node.set("startedAt", started.to_rfc3339());
        }
        if let Some(phase) = &self.status.phase {
            node.set("status", phase.as_str());
        }
        node
    }
}

impl Transform for ReplicaSet {
    fn build_node(&self) -> Node {
        let mut node = common_node("ReplicaSet", &self.api_version, &self.metadata);
        node.set("current", self.status.replicas);
        if let Some(desired) = self.spec.replicas {
            node.set("desired", desired);
        }
        node
    }
}

impl Transform for StatefulSet {
    fn build_node(&self) -> Node {
        let mut node = common_node("StatefulSet", &self.api_version, &self.metadata);
        node.set("current", self.status.replicas);
        if let Some(desired) = self.spec.replicas {
            node.set("desired", desired);
        }
        node
    }
}

// ── Cluster-scoped kinds ──────────────────────────────────────────

impl Transform for Namespace {
    fn build_node(&self) -> Node {
        let mut node = common_node("Namespace", &self.api_version, &self.metadata);
        if let Some(phase) = &self.status.phase {
            node.set("status", phase.as_str());
        }
        node
    }
}

impl Transform for ClusterNode {
    fn build_node(&self) -> Node {
        let mut node = common_node("Node", &self.api_version, &self.metadata);
        if let Some(arch) = &self.status.node_info.architecture {
            node.set("architecture", arch.as_str());
        }
        if let Some(cpu) = self.status.capacity.get("cpu") {
            node.set("cpu", cpu.as_str());
        }
        if let Some(os_image) = &self.status.node_info.os_image {
            node.set("osImage", os_image.as_str());
        }
        node
    }
}

impl Transform for Service {
    fn build_node(&self) -> Node {
        let mut node = common_node("Service", &self.api_version, &self.metadata);
        if let Some(cluster_ip) = &self.spec.cluster_ip {
            node.set("clusterIP", cluster_ip.as_str());
        }
        if let Some(service_type) = &self.spec.service_type {
            node.set("type", service_type.as_str());
        }
        node
    }
}

// ── Fallback and dispatch ─────────────────────────────────────────

impl Transform for GenericResource {
    fn build_node(&self) -> Node {
        common_node(&self.kind, &self.api_version, &self.metadata)
    }
}

impl Transform for Resource {
    fn build_node(&self) -> Node {
        match self {
            Resource::ConfigMap(r) => r.build_node(),
            Resource::CronJob(r) => r.build_node(),
            Resource::DaemonSet(r) => r.build_node(),
            Resource::Deployment(r) => r.build_node(),
            Resource::Job(r) => r.build_node(),
            Resource::Namespace(r) => r.build_node(),
            Resource::Node(r) => r.build_node(),
            Resource::PersistentVolume(r) => r.build_node(),
            Resource::Pod(r) => r.build_node(),
            Resource::ReplicaSet(r) => r.build_node(),
            Resource::Secret(r) => r.build_node(),
            Resource::Service(r) => r.build_node(),
            Resource::StatefulSet(r) => r.build_node(),
            Resource::Policy(r) => r.build_node(),
            Resource::Generic(r) => r.build_node(),
        }
    }

    fn build_edges(&self, store: &dyn NodeStore) -> Vec<Edge> {
        match self {
            Resource::Policy(r) => r.build_edges(store),
            _ => Vec::new(),
        }
    }
}

// ── Dynamic objects ───────────────────────────────────────────────

/// Transform a dynamic object using only universally present metadata.
///
/// Fails only when the object carries no usable `metadata.uid`; without
/// a stable identifier the node cannot participate in the graph.
pub fn transform_unstructured(obj: &Unstructured) -> Result<Node> {
    let meta: ObjectMeta = match obj.content().get("metadata") {
        Some(metadata) => serde_json::from_value(metadata.clone())?,
        None => ObjectMeta::default(),
    };
    if meta.uid.is_empty() {
        return Err(TransformError::MissingUid {
            kind: obj.kind().to_string(),
        });
    }
    Ok(common_node(obj.kind(), obj.api_version(), &meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Property keys the common baseline may contribute.
    const BASELINE_KEYS: [&str; 7] = [
        "kind",
        "apigroup",
        "version",
        "name",
        "namespace",
        "created",
        "labels",
    ];

    fn parse(value: serde_json::Value) -> Resource {
        Resource::parse(value).unwrap()
    }

    #[test]
    fn api_group_version_split() {
        assert_eq!(api_group_version("apps/v1"), ("apps", "v1"));
        assert_eq!(api_group_version("v1"), ("", "v1"));
        assert_eq!(
            api_group_version("policy.open-cluster-management.io/v1alpha1"),
            ("policy.open-cluster-management.io", "v1alpha1")
        );
    }

    #[test]
    fn common_baseline_fields() {
        let node = parse(json!({
            "kind": "Deployment",
            "apiVersion": "apps/v1",
            "metadata": {
                "name": "api",
                "namespace": "prod",
                "uid": "dep-uid",
                "creationTimestamp": "2024-03-01T12:00:00Z",
                "labels": {"app": "api"}
            }
        }))
        .build_node();

        assert_eq!(node.uid, "dep-uid");
        assert_eq!(node.property_str("kind"), Some("Deployment"));
        assert_eq!(node.property_str("apigroup"), Some("apps"));
        assert_eq!(node.property_str("version"), Some("v1"));
        assert_eq!(node.property_str("name"), Some("api"));
        assert_eq!(node.property_str("namespace"), Some("prod"));
        assert_eq!(
            node.property_str("created"),
            Some("2024-03-01T12:00:00+00:00")
        );
        assert_eq!(node.properties["labels"], json!({"app": "api"}));
    }

    #[test]
    fn optional_baseline_fields_are_absent_not_null() {
        let node = parse(json!({
            "kind": "Namespace",
            "apiVersion": "v1",
            "metadata": {"name": "prod", "uid": "ns-uid"}
        }))
        .build_node();

        assert!(!node.properties.contains_key("namespace"));
        assert!(!node.properties.contains_key("created"));
        assert!(!node.properties.contains_key("labels"));
    }

    #[test]
    fn every_registry_kind_gets_the_baseline() {
        for kind in Resource::KINDS {
            let node = parse(json!({
                "kind": kind,
                "apiVersion": "v1",
                "metadata": {"name": "minimal", "uid": format!("uid-{kind}")}
            }))
            .build_node();

            assert_eq!(node.uid, format!("uid-{kind}"), "uid for {kind}");
            assert_eq!(node.property_str("kind"), Some(kind));
            assert_eq!(node.property_str("apigroup"), Some(""));
            assert_eq!(node.property_str("version"), Some("v1"));
            assert_eq!(node.property_str("name"), Some("minimal"));
        }
    }

    #[test]
    fn configmap_is_baseline_only() {
        let node = parse(json!({
            "kind": "ConfigMap",
            "apiVersion": "v1",
            "metadata": {"name": "settings", "namespace": "prod", "uid": "cm-uid"}
        }))
        .build_node();

        assert!(node
            .properties
            .keys()
            .all(|k| BASELINE_KEYS.contains(&k.as_str())));
    }

    #[test]
    fn cronjob_fields() {
        let node = parse(json!({
            "kind": "CronJob",
            "apiVersion": "batch/v1beta1",
            "metadata": {"name": "backup", "namespace": "ops", "uid": "cj-uid"},
            "spec": {"schedule": "0 3 * * *", "suspend": false},
            "status": {
                "active": [{"name": "backup-1"}, {"name": "backup-2"}],
                "lastScheduleTime": "2024-03-01T03:00:00Z"
            }
        }))
        .build_node();

        assert_eq!(node.property_str("schedule"), Some("0 3 * * *"));
        assert_eq!(node.properties["suspend"], json!(false));
        assert_eq!(node.properties["active"], json!(2));
        assert_eq!(
            node.property_str("lastSchedule"),
            Some("2024-03-01T03:00:00+00:00")
        );
    }

    #[test]
    fn cronjob_optional_fields_omitted() {
        let node = parse(json!({
            "kind": "CronJob",
            "apiVersion": "batch/v1beta1",
            "metadata": {"name": "backup", "uid": "cj-uid"},
            "spec": {"schedule": "@hourly"}
        }))
        .build_node();

        assert!(!node.properties.contains_key("suspend"));
        assert!(!node.properties.contains_key("lastSchedule"));
        assert_eq!(node.properties["active"], json!(0));
    }

    #[test]
    fn daemonset_fields() {
        let node = parse(json!({
            "kind": "DaemonSet",
            "apiVersion": "apps/v1",
            "metadata": {"name": "log-agent", "namespace": "kube-system", "uid": "ds-uid"},
            "status": {
                "desiredNumberScheduled": 5,
                "currentNumberScheduled": 5,
                "numberReady": 4,
                "updatedNumberScheduled": 3,
                "numberAvailable": 4
            }
        }))
        .build_node();

        assert_eq!(node.properties["available"], json!(4));
        assert_eq!(node.properties["current"], json!(5));
        assert_eq!(node.properties["desired"], json!(5));
        assert_eq!(node.properties["ready"], json!(4));
        assert_eq!(node.properties["updated"], json!(3));
    }

    #[test]
    fn deployment_fields() {
        let node = parse(json!({
            "kind": "Deployment",
            "apiVersion": "apps/v1",
            "metadata": {"name": "api", "namespace": "prod", "uid": "dep-uid"},
            "spec": {"replicas": 3},
            "status": {"replicas": 3, "availableReplicas": 2, "readyReplicas": 2}
        }))
        .build_node();

        assert_eq!(node.properties["available"], json!(2));
        assert_eq!(node.properties["current"], json!(3));
        assert_eq!(node.properties["desired"], json!(3));
        assert_eq!(node.properties["ready"], json!(2));
    }

    #[test]
    fn job_fields() {
        let node = parse(json!({
            "kind": "Job",
            "apiVersion": "batch/v1",
            "metadata": {"name": "migrate", "namespace": "prod", "uid": "job-uid"},
            "spec": {"completions": 1, "parallelism": 1},
            "status": {"succeeded": 1}
        }))
        .build_node();

        assert_eq!(node.properties["successful"], json!(1));
        assert_eq!(node.properties["completions"], json!(1));
        assert_eq!(node.properties["parallelism"], json!(1));
    }

    #[test]
    fn cluster_node_fields() {
        let node = parse(json!({
            "kind": "Node",
            "apiVersion": "v1",
            "metadata": {"name": "worker-1", "uid": "node-uid"},
            "status": {
                "capacity": {"cpu": "8", "memory": "32Gi"},
                "nodeInfo": {"architecture": "amd64", "osImage": "Ubuntu 22.04.4 LTS"}
            }
        }))
        .build_node();

        assert_eq!(node.property_str("architecture"), Some("amd64"));
        assert_eq!(node.property_str("cpu"), Some("8"));
        assert_eq!(node.property_str("osImage"), Some("Ubuntu 22.04.4 LTS"));
    }

    #[test]
    fn persistent_volume_fields() {
        let node = parse(json!({
            "kind": "PersistentVolume",
            "apiVersion": "v1",
            "metadata": {"name": "pv-data", "uid": "pv-uid"},
            "spec": {
                "capacity": {"storage": "100Gi"},
                "persistentVolumeReclaimPolicy": "Retain",
                "storageClassName": "fast"
            },
            "status": {"phase": "Bound"}
        }))
        .build_node();

        assert_eq!(node.property_str("capacity"), Some("100Gi"));
        assert_eq!(node.property_str("reclaimPolicy"), Some("Retain"));
        assert_eq!(node.property_str("status"), Some("Bound"));
        assert_eq!(node.property_str("storageClassName"), Some("fast"));
    }

    #[test]
    fn pod_fields_and_restart_sum() {
        let node = parse(json!({
            "kind": "Pod",
            "apiVersion": "v1",
            "metadata": {"name": "web-0", "namespace": "prod", "uid": "pod-uid"},
            "status": {
                "phase": "Running",
                "hostIP": "10.0.1.5",
                "podIP": "172.16.0.9",
                "startTime": "2024-03-01T12:00:00Z",
                "containerStatuses": [{"restartCount": 2}, {"restartCount": 1}]
            }
        }))
        .build_node();

        assert_eq!(node.property_str("hostIP"), Some("10.0.1.5"));
        assert_eq!(node.property_str("podIP"), Some("172.16.0.9"));
        assert_eq!(node.properties["restarts"], json!(3));
        assert_eq!(
            node.property_str("startedAt"),
            Some("2024-03-01T12:00:00+00:00")
        );
        assert_eq!(node.property_str("status"), Some("Running"));
    }

    #[test]
    fn replica_kinds_fields() {
        let replica_set = parse(json!({
            "kind": "ReplicaSet",
            "apiVersion": "apps/v1",
            "metadata": {"name": "api-5d9", "namespace": "prod", "uid": "rs-uid"},
            "spec": {"replicas": 3},
            "status": {"replicas": 2}
        }))
        .build_node();
        assert_eq!(replica_set.properties["current"], json!(2));
        assert_eq!(replica_set.properties["desired"], json!(3));

        let stateful_set = parse(json!({
            "kind": "StatefulSet",
            "apiVersion": "apps/v1",
            "metadata": {"name": "db", "namespace": "prod", "uid": "ss-uid"},
            "spec": {"replicas": 3},
            "status": {"replicas": 3}
        }))
        .build_node();
        assert_eq!(stateful_set.properties["current"], json!(3));
        assert_eq!(stateful_set.properties["desired"], json!(3));
    }

    #[test]
    fn secret_service_namespace_fields() {
        let secret = parse(json!({
            "kind": "Secret",
            "apiVersion": "v1",
            "metadata": {"name": "tls", "namespace": "prod", "uid": "sec-uid"},
            "type": "kubernetes.io/tls"
        }))
        .build_node();
        assert_eq!(secret.property_str("type"), Some("kubernetes.io/tls"));

        let service = parse(json!({
            "kind": "Service",
            "apiVersion": "v1",
            "metadata": {"name": "api", "namespace": "prod", "uid": "svc-uid"},
            "spec": {"clusterIP": "10.96.0.12", "type": "ClusterIP"}
        }))
        .build_node();
        assert_eq!(service.property_str("clusterIP"), Some("10.96.0.12"));
        assert_eq!(service.property_str("type"), Some("ClusterIP"));

        let namespace = parse(json!({
            "kind": "Namespace",
            "apiVersion": "v1",
            "metadata": {"name": "prod", "uid": "ns-uid"},
            "status": {"phase": "Active"}
        }))
        .build_node();
        assert_eq!(namespace.property_str("status"), Some("Active"));
    }

    #[test]
    fn unregistered_kind_is_baseline_only() {
        let node = parse(json!({
            "kind": "Ingress",
            "apiVersion": "networking.k8s.io/v1",
            "metadata": {"name": "edge", "namespace": "prod", "uid": "ing-uid"}
        }))
        .build_node();

        assert_eq!(node.property_str("kind"), Some("Ingress"));
        assert_eq!(node.property_str("apigroup"), Some("networking.k8s.io"));
        assert!(node
            .properties
            .keys()
            .all(|k| BASELINE_KEYS.contains(&k.as_str())));
    }

    #[test]
    fn unstructured_is_baseline_only() {
        let obj = Unstructured::new(json!({
            "kind": "FlightController",
            "apiVersion": "example.io/v1",
            "metadata": {
                "name": "fc-1",
                "namespace": "fleet",
                "uid": "fc-uid",
                "labels": {"tier": "edge"}
            },
            "spec": {"replicas": 99}
        }));

        let node = transform_unstructured(&obj).unwrap();
        assert_eq!(node.uid, "fc-uid");
        assert_eq!(node.property_str("kind"), Some("FlightController"));
        assert_eq!(node.property_str("apigroup"), Some("example.io"));
        assert!(node
            .properties
            .keys()
            .all(|k| BASELINE_KEYS.contains(&k.as_str())));
    }

    #[test]
    fn unstructured_without_uid_is_rejected() {
        let obj = Unstructured::new(json!({
            "kind": "FlightController",
            "apiVersion": "example.io/v1",
            "metadata": {"name": "fc-1"}
        }));

        let err = transform_unstructured(&obj).unwrap_err();
        assert!(matches!(err, TransformError::MissingUid { .. }));

        let bare = Unstructured::new(json!({"kind": "FlightController"}));
        assert!(transform_unstructured(&bare).is_err());
    }

    #[test]
    fn build_node_is_idempotent() {
        let resource = parse(json!({
            "kind": "Pod",
            "apiVersion": "v1",
            "metadata": {"name": "web-0", "namespace": "prod", "uid": "pod-uid"},
            "status": {"phase": "Running", "containerStatuses": [{"restartCount": 1}]}
        }));

        assert_eq!(resource.build_node(), resource.build_node());
    }
}
