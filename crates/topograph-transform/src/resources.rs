//! Intake resource model: the typed and dynamic cluster objects the
//! pipeline consumes.
//!
//! There is no compile-time dependency on a cluster client; resources
//! are plain serde structs carrying only the metadata and spec/status
//! fields their adapters read. `Resource` is the closed registry of
//! kinds with specialized adapters; everything else travels as
//! `Unstructured`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

// ── Metadata ──────────────────────────────────────────────────────

/// Standard object metadata present on every cluster resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: Option<String>,
    pub uid: String,
    pub resource_version: Option<String>,
    pub creation_timestamp: Option<DateTime<Utc>>,
    pub labels: BTreeMap<String, String>,
}

// ── Config and storage kinds ──────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigMap {
    pub api_version: String,
    pub metadata: ObjectMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Secret {
    pub api_version: String,
    pub metadata: ObjectMeta,
    #[serde(rename = "type")]
    pub secret_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentVolume {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: PersistentVolumeSpec,
    pub status: PersistentVolumeStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentVolumeSpec {
    /// Quantities by resource name; only "storage" is surfaced.
    pub capacity: BTreeMap<String, String>,
    pub persistent_volume_reclaim_policy: Option<String>,
    pub storage_class_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentVolumeStatus {
    pub phase: Option<String>,
}

// ── Workload kinds ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronJob {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: CronJobSpec,
    pub status: CronJobStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronJobSpec {
    pub schedule: String,
    pub suspend: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronJobStatus {
    /// References to currently running jobs; only the count is surfaced.
    pub active: Vec<Value>,
    pub last_schedule_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonSet {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub status: DaemonSetStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonSetStatus {
    pub desired_number_scheduled: i64,
    pub current_number_scheduled: i64,
    pub number_ready: i64,
    pub updated_number_scheduled: i64,
    pub number_available: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
    pub status: DeploymentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentSpec {
    pub replicas: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentStatus {
    pub replicas: i64,
    pub available_replicas: i64,
    pub ready_replicas: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: JobSpec,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSpec {
    pub completions: Option<i64>,
    pub parallelism: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStatus {
    pub succeeded: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pod {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub status: PodStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodStatus {
    pub phase: Option<String>,
    #[serde(rename = "hostIP")]
    pub host_ip: Option<String>,
    #[serde(rename = "podIP")]
    pub pod_ip: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerStatus {
    pub restart_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicaSet {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: ReplicaSetSpec,
    pub status: ReplicaSetStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicaSetSpec {
    pub replicas: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicaSetStatus {
    pub replicas: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSet {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: StatefulSetSpec,
    pub status: StatefulSetStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSetSpec {
    pub replicas: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatefulSetStatus {
    pub replicas: i64,
}

// ── Cluster-scoped kinds ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Namespace {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub status: NamespaceStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamespaceStatus {
    pub phase: Option<String>,
}

/// A cluster machine (kind "Node"); named apart from the graph vertex
/// type it transforms into.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterNode {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub status: ClusterNodeStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterNodeStatus {
    /// Quantities by resource name; only "cpu" is surfaced.
    pub capacity: BTreeMap<String, String>,
    pub node_info: NodeSystemInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSystemInfo {
    pub architecture: Option<String>,
    pub os_image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: ServiceSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSpec {
    #[serde(rename = "clusterIP")]
    pub cluster_ip: Option<String>,
    #[serde(rename = "type")]
    pub service_type: Option<String>,
}

// ── Policy ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: PolicySpec,
    pub status: PolicyStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicySpec {
    pub remediation_action: Option<String>,
    /// Templates may be null in manifests; null entries carry no rules.
    pub role_templates: Vec<Option<RoleTemplate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleTemplate {
    pub rules: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyStatus {
    pub compliance_state: Option<String>,
    pub valid: bool,
}

// ── Fallback and dynamic shapes ───────────────────────────────────

/// A typed object of a kind outside the registry. Transforms with the
/// common baseline only, so nothing is dropped for lacking a mapper.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericResource {
    pub kind: String,
    pub api_version: String,
    pub metadata: ObjectMeta,
}

/// A dynamic, schemaless cluster object — custom resources in
/// particular. Carries raw JSON; accessors read the universally
/// present fields.
#[derive(Debug, Clone)]
pub struct Unstructured(Value);

impl Unstructured {
    pub fn new(content: Value) -> Self {
        Self(content)
    }

    pub fn content(&self) -> &Value {
        &self.0
    }

    pub fn kind(&self) -> &str {
        self.0.get("kind").and_then(Value::as_str).unwrap_or("")
    }

    pub fn api_version(&self) -> &str {
        self.0
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    pub fn uid(&self) -> Option<&str> {
        self.0.pointer("/metadata/uid").and_then(Value::as_str)
    }
}

// ── Typed resource registry ───────────────────────────────────────

/// Every typed resource the pipeline knows how to dispatch, one variant
/// per registry kind plus the `Generic` fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum Resource {
    ConfigMap(ConfigMap),
    CronJob(CronJob),
    DaemonSet(DaemonSet),
    Deployment(Deployment),
    Job(Job),
    Namespace(Namespace),
    Node(ClusterNode),
    PersistentVolume(PersistentVolume),
    Pod(Pod),
    ReplicaSet(ReplicaSet),
    Secret(Secret),
    Service(Service),
    StatefulSet(StatefulSet),
    Policy(Policy),
    #[serde(skip)]
    Generic(GenericResource),
}

impl Resource {
    /// Kind strings with a typed model in this registry.
    pub const KINDS: [&'static str; 14] = [
        "ConfigMap",
        "CronJob",
        "DaemonSet",
        "Deployment",
        "Job",
        "Namespace",
        "Node",
        "PersistentVolume",
        "Pod",
        "ReplicaSet",
        "Secret",
        "Service",
        "StatefulSet",
        "Policy",
    ];

    /// Parse a manifest into a typed resource. A kind outside the
    /// registry falls back to `Generic` rather than failing.
    pub fn parse(value: Value) -> Result<Self> {
        let kind = value.get("kind").and_then(Value::as_str).unwrap_or("");
        if Self::KINDS.contains(&kind) {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(Resource::Generic(serde_json::from_value(value)?))
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Resource::ConfigMap(_) => "ConfigMap",
            Resource::CronJob(_) => "CronJob",
            Resource::DaemonSet(_) => "DaemonSet",
            Resource::Deployment(_) => "Deployment",
            Resource::Job(_) => "Job",
            Resource::Namespace(_) => "Namespace",
            Resource::Node(_) => "Node",
            Resource::PersistentVolume(_) => "PersistentVolume",
            Resource::Pod(_) => "Pod",
            Resource::ReplicaSet(_) => "ReplicaSet",
            Resource::Secret(_) => "Secret",
            Resource::Service(_) => "Service",
            Resource::StatefulSet(_) => "StatefulSet",
            Resource::Policy(_) => "Policy",
            Resource::Generic(r) => &r.kind,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Resource::ConfigMap(r) => &r.metadata,
            Resource::CronJob(r) => &r.metadata,
            Resource::DaemonSet(r) => &r.metadata,
            Resource::Deployment(r) => &r.metadata,
            Resource::Job(r) => &r.metadata,
            Resource::Namespace(r) => &r.metadata,
            Resource::Node(r) => &r.metadata,
            Resource::PersistentVolume(r) => &r.metadata,
            Resource::Pod(r) => &r.metadata,
            Resource::ReplicaSet(r) => &r.metadata,
            Resource::Secret(r) => &r.metadata,
            Resource::Service(r) => &r.metadata,
            Resource::StatefulSet(r) => &r.metadata,
            Resource::Policy(r) => &r.metadata,
            Resource::Generic(r) => &r.metadata,
        }
    }

    pub fn uid(&self) -> &str {
        &self.metadata().uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_registry_kind() {
        let resource = Resource::parse(json!({
            "kind": "Pod",
            "apiVersion": "v1",
            "metadata": {"name": "web-0", "namespace": "default", "uid": "pod-uid"},
            "status": {"phase": "Running", "hostIP": "10.0.1.5", "podIP": "172.16.0.9"}
        }))
        .unwrap();

        assert_eq!(resource.kind(), "Pod");
        assert_eq!(resource.uid(), "pod-uid");
        match resource {
            Resource::Pod(pod) => {
                assert_eq!(pod.status.host_ip.as_deref(), Some("10.0.1.5"));
                assert_eq!(pod.status.pod_ip.as_deref(), Some("172.16.0.9"));
            }
            other => panic!("expected Pod, got {other:?}"),
        }
    }

    #[test]
    fn parse_unregistered_kind_falls_back_to_generic() {
        let resource = Resource::parse(json!({
            "kind": "Ingress",
            "apiVersion": "networking.k8s.io/v1",
            "metadata": {"name": "edge", "namespace": "default", "uid": "ing-uid"}
        }))
        .unwrap();

        assert_eq!(resource.kind(), "Ingress");
        assert_eq!(resource.uid(), "ing-uid");
        assert!(matches!(resource, Resource::Generic(_)));
    }

    #[test]
    fn metadata_tolerates_missing_fields() {
        let resource = Resource::parse(json!({
            "kind": "ConfigMap",
            "apiVersion": "v1",
            "metadata": {"name": "settings", "uid": "cm-uid"}
        }))
        .unwrap();

        let meta = resource.metadata();
        assert_eq!(meta.namespace, None);
        assert_eq!(meta.creation_timestamp, None);
        assert!(meta.labels.is_empty());
    }

    #[test]
    fn unstructured_accessors() {
        let obj = Unstructured::new(json!({
            "kind": "FlightController",
            "apiVersion": "example.io/v1",
            "metadata": {"name": "fc-1", "uid": "fc-uid"}
        }));

        assert_eq!(obj.kind(), "FlightController");
        assert_eq!(obj.api_version(), "example.io/v1");
        assert_eq!(obj.uid(), Some("fc-uid"));

        let empty = Unstructured::new(json!({}));
        assert_eq!(empty.kind(), "");
        assert_eq!(empty.uid(), None);
    }
}
