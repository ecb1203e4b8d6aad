use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use std::fmt;

/// The two resource kinds a report can be anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Deployment,
    Pod,
}

impl ResourceKind {
    /// Kind name as it appears in `involvedObject.kind` of cluster events.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Pod => "Pod",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

/// A resource fetched from the cluster. Never mutated after resolution.
#[derive(Debug, Clone)]
pub enum ResolvedResource {
    Deployment(Box<Deployment>),
    Pod(Box<Pod>),
}

impl ResolvedResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResolvedResource::Deployment(_) => ResourceKind::Deployment,
            ResolvedResource::Pod(_) => ResourceKind::Pod,
        }
    }

    pub fn name(&self) -> String {
        match self {
            ResolvedResource::Deployment(d) => d.name_any(),
            ResolvedResource::Pod(p) => p.name_any(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
}

/// A discovered pod and its containers, in the order the cluster returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRef {
    pub name: String,
    pub containers: Vec<ContainerSpec>,
    pub phase: Option<String>,
    pub restarts: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogStatus {
    Fetched,
    FetchError(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLogResult {
    pub pod_name: String,
    pub container_name: String,
    pub text: String,
    pub status: LogStatus,
}

impl ContainerLogResult {
    pub fn skipped(pod_name: &str, container_name: &str) -> Self {
        Self {
            pod_name: pod_name.to_string(),
            container_name: container_name.to_string(),
            text: String::new(),
            status: LogStatus::Skipped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Normal => "Normal",
            EventType::Warning => "Warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub name: String,
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
    pub involved_kind: String,
    pub involved_name: String,
    pub count: Option<i32>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// Events split between the resource itself and its pods. An event lands in at most one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelatedEvents {
    pub resource_level: Vec<EventRecord>,
    pub pod_level: Vec<EventRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodReport {
    pub pod: PodRef,
    pub logs: Vec<ContainerLogResult>,
}

/// The consolidated result of one invocation, handed read-only to rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub resource_kind: ResourceKind,
    pub resource_name: String,
    pub namespace: String,
    pub pods: Vec<PodReport>,
    pub correlated_events: Option<CorrelatedEvents>,
}
