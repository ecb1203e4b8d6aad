use crate::types::ResourceKind;
use std::fmt;

/// Error returned by the cluster access capability.
pub type ClusterError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where a container log fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStage {
    Open,
    Read,
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStage::Open => f.write_str("Error fetching logs"),
            LogStage::Read => f.write_str("Error reading logs"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "invalid resource reference '{input}', expected <resource-type>/<resource-name>, e.g. deploy/my-app"
    )]
    InvalidReferenceFormat { input: String },

    #[error("unsupported resource type: {kind}")]
    UnsupportedResourceKind { kind: String },

    #[error("failed to get {kind} {name}: {source}")]
    ResourceFetch {
        kind: ResourceKind,
        name: String,
        #[source]
        source: ClusterError,
    },

    #[error("deployment {name} has no selector")]
    NoSelector { name: String },

    #[error("failed to list pods for selector {selector}: {source}")]
    PodList {
        selector: String,
        #[source]
        source: ClusterError,
    },

    #[error("{stage} for {pod}/{container}: {source}")]
    ContainerLogFetch {
        pod: String,
        container: String,
        stage: LogStage,
        #[source]
        source: ClusterError,
    },

    #[error("failed to list events in namespace {namespace}: {source}")]
    EventList {
        namespace: String,
        #[source]
        source: ClusterError,
    },

    #[error("invalid log filter pattern '{pattern}': {source}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
