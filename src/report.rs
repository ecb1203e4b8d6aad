use crate::discovery::discover_pods;
use crate::error::Error;
use crate::events::collect_events;
use crate::kubernetes::ClusterAccess;
use crate::logs::{LogOptions, collect_logs};
use crate::resolver::resolve;
use crate::types::{
    ContainerLogResult, CorrelatedEvents, PodRef, PodReport, Report, ResourceReference,
};
use tracing::info;

/// Settings for one report run, fixed before the first cluster call.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub logs: LogOptions,
    pub include_events: bool,
}

/// Pair each pod with its containers' log results, matched by pod and container name.
///
/// Results for containers the pod does not declare are dropped.
pub fn assemble_report(
    reference: &ResourceReference,
    pods: Vec<PodRef>,
    logs: Vec<ContainerLogResult>,
    correlated_events: Option<CorrelatedEvents>,
) -> Report {
    let pods = pods
        .into_iter()
        .map(|pod| {
            let logs = pod
                .containers
                .iter()
                .filter_map(|c| {
                    logs.iter()
                        .find(|l| l.pod_name == pod.name && l.container_name == c.name)
                        .cloned()
                })
                .collect();
            PodReport { pod, logs }
        })
        .collect();

    Report {
        resource_kind: reference.kind,
        resource_name: reference.name.clone(),
        namespace: reference.namespace.clone(),
        pods,
        correlated_events,
    }
}

/// Run the whole pipeline: resolve, discover pods, collect logs and events, assemble.
///
/// Resolution, discovery and (when requested) event listing failures abort the run.
/// Per-container log failures are recorded in the report instead.
pub async fn build_report<C: ClusterAccess + ?Sized>(
    client: &C,
    reference: &ResourceReference,
    config: &ReportConfig,
) -> Result<Report, Error> {
    let resource = resolve(client, reference).await?;
    let pods = discover_pods(client, &reference.namespace, &resource).await?;

    let logs = collect_logs(client, &reference.namespace, &pods, &config.logs).await;

    let correlated_events = if config.include_events {
        let pod_names: Vec<String> = pods.iter().map(|p| p.name.clone()).collect();
        Some(
            collect_events(
                client,
                &reference.namespace,
                resource.kind().as_str(),
                &resource.name(),
                &pod_names,
            )
            .await?,
        )
    } else {
        None
    };

    info!(
        "Report for {}/{}: {} pod(s)",
        resource.kind(),
        reference.name,
        pods.len()
    );
    Ok(assemble_report(
        reference,
        pods,
        logs.into_iter().flatten().collect(),
        correlated_events,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContainerSpec, LogStatus, ResourceKind};

    fn pod_ref(name: &str, containers: &[&str]) -> PodRef {
        PodRef {
            name: name.to_string(),
            containers: containers
                .iter()
                .map(|c| ContainerSpec {
                    name: c.to_string(),
                    image: format!("{}:latest", c),
                })
                .collect(),
            phase: None,
            restarts: 0,
        }
    }

    fn fetched(pod: &str, container: &str, text: &str) -> ContainerLogResult {
        ContainerLogResult {
            pod_name: pod.to_string(),
            container_name: container.to_string(),
            text: text.to_string(),
            status: LogStatus::Fetched,
        }
    }

    #[test]
    fn test_assemble_matches_by_pod_and_container() {
        let reference = ResourceReference {
            kind: ResourceKind::Deployment,
            name: "web".to_string(),
            namespace: "default".to_string(),
        };
        let pods = vec![pod_ref("web-0", &["app", "sidecar"]), pod_ref("web-1", &["app"])];
        // Out of order, plus one for a container no pod declares
        let logs = vec![
            fetched("web-1", "app", "three"),
            fetched("web-0", "sidecar", "two"),
            fetched("web-0", "ghost", "nope"),
            fetched("web-0", "app", "one"),
        ];

        let report = assemble_report(&reference, pods, logs, None);
        assert_eq!(report.resource_kind, ResourceKind::Deployment);
        assert_eq!(report.pods.len(), 2);
        let texts: Vec<_> = report.pods[0].logs.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(report.pods[1].logs[0].text, "three");
        assert!(report.correlated_events.is_none());
    }
}
