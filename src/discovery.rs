use crate::error::Error;
use crate::kubernetes::ClusterAccess;
use crate::types::{PodRef, ResolvedResource};
use crate::utils::{pod_ref, selector_to_labels_string};
use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;
use tracing::{debug, info};

/// Equality selector string for the pods a deployment owns.
fn deployment_selector(deploy: &Deployment) -> Result<String, Error> {
    deploy
        .spec
        .as_ref()
        .and_then(|spec| selector_to_labels_string(&spec.selector))
        .ok_or_else(|| Error::NoSelector {
            name: deploy.name_any(),
        })
}

/// Find the pods behind a resolved resource, in the order the cluster lists them.
pub async fn discover_pods<C: ClusterAccess + ?Sized>(
    client: &C,
    namespace: &str,
    resource: &ResolvedResource,
) -> Result<Vec<PodRef>, Error> {
    match resource {
        ResolvedResource::Pod(pod) => Ok(vec![pod_ref(pod)]),
        ResolvedResource::Deployment(deploy) => {
            let selector = deployment_selector(deploy)?;
            debug!("Listing pods in {} with selector {}", namespace, selector);

            let pods = client
                .list_pods(namespace, &selector)
                .await
                .map_err(|source| Error::PodList {
                    selector: selector.clone(),
                    source,
                })?;

            info!(
                "Found {} pod(s) for deployment {}",
                pods.len(),
                deploy.name_any()
            );
            Ok(pods.iter().map(pod_ref).collect())
        }
    }
}
