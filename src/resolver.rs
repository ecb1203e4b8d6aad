use crate::error::Error;
use crate::kubernetes::ClusterAccess;
use crate::types::{ResolvedResource, ResourceKind, ResourceReference};
use tracing::debug;

/// Map a resource type token to its kind.
pub fn parse_kind(token: &str) -> Result<ResourceKind, Error> {
    match token {
        "deploy" | "deployment" => Ok(ResourceKind::Deployment),
        "pod" => Ok(ResourceKind::Pod),
        _ => Err(Error::UnsupportedResourceKind {
            kind: token.to_string(),
        }),
    }
}

/// Parse a `<type>/<name>` reference. Only the first `/` separates type from name.
pub fn parse_reference(input: &str, namespace: &str) -> Result<ResourceReference, Error> {
    let (kind, name) = match input.split_once('/') {
        Some((kind, name)) if !kind.is_empty() && !name.is_empty() => (kind, name),
        _ => {
            return Err(Error::InvalidReferenceFormat {
                input: input.to_string(),
            });
        }
    };

    Ok(ResourceReference {
        kind: parse_kind(kind)?,
        name: name.to_string(),
        namespace: namespace.to_string(),
    })
}

/// Fetch the referenced object from the cluster.
pub async fn resolve<C: ClusterAccess + ?Sized>(
    client: &C,
    reference: &ResourceReference,
) -> Result<ResolvedResource, Error> {
    debug!(
        "Resolving {}/{} in namespace {}",
        reference.kind, reference.name, reference.namespace
    );
    client
        .get_resource(&reference.namespace, reference.kind, &reference.name)
        .await
        .map_err(|source| Error::ResourceFetch {
            kind: reference.kind,
            name: reference.name.clone(),
            source,
        })
}
