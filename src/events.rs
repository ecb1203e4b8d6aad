use crate::error::Error;
use crate::kubernetes::ClusterAccess;
use crate::types::{CorrelatedEvents, EventRecord, EventType};
use k8s_openapi::api::core::v1::Event;
use kube::ResourceExt;
use std::collections::HashSet;
use tracing::debug;

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        let event_type = match event.type_.as_deref() {
            Some("Warning") => EventType::Warning,
            _ => EventType::Normal,
        };
        let last_seen = event
            .last_timestamp
            .as_ref()
            .map(|t| t.0)
            .or_else(|| event.event_time.as_ref().map(|t| t.0))
            .or_else(|| event.metadata.creation_timestamp.as_ref().map(|t| t.0));

        EventRecord {
            name: event.name_any(),
            event_type,
            reason: event.reason.clone().unwrap_or_default(),
            message: event.message.clone().unwrap_or_default(),
            involved_kind: event.involved_object.kind.clone().unwrap_or_default(),
            involved_name: event.involved_object.name.clone().unwrap_or_default(),
            count: event.count,
            last_seen,
        }
    }
}

/// Split events between the resource itself and its pods, preserving source order.
/// Events about anything else are dropped.
pub fn correlate_events(
    events: impl IntoIterator<Item = EventRecord>,
    resource_kind: &str,
    resource_name: &str,
    pod_names: &[String],
) -> CorrelatedEvents {
    let pod_names: HashSet<&str> = pod_names.iter().map(String::as_str).collect();
    let mut correlated = CorrelatedEvents::default();

    for event in events {
        if event.involved_kind == resource_kind && event.involved_name == resource_name {
            correlated.resource_level.push(event);
        } else if event.involved_kind == "Pod" && pod_names.contains(event.involved_name.as_str())
        {
            correlated.pod_level.push(event);
        }
    }

    correlated
}

/// List the namespace's events once and correlate them with the resource and its pods.
pub async fn collect_events<C: ClusterAccess + ?Sized>(
    client: &C,
    namespace: &str,
    resource_kind: &str,
    resource_name: &str,
    pod_names: &[String],
) -> Result<CorrelatedEvents, Error> {
    let events = client
        .list_events(namespace)
        .await
        .map_err(|source| Error::EventList {
            namespace: namespace.to_string(),
            source,
        })?;

    let total = events.len();
    let correlated = correlate_events(
        events.iter().map(EventRecord::from),
        resource_kind,
        resource_name,
        pod_names,
    );
    debug!(
        "Correlated {} of {} event(s): {} resource, {} pod",
        correlated.resource_level.len() + correlated.pod_level.len(),
        total,
        correlated.resource_level.len(),
        correlated.pod_level.len()
    );
    Ok(correlated)
}
