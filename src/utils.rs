use crate::types::{ContainerSpec, PodRef};
use chrono::{DateTime, Utc};
use crossterm::style::Color;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::ResourceExt;
use std::hash::{Hash, Hasher};

/// Convert a LabelSelector's match_labels to a string for listing.
pub fn selector_to_labels_string(selector: &LabelSelector) -> Option<String> {
    if let Some(labels) = &selector.match_labels {
        if labels.is_empty() {
            None
        } else {
            Some(
                labels
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(","),
            )
        }
    } else {
        None
    }
}

/// Build the report view of a pod: name, containers in spec order, phase and restarts.
pub fn pod_ref(pod: &Pod) -> PodRef {
    let containers = pod
        .spec
        .as_ref()
        .map(|spec| {
            spec.containers
                .iter()
                .map(|c| ContainerSpec {
                    name: c.name.clone(),
                    image: c.image.clone().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();

    PodRef {
        name: pod.name_any(),
        containers,
        phase: pod.status.as_ref().and_then(|s| s.phase.clone()),
        restarts: get_restart_count(pod),
    }
}

pub fn get_restart_count(pod: &Pod) -> i32 {
    pod.status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| statuses.iter().map(|cs| cs.restart_count).sum())
        .unwrap_or(0)
}

/// Short age like `kubectl get` prints: 42s, 5m, 3h, 2d.
pub fn format_age(since: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    since
        .map(|created| {
            let total_secs = now.signed_duration_since(created).num_seconds().max(0);
            if total_secs < 60 {
                format!("{}s", total_secs)
            } else if total_secs < 3600 {
                format!("{}m", total_secs / 60)
            } else if total_secs < 86400 {
                format!("{}h", total_secs / 3600)
            } else {
                format!("{}d", total_secs / 86400)
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Generate a color for a string based on hash.
pub fn get_color(s: &str) -> Color {
    let colors = [
        Color::Green,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::AnsiValue(92), // Bright Green
        Color::AnsiValue(94), // Bright Blue
        Color::AnsiValue(95), // Bright Magenta
        Color::AnsiValue(96), // Bright Cyan
    ];
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    s.hash(&mut hasher);
    let hash = hasher.finish() as u32;
    colors[(hash % colors.len() as u32) as usize]
}
