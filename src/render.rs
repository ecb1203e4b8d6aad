use crate::types::{ContainerLogResult, EventRecord, EventType, LogStatus, PodReport, Report};
use crate::utils::{format_age, get_color};
use chrono::{DateTime, Utc};
use crossterm::style::{Color, Stylize};
use serde::Serialize;
use std::fmt::Write;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    resource_type: &'static str,
    resource_name: &'a str,
    namespace: &'a str,
    pods: Vec<JsonPod<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<JsonEvent<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pod_events: Vec<JsonEvent<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonPod<'a> {
    pod_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<&'a str>,
    restarts: i32,
    containers: Vec<JsonContainer<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    logs: Vec<JsonLog<'a>>,
}

#[derive(Serialize)]
struct JsonContainer<'a> {
    name: &'a str,
    image: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonLog<'a> {
    pod_name: &'a str,
    container_name: &'a str,
    logs: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEvent<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    event_type: &'static str,
    reason: &'a str,
    message: &'a str,
    involved_obj: JsonInvolvedObject<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_seen: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct JsonInvolvedObject<'a> {
    kind: &'a str,
    name: &'a str,
}

/// Skipped containers have no log entry.
fn json_log(log: &ContainerLogResult) -> Option<JsonLog<'_>> {
    let (status, error) = match &log.status {
        LogStatus::Fetched => ("fetched", None),
        LogStatus::FetchError(msg) => ("error", Some(msg.as_str())),
        LogStatus::Skipped => return None,
    };
    Some(JsonLog {
        pod_name: &log.pod_name,
        container_name: &log.container_name,
        logs: &log.text,
        status,
        error,
    })
}

impl<'a> From<&'a EventRecord> for JsonEvent<'a> {
    fn from(event: &'a EventRecord) -> Self {
        JsonEvent {
            name: &event.name,
            event_type: event.event_type.as_str(),
            reason: &event.reason,
            message: &event.message,
            involved_obj: JsonInvolvedObject {
                kind: &event.involved_kind,
                name: &event.involved_name,
            },
            count: event.count,
            last_seen: event.last_seen,
        }
    }
}

fn json_pod(pod: &PodReport) -> JsonPod<'_> {
    JsonPod {
        pod_name: &pod.pod.name,
        phase: pod.pod.phase.as_deref(),
        restarts: pod.pod.restarts,
        containers: pod
            .pod
            .containers
            .iter()
            .map(|c| JsonContainer {
                name: &c.name,
                image: &c.image,
            })
            .collect(),
        logs: pod.logs.iter().filter_map(json_log).collect(),
    }
}

/// Serialize the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> serde_json::Result<String> {
    let (events, pod_events) = match &report.correlated_events {
        Some(correlated) => (
            correlated.resource_level.iter().map(JsonEvent::from).collect(),
            correlated.pod_level.iter().map(JsonEvent::from).collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };
    let json = JsonReport {
        resource_type: report.resource_kind.as_str(),
        resource_name: &report.resource_name,
        namespace: &report.namespace,
        pods: report.pods.iter().map(json_pod).collect(),
        events,
        pod_events,
    };
    serde_json::to_string_pretty(&json)
}

/// Applies terminal styling only when enabled.
struct Painter {
    enabled: bool,
}

impl Painter {
    fn color(&self, s: &str, color: Color) -> String {
        if self.enabled {
            s.to_string().with(color).to_string()
        } else {
            s.to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        if self.enabled {
            s.to_string().bold().to_string()
        } else {
            s.to_string()
        }
    }
}

fn render_events(
    out: &mut String,
    painter: &Painter,
    title: &str,
    events: &[EventRecord],
    now: DateTime<Utc>,
) {
    let _ = writeln!(out, "\n{}", painter.bold(title));
    if events.is_empty() {
        let _ = writeln!(out, "  <none>");
        return;
    }

    let _ = writeln!(
        out,
        "  {:<6} {:<8} {:<24} {:<32} MESSAGE",
        "AGE", "TYPE", "REASON", "OBJECT"
    );
    for event in events {
        let event_type = format!("{:<8}", event.event_type.as_str());
        let event_type = match event.event_type {
            EventType::Warning => painter.color(&event_type, Color::Red),
            EventType::Normal => event_type,
        };
        let object = format!("{}/{}", event.involved_kind, event.involved_name);
        let count = match event.count {
            Some(n) if n > 1 => format!(" (x{})", n),
            _ => String::new(),
        };
        let _ = writeln!(
            out,
            "  {:<6} {} {:<24} {:<32} {}{}",
            format_age(event.last_seen, now),
            event_type,
            event.reason,
            object,
            event.message,
            count
        );
    }
}

fn render_pod(out: &mut String, painter: &Painter, pod: &PodReport) {
    let phase = pod.pod.phase.as_deref().unwrap_or("Unknown");
    let _ = writeln!(
        out,
        "\n{} {} [{}, restarts: {}]",
        painter.bold("Pod:"),
        painter.color(&pod.pod.name, get_color(&pod.pod.name)),
        phase,
        pod.pod.restarts
    );

    let width = pod
        .pod
        .containers
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("CONTAINER".len());
    let _ = writeln!(out, "  {:<width$}  IMAGE", "CONTAINER", width = width);
    for c in &pod.pod.containers {
        let _ = writeln!(out, "  {:<width$}  {}", c.name, c.image, width = width);
    }

    for log in &pod.logs {
        let header = format!("--- logs: {}/{} ---", log.pod_name, log.container_name);
        match &log.status {
            LogStatus::Skipped => {}
            LogStatus::FetchError(msg) => {
                let _ = writeln!(out, "  {}", painter.bold(&header));
                let _ = writeln!(out, "  {}", painter.color(msg, Color::Red));
            }
            LogStatus::Fetched if log.text.is_empty() => {
                let _ = writeln!(out, "  {}", painter.bold(&header));
                let _ = writeln!(out, "  <no log lines>");
            }
            LogStatus::Fetched => {
                let _ = writeln!(out, "  {}", painter.bold(&header));
                for line in log.text.lines() {
                    let _ = writeln!(out, "  {}", line);
                }
            }
        }
    }
}

/// Render the report for a terminal. `now` anchors event ages.
pub fn render_text(report: &Report, color: bool, now: DateTime<Utc>) -> String {
    let painter = Painter { enabled: color };
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}/{}",
        painter.bold("Resource:"),
        report.resource_kind,
        report.resource_name
    );
    let _ = writeln!(out, "{} {}", painter.bold("Namespace:"), report.namespace);
    let _ = writeln!(out, "{} {}", painter.bold("Pods found:"), report.pods.len());

    for pod in &report.pods {
        render_pod(&mut out, &painter, pod);
    }

    if let Some(correlated) = &report.correlated_events {
        let title = format!(
            "Events for {}/{}:",
            report.resource_kind, report.resource_name
        );
        render_events(&mut out, &painter, &title, &correlated.resource_level, now);
        render_events(
            &mut out,
            &painter,
            "Pod events:",
            &correlated.pod_level,
            now,
        );
    }

    out
}
